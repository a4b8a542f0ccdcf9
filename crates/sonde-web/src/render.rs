//! Minimal HTML rendering for the index and page contexts.

use std::fmt::Write as _;

use serde_json::{Map as JsonMap, Value as JsonValue};
use sonde_types::IndexListing;

pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            other => out.push(other),
        }
    }
    out
}

pub fn index(listing: &IndexListing, index_path: &str) -> String {
    let mut body = String::new();
    if listing.entries.is_empty() {
        body.push_str("<p>No diagnostic pages are registered.</p>\n");
    } else {
        body.push_str("<table>\n<tr><th>Page</th><th>Application</th><th>Description</th></tr>\n");
        for keyed in &listing.entries {
            let entry = &keyed.entry;
            let _ = writeln!(
                body,
                "<tr id=\"{key}\"><td><a href=\"{href}\">{link}</a></td><td>{app}</td><td>{doc}</td></tr>",
                key = escape(&keyed.key),
                href = escape(&format!("{index_path}{}", entry.href())),
                link = escape(&entry.link_name),
                app = escape(&entry.app_name),
                doc = escape(entry.doc.as_deref().unwrap_or_default().trim()),
            );
        }
        body.push_str("</table>\n");
    }
    document(&listing.title, &body)
}

pub fn page(title: &str, index_path: &str, context: &JsonMap<String, JsonValue>) -> String {
    let mut body = String::new();
    let _ = writeln!(
        body,
        "<p><a href=\"{}\">Diagnostic index</a></p>",
        escape(index_path)
    );
    write_map(&mut body, context);
    document(title, &body)
}

fn document(title: &str, body: &str) -> String {
    let title = escape(title);
    format!(
        "<!DOCTYPE html>\n<html>\n<head><meta charset=\"utf-8\"><title>{title}</title></head>\n<body>\n<h1>{title}</h1>\n{body}</body>\n</html>\n"
    )
}

fn write_map(out: &mut String, map: &JsonMap<String, JsonValue>) {
    out.push_str("<table>\n");
    for (key, value) in map {
        let _ = write!(out, "<tr><th>{}</th><td>", escape(key));
        write_value(out, value);
        out.push_str("</td></tr>\n");
    }
    out.push_str("</table>\n");
}

fn write_value(out: &mut String, value: &JsonValue) {
    match value {
        JsonValue::Object(map) => write_map(out, map),
        JsonValue::Array(items) => {
            out.push_str("<ul>");
            for item in items {
                out.push_str("<li>");
                write_value(out, item);
                out.push_str("</li>");
            }
            out.push_str("</ul>");
        }
        JsonValue::String(text) if text.contains('\n') => {
            let _ = write!(out, "<pre>{}</pre>", escape(text));
        }
        JsonValue::String(text) => out.push_str(&escape(text)),
        JsonValue::Null => out.push_str("<em>none</em>"),
        other => out.push_str(&escape(&other.to_string())),
    }
}
