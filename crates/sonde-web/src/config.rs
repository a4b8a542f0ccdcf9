use std::path::{Path, PathBuf};

use serde_json::{Map as JsonMap, Value as JsonValue};

pub const HTTP_ENV: &str = "SONDE_HTTP";
pub const MOUNT_ENV: &str = "SONDE_MOUNT";
pub const ADMIN_TOKEN_ENV: &str = "SONDE_ADMIN_TOKEN";
pub const SETTINGS_ENV: &str = "SONDE_SETTINGS";
pub const STATIC_ROOT_ENV: &str = "SONDE_STATIC_ROOT";

pub const DEFAULT_HTTP_ADDR: &str = "127.0.0.1:9140";
pub const DEFAULT_MOUNT: &str = "/diagnostic";

/// Values from the command line that take precedence over the environment.
#[derive(Debug, Default, Clone)]
pub struct Overrides {
    pub listen: Option<String>,
    pub settings: Option<PathBuf>,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub http_addr: String,
    /// Normalized mount prefix: empty, or `/segment` without trailing slash.
    pub mount: String,
    pub admin_token: Option<String>,
    pub static_root: Option<PathBuf>,
    /// Contents of the settings file, shown by the settings pages.
    pub settings: JsonMap<String, JsonValue>,
}

impl Config {
    pub fn from_env(overrides: Overrides) -> Result<Self, String> {
        Self::from_lookup(|name| std::env::var(name).ok(), overrides)
    }

    pub fn from_lookup(
        lookup: impl Fn(&str) -> Option<String>,
        overrides: Overrides,
    ) -> Result<Self, String> {
        let http_addr = overrides
            .listen
            .or_else(|| lookup(HTTP_ENV))
            .unwrap_or_else(|| DEFAULT_HTTP_ADDR.into());
        let mount = normalize_mount(&lookup(MOUNT_ENV).unwrap_or_else(|| DEFAULT_MOUNT.into()));
        let admin_token = lookup(ADMIN_TOKEN_ENV).filter(|token| !token.is_empty());
        let static_root = lookup(STATIC_ROOT_ENV)
            .filter(|root| !root.is_empty())
            .map(PathBuf::from);
        let settings = match overrides
            .settings
            .or_else(|| lookup(SETTINGS_ENV).map(PathBuf::from))
        {
            Some(path) => load_settings(&path)?,
            None => JsonMap::new(),
        };

        Ok(Self {
            http_addr,
            mount,
            admin_token,
            static_root,
            settings,
        })
    }

    /// Path of the index route; every dispatch failure redirects here.
    pub fn index_path(&self) -> String {
        format!("{}/", self.mount)
    }

    /// Settings as pages see them: the server's own configuration, overlaid
    /// by the settings file.
    pub fn effective_settings(&self) -> JsonMap<String, JsonValue> {
        let mut settings = JsonMap::new();
        settings.insert("HTTP_LISTEN".into(), self.http_addr.clone().into());
        settings.insert("MOUNT_PREFIX".into(), self.mount.clone().into());
        settings.insert(
            "STATIC_ROOT".into(),
            self.static_root
                .as_ref()
                .map(|root| JsonValue::String(root.display().to_string()))
                .unwrap_or(JsonValue::Null),
        );
        settings.insert(
            "ADMIN_TOKEN".into(),
            self.admin_token
                .clone()
                .map(JsonValue::String)
                .unwrap_or(JsonValue::Null),
        );
        settings.extend(self.settings.clone());
        settings
    }
}

/// `""` and `"/"` mount at the root; anything else gets exactly one leading
/// slash and no trailing slash.
pub fn normalize_mount(raw: &str) -> String {
    let trimmed = raw.trim().trim_matches('/');
    if trimmed.is_empty() {
        String::new()
    } else {
        format!("/{trimmed}")
    }
}

/// Reads a JSON object of settings from `path`.
pub fn load_settings(path: &Path) -> Result<JsonMap<String, JsonValue>, String> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| format!("failed to read settings file {}: {e}", path.display()))?;
    match serde_json::from_str(&text) {
        Ok(JsonValue::Object(map)) => Ok(map),
        Ok(_) => Err(format!(
            "settings file {} must hold a JSON object",
            path.display()
        )),
        Err(e) => Err(format!(
            "failed to parse settings file {}: {e}",
            path.display()
        )),
    }
}
