use tokio::process::Command;

use crate::page::Context;

const UNKNOWN: &str = "<unknown>";

/// Build and host details: git revision of the working directory, crate
/// version, target and hostname.
///
/// Outside a git checkout the revision comes from `SHORT_SHA`, `BRANCH_NAME`
/// and `COMMIT_SHA`, as set by most CI systems.
pub async fn context() -> Context {
    let mut context = match git_context().await {
        Some(context) => context,
        None => env_context(),
    };
    context.insert("sonde_version".into(), env!("CARGO_PKG_VERSION").into());
    context.insert(
        "target".into(),
        format!("{}-{}", std::env::consts::ARCH, std::env::consts::OS).into(),
    );
    context.insert("hostname".into(), hostname().into());
    context
}

async fn git_context() -> Option<Context> {
    git(&["rev-parse", "--git-dir"]).await?;

    let mut context = Context::new();
    context.insert(
        "git_describe".into(),
        git(&["describe", "--always", "--dirty"]).await.into(),
    );
    let detached = git(&["symbolic-ref", "-q", "HEAD"]).await.is_none();
    context.insert("git_detached_head".into(), detached.into());
    if !detached {
        context.insert(
            "git_active_branch".into(),
            git(&["rev-parse", "--abbrev-ref", "HEAD"]).await.into(),
        );
        context.insert(
            "active_branch_tracking_branch".into(),
            git(&["rev-parse", "--abbrev-ref", "--symbolic-full-name", "@{u}"])
                .await
                .into(),
        );
    }
    context.insert("hexsha".into(), git(&["rev-parse", "HEAD"]).await.into());
    Some(context)
}

fn env_context() -> Context {
    let var = |name: &str| std::env::var(name).unwrap_or_else(|_| UNKNOWN.to_string());
    let mut context = Context::new();
    context.insert("git_describe".into(), var("SHORT_SHA").into());
    context.insert("git_active_branch".into(), var("BRANCH_NAME").into());
    context.insert("active_branch_tracking_branch".into(), UNKNOWN.into());
    context.insert("hexsha".into(), var("COMMIT_SHA").into());
    context
}

/// Trimmed stdout of a successful `git` invocation.
async fn git(args: &[&str]) -> Option<String> {
    let output = Command::new("git").args(args).output().await.ok()?;
    if !output.status.success() {
        return None;
    }
    let stdout = String::from_utf8(output.stdout).ok()?;
    let trimmed = stdout.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

#[cfg(unix)]
fn hostname() -> String {
    let mut buf = [0u8; 256];
    let ret = unsafe { libc::gethostname(buf.as_mut_ptr() as *mut libc::c_char, buf.len()) };
    if ret != 0 {
        return String::new();
    }
    let len = buf.iter().position(|&b| b == 0).unwrap_or(buf.len());
    String::from_utf8_lossy(&buf[..len]).into_owned()
}

#[cfg(not(unix))]
fn hostname() -> String {
    std::env::var("COMPUTERNAME").unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn always_reports_revision_and_host_fields() {
        let context = context().await;
        for key in ["git_describe", "hexsha", "sonde_version", "target", "hostname"] {
            assert!(context.contains_key(key), "missing {key}");
        }
        assert_eq!(context["sonde_version"], env!("CARGO_PKG_VERSION"));
    }
}
