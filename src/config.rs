use std::path::{Path, PathBuf};

use crate::client::{ClientConfig, DEFAULT_BASE_URI};
use crate::error::{Error, Result};

#[derive(Debug, Default, PartialEq, Eq)]
struct RcConfig {
    url: Option<String>,
    key: Option<String>,
    secret: Option<String>,
}

/// Resolves client settings, in order of precedence:
/// - explicit arguments
/// - environment variables `POSTCODENL_URL` / `POSTCODENL_KEY` / `POSTCODENL_SECRET`
/// - the first rc file found (see [`rc_candidates`])
///
/// The URL falls back to [`DEFAULT_BASE_URI`]; key and secret are required.
pub(crate) fn load_config(
    url: Option<String>,
    key: Option<String>,
    secret: Option<String>,
) -> Result<ClientConfig> {
    let rc_candidates = rc_candidates(
        env_value("POSTCODENL_RC"),
        std::env::current_dir().ok(),
        dirs::home_dir(),
    );
    resolve(RcConfig { url, key, secret }, env_value, &rc_candidates)
}

/// Fills the gaps in `explicit` from `env`, then from the first existing
/// file in `rc_candidates`.
fn resolve(
    explicit: RcConfig,
    env: impl Fn(&str) -> Option<String>,
    rc_candidates: &[PathBuf],
) -> Result<ClientConfig> {
    let mut url = explicit.url.or_else(|| env("POSTCODENL_URL"));
    let mut key = explicit.key.or_else(|| env("POSTCODENL_KEY"));
    let mut secret = explicit.secret.or_else(|| env("POSTCODENL_SECRET"));

    if url.is_none() || key.is_none() || secret.is_none() {
        if let Some(rc_path) = rc_candidates.iter().find(|p| p.exists()) {
            tracing::debug!(path = %rc_path.display(), "reading configuration file");
            let cfg = read_rc(rc_path).map_err(|e| {
                Error::InvalidConfiguration(format!(
                    "failed to read configuration file {}: {}",
                    rc_path.display(),
                    e
                ))
            })?;

            url = url.or(cfg.url);
            key = key.or(cfg.key);
            secret = secret.or(cfg.secret);
        }
    }

    let key = key.ok_or_else(|| missing("key", "POSTCODENL_KEY", rc_candidates))?;
    let secret = secret.ok_or_else(|| missing("secret", "POSTCODENL_SECRET", rc_candidates))?;
    let url = url.unwrap_or_else(|| DEFAULT_BASE_URI.to_string());

    Ok(ClientConfig { url, key, secret })
}

fn env_value(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

fn missing(field: &str, env: &str, rc_candidates: &[PathBuf]) -> Error {
    if rc_candidates.is_empty() {
        return Error::InvalidConfiguration(format!(
            "missing {} (set {} or create .postcodenlrc)",
            field, env
        ));
    }
    Error::InvalidConfiguration(format!(
        "missing {} (set {} or put `{}:` in one of: {})",
        field,
        env,
        field,
        rc_candidates
            .iter()
            .map(|p| p.display().to_string())
            .collect::<Vec<_>>()
            .join(", ")
    ))
}

fn read_rc(path: &Path) -> std::io::Result<RcConfig> {
    let text = std::fs::read_to_string(path)?;
    Ok(parse_rc(&text))
}

fn parse_rc(text: &str) -> RcConfig {
    let mut cfg = RcConfig::default();

    // A value may sit on the line after its `name:`.
    let mut pending: Option<&str> = None;

    for raw in text.lines() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        if let Some(name) = pending.take() {
            if !line.contains(':') {
                cfg.set(name, strip_quotes(line));
                continue;
            }
        }

        if let Some((name, value)) = line.split_once(':') {
            let name = name.trim();
            let value = strip_quotes(value.trim());
            match name {
                "url" | "key" | "secret" if value.is_empty() => pending = Some(name),
                "url" | "key" | "secret" => cfg.set(name, value),
                _ => {}
            }
        }
    }

    cfg
}

impl RcConfig {
    fn set(&mut self, name: &str, value: &str) {
        let value = Some(value.to_string());
        match name {
            "url" => self.url = value,
            "key" => self.key = value,
            "secret" => self.secret = value,
            _ => {}
        }
    }
}

fn strip_quotes(s: &str) -> &str {
    let s = s.trim();
    if (s.starts_with('"') && s.ends_with('"') && s.len() >= 2)
        || (s.starts_with('\'') && s.ends_with('\'') && s.len() >= 2)
    {
        &s[1..s.len() - 1]
    } else {
        s
    }
}

/// `POSTCODENL_RC` alone when set, otherwise `.postcodenlrc` in the current
/// directory and then in the home directory.
fn rc_candidates(rc: Option<String>, cwd: Option<PathBuf>, home: Option<PathBuf>) -> Vec<PathBuf> {
    if let Some(p) = rc {
        return vec![PathBuf::from(p)];
    }
    [cwd, home]
        .into_iter()
        .flatten()
        .map(|dir| dir.join(".postcodenlrc"))
        .collect()
}
