use std::path::PathBuf;

use anyhow::{Context, bail};

/// Session secrets that ship in sample `.env` files and MUST NOT be used.
const PLACEHOLDER_SECRETS: &[&str] = &[
    "change-me-to-a-random-string",
    "dev-secret-change-me",
    "careshare-secret",
];

const MIN_SECRET_LEN: usize = 32;

#[derive(Debug, Clone)]
pub struct Config {
    pub db_path: PathBuf,
    pub host: String,
    pub port: u16,
    pub session_secret: String,
    pub session_ttl_hours: i64,
    pub cookie_secure: bool,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(var: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let session_secret = var("CARESHARE_SESSION_SECRET").unwrap_or_default();
        if session_secret.is_empty() || PLACEHOLDER_SECRETS.contains(&session_secret.as_str()) {
            bail!("CARESHARE_SESSION_SECRET is unset or still a placeholder");
        }
        if session_secret.len() < MIN_SECRET_LEN {
            bail!(
                "CARESHARE_SESSION_SECRET must be at least {} characters",
                MIN_SECRET_LEN
            );
        }

        let port = var("CARESHARE_PORT")
            .unwrap_or_else(|| "3000".into())
            .parse()
            .context("CARESHARE_PORT must be a port number")?;

        let session_ttl_hours: i64 = var("CARESHARE_SESSION_TTL_HOURS")
            .unwrap_or_else(|| "24".into())
            .parse()
            .context("CARESHARE_SESSION_TTL_HOURS must be a whole number")?;
        if session_ttl_hours <= 0 {
            bail!("CARESHARE_SESSION_TTL_HOURS must be positive");
        }

        let cookie_secure = match var("CARESHARE_COOKIE_SECURE").as_deref() {
            None | Some("") => false,
            Some(v) => v
                .parse()
                .with_context(|| format!("CARESHARE_COOKIE_SECURE must be true or false, got '{}'", v))?,
        };

        Ok(Self {
            db_path: var("CARESHARE_DB_PATH")
                .unwrap_or_else(|| "careshare.db".into())
                .into(),
            host: var("CARESHARE_HOST").unwrap_or_else(|| "0.0.0.0".into()),
            port,
            session_secret,
            session_ttl_hours,
            cookie_secure,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    const SECRET: &str = "0123456789abcdef0123456789abcdef";

    fn load(vars: &[(&str, &str)]) -> anyhow::Result<Config> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_apply_when_only_secret_is_set() {
        let config = load(&[("CARESHARE_SESSION_SECRET", SECRET)]).unwrap();
        assert_eq!(config.db_path, PathBuf::from("careshare.db"));
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 3000);
        assert_eq!(config.session_ttl_hours, 24);
        assert!(!config.cookie_secure);
    }

    #[test]
    fn missing_short_or_placeholder_secrets_are_refused() {
        assert!(load(&[]).is_err());
        assert!(load(&[("CARESHARE_SESSION_SECRET", "dev-secret-change-me")]).is_err());
        assert!(load(&[("CARESHARE_SESSION_SECRET", "short")]).is_err());
    }

    #[test]
    fn overrides_are_parsed() {
        let config = load(&[
            ("CARESHARE_SESSION_SECRET", SECRET),
            ("CARESHARE_PORT", "8080"),
            ("CARESHARE_SESSION_TTL_HOURS", "2"),
            ("CARESHARE_COOKIE_SECURE", "true"),
            ("CARESHARE_DB_PATH", "/var/lib/careshare/app.db"),
        ])
        .unwrap();
        assert_eq!(config.port, 8080);
        assert_eq!(config.session_ttl_hours, 2);
        assert!(config.cookie_secure);
        assert_eq!(config.db_path, PathBuf::from("/var/lib/careshare/app.db"));
    }

    #[test]
    fn malformed_numbers_are_errors() {
        assert!(load(&[("CARESHARE_SESSION_SECRET", SECRET), ("CARESHARE_PORT", "http")]).is_err());
        assert!(load(&[("CARESHARE_SESSION_SECRET", SECRET), ("CARESHARE_SESSION_TTL_HOURS", "0")]).is_err());
    }
}
