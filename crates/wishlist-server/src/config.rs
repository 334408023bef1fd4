use std::path::PathBuf;

use url::Url;
use wishlist_backend::SupabaseConfig;

/// Local token secret used when none is configured. Fine for development only.
pub const DEV_JWT_SECRET: &str = "dev-secret-change-me";

const PLACEHOLDER_SECRETS: &[&str] = &["change-me-to-a-random-string", DEV_JWT_SECRET];

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{var} must be a port number, got {value:?}")]
    InvalidPort { var: &'static str, value: String },

    #[error("{var} must be true or false, got {value:?}")]
    InvalidBool { var: &'static str, value: String },

    #[error("{var} is not a valid URL: {source}")]
    InvalidUrl {
        var: &'static str,
        #[source]
        source: url::ParseError,
    },

    #[error("SUPABASE_URL and SUPABASE_ANON_KEY must be set together")]
    IncompleteSupabase,
}

#[derive(Debug)]
pub enum BackendConfig {
    Supabase(SupabaseConfig),
    Local { db_path: PathBuf, jwt_secret: String },
}

#[derive(Debug)]
pub struct Config {
    pub host: String,
    pub port: u16,
    /// Base of shareable links and confirmation redirects.
    pub site_url: String,
    pub secure_cookies: bool,
    pub backend: BackendConfig,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Build the configuration from a variable lookup. Blank values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |var: &str| {
            lookup(var)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let host = get("WISHLIST_HOST").unwrap_or_else(|| "0.0.0.0".into());
        let port = match get("WISHLIST_PORT") {
            Some(value) => value.parse().map_err(|_| ConfigError::InvalidPort {
                var: "WISHLIST_PORT",
                value,
            })?,
            None => 3000,
        };

        let site_url = get("WISHLIST_SITE_URL").unwrap_or_else(|| format!("http://localhost:{port}"));
        Url::parse(&site_url).map_err(|source| ConfigError::InvalidUrl {
            var: "WISHLIST_SITE_URL",
            source,
        })?;

        let secure_cookies = match get("WISHLIST_SECURE_COOKIES") {
            Some(value) => parse_bool("WISHLIST_SECURE_COOKIES", value)?,
            None => false,
        };

        let backend = match (get("SUPABASE_URL"), get("SUPABASE_ANON_KEY")) {
            (Some(url), Some(anon_key)) => BackendConfig::Supabase(SupabaseConfig {
                url: Url::parse(&url).map_err(|source| ConfigError::InvalidUrl {
                    var: "SUPABASE_URL",
                    source,
                })?,
                anon_key,
                service_role_key: get("SUPABASE_SERVICE_ROLE_KEY"),
            }),
            (None, None) => BackendConfig::Local {
                db_path: get("WISHLIST_DB_PATH")
                    .unwrap_or_else(|| "wishlist.db".into())
                    .into(),
                jwt_secret: get("WISHLIST_JWT_SECRET").unwrap_or_else(|| DEV_JWT_SECRET.into()),
            },
            _ => return Err(ConfigError::IncompleteSupabase),
        };

        Ok(Self {
            host,
            port,
            site_url: site_url.trim_end_matches('/').to_string(),
            secure_cookies,
            backend,
        })
    }

    /// The local backend would sign tokens with a well-known secret.
    pub fn uses_placeholder_secret(&self) -> bool {
        match &self.backend {
            BackendConfig::Local { jwt_secret, .. } => PLACEHOLDER_SECRETS.contains(&jwt_secret.as_str()),
            BackendConfig::Supabase(_) => false,
        }
    }
}

fn parse_bool(var: &'static str, value: String) -> Result<bool, ConfigError> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidBool { var, value }),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use pretty_assertions::assert_eq;

    fn parse(vars: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|var| vars.get(var).cloned())
    }

    #[test]
    fn defaults_to_local_backend() {
        let config = parse(&[]).unwrap();
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 3000);
        assert_eq!(config.site_url, "http://localhost:3000");
        assert!(!config.secure_cookies);
        assert!(config.uses_placeholder_secret());
        match config.backend {
            BackendConfig::Local { db_path, jwt_secret } => {
                assert_eq!(db_path, PathBuf::from("wishlist.db"));
                assert_eq!(jwt_secret, DEV_JWT_SECRET);
            }
            other => panic!("expected local backend, got {other:?}"),
        }
    }

    #[test]
    fn site_url_follows_port_and_drops_trailing_slash() {
        assert_eq!(parse(&[("WISHLIST_PORT", "8080")]).unwrap().site_url, "http://localhost:8080");
        assert_eq!(
            parse(&[("WISHLIST_SITE_URL", "https://gifts.example/")]).unwrap().site_url,
            "https://gifts.example"
        );
    }

    #[test]
    fn hosted_backend_needs_url_and_key() {
        let config = parse(&[
            ("SUPABASE_URL", "https://abc.supabase.co"),
            ("SUPABASE_ANON_KEY", "anon"),
            ("SUPABASE_SERVICE_ROLE_KEY", " "),
            ("WISHLIST_SECURE_COOKIES", "TRUE"),
        ])
        .unwrap();
        assert!(config.secure_cookies);
        assert!(!config.uses_placeholder_secret());
        match config.backend {
            BackendConfig::Supabase(supabase) => {
                assert_eq!(supabase.url.as_str(), "https://abc.supabase.co/");
                assert_eq!(supabase.service_role_key, None);
            }
            other => panic!("expected hosted backend, got {other:?}"),
        }

        assert!(matches!(
            parse(&[("SUPABASE_URL", "https://abc.supabase.co")]),
            Err(ConfigError::IncompleteSupabase)
        ));
    }

    #[test]
    fn invalid_values_are_rejected() {
        assert!(matches!(
            parse(&[("WISHLIST_PORT", "eighty")]),
            Err(ConfigError::InvalidPort { .. })
        ));
        assert!(matches!(
            parse(&[("WISHLIST_SECURE_COOKIES", "maybe")]),
            Err(ConfigError::InvalidBool { .. })
        ));
        assert!(matches!(
            parse(&[("SUPABASE_URL", "not a url"), ("SUPABASE_ANON_KEY", "anon")]),
            Err(ConfigError::InvalidUrl { var: "SUPABASE_URL", .. })
        ));
    }

    #[test]
    fn custom_secret_is_not_a_placeholder() {
        let config = parse(&[("WISHLIST_JWT_SECRET", "s3cr3t-from-vault")]).unwrap();
        assert!(!config.uses_placeholder_secret());
    }
}
