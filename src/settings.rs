use config::{builder::DefaultState, Config, ConfigBuilder, ConfigError, Environment, File};
use serde::Deserialize;

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";
pub const DEFAULT_COMPARE_SERVICE_URL: &str = "http://localhost:4567";
pub const DEFAULT_SESSION_TTL_MINUTES: i64 = 60;
pub const DEFAULT_REQUEST_BODY_LIMIT: usize = 2 * 1024 * 1024;

/// Server settings, layered as built-in defaults, then an optional
/// `console.{toml,yaml,json}` file, then `CONSOLE_*` environment variables.
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub bind_addr: String,
    pub compare_service_url: String,
    pub session_ttl_minutes: i64,
    pub request_body_limit: usize,
}

impl Settings {
    pub fn load() -> Result<Self, ConfigError> {
        Self::builder()?
            .add_source(File::with_name("console").required(false))
            .add_source(Environment::with_prefix("CONSOLE"))
            .build()?
            .try_deserialize()
    }

    /// Defaults only; callers layer their own sources on top.
    pub fn builder() -> Result<ConfigBuilder<DefaultState>, ConfigError> {
        Config::builder()
            .set_default("bind_addr", DEFAULT_BIND_ADDR)?
            .set_default("compare_service_url", DEFAULT_COMPARE_SERVICE_URL)?
            .set_default("session_ttl_minutes", DEFAULT_SESSION_TTL_MINUTES)?
            .set_default("request_body_limit", DEFAULT_REQUEST_BODY_LIMIT as i64)
    }

    pub fn session_ttl(&self) -> chrono::Duration {
        chrono::Duration::minutes(self.session_ttl_minutes.max(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use config::FileFormat;

    #[test]
    fn test_defaults() {
        let settings: Settings = Settings::builder()
            .unwrap()
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();

        assert_eq!(settings.bind_addr, "0.0.0.0:3000");
        assert_eq!(settings.compare_service_url, "http://localhost:4567");
        assert_eq!(settings.session_ttl(), chrono::Duration::minutes(60));
        assert_eq!(settings.request_body_limit, 2 * 1024 * 1024);
    }

    #[test]
    fn test_file_overrides_defaults() {
        let settings: Settings = Settings::builder()
            .unwrap()
            .add_source(File::from_str(
                "compare_service_url = \"http://compare.internal:8080\"\nsession_ttl_minutes = 5",
                FileFormat::Toml,
            ))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();

        assert_eq!(settings.compare_service_url, "http://compare.internal:8080");
        assert_eq!(settings.session_ttl_minutes, 5);
        assert_eq!(settings.bind_addr, DEFAULT_BIND_ADDR);
    }

    #[test]
    fn test_ttl_never_below_one_minute() {
        let settings = Settings {
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
            compare_service_url: DEFAULT_COMPARE_SERVICE_URL.to_string(),
            session_ttl_minutes: 0,
            request_body_limit: DEFAULT_REQUEST_BODY_LIMIT,
        };
        assert_eq!(settings.session_ttl(), chrono::Duration::minutes(1));
    }
}
