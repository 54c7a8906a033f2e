use config::{Config, ConfigError, Environment, File};
use dotenv::dotenv;
use serde::Deserialize;
use std::{env, fmt, str::FromStr};

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum AppEnvironment {
    Development,
    Production,
    Testing,
}

impl FromStr for AppEnvironment {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "development" => Ok(AppEnvironment::Development),
            "production" => Ok(AppEnvironment::Production),
            "testing" => Ok(AppEnvironment::Testing),
            _ => Err(ConfigError::Message(format!("Invalid environment: {}", s))),
        }
    }
}

#[derive(Deserialize, Clone)]
#[serde(rename_all = "snake_case")]
pub struct AppConfig {
    #[serde(default = "default_env")]
    pub env: AppEnvironment,

    #[serde(default = "default_name")]
    pub name: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_worker_count")]
    pub worker_count: usize,

    #[serde(default = "default_cors_origins")]
    pub cors_allowed_origins: Vec<String>,

    /// Server-held Web3Forms access key, never exposed to callers.
    #[serde(default)]
    pub web3forms_access_key: Option<String>,

    /// Shared secret guarding the studio route (strategy 1).
    #[serde(default)]
    pub studio_password: Option<String>,

    /// Comma-separated IP allow-list for the studio route (strategy 2).
    #[serde(default)]
    pub studio_allowed_ips: Option<String>,

    /// Block the studio route entirely in production (strategy 3).
    #[serde(default)]
    pub studio_dev_only: bool,

    /// Hosted CMS editor the studio shell points at, if any.
    #[serde(default)]
    pub studio_editor_url: Option<String>,

    #[serde(default)]
    pub sanity_project_id: String,

    #[serde(default = "default_sanity_dataset")]
    pub sanity_dataset: String,

    #[serde(default = "default_sanity_api_version")]
    pub sanity_api_version: String,

    #[serde(default = "default_true")]
    pub sanity_use_cdn: bool,
}

fn default_env() -> AppEnvironment {
    AppEnvironment::Development
}
fn default_name() -> String {
    "Portfolio-Gateway".to_string()
}
fn default_port() -> u16 {
    8080
}
fn default_host() -> String {
    "127.0.0.1".to_string()
}
fn default_worker_count() -> usize {
    num_cpus::get()
}
fn default_cors_origins() -> Vec<String> {
    vec!["*".to_string()]
}
fn default_sanity_dataset() -> String {
    "production".to_string()
}
fn default_sanity_api_version() -> String {
    "2024-01-01".to_string()
}
fn default_true() -> bool {
    true
}

impl AppConfig {
    pub fn new() -> Result<Self, ConfigError> {
        dotenv().ok();

        let raw_env = env::var("APP_ENV").unwrap_or_else(|_| "development".into());
        let env_name = AppEnvironment::from_str(&raw_env)
            .map_err(|_| ConfigError::Message(format!("Invalid APP_ENV value: {}", raw_env)))?;

        let builder = Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(
                File::with_name(&format!("config/{}", env_name.to_string().to_lowercase()))
                    .required(false),
            )
            .add_source(Environment::with_prefix("APP").separator("_").ignore_empty(true));

        let mut config: Self = builder.build()?.try_deserialize()?;

        config.env = env_name;

        // The deployment-facing variables keep their historical names and win
        // over anything the config files declare.
        config.web3forms_access_key =
            fill_from_env(config.web3forms_access_key, "WEB3FORMS_ACCESS_KEY");
        config.studio_password = fill_from_env(config.studio_password, "STUDIO_PASSWORD");
        config.studio_allowed_ips = fill_from_env(config.studio_allowed_ips, "STUDIO_ALLOWED_IPS");
        if let Ok(flag) = env::var("STUDIO_DEV_ONLY") {
            config.studio_dev_only = flag.eq_ignore_ascii_case("true");
        }

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let mut errors = Vec::new();

        if self
            .studio_password
            .as_deref()
            .is_some_and(|p| p.trim().is_empty())
        {
            errors.push("STUDIO_PASSWORD must not be blank when set");
        }
        if self
            .web3forms_access_key
            .as_deref()
            .is_some_and(|k| k.trim().is_empty())
        {
            errors.push("WEB3FORMS_ACCESS_KEY must not be blank when set");
        }
        if self.is_production() && self.cors_origins().iter().any(|o| o == "*") {
            errors.push("Wildcard CORS (*) is not allowed in production");
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Message(errors.join(", ")))
        }
    }

    pub fn is_production(&self) -> bool {
        self.env == AppEnvironment::Production
    }

    pub fn cors_origins(&self) -> Vec<String> {
        self.cors_allowed_origins
            .iter()
            .flat_map(|origin| origin.split(','))
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect()
    }

    /// The studio IP allow-list, split and trimmed. `None` when unset or the
    /// raw value contains no usable entries.
    pub fn studio_allowed_ips(&self) -> Option<Vec<String>> {
        let ips: Vec<String> = self
            .studio_allowed_ips
            .as_deref()?
            .split(',')
            .map(|ip| ip.trim().to_string())
            .filter(|ip| !ip.is_empty())
            .collect();

        if ips.is_empty() { None } else { Some(ips) }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            env: default_env(),
            name: default_name(),
            port: default_port(),
            host: default_host(),
            worker_count: default_worker_count(),
            cors_allowed_origins: default_cors_origins(),
            web3forms_access_key: None,
            studio_password: None,
            studio_allowed_ips: None,
            studio_dev_only: false,
            studio_editor_url: None,
            sanity_project_id: String::new(),
            sanity_dataset: default_sanity_dataset(),
            sanity_api_version: default_sanity_api_version(),
            sanity_use_cdn: true,
        }
    }
}

fn fill_from_env(current: Option<String>, env_key: &str) -> Option<String> {
    env::var(env_key).ok().filter(|v| !v.is_empty()).or(current)
}

impl fmt::Display for AppEnvironment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            AppEnvironment::Development => "development",
            AppEnvironment::Production => "production",
            AppEnvironment::Testing => "testing",
        };
        write!(f, "{s}")
    }
}

trait Redact {
    fn redact(&self) -> &str;
}

impl Redact for Option<String> {
    fn redact(&self) -> &str {
        match self {
            None => "[UNSET]",
            Some(s) if s.is_empty() => "[EMPTY]",
            Some(_) => "[REDACTED]",
        }
    }
}

impl fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("name", &self.name)
            .field("port", &self.port)
            .field("host", &self.host)
            .field("worker_count", &self.worker_count)
            .field("cors_allowed_origins", &self.cors_allowed_origins)
            .field("web3forms_access_key", &self.web3forms_access_key.redact())
            .field("studio_password", &self.studio_password.redact())
            .field("studio_allowed_ips", &self.studio_allowed_ips)
            .field("studio_dev_only", &self.studio_dev_only)
            .field("studio_editor_url", &self.studio_editor_url)
            .field("sanity_project_id", &self.sanity_project_id)
            .field("sanity_dataset", &self.sanity_dataset)
            .field("sanity_api_version", &self.sanity_api_version)
            .field("sanity_use_cdn", &self.sanity_use_cdn)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allowed_ips_are_split_and_trimmed() {
        let config = AppConfig {
            studio_allowed_ips: Some(" 1.2.3.4 ,5.6.7.8,, ".to_string()),
            ..Default::default()
        };
        assert_eq!(
            config.studio_allowed_ips(),
            Some(vec!["1.2.3.4".to_string(), "5.6.7.8".to_string()])
        );
    }

    #[test]
    fn blank_allow_list_counts_as_unconfigured() {
        let config = AppConfig {
            studio_allowed_ips: Some(" , ".to_string()),
            ..Default::default()
        };
        assert_eq!(config.studio_allowed_ips(), None);
    }

    #[test]
    fn secrets_are_redacted_in_debug_output() {
        let config = AppConfig {
            studio_password: Some("hunter2".to_string()),
            ..Default::default()
        };
        let debug = format!("{config:?}");
        assert!(!debug.contains("hunter2"));
        assert!(debug.contains("[REDACTED]"));
    }

    #[test]
    fn wildcard_cors_rejected_in_production() {
        let config = AppConfig {
            env: AppEnvironment::Production,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
