use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::debug;

const DEFAULT_CONFIG_FILES: &[&str] = &[
    "homeboy.toml",
    "config/homeboy.toml",
    "crates/config/homeboy.toml",
    "../homeboy.toml",
    "../config/homeboy.toml",
    "../crates/config/homeboy.toml",
];

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    pub http: HttpConfig,
    pub platform: PlatformConfig,
    pub auth: AuthConfig,
    pub dashboard: DashboardConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    pub address: String,
    pub port: u16,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            address: "127.0.0.1".to_string(),
            port: 8080,
        }
    }
}

/// Endpoints and credentials for the managed backend platform that holds
/// the document collections, the user directory, and the push gateway.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlatformConfig {
    pub project_id: String,
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "PlatformConfig::default_documents_base_url")]
    pub documents_base_url: String,
    #[serde(default = "PlatformConfig::default_identity_base_url")]
    pub identity_base_url: String,
    #[serde(default = "PlatformConfig::default_push_base_url")]
    pub push_base_url: String,
    #[serde(default = "PlatformConfig::default_request_timeout")]
    pub request_timeout_seconds: u64,
}

impl PlatformConfig {
    fn default_documents_base_url() -> String {
        "https://documents.homeboy-platform.dev".to_string()
    }

    fn default_identity_base_url() -> String {
        "https://identity.homeboy-platform.dev".to_string()
    }

    fn default_push_base_url() -> String {
        "https://push.homeboy-platform.dev".to_string()
    }

    const fn default_request_timeout() -> u64 {
        30
    }
}

impl Default for PlatformConfig {
    fn default() -> Self {
        Self {
            project_id: "homeboy-dev".to_string(),
            api_key: None,
            documents_base_url: Self::default_documents_base_url(),
            identity_base_url: Self::default_identity_base_url(),
            push_base_url: Self::default_push_base_url(),
            request_timeout_seconds: Self::default_request_timeout(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// The single email address allowed to sign in to the admin dashboard.
    #[serde(default = "AuthConfig::default_allowed_admin_email")]
    pub allowed_admin_email: String,
    #[serde(default = "AuthConfig::default_session_ttl")]
    pub session_ttl_seconds: u64,
    #[serde(default)]
    pub cookie_secure: bool,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            allowed_admin_email: Self::default_allowed_admin_email(),
            session_ttl_seconds: Self::default_session_ttl(),
            cookie_secure: false,
        }
    }
}

impl AuthConfig {
    fn default_allowed_admin_email() -> String {
        "admin@homeboy.app".to_string()
    }

    const fn default_session_ttl() -> u64 {
        86_400
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardConfig {
    /// Bursts of writes within this window collapse into one stats
    /// recomputation.
    #[serde(default = "DashboardConfig::default_refresh_debounce_ms")]
    pub refresh_debounce_ms: u64,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            refresh_debounce_ms: Self::default_refresh_debounce_ms(),
        }
    }
}

impl DashboardConfig {
    const fn default_refresh_debounce_ms() -> u64 {
        2_000
    }
}

/// Load the application configuration by combining defaults, files, and environment overrides.
///
/// ```
/// use homeboy_config::load;
///
/// std::env::remove_var("HOMEBOY_CONFIG");
///
/// let config = load().expect("configuration should load with defaults");
/// assert!(!config.http.address.is_empty());
/// ```
pub fn load() -> anyhow::Result<AppConfig> {
    let defaults = AppConfig::default();

    let session_ttl = defaults.auth.session_ttl_seconds;
    let session_ttl_i64 = if session_ttl > i64::MAX as u64 {
        i64::MAX
    } else {
        session_ttl as i64
    };

    let mut builder = config::Config::builder();
    builder = builder
        .set_default("http.address", defaults.http.address.clone())
        .unwrap()
        .set_default("http.port", i64::from(defaults.http.port))
        .unwrap()
        .set_default("platform.project_id", defaults.platform.project_id.clone())
        .unwrap()
        .set_default(
            "platform.documents_base_url",
            defaults.platform.documents_base_url.clone(),
        )
        .unwrap()
        .set_default(
            "platform.identity_base_url",
            defaults.platform.identity_base_url.clone(),
        )
        .unwrap()
        .set_default(
            "platform.push_base_url",
            defaults.platform.push_base_url.clone(),
        )
        .unwrap()
        .set_default(
            "platform.request_timeout_seconds",
            i64::try_from(defaults.platform.request_timeout_seconds).unwrap_or(i64::MAX),
        )
        .unwrap()
        .set_default(
            "auth.allowed_admin_email",
            defaults.auth.allowed_admin_email.clone(),
        )
        .unwrap()
        .set_default("auth.session_ttl_seconds", session_ttl_i64)
        .unwrap()
        .set_default("auth.cookie_secure", defaults.auth.cookie_secure)
        .unwrap()
        .set_default(
            "dashboard.refresh_debounce_ms",
            i64::try_from(defaults.dashboard.refresh_debounce_ms).unwrap_or(i64::MAX),
        )
        .unwrap();

    let environment_overrides = config::Environment::with_prefix("HOMEBOY").separator("__");

    let mut config_file_attached = false;

    if let Ok(path) = std::env::var("HOMEBOY_CONFIG") {
        builder = builder.add_source(config::File::from(PathBuf::from(&path)));
        config_file_attached = true;
        debug!(path, "loading configuration via HOMEBOY_CONFIG");
    } else if let Ok(cwd) = std::env::current_dir() {
        let fallback = DEFAULT_CONFIG_FILES
            .iter()
            .map(|candidate| cwd.join(candidate))
            .find(|path| path.exists());

        if let Some(path) = fallback {
            debug!(path = %path.display(), "loading configuration file");
            builder = builder.add_source(config::File::from(path));
            config_file_attached = true;
        }
    }

    if !config_file_attached {
        debug!("no configuration file found, relying on defaults and environment overrides");
    }

    builder = builder.add_source(environment_overrides);

    let cfg = builder.build().context("unable to build configuration")?;

    let mut config = cfg
        .try_deserialize::<AppConfig>()
        .context("invalid configuration")?;

    if config.auth.session_ttl_seconds > i64::MAX as u64 {
        config.auth.session_ttl_seconds = i64::MAX as u64;
    }

    debug!(?config, "loaded backend configuration");
    Ok(config)
}
