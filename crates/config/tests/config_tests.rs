//! Tests for the `homeboy-config` loader.
//!
//! These exercise default handling, config-file discovery, and environment
//! overrides. They mutate process-wide state (env vars, cwd), so everything
//! runs under `#[serial]`.

use std::fs;
use std::path::{Path, PathBuf};

use serial_test::serial;
use tempfile::TempDir;

use homeboy_config::{load, AppConfig};

const ENV_VARS_TO_RESET: &[&str] = &[
    "HOMEBOY_CONFIG",
    "HOMEBOY__AUTH__ALLOWED_ADMIN_EMAIL",
    "HOMEBOY__AUTH__SESSION_TTL_SECONDS",
    "HOMEBOY__AUTH__COOKIE_SECURE",
    "HOMEBOY__DASHBOARD__REFRESH_DEBOUNCE_MS",
    "HOMEBOY__HTTP__ADDRESS",
    "HOMEBOY__HTTP__PORT",
    "HOMEBOY__PLATFORM__API_KEY",
    "HOMEBOY__PLATFORM__DOCUMENTS_BASE_URL",
    "HOMEBOY__PLATFORM__IDENTITY_BASE_URL",
    "HOMEBOY__PLATFORM__PROJECT_ID",
    "HOMEBOY__PLATFORM__PUSH_BASE_URL",
    "HOMEBOY__PLATFORM__REQUEST_TIMEOUT_SECONDS",
];

struct TestContext {
    vars: Vec<(String, Option<String>)>,
    original_dir: Option<PathBuf>,
}

impl TestContext {
    fn new() -> Self {
        let mut ctx = Self {
            vars: Vec::new(),
            original_dir: None,
        };
        ctx.reset_environment();
        ctx
    }

    fn reset_environment(&mut self) {
        for key in ENV_VARS_TO_RESET {
            self.remove_var(key);
        }
    }

    fn set_var(&mut self, key: &str, value: impl AsRef<str>) {
        let previous = std::env::var(key).ok();
        std::env::set_var(key, value.as_ref());
        self.vars.push((key.to_string(), previous));
    }

    fn remove_var(&mut self, key: &str) {
        let previous = std::env::var(key).ok();
        std::env::remove_var(key);
        self.vars.push((key.to_string(), previous));
    }

    fn set_current_dir(&mut self, dir: &Path) {
        if self.original_dir.is_none() {
            self.original_dir =
                Some(std::env::current_dir().expect("failed to capture current directory"));
        }
        std::env::set_current_dir(dir).expect("failed to set current directory");
    }
}

impl Drop for TestContext {
    fn drop(&mut self) {
        if let Some(original) = self.original_dir.take() {
            let _ = std::env::set_current_dir(original);
        }

        while let Some((key, value)) = self.vars.pop() {
            match value {
                Some(value) => std::env::set_var(&key, value),
                None => std::env::remove_var(&key),
            }
        }
    }
}

#[test]
#[serial]
fn load_uses_defaults_when_nothing_is_configured() {
    let temp = TempDir::new().unwrap();
    let mut ctx = TestContext::new();
    ctx.set_current_dir(temp.path());

    let config = load().expect("defaults should load");
    let defaults = AppConfig::default();

    assert_eq!(config.http.address, defaults.http.address);
    assert_eq!(config.http.port, defaults.http.port);
    assert_eq!(config.platform.project_id, defaults.platform.project_id);
    assert_eq!(
        config.auth.allowed_admin_email,
        defaults.auth.allowed_admin_email
    );
    assert_eq!(
        config.dashboard.refresh_debounce_ms,
        defaults.dashboard.refresh_debounce_ms
    );
    assert!(config.platform.api_key.is_none());
}

#[test]
#[serial]
fn load_reads_config_file_from_working_directory() {
    let temp = TempDir::new().unwrap();
    fs::write(
        temp.path().join("homeboy.toml"),
        r#"
[http]
address = "0.0.0.0"
port = 9000

[platform]
project_id = "homeboy-prod"
api_key = "secret-key"

[auth]
allowed_admin_email = "ops@homeboy.app"
"#,
    )
    .unwrap();

    let mut ctx = TestContext::new();
    ctx.set_current_dir(temp.path());

    let config = load().expect("file-backed config should load");
    assert_eq!(config.http.address, "0.0.0.0");
    assert_eq!(config.http.port, 9000);
    assert_eq!(config.platform.project_id, "homeboy-prod");
    assert_eq!(config.platform.api_key.as_deref(), Some("secret-key"));
    assert_eq!(config.auth.allowed_admin_email, "ops@homeboy.app");
}

#[test]
#[serial]
fn load_honours_explicit_config_path() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("custom.toml");
    fs::write(
        &path,
        r#"
[dashboard]
refresh_debounce_ms = 250
"#,
    )
    .unwrap();

    let work_dir = TempDir::new().unwrap();
    let mut ctx = TestContext::new();
    ctx.set_current_dir(work_dir.path());
    ctx.set_var("HOMEBOY_CONFIG", path.to_string_lossy());

    let config = load().expect("explicit config path should load");
    assert_eq!(config.dashboard.refresh_debounce_ms, 250);
}

#[test]
#[serial]
fn environment_overrides_take_precedence_over_files() {
    let temp = TempDir::new().unwrap();
    fs::write(
        temp.path().join("homeboy.toml"),
        r#"
[http]
port = 9000
"#,
    )
    .unwrap();

    let mut ctx = TestContext::new();
    ctx.set_current_dir(temp.path());
    ctx.set_var("HOMEBOY__HTTP__PORT", "9100");
    ctx.set_var("HOMEBOY__PLATFORM__PROJECT_ID", "homeboy-staging");

    let config = load().expect("env-overridden config should load");
    assert_eq!(config.http.port, 9100);
    assert_eq!(config.platform.project_id, "homeboy-staging");
}

#[test]
#[serial]
fn invalid_config_values_are_rejected() {
    let temp = TempDir::new().unwrap();
    let mut ctx = TestContext::new();
    ctx.set_current_dir(temp.path());
    ctx.set_var("HOMEBOY__HTTP__PORT", "not-a-port");

    assert!(load().is_err());
}
