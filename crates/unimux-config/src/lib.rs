//! Target configuration for unimux.
//!
//! Layers a TOML file and the `UNIFI_TARGETS` JSON environment variable
//! into raw target entries, then validates them into the ordered, non-empty
//! list of `unimux_api::Target` descriptors the server runs with.

use std::collections::HashSet;
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Format, Serialized, Toml},
};
use secrecy::SecretString;
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;
use url::Url;

use unimux_api::{ControllerFlavor, Target, TargetAuth};

/// Environment variable naming the config file.
pub const CONFIG_ENV: &str = "UNIMUX_CONFIG";
/// Environment variable holding a JSON array of targets.
pub const TARGETS_ENV: &str = "UNIFI_TARGETS";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("no targets configured (set {TARGETS_ENV} or add [[targets]] to the config file)")]
    NoTargets,

    #[error("config file not found: {}", .0.display())]
    MissingFile(PathBuf),

    #[error("{TARGETS_ENV} is not valid JSON: {0}")]
    TargetsJson(#[from] serde_json::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

fn invalid(field: impl Into<String>, reason: impl Into<String>) -> ConfigError {
    ConfigError::Validation {
        field: field.into(),
        reason: reason.into(),
    }
}

// ── Raw config structs ──────────────────────────────────────────────

/// Top-level configuration file.
#[derive(Debug, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub targets: Vec<RawTarget>,
}

/// One target as written by the operator, before validation.
#[derive(Debug, Clone, Deserialize)]
pub struct RawTarget {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub base_url: String,
    pub controller_type: ControllerFlavor,
    #[serde(default)]
    pub default_site: String,
    pub auth: RawAuth,
    pub verify_ssl: Option<bool>,
    pub ca_bundle_path: Option<PathBuf>,
    pub timeout_ms: Option<u64>,
    pub rate_limit_per_sec: Option<f64>,
}

/// Auth block. Exactly one of `username`/`password` or `apiKey` must be set.
#[derive(Clone, Default, Deserialize)]
pub struct RawAuth {
    pub username: Option<String>,
    pub password: Option<String>,
    #[serde(rename = "apiKey", alias = "api_key")]
    pub api_key: Option<String>,
    #[serde(rename = "headerName", alias = "header_name")]
    pub header_name: Option<String>,
    pub scheme: Option<String>,
}

impl fmt::Debug for RawAuth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let redact = |s: &Option<String>| s.as_ref().map(|_| "[REDACTED]");
        f.debug_struct("RawAuth")
            .field("username", &self.username)
            .field("password", &redact(&self.password))
            .field("api_key", &redact(&self.api_key))
            .field("header_name", &self.header_name)
            .field("scheme", &self.scheme)
            .finish()
    }
}

// ── Config file path ────────────────────────────────────────────────

/// Platform config file path, e.g. `~/.config/unimux/config.toml`.
pub fn config_path() -> Option<PathBuf> {
    ProjectDirs::from("", "", "unimux").map(|dirs| dirs.config_dir().join("config.toml"))
}

// ── Config loading ──────────────────────────────────────────────────

/// Load from the process environment.
///
/// File: `explicit`, else `$UNIMUX_CONFIG`, else the platform path (which
/// may be absent). `$UNIFI_TARGETS`, when set, replaces the file's targets.
pub fn load_config(explicit: Option<&Path>) -> Result<Config, ConfigError> {
    let env_path = std::env::var_os(CONFIG_ENV).map(PathBuf::from);
    let targets_json = std::env::var(TARGETS_ENV).ok();

    match explicit.map(Path::to_path_buf).or(env_path) {
        Some(path) => load_config_from(Some(&path), targets_json.as_deref()),
        None => {
            let fallback = config_path().filter(|p| p.exists());
            load_config_from(fallback.as_deref(), targets_json.as_deref())
        }
    }
}

/// Load from an optional file plus an optional targets JSON document.
/// A file that is named but missing is an error.
pub fn load_config_from(
    path: Option<&Path>,
    targets_json: Option<&str>,
) -> Result<Config, ConfigError> {
    let mut figment = Figment::new();

    if let Some(path) = path {
        if !path.exists() {
            return Err(ConfigError::MissingFile(path.to_path_buf()));
        }
        debug!(path = %path.display(), "loading config file");
        figment = figment.merge(Toml::file(path));
    }

    if let Some(json) = targets_json.map(str::trim).filter(|j| !j.is_empty()) {
        let targets: serde_json::Value = serde_json::from_str(json)?;
        if !targets.is_array() {
            return Err(invalid(TARGETS_ENV, "expected a JSON array of targets"));
        }
        debug!("targets supplied through {TARGETS_ENV}");
        figment = figment.merge(Serialized::default("targets", targets));
    }

    Ok(figment.extract()?)
}

/// Load and validate in one step.
pub fn load_targets(explicit: Option<&Path>) -> Result<Vec<Target>, ConfigError> {
    load_config(explicit)?.into_targets()
}

// ── Validation ──────────────────────────────────────────────────────

impl Config {
    /// Validate every target, preserving order.
    pub fn into_targets(self) -> Result<Vec<Target>, ConfigError> {
        if self.targets.is_empty() {
            return Err(ConfigError::NoTargets);
        }
        let mut seen = HashSet::new();
        self.targets
            .into_iter()
            .enumerate()
            .map(|(i, raw)| {
                let target = raw.validate(i)?;
                if !seen.insert(target.id.clone()) {
                    return Err(invalid(
                        format!("targets[{i}].id"),
                        format!("duplicate id '{}'", target.id),
                    ));
                }
                Ok(target)
            })
            .collect()
    }
}

impl RawTarget {
    /// Validate and apply defaults (`verify_ssl = true`, 15s timeout, 5 req/s).
    pub fn validate(self, index: usize) -> Result<Target, ConfigError> {
        let field = |name: &str| format!("targets[{index}].{name}");

        let id = self.id.trim().to_owned();
        if id.is_empty() {
            return Err(invalid(field("id"), "must not be empty"));
        }

        let base_url = Url::parse(&self.base_url)
            .map_err(|e| invalid(field("base_url"), format!("'{}': {e}", self.base_url)))?;
        if !matches!(base_url.scheme(), "http" | "https") {
            return Err(invalid(field("base_url"), "scheme must be http or https"));
        }

        if self.default_site.trim().is_empty() {
            return Err(invalid(field("default_site"), "must not be empty"));
        }

        let auth = self.auth.validate(&field("auth"))?;

        let mut target = Target::new(id, base_url, self.controller_type, self.default_site, auth)
            .with_verify_ssl(self.verify_ssl.unwrap_or(true));

        if let Some(ms) = self.timeout_ms {
            if ms == 0 {
                return Err(invalid(field("timeout_ms"), "must be greater than zero"));
            }
            target = target.with_timeout(Duration::from_millis(ms));
        }

        if let Some(rate) = self.rate_limit_per_sec {
            if !rate.is_finite() || rate <= 0.0 {
                return Err(invalid(
                    field("rate_limit_per_sec"),
                    "must be a positive number",
                ));
            }
            target = target.with_rate_limit(rate);
        }

        if let Some(path) = self.ca_bundle_path {
            target = target.with_ca_bundle(path);
        }

        Ok(target)
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

impl RawAuth {
    fn validate(self, field: &str) -> Result<TargetAuth, ConfigError> {
        let has_login = self.username.is_some() || self.password.is_some();
        let api_key = non_empty(self.api_key);

        match (has_login, api_key) {
            (true, Some(_)) => Err(invalid(
                field,
                "set either username/password or apiKey, not both",
            )),
            (false, Some(key)) => Ok(TargetAuth::ApiKey {
                key: SecretString::from(key),
                header_name: non_empty(self.header_name),
                scheme: self.scheme,
            }),
            (true, None) => {
                let username = non_empty(self.username)
                    .ok_or_else(|| invalid(format!("{field}.username"), "must not be empty"))?;
                let password = non_empty(self.password)
                    .ok_or_else(|| invalid(format!("{field}.password"), "must not be empty"))?;
                Ok(TargetAuth::Credentials {
                    username,
                    password: SecretString::from(password),
                })
            }
            (false, None) => Err(invalid(field, "requires username/password or apiKey")),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::io::Write;

    use pretty_assertions::assert_eq;
    use secrecy::ExposeSecret;

    use super::*;

    fn write_config(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    const TWO_TARGETS: &str = r#"
        [[targets]]
        id = "home"
        base_url = "https://192.168.1.1"
        controller_type = "unifi_os"
        default_site = "default"
        verify_ssl = false
        auth = { username = "admin", password = "s3cret" }

        [[targets]]
        id = "office"
        base_url = "https://unifi.example.com:8443"
        controller_type = "classic"
        default_site = "hq"
        timeout_ms = 5000
        rate_limit_per_sec = 2.5
        auth = { apiKey = "abc123", headerName = "X-API-KEY" }
    "#;

    #[test]
    fn loads_targets_from_toml_in_order() {
        let file = write_config(TWO_TARGETS);
        let targets = load_config_from(Some(file.path()), None)
            .unwrap()
            .into_targets()
            .unwrap();

        assert_eq!(targets.len(), 2);
        let home = &targets[0];
        assert_eq!(home.id, "home");
        assert_eq!(home.flavor, ControllerFlavor::UnifiOs);
        assert!(!home.verify_ssl);
        assert_eq!(home.timeout, Target::DEFAULT_TIMEOUT);
        assert!(matches!(home.auth, TargetAuth::Credentials { ref username, .. } if username == "admin"));

        let office = &targets[1];
        assert_eq!(office.default_site, "hq");
        assert!(office.verify_ssl);
        assert_eq!(office.timeout, Duration::from_millis(5000));
        assert!((office.rate_limit_per_sec - 2.5).abs() < f64::EPSILON);
        match &office.auth {
            TargetAuth::ApiKey {
                key, header_name, ..
            } => {
                assert_eq!(key.expose_secret(), "abc123");
                assert_eq!(header_name.as_deref(), Some("X-API-KEY"));
            }
            TargetAuth::Credentials { .. } => panic!("expected API key auth"),
        }
    }

    #[test]
    fn targets_json_replaces_file_targets() {
        let file = write_config(TWO_TARGETS);
        let json = r#"[{
            "id": "lab", "base_url": "https://10.0.0.1", "controller_type": "unifi_os",
            "default_site": "default", "auth": { "api_key": "k" }
        }]"#;
        let targets = load_config_from(Some(file.path()), Some(json))
            .unwrap()
            .into_targets()
            .unwrap();
        assert_eq!(targets.len(), 1);
        assert_eq!(targets[0].id, "lab");
        assert!(targets[0].uses_api_key());
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        let err = load_config_from(Some(Path::new("/nonexistent/unimux.toml")), None).unwrap_err();
        assert!(matches!(err, ConfigError::MissingFile(_)));
    }

    #[test]
    fn malformed_targets_json_is_an_error() {
        assert!(matches!(
            load_config_from(None, Some("[{")),
            Err(ConfigError::TargetsJson(_))
        ));
        assert!(matches!(
            load_config_from(None, Some(r#"{"id":"x"}"#)),
            Err(ConfigError::Validation { .. })
        ));
    }

    #[test]
    fn empty_target_list_is_rejected() {
        let config = load_config_from(None, None).unwrap();
        assert!(matches!(config.into_targets(), Err(ConfigError::NoTargets)));
    }

    fn raw(auth: RawAuth) -> RawTarget {
        RawTarget {
            id: "t".into(),
            base_url: "https://10.0.0.1".into(),
            controller_type: ControllerFlavor::Classic,
            default_site: "default".into(),
            auth,
            verify_ssl: None,
            ca_bundle_path: None,
            timeout_ms: None,
            rate_limit_per_sec: None,
        }
    }

    fn login() -> RawAuth {
        RawAuth {
            username: Some("admin".into()),
            password: Some("pw".into()),
            ..RawAuth::default()
        }
    }

    #[test]
    fn auth_must_be_exactly_one_mode() {
        let both = RawAuth {
            api_key: Some("k".into()),
            ..login()
        };
        assert!(raw(both).validate(0).is_err());
        assert!(raw(RawAuth::default()).validate(0).is_err());

        let no_password = RawAuth {
            password: Some(String::new()),
            ..login()
        };
        let err = raw(no_password).validate(0).unwrap_err();
        assert_eq!(
            err.to_string(),
            "invalid targets[0].auth.password: must not be empty"
        );
    }

    #[test]
    fn field_rules_are_enforced() {
        let mut t = raw(login());
        t.base_url = "ftp://10.0.0.1".into();
        assert!(t.validate(0).is_err());

        let mut t = raw(login());
        t.default_site = " ".into();
        assert!(t.validate(0).is_err());

        let mut t = raw(login());
        t.timeout_ms = Some(0);
        assert!(t.validate(0).is_err());

        let mut t = raw(login());
        t.rate_limit_per_sec = Some(-1.0);
        assert!(t.validate(0).is_err());

        let mut t = raw(login());
        t.id = String::new();
        assert!(t.validate(0).is_err());
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let config = Config {
            targets: vec![raw(login()), raw(login())],
        };
        let err = config.into_targets().unwrap_err();
        assert!(err.to_string().contains("duplicate id 't'"));
    }

    #[test]
    fn debug_output_redacts_secrets() {
        let auth = RawAuth {
            api_key: Some("super-secret".into()),
            ..login()
        };
        let rendered = format!("{auth:?}");
        assert!(!rendered.contains("super-secret"));
        assert!(!rendered.contains("\"pw\""));
        assert!(rendered.contains("[REDACTED]"));
    }
}
