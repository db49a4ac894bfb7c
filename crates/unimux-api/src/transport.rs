// Per-target transport configuration for building reqwest::Client instances.
//
// Each target gets its own client: TLS relaxation, custom roots, cookies and
// auth headers never leak from one target's client into another's.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use reqwest::cookie::Jar;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use tracing::warn;

use crate::auth::TargetAuth;
use crate::error::Error;
use crate::target::Target;

/// TLS verification mode for one target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TlsMode {
    /// Use the bundled root store.
    System,
    /// Additionally trust the CA certificate in the given PEM file.
    CustomCa(PathBuf),
    /// Accept any certificate (self-signed controllers).
    DangerAcceptInvalid,
}

/// Transport settings for a single target's HTTP client.
#[derive(Debug, Clone)]
pub struct TransportConfig {
    pub tls: TlsMode,
    pub timeout: Duration,
    /// Present only for session targets. API-key targets never store or send cookies.
    pub cookie_jar: Option<Arc<Jar>>,
    /// Sent on every request (the API key header, when configured).
    pub default_headers: HeaderMap,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            tls: TlsMode::System,
            timeout: Target::DEFAULT_TIMEOUT,
            cookie_jar: None,
            default_headers: HeaderMap::new(),
        }
    }
}

impl TransportConfig {
    /// Derive the transport for a target from its descriptor.
    pub fn for_target(target: &Target) -> Result<Self, Error> {
        let tls = if !target.verify_ssl {
            warn!(target = %target.id, "TLS verification disabled for target");
            TlsMode::DangerAcceptInvalid
        } else if let Some(ref path) = target.ca_bundle {
            TlsMode::CustomCa(path.clone())
        } else {
            TlsMode::System
        };

        let mut config = Self {
            tls,
            timeout: target.timeout,
            ..Self::default()
        };

        match &target.auth {
            TargetAuth::Credentials { .. } => config = config.with_cookie_jar(),
            TargetAuth::ApiKey { .. } => {
                if let Some((name, value)) = target.auth.api_key_header() {
                    let name = HeaderName::from_bytes(name.as_bytes())
                        .map_err(|e| Error::InvalidApiKeyHeader(e.to_string()))?;
                    let mut value = HeaderValue::from_str(&value)
                        .map_err(|e| Error::InvalidApiKeyHeader(e.to_string()))?;
                    value.set_sensitive(true);
                    config.default_headers.insert(name, value);
                }
            }
        }

        Ok(config)
    }

    /// Build a `reqwest::Client` from this config.
    pub fn build_client(&self) -> Result<reqwest::Client, Error> {
        let mut builder = reqwest::Client::builder()
            .timeout(self.timeout)
            .user_agent(concat!("unimux/", env!("CARGO_PKG_VERSION")))
            .default_headers(self.default_headers.clone());

        match &self.tls {
            TlsMode::System => {}
            TlsMode::CustomCa(path) => {
                let cert_pem = std::fs::read(path)
                    .map_err(|e| Error::Tls(format!("failed to read CA bundle: {e}")))?;
                let cert = reqwest::Certificate::from_pem(&cert_pem)
                    .map_err(|e| Error::Tls(format!("invalid CA bundle: {e}")))?;
                builder = builder.add_root_certificate(cert);
            }
            TlsMode::DangerAcceptInvalid => {
                builder = builder.danger_accept_invalid_certs(true);
            }
        }

        if let Some(ref jar) = self.cookie_jar {
            builder = builder.cookie_provider(Arc::clone(jar));
        }

        builder
            .build()
            .map_err(|e| Error::Tls(format!("failed to build HTTP client: {e}")))
    }

    /// Create a config with a fresh cookie jar (for session auth).
    pub fn with_cookie_jar(mut self) -> Self {
        self.cookie_jar = Some(Arc::new(Jar::default()));
        self
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use secrecy::SecretString;

    use super::*;
    use crate::auth::ControllerFlavor;

    fn target(auth: TargetAuth) -> Target {
        Target::new(
            "lab",
            "https://10.0.0.1".parse().unwrap(),
            ControllerFlavor::UnifiOs,
            "default",
            auth,
        )
    }

    #[test]
    fn session_target_gets_cookie_jar_and_no_headers() {
        let cfg = TransportConfig::for_target(&target(TargetAuth::Credentials {
            username: "admin".into(),
            password: SecretString::from("pw".to_owned()),
        }))
        .unwrap();
        assert!(cfg.cookie_jar.is_some());
        assert!(cfg.default_headers.is_empty());
        assert_eq!(cfg.tls, TlsMode::System);
    }

    #[test]
    fn api_key_target_gets_sensitive_header_and_no_jar() {
        let cfg = TransportConfig::for_target(&target(TargetAuth::ApiKey {
            key: SecretString::from("abc".to_owned()),
            header_name: Some("X-API-KEY".into()),
            scheme: None,
        }))
        .unwrap();
        assert!(cfg.cookie_jar.is_none());
        let value = cfg.default_headers.get("x-api-key").unwrap();
        assert!(value.is_sensitive());
        assert_eq!(value.to_str().unwrap(), "abc");
    }

    #[test]
    fn tls_mode_is_per_target() {
        let auth = TargetAuth::ApiKey {
            key: SecretString::from("abc".to_owned()),
            header_name: None,
            scheme: None,
        };
        let relaxed = target(auth.clone()).with_verify_ssl(false);
        let strict = target(auth).with_ca_bundle("/etc/ca.pem".into());
        assert_eq!(
            TransportConfig::for_target(&relaxed).unwrap().tls,
            TlsMode::DangerAcceptInvalid
        );
        assert_eq!(
            TransportConfig::for_target(&strict).unwrap().tls,
            TlsMode::CustomCa("/etc/ca.pem".into())
        );
    }

    #[test]
    fn missing_ca_bundle_is_a_tls_error() {
        let cfg = TransportConfig {
            tls: TlsMode::CustomCa("/nonexistent/unimux-ca.pem".into()),
            ..TransportConfig::default()
        };
        assert!(matches!(cfg.build_client(), Err(Error::Tls(_))));
    }
}
