use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

/// Which authentication strategy a target uses.
///
/// Marker enum (no data) -- the actual credentials live in [`TargetAuth`].
/// Useful for branching on API family without carrying secret material.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthStrategy {
    /// Cookie-based session obtained by a login POST.
    Session,
    /// Static API key header on every request (Integration API).
    ApiKey,
}

/// Credentials for one controller target. Exactly one mode per target.
#[derive(Debug, Clone)]
pub enum TargetAuth {
    /// Username/password login. The session cookie lands in the client's jar.
    Credentials {
        username: String,
        password: SecretString,
    },

    /// API key sent as a request header.
    ///
    /// `header_name` defaults to `Authorization`; `scheme` defaults to
    /// `Bearer` when the header is `Authorization` and to nothing otherwise.
    ApiKey {
        key: SecretString,
        header_name: Option<String>,
        scheme: Option<String>,
    },
}

impl TargetAuth {
    pub fn strategy(&self) -> AuthStrategy {
        match self {
            Self::Credentials { .. } => AuthStrategy::Session,
            Self::ApiKey { .. } => AuthStrategy::ApiKey,
        }
    }

    pub fn is_api_key(&self) -> bool {
        matches!(self, Self::ApiKey { .. })
    }

    /// The header name and value carrying the API key, or `None` for
    /// session targets.
    pub fn api_key_header(&self) -> Option<(String, String)> {
        let Self::ApiKey {
            key,
            header_name,
            scheme,
        } = self
        else {
            return None;
        };

        let name = header_name
            .as_deref()
            .filter(|n| !n.is_empty())
            .unwrap_or("Authorization");
        let scheme = match scheme.as_deref() {
            Some(s) if !s.is_empty() => s,
            _ if name.eq_ignore_ascii_case("authorization") => "Bearer",
            _ => "",
        };

        let value = if scheme.is_empty() {
            key.expose_secret().to_owned()
        } else {
            format!("{scheme} {}", key.expose_secret())
        };
        Some((name.to_owned(), value))
    }
}

/// The controller flavor of a target.
///
/// Determines URL prefixes and the login path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum::Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ControllerFlavor {
    /// Standalone Network Application -- no prefix.
    Classic,
    /// UniFi OS console (UDM, UCG, etc.) -- Network app behind `/proxy/network`.
    UnifiOs,
}

impl ControllerFlavor {
    /// Prefix in front of every Network application path.
    pub fn network_prefix(&self) -> &'static str {
        match self {
            Self::UnifiOs => "/proxy/network",
            Self::Classic => "",
        }
    }

    /// The login endpoint path.
    ///
    /// - UniFi OS: `/api/auth/login`
    /// - Classic: `/api/login`
    pub fn login_path(&self) -> &'static str {
        match self {
            Self::UnifiOs => "/api/auth/login",
            Self::Classic => "/api/login",
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn api_key(header_name: Option<&str>, scheme: Option<&str>) -> TargetAuth {
        TargetAuth::ApiKey {
            key: SecretString::from("k3y".to_owned()),
            header_name: header_name.map(str::to_owned),
            scheme: scheme.map(str::to_owned),
        }
    }

    #[test]
    fn default_header_is_bearer_authorization() {
        let (name, value) = api_key(None, None).api_key_header().unwrap();
        assert_eq!(name, "Authorization");
        assert_eq!(value, "Bearer k3y");
    }

    #[test]
    fn custom_header_has_no_scheme_by_default() {
        let (name, value) = api_key(Some("X-API-KEY"), None).api_key_header().unwrap();
        assert_eq!(name, "X-API-KEY");
        assert_eq!(value, "k3y");
    }

    #[test]
    fn explicit_scheme_is_used() {
        let (_, value) = api_key(Some("X-API-KEY"), Some("Token"))
            .api_key_header()
            .unwrap();
        assert_eq!(value, "Token k3y");
    }

    #[test]
    fn credentials_have_no_key_header() {
        let auth = TargetAuth::Credentials {
            username: "admin".into(),
            password: SecretString::from("pw".to_owned()),
        };
        assert!(auth.api_key_header().is_none());
        assert_eq!(auth.strategy(), AuthStrategy::Session);
    }

    #[test]
    fn flavor_serializes_snake_case() {
        assert_eq!(ControllerFlavor::UnifiOs.to_string(), "unifi_os");
        let parsed: ControllerFlavor = serde_json::from_str("\"classic\"").unwrap();
        assert_eq!(parsed, ControllerFlavor::Classic);
    }
}
