//! Credential selection.
//!
//! An access token always wins over an API key. The choice is made once when
//! the client is built; requests only read the resulting header.

use std::fmt;

use crate::error::{Error, Result};

pub const AUTHORIZATION: &str = "Authorization";
pub const API_KEY_HEADER: &str = "x-api-key";

#[derive(Clone, PartialEq, Eq)]
pub enum Credential {
    Bearer(String),
    ApiKey(String),
}

impl Credential {
    /// Pick the credential to use. Empty strings count as absent.
    pub fn resolve(api_key: Option<&str>, access_token: Option<&str>) -> Result<Self> {
        let present = |s: Option<&str>| s.filter(|v| !v.is_empty()).map(str::to_string);
        match (present(access_token), present(api_key)) {
            (Some(token), _) => Ok(Credential::Bearer(token)),
            (None, Some(key)) => Ok(Credential::ApiKey(key)),
            (None, None) => Err(Error::Configuration(
                "provide either an api key or an access token".to_string(),
            )),
        }
    }

    /// The single auth header this credential contributes.
    pub fn header(&self) -> (&'static str, String) {
        match self {
            Credential::Bearer(token) => (AUTHORIZATION, format!("Bearer {token}")),
            Credential::ApiKey(key) => (API_KEY_HEADER, key.clone()),
        }
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Credential::Bearer(_) => f.write_str("Bearer(<redacted>)"),
            Credential::ApiKey(_) => f.write_str("ApiKey(<redacted>)"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn neither_credential_is_rejected() {
        assert!(matches!(
            Credential::resolve(None, None),
            Err(Error::Configuration(_))
        ));
        assert!(matches!(
            Credential::resolve(Some(""), Some("")),
            Err(Error::Configuration(_))
        ));
    }

    #[test]
    fn token_wins_over_key() {
        let cred = Credential::resolve(Some("key"), Some("tok")).unwrap();
        assert_eq!(cred, Credential::Bearer("tok".to_string()));
        assert_eq!(
            cred.header(),
            ("Authorization", "Bearer tok".to_string())
        );
    }

    #[test]
    fn empty_token_falls_back_to_key() {
        let cred = Credential::resolve(Some("key"), Some("")).unwrap();
        assert_eq!(cred.header(), ("x-api-key", "key".to_string()));
    }

    #[test]
    fn debug_hides_secret() {
        let cred = Credential::ApiKey("super-secret".to_string());
        let shown = format!("{cred:?}");
        assert!(!shown.contains("super-secret"));
    }
}
