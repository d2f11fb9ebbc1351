//! Credential loading
//!
//! API keys are read once at startup. A missing key is not an error at load
//! time; it becomes a [`MissingCredential`] error the first time a client tries
//! to use it, so the application can still start and report the problem inline.

use std::fmt;
use thiserror::Error;

/// A required credential was not present in the environment
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("missing credential: environment variable {env_var} is not set")]
pub struct MissingCredential {
    /// Name of the environment variable that should hold the credential
    pub env_var: String,
}

/// An API key tied to the environment variable it came from
///
/// The value is never printed by `Debug`.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential {
    env_var: String,
    value: Option<String>,
}

impl Credential {
    /// Read a credential from the environment
    ///
    /// Unset and blank values are both treated as absent.
    pub fn from_env(env_var: impl Into<String>) -> Self {
        let env_var = env_var.into();
        let value = std::env::var(&env_var).ok();
        Self::from_parts(env_var, value)
    }

    /// Create a credential with a known value
    pub fn new(env_var: impl Into<String>, value: impl Into<String>) -> Self {
        Self::from_parts(env_var.into(), Some(value.into()))
    }

    /// Create an absent credential
    pub fn missing(env_var: impl Into<String>) -> Self {
        Self::from_parts(env_var.into(), None)
    }

    fn from_parts(env_var: String, value: Option<String>) -> Self {
        let value = value
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty());
        Self { env_var, value }
    }

    /// Environment variable this credential is read from
    pub fn env_var(&self) -> &str {
        &self.env_var
    }

    /// Whether a value was found
    pub fn is_present(&self) -> bool {
        self.value.is_some()
    }

    /// Borrow the secret, or fail with [`MissingCredential`]
    pub fn expose(&self) -> Result<&str, MissingCredential> {
        self.value.as_deref().ok_or_else(|| MissingCredential {
            env_var: self.env_var.clone(),
        })
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("env_var", &self.env_var)
            .field("value", &self.value.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_present_credential() {
        let cred = Credential::new("OPENAI_API_KEY", "sk-test");
        assert!(cred.is_present());
        assert_eq!(cred.expose().unwrap(), "sk-test");
    }

    #[test]
    fn test_blank_is_missing() {
        let cred = Credential::new("SERPER_API_KEY", "   ");
        assert!(!cred.is_present());
        let err = cred.expose().unwrap_err();
        assert_eq!(err.env_var, "SERPER_API_KEY");
        assert!(err.to_string().contains("SERPER_API_KEY"));
    }

    #[test]
    fn test_missing_from_env() {
        let cred = Credential::from_env("AGENT_UTILS_TEST_SURELY_UNSET_KEY");
        assert!(!cred.is_present());
        assert!(cred.expose().is_err());
    }

    #[test]
    fn test_debug_redacts_value() {
        let cred = Credential::new("OPENAI_API_KEY", "sk-secret");
        let printed = format!("{cred:?}");
        assert!(!printed.contains("sk-secret"));
        assert!(printed.contains("redacted"));
    }
}
