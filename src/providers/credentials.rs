//! API key lookup
//!
//! Keys are looked up by environment variable name at call time, so a key
//! added or removed while the server runs takes effect on the next request.

use std::collections::HashMap;

/// Source of provider API keys
pub trait Credentials: Send + Sync {
    /// Value for `name`, or `None` when unset or blank
    fn lookup(&self, name: &str) -> Option<String>;
}

/// Reads keys from the process environment
#[derive(Debug, Clone, Copy, Default)]
pub struct EnvCredentials;

impl Credentials for EnvCredentials {
    fn lookup(&self, name: &str) -> Option<String> {
        std::env::var(name).ok().filter(|v| !v.trim().is_empty())
    }
}

/// Fixed key set, for tests and embedding
#[derive(Debug, Clone, Default)]
pub struct StaticCredentials {
    values: HashMap<String, String>,
}

impl StaticCredentials {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.values.insert(name.into(), value.into());
        self
    }
}

impl Credentials for StaticCredentials {
    fn lookup(&self, name: &str) -> Option<String> {
        self.values
            .get(name)
            .filter(|v| !v.trim().is_empty())
            .cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_static_credentials_lookup() {
        let creds = StaticCredentials::new()
            .with("GROQ_API_KEY", "gsk-123")
            .with("BLANK_KEY", "   ");

        assert_eq!(creds.lookup("GROQ_API_KEY").as_deref(), Some("gsk-123"));
        assert_eq!(creds.lookup("BLANK_KEY"), None);
        assert_eq!(creds.lookup("MISSING_KEY"), None);
    }

    #[test]
    fn test_env_credentials_missing_variable() {
        let creds = EnvCredentials;
        assert_eq!(creds.lookup("LUMI_TEST_VARIABLE_THAT_IS_NEVER_SET"), None);
    }
}
