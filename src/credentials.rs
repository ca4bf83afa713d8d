use std::env;

/// Default environment variable holding the bearer token.
pub const DEFAULT_TOKEN_VARIABLE: &str = "GITHUB_TOKEN";

/// Source of the opaque bearer token used for chat requests.
///
/// The session resolves the token once per send; a provider returning `None`
/// rejects the send before any request is issued.
pub trait CredentialProvider: Send + Sync {
    fn bearer_token(&self) -> Option<String>;
}

/// Reads the bearer token from an environment variable.
#[derive(Debug, Clone)]
pub struct EnvCredentialProvider {
    variable: String,
}

impl Default for EnvCredentialProvider {
    fn default() -> Self {
        Self::new(DEFAULT_TOKEN_VARIABLE)
    }
}

impl EnvCredentialProvider {
    #[must_use]
    pub fn new(variable: impl Into<String>) -> Self {
        Self {
            variable: variable.into(),
        }
    }
}

impl CredentialProvider for EnvCredentialProvider {
    fn bearer_token(&self) -> Option<String> {
        env::var(&self.variable)
            .ok()
            .map(|token| token.trim().to_owned())
            .filter(|token| !token.is_empty())
    }
}

/// Fixed token, for embedders that manage token storage themselves.
#[derive(Debug, Clone)]
pub struct StaticCredentialProvider {
    token: String,
}

impl StaticCredentialProvider {
    #[must_use]
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }
}

impl CredentialProvider for StaticCredentialProvider {
    fn bearer_token(&self) -> Option<String> {
        let token = self.token.trim();
        if token.is_empty() {
            None
        } else {
            Some(token.to_owned())
        }
    }
}
