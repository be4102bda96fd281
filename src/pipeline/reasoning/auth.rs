use async_trait::async_trait;

const ENV_ID_TOKEN: &str = "REHABFLOW_ID_TOKEN";

/// Source of the short-lived bearer credential attached to reasoning calls.
///
/// Sign-in and token refresh belong to the auth subsystem; the pipeline only
/// asks for the current token right before each call.
#[async_trait]
pub trait TokenProvider: Send + Sync {
    /// `None` when nobody is signed in.
    async fn id_token(&self) -> Option<String>;
}

/// Fixed token, for tests, scripts, and environments with an externally managed credential.
#[derive(Debug, Clone, Default)]
pub struct StaticTokenProvider {
    token: Option<String>,
}

impl StaticTokenProvider {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: Some(token.into()),
        }
    }

    pub fn signed_out() -> Self {
        Self { token: None }
    }

    pub fn from_env() -> Self {
        Self {
            token: std::env::var(ENV_ID_TOKEN)
                .ok()
                .filter(|t| !t.trim().is_empty()),
        }
    }
}

#[async_trait]
impl TokenProvider for StaticTokenProvider {
    async fn id_token(&self) -> Option<String> {
        self.token.clone()
    }
}
