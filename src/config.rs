use std::path::PathBuf;
use std::time::Duration;

/// Application-level constants
pub const APP_NAME: &str = "RehabFlow";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Reasoning model used when no override is configured.
pub const DEFAULT_MODEL: &str = "claude-haiku-4-5-20251001";
pub const DEFAULT_MAX_TOKENS: u32 = 2048;
/// Client-side bound on one reasoning call. Advisory; the proxy may enforce its own.
pub const DEFAULT_TIMEOUT_SECS: u64 = 90;
/// Authenticated proxy that forwards to the reasoning service.
pub const DEFAULT_REASONING_URL: &str = "http://localhost:5001/rehabflow/us-central1/analyze";

/// Top-N conditions kept for display.
pub const DEFAULT_MAX_CONDITIONS: usize = 3;

const ENV_REASONING_URL: &str = "REHABFLOW_REASONING_URL";
const ENV_MODEL: &str = "REHABFLOW_MODEL";
const ENV_MAX_TOKENS: &str = "REHABFLOW_MAX_TOKENS";
const ENV_TIMEOUT_SECS: &str = "REHABFLOW_TIMEOUT_SECS";
const ENV_CONDITION_RANKING: &str = "REHABFLOW_CONDITION_RANKING";
const ENV_PLAN_FALLBACK: &str = "REHABFLOW_PLAN_FALLBACK";

/// Default tracing filter when `RUST_LOG` is not set.
pub fn default_log_filter() -> &'static str {
    if cfg!(debug_assertions) {
        "rehabflow=debug,warn"
    } else {
        "rehabflow=info,warn"
    }
}

/// Get the application data directory.
/// ~/RehabFlow/ when a home directory exists, otherwise the platform data dir.
/// `None` only on systems with neither.
pub fn app_data_dir() -> Option<PathBuf> {
    dirs::home_dir()
        .or_else(dirs::data_dir)
        .map(|base| base.join(APP_NAME))
}

// ═══════════════════════════════════════════════════════════
// Reasoning service
// ═══════════════════════════════════════════════════════════

/// Connection settings for the reasoning service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReasoningConfig {
    pub endpoint: String,
    pub model: String,
    pub max_tokens: u32,
    pub timeout: Duration,
}

impl Default for ReasoningConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_REASONING_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            max_tokens: DEFAULT_MAX_TOKENS,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

impl ReasoningConfig {
    /// Defaults overridden by `REHABFLOW_*` environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup. Unparsable or zero numbers keep their default.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(url) = non_empty(lookup(ENV_REASONING_URL)) {
            config.endpoint = url;
        }
        if let Some(model) = non_empty(lookup(ENV_MODEL)) {
            config.model = model;
        }
        if let Some(tokens) = positive_or_warn::<u32>(ENV_MAX_TOKENS, lookup(ENV_MAX_TOKENS)) {
            config.max_tokens = tokens;
        }
        if let Some(secs) = positive_or_warn::<u64>(ENV_TIMEOUT_SECS, lookup(ENV_TIMEOUT_SECS)) {
            config.timeout = Duration::from_secs(secs);
        }

        config
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

// ═══════════════════════════════════════════════════════════
// Pipeline policy
// ═══════════════════════════════════════════════════════════

/// How surplus conditions are cut down to the display limit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ConditionRanking {
    /// Keep the first N in the order the model returned them.
    #[default]
    ArrayOrder,
    /// Stable sort by confidence (descending), then keep the first N.
    ByConfidence,
}

impl std::str::FromStr for ConditionRanking {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "array_order" | "array-order" | "order" => Ok(Self::ArrayOrder),
            "by_confidence" | "by-confidence" | "confidence" => Ok(Self::ByConfidence),
            other => Err(format!("unknown condition ranking: {other}")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnalysisOptions {
    pub max_conditions: usize,
    pub ranking: ConditionRanking,
}

impl Default for AnalysisOptions {
    fn default() -> Self {
        Self {
            max_conditions: DEFAULT_MAX_CONDITIONS,
            ranking: ConditionRanking::default(),
        }
    }
}

impl AnalysisOptions {
    pub fn from_env() -> Self {
        let mut options = Self::default();
        if let Some(ranking) = parse_or_warn(
            ENV_CONDITION_RANKING,
            std::env::var(ENV_CONDITION_RANKING).ok(),
        ) {
            options.ranking = ranking;
        }
        options
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlanOptions {
    /// Substitute a catalog plan when the model path fails.
    pub fallback_enabled: bool,
}

impl Default for PlanOptions {
    fn default() -> Self {
        Self {
            fallback_enabled: true,
        }
    }
}

impl PlanOptions {
    pub fn from_env() -> Self {
        let mut options = Self::default();
        if let Some(enabled) =
            parse_or_warn::<bool>(ENV_PLAN_FALLBACK, std::env::var(ENV_PLAN_FALLBACK).ok())
        {
            options.fallback_enabled = enabled;
        }
        options
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_or_warn<T>(key: &str, value: Option<String>) -> Option<T>
where
    T: std::str::FromStr,
{
    let raw = non_empty(value)?;
    match raw.parse::<T>() {
        Ok(parsed) => Some(parsed),
        Err(_) => {
            tracing::warn!(key, value = %raw, "Ignoring invalid configuration value");
            None
        }
    }
}

/// Like `parse_or_warn`, but zero counts as invalid.
fn positive_or_warn<T>(key: &str, value: Option<String>) -> Option<T>
where
    T: std::str::FromStr + Default + PartialEq,
{
    let parsed = parse_or_warn::<T>(key, value)?;
    if parsed == T::default() {
        tracing::warn!(key, "Ignoring zero configuration value");
        return None;
    }
    Some(parsed)
}
