use std::time::Duration;

use collector_core::AppError;

/// Default User-Agent sent with every request.
pub const DEFAULT_USER_AGENT: &str = "Collector/0.1 (rule-driven crawler)";

/// Default per-request timeout, in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Runtime settings for [`ReqwestFetcher`](crate::ReqwestFetcher).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchSettings {
    pub timeout: Duration,
    pub user_agent: String,
    /// Allow requests to private/reserved IPs (disables the SSRF guard).
    pub allow_private: bool,
}

impl Default for FetchSettings {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            allow_private: false,
        }
    }
}

impl FetchSettings {
    /// Read settings from environment variables.
    ///
    /// - `COLLECTOR_TIMEOUT_SECS` (optional, defaults to 30)
    /// - `COLLECTOR_USER_AGENT` (optional)
    /// - `COLLECTOR_ALLOW_PRIVATE` (optional, `true`/`1` disables the SSRF guard)
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, AppError> {
        let defaults = Self::default();

        let timeout = match lookup("COLLECTOR_TIMEOUT_SECS") {
            None => defaults.timeout,
            Some(raw) => {
                let secs: u64 = raw.trim().parse().map_err(|_| {
                    AppError::ConfigError(format!(
                        "Invalid COLLECTOR_TIMEOUT_SECS '{raw}': must be a positive integer"
                    ))
                })?;
                if secs == 0 {
                    return Err(AppError::ConfigError(
                        "COLLECTOR_TIMEOUT_SECS must be at least 1".into(),
                    ));
                }
                Duration::from_secs(secs)
            }
        };

        let user_agent = lookup("COLLECTOR_USER_AGENT")
            .map(|ua| ua.trim().to_string())
            .filter(|ua| !ua.is_empty())
            .unwrap_or(defaults.user_agent);

        let allow_private = lookup("COLLECTOR_ALLOW_PRIVATE").is_some_and(|raw| parse_flag(&raw));

        Ok(Self {
            timeout,
            user_agent,
            allow_private,
        })
    }
}

/// Reads an on/off setting: `true` or `1` (any case, surrounding spaces
/// ignored) is on, anything else is off.
pub fn parse_flag(raw: &str) -> bool {
    matches!(raw.trim().to_ascii_lowercase().as_str(), "true" | "1")
}
