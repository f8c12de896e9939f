//! Engine tunables.
//!
//! Defaults match the design values; each can be overridden through the
//! environment (`UMWELT_*`) or builder-style setters. Configuration is
//! resolved once at bootstrap — a running GM never re-reads it.

use std::time::Duration;

/// Environment variable overriding [`EngineConfig::max_carry_overs`].
pub const ENV_MAX_CARRY_OVERS: &str = "UMWELT_MAX_CARRY_OVERS";
/// Environment variable overriding [`EngineConfig::forget_round_after`] (seconds).
pub const ENV_FORGET_ROUND_AFTER_SECS: &str = "UMWELT_FORGET_ROUND_AFTER_SECS";
/// Environment variable overriding [`EngineConfig::intent_stale_after`] (milliseconds).
pub const ENV_INTENT_STALE_AFTER_MS: &str = "UMWELT_INTENT_STALE_AFTER_MS";

/// Tunable constants of the round engine.
///
/// # Example
///
/// ```
/// use umwelt_engine::EngineConfig;
/// use std::time::Duration;
///
/// let config = EngineConfig::default().with_max_carry_overs(5);
/// assert_eq!(config.max_carry_overs, 5);
/// assert_eq!(config.forget_round_after, Duration::from_secs(60));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineConfig {
    /// Maximum rounds a perception may be carried over.
    pub max_carry_overs: u32,
    /// Completed rounds older than this are forgotten.
    pub forget_round_after: Duration,
    /// Intents older than this draw a warning when realized.
    pub intent_stale_after: Duration,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_carry_overs: 3,
            forget_round_after: Duration::from_secs(60),
            intent_stale_after: Duration::from_millis(2000),
        }
    }
}

impl EngineConfig {
    /// Resolves configuration from the process environment.
    ///
    /// Unset variables fall back to the defaults; unparsable values are
    /// logged and ignored.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Resolves configuration from an arbitrary lookup function.
    ///
    /// [`from_env`](Self::from_env) delegates here; tests inject their
    /// own lookup instead of mutating the process environment.
    #[must_use]
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();
        if let Some(raw) = lookup(ENV_MAX_CARRY_OVERS) {
            match raw.parse() {
                Ok(value) => config.max_carry_overs = value,
                Err(_) => {
                    tracing::warn!(var = ENV_MAX_CARRY_OVERS, value = %raw, "ignoring unparsable value");
                }
            }
        }
        if let Some(raw) = lookup(ENV_FORGET_ROUND_AFTER_SECS) {
            match raw.parse::<u64>() {
                Ok(secs) => config.forget_round_after = Duration::from_secs(secs),
                Err(_) => {
                    tracing::warn!(var = ENV_FORGET_ROUND_AFTER_SECS, value = %raw, "ignoring unparsable value");
                }
            }
        }
        if let Some(raw) = lookup(ENV_INTENT_STALE_AFTER_MS) {
            match raw.parse::<u64>() {
                Ok(ms) => config.intent_stale_after = Duration::from_millis(ms),
                Err(_) => {
                    tracing::warn!(var = ENV_INTENT_STALE_AFTER_MS, value = %raw, "ignoring unparsable value");
                }
            }
        }
        config
    }

    /// Overrides the carry-over limit.
    #[must_use]
    pub fn with_max_carry_overs(mut self, max: u32) -> Self {
        self.max_carry_overs = max;
        self
    }

    /// Overrides the round-forgetting horizon.
    #[must_use]
    pub fn with_forget_round_after(mut self, after: Duration) -> Self {
        self.forget_round_after = after;
        self
    }

    /// Overrides the intent staleness threshold.
    #[must_use]
    pub fn with_intent_stale_after(mut self, after: Duration) -> Self {
        self.intent_stale_after = after;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_design_values() {
        let config = EngineConfig::default();
        assert_eq!(config.max_carry_overs, 3);
        assert_eq!(config.forget_round_after, Duration::from_secs(60));
        assert_eq!(config.intent_stale_after, Duration::from_millis(2000));
    }

    #[test]
    fn lookup_overrides_apply() {
        let config = EngineConfig::from_lookup(|key| match key {
            ENV_MAX_CARRY_OVERS => Some("7".into()),
            ENV_FORGET_ROUND_AFTER_SECS => Some("10".into()),
            ENV_INTENT_STALE_AFTER_MS => Some("500".into()),
            _ => None,
        });
        assert_eq!(config.max_carry_overs, 7);
        assert_eq!(config.forget_round_after, Duration::from_secs(10));
        assert_eq!(config.intent_stale_after, Duration::from_millis(500));
    }

    #[test]
    fn unparsable_values_fall_back() {
        let config = EngineConfig::from_lookup(|key| match key {
            ENV_MAX_CARRY_OVERS => Some("many".into()),
            _ => None,
        });
        assert_eq!(config, EngineConfig::default());
    }

    #[test]
    fn builder_style_overrides() {
        let config = EngineConfig::default()
            .with_forget_round_after(Duration::from_secs(5))
            .with_intent_stale_after(Duration::from_millis(100));
        assert_eq!(config.forget_round_after, Duration::from_secs(5));
        assert_eq!(config.intent_stale_after, Duration::from_millis(100));
    }
}
