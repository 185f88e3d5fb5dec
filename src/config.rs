//! Configuration surface (§6) and the cooperative deadline/cancellation
//! primitives described in §5.

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverConfig {
    pub time_limit_s: f64,
    pub max_ils_iterations: usize,
    pub lns_iterations: usize,
    pub destroy_min: usize,
    pub destroy_max: usize,
    pub lahc_history: usize,
    pub local_search_every: usize,
    pub no_improvement_stop: usize,
    pub seed: u64,
}

impl SolverConfig {
    /// Loads a config from a JSON file, falling back to [`SolverConfig::default`]
    /// for any field the file omits (`#[serde(default)]` above).
    pub fn load_json(path: &std::path::Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }

    /// Serializes this config to pretty-printed JSON, the inverse of
    /// [`SolverConfig::load_json`] (§2: round-tripped to/from JSON by the
    /// CLI layer).
    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn save_json(&self, path: &std::path::Path) -> Result<(), ConfigError> {
        std::fs::write(path, self.to_json()?)?;
        Ok(())
    }
}

/// Failure reading, parsing, or writing a [`SolverConfig`] JSON file.
#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Json(serde_json::Error),
}

impl From<std::io::Error> for ConfigError {
    fn from(e: std::io::Error) -> Self {
        ConfigError::Io(e)
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(e: serde_json::Error) -> Self {
        ConfigError::Json(e)
    }
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "could not read config file: {e}"),
            ConfigError::Json(e) => write!(f, "malformed config JSON: {e}"),
        }
    }
}

impl std::error::Error for ConfigError {}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            time_limit_s: 60.0,
            max_ils_iterations: 20,
            lns_iterations: 500,
            destroy_min: 8,
            destroy_max: 30,
            lahc_history: 1000,
            local_search_every: 20,
            no_improvement_stop: 5,
            seed: 0,
        }
    }
}

/// A wall-clock deadline plus an externally-settable cancellation flag,
/// polled at every LNS iteration and AGES attempt (§5) rather than ever
/// blocking on external resources.
#[derive(Clone)]
pub struct Deadline {
    start: Instant,
    limit: Duration,
    cancel: Arc<AtomicBool>,
}

impl Deadline {
    pub fn new(limit: Duration) -> Self {
        Self {
            start: Instant::now(),
            limit,
            cancel: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn cancel_token(&self) -> CancelToken {
        CancelToken {
            cancel: self.cancel.clone(),
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    pub fn remaining(&self) -> Duration {
        self.limit.saturating_sub(self.elapsed())
    }

    pub fn fraction_remaining(&self) -> f64 {
        if self.limit.is_zero() {
            0.0
        } else {
            (self.remaining().as_secs_f64() / self.limit.as_secs_f64()).clamp(0.0, 1.0)
        }
    }

    pub fn is_expired(&self) -> bool {
        self.elapsed() >= self.limit
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.load(Ordering::Relaxed)
    }

    /// True if the deadline elapsed or the external cancellation flag fired.
    pub fn should_stop(&self) -> bool {
        self.is_expired() || self.is_cancelled()
    }
}

/// A cloneable handle the caller can use to cancel an in-flight `solve()`
/// from another thread or an async timer.
#[derive(Clone)]
pub struct CancelToken {
    cancel: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn cancel(&self) {
        self.cancel.store(true, Ordering::Relaxed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deadline_expires() {
        let d = Deadline::new(Duration::from_millis(0));
        assert!(d.is_expired());
        assert!(d.should_stop());
    }

    #[test]
    fn cancel_token_stops_deadline() {
        let d = Deadline::new(Duration::from_secs(3600));
        let token = d.cancel_token();
        assert!(!d.should_stop());
        token.cancel();
        assert!(d.should_stop());
    }

    #[test]
    fn config_round_trips_through_json() {
        let c = SolverConfig {
            seed: 42,
            destroy_min: 3,
            ..SolverConfig::default()
        };
        let json = c.to_json().unwrap();
        let back: SolverConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back.seed, 42);
        assert_eq!(back.destroy_min, 3);
        assert_eq!(back.time_limit_s, c.time_limit_s);
    }

    #[test]
    fn config_json_load_fills_in_missing_fields_from_default() {
        let json = r#"{"seed": 7}"#;
        let c: SolverConfig = serde_json::from_str(json).unwrap();
        assert_eq!(c.seed, 7);
        assert_eq!(c.max_ils_iterations, SolverConfig::default().max_ils_iterations);
    }

    #[test]
    fn config_defaults_match_spec() {
        let c = SolverConfig::default();
        assert_eq!(c.time_limit_s, 60.0);
        assert_eq!(c.max_ils_iterations, 20);
        assert_eq!(c.lns_iterations, 500);
        assert_eq!((c.destroy_min, c.destroy_max), (8, 30));
        assert_eq!(c.lahc_history, 1000);
        assert_eq!(c.local_search_every, 20);
        assert_eq!(c.no_improvement_stop, 5);
    }
}
