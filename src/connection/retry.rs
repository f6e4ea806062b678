//! Reconnect scheduling.
//!
//! The default is the classic VCP behaviour: wait 5 seconds, try again,
//! forever. Exponential backoff and attempt caps are opt-in.

use std::time::Duration;

use serde::Deserialize;

/// Default delay between reconnect attempts.
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_millis(5000);

/// How long to wait before each reconnect attempt, and when to give up.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RetryPolicy {
    /// Same delay before every attempt.
    Fixed {
        #[serde(rename = "delay_ms", with = "crate::config::millis")]
        delay: Duration,
        /// `None` retries forever.
        #[serde(default)]
        max_attempts: Option<u32>,
    },
    /// `initial * multiplier^attempt`, capped at `max`.
    Exponential {
        #[serde(rename = "initial_ms", with = "crate::config::millis")]
        initial: Duration,
        #[serde(rename = "max_ms", with = "crate::config::millis")]
        max: Duration,
        multiplier: f64,
        #[serde(default)]
        max_attempts: Option<u32>,
    },
}

impl RetryPolicy {
    /// Fixed delay, unlimited attempts.
    pub fn fixed(delay: Duration) -> Self {
        RetryPolicy::Fixed {
            delay,
            max_attempts: None,
        }
    }

    /// Exponential backoff, unlimited attempts.
    pub fn exponential(initial: Duration, max: Duration, multiplier: f64) -> Self {
        RetryPolicy::Exponential {
            initial,
            max,
            multiplier,
            max_attempts: None,
        }
    }

    /// Cap the number of consecutive failed attempts.
    pub fn with_max_attempts(mut self, limit: u32) -> Self {
        match &mut self {
            RetryPolicy::Fixed { max_attempts, .. }
            | RetryPolicy::Exponential { max_attempts, .. } => *max_attempts = Some(limit),
        }
        self
    }

    /// Delay before retrying after `failures` consecutive failures
    /// (`failures >= 1`). `None` means give up.
    pub fn delay_for(&self, failures: u32) -> Option<Duration> {
        match *self {
            RetryPolicy::Fixed {
                delay,
                max_attempts,
            } => within(failures, max_attempts).then_some(delay),
            RetryPolicy::Exponential {
                initial,
                max,
                multiplier,
                max_attempts,
            } => {
                if !within(failures, max_attempts) {
                    return None;
                }
                let exponent = failures.saturating_sub(1).min(i32::MAX as u32) as i32;
                let secs = initial.as_secs_f64() * multiplier.powi(exponent);
                let capped = secs.min(max.as_secs_f64());
                Some(Duration::from_secs_f64(capped.max(0.0)))
            }
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::fixed(DEFAULT_RETRY_DELAY)
    }
}

fn within(failures: u32, max_attempts: Option<u32>) -> bool {
    max_attempts.is_none_or(|limit| failures <= limit)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_fixed_five_seconds_forever() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.delay_for(1), Some(Duration::from_millis(5000)));
        assert_eq!(policy.delay_for(1_000_000), Some(Duration::from_millis(5000)));
    }

    #[test]
    fn test_exponential_growth_and_cap() {
        let policy =
            RetryPolicy::exponential(Duration::from_millis(100), Duration::from_secs(1), 2.0);

        assert_eq!(policy.delay_for(1), Some(Duration::from_millis(100)));
        assert_eq!(policy.delay_for(2), Some(Duration::from_millis(200)));
        assert_eq!(policy.delay_for(4), Some(Duration::from_millis(800)));
        assert_eq!(policy.delay_for(5), Some(Duration::from_secs(1)));
        assert_eq!(policy.delay_for(60), Some(Duration::from_secs(1)));
    }

    #[test]
    fn test_max_attempts() {
        let policy = RetryPolicy::fixed(Duration::from_millis(10)).with_max_attempts(2);

        assert!(policy.delay_for(1).is_some());
        assert!(policy.delay_for(2).is_some());
        assert!(policy.delay_for(3).is_none());
    }

    #[test]
    fn test_deserialize_fixed() {
        let policy: RetryPolicy =
            serde_json::from_str(r#"{"kind":"fixed","delay_ms":250}"#).unwrap();
        assert_eq!(policy, RetryPolicy::fixed(Duration::from_millis(250)));
    }

    #[test]
    fn test_deserialize_exponential() {
        let policy: RetryPolicy = serde_json::from_str(
            r#"{"kind":"exponential","initial_ms":500,"max_ms":30000,"multiplier":1.5,"max_attempts":10}"#,
        )
        .unwrap();
        assert_eq!(
            policy,
            RetryPolicy::exponential(Duration::from_millis(500), Duration::from_secs(30), 1.5)
                .with_max_attempts(10)
        );
    }
}
