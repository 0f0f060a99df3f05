use std::{fmt::Display, future::Future, time::Duration};

use tracing::warn;

/// How a failed startup step is retried.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// When false the first failure is final.
    pub enabled: bool,
    /// Fixed pause between attempts.
    pub delay: Duration,
    /// `None` retries forever.
    pub max_attempts: Option<u32>,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            enabled: true,
            delay: Duration::from_secs(5),
            max_attempts: None,
        }
    }
}

/// Run `op` until it succeeds or the policy gives up, returning the last error.
pub async fn retry_startup<T, E, F, Fut>(policy: &RetryPolicy, what: &str, mut op: F) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Display,
{
    let mut attempt: u32 = 0;
    loop {
        attempt += 1;
        match op().await {
            Ok(value) => return Ok(value),
            Err(e) => {
                let exhausted = policy.max_attempts.is_some_and(|max| attempt >= max);
                if !policy.enabled || exhausted {
                    warn!(attempt, error = %e, "{} failed, giving up", what);
                    return Err(e);
                }
                warn!(
                    attempt,
                    error = %e,
                    "{} failed, retrying in {:?}", what, policy.delay
                );
                tokio::time::sleep(policy.delay).await;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};

    use super::*;

    fn policy(enabled: bool, max_attempts: Option<u32>) -> RetryPolicy {
        RetryPolicy {
            enabled,
            delay: Duration::ZERO,
            max_attempts,
        }
    }

    #[tokio::test]
    async fn retries_until_success() {
        let calls = &AtomicU32::new(0);
        let result: Result<u32, String> = retry_startup(&policy(true, None), "connect", || async move {
            let n = calls.fetch_add(1, Ordering::SeqCst) + 1;
            if n < 3 { Err(format!("attempt {}", n)) } else { Ok(n) }
        })
        .await;

        assert_eq!(result, Ok(3));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn disabled_retry_stops_after_one_attempt() {
        let calls = &AtomicU32::new(0);
        let result: Result<(), String> = retry_startup(&policy(false, None), "connect", || async move {
            calls.fetch_add(1, Ordering::SeqCst);
            Err("unreachable".to_string())
        })
        .await;

        assert_eq!(result, Err("unreachable".to_string()));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn attempt_cap_bounds_the_loop() {
        let calls = &AtomicU32::new(0);
        let result: Result<(), String> = retry_startup(&policy(true, Some(4)), "connect", || async move {
            calls.fetch_add(1, Ordering::SeqCst);
            Err("unreachable".to_string())
        })
        .await;

        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 4);
    }
}
