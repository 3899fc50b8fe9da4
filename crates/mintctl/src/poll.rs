//! Bounded settlement polling.
//!
//! The ledger gives no synchronous acknowledgment of finality. The only way
//! to learn that a submitted message settled is to watch the contract's
//! last-transaction position move past a baseline captured before the send.
//! This module is the generic bounded-retry primitive every mutating action
//! shares; judging whether the new transaction did what we wanted is the
//! caller's job.

use minter_common::TxPosition;
use std::future::Future;
use std::time::Duration;
use tracing::debug;

pub const DEFAULT_MAX_ATTEMPTS: u32 = 10;
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(3);

/// Outcome of a settlement watch. `Exhausted` is a reportable result, not a
/// failure: it means "outcome unknown", never "outcome negative".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Settlement {
    Confirmed,
    Exhausted,
}

/// Attempt budget and inter-attempt delay for a settlement watch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollPolicy {
    pub max_attempts: u32,
    pub interval: Duration,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            interval: DEFAULT_POLL_INTERVAL,
        }
    }
}

/// Watches for a transaction newer than `baseline`.
///
/// Per attempt: sleep the configured interval, fetch the current position,
/// confirm iff it is strictly newer than the baseline. A fetch yielding
/// `None` counts as "no change observed". Transport errors propagate
/// immediately. Performs at most `max_attempts` fetches, and exactly that
/// many when it exhausts.
///
/// The baseline parameter is non-optional: a contract with no history has no
/// baseline to poll against, and that case must be rejected before ever
/// getting here.
pub async fn await_settlement<F, Fut, E>(
    baseline: &TxPosition,
    policy: &PollPolicy,
    mut fetch_position: F,
) -> Result<Settlement, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<Option<TxPosition>, E>>,
{
    for attempt in 1..=policy.max_attempts {
        tokio::time::sleep(policy.interval).await;
        match fetch_position().await? {
            Some(current) if current.is_after(baseline) => {
                debug!(
                    "settlement observed on attempt {}/{}: {}",
                    attempt, policy.max_attempts, current
                );
                return Ok(Settlement::Confirmed);
            }
            _ => {
                debug!("no new transaction on attempt {}/{}", attempt, policy.max_attempts);
            }
        }
    }
    Ok(Settlement::Exhausted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::convert::Infallible;

    fn zero_delay(max_attempts: u32) -> PollPolicy {
        PollPolicy {
            max_attempts,
            interval: Duration::ZERO,
        }
    }

    #[tokio::test]
    async fn confirms_after_exactly_k_fetches() {
        let baseline = TxPosition::new(100, "aa");
        let calls = Cell::new(0u32);
        let fetch = || {
            calls.set(calls.get() + 1);
            let n = calls.get();
            let base = baseline.clone();
            async move {
                Ok::<_, Infallible>(if n >= 2 {
                    Some(TxPosition::new(101, "bb"))
                } else {
                    Some(base)
                })
            }
        };
        let result = await_settlement(&baseline, &zero_delay(10), fetch)
            .await
            .unwrap();
        assert_eq!(result, Settlement::Confirmed);
        assert_eq!(calls.get(), 2);
    }

    #[tokio::test]
    async fn exhausts_with_exactly_max_attempts_fetches() {
        let baseline = TxPosition::new(100, "aa");
        let calls = Cell::new(0u32);
        let fetch = || {
            calls.set(calls.get() + 1);
            let base = baseline.clone();
            async move { Ok::<_, Infallible>(Some(base)) }
        };
        let result = await_settlement(&baseline, &zero_delay(10), fetch)
            .await
            .unwrap();
        assert_eq!(result, Settlement::Exhausted);
        assert_eq!(calls.get(), 10);
    }

    #[tokio::test]
    async fn absent_position_counts_as_no_change() {
        let baseline = TxPosition::new(100, "aa");
        let result = await_settlement(&baseline, &zero_delay(3), || async {
            Ok::<_, Infallible>(None)
        })
        .await
        .unwrap();
        assert_eq!(result, Settlement::Exhausted);
    }

    #[tokio::test]
    async fn equal_position_is_not_confirmation() {
        // Same logical time with a different hash must not confirm; only a
        // strictly newer transaction counts.
        let baseline = TxPosition::new(100, "aa");
        let result = await_settlement(&baseline, &zero_delay(2), || async {
            Ok::<_, Infallible>(Some(TxPosition::new(100, "bb")))
        })
        .await
        .unwrap();
        assert_eq!(result, Settlement::Exhausted);
    }

    #[tokio::test]
    async fn fetch_errors_propagate() {
        let baseline = TxPosition::new(100, "aa");
        let result: Result<Settlement, String> =
            await_settlement(&baseline, &zero_delay(5), || async {
                Err("gateway down".to_string())
            })
            .await;
        assert_eq!(result.unwrap_err(), "gateway down");
    }
}
