//! Guarded intent collection.
//!
//! Every mutating action funnels its operator input through
//! [`collect_distinct_intent`]: prompt a candidate, check it against the
//! live contract state, and require an explicit yes before anything is
//! submitted. The current value is re-fetched on every pass because another
//! actor may have changed it while the operator was typing.

use crate::console::Console;
use anyhow::Result;
use std::future::Future;
use std::io;

/// Loops until the operator approves a candidate that differs from the
/// contract's current value.
///
/// Never returns a value equal to what `fetch_current` reported in the
/// comparison that preceded the final confirmation. The window between that
/// comparison and the eventual submission remains open; this guard does not
/// pretend to close it.
pub async fn collect_distinct_intent<T, P, F, Fut, D>(
    console: &dyn Console,
    mut prompt: P,
    mut fetch_current: F,
    preview: D,
    duplicate_msg: &str,
) -> Result<T>
where
    T: PartialEq,
    P: FnMut() -> io::Result<T>,
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
    D: Fn(&T) -> String,
{
    loop {
        let candidate = prompt()?;
        let current = fetch_current().await?;
        if candidate == current {
            console.warn(duplicate_msg);
            continue;
        }
        console.write(&preview(&candidate));
        if console.confirm("Is it ok? (yes/no)")? {
            return Ok(candidate);
        }
    }
}
