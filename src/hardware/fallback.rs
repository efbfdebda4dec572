//! Ordered fallback over a fixed strategy table.
//!
//! Each strategy is attempted in order. The first success wins; if every
//! strategy fails, the last error is returned. Retries are structural only:
//! one attempt per table entry, no delays.

use anyhow::{anyhow, Result};
use std::fmt::Debug;
use std::future::Future;
use tracing::warn;

/// Outcome of [`first_success`] when every strategy failed.
#[derive(Debug)]
pub struct Exhausted {
    /// Number of strategies tried.
    pub attempts: usize,
    /// Error from the last strategy.
    pub last: anyhow::Error,
}

/// Run `attempt` for each strategy until one succeeds.
///
/// Returns the winning strategy together with its value.
pub async fn first_success<S, T, F, Fut>(
    what: &str,
    strategies: &[S],
    mut attempt: F,
) -> std::result::Result<(S, T), Exhausted>
where
    S: Copy + Debug,
    F: FnMut(S) -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let mut last = anyhow!("no {what} strategies configured");
    for (i, strategy) in strategies.iter().copied().enumerate() {
        match attempt(strategy).await {
            Ok(value) => return Ok((strategy, value)),
            Err(e) => {
                if i + 1 < strategies.len() {
                    warn!(?strategy, error = %format!("{e:#}"), "{what} failed, trying next strategy");
                }
                last = e;
            }
        }
    }
    Err(Exhausted {
        attempts: strategies.len(),
        last,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::bail;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Step {
        A,
        B,
        C,
    }

    #[tokio::test]
    async fn test_first_success_short_circuits() {
        let mut tried = Vec::new();
        let (won, value) = first_success("step", &[Step::A, Step::B, Step::C], |s| {
            tried.push(s);
            async move {
                if s == Step::A {
                    bail!("A rejected");
                }
                Ok(s as u8)
            }
        })
        .await
        .unwrap();
        assert_eq!(won, Step::B);
        assert_eq!(value, 1);
        assert_eq!(tried, vec![Step::A, Step::B]);
    }

    #[tokio::test]
    async fn test_last_error_surfaces() {
        let err = first_success("step", &[Step::A, Step::B], |s| async move {
            Err::<(), _>(anyhow!("{s:?} rejected"))
        })
        .await
        .unwrap_err();
        assert_eq!(err.attempts, 2);
        assert_eq!(err.last.to_string(), "B rejected");
    }

    #[tokio::test]
    async fn test_empty_table() {
        let err = first_success::<Step, (), _, _>("step", &[], |_| async { Ok(()) })
            .await
            .unwrap_err();
        assert_eq!(err.attempts, 0);
    }
}
