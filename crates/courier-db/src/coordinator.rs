//! Concurrent two-lookup fan-out/fan-in.
//!
//! Relationship checks ("do the sender and receiver exist?") and composite
//! reads ("a group plus its memberships") both need two independent lookups.
//! [`ConsistencyCoordinator`] spawns them as tokio tasks and reconciles the
//! outcome deterministically: the primary lookup's error always wins, and the
//! secondary's error surfaces only when the primary succeeded.

use std::future::Future;

use tokio::task::{JoinError, JoinHandle};
use tracing::debug;

use crate::error::{DbError, DbResult};

/// Which lookup of a pair failed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Side {
    Primary,
    Secondary,
}

/// A failed pair lookup: the reported side and its error.
#[derive(Debug)]
pub struct PairFailure {
    pub side: Side,
    pub error: DbError,
}

/// Aborts the task when dropped, so no lookup outlives its coordinator.
struct TaskGuard<T>(JoinHandle<T>);

impl<T> Drop for TaskGuard<T> {
    fn drop(&mut self) {
        self.0.abort();
    }
}

fn settle<T>(joined: Result<DbResult<T>, JoinError>) -> DbResult<T> {
    joined.map_err(|e| DbError::Internal(format!("lookup task failed: {e}")))?
}

/// Runs exactly two lookups concurrently and joins both.
#[derive(Clone, Copy, Debug, Default)]
pub struct ConsistencyCoordinator;

impl ConsistencyCoordinator {
    /// Run both lookups and return both values.
    ///
    /// If the primary fails first the secondary is aborted. If the secondary
    /// fails first the primary is still awaited so its error can take
    /// precedence. Dropping the returned future aborts both tasks.
    pub async fn join<A, B, FA, FB>(primary: FA, secondary: FB) -> Result<(A, B), PairFailure>
    where
        FA: Future<Output = DbResult<A>> + Send + 'static,
        FB: Future<Output = DbResult<B>> + Send + 'static,
        A: Send + 'static,
        B: Send + 'static,
    {
        let mut primary = TaskGuard(tokio::spawn(primary));
        let mut secondary = TaskGuard(tokio::spawn(secondary));

        let fail = |side, error| PairFailure { side, error };

        tokio::select! {
            joined = &mut primary.0 => {
                let a = settle(joined).map_err(|e| fail(Side::Primary, e))?;
                let b = settle((&mut secondary.0).await).map_err(|e| fail(Side::Secondary, e))?;
                Ok((a, b))
            }
            joined = &mut secondary.0 => {
                let second = settle(joined);
                let a = settle((&mut primary.0).await).map_err(|e| fail(Side::Primary, e))?;
                let b = second.map_err(|e| fail(Side::Secondary, e))?;
                Ok((a, b))
            }
        }
    }

    /// Existence check for two referenced entities.
    ///
    /// A missing entity becomes [`DbError::Dependency`] naming its role, e.g.
    /// `"invalid group id"`. Other failures pass through unchanged.
    pub async fn require_both<A, B, FA, FB>(
        primary: (&'static str, FA),
        secondary: (&'static str, FB),
    ) -> DbResult<(A, B)>
    where
        FA: Future<Output = DbResult<A>> + Send + 'static,
        FB: Future<Output = DbResult<B>> + Send + 'static,
        A: Send + 'static,
        B: Send + 'static,
    {
        let (primary_role, primary) = primary;
        let (secondary_role, secondary) = secondary;
        Self::join(primary, secondary).await.map_err(|failure| {
            let role = match failure.side {
                Side::Primary => primary_role,
                Side::Secondary => secondary_role,
            };
            debug!(role, error = %failure.error, "dependency check failed");
            match failure.error {
                DbError::NotFound { .. } => DbError::Dependency(format!("invalid {role} id")),
                other => other,
            }
        })
    }

    /// Composite read: both values, or the reported side's own error.
    pub async fn assemble<A, B, FA, FB>(primary: FA, secondary: FB) -> DbResult<(A, B)>
    where
        FA: Future<Output = DbResult<A>> + Send + 'static,
        FB: Future<Output = DbResult<B>> + Send + 'static,
        A: Send + 'static,
        B: Send + 'static,
    {
        Self::join(primary, secondary)
            .await
            .map_err(|failure| failure.error)
    }
}
