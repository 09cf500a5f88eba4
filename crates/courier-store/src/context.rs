use std::future::Future;
use std::time::Duration;

use tokio::time::Instant;

use crate::error::{StoreError, StoreResult};

/// Time-bounded execution context carried by every driver call.
#[derive(Clone, Copy, Debug)]
pub struct OpContext {
    deadline: Instant,
    budget: Duration,
}

impl OpContext {
    /// A context that expires `budget` from now.
    pub fn with_timeout(budget: Duration) -> Self {
        Self {
            deadline: Instant::now() + budget,
            budget,
        }
    }

    pub fn deadline(&self) -> Instant {
        self.deadline
    }

    pub fn budget(&self) -> Duration {
        self.budget
    }

    /// Time left before the deadline, zero once expired.
    pub fn remaining(&self) -> Duration {
        self.deadline.saturating_duration_since(Instant::now())
    }

    pub fn is_expired(&self) -> bool {
        Instant::now() >= self.deadline
    }

    /// Fail fast if the deadline already passed.
    pub fn check(&self) -> StoreResult<()> {
        if self.is_expired() {
            Err(StoreError::DeadlineExceeded(self.budget))
        } else {
            Ok(())
        }
    }

    /// Drive `fut` to completion or fail once the deadline passes.
    pub async fn run<F, T>(&self, fut: F) -> StoreResult<T>
    where
        F: Future<Output = StoreResult<T>>,
    {
        match tokio::time::timeout_at(self.deadline, fut).await {
            Ok(result) => result,
            Err(_) => Err(StoreError::DeadlineExceeded(self.budget)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn run_passes_through_a_fast_future() {
        let ctx = OpContext::with_timeout(Duration::from_secs(5));
        let value = ctx.run(async { Ok::<_, StoreError>(7) }).await.unwrap();
        assert_eq!(value, 7);
        assert!(!ctx.is_expired());
        assert!(ctx.remaining() <= Duration::from_secs(5));
    }

    #[tokio::test]
    async fn run_times_out_a_slow_future() {
        let ctx = OpContext::with_timeout(Duration::from_millis(10));
        let result = ctx
            .run(async {
                tokio::time::sleep(Duration::from_secs(5)).await;
                Ok::<_, StoreError>(())
            })
            .await;
        assert!(matches!(result, Err(StoreError::DeadlineExceeded(d)) if d == Duration::from_millis(10)));
    }

    #[tokio::test]
    async fn zero_budget_is_expired_immediately() {
        let ctx = OpContext::with_timeout(Duration::ZERO);
        assert!(ctx.is_expired());
        assert!(ctx.check().is_err());
        assert_eq!(ctx.remaining(), Duration::ZERO);
    }
}
