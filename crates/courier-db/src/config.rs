use std::time::Duration;

use courier_store::OpContext;

/// Default per-operation deadline.
pub const DEFAULT_OP_TIMEOUT: Duration = Duration::from_secs(30);

/// Settings shared by every [`DocumentStore`](crate::DocumentStore).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StoreConfig {
    /// Upper bound on each driver call.
    pub op_timeout: Duration,
}

impl StoreConfig {
    pub fn with_timeout(op_timeout: Duration) -> Self {
        Self { op_timeout }
    }

    /// A fresh context bounded by `op_timeout`.
    pub fn context(&self) -> OpContext {
        OpContext::with_timeout(self.op_timeout)
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            op_timeout: DEFAULT_OP_TIMEOUT,
        }
    }
}
