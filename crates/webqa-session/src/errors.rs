use soulbrowser_core_types::TestId;
use thiserror::Error;

/// Errors raised by TestSession mutation. Narrow on purpose: session
/// mutation happens only from the Executor's task-aggregation stage
///, so these are programming-invariant violations, not runtime
/// conditions callers are expected to recover from.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("test_id {0} has no matching configuration")]
    UnknownTestId(TestId),
    #[error("test_id {0} already has a result recorded")]
    DuplicateResult(TestId),
    #[error("session already sealed by complete_session")]
    AlreadySealed,
}
