use std::future::Future;
use std::time::Duration;

use parsekit_types::ObjectId;

use crate::error::{StoreError, StoreResult};

/// Run one driver call under a fresh deadline.
///
/// The future is dropped on expiry, which releases whatever it held.
pub(crate) async fn bounded<T, F>(
    operation: &'static str,
    after: Duration,
    object_id: Option<&ObjectId>,
    call: F,
) -> StoreResult<T>
where
    F: Future<Output = StoreResult<T>>,
{
    match tokio::time::timeout(after, call).await {
        Ok(result) => result,
        Err(_) => {
            tracing::warn!(operation, ?after, "store call timed out");
            Err(StoreError::Timeout {
                operation,
                after,
                object_id: object_id.map(ToString::to_string),
            })
        }
    }
}
