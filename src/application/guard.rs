//! Per-iteration fault isolation for the long-running tasks.

use std::any::Any;
use std::future::Future;
use std::panic::AssertUnwindSafe;

use futures_util::FutureExt;
use tracing::{error, warn};

use crate::error::{Error, Result};

/// Log a failure by kind: exchange rejections are expected, the rest are not.
pub fn log_failure(task: &'static str, err: &Error) {
    match err {
        Error::Exchange(e) => {
            warn!(task, kind = %e.kind, error = %e.message, "Exchange rejected request");
        }
        other => {
            error!(task, error = ?other, "Unexpected failure");
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    payload
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("non-string panic payload")
}

/// Run one iteration, logging any error or panic instead of propagating it.
///
/// Returns true when the iteration completed without error.
pub async fn guarded<F>(task: &'static str, iteration: F) -> bool
where
    F: Future<Output = Result<()>>,
{
    match AssertUnwindSafe(iteration).catch_unwind().await {
        Ok(Ok(())) => true,
        Ok(Err(e)) => {
            log_failure(task, &e);
            false
        }
        Err(payload) => {
            error!(task, panic = panic_message(payload.as_ref()), "Iteration panicked");
            false
        }
    }
}
