//! Unit of work: run a closure inside a database transaction, bounded by the
//! database's transaction timeout.
//!
//! The closure runs on its own task. Whichever comes first wins:
//! - the task finishes: commit on `Ok`, roll back on `Err` (panics included)
//! - the deadline elapses: the task is aborted and the transaction rolled back
//!
//! An aborted task may still be mid-flight when the rollback happens; anything
//! it does afterwards fails because the transaction handle is already closed.

use std::any::Any;
use std::backtrace::Backtrace;
use std::cell::RefCell;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::{Arc, Once};

use console_core::{Error, Result};
use futures::FutureExt;

use crate::application::{Application, Db};

pub async fn transactional<D, F, Fut, T>(db: &D, work: F) -> Result<T>
where
    D: Db + ?Sized,
    F: FnOnce(Arc<dyn Application>) -> Fut + Send + 'static,
    Fut: Future<Output = Result<T>> + Send + 'static,
    T: Send + 'static,
{
    install_panic_hook();

    let tx = match db.begin_transaction().await {
        Ok(tx) => tx,
        Err(err) => {
            tracing::error!(%err, "database BeginTransaction failed!");
            return Err(err);
        }
    };
    let timeout = db.transaction_timeout();
    let app = tx.clone().application();

    let mut task = tokio::spawn(async move {
        match AssertUnwindSafe(async move { work(app).await })
            .catch_unwind()
            .await
        {
            Ok(result) => result,
            Err(payload) => Err(recovered(payload)),
        }
    });

    match tokio::time::timeout(timeout, &mut task).await {
        Ok(joined) => {
            let outcome = joined.unwrap_or_else(|e| Err(Error::internal("transaction", e)));
            match outcome {
                Ok(value) => {
                    if let Err(err) = tx.commit().await {
                        tracing::error!(%err, "database transaction commit failed!");
                        return Err(err.context("transaction"));
                    }
                    tracing::debug!("Commit the transaction!");
                    Ok(value)
                }
                Err(err) => {
                    tracing::debug!(%err, "Rolling back the transaction...");
                    if let Err(rollback_err) = tx.rollback().await {
                        tracing::warn!(%rollback_err, "database transaction rollback failed");
                    }
                    tracing::error!(%err, "database transaction failed!");
                    Err(err.context("transaction"))
                }
            }
        }
        Err(_) => {
            task.abort();
            tracing::debug!("Rolling back the transaction...");
            if let Err(rollback_err) = tx.rollback().await {
                tracing::warn!(%rollback_err, "database transaction rollback failed");
            }
            tracing::error!(?timeout, "database transaction timeout!");
            Err(Error::Timeout(timeout))
        }
    }
}

thread_local! {
    static LAST_PANIC_BACKTRACE: RefCell<Option<Backtrace>> = const { RefCell::new(None) };
}

static PANIC_HOOK: Once = Once::new();

// The unwind has already discarded the panicking frames by the time
// `catch_unwind` returns, so the stack is captured from the hook, which runs on
// the panicking thread before unwinding starts. Chains to the previous hook.
fn install_panic_hook() {
    PANIC_HOOK.call_once(|| {
        let previous = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |info| {
            let backtrace = Backtrace::force_capture();
            LAST_PANIC_BACKTRACE.with(|slot| *slot.borrow_mut() = Some(backtrace));
            previous(info);
        }));
    });
}

fn recovered(payload: Box<dyn Any + Send>) -> Error {
    let message = if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    };
    let stack = LAST_PANIC_BACKTRACE
        .with(|slot| slot.borrow_mut().take())
        .map(|bt| bt.to_string())
        .unwrap_or_else(|| "<unavailable>".to_string());
    Error::internal("panic", format!("recovered {message}. stack: {stack}"))
}
