use std::panic;
use std::sync::Arc;
use std::sync::mpsc::channel;

use anyhow::Result;
use scoped_thread_pool::Pool;

/// Execute function inside thread pool and return its result. Panics
/// in `f` are carried over to the calling thread.
pub fn in_threadpool<F, R>(threadpool: Arc<Pool>, f: F) -> Result<R>
where F: FnOnce() -> R + Send,
      R: Send
{
    let (tx, rx) = channel();
    threadpool.scoped(move |scope| {
        scope.execute(move || {
            let result = panic::catch_unwind(panic::AssertUnwindSafe(f));
            // The receiver only goes away if the caller is gone.
            let _ = tx.send(result);
        });
        match rx.recv()? {
            Ok(v) => Ok(v),
            Err(payload) => panic::resume_unwind(payload)
        }
    })
}
