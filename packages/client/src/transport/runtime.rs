//! Runtime the transport dispatches attempts on

use std::future::Future;

use tokio::runtime::{Builder, Handle, Runtime, RuntimeFlavor};
use tokio::task::JoinHandle;

use crate::error::{self, Result};

/// Runtime the transport dispatches its attempts on: either one it owns or
/// a handle supplied by the caller.
pub(crate) struct RuntimeHost {
    owned: Option<Runtime>,
    handle: Handle,
}

impl RuntimeHost {
    pub(crate) fn owned() -> Result<Self> {
        let runtime = Builder::new_multi_thread()
            .worker_threads(2)
            .thread_name("eskit-transport")
            .enable_all()
            .build()
            .map_err(error::builder)?;
        let handle = runtime.handle().clone();
        Ok(Self {
            owned: Some(runtime),
            handle,
        })
    }

    pub(crate) fn borrowed(handle: Handle) -> Self {
        Self {
            owned: None,
            handle,
        }
    }

    pub(crate) fn spawn<F>(&self, future: F) -> JoinHandle<F::Output>
    where
        F: Future + Send + 'static,
        F::Output: Send + 'static,
    {
        self.handle.spawn(future)
    }

    /// Run `wait`, which parks the calling thread until an attempt on this
    /// runtime reports back.
    ///
    /// On a multi-thread worker the wait runs under `block_in_place` so the
    /// worker's queued tasks, the attempt included, move to another thread.
    /// A current-thread runtime has no other thread to run the attempt, so
    /// the call is refused.
    pub(crate) fn block<T>(&self, wait: impl FnOnce() -> T) -> Result<T> {
        match Handle::try_current().map(|current| current.runtime_flavor()) {
            Ok(RuntimeFlavor::CurrentThread) => Err(error::builder(
                "blocking request issued from a current-thread async runtime; use the async API",
            )),
            Ok(RuntimeFlavor::MultiThread) => Ok(tokio::task::block_in_place(wait)),
            _ => Ok(wait()),
        }
    }
}

impl Drop for RuntimeHost {
    fn drop(&mut self) {
        if let Some(runtime) = self.owned.take() {
            runtime.shutdown_background();
        }
    }
}
