//! Cancellable handle to an in-flight attempt

use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use tokio::task::{JoinError, JoinHandle};

use crate::error::{self, OperationCanceled, Result};
use crate::http::HttpResult;

/// In-flight request dispatched on the transport's runtime.
///
/// Await it for the outcome, or call [`abort`](Self::abort) to cancel the
/// attempt. An aborted request resolves to an error and reports nothing
/// about the health of its connection.
#[derive(Debug)]
pub struct RequestHandle<T = HttpResult> {
    inner: JoinHandle<Result<T>>,
}

impl<T> RequestHandle<T> {
    pub(crate) fn new(inner: JoinHandle<Result<T>>) -> Self {
        Self { inner }
    }

    pub fn abort(&self) {
        self.inner.abort();
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.inner.is_finished()
    }
}

impl<T> Future for RequestHandle<T> {
    type Output = Result<T>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.inner)
            .poll(cx)
            .map(|joined| joined.unwrap_or_else(|e| Err(join_error(e))))
    }
}

fn join_error(e: JoinError) -> error::Error {
    if e.is_cancelled() {
        error::unknown(OperationCanceled)
    } else {
        error::unknown(e)
    }
}
