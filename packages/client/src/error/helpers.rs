use std::fmt;

/// A marker type to indicate that an attempt timed out.
#[derive(Debug)]
pub struct TimedOut;

impl fmt::Display for TimedOut {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("timed out")
    }
}

impl std::error::Error for TimedOut {}

/// A marker type to indicate that an in-flight attempt was aborted.
#[derive(Debug)]
pub struct OperationCanceled;

impl fmt::Display for OperationCanceled {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("operation canceled")
    }
}

impl std::error::Error for OperationCanceled {}

/// A marker type to indicate that the blocking wrapper lost its rendezvous.
#[derive(Debug)]
pub struct RendezvousClosed;

impl fmt::Display for RendezvousClosed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("request task ended without reporting an outcome")
    }
}

impl std::error::Error for RendezvousClosed {}
