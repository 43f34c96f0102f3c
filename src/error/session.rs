use thiserror::Error;

/// Per-iteration failures. These are turned into failed checks by the
/// pipeline and never reach the scheduler.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Worker {worker} has no usable credential record.")]
    NoCredentials { worker: u64 },
    #[error("Login for worker {worker} returned status {status}.")]
    Authentication { worker: u64, status: u16 },
    #[error("Login for worker {worker} returned no token in any accepted shape.")]
    MissingToken { worker: u64 },
}
