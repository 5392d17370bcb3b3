use thiserror::Error;

/// Failures the poll loop knows how to recover from.
///
/// Only a [`MonitorError::RuntimeUnavailable`] raised while taking the
/// baseline snapshot is fatal; every other occurrence is logged and the
/// affected unit of work (tick, container or sink) is skipped.
#[derive(Debug, Error)]
pub enum MonitorError {
    #[error("container runtime unavailable: {0}")]
    RuntimeUnavailable(String),

    #[error("container {0} vanished before it could be inspected")]
    ContainerVanished(String),

    #[error("delivery to {sink} failed: {reason}")]
    DeliveryFailed { sink: String, reason: String },
}

impl From<bollard::errors::Error> for MonitorError {
    fn from(err: bollard::errors::Error) -> Self {
        match err {
            bollard::errors::Error::DockerResponseServerError {
                status_code: 404,
                message,
            } => MonitorError::ContainerVanished(message),
            other => MonitorError::RuntimeUnavailable(other.to_string()),
        }
    }
}

pub type Result<T, E = MonitorError> = std::result::Result<T, E>;
