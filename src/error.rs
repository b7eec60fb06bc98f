use std::collections::TryReserveError;

/// Errors raised by the processing engine.
///
/// Setup failures (`Allocation`, `NoChannels`, `InvalidSampleRate`,
/// `InvalidMaxFrames`) are fatal: the engine has no usable state and the host
/// must not keep calling `process`. The remaining variants reject a block that
/// breaks the host contract; they are raised before any output sample is
/// written.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("failed to allocate {what}: {source}")]
    Allocation {
        what: &'static str,
        #[source]
        source: TryReserveError,
    },

    #[error("filter needs at least one channel")]
    NoChannels,

    #[error("invalid sample rate: {0}")]
    InvalidSampleRate(f32),

    #[error("max frames must be non-zero")]
    InvalidMaxFrames,

    #[error("process called before prepare")]
    NotPrepared,

    #[error("expected {expected} channels, got {actual}")]
    ChannelCount { expected: usize, actual: usize },

    #[error("channel buffers differ in length: expected {expected}, got {actual}")]
    LengthMismatch { expected: usize, actual: usize },

    #[error("block of {frames} frames exceeds prepared maximum of {max_frames}")]
    BlockTooLarge { frames: usize, max_frames: usize },
}

impl EngineError {
    /// Whether the engine must stop: no degraded operation is possible.
    pub const fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::Allocation { .. }
                | Self::NoChannels
                | Self::InvalidSampleRate(_)
                | Self::InvalidMaxFrames
        )
    }
}

pub type Result<T> = std::result::Result<T, EngineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn setup_failures_are_fatal() {
        let err = Vec::<f32>::new().try_reserve_exact(usize::MAX).unwrap_err();
        assert!(
            EngineError::Allocation {
                what: "test buffer",
                source: err
            }
            .is_fatal()
        );
        assert!(EngineError::NoChannels.is_fatal());
        assert!(EngineError::InvalidSampleRate(0.0).is_fatal());
        assert!(EngineError::InvalidMaxFrames.is_fatal());
    }

    #[test]
    fn contract_violations_are_not_fatal() {
        assert!(!EngineError::NotPrepared.is_fatal());
        assert!(
            !EngineError::BlockTooLarge {
                frames: 512,
                max_frames: 256
            }
            .is_fatal()
        );
        assert!(
            !EngineError::ChannelCount {
                expected: 2,
                actual: 1
            }
            .is_fatal()
        );
    }
}
