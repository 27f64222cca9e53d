//! Error types for the producer/consumer bridge

use std::fmt;

/// Which end of a pipe an error is about.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Side {
    Producer,
    Consumer,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Producer => f.write_str("producer"),
            Side::Consumer => f.write_str("consumer"),
        }
    }
}

/// Error type for pipe operations
///
/// Cross-thread failures have no meaningful source position, so every
/// message carries the unknown-position marker used by parse errors.
#[derive(Debug, thiserror::Error, Clone, PartialEq, Eq)]
pub enum PipeError {
    /// The consumer closed the pipe
    #[error("Pipe closed by reader [line: -1, col: -1]")]
    ClosedByReader,

    /// The producer already called `finish`
    #[error("Pipe closed by writer [line: -1, col: -1]")]
    ClosedByWriter,

    /// Data requested before the producer called `start`
    #[error("Pipe not started [line: -1, col: -1]")]
    NotStarted,

    /// `start` called twice, or on a single-shot pipe that already ran
    #[error("Pipe already started [line: -1, col: -1]")]
    AlreadyStarted,

    /// A second producer tried to connect
    #[error("Pipe already connected [line: -1, col: -1]")]
    AlreadyConnected,

    /// The iterator has no producer attached
    #[error("Pipe not connected [line: -1, col: -1]")]
    NotConnected,

    /// The producer went away without calling `finish`
    #[error("Producer dead [line: -1, col: -1]")]
    ProducerDead,

    /// The consumer's thread ended while the producer was still writing
    #[error("Consumer dead [line: -1, col: -1]")]
    ConsumerDead,

    /// One thread is driving both ends and would wait on itself forever
    #[error("Pipe deadlock: producer and consumer on the same thread [line: -1, col: -1]")]
    SelfDeadlock,

    /// Polling gave up without seeing progress
    #[error("Pipe stalled: no progress from {side} after {attempts} attempts [line: -1, col: -1]")]
    Stalled { side: Side, attempts: u32 },

    /// A blocked wait was cancelled
    #[error("Pipe wait interrupted [line: -1, col: -1]")]
    Interrupted,

    /// `try_next` called with nothing left to return
    #[error("Pipe exhausted [line: -1, col: -1]")]
    Exhausted,
}

impl PipeError {
    /// Whether the error means the other side stopped responding.
    pub fn is_liveness(&self) -> bool {
        matches!(
            self,
            PipeError::ProducerDead
                | PipeError::ConsumerDead
                | PipeError::SelfDeadlock
                | PipeError::Stalled { .. }
        )
    }
}

/// Result type for pipe operations
pub type Result<T> = std::result::Result<T, PipeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_carry_unknown_position() {
        let errors = [
            PipeError::ClosedByReader,
            PipeError::ProducerDead,
            PipeError::Stalled {
                side: Side::Producer,
                attempts: 3,
            },
        ];
        for err in errors {
            assert!(err.to_string().ends_with("[line: -1, col: -1]"), "{}", err);
        }
    }

    #[test]
    fn test_stalled_names_side() {
        let err = PipeError::Stalled {
            side: Side::Consumer,
            attempts: 10,
        };
        assert_eq!(
            err.to_string(),
            "Pipe stalled: no progress from consumer after 10 attempts [line: -1, col: -1]"
        );
        assert!(err.is_liveness());
        assert!(!PipeError::ClosedByReader.is_liveness());
    }
}
