//! Error type for the brook facade

use brook_bnode::AllocError;
use brook_graph_turtle::TurtleError;
use brook_stream::PipeError;

#[derive(Debug, thiserror::Error)]
pub enum RdfError {
    /// Lexical, syntax or term-position error in the input
    #[error(transparent)]
    Parse(#[from] TurtleError),

    /// Unusable blank-node allocator configuration
    #[error(transparent)]
    Alloc(#[from] AllocError),

    /// Producer/consumer bridge failure
    #[error(transparent)]
    Pipe(#[from] PipeError),

    /// The worker thread could not be spawned
    #[error("failed to spawn parse worker: {0}")]
    Spawn(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, RdfError>;
