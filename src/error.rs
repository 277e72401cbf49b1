//! Error types for the ledger simulation. Every variant is fatal to the run.

use thiserror::Error;

/// Result type alias using the simulation's Error.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    /// A line that is neither what the grammar expects at this point nor end of input.
    #[error("{worker} thread failed to parse {expected} from \"{source_name}\" (line {line_no}: \"{line}\")")]
    UnexpectedLine {
        worker: String,
        source_name: String,
        expected: &'static str,
        line_no: usize,
        line: String,
    },

    /// Input ended inside a transaction section.
    #[error("{worker} thread reached end of input before the end of a transaction section in \"{source_name}\"")]
    PrematureEof { worker: String, source_name: String },

    #[error("{worker} thread failed to read \"{source_name}\": {err}")]
    Io {
        worker: String,
        source_name: String,
        #[source]
        err: std::io::Error,
    },

    #[error("invalid transaction grammar: {0}")]
    Grammar(#[from] regex::Error),

    #[error("failed to spawn thread: {0}")]
    Spawn(#[source] std::io::Error),

    /// The replacement policy found no frame at all.
    #[error("{worker} thread found no frame to reclaim")]
    NoVictim { worker: String },

    #[error("configuration error: {0}")]
    Config(String),
}

/// Terminates the whole process after reporting `err`
pub fn abort(err: &Error) -> ! {
    tracing::error!("{}", err);
    eprintln!("Error: {}", err);
    std::process::exit(1);
}
