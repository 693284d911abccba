use thiserror::Error;

/// Errors raised while building or writing an index.
#[derive(Error, Debug)]
pub enum IndexError {
    #[error("hash table is full ({capacity} slots); cannot insert")]
    TableFull { capacity: usize },

    #[error("cannot compute idf for an empty corpus")]
    EmptyCorpus,

    #[error("cannot write term {term:?} to the dictionary: {reason}")]
    UnwritableTerm { term: String, reason: &'static str },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("malformed index file at line {line}: {reason}")]
    Malformed { line: usize, reason: String },
}

pub type Result<T> = std::result::Result<T, IndexError>;

impl From<bincode::Error> for IndexError {
    fn from(e: bincode::Error) -> Self {
        IndexError::Serialization(e.to_string())
    }
}

impl From<serde_json::Error> for IndexError {
    fn from(e: serde_json::Error) -> Self {
        IndexError::Serialization(e.to_string())
    }
}

impl IndexError {
    /// Whether processing may continue after this error.
    ///
    /// A full table only caps index completeness, so callers drop the insert and go on.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, IndexError::TableFull { .. })
    }
}
