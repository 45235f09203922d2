use thiserror::Error;

/// Main error type for BER decoding operations
#[derive(Error, Debug)]
pub enum BerError {
    /// Truncated or malformed identifier/length octets, or a length that
    /// does not fit the enclosing element or the remaining stream.
    #[error("Invalid data: {0}")]
    InvalidData(String),

    /// Unexpected tag class, tag type or tag number.
    #[error("Tag mismatch: {0}")]
    TagMismatch(String),

    #[error("Maximum decoding depth {max_depth} exceeded")]
    MaxDepthExceeded { max_depth: usize },

    #[error("Array size exceeds the limit of {max_size} elements")]
    ArraySizeExceeded { max_size: usize },

    #[error("Missing end-of-contents octets for indefinite length element")]
    MissingEndOfContents,

    /// The element's body was not consumed exactly as its length declared.
    #[error("Length mismatch: expected {expected} body bytes, consumed {consumed}")]
    LengthMismatch { expected: usize, consumed: usize },

    #[error("Unknown selection with tag number {tag_number}")]
    UnknownSelection { tag_number: u32 },

    #[error("Unknown attribute with tag number {tag_number}")]
    UnknownAttribute { tag_number: u32 },

    /// A primitive value, enumerator, customized value or selection was
    /// rejected while converting decoded contents.
    #[error("Conversion error: {0}")]
    Conversion(String),

    #[error("Invalid options: {0}")]
    InvalidOptions(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl BerError {
    pub fn invalid_data(msg: impl Into<String>) -> Self {
        BerError::InvalidData(msg.into())
    }

    pub fn tag_mismatch(msg: impl Into<String>) -> Self {
        BerError::TagMismatch(msg.into())
    }

    pub fn conversion(msg: impl Into<String>) -> Self {
        BerError::Conversion(msg.into())
    }
}

/// Result type alias for BER operations
pub type BerResult<T> = Result<T, BerError>;
