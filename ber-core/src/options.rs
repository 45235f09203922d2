//! Decoder options
//!
//! Options bound the work a single decode call may do. They are plain data
//! and can be loaded from any serde-supported configuration format; missing
//! fields take their default values.

use crate::error::{BerError, BerResult};
use serde::{Deserialize, Serialize};

/// Options controlling a BER decoder
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DecoderOptions {
    /// Maximum number of nested elements (root included)
    max_depth: usize,
    /// Maximum number of elements decoded into a single array
    max_sequence_size: usize,
    /// Skip sequence attributes whose tag number the schema does not know
    skip_unknown_elements: bool,
    /// When non-zero, every tag header read is recorded in the decoder log
    trace_level: u8,
}

impl DecoderOptions {
    pub const DEFAULT_MAX_DEPTH: usize = 32;
    pub const DEFAULT_MAX_SEQUENCE_SIZE: usize = 0x7FF_FFFF;

    pub fn new() -> Self {
        Self::default()
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    pub fn max_sequence_size(&self) -> usize {
        self.max_sequence_size
    }

    pub fn skip_unknown_elements(&self) -> bool {
        self.skip_unknown_elements
    }

    pub fn trace_level(&self) -> u8 {
        self.trace_level
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn with_max_sequence_size(mut self, max_sequence_size: usize) -> Self {
        self.max_sequence_size = max_sequence_size;
        self
    }

    pub fn with_skip_unknown_elements(mut self, skip: bool) -> Self {
        self.skip_unknown_elements = skip;
        self
    }

    pub fn with_trace_level(mut self, trace_level: u8) -> Self {
        self.trace_level = trace_level;
        self
    }

    /// Check the options are usable
    ///
    /// # Errors
    ///
    /// Returns `BerError::InvalidOptions` if `max_depth` is zero, since no
    /// element (not even the root) could be decoded.
    pub fn validate(&self) -> BerResult<()> {
        if self.max_depth == 0 {
            return Err(BerError::InvalidOptions(
                "max_depth must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for DecoderOptions {
    fn default() -> Self {
        Self {
            max_depth: Self::DEFAULT_MAX_DEPTH,
            max_sequence_size: Self::DEFAULT_MAX_SEQUENCE_SIZE,
            skip_unknown_elements: true,
            trace_level: 0,
        }
    }
}
