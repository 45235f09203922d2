//! BER decoder driver
//!
//! # Usage Example
//!
//! ```rust
//! use ber_codec::ber::BerDecoder;
//!
//! let data = [0x02, 0x02, 0x30, 0x39];
//! let mut decoder = BerDecoder::default();
//! let mut value = 0i32;
//! decoder.decode_slice(&data, &mut value).unwrap();
//! assert_eq!(value, 12345);
//! ```

use crate::ber::node::{Session, UniversalElementVisitor};
use crate::schema::BerValue;
use ber_core::{BerResult, DecoderOptions};
use bytes::Buf;
use std::io::Read;

/// Outcome of the last decode call
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    #[default]
    Success = 0,
    Error = 2,
}

/// Schema-driven BER decoder
///
/// Decodes one top-level element per call into a value described by the
/// [`crate::schema`] capability traits. The top-level element must carry the
/// UNIVERSAL tag of the value's natural type.
///
/// # Diagnostics
///
/// Every failure is logged together with the chain of elements being decoded
/// (field name, tag, length and offset of each) and is readable through
/// [`logged_messages`](Self::logged_messages) until the next call.
///
/// # Reuse
///
/// A decoder can be reused after success or failure; per-call state is reset
/// at the start of every call.
#[derive(Debug, Clone, Default)]
pub struct BerDecoder {
    options: DecoderOptions,
    severity: ErrorSeverity,
    log: Option<String>,
    max_depth_exceeded: bool,
}

impl BerDecoder {
    /// Create a new decoder
    ///
    /// # Arguments
    /// * `options` - Limits and behavior switches for every call
    pub fn new(options: DecoderOptions) -> Self {
        Self {
            options,
            ..Self::default()
        }
    }

    pub fn options(&self) -> &DecoderOptions {
        &self.options
    }

    /// Severity of the last call, `Success` before the first one
    pub fn error_severity(&self) -> ErrorSeverity {
        self.severity
    }

    /// Diagnostics of the last call, empty when nothing was logged
    pub fn logged_messages(&self) -> &str {
        self.log.as_deref().unwrap_or("")
    }

    /// Whether the last call failed on the depth ceiling
    pub fn max_depth_exceeded(&self) -> bool {
        self.max_depth_exceeded
    }

    fn reset(&mut self) {
        self.severity = ErrorSeverity::Success;
        self.max_depth_exceeded = false;
        if let Some(log) = self.log.as_mut() {
            log.clear();
        }
    }

    fn fail_before_decoding(&mut self, msg: &str) {
        self.severity = ErrorSeverity::Error;
        let log = self.log.get_or_insert_with(String::new);
        log.push_str(msg);
        log.push('\n');
    }

    /// Decode one element from `stream` into `value`
    ///
    /// On success the stream is positioned right after the element.
    ///
    /// # Error Handling
    /// Returns error if:
    /// - The options are invalid
    /// - The bytes are not well-formed BER
    /// - The encoding does not match the schema of `value`
    /// - A depth, size or conversion limit is hit
    ///
    /// `value` is reset to its default state first, so attributes absent
    /// from the stream keep their defaults. On failure `value` may be
    /// partially populated.
    pub fn decode<B: Buf>(&mut self, stream: &mut B, value: &mut dyn BerValue) -> BerResult<()> {
        self.reset();
        if let Err(e) = self.options.validate() {
            self.fail_before_decoding(&e.to_string());
            return Err(e);
        }

        value.reset_value();

        let mut session = Session::new(&self.options, stream, self.log.take());
        let result = UniversalElementVisitor::new(&mut session).visit(value);
        let consumed = session.position();
        let (severity, log, max_depth_exceeded) = session.finish();

        self.severity = severity;
        self.log = log;
        self.max_depth_exceeded = max_depth_exceeded;

        match &result {
            Ok(()) => log::debug!("Decoded BER element of {} bytes", consumed),
            Err(e) => log::debug!("BER decoding failed after {} bytes: {}", consumed, e),
        }
        result
    }

    /// Decode one element from the front of `data`
    ///
    /// # Returns
    /// Returns the number of bytes the element occupied.
    pub fn decode_slice(&mut self, data: &[u8], value: &mut dyn BerValue) -> BerResult<usize> {
        let mut cursor = data;
        self.decode(&mut cursor, value)?;
        Ok(data.len() - cursor.len())
    }

    /// Read `reader` to its end and decode one element from the bytes
    ///
    /// # Error Handling
    /// Returns `BerError::Io` if reading fails, otherwise as [`decode`](Self::decode).
    pub fn decode_reader<R: Read>(
        &mut self,
        reader: &mut R,
        value: &mut dyn BerValue,
    ) -> BerResult<usize> {
        let mut data = Vec::new();
        if let Err(e) = reader.read_to_end(&mut data) {
            self.reset();
            self.fail_before_decoding(&format!("I/O error: {}", e));
            return Err(e.into());
        }
        self.decode_slice(&data, value)
    }
}
