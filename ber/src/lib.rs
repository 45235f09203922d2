//! ber - schema-driven BER (ITU-T X.690) decoding
//!
//! Decodes BER byte streams into Rust values described by a small set of
//! schema capability traits, one per type category.
//!
//! # Architecture
//!
//! This library is organized as a workspace with multiple crates:
//!
//! - `ber-core`: Error type, decoder options, formatting modes, type categories
//! - `ber-codec`: Tag/length reader, primitive reader, schema traits and the decoder
//!
//! # Usage
//!
//! ```
//! // SEQUENCE OF INTEGER { 1, 2 }
//! let data = [0x30, 0x06, 0x02, 0x01, 0x01, 0x02, 0x01, 0x02];
//! let values: Vec<i32> = ber::from_slice(&data).unwrap();
//! assert_eq!(values, vec![1, 2]);
//! ```
//!
//! For diagnostics of a failed call keep the [`BerDecoder`] around and read
//! [`BerDecoder::logged_messages`].

use std::io::Read;

// Re-export core types
pub use ber_core::{BerError, BerResult, DecoderOptions, FormattingMode, TypeCategory};

// Re-export the decoder
pub use ber_codec::ber::{
    BerDecoder, BerLength, BerTag, BerTagClass, BerTagType, ErrorSeverity, UniversalTagNumber,
};

// Re-export schema capabilities
pub mod schema {
    pub use ber_codec::schema::*;
}

pub use bytes::Bytes;

/// Decode one element from the front of `data` with default options
pub fn from_slice<T: schema::BerValue + Default>(data: &[u8]) -> BerResult<T> {
    from_slice_with_options(data, DecoderOptions::default())
}

/// Decode one element from the front of `data`
pub fn from_slice_with_options<T: schema::BerValue + Default>(
    data: &[u8],
    options: DecoderOptions,
) -> BerResult<T> {
    let mut decoder = BerDecoder::new(options);
    let mut value = T::default();
    decoder.decode_slice(data, &mut value)?;
    Ok(value)
}

/// Read `reader` to its end and decode one element with default options
pub fn from_reader<T: schema::BerValue + Default, R: Read>(mut reader: R) -> BerResult<T> {
    let mut decoder = BerDecoder::default();
    let mut value = T::default();
    decoder.decode_reader(&mut reader, &mut value)?;
    Ok(value)
}
