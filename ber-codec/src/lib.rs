//! Schema-driven BER (ITU-T X.690) decoder
//!
//! This crate provides the decoding engine: tag and length readers, the
//! primitive value reader, the schema capability traits a target type
//! implements, and [`BerDecoder`], which walks a byte stream and populates
//! a target value of any category.
//!
//! # TODO
//!
//! - [x] Tag/length reader (short, long and indefinite forms)
//! - [x] Sequence, choice, array, nullable, customized, enumeration and dynamic categories
//! - [x] Constructed OCTET STRING segments
//! - [ ] Decimal REAL encodings (X.690 §8.5.8)

pub mod ber;
pub mod schema;

#[cfg(test)]
pub(crate) mod testutil;

pub use ber::{BerDecoder, BerLength, BerTag, BerTagClass, BerTagType, ErrorSeverity};
pub use schema::{BerValue, FieldInfo, ValueMut};
