//! BER (Basic Encoding Rules) decoding engine
//!
//! Each BER value is a TLV (Tag-Length-Value) triplet:
//!
//! ```text
//! [Identifier] [Length] [Contents] [End-of-contents, indefinite form only]
//! ```
//!
//! ## Identifier
//!
//! ```text
//! Bits: 8 7 6 5 4 3 2 1
//!       C C P T T T T T
//! ```
//! - CC = Class (00=Universal, 01=Application, 10=Context, 11=Private)
//! - P = Primitive (0) or Constructed (1)
//! - TTTTT = Tag number (0-30), or 11111 followed by base-128 octets
//!
//! ## Length
//!
//! - Short form: one octet, 0-127
//! - Long form: `1NNNNNNN` then N big-endian octets
//! - Indefinite form: `0x80`, contents closed by `0x00 0x00`
//!
//! # Decoding Model
//!
//! [`BerDecoder`] decodes one top-level element into a value described by
//! the [`crate::schema`] capability traits. The top-level element and every
//! array element carry their UNIVERSAL tag ([`universal`]); attributes of a
//! sequence and selections of a choice carry context-specific tags whose
//! numbers identify the field. Decoding is recursive descent over a stack
//! of nodes, one per element, bounded by `DecoderOptions::max_depth`.

pub mod decoder;
mod node;
pub mod primitive;
pub mod types;
pub mod universal;

pub use decoder::{BerDecoder, ErrorSeverity};
pub use types::{BerLength, BerTag, BerTagClass, BerTagType};
pub use universal::UniversalTagNumber;
