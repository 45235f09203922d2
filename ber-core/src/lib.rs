//! Core types for the BER decoding engine
//!
//! This crate provides the error type, decoder options, formatting modes and
//! type categories shared by the decoder and by schema implementations.

pub mod category;
pub mod error;
pub mod formatting_mode;
pub mod options;

pub use category::TypeCategory;
pub use error::{BerError, BerResult};
pub use formatting_mode::FormattingMode;
pub use options::DecoderOptions;
