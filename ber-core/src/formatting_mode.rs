//! Per-field formatting mode
//!
//! A formatting mode travels with every schema field. The low byte selects
//! how a simple value is represented (decimal, hex, base64, text), the upper
//! bits are independent flags that change the shape of the encoding, such as
//! `UNTAGGED` choices and `NILLABLE` nullable values.
//!
//! During decoding a node inherits the mode of its parent unless the schema
//! supplies one for the field being decoded.

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

bitflags! {
    /// Formatting mode bitmask
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    #[serde(transparent)]
    pub struct FormattingMode: u32 {
        const DEFAULT = 0x0000_0000;
        const DEC = 0x0000_0001;
        const HEX = 0x0000_0002;
        const BASE64 = 0x0000_0004;
        const TEXT = 0x0000_0008;
        const TYPE_MASK = 0x0000_00FF;

        /// Choice is encoded without the context tag 0 wrapper.
        const UNTAGGED = 0x0001_0000;
        const ATTRIBUTE = 0x0002_0000;
        const SIMPLE_CONTENT = 0x0004_0000;
        /// Nullable value is wrapped so that null can be represented.
        const NILLABLE = 0x0008_0000;
        const LIST = 0x0010_0000;
    }
}

impl FormattingMode {
    /// Representation part of the mode (the bits under `TYPE_MASK`).
    pub fn type_mode(self) -> FormattingMode {
        self & FormattingMode::TYPE_MASK
    }

    pub fn is_untagged(self) -> bool {
        self.contains(FormattingMode::UNTAGGED)
    }

    pub fn is_nillable(self) -> bool {
        self.contains(FormattingMode::NILLABLE)
    }
}
