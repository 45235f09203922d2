//! BER encoding types (Tag, Length, etc.)

use ber_core::{BerError, BerResult};
use bytes::Buf;
use std::fmt;

/// BER Tag Class
///
/// ASN.1 defines four tag classes:
/// - **Universal**: Standard ASN.1 types (INTEGER, OCTET STRING, etc.)
/// - **Application**: Application-specific types
/// - **Context-specific**: Context-dependent types (used in SEQUENCE/CHOICE)
/// - **Private**: Private/implementation-specific types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BerTagClass {
    /// Universal class (00)
    Universal = 0,
    /// Application class (01)
    Application = 1,
    /// Context-specific class (10)
    ContextSpecific = 2,
    /// Private class (11)
    Private = 3,
}

impl BerTagClass {
    /// Get tag class from the identifier octet (bits 8-7)
    pub fn from_bits(bits: u8) -> Self {
        match (bits >> 6) & 0x03 {
            0 => BerTagClass::Universal,
            1 => BerTagClass::Application,
            2 => BerTagClass::ContextSpecific,
            _ => BerTagClass::Private,
        }
    }

    /// Convert tag class to bits (for encoding)
    pub fn to_bits(self) -> u8 {
        (self as u8) << 6
    }

    pub fn name(self) -> &'static str {
        match self {
            BerTagClass::Universal => "UNIVERSAL",
            BerTagClass::Application => "APPLICATION",
            BerTagClass::ContextSpecific => "CONTEXT",
            BerTagClass::Private => "PRIVATE",
        }
    }
}

/// BER Tag Type (bit 6 of the identifier octet)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BerTagType {
    Primitive,
    Constructed,
}

impl BerTagType {
    pub fn name(self) -> &'static str {
        match self {
            BerTagType::Primitive => "PRIMITIVE",
            BerTagType::Constructed => "CONSTRUCTED",
        }
    }
}

/// BER Tag
///
/// A BER tag identifies the type of an ASN.1 value. It consists of:
/// - **Class**: Universal, Application, Context-specific, or Private
/// - **Type**: Primitive or Constructed (contains other values)
/// - **Tag Number**: The actual tag number (0-30 for short form, or extended)
///
/// # Encoding Format
///
/// Short form (tag number 0-30):
/// ```text
/// Bits: 8 7 6 5 4 3 2 1
///       C C P T T T T T
/// ```
///
/// Extended form (tag number > 30):
/// ```text
/// First byte:  C C P 1 1 1 1 1  (all tag bits set to 1)
/// Following bytes: 1 T T T T T T T  (continuation bytes, last byte has bit 8 = 0)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BerTag {
    class: BerTagClass,
    tag_type: BerTagType,
    number: u32,
}

impl BerTag {
    /// Largest number of octets accepted after the first identifier octet.
    /// Five base-128 groups hold any `u32`.
    const MAX_EXTENDED_OCTETS: usize = 5;

    pub fn new(class: BerTagClass, tag_type: BerTagType, number: u32) -> Self {
        Self {
            class,
            tag_type,
            number,
        }
    }

    /// Create a Universal class tag
    pub fn universal(constructed: bool, number: u32) -> Self {
        Self::new(BerTagClass::Universal, Self::type_of(constructed), number)
    }

    /// Create an Application class tag
    pub fn application(constructed: bool, number: u32) -> Self {
        Self::new(BerTagClass::Application, Self::type_of(constructed), number)
    }

    /// Create a Context-specific class tag
    pub fn context_specific(constructed: bool, number: u32) -> Self {
        Self::new(BerTagClass::ContextSpecific, Self::type_of(constructed), number)
    }

    /// Create a Private class tag
    pub fn private(constructed: bool, number: u32) -> Self {
        Self::new(BerTagClass::Private, Self::type_of(constructed), number)
    }

    fn type_of(constructed: bool) -> BerTagType {
        if constructed {
            BerTagType::Constructed
        } else {
            BerTagType::Primitive
        }
    }

    /// Get tag class
    pub fn class(&self) -> BerTagClass {
        self.class
    }

    pub fn tag_type(&self) -> BerTagType {
        self.tag_type
    }

    /// Check if tag is constructed
    pub fn is_constructed(&self) -> bool {
        self.tag_type == BerTagType::Constructed
    }

    /// Get tag number
    pub fn number(&self) -> u32 {
        self.number
    }

    /// Encode tag to bytes
    ///
    /// # Encoding Strategy
    /// - If tag number <= 30: Use short form (1 byte)
    /// - If tag number > 30: Use extended form (multiple bytes)
    pub fn encode(&self) -> Vec<u8> {
        let mut result = Vec::new();

        let class_bits = self.class.to_bits();
        let constructed_bit = if self.is_constructed() { 0x20 } else { 0x00 };

        if self.number <= 30 {
            result.push(class_bits | constructed_bit | (self.number as u8 & 0x1F));
        } else {
            result.push(class_bits | constructed_bit | 0x1F);

            let mut remaining = self.number;
            let mut groups = Vec::new();
            while remaining > 0 {
                groups.push((remaining & 0x7F) as u8);
                remaining >>= 7;
            }

            // Continuation bit on all but the last group
            for (i, &group) in groups.iter().rev().enumerate() {
                if i < groups.len() - 1 {
                    result.push(group | 0x80);
                } else {
                    result.push(group);
                }
            }
        }

        result
    }

    /// Read a tag from the current position of a byte stream
    ///
    /// # Returns
    /// Returns `Ok((BerTag, bytes_consumed))` if successful, `Err` otherwise
    ///
    /// # Error Handling
    /// Returns error if:
    /// - The stream is exhausted before the identifier is complete
    /// - The extended tag number has a leading zero group or does not fit `u32`
    pub fn read(stream: &mut dyn Buf) -> BerResult<(Self, usize)> {
        if !stream.has_remaining() {
            return Err(BerError::invalid_data(
                "Stream exhausted while reading tag identifier",
            ));
        }

        let first_byte = stream.get_u8();
        let class = BerTagClass::from_bits(first_byte);
        let tag_type = Self::type_of((first_byte & 0x20) != 0);
        let tag_bits = first_byte & 0x1F;

        if tag_bits < 31 {
            return Ok((Self::new(class, tag_type, tag_bits as u32), 1));
        }

        let mut tag_number = 0u32;
        let mut consumed = 1;
        loop {
            if !stream.has_remaining() {
                return Err(BerError::invalid_data(
                    "Incomplete extended tag encoding",
                ));
            }
            let byte = stream.get_u8();
            consumed += 1;

            if consumed == 2 && byte == 0x80 {
                return Err(BerError::invalid_data(
                    "Extended tag number has a leading zero group",
                ));
            }
            if consumed > 1 + Self::MAX_EXTENDED_OCTETS || tag_number > (u32::MAX >> 7) {
                return Err(BerError::invalid_data(
                    "Tag number too large or invalid encoding",
                ));
            }

            tag_number = (tag_number << 7) | (byte & 0x7F) as u32;
            if byte & 0x80 == 0 {
                break;
            }
        }

        Ok((Self::new(class, tag_type, tag_number), consumed))
    }
}

impl fmt::Display for BerTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {}",
            self.class.name(),
            self.tag_type.name(),
            self.number
        )
    }
}

/// BER Length
///
/// Length can be encoded in three ways:
/// - **Short form**: For lengths 0-127 (1 byte, bit 8 clear)
/// - **Long form**: First byte `1NNNNNNN` gives the number N of following
///   big-endian length octets
/// - **Indefinite form**: The single octet `0x80`; the contents end with an
///   end-of-contents marker (`0x00 0x00`). Only allowed for constructed
///   elements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BerLength {
    Definite(usize),
    Indefinite,
}

impl BerLength {
    /// Largest number of long form length octets accepted (32-bit lengths)
    const MAX_LENGTH_OCTETS: usize = 4;

    /// Get the definite length value, `None` for indefinite length
    pub fn value(&self) -> Option<usize> {
        match self {
            BerLength::Definite(length) => Some(*length),
            BerLength::Indefinite => None,
        }
    }

    pub fn is_indefinite(&self) -> bool {
        matches!(self, BerLength::Indefinite)
    }

    /// Encode length to bytes
    ///
    /// Definite lengths below 128 use the short form, larger ones the
    /// minimal long form.
    pub fn encode(&self) -> Vec<u8> {
        match *self {
            BerLength::Indefinite => vec![0x80],
            BerLength::Definite(length) if length < 128 => vec![length as u8],
            BerLength::Definite(length) => {
                let mut num_bytes = 0;
                let mut temp = length;
                while temp > 0 {
                    num_bytes += 1;
                    temp >>= 8;
                }

                let mut result = vec![0x80 | (num_bytes as u8)];
                for i in (0..num_bytes).rev() {
                    result.push(((length >> (i * 8)) & 0xFF) as u8);
                }
                result
            }
        }
    }

    /// Read a length from the current position of a byte stream
    ///
    /// # Returns
    /// Returns `Ok((BerLength, bytes_consumed))` if successful, `Err` otherwise
    ///
    /// # Error Handling
    /// Returns error if:
    /// - The stream is exhausted
    /// - The reserved value `0xFF` is used
    /// - More than four length octets are used
    pub fn read(stream: &mut dyn Buf) -> BerResult<(Self, usize)> {
        if !stream.has_remaining() {
            return Err(BerError::invalid_data(
                "Stream exhausted while reading length",
            ));
        }

        let first_byte = stream.get_u8();

        if (first_byte & 0x80) == 0 {
            return Ok((BerLength::Definite((first_byte & 0x7F) as usize), 1));
        }

        let num_bytes = (first_byte & 0x7F) as usize;
        if num_bytes == 0 {
            return Ok((BerLength::Indefinite, 1));
        }
        if num_bytes == 0x7F {
            return Err(BerError::invalid_data("Reserved length octet 0xFF"));
        }
        if num_bytes > Self::MAX_LENGTH_OCTETS {
            return Err(BerError::InvalidData(format!(
                "Length encoding too large: {} bytes (max {})",
                num_bytes,
                Self::MAX_LENGTH_OCTETS
            )));
        }
        if stream.remaining() < num_bytes {
            return Err(BerError::InvalidData(format!(
                "Stream too short for long form length: need {} bytes, got {}",
                num_bytes,
                stream.remaining()
            )));
        }

        let mut length = 0usize;
        for _ in 0..num_bytes {
            length = (length << 8) | stream.get_u8() as usize;
        }

        Ok((BerLength::Definite(length), 1 + num_bytes))
    }
}

impl fmt::Display for BerLength {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BerLength::Definite(length) => write!(f, "{}", length),
            BerLength::Indefinite => f.write_str("indefinite"),
        }
    }
}
