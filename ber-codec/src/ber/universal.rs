//! Universal tag numbers and the category-to-tag mapping
//!
//! Top-level values and array elements are self-describing: their
//! identifier carries the UNIVERSAL tag of their natural ASN.1 type.
//! `select` computes that tag for a schema value and a formatting mode.

use crate::schema::{BerValue, ValueMut};
use ber_core::{BerError, BerResult, FormattingMode};
use std::fmt;

/// UNIVERSAL class tag numbers (ITU-T X.680 §8.4)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UniversalTagNumber {
    Boolean = 1,
    Integer = 2,
    BitString = 3,
    OctetString = 4,
    Null = 5,
    ObjectIdentifier = 6,
    Real = 9,
    Enumerated = 10,
    Utf8String = 12,
    Sequence = 16,
    Set = 17,
    PrintableString = 19,
    Ia5String = 22,
    UtcTime = 23,
    GeneralizedTime = 24,
    VisibleString = 26,
}

impl UniversalTagNumber {
    pub fn number(self) -> u32 {
        self as u32
    }

    pub fn name(self) -> &'static str {
        match self {
            UniversalTagNumber::Boolean => "BOOLEAN",
            UniversalTagNumber::Integer => "INTEGER",
            UniversalTagNumber::BitString => "BIT STRING",
            UniversalTagNumber::OctetString => "OCTET STRING",
            UniversalTagNumber::Null => "NULL",
            UniversalTagNumber::ObjectIdentifier => "OBJECT IDENTIFIER",
            UniversalTagNumber::Real => "REAL",
            UniversalTagNumber::Enumerated => "ENUMERATED",
            UniversalTagNumber::Utf8String => "UTF8String",
            UniversalTagNumber::Sequence => "SEQUENCE",
            UniversalTagNumber::Set => "SET",
            UniversalTagNumber::PrintableString => "PrintableString",
            UniversalTagNumber::Ia5String => "IA5String",
            UniversalTagNumber::UtcTime => "UTCTime",
            UniversalTagNumber::GeneralizedTime => "GeneralizedTime",
            UniversalTagNumber::VisibleString => "VisibleString",
        }
    }
}

impl fmt::Display for UniversalTagNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name(), self.number())
    }
}

/// Expected UNIVERSAL tag number for `value` under `mode`
///
/// # Mapping
/// - Sequence, Choice, Array: SEQUENCE
/// - Byte array: OCTET STRING (UTF8String under `TEXT`)
/// - Enumeration: ENUMERATED
/// - Nullable: SEQUENCE when `NILLABLE`, otherwise the contained type's tag
/// - Customized: the base type's tag
/// - Simple: asked from the value itself
/// - Dynamic: the tag of the resolved category
///
/// A non-nillable nullable value is made non-null to look at its contained
/// type; it is decoded through right after, so this has no visible effect
/// on successful decodes.
pub fn select(value: &mut dyn BerValue, mode: FormattingMode) -> BerResult<UniversalTagNumber> {
    select_for(value.value_mut(), mode)
}

fn select_for(value: ValueMut<'_>, mode: FormattingMode) -> BerResult<UniversalTagNumber> {
    match value {
        ValueMut::Simple(simple) => Ok(simple.universal_tag_number(mode)),
        ValueMut::Sequence(_) | ValueMut::Choice(_) | ValueMut::Array(_) => {
            Ok(UniversalTagNumber::Sequence)
        }
        ValueMut::ByteArray(_) => {
            if mode.type_mode() == FormattingMode::TEXT {
                Ok(UniversalTagNumber::Utf8String)
            } else {
                Ok(UniversalTagNumber::OctetString)
            }
        }
        ValueMut::Enumeration(_) => Ok(UniversalTagNumber::Enumerated),
        ValueMut::Nullable(nullable) => {
            if mode.is_nillable() {
                return Ok(UniversalTagNumber::Sequence);
            }
            nullable.make_value();
            match nullable.inner_mut() {
                Some(inner) => select(inner, mode),
                None => Err(BerError::conversion(
                    "Nullable value has no contained value after make_value",
                )),
            }
        }
        ValueMut::Customized(customized) => customized.base_tag_number(mode),
        ValueMut::Dynamic(dynamic) => match dynamic.resolve() {
            ValueMut::Dynamic(_) => Err(BerError::conversion(
                "Dynamic type must resolve to a concrete category",
            )),
            resolved => select_for(resolved, mode),
        },
    }
}
