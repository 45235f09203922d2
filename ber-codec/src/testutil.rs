//! Test fixtures: a small TLV builder and hand-written schema types

use crate::ber::types::{BerLength, BerTag};
use crate::ber::universal::UniversalTagNumber;
use crate::schema::{
    BerValue, ChoiceValue, Customized, DynamicValue, Enumerated, FieldInfo, SequenceValue,
    ValueMut,
};
use ber_core::{BerError, BerResult, FormattingMode};
use bytes::Bytes;

/// Tag, definite length and contents
pub fn tlv(tag: BerTag, contents: &[u8]) -> Vec<u8> {
    let mut buffer = tag.encode();
    buffer.extend_from_slice(&BerLength::Definite(contents.len()).encode());
    buffer.extend_from_slice(contents);
    buffer
}

/// Tag, indefinite length, contents and end-of-contents octets
pub fn indefinite(tag: BerTag, contents: &[u8]) -> Vec<u8> {
    let mut buffer = tag.encode();
    buffer.extend_from_slice(&BerLength::Indefinite.encode());
    buffer.extend_from_slice(contents);
    buffer.extend_from_slice(&[0x00, 0x00]);
    buffer
}

/// Minimal two's complement contents of an INTEGER
pub fn integer_contents(value: i64) -> Vec<u8> {
    let bytes = value.to_be_bytes();
    let mut start = 0;
    while start < 7 {
        let redundant = (bytes[start] == 0x00 && bytes[start + 1] & 0x80 == 0)
            || (bytes[start] == 0xFF && bytes[start + 1] & 0x80 != 0);
        if !redundant {
            break;
        }
        start += 1;
    }
    bytes[start..].to_vec()
}

fn universal_primitive(number: UniversalTagNumber, contents: &[u8]) -> Vec<u8> {
    tlv(BerTag::universal(false, number.number()), contents)
}

pub fn integer(value: i64) -> Vec<u8> {
    universal_primitive(UniversalTagNumber::Integer, &integer_contents(value))
}

pub fn boolean(value: bool) -> Vec<u8> {
    universal_primitive(UniversalTagNumber::Boolean, &[if value { 0xFF } else { 0x00 }])
}

pub fn utf8(value: &str) -> Vec<u8> {
    universal_primitive(UniversalTagNumber::Utf8String, value.as_bytes())
}

pub fn octets(value: &[u8]) -> Vec<u8> {
    universal_primitive(UniversalTagNumber::OctetString, value)
}

pub fn enumerated(value: i64) -> Vec<u8> {
    universal_primitive(UniversalTagNumber::Enumerated, &integer_contents(value))
}

/// Universal constructed SEQUENCE around already encoded elements
pub fn sequence(elements: &[u8]) -> Vec<u8> {
    tlv(
        BerTag::universal(true, UniversalTagNumber::Sequence.number()),
        elements,
    )
}

/// Context-specific constructed element
pub fn context(number: u32, contents: &[u8]) -> Vec<u8> {
    tlv(BerTag::context_specific(true, number), contents)
}

pub fn context_integer(number: u32, value: i64) -> Vec<u8> {
    tlv(
        BerTag::context_specific(false, number),
        &integer_contents(value),
    )
}

pub fn context_utf8(number: u32, value: &str) -> Vec<u8> {
    tlv(BerTag::context_specific(false, number), value.as_bytes())
}

pub fn context_octets(number: u32, value: &[u8]) -> Vec<u8> {
    tlv(BerTag::context_specific(false, number), value)
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Address {
    pub street: String,
    pub city: String,
}

const ADDRESS_ATTRIBUTES: &[FieldInfo] = &[
    FieldInfo::new(0, "street", FormattingMode::DEFAULT),
    FieldInfo::new(1, "city", FormattingMode::DEFAULT),
];

impl SequenceValue for Address {
    fn attribute_infos(&self) -> &'static [FieldInfo] {
        ADDRESS_ATTRIBUTES
    }

    fn attribute_mut(&mut self, tag_number: u32) -> Option<&mut dyn BerValue> {
        match tag_number {
            0 => Some(&mut self.street),
            1 => Some(&mut self.city),
            _ => None,
        }
    }
}

impl BerValue for Address {
    fn value_mut(&mut self) -> ValueMut<'_> {
        ValueMut::Sequence(self)
    }

    fn reset_value(&mut self) {
        *self = Self::default();
    }
}

/// Record touching every category
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Employee {
    pub name: String,
    pub age: i32,
    pub address: Address,
    pub nickname: Option<String>,
    pub skills: Vec<String>,
    pub photo: Bytes,
    pub color: Color,
    pub badge: Badge,
    pub shape: Shape,
    pub manager: Option<Box<Employee>>,
}

const EMPLOYEE_ATTRIBUTES: &[FieldInfo] = &[
    FieldInfo::new(0, "name", FormattingMode::DEFAULT),
    FieldInfo::new(1, "age", FormattingMode::DEC),
    FieldInfo::new(2, "address", FormattingMode::DEFAULT),
    FieldInfo::new(3, "nickname", FormattingMode::NILLABLE),
    FieldInfo::new(4, "skills", FormattingMode::DEFAULT),
    FieldInfo::new(5, "photo", FormattingMode::HEX),
    FieldInfo::new(6, "color", FormattingMode::DEFAULT),
    FieldInfo::new(7, "badge", FormattingMode::DEFAULT),
    FieldInfo::new(8, "shape", FormattingMode::UNTAGGED),
    FieldInfo::new(9, "manager", FormattingMode::DEFAULT),
];

impl SequenceValue for Employee {
    fn attribute_infos(&self) -> &'static [FieldInfo] {
        EMPLOYEE_ATTRIBUTES
    }

    fn attribute_mut(&mut self, tag_number: u32) -> Option<&mut dyn BerValue> {
        match tag_number {
            0 => Some(&mut self.name),
            1 => Some(&mut self.age),
            2 => Some(&mut self.address),
            3 => Some(&mut self.nickname),
            4 => Some(&mut self.skills),
            5 => Some(&mut self.photo),
            6 => Some(&mut self.color),
            7 => Some(&mut self.badge),
            8 => Some(&mut self.shape),
            9 => Some(&mut self.manager),
            _ => None,
        }
    }
}

impl BerValue for Employee {
    fn value_mut(&mut self) -> ValueMut<'_> {
        ValueMut::Sequence(self)
    }

    fn reset_value(&mut self) {
        *self = Self::default();
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub enum Shape {
    #[default]
    Undefined,
    Radius(i32),
    Label(String),
    /// Listed in the schema but never constructible
    Reserved,
}

const SHAPE_SELECTIONS: &[FieldInfo] = &[
    FieldInfo::new(0, "radius", FormattingMode::DEFAULT),
    FieldInfo::new(1, "label", FormattingMode::TEXT),
    FieldInfo::new(2, "reserved", FormattingMode::DEFAULT),
    FieldInfo::new(3, "pending", FormattingMode::DEFAULT),
];

impl ChoiceValue for Shape {
    fn selection_infos(&self) -> &'static [FieldInfo] {
        SHAPE_SELECTIONS
    }

    fn make_selection(&mut self, tag_number: u32) -> BerResult<()> {
        *self = match tag_number {
            0 => Shape::Radius(0),
            1 => Shape::Label(String::new()),
            2 => {
                return Err(BerError::conversion(
                    "Unable to make choice selection 'reserved'",
                ));
            }
            // accepted but not switched to
            3 => return Ok(()),
            _ => return Err(BerError::UnknownSelection { tag_number }),
        };
        Ok(())
    }

    fn selection_id(&self) -> Option<u32> {
        match self {
            Shape::Undefined => None,
            Shape::Radius(_) => Some(0),
            Shape::Label(_) => Some(1),
            Shape::Reserved => Some(2),
        }
    }

    fn selection_mut(&mut self) -> Option<&mut dyn BerValue> {
        match self {
            Shape::Radius(radius) => Some(radius),
            Shape::Label(label) => Some(label),
            Shape::Undefined | Shape::Reserved => None,
        }
    }
}

impl BerValue for Shape {
    fn value_mut(&mut self) -> ValueMut<'_> {
        ValueMut::Choice(self)
    }

    fn reset_value(&mut self) {
        *self = Self::default();
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Color {
    #[default]
    Red = 0,
    Green = 1,
    Blue = 2,
}

impl Enumerated for Color {
    fn from_i32(value: i32) -> Option<Self> {
        match value {
            0 => Some(Color::Red),
            1 => Some(Color::Green),
            2 => Some(Color::Blue),
            _ => None,
        }
    }
}

impl BerValue for Color {
    fn value_mut(&mut self) -> ValueMut<'_> {
        ValueMut::Enumeration(self)
    }

    fn reset_value(&mut self) {
        *self = Self::default();
    }
}

/// String of at most 8 characters
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Badge(pub String);

impl Customized for Badge {
    type Base = String;

    fn convert_from_base(&mut self, base: String) -> Result<(), String> {
        if base.chars().count() > 8 {
            return Err(format!("badge '{}' longer than 8 characters", base));
        }
        self.0 = base;
        Ok(())
    }
}

impl BerValue for Badge {
    fn value_mut(&mut self) -> ValueMut<'_> {
        ValueMut::Customized(self)
    }

    fn reset_value(&mut self) {
        *self = Self::default();
    }
}

/// Self-similar record for depth tests
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Nest {
    pub child: Option<Box<Nest>>,
}

impl Nest {
    /// Number of `Nest` records including this one
    pub fn levels(&self) -> usize {
        1 + self.child.as_ref().map_or(0, |child| child.levels())
    }
}

const NEST_ATTRIBUTES: &[FieldInfo] = &[FieldInfo::new(0, "child", FormattingMode::DEFAULT)];

impl SequenceValue for Nest {
    fn attribute_infos(&self) -> &'static [FieldInfo] {
        NEST_ATTRIBUTES
    }

    fn attribute_mut(&mut self, tag_number: u32) -> Option<&mut dyn BerValue> {
        match tag_number {
            0 => Some(&mut self.child),
            _ => None,
        }
    }
}

impl BerValue for Nest {
    fn value_mut(&mut self) -> ValueMut<'_> {
        ValueMut::Sequence(self)
    }

    fn reset_value(&mut self) {
        *self = Self::default();
    }
}

/// `levels` nested `Nest` records under a universal SEQUENCE
pub fn nest(levels: usize) -> Vec<u8> {
    let mut body = Vec::new();
    for _ in 1..levels {
        body = context(0, &body);
    }
    sequence(&body)
}

/// Value whose category is picked before decoding
#[derive(Debug, Clone, PartialEq)]
pub enum Reading {
    Count(i32),
    Text(String),
}

impl Default for Reading {
    fn default() -> Self {
        Reading::Count(0)
    }
}

impl DynamicValue for Reading {
    fn resolve(&mut self) -> ValueMut<'_> {
        match self {
            Reading::Count(count) => count.value_mut(),
            Reading::Text(text) => text.value_mut(),
        }
    }
}

impl BerValue for Reading {
    fn value_mut(&mut self) -> ValueMut<'_> {
        ValueMut::Dynamic(self)
    }

    /// Keeps the current variant
    fn reset_value(&mut self) {
        match self {
            Reading::Count(count) => *count = 0,
            Reading::Text(text) => text.clear(),
        }
    }
}
