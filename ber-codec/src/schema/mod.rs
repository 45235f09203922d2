//! Schema reflection capabilities
//!
//! The decoder never knows concrete target types. Every target implements
//! [`BerValue`] and hands out a [`ValueMut`] view that names its category
//! and gives access to the capability trait for that category:
//!
//! | Category       | Capability          |
//! |----------------|---------------------|
//! | Simple         | [`SimpleValue`]     |
//! | Sequence       | [`SequenceValue`]   |
//! | Choice         | [`ChoiceValue`]     |
//! | Array          | [`ArrayValue`], or `bytes::Bytes` for raw octets |
//! | NullableValue  | [`NullableValue`]   |
//! | CustomizedType | [`CustomizedValue`] |
//! | Enumeration    | [`EnumValue`]       |
//! | DynamicType    | [`DynamicValue`]    |
//!
//! Implementations for the standard scalar and container types live in
//! [`impls`]. Schema types (usually generated code) implement the traits for
//! their own records, unions and enumerations.

pub mod impls;

use crate::ber::universal::{self, UniversalTagNumber};
use ber_core::{BerError, BerResult, FormattingMode, TypeCategory};
use bytes::Bytes;

/// Static description of a sequence attribute or a choice selection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldInfo {
    /// Context-specific tag number of the field
    pub id: u32,
    /// Field name, used in diagnostics
    pub name: &'static str,
    /// Formatting mode applied when decoding the field
    pub formatting_mode: FormattingMode,
}

impl FieldInfo {
    pub const fn new(id: u32, name: &'static str, formatting_mode: FormattingMode) -> Self {
        Self {
            id,
            name,
            formatting_mode,
        }
    }
}

/// A value the decoder can populate
pub trait BerValue {
    /// Category view of this value
    fn value_mut(&mut self) -> ValueMut<'_>;

    /// Return to the default state. Called on the top-level value before
    /// decoding, so fields absent from the stream keep their defaults.
    fn reset_value(&mut self);
}

/// Mutable, category-tagged view of a value
pub enum ValueMut<'a> {
    Simple(&'a mut dyn SimpleValue),
    Sequence(&'a mut dyn SequenceValue),
    Choice(&'a mut dyn ChoiceValue),
    Array(&'a mut dyn ArrayValue),
    /// Raw octets, decoded in one read instead of element by element
    ByteArray(&'a mut Bytes),
    Nullable(&'a mut dyn NullableValue),
    Customized(&'a mut dyn CustomizedValue),
    Enumeration(&'a mut dyn EnumValue),
    Dynamic(&'a mut dyn DynamicValue),
}

impl ValueMut<'_> {
    pub fn category(&self) -> TypeCategory {
        match self {
            ValueMut::Simple(_) => TypeCategory::Simple,
            ValueMut::Sequence(_) => TypeCategory::Sequence,
            ValueMut::Choice(_) => TypeCategory::Choice,
            ValueMut::Array(_) | ValueMut::ByteArray(_) => TypeCategory::Array,
            ValueMut::Nullable(_) => TypeCategory::NullableValue,
            ValueMut::Customized(_) => TypeCategory::CustomizedType,
            ValueMut::Enumeration(_) => TypeCategory::Enumeration,
            ValueMut::Dynamic(_) => TypeCategory::DynamicType,
        }
    }
}

/// Scalar leaf
pub trait SimpleValue {
    /// UNIVERSAL tag this value is encoded with under `mode`
    fn universal_tag_number(&self, mode: FormattingMode) -> UniversalTagNumber;

    /// Replace the value with the one encoded in `contents`
    fn read_contents(&mut self, contents: &[u8]) -> BerResult<()>;
}

/// Record whose attributes are identified by context-specific tag numbers
pub trait SequenceValue {
    /// Every attribute the schema knows about
    fn attribute_infos(&self) -> &'static [FieldInfo];

    /// Mutable access to the attribute with `tag_number`
    fn attribute_mut(&mut self, tag_number: u32) -> Option<&mut dyn BerValue>;

    fn lookup_attribute_info(&self, tag_number: u32) -> Option<&'static FieldInfo> {
        self.attribute_infos()
            .iter()
            .find(|info| info.id == tag_number)
    }
}

/// Tagged union holding zero or one selection
pub trait ChoiceValue {
    /// Every selection the schema knows about
    fn selection_infos(&self) -> &'static [FieldInfo];

    /// Switch to the selection with `tag_number`, default-initialized
    fn make_selection(&mut self, tag_number: u32) -> BerResult<()>;

    /// Tag number of the current selection, `None` if nothing is selected
    fn selection_id(&self) -> Option<u32>;

    /// Mutable access to the current selection
    fn selection_mut(&mut self) -> Option<&mut dyn BerValue>;

    fn lookup_selection_info(&self, tag_number: u32) -> Option<&'static FieldInfo> {
        self.selection_infos()
            .iter()
            .find(|info| info.id == tag_number)
    }
}

/// Growable homogeneous list
pub trait ArrayValue {
    /// Number of elements
    fn size(&self) -> usize;

    /// Resize to `size` elements, new elements default-initialized
    fn resize(&mut self, size: usize);

    fn element_mut(&mut self, index: usize) -> Option<&mut dyn BerValue>;
}

/// Value that may be null
pub trait NullableValue {
    /// Make the value non-null, keeping an existing value
    fn make_value(&mut self);

    /// Reset to the null state
    fn reset(&mut self);

    /// The contained value, `None` when null
    fn inner_mut(&mut self) -> Option<&mut dyn BerValue>;
}

/// Value decoded through a base type and converted afterwards
pub trait CustomizedValue {
    /// UNIVERSAL tag of the base type under `mode`
    fn base_tag_number(&self, mode: FormattingMode) -> BerResult<UniversalTagNumber>;

    /// Create a base value, let `decode` populate it, then convert it into
    /// `self`. Errors from `decode` must be returned unchanged.
    fn decode_base(
        &mut self,
        decode: &mut dyn FnMut(&mut dyn BerValue) -> BerResult<()>,
    ) -> BerResult<()>;
}

/// Typed form of [`CustomizedValue`]
///
/// ```
/// use ber_codec::schema::{BerValue, Customized, ValueMut};
///
/// #[derive(Default)]
/// struct Ticker(String);
///
/// impl Customized for Ticker {
///     type Base = String;
///
///     fn convert_from_base(&mut self, base: String) -> Result<(), String> {
///         if base.len() > 8 {
///             return Err(format!("ticker '{}' longer than 8 characters", base));
///         }
///         self.0 = base;
///         Ok(())
///     }
/// }
///
/// impl BerValue for Ticker {
///     fn value_mut(&mut self) -> ValueMut<'_> {
///         ValueMut::Customized(self)
///     }
///
///     fn reset_value(&mut self) {
///         self.0.clear();
///     }
/// }
/// ```
pub trait Customized {
    type Base: BerValue + Default;

    fn convert_from_base(&mut self, base: Self::Base) -> Result<(), String>;
}

impl<T: Customized> CustomizedValue for T {
    fn base_tag_number(&self, mode: FormattingMode) -> BerResult<UniversalTagNumber> {
        let mut base = T::Base::default();
        universal::select(&mut base, mode)
    }

    fn decode_base(
        &mut self,
        decode: &mut dyn FnMut(&mut dyn BerValue) -> BerResult<()>,
    ) -> BerResult<()> {
        let mut base = T::Base::default();
        decode(&mut base)?;
        self.convert_from_base(base).map_err(BerError::Conversion)
    }
}

/// Named integer values
pub trait EnumValue {
    /// Replace the value with the enumerator for `value`
    fn from_int(&mut self, value: i32) -> BerResult<()>;
}

/// Typed form of [`EnumValue`]
pub trait Enumerated: Sized {
    fn from_i32(value: i32) -> Option<Self>;
}

impl<T: Enumerated> EnumValue for T {
    fn from_int(&mut self, value: i32) -> BerResult<()> {
        match T::from_i32(value) {
            Some(enumerator) => {
                *self = enumerator;
                Ok(())
            }
            None => Err(BerError::Conversion(format!(
                "No enumerator for value {}",
                value
            ))),
        }
    }
}

/// Value whose category is only known at runtime
pub trait DynamicValue {
    /// View of the value in its current concrete category
    fn resolve(&mut self) -> ValueMut<'_>;
}
