//! Schema capabilities for standard Rust types
//!
//! - `bool`, integers, `f32`, `f64`, `String`: Simple
//! - `bytes::Bytes`: Array of raw octets (OCTET STRING)
//! - `Vec<T>`: Array (SEQUENCE OF)
//! - `Option<T>`: NullableValue
//! - `Box<T>`: same category as `T`

use super::{ArrayValue, BerValue, NullableValue, SimpleValue, ValueMut};
use crate::ber::primitive;
use crate::ber::universal::UniversalTagNumber;
use ber_core::{BerError, BerResult, FormattingMode};
use bytes::Bytes;

macro_rules! impl_integer {
    ($reader:ident => $($ty:ty),*) => {$(
        impl SimpleValue for $ty {
            fn universal_tag_number(&self, _mode: FormattingMode) -> UniversalTagNumber {
                UniversalTagNumber::Integer
            }

            fn read_contents(&mut self, contents: &[u8]) -> BerResult<()> {
                let value = primitive::$reader(contents)?;
                *self = <$ty>::try_from(value).map_err(|_| {
                    BerError::Conversion(format!(
                        "Integer {} out of range for {}",
                        value,
                        stringify!($ty)
                    ))
                })?;
                Ok(())
            }
        }

        impl BerValue for $ty {
            fn value_mut(&mut self) -> ValueMut<'_> {
                ValueMut::Simple(self)
            }

            fn reset_value(&mut self) {
                *self = 0;
            }
        }
    )*};
}

impl_integer!(get_integer => i8, i16, i32, i64);
impl_integer!(get_unsigned => u8, u16, u32, u64);

impl SimpleValue for bool {
    fn universal_tag_number(&self, _mode: FormattingMode) -> UniversalTagNumber {
        UniversalTagNumber::Boolean
    }

    fn read_contents(&mut self, contents: &[u8]) -> BerResult<()> {
        *self = primitive::get_bool(contents)?;
        Ok(())
    }
}

impl BerValue for bool {
    fn value_mut(&mut self) -> ValueMut<'_> {
        ValueMut::Simple(self)
    }

    fn reset_value(&mut self) {
        *self = false;
    }
}

impl SimpleValue for f64 {
    fn universal_tag_number(&self, _mode: FormattingMode) -> UniversalTagNumber {
        UniversalTagNumber::Real
    }

    fn read_contents(&mut self, contents: &[u8]) -> BerResult<()> {
        *self = primitive::get_real(contents)?;
        Ok(())
    }
}

impl BerValue for f64 {
    fn value_mut(&mut self) -> ValueMut<'_> {
        ValueMut::Simple(self)
    }

    fn reset_value(&mut self) {
        *self = 0.0;
    }
}

impl SimpleValue for f32 {
    fn universal_tag_number(&self, _mode: FormattingMode) -> UniversalTagNumber {
        UniversalTagNumber::Real
    }

    fn read_contents(&mut self, contents: &[u8]) -> BerResult<()> {
        *self = primitive::get_real(contents)? as f32;
        Ok(())
    }
}

impl BerValue for f32 {
    fn value_mut(&mut self) -> ValueMut<'_> {
        ValueMut::Simple(self)
    }

    fn reset_value(&mut self) {
        *self = 0.0;
    }
}

impl SimpleValue for String {
    fn universal_tag_number(&self, mode: FormattingMode) -> UniversalTagNumber {
        let type_mode = mode.type_mode();
        if type_mode == FormattingMode::HEX || type_mode == FormattingMode::BASE64 {
            UniversalTagNumber::OctetString
        } else {
            UniversalTagNumber::Utf8String
        }
    }

    fn read_contents(&mut self, contents: &[u8]) -> BerResult<()> {
        *self = primitive::get_string(contents)?;
        Ok(())
    }
}

impl BerValue for String {
    fn value_mut(&mut self) -> ValueMut<'_> {
        ValueMut::Simple(self)
    }

    fn reset_value(&mut self) {
        self.clear();
    }
}

impl BerValue for Bytes {
    fn value_mut(&mut self) -> ValueMut<'_> {
        ValueMut::ByteArray(self)
    }

    fn reset_value(&mut self) {
        self.clear();
    }
}

impl<T: BerValue + Default> ArrayValue for Vec<T> {
    fn size(&self) -> usize {
        self.len()
    }

    fn resize(&mut self, size: usize) {
        self.resize_with(size, T::default);
    }

    fn element_mut(&mut self, index: usize) -> Option<&mut dyn BerValue> {
        self.get_mut(index).map(|element| element as &mut dyn BerValue)
    }
}

impl<T: BerValue + Default> BerValue for Vec<T> {
    fn value_mut(&mut self) -> ValueMut<'_> {
        ValueMut::Array(self)
    }

    fn reset_value(&mut self) {
        self.clear();
    }
}

impl<T: BerValue + Default> NullableValue for Option<T> {
    fn make_value(&mut self) {
        if self.is_none() {
            *self = Some(T::default());
        }
    }

    fn reset(&mut self) {
        *self = None;
    }

    fn inner_mut(&mut self) -> Option<&mut dyn BerValue> {
        self.as_mut().map(|value| value as &mut dyn BerValue)
    }
}

impl<T: BerValue + Default> BerValue for Option<T> {
    fn value_mut(&mut self) -> ValueMut<'_> {
        ValueMut::Nullable(self)
    }

    fn reset_value(&mut self) {
        *self = None;
    }
}

impl<T: BerValue + ?Sized> BerValue for Box<T> {
    fn value_mut(&mut self) -> ValueMut<'_> {
        (**self).value_mut()
    }

    fn reset_value(&mut self) {
        (**self).reset_value();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ber_core::TypeCategory;

    #[test]
    fn test_integer_range_checks() {
        let mut small = 0i8;
        small.read_contents(&[0x7F]).unwrap();
        assert_eq!(small, 127);
        assert!(matches!(
            small.read_contents(&[0x00, 0x80]),
            Err(BerError::Conversion(_))
        ));

        let mut unsigned = 0u16;
        unsigned.read_contents(&[0x00, 0xFF, 0xFF]).unwrap();
        assert_eq!(unsigned, u16::MAX);
        assert!(unsigned.read_contents(&[0xFF]).is_err());
    }

    #[test]
    fn test_categories() {
        assert_eq!(5i32.value_mut().category(), TypeCategory::Simple);
        assert_eq!(Bytes::new().value_mut().category(), TypeCategory::Array);
        assert_eq!(Vec::<bool>::new().value_mut().category(), TypeCategory::Array);
        assert_eq!(
            Option::<String>::None.value_mut().category(),
            TypeCategory::NullableValue
        );
        assert_eq!(Box::new(1u8).value_mut().category(), TypeCategory::Simple);
    }

    #[test]
    fn test_nullable_operations() {
        let mut value: Option<i32> = None;
        value.make_value();
        assert_eq!(value, Some(0));
        value = Some(7);
        value.make_value();
        assert_eq!(value, Some(7));
        assert!(value.inner_mut().is_some());
        NullableValue::reset(&mut value);
        assert!(value.is_none());
    }

    #[test]
    fn test_reset_value() {
        let mut number = 42u16;
        number.reset_value();
        assert_eq!(number, 0);

        let mut text = String::from("stale");
        text.reset_value();
        assert!(text.is_empty());

        let mut list = vec![1.5f64, 2.5];
        list.reset_value();
        assert!(list.is_empty());

        let mut boxed: Box<Option<bool>> = Box::new(Some(true));
        boxed.reset_value();
        assert_eq!(*boxed, None);
    }

    #[test]
    fn test_array_operations() {
        let mut list: Vec<String> = Vec::new();
        ArrayValue::resize(&mut list, 2);
        assert_eq!(list.size(), 2);
        assert!(list.element_mut(1).is_some());
        assert!(list.element_mut(2).is_none());
    }
}
