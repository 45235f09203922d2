use std::fmt;

/// Category of a schema-described value
///
/// The decoder picks its strategy from the category a value reports
/// about itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeCategory {
    /// Scalar leaf (integer, float, string, boolean)
    Simple,
    /// Record with tagged, optional attributes
    Sequence,
    /// Tagged union with zero or one selection
    Choice,
    /// Homogeneous, growable list
    Array,
    /// Value that may be null
    NullableValue,
    /// Restricted or renamed view over a base type
    CustomizedType,
    /// Named integer values
    Enumeration,
    /// Category only known at runtime
    DynamicType,
}

impl fmt::Display for TypeCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TypeCategory::Simple => "Simple",
            TypeCategory::Sequence => "Sequence",
            TypeCategory::Choice => "Choice",
            TypeCategory::Array => "Array",
            TypeCategory::NullableValue => "NullableValue",
            TypeCategory::CustomizedType => "CustomizedType",
            TypeCategory::Enumeration => "Enumeration",
            TypeCategory::DynamicType => "DynamicType",
        };
        f.write_str(name)
    }
}
