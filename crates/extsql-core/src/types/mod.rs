//! Module: types
//! Responsibility: declared value types on the wire side and remote column
//! types on the driver side, plus the mapping between them.
//! Does not own: literal rendering or batch assembly.

mod mapping;


use std::fmt;

pub use mapping::{conform_value, output_type};

///
/// DataType
///
/// Declared type of a placeholder or of an output batch column. Mirrors the
/// columnar interchange type system closely enough to carry the host's
/// declared placeholder types unchanged.
///

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum DataType {
    Binary,
    Bool,
    Date32,
    Decimal128 { precision: u8, scale: i8 },
    Float32,
    Float64,
    Int8,
    Int16,
    Int32,
    Int64,
    LargeBinary,
    LargeUtf8,
    Null,
    Time64,
    Timestamp,
    UInt8,
    UInt16,
    UInt32,
    UInt64,
    Utf8,
}

impl DataType {
    /// Whether a value of this type has a safe, dialect-independent literal form.
    ///
    /// Binary and calendar types never do: their literal syntax differs across
    /// remote dialects and session settings.
    #[must_use]
    pub const fn has_literal_form(self) -> bool {
        !matches!(
            self,
            Self::Binary | Self::LargeBinary | Self::Date32 | Self::Time64 | Self::Timestamp
        )
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Decimal128 { precision, scale } => write!(f, "Decimal128({precision}, {scale})"),
            other => write!(f, "{other:?}"),
        }
    }
}

///
/// ColumnType
///
/// Column type code reported by the remote driver's result metadata.
///

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum ColumnType {
    Array,
    BigInt,
    Binary,
    Bit,
    Blob,
    Boolean,
    Char,
    Clob,
    Date,
    Decimal,
    Double,
    Float,
    Integer,
    LongNVarChar,
    LongVarBinary,
    LongVarChar,
    NChar,
    NClob,
    NVarChar,
    Null,
    Numeric,
    Other,
    Real,
    SmallInt,
    Time,
    Timestamp,
    TinyInt,
    VarBinary,
    VarChar,
}

impl ColumnType {
    /// Large-object kinds may carry unbounded payloads in a single row.
    #[must_use]
    pub const fn is_large_object(self) -> bool {
        matches!(
            self,
            Self::LongNVarChar
                | Self::LongVarChar
                | Self::LongVarBinary
                | Self::Blob
                | Self::Clob
                | Self::NClob
        )
    }
}

///
/// ColumnMeta
///
/// One column of a remote cursor's result metadata.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ColumnMeta {
    pub name: String,
    pub column_type: ColumnType,
    pub precision: u8,
    pub scale: i8,
    pub nullable: bool,
}

impl ColumnMeta {
    #[must_use]
    pub fn new(name: impl Into<String>, column_type: ColumnType) -> Self {
        Self {
            name: name.into(),
            column_type,
            precision: 0,
            scale: 0,
            nullable: true,
        }
    }

    #[must_use]
    pub const fn with_precision(mut self, precision: u8, scale: i8) -> Self {
        self.precision = precision;
        self.scale = scale;
        self
    }
}
