use crate::{
    types::{ColumnMeta, ColumnType, DataType},
    value::{Decimal, Value},
};

// Unsigned BIGINT needs 20 digits when the driver reports no precision.
const BIGINT_DEFAULT_PRECISION: u8 = 20;

const DATE_FORMAT: &str = "%Y-%m-%d";
const TIME_FORMAT: &str = "%H:%M:%S%.f";
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.f";

/// Map one remote column onto the output batch type the host receives.
///
/// Small integer kinds widen to Int64 because the host stores every integer in
/// eight bytes. BIGINT becomes a decimal so unsigned values cannot overflow.
/// Calendar kinds travel as text since remote ranges exceed the interchange
/// calendar types.
#[must_use]
pub fn output_type(meta: &ColumnMeta) -> Option<DataType> {
    let data_type = match meta.column_type {
        ColumnType::Boolean
        | ColumnType::Bit
        | ColumnType::TinyInt
        | ColumnType::SmallInt
        | ColumnType::Integer => DataType::Int64,
        ColumnType::BigInt => DataType::Decimal128 {
            precision: if meta.precision == 0 {
                BIGINT_DEFAULT_PRECISION
            } else {
                meta.precision
            },
            scale: meta.scale,
        },
        ColumnType::Decimal | ColumnType::Numeric => DataType::Decimal128 {
            precision: meta.precision,
            scale: meta.scale,
        },
        ColumnType::Date
        | ColumnType::Time
        | ColumnType::Timestamp
        | ColumnType::Char
        | ColumnType::NChar
        | ColumnType::VarChar
        | ColumnType::NVarChar
        | ColumnType::LongVarChar
        | ColumnType::LongNVarChar
        | ColumnType::Clob
        | ColumnType::NClob => DataType::Utf8,
        ColumnType::Binary
        | ColumnType::VarBinary
        | ColumnType::LongVarBinary
        | ColumnType::Blob => DataType::Binary,
        ColumnType::Real => DataType::Float32,
        ColumnType::Float | ColumnType::Double => DataType::Float64,
        ColumnType::Null => DataType::Null,
        ColumnType::Array | ColumnType::Other => return None,
    };

    Some(data_type)
}

/// Convert one fetched value into the representation of its output column.
///
/// Returns `None` when the value cannot be represented in `data_type`.
#[must_use]
pub fn conform_value(value: Value, data_type: DataType) -> Option<Value> {
    if value.is_null() {
        return Some(Value::Null);
    }

    match (value, data_type) {
        (Value::Int(v), DataType::Int64) => Some(Value::Int(v)),
        (Value::Bool(v), DataType::Int64) => Some(Value::Int(i64::from(v))),
        (Value::Uint(v), DataType::Int64) => i64::try_from(v).ok().map(Value::Int),

        (Value::Int(v), DataType::Decimal128 { scale, .. }) => {
            rescale(i128::from(v), scale).map(Value::Decimal)
        }
        (Value::Uint(v), DataType::Decimal128 { scale, .. }) => {
            rescale(i128::from(v), scale).map(Value::Decimal)
        }
        (Value::Decimal(v), DataType::Decimal128 { .. }) => Some(Value::Decimal(v)),

        (Value::Text(v), DataType::Utf8 | DataType::LargeUtf8) => Some(Value::Text(v)),
        (Value::Date(v), DataType::Utf8) => Some(Value::Text(v.format(DATE_FORMAT).to_string())),
        (Value::Time(v), DataType::Utf8) => Some(Value::Text(v.format(TIME_FORMAT).to_string())),
        (Value::Timestamp(v), DataType::Utf8) => {
            Some(Value::Text(v.format(TIMESTAMP_FORMAT).to_string()))
        }

        (Value::Binary(v), DataType::Binary | DataType::LargeBinary) => Some(Value::Binary(v)),

        (Value::Float32(v), DataType::Float32) => Some(Value::Float32(v)),
        (Value::Float32(v), DataType::Float64) => Some(Value::Float64(f64::from(v))),
        (Value::Float64(v), DataType::Float64) => Some(Value::Float64(v)),

        _ => None,
    }
}

// Lift an integer to a decimal with the column's scale.
fn rescale(unscaled: i128, scale: i8) -> Option<Decimal> {
    let scale = u32::try_from(scale).ok()?;
    let factor = 10i128.checked_pow(scale)?;

    unscaled
        .checked_mul(factor)
        .map(|scaled| Decimal::new(scaled, scale))
}
