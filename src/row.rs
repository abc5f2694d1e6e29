//! Row codec: the on-disk tuple layout described in `spec.md` §3/§4.5 —
//! `u16 ncols`, a NULL bitmap, then each non-NULL column's payload
//! (`i32` for `COL_INT`, `u16` length + bytes for `COL_TEXT`).

use binary_helpers::{read_le, write_le, BinaryError};
use thiserror::Error;

/// Column type, as written after `CREATE TABLE`'s `INT`/`TEXT` keyword.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    Int,
    Text,
}

/// A table's column list, in ordinal order.
#[derive(Debug, Clone)]
pub struct Schema {
    pub columns: Vec<(String, ColumnType)>,
}

impl Schema {
    pub fn ncols(&self) -> usize {
        self.columns.len()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|(col_name, _)| col_name == name)
    }
}

/// A value to encode into a row, as produced by the SQL layer.
#[derive(Debug, Clone)]
pub enum Value {
    Int(i32),
    Text(String),
    Null,
}

/// A value decoded back out of row bytes. Text is returned owned rather
/// than borrowed into a caller-provided scratch buffer — the scratch-buffer
/// shape of the original C API has no natural Rust analogue once the
/// engine already returns owned `String`s elsewhere in the executor.
#[derive(Debug, Clone, PartialEq)]
pub enum DecodedValue {
    Int(i32),
    Text(String),
    Null,
}

impl DecodedValue {
    pub fn to_text(&self) -> String {
        match self {
            DecodedValue::Int(v) => v.to_string(),
            DecodedValue::Text(s) => s.clone(),
            DecodedValue::Null => "NULL".to_string(),
        }
    }
}

#[derive(Debug, Error)]
pub enum RowCodecError {
    #[error("expected {expected} values for schema, got {actual}")]
    ArityMismatch { expected: usize, actual: usize },
    #[error("text value of {len} bytes exceeds the maximum row text length of 65535 bytes")]
    TextTooLong { len: usize },
    #[error("row bytes end before the schema's columns are fully decoded")]
    TruncatedRow,
    #[error("row declares {stored} columns but schema has {expected}")]
    NcolsMismatch { stored: u16, expected: usize },
    #[error(transparent)]
    Binary(#[from] BinaryError),
}

fn null_bitmap_len(ncols: usize) -> usize {
    ncols.div_ceil(8)
}

/// Encodes `values` against `schema`. A `Value::Text` equal
/// (case-insensitively) to `"null"` is treated as `Value::Null`.
pub fn encode(schema: &Schema, values: &[Value]) -> Result<Vec<u8>, RowCodecError> {
    if values.len() != schema.ncols() {
        return Err(RowCodecError::ArityMismatch { expected: schema.ncols(), actual: values.len() });
    }

    let ncols = schema.ncols();
    let bitmap_len = null_bitmap_len(ncols);
    let mut bitmap = vec![0u8; bitmap_len];
    let mut payload = Vec::new();

    for (i, (value, (_, col_type))) in values.iter().zip(schema.columns.iter()).enumerate() {
        let is_null = matches!(value, Value::Null)
            || matches!(value, Value::Text(s) if s.eq_ignore_ascii_case("null"));

        if is_null {
            bitmap[i / 8] |= 1 << (i % 8);
            continue;
        }

        match (value, col_type) {
            (Value::Int(v), ColumnType::Int) => payload.extend_from_slice(&v.to_le_bytes()),
            (Value::Text(s), ColumnType::Text) => {
                if s.len() > u16::MAX as usize {
                    return Err(RowCodecError::TextTooLong { len: s.len() });
                }
                payload.extend_from_slice(&(s.len() as u16).to_le_bytes());
                payload.extend_from_slice(s.as_bytes());
            }
            (Value::Text(s), ColumnType::Int) => {
                let parsed: i32 = s.trim().parse().unwrap_or(0);
                payload.extend_from_slice(&parsed.to_le_bytes());
            }
            (Value::Int(v), ColumnType::Text) => {
                let text = v.to_string();
                payload.extend_from_slice(&(text.len() as u16).to_le_bytes());
                payload.extend_from_slice(text.as_bytes());
            }
            (Value::Null, _) => unreachable!("handled above"),
        }
    }

    let mut out = Vec::with_capacity(2 + bitmap_len + payload.len());
    out.extend_from_slice(&(ncols as u16).to_le_bytes());
    out.extend_from_slice(&bitmap);
    out.extend_from_slice(&payload);
    Ok(out)
}

fn is_null(bitmap: &[u8], i: usize) -> bool {
    (bitmap[i / 8] >> (i % 8)) & 1 == 1
}

/// Decodes `bytes` into typed values against `schema`.
pub fn decode_to_values(schema: &Schema, bytes: &[u8]) -> Result<Vec<DecodedValue>, RowCodecError> {
    let ncols: u16 = read_le(bytes, 0)?;
    if ncols as usize != schema.ncols() {
        return Err(RowCodecError::NcolsMismatch { stored: ncols, expected: schema.ncols() });
    }

    let bitmap_len = null_bitmap_len(schema.ncols());
    let bitmap = bytes.get(2..2 + bitmap_len).ok_or(RowCodecError::TruncatedRow)?;

    let mut offset = 2 + bitmap_len;
    let mut values = Vec::with_capacity(schema.ncols());

    for (i, (_, col_type)) in schema.columns.iter().enumerate() {
        if is_null(bitmap, i) {
            values.push(DecodedValue::Null);
            continue;
        }

        match col_type {
            ColumnType::Int => {
                let v: i32 = read_le(bytes, offset)?;
                values.push(DecodedValue::Int(v));
                offset += 4;
            }
            ColumnType::Text => {
                let len: u16 = read_le(bytes, offset)?;
                offset += 2;
                let text_bytes = bytes.get(offset..offset + len as usize).ok_or(RowCodecError::TruncatedRow)?;
                values.push(DecodedValue::Text(String::from_utf8_lossy(text_bytes).into_owned()));
                offset += len as usize;
            }
        }
    }

    Ok(values)
}

/// Renders `bytes` as `col=value | col=value | …`, with NULLs rendered as
/// `col=NULL`.
pub fn decode_to_text(schema: &Schema, bytes: &[u8]) -> Result<String, RowCodecError> {
    render_values(schema, &decode_to_values(schema, bytes)?)
}

/// Renders already-decoded `values` the same way `decode_to_text` renders
/// raw bytes, without an encode/decode round trip.
pub fn render_values(schema: &Schema, values: &[DecodedValue]) -> Result<String, RowCodecError> {
    if values.len() != schema.ncols() {
        return Err(RowCodecError::ArityMismatch { expected: schema.ncols(), actual: values.len() });
    }
    Ok(schema
        .columns
        .iter()
        .zip(values.iter())
        .map(|((name, _), value)| format!("{name}={}", value.to_text()))
        .collect::<Vec<_>>()
        .join(" | "))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn schema() -> Schema {
        Schema { columns: vec![("id".to_string(), ColumnType::Int), ("name".to_string(), ColumnType::Text)] }
    }

    #[test]
    fn encode_then_decode_round_trips() {
        let schema = schema();
        let values = vec![Value::Int(7), Value::Text("hello".to_string())];
        let bytes = encode(&schema, &values).unwrap();
        let decoded = decode_to_values(&schema, &bytes).unwrap();
        assert_eq!(decoded, vec![DecodedValue::Int(7), DecodedValue::Text("hello".to_string())]);
    }

    #[test]
    fn null_literal_encodes_as_null_bit() {
        let schema = schema();
        let values = vec![Value::Int(1), Value::Text("null".to_string())];
        let bytes = encode(&schema, &values).unwrap();
        let decoded = decode_to_values(&schema, &bytes).unwrap();
        assert_eq!(decoded, vec![DecodedValue::Int(1), DecodedValue::Null]);
    }

    #[test]
    fn decode_to_text_renders_columns_and_nulls() {
        let schema = schema();
        let values = vec![Value::Int(1), Value::Null];
        let bytes = encode(&schema, &values).unwrap();
        assert_eq!(decode_to_text(&schema, &bytes).unwrap(), "id=1 | name=NULL");
    }

    #[test]
    fn arity_mismatch_is_rejected() {
        let schema = schema();
        let err = encode(&schema, &[Value::Int(1)]);
        assert!(matches!(err, Err(RowCodecError::ArityMismatch { expected: 2, actual: 1 })));
    }

    #[test]
    fn text_over_max_length_is_rejected() {
        let schema = Schema { columns: vec![("t".to_string(), ColumnType::Text)] };
        let huge = "x".repeat(u16::MAX as usize + 1);
        let err = encode(&schema, &[Value::Text(huge)]);
        assert!(matches!(err, Err(RowCodecError::TextTooLong { .. })));
    }
}
