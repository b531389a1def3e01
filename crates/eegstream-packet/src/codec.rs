use bytes::{Buf, BufMut, BytesMut};

use crate::error::{PacketError, Result};
use crate::format::{FieldType, PacketFormat};
use crate::value::{Packet, Value};

/// Serialise one packet into `dst`.
///
/// Appends exactly `format.packet_size()` bytes, or nothing on error. Pad
/// bytes are zero.
pub fn encode_packet<V>(format: &PacketFormat, values: &[V], dst: &mut BytesMut) -> Result<()>
where
    V: Copy + Into<Value>,
{
    if values.len() != format.arity() {
        return Err(PacketError::Arity {
            expected: format.arity(),
            got: values.len(),
        });
    }

    let little = format.byte_order().is_little();
    let start = dst.len();
    dst.reserve(format.packet_size());

    for (index, (field, value)) in format.fields().iter().zip(values).enumerate() {
        let written = dst.len() - start;
        dst.put_bytes(0, field.offset - written);
        if let Err(err) = put_field(dst, field.kind, (*value).into(), index, little) {
            dst.truncate(start);
            return Err(err);
        }
    }

    let written = dst.len() - start;
    dst.put_bytes(0, format.packet_size() - written);
    Ok(())
}

/// Deserialise a single packet. `src` must be exactly one packet long.
pub fn decode_packet(format: &PacketFormat, src: &[u8]) -> Result<Packet> {
    if src.len() != format.packet_size() {
        return Err(framing_error(src.len(), format.packet_size()));
    }

    let little = format.byte_order().is_little();
    Ok(format
        .fields()
        .iter()
        .map(|field| get_field(&src[field.offset..], field.kind, little))
        .collect())
}

/// Split a byte run into whole packets.
///
/// An empty run yields no packets. A run that is not a multiple of the
/// packet size is a [`PacketError::Framing`] error; the tail is never
/// dropped or realigned.
pub fn decode_packets(format: &PacketFormat, src: &[u8]) -> Result<Vec<Packet>> {
    let size = format.packet_size();
    let remainder = src.len() % size;
    if remainder != 0 {
        return Err(framing_error(remainder, size));
    }

    src.chunks_exact(size)
        .map(|chunk| decode_packet(format, chunk))
        .collect()
}

fn framing_error(remainder: usize, packet_size: usize) -> PacketError {
    PacketError::Framing {
        remainder,
        packet_size,
    }
}

fn put_field(
    dst: &mut BytesMut,
    kind: FieldType,
    value: Value,
    index: usize,
    little: bool,
) -> Result<()> {
    macro_rules! put {
        ($le:ident, $be:ident, $v:expr) => {
            if little {
                dst.$le($v)
            } else {
                dst.$be($v)
            }
        };
    }

    match kind {
        FieldType::I8 => dst.put_i8(narrow(signed(value, kind, index)?, kind, index)?),
        FieldType::U8 => dst.put_u8(narrow(unsigned(value, kind, index)?, kind, index)?),
        FieldType::I16 => put!(
            put_i16_le,
            put_i16,
            narrow(signed(value, kind, index)?, kind, index)?
        ),
        FieldType::U16 => put!(
            put_u16_le,
            put_u16,
            narrow(unsigned(value, kind, index)?, kind, index)?
        ),
        FieldType::I32 => put!(
            put_i32_le,
            put_i32,
            narrow(signed(value, kind, index)?, kind, index)?
        ),
        FieldType::U32 => put!(
            put_u32_le,
            put_u32,
            narrow(unsigned(value, kind, index)?, kind, index)?
        ),
        FieldType::I64 => put!(put_i64_le, put_i64, signed(value, kind, index)?),
        FieldType::U64 => put!(put_u64_le, put_u64, unsigned(value, kind, index)?),
        FieldType::F32 => put!(put_f32_le, put_f32, single(value, kind, index)?),
        FieldType::F64 => put!(put_f64_le, put_f64, value.as_f64()),
    }
    Ok(())
}

fn get_field(mut src: &[u8], kind: FieldType, little: bool) -> Value {
    macro_rules! get {
        ($le:ident, $be:ident) => {
            if little {
                src.$le()
            } else {
                src.$be()
            }
        };
    }

    match kind {
        FieldType::I8 => Value::Int(src.get_i8().into()),
        FieldType::U8 => Value::UInt(src.get_u8().into()),
        FieldType::I16 => Value::Int(get!(get_i16_le, get_i16).into()),
        FieldType::U16 => Value::UInt(get!(get_u16_le, get_u16).into()),
        FieldType::I32 => Value::Int(get!(get_i32_le, get_i32).into()),
        FieldType::U32 => Value::UInt(get!(get_u32_le, get_u32).into()),
        FieldType::I64 => Value::Int(get!(get_i64_le, get_i64)),
        FieldType::U64 => Value::UInt(get!(get_u64_le, get_u64)),
        FieldType::F32 => Value::Float(get!(get_f32_le, get_f32).into()),
        FieldType::F64 => Value::Float(get!(get_f64_le, get_f64)),
    }
}

fn value_error(index: usize, kind: FieldType, reason: impl Into<String>) -> PacketError {
    PacketError::Value {
        index,
        code: kind.code(),
        reason: reason.into(),
    }
}

fn signed(value: Value, kind: FieldType, index: usize) -> Result<i64> {
    match value {
        Value::Int(v) => Ok(v),
        Value::UInt(v) => {
            i64::try_from(v).map_err(|_| value_error(index, kind, format!("{v} out of range")))
        }
        Value::Float(v) => Err(value_error(
            index,
            kind,
            format!("{v} is not an integer"),
        )),
    }
}

fn unsigned(value: Value, kind: FieldType, index: usize) -> Result<u64> {
    match value {
        Value::UInt(v) => Ok(v),
        Value::Int(v) => {
            u64::try_from(v).map_err(|_| value_error(index, kind, format!("{v} out of range")))
        }
        Value::Float(v) => Err(value_error(
            index,
            kind,
            format!("{v} is not an integer"),
        )),
    }
}

/// Finite values past `f32::MAX` are rejected; NaN and infinities pass.
fn single(value: Value, kind: FieldType, index: usize) -> Result<f32> {
    let v = value.as_f64();
    if v.is_finite() && v.abs() > f64::from(f32::MAX) {
        return Err(value_error(index, kind, format!("{v} out of range")));
    }
    Ok(v as f32)
}

fn narrow<S, T>(v: S, kind: FieldType, index: usize) -> Result<T>
where
    S: Copy + std::fmt::Display,
    T: TryFrom<S>,
{
    T::try_from(v).map_err(|_| value_error(index, kind, format!("{v} out of range")))
}
