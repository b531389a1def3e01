use std::fmt;
use std::str::FromStr;

use crate::error::FormatError;

/// Numeric type of one packet field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldType {
    I8,
    U8,
    I16,
    U16,
    I32,
    U32,
    I64,
    U64,
    F32,
    F64,
}

impl FieldType {
    /// Width of the field on the wire, in bytes.
    pub fn width(self) -> usize {
        match self {
            FieldType::I8 | FieldType::U8 => 1,
            FieldType::I16 | FieldType::U16 => 2,
            FieldType::I32 | FieldType::U32 | FieldType::F32 => 4,
            FieldType::I64 | FieldType::U64 | FieldType::F64 => 8,
        }
    }

    /// Canonical format code.
    pub fn code(self) -> char {
        match self {
            FieldType::I8 => 'b',
            FieldType::U8 => 'B',
            FieldType::I16 => 'h',
            FieldType::U16 => 'H',
            FieldType::I32 => 'i',
            FieldType::U32 => 'I',
            FieldType::I64 => 'q',
            FieldType::U64 => 'Q',
            FieldType::F32 => 'f',
            FieldType::F64 => 'd',
        }
    }

    pub fn is_float(self) -> bool {
        matches!(self, FieldType::F32 | FieldType::F64)
    }

    pub fn is_signed(self) -> bool {
        matches!(
            self,
            FieldType::I8 | FieldType::I16 | FieldType::I32 | FieldType::I64
        )
    }

    /// Resolve a format code. `l`/`L` follow the platform C `long` in native
    /// mode and are 4 bytes otherwise.
    fn from_code(code: char, native: bool) -> Option<Self> {
        let long_is_64 = native && std::mem::size_of::<std::ffi::c_long>() == 8;
        Some(match code {
            'b' => FieldType::I8,
            'B' => FieldType::U8,
            'h' => FieldType::I16,
            'H' => FieldType::U16,
            'i' => FieldType::I32,
            'I' => FieldType::U32,
            'l' if long_is_64 => FieldType::I64,
            'L' if long_is_64 => FieldType::U64,
            'l' => FieldType::I32,
            'L' => FieldType::U32,
            'q' => FieldType::I64,
            'Q' => FieldType::U64,
            'f' => FieldType::F32,
            'd' => FieldType::F64,
            _ => return None,
        })
    }
}

/// Byte order of multi-byte fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ByteOrder {
    Native,
    Little,
    Big,
}

impl ByteOrder {
    pub(crate) fn is_little(self) -> bool {
        match self {
            ByteOrder::Native => cfg!(target_endian = "little"),
            ByteOrder::Little => true,
            ByteOrder::Big => false,
        }
    }
}

/// A field and its byte offset inside the packet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Field {
    pub(crate) kind: FieldType,
    pub(crate) offset: usize,
}

/// Immutable wire layout of a packet.
///
/// Descriptor grammar, as in Python's `struct` module:
///
/// ```text
/// [order] ( [count] code )*
///
/// order: '@' native + aligned (default), '=' native, '<' little, '>' / '!' big
/// code:  b B h H i I l L q Q f d, and 'x' for a pad byte
/// ```
///
/// In the default aligned mode every field starts at a multiple of its own
/// width; there is no trailing padding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PacketFormat {
    descriptor: String,
    order: ByteOrder,
    fields: Vec<Field>,
    size: usize,
}

impl PacketFormat {
    /// Parse a format descriptor such as `"8d"` or `"<i3f"`.
    pub fn parse(descriptor: &str) -> Result<Self, FormatError> {
        let trimmed = descriptor.trim();
        let mut body = trimmed.char_indices().peekable();

        let (order, aligned) = match body.peek().map(|(_, c)| *c) {
            Some('@') => (ByteOrder::Native, true),
            Some('=') => (ByteOrder::Native, false),
            Some('<') => (ByteOrder::Little, false),
            Some('>') | Some('!') => (ByteOrder::Big, false),
            _ => (ByteOrder::Native, true),
        };
        if matches!(body.peek().map(|(_, c)| *c), Some('@' | '=' | '<' | '>' | '!')) {
            body.next();
        }
        let native = order == ByteOrder::Native && aligned;

        let mut fields = Vec::new();
        let mut offset = 0usize;
        let mut count: Option<usize> = None;

        for (position, code) in body {
            if let Some(digit) = code.to_digit(10) {
                let next = count
                    .unwrap_or(0)
                    .checked_mul(10)
                    .and_then(|n| n.checked_add(digit as usize))
                    .ok_or_else(|| FormatError::CountTooLarge(descriptor.to_string()))?;
                count = Some(next);
                continue;
            }
            if code.is_ascii_whitespace() && count.is_none() {
                continue;
            }

            let repeat = count.take().unwrap_or(1);
            if code == 'x' {
                offset = offset
                    .checked_add(repeat)
                    .ok_or_else(|| FormatError::CountTooLarge(descriptor.to_string()))?;
                continue;
            }

            let kind = FieldType::from_code(code, native)
                .ok_or(FormatError::UnknownCode { code, position })?;
            if aligned {
                offset = offset.next_multiple_of(kind.width());
            }
            for _ in 0..repeat {
                fields.push(Field { kind, offset });
                offset += kind.width();
            }
        }

        if count.is_some() {
            return Err(FormatError::DanglingCount(descriptor.to_string()));
        }
        if fields.is_empty() {
            return Err(FormatError::Empty(descriptor.to_string()));
        }

        Ok(Self {
            descriptor: trimmed.to_string(),
            order,
            fields,
            size: offset,
        })
    }

    /// Number of values per packet.
    pub fn arity(&self) -> usize {
        self.fields.len()
    }

    /// Bytes per packet.
    pub fn packet_size(&self) -> usize {
        self.size
    }

    pub fn byte_order(&self) -> ByteOrder {
        self.order
    }

    /// Field types in wire order.
    pub fn field_types(&self) -> impl Iterator<Item = FieldType> + '_ {
        self.fields.iter().map(|f| f.kind)
    }

    /// The descriptor this format was parsed from.
    pub fn descriptor(&self) -> &str {
        &self.descriptor
    }

    pub(crate) fn fields(&self) -> &[Field] {
        &self.fields
    }
}

impl FromStr for PacketFormat {
    type Err = FormatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for PacketFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.descriptor)
    }
}
