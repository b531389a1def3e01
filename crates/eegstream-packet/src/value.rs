/// One channel value as it travels on the wire.
///
/// Integer fields decode to [`Value::Int`] / [`Value::UInt`] so they round
/// trip exactly; float fields decode to [`Value::Float`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Value {
    Int(i64),
    UInt(u64),
    Float(f64),
}

/// One sample: a value per channel, in format field order.
pub type Packet = Vec<Value>;

impl Value {
    /// Numeric value as a float, for signal processing.
    pub fn as_f64(self) -> f64 {
        match self {
            Value::Int(v) => v as f64,
            Value::UInt(v) => v as f64,
            Value::Float(v) => v,
        }
    }
}

macro_rules! value_from {
    ($variant:ident, $target:ty: $($source:ty),+) => {
        $(
            impl From<$source> for Value {
                fn from(v: $source) -> Self {
                    Value::$variant(<$target>::from(v))
                }
            }
        )+
    };
}

value_from!(Int, i64: i8, i16, i32, i64);
value_from!(UInt, u64: u8, u16, u32, u64);
value_from!(Float, f64: f32, f64);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn conversions_pick_matching_variant() {
        assert_eq!(Value::from(-3i16), Value::Int(-3));
        assert_eq!(Value::from(7u8), Value::UInt(7));
        assert_eq!(Value::from(1.5f32), Value::Float(1.5));
    }

    #[test]
    fn as_f64_covers_all_variants() {
        assert_eq!(Value::Int(-2).as_f64(), -2.0);
        assert_eq!(Value::UInt(9).as_f64(), 9.0);
        assert_eq!(Value::Float(0.25).as_f64(), 0.25);
    }
}
