//! Scalar value encoding
//!
//! This module defines the [`Scalar`] enum, the decoded form of every value
//! that fits in a machine word, and converts it to and from the little-endian
//! bytes stored in the address space.
//!
//! # Scalar Kinds
//!
//! - [`Scalar::Int`]: signed integers, chars, enums and bools
//! - [`Scalar::UInt`]: unsigned integers
//! - [`Scalar::Float`]: `float` and `double` (held as `f64`)
//! - [`Scalar::Pointer`]: 64-bit addresses, including references

/// Memory address type (64-bit)
pub type Address = u64;

/// How the bytes of a scalar are to be interpreted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScalarKind {
    Signed(usize),
    Unsigned(usize),
    Float32,
    Float64,
    Pointer,
}

impl ScalarKind {
    pub fn size(self) -> usize {
        match self {
            ScalarKind::Signed(n) | ScalarKind::Unsigned(n) => n,
            ScalarKind::Float32 => 4,
            ScalarKind::Float64 | ScalarKind::Pointer => 8,
        }
    }
}

/// A decoded scalar
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Scalar {
    Int(i64),
    UInt(u64),
    Float(f64),
    Pointer(Address),
}

impl Scalar {
    /// Decode `bytes` as a scalar of `kind`; missing high bytes read as zero
    pub fn decode(bytes: &[u8], kind: ScalarKind) -> Scalar {
        let mut raw = [0u8; 8];
        let len = bytes.len().min(kind.size()).min(8);
        raw[..len].copy_from_slice(&bytes[..len]);
        let bits = u64::from_le_bytes(raw);

        match kind {
            ScalarKind::Signed(size) => {
                let shift = 64 - 8 * size.clamp(1, 8) as u32;
                Scalar::Int(((bits << shift) as i64) >> shift)
            }
            ScalarKind::Unsigned(_) => Scalar::UInt(bits),
            ScalarKind::Float32 => Scalar::Float(f32::from_bits(bits as u32) as f64),
            ScalarKind::Float64 => Scalar::Float(f64::from_bits(bits)),
            ScalarKind::Pointer => Scalar::Pointer(bits),
        }
    }

    /// Encode as `kind`, converting between representations the way a C cast does
    pub fn encode(self, kind: ScalarKind) -> Vec<u8> {
        let bits = match kind {
            ScalarKind::Float32 => (self.as_f64() as f32).to_bits() as u64,
            ScalarKind::Float64 => self.as_f64().to_bits(),
            _ => self.as_bits(),
        };
        bits.to_le_bytes()[..kind.size()].to_vec()
    }

    /// Two's complement bit pattern, truncating floats toward zero
    pub fn as_bits(self) -> u64 {
        match self {
            Scalar::Int(n) => n as u64,
            Scalar::UInt(n) | Scalar::Pointer(n) => n,
            Scalar::Float(f) => f as i64 as u64,
        }
    }

    pub fn as_i64(self) -> i64 {
        self.as_bits() as i64
    }

    pub fn as_f64(self) -> f64 {
        match self {
            Scalar::Int(n) => n as f64,
            Scalar::UInt(n) | Scalar::Pointer(n) => n as f64,
            Scalar::Float(f) => f,
        }
    }

    /// Get the address, returns None if not a Pointer
    pub fn as_pointer(self) -> Option<Address> {
        match self {
            Scalar::Pointer(addr) => Some(addr),
            _ => None,
        }
    }

    pub fn is_zero(self) -> bool {
        match self {
            Scalar::Float(f) => f == 0.0,
            other => other.as_bits() == 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sign_extension() {
        assert_eq!(Scalar::decode(&[0xff], ScalarKind::Signed(1)), Scalar::Int(-1));
        assert_eq!(
            Scalar::decode(&[0xff, 0x7f], ScalarKind::Signed(2)),
            Scalar::Int(0x7fff)
        );
        assert_eq!(
            Scalar::decode(&[0xff], ScalarKind::Unsigned(1)),
            Scalar::UInt(255)
        );
    }

    #[test]
    fn test_encode_truncates_to_size() {
        assert_eq!(Scalar::Int(-2).encode(ScalarKind::Signed(2)), vec![0xfe, 0xff]);
        assert_eq!(
            Scalar::Int(0x1_0000_0005).encode(ScalarKind::Signed(4)),
            vec![5, 0, 0, 0]
        );
    }

    #[test]
    fn test_float_conversions() {
        let bytes = Scalar::Int(3).encode(ScalarKind::Float64);
        assert_eq!(Scalar::decode(&bytes, ScalarKind::Float64), Scalar::Float(3.0));

        let bytes = Scalar::Float(2.5).encode(ScalarKind::Float32);
        assert_eq!(Scalar::decode(&bytes, ScalarKind::Float32), Scalar::Float(2.5));

        assert_eq!(Scalar::Float(-7.9).as_i64(), -7);
    }

    #[test]
    fn test_pointer() {
        let bytes = Scalar::Pointer(0x601000).encode(ScalarKind::Pointer);
        let decoded = Scalar::decode(&bytes, ScalarKind::Pointer);
        assert_eq!(decoded.as_pointer(), Some(0x601000));
        assert!(!decoded.is_zero());
    }
}
