//! # Scalar Encoding Trait
//!
//! Fixed-width scalar fields are stored inline in a table body, little
//! endian at their natural width. The [`Scalar`] trait captures exactly
//! that: a size, a write, and a read. Alignment always equals size, so the
//! builder and view derive it from `Scalar::SIZE` rather than tracking it
//! separately.
//!
//! | Type          | Size (bytes) |
//! |---------------|--------------|
//! | bool, i8, u8  | 1            |
//! | i16, u16      | 2            |
//! | i32, u32, f32 | 4            |
//! | i64, u64, f64 | 8            |

/// Fixed-width little-endian scalar codec.
///
/// Implementations must write exactly `SIZE` bytes and read exactly `SIZE`
/// bytes; callers guarantee the slices are at least that long.
pub trait Scalar: Copy + PartialEq {
    const SIZE: usize;

    fn write_le(self, out: &mut [u8]);

    fn read_le(src: &[u8]) -> Self;
}

impl_scalar! {
    i8 => 1,
    u8 => 1,
    i16 => 2,
    u16 => 2,
    i32 => 4,
    u32 => 4,
    i64 => 8,
    u64 => 8,
    f32 => 4,
    f64 => 8,
}

impl Scalar for bool {
    const SIZE: usize = 1;

    #[inline]
    fn write_le(self, out: &mut [u8]) {
        out[0] = self as u8;
    }

    #[inline]
    fn read_le(src: &[u8]) -> Self {
        src[0] != 0
    }
}
