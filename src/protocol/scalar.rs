//! Fixed-width little-endian values that fit the immediate-data and payload windows.

mod sealed {
    pub trait Sealed {}
}

/// A primitive that can be encoded at an offset inside a frame.
///
/// Implemented for the closed set of OBP field kinds: `u8`, `i8` (the
/// protocol's "char"), `u16`, `i16`, `u32`, `i32`, `u64`, `i64`, `f32` and
/// `f64`. All encodings are little-endian.
pub trait Scalar: Copy + sealed::Sealed {
    /// Encoded width in bytes
    const SIZE: usize;

    /// Write `Self::SIZE` bytes into the front of `dst`.
    ///
    /// Panics if `dst` is shorter than `Self::SIZE`.
    fn encode_le(self, dst: &mut [u8]);

    /// Read a value from the first `Self::SIZE` bytes of `src`.
    ///
    /// Panics if `src` is shorter than `Self::SIZE`.
    fn decode_le(src: &[u8]) -> Self;
}

macro_rules! impl_scalar {
    ($($ty:ty),* $(,)?) => {
        $(
            impl sealed::Sealed for $ty {}

            impl Scalar for $ty {
                const SIZE: usize = std::mem::size_of::<$ty>();

                #[inline]
                fn encode_le(self, dst: &mut [u8]) {
                    dst[..Self::SIZE].copy_from_slice(&self.to_le_bytes());
                }

                #[inline]
                fn decode_le(src: &[u8]) -> Self {
                    let mut raw = [0u8; std::mem::size_of::<$ty>()];
                    raw.copy_from_slice(&src[..Self::SIZE]);
                    <$ty>::from_le_bytes(raw)
                }
            }
        )*
    };
}

impl_scalar!(u8, i8, u16, i16, u32, i32, u64, i64, f32, f64);

/// Largest `Scalar::SIZE`; scratch space for encoding.
pub(crate) const MAX_SCALAR_SIZE: usize = 8;

/// Decode as many whole `T` values as `src` holds.
pub(crate) fn decode_all<T: Scalar>(src: &[u8]) -> Vec<T> {
    src.chunks_exact(T::SIZE).map(T::decode_le).collect()
}
