//! # Internal Macros
//!
//! This module provides internal macros for reducing boilerplate in tablebuf.
//!
//! ## impl_scalar!
//!
//! Generates [`Scalar`](crate::tables::types::Scalar) implementations for
//! fixed-width primitive types. Every scalar is encoded little-endian at its
//! natural width, so the implementations only differ in type name and size.
//!
//! ## scalar_slot_methods!
//!
//! Generates the typed `push_<ty>_slot` convenience methods on
//! [`TableBuilder`](crate::tables::builder::TableBuilder), mirroring the
//! per-type slot writers that schema-generated code calls.

/// Implements `Scalar` for primitive types using little-endian byte order.
#[macro_export]
macro_rules! impl_scalar {
    ($($ty:ty => $size:expr),* $(,)?) => {
        $(
            impl Scalar for $ty {
                const SIZE: usize = $size;

                #[inline]
                fn write_le(self, out: &mut [u8]) {
                    out[..$size].copy_from_slice(&self.to_le_bytes());
                }

                #[inline]
                fn read_le(src: &[u8]) -> Self {
                    let mut bytes = [0u8; $size];
                    bytes.copy_from_slice(&src[..$size]);
                    <$ty>::from_le_bytes(bytes)
                }
            }
        )*
    };
}

/// Generates typed slot-writer methods on the table builder.
#[macro_export]
macro_rules! scalar_slot_methods {
    ($($name:ident : $ty:ty),* $(,)?) => {
        ::paste::paste! {
            $(
                /// Writes a scalar slot, eliding the field when `value`
                /// equals `default`.
                #[inline]
                pub fn [<push_ $name _slot>](&mut self, slot: u16, value: $ty, default: $ty) {
                    self.push_scalar_slot(slot, value, default);
                }
            )*
        }
    };
}
