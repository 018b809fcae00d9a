//! Cache Key Module
//!
//! Explicit, typed construction of memoization keys.
//!
//! A key is the SHA-256 digest of an operation name followed by its
//! arguments. Each argument is written with a type tag and a length prefix,
//! so `("ab", "c")` and `("a", "bc")`, or `"1"` and `1`, never collide.
//! Only types with one canonical byte form implement [`KeyPart`];
//! floating-point numbers are deliberately left out.

use std::fmt;

use serde::Serialize;
use sha2::{Digest, Sha256};

// == Key Part ==
/// An argument that can take part in a cache key.
pub trait KeyPart {
    /// Appends the tagged, length-prefixed encoding of `self` to `out`.
    fn write_key_part(&self, out: &mut Vec<u8>);
}

fn write_tagged(out: &mut Vec<u8>, tag: u8, bytes: &[u8]) {
    out.push(tag);
    out.extend_from_slice(&(bytes.len() as u64).to_le_bytes());
    out.extend_from_slice(bytes);
}

impl KeyPart for str {
    fn write_key_part(&self, out: &mut Vec<u8>) {
        write_tagged(out, b's', self.as_bytes());
    }
}

impl KeyPart for String {
    fn write_key_part(&self, out: &mut Vec<u8>) {
        self.as_str().write_key_part(out);
    }
}

impl KeyPart for bool {
    fn write_key_part(&self, out: &mut Vec<u8>) {
        write_tagged(out, b'b', &[u8::from(*self)]);
    }
}

impl KeyPart for char {
    fn write_key_part(&self, out: &mut Vec<u8>) {
        write_tagged(out, b'c', &u32::from(*self).to_le_bytes());
    }
}

// Integers widen to 128 bits so the key does not depend on the platform's usize.
macro_rules! unsigned_key_part {
    ($($ty:ty),*) => {$(
        impl KeyPart for $ty {
            fn write_key_part(&self, out: &mut Vec<u8>) {
                write_tagged(out, b'u', &(*self as u128).to_le_bytes());
            }
        }
    )*};
}

macro_rules! signed_key_part {
    ($($ty:ty),*) => {$(
        impl KeyPart for $ty {
            fn write_key_part(&self, out: &mut Vec<u8>) {
                write_tagged(out, b'i', &(*self as i128).to_le_bytes());
            }
        }
    )*};
}

unsigned_key_part!(u8, u16, u32, u64, u128, usize);
signed_key_part!(i8, i16, i32, i64, i128, isize);

impl<T: KeyPart> KeyPart for Option<T> {
    fn write_key_part(&self, out: &mut Vec<u8>) {
        match self {
            Some(inner) => {
                out.push(b'S');
                inner.write_key_part(out);
            }
            None => write_tagged(out, b'n', &[]),
        }
    }
}

impl<T: KeyPart> KeyPart for [T] {
    fn write_key_part(&self, out: &mut Vec<u8>) {
        out.push(b'l');
        out.extend_from_slice(&(self.len() as u64).to_le_bytes());
        for item in self {
            item.write_key_part(out);
        }
    }
}

impl<T: KeyPart> KeyPart for Vec<T> {
    fn write_key_part(&self, out: &mut Vec<u8>) {
        self.as_slice().write_key_part(out);
    }
}

impl<T: KeyPart + ?Sized> KeyPart for &T {
    fn write_key_part(&self, out: &mut Vec<u8>) {
        (**self).write_key_part(out);
    }
}

// == Cache Key ==
/// Hex-encoded digest identifying one operation call.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct CacheKey(String);

impl CacheKey {
    /// Starts a key for the operation called `operation`.
    pub fn builder(operation: &str) -> CacheKeyBuilder {
        let mut buf = Vec::new();
        write_tagged(&mut buf, b'o', operation.as_bytes());
        CacheKeyBuilder { buf }
    }

    /// Key for an operation that takes no arguments.
    pub fn for_operation(operation: &str) -> Self {
        Self::builder(operation).build()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// == Cache Key Builder ==
/// Accumulates arguments for a [`CacheKey`].
#[derive(Debug, Clone)]
pub struct CacheKeyBuilder {
    buf: Vec<u8>,
}

impl CacheKeyBuilder {
    /// Appends one argument. Order matters.
    pub fn part(mut self, part: impl KeyPart) -> Self {
        part.write_key_part(&mut self.buf);
        self
    }

    pub fn build(self) -> CacheKey {
        let digest = Sha256::digest(&self.buf);
        CacheKey(hex::encode(digest))
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_is_deterministic() {
        let first = CacheKey::builder("collect_keywords")
            .part("pt-BR")
            .part(42u64)
            .build();
        let second = CacheKey::builder("collect_keywords")
            .part("pt-BR".to_string())
            .part(42u64)
            .build();

        assert_eq!(first, second);
        assert_eq!(first.as_str().len(), 64);
        assert!(first.as_str().chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_operation_name_distinguishes_keys() {
        let a = CacheKey::builder("fetch_a").part(1u32).build();
        let b = CacheKey::builder("fetch_b").part(1u32).build();
        assert_ne!(a, b);
        assert_ne!(CacheKey::for_operation("fetch_a"), a);
    }

    #[test]
    fn test_argument_order_matters() {
        let a = CacheKey::builder("op").part("x").part("y").build();
        let b = CacheKey::builder("op").part("y").part("x").build();
        assert_ne!(a, b);
    }

    #[test]
    fn test_boundaries_are_unambiguous() {
        let a = CacheKey::builder("op").part("ab").part("c").build();
        let b = CacheKey::builder("op").part("a").part("bc").build();
        assert_ne!(a, b);

        // An operation name cannot bleed into its first argument
        let c = CacheKey::builder("opx").build();
        let d = CacheKey::builder("op").part("x").build();
        assert_ne!(c, d);
    }

    #[test]
    fn test_types_are_distinguished() {
        let text = CacheKey::builder("op").part("1").build();
        let unsigned = CacheKey::builder("op").part(1u8).build();
        let signed = CacheKey::builder("op").part(1i8).build();
        let flag = CacheKey::builder("op").part(true).build();

        assert_ne!(text, unsigned);
        assert_ne!(unsigned, signed);
        assert_ne!(unsigned, flag);
    }

    #[test]
    fn test_integer_width_does_not_matter() {
        let narrow = CacheKey::builder("op").part(7u8).build();
        let wide = CacheKey::builder("op").part(7usize).build();
        assert_eq!(narrow, wide);
    }

    #[test]
    fn test_option_and_list_parts() {
        let none = CacheKey::builder("op").part(None::<u32>).build();
        let some = CacheKey::builder("op").part(Some(0u32)).build();
        assert_ne!(none, some);

        let nested = CacheKey::builder("op")
            .part(vec!["a".to_string(), "b".to_string()])
            .build();
        let flat = CacheKey::builder("op").part("a").part("b").build();
        assert_ne!(nested, flat);

        let words = ["a", "b"];
        let from_slice = CacheKey::builder("op").part(&words[..]).build();
        let from_vec = CacheKey::builder("op").part(vec!["a", "b"]).build();
        assert_eq!(from_slice, from_vec);
    }

    #[test]
    fn test_display_matches_digest() {
        let key = CacheKey::for_operation("health");
        assert_eq!(key.to_string(), key.as_str());
    }
}
