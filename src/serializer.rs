//! Serializer Module
//!
//! Converts cache values to the byte strings persisted in the store and back.

use serde::{de::DeserializeOwned, Serialize};

use crate::error::{CacheError, Result};

// == Serializer Trait ==
/// Encodes values for storage and decodes stored bytes.
///
/// Implementations must satisfy the round-trip law: for every value `v`
/// they accept, `unserialize(&serialize(&v)?)` yields a value equal to `v`.
/// Values an implementation cannot round-trip must be rejected with
/// `CacheError::InvalidArgument` instead of being stored lossily.
pub trait Serializer {
    /// Serializes `value` into the byte form stored in the backing store.
    fn serialize<T>(&self, value: &T) -> Result<Vec<u8>>
    where
        T: Serialize + ?Sized;

    /// Restores a value from bytes previously produced by `serialize`.
    ///
    /// # Errors
    /// `CacheError::InvalidArgument` when `data` is not in this serializer's
    /// format or does not describe a `T`.
    fn unserialize<T>(&self, data: &[u8]) -> Result<T>
    where
        T: DeserializeOwned;
}

// == Json Serializer ==
/// Default serializer backed by `serde_json`.
///
/// JSON is self-describing, so data written by another serializer (or by a
/// different client) is detected as malformed instead of being misread.
///
/// Supported: every type whose `Serialize`/`Deserialize` impls agree, i.e.
/// primitives, strings, sequences, maps with string-like keys, structs,
/// enums, `Option`, and `chrono` date-times.
///
/// Rejected at `serialize` time:
/// - maps whose keys do not serialize as strings or numbers
/// - non-finite floats (`NaN`, `inf`), which JSON would turn into `null`
/// - `Some` around a value that encodes as `null` (`Some(None)`, `Some(())`,
///   unit structs), which would read back as `None`
///
/// Cyclic graphs cannot be expressed through `Serialize`, and live
/// resources (sockets, closures) have no `Serialize` impl, so both are ruled
/// out at compile time.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonSerializer;

impl JsonSerializer {
    pub fn new() -> Self {
        Self
    }
}

impl Serializer for JsonSerializer {
    fn serialize<T>(&self, value: &T) -> Result<Vec<u8>>
    where
        T: Serialize + ?Sized,
    {
        // serde_json would write these as `null` and read back something else
        value
            .serialize(strict::RoundTrip)
            .map_err(|e| CacheError::InvalidArgument(format!("cannot serialize value: {e}")))?;

        serde_json::to_vec(value)
            .map_err(|e| CacheError::InvalidArgument(format!("cannot serialize value: {e}")))
    }

    fn unserialize<T>(&self, data: &[u8]) -> Result<T>
    where
        T: DeserializeOwned,
    {
        serde_json::from_slice(data)
            .map_err(|e| CacheError::InvalidArgument(format!("cannot unserialize data: {e}")))
    }
}

mod strict {
    //! A serde `Serializer` that discards output and fails on values JSON
    //! cannot restore: non-finite floats, and `Some` around a value that
    //! encodes as `null`.

    use std::fmt;

    use serde::ser::{self, Serialize};

    #[derive(Debug)]
    pub enum Lossy {
        NonFiniteFloat,
        NullInsideSome,
        Custom(String),
    }

    impl fmt::Display for Lossy {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            match self {
                Lossy::NonFiniteFloat => {
                    f.write_str("non-finite floating point values have no JSON form")
                }
                Lossy::NullInsideSome => {
                    f.write_str("`Some` around a null-like value would read back as `None`")
                }
                Lossy::Custom(msg) => f.write_str(msg),
            }
        }
    }

    impl std::error::Error for Lossy {}

    impl ser::Error for Lossy {
        fn custom<T: fmt::Display>(msg: T) -> Self {
            Lossy::Custom(msg.to_string())
        }
    }

    /// Walks a value. `Ok(true)` means the value encodes as JSON `null`.
    pub struct RoundTrip;

    type Res = Result<bool, Lossy>;

    fn finite(is_finite: bool) -> Res {
        if is_finite {
            Ok(false)
        } else {
            Err(Lossy::NonFiniteFloat)
        }
    }

    impl ser::Serializer for RoundTrip {
        type Ok = bool;
        type Error = Lossy;
        type SerializeSeq = Self;
        type SerializeTuple = Self;
        type SerializeTupleStruct = Self;
        type SerializeTupleVariant = Self;
        type SerializeMap = Self;
        type SerializeStruct = Self;
        type SerializeStructVariant = Self;

        fn serialize_bool(self, _v: bool) -> Res {
            Ok(false)
        }
        fn serialize_i8(self, _v: i8) -> Res {
            Ok(false)
        }
        fn serialize_i16(self, _v: i16) -> Res {
            Ok(false)
        }
        fn serialize_i32(self, _v: i32) -> Res {
            Ok(false)
        }
        fn serialize_i64(self, _v: i64) -> Res {
            Ok(false)
        }
        fn serialize_i128(self, _v: i128) -> Res {
            Ok(false)
        }
        fn serialize_u8(self, _v: u8) -> Res {
            Ok(false)
        }
        fn serialize_u16(self, _v: u16) -> Res {
            Ok(false)
        }
        fn serialize_u32(self, _v: u32) -> Res {
            Ok(false)
        }
        fn serialize_u64(self, _v: u64) -> Res {
            Ok(false)
        }
        fn serialize_u128(self, _v: u128) -> Res {
            Ok(false)
        }
        fn serialize_f32(self, v: f32) -> Res {
            finite(v.is_finite())
        }
        fn serialize_f64(self, v: f64) -> Res {
            finite(v.is_finite())
        }
        fn serialize_char(self, _v: char) -> Res {
            Ok(false)
        }
        fn serialize_str(self, _v: &str) -> Res {
            Ok(false)
        }
        fn serialize_bytes(self, _v: &[u8]) -> Res {
            Ok(false)
        }
        fn serialize_none(self) -> Res {
            Ok(true)
        }
        fn serialize_some<T: ?Sized + Serialize>(self, value: &T) -> Res {
            if value.serialize(RoundTrip)? {
                return Err(Lossy::NullInsideSome);
            }
            Ok(false)
        }
        fn serialize_unit(self) -> Res {
            Ok(true)
        }
        fn serialize_unit_struct(self, _name: &'static str) -> Res {
            Ok(true)
        }
        fn serialize_unit_variant(
            self,
            _name: &'static str,
            _idx: u32,
            _variant: &'static str,
        ) -> Res {
            Ok(false)
        }
        // serde_json writes newtype structs as their inner value
        fn serialize_newtype_struct<T: ?Sized + Serialize>(
            self,
            _name: &'static str,
            value: &T,
        ) -> Res {
            value.serialize(self)
        }
        fn serialize_newtype_variant<T: ?Sized + Serialize>(
            self,
            _name: &'static str,
            _idx: u32,
            _variant: &'static str,
            value: &T,
        ) -> Res {
            value.serialize(self).map(|_| false)
        }
        fn serialize_seq(self, _len: Option<usize>) -> Result<Self, Lossy> {
            Ok(self)
        }
        fn serialize_tuple(self, _len: usize) -> Result<Self, Lossy> {
            Ok(self)
        }
        fn serialize_tuple_struct(
            self,
            _name: &'static str,
            _len: usize,
        ) -> Result<Self, Lossy> {
            Ok(self)
        }
        fn serialize_tuple_variant(
            self,
            _name: &'static str,
            _idx: u32,
            _variant: &'static str,
            _len: usize,
        ) -> Result<Self, Lossy> {
            Ok(self)
        }
        fn serialize_map(self, _len: Option<usize>) -> Result<Self, Lossy> {
            Ok(self)
        }
        fn serialize_struct(self, _name: &'static str, _len: usize) -> Result<Self, Lossy> {
            Ok(self)
        }
        fn serialize_struct_variant(
            self,
            _name: &'static str,
            _idx: u32,
            _variant: &'static str,
            _len: usize,
        ) -> Result<Self, Lossy> {
            Ok(self)
        }
    }

    impl ser::SerializeSeq for RoundTrip {
        type Ok = bool;
        type Error = Lossy;
        fn serialize_element<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<(), Lossy> {
            value.serialize(RoundTrip).map(drop)
        }
        fn end(self) -> Res {
            Ok(false)
        }
    }

    impl ser::SerializeTuple for RoundTrip {
        type Ok = bool;
        type Error = Lossy;
        fn serialize_element<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<(), Lossy> {
            value.serialize(RoundTrip).map(drop)
        }
        fn end(self) -> Res {
            Ok(false)
        }
    }

    impl ser::SerializeTupleStruct for RoundTrip {
        type Ok = bool;
        type Error = Lossy;
        fn serialize_field<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<(), Lossy> {
            value.serialize(RoundTrip).map(drop)
        }
        fn end(self) -> Res {
            Ok(false)
        }
    }

    impl ser::SerializeTupleVariant for RoundTrip {
        type Ok = bool;
        type Error = Lossy;
        fn serialize_field<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<(), Lossy> {
            value.serialize(RoundTrip).map(drop)
        }
        fn end(self) -> Res {
            Ok(false)
        }
    }

    impl ser::SerializeMap for RoundTrip {
        type Ok = bool;
        type Error = Lossy;
        fn serialize_key<T: ?Sized + Serialize>(&mut self, key: &T) -> Result<(), Lossy> {
            key.serialize(RoundTrip).map(drop)
        }
        fn serialize_value<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<(), Lossy> {
            value.serialize(RoundTrip).map(drop)
        }
        fn end(self) -> Res {
            Ok(false)
        }
    }

    impl ser::SerializeStruct for RoundTrip {
        type Ok = bool;
        type Error = Lossy;
        fn serialize_field<T: ?Sized + Serialize>(
            &mut self,
            _key: &'static str,
            value: &T,
        ) -> Result<(), Lossy> {
            value.serialize(RoundTrip).map(drop)
        }
        fn end(self) -> Res {
            Ok(false)
        }
    }

    impl ser::SerializeStructVariant for RoundTrip {
        type Ok = bool;
        type Error = Lossy;
        fn serialize_field<T: ?Sized + Serialize>(
            &mut self,
            _key: &'static str,
            value: &T,
        ) -> Result<(), Lossy> {
            value.serialize(RoundTrip).map(drop)
        }
        fn end(self) -> Res {
            Ok(false)
        }
    }
}
