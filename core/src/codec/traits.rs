//! codec/traits.rs
//! Typed entry points into the encoder and decoder.
//!
//! `Writable` types emit one wire value (a `Value::Composite` emits its fields),
//! `Readable` types consume exactly one.
//! Composites with several positional fields go through `Schema` instead.

use num_bigint::BigInt;

use crate::codec::decode::Decoder;
use crate::codec::encode::Encoder;
use crate::types::CodecError;
use crate::value::{Address, Value};

pub trait Writable {
    fn write_to(&self, enc: &mut Encoder<'_>) -> Result<(), CodecError>;

    /// Slots taken in an enclosing known-length list.
    fn wire_width(&self) -> usize {
        1
    }
}

pub trait Readable: Sized {
    fn read_from(dec: &mut Decoder<'_>) -> Result<Self, CodecError>;
}

impl<T: Writable + ?Sized> Writable for &T {
    fn write_to(&self, enc: &mut Encoder<'_>) -> Result<(), CodecError> {
        (**self).write_to(enc)
    }

    fn wire_width(&self) -> usize {
        (**self).wire_width()
    }
}

impl<T: Writable + ?Sized> Writable for Box<T> {
    fn write_to(&self, enc: &mut Encoder<'_>) -> Result<(), CodecError> {
        (**self).write_to(enc)
    }

    fn wire_width(&self) -> usize {
        (**self).wire_width()
    }
}

macro_rules! scalar_io {
    ($ty:ty, $put:ident, $take:ident) => {
        impl Writable for $ty {
            fn write_to(&self, enc: &mut Encoder<'_>) -> Result<(), CodecError> {
                enc.$put(*self)
            }
        }

        impl Readable for $ty {
            fn read_from(dec: &mut Decoder<'_>) -> Result<Self, CodecError> {
                dec.$take()
            }
        }
    };
}

scalar_io!(bool, put_bool, take_bool);
scalar_io!(i8, put_byte, take_byte);
scalar_io!(i16, put_short, take_short);
scalar_io!(u16, put_char, take_char);
scalar_io!(i32, put_int, take_int);
scalar_io!(f32, put_float, take_float);
scalar_io!(i64, put_long, take_long);
scalar_io!(f64, put_double, take_double);

impl Writable for BigInt {
    fn write_to(&self, enc: &mut Encoder<'_>) -> Result<(), CodecError> {
        enc.put_bigint(self)
    }
}

impl Readable for BigInt {
    fn read_from(dec: &mut Decoder<'_>) -> Result<Self, CodecError> {
        dec.take_bigint()
    }
}

impl Writable for str {
    fn write_to(&self, enc: &mut Encoder<'_>) -> Result<(), CodecError> {
        enc.put_str(self)
    }
}

impl Writable for String {
    fn write_to(&self, enc: &mut Encoder<'_>) -> Result<(), CodecError> {
        enc.put_str(self)
    }
}

impl Readable for String {
    fn read_from(dec: &mut Decoder<'_>) -> Result<Self, CodecError> {
        dec.take_string()
    }
}

// Byte arrays, not lists of bytes: lists go through `write_list_of`.
impl Writable for [u8] {
    fn write_to(&self, enc: &mut Encoder<'_>) -> Result<(), CodecError> {
        enc.put_bytes(self)
    }
}

impl Writable for Vec<u8> {
    fn write_to(&self, enc: &mut Encoder<'_>) -> Result<(), CodecError> {
        enc.put_bytes(self)
    }
}

impl Readable for Vec<u8> {
    fn read_from(dec: &mut Decoder<'_>) -> Result<Self, CodecError> {
        dec.take_bytes()
    }
}

impl Writable for Address {
    fn write_to(&self, enc: &mut Encoder<'_>) -> Result<(), CodecError> {
        enc.put_address(self)
    }
}

impl Readable for Address {
    fn read_from(dec: &mut Decoder<'_>) -> Result<Self, CodecError> {
        dec.take_address()
    }
}

impl Writable for Value {
    fn write_to(&self, enc: &mut Encoder<'_>) -> Result<(), CodecError> {
        enc.put_value(self)
    }

    fn wire_width(&self) -> usize {
        Value::wire_width(self)
    }
}

impl Readable for Value {
    fn read_from(dec: &mut Decoder<'_>) -> Result<Self, CodecError> {
        dec.take_value()
    }
}
