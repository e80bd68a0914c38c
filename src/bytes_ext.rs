use bytes::Buf;

use crate::error::{DecodeError, DecodeResult};

/// A bounds-checked reader over a borrowed byte slice.
/// Positions are absolute offsets into the slice it was created from.
#[derive(Debug, Clone, Copy)]
pub struct Cursor<'a> {
    data: &'a [u8],
    position: usize,
}

/**
    This macro builds a set of try_get_{number_type} functions for safe reading of
    big endian values. They return a TruncatedInput error instead of panicking
**/
macro_rules! impl_safe_reads {
    ( $($type:ty),* ) => {
        paste::paste! {
            impl<'a> Cursor<'a> {
                $(
                pub fn [<try_get_ $type>](&mut self) -> DecodeResult<$type> {
                    let mut window = self.take(std::mem::size_of::<$type>())?;
                    Ok(window.[<get_ $type>]())
                }
                )*
            }
        }
    };
}

impl_safe_reads!(u8, u16, u32, u64, i8, i16, i32, i64);

impl<'a> Cursor<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, position: 0 }
    }

    pub fn at(data: &'a [u8], position: usize) -> Self {
        Self { data, position }
    }

    pub fn position(&self) -> usize {
        self.position
    }

    pub fn data(&self) -> &'a [u8] {
        self.data
    }

    pub fn remaining(&self) -> usize {
        self.data.len().saturating_sub(self.position)
    }

    pub fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    fn check(&self, needed: usize) -> DecodeResult<()> {
        if self.remaining() < needed || self.position > self.data.len() {
            return Err(DecodeError::TruncatedInput {
                offset: self.position,
                needed,
                remaining: self.remaining(),
            });
        }

        Ok(())
    }

    /// Borrow the next `len` bytes and move past them.
    pub fn take(&mut self, len: usize) -> DecodeResult<&'a [u8]> {
        self.check(len)?;

        let start = self.position;
        self.position += len;
        Ok(&self.data[start..self.position])
    }

    pub fn skip(&mut self, len: usize) -> DecodeResult<()> {
        self.check(len)?;
        self.position += len;
        Ok(())
    }

    /// Read a value at `position` without moving the cursor.
    pub fn peek_u16(&self, position: usize) -> DecodeResult<u16> {
        Cursor::at(self.data, position).try_get_u16()
    }
}
