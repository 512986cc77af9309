//! Little-endian serialization helpers for RIFF fields.

pub trait WriteBytesLe {
    fn write_le(&self, dst: &mut Vec<u8>);
}

macro_rules! impl_num_le {
    ($($t:ty),+) => { $(
        impl WriteBytesLe for $t { #[inline] fn write_le(&self, dst: &mut Vec<u8>) { dst.extend_from_slice(&self.to_le_bytes()); }}
    )+ }
}

impl_num_le!(u8, i8, u16, i16, u32, i32);

impl<T: WriteBytesLe, const N: usize> WriteBytesLe for [T; N] {
    #[inline]
    fn write_le(&self, dst: &mut Vec<u8>) {
        self.iter().for_each(|item| item.write_le(dst));
    }
}

impl<T: WriteBytesLe> WriteBytesLe for [T] {
    #[inline]
    fn write_le(&self, dst: &mut Vec<u8>) {
        self.iter().for_each(|item| item.write_le(dst));
    }
}

/// Encodes a sequence of values back to back.
#[macro_export]
macro_rules! join_bytes_le {
    ( $($value:expr),+ $(,)? ) => {{
        let mut vec = Vec::<u8>::new();
        $( $crate::byteorder::WriteBytesLe::write_le(&$value, &mut vec); )+
        vec
    }};
}

#[cfg(test)]
mod tests {
    use crate::byteorder::WriteBytesLe;
    use soundwave_macros::ToBytes;

    #[derive(ToBytes)]
    struct Chunk {
        id: [u8; 4],
        size: u32,
        format: u16,
    }

    #[test]
    fn derive_writes_fields_in_order() {
        let chunk = Chunk {
            id: *b"fmt ",
            size: 16,
            format: 1,
        };

        let mut dst = Vec::new();
        chunk.write_le(&mut dst);

        assert_eq!(dst, [b'f', b'm', b't', b' ', 16, 0, 0, 0, 1, 0]);
    }

    #[test]
    fn join_signed_samples() {
        let bytes = crate::join_bytes_le!(-2i16, 0x1234i16, 0x80u8);
        assert_eq!(bytes, [0xFE, 0xFF, 0x34, 0x12, 0x80]);
    }
}
