pub const U8_BYTES: usize = 1;
pub const U32_BYTES: usize = 4;

/// Generates a big-endian reader for a decoder holding `cursor` and `data`.
#[macro_export]
macro_rules! read {
    ($name:ident, $type:ty, $width:expr) => {
        fn $name(&mut self) -> anyhow::Result<$type> {
            let slice = self.read_slice($width)?;

            Ok(<$type>::from_be_bytes(slice.try_into()?))
        }
    };
}

#[macro_export]
macro_rules! read_slice {
    () => {
        fn read_slice(&mut self, len: usize) -> anyhow::Result<&'a [u8]> {
            let slice = self
                .data
                .get(self.cursor..self.cursor + len)
                .ok_or_else(|| {
                    anyhow::anyhow!(
                        "Unexpected EOF. At {}, seek by {}, buffer size: {}.",
                        self.cursor,
                        len,
                        self.data.len()
                    )
                })?;

            self.cursor += len;

            Ok(slice)
        }
    };
}
