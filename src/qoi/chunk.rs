use crate::qoi::{cache::PixelCache, error::QoiError, grammar::Pixel};

/// One tag byte and its operands, decoded into the change it makes to the current pixel.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Chunk {
    Rgba(Pixel),
    Rgb { r: u8, g: u8, b: u8 },
    Index(u8),
    Diff { dr: i8, dg: i8, db: i8 },
    Luma { dg: i8, dr_dg: i8, db_dg: i8 },
    /// Number of copies emitted before the regular one.
    Run(u8),
}

impl Chunk {
    pub const RGBA_TAG: u8 = 0xFF;
    pub const RGB_TAG: u8 = 0xFE;

    /// Classifies the chunk whose tag byte is `bytes[0]`. `offset` is only used for
    /// error reporting.
    pub fn parse(bytes: &[u8], offset: usize) -> Result<Self, QoiError> {
        let Some(&tag) = bytes.first() else {
            return Err(QoiError::Truncated {
                offset,
                needed: 1,
                remaining: 0,
            });
        };

        let chunk = match tag {
            Self::RGBA_TAG => {
                let [r, g, b, a] = operands::<4>(bytes, offset)?;
                Self::Rgba(Pixel::new(r, g, b, a))
            }
            Self::RGB_TAG => {
                let [r, g, b] = operands::<3>(bytes, offset)?;
                Self::Rgb { r, g, b }
            }
            _ => match tag >> 6 {
                0b00 => Self::Index(tag & 0x3F),
                0b01 => Self::Diff {
                    dr: ((tag >> 4) & 0x03) as i8 - 2,
                    dg: ((tag >> 2) & 0x03) as i8 - 2,
                    db: (tag & 0x03) as i8 - 2,
                },
                0b10 => {
                    let [next] = operands::<1>(bytes, offset)?;

                    Self::Luma {
                        dg: (tag & 0x3F) as i8 - 32,
                        dr_dg: ((next >> 4) & 0x0F) as i8 - 8,
                        db_dg: (next & 0x0F) as i8 - 8,
                    }
                }
                0b11 => Self::Run(tag & 0x3F),
                _ => return Err(QoiError::UnknownTag { tag, offset }),
            },
        };

        Ok(chunk)
    }

    /// Bytes consumed by this chunk, tag included.
    pub const fn num_bytes(&self) -> usize {
        match self {
            Self::Rgba(_) => 5,
            Self::Rgb { .. } => 4,
            Self::Luma { .. } => 2,
            Self::Index(_) | Self::Diff { .. } | Self::Run(_) => 1,
        }
    }

    /// The pixel that results from applying this chunk to `current`.
    pub const fn apply(&self, current: Pixel, cache: &PixelCache) -> Pixel {
        match *self {
            Self::Rgba(pixel) => pixel,
            Self::Rgb { r, g, b } => Pixel::new(r, g, b, current.a),
            Self::Index(index) => cache.get(index),
            Self::Diff { dr, dg, db } => current.offset(dr, dg, db),
            // -32 - 8 is the widest it gets, no overflow
            Self::Luma { dg, dr_dg, db_dg } => current.offset(dg + dr_dg, dg, dg + db_dg),
            Self::Run(_) => current,
        }
    }
}

fn operands<const N: usize>(bytes: &[u8], offset: usize) -> Result<[u8; N], QoiError> {
    bytes
        .get(1..=N)
        .and_then(|slice| slice.try_into().ok())
        .ok_or(QoiError::Truncated {
            offset,
            needed: N + 1,
            remaining: bytes.len(),
        })
}
