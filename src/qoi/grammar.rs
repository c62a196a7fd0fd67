use crate::image::grammar::{ColorType, ImageExt};
use anyhow::bail;
use bytemuck::{Pod, Zeroable};
use std::{borrow::Cow, fmt};

pub const MAGIC: &[u8; 4] = b"qoif";
pub const HEADER_SIZE: usize = 14;
pub const END_MARKER: [u8; 8] = [0, 0, 0, 0, 0, 0, 0, 1];

#[repr(C)]
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, Hash, Pod, Zeroable)]
pub struct Pixel {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Pixel {
    pub const ZERO: Self = Self::new(0, 0, 0, 0);

    /// The current pixel before the first chunk is read.
    pub const START: Self = Self::new(0, 0, 0, 255);

    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Index of this pixel in the 64 slot pixel cache.
    pub const fn hash(&self) -> usize {
        (self.r as usize * 3 + self.g as usize * 5 + self.b as usize * 7 + self.a as usize * 11)
            % 64
    }

    /// Adds signed deltas to r, g, b modulo 256. Alpha is kept.
    pub const fn offset(self, dr: i8, dg: i8, db: i8) -> Self {
        Self {
            r: self.r.wrapping_add_signed(dr),
            g: self.g.wrapping_add_signed(dg),
            b: self.b.wrapping_add_signed(db),
            a: self.a,
        }
    }

    pub const fn rgb(&self) -> [u8; 3] {
        [self.r, self.g, self.b]
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ColorSpace {
    /// sRGB with linear alpha.
    Srgb = 0,
    /// All channels linear.
    Linear = 1,
}

impl TryFrom<u8> for ColorSpace {
    type Error = anyhow::Error;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        let val = match value {
            0 => Self::Srgb,
            1 => Self::Linear,
            foreign => bail!("Unrecognized colorspace: {}", foreign),
        };

        Ok(val)
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct QoiHeader {
    pub(crate) width: u32,
    pub(crate) height: u32,
    pub(crate) color_type: ColorType,
    pub(crate) color_space: ColorSpace,
}

impl QoiHeader {
    pub const fn width(&self) -> u32 {
        self.width
    }

    pub const fn height(&self) -> u32 {
        self.height
    }

    pub const fn color_type(&self) -> ColorType {
        self.color_type
    }

    pub const fn color_space(&self) -> ColorSpace {
        self.color_space
    }

    pub const fn num_pixels(&self) -> u64 {
        self.width as u64 * self.height as u64
    }
}

impl fmt::Display for QoiHeader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "IMAGE DETAILS:")?;
        writeln!(f, "  Magic bytes: {}", String::from_utf8_lossy(MAGIC))?;
        writeln!(f, "  Channels: {}", self.color_type.num_channels())?;
        writeln!(f, "  Colorspace: {}", self.color_space as u8)?;
        writeln!(f, "  Image width: {}", self.width)?;
        write!(f, "  Image height: {}", self.height)
    }
}

#[derive(Debug, PartialEq, Eq)]
pub struct Qoi {
    pub(crate) header: QoiHeader,
    pub(crate) pixels: Vec<Pixel>,
}

impl Qoi {
    pub const fn header(&self) -> &QoiHeader {
        &self.header
    }

    pub fn pixels(&self) -> &[Pixel] {
        &self.pixels
    }
}

impl ImageExt for Qoi {
    fn width(&self) -> u32 {
        self.header.width
    }

    fn height(&self) -> u32 {
        self.header.height
    }

    fn color_type(&self) -> ColorType {
        self.header.color_type
    }

    fn rgb8(&self) -> Cow<'_, [u8]> {
        Cow::Owned(self.pixels.iter().flat_map(Pixel::rgb).collect())
    }

    fn rgba8(&self) -> Cow<'_, [u8]> {
        Cow::Borrowed(bytemuck::cast_slice(&self.pixels))
    }
}
