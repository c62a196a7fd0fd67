use anyhow::bail;
use std::borrow::Cow;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ColorType {
    RGB = 3,
    RGBA = 4,
}

impl ColorType {
    pub const fn num_channels(&self) -> u8 {
        *self as u8
    }
}

impl TryFrom<u8> for ColorType {
    type Error = anyhow::Error;

    fn try_from(value: u8) -> anyhow::Result<Self, Self::Error> {
        let val = match value {
            3 => Self::RGB,
            4 => Self::RGBA,
            foreign => bail!("Unrecognized channel count: {}", foreign),
        };

        Ok(val)
    }
}

pub trait ImageExt {
    fn width(&self) -> u32;

    fn height(&self) -> u32;

    fn dimensions(&self) -> (u32, u32) {
        (self.width(), self.height())
    }

    fn color_type(&self) -> ColorType;

    /// Pixels as packed r, g, b triples. Alpha is dropped.
    fn rgb8(&self) -> Cow<'_, [u8]>;

    fn rgba8(&self) -> Cow<'_, [u8]>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_color_type_from_channel_count() -> Result<()> {
        assert_eq!(ColorType::try_from(3)?, ColorType::RGB);
        assert_eq!(ColorType::try_from(4)?, ColorType::RGBA);
        assert_eq!(ColorType::RGBA.num_channels(), 4);

        assert!(ColorType::try_from(1).is_err());
        assert!(ColorType::try_from(2).is_err());

        Ok(())
    }
}
