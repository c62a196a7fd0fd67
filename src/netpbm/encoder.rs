use crate::{
    image::grammar::ImageExt,
    qoi::{grammar::Pixel, PixelSink},
};
use anyhow::Result;
use std::io::{self, Write};

/// Writes binary PPM (`P6`) with a max value of 255. Alpha is dropped.
pub struct PpmEncoder<W: Write> {
    writer: W,
}

impl<W: Write> PpmEncoder<W> {
    pub const fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn write_header(&mut self, width: u32, height: u32) -> Result<()> {
        writeln!(self.writer, "P6 {width} {height} 255")?;

        Ok(())
    }

    pub fn encode(&mut self, image: &impl ImageExt) -> Result<()> {
        let (width, height) = image.dimensions();

        self.write_header(width, height)?;
        self.writer.write_all(&image.rgb8())?;
        self.writer.flush()?;

        Ok(())
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> PixelSink for PpmEncoder<W> {
    fn emit(&mut self, pixel: Pixel) -> io::Result<()> {
        self.writer.write_all(&pixel.rgb())
    }
}
