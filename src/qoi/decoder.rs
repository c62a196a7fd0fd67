#[cfg(feature = "time")]
use crate::util::event_log::{log_event, Event};
use crate::{
    qoi::{
        cache::PixelCache,
        chunk::Chunk,
        error::QoiError,
        grammar::{Pixel, Qoi, QoiHeader, END_MARKER, MAGIC},
    },
    read, read_slice,
    util::read_bytes::{U32_BYTES, U8_BYTES},
};
use anyhow::{ensure, Result};
#[cfg(feature = "time")]
use std::time::Instant;
use std::io;

/// Receives decoded pixels in stream order.
pub trait PixelSink {
    fn emit(&mut self, pixel: Pixel) -> io::Result<()>;
}

impl PixelSink for Vec<Pixel> {
    fn emit(&mut self, pixel: Pixel) -> io::Result<()> {
        self.push(pixel);

        Ok(())
    }
}

/// Decodes the chunk region of a QOI stream, the bytes between the header and the
/// end marker.
#[derive(Debug)]
pub struct ChunkDecoder<'a> {
    cursor: usize,
    data: &'a [u8],
    current: Pixel,
    cache: PixelCache,
}

impl<'a> ChunkDecoder<'a> {
    pub const fn new(data: &'a [u8]) -> Self {
        Self {
            cursor: 0,
            data,
            current: Pixel::START,
            cache: PixelCache::new(),
        }
    }

    /// Feeds every pixel the stream encodes to `sink` and returns how many were emitted.
    ///
    /// The pixel count is not checked against any image dimensions. On error, pixels
    /// from earlier chunks have already been emitted but nothing from the failing one.
    pub fn decode<S: PixelSink + ?Sized>(mut self, sink: &mut S) -> Result<u64, QoiError> {
        let mut emitted = 0;

        while self.cursor < self.data.len() {
            let chunk = Chunk::parse(&self.data[self.cursor..], self.cursor)?;
            log::trace!("{:#08x}: {:?}", self.cursor, chunk);

            if let Chunk::Run(extra) = chunk {
                for _ in 0..extra {
                    sink.emit(self.current)?;
                }

                emitted += extra as u64;
            }

            self.current = chunk.apply(self.current, &self.cache);
            self.cache.insert(self.current);
            sink.emit(self.current)?;
            emitted += 1;

            self.cursor += chunk.num_bytes();
        }

        log::debug!(
            "Decoded {} pixels from {} chunk bytes.",
            emitted,
            self.data.len()
        );

        Ok(emitted)
    }
}

#[derive(Debug)]
pub struct QoiDecoder<'a> {
    cursor: usize,
    data: &'a [u8],
}

impl<'a> QoiDecoder<'a> {
    pub const fn new(data: &'a [u8]) -> Self {
        Self { cursor: 0, data }
    }

    pub fn decode(&mut self) -> Result<Qoi> {
        #[cfg(feature = "time")]
        let a = Instant::now();
        let header = self.parse_header()?;
        let chunks = self.chunk_region()?;
        #[cfg(feature = "time")]
        log_event("", Event::ParseHeader, Some(a.elapsed()));

        #[cfg(feature = "time")]
        let b = Instant::now();

        // a single run byte expands to at most 62 pixels
        let capacity = header.num_pixels().min(chunks.len() as u64 * 62);
        let mut pixels: Vec<Pixel> = Vec::with_capacity(capacity as usize);

        let emitted = ChunkDecoder::new(chunks).decode(&mut pixels)?;

        #[cfg(feature = "time")]
        log_event("", Event::DecodeChunks, Some(b.elapsed()));

        ensure!(
            emitted == header.num_pixels(),
            "Expected {} pixels for a {}x{} image, decoded {}.",
            header.num_pixels(),
            header.width,
            header.height,
            emitted
        );

        Ok(Qoi { header, pixels })
    }

    pub fn parse_header(&mut self) -> Result<QoiHeader> {
        ensure!(
            self.read_slice(MAGIC.len())? == MAGIC,
            "Invalid QOI file: incorrect magic bytes."
        );

        let header = QoiHeader {
            width: self.read_u32()?,
            height: self.read_u32()?,
            color_type: self.read_u8()?.try_into()?,
            color_space: self.read_u8()?.try_into()?,
        };

        log::debug!("Parsed header: {:?}", header);

        Ok(header)
    }

    /// Everything after the cursor up to the end marker.
    fn chunk_region(&self) -> Result<&'a [u8]> {
        let data = self.data;
        let rest = &data[self.cursor..];

        ensure!(
            rest.len() >= END_MARKER.len(),
            "Unexpected EOF. Expected an end marker, found {} bytes.",
            rest.len()
        );

        let (chunks, end_marker) = rest.split_at(rest.len() - END_MARKER.len());

        ensure!(
            end_marker == END_MARKER,
            "Invalid QOI file: incorrect end marker {:?}.",
            end_marker
        );

        Ok(chunks)
    }

    read!(read_u8, u8, U8_BYTES);
    read!(read_u32, u32, U32_BYTES);
    read_slice!();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        image::grammar::{ColorType, ImageExt},
        qoi::grammar::{ColorSpace, HEADER_SIZE},
    };
    use ::image::{DynamicImage, ImageFormat, Rgb, RgbImage, Rgba, RgbaImage};
    use pretty_assertions::assert_eq;
    use std::io::Cursor;

    fn decode_chunks(data: &[u8]) -> Result<Vec<Pixel>, QoiError> {
        let mut pixels = Vec::new();
        ChunkDecoder::new(data).decode(&mut pixels)?;

        Ok(pixels)
    }

    fn qoi_file(width: u32, height: u32, channels: u8, chunks: &[u8]) -> Vec<u8> {
        let mut data = Vec::with_capacity(HEADER_SIZE + chunks.len() + END_MARKER.len());
        data.extend_from_slice(MAGIC);
        data.extend_from_slice(&width.to_be_bytes());
        data.extend_from_slice(&height.to_be_bytes());
        data.push(channels);
        data.push(0);
        data.extend_from_slice(chunks);
        data.extend_from_slice(&END_MARKER);

        data
    }

    #[test]
    fn test_empty_region() -> Result<()> {
        assert!(decode_chunks(&[])?.is_empty());

        Ok(())
    }

    #[test]
    fn test_literal_then_index() -> Result<()> {
        // (10, 20, 30, 255) lands in slot 9, slot 0 still holds the zero pixel
        assert_eq!(
            decode_chunks(&[0xFF, 10, 20, 30, 255, 0x00])?,
            vec![Pixel::new(10, 20, 30, 255), Pixel::ZERO]
        );

        assert_eq!(
            decode_chunks(&[0xFF, 10, 20, 30, 255, 0x09])?,
            vec![Pixel::new(10, 20, 30, 255); 2]
        );

        Ok(())
    }

    #[test]
    fn test_index_sees_latest_collision() -> Result<()> {
        assert_eq!(
            decode_chunks(&[0xFF, 1, 0, 0, 0, 0xFF, 65, 0, 0, 0, 0x03])?,
            vec![
                Pixel::new(1, 0, 0, 0),
                Pixel::new(65, 0, 0, 0),
                Pixel::new(65, 0, 0, 0)
            ]
        );

        Ok(())
    }

    #[test]
    fn test_rgb_keeps_alpha() -> Result<()> {
        assert_eq!(
            decode_chunks(&[0xFF, 1, 2, 3, 4, 0xFE, 5, 6, 7])?,
            vec![Pixel::new(1, 2, 3, 4), Pixel::new(5, 6, 7, 4)]
        );

        // the starting alpha is opaque
        assert_eq!(
            decode_chunks(&[0xFE, 5, 6, 7])?,
            vec![Pixel::new(5, 6, 7, 255)]
        );

        Ok(())
    }

    #[test]
    fn test_run_emits_field_plus_one() -> Result<()> {
        for field in [0_u8, 1, 30, 61] {
            let pixels = decode_chunks(&[0xFF, 10, 20, 30, 255, 0xC0 | field])?;

            assert_eq!(pixels.len(), 1 + field as usize + 1);
            assert!(pixels.iter().all(|p| *p == Pixel::new(10, 20, 30, 255)));
        }

        Ok(())
    }

    #[test]
    fn test_run_updates_cache() -> Result<()> {
        // the starting pixel only reaches the cache through the run's epilogue
        assert_eq!(decode_chunks(&[0xC1, 0x35])?, vec![Pixel::START; 3]);

        Ok(())
    }

    #[test]
    fn test_diffs_wrap() -> Result<()> {
        assert_eq!(
            decode_chunks(&[0x4E, 0xA5, 0x5A])?,
            vec![Pixel::new(254, 1, 0, 255), Pixel::new(0, 6, 7, 255)]
        );

        Ok(())
    }

    #[test]
    fn test_truncated_chunk_emits_nothing() {
        let mut pixels = Vec::new();
        let err = ChunkDecoder::new(&[0x00, 0xFF, 1, 2])
            .decode(&mut pixels)
            .unwrap_err();

        assert!(matches!(
            err,
            QoiError::Truncated {
                offset: 1,
                needed: 5,
                remaining: 3
            }
        ));
        assert_eq!(pixels, vec![Pixel::ZERO]);

        let mut pixels = Vec::new();
        let err = ChunkDecoder::new(&[0x6A, 0x80])
            .decode(&mut pixels)
            .unwrap_err();

        assert!(matches!(err, QoiError::Truncated { offset: 1, .. }));
        assert_eq!(pixels, vec![Pixel::START]);
    }

    #[test]
    fn test_decode_file() -> Result<()> {
        let data = qoi_file(2, 1, 4, &[0xFF, 10, 20, 30, 255, 0x00]);
        let qoi = QoiDecoder::new(&data).decode()?;

        assert_eq!(
            *qoi.header(),
            QoiHeader {
                width: 2,
                height: 1,
                color_type: ColorType::RGBA,
                color_space: ColorSpace::Srgb,
            }
        );
        assert_eq!(qoi.rgba8().as_ref(), &[10, 20, 30, 255, 0, 0, 0, 0]);
        assert_eq!(qoi.rgb8().as_ref(), &[10, 20, 30, 0, 0, 0]);

        Ok(())
    }

    #[test]
    fn test_empty_image() -> Result<()> {
        let data = qoi_file(0, 0, 3, &[]);
        let qoi = QoiDecoder::new(&data).decode()?;

        assert!(qoi.pixels().is_empty());

        Ok(())
    }

    #[test]
    fn test_rejects_bad_container() {
        let mut data = qoi_file(1, 1, 4, &[0xC0]);
        data[0] = b'p';
        assert!(QoiDecoder::new(&data).decode().is_err());

        let data = qoi_file(1, 1, 2, &[0xC0]);
        assert!(QoiDecoder::new(&data).decode().is_err());

        let mut data = qoi_file(1, 1, 4, &[0xC0]);
        data[13] = 2;
        assert!(QoiDecoder::new(&data).decode().is_err());

        let mut data = qoi_file(1, 1, 4, &[0xC0]);
        data.pop();
        assert!(QoiDecoder::new(&data).decode().is_err());

        assert!(QoiDecoder::new(b"qoif").decode().is_err());
        assert!(QoiDecoder::new(&[]).decode().is_err());
    }

    #[test]
    fn test_rejects_pixel_count_mismatch() {
        let data = qoi_file(3, 1, 4, &[0xFF, 10, 20, 30, 255, 0x00]);
        assert!(QoiDecoder::new(&data).decode().is_err());

        let data = qoi_file(1, 1, 4, &[0xFF, 10, 20, 30, 255, 0x00]);
        assert!(QoiDecoder::new(&data).decode().is_err());
    }

    #[test]
    fn test_truncated_file_surfaces_chunk_error() {
        let data = qoi_file(1, 1, 4, &[0xFF, 10, 20]);
        let err = QoiDecoder::new(&data).decode().unwrap_err();

        assert!(matches!(
            err.downcast_ref::<QoiError>(),
            Some(QoiError::Truncated { .. })
        ));
    }

    fn test_pattern_rgba(width: u32, height: u32) -> RgbaImage {
        RgbaImage::from_fn(width, height, |x, y| match y % 4 {
            // runs
            0 => Rgba([200, 10, 10, 255]),
            // small steps for diff and luma chunks
            1 => Rgba([(x * 3) as u8, (x * 5 + y) as u8, 100, 255]),
            // alternating colors for index chunks
            2 => Rgba([(x % 3 * 80) as u8, 50, 50, 255]),
            // large jumps and varying alpha for literals
            _ => Rgba([
                (x * 37) as u8,
                (x * 91 + y) as u8,
                (y * 53) as u8,
                (128 + x * 7) as u8,
            ]),
        })
    }

    #[test]
    fn test_matches_reference_encoder_rgba() -> Result<()> {
        let reference = test_pattern_rgba(37, 23);

        let mut encoded = Vec::new();
        DynamicImage::ImageRgba8(reference.clone())
            .write_to(&mut Cursor::new(&mut encoded), ImageFormat::Qoi)?;

        let qoi = QoiDecoder::new(&encoded).decode()?;

        assert_eq!(qoi.dimensions(), (37, 23));
        assert_eq!(qoi.color_type(), ColorType::RGBA);
        assert_eq!(qoi.rgba8().as_ref(), reference.as_raw().as_slice());

        Ok(())
    }

    #[test]
    fn test_matches_reference_encoder_rgb() -> Result<()> {
        let pattern = test_pattern_rgba(64, 17);
        let reference = RgbImage::from_fn(64, 17, |x, y| {
            let Rgba([r, g, b, _]) = *pattern.get_pixel(x, y);
            Rgb([r, g, b])
        });

        let mut encoded = Vec::new();
        DynamicImage::ImageRgb8(reference.clone())
            .write_to(&mut Cursor::new(&mut encoded), ImageFormat::Qoi)?;

        let qoi = QoiDecoder::new(&encoded).decode()?;

        assert_eq!(qoi.color_type(), ColorType::RGB);
        assert_eq!(qoi.rgb8().as_ref(), reference.as_raw().as_slice());
        assert!(qoi.pixels().iter().all(|p| p.a == 255));

        Ok(())
    }
}
