use anyhow::{anyhow, Result};
use qoippm::{image::grammar::ImageExt, netpbm::PpmEncoder, qoi::QoiDecoder};
#[cfg(feature = "time")]
use qoippm::util::event_log::{log_event, Event};
use std::{fs::File, io::BufWriter};
#[cfg(feature = "time")]
use std::time::Instant;

const DEFAULT_OUTPUT_PATH: &str = "output.ppm";

fn main() -> Result<()> {
    env_logger::init();

    let mut args = std::env::args().skip(1);
    let image_path = args
        .next()
        .ok_or_else(|| anyhow!("Usage: qoippm <input.qoi> [output.ppm]"))?;
    let output_path = args
        .next()
        .unwrap_or_else(|| DEFAULT_OUTPUT_PATH.to_string());

    let content = std::fs::read(&image_path)
        .map_err(|err| anyhow!("Failed to read {}: {}", image_path, err))?;

    #[cfg(feature = "time")]
    let a = Instant::now();
    let qoi = QoiDecoder::new(&content).decode()?;

    println!("{}", qoi.header());

    #[cfg(feature = "time")]
    let b = Instant::now();

    let file = File::create(&output_path)
        .map_err(|err| anyhow!("Failed to create {}: {}", output_path, err))?;
    let mut encoder = PpmEncoder::new(BufWriter::new(file));
    encoder.encode(&qoi)?;

    #[cfg(feature = "time")]
    log_event(&output_path, Event::EncodePpm, Some(b.elapsed()));

    let (width, height) = qoi.dimensions();
    log::info!("Wrote {}x{} image to {}.", width, height, output_path);

    #[cfg(feature = "time")]
    log_event("", Event::TotalElapsed, Some(a.elapsed()));

    Ok(())
}
