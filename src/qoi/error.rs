use thiserror::Error;

#[derive(Debug, Error)]
pub enum QoiError {
    #[error("Truncated stream: chunk at {offset} needs {needed} bytes, {remaining} remain.")]
    Truncated {
        offset: usize,
        needed: usize,
        remaining: usize,
    },
    #[error("Unclassifiable tag byte {tag:#04X} at {offset}.")]
    UnknownTag { tag: u8, offset: usize },
    #[error("Failed to emit pixel: {0}")]
    Sink(#[from] std::io::Error),
}
