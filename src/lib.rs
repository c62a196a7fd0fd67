#![warn(clippy::nursery)]

pub mod image;
pub mod netpbm;
pub mod qoi;
pub mod util;
