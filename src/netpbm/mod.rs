pub use encoder::*;

mod encoder;
