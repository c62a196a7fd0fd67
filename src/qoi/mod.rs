pub use cache::*;
pub use chunk::*;
pub use decoder::*;
pub use error::*;
pub mod grammar;

mod cache;
mod chunk;
mod decoder;
mod error;
