use crate::qoi::grammar::Pixel;

/// Direct-mapped table of recently seen pixels. A pixel that hashes to an occupied slot
/// replaces whatever was there.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelCache {
    slots: [Pixel; PixelCache::NUM_SLOTS],
}

impl PixelCache {
    pub const NUM_SLOTS: usize = 64;

    pub const fn new() -> Self {
        Self {
            slots: [Pixel::ZERO; Self::NUM_SLOTS],
        }
    }

    pub const fn get(&self, index: u8) -> Pixel {
        self.slots[index as usize % Self::NUM_SLOTS]
    }

    pub fn insert(&mut self, pixel: Pixel) {
        self.slots[pixel.hash()] = pixel;
    }
}

impl Default for PixelCache {
    fn default() -> Self {
        Self::new()
    }
}
