use afl::fuzz;
use qoippm::qoi::{ChunkDecoder, QoiDecoder};

fn main() {
    fuzz!(|data: &[u8]| {
        let _ = QoiDecoder::new(data).decode();

        let mut pixels = Vec::new();
        let _ = ChunkDecoder::new(data).decode(&mut pixels);
    });
}
