use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use rand::{rngs::StdRng, Rng, SeedableRng};

pub const FRAME_MIME: &str = "image/x-portable-graymap";

/// Upper bound on markers drawn into one frame.
pub const MAX_MARKERS: u32 = 256;

/// Renders a grayscale still with one bright marker per detected person (up
/// to `MAX_MARKERS`) and returns it as a base64 `data:` URL.
pub fn render_frame(width: u32, height: u32, detections: u32, seed: u64) -> String {
    let pgm = render_pgm(width, height, detections, seed);
    format!("data:{};base64,{}", FRAME_MIME, STANDARD.encode(pgm))
}

/// Binary PGM (`P5`) bytes: header followed by `width * height` pixels.
pub fn render_pgm(width: u32, height: u32, detections: u32, seed: u64) -> Vec<u8> {
    let width = width.max(1) as usize;
    let height = height.max(1) as usize;
    let header = format!("P5\n{} {}\n255\n", width, height);

    let mut pixels = vec![0u8; width * height];
    for (row, chunk) in pixels.chunks_mut(width).enumerate() {
        let shade = 40 + (row * 40 / height) as u8;
        chunk.fill(shade);
    }

    let mut rng = StdRng::seed_from_u64(seed);
    let marker = 2usize;
    for _ in 0..detections.min(MAX_MARKERS) {
        let cx = rng.gen_range(0..width);
        let cy = rng.gen_range(0..height);
        for y in cy.saturating_sub(marker)..(cy + marker + 1).min(height) {
            for x in cx.saturating_sub(marker)..(cx + marker + 1).min(width) {
                pixels[y * width + x] = 230;
            }
        }
    }

    let mut bytes = header.into_bytes();
    bytes.extend_from_slice(&pixels);
    bytes
}
