#![no_main]

//! Fuzz target for the resamplers: arbitrary pixels, sizes, algorithms,
//! filters, padding and orientation.

use arbitrary::{Arbitrary, Unstructured};
use image_scale::engine::{MemoryBudget, Orientation, PixelBuffer};
use image_scale::{resize_with_budget, FilterKind, ResizeAlgorithm, ResizeOptions, ScaleError};
use libfuzzer_sys::fuzz_target;

#[derive(Arbitrary, Debug)]
struct ResizeSeed {
    src_w: u8,
    src_h: u8,
    dst_w: u16,
    dst_h: u16,
    algorithm: u8,
    filter: Option<u8>,
    keep_aspect: bool,
    has_alpha: bool,
    background: u32,
    orientation: u8,
}

const ALGORITHMS: [ResizeAlgorithm; 4] = [
    ResizeAlgorithm::Gd,
    ResizeAlgorithm::GdFixed,
    ResizeAlgorithm::Gm,
    ResizeAlgorithm::GmFixed,
];

fuzz_target!(|data: &[u8]| {
    let mut u = Unstructured::new(data);
    let Ok(seed) = ResizeSeed::arbitrary(&mut u) else {
        return;
    };

    let width = seed.src_w as u32 % 64 + 1;
    let height = seed.src_h as u32 % 64 + 1;
    let pixels: Vec<u32> = (0..width * height)
        .map(|_| u.arbitrary::<u32>().unwrap_or(0))
        .collect();
    let Ok(src) = PixelBuffer::new(width, height, pixels, seed.has_alpha) else {
        return;
    };

    let mut opts = ResizeOptions::new(seed.dst_w as u32 % 512, seed.dst_h as u32 % 512)
        .algorithm(ALGORITHMS[seed.algorithm as usize % ALGORITHMS.len()])
        .keep_aspect(seed.keep_aspect)
        .background(seed.background)
        .orientation(Orientation::from_code(seed.orientation as u32 % 10));
    opts.filter = seed
        .filter
        .map(|f| FilterKind::ALL[f as usize % FilterKind::ALL.len()]);

    let budget = MemoryBudget::with_limit(8 * 1024 * 1024);
    match resize_with_budget(&src, &opts, &budget) {
        Ok(out) => {
            assert_eq!(
                out.pixels.len() as u64,
                out.width as u64 * out.height as u64
            );
            if !opts.orientation.swaps_dimensions() {
                assert_eq!((out.width, out.height), (opts.width, opts.height));
            }
        }
        Err(
            ScaleError::InvalidResizeDimensions { .. } | ScaleError::UnsupportedFixedFilter { .. },
        ) => {}
        Err(other) => panic!("unexpected error: {other}"),
    }
    assert_eq!(budget.used(), 0);
});
