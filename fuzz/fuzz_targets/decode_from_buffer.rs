#![no_main]

use image_scale::engine::{decode_image, MemoryBudget};
use libfuzzer_sys::fuzz_target;

// keeps hostile headers from allocating gigabytes per run
const FUZZ_MEMORY_LIMIT: u64 = 64 * 1024 * 1024;

fuzz_target!(|data: &[u8]| {
    if data.is_empty() {
        return;
    }

    let budget = MemoryBudget::with_limit(FUZZ_MEMORY_LIMIT);
    if let Ok(decoded) = decode_image(data, &budget) {
        let pixels = &decoded.pixels;
        assert_eq!(
            pixels.pixels.len() as u64,
            pixels.width as u64 * pixels.height as u64
        );
        assert_eq!(budget.used(), decoded.charged_bytes);
    } else {
        assert_eq!(budget.used(), 0);
    }
});
