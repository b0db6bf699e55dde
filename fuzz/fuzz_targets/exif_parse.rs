#![no_main]

//! Fuzz target for EXIF parsing paths in image-scale.
//! Exercises detect_exif_orientation() and the orientation mapping on arbitrary data.

use image_scale::engine::{detect_exif_orientation, Orientation};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Some(code) = detect_exif_orientation(data) {
        assert!((1..=8).contains(&code));
        assert!(Orientation::from_exif(code).is_some());
    }
});
