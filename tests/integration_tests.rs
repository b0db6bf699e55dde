// tests/integration_tests.rs
//
// Integration tests for the public API.
// These tests go from encoded bytes (or files) through ImageScale and the
// batch API to resized pixels.

use image::{DynamicImage, ImageFormat, Rgb, RgbImage, Rgba, RgbaImage};
use image_scale::engine::{resize_batch_with_budget, rgba, MemoryBudget, Orientation};
use image_scale::{
    inspect_header_from_bytes, inspect_header_from_path, resize, resize_batch, ImageKind,
    ImageScale, ResizeAlgorithm, ResizeOptions, ResizeRequest, ScaleError,
};
use std::io::{Cursor, Write};
use tempfile::NamedTempFile;

// Helper to create an encoded test image
fn create_test_image_bytes(width: u32, height: u32, format: ImageFormat) -> Vec<u8> {
    let img = RgbImage::from_fn(width, height, |x, y| {
        Rgb([(x % 256) as u8, (y % 256) as u8, 128])
    });
    let mut buf = Vec::new();
    DynamicImage::ImageRgb8(img)
        .write_to(&mut Cursor::new(&mut buf), format)
        .unwrap();
    buf
}

fn temp_file(bytes: &[u8]) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(bytes).unwrap();
    file.flush().unwrap();
    file
}

#[test]
fn test_every_format_and_algorithm() {
    for (format, kind) in [
        (ImageFormat::Png, ImageKind::Png),
        (ImageFormat::Jpeg, ImageKind::Jpeg),
        (ImageFormat::Gif, ImageKind::Gif),
        (ImageFormat::Bmp, ImageKind::Bmp),
    ] {
        let bytes = create_test_image_bytes(40, 30, format);
        let mut img = ImageScale::from_bytes(&bytes).unwrap();
        assert_eq!(img.format(), kind);
        for algorithm in [
            ResizeAlgorithm::Gd,
            ResizeAlgorithm::GdFixed,
            ResizeAlgorithm::Gm,
            ResizeAlgorithm::GmFixed,
        ] {
            let out = img
                .resize(&ResizeRequest::new(Some(20), None).algorithm(algorithm))
                .unwrap();
            assert_eq!((out.width, out.height), (20, 15), "{kind} {algorithm}");
        }
        assert_eq!(img.used(), 4);
    }
}

#[test]
fn test_open_from_path() {
    let file = temp_file(&create_test_image_bytes(16, 8, ImageFormat::Png));
    let path = file.path();
    let mut img = ImageScale::open(path).unwrap();
    assert_eq!((img.width(), img.height()), (16, 8));
    let out = img.resize_gm(Some(8), Some(4)).unwrap();
    assert_eq!((out.width, out.height), (8, 4));

    let meta = inspect_header_from_path(path).unwrap();
    assert_eq!((meta.width, meta.height, meta.format), (16, 8, ImageKind::Png));

    let limited = ImageScale::open_with_limit(path, 16);
    assert!(matches!(limited, Err(ScaleError::MemoryLimitExceeded { .. })));
}

#[test]
fn test_open_missing_file() {
    let err = ImageScale::open("/nonexistent/image.jpg").unwrap_err();
    assert!(matches!(err, ScaleError::FileNotFound { .. }));
    assert!(err.is_recoverable());
}

#[test]
fn test_inspect_matches_decode() {
    let bytes = create_test_image_bytes(33, 17, ImageFormat::Jpeg);
    let meta = inspect_header_from_bytes(&bytes).unwrap();
    let img = ImageScale::from_bytes(&bytes).unwrap();
    assert_eq!((meta.width, meta.height), (img.width(), img.height()));
    assert_eq!(meta.format, img.format());
}

#[test]
fn test_alpha_png_round_trip_through_rgba_image() {
    let src = RgbaImage::from_fn(8, 8, |x, _| Rgba([200, 100, 0, if x < 4 { 0 } else { 255 }]));
    let mut bytes = Vec::new();
    DynamicImage::ImageRgba8(src)
        .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
        .unwrap();

    let mut img = ImageScale::from_bytes(&bytes).unwrap();
    assert!(img.has_alpha());
    img.resize(
        &ResizeRequest::new(Some(4), Some(4)).algorithm(ResizeAlgorithm::GdFixed),
    )
    .unwrap();
    let out = img.to_rgba_image().unwrap();
    assert_eq!(out.get_pixel(0, 0)[3], 0);
    assert_eq!(out.get_pixel(3, 3)[3], 255);
    assert_eq!(out.get_pixel(3, 3)[0], 200);
}

#[test]
fn test_keep_aspect_through_image_scale() {
    let bytes = create_test_image_bytes(40, 20, ImageFormat::Png);
    let mut img = ImageScale::from_bytes(&bytes).unwrap();
    let bg = rgba(255, 255, 255, 255);
    let out = img
        .resize(
            &ResizeRequest::new(Some(20), Some(20))
                .keep_aspect(true)
                .background(bg),
        )
        .unwrap();
    assert_eq!((out.width, out.height), (20, 20));
    // 40x20 into 20x20: 10 rows of image, 5 rows of padding on each side
    assert!((0..20).all(|x| out.get(x, 0) == bg && out.get(x, 19) == bg));
    assert!((0..20).all(|x| out.get(x, 4) == bg && out.get(x, 15) == bg));
    assert!((0..20).any(|x| out.get(x, 10) != bg));
}

#[test]
fn test_orientation_in_options_matches_manual_rotation() {
    let bytes = create_test_image_bytes(6, 4, ImageFormat::Png);
    let img = ImageScale::from_bytes(&bytes).unwrap();
    let src = img.source();
    let rotated = resize(
        src,
        &ResizeOptions::new(6, 4).orientation(Orientation::Rotate270),
    )
    .unwrap();
    assert_eq!((rotated.width, rotated.height), (4, 6));
    // orientation 8 sends (x, y) to (y, W-1-x)
    for y in 0..4 {
        for x in 0..6 {
            assert_eq!(rotated.get(y, 5 - x), src.get(x, y));
        }
    }
}

#[test]
fn test_batch_over_decoded_source() {
    let bytes = create_test_image_bytes(64, 48, ImageFormat::Png);
    let img = ImageScale::from_bytes(&bytes).unwrap();
    let requests: Vec<ResizeOptions> = [(32, 24), (16, 12), (100, 75), (8, 8)]
        .into_iter()
        .map(|(w, h)| ResizeOptions::new(w, h).algorithm(ResizeAlgorithm::Gm))
        .collect();

    let results = resize_batch(img.source(), &requests);
    for (opts, result) in requests.iter().zip(results) {
        let out = result.unwrap();
        assert_eq!((out.width, out.height), (opts.width, opts.height));
    }

    // a budget too small for the largest request fails only that one
    let budget = MemoryBudget::with_limit(100 * 75 * 4 - 1);
    let results = resize_batch_with_budget(img.source(), &requests[2..3], &budget);
    assert!(matches!(
        results[0],
        Err(ScaleError::MemoryLimitExceeded { .. })
    ));
    assert_eq!(budget.used(), 0);
}
