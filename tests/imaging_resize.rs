use std::io::Cursor;

use image::{DynamicImage, RgbImage};
use pubdesk::imaging::{preview_data_url, resize_to_fit};
use pubdesk::upload::SelectedFile;

fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    let img = DynamicImage::ImageRgb8(RgbImage::new(width, height));
    let mut buf = Vec::new();
    img.write_to(&mut Cursor::new(&mut buf), image::ImageOutputFormat::Png)
        .unwrap();
    buf
}

#[test]
fn scales_down_within_bounds_preserving_aspect_ratio() {
    let original = png_bytes(4000, 2000);
    let resized = resize_to_fit(&original, 1200, 800, 80).unwrap();

    let out = image::load_from_memory(&resized).unwrap();
    assert!(out.width() <= 1200);
    assert!(out.height() <= 800);
    // 2:1 input stays 2:1.
    assert_eq!(out.width(), 1200);
    assert_eq!(out.height(), 600);
}

#[test]
fn portrait_images_are_bounded_by_height() {
    let original = png_bytes(1000, 3000);
    let resized = resize_to_fit(&original, 1200, 800, 80).unwrap();

    let out = image::load_from_memory(&resized).unwrap();
    assert_eq!(out.height(), 800);
    assert!(out.width() <= 1200);
}

#[test]
fn never_upscales_small_images() {
    let original = png_bytes(100, 50);
    let resized = resize_to_fit(&original, 1200, 800, 80).unwrap();

    let out = image::load_from_memory(&resized).unwrap();
    assert_eq!((out.width(), out.height()), (100, 50));
}

#[test]
fn output_is_jpeg() {
    let original = png_bytes(64, 64);
    let resized = resize_to_fit(&original, 32, 32, 80).unwrap();
    assert_eq!(
        image::guess_format(&resized).unwrap(),
        image::ImageFormat::Jpeg
    );
}

#[test]
fn undecodable_input_is_rejected() {
    assert!(resize_to_fit(&[0u8; 32], 100, 100, 80).is_err());
}

#[test]
fn preview_is_a_data_url_with_the_file_mime() {
    let file = SelectedFile::new("p.png", "image/png", vec![1, 2, 3]);
    let url = preview_data_url(&file);
    assert!(url.starts_with("data:image/png;base64,"));
}
