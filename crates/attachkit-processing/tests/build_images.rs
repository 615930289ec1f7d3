//! End-to-end builds of real image payloads through the default prober and transcoder

use std::io::Cursor;
use std::sync::Arc;

use attachkit_core::{AttachConfig, AttachmentInput, AttachmentOptions, QuickPreview};
use attachkit_processing::{
    prepare_attachments_to_send, AttachmentBuilder, FfmpegMediaProber, ImageTransformer,
    InMemoryPayloadStore, PayloadStore,
};
use bytes::Bytes;
use image::{DynamicImage, GenericImageView, ImageFormat, Rgb, RgbImage};

fn encode_fixture(width: u32, height: u32, format: ImageFormat) -> Bytes {
    let img = RgbImage::from_fn(width, height, |x, y| {
        Rgb([(x % 256) as u8, (y % 256) as u8, ((x + y) % 256) as u8])
    });
    let mut buffer = Vec::new();
    DynamicImage::ImageRgb8(img)
        .write_to(&mut Cursor::new(&mut buffer), format)
        .unwrap();
    Bytes::from(buffer)
}

fn setup() -> (AttachmentBuilder, Arc<InMemoryPayloadStore>) {
    let config = Arc::new(AttachConfig::default());
    let prober = Arc::new(FfmpegMediaProber::from_config(&config).unwrap());
    let transcoder = Arc::new(ImageTransformer::new(config.jpeg_quality));
    let store = Arc::new(InMemoryPayloadStore::new());
    let builder = AttachmentBuilder::new(config, prober, transcoder, store.clone());
    (builder, store)
}

async fn decoded_dimensions(
    store: &InMemoryPayloadStore,
    handle: &attachkit_core::PayloadRef,
) -> (u32, u32) {
    let stored = store.resolve(handle).await.unwrap();
    image::load_from_memory(&stored.data).unwrap().dimensions()
}

#[tokio::test]
async fn test_large_png_gets_jpeg_compressed_copy() {
    let (builder, store) = setup();
    let input = AttachmentInput::new(
        "photo.png",
        "image/png",
        encode_fixture(3000, 1000, ImageFormat::Png),
    );

    let attachment = builder.build(input).await.unwrap();

    assert!(!attachment.should_send_as_file);
    assert_eq!(attachment.quick(), Some(&QuickPreview::image(3000, 1000)));
    assert_eq!(attachment.filename, "photo.jpg");

    let compressed = attachment.compressed_ref.as_ref().unwrap();
    let stored = store.resolve(compressed).await.unwrap();
    assert_eq!(stored.mime_type, "image/jpeg");
    assert_eq!(&stored.data[..2], &[0xFF, 0xD8]);
    assert_eq!(decoded_dimensions(&store, compressed).await, (1280, 427));

    let preview = attachment.preview_ref.as_ref().unwrap();
    assert_eq!(decoded_dimensions(&store, preview).await, (40, 13));
}

#[tokio::test]
async fn test_high_quality_jpeg_is_not_resized() {
    let (builder, store) = setup();
    let input = AttachmentInput::new(
        "holiday.jpeg",
        "image/jpeg",
        encode_fixture(1800, 1200, ImageFormat::Jpeg),
    )
    .with_options(AttachmentOptions::high_quality());

    let attachment = builder.build(input).await.unwrap();

    assert!(attachment.compressed_ref.is_none());
    assert_eq!(attachment.quick().map(|q| q.width), Some(1800));
    assert_eq!(attachment.filename, "holiday.jpg");
    // Original payload plus thumbnail.
    assert_eq!(store.len().await, 2);
}

#[tokio::test]
async fn test_send_compressed_then_release() {
    let (builder, store) = setup();
    let input = AttachmentInput::new(
        "shot.png",
        "image/png",
        encode_fixture(200, 100, ImageFormat::Png),
    );

    let attachment = builder.build(input).await.unwrap();
    let prepared = prepare_attachments_to_send(std::slice::from_ref(&attachment), true);

    let sent = store.resolve(&prepared[0].payload_ref).await.unwrap();
    assert_eq!(sent.mime_type, "image/jpeg");
    assert_eq!(
        image::load_from_memory(&sent.data).unwrap().dimensions(),
        (200, 100)
    );

    let released = store.release_attachment(&attachment).await;
    assert_eq!(released, 3);
    assert!(store.is_empty().await);
}

#[tokio::test]
async fn test_concurrent_builds_are_independent() {
    let (builder, store) = setup();
    let first =
        AttachmentInput::new("a.png", "image/png", encode_fixture(64, 64, ImageFormat::Png));
    let second =
        AttachmentInput::new("b.png", "image/png", encode_fixture(32, 96, ImageFormat::Png));

    let (a, b) = tokio::join!(builder.build(first), builder.build(second));
    let (a, b) = (a.unwrap(), b.unwrap());

    assert_ne!(a.unique_id, b.unique_id);
    assert_eq!(a.quick(), Some(&QuickPreview::image(64, 64)));
    assert_eq!(b.quick(), Some(&QuickPreview::image(32, 96)));
    assert!(store.len().await >= 4);
}

#[tokio::test]
async fn test_corrupt_image_fails_without_leaking() {
    let (builder, store) = setup();
    let input = AttachmentInput::new("broken.png", "image/png", Bytes::from_static(b"not a png"));

    assert!(builder.build(input).await.is_err());
    assert!(store.is_empty().await);
}
