use anyhow::{anyhow, Result};
use bytes::Bytes;
use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, GenericImageView, ImageFormat, Rgb, RgbImage};
use std::io::Cursor;

/// Output format for transcoded images
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Jpeg,
    Png,
    WebP,
}

impl OutputFormat {
    pub fn from_mime_type(mime_type: &str) -> Result<Self> {
        match attachkit_core::config::normalize_mime(mime_type).as_str() {
            "image/jpeg" | "image/jpg" => Ok(OutputFormat::Jpeg),
            "image/png" => Ok(OutputFormat::Png),
            "image/webp" => Ok(OutputFormat::WebP),
            _ => Err(anyhow!("Unsupported target encoding: {}", mime_type)),
        }
    }

    pub fn to_mime_type(self) -> &'static str {
        match self {
            OutputFormat::Jpeg => "image/jpeg",
            OutputFormat::Png => "image/png",
            OutputFormat::WebP => "image/webp",
        }
    }

    pub fn to_image_format(self) -> ImageFormat {
        match self {
            OutputFormat::Jpeg => ImageFormat::Jpeg,
            OutputFormat::Png => ImageFormat::Png,
            OutputFormat::WebP => ImageFormat::WebP,
        }
    }
}

/// Image encoder for transcoded copies
pub struct ImageCompressor;

impl ImageCompressor {
    /// Encode `img` in `format`. `jpeg_quality` is ignored for lossless formats.
    pub fn encode(img: &DynamicImage, format: OutputFormat, jpeg_quality: u8) -> Result<Bytes> {
        match format {
            OutputFormat::Jpeg => Self::compress_jpeg(img, jpeg_quality),
            OutputFormat::Png | OutputFormat::WebP => {
                let mut buffer = Vec::new();
                let mut cursor = Cursor::new(&mut buffer);
                img.write_to(&mut cursor, format.to_image_format())?;
                Ok(Bytes::from(buffer))
            }
        }
    }

    fn compress_jpeg(img: &DynamicImage, quality: u8) -> Result<Bytes> {
        let rgb_img = Self::flatten_onto_white(img);
        let (width, height) = rgb_img.dimensions();

        let mut buffer = Vec::with_capacity(width as usize * height as usize / 4);
        {
            let mut encoder = JpegEncoder::new_with_quality(&mut buffer, quality.clamp(1, 100));
            encoder.encode_image(&rgb_img)?;
        }

        Ok(Bytes::from(buffer))
    }

    /// JPEG has no alpha channel; composite transparent pixels over white.
    fn flatten_onto_white(img: &DynamicImage) -> RgbImage {
        if !img.color().has_alpha() {
            return img.to_rgb8();
        }

        let rgba = img.to_rgba8();
        let (width, height) = img.dimensions();
        RgbImage::from_fn(width, height, |x, y| {
            let [r, g, b, a] = rgba.get_pixel(x, y).0;
            let alpha = u32::from(a);
            let blend = |c: u8| ((u32::from(c) * alpha + 255 * (255 - alpha)) / 255) as u8;
            Rgb([blend(r), blend(g), blend(b)])
        })
    }
}
