//! Image handling for PDF documents

use crate::{PdfError, Result};
use flate2::write::ZlibEncoder;
use image::{DynamicImage, ImageDecoder, ImageReader};
use lopdf::{Dictionary, Object, Stream};
use std::io::{Cursor, Write};

impl From<image::ImageError> for PdfError {
    fn from(err: image::ImageError) -> Self {
        PdfError::ImageError(err.to_string())
    }
}

/// Detected image format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    Jpeg,
    Png,
}

/// Detect image format from magic bytes
pub fn detect_format(data: &[u8]) -> Result<ImageFormat> {
    if data.len() < 8 {
        return Err(PdfError::ImageError("Image data too short".to_string()));
    }

    if data[0] == 0xFF && data[1] == 0xD8 && data[2] == 0xFF {
        return Ok(ImageFormat::Jpeg);
    }

    if data[0..8] == [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A] {
        return Ok(ImageFormat::Png);
    }

    Err(PdfError::ImageError("Unknown image format".to_string()))
}

/// Image pixel dimensions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageDimensions {
    pub width: u32,
    pub height: u32,
}

/// JPEG info including dimensions and color components
#[derive(Debug, Clone, Copy)]
struct JpegInfo {
    width: u32,
    height: u32,
    num_components: u8,
}

/// Get image dimensions from the file header without decoding pixels
pub fn get_dimensions(data: &[u8]) -> Result<ImageDimensions> {
    match detect_format(data)? {
        ImageFormat::Jpeg => {
            let info = get_jpeg_info(data)?;
            Ok(ImageDimensions {
                width: info.width,
                height: info.height,
            })
        }
        ImageFormat::Png => get_png_dimensions(data),
    }
}

/// Decode every pixel and return the image size
///
/// Catches truncated or corrupt files that [`get_dimensions`] accepts
/// because their header is intact.
pub fn decode_dimensions(data: &[u8]) -> Result<ImageDimensions> {
    let format = match detect_format(data)? {
        ImageFormat::Jpeg => image::ImageFormat::Jpeg,
        ImageFormat::Png => image::ImageFormat::Png,
    };
    let decoded = image::load_from_memory_with_format(data, format)?;
    Ok(ImageDimensions {
        width: decoded.width(),
        height: decoded.height(),
    })
}

/// Scan JPEG segments for the first SOF marker
///
/// SOF layout: marker (2), length (2), precision (1), height (2), width (2),
/// component count (1).
fn get_jpeg_info(data: &[u8]) -> Result<JpegInfo> {
    let mut i = 2;
    while i + 9 < data.len() {
        if data[i] != 0xFF {
            i += 1;
            continue;
        }

        let marker = data[i + 1];

        // SOF0..SOF15 except DHT (C4), JPG (C8) and DAC (CC)
        if (0xC0..=0xCF).contains(&marker) && marker != 0xC4 && marker != 0xC8 && marker != 0xCC {
            let height = u16::from_be_bytes([data[i + 5], data[i + 6]]) as u32;
            let width = u16::from_be_bytes([data[i + 7], data[i + 8]]) as u32;
            return Ok(JpegInfo {
                width,
                height,
                num_components: data[i + 9],
            });
        }

        let length = u16::from_be_bytes([data[i + 2], data[i + 3]]) as usize;
        if length < 2 {
            break;
        }
        i += 2 + length;
    }

    Err(PdfError::ImageError("Could not parse JPEG info".to_string()))
}

/// Read width/height from the PNG IHDR chunk
fn get_png_dimensions(data: &[u8]) -> Result<ImageDimensions> {
    if data.len() < 24 {
        return Err(PdfError::ImageError("PNG data too short".to_string()));
    }

    if &data[12..16] != b"IHDR" {
        return Err(PdfError::ImageError(
            "Invalid PNG: IHDR not found".to_string(),
        ));
    }

    let width = u32::from_be_bytes([data[16], data[17], data[18], data[19]]);
    let height = u32::from_be_bytes([data[20], data[21], data[22], data[23]]);

    Ok(ImageDimensions { width, height })
}

fn deflate(raw: &[u8]) -> Result<Vec<u8>> {
    let mut encoder = ZlibEncoder::new(Vec::new(), flate2::Compression::default());
    encoder.write_all(raw)?;
    Ok(encoder.finish()?)
}

/// Image XObject for PDF embedding
#[derive(Debug, Clone)]
pub struct ImageXObject {
    /// Image width
    pub width: u32,
    /// Image height
    pub height: u32,
    /// Color space ("DeviceRGB", "DeviceGray")
    pub color_space: String,
    /// Bits per component
    pub bits_per_component: u8,
    /// PDF filter ("DCTDecode" for JPEG, "FlateDecode" for PNG)
    pub filter: String,
    /// Raw image data (compressed)
    pub data: Vec<u8>,
    /// Deflated 8-bit alpha channel, embedded as a soft mask
    pub alpha: Option<Vec<u8>>,
}

impl ImageXObject {
    /// Decode JPEG or PNG bytes into an XObject
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        match detect_format(data)? {
            ImageFormat::Jpeg => Self::from_jpeg(data),
            ImageFormat::Png => Self::from_png(data),
        }
    }

    /// Create XObject from JPEG data
    ///
    /// JPEG images are embedded unchanged with the DCTDecode filter.
    pub fn from_jpeg(data: &[u8]) -> Result<Self> {
        let info = get_jpeg_info(data)?;

        let color_space = if info.num_components == 1 {
            "DeviceGray"
        } else {
            "DeviceRGB"
        };

        Ok(Self {
            width: info.width,
            height: info.height,
            color_space: color_space.to_string(),
            bits_per_component: 8,
            filter: "DCTDecode".to_string(),
            data: data.to_vec(),
            alpha: None,
        })
    }

    /// Create XObject from PNG data
    ///
    /// Pixels are re-encoded with FlateDecode. An alpha channel becomes a
    /// separate soft mask so transparent signatures do not hide ruled lines.
    pub fn from_png(data: &[u8]) -> Result<Self> {
        let reader = ImageReader::new(Cursor::new(data)).with_guessed_format()?;
        let decoder = reader.into_decoder()?;

        let (width, height) = decoder.dimensions();
        let color_type = decoder.color_type();
        let image = DynamicImage::from_decoder(decoder)?;

        let (raw, color_space, alpha) = match color_type {
            image::ColorType::L8 | image::ColorType::L16 => {
                (image.to_luma8().into_raw(), "DeviceGray", None)
            }
            image::ColorType::La8 | image::ColorType::La16 => {
                let la = image.to_luma_alpha8();
                let gray: Vec<u8> = la.pixels().map(|p| p[0]).collect();
                let alpha: Vec<u8> = la.pixels().map(|p| p[1]).collect();
                (gray, "DeviceGray", Some(alpha))
            }
            image::ColorType::Rgba8 | image::ColorType::Rgba16 => {
                let rgba = image.to_rgba8();
                let mut rgb = Vec::with_capacity((width * height * 3) as usize);
                let mut alpha = Vec::with_capacity((width * height) as usize);
                for pixel in rgba.pixels() {
                    rgb.extend_from_slice(&pixel.0[..3]);
                    alpha.push(pixel[3]);
                }
                (rgb, "DeviceRGB", Some(alpha))
            }
            _ => (image.to_rgb8().into_raw(), "DeviceRGB", None),
        };

        // Fully opaque masks are dropped
        let alpha = alpha.filter(|a| a.iter().any(|&v| v != 0xFF));

        Ok(Self {
            width,
            height,
            color_space: color_space.to_string(),
            bits_per_component: 8,
            filter: "FlateDecode".to_string(),
            data: deflate(&raw)?,
            alpha: alpha.as_deref().map(deflate).transpose()?,
        })
    }

    /// Convert to lopdf Stream object
    ///
    /// `smask` is the object ID of the soft mask stream, if one was added.
    pub fn to_pdf_stream(&self, smask: Option<lopdf::ObjectId>) -> Stream {
        let mut dict = self.base_dictionary(&self.color_space);
        dict.set("Filter", Object::Name(self.filter.as_bytes().to_vec()));
        if let Some(id) = smask {
            dict.set("SMask", Object::Reference(id));
        }
        Stream::new(dict, self.data.clone())
    }

    /// Soft mask stream for the alpha channel
    pub fn to_smask_stream(&self) -> Option<Stream> {
        let alpha = self.alpha.as_ref()?;
        let mut dict = self.base_dictionary("DeviceGray");
        dict.set("Filter", Object::Name(b"FlateDecode".to_vec()));
        Some(Stream::new(dict, alpha.clone()))
    }

    fn base_dictionary(&self, color_space: &str) -> Dictionary {
        let mut dict = Dictionary::new();
        dict.set("Type", Object::Name(b"XObject".to_vec()));
        dict.set("Subtype", Object::Name(b"Image".to_vec()));
        dict.set("Width", self.width as i64);
        dict.set("Height", self.height as i64);
        dict.set("ColorSpace", Object::Name(color_space.as_bytes().to_vec()));
        dict.set("BitsPerComponent", self.bits_per_component as i64);
        dict
    }
}

/// Generate operators to draw image at position
///
/// # Arguments
/// * `image_name` - Image resource name (e.g., "Im1")
/// * `x` - X coordinate in points
/// * `y` - Y coordinate in points (from bottom, PDF coordinates)
/// * `width` - Image width in points
/// * `height` - Image height in points
pub fn generate_image_operators(
    image_name: &str,
    x: f64,
    y: f64,
    width: f64,
    height: f64,
) -> Vec<u8> {
    format!("q\n{width} 0 0 {height} {x} {y} cm\n/{image_name} Do\nQ\n").into_bytes()
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageBuffer, Luma, Rgba};

    fn encode_png(img: DynamicImage) -> Vec<u8> {
        let mut buffer = Vec::new();
        img.write_to(&mut Cursor::new(&mut buffer), image::ImageFormat::Png)
            .unwrap();
        buffer
    }

    #[test]
    fn test_detect_formats() {
        let jpeg_header = vec![0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10, 0x4A, 0x46];
        assert_eq!(detect_format(&jpeg_header).unwrap(), ImageFormat::Jpeg);

        let png_header = vec![0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];
        assert_eq!(detect_format(&png_header).unwrap(), ImageFormat::Png);

        assert!(detect_format(&[0u8; 8]).is_err());
        assert!(detect_format(&[0xFF, 0xD8]).is_err());
    }

    #[test]
    fn test_png_dimensions_from_header() {
        let mut png = vec![0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];
        png.extend_from_slice(&[0x00, 0x00, 0x00, 0x0D]);
        png.extend_from_slice(b"IHDR");
        png.extend_from_slice(&100u32.to_be_bytes());
        png.extend_from_slice(&50u32.to_be_bytes());

        let dims = get_dimensions(&png).unwrap();
        assert_eq!(dims, ImageDimensions { width: 100, height: 50 });
    }

    #[test]
    fn test_jpeg_dimensions_from_sof() {
        let jpeg = vec![
            0xFF, 0xD8, // SOI
            0xFF, 0xC0, // SOF0
            0x00, 0x11, // length
            0x08, // precision
            0x00, 0x20, // height 32
            0x00, 0x40, // width 64
            0x03, // components
            0x01, 0x22, 0x00, 0x02, 0x11, 0x01, 0x03, 0x11, 0x01, 0xFF, 0xD9,
        ];

        let dims = get_dimensions(&jpeg).unwrap();
        assert_eq!(dims, ImageDimensions { width: 64, height: 32 });

        let xobject = ImageXObject::from_jpeg(&jpeg).unwrap();
        assert_eq!(xobject.color_space, "DeviceRGB");
        assert!(xobject.alpha.is_none());
    }

    #[test]
    fn test_png_without_ihdr_is_rejected() {
        let mut png = vec![0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];
        png.extend_from_slice(&[0u8; 16]);
        assert!(get_dimensions(&png).is_err());
    }

    #[test]
    fn test_decode_dimensions_rejects_truncated_png() {
        let png = encode_png(DynamicImage::new_rgb8(64, 64));
        assert_eq!(
            decode_dimensions(&png).unwrap(),
            ImageDimensions { width: 64, height: 64 }
        );

        let truncated = &png[..40];
        assert!(get_dimensions(truncated).is_ok());
        assert!(decode_dimensions(truncated).is_err());
    }

    #[test]
    fn test_gray_png_has_no_mask() {
        let png = encode_png(DynamicImage::ImageLuma8(ImageBuffer::<Luma<u8>, Vec<u8>>::new(16, 8)));
        let xobject = ImageXObject::from_bytes(&png).unwrap();

        assert_eq!(xobject.width, 16);
        assert_eq!(xobject.height, 8);
        assert_eq!(xobject.color_space, "DeviceGray");
        assert!(xobject.to_smask_stream().is_none());
    }

    #[test]
    fn test_transparent_png_gets_soft_mask() {
        let png = encode_png(DynamicImage::ImageRgba8(ImageBuffer::from_pixel(
            4,
            4,
            Rgba([10u8, 20, 30, 0]),
        )));
        let xobject = ImageXObject::from_png(&png).unwrap();

        assert_eq!(xobject.color_space, "DeviceRGB");
        let smask = xobject.to_smask_stream().unwrap();
        assert_eq!(
            smask.dict.get(b"ColorSpace").unwrap(),
            &Object::Name(b"DeviceGray".to_vec())
        );

        let stream = xobject.to_pdf_stream(Some((7, 0)));
        assert_eq!(stream.dict.get(b"SMask").unwrap(), &Object::Reference((7, 0)));
    }

    #[test]
    fn test_opaque_png_drops_mask() {
        let png = encode_png(DynamicImage::ImageRgba8(ImageBuffer::from_pixel(
            4,
            4,
            Rgba([10u8, 20, 30, 255]),
        )));
        let xobject = ImageXObject::from_png(&png).unwrap();
        assert!(xobject.alpha.is_none());
        assert!(xobject.to_smask_stream().is_none());
    }

    #[test]
    fn test_partly_transparent_rgba_keeps_colour_and_alpha() {
        let mut img = image::RgbaImage::from_pixel(2, 1, Rgba([200u8, 100, 50, 255]));
        img.put_pixel(1, 0, Rgba([1, 2, 3, 0]));
        let xobject = ImageXObject::from_png(&encode_png(DynamicImage::ImageRgba8(img))).unwrap();

        let inflate = |bytes: &[u8]| {
            let mut out = Vec::new();
            std::io::Read::read_to_end(&mut flate2::read::ZlibDecoder::new(bytes), &mut out).unwrap();
            out
        };
        assert_eq!(inflate(&xobject.data), vec![200, 100, 50, 1, 2, 3]);
        assert_eq!(inflate(xobject.alpha.as_deref().unwrap()), vec![255, 0]);
    }

    #[test]
    fn test_gray_alpha_png_gets_soft_mask() {
        let img = image::GrayAlphaImage::from_pixel(3, 3, image::LumaA([90u8, 128]));
        let xobject = ImageXObject::from_png(&encode_png(DynamicImage::ImageLumaA8(img))).unwrap();
        assert_eq!(xobject.color_space, "DeviceGray");
        assert!(xobject.to_smask_stream().is_some());
    }

    #[test]
    fn test_generate_image_operators() {
        let ops = generate_image_operators("Im1", 100.0, 200.0, 50.0, 75.0);
        let ops_str = String::from_utf8(ops).unwrap();

        assert!(ops_str.starts_with("q\n"));
        assert!(ops_str.contains("50 0 0 75 100 200 cm"));
        assert!(ops_str.contains("/Im1 Do"));
        assert!(ops_str.ends_with("Q\n"));
    }
}
