use std::path::{Path, PathBuf};

use image::ImageFormat;
use thiserror::Error;

use crate::error::ViewerError;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("HTTP {status} from {url}")]
    HttpStatus { status: u16, url: String },
    #[error("empty asset reference")]
    EmptyReference,
}

/// Where an asset reference points.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssetSource {
    Url(String),
    File(PathBuf),
}

impl AssetSource {
    pub fn parse(reference: &str) -> Result<Self, FetchError> {
        let reference = reference.trim();
        if reference.is_empty() {
            return Err(FetchError::EmptyReference);
        }
        let lower = reference.to_ascii_lowercase();
        if lower.starts_with("http://") || lower.starts_with("https://") {
            Ok(Self::Url(reference.to_string()))
        } else {
            Ok(Self::File(PathBuf::from(reference)))
        }
    }
}

pub async fn load_from_file(path: &Path) -> Result<Vec<u8>, ViewerError> {
    tokio::fs::read(path).await.map_err(|e| {
        ViewerError::new("asset-read")
            .with_arg("path", path.display())
            .push_std(e)
    })
}

pub async fn download(url: &str) -> Result<Vec<u8>, ViewerError> {
    let response = reqwest::get(url)
        .await
        .map_err(|e| ViewerError::new("asset-download").with_arg("url", url).push_std(e))?;

    let status = response.status();
    if !status.is_success() {
        return Err(FetchError::HttpStatus {
            status: status.as_u16(),
            url: url.to_string(),
        }
        .into());
    }

    let bytes = response.bytes().await?;
    Ok(bytes.to_vec())
}

pub async fn fetch(reference: &str) -> Result<Vec<u8>, ViewerError> {
    match AssetSource::parse(reference)? {
        AssetSource::Url(url) => download(&url).await,
        AssetSource::File(path) => load_from_file(&path).await,
    }
}

/// 8-bit RGBA pixels, rows top to bottom.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedTexture {
    pub rgba: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

pub fn decode_rgba8(data: &[u8]) -> Result<DecodedTexture, ViewerError> {
    let img = image::load_from_memory(data)?;
    let rgba = img.to_rgba8();
    let (width, height) = rgba.dimensions();
    Ok(DecodedTexture {
        rgba: rgba.into_raw(),
        width,
        height,
    })
}

/// Linear float RGBA from a Radiance HDR file.
#[derive(Debug, Clone, PartialEq)]
pub struct HdrImage {
    pub pixels: Vec<[f32; 4]>,
    pub width: u32,
    pub height: u32,
}

pub fn decode_hdr(data: &[u8]) -> Result<HdrImage, ViewerError> {
    let img = image::load_from_memory_with_format(data, ImageFormat::Hdr)?;
    let rgba = img.to_rgba32f();
    let (width, height) = rgba.dimensions();
    Ok(HdrImage {
        pixels: rgba.pixels().map(|p| p.0).collect(),
        width,
        height,
    })
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::io::Cursor;

    pub(crate) fn png_bytes(width: u32, height: u32, pixel: [u8; 4]) -> Vec<u8> {
        let img = image::RgbaImage::from_pixel(width, height, image::Rgba(pixel));
        let mut out = Cursor::new(Vec::new());
        image::DynamicImage::ImageRgba8(img)
            .write_to(&mut out, ImageFormat::Png)
            .unwrap();
        out.into_inner()
    }

    pub(crate) fn temp_file(name: &str, bytes: &[u8]) -> PathBuf {
        let path = std::env::temp_dir().join(format!("glbvis-{}-{name}", std::process::id()));
        std::fs::write(&path, bytes).unwrap();
        path
    }

    #[test]
    fn urls_and_paths_are_told_apart() {
        assert_eq!(
            AssetSource::parse("HTTPS://cdn.example.com/a.glb").unwrap(),
            AssetSource::Url("HTTPS://cdn.example.com/a.glb".into())
        );
        assert_eq!(
            AssetSource::parse(" assets/mesh.glb ").unwrap(),
            AssetSource::File(PathBuf::from("assets/mesh.glb"))
        );
        assert!(matches!(
            AssetSource::parse("   "),
            Err(FetchError::EmptyReference)
        ));
    }

    #[test]
    fn decodes_png_to_rgba() {
        let tex = decode_rgba8(&png_bytes(3, 2, [10, 20, 30, 255])).unwrap();
        assert_eq!((tex.width, tex.height), (3, 2));
        assert_eq!(tex.rgba.len(), 3 * 2 * 4);
        assert_eq!(&tex.rgba[..4], &[10, 20, 30, 255]);
    }

    #[test]
    fn decodes_radiance_hdr() {
        let img = image::Rgb32FImage::from_pixel(4, 2, image::Rgb([2.0, 1.0, 0.5]));
        let mut out = Cursor::new(Vec::new());
        image::DynamicImage::ImageRgb32F(img)
            .write_to(&mut out, ImageFormat::Hdr)
            .unwrap();

        let hdr = decode_hdr(out.get_ref()).unwrap();
        assert_eq!((hdr.width, hdr.height), (4, 2));
        assert_eq!(hdr.pixels.len(), 8);
        assert_relative_eq!(hdr.pixels[0][0], 2.0, epsilon = 0.05);
        assert_relative_eq!(hdr.pixels[0][2], 0.5, epsilon = 0.05);
        assert_eq!(hdr.pixels[0][3], 1.0);
    }

    #[test]
    fn corrupt_image_is_an_error() {
        let err = decode_rgba8(b"not an image").unwrap_err();
        assert_eq!(err.key, "image::ImageError");
    }

    #[tokio::test]
    async fn fetch_reads_local_files() {
        let path = temp_file("fetch.bin", b"abc");
        let bytes = fetch(&path.to_string_lossy()).await.unwrap();
        assert_eq!(bytes, b"abc");
        let _ = std::fs::remove_file(path);
    }

    #[tokio::test]
    async fn missing_file_names_its_path() {
        let err = fetch("definitely/missing/file.webp").await.unwrap_err();
        assert_eq!(err.key, "asset-read");
        assert!(err.to_string().contains("definitely"));
    }
}
