//! QR codes for asset ids: PNG generation and decoding from photos/scans
//!
//! Decoding tries progressively harder: open by extension, then by sniffed
//! content; binarize with Otsu's threshold; if no code is found, upscale 2x
//! and look again.

use image::imageops::FilterType;
use image::{GrayImage, Luma};
use qrcode::{EcLevel, QrCode};
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};
use tracing::debug;

const MODULE_PX: u32 = 10;
const QUIET_ZONE_MODULES: u32 = 4;

#[derive(Debug)]
pub enum QrError {
    EmptyInput,
    Encode(qrcode::types::QrError),
    Image(image::ImageError),
    Io(std::io::Error),
    Unreadable(String),
    NotFound,
    EmptyContent,
}

impl Display for QrError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyInput => write!(f, "enter an asset id first"),
            Self::Encode(err) => write!(f, "cannot encode QR code: {err}"),
            Self::Image(err) => write!(f, "{err}"),
            Self::Io(err) => write!(f, "{err}"),
            Self::Unreadable(reason) => write!(f, "image could not be read: {reason}"),
            Self::NotFound => write!(f, "no QR code detected, try a sharper image"),
            Self::EmptyContent => write!(f, "QR code is empty"),
        }
    }
}

impl std::error::Error for QrError {}

impl From<qrcode::types::QrError> for QrError {
    fn from(value: qrcode::types::QrError) -> Self {
        Self::Encode(value)
    }
}

impl From<image::ImageError> for QrError {
    fn from(value: image::ImageError) -> Self {
        Self::Image(value)
    }
}

impl From<std::io::Error> for QrError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

fn render_with(text: &str, module_px: u32, quiet_modules: u32) -> Result<GrayImage, QrError> {
    let code = QrCode::with_error_correction_level(text.as_bytes(), EcLevel::L)?;
    let width = code.width();
    let side = (width as u32 + 2 * quiet_modules) * module_px;
    let mut img = GrayImage::from_pixel(side, side, Luma([255]));

    for (i, color) in code.to_colors().into_iter().enumerate() {
        if color != qrcode::Color::Dark {
            continue;
        }
        let x0 = ((i % width) as u32 + quiet_modules) * module_px;
        let y0 = ((i / width) as u32 + quiet_modules) * module_px;
        for y in y0..y0 + module_px {
            for x in x0..x0 + module_px {
                img.put_pixel(x, y, Luma([0]));
            }
        }
    }
    Ok(img)
}

/// Black-on-white QR image, 10px modules with a 4-module quiet zone
pub fn render(text: &str) -> Result<GrayImage, QrError> {
    render_with(text, MODULE_PX, QUIET_ZONE_MODULES)
}

/// Save the QR code for `text` as PNG. `.png` is appended when missing.
pub fn encode_png(text: &str, path: &Path) -> Result<PathBuf, QrError> {
    let text = text.trim();
    if text.is_empty() {
        return Err(QrError::EmptyInput);
    }
    let is_png = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("png"));
    let path = if is_png {
        path.to_path_buf()
    } else {
        let mut name = path.as_os_str().to_os_string();
        name.push(".png");
        PathBuf::from(name)
    };
    render(text)?.save_with_format(&path, image::ImageFormat::Png)?;
    debug!(path = %path.display(), "QR code saved");
    Ok(path)
}

/// Otsu's method: the threshold maximizing between-class variance
pub fn otsu_level(img: &GrayImage) -> u8 {
    let mut hist = [0u64; 256];
    for p in img.pixels() {
        hist[p[0] as usize] += 1;
    }
    let total = img.width() as u64 * img.height() as u64;
    if total == 0 {
        return 0;
    }

    let sum_all: f64 = hist.iter().enumerate().map(|(i, &c)| i as f64 * c as f64).sum();
    let mut sum_bg = 0.0;
    let mut weight_bg = 0u64;
    let mut best = 0u8;
    let mut best_variance = -1.0;

    for (level, &count) in hist.iter().enumerate() {
        weight_bg += count;
        if weight_bg == 0 {
            continue;
        }
        let weight_fg = total - weight_bg;
        if weight_fg == 0 {
            break;
        }
        sum_bg += level as f64 * count as f64;
        let mean_bg = sum_bg / weight_bg as f64;
        let mean_fg = (sum_all - sum_bg) / weight_fg as f64;
        let variance = weight_bg as f64 * weight_fg as f64 * (mean_bg - mean_fg).powi(2);
        if variance > best_variance {
            best_variance = variance;
            best = level as u8;
        }
    }
    best
}

fn binarize(img: &GrayImage) -> GrayImage {
    let level = otsu_level(img);
    let mut out = img.clone();
    for p in out.pixels_mut() {
        p[0] = if p[0] > level { 255 } else { 0 };
    }
    out
}

fn detect(img: &GrayImage) -> Option<String> {
    let mut prepared = rqrr::PreparedImage::prepare_from_greyscale(
        img.width() as usize,
        img.height() as usize,
        |x, y| img.get_pixel(x as u32, y as u32)[0],
    );
    prepared
        .detect_grids()
        .into_iter()
        .find_map(|grid| grid.decode().ok().map(|(_, content)| content))
}

fn load_gray(path: &Path) -> Result<GrayImage, QrError> {
    match image::open(path) {
        Ok(img) => Ok(img.to_luma8()),
        Err(by_extension) => {
            debug!(path = %path.display(), error = %by_extension, "Retrying with sniffed format");
            let img = image::ImageReader::open(path)?
                .with_guessed_format()?
                .decode()
                .map_err(|by_content| QrError::Unreadable(format!("{by_extension}; {by_content}")))?;
            Ok(img.to_luma8())
        }
    }
}

/// Decode the first QR code in an already loaded image
pub fn decode_image(img: &GrayImage) -> Result<String, QrError> {
    decode_with(img, detect)
}

fn decode_with(img: &GrayImage, detect: impl Fn(&GrayImage) -> Option<String>) -> Result<String, QrError> {
    let binary = binarize(img);
    let found = detect(&binary).or_else(|| {
        debug!("No code at original size, retrying at 2x");
        let (w, h) = binary.dimensions();
        let upscaled = image::imageops::resize(&binary, w * 2, h * 2, FilterType::CatmullRom);
        detect(&upscaled)
    });
    let content = found.ok_or(QrError::NotFound)?;
    let content = content.trim();
    if content.is_empty() {
        return Err(QrError::EmptyContent);
    }
    Ok(content.to_string())
}

/// Read an image file and decode the first QR code in it
pub fn decode_file(path: &Path) -> Result<String, QrError> {
    let img = load_gray(path)?;
    decode_image(&img)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encoded_png_decodes_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = encode_png(" ASSET-2023-001 ", &dir.path().join("asset")).unwrap();
        assert_eq!(path.extension().unwrap(), "png");
        assert_eq!(decode_file(&path).unwrap(), "ASSET-2023-001");
    }

    #[test]
    fn misnamed_file_is_sniffed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scan.jpg");
        render("SW-014")
            .unwrap()
            .save_with_format(&path, image::ImageFormat::Png)
            .unwrap();
        assert_eq!(decode_file(&path).unwrap(), "SW-014");
    }

    #[test]
    fn non_image_is_unreadable() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.png");
        std::fs::write(&path, "not an image").unwrap();
        assert!(matches!(decode_file(&path), Err(QrError::Unreadable(_))));
    }

    #[test]
    fn blank_image_has_no_code() {
        let img = GrayImage::from_pixel(120, 120, Luma([255]));
        assert!(matches!(decode_image(&img), Err(QrError::NotFound)));
    }

    #[test]
    fn small_code_is_retried_at_double_size() {
        let img = render_with("LAP-7", 1, 4).unwrap();
        let side = img.width();
        let sizes = std::cell::RefCell::new(Vec::new());
        let only_at_double = |candidate: &GrayImage| {
            sizes.borrow_mut().push(candidate.width());
            (candidate.width() == side * 2).then(|| " LAP-7 ".to_string())
        };
        assert_eq!(decode_with(&img, only_at_double).unwrap(), "LAP-7");
        assert_eq!(*sizes.borrow(), vec![side, side * 2]);
    }

    #[test]
    fn retry_failure_is_not_found() {
        let img = render("SRV-3").unwrap();
        let calls = std::cell::Cell::new(0);
        let never = |_: &GrayImage| -> Option<String> {
            calls.set(calls.get() + 1);
            None
        };
        assert!(matches!(decode_with(&img, never), Err(QrError::NotFound)));
        assert_eq!(calls.get(), 2);
    }

    #[test]
    fn whitespace_payload_is_empty_content() {
        let img = render("   ").unwrap();
        assert!(matches!(decode_image(&img), Err(QrError::EmptyContent)));
    }

    #[test]
    fn empty_id_is_rejected_before_encoding() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(encode_png("  ", &dir.path().join("x.png")), Err(QrError::EmptyInput)));
    }

    #[test]
    fn otsu_splits_two_tones() {
        let mut img = GrayImage::from_pixel(10, 10, Luma([200]));
        for x in 0..10 {
            for y in 0..5 {
                img.put_pixel(x, y, Luma([40]));
            }
        }
        let level = otsu_level(&img);
        assert!((40..200).contains(&level));
    }
}
