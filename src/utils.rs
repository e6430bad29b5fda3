//! Utility functions

use crate::constants::{APP_NAME, DATE_FORMAT};
use chrono::NaiveDate;
use std::path::{Path, PathBuf};

// Square viewBox, for window/taskbar icons
pub const ICON_SVG: &str = r##"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 64 64"><rect x="6" y="4" width="52" height="56" rx="6" fill="#1e293b" stroke="#38bdf8" stroke-width="2"/><rect x="12" y="11" width="40" height="10" rx="2" fill="#38bdf8"/><rect x="12" y="27" width="40" height="10" rx="2" fill="#0ea5e9"/><rect x="12" y="43" width="40" height="10" rx="2" fill="#0369a1"/><circle cx="45" cy="16" r="2" fill="#f8fafc"/><circle cx="45" cy="32" r="2" fill="#f8fafc"/><circle cx="45" cy="48" r="2" fill="#fbbf24"/></svg>"##;

/// Rasterize the icon SVG to a square RGBA image
pub fn rasterize_icon(size: u32) -> Option<(Vec<u8>, u32, u32)> {
    let tree = resvg::usvg::Tree::from_str(ICON_SVG, &resvg::usvg::Options::default()).ok()?;
    let scale = size as f32 / tree.size().width();
    let mut pixmap = resvg::tiny_skia::Pixmap::new(size, size)?;
    resvg::render(
        &tree,
        resvg::usvg::Transform::from_scale(scale, scale),
        &mut pixmap.as_mut(),
    );
    Some((premul_to_straight(&pixmap), size, size))
}

fn premul_to_straight(pixmap: &resvg::tiny_skia::Pixmap) -> Vec<u8> {
    pixmap
        .pixels()
        .iter()
        .flat_map(|p| {
            let a = p.alpha();
            if a == 0 {
                [0, 0, 0, 0]
            } else {
                let r = (p.red() as u16 * 255 / a as u16) as u8;
                let g = (p.green() as u16 * 255 / a as u16) as u8;
                let b = (p.blue() as u16 * 255 / a as u16) as u8;
                [r, g, b, a]
            }
        })
        .collect()
}

/// App data directory (settings, logs)
pub fn get_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_NAME)
}

pub fn format_date(date: Option<NaiveDate>) -> String {
    date.map(|d| d.format(DATE_FORMAT).to_string())
        .unwrap_or_default()
}

/// Price without a trailing `.0` for whole amounts
pub fn format_price(price: Option<f64>) -> String {
    match price {
        Some(p) if p.fract() == 0.0 => format!("{}", p as i64),
        Some(p) => format!("{p:.2}"),
        None => String::new(),
    }
}

pub fn file_label(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string())
}

/// Join rows as tab-separated lines for the clipboard. Tabs and newlines
/// inside a cell become spaces so the grid survives pasting.
pub fn rows_to_tsv(rows: &[Vec<String>]) -> String {
    rows.iter()
        .map(|row| {
            row.iter()
                .map(|cell| cell.replace(['\t', '\r', '\n'], " "))
                .collect::<Vec<_>>()
                .join("\t")
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tsv_flattens_cell_whitespace() {
        let rows = vec![
            vec!["A-1".to_string(), "line one\nline two".to_string()],
            vec!["A-2".to_string(), "tab\there".to_string()],
        ];
        assert_eq!(rows_to_tsv(&rows), "A-1\tline one line two\nA-2\ttab here");
    }

    #[test]
    fn price_and_date_formatting() {
        assert_eq!(format_price(Some(25000.0)), "25000");
        assert_eq!(format_price(Some(99.5)), "99.50");
        assert_eq!(format_price(None), "");
        assert_eq!(format_date(NaiveDate::from_ymd_opt(2024, 1, 2)), "2024-01-02");
        assert_eq!(format_date(None), "");
    }

    #[test]
    fn icon_rasterizes() {
        let (pixels, w, h) = rasterize_icon(32).unwrap();
        assert_eq!((w, h), (32, 32));
        assert_eq!(pixels.len(), 32 * 32 * 4);
    }
}
