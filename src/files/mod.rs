//! Reading and writing the register as CSV or spreadsheet workbooks

mod csv;
mod xlsx;

use crate::asset::{Asset, DeviceStatus};
use crate::schema::{self, LoadReport, RawTable, SchemaError};
use chrono::NaiveDate;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// On-disk format, picked from the file extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    Csv,
    Workbook,
}

impl FileFormat {
    pub fn from_path(path: &Path) -> Result<Self, FileError> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .unwrap_or_default();
        match ext.as_str() {
            "csv" => Ok(Self::Csv),
            "xlsx" | "xlsm" | "xls" => Ok(Self::Workbook),
            _ => Err(FileError::UnsupportedFormat(path.display().to_string())),
        }
    }
}

#[derive(Debug)]
pub enum FileError {
    UnsupportedFormat(String),
    Io(std::io::Error),
    Csv(::csv::Error),
    WorkbookRead(calamine::Error),
    WorkbookWrite(rust_xlsxwriter::XlsxError),
    NoSheet,
    Schema(SchemaError),
}

impl Display for FileError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnsupportedFormat(path) => write!(f, "unsupported file type: {path}"),
            Self::Io(err) => write!(f, "{err}"),
            Self::Csv(err) => write!(f, "CSV error: {err}"),
            Self::WorkbookRead(err) => write!(f, "workbook error: {err}"),
            Self::WorkbookWrite(err) => write!(f, "workbook error: {err}"),
            Self::NoSheet => write!(f, "workbook contains no worksheet"),
            Self::Schema(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for FileError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            Self::Csv(err) => Some(err),
            Self::WorkbookRead(err) => Some(err),
            Self::WorkbookWrite(err) => Some(err),
            Self::Schema(err) => Some(err),
            Self::UnsupportedFormat(_) | Self::NoSheet => None,
        }
    }
}

impl From<std::io::Error> for FileError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<::csv::Error> for FileError {
    fn from(value: ::csv::Error) -> Self {
        Self::Csv(value)
    }
}

impl From<calamine::Error> for FileError {
    fn from(value: calamine::Error) -> Self {
        Self::WorkbookRead(value)
    }
}

impl From<rust_xlsxwriter::XlsxError> for FileError {
    fn from(value: rust_xlsxwriter::XlsxError) -> Self {
        Self::WorkbookWrite(value)
    }
}

impl From<SchemaError> for FileError {
    fn from(value: SchemaError) -> Self {
        Self::Schema(value)
    }
}

pub fn read_table(path: &Path) -> Result<RawTable, FileError> {
    let table = match FileFormat::from_path(path)? {
        FileFormat::Csv => csv::read(path)?,
        FileFormat::Workbook => xlsx::read(path)?,
    };
    debug!(path = %path.display(), rows = table.rows.len(), "Sheet read");
    Ok(table)
}

/// Read a file and decode it into assets
pub fn read_assets(path: &Path) -> Result<LoadReport, FileError> {
    let table = read_table(path)?;
    Ok(schema::decode(&table)?)
}

/// Keep `.csv` and `.xlsx` targets; anything else gets `.xlsx` appended
pub fn output_path(path: &Path) -> PathBuf {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());
    match ext.as_deref() {
        Some("csv") | Some("xlsx") => path.to_path_buf(),
        _ => {
            let mut name = path.as_os_str().to_os_string();
            name.push(".xlsx");
            PathBuf::from(name)
        }
    }
}

/// Write assets to `path` (after [`output_path`] adjustment). Returns the path written.
pub fn write_assets(path: &Path, assets: &[Asset]) -> Result<PathBuf, FileError> {
    let path = output_path(path);
    let table = schema::encode(assets);
    match FileFormat::from_path(&path)? {
        FileFormat::Csv => csv::write(&path, &table)?,
        FileFormat::Workbook => xlsx::write(&path, &table)?,
    }
    info!(path = %path.display(), count = assets.len(), "Assets written");
    Ok(path)
}

/// Example rows shipped in a new template workbook
pub fn template_assets() -> Vec<Asset> {
    let date = |y, m, d| NaiveDate::from_ymd_opt(y, m, d);
    vec![
        Asset {
            asset_id: "ASSET-2023-001".into(),
            name: "Server 1".into(),
            model: "DL380".into(),
            category: "Server".into(),
            serial: "SN123456".into(),
            ip_address: "192.168.1.1".into(),
            location: "Data Center Zone A".into(),
            cabinet: "Cabinet A-01".into(),
            contract: "PO-2023-001".into(),
            project: "Project A".into(),
            owner: "Zhang San".into(),
            price: Some(25000.0),
            purchase_date: date(2023, 1, 15),
            intake_date: date(2023, 1, 20),
            go_live_date: date(2023, 1, 25),
            maintenance_expiry: date(2024, 1, 24),
            vendor_code: "SUP-001".into(),
            vendor_name: "Dell Technologies".into(),
            vendor_contact: "Li Si".into(),
            status: DeviceStatus::InService,
            note: "Repair/replacement info: none".into(),
        },
        Asset {
            asset_id: "ASSET-2023-002".into(),
            name: "Switch 1".into(),
            model: "S5850".into(),
            category: "Network Device".into(),
            serial: "SN789012".into(),
            ip_address: "192.168.1.2".into(),
            location: "Office Zone B".into(),
            cabinet: "Cabinet B-02".into(),
            contract: "PO-2023-002".into(),
            project: "Project B".into(),
            owner: "Wang Wu".into(),
            price: Some(18000.0),
            purchase_date: date(2023, 2, 10),
            intake_date: date(2023, 2, 15),
            go_live_date: date(2023, 2, 20),
            maintenance_expiry: date(2024, 2, 19),
            vendor_code: "SUP-002".into(),
            vendor_name: "Huawei".into(),
            vendor_contact: "Zhao Liu".into(),
            status: DeviceStatus::NotInService,
            note: "Repair/replacement info: mainboard replaced March 2023".into(),
        },
    ]
}

/// Write a template workbook with canonical headers and example rows
pub fn write_template(path: &Path) -> Result<PathBuf, FileError> {
    let mut path = output_path(path);
    if FileFormat::from_path(&path)? != FileFormat::Workbook {
        path.set_extension("xlsx");
    }
    write_assets(&path, &template_assets())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_from_extension() {
        assert_eq!(FileFormat::from_path(Path::new("a.CSV")).unwrap(), FileFormat::Csv);
        assert_eq!(FileFormat::from_path(Path::new("a.xls")).unwrap(), FileFormat::Workbook);
        assert!(matches!(
            FileFormat::from_path(Path::new("a.ods")),
            Err(FileError::UnsupportedFormat(_))
        ));
    }

    #[test]
    fn output_path_appends_xlsx() {
        assert_eq!(output_path(Path::new("assets")), PathBuf::from("assets.xlsx"));
        assert_eq!(output_path(Path::new("assets.xls")), PathBuf::from("assets.xls.xlsx"));
        assert_eq!(output_path(Path::new("assets.csv")), PathBuf::from("assets.csv"));
    }

    #[test]
    fn template_reloads_with_example_rows() {
        let dir = tempfile::tempdir().unwrap();
        let written = write_template(&dir.path().join("template.csv")).unwrap();
        assert_eq!(written.extension().unwrap(), "xlsx");

        let report = read_assets(&written).unwrap();
        assert!(report.filled_columns.is_empty());
        assert_eq!(report.assets, template_assets());
    }
}
