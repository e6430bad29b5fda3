//! Spreadsheet column catalogue and the rules for turning a raw sheet into assets
//!
//! Older files may lack the newer columns (location, cabinet, status, note); those
//! are filled with defaults on load. Files written by the earlier Chinese-language
//! tool use different headers, accepted here as aliases.

use crate::asset::{normalize_category, Asset, DeviceStatus};
use crate::constants::{DATE_FORMAT, DEFAULT_CABINET, DEFAULT_LOCATION, DEFAULT_NOTE};
use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime};
use std::collections::{HashMap, HashSet};
use std::fmt::{Display, Formatter};
use std::ops::RangeInclusive;
use tracing::{debug, warn};

/// Every column of the register, in saved-file order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Column {
    AssetId,
    Name,
    Model,
    Category,
    Serial,
    IpAddress,
    Location,
    Cabinet,
    Contract,
    Project,
    Owner,
    Price,
    PurchaseDate,
    IntakeDate,
    GoLiveDate,
    MaintenanceExpiry,
    VendorCode,
    VendorName,
    VendorContact,
    Status,
    Note,
}

impl Column {
    pub const ALL: [Column; 21] = [
        Column::AssetId,
        Column::Name,
        Column::Model,
        Column::Category,
        Column::Serial,
        Column::IpAddress,
        Column::Location,
        Column::Cabinet,
        Column::Contract,
        Column::Project,
        Column::Owner,
        Column::Price,
        Column::PurchaseDate,
        Column::IntakeDate,
        Column::GoLiveDate,
        Column::MaintenanceExpiry,
        Column::VendorCode,
        Column::VendorName,
        Column::VendorContact,
        Column::Status,
        Column::Note,
    ];

    pub fn header(self) -> &'static str {
        match self {
            Column::AssetId => "Asset ID",
            Column::Name => "Asset Name",
            Column::Model => "Model",
            Column::Category => "Category",
            Column::Serial => "Serial Number",
            Column::IpAddress => "IP Address",
            Column::Location => "Location",
            Column::Cabinet => "Cabinet Position",
            Column::Contract => "Purchase Contract",
            Column::Project => "Project",
            Column::Owner => "Owner",
            Column::Price => "Price",
            Column::PurchaseDate => "Purchase Date",
            Column::IntakeDate => "Intake Date",
            Column::GoLiveDate => "Go-Live Date",
            Column::MaintenanceExpiry => "Maintenance Expiry",
            Column::VendorCode => "Vendor Code",
            Column::VendorName => "Vendor Name",
            Column::VendorContact => "Vendor Contact",
            Column::Status => "Status",
            Column::Note => "Note",
        }
    }

    fn legacy_header(self) -> &'static str {
        match self {
            Column::AssetId => "资产编号",
            Column::Name => "资产名称",
            Column::Model => "设备型号",
            Column::Category => "设备分类",
            Column::Serial => "设备序列号",
            Column::IpAddress => "IP地址",
            Column::Location => "使用地点",
            Column::Cabinet => "机柜位置",
            Column::Contract => "采购合同号",
            Column::Project => "项目名称",
            Column::Owner => "负责人",
            Column::Price => "资产价格",
            Column::PurchaseDate => "采购日期",
            Column::IntakeDate => "入库日期",
            Column::GoLiveDate => "上线日期",
            Column::MaintenanceExpiry => "维护有效期",
            Column::VendorCode => "供应商编码",
            Column::VendorName => "供应商名称",
            Column::VendorContact => "供应商负责人",
            Column::Status => "设备当前状态",
            Column::Note => "备注",
        }
    }

    /// Resolve a sheet header. Leading BOM and surrounding whitespace are ignored.
    pub fn from_header(header: &str) -> Option<Column> {
        let header = header.trim_start_matches('\u{feff}').trim();
        Self::ALL
            .into_iter()
            .find(|c| c.header().eq_ignore_ascii_case(header) || c.legacy_header() == header)
    }
}

impl Display for Column {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.header())
    }
}

/// Columns a file must have to be loaded at all
pub const REQUIRED: [Column; 4] = [Column::AssetId, Column::Name, Column::Model, Column::Serial];

/// Columns added after the first file format; filled with a default when absent
pub fn migration_default(column: Column) -> Option<&'static str> {
    match column {
        Column::Location => Some(DEFAULT_LOCATION),
        Column::Cabinet => Some(DEFAULT_CABINET),
        Column::Status => Some(DeviceStatus::NotInService.label()),
        Column::Note => Some(DEFAULT_NOTE),
        _ => None,
    }
}

/// A single spreadsheet cell as read from (or written to) a file
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Empty,
    Text(String),
    Number(f64),
    Date(NaiveDate),
}

impl Cell {
    /// Text rendering used for string columns. Integral numbers lose the `.0`
    /// so numeric asset ids read back from a workbook stay `1001`.
    pub fn to_text(&self) -> String {
        match self {
            Cell::Empty => String::new(),
            Cell::Text(s) => s.trim().to_string(),
            Cell::Number(n) if n.fract() == 0.0 && n.abs() < 1e15 => format!("{}", *n as i64),
            Cell::Number(n) => n.to_string(),
            Cell::Date(d) => d.format(DATE_FORMAT).to_string(),
        }
    }
}

/// Sheet contents before interpretation: a header row and data rows
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
}

/// Outcome of decoding a sheet
#[derive(Debug, Default)]
pub struct LoadReport {
    pub assets: Vec<Asset>,
    /// Migration columns absent from the file and filled with defaults
    pub filled_columns: Vec<Column>,
    /// Headers that matched no known column
    pub ignored_columns: Vec<String>,
    /// Ids seen more than once; only the first row was kept
    pub duplicate_ids: Vec<String>,
    pub skipped_blank_rows: usize,
    /// Cells that could not be interpreted and were left empty
    pub invalid_cells: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchemaError {
    MissingColumns(Vec<Column>),
}

impl Display for SchemaError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingColumns(cols) => {
                let names: Vec<&str> = cols.iter().map(|c| c.header()).collect();
                write!(f, "file is missing required columns: {}", names.join(", "))
            }
        }
    }
}

impl std::error::Error for SchemaError {}

/// Text forms pandas and spreadsheet tools use for "no value"
fn is_null_text(text: &str) -> bool {
    matches!(text, "" | "nan" | "NaN" | "NaT" | "None" | "null")
}

/// Excel serial date (days since 1899-12-30)
fn serial_to_date(serial: f64) -> Option<NaiveDate> {
    if !(1.0..=2_958_465.0).contains(&serial) {
        return None;
    }
    NaiveDate::from_ymd_opt(1899, 12, 30)?.checked_add_signed(Duration::days(serial.trunc() as i64))
}

/// Years a workbook date cell can hold
pub const WORKBOOK_YEARS: RangeInclusive<i32> = 1900..=9999;

fn in_workbook_range(date: NaiveDate) -> Result<NaiveDate, ()> {
    if WORKBOOK_YEARS.contains(&date.year()) {
        Ok(date)
    } else {
        Err(())
    }
}

/// Parse a date typed by a user or stored as text in a file
pub fn parse_date_text(text: &str) -> Result<Option<NaiveDate>, ()> {
    let text = text.trim();
    if is_null_text(text) {
        return Ok(None);
    }
    for fmt in ["%Y-%m-%d", "%Y/%m/%d", "%Y.%m.%d"] {
        if let Ok(d) = NaiveDate::parse_from_str(text, fmt) {
            return in_workbook_range(d).map(Some);
        }
    }
    for fmt in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y/%m/%d %H:%M:%S"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(text, fmt) {
            return in_workbook_range(dt.date()).map(Some);
        }
    }
    Err(())
}

fn cell_date(cell: &Cell) -> Result<Option<NaiveDate>, ()> {
    match cell {
        Cell::Empty => Ok(None),
        Cell::Date(d) => in_workbook_range(*d).map(Some),
        Cell::Number(n) => serial_to_date(*n).ok_or(()).and_then(in_workbook_range).map(Some),
        Cell::Text(s) => parse_date_text(s),
    }
}

/// Parse a price cell; thousands separators are tolerated
pub fn parse_price_text(text: &str) -> Result<Option<f64>, ()> {
    let text = text.trim();
    if is_null_text(text) {
        return Ok(None);
    }
    match text.replace(',', "").parse::<f64>() {
        Ok(n) if n.is_finite() => Ok(Some(n)),
        _ => Err(()),
    }
}

fn cell_price(cell: &Cell) -> Result<Option<f64>, ()> {
    match cell {
        Cell::Empty => Ok(None),
        Cell::Number(n) if n.is_nan() => Ok(None),
        Cell::Number(n) if n.is_finite() => Ok(Some(*n)),
        Cell::Number(_) => Err(()),
        Cell::Text(s) => parse_price_text(s),
        Cell::Date(_) => Err(()),
    }
}

/// Interpret a raw sheet, applying the required-column check and default fill
pub fn decode(table: &RawTable) -> Result<LoadReport, SchemaError> {
    let mut report = LoadReport::default();
    let mut positions: HashMap<Column, usize> = HashMap::new();

    for (i, header) in table.headers.iter().enumerate() {
        match Column::from_header(header) {
            Some(col) if !positions.contains_key(&col) => {
                positions.insert(col, i);
            }
            _ => {
                if !header.trim().is_empty() {
                    report.ignored_columns.push(header.trim().to_string());
                }
            }
        }
    }

    let missing: Vec<Column> = REQUIRED
        .into_iter()
        .filter(|c| !positions.contains_key(c))
        .collect();
    if !missing.is_empty() {
        return Err(SchemaError::MissingColumns(missing));
    }

    report.filled_columns = Column::ALL
        .into_iter()
        .filter(|c| migration_default(*c).is_some() && !positions.contains_key(c))
        .collect();
    if !report.filled_columns.is_empty() {
        debug!(columns = ?report.filled_columns, "Filling columns missing from older file");
    }

    let mut seen: HashSet<String> = HashSet::new();
    for (row_no, row) in table.rows.iter().enumerate() {
        let cell = |col: Column| -> &Cell {
            positions
                .get(&col)
                .and_then(|&i| row.get(i))
                .unwrap_or(&Cell::Empty)
        };
        let text = |col: Column| -> String {
            if !positions.contains_key(&col) {
                return migration_default(col).unwrap_or_default().to_string();
            }
            let value = cell(col).to_text();
            if is_null_text(&value) {
                String::new()
            } else {
                value
            }
        };

        let asset_id = text(Column::AssetId);
        if asset_id.is_empty() {
            report.skipped_blank_rows += 1;
            continue;
        }
        if !seen.insert(asset_id.clone()) {
            report.duplicate_ids.push(asset_id);
            continue;
        }

        // Header row is line 1 in the source file
        let line = row_no + 2;
        let mut date = |col: Column| -> Option<NaiveDate> {
            cell_date(cell(col)).unwrap_or_else(|_| {
                report
                    .invalid_cells
                    .push(format!("line {line}, {}: {:?}", col.header(), cell(col)));
                None
            })
        };
        let purchase_date = date(Column::PurchaseDate);
        let intake_date = date(Column::IntakeDate);
        let go_live_date = date(Column::GoLiveDate);
        let maintenance_expiry = date(Column::MaintenanceExpiry);

        let price = cell_price(cell(Column::Price)).unwrap_or_else(|_| {
            report
                .invalid_cells
                .push(format!("line {line}, {}: {:?}", Column::Price.header(), cell(Column::Price)));
            None
        });

        let status_text = text(Column::Status);
        let status = if status_text.is_empty() {
            DeviceStatus::default()
        } else {
            DeviceStatus::from_label(&status_text).unwrap_or_else(|| {
                report
                    .invalid_cells
                    .push(format!("line {line}, {}: {status_text:?}", Column::Status.header()));
                DeviceStatus::default()
            })
        };

        report.assets.push(Asset {
            asset_id,
            name: text(Column::Name),
            model: text(Column::Model),
            category: normalize_category(&text(Column::Category)),
            serial: text(Column::Serial),
            ip_address: text(Column::IpAddress),
            location: text(Column::Location),
            cabinet: text(Column::Cabinet),
            contract: text(Column::Contract),
            project: text(Column::Project),
            owner: text(Column::Owner),
            price,
            purchase_date,
            intake_date,
            go_live_date,
            maintenance_expiry,
            vendor_code: text(Column::VendorCode),
            vendor_name: text(Column::VendorName),
            vendor_contact: text(Column::VendorContact),
            status,
            note: text(Column::Note),
        });
    }

    for cell in &report.invalid_cells {
        warn!(cell = %cell, "Unreadable cell left empty");
    }
    if !report.duplicate_ids.is_empty() {
        warn!(ids = ?report.duplicate_ids, "Duplicate asset ids dropped");
    }
    if report.skipped_blank_rows > 0 {
        debug!(count = report.skipped_blank_rows, "Skipped rows without an asset id");
    }

    Ok(report)
}

fn text_cell(s: &str) -> Cell {
    if s.is_empty() {
        Cell::Empty
    } else {
        Cell::Text(s.to_string())
    }
}

fn date_cell(d: Option<NaiveDate>) -> Cell {
    d.map(Cell::Date).unwrap_or(Cell::Empty)
}

/// Lay assets out as a sheet with canonical headers
pub fn encode(assets: &[Asset]) -> RawTable {
    let headers = Column::ALL.iter().map(|c| c.header().to_string()).collect();
    let rows = assets
        .iter()
        .map(|a| {
            Column::ALL
                .iter()
                .map(|col| match col {
                    Column::AssetId => text_cell(&a.asset_id),
                    Column::Name => text_cell(&a.name),
                    Column::Model => text_cell(&a.model),
                    Column::Category => text_cell(&a.category),
                    Column::Serial => text_cell(&a.serial),
                    Column::IpAddress => text_cell(&a.ip_address),
                    Column::Location => text_cell(&a.location),
                    Column::Cabinet => text_cell(&a.cabinet),
                    Column::Contract => text_cell(&a.contract),
                    Column::Project => text_cell(&a.project),
                    Column::Owner => text_cell(&a.owner),
                    Column::Price => a.price.map(Cell::Number).unwrap_or(Cell::Empty),
                    Column::PurchaseDate => date_cell(a.purchase_date),
                    Column::IntakeDate => date_cell(a.intake_date),
                    Column::GoLiveDate => date_cell(a.go_live_date),
                    Column::MaintenanceExpiry => date_cell(a.maintenance_expiry),
                    Column::VendorCode => text_cell(&a.vendor_code),
                    Column::VendorName => text_cell(&a.vendor_name),
                    Column::VendorContact => text_cell(&a.vendor_contact),
                    Column::Status => Cell::Text(a.status.label().to_string()),
                    Column::Note => text_cell(&a.note),
                })
                .collect()
        })
        .collect();
    RawTable { headers, rows }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(s: &str) -> Cell {
        Cell::Text(s.to_string())
    }

    fn legacy_table() -> RawTable {
        RawTable {
            headers: vec![
                "\u{feff}资产编号".into(),
                "资产名称".into(),
                "设备型号".into(),
                "设备序列号".into(),
                "维护有效期".into(),
                "资产价格".into(),
                "设备分类".into(),
            ],
            rows: vec![
                vec![
                    Cell::Number(1001.0),
                    text("服务器1"),
                    text("DL380"),
                    text("SN123456"),
                    text("2024-01-24 00:00:00"),
                    Cell::Number(25000.0),
                    text("服务器"),
                ],
                vec![Cell::Empty, Cell::Empty, Cell::Empty, Cell::Empty],
                vec![
                    text("SW-1"),
                    text("交换机1"),
                    text("S5850"),
                    text("SN789012"),
                    text("nan"),
                    text("n/a"),
                    text("网络设备"),
                ],
            ],
        }
    }

    #[test]
    fn legacy_file_loads_with_migration_defaults() {
        let report = decode(&legacy_table()).unwrap();
        assert_eq!(report.assets.len(), 2);
        assert_eq!(report.skipped_blank_rows, 1);
        assert_eq!(
            report.filled_columns,
            vec![Column::Location, Column::Cabinet, Column::Status, Column::Note]
        );

        let first = &report.assets[0];
        assert_eq!(first.asset_id, "1001");
        assert_eq!(first.category, "Server");
        assert_eq!(first.location, DEFAULT_LOCATION);
        assert_eq!(first.note, DEFAULT_NOTE);
        assert_eq!(first.status, DeviceStatus::NotInService);
        assert_eq!(first.price, Some(25000.0));
        assert_eq!(first.maintenance_expiry, NaiveDate::from_ymd_opt(2024, 1, 24));

        let second = &report.assets[1];
        assert_eq!(second.maintenance_expiry, None);
        assert_eq!(second.price, None);
        assert_eq!(report.invalid_cells.len(), 1);
    }

    #[test]
    fn missing_required_columns_are_listed() {
        let table = RawTable {
            headers: vec!["Asset ID".into(), "Model".into()],
            rows: vec![],
        };
        match decode(&table) {
            Err(SchemaError::MissingColumns(cols)) => {
                assert_eq!(cols, vec![Column::Name, Column::Serial])
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn duplicate_ids_keep_first_row() {
        let table = RawTable {
            headers: vec![
                "Asset ID".into(),
                "Asset Name".into(),
                "Model".into(),
                "Serial Number".into(),
                "Status".into(),
                "Warranty Ref".into(),
            ],
            rows: vec![
                vec![text("A"), text("first"), text("m"), text("s"), text("In service")],
                vec![text("A"), text("second"), text("m"), text("s"), text("Retired")],
            ],
        };
        let report = decode(&table).unwrap();
        assert_eq!(report.assets.len(), 1);
        assert_eq!(report.assets[0].name, "first");
        assert_eq!(report.assets[0].status, DeviceStatus::InService);
        assert_eq!(report.duplicate_ids, vec!["A".to_string()]);
        assert_eq!(report.ignored_columns, vec!["Warranty Ref".to_string()]);
        assert!(!report.filled_columns.contains(&Column::Status));
    }

    #[test]
    fn unknown_status_falls_back_and_is_reported() {
        let table = RawTable {
            headers: vec![
                "Asset ID".into(),
                "Asset Name".into(),
                "Model".into(),
                "Serial Number".into(),
                "Status".into(),
            ],
            rows: vec![vec![text("A"), text("n"), text("m"), text("s"), text("lost")]],
        };
        let report = decode(&table).unwrap();
        assert_eq!(report.assets[0].status, DeviceStatus::NotInService);
        assert_eq!(report.invalid_cells.len(), 1);
    }

    #[test]
    fn date_text_formats() {
        let expected = NaiveDate::from_ymd_opt(2023, 2, 10);
        assert_eq!(parse_date_text("2023-02-10"), Ok(expected));
        assert_eq!(parse_date_text("2023/02/10"), Ok(expected));
        assert_eq!(parse_date_text("2023-02-10 00:00:00"), Ok(expected));
        assert_eq!(parse_date_text("NaT"), Ok(None));
        assert_eq!(parse_date_text("next year"), Err(()));
        assert_eq!(parse_date_text("1899-06-01"), Err(()));
        assert_eq!(parse_date_text("23/05/01"), Err(()));
        assert_eq!(cell_date(&Cell::Number(45000.0)), Ok(NaiveDate::from_ymd_opt(2023, 3, 15)));
        assert_eq!(cell_date(&Cell::Date(NaiveDate::from_ymd_opt(1850, 1, 1).unwrap())), Err(()));
    }

    #[test]
    fn dates_outside_workbook_years_load_empty() {
        let table = RawTable {
            headers: vec![
                "Asset ID".into(),
                "Asset Name".into(),
                "Model".into(),
                "Serial Number".into(),
                Column::PurchaseDate.header().into(),
                Column::MaintenanceExpiry.header().into(),
            ],
            rows: vec![vec![
                text("A"),
                text("n"),
                text("m"),
                text("s"),
                text("1899-06-01"),
                text("2026-01-31"),
            ]],
        };
        let report = decode(&table).unwrap();
        assert_eq!(report.assets.len(), 1);
        assert_eq!(report.assets[0].purchase_date, None);
        assert_eq!(report.assets[0].maintenance_expiry, NaiveDate::from_ymd_opt(2026, 1, 31));
        assert_eq!(report.invalid_cells.len(), 1);
        assert!(report.invalid_cells[0].contains(Column::PurchaseDate.header()));
    }

    #[test]
    fn price_must_be_finite() {
        assert_eq!(parse_price_text("1,299.50"), Ok(Some(1299.5)));
        assert_eq!(parse_price_text("inf"), Err(()));
        assert_eq!(parse_price_text("-Infinity"), Err(()));
        assert_eq!(cell_price(&Cell::Number(f64::INFINITY)), Err(()));
    }

    #[test]
    fn encode_uses_canonical_headers_and_typed_cells() {
        let asset = Asset {
            asset_id: "ASSET-1".into(),
            price: Some(18000.0),
            maintenance_expiry: NaiveDate::from_ymd_opt(2024, 2, 19),
            status: DeviceStatus::Retiring,
            ..Asset::with_defaults()
        };
        let table = encode(std::slice::from_ref(&asset));
        assert_eq!(table.headers.len(), Column::ALL.len());
        assert_eq!(table.headers[0], "Asset ID");

        let row = &table.rows[0];
        let at = |c: Column| &row[Column::ALL.iter().position(|x| *x == c).unwrap()];
        assert_eq!(at(Column::Price), &Cell::Number(18000.0));
        assert_eq!(at(Column::Status), &Cell::Text("Retiring".into()));
        assert_eq!(at(Column::Model), &Cell::Empty);

        let back = decode(&table).unwrap();
        assert_eq!(back.assets, vec![asset]);
    }
}
