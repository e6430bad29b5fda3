//! Workbook backend: calamine for reading (xlsx/xlsm/xls), rust_xlsxwriter for writing xlsx

use super::FileError;
use crate::constants::DATE_FORMAT;
use crate::schema::{Cell, RawTable, WORKBOOK_YEARS};
use calamine::{open_workbook_auto, Data, Reader};
use chrono::Datelike;
use rust_xlsxwriter::{Color, ExcelDateTime, Format, FormatBorder, Workbook};
use std::path::Path;

fn to_cell(data: &Data) -> Cell {
    match data {
        Data::Empty | Data::Error(_) => Cell::Empty,
        Data::String(s) if s.trim().is_empty() => Cell::Empty,
        Data::String(s) => Cell::Text(s.clone()),
        Data::Int(i) => Cell::Number(*i as f64),
        Data::Float(f) => Cell::Number(*f),
        Data::Bool(b) => Cell::Text(b.to_string()),
        Data::DateTime(dt) => dt
            .as_datetime()
            .map(|d| Cell::Date(d.date()))
            .unwrap_or_else(|| Cell::Number(dt.as_f64())),
        Data::DateTimeIso(s) | Data::DurationIso(s) => Cell::Text(s.clone()),
    }
}

/// Read the first worksheet. The first non-empty row is the header.
pub(super) fn read(path: &Path) -> Result<RawTable, FileError> {
    let mut workbook = open_workbook_auto(path)?;
    let range = workbook.worksheet_range_at(0).ok_or(FileError::NoSheet)??;

    let mut rows = range.rows();
    let headers = rows
        .next()
        .map(|row| row.iter().map(|d| to_cell(d).to_text()).collect())
        .unwrap_or_default();
    let rows = rows.map(|row| row.iter().map(to_cell).collect()).collect();

    Ok(RawTable { headers, rows })
}

pub(super) fn write(path: &Path, table: &RawTable) -> Result<(), FileError> {
    let mut workbook = Workbook::new();
    let header_format = Format::new()
        .set_bold()
        .set_background_color(Color::RGB(0xDCE6F1))
        .set_border_bottom(FormatBorder::Thin);
    let date_format = Format::new().set_num_format("yyyy-mm-dd");

    let sheet = workbook.add_worksheet();
    sheet.set_name("Assets")?;

    for (col, header) in table.headers.iter().enumerate() {
        let col = col as u16;
        sheet.write_string_with_format(0, col, header, &header_format)?;
        let width = (header.chars().count() as f64 + 4.0).max(14.0);
        sheet.set_column_width(col, width)?;
    }

    for (r, row) in table.rows.iter().enumerate() {
        let r = r as u32 + 1;
        for (col, cell) in row.iter().enumerate() {
            let col = col as u16;
            match cell {
                Cell::Empty => {}
                Cell::Text(s) => {
                    sheet.write_string(r, col, s)?;
                }
                Cell::Number(n) => {
                    sheet.write_number(r, col, *n)?;
                }
                Cell::Date(d) if WORKBOOK_YEARS.contains(&d.year()) => {
                    let date = ExcelDateTime::from_ymd(d.year() as u16, d.month() as u8, d.day() as u8)?;
                    sheet.write_datetime_with_format(r, col, &date, &date_format)?;
                }
                // Excel has no serial for these; keep them as text
                Cell::Date(d) => {
                    sheet.write_string(r, col, d.format(DATE_FORMAT).to_string())?;
                }
            }
        }
    }

    sheet.set_freeze_panes(1, 0)?;
    workbook.save(path)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn numbers_and_dates_keep_their_type() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("typed.xlsx");
        let date = NaiveDate::from_ymd_opt(2025, 6, 30).unwrap();
        let table = RawTable {
            headers: vec!["Asset ID".into(), "Price".into(), "Maintenance Expiry".into()],
            rows: vec![
                vec![Cell::Text("A-1".into()), Cell::Number(1299.5), Cell::Date(date)],
                vec![Cell::Number(1002.0), Cell::Empty, Cell::Empty],
            ],
        };
        write(&path, &table).unwrap();

        let back = read(&path).unwrap();
        assert_eq!(back.headers, table.headers);
        assert_eq!(back.rows[0][0], Cell::Text("A-1".into()));
        assert_eq!(back.rows[0][1], Cell::Number(1299.5));
        assert_eq!(back.rows[0][2], Cell::Date(date));
        assert_eq!(back.rows[1][0].to_text(), "1002");
    }

    #[test]
    fn out_of_range_dates_are_written_as_text() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("old.xlsx");
        let table = RawTable {
            headers: vec!["Asset ID".into(), "Purchase Date".into()],
            rows: vec![vec![
                Cell::Text("A-1".into()),
                Cell::Date(NaiveDate::from_ymd_opt(1899, 6, 1).unwrap()),
            ]],
        };
        write(&path, &table).unwrap();

        let back = read(&path).unwrap();
        assert_eq!(back.rows[0][1], Cell::Text("1899-06-01".into()));
    }

    #[test]
    fn missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(read(&dir.path().join("absent.xlsx")).is_err());
    }
}
