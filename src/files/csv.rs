//! CSV backend. Files are written with a UTF-8 BOM so spreadsheet programs pick the right encoding.

use super::FileError;
use crate::schema::{Cell, RawTable};
use std::io::Write;
use std::path::Path;

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

pub(super) fn read(path: &Path) -> Result<RawTable, FileError> {
    let mut reader = ::csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(path)?;

    let headers = reader
        .headers()?
        .iter()
        .map(|h| h.trim_start_matches('\u{feff}').to_string())
        .collect();

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        rows.push(
            record
                .iter()
                .map(|field| {
                    if field.trim().is_empty() {
                        Cell::Empty
                    } else {
                        Cell::Text(field.to_string())
                    }
                })
                .collect(),
        );
    }

    Ok(RawTable { headers, rows })
}

pub(super) fn write(path: &Path, table: &RawTable) -> Result<(), FileError> {
    let mut file = std::fs::File::create(path)?;
    file.write_all(UTF8_BOM)?;

    let mut writer = ::csv::Writer::from_writer(file);
    writer.write_record(&table.headers)?;
    for row in &table.rows {
        writer.write_record(row.iter().map(Cell::to_text))?;
    }
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::asset::DeviceStatus;
    use crate::schema::{decode, Column};

    #[test]
    fn written_file_starts_with_bom_and_reloads() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("assets.csv");
        let table = RawTable {
            headers: vec!["Asset ID".into(), "Note".into()],
            rows: vec![vec![Cell::Text("A-1".into()), Cell::Text("fan, PSU swapped".into())]],
        };
        write(&path, &table).unwrap();

        let bytes = std::fs::read(&path).unwrap();
        assert!(bytes.starts_with(UTF8_BOM));

        let back = read(&path).unwrap();
        assert_eq!(back.headers, table.headers);
        assert_eq!(back.rows, table.rows);
    }

    #[test]
    fn legacy_csv_with_short_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("old.csv");
        std::fs::write(
            &path,
            "\u{feff}资产编号,资产名称,设备型号,设备序列号,设备当前状态\n\
             A-1,Core switch,S5850,SN1,维修中\n\
             A-2,Printer,M402,SN2\n",
        )
        .unwrap();

        let report = decode(&read(&path).unwrap()).unwrap();
        assert_eq!(report.assets.len(), 2);
        assert_eq!(report.assets[0].status, DeviceStatus::UnderRepair);
        assert_eq!(report.assets[1].status, DeviceStatus::NotInService);
        assert!(report.filled_columns.contains(&Column::Location));
        assert!(!report.filled_columns.contains(&Column::Status));
    }
}
