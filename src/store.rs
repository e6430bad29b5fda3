//! In-memory asset register backed by one spreadsheet file
//!
//! Records keep file order. Asset ids are unique across the register; every
//! mutating operation checks that before touching the table.

use crate::asset::Asset;
use crate::files::{self, FileError};
use crate::schema::LoadReport;
use std::collections::HashSet;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

#[derive(Debug)]
pub enum StoreError {
    EmptyId,
    DuplicateId(String),
    /// Incoming rows collide with existing ids and overwrite was not confirmed
    DuplicateIds(Vec<String>),
    NotFound(String),
    NoCurrentFile,
    Empty,
    File(FileError),
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyId => write!(f, "asset id must not be empty"),
            Self::DuplicateId(id) => write!(f, "asset id {id} already exists"),
            Self::DuplicateIds(ids) => {
                write!(f, "{} asset ids already exist: {}", ids.len(), ids.join(", "))
            }
            Self::NotFound(id) => write!(f, "no asset with id {id}"),
            Self::NoCurrentFile => write!(f, "no file is open"),
            Self::Empty => write!(f, "there is no data to save"),
            Self::File(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for StoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::File(err) => Some(err),
            _ => None,
        }
    }
}

impl From<FileError> for StoreError {
    fn from(value: FileError) -> Self {
        Self::File(value)
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Rows read from an import file, checked against the register
#[derive(Debug)]
pub struct ImportPreview {
    pub report: LoadReport,
    /// Incoming ids that already exist in the register
    pub duplicates: Vec<String>,
}

#[derive(Debug, Default)]
pub struct AssetStore {
    assets: Vec<Asset>,
    current_file: Option<PathBuf>,
    dirty: bool,
}

impl AssetStore {
    pub fn assets(&self) -> &[Asset] {
        &self.assets
    }

    pub fn len(&self) -> usize {
        self.assets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assets.is_empty()
    }

    pub fn current_file(&self) -> Option<&Path> {
        self.current_file.as_deref()
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn find(&self, asset_id: &str) -> Option<&Asset> {
        self.assets.iter().find(|a| a.asset_id == asset_id)
    }

    fn position(&self, asset_id: &str) -> Option<usize> {
        self.assets.iter().position(|a| a.asset_id == asset_id)
    }

    /// Replace the register with the contents of `path`
    pub fn open(&mut self, path: &Path) -> StoreResult<LoadReport> {
        let mut report = files::read_assets(path)?;
        self.assets = std::mem::take(&mut report.assets);
        self.current_file = Some(path.to_path_buf());
        self.dirty = false;
        info!(path = %path.display(), count = self.assets.len(), "Register opened");
        Ok(report)
    }

    /// Read `path` without touching the register
    pub fn import_preview(&self, path: &Path) -> StoreResult<ImportPreview> {
        let report = files::read_assets(path)?;
        let duplicates = self.colliding_ids(&report.assets);
        debug!(path = %path.display(), incoming = report.assets.len(), duplicates = duplicates.len(), "Import previewed");
        Ok(ImportPreview { report, duplicates })
    }

    /// Ids in `incoming` that already exist in the register, in incoming order
    pub fn colliding_ids(&self, incoming: &[Asset]) -> Vec<String> {
        let existing: HashSet<&str> = self.assets.iter().map(|a| a.asset_id.as_str()).collect();
        incoming
            .iter()
            .filter(|a| existing.contains(a.asset_id.as_str()))
            .map(|a| a.asset_id.clone())
            .collect()
    }

    /// Append imported rows. Colliding ids are refused unless `overwrite`,
    /// in which case the existing records with those ids are dropped first.
    pub fn merge(&mut self, incoming: Vec<Asset>, overwrite: bool) -> StoreResult<usize> {
        let collisions = self.colliding_ids(&incoming);
        if !collisions.is_empty() {
            if !overwrite {
                return Err(StoreError::DuplicateIds(collisions));
            }
            let replaced: HashSet<String> = collisions.into_iter().collect();
            self.assets.retain(|a| !replaced.contains(&a.asset_id));
            debug!(count = replaced.len(), "Existing assets replaced by import");
        }
        let count = incoming.len();
        self.assets.extend(incoming);
        self.dirty = true;
        info!(count, total = self.assets.len(), "Assets imported");
        Ok(count)
    }

    pub fn add(&mut self, asset: Asset) -> StoreResult<()> {
        if asset.asset_id.trim().is_empty() {
            return Err(StoreError::EmptyId);
        }
        if self.find(&asset.asset_id).is_some() {
            return Err(StoreError::DuplicateId(asset.asset_id));
        }
        debug!(asset_id = %asset.asset_id, "Asset added");
        self.assets.push(asset);
        self.dirty = true;
        Ok(())
    }

    /// Replace the record `old_id` in place. The id may change as long as it
    /// stays non-empty and does not collide with another record.
    pub fn update(&mut self, old_id: &str, asset: Asset) -> StoreResult<()> {
        if asset.asset_id.trim().is_empty() {
            return Err(StoreError::EmptyId);
        }
        let idx = self
            .position(old_id)
            .ok_or_else(|| StoreError::NotFound(old_id.to_string()))?;
        if asset.asset_id != old_id && self.find(&asset.asset_id).is_some() {
            return Err(StoreError::DuplicateId(asset.asset_id));
        }
        debug!(old_id, new_id = %asset.asset_id, "Asset updated");
        self.assets[idx] = asset;
        self.dirty = true;
        Ok(())
    }

    pub fn delete(&mut self, asset_id: &str) -> StoreResult<Asset> {
        let idx = self
            .position(asset_id)
            .ok_or_else(|| StoreError::NotFound(asset_id.to_string()))?;
        self.dirty = true;
        debug!(asset_id, "Asset deleted");
        Ok(self.assets.remove(idx))
    }

    /// Write back to the current file
    pub fn save(&mut self) -> StoreResult<PathBuf> {
        let path = self.current_file.clone().ok_or(StoreError::NoCurrentFile)?;
        self.save_as(&path)
    }

    /// Write to `path` and make it the current file
    pub fn save_as(&mut self, path: &Path) -> StoreResult<PathBuf> {
        let written = self.export(path)?;
        self.current_file = Some(written.clone());
        self.dirty = false;
        Ok(written)
    }

    /// Write a copy to `path`; the current file is unchanged
    pub fn export(&self, path: &Path) -> StoreResult<PathBuf> {
        if self.assets.is_empty() {
            return Err(StoreError::Empty);
        }
        Ok(files::write_assets(path, &self.assets)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::asset::DeviceStatus;

    fn asset(id: &str, name: &str) -> Asset {
        Asset {
            asset_id: id.into(),
            name: name.into(),
            ..Asset::with_defaults()
        }
    }

    fn store_with(ids: &[&str]) -> AssetStore {
        let mut store = AssetStore::default();
        for id in ids {
            store.add(asset(id, "x")).unwrap();
        }
        store
    }

    #[test]
    fn add_rejects_empty_and_duplicate_ids() {
        let mut store = store_with(&["A"]);
        assert!(matches!(store.add(asset("  ", "blank")), Err(StoreError::EmptyId)));
        assert!(matches!(store.add(asset("A", "again")), Err(StoreError::DuplicateId(id)) if id == "A"));
        assert_eq!(store.len(), 1);
        assert!(store.is_dirty());
    }

    #[test]
    fn update_keeps_position_and_allows_same_id() {
        let mut store = store_with(&["A", "B", "C"]);
        let mut edited = store.find("B").unwrap().clone();
        edited.status = DeviceStatus::UnderRepair;
        store.update("B", edited).unwrap();
        assert_eq!(store.assets()[1].status, DeviceStatus::UnderRepair);

        store.update("B", asset("B2", "renamed")).unwrap();
        assert_eq!(store.assets()[1].asset_id, "B2");
        assert!(store.find("B").is_none());
    }

    #[test]
    fn update_rejects_collision_with_other_record() {
        let mut store = store_with(&["A", "B"]);
        assert!(matches!(store.update("B", asset("A", "clash")), Err(StoreError::DuplicateId(_))));
        assert!(matches!(store.update("Z", asset("Z", "gone")), Err(StoreError::NotFound(_))));
        assert_eq!(store.assets()[1].asset_id, "B");
    }

    #[test]
    fn delete_removes_record() {
        let mut store = store_with(&["A", "B"]);
        let removed = store.delete("A").unwrap();
        assert_eq!(removed.asset_id, "A");
        assert_eq!(store.len(), 1);
        assert!(matches!(store.delete("A"), Err(StoreError::NotFound(_))));
    }

    #[test]
    fn merge_requires_overwrite_for_collisions() {
        let mut store = store_with(&["A", "B"]);
        let incoming = vec![asset("B", "new B"), asset("C", "new C")];
        assert_eq!(store.colliding_ids(&incoming), vec!["B".to_string()]);

        match store.merge(incoming.clone(), false) {
            Err(StoreError::DuplicateIds(ids)) => assert_eq!(ids, vec!["B".to_string()]),
            other => panic!("unexpected: {other:?}"),
        }
        assert_eq!(store.len(), 2);

        assert_eq!(store.merge(incoming, true).unwrap(), 2);
        let ids: Vec<&str> = store.assets().iter().map(|a| a.asset_id.as_str()).collect();
        assert_eq!(ids, vec!["A", "B", "C"]);
        assert_eq!(store.find("B").unwrap().name, "new B");
    }

    #[test]
    fn import_preview_reports_collisions_without_mutating() {
        let dir = tempfile::tempdir().unwrap();
        let source = store_with(&["B", "C"]);
        let path = source.export(&dir.path().join("incoming.csv")).unwrap();

        let store = store_with(&["A", "B"]);
        let preview = store.import_preview(&path).unwrap();
        assert_eq!(preview.report.assets.len(), 2);
        assert_eq!(preview.duplicates, vec!["B".to_string()]);
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn save_requires_file_and_data() {
        let mut store = AssetStore::default();
        assert!(matches!(store.save(), Err(StoreError::NoCurrentFile)));

        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(store.save_as(&dir.path().join("x.xlsx")), Err(StoreError::Empty)));
    }

    #[test]
    fn save_as_then_open_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = store_with(&["A", "B"]);
        let written = store.save_as(&dir.path().join("register")).unwrap();
        assert_eq!(written, dir.path().join("register.xlsx"));
        assert_eq!(store.current_file(), Some(written.as_path()));
        assert!(!store.is_dirty());

        let exported = store.export(&dir.path().join("copy.csv")).unwrap();
        assert_eq!(store.current_file(), Some(written.as_path()));

        let mut reopened = AssetStore::default();
        reopened.open(&exported).unwrap();
        assert_eq!(reopened.assets(), store.assets());
        assert!(!reopened.is_dirty());
    }
}
