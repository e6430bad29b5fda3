//! Filtering and sorting logic

use super::App;
use crate::asset::{Asset, DeviceStatus};
use crate::search;
use crate::types::*;
use std::cmp::Ordering;
use tracing::debug;

impl App {
    pub fn apply_filters(&mut self) {
        self.query.expiry = self.expiry_enabled.then_some(self.expiry_bucket);

        let assets = self.store.assets();
        let mut indices = search::filter(
            assets,
            &self.query,
            Self::today(),
            self.settings.expiry_window_days,
        );
        if let Some(col) = self.sort_column {
            sort_indices(assets, &mut indices, col, self.sort_direction);
        }
        self.filtered_indices = indices;

        // Rows may have been removed since they were selected
        let len = assets.len();
        self.selected_indices.retain(|&i| i < len);
        if self.last_selected.is_some_and(|i| i >= len) {
            self.last_selected = None;
        }

        if !self.query.is_empty() {
            debug!(matches = self.filtered_indices.len(), total = len, "Filters applied");
        }
    }

    /// Cycle a header: ascending, descending, then back to file order
    pub(crate) fn toggle_sort(&mut self, col: TableColumn) {
        if self.sort_column == Some(col) {
            match self.sort_direction {
                SortDirection::Ascending => self.sort_direction = SortDirection::Descending,
                SortDirection::Descending => self.sort_column = None,
            }
        } else {
            self.sort_column = Some(col);
            self.sort_direction = SortDirection::Ascending;
        }
        self.apply_filters();
    }
}

fn compare(a: &Asset, b: &Asset, col: TableColumn) -> Ordering {
    match col {
        // Records without a date sort after dated ones
        TableColumn::MaintenanceExpiry => match (a.maintenance_expiry, b.maintenance_expiry) {
            (Some(x), Some(y)) => x.cmp(&y),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        },
        TableColumn::Status => {
            let rank = |s: DeviceStatus| DeviceStatus::ALL.iter().position(|x| *x == s);
            rank(a.status).cmp(&rank(b.status))
        }
        _ => super::views::cell_text(a, col)
            .to_lowercase()
            .cmp(&super::views::cell_text(b, col).to_lowercase()),
    }
}

/// Stable sort of store indices by one column
pub(crate) fn sort_indices(assets: &[Asset], indices: &mut [usize], col: TableColumn, dir: SortDirection) {
    indices.sort_by(|&a, &b| {
        let ord = compare(&assets[a], &assets[b], col);
        match dir {
            SortDirection::Ascending => ord,
            SortDirection::Descending => ord.reverse(),
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn asset(id: &str, name: &str, expiry: Option<(i32, u32, u32)>) -> Asset {
        Asset {
            asset_id: id.into(),
            name: name.into(),
            maintenance_expiry: expiry.and_then(|(y, m, d)| NaiveDate::from_ymd_opt(y, m, d)),
            ..Default::default()
        }
    }

    #[test]
    fn text_sort_ignores_case_and_is_stable() {
        let assets = vec![
            asset("3", "beta", None),
            asset("1", "Alpha", None),
            asset("2", "beta", None),
        ];
        let mut idx = vec![0, 1, 2];
        sort_indices(&assets, &mut idx, TableColumn::Name, SortDirection::Ascending);
        assert_eq!(idx, vec![1, 0, 2]);

        sort_indices(&assets, &mut idx, TableColumn::AssetId, SortDirection::Descending);
        assert_eq!(idx, vec![0, 2, 1]);
    }

    #[test]
    fn undated_expiry_sorts_last() {
        let assets = vec![
            asset("A", "", None),
            asset("B", "", Some((2025, 6, 1))),
            asset("C", "", Some((2024, 1, 1))),
        ];
        let mut idx = vec![0, 1, 2];
        sort_indices(&assets, &mut idx, TableColumn::MaintenanceExpiry, SortDirection::Ascending);
        assert_eq!(idx, vec![2, 1, 0]);
    }
}
