//! Asset record and the closed set of device lifecycle states

use crate::constants::{DEFAULT_CABINET, DEFAULT_LOCATION, DEFAULT_NOTE};
use chrono::{Duration, NaiveDate};

/// Device categories offered by the editor and the search form.
/// Files may carry other values; they are kept as-is.
pub const CATEGORIES: [&str; 7] = [
    "Server",
    "Network Device",
    "Storage Device",
    "PC",
    "Laptop",
    "Printer",
    "Other",
];

/// Legacy (Chinese) category labels, index-aligned with [`CATEGORIES`]
const LEGACY_CATEGORIES: [&str; 7] = ["服务器", "网络设备", "存储设备", "PC", "笔记本", "打印机", "其他"];

/// Map a category cell to its canonical label. Unknown values pass through trimmed.
pub fn normalize_category(raw: &str) -> String {
    let raw = raw.trim();
    if let Some(i) = LEGACY_CATEGORIES.iter().position(|c| *c == raw) {
        return CATEGORIES[i].to_string();
    }
    CATEGORIES
        .iter()
        .find(|c| c.eq_ignore_ascii_case(raw))
        .map(|c| c.to_string())
        .unwrap_or_else(|| raw.to_string())
}

/// Lifecycle state of a device
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DeviceStatus {
    #[default]
    NotInService,
    InService,
    UnderRepair,
    RepairComplete,
    Retiring,
    Retired,
    Replaced,
}

impl DeviceStatus {
    pub const ALL: [DeviceStatus; 7] = [
        DeviceStatus::NotInService,
        DeviceStatus::InService,
        DeviceStatus::UnderRepair,
        DeviceStatus::RepairComplete,
        DeviceStatus::Retiring,
        DeviceStatus::Retired,
        DeviceStatus::Replaced,
    ];

    pub fn label(self) -> &'static str {
        match self {
            DeviceStatus::NotInService => "Not in service",
            DeviceStatus::InService => "In service",
            DeviceStatus::UnderRepair => "Under repair",
            DeviceStatus::RepairComplete => "Repair complete",
            DeviceStatus::Retiring => "Retiring",
            DeviceStatus::Retired => "Retired",
            DeviceStatus::Replaced => "Replaced",
        }
    }

    fn legacy_label(self) -> &'static str {
        match self {
            DeviceStatus::NotInService => "未投入使用",
            DeviceStatus::InService => "使用中",
            DeviceStatus::UnderRepair => "维修中",
            DeviceStatus::RepairComplete => "维修结束",
            DeviceStatus::Retiring => "报废中",
            DeviceStatus::Retired => "报废流程结束",
            DeviceStatus::Replaced => "更换为新设备",
        }
    }

    /// Parse an English label (any case) or a legacy label
    pub fn from_label(text: &str) -> Option<Self> {
        let text = text.trim();
        Self::ALL
            .into_iter()
            .find(|s| s.label().eq_ignore_ascii_case(text) || s.legacy_label() == text)
    }
}

impl std::fmt::Display for DeviceStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Where a maintenance expiry date sits relative to today
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpiryState {
    /// Expiry date is before today
    Overdue,
    /// Expiry date is today or within the warning window
    DueSoon,
}

/// One row of the register
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Asset {
    pub asset_id: String,
    pub name: String,
    pub model: String,
    pub category: String,
    pub serial: String,
    pub ip_address: String,
    pub location: String,
    pub cabinet: String,
    pub contract: String,
    pub project: String,
    pub owner: String,
    pub price: Option<f64>,
    pub purchase_date: Option<NaiveDate>,
    pub intake_date: Option<NaiveDate>,
    pub go_live_date: Option<NaiveDate>,
    pub maintenance_expiry: Option<NaiveDate>,
    pub vendor_code: String,
    pub vendor_name: String,
    pub vendor_contact: String,
    pub status: DeviceStatus,
    pub note: String,
}

impl Asset {
    /// Blank record pre-filled the way a new entry starts out in the editor
    pub fn with_defaults() -> Self {
        Self {
            location: DEFAULT_LOCATION.to_string(),
            cabinet: DEFAULT_CABINET.to_string(),
            note: DEFAULT_NOTE.to_string(),
            ..Default::default()
        }
    }

    /// Replace blank location, cabinet and note with their defaults
    pub fn fill_blank_defaults(&mut self) {
        for (field, default) in [
            (&mut self.location, DEFAULT_LOCATION),
            (&mut self.cabinet, DEFAULT_CABINET),
            (&mut self.note, DEFAULT_NOTE),
        ] {
            if field.trim().is_empty() {
                *field = default.to_string();
            }
        }
    }

    pub fn expiry_state(&self, today: NaiveDate, window_days: i64) -> Option<ExpiryState> {
        let expiry = self.maintenance_expiry?;
        if expiry < today {
            Some(ExpiryState::Overdue)
        } else {
            // A window past the calendar's end has no upper limit
            let within = Duration::try_days(window_days)
                .and_then(|d| today.checked_add_signed(d))
                .map_or(true, |end| expiry <= end);
            within.then_some(ExpiryState::DueSoon)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn status_parses_english_and_legacy_labels() {
        assert_eq!(DeviceStatus::from_label("under REPAIR"), Some(DeviceStatus::UnderRepair));
        assert_eq!(DeviceStatus::from_label(" 使用中 "), Some(DeviceStatus::InService));
        assert_eq!(DeviceStatus::from_label("更换为新设备"), Some(DeviceStatus::Replaced));
        assert_eq!(DeviceStatus::from_label("broken"), None);
    }

    #[test]
    fn category_maps_legacy_labels() {
        assert_eq!(normalize_category("网络设备"), "Network Device");
        assert_eq!(normalize_category("laptop"), "Laptop");
        assert_eq!(normalize_category(" Rack PDU "), "Rack PDU");
    }

    #[test]
    fn blank_defaults_only_touch_empty_fields() {
        let mut asset = Asset {
            location: "  ".into(),
            cabinet: "B-02".into(),
            ..Default::default()
        };
        asset.fill_blank_defaults();
        assert_eq!(asset.location, DEFAULT_LOCATION);
        assert_eq!(asset.cabinet, "B-02");
        assert_eq!(asset.note, DEFAULT_NOTE);
    }

    #[test]
    fn expiry_state_boundaries() {
        let today = ymd(2024, 3, 1);
        let mut asset = Asset::default();
        assert_eq!(asset.expiry_state(today, 60), None);

        asset.maintenance_expiry = Some(ymd(2024, 2, 29));
        assert_eq!(asset.expiry_state(today, 60), Some(ExpiryState::Overdue));

        asset.maintenance_expiry = Some(today);
        assert_eq!(asset.expiry_state(today, 60), Some(ExpiryState::DueSoon));

        asset.maintenance_expiry = Some(today + Duration::days(60));
        assert_eq!(asset.expiry_state(today, 60), Some(ExpiryState::DueSoon));

        asset.maintenance_expiry = Some(today + Duration::days(61));
        assert_eq!(asset.expiry_state(today, 60), None);
    }

    #[test]
    fn huge_window_does_not_overflow() {
        let today = ymd(2024, 3, 1);
        let asset = Asset {
            maintenance_expiry: Some(ymd(9000, 1, 1)),
            ..Default::default()
        };
        assert_eq!(asset.expiry_state(today, 100_000_000), Some(ExpiryState::DueSoon));
        assert_eq!(asset.expiry_state(today, i64::MAX), Some(ExpiryState::DueSoon));
    }
}
