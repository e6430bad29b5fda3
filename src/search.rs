//! Multi-field asset search
//!
//! Text fields match case-insensitively as substrings, category and status
//! match exactly, and the maintenance expiry query buckets records by how
//! close their expiry date is. All active conditions must hold.

use crate::asset::{Asset, DeviceStatus, ExpiryState};
use chrono::NaiveDate;

/// Text fields the search form can constrain
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextField {
    AssetId,
    Name,
    Model,
    Serial,
    IpAddress,
    Contract,
    Project,
    Owner,
    VendorName,
    Location,
    Cabinet,
}

impl TextField {
    pub const ALL: [TextField; 11] = [
        TextField::AssetId,
        TextField::Name,
        TextField::Model,
        TextField::Serial,
        TextField::IpAddress,
        TextField::Contract,
        TextField::Project,
        TextField::Owner,
        TextField::VendorName,
        TextField::Location,
        TextField::Cabinet,
    ];

    pub fn label(self) -> &'static str {
        match self {
            TextField::AssetId => "Asset ID",
            TextField::Name => "Name",
            TextField::Model => "Model",
            TextField::Serial => "Serial",
            TextField::IpAddress => "IP",
            TextField::Contract => "Contract",
            TextField::Project => "Project",
            TextField::Owner => "Owner",
            TextField::VendorName => "Vendor",
            TextField::Location => "Location",
            TextField::Cabinet => "Cabinet",
        }
    }

    fn value(self, asset: &Asset) -> &str {
        match self {
            TextField::AssetId => &asset.asset_id,
            TextField::Name => &asset.name,
            TextField::Model => &asset.model,
            TextField::Serial => &asset.serial,
            TextField::IpAddress => &asset.ip_address,
            TextField::Contract => &asset.contract,
            TextField::Project => &asset.project,
            TextField::Owner => &asset.owner,
            TextField::VendorName => &asset.vendor_name,
            TextField::Location => &asset.location,
            TextField::Cabinet => &asset.cabinet,
        }
    }
}

/// Maintenance expiry query
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExpiryBucket {
    /// Expires between today and the end of the window
    #[default]
    DueSoon,
    /// Already expired
    Overdue,
    /// Either of the above
    All,
}

impl ExpiryBucket {
    pub const ALL: [ExpiryBucket; 3] = [ExpiryBucket::DueSoon, ExpiryBucket::Overdue, ExpiryBucket::All];

    pub fn label(self) -> &'static str {
        match self {
            ExpiryBucket::DueSoon => "Due soon",
            ExpiryBucket::Overdue => "Overdue",
            ExpiryBucket::All => "Due soon or overdue",
        }
    }

    fn accepts(self, state: Option<ExpiryState>) -> bool {
        match (self, state) {
            (ExpiryBucket::DueSoon, Some(ExpiryState::DueSoon)) => true,
            (ExpiryBucket::Overdue, Some(ExpiryState::Overdue)) => true,
            (ExpiryBucket::All, Some(_)) => true,
            _ => false,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct SearchQuery {
    /// Raw text per field, indexed like [`TextField::ALL`]
    pub text: [String; 11],
    pub category: Option<String>,
    pub status: Option<DeviceStatus>,
    pub expiry: Option<ExpiryBucket>,
}

impl SearchQuery {
    pub fn text_mut(&mut self, field: TextField) -> &mut String {
        let idx = TextField::ALL.iter().position(|f| *f == field).unwrap_or(0);
        &mut self.text[idx]
    }

    pub fn is_empty(&self) -> bool {
        self.text.iter().all(|t| t.trim().is_empty())
            && self.category.is_none()
            && self.status.is_none()
            && self.expiry.is_none()
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// Compile into a matcher for a given day and expiry window
    pub fn matcher(&self, today: NaiveDate, window_days: i64) -> Matcher<'_> {
        let needles = TextField::ALL
            .iter()
            .zip(&self.text)
            .filter_map(|(field, text)| {
                let text = text.trim();
                (!text.is_empty()).then(|| (*field, text.to_lowercase()))
            })
            .collect();
        Matcher {
            query: self,
            needles,
            today,
            window_days,
        }
    }
}

/// A [`SearchQuery`] with its text needles lower-cased once
pub struct Matcher<'a> {
    query: &'a SearchQuery,
    needles: Vec<(TextField, String)>,
    today: NaiveDate,
    window_days: i64,
}

impl Matcher<'_> {
    pub fn matches(&self, asset: &Asset) -> bool {
        if let Some(category) = &self.query.category {
            if asset.category != *category {
                return false;
            }
        }
        if let Some(status) = self.query.status {
            if asset.status != status {
                return false;
            }
        }
        if let Some(bucket) = self.query.expiry {
            if !bucket.accepts(asset.expiry_state(self.today, self.window_days)) {
                return false;
            }
        }
        self.needles
            .iter()
            .all(|(field, needle)| field.value(asset).to_lowercase().contains(needle))
    }
}

/// Indices of matching assets, in register order
pub fn filter(assets: &[Asset], query: &SearchQuery, today: NaiveDate, window_days: i64) -> Vec<usize> {
    let matcher = query.matcher(today, window_days);
    assets
        .iter()
        .enumerate()
        .filter(|(_, a)| matcher.matches(a))
        .map(|(i, _)| i)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 5, 1).unwrap()
    }

    fn sample() -> Vec<Asset> {
        let t = today();
        vec![
            Asset {
                asset_id: "SRV-001".into(),
                name: "Database server".into(),
                category: "Server".into(),
                owner: "Alice".into(),
                status: crate::asset::DeviceStatus::InService,
                maintenance_expiry: Some(t - Duration::days(3)),
                ..Default::default()
            },
            Asset {
                asset_id: "SW-014".into(),
                name: "Core switch".into(),
                category: "Network Device".into(),
                owner: "alice".into(),
                status: crate::asset::DeviceStatus::UnderRepair,
                maintenance_expiry: Some(t + Duration::days(30)),
                ..Default::default()
            },
            Asset {
                asset_id: "SRV-002".into(),
                name: "Web server".into(),
                category: "Server".into(),
                owner: "Bob".into(),
                status: crate::asset::DeviceStatus::InService,
                maintenance_expiry: Some(t + Duration::days(365)),
                ..Default::default()
            },
            Asset {
                asset_id: "PC-100".into(),
                name: "Reception PC".into(),
                category: "PC".into(),
                ..Default::default()
            },
        ]
    }

    #[test]
    fn empty_query_matches_everything() {
        let q = SearchQuery::default();
        assert!(q.is_empty());
        assert_eq!(filter(&sample(), &q, today(), 60), vec![0, 1, 2, 3]);
    }

    #[test]
    fn text_is_case_insensitive_substring() {
        let mut q = SearchQuery::default();
        *q.text_mut(TextField::Owner) = "  ALICE ".into();
        assert_eq!(filter(&sample(), &q, today(), 60), vec![0, 1]);

        *q.text_mut(TextField::Name) = "server".into();
        assert_eq!(filter(&sample(), &q, today(), 60), vec![0]);
    }

    #[test]
    fn category_and_status_are_exact() {
        let mut q = SearchQuery {
            category: Some("Server".into()),
            ..Default::default()
        };
        assert_eq!(filter(&sample(), &q, today(), 60), vec![0, 2]);

        q.category = Some("Serv".into());
        assert!(filter(&sample(), &q, today(), 60).is_empty());

        q.category = None;
        q.status = Some(crate::asset::DeviceStatus::UnderRepair);
        assert_eq!(filter(&sample(), &q, today(), 60), vec![1]);
    }

    #[test]
    fn expiry_buckets() {
        let mut q = SearchQuery {
            expiry: Some(ExpiryBucket::DueSoon),
            ..Default::default()
        };
        assert_eq!(filter(&sample(), &q, today(), 60), vec![1]);

        q.expiry = Some(ExpiryBucket::Overdue);
        assert_eq!(filter(&sample(), &q, today(), 60), vec![0]);

        // records without an expiry date never match
        q.expiry = Some(ExpiryBucket::All);
        assert_eq!(filter(&sample(), &q, today(), 60), vec![0, 1]);

        // a wider window pulls in the far expiry
        assert_eq!(filter(&sample(), &q, today(), 400), vec![0, 1, 2]);
    }

    #[test]
    fn conditions_combine() {
        let mut q = SearchQuery {
            category: Some("Server".into()),
            expiry: Some(ExpiryBucket::All),
            ..Default::default()
        };
        *q.text_mut(TextField::AssetId) = "srv".into();
        assert_eq!(filter(&sample(), &q, today(), 60), vec![0]);

        q.clear();
        assert!(q.is_empty());
    }
}
