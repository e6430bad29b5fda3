//! Common types and data structures

use crate::asset::Asset;
use std::path::PathBuf;

/// Columns shown in the asset table, in display order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TableColumn {
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
    VendorName,
    MaintenanceExpiry,
    Status,
    Note,
}

impl TableColumn {
    pub const ALL: [TableColumn; 15] = [
        TableColumn::AssetId,
        TableColumn::Name,
        TableColumn::Model,
        TableColumn::Category,
        TableColumn::Serial,
        TableColumn::IpAddress,
        TableColumn::Location,
        TableColumn::Cabinet,
        TableColumn::Contract,
        TableColumn::Project,
        TableColumn::Owner,
        TableColumn::VendorName,
        TableColumn::MaintenanceExpiry,
        TableColumn::Status,
        TableColumn::Note,
    ];

    pub fn title(self) -> &'static str {
        match self {
            TableColumn::AssetId => "ASSET ID",
            TableColumn::Name => "NAME",
            TableColumn::Model => "MODEL",
            TableColumn::Category => "CATEGORY",
            TableColumn::Serial => "SERIAL",
            TableColumn::IpAddress => "IP",
            TableColumn::Location => "LOCATION",
            TableColumn::Cabinet => "CABINET",
            TableColumn::Contract => "CONTRACT",
            TableColumn::Project => "PROJECT",
            TableColumn::Owner => "OWNER",
            TableColumn::VendorName => "VENDOR",
            TableColumn::MaintenanceExpiry => "MAINT. EXPIRY",
            TableColumn::Status => "STATUS",
            TableColumn::Note => "NOTE",
        }
    }

    pub fn default_width(self) -> f32 {
        match self {
            TableColumn::Category | TableColumn::IpAddress | TableColumn::Cabinet => 100.0,
            TableColumn::MaintenanceExpiry | TableColumn::Status => 110.0,
            TableColumn::Owner => 80.0,
            TableColumn::Note => 200.0,
            _ => 120.0,
        }
    }

    /// Stable key used in settings.json
    pub fn key(self) -> &'static str {
        match self {
            TableColumn::AssetId => "asset_id",
            TableColumn::Name => "name",
            TableColumn::Model => "model",
            TableColumn::Category => "category",
            TableColumn::Serial => "serial",
            TableColumn::IpAddress => "ip_address",
            TableColumn::Location => "location",
            TableColumn::Cabinet => "cabinet",
            TableColumn::Contract => "contract",
            TableColumn::Project => "project",
            TableColumn::Owner => "owner",
            TableColumn::VendorName => "vendor_name",
            TableColumn::MaintenanceExpiry => "maintenance_expiry",
            TableColumn::Status => "status",
            TableColumn::Note => "note",
        }
    }
}

/// Sort direction for the table
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum SortDirection {
    Ascending,
    Descending,
}

/// Pending confirmation shown as a modal
#[derive(Clone, Debug)]
pub enum Confirm {
    Delete(Vec<String>),
    ImportOverwrite {
        path: PathBuf,
        incoming: Vec<Asset>,
        duplicates: Vec<String>,
    },
    DiscardChanges(PendingAction),
}

/// Action deferred until unsaved changes are confirmed
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PendingAction {
    Open,
    Exit,
}
