//! Application constants and configuration

pub const APP_NAME: &str = "IT Asset Manager";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default values written into blank fields and into columns missing from older files
pub const DEFAULT_LOCATION: &str = "Unspecified";
pub const DEFAULT_CABINET: &str = "Unspecified";
pub const DEFAULT_NOTE: &str = "Repair/replacement info: none";

/// Days ahead of today that count as "due soon" for maintenance expiry
pub const DEFAULT_EXPIRY_WINDOW_DAYS: i64 = 60;
pub const MAX_EXPIRY_WINDOW_DAYS: i64 = 3650;

/// Date format used for display, editing and saved files
pub const DATE_FORMAT: &str = "%Y-%m-%d";

pub const TEMPLATE_FILE_NAME: &str = "IT Asset Template.xlsx";
