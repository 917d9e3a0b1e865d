// Utility functions
use chrono::{DateTime, Local, TimeZone};

/// Compact timestamp used in document and export filenames.
pub fn compact_timestamp<Tz: TimeZone>(dt: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    dt.format("%Y%m%d_%H%M%S").to_string()
}

/// Date tag selecting one day's analysis documents.
pub fn date_tag(dt: &DateTime<Local>) -> String {
    dt.format("%Y%m%d").to_string()
}
