use time::{
    OffsetDateTime,
    format_description::{FormatItem, well_known::Rfc3339},
    macros::format_description,
};

pub const HUMAN_DATE_FORMAT: &[FormatItem<'static>] =
    format_description!("[month repr:long] [day padding:none], [year]");

/// `October 1, 1932`.
pub fn format_human_date(at: OffsetDateTime) -> String {
    at.date().format(HUMAN_DATE_FORMAT).unwrap_or_default()
}

pub fn format_iso(at: OffsetDateTime) -> String {
    at.format(&Rfc3339).unwrap_or_default()
}
