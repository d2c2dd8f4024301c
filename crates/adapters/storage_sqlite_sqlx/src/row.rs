//! Column codecs shared by the repositories.

use std::str::FromStr;

use chrono::SecondsFormat;

use rentalhub_domain::time::Timestamp;

/// Parse a text column through the domain type's [`FromStr`].
pub(crate) fn parse<T>(value: &str) -> Result<T, sqlx::Error>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    value
        .parse()
        .map_err(|err| sqlx::Error::Decode(Box::new(err)))
}

/// Parse an RFC 3339 timestamp column.
pub(crate) fn timestamp(value: &str) -> Result<Timestamp, sqlx::Error> {
    chrono::DateTime::parse_from_rfc3339(value)
        .map(|ts| ts.to_utc())
        .map_err(|err| sqlx::Error::Decode(Box::new(err)))
}

/// Fixed-width RFC 3339 so that text ordering matches time ordering.
pub(crate) fn format_timestamp(ts: &Timestamp) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Decode an optional JSON text column.
pub(crate) fn json(value: Option<String>) -> Result<Option<serde_json::Value>, sqlx::Error> {
    value
        .map(|text| serde_json::from_str(&text))
        .transpose()
        .map_err(|err| sqlx::Error::Decode(Box::new(err)))
}
