use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Deserializer, Serializer};

/// Formats a date the way the DATA API expects it: `yyyyMMdd`, zero-padded.
pub fn format_compact_date(date: NaiveDate) -> String {
    date.format("%Y%m%d").to_string()
}

/// Parses an 8-digit `yyyyMMdd` date.
pub fn parse_compact_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    if value.len() != 8 || !value.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let year = value[0..4].parse().ok()?;
    let month = value[4..6].parse().ok()?;
    let day = value[6..8].parse().ok()?;
    NaiveDate::from_ymd_opt(year, month, day)
}

/// Like [`parse_compact_date`], but also reads ISO 8601 dates and timestamps.
/// Timestamps keep their calendar date only.
pub(crate) fn parse_wire_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    if let Some(date) = parse_compact_date(value) {
        return Some(date);
    }
    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        return Some(date);
    }
    if let Ok(ts) = DateTime::parse_from_rfc3339(value) {
        return Some(ts.date_naive());
    }
    NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|ts| ts.date())
}

/// Encodes a value as a single URI path segment. Only RFC 3986 unreserved
/// characters survive unescaped.
pub(crate) fn encode_path_segment(segment: &str) -> String {
    urlencoding::encode(segment).into_owned()
}

// Some responses carry dates as bare numbers (20240131) rather than strings.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawDate {
    Text(String),
    Number(u64),
}

impl RawDate {
    fn into_date<E: serde::de::Error>(self) -> Result<NaiveDate, E> {
        let text = match self {
            RawDate::Text(s) => s,
            RawDate::Number(n) => n.to_string(),
        };
        parse_wire_date(&text)
            .ok_or_else(|| E::custom(format!("invalid date `{}`, expected yyyyMMdd", text)))
    }
}

/// Serde adapter for required `yyyyMMdd` dates.
pub(crate) mod compact_date {
    use super::*;

    pub(crate) fn serialize<S>(date: &NaiveDate, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&format_compact_date(*date))
    }

    pub(crate) fn deserialize<'de, D>(deserializer: D) -> Result<NaiveDate, D::Error>
    where
        D: Deserializer<'de>,
    {
        RawDate::deserialize(deserializer)?.into_date()
    }

    /// Optional variant; `null` reads as `None`. Pair with `#[serde(default)]`
    /// so that a missing key reads as `None` too.
    pub(crate) mod option {
        use super::super::*;

        pub(crate) fn serialize<S>(date: &Option<NaiveDate>, serializer: S) -> Result<S::Ok, S::Error>
        where
            S: Serializer,
        {
            match date {
                Some(date) => serializer.serialize_str(&format_compact_date(*date)),
                None => serializer.serialize_none(),
            }
        }

        pub(crate) fn deserialize<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
        where
            D: Deserializer<'de>,
        {
            Option::<RawDate>::deserialize(deserializer)?
                .map(RawDate::into_date)
                .transpose()
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawCount {
    Number(u64),
    Text(String),
}

/// Reads a counter that may arrive as a number, a numeric string, or `null`.
/// Anything unreadable counts as zero.
pub(crate) fn lenient_count<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<RawCount>::deserialize(deserializer)? {
        Some(RawCount::Number(n)) => n,
        Some(RawCount::Text(s)) => s.trim().parse().unwrap_or(0),
        None => 0,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn compact_dates_are_zero_padded() {
        assert_eq!(format_compact_date(ymd(2099, 9, 10)), "20990910");
        assert_eq!(format_compact_date(ymd(2024, 1, 1)), "20240101");
        assert_eq!(format_compact_date(ymd(987, 3, 4)), "09870304");
    }

    #[test]
    fn compact_date_survives_formatting_and_parsing() {
        let date = ymd(2088, 12, 31);
        assert_eq!(parse_compact_date(&format_compact_date(date)), Some(date));
    }

    #[test]
    fn rejects_malformed_compact_dates() {
        assert_eq!(parse_compact_date("2099091"), None);
        assert_eq!(parse_compact_date("2099-09-10"), None);
        assert_eq!(parse_compact_date("20991310"), None);
        assert_eq!(parse_compact_date("20990231"), None);
        assert_eq!(parse_compact_date(""), None);
    }

    #[test]
    fn wire_dates_accept_iso_forms() {
        let expected = ymd(2024, 3, 1);
        assert_eq!(parse_wire_date("20240301"), Some(expected));
        assert_eq!(parse_wire_date("2024-03-01"), Some(expected));
        assert_eq!(parse_wire_date("2024-03-01T13:45:00+01:00"), Some(expected));
        assert_eq!(parse_wire_date("2024-03-01T13:45:00Z"), Some(expected));
        assert_eq!(parse_wire_date("2024-03-01T00:00:00"), Some(expected));
        assert_eq!(parse_wire_date("yesterday"), None);
    }

    #[test]
    fn path_segments_escape_reserved_characters() {
        assert_eq!(
            encode_path_segment("some@test?foo=bar&baz=foobar"),
            "some%40test%3Ffoo%3Dbar%26baz%3Dfoobar"
        );
        assert_eq!(encode_path_segment("a/b c"), "a%2Fb%20c");
        assert_eq!(encode_path_segment("plain-id_1.2~x"), "plain-id_1.2~x");
    }

    #[derive(Deserialize)]
    struct Counter {
        #[serde(default, deserialize_with = "lenient_count")]
        downloads: u64,
    }

    #[test]
    fn counts_are_lenient() {
        let read = |json: &str| serde_json::from_str::<Counter>(json).unwrap().downloads;
        assert_eq!(read(r#"{"downloads": 7}"#), 7);
        assert_eq!(read(r#"{"downloads": "12"}"#), 12);
        assert_eq!(read(r#"{"downloads": "n/a"}"#), 0);
        assert_eq!(read(r#"{"downloads": null}"#), 0);
        assert_eq!(read(r#"{}"#), 0);
    }
}
