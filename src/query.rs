//! Filters for listing deliveries.

use chrono::NaiveDate;

use crate::entities::DeliveryType;
use crate::util::format_compact_date;

/// Ordered query-string parameters.
///
/// Names keep the casing they were added with; [`QueryParams::get`] matches
/// them case-insensitively. Blank values are never stored.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams {
    pairs: Vec<(&'static str, String)>,
}

impl QueryParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `name=value` unless the value is blank.
    pub fn push(&mut self, name: &'static str, value: impl Into<String>) {
        let value = value.into();
        if !value.trim().is_empty() {
            self.pairs.push((name, value));
        }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.pairs.iter().map(|(k, v)| (*k, v.as_str()))
    }
}

/// Arguments for [`Client::list_deliveries`](crate::Client::list_deliveries).
///
/// Every field is optional, but at least one has to be set: the API does not
/// serve an unfiltered delivery listing.
///
/// ```
/// use chrono::NaiveDate;
/// use postcodenl_data::{DeliveryQuery, DeliveryType};
///
/// let query = DeliveryQuery::new()
///     .delivery_type(DeliveryType::Mutation)
///     .after(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
/// let params = query.to_query_params();
/// assert_eq!(params.get("deliverytype"), Some("mutation"));
/// assert_eq!(params.get("after"), Some("20240101"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeliveryQuery {
    pub account_id: Option<i64>,
    pub delivery_type: Option<DeliveryType>,
    /// Target date on or after this date.
    pub from: Option<NaiveDate>,
    /// Target date on or before this date.
    pub to: Option<NaiveDate>,
    /// Target date strictly after this date.
    pub after: Option<NaiveDate>,
}

impl DeliveryQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn account_id(mut self, account_id: i64) -> Self {
        self.account_id = Some(account_id);
        self
    }

    pub fn delivery_type(mut self, delivery_type: DeliveryType) -> Self {
        self.delivery_type = Some(delivery_type);
        self
    }

    pub fn from(mut self, date: NaiveDate) -> Self {
        self.from = Some(date);
        self
    }

    pub fn to(mut self, date: NaiveDate) -> Self {
        self.to = Some(date);
        self
    }

    pub fn after(mut self, date: NaiveDate) -> Self {
        self.after = Some(date);
        self
    }

    /// Converts the set fields into query parameters, in the order
    /// `accountId`, `deliveryType`, `from`, `to`, `after`.
    pub fn to_query_params(&self) -> QueryParams {
        let mut params = QueryParams::new();
        if let Some(id) = self.account_id {
            params.push("accountId", id.to_string());
        }
        if let Some(kind) = self.delivery_type {
            params.push("deliveryType", kind.as_str());
        }
        if let Some(date) = self.from {
            params.push("from", format_compact_date(date));
        }
        if let Some(date) = self.to {
            params.push("to", format_compact_date(date));
        }
        if let Some(date) = self.after {
            params.push("after", format_compact_date(date));
        }
        params
    }
}
