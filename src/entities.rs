//! Records returned by the DATA API.
//!
//! Wire names are fixed by the API and declared per field; dates travel as
//! `yyyyMMdd` strings.

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use url::Url;

use crate::util::{compact_date, lenient_count};

/// The kind of data a delivery contains.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeliveryType {
    /// A full snapshot of the product's database.
    Complete,
    /// The changes between two reference dates.
    Mutation,
}

impl DeliveryType {
    /// All delivery types, in wire-name order.
    pub const ALL: [DeliveryType; 2] = [DeliveryType::Complete, DeliveryType::Mutation];

    /// The lower-case wire name.
    pub fn as_str(self) -> &'static str {
        match self {
            DeliveryType::Complete => "complete",
            DeliveryType::Mutation => "mutation",
        }
    }
}

impl fmt::Display for DeliveryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid delivery type '{0}'. Valid values: 'complete', 'mutation'")]
pub struct ParseDeliveryTypeError(String);

impl FromStr for DeliveryType {
    type Err = ParseDeliveryTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim();
        DeliveryType::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(name))
            .ok_or_else(|| ParseDeliveryTypeError(s.to_string()))
    }
}

impl Serialize for DeliveryType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for DeliveryType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// A subscription account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    #[serde(rename = "accountId")]
    pub id: i64,
    #[serde(rename = "productCode")]
    pub product_code: String,
    #[serde(rename = "productName")]
    pub product_name: String,
    /// First reference date covered by the subscription.
    #[serde(rename = "periodBegin", with = "compact_date")]
    pub subscription_start: NaiveDate,
    /// Last reference date covered by the subscription.
    #[serde(rename = "periodEnd", with = "compact_date")]
    pub subscription_end: NaiveDate,
    /// Most recent complete delivery, if any was made.
    #[serde(
        rename = "lastDeliveryComplete",
        default,
        with = "compact_date::option",
        skip_serializing_if = "Option::is_none"
    )]
    pub last_delivery_complete: Option<NaiveDate>,
    /// Most recent mutation delivery, if any was made.
    #[serde(
        rename = "lastDeliveryMutation",
        default,
        with = "compact_date::option",
        skip_serializing_if = "Option::is_none"
    )]
    pub last_delivery_mutation: Option<NaiveDate>,
    /// Next scheduled complete delivery, if any.
    #[serde(
        rename = "nextDeliveryComplete",
        default,
        with = "compact_date::option",
        skip_serializing_if = "Option::is_none"
    )]
    pub next_delivery_complete: Option<NaiveDate>,
    /// Next scheduled mutation delivery, if any.
    #[serde(
        rename = "nextDeliveryMutation",
        default,
        with = "compact_date::option",
        skip_serializing_if = "Option::is_none"
    )]
    pub next_delivery_mutation: Option<NaiveDate>,
}

/// A downloadable data file produced for an account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Delivery {
    /// Opaque identifier; may contain characters that need escaping in URIs.
    #[serde(rename = "deliveryId")]
    pub id: String,
    #[serde(rename = "accountId")]
    pub account_id: i64,
    #[serde(rename = "deliveryType")]
    pub delivery_type: DeliveryType,
    #[serde(rename = "productCode")]
    pub product_code: String,
    #[serde(rename = "productName")]
    pub product_name: String,
    /// Source reference date. Only mutation deliveries have one.
    #[serde(
        rename = "deliverySource",
        default,
        with = "compact_date::option",
        skip_serializing_if = "Option::is_none"
    )]
    pub delivery_source: Option<NaiveDate>,
    /// Target reference date.
    #[serde(rename = "deliveryTarget", with = "compact_date")]
    pub delivery_target: NaiveDate,
    #[serde(rename = "downloadUrl")]
    pub download_url: Url,
    #[serde(rename = "downloads", default, deserialize_with = "lenient_count")]
    pub download_count: u64,
}
