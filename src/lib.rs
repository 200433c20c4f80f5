//! A Rust client for the postcode.nl DATA API.
//!
//! The API exposes subscription *accounts* and the periodic *deliveries*
//! (database snapshots and mutation files) produced for them. This crate reads
//! both and downloads delivery files.
//!
//! ## Quick start
//! - Pass your key and secret to [`Client::new`], or configure them via
//!   environment variables (`POSTCODENL_KEY`, `POSTCODENL_SECRET`) or a
//!   `.postcodenlrc` file and call [`Client::from_env`].
//! - List accounts, query deliveries, download the one you need.
//!
//! ```no_run
//! use postcodenl_data::{Client, DeliveryQuery, DeliveryType};
//! use std::path::Path;
//!
//! fn main() -> postcodenl_data::Result<()> {
//!     let client = Client::from_env()?;
//!     for account in client.list_accounts(None)? {
//!         let query = DeliveryQuery::new()
//!             .account_id(account.id)
//!             .delivery_type(DeliveryType::Complete);
//!         if let Some(delivery) = client.list_deliveries(&query)?.first() {
//!             client.download_delivery(delivery, Path::new("latest.zip"))?;
//!         }
//!     }
//!     Ok(())
//! }
//! ```
//!
//! The `postcodenl-downloader` binary wraps this flow; see [`downloader`].

#![forbid(unsafe_code)]

mod client;
mod config;
pub mod downloader;
mod entities;
mod error;
mod query;
pub mod testing;
pub mod transport;
mod util;

pub use client::{Client, ClientConfig, Credentials, DEFAULT_BASE_URI};
pub use entities::{Account, Delivery, DeliveryType, ParseDeliveryTypeError};
pub use error::{ApiError, Error, Result};
pub use query::{DeliveryQuery, QueryParams};
pub use util::{format_compact_date, parse_compact_date};
