//! Fetches the latest delivery of every account into a directory.
//!
//! This is the logic behind the `postcodenl-downloader` binary.

use clap::Parser;
use std::path::{Path, PathBuf};

use crate::client::Client;
use crate::entities::{Delivery, DeliveryType};
use crate::error::Result;
use crate::query::DeliveryQuery;
use crate::util::format_compact_date;

/// Downloads files to build your postcode.nl databases (complete and/or mutation)
#[derive(Parser, Debug)]
#[command(name = "postcodenl-downloader")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Your postcode.nl key (or username)
    pub key: String,

    /// Your postcode.nl secret (or password)
    pub secret: String,

    /// The destination download directory
    pub path: PathBuf,

    /// Either 'mutation' or 'complete'
    pub delivery_type: DeliveryType,

    /// Use to download a specific product code
    #[arg(short = 'p', long = "productcode")]
    pub product_code: Option<String>,

    /// (Force) Overwrite existing files
    #[arg(short, long)]
    pub overwrite: bool,

    /// Verbose
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    pub fn options(&self) -> DownloadOptions {
        DownloadOptions {
            destination: self.path.clone(),
            delivery_type: self.delivery_type,
            product_code: self.product_code.clone(),
            overwrite: self.overwrite,
        }
    }
}

#[derive(Debug, Clone)]
pub struct DownloadOptions {
    pub destination: PathBuf,
    pub delivery_type: DeliveryType,
    pub product_code: Option<String>,
    pub overwrite: bool,
}

/// What [`run`] did with each account's latest delivery.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct DownloadSummary {
    pub downloaded: Vec<PathBuf>,
    pub skipped: Vec<PathBuf>,
}

/// For every account (optionally filtered by product code), downloads the
/// delivery of the requested type with the most recent target date.
///
/// Files that already exist are left alone unless `overwrite` is set.
/// Accounts without any delivery of that type are passed over.
pub fn run(client: &Client, options: &DownloadOptions) -> Result<DownloadSummary> {
    let mut summary = DownloadSummary::default();

    tracing::info!("Retrieving accounts...");
    for account in client.list_accounts(options.product_code.as_deref())? {
        tracing::info!("Getting latest for '{}'...", account.product_name);
        let query = DeliveryQuery::new()
            .account_id(account.id)
            .delivery_type(options.delivery_type);

        let Some(latest) = latest_delivery(client.list_deliveries(&query)?) else {
            tracing::info!(account = account.id, "No {} delivery available", options.delivery_type);
            continue;
        };

        let dest = delivery_path(&options.destination, &latest);
        if dest.exists() && !options.overwrite {
            tracing::info!("Skipping file {}", dest.display());
            summary.skipped.push(dest);
            continue;
        }

        tracing::info!("Downloading file {}", dest.display());
        client.download_delivery(&latest, &dest)?;
        summary.downloaded.push(dest);
    }

    Ok(summary)
}

/// Picks the delivery with the greatest target date. On ties the first one
/// listed by the server wins.
pub fn latest_delivery(deliveries: Vec<Delivery>) -> Option<Delivery> {
    deliveries.into_iter().fold(None, |best, d| match best {
        Some(b) if b.delivery_target >= d.delivery_target => Some(b),
        _ => Some(d),
    })
}

/// `<productcode>_<yyyyMMdd>_<deliverytype>.zip`, all lower-case.
pub fn delivery_file_name(delivery: &Delivery) -> String {
    format!(
        "{}_{}_{}.zip",
        delivery.product_code,
        format_compact_date(delivery.delivery_target),
        delivery.delivery_type
    )
    .to_lowercase()
}

/// Full destination path of `delivery` inside `directory`.
pub fn delivery_path(directory: &Path, delivery: &Delivery) -> PathBuf {
    directory.join(delivery_file_name(delivery))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use url::Url;

    fn delivery(id: &str, target: (i32, u32, u32)) -> Delivery {
        Delivery {
            id: id.to_string(),
            account_id: 1,
            delivery_type: DeliveryType::Complete,
            product_code: "PCNL_Ext".to_string(),
            product_name: "Postcode.nl".to_string(),
            delivery_source: None,
            delivery_target: NaiveDate::from_ymd_opt(target.0, target.1, target.2).unwrap(),
            download_url: Url::parse(&format!("https://data.postcode.nl/download/{}", id)).unwrap(),
            download_count: 0,
        }
    }

    #[test]
    fn picks_greatest_target_date() {
        let latest = latest_delivery(vec![
            delivery("a", (2024, 1, 1)),
            delivery("b", (2024, 3, 1)),
            delivery("c", (2024, 2, 1)),
        ]);
        assert_eq!(latest.map(|d| d.id), Some("b".to_string()));
    }

    #[test]
    fn first_listed_wins_ties() {
        let latest = latest_delivery(vec![delivery("a", (2024, 3, 1)), delivery("b", (2024, 3, 1))]);
        assert_eq!(latest.map(|d| d.id), Some("a".to_string()));
    }

    #[test]
    fn no_deliveries_no_pick() {
        assert_eq!(latest_delivery(Vec::new()), None);
    }

    #[test]
    fn file_name_is_lower_case() {
        let d = delivery("a", (2024, 3, 1));
        assert_eq!(delivery_file_name(&d), "pcnl_ext_20240301_complete.zip");
        assert_eq!(
            delivery_path(Path::new("out"), &d),
            PathBuf::from("out/pcnl_ext_20240301_complete.zip")
        );
    }

    #[test]
    fn parses_arguments() {
        let cli = Cli::try_parse_from([
            "postcodenl-downloader",
            "key",
            "secret",
            "/tmp/out",
            "Mutation",
            "-p",
            "PCNL",
            "--overwrite",
        ])
        .unwrap();

        assert_eq!(cli.delivery_type, DeliveryType::Mutation);
        assert_eq!(cli.product_code.as_deref(), Some("PCNL"));
        assert!(cli.overwrite);
        assert!(!cli.verbose);
        assert_eq!(cli.options().destination, PathBuf::from("/tmp/out"));
    }

    #[test]
    fn rejects_unknown_delivery_type() {
        let result = Cli::try_parse_from(["postcodenl-downloader", "key", "secret", "/tmp", "full"]);
        assert!(result.is_err());
    }
}
