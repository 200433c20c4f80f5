use anyhow::{Context, Result};
use postcodenl_data::{Account, Client, Delivery, DeliveryQuery, DeliveryType};

fn main() -> Result<()> {
    // Example program that calls the library API.
    // Configure authentication via env vars or a `.postcodenlrc` file.
    let client = Client::from_env()?;

    println!("ACCOUNTS:");
    let accounts = client.list_accounts(None)?;
    for account in &accounts {
        print_account(account);
    }
    println!();

    println!("SINGLE ACCOUNT:");
    let first = accounts.first().context("no accounts available")?;
    print_account(&client.get_account(first.id)?);
    println!();

    println!("DELIVERIES:");
    let query = DeliveryQuery::new().delivery_type(DeliveryType::Complete);
    let deliveries = client.list_deliveries(&query)?;
    for delivery in &deliveries {
        print_delivery(delivery);
    }
    println!();

    println!("SINGLE DELIVERY:");
    let first = deliveries.first().context("no deliveries available")?;
    print_delivery(&client.get_delivery(&first.id)?);
    Ok(())
}

fn opt_date(date: Option<chrono::NaiveDate>) -> String {
    date.map(|d| d.to_string()).unwrap_or_default()
}

fn print_account(acc: &Account) {
    println!("{:<10} {:<20} {}", acc.id, acc.product_code, acc.product_name);
    println!("\tSubscription start     : {}", acc.subscription_start);
    println!("\t               end     : {}", acc.subscription_end);
    println!("\tLast delivery complete : {}", opt_date(acc.last_delivery_complete));
    println!("\tLast delivery mutation : {}", opt_date(acc.last_delivery_mutation));
    println!("\tNext delivery complete : {}", opt_date(acc.next_delivery_complete));
    println!("\tNext delivery mutation : {}", opt_date(acc.next_delivery_mutation));
}

fn print_delivery(del: &Delivery) {
    println!("{:<33} AccountId: {:<10}", del.id, del.account_id);
    println!(
        "\tType: {:<10} Code: {:<20} Name: {}",
        del.delivery_type, del.product_code, del.product_name
    );
    println!("\tDelivery source : {}", opt_date(del.delivery_source));
    println!("\tDelivery target : {}", del.delivery_target);
    println!("\tDownload URI    : {}", del.download_url);
    println!("\tDownloads       : {}", del.download_count);
    println!();
}
