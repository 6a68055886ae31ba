//! Basic example demonstrating the FortiOS API client.
//!
//! Run with:
//! ```
//! FORTIOS_HOST=fw.example.com FORTIOS_TOKEN=your-token cargo run --example basic
//! ```

use fortiapi::{resources, Fields, FortiClient, GetQuery, MovePosition};

#[tokio::main]
async fn main() -> fortiapi::Result<()> {
    // Initialize tracing for debugging (optional)
    tracing_subscriber::fmt::init();

    // Create client from environment variables
    println!("Creating FortiOS client...");
    let client = FortiClient::from_env()?;
    println!("Connected to: {}", client.base_url());

    let status = client
        .resource(&resources::MONITOR_SYSTEM_STATUS)
        .get(&GetQuery::default())
        .await?;
    println!(
        "Device: {} ({})",
        status.serial.as_deref().unwrap_or("unknown"),
        status.version.as_deref().unwrap_or("unknown")
    );

    // List addresses, one page
    println!("\n--- Listing Addresses (first page) ---");
    let addresses = client.resource(&resources::FIREWALL_ADDRESS);
    let page = addresses
        .list_page(&GetQuery::default().format(["name", "type"]), 0, 10)
        .await?;
    println!("Found {} addresses (more: {})", page.len(), page.has_more);
    for address in &page {
        println!("  - {} ({})", address["name"], address["type"]);
    }

    // Create or update an address, then a group holding it
    println!("\n--- Upserting Objects ---");
    addresses
        .set(
            &Fields::new()
                .set("name", "demo-host")
                .set("subnet", "192.0.2.10 255.255.255.255")
                .set("comment", "created by fortiapi demo"),
        )
        .await?;
    client
        .resource(&resources::FIREWALL_ADDRGRP)
        .set(&Fields::new().set("name", "demo-group").set("member", "demo-host"))
        .await?;
    println!("demo-host and demo-group are in place");

    // Show policy order, then move the last one to the top
    println!("\n--- Policy Order ---");
    let policies = client.resource(&resources::FIREWALL_POLICY);
    let order = policies
        .list_all(&GetQuery::default().format(["policyid", "name"]))
        .await?;
    for (i, policy) in order.iter().enumerate() {
        println!("  {}. #{} {}", i + 1, policy["policyid"], policy["name"]);
    }

    if let Some(last) = order.last() {
        policies
            .move_to(last["policyid"].clone(), MovePosition::Top, None)
            .await?;
        println!("Moved policy #{} to the top", last["policyid"]);
    }

    println!("\nDone!");
    Ok(())
}
