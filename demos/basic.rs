//! Basic example demonstrating the Xplenty API client.
//!
//! Run with:
//! ```
//! XPLENTY_ACCOUNT_ID=acme XPLENTY_API_KEY=your-key cargo run --example basic
//! ```

use xplenty::{AccountLimits, Cluster, Job, List, ListQuery, Package, Schedule, XplentyClient};

#[tokio::main]
async fn main() -> xplenty::Result<()> {
    // Initialize tracing for debugging (optional)
    tracing_subscriber::fmt::init();

    // Create client from environment variables
    println!("Creating Xplenty client...");
    let client = XplentyClient::from_env()?;
    println!("Connected to: {}", client.api_url());

    let limits = AccountLimits::fetch(&client).await?;
    println!(
        "Rate limit: {} of {} remaining",
        limits.remaining.unwrap_or_default(),
        limits.limit.unwrap_or_default()
    );

    // Clusters
    println!("\n--- Clusters ---");
    let clusters = Cluster::list(&client).await?;
    for cluster in &clusters {
        println!(
            "  {} {} ({}, {} nodes)",
            cluster,
            cluster.name,
            cluster.status,
            cluster.nodes.unwrap_or_default()
        );
    }

    // Refresh the first available cluster through its attached client
    if let Some(cluster) = clusters.iter().find(|c| c.is_available()) {
        let cluster = cluster.refresh().await?;
        println!("Refreshed {}: {} running jobs", cluster, cluster.running_jobs_count.unwrap_or_default());
    }

    // Packages and schedules
    println!("\n--- Packages ---");
    for package in Package::list(&client).await? {
        println!("  {} {}", package, package.name);
    }

    println!("\n--- Schedules ---");
    for schedule in Schedule::list(&client).await? {
        let state = if schedule.is_enabled() { "enabled" } else { "disabled" };
        println!("  {} {} ({})", schedule, schedule.name, state);
    }

    // Running jobs, with their outputs
    println!("\n--- Running Jobs ---");
    let query = ListQuery {
        status: Some("running".to_string()),
        ..Default::default()
    };
    let jobs = Job::list_all(&client, &query).await?;
    println!("Found {} running jobs", jobs.len());
    for job in &jobs {
        let progress = job.progress.unwrap_or_default() * 100.0;
        println!("  {} on cluster {:?}: {:.0}%", job, job.cluster_id, progress);
        for output in job.outputs() {
            println!("    - {} ({} records)", output.name, output.records_count.unwrap_or_default());
        }
    }

    println!("\nDone!");
    Ok(())
}
