// Headless runner for the `geo_cluster` library.
//
// Usage: geo_cluster [IP ...]
// With no arguments, addresses are read from stdin, one per line. Every address
// is looked up, plotted on an in-memory map surface, and the resulting viewport,
// clusters and individual markers are printed.

use anyhow::Context;
use geo_cluster::geolocation::{IpApiProvider, parse_ip_list};
use geo_cluster::lookup_worker::LookupWorker;
use geo_cluster::{MapSession, RecordingSurface, SessionConfig, SessionUpdate};
use std::io::Read;
use tracing_subscriber::EnvFilter;

fn main() {
    if let Err(err) = run() {
        eprintln!("{err:?}");
        std::process::exit(1);
    }
}

fn run() -> anyhow::Result<()> {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .try_init();

    // --- 1. Input ---
    let args: Vec<String> = std::env::args().skip(1).collect();
    let input = if args.is_empty() {
        let mut buffer = String::new();
        std::io::stdin()
            .read_to_string(&mut buffer)
            .context("reading addresses from stdin")?;
        buffer
    } else {
        args.join("\n")
    };
    let ips = parse_ip_list(&input)?;

    // --- 2. Setup ---
    // The blocking HTTP client is built and dropped outside the async runtime.
    let config = SessionConfig::from_env();
    let provider = IpApiProvider::new(&config.lookup)?;
    let worker = LookupWorker::new(provider);
    let mut session = MapSession::new(RecordingSurface::new(), config);
    let runtime = tokio::runtime::Runtime::new().context("starting tokio runtime")?;

    // --- 3. Lookup Batch ---
    runtime.block_on(async {
        session.begin_search();
        let mut batch = worker.spawn_batch(ips);
        while let Some(event) = batch.recv().await {
            match session.apply(event) {
                SessionUpdate::LookupFailed { ip, error } => {
                    eprintln!("Warning: could not locate {ip}: {error}");
                }
                SessionUpdate::NotPlotted { ip } => {
                    eprintln!("Warning: {ip} has no coordinates to plot");
                }
                _ => {}
            }
        }
        batch.join().await.context("lookup worker panicked")
    })?;
    drop(runtime);

    // --- 4. Report ---
    if session.results().is_empty() {
        println!("No addresses could be located.");
        return Ok(());
    }

    println!("{}", session.location_details());

    let viewport = session.viewport();
    println!(
        "Viewport: center ({:.4}, {:.4}), zoom {}",
        viewport.center.lat, viewport.center.lon, viewport.zoom
    );

    let engine = session.engine();
    for cluster in engine.active_clusters() {
        let members: Vec<String> = cluster.members.iter().map(|id| id.to_string()).collect();
        println!(
            "Cluster [{}] at ({:.4}, {:.4}): {}",
            cluster.label,
            cluster.centroid.lat,
            cluster.centroid.lon,
            members.join(", ")
        );
    }
    for marker in engine.markers().iter().filter(|m| m.visible()) {
        println!(
            "Marker {} \"{}\" at ({:.4}, {:.4})",
            marker.id, marker.label, marker.position.lat, marker.position.lon
        );
    }

    Ok(())
}
