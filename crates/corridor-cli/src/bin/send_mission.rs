use anyhow::Result;
use clap::Parser;
use corridor_cli::{init_tracing, load_mission};
use corridor_sdk::MissionClient;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about = "Upload a mission to a corridor relay", long_about = None)]
struct Args {
    /// Corridor server URL
    #[arg(long, default_value = "http://localhost:5006")]
    url: String,

    /// Mission descriptor JSON file
    #[arg(long)]
    mission: PathBuf,

    /// Trigger a route computation after upload
    #[arg(long)]
    compute: bool,

    /// Clearance in meters for the computation (server default if omitted)
    #[arg(long, requires = "compute")]
    offset: Option<f64>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing("corridor_sdk=info")?;

    let mission = load_mission(&args.mission)?;
    let client = MissionClient::new(args.url);

    if !client.health().await.unwrap_or(false) {
        anyhow::bail!("Server at {} is not healthy", client.base_url());
    }

    let update = client.update_mission(&mission).await?;
    println!(
        "{}: {} route points stored",
        update.message,
        update.updated_route_points.len()
    );

    if !args.compute {
        return Ok(());
    }

    println!("Requesting route computation...");
    let summary = client.compute_route(args.offset).await?;
    println!(
        "Run {}: {} points ({} degraded)",
        summary.run_id, summary.points, summary.degraded_points
    );

    match client.offset_route().await? {
        Some(route) => {
            if let (Some(first), Some(last)) = (route.first(), route.last()) {
                println!("Start: {}, {}", first.lat, first.lng);
                println!("End: {}, {}", last.lat, last.lng);
            }
        }
        None => eprintln!("Route was computed but nothing is published yet"),
    }

    Ok(())
}
