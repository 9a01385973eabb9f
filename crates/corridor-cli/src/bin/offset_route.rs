use anyhow::{Context, Result};
use clap::Parser;
use corridor_cli::{corridor_config, init_tracing, load_mission, write_json};
use corridor_sdk::MissionClient;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about = "Compute an offset corridor around no-fly zones", long_about = None)]
struct Args {
    /// Mission descriptor JSON file
    #[arg(long, required_unless_present = "relay", conflicts_with = "relay")]
    mission: Option<PathBuf>,

    /// Relay URL to fetch the stored mission from
    #[arg(long)]
    relay: Option<String>,

    /// Clearance from the polygon boundary in meters
    #[arg(long, default_value_t = 3.0)]
    offset: f64,

    /// Route output file
    #[arg(long, default_value = "offset_route.json")]
    output: PathBuf,

    /// Also write the full result (drone, original route, polygons, stats)
    #[arg(long)]
    overlay: Option<PathBuf>,

    /// UTM zone for the planar projection
    #[arg(long, default_value_t = 37)]
    utm_zone: u8,

    /// Sample at whole steps only, without forcing the final vertex
    #[arg(long)]
    step_only: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing("corridor_core=info")?;

    let mission = match (&args.mission, &args.relay) {
        (Some(path), _) => load_mission(path)?,
        (None, Some(url)) => {
            println!("Fetching mission from {}...", url);
            MissionClient::new(url.as_str())
                .get_mission()
                .await
                .context("Failed to fetch mission from relay")?
        }
        (None, None) => anyhow::bail!("Either --mission or --relay is required"),
    };
    println!(
        "Mission: {} route points, {} polygon features",
        mission.route_points.len(),
        mission.saved_polygons.features.len()
    );

    let config = corridor_config(args.offset, args.utm_zone, args.step_only);
    let result = mission.compute(&config)?;

    write_json(&args.output, &result.route)?;
    println!("Wrote {} points to {:?}", result.route.len(), args.output);
    if let Some(overlay) = &args.overlay {
        write_json(overlay, &result)?;
        println!("Wrote overlay to {:?}", overlay);
    }

    let stats = &result.stats;
    println!(
        "Discretized {} ({} boundary), {} after dedupe, {} after loop removal, {} final",
        stats.discretized_points,
        stats.boundary_points,
        stats.after_deduplication,
        stats.after_loop_removal,
        stats.final_points
    );
    if stats.degraded_points > 0 {
        eprintln!("Warning: {} points used a degraded offset", stats.degraded_points);
    }

    Ok(())
}
