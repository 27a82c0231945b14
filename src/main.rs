//! Command-line demo for trafficwatch.
//!
//! Seeds an in-memory store with generated camera traffic, runs every
//! measurement through the engine's ingestion path (so jam events are
//! raised organically), then prints the aggregate reports as JSON.

use anyhow::Result;
use chrono::{Duration, Utc};
use clap::Parser;
use rand::Rng;
use std::sync::Arc;
use tracing::info;

use trafficwatch::{
    Camera, ClassifierThresholds, JamAlertOutcome, MemoryStore, NewMeasurement, RecordStore,
    TrafficEngine,
};

/// Traffic analytics engine demo
#[derive(Parser, Debug)]
#[command(name = "trafficwatch")]
#[command(version = trafficwatch::VERSION)]
#[command(about = "Seed generated traffic data and print analytics reports", long_about = None)]
struct Cli {
    /// Number of days of history to generate
    #[arg(long, default_value = "7")]
    days: i64,

    /// Number of measurements to generate
    #[arg(long, default_value = "240")]
    records: usize,

    /// Restrict the reports to one city
    #[arg(long)]
    city: Option<String>,

    /// Speed threshold (km/h) for the congestion report
    #[arg(long)]
    speed_threshold: Option<f64>,
}

const SEED_CAMERAS: &[(i64, f64, f64, &str, &str)] = &[
    (1, 18.4861, -69.9312, "Calle Francia", "Santo Domingo"),
    (2, 18.4902, -69.9401, "Avenida 1ro de Mayo", "Santo Domingo"),
    (3, 19.4517, -70.6970, "Calle Angela Peralta", "Santiago"),
];

#[tokio::main]
async fn main() -> Result<()> {
    trafficwatch::init_tracing();
    let cli = Cli::parse();

    let store = Arc::new(MemoryStore::new());
    for &(id, latitude, longitude, alias, city) in SEED_CAMERAS {
        store
            .add_camera(Camera {
                id,
                latitude,
                longitude,
                alias: alias.to_string(),
                city: city.to_string(),
            })
            .await?;
    }

    let engine = TrafficEngine::with_thresholds(store, ClassifierThresholds::from_env());
    let now = Utc::now();
    let range_start = now - Duration::days(cli.days);

    let mut rng = rand::thread_rng();
    let minutes_span = (cli.days * 24 * 60).max(1);
    let mut jams = 0usize;
    for _ in 0..cli.records {
        let camera_id = SEED_CAMERAS[rng.gen_range(0..SEED_CAMERAS.len())].0;
        let start_time = now - Duration::minutes(rng.gen_range(0..minutes_span));
        let end_time = start_time + Duration::minutes(rng.gen_range(5..15));
        // Mostly free-flowing traffic with the occasional near-standstill.
        let average_speed = if rng.gen_bool(0.05) {
            rng.gen_range(0.0..5.0)
        } else {
            rng.gen_range(20.0..80.0)
        };

        let report = engine
            .record(NewMeasurement {
                camera_id,
                start_time,
                end_time,
                vehicle_count: rng.gen_range(5..100),
                average_speed,
            })
            .await?;
        if matches!(report.jam_alert, JamAlertOutcome::Recorded(_)) {
            jams += 1;
        }
    }
    info!(records = cli.records, jams, "ingestion complete");

    let city = cli.city.as_deref();

    for &(camera_id, _, _, alias, _) in SEED_CAMERAS {
        match engine.classify(camera_id).await {
            Ok(state) => println!("{alias}: {state}"),
            Err(trafficwatch::EngineError::CameraNotFound(_)) => println!("{alias}: no data"),
            Err(err) => return Err(err.into()),
        }
    }

    let peaks = engine.peak_hours(range_start, now, None, city).await?;
    println!("peak hours: {}", serde_json::to_string_pretty(&peaks)?);

    let congestion = engine
        .congestion(None, Some(range_start), Some(now), city, cli.speed_threshold)
        .await?;
    println!("congestion: {}", serde_json::to_string_pretty(&congestion)?);

    let stats = engine.range_stats(range_start, now, None, city).await?;
    println!("range stats: {}", serde_json::to_string_pretty(&stats)?);

    let jam_events = engine.jam_events(range_start, now, None, city).await?;
    println!("jam events recorded: {}", jam_events.len());

    Ok(())
}
