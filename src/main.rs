use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use single_lane_parking::{
    load_config, run_simulation, run_simulation_on_runtime, spawn_status_listener, EventChannel,
    ParkingLot, SimulationConfig, SimulationError, SimulationReport, StatusLog,
};

#[derive(Parser)]
#[command(
    name = "parking-sim",
    about = "Vehicles sharing one entrance/exit lane into a fixed-capacity lot",
    version
)]
struct Cli {
    /// TOML configuration file. Defaults are used when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the number of vehicles.
    #[arg(long)]
    vehicles: Option<usize>,

    /// Override the lot capacity.
    #[arg(long)]
    capacity: Option<usize>,

    /// Override the length of one time unit in milliseconds.
    #[arg(long)]
    time_unit_ms: Option<u64>,

    /// Seed for arrivals and dwell times.
    #[arg(long)]
    seed: Option<u64>,

    /// Run vehicles as tokio tasks instead of OS threads.
    #[arg(long = "async")]
    use_async: bool,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    match run(cli) {
        Ok(report) => {
            print_report(&report);
            ExitCode::SUCCESS
        }
        Err(err) => {
            tracing::error!("{err}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<SimulationReport, SimulationError> {
    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => {
            tracing::warn!("no config file given, using defaults");
            SimulationConfig::default()
        }
    };
    if let Some(vehicles) = cli.vehicles {
        config.vehicles = vehicles;
    }
    if let Some(capacity) = cli.capacity {
        config.capacity = capacity;
    }
    if let Some(time_unit_ms) = cli.time_unit_ms {
        config.time_unit_ms = time_unit_ms;
    }
    if cli.seed.is_some() {
        config.seed = cli.seed;
    }
    config.validate()?;

    println!("===========================================");
    println!("Starting Parking Lot Simulation");
    println!("===========================================\n");
    println!(
        "{} spaces, {} vehicles, time unit {} ms ({})\n",
        config.capacity,
        config.vehicles,
        config.time_unit_ms,
        if cli.use_async { "tokio tasks" } else { "threads" }
    );

    let EventChannel { sink, events_rx } =
        EventChannel::new(config.event_buffer, config.overflow_policy);
    let status_log = StatusLog::new(config.event_buffer);
    let listener = spawn_status_listener(events_rx, status_log.clone());

    let lot = Arc::new(ParkingLot::from_config(&config, sink));
    let result = if cli.use_async {
        run_simulation_on_runtime(Arc::clone(&lot), &config)
    } else {
        run_simulation(Arc::clone(&lot), &config)
    };

    // Last sender goes with the lot; the listener then drains and exits.
    drop(lot);
    match listener.join() {
        Ok(consumed) => tracing::debug!(consumed, "status listener finished"),
        Err(_) => tracing::warn!("status listener panicked"),
    }
    if let Some(last) = status_log.latest() {
        println!("\nLast status: {last}");
    }

    result
}

fn print_report(report: &SimulationReport) {
    let metrics = &report.metrics;

    println!("\n===========================================");
    println!("FINAL SIMULATION RESULTS");
    println!("===========================================");
    println!("Vehicles: {} ({} parked and left, {} gave up)", report.vehicles, report.completed, report.starved);
    println!("Total Exits: {}", report.total_exits);
    println!("Final Occupancy: {}/{}", report.final_occupancy, report.capacity);
    println!("Gate: {} crossings, {} contended attempts", report.gate_acquisitions, report.gate_contentions);
    println!("Dropped Notifications: {}", report.dropped_notifications);
    println!("Elapsed: {:.2?}", report.elapsed);
    println!("===========================================\n");

    println!("=== Wait Times ===");
    println!(
        "Admission P50: {:?}, P99: {:?}, Max: {:?}",
        metrics.admission_wait_p50, metrics.admission_wait_p99, metrics.admission_wait_max
    );
    println!(
        "Departure P50: {:?}, P99: {:?}, Max: {:?}",
        metrics.departure_wait_p50, metrics.departure_wait_p99, metrics.departure_wait_max
    );
    println!(
        "Attempts: {} enter, {} exit ({:.1} entry retries per vehicle)",
        metrics.enter_attempts,
        metrics.exit_attempts,
        metrics.enter_retries_per_vehicle()
    );
}
