//! Colony Task Simulation
//!
//! Runs a crew of workers at a single settlement for a number of sols and
//! reports what they spent their time on.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;

use bevy_ecs::prelude::*;
use clap::Parser;
use rand::rngs::SmallRng;
use rand::SeedableRng;

use task_core::events::{JsonlTaskSink, TaskListener};
use task_core::scheduling::{SchedulerContext, TaskManager};
use task_core::systems::{
    advance_clock, advance_task_managers, drift_needs, update_duty_status, NeedRates, SimClock,
};
use task_core::{setup, SchedulerConfig, Settlements, SimRng, Worker};
use task_events::MILLISOLS_PER_SOL;

/// Command line arguments for the simulation
#[derive(Parser, Debug)]
#[command(name = "colony_sim")]
#[command(about = "Utility-based task scheduling for a colony crew")]
struct Args {
    /// Random seed for reproducibility
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Number of sols to simulate
    #[arg(long, default_value_t = 3)]
    sols: u32,

    /// Crew size
    #[arg(long, default_value_t = 8)]
    workers: usize,

    /// Millisols per tick
    #[arg(long, default_value_t = 1.0)]
    pulse: f64,

    /// Scheduler tuning file (TOML)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Write task events as JSONL to this file
    #[arg(long)]
    events: Option<PathBuf>,

    /// Write every cache rebuild as JSONL to this file
    #[arg(long)]
    diagnostics: Option<PathBuf>,
}

fn main() {
    let args = Args::parse();
    let pulse = if args.pulse > 0.0 { args.pulse } else { 1.0 };
    let ticks = (args.sols as f64 * MILLISOLS_PER_SOL / pulse).ceil() as u64;

    println!("Colony Task Simulation");
    println!("======================");
    println!("Seed: {}", args.seed);
    println!("Sols: {}", args.sols);
    println!("Workers: {}", args.workers);
    println!("Pulse: {} millisols ({} ticks)", pulse, ticks);
    println!();

    let mut config = match &args.config {
        Some(path) => SchedulerConfig::from_file(path).unwrap_or_else(|e| {
            eprintln!("Warning: Could not load {}: {}", path.display(), e);
            SchedulerConfig::default()
        }),
        None => SchedulerConfig::default(),
    };
    if let Some(path) = &args.diagnostics {
        config.diagnostics.enabled = true;
        config.diagnostics.path = path.display().to_string();
    }

    let context = match SchedulerContext::standard(config) {
        Ok(context) => context,
        Err(e) => {
            eprintln!("Error: Could not create scheduler: {}", e);
            std::process::exit(1);
        }
    };
    println!("Registered {} task policies", context.registry().len());

    let mut listeners: Vec<Arc<dyn TaskListener>> = Vec::new();
    let mut event_sink = None;
    if let Some(path) = &args.events {
        match JsonlTaskSink::new(path) {
            Ok(sink) => {
                let sink = Arc::new(sink);
                listeners.push(sink.clone());
                event_sink = Some(sink);
            }
            Err(e) => eprintln!("Warning: Could not open {}: {}", path.display(), e),
        }
    }

    // Initialize the ECS world
    let mut world = World::new();
    let mut rng = SmallRng::seed_from_u64(args.seed);

    println!("Creating settlement...");
    let settlement = setup::create_settlement();
    let settlement_id = settlement.id.clone();
    println!(
        "  {}: {} buildings, {} vehicles",
        settlement.name,
        settlement.buildings.len(),
        settlement.vehicles.len()
    );
    let mut settlements = Settlements::new();
    settlements.insert(settlement);
    world.insert_resource(settlements);

    println!("Spawning crew...");
    let crew = setup::create_workers(args.workers, &settlement_id, &mut rng);
    let spawned = setup::spawn_workers(&mut world, crew, &context, &listeners);
    println!("  Spawned {} workers", spawned);

    world.insert_resource(SimClock::new(pulse));
    world.insert_resource(NeedRates::default());
    world.insert_resource(SimRng(rng));

    let mut schedule = Schedule::default();
    schedule.add_systems(
        (
            advance_clock,
            update_duty_status,
            drift_needs,
            advance_task_managers,
        )
            .chain(),
    );

    println!();
    println!("Starting simulation...");
    println!();

    let ticks_per_sol = (MILLISOLS_PER_SOL / pulse).round().max(1.0) as u64;
    for tick in 0..ticks {
        schedule.run(&mut world);

        if tick > 0 && tick % ticks_per_sol == 0 {
            let clock = world.resource::<SimClock>();
            println!("Tick {} / {} ({})", tick, ticks, clock.time);
        }
    }

    println!();
    let clock = world.resource::<SimClock>().clone();
    println!("Simulation complete. Ran {} ticks (ending at {}).", clock.ticks, clock.time);
    println!();

    let mut activity: BTreeMap<String, usize> = BTreeMap::new();
    let mut query = world.query::<(&Worker, &TaskManager)>();
    let mut rows: Vec<_> = query.iter(&world).collect();
    rows.sort_by(|a, b| a.0.id.cmp(&b.0.id));
    for (worker, manager) in rows {
        for record in manager.history().iter() {
            *activity.entry(record.task_name.clone()).or_default() += 1;
        }
        println!(
            "  {:<10} {:<8} {:<6} {}",
            worker.id.as_str(),
            worker.name,
            worker.kind.to_string(),
            manager.task_description().unwrap_or("idle")
        );
    }

    println!();
    println!("Activity records by task:");
    for (task, count) in &activity {
        println!("  {:<20} {}", task, count);
    }

    if let Some(sink) = event_sink {
        if let Err(e) = sink.flush() {
            eprintln!("Warning: Could not flush task events: {}", e);
        }
        println!("Wrote {} task events", sink.record_count());
    }
    context.shutdown();
    if args.diagnostics.is_some() {
        println!("Wrote {} cache records", context.diagnostics_written());
    }
}
