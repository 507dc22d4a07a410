//! Headless AOI simulation
//!
//! Spawns random-walking entities on one or more independent maps, ticks them,
//! and reports how much cell and visibility traffic the moves produced. Maps
//! run in parallel since they share no state.

use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use arc_spatial::core::config::GridSettings;
use arc_spatial::core::types::{CellPoint, EntityId, INVALID_CELL};
use arc_spatial::spatial::{BlockMask, Category, EventSink, GridMap, RegionIndex};
use arc_spatial::{AreaPoint, Result};
use clap::Parser;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;

/// Random-walk entities over AOI grids and report event traffic
#[derive(Parser, Debug)]
#[command(name = "aoi_sim")]
#[command(about = "Random-walk entities over AOI grids and report event traffic")]
struct Args {
    /// Map settings (TOML); defaults to a 100x100 grid with 10x10 areas
    #[arg(long)]
    config: Option<PathBuf>,

    /// Entities per map
    #[arg(long, default_value_t = 1000)]
    entities: u64,

    /// Ticks to simulate
    #[arg(long, default_value_t = 100)]
    ticks: u64,

    /// Independent maps to run in parallel
    #[arg(long, default_value_t = 4)]
    maps: u64,

    /// Maximum cells moved per axis per tick
    #[arg(long, default_value_t = 1)]
    step: u32,

    /// Chance per tick that an entity teleports instead of stepping
    #[arg(long, default_value_t = 0.01)]
    teleport_chance: f64,

    /// Random seed for deterministic runs
    #[arg(long)]
    seed: Option<u64>,
}

/// Sink that only counts callbacks
#[derive(Debug, Default)]
struct CountingSink {
    cell_exits: AtomicU64,
    cell_enters: AtomicU64,
    area_exits: AtomicU64,
    area_enters: AtomicU64,
}

impl EventSink for CountingSink {
    fn exit_cell(&self, _: EntityId, _: CellPoint) {
        self.cell_exits.fetch_add(1, Ordering::Relaxed);
    }

    fn enter_cell(&self, _: EntityId, _: CellPoint) {
        self.cell_enters.fetch_add(1, Ordering::Relaxed);
    }

    fn exit_area(&self, _: EntityId, _: EntityId, _: AreaPoint) {
        self.area_exits.fetch_add(1, Ordering::Relaxed);
    }

    fn enter_area(&self, _: EntityId, _: EntityId, _: AreaPoint) {
        self.area_enters.fetch_add(1, Ordering::Relaxed);
    }
}

struct Walker {
    id: EntityId,
    category: Category,
    mask: BlockMask,
    cell: CellPoint,
}

struct MapReport {
    map: u64,
    elapsed: Duration,
    cell_events: u64,
    area_events: u64,
    moves: u64,
    blocked: u64,
    teleports: u64,
    busiest_region: Option<(u32, u32, u32)>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter("arc_spatial=info,aoi_sim=info")
        .init();

    let args = Args::parse();
    let settings = match &args.config {
        Some(path) => GridSettings::load(path)?,
        None => GridSettings::default(),
    };
    // Surface bad settings before spawning worker threads
    settings.validate()?;

    let seed = args.seed.unwrap_or_else(rand::random);
    tracing::info!(
        "aoi_sim: {} maps x {} entities, {} ticks, seed {}",
        args.maps,
        args.entities,
        args.ticks,
        seed
    );

    let reports: Vec<MapReport> = (0..args.maps)
        .into_par_iter()
        .map(|map| run_map(&args, &settings, map, seed.wrapping_add(map)))
        .collect::<Result<_>>()?;

    println!("\n=== AOI Simulation Summary ===");
    for report in &reports {
        println!(
            "Map {:>2}: {:>8.2?} | moves {:>7} | blocked {:>6} | teleports {:>5} | cell events {:>8} | area events {:>9}",
            report.map,
            report.elapsed,
            report.moves,
            report.blocked,
            report.teleports,
            report.cell_events,
            report.area_events
        );
        if let Some((rx, ry, population)) = report.busiest_region {
            println!("        busiest region ({}, {}) holds {} entities", rx, ry, population);
        }
    }

    let total_area: u64 = reports.iter().map(|r| r.area_events).sum();
    let total_moves: u64 = reports.iter().map(|r| r.moves).sum();
    if total_moves > 0 {
        println!(
            "\nArea events per move: {:.2}",
            total_area as f64 / total_moves as f64
        );
    }

    Ok(())
}

fn run_map(args: &Args, settings: &GridSettings, map_id: u64, seed: u64) -> Result<MapReport> {
    let sink = Arc::new(CountingSink::default());
    let mut map = GridMap::from_settings(settings, sink.clone())?;
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let config = *map.config();

    // Scatter some walls so blocking has something to do
    let wall_count = config.cell_count() / 50;
    for _ in 0..wall_count {
        let cell = CellPoint::new(
            rng.gen_range(0..config.cell_width()),
            rng.gen_range(0..config.cell_height()),
        );
        map.set_block(cell, true);
    }

    let mut walkers: Vec<Walker> = Vec::with_capacity(args.entities as usize);
    for i in 0..args.entities {
        let (category, mask) = match i % 3 {
            0 => (Category::Player, BlockMask::DEFAULT),
            1 => (Category::Monster, BlockMask::LOOSE),
            _ => (Category::Item, BlockMask::ITEM),
        };
        let wanted = CellPoint::new(
            rng.gen_range(0..config.cell_width()),
            rng.gen_range(0..config.cell_height()),
        );
        let Some(cell) = map.find_free_cell(wanted, mask) else {
            tracing::warn!(map = map_id, entity = i, "no free cell near {:?}, skipping", wanted);
            continue;
        };
        let id = EntityId(map_id << 32 | i);
        map.move_entity(id, category, INVALID_CELL, cell);
        walkers.push(Walker {
            id,
            category,
            mask,
            cell,
        });
    }

    let mut moves = 0;
    let mut blocked = 0;
    let mut teleports = 0;
    let step = i64::from(args.step);
    let teleport_chance = args.teleport_chance.clamp(0.0, 1.0);
    let start = Instant::now();

    for _ in 0..args.ticks {
        for walker in walkers.iter_mut() {
            if rng.gen_bool(teleport_chance) {
                let target = CellPoint::new(
                    rng.gen_range(0..config.cell_width()),
                    rng.gen_range(0..config.cell_height()),
                );
                if let Some(landing) = map.find_free_cell(target, walker.mask) {
                    map.teleport(walker.id, walker.category, walker.cell, landing);
                    walker.cell = landing;
                    teleports += 1;
                }
                continue;
            }

            let dx = rng.gen_range(-step..=step);
            let dy = rng.gen_range(-step..=step);
            let x = (i64::from(walker.cell.cx) + dx).clamp(0, i64::from(u32::MAX)) as u32;
            let y = (i64::from(walker.cell.cy) + dy).clamp(0, i64::from(u32::MAX)) as u32;
            let target = config.clamp_cell(x, y);
            if target == walker.cell {
                continue;
            }
            if map.test_blocked(target, walker.mask) {
                blocked += 1;
                continue;
            }
            map.move_entity(walker.id, walker.category, walker.cell, target);
            walker.cell = target;
            moves += 1;
        }
    }
    let elapsed = start.elapsed();

    let busiest_region = settings.shard.as_ref().and_then(|strategy| {
        let mut regions: RegionIndex<u32> = RegionIndex::new(&config, strategy);
        for walker in &walkers {
            if let Some(count) = regions.for_cell_mut(walker.cell) {
                *count += 1;
            }
        }
        regions
            .iter()
            .max_by_key(|(_, count)| **count)
            .map(|(region, count)| (region.rx, region.ry, *count))
    });

    debug_assert!(map.areas().check_invariants());
    tracing::info!(map = map_id, ?elapsed, moves, blocked, teleports, "map finished");

    Ok(MapReport {
        map: map_id,
        elapsed,
        cell_events: sink.cell_exits.load(Ordering::Relaxed) + sink.cell_enters.load(Ordering::Relaxed),
        area_events: sink.area_exits.load(Ordering::Relaxed) + sink.area_enters.load(Ordering::Relaxed),
        moves,
        blocked,
        teleports,
        busiest_region,
    })
}
