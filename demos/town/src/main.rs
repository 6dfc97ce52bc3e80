//! town — a morning drive through the sandbox town.
//!
//! One ego vehicle cruises down lane 1 of a straight two-lane road while six
//! scenarios run side by side: a weather change, background traffic and
//! pedestrians, a fire truck blocking the lane until the ego honks, a cut-in
//! from the right-hand lane, and pedestrians standing in the road ahead.
//!
//! Set `RUST_LOG=debug` to see spawns and branch flips.

use std::path::Path;
use std::time::Instant;

use anyhow::Result;
use tracing::info;
use tracing_subscriber::EnvFilter;

use ts_behavior::{LifecycleEvent, Status, render};
use ts_core::{Location, ModelFilter, Rotation, ScenarioId, SimConfig, Tick, Transform};
use ts_output::{CsvWriter, TraceObserver};
use ts_scenario::{
    BackgroundConfig, CutInConfig, ObstructingConfig, Outcome, RoadFriction, RunnerBuilder,
    RunnerObserver, ScenarioKind, ScriptedEgo, StillWalkersConfig, WeatherConfig, WeatherPreset,
};
use ts_world::{SandboxWorldBuilder, World};

// ── Constants ─────────────────────────────────────────────────────────────────

const SEED:                  u64 = 42;
const FIXED_DELTA_SECS:      f32 = 0.05;
const MAX_TICKS:             u64 = 3_600; // 3 simulated minutes
const EGO_SPEED:             f32 = 8.0;   // m/s
const SCENARIO_TIMEOUT_SECS: f64 = 90.0;
const CUT_IN_TIMEOUT_SECS:   f64 = 150.0;
const OUTPUT_DIR:            &str = "output/town";

// ── Observer wrapper to count rows ───────────────────────────────────────────

/// Counts rows and prints outcomes; every hook also reaches `inner`.
struct CountingObserver<O: RunnerObserver> {
    inner:       O,
    status_rows: usize,
    transitions: usize,
}

impl<O: RunnerObserver> CountingObserver<O> {
    fn new(inner: O) -> Self {
        Self { inner, status_rows: 0, transitions: 0 }
    }
}

impl<O: RunnerObserver> RunnerObserver for CountingObserver<O> {
    fn on_tick_start(&mut self, tick: Tick) {
        self.inner.on_tick_start(tick);
    }

    fn on_scenario_status(&mut self, tick: Tick, scenario: ScenarioId, name: &str, status: Status) {
        self.status_rows += 1;
        self.inner.on_scenario_status(tick, scenario, name, status);
    }

    fn on_lifecycle(&mut self, event: &LifecycleEvent) {
        self.transitions += 1;
        self.inner.on_lifecycle(event);
    }

    fn on_scenario_end(&mut self, tick: Tick, scenario: ScenarioId, name: &str, outcome: Outcome) {
        println!("  {tick:>10}  {name:<18} {outcome}");
        self.inner.on_scenario_end(tick, scenario, name, outcome);
    }

    fn on_tick_end(&mut self, tick: Tick, running: usize) {
        self.inner.on_tick_end(tick, running);
    }

    fn on_run_end(&mut self, final_tick: Tick) {
        self.inner.on_run_end(final_tick);
    }
}

// ── main ──────────────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    init_tracing();

    println!("=== town — scenario behavior trees ===");
    println!("Ego: {EGO_SPEED} m/s  |  Ticks: {MAX_TICKS} × {FIXED_DELTA_SECS} s  |  Seed: {SEED}");
    println!();

    // 1. World and ego.
    let config = SimConfig { fixed_delta_secs: FIXED_DELTA_SECS, max_ticks: MAX_TICKS, seed: SEED };
    let world = SandboxWorldBuilder::new(config.seed).ego_route_lane(1).build();
    let start = Transform::new(Location::new(5.0, 0.0, 0.0), Rotation::default());
    // Honk while passing the fire truck.
    let agent = ScriptedEgo::new(EGO_SPEED).honk_between(Tick(120)..Tick(240));

    // 2. Scenarios, ordered along the route.
    let weather = WeatherConfig::preset(WeatherPreset::Overcast).with_road_friction(RoadFriction::WET);
    let traffic = BackgroundConfig { total: 20, ..BackgroundConfig::default() };
    let mut runner = RunnerBuilder::new(config, world)
        .spawn_ego(ModelFilter::parse("vehicle.tesla.model3")?, start)
        .agent(agent)
        .scenario(ScenarioKind::Weather(weather), None)
        .scenario(ScenarioKind::Background(traffic), Some(SCENARIO_TIMEOUT_SECS))
        .scenario(ScenarioKind::Background(BackgroundConfig::pedestrians(10)), Some(SCENARIO_TIMEOUT_SECS))
        .scenario(
            ScenarioKind::Obstructing(ObstructingConfig::firetruck(Location::new(60.0, 0.0, 0.0))),
            Some(SCENARIO_TIMEOUT_SECS),
        )
        .scenario(ScenarioKind::CutIn(CutInConfig::new(Location::new(300.0, 0.0, 0.0))), Some(CUT_IN_TIMEOUT_SECS))
        .scenario(
            ScenarioKind::StillWalkers(StillWalkersConfig::new(Location::new(500.0, 0.0, 0.0))),
            Some(SCENARIO_TIMEOUT_SECS),
        )
        .build()?;
    info!(scenarios = runner.scenarios.len(), actors = runner.registry.len(), "town_ready");

    if let Some(obstructing) = runner.scenarios.get(3) {
        println!("Tree for {}:", obstructing.name);
        println!("{}", render::to_text(obstructing.root()));
    }

    // 3. Output.
    std::fs::create_dir_all(OUTPUT_DIR)?;
    let writer = CsvWriter::new(Path::new(OUTPUT_DIR))?;
    let mut obs = CountingObserver::new(TraceObserver::new(writer).changes_only());

    // 4. Run.
    println!("  {:>10}  {:<18} {}", "Tick", "Scenario", "Outcome");
    println!("  {}", "-".repeat(40));
    let t0 = Instant::now();
    let summary = runner.run(&mut obs)?;
    let elapsed = t0.elapsed();

    if let Some(e) = obs.inner.take_error() {
        eprintln!("output error: {e}");
    }

    // 5. Summary.
    println!();
    println!("Run complete in {:.3} s at {}", elapsed.as_secs_f64(), summary.final_tick);
    for outcome in [Outcome::Success, Outcome::Failure, Outcome::TimedOut, Outcome::Cancelled] {
        println!("  {:<10} {}", outcome.as_str(), summary.count(outcome));
    }
    println!("  destroyed by teardown : {}", summary.destroyed);
    println!("  scenario status ticks : {}", obs.status_rows);
    println!("  lifecycle transitions : {}", obs.transitions);
    println!("  actors left in world  : {}", runner.world.alive_count());
    if let Some(ego) = runner.ego {
        println!("  ego ended at          : {}", runner.world.location(ego)?);
    }

    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();
}
