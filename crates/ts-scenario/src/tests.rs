//! Integration tests for ts-scenario.
//!
//! Every test drives a `SandboxWorld` (two straight 1 km lanes, ego route on
//! lane 1) through a `ScenarioRunner` with 0.1 s ticks.

// ── Helpers ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod helpers {
    use ts_behavior::{Behavior, LifecycleEvent, LifecycleState, Status, TickContext};
    use ts_core::{ActorId, Location, ModelFilter, Rotation, ScenarioId, SimConfig, Tick, Transform};
    use ts_world::{SandboxWorld, SandboxWorldBuilder};

    use crate::{
        ActorLifecycle, Outcome, RetryPolicy, RunnerBuilder, RunnerObserver, ScenarioAssembler,
        ScenarioResult, ScenarioRunner, ScriptedEgo, Spawner,
    };

    pub fn world() -> SandboxWorld {
        SandboxWorldBuilder::new(7).ego_route_lane(1).build()
    }

    pub fn config() -> SimConfig {
        SimConfig { fixed_delta_secs: 0.1, max_ticks: 2_000, seed: 7 }
    }

    pub fn pose(x: f32, y: f32) -> Transform {
        Transform::new(Location::new(x, y, 0.0), Rotation::default())
    }

    pub fn filter(pattern: &str) -> ModelFilter {
        ModelFilter::parse(pattern).unwrap()
    }

    /// Runner without an ego.
    pub fn bare_runner() -> ScenarioRunner<SandboxWorld, ScriptedEgo> {
        RunnerBuilder::new(config(), world()).build().unwrap()
    }

    /// Runner with a parked ego at `(x, 0)` driven by `agent`.
    pub fn runner_with_ego(x: f32, agent: ScriptedEgo) -> ScenarioRunner<SandboxWorld, ScriptedEgo> {
        RunnerBuilder::new(config(), world())
            .spawn_ego(filter("vehicle.tesla.model3"), pose(x, 0.0))
            .agent(agent)
            .build()
            .unwrap()
    }

    /// Three parked vehicles on lane 1.  The one at index `winner` (if any)
    /// succeeds on its main behavior's `after`-th tick; the rest idle.
    pub fn three_vehicles(
        spawner: &mut Spawner<'_>,
        winner:  Option<usize>,
        after:   u32,
    ) -> ScenarioResult<ScenarioAssembler> {
        let mut asm = ScenarioAssembler::new("Three");
        for (i, x) in [100.0, 140.0, 180.0].into_iter().enumerate() {
            let actor = spawner.spawn(&filter("vehicle.audi.a2"), pose(x, 0.0), &RetryPolicy::none())?;
            let main: Box<dyn Behavior> = if winner == Some(i) {
                Box::new(SucceedAfter::new(after))
            } else {
                Box::new(ts_behavior::Idle::new())
            };
            asm = asm.actor(ActorLifecycle::new(actor, false, main));
        }
        Ok(asm)
    }

    pub fn actor_ids(runner: &ScenarioRunner<SandboxWorld, ScriptedEgo>, id: ScenarioId) -> Vec<ActorId> {
        runner.scenario(id).unwrap().actors().iter().map(|a| a.id).collect()
    }

    /// Succeeds on its `n`-th tick.
    pub struct SucceedAfter {
        n:    u32,
        seen: u32,
    }

    impl SucceedAfter {
        pub fn new(n: u32) -> Self {
            Self { n, seen: 0 }
        }
    }

    impl Behavior for SucceedAfter {
        fn name(&self) -> &str {
            "SucceedAfter"
        }

        fn tick(&mut self, _ctx: &mut TickContext<'_>) -> Status {
            self.seen += 1;
            if self.seen >= self.n { Status::Success } else { Status::Running }
        }

        fn reset(&mut self) {
            self.seen = 0;
        }
    }

    #[derive(Default)]
    pub struct Recorder {
        pub events:   Vec<LifecycleEvent>,
        pub ends:     Vec<(Tick, String, Outcome)>,
        pub run_ends: usize,
    }

    impl Recorder {
        /// States `actor` entered, in order.
        pub fn path(&self, actor: ActorId) -> Vec<LifecycleState> {
            self.events.iter().filter(|e| e.actor == actor).map(|e| e.to).collect()
        }
    }

    impl RunnerObserver for Recorder {
        fn on_lifecycle(&mut self, event: &LifecycleEvent) {
            self.events.push(event.clone());
        }

        fn on_scenario_end(&mut self, tick: Tick, _id: ScenarioId, name: &str, outcome: Outcome) {
            self.ends.push((tick, name.to_owned(), outcome));
        }

        fn on_run_end(&mut self, _final_tick: Tick) {
            self.run_ends += 1;
        }
    }

    pub fn approx(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-3
    }
}

// ── Spawning ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod spawn_tests {
    use ts_behavior::LifecycleState;
    use ts_core::{ActorId, ScenarioId, Tick};
    use ts_world::{BatchOptions, World};

    use super::helpers::*;
    use crate::{
        NoopObserver, RetryPolicy, ScenarioAssembler, ScenarioError, UNDERGROUND_Z, spawn_with_retry,
        split_batch,
    };
    use crate::spawn::parse_filters;

    #[test]
    fn retry_moves_along_heading_until_spawn_succeeds() {
        let mut world = world();
        world.fail_next_spawns(3);
        let base = pose(50.0, 0.0);

        let (id, at) = spawn_with_retry(&mut world, &filter("vehicle.audi.a2"), base, &RetryPolicy::default()).unwrap();

        assert_eq!(world.spawn_attempts().len(), 4);
        assert_eq!(at, base.advanced(6.0));
        assert_eq!(world.spawn_attempts()[3], base.advanced(6.0));
        assert!(approx(world.transform(id).unwrap().location.x, 56.0));
    }

    #[test]
    fn retry_gives_up_after_max_attempts() {
        let mut world = world();
        world.fail_next_spawns(10);

        let err = spawn_with_retry(&mut world, &filter("vehicle.audi.a2"), pose(50.0, 0.0), &RetryPolicy::default())
            .unwrap_err();

        assert!(matches!(err, ScenarioError::SpawnFailed { attempts: 10, .. }));
        assert_eq!(world.spawn_attempts().len(), 10);
        assert_eq!(world.alive_count(), 0);
    }

    #[test]
    fn single_attempt_policy_does_not_retry() {
        let mut world = world();
        world.fail_next_spawns(1);

        let err = spawn_with_retry(&mut world, &filter("vehicle.audi.a2"), pose(50.0, 0.0), &RetryPolicy::none())
            .unwrap_err();

        assert!(matches!(err, ScenarioError::SpawnFailed { attempts: 1, .. }));
        assert_eq!(world.spawn_attempts().len(), 1);
    }

    #[test]
    fn split_batch_gives_remainder_to_last() {
        assert_eq!(split_batch(50, 1), vec![50]);
        assert_eq!(split_batch(10, 3), vec![3, 3, 4]);
        assert_eq!(split_batch(2, 3), vec![0, 0, 2]);
        assert!(split_batch(5, 0).is_empty());
    }

    #[test]
    fn unparseable_filters_are_skipped() {
        let filters = parse_filters(&["vehicle.*", "", "truck.*", "walker.*"]);
        let names: Vec<&str> = filters.iter().map(|f| f.as_str()).collect();
        assert_eq!(names, vec!["vehicle.*", "walker.*"]);
    }

    #[test]
    fn spawned_actors_start_hidden_without_physics() {
        let mut runner = bare_runner();
        let id = runner
            .add_scenario_with("Walkers", None, |sp| {
                let walker = sp.spawn(&filter("walker.*"), pose(200.0, 0.0), &RetryPolicy::none())?;
                Ok(ScenarioAssembler::new("Walkers").actor(crate::ActorLifecycle::new(
                    walker,
                    false,
                    Box::new(ts_behavior::Idle::new()),
                )))
            })
            .unwrap();

        let actor = &runner.scenario(id).unwrap().actors()[0];
        let at = runner.world.transform(actor.id).unwrap();
        assert!(approx(at.location.z, actor.pose.location.z - UNDERGROUND_Z));
        assert!(!runner.world.simulate_physics(actor.id).unwrap());
        assert_eq!(runner.registry.state(actor.id), Some(LifecycleState::SpawnedHidden));

        let controller = actor.controller.expect("walker gets a controller");
        assert_eq!(runner.world.walker_controller(actor.id), Some(controller));
        assert!(!runner.world.walker_controller_running(controller).unwrap());
    }

    #[test]
    fn failed_build_destroys_everything_it_spawned() {
        let mut runner = bare_runner();
        let mut spawned = Vec::new();

        let err = runner
            .add_scenario_with("Leaky", None, |sp| {
                sp.spawn(&filter("vehicle.audi.a2"), pose(100.0, 0.0), &RetryPolicy::none())?;
                sp.spawn(&filter("walker.*"), pose(140.0, 0.0), &RetryPolicy::none())?;
                spawned.extend(sp.spawned().iter().map(|a| a.id));
                // No blueprint matches, so this one fails.
                sp.spawn(&filter("vehicle.nonexistent.*"), pose(180.0, 0.0), &RetryPolicy::none())?;
                Ok(ScenarioAssembler::new("Leaky"))
            })
            .unwrap_err();

        assert!(matches!(err, ScenarioError::SpawnFailed { .. }));
        assert!(runner.scenarios.is_empty());
        assert_eq!(runner.world.alive_count(), 0);
        assert_eq!(spawned.len(), 2);
        for id in spawned {
            assert_eq!(runner.registry.state(id), Some(LifecycleState::Removed));
        }
        assert!(runner.registry.actors_of(ScenarioId(0)).iter().all(|a| !runner.world.is_alive(*a)));
    }

    #[test]
    fn batch_cut_short_by_a_registry_error_leaves_nothing_behind() {
        let mut runner = bare_runner();
        // The second id the batch hands out is already taken.
        runner.registry.register(ActorId(1), ScenarioId(99), Tick(0)).unwrap();

        let err = runner
            .add_scenario_with("Batch", None, |sp| {
                sp.spawn_batch(&filter("vehicle.audi.a2"), 3, pose(0.0, 0.0), &BatchOptions::default())?;
                Ok(ScenarioAssembler::new("Batch"))
            })
            .unwrap_err();

        assert!(matches!(err, ScenarioError::Behavior(_)));
        assert!(runner.scenarios.is_empty());
        assert_eq!(runner.world.alive_count(), 0);
        assert_eq!(runner.registry.state(ActorId(0)), Some(LifecycleState::Removed));
    }

    #[test]
    fn empty_scenario_is_a_config_error() {
        let mut runner = bare_runner();
        let err = runner
            .add_scenario_with("Empty", None, |_| Ok(ScenarioAssembler::new("Empty")))
            .unwrap_err();
        assert!(matches!(err, ScenarioError::Config(_)));

        let summary = runner.run(&mut NoopObserver).unwrap();
        assert!(summary.outcomes.is_empty());
    }
}

// ── Lifecycle ─────────────────────────────────────────────────────────────────

#[cfg(test)]
mod lifecycle_tests {
    use ts_behavior::LifecycleState::*;
    use ts_world::World;

    use super::helpers::*;
    use crate::Outcome;

    #[test]
    fn every_actor_walks_the_lifecycle_in_order() {
        let mut runner = bare_runner();
        let id = runner.add_scenario_with("Three", None, |sp| three_vehicles(sp, Some(1), 2)).unwrap();
        let actors = actor_ids(&runner, id);

        let mut rec = Recorder::default();
        let summary = runner.run(&mut rec).unwrap();

        assert_eq!(summary.count(Outcome::Success), 1);
        for actor in actors {
            assert_eq!(rec.path(actor), vec![SpawnedHidden, VisibleIdle, Active, Removed]);
            let froms: Vec<_> = rec.events.iter().filter(|e| e.actor == actor).map(|e| e.from).collect();
            assert_eq!(froms, vec![None, Some(SpawnedHidden), Some(VisibleIdle), Some(Active)]);
        }
        assert_eq!(rec.run_ends, 1);
    }

    #[test]
    fn setup_and_onstart_both_run_on_the_first_tick() {
        let mut runner = bare_runner();
        let id = runner.add_scenario_with("Three", None, |sp| three_vehicles(sp, None, 0)).unwrap();

        runner.run_ticks(1, &mut Recorder::default()).unwrap();

        for actor in runner.scenario(id).unwrap().actors() {
            let at = runner.world.transform(actor.id).unwrap();
            assert!(approx(at.location.z, actor.pose.location.z));
            assert!(runner.world.simulate_physics(actor.id).unwrap());
            // Not autonomous: released with the brake off and no autopilot.
            assert_eq!(runner.registry.state(actor.id), Some(Active));
            assert!(!runner.world.autopilot(actor.id).unwrap());
            assert_eq!(runner.world.control(actor.id).unwrap().brake, 0.0);
        }
    }
}

// ── Assembly and phases ───────────────────────────────────────────────────────

#[cfg(test)]
mod assembler_tests {
    use ts_behavior::{Behavior, LifecycleState, NodeKind};
    use ts_world::World;

    use super::helpers::*;
    use crate::{Outcome, RetryPolicy, ScenarioAssembler};

    #[test]
    fn main_phase_ends_when_any_actor_succeeds_and_teardown_removes_all() {
        let mut runner = bare_runner();
        let id = runner.add_scenario_with("Three", None, |sp| three_vehicles(sp, Some(1), 2)).unwrap();
        let actors = actor_ids(&runner, id);
        let mut rec = Recorder::default();

        runner.run_ticks(1, &mut rec).unwrap();
        assert!(runner.scenario(id).unwrap().is_running());
        assert!(actors.iter().all(|a| runner.world.is_alive(*a)));

        runner.run_ticks(1, &mut rec).unwrap();
        let scenario = runner.scenario(id).unwrap();
        assert_eq!(scenario.outcome(), Some(Outcome::Success));
        assert!(actors.iter().all(|a| !runner.world.is_alive(*a)));
        assert!(actors.iter().all(|a| runner.registry.state(*a) == Some(LifecycleState::Removed)));
        assert_eq!(rec.ends.len(), 1);
        assert_eq!(rec.ends[0].0, ts_core::Tick(1));
    }

    #[test]
    fn root_holds_phases_in_order() {
        let mut runner = bare_runner();
        let id = runner
            .add_scenario_with("Phases", None, |sp| {
                Ok(three_vehicles(sp, None, 0)?.standing(1.0).end_when(ts_behavior::Idle::new()))
            })
            .unwrap();

        let root = runner.scenario(id).unwrap().root();
        assert_eq!(root.kind(), NodeKind::Sequence);
        let names: Vec<String> = root.children().iter().map(|c| c.name().to_owned()).collect();
        assert_eq!(names[0], "Initialization");
        assert_eq!(names[2], "Onstart");
        assert_eq!(names[3], "Main");
        assert_eq!(names[4], "Teardown");
        assert_eq!(names.len(), 5);
    }

    #[test]
    fn standing_delays_onstart() {
        let mut runner = bare_runner();
        let id = runner
            .add_scenario_with("Standing", None, |sp| Ok(three_vehicles(sp, None, 0)?.standing(1.0)))
            .unwrap();
        let first = actor_ids(&runner, id)[0];

        runner.run_ticks(5, &mut Recorder::default()).unwrap();
        assert_eq!(runner.registry.state(first), Some(LifecycleState::VisibleIdle));

        runner.run_ticks(10, &mut Recorder::default()).unwrap();
        assert_eq!(runner.registry.state(first), Some(LifecycleState::Active));
    }

    #[test]
    fn environment_only_scenario_builds() {
        let asm = ScenarioAssembler::new("Env").environment(ts_behavior::Idle::new());
        let root = asm.build().unwrap();
        let names: Vec<String> = root.children().iter().map(|c| c.name().to_owned()).collect();
        assert_eq!(names, vec!["Initialization"]);
    }

    #[test]
    fn reveal_one_by_one_staggers_setups() {
        let mut runner = bare_runner();
        let id = runner
            .add_scenario_with("Reveal", None, |sp| {
                let mut asm = ScenarioAssembler::new("Reveal").reveal_one_by_one(1.0);
                for x in [100.0, 140.0] {
                    let a = sp.spawn(&filter("vehicle.audi.a2"), pose(x, 0.0), &RetryPolicy::none())?;
                    asm = asm.actor(crate::ActorLifecycle::new(a, false, Box::new(ts_behavior::Idle::new())));
                }
                Ok(asm)
            })
            .unwrap();
        let actors = actor_ids(&runner, id);

        runner.run_ticks(1, &mut Recorder::default()).unwrap();
        assert_eq!(runner.registry.state(actors[0]), Some(LifecycleState::VisibleIdle));
        assert_eq!(runner.registry.state(actors[1]), Some(LifecycleState::SpawnedHidden));

        runner.run_ticks(15, &mut Recorder::default()).unwrap();
        assert_eq!(runner.registry.state(actors[1]), Some(LifecycleState::Active));
    }
}

// ── Instances ─────────────────────────────────────────────────────────────────

#[cfg(test)]
mod instance_tests {
    use ts_core::Tick;

    use super::helpers::*;
    use crate::{NoopObserver, Outcome};

    #[test]
    fn teardown_is_idempotent() {
        let mut runner = bare_runner();
        runner.add_scenario_with("Three", None, |sp| three_vehicles(sp, None, 0)).unwrap();
        runner.run_ticks(2, &mut NoopObserver).unwrap();

        let first = runner.scenarios[0].teardown(&mut runner.world, &mut runner.registry, Tick(2));
        let calls = runner.world.destroy_calls();
        let second = runner.scenarios[0].teardown(&mut runner.world, &mut runner.registry, Tick(2));

        assert_eq!(first, 3);
        assert_eq!(second, 0);
        assert_eq!(runner.world.destroy_calls(), calls);
        assert!(runner.scenarios[0].is_torn_down());
    }

    #[test]
    fn teardown_after_tree_destroy_destroys_nothing() {
        let mut runner = bare_runner();
        runner.add_scenario_with("Three", None, |sp| three_vehicles(sp, Some(0), 1)).unwrap();

        let summary = runner.run(&mut NoopObserver).unwrap();

        // The tree's own teardown phase did all three.
        assert_eq!(summary.destroyed, 0);
        assert_eq!(runner.world.destroy_calls(), 3);
        assert_eq!(runner.world.alive_count(), 0);
    }

    #[test]
    fn conclude_keeps_first_outcome() {
        let mut runner = bare_runner();
        runner.add_scenario_with("Three", None, |sp| three_vehicles(sp, None, 0)).unwrap();

        runner.scenarios[0].conclude(Outcome::Failure);
        runner.scenarios[0].conclude(Outcome::Success);

        assert_eq!(runner.scenarios[0].outcome(), Some(Outcome::Failure));
        assert!(!runner.scenarios[0].is_running());
    }

    #[test]
    fn timeout_concludes_and_tears_down() {
        let mut runner = bare_runner();
        runner.add_scenario_with("Slow", Some(1.0), |sp| three_vehicles(sp, None, 0)).unwrap();

        let mut rec = Recorder::default();
        let summary = runner.run(&mut rec).unwrap();

        assert_eq!(summary.count(Outcome::TimedOut), 1);
        assert_eq!(summary.destroyed, 3);
        assert_eq!(runner.world.alive_count(), 0);
        assert!(summary.final_tick <= Tick(12));
        assert_eq!(rec.ends[0].2, Outcome::TimedOut);
    }
}

// ── Catalog ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod catalog_tests {
    use ts_behavior::LifecycleState;
    use ts_core::{ActorKind, Location, Tick};
    use ts_world::{LaneSide, SandboxWorld, World};

    use super::helpers::*;
    use crate::{
        ActorBehavior, BackgroundConfig, CutInConfig, DEFAULT_TRIGGER_DISTANCE, NoopObserver,
        ObstructingConfig, Outcome, RoadFriction, ScenarioError, ScenarioKind, ScenarioRunner,
        ScriptedEgo, SpawnOnTriggerConfig, SpawnStrategy, StartTrigger, StillWalkersConfig,
        WeatherConfig, WeatherPreset,
    };

    #[test]
    fn background_spawns_mixed_batch_and_hands_it_to_autopilot() {
        let mut runner = runner_with_ego(0.0, ScriptedEgo::parked());
        let config = BackgroundConfig {
            models: vec!["vehicle.*".into(), "walker.*".into()],
            total: 6,
            ..BackgroundConfig::default()
        };
        let id = runner.add_scenario(ScenarioKind::Background(config), None).unwrap();

        let actors = runner.scenario(id).unwrap().actors().to_vec();
        assert_eq!(actors.len(), 6);
        assert_eq!(actors.iter().filter(|a| a.kind == ActorKind::Walker).count(), 3);
        assert!(actors.iter().all(|a| a.model != "vehicle.tram.tram"));
        assert!(actors.iter().all(|a| runner.world.rolename(a.id).unwrap() == "background"));

        runner.run_ticks(1, &mut NoopObserver).unwrap();
        for a in &actors {
            assert_eq!(runner.registry.state(a.id), Some(LifecycleState::Active));
            assert_eq!(runner.registry.active_behavior(a.id), Some(format!("HornResume {}", a.id).as_str()));
            match a.controller {
                Some(c) => assert!(runner.world.walker_controller_running(c).unwrap()),
                None => assert!(runner.world.autopilot(a.id).unwrap()),
            }
        }

        let summary = runner.finish(&mut NoopObserver);
        assert_eq!(summary.count(Outcome::Cancelled), 1);
        assert_eq!(summary.destroyed, 6);
        // Only the ego is left.
        assert_eq!(runner.world.alive_count(), 1);
    }

    #[test]
    fn background_batches_never_stack_actors_on_one_spawn_point() {
        let mut runner = runner_with_ego(0.0, ScriptedEgo::parked());
        let ego = runner.ego.unwrap();
        let config = BackgroundConfig {
            models: vec!["vehicle.*".into(), "walker.*".into()],
            total: 120,
            ..BackgroundConfig::default()
        };
        let id = runner.add_scenario(ScenarioKind::Background(config), None).unwrap();

        let actors = runner.scenario(id).unwrap().actors().to_vec();
        // More actors were asked for than there are free spawn points.
        assert!(actors.len() < 120);
        assert!(actors.iter().any(|a| a.kind == ActorKind::Walker));

        let ego_at = runner.world.location(ego).unwrap();
        for (i, a) in actors.iter().enumerate() {
            assert!(a.pose.location.distance_2d(ego_at) >= 2.0, "{} on the ego", a.id);
            for b in &actors[i + 1..] {
                let gap = a.pose.location.distance_2d(b.pose.location);
                assert!(gap >= 2.0, "{} and {} are {gap} m apart", a.id, b.id);
            }
        }
    }

    #[test]
    fn background_with_no_usable_model_fails_cleanly() {
        let mut runner = runner_with_ego(0.0, ScriptedEgo::parked());
        let config = BackgroundConfig { models: vec!["".into(), "truck.*".into()], ..BackgroundConfig::default() };

        let err = runner.add_scenario(ScenarioKind::Background(config), None).unwrap_err();

        assert!(matches!(err, ScenarioError::Config(_)));
        assert_eq!(runner.world.alive_count(), 1);
    }

    #[test]
    fn spawn_on_trigger_waits_along_route_and_pushes() {
        let world = world();
        let kind = ScenarioKind::SpawnOnTrigger(SpawnOnTriggerConfig::new(Location::new(300.0, 0.0, 0.0)));

        let plan = kind.plan(&world).unwrap();

        assert_eq!(plan.start, StartTrigger::AlongRoute { location: Location::new(300.0, 0.0, 0.0), distance: 20.0 });
        match plan.spawn {
            SpawnStrategy::Batch { push: Some(zone), .. } => {
                assert_eq!(zone.radius, 20.0);
                assert_eq!(zone.push, 20.0);
            }
            other => panic!("expected a batch with a push zone, got {other:?}"),
        }
    }

    #[test]
    fn obstructing_placement_faces_across_the_lane() {
        let world = world();
        let plan = ScenarioKind::Obstructing(ObstructingConfig::firetruck(Location::new(0.0, 0.0, 0.0)))
            .plan(&world)
            .unwrap();

        let SpawnStrategy::Placed(placed) = &plan.spawn else { panic!("expected placed actors") };
        assert_eq!(placed.len(), 1);
        let p = &placed[0].pose;
        assert!(approx(p.location.x, 20.0));
        assert!(approx(p.location.y, 0.7));
        assert!(approx(p.location.z, 0.6));
        assert!(approx(p.rotation.yaw, 270.0));
        assert_eq!(plan.start, StartTrigger::Horn { distance: 15.0 });
        assert_eq!(plan.standing_secs, Some(15.0));
        assert_eq!(plan.epilogue, Some(40.0));
    }

    #[test]
    fn off_road_trigger_is_a_config_error() {
        let mut runner = runner_with_ego(0.0, ScriptedEgo::parked());
        let kind = ScenarioKind::Obstructing(ObstructingConfig::vehicle_timer(Location::new(0.0, 50.0, 0.0)));

        let err = runner.add_scenario(kind, None).unwrap_err();

        assert!(matches!(err, ScenarioError::Config(_)));
        assert!(runner.scenarios.is_empty());
        assert_eq!(runner.world.alive_count(), 1);
    }

    #[test]
    fn obstructing_horn_waits_for_honk_then_stops_for_it() {
        let agent = ScriptedEgo::parked().honk_between(Tick(0)..Tick(10_000));
        let mut runner = runner_with_ego(10.0, agent);
        let kind = ScenarioKind::Obstructing(ObstructingConfig::firetruck(Location::new(0.0, 0.0, 0.0)));
        let id = runner.add_scenario(kind, None).unwrap();
        let truck = actor_ids(&runner, id)[0];

        runner.run_ticks(100, &mut NoopObserver).unwrap();
        assert_eq!(runner.registry.state(truck), Some(LifecycleState::VisibleIdle));

        runner.run_ticks(60, &mut NoopObserver).unwrap();
        assert_eq!(runner.registry.state(truck), Some(LifecycleState::Active));
        assert_eq!(runner.registry.active_behavior(truck), Some(format!("HornStop {truck}").as_str()));
        assert!(!runner.world.autopilot(truck).unwrap());

        runner.run_ticks(160, &mut NoopObserver).unwrap();
        assert!(!runner.world.is_alive(truck));
        // The epilogue waits for the parked ego to drive on.
        assert!(runner.scenario(id).unwrap().is_running());

        let summary = runner.finish(&mut NoopObserver);
        assert_eq!(summary.count(Outcome::Cancelled), 1);
        assert_eq!(summary.destroyed, 0);
    }

    #[test]
    fn obstructing_timer_resumes_without_a_horn() {
        let mut runner = runner_with_ego(10.0, ScriptedEgo::parked());
        let kind = ScenarioKind::Obstructing(ObstructingConfig::vehicle_timer(Location::new(0.0, 0.0, 0.0)));
        let id = runner.add_scenario(kind, None).unwrap();
        let car = actor_ids(&runner, id)[0];

        runner.run_ticks(160, &mut NoopObserver).unwrap();

        assert_eq!(runner.registry.state(car), Some(LifecycleState::Active));
        assert_eq!(runner.registry.active_behavior(car), Some(format!("HornResume {car}").as_str()));
        assert!(runner.world.autopilot(car).unwrap());
    }

    #[test]
    fn obstructing_timer_waits_for_the_ego_along_its_route() {
        let mut runner = runner_with_ego(0.0, ScriptedEgo::parked());
        let trigger = Location::new(100.0, 0.0, 0.0);
        let kind = ScenarioKind::Obstructing(ObstructingConfig::vehicle_timer(trigger));
        assert_eq!(
            kind.plan(&runner.world).unwrap().start,
            StartTrigger::AlongRoute { location: trigger, distance: DEFAULT_TRIGGER_DISTANCE }
        );
        let id = runner.add_scenario(kind, None).unwrap();
        let car = actor_ids(&runner, id)[0];

        runner.run_ticks(300, &mut NoopObserver).unwrap();

        assert_eq!(runner.registry.state(car), Some(LifecycleState::VisibleIdle));
        assert!(!runner.world.autopilot(car).unwrap());
    }

    #[test]
    fn cut_in_uses_the_right_hand_lane() {
        let world = world();
        let plan = ScenarioKind::CutIn(CutInConfig::new(Location::new(100.0, 0.0, 0.0))).plan(&world).unwrap();

        let SpawnStrategy::Placed(placed) = &plan.spawn else { panic!("expected placed actors") };
        assert_eq!(placed.len(), 2);
        let (cutter, straight) = (&placed[0], &placed[1]);
        assert!(approx(cutter.pose.location.x, 80.0));
        assert!(approx(cutter.pose.location.y, 3.5));
        assert!(approx(straight.pose.location.x, 70.0));
        match &cutter.behavior {
            ActorBehavior::CutIn(m) => assert_eq!(m.side, Some(LaneSide::Left)),
            other => panic!("expected a cut-in, got {other:?}"),
        }
        assert_eq!(straight.behavior, ActorBehavior::KeepVelocity { speed: 11.0 });
        assert!(!plan.autonomous);
        assert_eq!(
            plan.start,
            StartTrigger::AlongRoute { location: Location::new(100.0, 0.0, 0.0), distance: DEFAULT_TRIGGER_DISTANCE }
        );
    }

    #[test]
    fn cut_in_on_single_lane_road_skips_lane_change() {
        let world = ts_world::SandboxWorldBuilder::new(7)
            .road(ts_world::RoadLayout { lane_count: 1, ..ts_world::RoadLayout::default() })
            .build();
        let plan = ScenarioKind::CutIn(CutInConfig::new(Location::new(100.0, 0.0, 0.0))).plan(&world).unwrap();

        let SpawnStrategy::Placed(placed) = &plan.spawn else { panic!("expected placed actors") };
        assert!(approx(placed[0].pose.location.y, 0.0));
        match &placed[0].behavior {
            ActorBehavior::CutIn(m) => assert_eq!(m.side, None),
            other => panic!("expected a cut-in, got {other:?}"),
        }
    }

    #[test]
    fn cut_in_actors_start_under_scripted_control() {
        let mut runner = runner_with_ego(100.0, ScriptedEgo::parked());
        let id = runner
            .add_scenario(ScenarioKind::CutIn(CutInConfig::new(Location::new(100.0, 0.0, 0.0))), None)
            .unwrap();

        runner.run_ticks(1, &mut NoopObserver).unwrap();

        for a in actor_ids(&runner, id) {
            assert_eq!(runner.registry.state(a), Some(LifecycleState::Active));
            assert!(!runner.world.autopilot(a).unwrap());
        }
    }

    #[test]
    fn cut_in_starts_when_the_ego_arrives_and_completes() {
        let mut runner = runner_with_ego(90.0, ScriptedEgo::new(8.0));
        let ego = runner.ego.unwrap();
        let id = runner
            .add_scenario(ScenarioKind::CutIn(CutInConfig::new(Location::new(100.0, 0.0, 0.0))), None)
            .unwrap();
        let cutter = actor_ids(&runner, id)[0];

        runner.run_ticks(1, &mut NoopObserver).unwrap();
        assert_eq!(runner.registry.state(cutter), Some(LifecycleState::VisibleIdle));

        let mut released_at = None;
        for _ in 0..200 {
            runner.run_ticks(1, &mut NoopObserver).unwrap();
            if runner.registry.state(cutter) == Some(LifecycleState::Active) {
                released_at = Some(runner.world.location(ego).unwrap().x);
                break;
            }
        }
        let released_at = released_at.expect("cut-in never started");
        assert!(released_at >= 95.0, "started with the ego at x={released_at}");

        let summary = runner.run(&mut NoopObserver).unwrap();
        assert_eq!(summary.count(Outcome::Success), 1);
        assert!(!runner.world.is_alive(cutter));
        // Only the ego is left.
        assert_eq!(runner.world.alive_count(), 1);
    }

    #[test]
    fn still_walkers_end_after_the_ego_drives_past_them() {
        let mut runner = runner_with_ego(90.0, ScriptedEgo::new(8.0));
        let ego = runner.ego.unwrap();
        let config = StillWalkersConfig::new(Location::new(100.0, 0.0, 0.0));
        assert_eq!(config.trigger_distance, DEFAULT_TRIGGER_DISTANCE);
        let id = runner.add_scenario(ScenarioKind::StillWalkers(config), None).unwrap();
        let walker = actor_ids(&runner, id)[0];

        let mut closest = f32::INFINITY;
        for _ in 0..600 {
            if !runner.scenario(id).unwrap().is_running() {
                break;
            }
            runner.run_ticks(1, &mut NoopObserver).unwrap();
            if let Ok(d) = runner.world.distance(ego, walker) {
                closest = closest.min(d);
            }
        }

        assert!(closest < 5.0, "ego never came closer than {closest} m");
        assert_eq!(runner.scenario(id).unwrap().outcome(), Some(Outcome::Success));
    }

    #[test]
    fn still_walkers_are_revealed_one_by_one() {
        let mut runner = runner_with_ego(100.0, ScriptedEgo::parked());
        let config = StillWalkersConfig { delta_ys: vec![35.0, 45.0], ..StillWalkersConfig::new(Location::new(100.0, 0.0, 0.0)) };
        let id = runner.add_scenario(ScenarioKind::StillWalkers(config), None).unwrap();
        let walkers = runner.scenario(id).unwrap().actors().to_vec();
        assert_eq!(walkers.len(), 2);
        assert!(walkers.iter().all(|w| w.kind == ActorKind::Walker));

        runner.run_ticks(1, &mut NoopObserver).unwrap();
        let z = |r: &ScenarioRunner<SandboxWorld, ScriptedEgo>, i: usize| {
            r.world.transform(walkers[i].id).unwrap().location.z
        };
        assert!(approx(z(&runner, 0), walkers[0].pose.location.z));
        assert!(z(&runner, 1) < walkers[1].pose.location.z - 400.0);

        runner.run_ticks(24, &mut NoopObserver).unwrap();
        assert!(approx(z(&runner, 1), walkers[1].pose.location.z));
        for w in &walkers {
            assert_eq!(runner.registry.state(w.id), Some(LifecycleState::Active));
            assert!(!runner.world.walker_controller_running(w.controller.unwrap()).unwrap());
        }
    }

    #[test]
    fn still_walkers_need_an_ego() {
        let mut runner = bare_runner();
        let err = runner
            .add_scenario(ScenarioKind::StillWalkers(StillWalkersConfig::new(Location::new(100.0, 0.0, 0.0))), None)
            .unwrap_err();

        assert!(matches!(err, ScenarioError::Config(_)));
        assert_eq!(runner.world.alive_count(), 0);
    }

    #[test]
    fn weather_scenario_applies_once_and_succeeds() {
        let mut runner = bare_runner();
        let config = WeatherConfig::preset(WeatherPreset::HardRain).with_road_friction(RoadFriction::WET);
        runner.add_scenario(ScenarioKind::Weather(config), None).unwrap();

        let summary = runner.run(&mut NoopObserver).unwrap();

        assert_eq!(summary.outcomes[0].1, "WeatherHardRain");
        assert_eq!(summary.count(Outcome::Success), 1);
        assert_eq!(runner.world.weather().precipitation, 80.0);
        assert_eq!(runner.world.weather().cloudiness, 100.0);
        assert_eq!(runner.world.road_friction(), RoadFriction::WET);
    }

    #[test]
    fn custom_weather_keeps_untouched_fields() {
        let mut runner = bare_runner();
        let before = runner.world.weather();
        let config = WeatherConfig::custom("Foggy", [("fog_density", 40.0), ("no_such_field", 1.0)]);
        runner.add_scenario(ScenarioKind::Weather(config), None).unwrap();

        runner.run(&mut NoopObserver).unwrap();

        let after = runner.world.weather();
        assert_eq!(after.fog_density, 40.0);
        assert_eq!(after.cloudiness, before.cloudiness);
        assert_eq!(after.precipitation, before.precipitation);
    }

    #[test]
    fn scenario_names_follow_kind() {
        let at = Location::new(0.0, 0.0, 0.0);
        assert_eq!(ScenarioKind::Obstructing(ObstructingConfig::pedestrian_horn(at)).name(), "ObstructingHorn");
        assert_eq!(ScenarioKind::Obstructing(ObstructingConfig::pedestrian_timer(at)).name(), "ObstructingTimer");
        assert_eq!(ScenarioKind::Weather(WeatherConfig::preset(WeatherPreset::Clear)).name(), "WeatherClear");
        assert_eq!(ScenarioKind::Background(BackgroundConfig::pedestrians(5)).name(), "Background");
    }
}

// ── Runner ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod runner_tests {
    use ts_behavior::{BehaviorError, HORN};
    use ts_core::{ActorId, Tick};
    use ts_world::VehicleControl;

    use super::helpers::*;
    use crate::{
        BackgroundConfig, EgoAgent, EgoCommand, NoopObserver, ObstructingConfig, RunnerBuilder,
        ScenarioError, ScenarioKind, ScriptedEgo,
    };

    #[test]
    fn horn_flag_mirrors_the_agent() {
        let mut runner = runner_with_ego(0.0, ScriptedEgo::parked().honk_between(Tick(2)..Tick(4)));
        runner.add_scenario_with("Three", None, |sp| three_vehicles(sp, None, 0)).unwrap();

        let mut seen = Vec::new();
        for _ in 0..5 {
            runner.run_ticks(1, &mut NoopObserver).unwrap();
            seen.push(runner.blackboard.flag(HORN));
        }

        assert_eq!(seen, vec![false, false, true, true, false]);
        assert_eq!(runner.blackboard.last_write(HORN), Some(Tick(4)));
    }

    #[test]
    fn second_horn_write_in_a_tick_is_rejected() {
        let mut runner = runner_with_ego(0.0, ScriptedEgo::parked());
        let now = runner.clock.current_tick;
        runner.blackboard.set(HORN, true, now).unwrap();

        let err = runner.run_ticks(1, &mut NoopObserver).unwrap_err();

        assert!(matches!(err, ScenarioError::Behavior(BehaviorError::DuplicateWrite { .. })));
    }

    #[test]
    fn no_ego_means_horn_off() {
        let mut runner = bare_runner();
        runner.add_scenario_with("Three", None, |sp| three_vehicles(sp, None, 0)).unwrap();
        runner.run_ticks(3, &mut NoopObserver).unwrap();
        assert!(!runner.blackboard.flag(HORN));
    }

    #[test]
    fn run_stops_at_max_ticks_and_cancels() {
        let mut runner = RunnerBuilder::new(ts_core::SimConfig { max_ticks: 20, ..config() }, world())
            .build()
            .unwrap();
        runner.add_scenario_with("Forever", None, |sp| three_vehicles(sp, None, 0)).unwrap();

        let mut rec = Recorder::default();
        let summary = runner.run(&mut rec).unwrap();

        assert_eq!(summary.final_tick, Tick(20));
        assert_eq!(summary.count(crate::Outcome::Cancelled), 1);
        assert_eq!(summary.destroyed, 3);
        assert_eq!(runner.world.alive_count(), 0);

        // A second finish is a no-op.
        let again = runner.finish(&mut rec);
        assert_eq!(again.destroyed, 3);
        assert_eq!(rec.ends.len(), 1);
    }

    #[test]
    fn scenarios_tick_independently() {
        let mut runner = bare_runner();
        let fast = runner.add_scenario_with("Fast", None, |sp| three_vehicles(sp, Some(0), 1)).unwrap();
        let slow = runner.add_scenario_with("Slow", Some(2.0), |sp| {
            let mut asm = crate::ScenarioAssembler::new("Slow");
            for x in [400.0, 440.0] {
                let a = sp.spawn(&filter("vehicle.ford.crown"), pose(x, 0.0), &crate::RetryPolicy::none())?;
                asm = asm.actor(crate::ActorLifecycle::new(a, false, Box::new(ts_behavior::Idle::new())));
            }
            Ok(asm)
        }).unwrap();

        runner.run_ticks(3, &mut NoopObserver).unwrap();
        assert!(!runner.scenario(fast).unwrap().is_running());
        assert!(runner.scenario(slow).unwrap().is_running());
        assert_eq!(runner.running(), 1);

        let summary = runner.run(&mut NoopObserver).unwrap();
        assert_eq!(summary.outcomes.len(), 2);
        assert_eq!(summary.outcomes[1].2, crate::Outcome::TimedOut);
    }

    #[test]
    fn builder_rejects_unknown_ego() {
        let err = RunnerBuilder::new(config(), world()).ego(ActorId(99)).build().err().unwrap();
        assert!(matches!(err, ScenarioError::World(_)));
    }

    #[test]
    fn builder_fails_when_a_queued_scenario_fails() {
        let result = RunnerBuilder::new(config(), world())
            .spawn_ego(filter("vehicle.tesla.model3"), pose(0.0, 0.0))
            .scenario(ScenarioKind::Background(BackgroundConfig { total: 4, ..BackgroundConfig::default() }), None)
            .scenario(
                ScenarioKind::Obstructing(ObstructingConfig::vehicle_timer(ts_core::Location::new(0.0, 80.0, 0.0))),
                None,
            )
            .build();
        assert!(matches!(result.err(), Some(ScenarioError::Config(_))));
    }

    #[test]
    fn scripted_ego_brakes_when_parked_and_throttles_below_target() {
        let mut world = world();
        let (ego, _) = crate::spawn_with_retry(
            &mut world,
            &filter("vehicle.tesla.model3"),
            pose(0.0, 0.0),
            &crate::RetryPolicy::none(),
        )
        .unwrap();

        let parked = ScriptedEgo::parked().run_step(&world, ego, Tick(0));
        assert_eq!(parked.control, Some(VehicleControl::full_brake()));
        assert!(!parked.horn);

        let cruising = ScriptedEgo::new(8.0).honk_between(Tick(0)..Tick(1)).run_step(&world, ego, Tick(0));
        assert_eq!(cruising.control, Some(VehicleControl::throttle(1.0)));
        assert!(cruising.horn);

        let gone = ScriptedEgo::new(8.0).run_step(&world, ActorId(42), Tick(0));
        assert_eq!(gone, EgoCommand::default());
        assert_eq!(world.alive_count(), 1);
    }
}
