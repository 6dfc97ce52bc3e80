//! Unit tests for ts-core primitives.

#[cfg(test)]
mod ids {
    use crate::{ActorId, ScenarioId};

    #[test]
    fn unassigned_handles_are_invalid() {
        assert!(!ActorId::default().is_valid());
        assert!(!ScenarioId::default().is_valid());
        assert!(ActorId(0).is_valid());
        assert_eq!(ScenarioId(4).index(), 4);
    }

    #[test]
    fn display_names_the_kind() {
        assert_eq!(ActorId(7).to_string(), "ActorId(7)");
        assert_eq!(ScenarioId(2).to_string(), "ScenarioId(2)");
    }
}

#[cfg(test)]
mod geo {
    use crate::geo::{heading, relative_to_absolute};
    use crate::{Location, Rotation, Transform};

    #[test]
    fn distance_is_euclidean() {
        let a = Location::new(0.0, 0.0, 0.0);
        let b = Location::new(3.0, 4.0, 0.0);
        assert!((a.distance(b) - 5.0).abs() < 1e-5);
        assert!((a.distance_2d(b.with_z_offset(-500.0)) - 5.0).abs() < 1e-5);
    }

    #[test]
    fn advanced_moves_along_yaw() {
        let t = Transform::new(Location::ORIGIN, Rotation::from_yaw(90.0));
        let moved = t.advanced(10.0);
        assert!(moved.location.x.abs() < 1e-4);
        assert!((moved.location.y - 10.0).abs() < 1e-4);
    }

    #[test]
    fn shifted_right_is_perpendicular() {
        let t = Transform::new(Location::ORIGIN, Rotation::from_yaw(0.0));
        let moved = t.shifted_right(3.5);
        assert!(moved.location.x.abs() < 1e-4);
        assert!((moved.location.y - 3.5).abs() < 1e-4);
    }

    #[test]
    fn hide_offset_only_touches_z() {
        let t = Transform::new(Location::new(1.0, 2.0, 0.5), Rotation::from_yaw(12.0));
        let hidden = t.with_z_offset(-500.0);
        assert_eq!(hidden.location.x, 1.0);
        assert_eq!(hidden.location.z, -499.5);
        assert_eq!(hidden.rotation, t.rotation);
    }

    #[test]
    fn compass_headings() {
        assert_eq!(heading(0.0), "N");
        assert_eq!(heading(45.0), "NE");
        assert_eq!(heading(90.0), "E");
        assert_eq!(heading(180.0), "S");
        assert_eq!(heading(225.0), "SW");
        assert_eq!(heading(-90.0), "W");
    }

    #[test]
    fn relative_offsets_rotate_with_heading() {
        let (x, y) = relative_to_absolute(0.0, 0.0, 35.0);
        assert!((x - 35.0).abs() < 1e-4 && y.abs() < 1e-4);

        let (x, y) = relative_to_absolute(90.0, 0.0, 10.0);
        assert!(x.abs() < 1e-4 && (y - 10.0).abs() < 1e-4);
    }
}

#[cfg(test)]
mod time {
    use crate::{SimClock, SimConfig, Tick};

    #[test]
    fn since_saturates() {
        assert_eq!(Tick(15).since(Tick(10)), 5);
        assert_eq!(Tick(3).since(Tick(10)), 0);
        assert_eq!(Tick(3).next(), Tick(4));
    }

    #[test]
    fn clock_elapsed() {
        let mut clock = SimClock::new(0.5);
        assert_eq!(clock.elapsed_secs(), 0.0);
        clock.advance();
        clock.advance();
        assert_eq!(clock.current_tick, Tick(2));
        assert!((clock.elapsed_secs() - 1.0).abs() < 1e-9);
        assert_eq!(clock.to_string(), "T2 @ 1.00s");
    }

    #[test]
    fn sim_config_end_tick() {
        let cfg = SimConfig { fixed_delta_secs: 0.1, max_ticks: 600, seed: 1 };
        assert_eq!(cfg.end_tick(), Tick(600));
        assert_eq!(cfg.make_clock().fixed_delta_secs, 0.1);
    }
}

#[cfg(test)]
mod rng {
    use crate::SimRng;

    #[test]
    fn same_seed_same_picks() {
        let models = ["vehicle.audi.a2", "vehicle.bmw.grandtourer", "vehicle.tesla.model3", "walker.pedestrian.0001"];
        let mut a = SimRng::new(12345);
        let mut b = SimRng::new(12345);
        for _ in 0..100 {
            assert_eq!(a.pick(&models), b.pick(&models));
        }
    }

    #[test]
    fn same_seed_same_shuffle() {
        let mut a: Vec<u32> = (0..50).collect();
        let mut b = a.clone();
        SimRng::new(7).shuffle(&mut a);
        SimRng::new(7).shuffle(&mut b);
        assert_eq!(a, b);

        let mut c: Vec<u32> = (0..50).collect();
        SimRng::new(8).shuffle(&mut c);
        assert_ne!(a, c);
    }

    #[test]
    fn pick_from_nothing_is_none() {
        let mut rng = SimRng::new(0);
        let empty: [&str; 0] = [];
        assert!(rng.pick(&empty).is_none());
        assert_eq!(rng.pick(&["vehicle.audi.a2"]), Some(&"vehicle.audi.a2"));
    }

    #[test]
    fn shuffle_keeps_every_item() {
        let mut rng = SimRng::new(9);
        let mut points: Vec<u32> = (0..20).collect();
        rng.shuffle(&mut points);
        points.sort_unstable();
        assert_eq!(points, (0..20).collect::<Vec<_>>());
    }
}

#[cfg(test)]
mod actor {
    use crate::{ActorKind, ModelFilter};

    #[test]
    fn kind_from_model_prefix() {
        assert_eq!(ActorKind::from_model("vehicle.tesla.model3"), Some(ActorKind::Vehicle));
        assert_eq!(ActorKind::from_model("walker.pedestrian.0001"), Some(ActorKind::Walker));
        assert_eq!(ActorKind::from_model("controller.ai.walker"), Some(ActorKind::WalkerController));
        assert_eq!(ActorKind::from_model("sensor.camera.rgb"), None);
    }

    #[test]
    fn filter_wildcards() {
        let f = ModelFilter::parse("vehicle.*").unwrap();
        assert!(f.matches("vehicle.tesla.model3"));
        assert!(!f.matches("walker.pedestrian.0001"));

        let f = ModelFilter::parse("vehicle.*.crown").unwrap();
        assert!(f.matches("vehicle.ford.crown"));
        assert!(!f.matches("vehicle.ford.mustang"));

        let any = ModelFilter::parse("*").unwrap();
        assert!(any.matches("walker.pedestrian.0001"));
        assert_eq!(any.kind(), None);

        let one_of = ModelFilter::parse("walker.pedestrian.000[12]").unwrap();
        assert!(one_of.matches("walker.pedestrian.0002"));
        assert!(!one_of.matches("walker.pedestrian.0003"));
        assert_eq!(one_of.to_string(), "walker.pedestrian.000[12]");
    }

    #[test]
    fn malformed_filters_rejected() {
        assert!(ModelFilter::parse("").is_err());
        assert!(ModelFilter::parse("vehicle .*").is_err());
        assert!(ModelFilter::parse("spaceship.*").is_err());
        assert!(ModelFilter::parse("vehicle.ford.[crown").is_err());
    }
}
