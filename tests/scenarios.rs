// tests/scenarios.rs

use paint_buffer_sim::model::network::PlacementOutcome;
use paint_buffer_sim::strategy::placement::{OptimizedPlacement, RoundRobinPlacement};
use paint_buffer_sim::strategy::traits::PlacementPolicy;
use paint_buffer_sim::{
    Arrivals, BlockKind, BufferNetwork, Color, Group, GroupConfig, LineId, Simulation,
    SimulationConfig, Strategy, Vehicle,
};

fn plant_network() -> BufferNetwork {
    BufferNetwork::new(
        GroupConfig {
            lines: 4,
            capacity: 14,
        },
        GroupConfig {
            lines: 5,
            capacity: 16,
        },
    )
}

fn seeded(strategy: Strategy, seed: u64) -> Simulation {
    Simulation::new(
        SimulationConfig::default()
            .with_strategy(strategy)
            .with_seed(seed),
    )
    .unwrap()
}

#[test]
fn lines_never_exceed_capacity() {
    for strategy in [Strategy::Optimized, Strategy::RoundRobin] {
        let mut sim = seeded(strategy, 17);
        for _ in 0..1500 {
            sim.run(1);
            for line in sim.network().lines() {
                assert!(line.len() <= line.capacity(), "{} over capacity", line.id());
            }
        }
    }
}

#[test]
fn blocked_lines_are_respected() {
    for strategy in [Strategy::Optimized, Strategy::RoundRobin] {
        let mut sim = seeded(strategy, 5);
        sim.set_block(LineId(1), BlockKind::Input, true).unwrap();
        sim.set_block(LineId(6), BlockKind::Output, true).unwrap();

        sim.run(400);

        assert!(sim.network().lines()[1].is_empty());
        assert!(sim
            .conveyor_sequence()
            .iter()
            .all(|entry| entry.line != LineId(6)));
    }
}

#[test]
fn reset_twice_gives_the_same_empty_state() {
    let config = SimulationConfig::default().with_seed(99);
    let mut sim = Simulation::new(config.clone()).unwrap();
    sim.set_block(LineId(2), BlockKind::Input, true).unwrap();
    sim.set_block(LineId(7), BlockKind::Output, true).unwrap();
    sim.run(37);

    sim.reset(config.clone()).unwrap();
    let first_snapshot = sim.snapshot();
    let first_metrics = sim.metrics();

    sim.reset(config).unwrap();
    let second_snapshot = sim.snapshot();
    let second_metrics = sim.metrics();

    assert_eq!(first_snapshot, second_snapshot);
    assert_eq!(first_metrics, second_metrics);

    for line in &second_snapshot.lines {
        assert!(line.colors.is_empty(), "{} not empty", line.name);
        assert!(!line.input_blocked && !line.output_blocked);
    }
    assert!(second_snapshot.temporary.is_empty());
    assert_eq!(second_snapshot.last_color, None);
    assert!(!second_snapshot.second_group_stopped);

    assert_eq!(second_metrics.generated, 0);
    assert_eq!(second_metrics.extracted, 0);
    assert_eq!(second_metrics.overflows, 0);
    assert_eq!(sim.cycle(), 0);
}

#[test]
fn reset_replays_the_same_run_for_a_seed() {
    let config = SimulationConfig::default().with_seed(99);

    let mut fresh = Simulation::new(config.clone()).unwrap();
    fresh.run(150);

    let mut reused = Simulation::new(config.clone()).unwrap();
    reused.run(37);
    reused.reset(config).unwrap();
    reused.run(150);

    assert_eq!(fresh.snapshot(), reused.snapshot());
    assert_eq!(fresh.metrics(), reused.metrics());
}

#[test]
fn every_body_is_accounted_for() {
    for strategy in [Strategy::Optimized, Strategy::RoundRobin] {
        let mut sim = seeded(strategy, 3);
        for _ in 0..600 {
            sim.run(1);
            let counters = sim.counters();
            let held = sim.network().temporary().len() as u64;
            assert_eq!(
                counters.generated,
                counters.on_lines() + held + counters.overflows
            );
            assert_eq!(
                counters.on_lines(),
                counters.extracted + sim.network().occupancy() as u64
            );
        }
    }
}

#[test]
fn changeovers_match_adjacent_color_changes() {
    let mut sim = seeded(Strategy::Optimized, 8);
    sim.run(500);

    let colors: Vec<Color> = sim.conveyor_sequence().iter().map(|e| e.color).collect();
    let expected = colors.windows(2).filter(|w| w[0] != w[1]).count() as u64;
    assert_eq!(sim.metrics().changeovers, expected);
}

#[test]
fn single_color_packs_one_line_at_a_time() {
    let mut network = plant_network();
    let mut policy = OptimizedPlacement::new();
    let mut outcomes = Vec::new();

    for seq in 0..200 {
        let vehicle = Vehicle::new(seq, Color::C4, Group::First);
        outcomes.push(policy.place(&mut network, vehicle));

        if seq == 13 {
            let lens: Vec<usize> = network.lines().iter().map(|l| l.len()).collect();
            assert_eq!(lens, vec![14, 0, 0, 0, 0, 0, 0, 0, 0]);
        }
    }

    // The first 56 bodies fill the first group in line order without a spill.
    for (i, outcome) in outcomes.iter().take(56).enumerate() {
        assert_eq!(
            *outcome,
            PlacementOutcome::Placed {
                line: LineId(i / 14),
                spilled: false
            }
        );
    }
    // Only then does the first group spill, and the second group fills up.
    assert!(outcomes[56..136].iter().all(|o| o.is_spill()));
    assert!(outcomes[136..]
        .iter()
        .all(|o| *o == PlacementOutcome::Overflow));
    assert!(network.lines().iter().all(|l| l.is_full()));
}

#[test]
fn first_group_fully_blocked_overflows_once() {
    let mut sim = seeded(Strategy::RoundRobin, 1);
    for line in 0..4 {
        sim.set_block(LineId(line), BlockKind::Input, true).unwrap();
    }

    let record = sim
        .run_cycle_with(Arrivals {
            first: Color::C1,
            second: Color::C2,
        })
        .unwrap()
        .clone();

    assert_eq!(
        record.first.map(|p| p.outcome),
        Some(PlacementOutcome::Overflow)
    );
    assert!(matches!(
        record.second.map(|p| p.outcome),
        Some(PlacementOutcome::Placed { .. })
    ));
    assert_eq!(sim.counters().overflows, 1);
}

#[test]
fn held_bodies_drain_oldest_first() {
    let mut sim = seeded(Strategy::Optimized, 1);
    for line in 0..4 {
        sim.set_block(LineId(line), BlockKind::Input, true).unwrap();
    }

    // Every first-oven body spills, which keeps the second oven's bodies held.
    for second in [Color::C2, Color::C3, Color::C4] {
        let record = sim
            .run_cycle_with(Arrivals {
                first: Color::C1,
                second,
            })
            .unwrap();
        assert!(record.first.unwrap().outcome.is_spill());
        assert_eq!(
            record.second.map(|p| p.outcome),
            Some(PlacementOutcome::PlacedTemporary)
        );
    }
    assert_eq!(
        sim.snapshot().temporary,
        vec![Color::C2, Color::C3, Color::C4]
    );

    for line in 0..4 {
        sim.set_block(LineId(line), BlockKind::Input, false).unwrap();
    }
    let record = sim
        .run_cycle_with(Arrivals {
            first: Color::C1,
            second: Color::C5,
        })
        .unwrap()
        .clone();

    assert_eq!(record.drained.len(), 1);
    assert_eq!(record.drained[0].vehicle.color, Color::C2);
    assert_eq!(record.drained[0].vehicle.sequence, 2);
    // Held bodies keep their place ahead of the new arrival.
    assert_eq!(
        sim.snapshot().temporary,
        vec![Color::C3, Color::C4, Color::C5]
    );

    let drained = sim.drain_temporary();
    let order: Vec<u64> = drained.iter().map(|d| d.vehicle.sequence).collect();
    assert_eq!(order, vec![4, 6, 8]);
    assert!(sim.network().temporary().is_empty());
}

#[test]
fn stopped_second_group_holds_then_drains_in_order() {
    let mut network = plant_network();
    let mut policy = OptimizedPlacement::new();
    network.set_second_group_stopped(true);

    for (seq, color) in [(1, Color::C7), (2, Color::C8)] {
        let outcome = policy.place(&mut network, Vehicle::new(seq, color, Group::Second));
        assert_eq!(outcome, PlacementOutcome::PlacedTemporary);
    }
    assert!(network.group_lines(Group::Second).iter().all(|l| l.is_empty()));

    network.set_second_group_stopped(false);
    let drained = policy.drain(&mut network, usize::MAX);
    let order: Vec<u64> = drained.iter().map(|d| d.vehicle.sequence).collect();
    assert_eq!(order, vec![1, 2]);
    assert!(network.temporary().is_empty());

    let outcome = policy.place(&mut network, Vehicle::new(3, Color::C7, Group::Second));
    assert!(matches!(outcome, PlacementOutcome::Placed { spilled: false, .. }));
}

#[test]
fn round_robin_spreads_bodies_evenly() {
    let mut network = plant_network();
    let mut policy = RoundRobinPlacement::new();

    for seq in 0..23 {
        let color = Color::ALL[seq as usize % Color::COUNT];
        let outcome = policy.place(&mut network, Vehicle::new(seq, color, Group::Second));
        assert!(matches!(outcome, PlacementOutcome::Placed { spilled: false, .. }));
    }

    let lens: Vec<usize> = network
        .group_lines(Group::Second)
        .iter()
        .map(|l| l.len())
        .collect();
    assert_eq!(lens.iter().sum::<usize>(), 23);
    assert!(lens.iter().all(|&n| n == 4 || n == 5), "{:?}", lens);
    assert!(network.group_lines(Group::First).iter().all(|l| l.is_empty()));
}

#[test]
fn optimized_beats_round_robin_on_changeovers() {
    for seed in [1, 2, 3] {
        let mut optimized = seeded(Strategy::Optimized, seed);
        let mut baseline = seeded(Strategy::RoundRobin, seed);
        optimized.run(400);
        baseline.run(400);
        assert!(optimized.metrics().changeovers < baseline.metrics().changeovers);
    }
}
