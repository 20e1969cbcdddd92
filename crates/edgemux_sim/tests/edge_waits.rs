//! Edge waits driven through the reference simulator: batching, matching,
//! and exactly-once wake-up.

mod common;

use common::{init_logging, task, tasks, Runtime};
use edgemux_common::{EdgeKind, EdgeValue, Logic};
use edgemux_config::load_config_from_str;
use edgemux_core::EdgeMux;
use edgemux_sim::{RefSim, SimTime, StepResult};

#[test]
fn twenty_waiters_share_three_native_callbacks() {
    init_logging();
    let mut sim = RefSim::new();
    let mut mux = EdgeMux::<RefSim>::with_defaults();
    let mut rt = Runtime::default();
    let clk = sim.add_signal("clk", Logic::Zero).unwrap();
    sim.schedule_clock(clk, SimTime::from_ns(5), 1).unwrap();

    for t in tasks(0..20) {
        mux.add_wait(clk, EdgeKind::Rising, t);
    }
    sim.step(&mut mux, &mut rt).unwrap();

    assert_eq!(sim.registered_callbacks(), 3);
    assert_eq!(sim.removed_callbacks(), 3);
    assert_eq!(sim.active_callbacks(), 0);
    assert_eq!(
        rt.batches,
        vec![tasks(0..8), tasks(8..16), tasks(16..20)],
        "each batch is handed off whole, in registration order"
    );
    assert_eq!(mux.id_pool().in_use_count(), 0);
    assert_eq!(mux.stats().batched_registrations, 3);
}

#[test]
fn lone_waiters_take_the_single_task_path() {
    let mut sim = RefSim::new();
    let mut mux = EdgeMux::<RefSim>::with_defaults();
    let mut rt = Runtime::default();
    let clk = sim.add_signal("clk", Logic::Zero).unwrap();
    let rst = sim.add_signal("rst", Logic::One).unwrap();
    sim.schedule_clock(clk, SimTime::from_ns(5), 1).unwrap();
    sim.schedule(SimTime::from_ns(5), rst, Logic::Zero).unwrap();

    for t in tasks(0..9) {
        mux.add_wait(clk, EdgeKind::Rising, t);
    }
    mux.add_wait(rst, EdgeKind::Falling, task(100));
    sim.step(&mut mux, &mut rt).unwrap();

    let mut sizes = rt.batch_sizes();
    sizes.sort_unstable();
    assert_eq!(sizes, vec![1, 1, 8]);
    assert_eq!(mux.stats().registrations, 3);
    assert_eq!(mux.stats().batched_registrations, 1);
}

#[test]
fn rising_falling_and_either_wake_on_their_own_edges() {
    let mut sim = RefSim::new();
    let mut mux = EdgeMux::<RefSim>::with_defaults();
    let mut rt = Runtime::default();
    let clk = sim.add_signal("clk", Logic::Zero).unwrap();
    sim.schedule_clock(clk, SimTime::from_ns(5), 1).unwrap();

    for t in tasks(0..3) {
        mux.add_wait(clk, EdgeKind::Rising, t);
    }
    for t in tasks(10..15) {
        mux.add_wait(clk, EdgeKind::Falling, t);
    }
    mux.add_wait(clk, EdgeKind::Either, task(20));

    sim.step(&mut mux, &mut rt).unwrap();
    let mut rising = rt.take_woken();
    rising.sort();
    assert_eq!(rising, vec![task(0), task(1), task(2), task(20)]);
    assert_eq!(sim.active_callbacks(), 1);
    assert_eq!(sim.conditions_on(clk), vec![EdgeValue::Low]);

    sim.step(&mut mux, &mut rt).unwrap();
    assert_eq!(rt.take_woken(), tasks(10..15));
    assert_eq!(sim.active_callbacks(), 0);
}

#[test]
fn rearmed_task_wakes_once_per_edge() {
    let mut sim = RefSim::new();
    let mut mux = EdgeMux::<RefSim>::with_defaults();
    let mut rt = Runtime::default();
    let clk = sim.add_signal("clk", Logic::Zero).unwrap();
    sim.schedule_clock(clk, SimTime::from_ns(5), 10).unwrap();

    let mut wakes = 0;
    mux.add_wait(clk, EdgeKind::Rising, task(1));
    loop {
        for t in rt.take_woken() {
            wakes += 1;
            mux.add_wait(clk, EdgeKind::Rising, t);
        }
        if sim.step(&mut mux, &mut rt).unwrap() == StepResult::Done {
            break;
        }
    }

    assert_eq!(wakes, 10);
    assert_eq!(mux.stats().fired, 10);
    assert!(sim.active_callbacks() <= 1);
    assert!(mux.stats().ignored >= 9, "falling edges are seen and ignored");
}

#[test]
fn unknown_values_do_not_match_rising_or_falling() {
    let mut sim = RefSim::new();
    let mut mux = EdgeMux::<RefSim>::with_defaults();
    let mut rt = Runtime::default();
    let sig = sim.add_signal("data", Logic::One).unwrap();
    sim.schedule(SimTime::from_ns(1), sig, Logic::X).unwrap();
    sim.schedule(SimTime::from_ns(2), sig, Logic::Z).unwrap();

    mux.add_wait(sig, EdgeKind::Falling, task(1));
    mux.add_wait(sig, EdgeKind::Either, task(2));
    sim.run(&mut mux, &mut rt).unwrap();

    assert_eq!(rt.woken(), vec![task(2)]);
    assert_eq!(sim.active_callbacks(), 1);
}

#[test]
fn unknown_values_resolve_to_zero_when_configured() {
    let config = load_config_from_str("[values]\nresolve_x_as_zero = true\n").unwrap();
    let mut sim = RefSim::new();
    let mut mux = EdgeMux::<RefSim>::new(&config);
    let mut rt = Runtime::default();
    let sig = sim.add_signal("data", Logic::One).unwrap();
    sim.schedule(SimTime::from_ns(1), sig, Logic::X).unwrap();

    mux.add_wait(sig, EdgeKind::Falling, task(1));
    sim.run(&mut mux, &mut rt).unwrap();

    assert_eq!(rt.woken(), vec![task(1)]);
    assert_eq!(sim.active_callbacks(), 0);
}

#[test]
fn shuffled_pool_wakes_every_task_exactly_once() {
    let config = load_config_from_str(
        r#"
[batching]
min_arity = 3
max_arity = 5

[pool]
capacity = 64
shuffle = true
seed = 7
"#,
    )
    .unwrap();
    let mut sim = RefSim::new();
    let mut mux = EdgeMux::<RefSim>::new(&config);
    let mut rt = Runtime::default();
    let a = sim.add_signal("a", Logic::Zero).unwrap();
    let b = sim.add_signal("b", Logic::Zero).unwrap();
    sim.schedule_clock(a, SimTime::from_ns(5), 2).unwrap();
    sim.schedule_clock(b, SimTime::from_ns(3), 2).unwrap();

    let kinds = [EdgeKind::Rising, EdgeKind::Falling, EdgeKind::Either];
    for (i, t) in tasks(0..60).into_iter().enumerate() {
        let signal = if i % 2 == 0 { a } else { b };
        mux.add_wait(signal, kinds[i % 3], t);
    }
    sim.run(&mut mux, &mut rt).unwrap();

    assert_eq!(rt.woken(), tasks(0..60));
    assert!(rt.batch_sizes().iter().all(|&n| (1..=5).contains(&n)));
    assert_eq!(sim.active_callbacks(), 0);
    assert_eq!(mux.id_pool().in_use_count(), 0);
}

#[test]
fn waits_added_mid_run_are_flushed_at_the_next_step() {
    let mut sim = RefSim::new();
    let mut mux = EdgeMux::<RefSim>::with_defaults();
    let mut rt = Runtime::default();
    let clk = sim.add_signal("clk", Logic::Zero).unwrap();
    sim.schedule_clock(clk, SimTime::from_ns(5), 4).unwrap();

    sim.run_until(&mut mux, &mut rt, SimTime::from_ns(12)).unwrap();
    assert_eq!(sim.current_time(), SimTime::from_ns(10));

    for t in tasks(0..4) {
        mux.add_wait(clk, EdgeKind::Falling, t);
    }
    assert_eq!(mux.pending_len(), 4);
    sim.run_until(&mut mux, &mut rt, SimTime::from_ns(15)).unwrap();
    assert!(rt.batches.is_empty(), "no falling edge at 15 ns");
    assert_eq!(sim.active_callbacks(), 1);

    sim.run_until(&mut mux, &mut rt, SimTime::from_ns(20)).unwrap();
    assert_eq!(rt.batches, vec![tasks(0..4)]);
}
