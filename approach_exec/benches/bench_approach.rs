//! # Approach Cycle Benchmark

use criterion::{criterion_group, criterion_main, Criterion};

use approach_lib::{
    approach_ctrl::{tick, ControlSample, ControllerState, Params as CtrlParams},
    obj_loc::{ObjLoc, Params as LocParams},
    sim::{SimParams, SimScene},
};
use comms_if::eqpt::FrameSource;

fn approach_benchmark(c: &mut Criterion) {
    // ---- Build a scene with the target in view ----

    let mut sim_params = SimParams::default();
    sim_params.provide_lidar = true;
    let mut sim = SimScene::new(sim_params).unwrap();
    let frame = sim.acquire().unwrap();

    let mut obj_loc = ObjLoc::new(LocParams::default()).unwrap();
    let ctrl_params = CtrlParams::default();

    // Bench rendering a frame
    c.bench_function("SimScene::acquire", |b| b.iter(|| sim.acquire().unwrap()));

    // Bench locating the target
    c.bench_function("ObjLoc::locate", |b| {
        b.iter(|| obj_loc.locate(&frame).unwrap())
    });

    // Bench a single controller tick
    let mut state = ControllerState::default();
    let sample = Some(ControlSample::new(35.0, 120.0));
    c.bench_function("approach_ctrl::tick", |b| {
        b.iter(|| tick(&mut state, &ctrl_params, sample, 0.05).unwrap())
    });

    // Bench the full locate and control cycle
    let mut state = ControllerState::default();
    c.bench_function("locate_and_tick", |b| {
        b.iter(|| {
            let sample = obj_loc.locate(&frame).unwrap();
            tick(&mut state, &ctrl_params, sample, 0.05).unwrap()
        })
    });
}

criterion_group!(benches, approach_benchmark);
criterion_main!(benches);
