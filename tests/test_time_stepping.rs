use russell_lab::approx_eq;
use tpflow::prelude::*;

// TEST GOAL
//
// This test verifies the time stepper over the full reference duration (T = 200 Δt)
// on a coarse mesh, the bounds of the saturation, and the local mass conservation.
//
// MESH
//
// Unit square with 4 × 4 rectangles, each split into two Tri3
//
// BOUNDARY CONDITIONS
//
// Reference: pressure p = 1 - x on all sides and saturation s = 1 - x on the left side

#[test]
fn test_time_stepping_completes_200_steps() -> Result<(), SimError> {
    let mesh = SampleMeshes::unit_square(4, 4);
    let config = Config::new();
    assert_eq!(config.n_time_steps(), 200);
    let fem = FemMesh::new(&mesh, &config)?;
    let policy = BoundaryPolicy::reference();
    let mut state = FemState::new(&fem);
    let mut stepper = TimeStepper::new(&fem, &config, &policy)?;
    let mut recorder = SnapshotRecorder::new();
    stepper.run(&mut state, &mut recorder)?;

    // steps
    assert_eq!(stepper.status(), StepperStatus::Completed);
    assert_eq!(stepper.summaries.len(), 200);
    assert_eq!(recorder.all.len(), 200);
    assert!(recorder.finished);
    approx_eq(state.t, 2.0, 1e-14);
    for (k, summary) in stepper.summaries.iter().enumerate() {
        assert_eq!(summary.timestep, k + 1);
        assert!(summary.iterations <= config.n_max_iterations);
    }
    for pair in recorder.all.windows(2) {
        assert!(pair[1].t > pair[0].t);
    }

    // the divergence vanishes in every cell
    let post = PostProc::new(&fem);
    for div in post.cell_divergence_integrals(&state) {
        assert!(f64::abs(div) < 1e-8);
    }

    // the saturation stays within [-δ, 1 + δ]
    let delta = 0.3;
    let (s_min, s_max) = post.saturation_range(&state);
    println!("saturation range = [{:?}, {:?}]", s_min, s_max);
    assert!(s_min >= -delta);
    assert!(s_max <= 1.0 + delta);

    // the water has advanced into the domain
    assert!(s_max > 0.1);
    Ok(())
}

#[test]
fn test_time_stepping_with_upwind_options() -> Result<(), SimError> {
    let mesh = SampleMeshes::unit_square(6, 6);
    let mut config = Config::new();
    config
        .set_dt(0.02)
        .set_t_fin(0.2)
        .set_stabilization(Stabilization::StreamlineUpwind)
        .set_inflow(InflowMode::Upwind)
        .set_parallel_assembly(true);
    let fem = FemMesh::new(&mesh, &config)?;
    let policy = BoundaryPolicy::reference();
    let mut state = FemState::new(&fem);
    let mut stepper = TimeStepper::new(&fem, &config, &policy)?;
    let mut recorder = SnapshotRecorder::new();
    stepper.run(&mut state, &mut recorder)?;
    assert_eq!(stepper.status(), StepperStatus::Completed);
    assert_eq!(stepper.summaries.len(), 10);

    let post = PostProc::new(&fem);
    assert!(post.boundary_flux(&state, Segment::Left) < 0.0);
    assert!(post.boundary_flux(&state, Segment::Right) > 0.0);
    assert!(f64::abs(post.total_divergence(&state)) < 1e-8);
    let (s_min, s_max) = post.saturation_range(&state);
    assert!(s_min >= -0.3);
    assert!(s_max <= 1.3);
    assert!(s_max > 0.0);
    Ok(())
}

#[test]
fn test_time_stepping_with_no_flow_walls() -> Result<(), SimError> {
    // pressure on the left and right sides; u·n = 0 on the bottom and top sides
    let mesh = SampleMeshes::unit_square(4, 4);
    let mut config = Config::new();
    config.set_t_fin(0.05).set_permeability(Permeability::Isotropic(1.0));
    let fem = FemMesh::new(&mesh, &config)?;
    let mut policy = BoundaryPolicy::new();
    policy
        .on(Segment::Left, Bc::Pressure(|x| 1.0 - x[0]))
        .on(Segment::Right, Bc::Pressure(|x| 1.0 - x[0]))
        .on(Segment::Bottom, Bc::NormalVelocity(|_| 0.0))
        .on(Segment::Top, Bc::NormalVelocity(|_| 0.0))
        .on(Segment::Left, Bc::Saturation(|_| 1.0));
    let mut state = FemState::new(&fem);
    let mut stepper = TimeStepper::new(&fem, &config, &policy)?;
    let mut recorder = SnapshotRecorder::new();
    stepper.run(&mut state, &mut recorder)?;

    let post = PostProc::new(&fem);
    let flux_left = post.boundary_flux(&state, Segment::Left);
    let flux_right = post.boundary_flux(&state, Segment::Right);
    assert!(f64::abs(post.boundary_flux(&state, Segment::Bottom)) < 1e-14);
    assert!(f64::abs(post.boundary_flux(&state, Segment::Top)) < 1e-14);
    assert!(flux_left < 0.0);
    approx_eq(flux_left + flux_right, 0.0, 1e-8);
    Ok(())
}
