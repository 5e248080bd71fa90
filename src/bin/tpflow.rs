use std::error::Error;
use structopt::StructOpt;
use tpflow::prelude::*;

/// Command line options
#[derive(StructOpt, Debug)]
#[structopt(
    name = "tpflow",
    about = "Simulates two-phase flow in porous media and generates VTU and PVD files for visualization with Paraview"
)]
struct Options {
    /// JSON file with the configuration (the other options override its values)
    #[structopt(long)]
    config: Option<String>,

    /// Viscosity ratio μ_water / μ_oil
    #[structopt(long)]
    mu_rel: Option<f64>,

    /// Time increment
    #[structopt(long)]
    dt: Option<f64>,

    /// Total simulated time
    #[structopt(long)]
    t_fin: Option<f64>,

    /// Polynomial degree of the flux and saturation spaces
    #[structopt(long)]
    degree: Option<usize>,

    /// Coefficient of the diffusive stabilization
    #[structopt(long)]
    epsilon: Option<f64>,

    /// Uses the streamline upwind stabilization instead of the diffusive one
    #[structopt(long)]
    streamline: bool,

    /// Selects the inflow boundary term by the sign of the previous velocity
    #[structopt(long)]
    upwind: bool,

    /// Number of divisions along x
    #[structopt(long, default_value = "16")]
    nx: usize,

    /// Number of divisions along y
    #[structopt(long, default_value = "16")]
    ny: usize,

    /// Output directory
    #[structopt(long, default_value = "/tmp/tpflow/results")]
    out_dir: String,

    /// Filename stem of the output files
    #[structopt(long, default_value = "tpflow")]
    stem: String,

    /// Shows the convergence statistics of each Newton iteration
    #[structopt(short, long)]
    verbose: bool,

    /// Hides all messages but errors
    #[structopt(short, long)]
    quiet: bool,
}

fn main() -> Result<(), Box<dyn Error>> {
    // parse options
    let options = Options::from_args();

    // configuration
    let mut config = match &options.config {
        Some(path) => Config::read_json(path)?,
        None => Config::new(),
    };
    if let Some(value) = options.mu_rel {
        config.set_mu_rel(value);
    }
    if let Some(value) = options.dt {
        config.set_dt(value);
    }
    if let Some(value) = options.t_fin {
        config.set_t_fin(value);
    }
    if let Some(value) = options.degree {
        config.set_degree(value);
    }
    if let Some(value) = options.epsilon {
        config.set_epsilon(value);
    }
    if options.streamline {
        config.set_stabilization(Stabilization::StreamlineUpwind);
    }
    if options.upwind {
        config.set_inflow(InflowMode::Upwind);
    }
    config.set_verbose(!options.quiet, options.verbose && !options.quiet, false);
    if !options.quiet {
        println!("{}", config);
    }

    // mesh and boundary conditions
    let mesh = SampleMeshes::unit_square(options.nx, options.ny);
    let fem = FemMesh::new(&mesh, &config)?;
    let policy = BoundaryPolicy::reference();

    // output
    let file_io = FileIo::new_enabled(&fem, &options.stem, Some(&options.out_dir))?;
    let path_summary = file_io.path_summary();
    let path_pvd = file_io.path_pvd(Field::Saturation);
    let mut exporter = QueuedExporter::new(file_io);

    // run
    let mut stepper = TimeStepper::new(&fem, &config, &policy)?;
    let mut state = FemState::new(&fem);
    let result = stepper.run(&mut state, &mut exporter);
    if let Err(e) = &result {
        // write the collection files for the time steps already exported
        // (a failed export is reported again by finish)
        if let Err(e_finish) = exporter.finish() {
            if e_finish != *e {
                println!("ERROR-ON-ERROR: cannot finish the output due to: {}", e_finish);
            }
        }
        println!("ERROR: {} ({})", e, e.kind());
    }

    // add the convergence statistics to the summary file
    let mut summary = FileIo::read_json(&path_summary)?;
    summary.steps = stepper.summaries.clone();
    summary.write_self()?;
    result?;

    // message
    if !options.quiet {
        let post = PostProc::new(&fem);
        let (s_min, s_max) = post.saturation_range(&state);
        println!("saturation range = [{:?}, {:?}]", s_min, s_max);
        println!("total divergence = {:e}", post.total_divergence(&state));
        let thin_line = format!("{:─^1$}", "", path_pvd.len());
        println!("\n\n{}", thin_line);
        println!("VTU files generated; the PVD file of the saturation is:");
        println!("{}", path_pvd);
        println!("{}\n\n", thin_line);
    }
    Ok(())
}
