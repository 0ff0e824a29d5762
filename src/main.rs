use clap::Parser;
use dnasandbox::simulation::params::Params;
use dnasandbox::simulation::world::World;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Headless runner for the DNA sandbox.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Number of entities to spawn
    #[arg(short, long, default_value_t = 200)]
    entities: usize,

    /// Number of steps to run
    #[arg(short, long, default_value_t = 1000)]
    steps: u64,

    /// Timestep in seconds
    #[arg(long, default_value_t = 1.0 / 60.0)]
    dt: f32,

    /// JSON parameter file (missing fields use defaults)
    #[arg(short, long)]
    params: Option<String>,

    /// Resume from a saved snapshot instead of spawning
    #[arg(long)]
    load: Option<String>,

    /// Write a snapshot here when finished
    #[arg(long)]
    save: Option<String>,

    /// Log population statistics every N steps (0 disables)
    #[arg(long, default_value_t = 100)]
    report_every: u64,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("dnasandbox=info")),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();

    let params = match &args.params {
        Some(path) => Params::from_file(path)?,
        None => Params::default(),
    };
    let mut world = World::new(params)?;

    match &args.load {
        Some(path) => world.load_from_file(path)?,
        None => world.initialize(args.entities)?,
    }

    info!(
        entities = world.entities().len(),
        steps = args.steps,
        dt = args.dt,
        "starting simulation"
    );

    let mut impacts = 0;
    let mut predations = 0;
    for step in 1..=args.steps {
        let summary = world.step(args.dt)?;
        impacts += summary.impacts;
        predations += summary.predations;

        // nobody consumes events headlessly
        world.drain_events();

        if args.report_every > 0 && step % args.report_every == 0 {
            let stats = world.stats();
            info!(
                step,
                total = stats.total,
                buoyant = stats.buoyant,
                heavy = stats.heavy,
                neutral = stats.neutral,
                predators = stats.predators,
                prey = stats.prey,
                mean_gravity_y = stats.mean_gravity_y,
                mean_friction = stats.mean_friction,
                mean_energy = stats.mean_energy,
                "population"
            );
        }

        if world.entities().is_empty() {
            warn!(step, "population died out");
            break;
        }
    }

    info!(
        time = world.time(),
        impacts, predations, "simulation finished"
    );

    if let Some(path) = &args.save {
        world.save_to_file(path)?;
    }
    Ok(())
}
