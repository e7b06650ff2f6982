use backdrop::params::VisionParams;
use clap::Parser;
use rand::{SeedableRng, rngs::StdRng};
use tracing::info;

/// Prints parameter sets drawn uniformly from their valid ranges, one JSON
/// object per line.
#[derive(Parser)]
#[command(version, about, long_about = None)]
struct Args {
    /// Number of parameter sets to draw.
    #[arg(short, long, default_value_t = 500)]
    count: usize,

    /// Seed for a reproducible sequence.
    #[arg(long)]
    seed: Option<u64>,
}

fn main() {
    // Register an event subscriber that prints events to STDERR.
    let subscriber = tracing_subscriber::FmtSubscriber::builder()
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber).unwrap();

    let args = Args::parse();

    let mut rng = match args.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };
    info!(count = args.count, seed = ?args.seed, "sampling parameters");

    for _ in 0..args.count {
        let params = VisionParams::random(&mut rng);
        println!(
            "{}",
            serde_json::to_string(&params).expect("parameters serialize to json")
        );
    }
}
