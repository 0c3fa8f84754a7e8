use anyhow::{Context, Error as Anyhow};
use backprop::config::Prepared;
use backprop::{Logging, Parameters, Session, Trainer};
use clap::Parser;
use ron::ser::PrettyConfig;
use std::{fs, io, path::PathBuf};
use tracing::{info, instrument, Level};

/// Trains a feedforward network on a single example.
#[derive(Debug, Parser)]
#[command(author, version, about)]
struct Opts {
    /// Session file describing the network, its example and its training.
    #[arg(value_name = "session")]
    session: PathBuf,

    /// Overrides the number of epochs.
    #[arg(short, long, value_name = "number")]
    epochs: Option<usize>,

    /// Overrides the learning rate.
    #[arg(short, long, value_name = "rate")]
    learning_rate: Option<f64>,

    /// Seeds parameter randomization.
    #[arg(short, long, value_name = "number")]
    seed: Option<u64>,

    /// Log level.
    #[arg(short, long, value_name = "level", default_value = "info")]
    verbosity: Level,
}

#[instrument(level = "debug", err)]
fn load(opts: &Opts) -> Result<Session, Anyhow> {
    let text = fs::read_to_string(&opts.session)
        .with_context(|| format!("failed to read '{}'", opts.session.display()))?;
    let mut session = Session::from_ron(&text)
        .with_context(|| format!("failed to parse '{}'", opts.session.display()))?;

    if let Some(epochs) = opts.epochs {
        session.epochs = epochs;
    }
    if let Some(rate) = opts.learning_rate {
        session.learning_rate = rate;
    }
    if opts.seed.is_some() {
        session.seed = opts.seed;
    }
    Ok(session)
}

fn main() -> Result<(), Anyhow> {
    let opts = Opts::parse();

    tracing_subscriber::fmt()
        .with_max_level(opts.verbosity)
        .with_writer(io::stderr)
        .init();

    let session = load(&opts)?;
    let Prepared {
        mut network,
        input,
        target,
        ..
    } = session.prepare()?;

    let before = network.run(&input)?;
    println!("Initial prediction: {}", before);
    println!("Initial loss: {:.6}", network.loss(&before, &target)?);

    let report = Trainer::new(&mut network)
        .epochs(session.epochs)
        .logging(Logging::percent(session.epochs))
        .train(&input, &target)?;

    let after = network.run(&input)?;
    println!();
    println!("Final prediction: {}", after);
    for (i, row) in network.compare(&input, &target)?.iter().enumerate() {
        println!(
            "  output {}: predicted {:.6}, target {:.6}, |difference| {:.6}",
            i, row.prediction, row.target, row.difference
        );
    }
    if let Some(loss) = report.final_loss() {
        println!("Loss after {} epochs: {:.6}", report.loss_history.len(), loss);
    }
    info!(elapsed = ?report.elapsed, "done");

    let (weights, biases) = network.into_parameters();
    let trained = Parameters {
        inputs: input,
        weights,
        biases,
    };
    println!();
    println!("Trained parameters:");
    println!("{}", ron::ser::to_string_pretty(&trained, PrettyConfig::default())?);

    Ok(())
}
