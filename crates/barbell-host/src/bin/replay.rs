use std::fs::File;
use std::io::{self, BufReader, BufWriter, Write};
use std::path::PathBuf;

use barbell_host::engine::{CommandSlot, EngineConfig, Polarity};
use barbell_host::log::SampleReader;
use barbell_host::replay::{Replay, ReplayOptions};
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(author, version, about = "Replay a recorded barbell session through the motion engine")]
struct Args {
    /// Sample log (.csv), diagnostic or raw layout
    #[arg(short, long)]
    input: PathBuf,

    /// Engine configuration (.json); defaults apply when omitted
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Verbose record output; stdout when omitted
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Start a calibration at this sample time (ms)
    #[arg(long)]
    calibrate_at: Option<u32>,

    /// Sensor mounted upside down
    #[arg(long)]
    invert: bool,

    /// Pace compact records as if a radio link were up
    #[arg(long)]
    connected: bool,

    /// Write the replay report (.json) here
    #[arg(short, long)]
    report: Option<PathBuf>,

    /// Bar load in kg, for the one-rep-max estimate
    #[arg(long)]
    load_kg: Option<f32>,

    /// Omit the column header from the verbose output
    #[arg(long)]
    no_header: bool,
}

fn load_config(path: Option<&PathBuf>) -> barbell_host::Result<EngineConfig> {
    match path {
        Some(path) => {
            let reader = BufReader::new(File::open(path)?);
            Ok(serde_json::from_reader(reader)?)
        }
        None => Ok(EngineConfig::default()),
    }
}

fn main() -> barbell_host::Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer().with_target(false).with_writer(io::stderr))
        .init();

    let args = Args::parse();

    let mut config = load_config(args.config.as_ref())?;
    if args.invert {
        config.polarity = Polarity::Inverted;
    }

    let options = ReplayOptions {
        calibrate_at: args.calibrate_at,
        connected: args.connected,
        load_kg: args.load_kg,
        header: !args.no_header,
    };

    let commands = CommandSlot::new();
    let replay = Replay::new(config, &commands, options)?;
    let samples = SampleReader::new(BufReader::new(File::open(&args.input)?));

    let sink: Box<dyn Write> = match &args.output {
        Some(path) => Box::new(BufWriter::new(File::create(path)?)),
        None => Box::new(BufWriter::new(io::stdout().lock())),
    };
    let report = replay.run(samples, sink)?;

    tracing::info!(
        samples = report.samples,
        reps = report.reps.len(),
        compact = report.compact_records,
        "replay complete"
    );
    if let Some(orm) = &report.one_rep_max {
        tracing::info!(epley = orm.epley_kg, brzycki = orm.brzycki_kg, "1RM estimate");
    }

    if let Some(path) = &args.report {
        let writer = BufWriter::new(File::create(path)?);
        serde_json::to_writer_pretty(writer, &report)?;
    }

    Ok(())
}
