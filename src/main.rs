//! Sensor Analytics CLI
//!
//! Host around the analytics core: drives a pipeline from a sample source,
//! prints reports as JSON lines and keeps a persistent audit log.

use anyhow::{bail, Context};
use chrono::Utc;
use clap::{Args, Parser, Subcommand};
use sensor_analytics::{
    audit::{create_shared_log, read_history},
    config::{Config, PipelineConfig},
    core::ReportBuilder,
    source::{ReplayGenerator, SampleGenerator, Sampler, SyntheticGenerator},
    Pipeline, TickOutput, VERSION,
};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "sensor-analytics")]
#[command(version = VERSION)]
#[command(about = "Streaming sensor analytics: aggregation, SAX and spectral entropy", long_about = None)]
struct Cli {
    /// Alternative configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Drive the pipeline from a sample source
    Run(RunArgs),

    /// Analyse a single window of values
    Analyze {
        /// Sample values, oldest first
        #[arg(required = true, allow_negative_numbers = true)]
        values: Vec<f64>,

        /// Channel name used in the report
        #[arg(long, default_value = "input")]
        channel: String,
    },

    /// Show configuration
    Config,
}

#[derive(Args)]
struct RunArgs {
    /// CSV file to replay (one tick per line); synthetic waveforms if omitted
    #[arg(long)]
    replay: Option<PathBuf>,

    /// Synthetic waveform per channel (constant, ramp, sine, noise)
    #[arg(long, default_value = "sine,noise")]
    waveforms: String,

    /// Seed for synthetic noise
    #[arg(long)]
    seed: Option<u64>,

    /// Channel names, comma separated (defaults to the configured channels)
    #[arg(long)]
    channels: Option<String>,

    /// Stop after this many ticks
    #[arg(long)]
    ticks: Option<u64>,

    /// Sampling interval in milliseconds (defaults to the configured interval)
    #[arg(long)]
    interval_ms: Option<u64>,

    /// Export all tick outputs to the export directory on exit
    #[arg(long)]
    export: bool,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => Config::load_from(path),
        None => Config::load(),
    }
    .context("loading configuration")?;

    match cli.command {
        Commands::Run(args) => cmd_run(config, args),
        Commands::Analyze { values, channel } => cmd_analyze(config, values, channel),
        Commands::Config => cmd_config(&config, cli.config),
    }
}

fn cmd_run(config: Config, args: RunArgs) -> anyhow::Result<()> {
    let mut pipeline_config = config.pipeline.clone();
    if let Some(channels) = &args.channels {
        pipeline_config.channels = PipelineConfig::channels_from_csv(channels);
    }

    let interval = args
        .interval_ms
        .map(Duration::from_millis)
        .unwrap_or(config.sample_interval);

    if let Some(path) = &args.replay {
        let generator = ReplayGenerator::from_path(path)
            .with_context(|| format!("reading replay file {}", path.display()))?;
        drive(config, pipeline_config, generator, interval, &args)
    } else {
        let mut generator = SyntheticGenerator::from_csv(&args.waveforms)?;
        if let Some(seed) = args.seed {
            generator = generator.with_seed(seed);
        }
        drive(config, pipeline_config, generator, interval, &args)
    }
}

fn drive<G: SampleGenerator>(
    config: Config,
    pipeline_config: PipelineConfig,
    generator: G,
    interval: Duration,
    args: &RunArgs,
) -> anyhow::Result<()> {
    if let Err(e) = config.ensure_directories() {
        tracing::warn!("Could not create directories: {e}");
    }

    if generator.width() != pipeline_config.channels.len() {
        bail!(
            "source provides {} readings per tick but {} channels are configured ({})",
            generator.width(),
            pipeline_config.channels.len(),
            pipeline_config.channels.join(",")
        );
    }

    let audit = create_shared_log();
    let session_id = format!("SESS-{}", Utc::now().timestamp_millis());
    let builder = ReportBuilder::new().with_session_id(session_id.clone());

    tracing::info!(
        version = VERSION,
        instance = %builder.instance_id(),
        session = %session_id,
        channels = %pipeline_config.channels.join(","),
        interval_ms = interval.as_millis() as u64,
        "starting pipeline"
    );

    let mut pipeline = Pipeline::new(pipeline_config)
        .context("invalid pipeline configuration")?
        .with_audit_log(audit.clone())
        .with_report_builder(builder);

    let mut sampler = Sampler::new(generator, interval);
    if let Some(ticks) = args.ticks {
        sampler = sampler.with_max_ticks(ticks);
    }

    // Set up Ctrl+C handler
    let running = Arc::new(AtomicBool::new(true));
    let r = running.clone();
    ctrlc::set_handler(move || {
        r.store(false, Ordering::SeqCst);
    })
    .context("setting Ctrl+C handler")?;

    sampler.start()?;

    let receiver = sampler.receiver().clone();
    let mut outputs: Vec<TickOutput> = Vec::new();

    while running.load(Ordering::SeqCst) {
        match receiver.recv_timeout(Duration::from_millis(100)) {
            Ok(tick) => match pipeline.ingest(&tick.readings) {
                Ok(Some(output)) => {
                    log_output(&output);
                    for report in &output.reports {
                        println!("{}", serde_json::to_string(report)?);
                    }
                    for cross in &output.cross {
                        println!("{}", serde_json::to_string(cross)?);
                    }
                    if args.export {
                        outputs.push(output);
                    }
                }
                Ok(None) => {}
                Err(e) => tracing::warn!("Dropping tick: {e}"),
            },
            Err(crossbeam_channel::RecvTimeoutError::Timeout) => {
                if !sampler.is_running() && receiver.is_empty() {
                    tracing::info!("source exhausted");
                    break;
                }
            }
            Err(crossbeam_channel::RecvTimeoutError::Disconnected) => {
                tracing::error!("Source disconnected unexpectedly");
                break;
            }
        }
    }

    sampler.stop();
    tracing::info!(ticks = pipeline.ticks(), "stopping pipeline");

    let history_path = config.data_path.join("audit.jsonl");
    if let Err(e) = audit.append_to(&history_path, Some(&session_id)) {
        tracing::warn!("Could not append audit record: {e}");
    }

    if args.export && !outputs.is_empty() {
        let export_path = config.export_path.join(format!(
            "session_{}.json",
            Utc::now().format("%Y%m%d_%H%M%S")
        ));
        let json = serde_json::to_string_pretty(&outputs)?;
        std::fs::write(&export_path, json)
            .with_context(|| format!("writing {}", export_path.display()))?;
        tracing::info!("Exported {} tick outputs to {:?}", outputs.len(), export_path);
    }

    eprintln!();
    eprintln!("{}", audit.summary());
    match read_history(&history_path) {
        Ok(history) => eprintln!(" - Sessions on record: {}", history.len()),
        Err(e) => tracing::debug!("Could not read audit history: {e}"),
    }
    Ok(())
}

fn log_output(output: &TickOutput) {
    for report in &output.reports {
        tracing::info!(
            tick = output.tick,
            channel = %report.channel,
            mean = report.mean,
            std = report.std,
            level = %report.aggregation_level,
            sax = %report.sax_symbols,
            entropy = report.spectral_entropy,
            "channel report"
        );
    }
    for cross in &output.cross {
        tracing::info!(
            tick = output.tick,
            a = %cross.channel_a,
            b = %cross.channel_b,
            manhattan = cross.manhattan,
            correlation = cross.correlation,
            degenerate = cross.degenerate,
            "cross metrics"
        );
    }
}

fn cmd_analyze(config: Config, values: Vec<f64>, channel: String) -> anyhow::Result<()> {
    let pipeline_config = PipelineConfig {
        channels: vec![channel.clone()],
        buffer_capacity: values.len(),
        // A one-off window of arbitrary length still needs whole SAX segments
        sax_fragments: if config.pipeline.sax_fragments > 0
            && values.len() % config.pipeline.sax_fragments == 0
        {
            config.pipeline.sax_fragments
        } else {
            1
        },
        ..config.pipeline
    };

    let mut pipeline = Pipeline::new(pipeline_config).context("invalid analysis settings")?;
    let id = pipeline
        .channel_id(&channel)
        .context("channel missing from pipeline")?;

    for value in values {
        pipeline.push_sample(id, value)?;
    }

    let report = pipeline.compute_report(id)?;
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

fn cmd_config(config: &Config, path: Option<PathBuf>) -> anyhow::Result<()> {
    println!("Configuration");
    println!("=============");
    println!();
    println!("Config file: {:?}", path.unwrap_or_else(Config::config_path));
    println!();
    println!("{}", serde_json::to_string_pretty(config)?);
    Ok(())
}
