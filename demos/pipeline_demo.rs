//! Demonstration of the sensor analytics pipeline.
//!
//! This example shows how to:
//! 1. Configure a two-channel pipeline
//! 2. Drive it from a synthetic source on a background thread
//! 3. Receive ticks and feed them to the pipeline
//! 4. Print per-channel reports and cross-channel metrics
//!
//! Run with: cargo run --example pipeline_demo

use std::time::Duration;

use sensor_analytics::{
    audit::create_shared_log,
    source::{Sampler, SyntheticGenerator, Waveform},
    Pipeline, PipelineConfig,
};

fn main() {
    println!("Sensor Analytics - Pipeline Demo");
    println!("================================");
    println!();

    let config = PipelineConfig::default();
    println!("Channels: {}", config.channels.join(", "));
    println!(
        "Window: {} samples, report every {} ticks",
        config.buffer_capacity, config.report_every
    );
    println!();

    let audit = create_shared_log();
    let mut pipeline = match Pipeline::new(config) {
        Ok(p) => p.with_audit_log(audit.clone()),
        Err(e) => {
            eprintln!("Invalid configuration: {e}");
            return;
        }
    };

    // A bright oscillating light channel and a noisy room temperature
    let generator = SyntheticGenerator::new(vec![
        Waveform::Sine {
            offset: 3000.0,
            amplitude: 2500.0,
            period_ticks: 6.0,
        },
        Waveform::Noise {
            offset: 21.0,
            amplitude: 0.5,
        },
    ])
    .with_seed(42);

    let mut sampler = Sampler::new(generator, Duration::from_millis(10)).with_max_ticks(36);
    if let Err(e) = sampler.start() {
        eprintln!("Failed to start sampler: {e}");
        return;
    }

    let receiver = sampler.receiver().clone();
    while let Ok(tick) = receiver.recv_timeout(Duration::from_millis(500)) {
        let output = match pipeline.ingest(&tick.readings) {
            Ok(Some(output)) => output,
            Ok(None) => continue,
            Err(e) => {
                eprintln!("Tick rejected: {e}");
                continue;
            }
        };

        println!("--- Tick {} ---", output.tick);
        for report in &output.reports {
            println!(
                "  {:<12} mean={:>9.2} std={:>9.2} level={:<6} sax={} entropy={:.3}",
                report.channel,
                report.mean,
                report.std,
                report.aggregation_level,
                report.sax_symbols,
                report.spectral_entropy
            );
            println!("  {:<12} reduced={:?}", "", report.reduced_values);
        }
        for cross in &output.cross {
            println!(
                "  {} vs {}: manhattan={:.1} correlation={:.3}{}",
                cross.channel_a,
                cross.channel_b,
                cross.manhattan,
                cross.correlation,
                if cross.degenerate { " (degenerate)" } else { "" }
            );
        }
        println!();
    }

    sampler.stop();

    println!("{}", audit.summary());
}
