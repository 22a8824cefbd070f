//! omnisense - monitoring harness for the OmniSense core
//!
//! `monitor`:
//! 1. Loads configuration (file, environment, command line)
//! 2. Calibrates the empty-room baseline from the configured source
//! 3. Classifies every incoming snapshot and reports presence/intrusion
//! 4. Stops cleanly on Ctrl-C and prints a per-state summary
//!
//! `identify` replays a snapshot file as one gait segment and prints its
//! identity token.

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::collections::HashMap;
use std::io::IsTerminal;
use std::path::PathBuf;
use std::sync::mpsc;
use std::time::Duration;

use omnisense::{
    Classification, GaitWindow, OmnisenseConfig, SenseEngine, Snapshot, SnapshotSource,
    SourceConfig,
};

#[path = "../ui.rs"]
mod ui;

#[derive(Parser, Debug)]
#[command(name = "omnisense", version, about = "Wi-Fi CSI presence and intrusion monitor")]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Calibrate on an empty room, then classify live snapshots until Ctrl-C
    Monitor {
        /// TOML config file (built-in defaults when unset)
        #[arg(long, value_name = "PATH", env = "OMNISENSE_CONFIG")]
        config: Option<PathBuf>,
        /// Snapshot source: stub://<scene> or a local replay file
        #[arg(long, value_name = "URL")]
        source: Option<String>,
        /// Intrusion threshold (deviation at and above which movement alerts)
        #[arg(long)]
        sensitivity: Option<f64>,
        /// Seed for synthetic sources
        #[arg(long)]
        seed: Option<u64>,
        /// Stop after this many live snapshots
        #[arg(long, value_name = "N")]
        max_snapshots: Option<u64>,
        /// Do not pace the loop at the configured rate
        #[arg(long)]
        no_pacing: bool,
        /// Output format for live results
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
        /// UI mode for stderr progress (auto|plain|pretty)
        #[arg(long, default_value = "auto", value_name = "MODE")]
        ui: String,
    },

    /// Print the identity token of a replayed gait segment
    Identify {
        /// Snapshot replay file, one snapshot per line
        #[arg(long, value_name = "PATH")]
        input: PathBuf,
        /// Fingerprint only the last N snapshots
        #[arg(long, value_name = "N")]
        window: Option<usize>,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

struct MonitorOptions {
    max_snapshots: Option<u64>,
    pacing: bool,
    format: OutputFormat,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    match args.command {
        Command::Monitor {
            config,
            source,
            sensitivity,
            seed,
            max_snapshots,
            no_pacing,
            format,
            ui,
        } => {
            let mut cfg = OmnisenseConfig::load_from(config.as_deref())?;
            if let Some(url) = source {
                cfg.source.url = url;
            }
            if let Some(sensitivity) = sensitivity {
                cfg.sensitivity = sensitivity;
            }
            if seed.is_some() {
                cfg.source.seed = seed;
            }
            cfg.validate()?;

            let is_tty = std::io::stderr().is_terminal();
            let stdout_is_tty = std::io::stdout().is_terminal();
            let ui = ui::Ui::from_args(Some(&ui), is_tty, !stdout_is_tty);
            monitor(
                &cfg,
                &ui,
                MonitorOptions {
                    max_snapshots,
                    pacing: !no_pacing,
                    format,
                },
            )
        }
        Command::Identify { input, window } => identify(input, window),
    }
}

fn monitor(cfg: &OmnisenseConfig, ui: &ui::Ui, opts: MonitorOptions) -> Result<()> {
    let engine = SenseEngine::new(cfg.engine_config()?);
    let mut window = GaitWindow::new(cfg.gait_window)?;

    let mut source = SnapshotSource::new(cfg.source.clone())?;
    source.connect()?;

    log::info!(
        "omnisense starting: source={}, sensitivity={}, idle_threshold={}, armed={}",
        cfg.source.url,
        engine.sensitivity(),
        cfg.idle_threshold,
        engine.is_armed()
    );

    {
        let stage = ui.stage(
            "Calibrating room (leave the room empty)",
            cfg.calibration_samples as u64,
        );
        let mut samples = Vec::with_capacity(cfg.calibration_samples);
        while samples.len() < cfg.calibration_samples {
            let snapshot = source.next_snapshot()?.ok_or_else(|| {
                anyhow!(
                    "source ended after {} of {} calibration samples",
                    samples.len(),
                    cfg.calibration_samples
                )
            })?;
            samples.push(snapshot);
            stage.advance();
        }
        engine.calibrate(&samples)?;
    }

    let (tx, rx) = mpsc::channel();
    ctrlc::set_handler(move || {
        let _ = tx.send(());
    })
    .context("error setting Ctrl-C handler")?;

    log::info!("monitoring active (Ctrl-C to stop)");
    let period = Duration::from_secs_f64(1.0 / cfg.source.rate_hz as f64);
    let mut counts: HashMap<Classification, u64> = HashMap::new();
    let mut seen = 0u64;

    loop {
        if rx.try_recv().is_ok() {
            log::info!("shutdown signal received");
            break;
        }
        if opts.max_snapshots.is_some_and(|max| seen >= max) {
            break;
        }
        let Some(snapshot) = source.next_snapshot()? else {
            break;
        };
        seen += 1;

        let assessment = engine.assess(&snapshot)?;
        window.push(snapshot);
        *counts.entry(assessment.classification).or_default() += 1;

        report(
            seen,
            assessment.classification,
            assessment.deviation,
            engine.is_armed(),
            &window,
            opts.format,
        )?;

        if opts.pacing {
            std::thread::sleep(period);
        }
    }

    let stats = source.stats();
    eprintln!(
        "omnisense deactivated: {} live snapshots from {} ({} read in total)",
        seen, stats.url, stats.snapshots_read
    );
    for state in Classification::ALL {
        eprintln!("  {:<24} {}", state.label(), counts.get(&state).unwrap_or(&0));
    }
    Ok(())
}

fn report(
    seq: u64,
    state: Classification,
    deviation: Option<f64>,
    armed: bool,
    window: &GaitWindow,
    format: OutputFormat,
) -> Result<()> {
    let deviation_value = deviation.unwrap_or(f64::NAN);
    let gait = (state == Classification::IntrusionAlert).then(|| window.identify());

    match format {
        OutputFormat::Json => {
            let line = serde_json::json!({
                "seq": seq,
                "state": state,
                "label": state.label(),
                "deviation": deviation,
                "armed": armed,
                "gait_token": gait,
            });
            println!("{}", serde_json::to_string(&line)?);
        }
        OutputFormat::Text if !armed => {
            log::debug!("[disarmed] {} (deviation {:.4})", state, deviation_value);
        }
        OutputFormat::Text => match (state, gait) {
            (Classification::IntrusionAlert, Some(token)) => {
                println!(
                    "ALERT #{seq}: unauthorized movement (deviation {:.3}, gait {token})",
                    deviation_value
                );
            }
            (Classification::BioPresence, _) => {
                println!(
                    "INFO #{seq}: human presence detected (breathing/micro-movement, deviation {:.3})",
                    deviation_value
                );
            }
            _ => log::debug!("#{seq} {} (deviation {:.4})", state, deviation_value),
        },
    }
    Ok(())
}

fn identify(input: PathBuf, window: Option<usize>) -> Result<()> {
    let url = input
        .to_str()
        .ok_or_else(|| anyhow!("input path is not valid UTF-8: {}", input.display()))?
        .to_string();
    let mut source = SnapshotSource::new(SourceConfig {
        url,
        ..SourceConfig::default()
    })?;
    source.connect()?;

    let token = match window {
        Some(capacity) => {
            let mut window = GaitWindow::new(capacity)?;
            while let Some(snapshot) = source.next_snapshot()? {
                window.push(snapshot);
            }
            log::info!("fingerprinting last {} snapshots", window.len());
            window.identify()
        }
        None => {
            let mut segment: Vec<Snapshot> = Vec::new();
            while let Some(snapshot) = source.next_snapshot()? {
                segment.push(snapshot);
            }
            log::info!("fingerprinting {} snapshots", segment.len());
            omnisense::identify(&segment)
        }
    };
    println!("{token}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Args::command().debug_assert();
    }

    #[test]
    fn monitor_config_path_comes_from_flag_or_env() {
        std::env::remove_var("OMNISENSE_CONFIG");
        let args = Args::try_parse_from(["omnisense", "monitor"]).unwrap();
        assert!(matches!(args.command, Command::Monitor { config: None, .. }));

        std::env::set_var("OMNISENSE_CONFIG", "/etc/omnisense.toml");
        let args = Args::try_parse_from(["omnisense", "monitor"]).unwrap();
        match args.command {
            Command::Monitor { config, .. } => {
                assert_eq!(config, Some(PathBuf::from("/etc/omnisense.toml")))
            }
            other => panic!("unexpected command {other:?}"),
        }

        let args =
            Args::try_parse_from(["omnisense", "monitor", "--config", "local.toml"]).unwrap();
        match args.command {
            Command::Monitor { config, .. } => assert_eq!(config, Some(PathBuf::from("local.toml"))),
            other => panic!("unexpected command {other:?}"),
        }
        std::env::remove_var("OMNISENSE_CONFIG");
    }
}
