//! motor-sim: headless runner for the motor warehouse generator.
//!
//! Usage:
//!   motor-sim                              # env config, runs until `quit`
//!   motor-sim --config sim.json --ticks 100
//!   motor-sim --seed 12345 --out ./snapshots --json-summary
//!
//! Configuration comes from defaults, the optional JSON file, then
//! `MOTOR_SIM_*` environment variables. SIGINT, SIGTERM or `quit` on
//! stdin stop the run after the in-flight tick.

use anyhow::{anyhow, Context, Result};
use motor_sim_core::{
    clock::{ShutdownHandle, TickPacer},
    config::SimConfig,
    engine::SimEngine,
    store::StatusCounts,
    telemetry::LogSink,
    types::Tick,
};
use std::env;
use std::io::{self, BufRead};
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(serde::Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum StdinCommand {
    Quit,
}

#[derive(serde::Serialize)]
struct RunSummary {
    seed:        u64,
    ticks_run:   u64,
    final_tick:  Tick,
    population:  usize,
    ceiling:     usize,
    statuses:    StatusCounts,
    output_dir:  PathBuf,
}

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let config_path = string_arg(&args, "--config").map(PathBuf::from);
    let max_ticks = parse_arg::<u64>(&args, "--ticks")?;
    let json_summary = args.iter().any(|a| a == "--json-summary");

    let mut config = SimConfig::resolve(config_path.as_deref())
        .context("cannot load configuration")?;
    if let Some(seed) = parse_arg::<u64>(&args, "--seed")? {
        config.seed = Some(seed);
    }
    if let Some(dir) = string_arg(&args, "--out") {
        config.output_dir = PathBuf::from(dir);
    }

    let seed = config.seed.unwrap_or_else(wall_clock_seed);
    let interval = Duration::from_secs(config.tick_interval_secs);

    if !json_summary {
        println!("Motor warehouse generator — motor-sim");
        println!("  seed:      {seed}");
        println!("  ticks:     {}", max_ticks.map_or_else(|| "unbounded".to_string(), |t| t.to_string()));
        println!("  interval:  {}s", config.tick_interval_secs);
        println!("  ceiling:   {}", config.max_population);
        println!("  out:       {}", config.output_dir.display());
        println!();
    }

    let mut engine = SimEngine::new(config, seed)?.with_telemetry(Box::new(LogSink));
    let (mut pacer, shutdown) = TickPacer::new(interval);
    install_signal_handler(shutdown.clone())?;
    spawn_stdin_watcher(shutdown);

    engine.seed_population(chrono::Utc::now());
    let ticks_run = engine.run(&mut pacer, max_ticks)?;

    let summary = RunSummary {
        seed,
        ticks_run,
        final_tick: engine.clock.current_tick,
        population: engine.store.size(),
        ceiling:    engine.store.ceiling(),
        statuses:   engine.store.status_counts(),
        output_dir: engine.exporter().output_dir().to_path_buf(),
    };
    if json_summary {
        println!("{}", serde_json::to_string(&summary)?);
    } else {
        print_summary(&summary);
    }
    Ok(())
}

/// SIGINT and SIGTERM (ctrlc's `termination` feature) end the run the same
/// way `quit` does: the sleep is cut short and the in-flight tick completes.
fn install_signal_handler(shutdown: ShutdownHandle) -> Result<()> {
    ctrlc::set_handler(move || {
        log::info!("runner: termination signal received, finishing current tick");
        shutdown.trigger();
    })
    .context("cannot install signal handler")
}

/// Triggers shutdown on `quit` (plain or `{"type":"quit"}`).
/// EOF on stdin is not a stop request: daemons often run without one.
fn spawn_stdin_watcher(shutdown: ShutdownHandle) {
    std::thread::spawn(move || {
        let stdin = io::stdin();
        for line in stdin.lock().lines() {
            let Ok(line) = line else { break };
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            let quit = line.eq_ignore_ascii_case("quit")
                || matches!(serde_json::from_str::<StdinCommand>(line), Ok(StdinCommand::Quit));
            if quit {
                log::info!("runner: shutdown requested, finishing current tick");
                shutdown.trigger();
                break;
            }
            log::warn!("runner: unknown command: {line}");
        }
    });
}

fn print_summary(s: &RunSummary) {
    println!("=== RUN SUMMARY ===");
    println!("  seed:           {}", s.seed);
    println!("  ticks run:      {}", s.ticks_run);
    println!("  final tick:     {}", s.final_tick);
    println!("  population:     {}/{}", s.population, s.ceiling);
    println!("  available:      {}", s.statuses.available);
    println!("  in maintenance: {}", s.statuses.in_maintenance);
    println!("  disposed:       {}", s.statuses.disposed);
    println!("  snapshots in:   {}", display_dir(&s.output_dir));
}

fn display_dir(dir: &Path) -> String {
    dir.canonicalize()
        .unwrap_or_else(|_| dir.to_path_buf())
        .display()
        .to_string()
}

fn string_arg<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.windows(2)
        .find(|w| w[0] == flag)
        .map(|w| w[1].as_str())
}

/// `Ok(None)` when the flag is absent; an error when its value doesn't parse.
fn parse_arg<T>(args: &[String], flag: &str) -> Result<Option<T>>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    string_arg(args, flag)
        .map(|v| {
            v.parse()
                .map_err(|e| anyhow!("invalid value '{v}' for {flag}: {e}"))
        })
        .transpose()
}

fn wall_clock_seed() -> u64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|a| a.to_string()).collect()
    }

    #[test]
    fn parse_arg_reads_present_flags() {
        let a = args(&["motor-sim", "--ticks", "12", "--seed", "99"]);
        assert_eq!(parse_arg::<u64>(&a, "--ticks").unwrap(), Some(12));
        assert_eq!(parse_arg::<u64>(&a, "--seed").unwrap(), Some(99));
        assert_eq!(parse_arg::<u64>(&a, "--missing").unwrap(), None);
    }

    #[test]
    fn parse_arg_rejects_unparseable_values() {
        let a = args(&["motor-sim", "--ticks", "abc", "--seed", "x"]);
        let err = parse_arg::<u64>(&a, "--ticks").unwrap_err();
        assert!(err.to_string().contains("--ticks"), "got {err}");
        assert!(err.to_string().contains("abc"), "got {err}");
        assert!(parse_arg::<u64>(&a, "--seed").is_err());
    }

    #[cfg(unix)]
    #[test]
    fn sigterm_stops_the_run_after_the_current_tick() {
        let dir = tempfile::tempdir().unwrap();
        let mut engine = SimEngine::build_test(dir.path(), 21).unwrap();
        engine.seed_population(chrono::Utc::now());
        let (mut pacer, shutdown) = TickPacer::new(Duration::from_secs(60));
        install_signal_handler(shutdown).unwrap();

        std::thread::spawn(|| {
            std::thread::sleep(Duration::from_millis(100));
            std::process::Command::new("kill")
                .args(["-TERM", &std::process::id().to_string()])
                .status()
                .unwrap();
        });

        // Unbounded run with a 60s interval: only the signal can end it.
        let ran = engine.run(&mut pacer, None).unwrap();
        assert_eq!(ran, 1);
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
    }
}
