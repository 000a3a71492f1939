//! Synthetic program guide generator.
//!
//! Writes a reproducible guide file (channels, programs, recordings and EPG
//! mapping candidates) that the guide viewer can open.

use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDateTime, Utc};
use guidegrid::SyntheticGuide;
use std::env;
use std::path::PathBuf;

const DEFAULT_OUTPUT: &str = "guide.json";
const MAX_HOURS: u32 = 31 * 24;

struct Config {
    channels: usize,
    hours: u32,
    seed: u64,
    /// Defaults to the current time
    start: Option<DateTime<Utc>>,
    output_file: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            channels: 200,
            hours: 24,
            seed: 42,
            start: None,
            output_file: None,
        }
    }
}

/// Takes the value following a flag.
fn flag_value<'a>(args: &'a [String], i: &mut usize, flag: &str) -> Result<&'a str> {
    *i += 1;
    match args.get(*i) {
        Some(value) => Ok(value.as_str()),
        None => anyhow::bail!("{} requires an argument", flag),
    }
}

/// Accepts RFC 3339 or "YYYY-MM-DDTHH:MM" (taken as UTC).
fn parse_start(text: &str) -> Result<DateTime<Utc>> {
    if let Ok(instant) = DateTime::parse_from_rfc3339(text) {
        return Ok(instant.with_timezone(&Utc));
    }
    let naive = NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M")
        .with_context(|| format!("Invalid -start value: {}", text))?;
    Ok(naive.and_utc())
}

fn parse_args(args: &[String]) -> Result<Option<Config>> {
    let mut config = Config::default();

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "-channels" => {
                let value = flag_value(args, &mut i, "-channels")?;
                config.channels = value
                    .parse()
                    .with_context(|| format!("Invalid -channels value: {}", value))?;
            }
            "-hours" => {
                let value = flag_value(args, &mut i, "-hours")?;
                config.hours = value
                    .parse()
                    .with_context(|| format!("Invalid -hours value: {}", value))?;
                if config.hours == 0 || config.hours > MAX_HOURS {
                    anyhow::bail!("-hours must be between 1 and {}", MAX_HOURS);
                }
            }
            "-seed" => {
                let value = flag_value(args, &mut i, "-seed")?;
                config.seed = value
                    .parse()
                    .with_context(|| format!("Invalid -seed value: {}", value))?;
            }
            "-start" => {
                config.start = Some(parse_start(flag_value(args, &mut i, "-start")?)?);
            }
            "-out" => {
                config.output_file = Some(PathBuf::from(flag_value(args, &mut i, "-out")?));
            }
            "-h" | "-help" | "--help" => return Ok(None),
            other => {
                tracing::warn!("Unknown argument: {}", other);
            }
        }
        i += 1;
    }

    Ok(Some(config))
}

fn print_help() {
    println!("Program Guide Generator");
    println!("Usage: guide-gen [OPTIONS]");
    println!();
    println!("OPTIONS:");
    println!("  -channels <N>          Number of channels (default: 200)");
    println!("  -hours <N>             Hours of programs to generate (default: 24)");
    println!("  -seed <N>              Random seed (default: 42)");
    println!("  -start <TIME>          Guide start, RFC 3339 or YYYY-MM-DDTHH:MM UTC");
    println!("                         (default: now)");
    println!("  -out <FILE>            Output file path (default: {})", DEFAULT_OUTPUT);
    println!("  -h, -help, --help      Show this help message");
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = env::args().collect();
    let Some(config) = parse_args(&args)? else {
        print_help();
        return Ok(());
    };

    let start = config.start.unwrap_or_else(Utc::now);
    let guide =
        SyntheticGuide::with_config(start, config.channels, config.hours, config.seed).generate();

    let output_path = config.output_file.unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT));
    guide.write(&output_path)?;
    println!("Guide written to: {}", output_path.display());

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn args(list: &[&str]) -> Vec<String> {
        std::iter::once("guide-gen").chain(list.iter().copied()).map(String::from).collect()
    }

    #[test]
    fn test_defaults() {
        let config = parse_args(&args(&[])).unwrap().unwrap();
        assert_eq!(config.channels, 200);
        assert_eq!(config.hours, 24);
        assert_eq!(config.seed, 42);
        assert!(config.start.is_none());
    }

    #[test]
    fn test_all_flags() {
        let config = parse_args(&args(&[
            "-channels",
            "12",
            "-hours",
            "6",
            "-seed",
            "7",
            "-start",
            "2024-01-01T10:30",
            "-out",
            "/tmp/g.json",
        ]))
        .unwrap()
        .unwrap();
        assert_eq!(config.channels, 12);
        assert_eq!(config.hours, 6);
        assert_eq!(config.seed, 7);
        assert_eq!(config.start, Some(Utc.with_ymd_and_hms(2024, 1, 1, 10, 30, 0).unwrap()));
        assert_eq!(config.output_file, Some(PathBuf::from("/tmp/g.json")));
    }

    #[test]
    fn test_rfc3339_start_converted_to_utc() {
        let start = parse_start("2024-01-01T12:00:00+02:00").unwrap();
        assert_eq!(start, Utc.with_ymd_and_hms(2024, 1, 1, 10, 0, 0).unwrap());
    }

    #[test]
    fn test_missing_value_is_an_error() {
        let err = parse_args(&args(&["-seed"])).err().unwrap();
        assert!(err.to_string().contains("-seed requires an argument"));
    }

    #[test]
    fn test_zero_hours_rejected() {
        assert!(parse_args(&args(&["-hours", "0"])).is_err());
        assert!(parse_args(&args(&["-hours", "4000000000"])).is_err());
    }

    #[test]
    fn test_help_flag() {
        assert!(parse_args(&args(&["--help"])).unwrap().is_none());
    }
}
