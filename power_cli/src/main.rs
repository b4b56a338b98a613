//! # Samplewise CLI
//!
//! Runs a sample-size plan from a JSON request and prints a summary followed
//! by the result as JSON.
//!
//! ```text
//! power_cli [REQUEST.json] [--settings SETTINGS.json]
//! ```
//!
//! The request is read from stdin when no file (or `-`) is given. Set
//! `RUST_LOG=power_core=debug` to see the calculation trace on stderr.

use std::io::{self, Read};
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{bail, Context, Result};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use power_core::{DesignParameters, GroupBreakdown, PlanningRequest, PlanningResult, PlanningSettings};

const USAGE: &str = "Usage: power_cli [REQUEST.json | -] [--settings SETTINGS.json]";

#[derive(Debug, Default)]
struct Args {
    request: Option<PathBuf>,
    settings: Option<PathBuf>,
}

fn parse_args(mut args: impl Iterator<Item = String>) -> Result<Option<Args>> {
    let mut parsed = Args::default();
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "-h" | "--help" => return Ok(None),
            "--settings" => {
                let path = args.next().context("--settings requires a file path")?;
                parsed.settings = Some(PathBuf::from(path));
            }
            "-" => parsed.request = None,
            flag if flag.starts_with("--") => bail!("unknown option '{flag}'\n{USAGE}"),
            path => {
                if parsed.request.is_some() {
                    bail!("more than one request file given\n{USAGE}");
                }
                parsed.request = Some(PathBuf::from(path));
            }
        }
    }
    Ok(Some(parsed))
}

fn read_request(path: Option<&PathBuf>) -> Result<String> {
    match path {
        Some(path) => {
            std::fs::read_to_string(path).with_context(|| format!("failed to read request {}", path.display()))
        }
        None => {
            let mut buf = String::new();
            io::stdin().read_to_string(&mut buf).context("failed to read request from stdin")?;
            Ok(buf)
        }
    }
}

fn load_settings(path: Option<&PathBuf>) -> Result<PlanningSettings> {
    let Some(path) = path else {
        return Ok(PlanningSettings::default());
    };
    let text =
        std::fs::read_to_string(path).with_context(|| format!("failed to read settings {}", path.display()))?;
    PlanningSettings::from_json_str(&text).with_context(|| format!("invalid settings in {}", path.display()))
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(io::stderr)
        .init();

    match run() {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<ExitCode> {
    let Some(args) = parse_args(std::env::args().skip(1))? else {
        println!("{USAGE}");
        return Ok(ExitCode::SUCCESS);
    };
    debug!(?args, "arguments");

    let settings = load_settings(args.settings.as_ref())?;
    let text = read_request(args.request.as_ref())?;
    let request = PlanningRequest::from_json_str(&text).context("invalid planning request")?;
    let outcome = request
        .resolved_params(&settings)
        .and_then(|params| Ok((params, request.run(&settings)?)));

    match outcome {
        Ok((params, result)) => {
            print_summary(&request, &params, &result);
            println!();
            println!("JSON Output:");
            println!("{}", serde_json::to_string_pretty(&result)?);
            Ok(ExitCode::SUCCESS)
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            eprintln!();
            eprintln!("Error JSON:");
            eprintln!("{}", serde_json::to_string_pretty(&e)?);
            Ok(ExitCode::from(2))
        }
    }
}

fn print_summary(request: &PlanningRequest, params: &DesignParameters, result: &PlanningResult) {
    println!("═══════════════════════════════════════");
    println!("  SAMPLE SIZE PLAN: {}", result.design);
    println!("═══════════════════════════════════════");
    println!();
    println!("Parameters:");
    println!("  Alpha:    {}", params.alpha);
    println!("  Power:    {}", params.power);
    if request.design.uses_sidedness() {
        println!("  Test:     {}", params.sidedness_label());
    }
    println!("  Dropout:  {:.1}%", params.dropout_rate * 100.0);
    println!();
    println!("Method:");
    println!("  {}", result.formula);
    println!();
    println!("Sample Size:");
    println!("  Before dropout: {}", result.n_before_dropout);
    println!("  Required:       {}", result.n_required);
    match result.groups {
        GroupBreakdown::Single => {}
        GroupBreakdown::TwoArm { n1, n2, .. } => {
            println!("  Group 1:        {}", n1);
            println!("  Group 2:        {}", n2);
        }
        GroupBreakdown::Balanced { k_groups, n_per_group } => {
            println!("  Per group:      {} x {} groups", n_per_group, k_groups);
        }
    }
    if let Some(events) = result.required_events {
        println!("  Events:         {}", events);
    }
    if let Some(f_test) = &result.f_test {
        println!();
        println!("F Test at N = {}:", result.n_before_dropout);
        println!("  df:             ({}, {})", f_test.numerator_df, f_test.denominator_df);
        println!("  Critical F:     {:.4}", f_test.critical_f);
        println!("  Noncentrality:  {:.3}", f_test.noncentrality);
        println!("  Achieved power: {:.4}", f_test.achieved_power);
    }
    println!();
    println!("Assumptions:");
    for assumption in &result.assumptions {
        println!("  - {}", assumption);
    }
    println!("═══════════════════════════════════════");
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> impl Iterator<Item = String> {
        list.iter().map(|s| s.to_string()).collect::<Vec<_>>().into_iter()
    }

    #[test]
    fn test_parse_request_and_settings() {
        let parsed = parse_args(args(&["req.json", "--settings", "s.json"])).unwrap().unwrap();
        assert_eq!(parsed.request, Some(PathBuf::from("req.json")));
        assert_eq!(parsed.settings, Some(PathBuf::from("s.json")));
    }

    #[test]
    fn test_parse_stdin_and_help() {
        let parsed = parse_args(args(&["-"])).unwrap().unwrap();
        assert!(parsed.request.is_none());
        assert!(parse_args(args(&["--help"])).unwrap().is_none());
    }

    #[test]
    fn test_parse_errors() {
        assert!(parse_args(args(&["--settings"])).is_err());
        assert!(parse_args(args(&["--verbose"])).is_err());
        assert!(parse_args(args(&["a.json", "b.json"])).is_err());
    }
}
