mod logic;
mod util;

use anyhow::{Context, Result, bail};
use clap::{Parser, ValueEnum};
use colored::Colorize;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Instant;

use gifthunt_game::{HuntConfig, Lineup};
use logic::reports::report_sink;
use logic::{HuntTester, ScenarioResult, resolve_seed_inputs};
use util::split_csv;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ReportFormat {
    Console,
    Json,
    Markdown,
}

#[derive(Debug, Parser)]
#[command(name = "gifthunt-tester", version = "0.1.0")]
#[command(about = "Automated playthroughs of the gift hunt - every lineup, every seed")]
struct Args {
    /// Lineups to run (comma-separated, `all`, or `config` for the hunt file's
    /// own lineup). Defaults to `config` with `--config`, otherwise `all`.
    #[arg(long)]
    lineup: Option<String>,

    /// List all available lineups and exit
    #[arg(long)]
    list_lineups: bool,

    /// Seeds to run (comma-separated)
    #[arg(long, default_value = "1337")]
    seeds: String,

    /// Number of iterations per lineup and seed
    #[arg(long, default_value_t = 5)]
    iterations: usize,

    /// Output report format
    #[arg(long, value_enum, default_value_t = ReportFormat::Console)]
    report: ReportFormat,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Optional path to write the report output instead of stdout
    #[arg(long)]
    output: Option<PathBuf>,

    /// Hunt configuration JSON to use instead of the embedded one
    #[arg(long)]
    config: Option<PathBuf>,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    if maybe_list_lineups(&args)? {
        return Ok(());
    }

    announce_banner();

    let start_time = Instant::now();
    let config = load_config(args.config.as_deref())?;
    let lineup_arg = args.lineup.as_deref().unwrap_or(if args.config.is_some() {
        CONFIG_LINEUP
    } else {
        "all"
    });
    let lineups = expand_lineups(lineup_arg, &config)?;
    let seeds = resolve_seed_inputs(&split_csv(&args.seeds))?;
    for (name, lineup) in &lineups {
        config
            .clone()
            .with_lineup(lineup.clone())
            .validate()
            .with_context(|| format!("lineup {name} cannot be played"))?;
    }

    let tester = HuntTester::new(config, args.verbose);
    let mut all_results = Vec::new();
    for (name, lineup) in &lineups {
        all_results.extend(tester.run_lineup(name, lineup, &seeds, args.iterations));
    }

    write_reports(&args, &all_results, start_time)?;

    if all_results.iter().any(|r| !r.passed) {
        std::process::exit(1);
    }

    Ok(())
}

/// Lineup name that plays the configuration's own lineup.
const CONFIG_LINEUP: &str = "config";

fn describe(lineup: &Lineup) -> String {
    lineup
        .games()
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(" → ")
}

fn maybe_list_lineups(args: &Args) -> Result<bool> {
    if !args.list_lineups {
        return Ok(false);
    }
    let config = load_config(args.config.as_deref())?;
    let mut out = report_sink(args.output.as_deref())?;
    writeln!(out, "Available lineups:")?;
    for name in Lineup::NAMES {
        let games = Lineup::named(name).map(|l| describe(&l)).unwrap_or_default();
        writeln!(out, "  {name:10} - {games}")?;
    }
    writeln!(out, "  {CONFIG_LINEUP:10} - {}", describe(&config.lineup))?;
    out.flush()?;
    Ok(true)
}

fn announce_banner() {
    println!("{}", "🎁 Gift Hunt Automated Tester".bright_cyan().bold());
    println!("{}", "=============================".cyan());
}

fn load_config(path: Option<&Path>) -> Result<HuntConfig> {
    let Some(path) = path else {
        return Ok(HuntConfig::load_from_static());
    };
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    HuntConfig::from_json(&json).with_context(|| format!("failed to parse {}", path.display()))
}

fn expand_lineups(lineup_arg: &str, config: &HuntConfig) -> Result<Vec<(String, Lineup)>> {
    let mut names = split_csv(lineup_arg);
    if names.iter().any(|name| name == "all") {
        names.retain(|name| name != "all");
        names.extend(Lineup::NAMES.iter().map(ToString::to_string));
    }
    if names.is_empty() {
        names.push(Lineup::NAMES[0].to_string());
    }

    let mut lineups: Vec<(String, Lineup)> = Vec::new();
    for name in names {
        if lineups.iter().any(|(seen, _)| *seen == name) {
            continue;
        }
        let lineup = if name == CONFIG_LINEUP {
            config.lineup.clone()
        } else if let Some(lineup) = Lineup::named(&name) {
            lineup
        } else {
            bail!(
                "Unknown lineup: {name} (expected one of {}, {CONFIG_LINEUP})",
                Lineup::NAMES.join(", ")
            );
        };
        lineups.push((name, lineup));
    }
    Ok(lineups)
}

fn write_reports(args: &Args, results: &[ScenarioResult], start_time: Instant) -> Result<()> {
    let mut out = report_sink(args.output.as_deref())?;

    match args.report {
        ReportFormat::Json => logic::reports::generate_json_report(out.as_mut(), results)?,
        ReportFormat::Markdown => {
            logic::reports::generate_markdown_report(out.as_mut(), results)?;
        }
        ReportFormat::Console => {
            if results.is_empty() {
                writeln!(out, "No lineups executed.")?;
            } else {
                logic::reports::generate_console_report(
                    out.as_mut(),
                    results,
                    start_time.elapsed(),
                )?;
            }
        }
    }

    if args.report != ReportFormat::Json {
        let duration = start_time.elapsed();
        writeln!(out)?;
        writeln!(out, "🏁 Total time: {duration:?}")?;
    }
    out.flush()?;
    Ok(())
}
