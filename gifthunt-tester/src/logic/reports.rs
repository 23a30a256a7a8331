use anyhow::{Context, Result};
use colored::Colorize;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use std::time::Duration;

use super::ScenarioResult;

/// Buffered destination for a report: the file at `path`, or stdout.
///
/// # Errors
///
/// Fails when the report file cannot be created.
pub fn report_sink(path: Option<&Path>) -> Result<Box<dyn Write>> {
    let Some(path) = path else {
        return Ok(Box::new(BufWriter::new(std::io::stdout())));
    };
    let file =
        File::create(path).with_context(|| format!("failed to create {}", path.display()))?;
    Ok(Box::new(BufWriter::new(file)))
}

fn success_rate(results: &[ScenarioResult]) -> f64 {
    if results.is_empty() {
        return 0.0;
    }
    let passed = results.iter().filter(|r| r.passed).count();
    #[allow(clippy::cast_precision_loss)]
    let rate = (passed as f64 / results.len() as f64) * 100.0;
    rate
}

pub fn generate_console_report(
    out: &mut dyn Write,
    results: &[ScenarioResult],
    total_duration: Duration,
) -> Result<()> {
    writeln!(out)?;
    writeln!(out, "{}", "📊 Gift Hunt Test Results Summary".bright_cyan().bold())?;
    writeln!(out, "{}", "=================================".cyan())?;

    let total_tests = results.len();
    let passed_tests = results.iter().filter(|r| r.passed).count();
    let failed_tests = total_tests - passed_tests;

    writeln!(out, "Total scenarios: {total_tests}")?;
    writeln!(out, "Passed: {}", passed_tests.to_string().green())?;
    writeln!(out, "Failed: {}", failed_tests.to_string().red())?;
    writeln!(out, "Success rate: {:.1}%", success_rate(results))?;
    writeln!(out, "Total time: {total_duration:?}")?;
    writeln!(out)?;

    for result in results {
        let status = if result.passed {
            "✅ PASS".green()
        } else {
            "❌ FAIL".red()
        };

        writeln!(
            out,
            "{} {} (seed {})",
            status,
            result.scenario_name.bold(),
            result.seed
        )?;
        writeln!(
            out,
            "   Iterations: {}/{} successful",
            result.successful_iterations, result.iterations_run
        )?;
        writeln!(
            out,
            "   Average: {:.2}ms, {:.0} simulated frames",
            result.average_ms,
            result.average_frames()
        )?;
        if let Some(first) = result.fingerprints.first() {
            writeln!(out, "   First fingerprint: {first}")?;
        }

        if !result.failures.is_empty() {
            writeln!(out, "   Failures:")?;
            for failure in &result.failures {
                writeln!(out, "     • {}", failure.red())?;
            }
        }
        writeln!(out)?;
    }

    let fastest = results
        .iter()
        .min_by(|a, b| a.average_ms.total_cmp(&b.average_ms));
    let slowest = results
        .iter()
        .max_by(|a, b| a.average_ms.total_cmp(&b.average_ms));
    if let (Some(fastest), Some(slowest)) = (fastest, slowest) {
        writeln!(out, "{}", "⚡ Performance Summary".bright_yellow().bold())?;
        writeln!(out, "{}", "=====================".yellow())?;
        writeln!(
            out,
            "Fastest: {} ({:.2}ms)",
            fastest.scenario_name.green(),
            fastest.average_ms
        )?;
        writeln!(
            out,
            "Slowest: {} ({:.2}ms)",
            slowest.scenario_name.yellow(),
            slowest.average_ms
        )?;
    }
    Ok(())
}

pub fn generate_json_report(out: &mut dyn Write, results: &[ScenarioResult]) -> Result<()> {
    let json_output = serde_json::to_string_pretty(results)?;
    writeln!(out, "{json_output}")?;
    Ok(())
}

pub fn generate_markdown_report(out: &mut dyn Write, results: &[ScenarioResult]) -> Result<()> {
    writeln!(out, "# Gift Hunt Test Results\n")?;

    let total_tests = results.len();
    let passed_tests = results.iter().filter(|r| r.passed).count();

    writeln!(out, "## Summary\n")?;
    writeln!(out, "- **Total scenarios**: {total_tests}")?;
    writeln!(out, "- **Passed**: {passed_tests}")?;
    writeln!(out, "- **Failed**: {}", total_tests - passed_tests)?;
    writeln!(out, "- **Success rate**: {:.1}%\n", success_rate(results))?;

    writeln!(out, "## Detailed Results\n")?;
    writeln!(
        out,
        "| Lineup | Seed | Result | Iterations | Average time | Average frames |"
    )?;
    writeln!(out, "| --- | --- | --- | --- | --- | --- |")?;
    for result in results {
        let status = if result.passed { "✅" } else { "❌" };
        writeln!(
            out,
            "| {} | {} | {status} | {}/{} | {:.2}ms | {:.0} |",
            result.scenario_name,
            result.seed,
            result.successful_iterations,
            result.iterations_run,
            result.average_ms,
            result.average_frames()
        )?;
    }

    let failed: Vec<&ScenarioResult> = results.iter().filter(|r| !r.passed).collect();
    if !failed.is_empty() {
        writeln!(out, "\n## Failures\n")?;
        for result in failed {
            writeln!(out, "### {} (seed {})\n", result.scenario_name, result.seed)?;
            for failure in &result.failures {
                writeln!(out, "- {failure}")?;
            }
            writeln!(out)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(name: &str, passed: bool) -> ScenarioResult {
        ScenarioResult {
            scenario_name: name.to_string(),
            seed: 1337,
            passed,
            iterations_run: 2,
            successful_iterations: if passed { 2 } else { 1 },
            failures: if passed {
                Vec::new()
            } else {
                vec!["Iteration 2 (seed 1338): quiz stalled".to_string()]
            },
            fingerprints: vec!["00000000deadbeef".to_string()],
            frames: vec![120, 140],
            average_ms: 4.0,
        }
    }

    fn render(f: impl FnOnce(&mut dyn Write) -> Result<()>) -> String {
        let mut buf = Vec::new();
        f(&mut buf).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn console_report_lists_failures() {
        let results = [result("gift-box", true), result("arcade", false)];
        let text = render(|out| generate_console_report(out, &results, Duration::from_secs(1)));
        assert!(text.contains("Total scenarios: 2"));
        assert!(text.contains("Success rate: 50.0%"));
        assert!(text.contains("quiz stalled"));
        assert!(text.contains("00000000deadbeef"));
    }

    #[test]
    fn json_report_carries_hunt_metrics() {
        let results = [result("gift-box", true)];
        let text = render(|out| generate_json_report(out, &results));
        let parsed: Vec<ScenarioResult> = serde_json::from_str(&text).unwrap();
        assert_eq!(parsed[0].frames, [120, 140]);
        assert_eq!(parsed[0].average_frames(), 130.0);
        assert!(text.contains("\"average_ms\": 4.0"));
    }

    #[test]
    fn report_sink_writes_to_file() {
        let path = std::env::temp_dir().join(format!(
            "gifthunt-sink-{}",
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .unwrap_or_default()
                .as_nanos()
        ));
        let mut sink = report_sink(Some(path.as_path())).unwrap();
        generate_markdown_report(sink.as_mut(), &[result("arcade", true)]).unwrap();
        sink.flush().unwrap();
        drop(sink);
        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.contains("| arcade | 1337 | ✅ | 2/2 | 4.00ms | 130 |"));
        assert!(report_sink(Some(Path::new("/definitely/missing/dir/report.md"))).is_err());
    }

    #[test]
    fn markdown_report_has_table_and_failure_section() {
        let results = [result("gift-box", true), result("arcade", false)];
        let text = render(|out| generate_markdown_report(out, &results));
        assert!(text.starts_with("# Gift Hunt Test Results"));
        assert!(text.contains("| gift-box | 1337 | ✅ | 2/2 | 4.00ms | 130 |"));
        assert!(text.contains("### arcade (seed 1337)"));
    }

    #[test]
    fn empty_results_do_not_divide_by_zero() {
        let text = render(|out| generate_markdown_report(out, &[]));
        assert!(text.contains("Success rate**: 0.0%"));
    }
}
