//! Series command implementation.

use super::output::{format_series_text, JsonSeriesResult};
use super::{CliError, MatchArgs, OutputFormat};
use indicatif::{ProgressBar, ProgressStyle};
use skirmish::tournament::run_series;
use std::time::Instant;

/// Execute the series command.
///
/// # Errors
///
/// Returns an error if the inputs cannot be loaded or the configuration is invalid.
pub(crate) fn execute(
    args: &MatchArgs,
    games: u64,
    threads: Option<usize>,
    format: OutputFormat,
    progress: bool,
) -> Result<(), CliError> {
    let (map, config) = args.load()?;
    let names = args.team_names();

    // Set thread pool size if specified
    if let Some(num_threads) = threads {
        rayon::ThreadPoolBuilder::new()
            .num_threads(num_threads)
            .build_global()
            .ok(); // Ignore error if already initialized
    }

    let base_seed = config.seed.unwrap_or(map.seed);

    let pb = if progress {
        let pb = ProgressBar::new(games);
        let style = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} matches ({per_sec})")
            .map_err(|e| CliError::new(format!("Invalid progress template: {e}")))?
            .progress_chars("=>-");
        pb.set_style(style);
        pb
    } else {
        ProgressBar::hidden()
    };

    let start = Instant::now();
    let stats = run_series(
        &map,
        &config,
        [args.team_a.into(), args.team_b.into()],
        base_seed,
        games,
        &|| pb.inc(1),
    )?;
    pb.finish_with_message("done");
    let duration = start.elapsed();

    match format {
        OutputFormat::Text => {
            println!();
            print!("{}", format_series_text(&stats, &names));
            println!();
            println!("Duration: {:.2}s", duration.as_secs_f64());
        }
        OutputFormat::Json => {
            let json_result = JsonSeriesResult::from_stats(&stats, &names);
            let json = serde_json::to_string_pretty(&json_result)
                .map_err(|e| CliError::new(format!("JSON serialization failed: {e}")))?;
            println!("{json}");
        }
    }

    Ok(())
}
