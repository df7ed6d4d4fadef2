//! Run command implementation.

use super::output::{format_text, JsonMatchResult};
use super::{CliError, MatchArgs, OutputFormat};
use skirmish::tournament::run_sample_match;
use std::path::PathBuf;

/// Execute the run command.
///
/// # Errors
///
/// Returns an error if the inputs cannot be loaded or the match fails.
pub(crate) fn execute(
    args: &MatchArgs,
    format: OutputFormat,
    save: Option<PathBuf>,
    quiet: bool,
) -> Result<(), CliError> {
    let (map, config) = args.load()?;
    let names = args.team_names();

    if !quiet && format == OutputFormat::Text {
        println!("Running match on {} ({}x{})...", map.name, map.width, map.height);
        println!("Teams: A = {}, B = {}", names[0], names[1]);
        println!();
    }

    let result = run_sample_match(&map, &config, args.team_a.into(), args.team_b.into())?;

    if let Some(save_path) = save {
        result.log.save(&save_path)?;
        if !quiet && format == OutputFormat::Text {
            println!("Match log saved to: {}", save_path.display());
            println!();
        }
    }

    match format {
        OutputFormat::Text => {
            print!("{}", format_text(&result, &names));
        }
        OutputFormat::Json => {
            let json_result = JsonMatchResult::from_match_result(&result, &names);
            let json = serde_json::to_string_pretty(&json_result)
                .map_err(|e| CliError::new(format!("JSON serialization failed: {e}")))?;
            println!("{json}");
        }
    }

    Ok(())
}
