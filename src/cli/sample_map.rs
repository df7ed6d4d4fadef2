//! Sample map command implementation.

use super::CliError;
use skirmish::tournament::generate_map;
use std::fs;
use std::path::Path;

/// Execute the sample-map command.
///
/// # Errors
///
/// Returns an error if the dimensions are invalid or the file cannot be written.
pub(crate) fn execute(output: &Path, seed: u64, width: i32, height: i32, rounds: u32) -> Result<(), CliError> {
    let map = generate_map(seed, width, height, rounds)?;
    let json = serde_json::to_string_pretty(&map)
        .map_err(|e| CliError::new(format!("JSON serialization failed: {e}")))?;
    fs::write(output, json).map_err(|e| CliError::new(format!("Failed to write {}: {e}", output.display())))?;

    println!("Wrote {} ({}x{}, seed {seed}) to {}", map.name, map.width, map.height, output.display());
    Ok(())
}
