//! Map validation command implementation.

use super::{load_map, CliError};
use skirmish::world::constants::{MAP_MAX_SIZE, MAP_MIN_SIZE};
use std::path::Path;

/// Execute the validate command.
///
/// # Errors
///
/// Returns an error if the map file cannot be read or breaks a rule.
pub(crate) fn execute(map_path: &Path) -> Result<(), CliError> {
    let map = load_map(map_path)?;

    println!("Validating: {}", map_path.display());
    println!();

    let size = MAP_MIN_SIZE..=MAP_MAX_SIZE;
    let size_ok = size.contains(&map.width) && size.contains(&map.height);
    print_check(&format!("Dimensions {}x{}", map.width, map.height), size_ok);

    let structure = map.check_structure();
    print_check("Cell arrays and placements", structure.is_ok());
    structure?;

    let rules = map.validate();
    print_check("Flags, walls, currents, islands, symmetry", rules.is_ok());
    rules?;

    println!();
    println!("Summary:");
    println!("  Name:         {}", map.name);
    println!("  Symmetry:     {:?}", map.symmetry);
    println!("  Rounds:       {}", map.rounds);
    println!("  Flags:        {}", map.flags.len());
    println!("  Wells:        {}", map.wells.len());
    println!("  Headquarters: {}", map.headquarters.len());
    println!("  Islands:      {}", map.island_count());

    println!();
    println!("Validation successful!");

    Ok(())
}

fn print_check(name: &str, ok: bool) {
    let status = if ok { "OK" } else { "FAILED" };
    let symbol = if ok { "✓" } else { "✗" };
    println!("  {symbol} {name}: {status}");
}
