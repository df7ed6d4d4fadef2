//! Deterministic demo map generation.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::error::MapError;
use crate::world::constants::{MAP_MAX_SIZE, MAP_MIN_SIZE};
use crate::world::{
    Direction, IslandId, Layout, MapBuilder, MapLocation, MapSnapshot, ResourceType, Symmetry, Team,
};

/// Cells kept free of random terrain around every placement.
const CLEARANCE: i32 = 2;

/// Generate a rotationally symmetric map that passes full validation.
///
/// Team A gets three spawn zones in the lower-left half, headquarters in
/// the corner and one well of each base resource; team B gets the mirror
/// image. A central island, one island per side and a pair of currents
/// are fixed; walls, water, dams and bread are scattered in mirrored pairs.
///
/// # Arguments
///
/// * `seed` - Seed for the terrain scatter, also stored as the match seed
/// * `width` - Map width in cells
/// * `height` - Map height in cells
/// * `rounds` - Round limit
///
/// # Errors
///
/// Returns an error if the dimensions are outside the allowed range.
pub fn generate_map(seed: u64, width: i32, height: i32, rounds: u32) -> Result<MapSnapshot, MapError> {
    let size = MAP_MIN_SIZE..=MAP_MAX_SIZE;
    if !size.contains(&width) || !size.contains(&height) {
        return Err(MapError::Dimensions {
            width,
            height,
            min: MAP_MIN_SIZE,
            max: MAP_MAX_SIZE,
        });
    }
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut builder = MapBuilder::new(format!("generated-{seed}"), width, height, Symmetry::Rotational)
        .seed(seed)
        .rounds(rounds);
    let layout = builder.layout();
    let sym = Symmetry::Rotational;
    let mut reserved = vec![false; layout.area()];

    // Spawn zones, one flag each
    let zones = [
        MapLocation::new(3, 3),
        MapLocation::new(3, height / 2 - 1),
        MapLocation::new(width / 2 - 1, 3),
    ];
    for center in zones {
        builder
            .spawn_zone(Team::A, center)
            .spawn_zone(Team::B, sym.reflect(&layout, center));
        reserve(&mut reserved, &layout, sym, center, CLEARANCE);
    }

    let hq = MapLocation::new(0, 0);
    builder
        .headquarters(Team::A, hq)
        .headquarters(Team::B, sym.reflect(&layout, hq));
    reserve(&mut reserved, &layout, sym, hq, 1);

    for (loc, kind) in [
        (MapLocation::new(6, 1), ResourceType::Adamantium),
        (MapLocation::new(1, 6), ResourceType::Mana),
    ] {
        builder.well(loc, kind).well(sym.reflect(&layout, loc), kind);
        reserve(&mut reserved, &layout, sym, loc, 1);
    }

    // Central island, symmetric by construction
    for loc in layout.all_locations() {
        if (2 * loc.x - (width - 1)).abs() <= 3 && (2 * loc.y - (height - 1)).abs() <= 3 {
            builder.island(loc, IslandId(1));
            reserve(&mut reserved, &layout, sym, loc, 0);
        }
    }
    let side = MapLocation::new(width / 4, height * 3 / 4);
    for dx in 0..2 {
        for dy in 0..2 {
            let loc = side.translate(dx, dy);
            builder
                .island(loc, IslandId(2))
                .island(sym.reflect(&layout, loc), IslandId(3));
            reserve(&mut reserved, &layout, sym, loc, 1);
        }
    }

    let current = MapLocation::new(width / 2 - 5, height / 2);
    builder
        .current(current, Direction::East)
        .current(sym.reflect(&layout, current), Direction::West);
    reserve(&mut reserved, &layout, sym, current, 1);

    scatter(&mut builder, &layout, sym, &reserved, &mut rng);

    let map = builder.build();
    map.validate()?;
    Ok(map)
}

/// Mark the square of `radius` around `center` and its mirror image.
fn reserve(reserved: &mut [bool], layout: &Layout, sym: Symmetry, center: MapLocation, radius: i32) {
    for dx in -radius..=radius {
        for dy in -radius..=radius {
            let loc = center.translate(dx, dy);
            for cell in [loc, sym.reflect(layout, loc)] {
                if let Some(i) = layout.index(cell) {
                    reserved[i] = true;
                }
            }
        }
    }
}

/// Random terrain on unreserved cells, always in mirrored pairs.
fn scatter(builder: &mut MapBuilder, layout: &Layout, sym: Symmetry, reserved: &[bool], rng: &mut ChaCha8Rng) {
    for loc in layout.all_locations() {
        let image = sym.reflect(layout, loc);
        let (Some(i), Some(j)) = (layout.index(loc), layout.index(image)) else {
            continue;
        };
        // Each pair once; the fixed point of odd maps stays open
        if i >= j || reserved[i] || reserved[j] {
            continue;
        }
        match rng.gen_range(0..100) {
            0..8 => {
                builder.wall(loc).wall(image);
            }
            8..11 => {
                builder.water(loc).water(image);
            }
            11..13 => {
                builder.dam(loc).dam(image);
            }
            13..16 => {
                let amount = rng.gen_range(5..=20);
                builder.bread(loc, amount).bread(image, amount);
            }
            _ => {}
        }
    }
}
