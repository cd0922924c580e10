//! Per-chunk update pass.
//!
//! A chunk update is dirty-driven: clean chunks are a no-op, dirty chunks
//! get a full-scan stat recompute (256 tiles is cheap next to per-tile
//! simulation) followed by the zone-specific hook on each dirty tile, then
//! all dirty state is cleared and the chunk is stamped with the tick.

use rand::Rng;
use rand_chacha::ChaCha8Rng;

use crate::chunk::{Chunk, ChunkStats};
use crate::sim_rng::tile_rng;
use crate::tile::{Tile, ZoneKind};

/// Zone-specific per-tile simulation, the seam to the zoning/economy
/// systems. Implementations run on worker threads during parallel dispatch.
pub trait TileHooks: Send + Sync {
    fn grow_residential(&self, tile: &mut Tile, rng: &mut ChaCha8Rng);
    fn run_commercial(&self, tile: &mut Tile, rng: &mut ChaCha8Rng);
    fn run_industrial(&self, tile: &mut Tile, rng: &mut ChaCha8Rng);
}

/// Apply one update pass to a chunk. No-op while the dirty flag is clear.
pub fn update_chunk(chunk: &mut Chunk, tick: u64, hooks: &dyn TileHooks, world_seed: u64) {
    if !chunk.is_dirty() {
        return;
    }

    // Stats are always a full scan, regardless of how many tiles are dirty.
    let mut stats = ChunkStats::default();
    for tile in chunk.tiles().iter() {
        stats.population += tile.population as u32;
        stats.jobs += tile.jobs as u32;
        stats.tax_revenue += tile.tax_revenue as u32;
    }
    chunk.stats = stats;

    let mask = chunk.dirty_mask();
    let (cx, cy) = (chunk.cx, chunk.cy);
    mask.for_each_set(|index| {
        let mut rng = tile_rng(world_seed, cx, cy, index, tick);
        let tile = chunk.tile_mut(index);
        match tile.zone {
            ZoneKind::Residential => hooks.grow_residential(tile, &mut rng),
            ZoneKind::Commercial => hooks.run_commercial(tile, &mut rng),
            ZoneKind::Industrial => hooks.run_industrial(tile, &mut rng),
            ZoneKind::None => {}
        }
    });

    chunk.clear_dirty();
    chunk.last_update = tick;
}

/// Stand-in growth model used when no external zoning system is wired in.
///
/// Development is gated on utilities and scaled by tile desirability, the
/// same inputs the original lot model used; magnitudes are placeholders.
pub struct DefaultHooks;

const GROWTH_GATE: f32 = 0.2;

impl TileHooks for DefaultHooks {
    fn grow_residential(&self, tile: &mut Tile, rng: &mut ChaCha8Rng) {
        let capacity = 4 + tile.density as u16 * 12;
        let desirability = tile.desirability();
        if tile.has_utilities() && !tile.abandoned && desirability > GROWTH_GATE {
            if tile.population < capacity {
                let growth = rng.gen_range(1u16..=2).min(capacity - tile.population);
                tile.population += growth;
            }
        } else if tile.population > 0 && rng.gen_bool(0.25) {
            tile.population -= 1;
        }
        tile.happiness = (desirability * 255.0) as u8;
        tile.tax_revenue = tile.population / 4;
    }

    fn run_commercial(&self, tile: &mut Tile, rng: &mut ChaCha8Rng) {
        let capacity = 6 + tile.density as u16 * 10;
        if tile.has_utilities() && !tile.abandoned && tile.desirability() > GROWTH_GATE {
            if tile.jobs < capacity {
                let growth = rng.gen_range(1u16..=2).min(capacity - tile.jobs);
                tile.jobs += growth;
            }
            tile.land_value = tile.land_value.saturating_add(tile.jobs / 8);
        } else if tile.jobs > 0 && rng.gen_bool(0.25) {
            tile.jobs -= 1;
        }
        tile.tax_revenue = tile.jobs / 3;
    }

    fn run_industrial(&self, tile: &mut Tile, rng: &mut ChaCha8Rng) {
        let capacity = 8 + tile.density as u16 * 8;
        if tile.has_utilities() && !tile.abandoned {
            if tile.jobs < capacity {
                let growth = rng.gen_range(1u16..=2).min(capacity - tile.jobs);
                tile.jobs += growth;
            }
            tile.pollution = tile.pollution.saturating_add((tile.jobs / 16) as u8);
        } else if tile.jobs > 0 && rng.gen_bool(0.25) {
            tile.jobs -= 1;
        }
        tile.tax_revenue = tile.jobs / 2;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tile::ServiceKind;
    use std::sync::Mutex;

    /// Records the `land_value` of every tile it is invoked on.
    struct CountingHooks {
        seen: Mutex<Vec<u16>>,
    }

    impl CountingHooks {
        fn new() -> Self {
            Self {
                seen: Mutex::new(Vec::new()),
            }
        }
    }

    impl TileHooks for CountingHooks {
        fn grow_residential(&self, tile: &mut Tile, _rng: &mut ChaCha8Rng) {
            self.seen.lock().expect("lock").push(tile.land_value);
        }
        fn run_commercial(&self, tile: &mut Tile, _rng: &mut ChaCha8Rng) {
            self.seen.lock().expect("lock").push(tile.land_value);
        }
        fn run_industrial(&self, tile: &mut Tile, _rng: &mut ChaCha8Rng) {
            self.seen.lock().expect("lock").push(tile.land_value);
        }
    }

    fn zoned_tile(index: usize) -> Tile {
        Tile {
            zone: ZoneKind::Residential,
            land_value: index as u16,
            ..Tile::default()
        }
    }

    #[test]
    fn test_clean_chunk_is_a_noop() {
        let mut chunk = Chunk::new(0, 0);
        chunk.tile_mut(3).population = 50;
        let hooks = CountingHooks::new();
        update_chunk(&mut chunk, 7, &hooks, 1);
        assert_eq!(chunk.last_update, 0);
        assert_eq!(chunk.stats.population, 0, "stats not recomputed");
        assert!(hooks.seen.lock().expect("lock").is_empty());
    }

    #[test]
    fn test_only_dirty_tiles_get_hooks_but_stats_scan_everything() {
        let mut chunk = Chunk::new(1, 2);
        for i in 0..256 {
            *chunk.tile_mut(i) = zoned_tile(i);
            chunk.tile_mut(i).population = 2;
        }
        chunk.mark_tile_dirty(5);
        chunk.mark_tile_dirty(200);

        let hooks = CountingHooks::new();
        update_chunk(&mut chunk, 42, &hooks, 1);

        let seen = hooks.seen.lock().expect("lock").clone();
        assert_eq!(seen, vec![5, 200], "exactly the two dirty tiles, once each");
        // Full scan: all 256 tiles counted, not just the 2 dirty ones.
        assert_eq!(chunk.stats.population, 512);
        assert!(!chunk.is_dirty());
        assert!(!chunk.dirty_mask().any());
        assert_eq!(chunk.last_update, 42);
    }

    #[test]
    fn test_default_hooks_grow_serviced_residential() {
        let mut chunk = Chunk::new(0, 0);
        let tile = chunk.tile_mut(10);
        tile.zone = ZoneKind::Residential;
        tile.density = 2;
        tile.powered = true;
        tile.watered = true;
        for kind in ServiceKind::ALL {
            tile.set_service(kind, 220);
        }
        chunk.mark_tile_dirty(10);

        update_chunk(&mut chunk, 1, &DefaultHooks, 9);
        let tile = chunk.tile(10);
        assert!(tile.population >= 1);
        assert!(tile.happiness > 0);
        assert_eq!(tile.tax_revenue, tile.population / 4);
    }

    #[test]
    fn test_default_hooks_are_deterministic() {
        let build = || {
            let mut chunk = Chunk::new(4, 4);
            for i in [3, 77, 130, 255] {
                let tile = chunk.tile_mut(i);
                tile.zone = match i % 3 {
                    0 => ZoneKind::Residential,
                    1 => ZoneKind::Commercial,
                    _ => ZoneKind::Industrial,
                };
                tile.density = 3;
                tile.powered = true;
                tile.watered = true;
                tile.set_service(ServiceKind::Power, 255);
                tile.set_service(ServiceKind::Parks, 255);
                chunk.mark_tile_dirty(i);
            }
            chunk
        };

        let mut a = build();
        let mut b = build();
        update_chunk(&mut a, 5, &DefaultHooks, 1234);
        update_chunk(&mut b, 5, &DefaultHooks, 1234);
        for i in 0..256 {
            assert_eq!(a.tile(i), b.tile(i));
        }
        assert_eq!(a.stats, b.stats);
    }

    #[test]
    fn test_unpowered_zone_decays() {
        let mut chunk = Chunk::new(0, 0);
        let tile = chunk.tile_mut(0);
        tile.zone = ZoneKind::Industrial;
        tile.jobs = 10;
        chunk.mark_tile_dirty(0);

        // Decay is stochastic per tick; over many ticks it must bite.
        for tick in 1..=64 {
            chunk.mark_tile_dirty(0);
            update_chunk(&mut chunk, tick, &DefaultHooks, 7);
        }
        assert!(chunk.tile(0).jobs < 10);
    }
}
