//! Camera-driven visibility and LOD classification.
//!
//! A pass rebuilds the world's active and visible lists from empty and
//! overwrites each visited chunk's tier and flags. There is no incremental
//! diff: classification runs only on camera movement or on a periodic
//! cadence, not every step, so a full rebuild stays cheap.

use log::debug;

use crate::chunk::LodTier;
use crate::config::CHUNK_SIZE;
use crate::world::WorldGrid;

/// Camera state in tile space.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Camera {
    pub tile_x: i32,
    pub tile_y: i32,
    /// View distance in tiles. Also the threshold base for tier selection,
    /// so every chunk of the processing box classifies Near unless the view
    /// distance is only a few tiles.
    pub view_distance: u32,
}

/// Classify every chunk in the camera's processing box.
///
/// Near chunks join both the visible and active lists; Medium and Far join
/// only the active list; Inactive chunks (and chunks that left the box since
/// the previous pass) have their flags cleared and join neither.
pub fn classify(world: &mut WorldGrid, camera: Camera) {
    // Rebuild from empty: clear the previous pass's flags first so no stale
    // classification survives outside the new box.
    let mut active = std::mem::take(&mut world.active);
    for &idx in &active {
        world.chunk_mut(idx).deactivate();
    }
    active.clear();
    let mut visible = std::mem::take(&mut world.visible);
    visible.clear();

    let cam_cx = camera.tile_x.div_euclid(CHUNK_SIZE as i32) as i64;
    let cam_cy = camera.tile_y.div_euclid(CHUNK_SIZE as i32) as i64;
    let radius = camera.view_distance.div_ceil(CHUNK_SIZE as u32) as i64;
    let max_sq = (camera.view_distance as i64).pow(2);

    let min_cx = (cam_cx - radius).max(0);
    let max_cx = (cam_cx + radius).min(world.chunks_x() as i64 - 1);
    let min_cy = (cam_cy - radius).max(0);
    let max_cy = (cam_cy + radius).min(world.chunks_y() as i64 - 1);

    for cy in min_cy..=max_cy {
        for cx in min_cx..=max_cx {
            let d_sq = (cx - cam_cx).pow(2) + (cy - cam_cy).pow(2);
            let tier = if 4 * d_sq < max_sq {
                LodTier::Near
            } else if 2 * d_sq < max_sq {
                LodTier::Medium
            } else if d_sq < max_sq {
                LodTier::Far
            } else {
                LodTier::Inactive
            };

            let Some(idx) = world.chunk_index(cx as u32, cy as u32) else {
                continue;
            };
            let chunk = world.chunk_mut(idx);
            chunk.lod = tier;
            chunk.active = tier != LodTier::Inactive;
            chunk.visible = tier == LodTier::Near;
            match tier {
                LodTier::Near => {
                    active.push(idx);
                    visible.push(idx);
                }
                LodTier::Medium | LodTier::Far => active.push(idx),
                LodTier::Inactive => {}
            }
        }
    }

    debug!(
        "classified {} active / {} visible chunks around chunk ({}, {})",
        active.len(),
        visible.len(),
        cam_cx,
        cam_cy
    );
    world.active = active;
    world.visible = visible;
}

/// Overload quality reduction: demote the first `fraction` of Medium-tier
/// chunks, in active-list order, to Far. At least one is demoted whenever
/// any Medium chunk exists. Returns the number demoted.
///
/// The demotion holds until the next classification pass overwrites tiers.
pub fn demote_medium_chunks(world: &mut WorldGrid, fraction: f32) -> usize {
    let fraction = fraction.clamp(0.0, 1.0);
    let medium_total = world
        .active
        .iter()
        .filter(|&&i| world.chunk(i).lod == LodTier::Medium)
        .count();
    if medium_total == 0 {
        return 0;
    }
    let target = ((medium_total as f32 * fraction).ceil() as usize).clamp(1, medium_total);

    let mut demoted = 0;
    for pos in 0..world.active.len() {
        if demoted == target {
            break;
        }
        let idx = world.active[pos];
        let chunk = world.chunk_mut(idx);
        if chunk.lod == LodTier::Medium {
            chunk.lod = LodTier::Far;
            demoted += 1;
        }
    }
    demoted
}
