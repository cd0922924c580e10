//! 16×16 tile aggregate: the unit of LOD, dirty tracking, and scheduling.

use serde::{Deserialize, Serialize};

use crate::config::TILES_PER_CHUNK;
use crate::tile::Tile;

/// Neighbor slots: 4 cardinal + 4 diagonal.
pub const NEIGHBOR_COUNT: usize = 8;

/// Update-frequency tier assigned by the visibility classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum LodTier {
    /// Rendered and updated every step.
    Near,
    /// Updated every 4th step.
    Medium,
    /// Updated every 16th step.
    Far,
    /// Outside the processing radius; not updated at all.
    #[default]
    Inactive,
}

/// 256-bit per-tile dirty bitset.
///
/// Stored as four 64-bit words internally; callers only see bit indices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DirtyMask {
    words: [u64; 4],
}

impl DirtyMask {
    #[inline]
    pub fn set(&mut self, index: usize) {
        debug_assert!(index < TILES_PER_CHUNK);
        self.words[index / 64] |= 1u64 << (index % 64);
    }

    #[inline]
    pub fn is_set(&self, index: usize) -> bool {
        debug_assert!(index < TILES_PER_CHUNK);
        self.words[index / 64] & (1u64 << (index % 64)) != 0
    }

    #[inline]
    pub fn any(&self) -> bool {
        self.words.iter().any(|&w| w != 0)
    }

    pub fn count(&self) -> u32 {
        self.words.iter().map(|w| w.count_ones()).sum()
    }

    pub fn clear_all(&mut self) {
        self.words = [0; 4];
    }

    /// Visit every set bit in ascending index order.
    pub fn for_each_set(&self, mut f: impl FnMut(usize)) {
        for (w, &word) in self.words.iter().enumerate() {
            let mut bits = word;
            while bits != 0 {
                let bit = bits.trailing_zeros() as usize;
                f(w * 64 + bit);
                bits &= bits - 1;
            }
        }
    }
}

/// Cached per-chunk aggregate of tile stats, recomputed by the updater.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ChunkStats {
    pub population: u32,
    pub jobs: u32,
    pub tax_revenue: u32,
}

pub struct Chunk {
    pub cx: u16,
    pub cy: u16,
    pub lod: LodTier,
    pub active: bool,
    pub visible: bool,
    pub loaded: bool,
    /// Tick of the last completed update pass.
    pub last_update: u64,
    pub stats: ChunkStats,
    /// Indices into the world chunk array, `None` off the world edge.
    /// Fixed once at init; never owning.
    pub neighbors: [Option<u32>; NEIGHBOR_COUNT],
    tiles: [Tile; TILES_PER_CHUNK],
    dirty: DirtyMask,
    dirty_flag: bool,
}

impl Chunk {
    pub fn new(cx: u16, cy: u16) -> Self {
        Self {
            cx,
            cy,
            lod: LodTier::Inactive,
            active: false,
            visible: false,
            loaded: true,
            last_update: 0,
            stats: ChunkStats::default(),
            neighbors: [None; NEIGHBOR_COUNT],
            tiles: [Tile::default(); TILES_PER_CHUNK],
            dirty: DirtyMask::default(),
            dirty_flag: false,
        }
    }

    #[inline]
    pub fn tile(&self, index: usize) -> &Tile {
        &self.tiles[index]
    }

    /// Mutable tile access. A caller mutating tile state outside the
    /// updater must follow up with [`Chunk::mark_tile_dirty`].
    #[inline]
    pub fn tile_mut(&mut self, index: usize) -> &mut Tile {
        &mut self.tiles[index]
    }

    #[inline]
    pub fn tiles(&self) -> &[Tile; TILES_PER_CHUNK] {
        &self.tiles
    }

    /// Set one tile's dirty bit and the chunk-level dirty flag.
    /// This is the only way dirty state is ever raised.
    #[inline]
    pub fn mark_tile_dirty(&mut self, index: usize) {
        self.dirty.set(index);
        self.dirty_flag = true;
    }

    #[inline]
    pub fn is_dirty(&self) -> bool {
        self.dirty_flag
    }

    #[inline]
    pub fn dirty_mask(&self) -> DirtyMask {
        self.dirty
    }

    /// Drop all dirty state after a completed update pass.
    /// Only the chunk updater calls this.
    pub(crate) fn clear_dirty(&mut self) {
        self.dirty.clear_all();
        self.dirty_flag = false;
    }

    /// Clear classification state ahead of a rebuild pass.
    pub(crate) fn deactivate(&mut self) {
        self.lod = LodTier::Inactive;
        self.active = false;
        self.visible = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mark_dirty_sets_bit_and_flag() {
        let mut c = Chunk::new(0, 0);
        assert!(!c.is_dirty());
        c.mark_tile_dirty(5);
        c.mark_tile_dirty(200);
        assert!(c.is_dirty());
        assert!(c.dirty_mask().is_set(5));
        assert!(c.dirty_mask().is_set(200));
        assert!(!c.dirty_mask().is_set(6));
        assert_eq!(c.dirty_mask().count(), 2);
    }

    #[test]
    fn test_clear_dirty_zeroes_everything() {
        let mut c = Chunk::new(0, 0);
        for i in [0, 63, 64, 127, 128, 191, 192, 255] {
            c.mark_tile_dirty(i);
        }
        c.clear_dirty();
        assert!(!c.is_dirty());
        assert!(!c.dirty_mask().any());
        assert_eq!(c.dirty_mask().count(), 0);
    }

    #[test]
    fn test_for_each_set_ascending_across_words() {
        let mut m = DirtyMask::default();
        for i in [255, 5, 64, 200] {
            m.set(i);
        }
        let mut seen = Vec::new();
        m.for_each_set(|i| seen.push(i));
        assert_eq!(seen, vec![5, 64, 200, 255]);
    }

    #[test]
    fn test_chunk_flag_equals_or_of_bits() {
        let mut c = Chunk::new(3, 7);
        assert_eq!(c.is_dirty(), c.dirty_mask().any());
        c.mark_tile_dirty(17);
        assert_eq!(c.is_dirty(), c.dirty_mask().any());
        c.clear_dirty();
        assert_eq!(c.is_dirty(), c.dirty_mask().any());
    }

    #[test]
    fn test_deactivate_clears_classification_only() {
        let mut c = Chunk::new(1, 1);
        c.lod = LodTier::Near;
        c.active = true;
        c.visible = true;
        c.mark_tile_dirty(9);
        c.deactivate();
        assert_eq!(c.lod, LodTier::Inactive);
        assert!(!c.active && !c.visible);
        // Dirty state is orthogonal to classification.
        assert!(c.is_dirty());
    }
}
