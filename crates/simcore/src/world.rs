//! Bounded chunk grid with O(1) coordinate lookup.
//!
//! The full chunk array is allocated once at init and never destroyed in
//! normal operation; the active and visible lists are transient and fully
//! rebuilt by each classification pass.

use log::info;

use crate::chunk::{Chunk, NEIGHBOR_COUNT};
use crate::config::{CHUNK_SIZE, MAX_WORLD_DIM};
use crate::error::SimError;
use crate::perf::WorldStats;
use crate::tile::Tile;

/// Neighbor slot offsets in (dx, dy), cardinal and diagonal.
const NEIGHBOR_OFFSETS: [(i32, i32); NEIGHBOR_COUNT] = [
    (-1, -1),
    (0, -1),
    (1, -1),
    (-1, 0),
    (1, 0),
    (-1, 1),
    (0, 1),
    (1, 1),
];

pub struct WorldGrid {
    width: u32,
    height: u32,
    chunks_x: u32,
    chunks_y: u32,
    chunks: Vec<Chunk>,
    /// Dense (cy * chunks_x + cx) -> chunk-array index table. Identity under
    /// the row-major allocation above, but kept as the single source for
    /// coordinate resolution.
    lookup: Vec<u32>,
    /// Chunks within the extended processing radius, rebuilt per pass.
    pub(crate) active: Vec<u32>,
    /// Chunks within the render radius, a subset of `active`.
    pub(crate) visible: Vec<u32>,
}

impl WorldGrid {
    /// Allocate and link the full chunk grid for a `width` x `height` tile
    /// world. All tiles start zero-initialized.
    pub fn new(width: u32, height: u32) -> Result<Self, SimError> {
        if width == 0 || height == 0 || width > MAX_WORLD_DIM || height > MAX_WORLD_DIM {
            return Err(SimError::InvalidDimensions {
                width,
                height,
                max: MAX_WORLD_DIM,
            });
        }

        let chunks_x = width.div_ceil(CHUNK_SIZE as u32);
        let chunks_y = height.div_ceil(CHUNK_SIZE as u32);
        let count = (chunks_x * chunks_y) as usize;

        let mut chunks = Vec::with_capacity(count);
        let mut lookup = Vec::with_capacity(count);
        for cy in 0..chunks_y {
            for cx in 0..chunks_x {
                lookup.push(chunks.len() as u32);
                chunks.push(Chunk::new(cx as u16, cy as u16));
            }
        }

        let mut world = Self {
            width,
            height,
            chunks_x,
            chunks_y,
            chunks,
            lookup,
            active: Vec::new(),
            visible: Vec::new(),
        };
        world.link_neighbors();

        info!(
            "world grid initialized: {}x{} tiles, {}x{} chunks ({} total)",
            width, height, chunks_x, chunks_y, count
        );
        Ok(world)
    }

    /// Wire up the 8-way neighbor indices. Runs once from `new`; re-running
    /// on unchanged dimensions produces an identical graph.
    pub(crate) fn link_neighbors(&mut self) {
        for i in 0..self.chunks.len() {
            let cx = self.chunks[i].cx as i32;
            let cy = self.chunks[i].cy as i32;
            let mut neighbors = [None; NEIGHBOR_COUNT];
            for (slot, (dx, dy)) in NEIGHBOR_OFFSETS.iter().enumerate() {
                let nx = cx + dx;
                let ny = cy + dy;
                if nx >= 0 && ny >= 0 && (nx as u32) < self.chunks_x && (ny as u32) < self.chunks_y
                {
                    neighbors[slot] = Some(ny as u32 * self.chunks_x + nx as u32);
                }
            }
            self.chunks[i].neighbors = neighbors;
        }
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    #[inline]
    pub fn chunks_x(&self) -> u32 {
        self.chunks_x
    }

    #[inline]
    pub fn chunks_y(&self) -> u32 {
        self.chunks_y
    }

    #[inline]
    pub fn chunk_count(&self) -> usize {
        self.chunks.len()
    }

    /// Resolve chunk coordinates to an array index, `None` out of bounds.
    #[inline]
    pub fn chunk_index(&self, cx: u32, cy: u32) -> Option<u32> {
        if cx < self.chunks_x && cy < self.chunks_y {
            Some(self.lookup[(cy * self.chunks_x + cx) as usize])
        } else {
            None
        }
    }

    pub fn chunk_at(&self, cx: u32, cy: u32) -> Option<&Chunk> {
        self.chunk_index(cx, cy).map(|i| &self.chunks[i as usize])
    }

    pub fn chunk_at_mut(&mut self, cx: u32, cy: u32) -> Option<&mut Chunk> {
        self.chunk_index(cx, cy)
            .map(|i| &mut self.chunks[i as usize])
    }

    #[inline]
    pub fn chunk(&self, index: u32) -> &Chunk {
        &self.chunks[index as usize]
    }

    #[inline]
    pub fn chunk_mut(&mut self, index: u32) -> &mut Chunk {
        &mut self.chunks[index as usize]
    }

    /// Tile index within its owning chunk for a world tile position.
    #[inline]
    pub fn tile_index(wx: u32, wy: u32) -> usize {
        (wy as usize & (CHUNK_SIZE - 1)) * CHUNK_SIZE + (wx as usize & (CHUNK_SIZE - 1))
    }

    fn owning_chunk(&self, wx: u32, wy: u32) -> Option<u32> {
        if wx < self.width && wy < self.height {
            self.chunk_index(wx / CHUNK_SIZE as u32, wy / CHUNK_SIZE as u32)
        } else {
            None
        }
    }

    pub fn tile_at(&self, wx: u32, wy: u32) -> Option<&Tile> {
        let idx = self.owning_chunk(wx, wy)?;
        Some(self.chunks[idx as usize].tile(Self::tile_index(wx, wy)))
    }

    /// Mutable tile access for external collaborators. The caller must mark
    /// the tile dirty afterwards (or use [`WorldGrid::edit_tile`], which
    /// does both).
    pub fn tile_at_mut(&mut self, wx: u32, wy: u32) -> Option<&mut Tile> {
        let idx = self.owning_chunk(wx, wy)?;
        Some(self.chunks[idx as usize].tile_mut(Self::tile_index(wx, wy)))
    }

    /// Mutate a tile and mark it dirty in one call. Returns false when the
    /// position is out of bounds.
    pub fn edit_tile(&mut self, wx: u32, wy: u32, f: impl FnOnce(&mut Tile)) -> bool {
        let Some(idx) = self.owning_chunk(wx, wy) else {
            return false;
        };
        let tile_idx = Self::tile_index(wx, wy);
        let chunk = &mut self.chunks[idx as usize];
        f(chunk.tile_mut(tile_idx));
        chunk.mark_tile_dirty(tile_idx);
        true
    }

    /// Set a tile's dirty bit and its chunk's dirty flag.
    pub fn mark_dirty(&mut self, chunk_index: u32, tile_index: usize) {
        self.chunks[chunk_index as usize].mark_tile_dirty(tile_index);
    }

    /// [`WorldGrid::mark_dirty`] addressed by world tile position.
    pub fn mark_dirty_at(&mut self, wx: u32, wy: u32) -> bool {
        let Some(idx) = self.owning_chunk(wx, wy) else {
            return false;
        };
        self.chunks[idx as usize].mark_tile_dirty(Self::tile_index(wx, wy));
        true
    }

    #[inline]
    pub fn active_chunks(&self) -> &[u32] {
        &self.active
    }

    #[inline]
    pub fn visible_chunks(&self) -> &[u32] {
        &self.visible
    }

    /// Copy visible chunk indices into a caller-owned buffer, returning the
    /// number written. Renderer-facing variant of [`visible_chunks`].
    ///
    /// [`visible_chunks`]: WorldGrid::visible_chunks
    pub fn copy_visible_chunks(&self, out: &mut [u32]) -> usize {
        let n = self.visible.len().min(out.len());
        out[..n].copy_from_slice(&self.visible[..n]);
        n
    }

    /// Sum the cached per-chunk stats over the whole grid. Runs
    /// single-threaded after the update pass has been joined.
    pub fn aggregate_stats(&self) -> WorldStats {
        let mut stats = WorldStats::default();
        for chunk in &self.chunks {
            stats.population += chunk.stats.population as u64;
            stats.jobs += chunk.stats.jobs as u64;
            stats.tax_revenue += chunk.stats.tax_revenue as u64;
        }
        stats
    }

    /// Base pointer for the dispatcher's disjoint-range update jobs.
    pub(crate) fn chunks_mut_ptr(&mut self) -> *mut Chunk {
        self.chunks.as_mut_ptr()
    }
}
