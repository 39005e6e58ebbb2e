//! Spatial hashing using Morton encoding (Z-order curve).
//!
//! The index is a uniform grid of `grid_resolution³` cells centered on the
//! origin. Every tick it is rebuilt from scratch:
//!
//! 1. compute a Morton code per agent from its cell coordinates,
//! 2. LSD radix sort `(code, agent)` pairs on 4-bit digits,
//! 3. record the start/end of each occupied cell's run in the sorted array.
//!
//! All three passes are O(n). Clearing the cell table only touches cells that
//! were occupied in the previous rebuild, so the cost does not scale with
//! grid size. The index stores agent slot indices, never agent data.
//!
//! Positions outside the grid clamp to the nearest edge cell. Clamping moves
//! neighboring cells at most one apart, so the 3×3×3 window still never
//! misses a candidate.

use glam::Vec3;

/// Largest supported grid resolution per axis (128³ ≈ 2M cells).
pub const MAX_GRID_RESOLUTION: u32 = 128;

const EMPTY: u32 = u32::MAX;
const RADIX_BITS: u32 = 4;
const RADIX_SIZE: usize = 1 << RADIX_BITS;

/// Configuration for spatial hashing grid
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SpatialConfig {
    /// Size of each cell in world units
    pub cell_size: f32,
    /// Number of cells per dimension (grid is resolution³)
    pub grid_resolution: u32,
}

impl Default for SpatialConfig {
    fn default() -> Self {
        Self {
            cell_size: 0.12,
            grid_resolution: 32,
        }
    }
}

impl SpatialConfig {
    pub fn new(cell_size: f32, grid_resolution: u32) -> Self {
        assert!(grid_resolution.is_power_of_two(), "Grid resolution must be power of 2");
        assert!(
            grid_resolution <= MAX_GRID_RESOLUTION,
            "Grid resolution must be <= {MAX_GRID_RESOLUTION}"
        );
        assert!(cell_size > 0.0 && cell_size.is_finite(), "Cell size must be positive");
        Self {
            cell_size,
            grid_resolution,
        }
    }

    /// Smallest power-of-two grid covering `[-extent, extent]³`, capped at
    /// [`MAX_GRID_RESOLUTION`].
    pub fn for_extent(cell_size: f32, extent: f32) -> Self {
        let cells = (2.0 * extent / cell_size).ceil().max(1.0) as u32;
        let resolution = cells.next_power_of_two().min(MAX_GRID_RESOLUTION);
        Self::new(cell_size, resolution)
    }

    /// Total number of cells in the grid
    pub fn total_cells(&self) -> u32 {
        self.grid_resolution * self.grid_resolution * self.grid_resolution
    }

    /// Half of the grid's world-space width.
    pub fn half_extent(&self) -> f32 {
        self.grid_resolution as f32 * self.cell_size * 0.5
    }

    fn key_bits(&self) -> u32 {
        3 * self.grid_resolution.trailing_zeros()
    }
}

// Expand 10-bit integer to 30 bits by inserting 2 zeros between each bit
#[inline]
fn expand_bits(v: u32) -> u32 {
    let mut x = v & 0x0000_03FF;
    x = (x | (x << 16)) & 0x0300_00FF;
    x = (x | (x << 8)) & 0x0300_F00F;
    x = (x | (x << 4)) & 0x030C_30C3;
    x = (x | (x << 2)) & 0x0924_9249;
    x
}

/// 30-bit Morton code for a cell (each coordinate 0-1023).
#[inline]
pub fn morton_encode(x: u32, y: u32, z: u32) -> u32 {
    expand_bits(x) | (expand_bits(y) << 1) | (expand_bits(z) << 2)
}

/// Uniform-grid neighbor index over agent slot indices.
#[derive(Debug, Clone)]
pub struct SpatialIndex {
    config: SpatialConfig,
    /// Morton code per entry, sorted after rebuild.
    keys: Vec<u32>,
    /// Agent index per entry, permuted alongside `keys`.
    values: Vec<u32>,
    keys_scratch: Vec<u32>,
    values_scratch: Vec<u32>,
    /// First sorted entry of each cell, `EMPTY` when unoccupied.
    cell_start: Vec<u32>,
    /// One past the last sorted entry of each cell.
    cell_end: Vec<u32>,
    /// Cells written by the last rebuild.
    occupied: Vec<u32>,
}

impl SpatialIndex {
    pub fn new(config: SpatialConfig) -> Self {
        let cells = config.total_cells() as usize;
        Self {
            config,
            keys: Vec::new(),
            values: Vec::new(),
            keys_scratch: Vec::new(),
            values_scratch: Vec::new(),
            cell_start: vec![EMPTY; cells],
            cell_end: vec![EMPTY; cells],
            occupied: Vec::new(),
        }
    }

    /// Create an index with room for `capacity` agents, so rebuilds up to
    /// that size never allocate.
    pub fn with_capacity(config: SpatialConfig, capacity: usize) -> Self {
        let mut index = Self::new(config);
        index.keys.reserve(capacity);
        index.values.reserve(capacity);
        index.keys_scratch.reserve(capacity);
        index.values_scratch.reserve(capacity);
        index.occupied.reserve(capacity);
        index
    }

    #[inline]
    pub fn config(&self) -> &SpatialConfig {
        &self.config
    }

    /// Number of indexed agents.
    #[inline]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Number of non-empty cells.
    #[inline]
    pub fn occupied_cells(&self) -> usize {
        self.occupied.len()
    }

    /// Cell coordinates containing `pos`, clamped to the grid.
    #[inline]
    pub fn cell_of(&self, pos: Vec3) -> [u32; 3] {
        let max = (self.config.grid_resolution - 1) as f32;
        let normalized = (pos + Vec3::splat(self.config.half_extent())) / self.config.cell_size;
        let clamped = normalized.floor().clamp(Vec3::ZERO, Vec3::splat(max));
        // NaN clamps to the low edge
        [clamped.x as u32, clamped.y as u32, clamped.z as u32]
    }

    /// Morton key of the cell containing `pos`.
    #[inline]
    pub fn cell_key(&self, pos: Vec3) -> u32 {
        let [x, y, z] = self.cell_of(pos);
        morton_encode(x, y, z)
    }

    /// Clear and repopulate every bucket. Entry `i` of `positions` is agent `i`.
    pub fn rebuild<I>(&mut self, positions: I)
    where
        I: IntoIterator<Item = Vec3>,
    {
        for code in self.occupied.drain(..) {
            self.cell_start[code as usize] = EMPTY;
            self.cell_end[code as usize] = EMPTY;
        }
        self.keys.clear();
        self.values.clear();

        for (i, pos) in positions.into_iter().enumerate() {
            let [x, y, z] = self.cell_of(pos);
            self.keys.push(morton_encode(x, y, z));
            self.values.push(i as u32);
        }

        self.radix_sort();
        self.build_cell_table();
    }

    /// Stable LSD radix sort of `(keys, values)` on 4-bit digits.
    fn radix_sort(&mut self) {
        let n = self.keys.len();
        self.keys_scratch.clear();
        self.keys_scratch.resize(n, 0);
        self.values_scratch.clear();
        self.values_scratch.resize(n, 0);

        let passes = self.config.key_bits().div_ceil(RADIX_BITS);
        for pass in 0..passes {
            let shift = pass * RADIX_BITS;
            let digit = |key: u32| ((key >> shift) as usize) & (RADIX_SIZE - 1);

            // Histogram
            let mut offsets = [0usize; RADIX_SIZE];
            for &key in &self.keys {
                offsets[digit(key)] += 1;
            }

            // Exclusive prefix sum
            let mut running = 0;
            for slot in offsets.iter_mut() {
                let count = *slot;
                *slot = running;
                running += count;
            }

            // Scatter
            for i in 0..n {
                let key = self.keys[i];
                let dest = &mut offsets[digit(key)];
                self.keys_scratch[*dest] = key;
                self.values_scratch[*dest] = self.values[i];
                *dest += 1;
            }

            std::mem::swap(&mut self.keys, &mut self.keys_scratch);
            std::mem::swap(&mut self.values, &mut self.values_scratch);
        }
    }

    fn build_cell_table(&mut self) {
        let n = self.keys.len();
        for i in 0..n {
            let code = self.keys[i];
            if i == 0 || self.keys[i - 1] != code {
                if i > 0 {
                    self.cell_end[self.keys[i - 1] as usize] = i as u32;
                }
                self.cell_start[code as usize] = i as u32;
                self.occupied.push(code);
            }
        }
        if let Some(&last) = self.keys.last() {
            self.cell_end[last as usize] = n as u32;
        }
    }

    /// Agents in the cell whose key is `code`.
    #[inline]
    fn bucket(&self, code: u32) -> &[u32] {
        let start = self.cell_start[code as usize];
        if start == EMPTY {
            return &[];
        }
        let end = self.cell_end[code as usize];
        &self.values[start as usize..end as usize]
    }

    /// Agents sharing the cell that contains `pos`.
    pub fn cell_members(&self, pos: Vec3) -> &[u32] {
        self.bucket(self.cell_key(pos))
    }

    /// Call `callback` for every agent in the cell neighborhood of `pos`.
    ///
    /// For `radius <= cell_size` this is the 3×3×3 window around the cell
    /// containing `pos`; larger radii widen the window. The result is a
    /// superset of the agents within `radius`; callers must still filter by
    /// exact distance.
    #[inline]
    pub fn for_each_candidate<F>(&self, pos: Vec3, radius: f32, mut callback: F)
    where
        F: FnMut(u32),
    {
        if self.values.is_empty() {
            return;
        }
        let res = self.config.grid_resolution as i32;
        // never wider than the whole grid
        let span = if radius.is_finite() && radius > self.config.cell_size {
            (radius / self.config.cell_size).ceil().min(res as f32) as i32
        } else {
            1
        };
        let [cx, cy, cz] = self.cell_of(pos);
        let (cx, cy, cz) = (cx as i32, cy as i32, cz as i32);

        for z in (cz - span).max(0)..=(cz + span).min(res - 1) {
            for y in (cy - span).max(0)..=(cy + span).min(res - 1) {
                for x in (cx - span).max(0)..=(cx + span).min(res - 1) {
                    for &idx in self.bucket(morton_encode(x as u32, y as u32, z as u32)) {
                        callback(idx);
                    }
                }
            }
        }
    }

    /// Collect neighborhood candidates into `out` (cleared first).
    pub fn query_into(&self, pos: Vec3, radius: f32, out: &mut Vec<u32>) {
        out.clear();
        self.for_each_candidate(pos, radius, |idx| out.push(idx));
    }

    /// Neighborhood candidates of `pos`. Allocates; the simulator uses
    /// [`query_into`](Self::query_into) with a reused buffer.
    pub fn query(&self, pos: Vec3, radius: f32) -> Vec<u32> {
        let mut out = Vec::new();
        self.query_into(pos, radius, &mut out);
        out
    }

    /// Release the cell tables and entry buffers.
    pub fn release(&mut self) {
        self.keys = Vec::new();
        self.values = Vec::new();
        self.keys_scratch = Vec::new();
        self.values_scratch = Vec::new();
        self.cell_start = Vec::new();
        self.cell_end = Vec::new();
        self.occupied = Vec::new();
    }
}
