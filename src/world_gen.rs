use std::ops::Index;
use std::time::Instant;

use glam::{DVec3, IVec2, UVec3};
use noise::NoiseFn;
use rayon::prelude::*;

use crate::config::GeneratorConfig;
use crate::error::GenError;
use crate::perlin::{GradientNoise, PermutationTable};

/// Fixed shift applied to the row and column axes before scaling.
pub const CHUNK_BIAS: i64 = 16;
/// A cell is solid when its octave sum is strictly above this.
pub const SOLID_THRESHOLD: f64 = 0.5;

#[repr(u8)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Occupancy {
    #[default]
    Empty,
    Solid,
}

impl Occupancy {
    pub fn from_density(density: f64) -> Self {
        if density > SOLID_THRESHOLD {
            Occupancy::Solid
        } else {
            Occupancy::Empty
        }
    }

    pub fn is_solid(self) -> bool {
        self == Occupancy::Solid
    }
}

/// Dense `height × width × depth` voxel grid stored layer-major in one buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OccupancyField {
    height: usize,
    width: usize,
    depth: usize,
    cells: Vec<Occupancy>,
}

impl OccupancyField {
    pub fn height(&self) -> usize {
        self.height
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    /// `(height, width, depth)` as a vector, saturating at `u32::MAX`.
    pub fn dimensions(&self) -> UVec3 {
        let clamp = |n: usize| u32::try_from(n).unwrap_or(u32::MAX);
        UVec3::new(clamp(self.height), clamp(self.width), clamp(self.depth))
    }

    #[inline]
    fn offset(&self, layer: usize, row: usize, column: usize) -> Option<usize> {
        if layer < self.height && row < self.width && column < self.depth {
            Some((layer * self.width + row) * self.depth + column)
        } else {
            None
        }
    }

    pub fn get(&self, layer: usize, row: usize, column: usize) -> Option<Occupancy> {
        self.offset(layer, row, column).map(|i| self.cells[i])
    }

    pub fn is_solid(&self, layer: usize, row: usize, column: usize) -> bool {
        self.get(layer, row, column).is_some_and(Occupancy::is_solid)
    }

    /// All cells of one layer, `width` rows of `depth` cells each.
    pub fn layer(&self, layer: usize) -> Option<&[Occupancy]> {
        let stride = self.width * self.depth;
        let start = layer.checked_mul(stride)?;
        self.cells.get(start..start.checked_add(stride)?)
    }

    pub fn rows(&self, layer: usize) -> impl Iterator<Item = &[Occupancy]> {
        self.layer(layer).unwrap_or(&[]).chunks_exact(self.depth)
    }

    pub fn cells(&self) -> &[Occupancy] {
        &self.cells
    }

    pub fn solid_count(&self) -> usize {
        self.cells.iter().filter(|c| c.is_solid()).count()
    }
}

impl Index<(usize, usize, usize)> for OccupancyField {
    type Output = Occupancy;

    fn index(&self, (layer, row, column): (usize, usize, usize)) -> &Occupancy {
        match self.offset(layer, row, column) {
            Some(i) => &self.cells[i],
            None => panic!(
                "voxel ({layer}, {row}, {column}) outside {}x{}x{} field",
                self.height, self.width, self.depth
            ),
        }
    }
}

/// Samples a noise source over every cell of a chunk and thresholds it.
pub struct ChunkGenerator<N = GradientNoise> {
    config: GeneratorConfig,
    noise: N,
}

impl ChunkGenerator<GradientNoise> {
    pub fn new(config: GeneratorConfig, table: PermutationTable) -> Result<Self, GenError> {
        let noise = GradientNoise::new(table, config.interpolation);
        Self::with_noise(config, noise)
    }

    pub fn seeded(config: GeneratorConfig, seed: u64) -> Result<Self, GenError> {
        config.validate()?;
        Self::new(config, PermutationTable::from_seed(seed))
    }
}

impl<N: NoiseFn<f64, 3> + Sync> ChunkGenerator<N> {
    pub fn with_noise(config: GeneratorConfig, noise: N) -> Result<Self, GenError> {
        config.validate()?;
        Ok(Self { config, noise })
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    pub fn noise(&self) -> &N {
        &self.noise
    }

    /// Octave sum at one cell of the chunk whose row/column origin is `origin`.
    pub fn density(&self, layer: usize, row: usize, column: usize, origin: IVec2) -> f64 {
        let mut point = DVec3::new(
            layer as f64,
            (row as i64 + origin.x as i64 + CHUNK_BIAS) as f64,
            (column as i64 + origin.y as i64 + CHUNK_BIAS) as f64,
        ) * self.config.frequency;

        let mut amplitude = 1.0;
        let mut sum = 0.0;
        for _ in 0..self.config.octaves {
            sum += self.noise.get(point.to_array()) * amplitude;
            point *= 2.0;
            amplitude *= self.config.persistence;
        }
        sum
    }

    pub fn generate(&self, origin: IVec2) -> Result<OccupancyField, GenError> {
        let GeneratorConfig { height, width, depth, .. } = self.config;
        let total = self.config.cell_count().ok_or_else(|| GenError::Allocation {
            cells: (height as u128)
                .saturating_mul(width as u128)
                .saturating_mul(depth as u128),
        })?;

        let mut cells = Vec::new();
        cells
            .try_reserve_exact(total)
            .map_err(|_| GenError::Allocation { cells: total as u128 })?;

        log::debug!(
            "generating {height}x{width}x{depth} chunk at {origin} ({} octaves, parallel: {})",
            self.config.octaves,
            self.config.parallel
        );
        let start = Instant::now();

        let layer_stride = width * depth;
        let cell = |i: usize| {
            let layer = i / layer_stride;
            let row = (i % layer_stride) / depth;
            let column = i % depth;
            Occupancy::from_density(self.density(layer, row, column, origin))
        };
        if self.config.parallel {
            cells.par_extend((0..total).into_par_iter().map(cell));
        } else {
            cells.extend((0..total).map(cell));
        }

        let field = OccupancyField { height, width, depth, cells };
        log::info!(
            "chunk at {origin} generated in {:?}, {} of {total} cells solid",
            start.elapsed(),
            field.solid_count()
        );
        Ok(field)
    }
}

/// Build a chunk from `config` and an already shuffled `table`.
pub fn generate_field(
    config: &GeneratorConfig,
    origin: IVec2,
    table: &PermutationTable,
) -> Result<OccupancyField, GenError> {
    ChunkGenerator::new(config.clone(), table.clone())?.generate(origin)
}
