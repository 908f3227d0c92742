//! Seeded 3D gradient noise sampled over a fixed-size voxel chunk.
//!
//! A [`PermutationTable`] is shuffled from an explicit RNG, the
//! [`perlin`] evaluator turns it into continuous noise, and
//! [`ChunkGenerator`] thresholds octave sums into an [`OccupancyField`]
//! addressed by `(layer, row, column)`.

pub mod config;
pub mod error;
pub mod perlin;
pub mod world_gen;

pub use config::{
    GeneratorConfig, BASE_FREQUENCY, CHUNK_SIZE, FRACTAL_PERSISTENCE, MAX_HEIGHT, MAX_OCTAVES,
};
pub use error::{ErrorKind, GenError};
pub use perlin::{noise3d, GradientNoise, Interpolation, PermutationTable};
pub use world_gen::{generate_field, ChunkGenerator, Occupancy, OccupancyField};
