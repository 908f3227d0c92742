// Perlin noise implementation
// Gradient selection follows Ken Perlin's improved noise reference, with the
// permutation table built from a seeded RNG instead of a fixed array.

use glam::DVec3;
use noise::NoiseFn;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::error::GenError;

pub const TABLE_SIZE: usize = 256;

/// 256 shuffled entries followed by a copy of the same 256, so that
/// `table[i + 1]` never needs wrapping for any `i` below 511.
#[derive(Clone, PartialEq, Eq)]
pub struct PermutationTable {
    values: [u8; TABLE_SIZE * 2],
}

impl PermutationTable {
    /// Shuffle `0..=255` with `rng` and duplicate the result.
    ///
    /// Every index swaps with a position drawn from the full range rather
    /// than the shrinking tail, so the shuffle is slightly biased. That bias
    /// is part of the terrain distribution and must stay.
    pub fn build<R: Rng>(rng: &mut R) -> Self {
        let mut perm = [0u8; TABLE_SIZE];
        for (i, slot) in perm.iter_mut().enumerate() {
            *slot = i as u8;
        }
        for i in 0..TABLE_SIZE {
            let j = rng.random_range(0..TABLE_SIZE);
            perm.swap(i, j);
        }
        log::debug!("built permutation table, head {:?}", &perm[..8]);
        Self::duplicate(perm)
    }

    pub fn from_seed(seed: u64) -> Self {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        Self::build(&mut rng)
    }

    /// Unshuffled table: `[0, 1, .., 255, 0, 1, .., 255]`.
    pub fn identity() -> Self {
        let mut perm = [0u8; TABLE_SIZE];
        for (i, slot) in perm.iter_mut().enumerate() {
            *slot = i as u8;
        }
        Self::duplicate(perm)
    }

    pub fn from_permutation(perm: [u8; TABLE_SIZE]) -> Result<Self, GenError> {
        let mut seen = [false; TABLE_SIZE];
        for &v in &perm {
            if std::mem::replace(&mut seen[v as usize], true) {
                return Err(GenError::InvalidPermutation { duplicate: v });
            }
        }
        Ok(Self::duplicate(perm))
    }

    fn duplicate(perm: [u8; TABLE_SIZE]) -> Self {
        let mut values = [0u8; TABLE_SIZE * 2];
        values[..TABLE_SIZE].copy_from_slice(&perm);
        values[TABLE_SIZE..].copy_from_slice(&perm);
        Self { values }
    }

    #[inline]
    pub fn get(&self, index: usize) -> usize {
        self.values[index] as usize
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.values
    }
}

impl std::fmt::Debug for PermutationTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PermutationTable")
            .field("head", &&self.values[..8])
            .finish_non_exhaustive()
    }
}

/// Curve used to turn a fractional lattice offset into an interpolation weight.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Interpolation {
    /// `t²(3 − 2t)`. Reproduces the reference terrain.
    #[default]
    Smoothstep,
    /// Perlin's `6t⁵ − 15t⁴ + 10t³`.
    Fade,
}

impl Interpolation {
    #[inline]
    pub fn weight(self, t: f64) -> f64 {
        match self {
            Interpolation::Smoothstep => smoothstep(t),
            Interpolation::Fade => fade(t),
        }
    }
}

pub fn noise3d(x: f64, y: f64, z: f64, table: &PermutationTable) -> f64 {
    noise3d_with(x, y, z, table, Interpolation::Smoothstep)
}

/// Gradient noise at `(x, y, z)`, rescaled from roughly `[-1, 1]` to `[0, 1]`.
/// The result is not clamped and can stray slightly outside that range.
pub fn noise3d_with(
    x: f64,
    y: f64,
    z: f64,
    table: &PermutationTable,
    curve: Interpolation,
) -> f64 {
    let x_floor = x.floor();
    let y_floor = y.floor();
    let z_floor = z.floor();

    let x_int = (x_floor as i64 & 255) as usize;
    let y_int = (y_floor as i64 & 255) as usize;
    let z_int = (z_floor as i64 & 255) as usize;

    let x_frac = x - x_floor;
    let y_frac = y - y_floor;
    let z_frac = z - z_floor;

    let u = curve.weight(x_frac);
    let v = curve.weight(y_frac);
    let w = curve.weight(z_frac);

    // Hash coordinates of the 8 cube corners
    let a = table.get(x_int) + y_int;
    let aa = table.get(a) + z_int;
    let ab = table.get(a + 1) + z_int;
    let b = table.get(x_int + 1) + y_int;
    let ba = table.get(b) + z_int;
    let bb = table.get(b + 1) + z_int;

    let near = lerp(
        v,
        lerp(
            u,
            grad(table.get(aa), x_frac, y_frac, z_frac),
            grad(table.get(ba), x_frac - 1.0, y_frac, z_frac),
        ),
        lerp(
            u,
            grad(table.get(ab), x_frac, y_frac - 1.0, z_frac),
            grad(table.get(bb), x_frac - 1.0, y_frac - 1.0, z_frac),
        ),
    );
    let far = lerp(
        v,
        lerp(
            u,
            grad(table.get(aa + 1), x_frac, y_frac, z_frac - 1.0),
            grad(table.get(ba + 1), x_frac - 1.0, y_frac, z_frac - 1.0),
        ),
        lerp(
            u,
            grad(table.get(ab + 1), x_frac, y_frac - 1.0, z_frac - 1.0),
            grad(table.get(bb + 1), x_frac - 1.0, y_frac - 1.0, z_frac - 1.0),
        ),
    );

    (lerp(w, near, far) + 1.0) / 2.0
}

pub fn fade(t: f64) -> f64 {
    t * t * t * (t * (6.0 * t - 15.0) + 10.0)
}

pub fn smoothstep(t: f64) -> f64 {
    t * t * (3.0 - 2.0 * t)
}

pub fn lerp(t: f64, a: f64, b: f64) -> f64 {
    a + t * (b - a)
}

/// Dot product of the offset with one of 12 edge gradients picked by the low
/// four bits of `hash`. Codes 12..=15 repeat four of the twelve.
pub fn grad(hash: usize, x: f64, y: f64, z: f64) -> f64 {
    let h = hash & 15;
    let u = if h < 8 { x } else { y };
    let v = if h < 4 {
        y
    } else if h == 12 || h == 14 {
        x
    } else {
        z
    };
    (if h & 1 == 0 { u } else { -u }) + (if h & 2 == 0 { v } else { -v })
}

/// Owned table plus curve, usable anywhere a `noise::NoiseFn` is expected.
#[derive(Debug, Clone)]
pub struct GradientNoise {
    table: PermutationTable,
    interpolation: Interpolation,
}

impl GradientNoise {
    pub fn new(table: PermutationTable, interpolation: Interpolation) -> Self {
        Self { table, interpolation }
    }

    pub fn table(&self) -> &PermutationTable {
        &self.table
    }

    pub fn interpolation(&self) -> Interpolation {
        self.interpolation
    }

    pub fn sample(&self, point: DVec3) -> f64 {
        noise3d_with(point.x, point.y, point.z, &self.table, self.interpolation)
    }
}

impl NoiseFn<f64, 3> for GradientNoise {
    fn get(&self, point: [f64; 3]) -> f64 {
        self.sample(DVec3::from_array(point))
    }
}
