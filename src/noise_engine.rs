//! Seeded 2D simplex noise and fractal Brownian motion.
//!
//! Each [`NoiseEngine`] owns its permutation table, so independent noise
//! fields (one per renderer) can live side by side.

use noise::NoiseFn;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

/// Gradient directions (x, y components of the 12 simplex edge gradients)
const GRAD3: [[f64; 2]; 12] = [
    [1.0, 1.0], [-1.0, 1.0], [1.0, -1.0], [-1.0, -1.0],
    [1.0, 0.0], [-1.0, 0.0], [1.0, 0.0], [-1.0, 0.0],
    [0.0, 1.0], [0.0, -1.0], [0.0, 1.0], [0.0, -1.0],
];

/// Skew factor: (sqrt(3) - 1) / 2
const F2: f64 = 0.366_025_403_784_438_6;
/// Unskew factor: (3 - sqrt(3)) / 6
const G2: f64 = 0.211_324_865_405_187_1;

/// Output scaling that brings the summed corner contributions into [-1, 1]
const OUTPUT_SCALE: f64 = 70.0;

/// Deterministic 2D gradient noise source.
#[derive(Clone)]
pub struct NoiseEngine {
    seed: u64,
    perm: [u8; 512],
    perm_mod12: [u8; 512],
}

impl NoiseEngine {
    /// Build the permutation table with a seeded Fisher-Yates shuffle.
    /// The same seed always reproduces the same field.
    pub fn new(seed: u64) -> Self {
        let mut base: Vec<u8> = (0..=255u8).collect();
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        base.shuffle(&mut rng);

        let mut perm = [0u8; 512];
        let mut perm_mod12 = [0u8; 512];
        for i in 0..512 {
            perm[i] = base[i & 255];
            perm_mod12[i] = perm[i] % 12;
        }

        Self { seed, perm, perm_mod12 }
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Sample simplex noise. Output lies in [-1, 1].
    pub fn noise2d(&self, x: f64, y: f64) -> f64 {
        let s = (x + y) * F2;
        let i = (x + s).floor();
        let j = (y + s).floor();
        let t = (i + j) * G2;
        let x0 = x - (i - t);
        let y0 = y - (j - t);

        let (i1, j1) = if x0 > y0 { (1, 0) } else { (0, 1) };

        let x1 = x0 - i1 as f64 + G2;
        let y1 = y0 - j1 as f64 + G2;
        let x2 = x0 - 1.0 + 2.0 * G2;
        let y2 = y0 - 1.0 + 2.0 * G2;

        // Lattice coordinates only matter modulo 256
        let ii = (i as i64 & 255) as usize;
        let jj = (j as i64 & 255) as usize;
        let gi0 = self.perm_mod12[ii + self.perm[jj] as usize] as usize;
        let gi1 = self.perm_mod12[ii + i1 + self.perm[jj + j1] as usize] as usize;
        let gi2 = self.perm_mod12[ii + 1 + self.perm[jj + 1] as usize] as usize;

        let n0 = corner(GRAD3[gi0], x0, y0);
        let n1 = corner(GRAD3[gi1], x1, y1);
        let n2 = corner(GRAD3[gi2], x2, y2);

        OUTPUT_SCALE * (n0 + n1 + n2)
    }

    /// Multi-octave noise, normalised by the total amplitude so the result
    /// stays roughly in [-1, 1].
    pub fn fbm(&self, x: f64, y: f64, octaves: u32, lacunarity: f64, gain: f64) -> f64 {
        let mut value = 0.0;
        let mut amplitude = 1.0;
        let mut frequency = 1.0;
        let mut max_value = 0.0;

        for _ in 0..octaves {
            value += amplitude * self.noise2d(x * frequency, y * frequency);
            max_value += amplitude;
            amplitude *= gain;
            frequency *= lacunarity;
        }

        if max_value == 0.0 {
            0.0
        } else {
            value / max_value
        }
    }
}

impl NoiseFn<f64, 2> for NoiseEngine {
    fn get(&self, point: [f64; 2]) -> f64 {
        self.noise2d(point[0], point[1])
    }
}

#[inline]
fn corner(grad: [f64; 2], x: f64, y: f64) -> f64 {
    let mut t = 0.5 - x * x - y * y;
    if t < 0.0 {
        0.0
    } else {
        t *= t;
        t * t * (grad[0] * x + grad[1] * y)
    }
}
