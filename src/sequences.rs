//! Low-discrepancy sequences for quasi-Monte Carlo integration.
//!
//! A low-discrepancy sequence fills the unit hypercube $[0, 1)^d$ more evenly than independent
//! uniform draws do: the star discrepancy of its first $N$ points decreases like
//! $(\log N)^d / N$ instead of $1 / \sqrt{N}$. Both sequences in this module are pure functions of
//! the point index, so that
//!
//! - calling [`LowDiscrepancy::point`] twice with the same arguments gives bit-identical points,
//! - every index range can be evaluated independently, e.g. on different threads, and
//! - a generator can be shared by reference without any locking.
//!
//! Point `0` of both sequences is the origin.

use crate::core::{from_f64, Error};
use num_traits::{Float, FromPrimitive};

/// A deterministic map from an index to a point of the unit hypercube.
pub trait LowDiscrepancy: Send + Sync {
    /// The largest dimension the sequence supports.
    fn max_dim(&self) -> usize;

    /// The coordinate along `axis` of the point with the given `index`. `axis` must be smaller than
    /// [`LowDiscrepancy::max_dim`].
    fn coordinate(&self, index: u64, axis: usize) -> f64;

    /// A short name of the sequence.
    fn name(&self) -> &'static str;

    /// Fails with [`Error::DimensionUnsupported`] unless `1 <= dim <= max_dim()`.
    fn check_dim(&self, dim: usize) -> Result<(), Error> {
        if dim == 0 || dim > self.max_dim() {
            Err(Error::DimensionUnsupported {
                dim,
                max: self.max_dim(),
            })
        } else {
            Ok(())
        }
    }

    /// Returns the point with the given `index` in $[0, 1)^d$, where $d$ is `dim`.
    fn point(&self, dim: usize, index: u64) -> Result<Vec<f64>, Error> {
        self.check_dim(dim)?;

        Ok((0..dim).map(|axis| self.coordinate(index, axis)).collect())
    }

    /// Writes the axes `offset..offset + x.len()` of the point with the given `index` into `x`.
    fn fill_point<T>(&self, index: u64, offset: usize, x: &mut [T]) -> Result<(), Error>
    where
        T: Float + FromPrimitive,
        Self: Sized,
    {
        self.check_dim(offset + x.len())?;
        fill_unchecked(self, index, offset, x);

        Ok(())
    }
}

/// [`LowDiscrepancy::fill_point`] without the dimension check.
pub(crate) fn fill_unchecked<T, S>(sequence: &S, index: u64, offset: usize, x: &mut [T])
where
    T: Float + FromPrimitive,
    S: LowDiscrepancy + ?Sized,
{
    for (axis, xi) in x.iter_mut().enumerate() {
        *xi = from_f64(sequence.coordinate(index, offset + axis));
    }
}

/// The largest double below one.
const BELOW_ONE: f64 = 1.0 - f64::EPSILON / 2.0;

/// The first 32 primes, the bases of the Halton sequence.
const PRIMES: [u64; 32] = [
    2, 3, 5, 7, 11, 13, 17, 19, 23, 29, 31, 37, 41, 43, 47, 53, 59, 61, 67, 71, 73, 79, 83, 89, 97,
    101, 103, 107, 109, 113, 127, 131,
];

/// The radical inverse of `index` in the given `base`, i.e. the `index`-th element of the van der
/// Corput sequence.
pub fn van_der_corput(mut index: u64, base: u64) -> f64 {
    debug_assert!(base >= 2);

    let inv_base = 1.0 / base as f64;
    let mut factor = inv_base;
    let mut result = 0.0;

    while index > 0 {
        result += (index % base) as f64 * factor;
        index /= base;
        factor *= inv_base;
    }

    // for huge indices the sum can round up to one
    result.min(BELOW_ONE)
}

/// The Halton sequence: axis $k$ is the van der Corput sequence in the $k$-th prime base.
#[derive(Clone, Copy, Debug, Default)]
pub struct Halton;

impl Halton {
    /// The largest supported dimension.
    pub const MAX_DIM: usize = PRIMES.len();
}

impl LowDiscrepancy for Halton {
    fn max_dim(&self) -> usize {
        Self::MAX_DIM
    }

    fn coordinate(&self, index: u64, axis: usize) -> f64 {
        van_der_corput(index, PRIMES[axis])
    }

    fn name(&self) -> &'static str {
        "halton"
    }
}

const SOBOL_DIM: usize = 16;
const SOBOL_BITS: usize = 64;

/// Direction numbers `v[c] = m_c 2^{63 - c}` of one Sobol axis, extended with the Bratley-Fox
/// recurrence for the primitive polynomial of degree `s` with inner coefficients `a`.
const fn sobol_directions(s: usize, a: u64, m: [u64; 6]) -> [u64; SOBOL_BITS] {
    let mut v = [0_u64; SOBOL_BITS];
    let mut c = 0;

    while c < s {
        v[c] = m[c] << (63 - c);
        c += 1;
    }

    while c < SOBOL_BITS {
        let mut value = v[c - s] ^ (v[c - s] >> s);
        let mut k = 1;
        while k < s {
            if (a >> (s - 1 - k)) & 1 == 1 {
                value ^= v[c - k];
            }
            k += 1;
        }
        v[c] = value;
        c += 1;
    }

    v
}

const fn van_der_corput_directions() -> [u64; SOBOL_BITS] {
    let mut v = [0_u64; SOBOL_BITS];
    let mut c = 0;

    while c < SOBOL_BITS {
        v[c] = 1 << (63 - c);
        c += 1;
    }

    v
}

/// Joe-Kuo direction numbers $(s, a, m_1, \ldots, m_s)$ for the axes `1..16`.
const fn sobol_table() -> [[u64; SOBOL_BITS]; SOBOL_DIM] {
    [
        van_der_corput_directions(),
        sobol_directions(1, 0, [1, 0, 0, 0, 0, 0]),
        sobol_directions(2, 1, [1, 3, 0, 0, 0, 0]),
        sobol_directions(3, 1, [1, 3, 1, 0, 0, 0]),
        sobol_directions(3, 2, [1, 1, 1, 0, 0, 0]),
        sobol_directions(4, 1, [1, 1, 3, 3, 0, 0]),
        sobol_directions(4, 4, [1, 3, 5, 13, 0, 0]),
        sobol_directions(5, 2, [1, 1, 5, 5, 17, 0]),
        sobol_directions(5, 4, [1, 1, 5, 5, 5, 0]),
        sobol_directions(5, 7, [1, 1, 7, 11, 19, 0]),
        sobol_directions(5, 11, [1, 1, 5, 1, 1, 0]),
        sobol_directions(5, 13, [1, 1, 1, 3, 11, 0]),
        sobol_directions(5, 14, [1, 3, 5, 5, 31, 0]),
        sobol_directions(6, 1, [1, 3, 3, 9, 7, 49]),
        sobol_directions(6, 13, [1, 1, 1, 15, 21, 21]),
        sobol_directions(6, 16, [1, 3, 1, 13, 27, 49]),
    ]
}

static SOBOL_DIRECTIONS: [[u64; SOBOL_BITS]; SOBOL_DIM] = sobol_table();

/// The Sobol' sequence in Gray-code order with Joe-Kuo direction numbers.
///
/// The point with index $i$ is computed directly as the XOR of the direction numbers selected by
/// the bits of the Gray code $i \oplus \lfloor i/2 \rfloor$, so no state is carried from one point
/// to the next.
#[derive(Clone, Copy, Debug, Default)]
pub struct Sobol;

impl Sobol {
    /// The largest supported dimension.
    pub const MAX_DIM: usize = SOBOL_DIM;
}

impl LowDiscrepancy for Sobol {
    fn max_dim(&self) -> usize {
        Self::MAX_DIM
    }

    fn coordinate(&self, index: u64, axis: usize) -> f64 {
        let directions = &SOBOL_DIRECTIONS[axis];
        let mut gray = index ^ (index >> 1);
        let mut x = 0_u64;
        let mut bit = 0;

        while gray != 0 {
            if gray & 1 == 1 {
                x ^= directions[bit];
            }
            gray >>= 1;
            bit += 1;
        }

        // keep the 53 leading bits, which a double represents exactly
        (x >> 11) as f64 / (1_u64 << 53) as f64
    }

    fn name(&self) -> &'static str {
        "sobol"
    }
}
