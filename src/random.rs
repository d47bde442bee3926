use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Source of uniform samples in `[0, 1)`.
pub trait UniformSource {
	fn next_uniform(&mut self) -> f64;

	/// Uniform sample narrowed to `f32`, clamped so rounding never reaches 1.
	#[inline]
	fn next_f32(&mut self) -> f32 {
		(self.next_uniform() as f32).min(1.0 - f32::EPSILON)
	}
}

impl<R: Rng> UniformSource for R {
	#[inline]
	fn next_uniform(&mut self) -> f64 {
		self.random::<f64>()
	}
}

/// Always yields the same value. Useful for reproducing edge cases.
#[derive(Debug, Clone, Copy)]
pub struct ConstantSource(pub f64);

impl UniformSource for ConstantSource {
	#[inline]
	fn next_uniform(&mut self) -> f64 {
		self.0
	}
}

/// Seed a fresh generator from one draw of `source`.
///
/// Gives each caller its own stream while keeping the whole run
/// reproducible from the parent source.
pub fn fork_rng<S: UniformSource + ?Sized>(source: &mut S) -> StdRng {
	let seed = (source.next_uniform() * u64::MAX as f64) as u64;
	StdRng::seed_from_u64(seed)
}

/// Seeded generator, or one seeded from OS entropy when `seed` is `None`.
pub fn make_rng(seed: Option<u64>) -> StdRng {
	match seed {
		Some(seed) => StdRng::seed_from_u64(seed),
		None => StdRng::from_os_rng(),
	}
}
