//! Habit-plane variant selection and the crystal-to-sample transform.

use nalgebra::{Matrix3, Vector3};

use crate::random::UniformSource;

/// Upper bounds of the six index orderings, each covering a sixth of `[0, 1)`.
const PERMUTATION_BOUNDS: [f32; 5] = [0.16667, 0.33333, 0.5, 0.66667, 0.83333];

/// Index orderings, in the order of `PERMUTATION_BOUNDS`.
const PERMUTATIONS: [[usize; 3]; 6] = [[0, 1, 2], [0, 2, 1], [1, 0, 2], [1, 2, 0], [2, 0, 1], [2, 1, 0]];

/// Polarity coin of the variant selection. It is never redrawn, so every
/// component flips together whenever the coherence draw passes.
const POLARITY_COIN: f32 = 0.0;

/// Random crystal-frame starting plane with components in `[0, 20)`.
pub fn random_crystal_plane<R: UniformSource + ?Sized>(rng: &mut R) -> Vector3<f32> {
	let x = (rng.next_uniform() * 20.0) as f32;
	let y = (rng.next_uniform() * 20.0) as f32;
	let z = (rng.next_uniform() * 20.0) as f32;
	Vector3::new(x, y, z)
}

/// Pick a symmetric variant of `plane` in place.
///
/// Draws once for polarity and once for the index permutation.
pub fn select_variant<R: UniformSource + ?Sized>(plane: &mut Vector3<f32>, coherent_fraction: f32, rng: &mut R) {
	let coherence = rng.next_f32();
	if coherence < coherent_fraction && POLARITY_COIN < 0.5 {
		*plane = -*plane;
	}

	let r = rng.next_f32();
	let slot = PERMUTATION_BOUNDS.iter().take_while(|&&b| r >= b).count();
	let [a, b, c] = PERMUTATIONS[slot];
	let source = *plane;
	*plane = Vector3::new(source[a], source[b], source[c]);
}

/// Express a crystal-frame plane normal in the sample frame of `g`.
///
/// `g` maps sample to crystal coordinates, so its transpose maps back.
#[inline]
pub fn to_sample_frame(g: &Matrix3<f32>, crystal_plane: &Vector3<f32>) -> Vector3<f32> {
	g.transpose() * crystal_plane
}
