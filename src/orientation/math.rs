//! Orientation conversions in the passive (Bunge) convention.
//!
//! Quaternions are stored as `[x, y, z, w]`, matching the layout of the
//! feature `AvgQuats` array. Rotation matrices map sample coordinates into
//! the crystal frame; the transpose maps crystal directions back out.

use std::f32::consts::PI;

use nalgebra::{Matrix3, Vector3};

/// Quaternion in storage order `[x, y, z, w]`.
pub type QuatArray = [f32; 4];

/// Bunge Euler angles `[phi1, Phi, phi2]` in radians.
pub type EulerArray = [f32; 3];

const TWO_PI: f32 = 2.0 * PI;

/// Quaternion to orientation matrix.
pub fn qu2om(q: &QuatArray) -> Matrix3<f32> {
	let [x, y, z, w] = *q;
	let qq = w * w - (x * x + y * y + z * z);

	Matrix3::new(
		qq + 2.0 * x * x,
		2.0 * (x * y - w * z),
		2.0 * (x * z + w * y),
		2.0 * (y * x + w * z),
		qq + 2.0 * y * y,
		2.0 * (y * z - w * x),
		2.0 * (z * x - w * y),
		2.0 * (z * y + w * x),
		qq + 2.0 * z * z,
	)
}

/// Axis-angle pair to orientation matrix. The axis need not be normalised.
pub fn ax2om(axis: &Vector3<f32>, angle: f32) -> Matrix3<f32> {
	let n = axis.norm();
	if n == 0.0 {
		return Matrix3::identity();
	}
	let a = axis / n;
	let (s, c) = angle.sin_cos();
	let omc = 1.0 - c;

	let mut om = Matrix3::zeros();
	for i in 0..3 {
		om[(i, i)] = a[i] * a[i] * omc + c;
	}
	let q = omc * a.x * a.y;
	om[(0, 1)] = q - s * a.z;
	om[(1, 0)] = q + s * a.z;
	let q = omc * a.y * a.z;
	om[(1, 2)] = q - s * a.x;
	om[(2, 1)] = q + s * a.x;
	let q = omc * a.z * a.x;
	om[(2, 0)] = q - s * a.y;
	om[(0, 2)] = q + s * a.y;
	om
}

/// Orientation matrix to Bunge Euler angles, each wrapped into `[0, 2pi)`.
pub fn om2eu(om: &Matrix3<f32>) -> EulerArray {
	let a33 = om[(2, 2)].clamp(-1.0, 1.0);
	let mut eu = if a33.abs() < 1.0 {
		let zeta = 1.0 / (1.0 - a33 * a33).sqrt();
		[
			(om[(2, 0)] * zeta).atan2(-om[(2, 1)] * zeta),
			a33.acos(),
			(om[(0, 2)] * zeta).atan2(om[(1, 2)] * zeta),
		]
	} else if a33 > 0.0 {
		[om[(0, 1)].atan2(om[(0, 0)]), 0.0, 0.0]
	} else {
		[om[(0, 1)].atan2(om[(0, 0)]), PI, 0.0]
	};

	for angle in eu.iter_mut() {
		if *angle < 0.0 {
			*angle += TWO_PI;
		}
		if *angle >= TWO_PI {
			*angle -= TWO_PI;
		}
	}
	eu
}

/// Bunge Euler angles to quaternion with a non-negative scalar part.
pub fn eu2qu(eu: &EulerArray) -> QuatArray {
	let sigma = 0.5 * (eu[0] + eu[2]);
	let delta = 0.5 * (eu[0] - eu[2]);
	let (s, c) = (0.5 * eu[1]).sin_cos();

	let q = [
		-s * delta.cos(),
		-s * delta.sin(),
		-c * sigma.sin(),
		c * sigma.cos(),
	];
	if q[3] < 0.0 { q.map(|v| -v) } else { q }
}

/// Bunge Euler angles to orientation matrix.
pub fn eu2om(eu: &EulerArray) -> Matrix3<f32> {
	let (s1, c1) = eu[0].sin_cos();
	let (s, c) = eu[1].sin_cos();
	let (s2, c2) = eu[2].sin_cos();

	Matrix3::new(
		c1 * c2 - s1 * s2 * c,
		s1 * c2 + c1 * s2 * c,
		s2 * s,
		-c1 * s2 - s1 * c2 * c,
		-s1 * s2 + c1 * c2 * c,
		c2 * s,
		s1 * s,
		-c1 * s,
		c,
	)
}

#[cfg(test)]
mod tests {
	use super::*;

	fn close(a: &Matrix3<f32>, b: &Matrix3<f32>) -> bool {
		(a - b).abs().max() < 1e-5
	}

	#[test]
	fn identity_quaternion_gives_identity_matrix() {
		assert!(close(&qu2om(&[0.0, 0.0, 0.0, 1.0]), &Matrix3::identity()));
	}

	#[test]
	fn euler_round_trip_through_quaternion() {
		let eu = [0.3_f32, 1.1, 2.0];
		let via_quat = qu2om(&eu2qu(&eu));
		assert!(close(&via_quat, &eu2om(&eu)));

		let back = om2eu(&via_quat);
		for (a, b) in back.iter().zip(eu.iter()) {
			assert!((a - b).abs() < 1e-4, "{back:?} vs {eu:?}");
		}
	}

	#[test]
	fn axis_angle_matches_quaternion_path() {
		let axis = Vector3::new(1.0_f32, 1.0, 1.0);
		let angle = 60.0_f32.to_radians();
		let s = (0.5 * angle).sin() / 3.0_f32.sqrt();
		let q = [s, s, s, (0.5 * angle).cos()];
		assert!(close(&ax2om(&axis, angle), &qu2om(&q)));
	}

	#[test]
	fn axis_angle_is_orthonormal_for_unnormalised_axis() {
		let om = ax2om(&Vector3::new(3.0, 0.0, 4.0), 1.0);
		assert!(close(&(om * om.transpose()), &Matrix3::identity()));
		assert!((om.determinant() - 1.0).abs() < 1e-5);
	}

	#[test]
	fn degenerate_euler_keeps_in_plane_rotation() {
		let eu = [0.7_f32, 0.0, 0.0];
		let back = om2eu(&eu2om(&eu));
		assert!((back[0] - 0.7).abs() < 1e-5);
		assert_eq!(back[1], 0.0);
	}

	#[test]
	fn trace_encodes_axis_angle() {
		let om = ax2om(&Vector3::z(), 0.5);
		assert!((0.5 * (om.trace() - 1.0) - 0.5_f32.cos()).abs() < 1e-5);
	}
}
