use std::f32::consts::PI;

use crate::voxel_grid::grid::FeatureGrid;

impl FeatureGrid {
	/// Voxel count of every feature id in `0..num_features`.
	///
	/// Ids outside that range are ignored.
	pub fn count_voxels_per_feature(&self, num_features: usize) -> Vec<usize> {
		let mut counts = vec![0usize; num_features];
		for &id in &self.data {
			if id >= 0 && (id as usize) < num_features {
				counts[id as usize] += 1;
			}
		}
		counts
	}

	/// Mean voxel position of every feature, as flat `x, y, z` triples.
	///
	/// Positions are measured the same way plates are stamped: voxel index
	/// times resolution, without the origin. Empty features get `(0, 0, 0)`.
	pub fn find_centroids(&self, num_features: usize) -> Vec<f32> {
		let mut sums = vec![0.0_f64; 3 * num_features];
		let mut counts = vec![0usize; num_features];

		for (idx, &id) in self.data.iter().enumerate() {
			if id < 0 || id as usize >= num_features {
				continue;
			}
			let f = id as usize;
			let (i, j, k) = self.index_to_ijk(idx);
			let p = self.voxel_position(i, j, k);
			sums[3 * f] += p[0] as f64;
			sums[3 * f + 1] += p[1] as f64;
			sums[3 * f + 2] += p[2] as f64;
			counts[f] += 1;
		}

		sums.chunks(3)
			.zip(&counts)
			.flat_map(|(s, &n)| {
				let n = n.max(1) as f64;
				[(s[0] / n) as f32, (s[1] / n) as f32, (s[2] / n) as f32]
			})
			.collect()
	}

	/// Diameter of the sphere with each feature's volume.
	pub fn find_equivalent_diameters(&self, num_features: usize) -> Vec<f32> {
		let voxel_volume = self.x_res * self.y_res * self.z_res;
		self.count_voxels_per_feature(num_features)
			.into_iter()
			.map(|n| {
				let volume = n as f32 * voxel_volume;
				(6.0 * volume / PI).cbrt()
			})
			.collect()
	}
}
