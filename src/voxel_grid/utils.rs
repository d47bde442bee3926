use std::mem::size_of;

use crate::voxel_grid::grid;

/// Format large numbers with KB, MB, GB, TB suffixes
pub fn format_bytes(bytes: usize) -> String {
	const KB: usize = 1024;
	const MB: usize = KB * 1024;
	const GB: usize = MB * 1024;
	const TB: usize = GB * 1024;

	if bytes >= TB {
		format!("{:.2} TB", bytes as f64 / TB as f64)
	} else if bytes >= GB {
		format!("{:.2} GB", bytes as f64 / GB as f64)
	} else if bytes >= MB {
		format!("{:.2} MB", bytes as f64 / MB as f64)
	} else if bytes >= KB {
		format!("{:.2} KB", bytes as f64 / KB as f64)
	} else {
		format!("{} bytes", bytes)
	}
}

impl grid::FeatureGrid {
	/// Report memory usage through `tracing`
	pub fn report_memory(&self) {
		let struct_overhead = size_of::<Self>() - size_of::<Vec<i32>>(); // Exclude dynamic storage
		let id_bytes = self.data.capacity() * size_of::<i32>();
		let total_memory = struct_overhead + id_bytes;

		tracing::info!(
			dims = %format!("{} x {} x {}", self.len_i, self.len_j, self.len_k),
			voxels = self.total_voxels,
			resolution = %format!("{:.3} x {:.3} x {:.3}", self.x_res, self.y_res, self.z_res),
			ids = %format_bytes(id_bytes),
			total = %format_bytes(total_memory),
			"feature grid memory"
		);
	}

	/// Convert (i, j, k) to a linear index
	#[inline]
	pub fn ijk_to_index(&self, i: usize, j: usize, k: usize) -> usize {
		i + j * self.len_i + k * self.len_i * self.len_j
	}

	/// Convert a linear index back to (i, j, k)
	#[inline]
	pub fn index_to_ijk(&self, index: usize) -> (usize, usize, usize) {
		let k = index / (self.len_i * self.len_j);
		let j = (index % (self.len_i * self.len_j)) / self.len_i;
		let i = index % self.len_i;
		(i, j, k)
	}

	/// Physical position of a voxel, measured from voxel (0, 0, 0)
	#[inline]
	pub fn voxel_position(&self, i: usize, j: usize, k: usize) -> [f32; 3] {
		[i as f32 * self.x_res, j as f32 * self.y_res, k as f32 * self.z_res]
	}

	/// Feature id by linear index (panics if out of bounds)
	#[inline]
	pub fn feature_at(&self, index: usize) -> i32 {
		self.data[index]
	}

	/// Feature id using (i, j, k) coordinates
	#[inline]
	pub fn feature_at_ijk(&self, i: usize, j: usize, k: usize) -> i32 {
		self.data[self.ijk_to_index(i, j, k)]
	}

	#[inline]
	pub fn dimensions(&self) -> (usize, usize, usize) {
		(self.len_i, self.len_j, self.len_k)
	}

	#[inline]
	pub fn resolution(&self) -> (f32, f32, f32) {
		(self.x_res, self.y_res, self.z_res)
	}

	/// Smallest voxel edge length
	pub fn min_resolution(&self) -> f32 {
		self.x_res.min(self.y_res).min(self.z_res)
	}

	/// Length of a voxel's body diagonal
	pub fn voxel_diagonal(&self) -> f32 {
		(self.x_res * self.x_res + self.y_res * self.y_res + self.z_res * self.z_res).sqrt()
	}

	/// Count the voxels owned by `feature`
	pub fn count_feature(&self, feature: i32) -> usize {
		self.data.iter().filter(|&&id| id == feature).count()
	}
}
