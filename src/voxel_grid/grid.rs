/// 3D voxel grid of feature ids
#[derive(Clone, Debug, PartialEq)]
pub struct FeatureGrid {
	pub len_i: usize,  // Number of voxels along X
	pub len_j: usize,  // Number of voxels along Y
	pub len_k: usize,  // Number of voxels along Z
	pub total_voxels: usize, // Total number of voxels IxJxK
	pub x_res: f32,  // Voxel edge length along X
	pub y_res: f32,  // Voxel edge length along Y
	pub z_res: f32,  // Voxel edge length along Z
	pub origin: [f32; 3],  // Physical position of voxel (0, 0, 0)
	pub data: Vec<i32>,  // One feature id per voxel, X fastest
}

impl FeatureGrid {
	/// Create a new grid, fully allocated with every voxel set to feature 0
	pub fn new(len_i: usize, len_j: usize, len_k: usize, resolution: [f32; 3]) -> Self {
		let total_voxels = len_i * len_j * len_k;

		Self {
			len_i,
			len_j,
			len_k,
			total_voxels,
			x_res: resolution[0],
			y_res: resolution[1],
			z_res: resolution[2],
			origin: [0.0; 3],
			data: vec![0; total_voxels],
		}
	}

	/// Create a grid where every voxel belongs to `feature`
	pub fn filled(len_i: usize, len_j: usize, len_k: usize, resolution: [f32; 3], feature: i32) -> Self {
		let mut grid = Self::new(len_i, len_j, len_k, resolution);
		grid.data.fill(feature);
		grid
	}
}
