pub mod error;
pub mod random;

pub mod voxel_grid {
	pub mod info;
	pub mod grid;
	pub mod utils;
	pub mod plate;
	pub mod stats;
}

pub mod orientation {
	pub mod math;
	pub mod symmetry;
}

pub mod data {
	pub mod array;
	pub mod matrix;
	pub mod container;
}

pub mod geometry {
	pub mod kinds;
	pub mod create;
}

pub mod transformation {
	pub mod settings;
	pub mod microstructure;
	pub mod habit_plane;
	pub mod attributes;
	pub mod insert;
}
