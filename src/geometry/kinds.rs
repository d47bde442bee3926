use crate::error::{FilterError, FilterResult};
use crate::voxel_grid::grid::FeatureGrid;

/// Regular voxel lattice.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageGeometry {
	pub dimensions: [usize; 3],
	pub origin: [f32; 3],
	pub resolution: [f32; 3],
}

impl ImageGeometry {
	#[inline]
	pub fn num_cells(&self) -> usize {
		self.dimensions.iter().product()
	}

	/// Wrap a feature-id array laid out on this lattice (x fastest, z slowest).
	pub fn build_grid(&self, feature_ids: Vec<i32>) -> FilterResult<FeatureGrid> {
		if feature_ids.len() != self.num_cells() {
			return Err(FilterError::TupleCountMismatch {
				array: "FeatureIds".to_string(),
				expected: self.num_cells(),
				found: feature_ids.len(),
			});
		}
		let [nx, ny, nz] = self.dimensions;
		let mut grid = FeatureGrid::new(nx, ny, nz, self.resolution);
		grid.origin = self.origin;
		grid.data = feature_ids;
		Ok(grid)
	}
}

/// Lattice with arbitrary (monotonic) cell boundaries along each axis.
#[derive(Debug, Clone, PartialEq)]
pub struct RectGridGeometry {
	pub x_bounds: Vec<f32>,
	pub y_bounds: Vec<f32>,
	pub z_bounds: Vec<f32>,
}

impl RectGridGeometry {
	pub fn dimensions(&self) -> [usize; 3] {
		[
			self.x_bounds.len().saturating_sub(1),
			self.y_bounds.len().saturating_sub(1),
			self.z_bounds.len().saturating_sub(1),
		]
	}
}

/// Shared vertex list plus `N`-vertex connectivity.
#[derive(Debug, Clone, PartialEq)]
pub struct SharedTopology<const N: usize> {
	/// Flat `x, y, z` triples.
	pub vertices: Vec<f32>,
	/// Flat `N`-tuples of vertex indices.
	pub elements: Vec<i64>,
}

impl<const N: usize> SharedTopology<N> {
	#[inline]
	pub fn num_vertices(&self) -> usize {
		self.vertices.len() / 3
	}

	#[inline]
	pub fn num_elements(&self) -> usize {
		self.elements.len() / N
	}
}

/// Every geometry a data container can hold.
#[derive(Debug, Clone, PartialEq)]
pub enum Geometry {
	Image(ImageGeometry),
	RectGrid(RectGridGeometry),
	Vertex { vertices: Vec<f32> },
	Edge(SharedTopology<2>),
	Triangle(SharedTopology<3>),
	Quad(SharedTopology<4>),
	Tetrahedral(SharedTopology<4>),
}

impl Geometry {
	pub fn type_name(&self) -> &'static str {
		match self {
			Geometry::Image(_) => "ImageGeometry",
			Geometry::RectGrid(_) => "RectGridGeometry",
			Geometry::Vertex { .. } => "VertexGeometry",
			Geometry::Edge(_) => "EdgeGeometry",
			Geometry::Triangle(_) => "TriangleGeometry",
			Geometry::Quad(_) => "QuadGeometry",
			Geometry::Tetrahedral(_) => "TetrahedralGeometry",
		}
	}

	pub fn num_vertices(&self) -> Option<usize> {
		match self {
			Geometry::Image(_) | Geometry::RectGrid(_) => None,
			Geometry::Vertex { vertices } => Some(vertices.len() / 3),
			Geometry::Edge(t) => Some(t.num_vertices()),
			Geometry::Triangle(t) => Some(t.num_vertices()),
			Geometry::Quad(t) | Geometry::Tetrahedral(t) => Some(t.num_vertices()),
		}
	}

	/// Number of cells, edges or faces: whatever the geometry's top-level element is.
	pub fn num_elements(&self) -> usize {
		match self {
			Geometry::Image(g) => g.num_cells(),
			Geometry::RectGrid(g) => g.dimensions().iter().product(),
			Geometry::Vertex { vertices } => vertices.len() / 3,
			Geometry::Edge(t) => t.num_elements(),
			Geometry::Triangle(t) => t.num_elements(),
			Geometry::Quad(t) | Geometry::Tetrahedral(t) => t.num_elements(),
		}
	}

	pub fn dimensions(&self) -> Option<[usize; 3]> {
		match self {
			Geometry::Image(g) => Some(g.dimensions),
			Geometry::RectGrid(g) => Some(g.dimensions()),
			_ => None,
		}
	}

	pub fn as_image(&self) -> Option<&ImageGeometry> {
		match self {
			Geometry::Image(g) => Some(g),
			_ => None,
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn image_builds_feature_grid() {
		let img = ImageGeometry {
			dimensions: [2, 3, 4],
			origin: [0.0; 3],
			resolution: [0.5, 1.0, 2.0],
		};
		let grid = img.build_grid(vec![1; 24]).unwrap();
		assert_eq!(grid.total_voxels, 24);
		assert_eq!(grid.min_resolution(), 0.5);
		assert!(img.build_grid(vec![1; 23]).is_err());
	}

	#[test]
	fn topology_counts() {
		let quad = Geometry::Quad(SharedTopology::<4> {
			vertices: vec![0.0; 12],
			elements: vec![0, 1, 2, 3],
		});
		assert_eq!(quad.num_vertices(), Some(4));
		assert_eq!(quad.num_elements(), 1);
		assert_eq!(quad.type_name(), "QuadGeometry");
	}

	#[test]
	fn rect_grid_dimensions_from_bounds() {
		let rg = RectGridGeometry {
			x_bounds: vec![0.0, 1.0, 3.0],
			y_bounds: vec![0.0, 1.0],
			z_bounds: vec![0.0, 2.0],
		};
		assert_eq!(rg.dimensions(), [2, 1, 1]);
	}
}
