//! Builds an explicit geometry inside a data container from raw arrays.

use crate::data::array::{DataArray, Element};
use crate::data::container::{DataArrayPath, DataContainerArray};
use crate::data::matrix::{AttributeMatrix, MatrixKind};
use crate::error::{FilterError, FilterResult, Messenger};
use crate::geometry::kinds::{Geometry, ImageGeometry, RectGridGeometry, SharedTopology};

/// Which geometry to build, with its inputs and the matrices to attach.
#[derive(Debug, Clone)]
pub enum GeometrySelection {
	Image {
		dimensions: [i64; 3],
		origin: [f32; 3],
		resolution: [f32; 3],
		cell_matrix: String,
	},
	RectGrid {
		x_bounds: DataArrayPath,
		y_bounds: DataArrayPath,
		z_bounds: DataArrayPath,
		cell_matrix: String,
	},
	Vertex {
		vertices: DataArrayPath,
		vertex_matrix: String,
	},
	Edge {
		vertices: DataArrayPath,
		edges: DataArrayPath,
		vertex_matrix: String,
		edge_matrix: String,
	},
	Triangle {
		vertices: DataArrayPath,
		triangles: DataArrayPath,
		vertex_matrix: String,
		face_matrix: String,
	},
	Quad {
		vertices: DataArrayPath,
		quads: DataArrayPath,
		vertex_matrix: String,
		face_matrix: String,
	},
	Tetrahedral {
		vertices: DataArrayPath,
		tetrahedra: DataArrayPath,
		vertex_matrix: String,
		cell_matrix: String,
	},
}

/// Filter settings.
#[derive(Debug, Clone)]
pub struct CreateGeometry {
	pub container: String,
	pub selection: GeometrySelection,
	pub treat_warnings_as_errors: bool,
}

/// Geometry plus the matrices to attach, assembled before anything is written.
struct Built {
	geometry: Geometry,
	matrices: Vec<AttributeMatrix>,
}

impl CreateGeometry {
	pub const HUMAN_LABEL: &'static str = "Create Geometry";

	pub fn new(container: impl Into<String>, selection: GeometrySelection) -> Self {
		Self {
			container: container.into(),
			selection,
			treat_warnings_as_errors: false,
		}
	}

	/// Run the filter. Precondition failures and escalated warnings return
	/// `Err` and leave `dca` untouched; plain warnings land on `msgs` and
	/// suppress the "Complete" status.
	pub fn execute(&self, dca: &mut DataContainerArray, msgs: &mut Messenger) -> FilterResult<()> {
		let warnings_before = msgs.warnings().count();
		let built = match self.data_check(dca, msgs) {
			Ok(built) => built,
			Err(e) => return Err(msgs.error(e)),
		};
		let Some(built) = built else {
			return Ok(());
		};

		tracing::debug!(
			container = %self.container,
			geometry = built.geometry.type_name(),
			elements = built.geometry.num_elements(),
			"attaching geometry"
		);
		let dc = dca.container_mut(&self.container)?;
		dc.geometry = Some(built.geometry);
		for am in built.matrices {
			dc.add_matrix(am);
		}

		if msgs.warnings().count() == warnings_before {
			msgs.status("Complete");
		}
		Ok(())
	}

	/// Validate inputs and assemble the geometry. `Ok(None)` means a
	/// non-fatal problem was reported and nothing should be attached.
	fn data_check(&self, dca: &DataContainerArray, msgs: &mut Messenger) -> FilterResult<Option<Built>> {
		let dc = dca.container(&self.container)?;
		if dc.geometry.is_some() {
			return Err(FilterError::GeometryAlreadyExists(self.container.clone()));
		}

		match &self.selection {
			GeometrySelection::Image {
				dimensions,
				origin,
				resolution,
				cell_matrix,
			} => {
				if dimensions.iter().any(|&d| d <= 0) {
					return Err(FilterError::InvalidParameter(format!(
						"One of the dimensions has a size less than or equal to zero; all dimensions must be positive\n\
						 X Dimension: {}\nY Dimension: {}\nZ Dimension: {}",
						dimensions[0], dimensions[1], dimensions[2]
					)));
				}
				let image = ImageGeometry {
					dimensions: dimensions.map(|d| d as usize),
					origin: *origin,
					resolution: *resolution,
				};
				let cells = AttributeMatrix::new(cell_matrix.clone(), MatrixKind::Cell, image.dimensions.to_vec());
				Ok(Some(Built {
					geometry: Geometry::Image(image),
					matrices: vec![cells],
				}))
			}
			GeometrySelection::RectGrid {
				x_bounds,
				y_bounds,
				z_bounds,
				cell_matrix,
			} => {
				let xb = read_array::<f32>(dca, x_bounds, 1)?;
				let yb = read_array::<f32>(dca, y_bounds, 1)?;
				let zb = read_array::<f32>(dca, z_bounds, 1)?;
				if xb.len() < 2 || yb.len() < 2 || zb.len() < 2 {
					return Err(FilterError::InvalidParameter(format!(
						"One of the bounds arrays has a size less than two; all sizes must be at least two\n\
						 X Bounds Size: {}\nY Bounds Size: {}\nZ Bounds Size: {}",
						xb.len(),
						yb.len(),
						zb.len()
					)));
				}

				for (axis, bounds) in [("X", &xb), ("Y", &yb), ("Z", &zb)] {
					if let Some(i) = first_non_increasing(bounds) {
						msgs.data_quality(
							self.treat_warnings_as_errors,
							format!(
								"Supplied {} Bounds array is not strictly increasing; this results in negative resolutions\n\
								 Index {} Value: {}\nIndex {} Value: {}",
								axis,
								i - 1,
								bounds[i - 1],
								i,
								bounds[i]
							),
						)?;
						return Ok(None);
					}
				}

				let grid = RectGridGeometry {
					x_bounds: xb,
					y_bounds: yb,
					z_bounds: zb,
				};
				let cells = AttributeMatrix::new(cell_matrix.clone(), MatrixKind::Cell, grid.dimensions().to_vec());
				Ok(Some(Built {
					geometry: Geometry::RectGrid(grid),
					matrices: vec![cells],
				}))
			}
			GeometrySelection::Vertex { vertices, vertex_matrix } => {
				let verts = read_array::<f32>(dca, vertices, 3)?;
				let n = verts.len() / 3;
				Ok(Some(Built {
					geometry: Geometry::Vertex { vertices: verts },
					matrices: vec![AttributeMatrix::new(vertex_matrix.clone(), MatrixKind::Vertex, vec![n])],
				}))
			}
			GeometrySelection::Edge {
				vertices,
				edges,
				vertex_matrix,
				edge_matrix,
			} => {
				let topo = self.read_topology::<2>(dca, vertices, edges, "edge", msgs)?;
				let matrices = vec![
					AttributeMatrix::new(vertex_matrix.clone(), MatrixKind::Vertex, vec![topo.num_vertices()]),
					AttributeMatrix::new(edge_matrix.clone(), MatrixKind::Edge, vec![topo.num_elements()]),
				];
				Ok(Some(Built {
					geometry: Geometry::Edge(topo),
					matrices,
				}))
			}
			GeometrySelection::Triangle {
				vertices,
				triangles,
				vertex_matrix,
				face_matrix,
			} => {
				let topo = self.read_topology::<3>(dca, vertices, triangles, "triangle", msgs)?;
				let matrices = vec![
					AttributeMatrix::new(vertex_matrix.clone(), MatrixKind::Vertex, vec![topo.num_vertices()]),
					AttributeMatrix::new(face_matrix.clone(), MatrixKind::Face, vec![topo.num_elements()]),
				];
				Ok(Some(Built {
					geometry: Geometry::Triangle(topo),
					matrices,
				}))
			}
			GeometrySelection::Quad {
				vertices,
				quads,
				vertex_matrix,
				face_matrix,
			} => {
				let topo = self.read_topology::<4>(dca, vertices, quads, "quadrilateral", msgs)?;
				let matrices = vec![
					AttributeMatrix::new(vertex_matrix.clone(), MatrixKind::Vertex, vec![topo.num_vertices()]),
					AttributeMatrix::new(face_matrix.clone(), MatrixKind::Face, vec![topo.num_elements()]),
				];
				Ok(Some(Built {
					geometry: Geometry::Quad(topo),
					matrices,
				}))
			}
			GeometrySelection::Tetrahedral {
				vertices,
				tetrahedra,
				vertex_matrix,
				cell_matrix,
			} => {
				let topo = self.read_topology::<4>(dca, vertices, tetrahedra, "tetrahedra", msgs)?;
				let matrices = vec![
					AttributeMatrix::new(vertex_matrix.clone(), MatrixKind::Vertex, vec![topo.num_vertices()]),
					AttributeMatrix::new(cell_matrix.clone(), MatrixKind::Cell, vec![topo.num_elements()]),
				];
				Ok(Some(Built {
					geometry: Geometry::Tetrahedral(topo),
					matrices,
				}))
			}
		}
	}

	/// Copy a vertex list and an `N`-wide index list, flagging indices that
	/// fall outside the vertex list.
	fn read_topology<const N: usize>(
		&self,
		dca: &DataContainerArray,
		vertices: &DataArrayPath,
		elements: &DataArrayPath,
		label: &str,
		msgs: &mut Messenger,
	) -> FilterResult<SharedTopology<N>> {
		let verts = read_array::<f32>(dca, vertices, 3)?;
		let elems = read_array::<i64>(dca, elements, N)?;
		let num_verts = (verts.len() / 3) as i64;

		let max = elems.iter().copied().max().unwrap_or(0);
		let min = elems.iter().copied().min().unwrap_or(0);
		if max + 1 > num_verts {
			msgs.data_quality(
				self.treat_warnings_as_errors,
				format!(
					"Supplied {} list contains a vertex index larger than the total length of the supplied shared vertex list\n\
					 Index Value: {}\nNumber of Vertices: {}",
					label, max, num_verts
				),
			)?;
		} else if min < 0 {
			msgs.data_quality(
				self.treat_warnings_as_errors,
				format!("Supplied {} list contains a negative vertex index\nIndex Value: {}", label, min),
			)?;
		}

		Ok(SharedTopology {
			vertices: verts,
			elements: elems,
		})
	}
}

/// Index of the first value that does not exceed its predecessor.
fn first_non_increasing(bounds: &[f32]) -> Option<usize> {
	bounds.windows(2).position(|w| w[0] >= w[1]).map(|i| i + 1)
}

fn read_array<T: Element>(dca: &DataContainerArray, path: &DataArrayPath, components: usize) -> FilterResult<Vec<T>> {
	let array: &DataArray = dca.array(path)?;
	Ok(array.view::<T>(components)?.to_vec())
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn non_increasing_finds_first_offender() {
		assert_eq!(first_non_increasing(&[0.0, 1.0, 2.0]), None);
		assert_eq!(first_non_increasing(&[0.0, 1.0, 0.5, 2.0]), Some(2));
		assert_eq!(first_non_increasing(&[0.0, 0.0]), Some(1));
	}
}
