//! The explicit context the insertion runs against.

use crate::data::array::DataArray;
use crate::data::container::DataContainerArray;
use crate::data::matrix::{ArrayHandle, AttributeMatrix, MatrixKind};
use crate::error::{FilterError, FilterResult};
use crate::transformation::settings::ArrayNames;
use crate::voxel_grid::grid::FeatureGrid;

/// Voxel grid plus the feature and ensemble tables that describe it.
#[derive(Debug, Clone)]
pub struct Microstructure {
	pub grid: FeatureGrid,
	pub features: AttributeMatrix,
	/// Ensemble table holding crystal structure, phase type and shape type.
	pub stats_ensembles: AttributeMatrix,
	/// Ensemble table holding per-phase feature counts.
	pub volume_ensembles: AttributeMatrix,
}

/// Resolved feature-table arrays.
#[derive(Debug, Clone, Copy)]
pub struct FeatureHandles {
	pub phases: ArrayHandle,
	pub avg_quats: ArrayHandle,
	pub centroids: ArrayHandle,
	pub euler_angles: ArrayHandle,
	pub equivalent_diameters: ArrayHandle,
	pub parent_ids: ArrayHandle,
	pub num_features_per_parent: ArrayHandle,
}

/// Resolved ensemble-table arrays.
#[derive(Debug, Clone, Copy)]
pub struct EnsembleHandles {
	pub crystal_structures: ArrayHandle,
	pub phase_types: ArrayHandle,
	pub shape_types: ArrayHandle,
	pub num_features: ArrayHandle,
}

/// Where a microstructure lives inside a [`DataContainerArray`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MicrostructureLocation {
	pub container: String,
	pub cell_matrix: String,
	pub feature_matrix: String,
	pub stats_ensemble_matrix: String,
	pub volume_ensemble_matrix: String,
}

impl Default for MicrostructureLocation {
	fn default() -> Self {
		Self {
			container: "SyntheticVolumeDataContainer".to_string(),
			cell_matrix: "CellData".to_string(),
			feature_matrix: "CellFeatureData".to_string(),
			stats_ensemble_matrix: "CellEnsembleData".to_string(),
			volume_ensemble_matrix: "CellEnsembleData".to_string(),
		}
	}
}

impl Microstructure {
	/// Check every input array and create the parent bookkeeping arrays.
	///
	/// All prerequisites are verified before anything is created.
	pub fn data_check(&mut self, names: &ArrayNames) -> FilterResult<(FeatureHandles, EnsembleHandles)> {
		let f = &self.features;
		let phases = f.require_typed::<i32>(&names.phases, 1)?;
		let avg_quats = f.require_typed::<f32>(&names.avg_quats, 4)?;
		let centroids = f.require_typed::<f32>(&names.centroids, 3)?;
		let euler_angles = f.require_typed::<f32>(&names.euler_angles, 3)?;
		let equivalent_diameters = f.require_typed::<f32>(&names.equivalent_diameters, 1)?;

		let e = &self.stats_ensembles;
		let crystal_structures = e.require_typed::<u32>(&names.crystal_structures, 1)?;
		let phase_types = e.require_typed::<u32>(&names.phase_types, 1)?;
		let shape_types = e.require_typed::<u32>(&names.shape_types, 1)?;
		let num_features = self.volume_ensembles.require_typed::<i32>(&names.num_features, 1)?;

		if self.grid.data.len() != self.grid.total_voxels {
			return Err(FilterError::TupleCountMismatch {
				array: names.feature_ids.clone(),
				expected: self.grid.total_voxels,
				found: self.grid.data.len(),
			});
		}

		let parent_ids = self.features.create_if_absent(&names.parent_ids, 1, -1_i32)?;
		let num_features_per_parent = self.features.create_if_absent(&names.num_features_per_parent, 1, 0_i32)?;

		Ok((
			FeatureHandles {
				phases,
				avg_quats,
				centroids,
				euler_angles,
				equivalent_diameters,
				parent_ids,
				num_features_per_parent,
			},
			EnsembleHandles {
				crystal_structures,
				phase_types,
				shape_types,
				num_features,
			},
		))
	}

	/// Number of feature rows, including the reserved row 0.
	#[inline]
	pub fn num_features(&self) -> usize {
		self.features.num_tuples()
	}

	/// Overwrite the centroid and equivalent-diameter columns with values
	/// measured from the voxel grid.
	pub fn recompute_feature_geometry(&mut self, names: &ArrayNames) -> FilterResult<()> {
		let n = self.num_features();
		let centroids = self.features.require_typed::<f32>(&names.centroids, 3)?;
		let diameters = self.features.require_typed::<f32>(&names.equivalent_diameters, 1)?;

		let measured = self.grid.find_centroids(n);
		self.features.values_mut::<f32>(centroids)?.copy_from_slice(&measured);
		let measured = self.grid.find_equivalent_diameters(n);
		self.features.values_mut::<f32>(diameters)?.copy_from_slice(&measured);
		Ok(())
	}

	/// Pull a microstructure out of a container holding an image geometry.
	///
	/// The matrices are removed from the container; hand them back with
	/// [`Microstructure::return_to`].
	pub fn take_from(dca: &mut DataContainerArray, at: &MicrostructureLocation, names: &ArrayNames) -> FilterResult<Self> {
		let dc = dca.container(&at.container)?;
		let image = dc
			.geometry
			.as_ref()
			.and_then(|g| g.as_image())
			.ok_or_else(|| FilterError::MissingGeometry(at.container.clone()))?;
		let ids = dc
			.matrix(&at.cell_matrix)?
			.array_by_name(&names.feature_ids)?
			.view::<i32>(1)?
			.to_vec();
		let grid = image.build_grid(ids)?;

		let dc = dca.container_mut(&at.container)?;
		let features = dc.take_matrix(&at.feature_matrix)?;
		let stats_ensembles = dc.take_matrix(&at.stats_ensemble_matrix)?;
		let volume_ensembles = if at.volume_ensemble_matrix == at.stats_ensemble_matrix {
			stats_ensembles.clone()
		} else {
			dc.take_matrix(&at.volume_ensemble_matrix)?
		};

		Ok(Self {
			grid,
			features,
			stats_ensembles,
			volume_ensembles,
		})
	}

	/// Write the grid and tables back where [`Microstructure::take_from`] found them.
	pub fn return_to(self, dca: &mut DataContainerArray, at: &MicrostructureLocation, names: &ArrayNames) -> FilterResult<()> {
		let dc = dca.container_mut(&at.container)?;
		let cells = dc.matrix_mut(&at.cell_matrix)?;
		cells.add_array(DataArray::from_vec(names.feature_ids.clone(), 1, self.grid.data)?)?;

		if at.volume_ensemble_matrix == at.stats_ensemble_matrix {
			let mut merged = self.stats_ensembles;
			let counts = self.volume_ensembles.array_by_name(&names.num_features)?.clone();
			merged.add_array(counts)?;
			dc.add_matrix(merged);
		} else {
			dc.add_matrix(self.stats_ensembles);
			dc.add_matrix(self.volume_ensembles);
		}
		dc.add_matrix(self.features);
		Ok(())
	}
}

/// Empty feature table of `rows` rows with every column the insertion reads.
pub fn empty_feature_table(name: &str, rows: usize, names: &ArrayNames) -> FilterResult<AttributeMatrix> {
	let mut m = AttributeMatrix::new(name, MatrixKind::Feature, vec![rows]);
	m.add_array(DataArray::filled(names.phases.as_str(), 1, rows, 0_i32))?;
	m.add_array(DataArray::filled(names.avg_quats.as_str(), 4, rows, 0.0_f32))?;
	m.add_array(DataArray::filled(names.centroids.as_str(), 3, rows, 0.0_f32))?;
	m.add_array(DataArray::filled(names.euler_angles.as_str(), 3, rows, 0.0_f32))?;
	m.add_array(DataArray::filled(names.equivalent_diameters.as_str(), 1, rows, 0.0_f32))?;
	Ok(m)
}

/// Ensemble table of `rows` rows holding every ensemble column the insertion reads.
pub fn empty_ensemble_table(name: &str, rows: usize, names: &ArrayNames) -> FilterResult<AttributeMatrix> {
	let mut m = AttributeMatrix::new(name, MatrixKind::Ensemble, vec![rows]);
	m.add_array(DataArray::filled(names.crystal_structures.as_str(), 1, rows, 999_u32))?;
	m.add_array(DataArray::filled(names.phase_types.as_str(), 1, rows, 999_u32))?;
	m.add_array(DataArray::filled(names.shape_types.as_str(), 1, rows, 999_u32))?;
	m.add_array(DataArray::filled(names.num_features.as_str(), 1, rows, 0_i32))?;
	Ok(m)
}

#[cfg(test)]
mod tests {
	use super::*;

	fn small() -> Microstructure {
		let names = ArrayNames::default();
		let ensembles = empty_ensemble_table("CellEnsembleData", 2, &names).unwrap();
		Microstructure {
			grid: FeatureGrid::filled(2, 2, 2, [1.0; 3], 1),
			features: empty_feature_table("CellFeatureData", 2, &names).unwrap(),
			stats_ensembles: ensembles.clone(),
			volume_ensembles: ensembles,
		}
	}

	#[test]
	fn data_check_creates_parent_arrays() {
		let names = ArrayNames::default();
		let mut ms = small();
		let (fh, _) = ms.data_check(&names).unwrap();
		assert_eq!(ms.features.values::<i32>(fh.parent_ids).unwrap(), &[-1, -1]);
		assert_eq!(ms.features.values::<i32>(fh.num_features_per_parent).unwrap(), &[0, 0]);
	}

	#[test]
	fn data_check_reports_missing_before_creating() {
		let names = ArrayNames {
			avg_quats: "Quats".to_string(),
			..ArrayNames::default()
		};
		let mut ms = small();
		let err = ms.data_check(&names).unwrap_err();
		assert_eq!(err.code(), -90002);
		assert!(ms.features.handle(&names.parent_ids).is_none());
	}

	#[test]
	fn wrong_width_is_rejected() {
		let names = ArrayNames::default();
		let mut ms = small();
		ms.features
			.add_array(DataArray::filled(names.centroids.as_str(), 2, 2, 0.0_f32))
			.unwrap();
		assert_eq!(ms.data_check(&names).unwrap_err().code(), -90003);
	}

	#[test]
	fn geometry_recompute_fills_columns() {
		let names = ArrayNames::default();
		let mut ms = small();
		ms.recompute_feature_geometry(&names).unwrap();
		let h = ms.features.require("Centroids").unwrap();
		assert_eq!(&ms.features.values::<f32>(h).unwrap()[3..6], &[0.5, 0.5, 0.5]);
	}
}
