use crate::error::{FilterResult, Messenger};
use crate::orientation::math::{EulerArray, QuatArray};
use crate::orientation::symmetry::CrystalStructure;
use crate::transformation::microstructure::{EnsembleHandles, FeatureHandles, Microstructure};

/// Centroid written for every inserted plate until it is recomputed.
pub const PLACEHOLDER_CENTROID: [f32; 3] = [1.0, 2.0, 3.0];

/// Equivalent diameter written for every inserted plate until it is recomputed.
pub const PLACEHOLDER_DIAMETER: f32 = 4.0;

/// Role of a phase in the ensemble `PhaseTypes` array.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhaseType {
	Primary = 0,
	Precipitate = 1,
	Transformation = 2,
	Matrix = 3,
	Boundary = 4,
	Unknown = 999,
}

/// Morphology in the ensemble `ShapeTypes` array.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShapeType {
	Ellipsoid = 0,
	SuperEllipsoid = 1,
	CubeOctahedron = 2,
	Cylinder = 3,
	Unknown = 999,
}

/// What a freshly placed plate records in the feature table.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlateAttributes {
	pub quat: QuatArray,
	pub euler: EulerArray,
	pub phase: i32,
	pub parent: i32,
}

impl Microstructure {
	/// Add the ensemble row describing the inserted phase and return its index.
	pub fn append_transformation_phase(&mut self, h: &EnsembleHandles, structure: CrystalStructure) -> FilterResult<usize> {
		let phase = self.stats_ensembles.num_tuples();
		self.stats_ensembles.resize_tuples(phase + 1);
		self.stats_ensembles
			.set_tuple(h.crystal_structures, phase, &[structure.as_u32()])?;
		self.stats_ensembles
			.set_tuple(h.phase_types, phase, &[PhaseType::Transformation as u32])?;
		self.stats_ensembles
			.set_tuple(h.shape_types, phase, &[ShapeType::Ellipsoid as u32])?;
		tracing::debug!(phase, structure = structure.name(), "appended transformation phase");
		Ok(phase)
	}

	/// Grow the feature table by one row and fill it for a new plate.
	///
	/// Returns the new feature's id, which equals the old row count.
	pub fn push_feature(&mut self, h: &FeatureHandles, attrs: &PlateAttributes) -> FilterResult<i32> {
		let row = self.features.num_tuples();
		self.features.resize_tuples(row + 1);

		let f = &mut self.features;
		f.set_tuple(h.avg_quats, row, &attrs.quat)?;
		f.set_tuple(h.centroids, row, &PLACEHOLDER_CENTROID)?;
		f.set_tuple(h.euler_angles, row, &attrs.euler)?;
		f.set_tuple(h.equivalent_diameters, row, &[PLACEHOLDER_DIAMETER])?;
		f.set_tuple(h.phases, row, &[attrs.phase])?;
		f.set_tuple(h.parent_ids, row, &[attrs.parent])?;
		f.set_tuple(h.num_features_per_parent, row, &[0_i32])?;
		Ok(row as i32)
	}

	/// Size the volume ensemble table to the stats table and recount the
	/// features of every phase. Row 0 is neither reset nor counted.
	pub fn recount_features_per_phase(&mut self, h: &EnsembleHandles, fh: &FeatureHandles, msgs: &mut Messenger) -> FilterResult<()> {
		let ensembles = self.stats_ensembles.num_tuples();
		self.volume_ensembles.resize_tuples(ensembles);

		let phases = self.features.values::<i32>(fh.phases)?;
		let counts = self.volume_ensembles.values_mut::<i32>(h.num_features)?;
		for c in counts.iter_mut().skip(1) {
			*c = 0;
		}
		let mut stray = 0usize;
		for &phase in phases.iter().skip(1) {
			match usize::try_from(phase).ok().and_then(|p| counts.get_mut(p)) {
				Some(c) => *c += 1,
				None => stray += 1,
			}
		}
		if stray > 0 {
			msgs.warning(-1, format!("{} features have a phase outside the {} ensembles and were not counted", stray, ensembles));
		}
		Ok(())
	}
}
