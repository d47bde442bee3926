use nalgebra::Vector3;

use crate::error::{FilterError, FilterResult};
use crate::orientation::symmetry::CrystalStructure;

/// Knobs of the transformation-phase insertion.
#[derive(Debug, Clone, PartialEq)]
pub struct InsertionSettings {
	/// Only features of this phase receive plates.
	pub parent_phase: i32,
	/// Rotation about the habit-plane normal, in degrees.
	pub misorientation_degrees: f32,
	/// Use `habit_plane` for every feature instead of the random start plane.
	pub define_habit_plane: bool,
	/// Crystal-frame habit-plane normal.
	pub habit_plane: Vector3<f32>,
	/// Randomise polarity and index order of the habit plane per feature.
	pub use_all_variants: bool,
	pub coherent_fraction: f32,
	/// Plate thickness as a fraction of the parent's equivalent diameter.
	pub thickness_fraction: f32,
	/// Mean number of plates per parent feature.
	pub plates_per_feature: u32,
	/// Probability that a placed plate is cut back to a peninsula.
	pub peninsula_fraction: f32,
	pub crystal_structure: CrystalStructure,
}

impl Default for InsertionSettings {
	fn default() -> Self {
		Self {
			parent_phase: 1,
			misorientation_degrees: 60.0,
			define_habit_plane: true,
			habit_plane: Vector3::new(1.0, 1.0, 1.0),
			use_all_variants: true,
			coherent_fraction: 1.0,
			thickness_fraction: 0.2,
			plates_per_feature: 1,
			peninsula_fraction: 0.0,
			crystal_structure: CrystalStructure::Unknown,
		}
	}
}

impl InsertionSettings {
	pub fn validate(&self) -> FilterResult<()> {
		if !(self.thickness_fraction > 0.0) {
			return Err(FilterError::InvalidParameter(format!(
				"thickness fraction must be positive, got {}",
				self.thickness_fraction
			)));
		}
		for (label, value) in [("coherent", self.coherent_fraction), ("peninsula", self.peninsula_fraction)] {
			if !(0.0..=1.0).contains(&value) {
				return Err(FilterError::InvalidParameter(format!(
					"{} fraction must lie in [0, 1], got {}",
					label, value
				)));
			}
		}
		if self.define_habit_plane && self.habit_plane.norm() == 0.0 {
			return Err(FilterError::InvalidParameter("habit plane must be non-zero".to_string()));
		}
		Ok(())
	}

	#[inline]
	pub fn misorientation_radians(&self) -> f32 {
		self.misorientation_degrees.to_radians()
	}
}

/// Names of the arrays the insertion reads and writes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArrayNames {
	pub feature_ids: String,
	pub phases: String,
	pub avg_quats: String,
	pub centroids: String,
	pub euler_angles: String,
	pub equivalent_diameters: String,
	pub parent_ids: String,
	pub num_features_per_parent: String,
	pub crystal_structures: String,
	pub phase_types: String,
	pub shape_types: String,
	pub num_features: String,
}

impl Default for ArrayNames {
	fn default() -> Self {
		Self {
			feature_ids: "FeatureIds".to_string(),
			phases: "Phases".to_string(),
			avg_quats: "AvgQuats".to_string(),
			centroids: "Centroids".to_string(),
			euler_angles: "EulerAngles".to_string(),
			equivalent_diameters: "EquivalentDiameters".to_string(),
			parent_ids: "ParentIds".to_string(),
			num_features_per_parent: "NumFeaturesPerParent".to_string(),
			crystal_structures: "CrystalStructures".to_string(),
			phase_types: "PhaseTypes".to_string(),
			shape_types: "ShapeTypes".to_string(),
			num_features: "NumFeatures".to_string(),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn defaults_validate() {
		let s = InsertionSettings::default();
		assert!(s.validate().is_ok());
		assert!((s.misorientation_radians() - std::f32::consts::FRAC_PI_3).abs() < 1e-6);
	}

	#[test]
	fn rejects_out_of_range_fractions() {
		let mut s = InsertionSettings::default();
		s.peninsula_fraction = 1.5;
		assert_eq!(s.validate().unwrap_err().code(), -390);

		let mut s = InsertionSettings::default();
		s.thickness_fraction = 0.0;
		assert!(s.validate().is_err());

		let mut s = InsertionSettings::default();
		s.coherent_fraction = f32::NAN;
		assert!(s.validate().is_err());
	}
}
