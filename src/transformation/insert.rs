//! Plate placement: the transformation-phase insertion filter.

use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use nalgebra::Vector3;

use crate::error::{FilterResult, Messenger};
use crate::orientation::math::{ax2om, eu2qu, om2eu, qu2om, QuatArray};
use crate::orientation::symmetry::reduce_to_fundamental;
use crate::random::{fork_rng, UniformSource};
use crate::transformation::attributes::PlateAttributes;
use crate::transformation::habit_plane::{random_crystal_plane, select_variant, to_sample_frame};
use crate::transformation::microstructure::{FeatureHandles, Microstructure};
use crate::transformation::settings::{ArrayNames, InsertionSettings};
use crate::voxel_grid::plate::PlateSlab;

/// Overlapping shifts tolerated per feature before it is given up.
pub const MAX_OVERLAP_RETRIES: usize = 10;

/// Counters describing one run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InsertionSummary {
	/// Parent-phase features examined.
	pub visited: usize,
	/// Parent-phase features too thin to host a plate.
	pub skipped_too_small: usize,
	/// Non-overlapping shifts that were stamped.
	pub attempted: usize,
	pub placed: usize,
	pub peninsulas: usize,
	/// Features abandoned after too many overlapping shifts.
	pub overlap_aborts: usize,
	/// Ensemble index of the inserted phase.
	pub new_phase: usize,
}

/// Orientation and geometry shared by every plate of one parent feature.
struct ParentPlan {
	feature: usize,
	sample_plane: Vector3<f32>,
	centroid: [f32; 3],
	equivalent_diameter: f32,
	half_thickness: f32,
	quat: QuatArray,
	euler: [f32; 3],
}

/// Inserts thin transformation-phase plates into grains of a parent phase.
#[derive(Debug, Clone, Default)]
pub struct InsertTransformationPhases {
	pub settings: InsertionSettings,
	pub names: ArrayNames,
	/// Draw a progress bar over the feature loop (only on a terminal).
	pub progress: bool,
}

impl InsertTransformationPhases {
	pub const HUMAN_LABEL: &'static str = "Insert Transformation Phases";

	pub fn new(settings: InsertionSettings) -> Self {
		Self {
			settings,
			names: ArrayNames::default(),
			progress: false,
		}
	}

	/// Run the insertion against `ms`.
	///
	/// Validation failures are recorded on `msgs` and returned before the
	/// grid or any table is touched.
	pub fn execute<R: UniformSource + ?Sized>(
		&self,
		ms: &mut Microstructure,
		rng: &mut R,
		msgs: &mut Messenger,
	) -> FilterResult<InsertionSummary> {
		if let Err(e) = self.settings.validate() {
			return Err(msgs.error(e));
		}
		let (fh, eh) = match ms.data_check(&self.names) {
			Ok(handles) => handles,
			Err(e) => return Err(msgs.error(e)),
		};

		tracing::info!(
			features = ms.num_features(),
			voxels = ms.grid.total_voxels,
			parent_phase = self.settings.parent_phase,
			structure = self.settings.crystal_structure.name(),
			"inserting transformation phases"
		);

		let new_phase = ms.append_transformation_phase(&eh, self.settings.crystal_structure)?;
		let mut summary = self.place_plates(ms, &fh, new_phase, rng)?;
		summary.new_phase = new_phase;
		msgs.status("Placement Complete");

		ms.recount_features_per_phase(&eh, &fh, msgs)?;
		tracing::info!(
			visited = summary.visited,
			placed = summary.placed,
			peninsulas = summary.peninsulas,
			skipped = summary.skipped_too_small,
			aborted = summary.overlap_aborts,
			"insertion finished"
		);
		msgs.status("Execute Complete");
		Ok(summary)
	}

	fn progress_bar(&self, len: usize) -> ProgressBar {
		if !self.progress {
			return ProgressBar::hidden();
		}
		let pb = ProgressBar::with_draw_target(Some(len as u64), ProgressDrawTarget::stderr());
		if let Ok(style) = ProgressStyle::default_bar().template("Inserting plates: [{bar:40.cyan/blue}] {pos}/{len} ({eta})") {
			pb.set_style(style.progress_chars("#>-"));
		}
		pb
	}

	/// Visit every feature of the parent phase and try to stamp plates into it.
	fn place_plates<R: UniformSource + ?Sized>(
		&self,
		ms: &mut Microstructure,
		fh: &FeatureHandles,
		new_phase: usize,
		rng: &mut R,
	) -> FilterResult<InsertionSummary> {
		let s = &self.settings;
		let mut summary = InsertionSummary::default();

		let num_features = ms.num_features();
		let min_res = ms.grid.min_resolution();
		let voxel_diagonal = ms.grid.voxel_diagonal();
		let misorientation = s.misorientation_radians();
		let mut crystal_plane = random_crystal_plane(rng);

		let pb = self.progress_bar(num_features.saturating_sub(1));
		for cur in 1..num_features {
			pb.inc(1);
			if ms.features.values::<i32>(fh.phases)?[cur] != s.parent_phase {
				continue;
			}
			summary.visited += 1;
			ms.features.set_tuple(fh.parent_ids, cur, &[cur as i32])?;

			if s.define_habit_plane {
				crystal_plane = s.habit_plane;
			}
			if s.use_all_variants {
				select_variant(&mut crystal_plane, s.coherent_fraction, rng);
			}

			let mut q1 = [0.0_f32; 4];
			q1.copy_from_slice(&ms.features.values::<f32>(fh.avg_quats)?[4 * cur..4 * cur + 4]);
			let g = qu2om(&q1);
			let sample_plane = to_sample_frame(&g, &crystal_plane);

			let rotated = ax2om(&crystal_plane, misorientation) * g;
			let reduced = reduce_to_fundamental(&s.crystal_structure, &rotated);
			let euler = om2eu(&reduced.matrix);
			let quat = eu2qu(&euler);

			let equivalent_diameter = ms.features.values::<f32>(fh.equivalent_diameters)?[cur];
			let half_thickness = equivalent_diameter * s.thickness_fraction * 0.5;
			if half_thickness <= min_res {
				tracing::debug!(feature = cur, half_thickness, min_res, "feature too small for a plate");
				summary.skipped_too_small += 1;
				continue;
			}

			let mut centroid = [0.0_f32; 3];
			centroid.copy_from_slice(&ms.features.values::<f32>(fh.centroids)?[3 * cur..3 * cur + 3]);

			let plan = ParentPlan {
				feature: cur,
				sample_plane,
				centroid,
				equivalent_diameter,
				half_thickness,
				quat,
				euler,
			};
			self.place_in_feature(ms, fh, &plan, new_phase, voxel_diagonal, rng, &mut summary)?;
		}
		pb.finish_with_message("Plate insertion complete");

		Ok(summary)
	}

	/// Draw a plate count and non-overlapping shifts for one parent, stamping each.
	#[allow(clippy::too_many_arguments)]
	fn place_in_feature<R: UniformSource + ?Sized>(
		&self,
		ms: &mut Microstructure,
		fh: &FeatureHandles,
		plan: &ParentPlan,
		new_phase: usize,
		voxel_diagonal: f32,
		rng: &mut R,
		summary: &mut InsertionSummary,
	) -> FilterResult<()> {
		let target = 2 * self.settings.plates_per_feature as usize + 1;
		let num_plates = (rng.next_uniform() * target as f64) as usize;
		let tolerance = plan.half_thickness * 3.0 + voxel_diagonal * 2.0;
		tracing::debug!(feature = plan.feature, num_plates, half_thickness = plan.half_thickness, "placing plates");

		let mut shifts: Vec<f32> = Vec::with_capacity(num_plates);
		let mut overlaps = 0;
		while shifts.len() < num_plates {
			let mut shift = rng.next_f32() * plan.equivalent_diameter * 0.5;
			if rng.next_f32() < 0.5 {
				shift = -shift;
			}

			if shifts.iter().any(|&s| (shift - s).abs() <= tolerance) {
				overlaps += 1;
				tracing::trace!(feature = plan.feature, shift, overlaps, "shift overlaps an earlier plate");
				if overlaps == MAX_OVERLAP_RETRIES {
					summary.overlap_aborts += 1;
					tracing::debug!(feature = plan.feature, placed = shifts.len(), "giving up on overlapping shifts");
					break;
				}
				continue;
			}
			shifts.push(shift);
			summary.attempted += 1;
			self.stamp_one(ms, fh, plan, shift, new_phase, rng, summary)?;
		}
		Ok(())
	}

	/// Stamp one plate at `shift` along the normal and record it if any voxel moved.
	#[allow(clippy::too_many_arguments)]
	fn stamp_one<R: UniformSource + ?Sized>(
		&self,
		ms: &mut Microstructure,
		fh: &FeatureHandles,
		plan: &ParentPlan,
		shift: f32,
		new_phase: usize,
		rng: &mut R,
		summary: &mut InsertionSummary,
	) -> FilterResult<()> {
		let n = plan.sample_plane;
		let c = plan.centroid;
		let offset = -n.x * (c[0] + shift) - n.y * (c[1] + shift) - n.z * (c[2] + shift);
		let slab = PlateSlab {
			normal: [n.x, n.y, n.z],
			offset,
			half_thickness: plan.half_thickness,
		};

		let new_id = ms.num_features() as i32;
		let parent = plan.feature as i32;
		let stamped = ms.grid.stamp_plate(parent, new_id, &slab);
		let peninsula_draw = rng.next_f32();

		let Some(mut plate) = stamped else {
			tracing::debug!(feature = plan.feature, shift, "plate missed its parent");
			return Ok(());
		};

		if peninsula_draw < self.settings.peninsula_fraction {
			let mut stream = fork_rng(rng);
			let kept = ms.grid.truncate_to_peninsula(&mut plate, &mut stream);
			tracing::debug!(feature = plan.feature, plate = new_id, kept, "cut plate to peninsula");
			summary.peninsulas += 1;
		}

		let attrs = PlateAttributes {
			quat: plan.quat,
			euler: plan.euler,
			phase: new_phase as i32,
			parent,
		};
		let id = ms.push_feature(fh, &attrs)?;
		let counts = ms.features.values_mut::<i32>(fh.num_features_per_parent)?;
		counts[plan.feature] += 1;
		summary.placed += 1;
		tracing::debug!(feature = plan.feature, plate = id, voxels = plate.voxel_count(), shift, "placed plate");
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::random::ConstantSource;
	use crate::transformation::microstructure::{empty_ensemble_table, empty_feature_table};
	use crate::voxel_grid::grid::FeatureGrid;

	/// Counts draws while returning a fixed value.
	struct Counting {
		value: f64,
		draws: usize,
	}

	impl UniformSource for Counting {
		fn next_uniform(&mut self) -> f64 {
			self.draws += 1;
			self.value
		}
	}

	fn single_grain(equivalent_diameter: f32) -> Microstructure {
		let names = ArrayNames::default();
		let mut features = empty_feature_table("CellFeatureData", 2, &names).unwrap();
		let h = features.require("Phases").unwrap();
		features.set_tuple(h, 1, &[1_i32]).unwrap();
		let h = features.require("AvgQuats").unwrap();
		features.set_tuple(h, 1, &[0.0_f32, 0.0, 0.0, 1.0]).unwrap();
		let h = features.require("Centroids").unwrap();
		features.set_tuple(h, 1, &[4.5_f32, 4.5, 4.5]).unwrap();
		let h = features.require("EquivalentDiameters").unwrap();
		features.set_tuple(h, 1, &[equivalent_diameter]).unwrap();

		let ensembles = empty_ensemble_table("CellEnsembleData", 2, &names).unwrap();
		Microstructure {
			grid: FeatureGrid::filled(10, 10, 10, [1.0; 3], 1),
			features,
			stats_ensembles: ensembles.clone(),
			volume_ensembles: ensembles,
		}
	}

	fn fixed_plane(plates_per_feature: u32) -> InsertTransformationPhases {
		InsertTransformationPhases::new(InsertionSettings {
			define_habit_plane: false,
			use_all_variants: false,
			thickness_fraction: 0.5,
			plates_per_feature,
			..InsertionSettings::default()
		})
	}

	#[test]
	fn one_plate_in_a_single_grain() {
		let mut ms = single_grain(10.0);
		let mut msgs = Messenger::new(InsertTransformationPhases::HUMAN_LABEL);
		let summary = fixed_plane(1).execute(&mut ms, &mut ConstantSource(0.5), &mut msgs).unwrap();

		assert_eq!(summary.placed, 1);
		assert_eq!(summary.new_phase, 2);
		assert_eq!(ms.num_features(), 3);
		// plane x + y + z = 21, half thickness 2.5 along the unit normal
		let plate = ms.grid.count_feature(2);
		assert!(plate > 0);
		assert_eq!(plate + ms.grid.count_feature(1), 1000);
		for idx in 0..ms.grid.total_voxels {
			let (i, j, k) = ms.grid.index_to_ijk(idx);
			let d = ((i + j + k) as f32 - 21.0).abs() / 3.0_f32.sqrt();
			assert_eq!(ms.grid.feature_at(idx) == 2, d < 2.5, "voxel {:?}", (i, j, k));
		}
	}

	#[test]
	fn overlap_budget_bounds_the_draws() {
		let mut ms = single_grain(10.0);
		let mut rng = Counting { value: 0.5, draws: 0 };
		let mut msgs = Messenger::new("test");
		let summary = fixed_plane(2).execute(&mut ms, &mut rng, &mut msgs).unwrap();

		// start plane, plate count, first plate with its peninsula draw, then ten rejected shifts
		assert_eq!(rng.draws, 3 + 1 + 3 + 2 * MAX_OVERLAP_RETRIES);
		assert_eq!(summary.attempted, 1);
		assert_eq!(summary.placed, 1);
		assert_eq!(summary.overlap_aborts, 1);
	}

	#[test]
	fn thin_grains_are_skipped() {
		let mut ms = single_grain(1.0);
		let mut settings = InsertionSettings::default();
		settings.thickness_fraction = 0.1;
		let filter = InsertTransformationPhases::new(settings);
		let mut msgs = Messenger::new("test");
		let summary = filter.execute(&mut ms, &mut ConstantSource(0.3), &mut msgs).unwrap();

		assert_eq!(summary.skipped_too_small, 1);
		assert_eq!(ms.num_features(), 2);
		let h = ms.features.require("NumFeaturesPerParent").unwrap();
		assert_eq!(ms.features.values::<i32>(h).unwrap()[1], 0);
		// the ensemble row is appended regardless
		assert_eq!(ms.stats_ensembles.num_tuples(), 3);
	}

	#[test]
	fn parent_ids_mark_visited_features() {
		let mut ms = single_grain(10.0);
		let mut msgs = Messenger::new("test");
		fixed_plane(1).execute(&mut ms, &mut ConstantSource(0.5), &mut msgs).unwrap();
		let h = ms.features.require("ParentIds").unwrap();
		assert_eq!(ms.features.values::<i32>(h).unwrap(), &[-1, 1, 1]);
		let h = ms.features.require("NumFeaturesPerParent").unwrap();
		assert_eq!(ms.features.values::<i32>(h).unwrap(), &[0, 1, 0]);
	}

	#[test]
	fn invalid_settings_leave_everything_untouched() {
		let mut ms = single_grain(10.0);
		let mut filter = fixed_plane(1);
		filter.settings.coherent_fraction = 2.0;
		let mut msgs = Messenger::new("test");
		let err = filter.execute(&mut ms, &mut ConstantSource(0.5), &mut msgs).unwrap_err();
		assert_eq!(err.code(), -390);
		assert_eq!(ms.stats_ensembles.num_tuples(), 2);
		assert!(ms.features.handle("ParentIds").is_none());
		assert_eq!(ms.grid.count_feature(1), 1000);
	}
}
