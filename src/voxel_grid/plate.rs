use bitvec::vec::BitVec;

use crate::random::UniformSource;
use crate::voxel_grid::grid::FeatureGrid;

/// Give up redrawing the kept fraction after this many tries and keep the whole plate.
const MAX_FRACTION_DRAWS: usize = 1000;

/// A slab of half-width `half_thickness` around the plane `normal . p + offset = 0`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlateSlab {
	pub normal: [f32; 3],
	pub offset: f32,
	pub half_thickness: f32,
}

/// Voxels stamped with a provisional feature id.
#[derive(Debug, Clone)]
pub struct Plate {
	pub id: i32,
	pub parent: i32,
	/// One bit per voxel, set where the voxel now holds `id`.
	pub mask: BitVec,
}

impl Plate {
	#[inline]
	pub fn voxel_count(&self) -> usize {
		self.mask.count_ones()
	}
}

impl FeatureGrid {
	/// Stamp `new_id` onto every voxel of `parent` lying inside `slab`.
	///
	/// Only voxels currently owned by `parent` are touched. Returns `None`
	/// if nothing was stamped.
	pub fn stamp_plate(&mut self, parent: i32, new_id: i32, slab: &PlateSlab) -> Option<Plate> {
		let [a, b, c] = slab.normal;
		let denom = 1.0 / (a * a + b * b + c * c).sqrt();

		let mut mask = BitVec::repeat(false, self.total_voxels);
		let mut stamped = 0usize;
		for k in 0..self.len_k {
			let z = k as f32 * self.z_res;
			for j in 0..self.len_j {
				let y = j as f32 * self.y_res;
				for i in 0..self.len_i {
					let idx = self.ijk_to_index(i, j, k);
					if self.data[idx] != parent {
						continue;
					}
					let x = i as f32 * self.x_res;
					let distance = a * x * denom + b * y * denom + c * z * denom + slab.offset * denom;
					if distance.abs() < slab.half_thickness {
						self.data[idx] = new_id;
						mask.set(idx, true);
						stamped += 1;
					}
				}
			}
		}

		tracing::trace!(parent, new_id, stamped, "stamped plate");
		if stamped == 0 {
			None
		} else {
			Some(Plate {
				id: new_id,
				parent,
				mask,
			})
		}
	}

	/// Cut a freshly stamped plate back to a peninsula attached at one end.
	///
	/// The first and last plate voxels in storage order act as the plate's
	/// extrema. One of them is chosen as the anchor; voxels farther from it
	/// than a random share of the extrema distance go back to the parent.
	/// At least one voxel always survives. Returns the surviving count.
	pub fn truncate_to_peninsula<R: UniformSource + ?Sized>(&mut self, plate: &mut Plate, rng: &mut R) -> usize {
		let (first, last) = match (plate.mask.first_one(), plate.mask.last_one()) {
			(Some(f), Some(l)) => (f, l),
			_ => return 0,
		};
		let p1 = self.index_to_ijk(first);
		let p2 = self.index_to_ijk(last);

		let mut length = index_distance(p1, p2);
		// a single-voxel plate still needs a length the kept-fraction loop can satisfy
		if length == 0.0 {
			length = 2.0;
		}

		let anchor = if rng.next_f32() < 0.5 { p1 } else { p2 };

		let mut fraction_kept = 0.0_f32;
		let mut draws = 0;
		while ((fraction_kept * length) as i32) < 1 {
			if draws == MAX_FRACTION_DRAWS {
				tracing::debug!(plate = plate.id, "kept fraction never reached one voxel; keeping the whole plate");
				fraction_kept = 1.0;
				break;
			}
			fraction_kept = rng.next_f32();
			draws += 1;
		}
		let reach = length * fraction_kept;

		let ones: Vec<usize> = plate.mask.iter_ones().collect();
		let mut kept = 0usize;
		for idx in ones {
			if self.data[idx] != plate.id {
				plate.mask.set(idx, false);
				continue;
			}
			if index_distance(self.index_to_ijk(idx), anchor) > reach {
				self.data[idx] = plate.parent;
				plate.mask.set(idx, false);
			} else {
				kept += 1;
			}
		}

		tracing::trace!(plate = plate.id, length, fraction_kept, kept, "truncated plate to peninsula");
		kept
	}
}

/// Euclidean distance between two voxel coordinates, in voxel units.
fn index_distance(a: (usize, usize, usize), b: (usize, usize, usize)) -> f32 {
	let di = a.0 as f32 - b.0 as f32;
	let dj = a.1 as f32 - b.1 as f32;
	let dk = a.2 as f32 - b.2 as f32;
	(di * di + dj * dj + dk * dk).sqrt()
}
