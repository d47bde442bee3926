//! Crystal symmetry operator tables and minimum-angle reduction.

use std::sync::OnceLock;

use nalgebra::{Matrix3, Vector3};

use crate::error::{FilterError, FilterResult};
use crate::orientation::math::ax2om;

/// Provides the proper rotations of a crystal class.
pub trait SymmetryOperators {
	fn num_sym_ops(&self) -> usize;
	fn sym_op_matrix(&self, index: usize) -> Matrix3<f32>;
}

/// Laue classes, numbered as in the ensemble `CrystalStructures` array.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CrystalStructure {
	HexagonalHigh = 0,
	CubicHigh = 1,
	HexagonalLow = 2,
	CubicLow = 3,
	Triclinic = 4,
	Monoclinic = 5,
	OrthoRhombic = 6,
	TetragonalLow = 7,
	TetragonalHigh = 8,
	TrigonalLow = 9,
	TrigonalHigh = 10,
	Unknown = 999,
}

impl CrystalStructure {
	pub const ALL: [CrystalStructure; 11] = [
		CrystalStructure::HexagonalHigh,
		CrystalStructure::CubicHigh,
		CrystalStructure::HexagonalLow,
		CrystalStructure::CubicLow,
		CrystalStructure::Triclinic,
		CrystalStructure::Monoclinic,
		CrystalStructure::OrthoRhombic,
		CrystalStructure::TetragonalLow,
		CrystalStructure::TetragonalHigh,
		CrystalStructure::TrigonalLow,
		CrystalStructure::TrigonalHigh,
	];

	pub fn from_u32(value: u32) -> FilterResult<Self> {
		match value {
			999 => Ok(CrystalStructure::Unknown),
			v => CrystalStructure::ALL
				.get(v as usize)
				.copied()
				.ok_or_else(|| FilterError::InvalidParameter(format!("unknown crystal structure {}", v))),
		}
	}

	#[inline]
	pub fn as_u32(self) -> u32 {
		self as u32
	}

	pub fn name(self) -> &'static str {
		match self {
			CrystalStructure::HexagonalHigh => "Hexagonal-High 6/mmm",
			CrystalStructure::CubicHigh => "Cubic-High m-3m",
			CrystalStructure::HexagonalLow => "Hexagonal-Low 6/m",
			CrystalStructure::CubicLow => "Cubic-Low m-3 (Tetrahedral)",
			CrystalStructure::Triclinic => "Triclinic -1",
			CrystalStructure::Monoclinic => "Monoclinic 2/m",
			CrystalStructure::OrthoRhombic => "OrthoRhombic mmm",
			CrystalStructure::TetragonalLow => "Tetragonal-Low 4/m",
			CrystalStructure::TetragonalHigh => "Tetragonal-High 4/mmm",
			CrystalStructure::TrigonalLow => "Trigonal-Low -3",
			CrystalStructure::TrigonalHigh => "Trigonal-High -3m",
			CrystalStructure::Unknown => "Unknown",
		}
	}

	/// The cached operator table for this class, identity first.
	pub fn operators(self) -> &'static [Matrix3<f32>] {
		static TABLES: OnceLock<Vec<Vec<Matrix3<f32>>>> = OnceLock::new();
		let tables = TABLES.get_or_init(|| {
			CrystalStructure::ALL
				.iter()
				.map(|cs| close_group(&generators(*cs)))
				.collect()
		});
		match self {
			CrystalStructure::Unknown => &tables[CrystalStructure::Triclinic as usize],
			cs => &tables[cs as usize],
		}
	}
}

impl SymmetryOperators for CrystalStructure {
	fn num_sym_ops(&self) -> usize {
		self.operators().len()
	}

	fn sym_op_matrix(&self, index: usize) -> Matrix3<f32> {
		self.operators()[index]
	}
}

fn rotation(axis: [f64; 3], fold: u32) -> Matrix3<f64> {
	let angle = std::f64::consts::TAU / fold as f64;
	ax2om(&Vector3::new(axis[0] as f32, axis[1] as f32, axis[2] as f32), angle as f32)
		.cast::<f64>()
		.map(|v| v.round_to_table())
}

trait RoundToTable {
	fn round_to_table(self) -> Self;
}

impl RoundToTable for f64 {
	/// Snap entries to the exact values that appear in symmetry tables
	/// (0, +-1/2, +-sqrt(3)/2, +-1) so closure does not accumulate error.
	fn round_to_table(self) -> f64 {
		const EXACT: [f64; 4] = [0.0, 0.5, 0.866_025_403_784_438_6, 1.0];
		let mag = self.abs();
		let snapped = EXACT
			.iter()
			.copied()
			.find(|e| (mag - e).abs() < 1e-4)
			.unwrap_or(mag);
		snapped.copysign(self)
	}
}

fn generators(cs: CrystalStructure) -> Vec<Matrix3<f64>> {
	const X: [f64; 3] = [1.0, 0.0, 0.0];
	const Y: [f64; 3] = [0.0, 1.0, 0.0];
	const Z: [f64; 3] = [0.0, 0.0, 1.0];
	const DIAG: [f64; 3] = [1.0, 1.0, 1.0];

	match cs {
		CrystalStructure::Triclinic | CrystalStructure::Unknown => vec![],
		CrystalStructure::Monoclinic => vec![rotation(Y, 2)],
		CrystalStructure::OrthoRhombic => vec![rotation(X, 2), rotation(Y, 2)],
		CrystalStructure::TetragonalLow => vec![rotation(Z, 4)],
		CrystalStructure::TetragonalHigh => vec![rotation(Z, 4), rotation(X, 2)],
		CrystalStructure::TrigonalLow => vec![rotation(Z, 3)],
		CrystalStructure::TrigonalHigh => vec![rotation(Z, 3), rotation(X, 2)],
		CrystalStructure::HexagonalLow => vec![rotation(Z, 6)],
		CrystalStructure::HexagonalHigh => vec![rotation(Z, 6), rotation(X, 2)],
		CrystalStructure::CubicLow => vec![rotation(Z, 2), rotation(X, 2), rotation(DIAG, 3)],
		CrystalStructure::CubicHigh => vec![rotation(Z, 4), rotation(DIAG, 3)],
	}
}

/// Breadth-first closure of the generators under multiplication.
fn close_group(gens: &[Matrix3<f64>]) -> Vec<Matrix3<f32>> {
	let mut group = vec![Matrix3::<f64>::identity()];
	let mut frontier = 0;
	while frontier < group.len() {
		let current = group[frontier];
		for g in gens {
			let candidate = (g * current).map(|v| v.round_to_table());
			if !group.iter().any(|m| (m - candidate).abs().max() < 1e-6) {
				group.push(candidate);
			}
		}
		frontier += 1;
	}
	group.into_iter().map(|m| m.cast::<f32>()).collect()
}

/// Result of reducing an orientation by crystal symmetry.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Reduction {
	pub matrix: Matrix3<f32>,
	pub operator: usize,
	pub trace: f32,
}

/// Pick the symmetry-equivalent of `om` closest to the identity.
///
/// Scans `sym * om` for every operator and keeps the largest trace. Ties go
/// to the earliest operator.
pub fn reduce_to_fundamental<S: SymmetryOperators + ?Sized>(ops: &S, om: &Matrix3<f32>) -> Reduction {
	let mut best_trace = -1.0_f32;
	let mut best = 0usize;
	for i in 0..ops.num_sym_ops() {
		let trace = (ops.sym_op_matrix(i) * om).trace();
		if trace > best_trace {
			best_trace = trace;
			best = i;
		}
	}
	let matrix = ops.sym_op_matrix(best) * om;
	Reduction {
		matrix,
		operator: best,
		trace: matrix.trace(),
	}
}
