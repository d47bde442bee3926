use crate::data::array::{DataArray, Element};
use crate::error::{FilterError, FilterResult};

/// What the tuples of an [`AttributeMatrix`] describe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatrixKind {
	Cell,
	Feature,
	Ensemble,
	Vertex,
	Edge,
	Face,
}

/// Index of an array inside its matrix. Cheap to copy; resolved on each use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArrayHandle(usize);

/// A set of arrays that share one tuple count.
#[derive(Debug, Clone, PartialEq)]
pub struct AttributeMatrix {
	name: String,
	kind: MatrixKind,
	tuple_dims: Vec<usize>,
	arrays: Vec<DataArray>,
}

impl AttributeMatrix {
	pub fn new(name: impl Into<String>, kind: MatrixKind, tuple_dims: Vec<usize>) -> Self {
		Self {
			name: name.into(),
			kind,
			tuple_dims,
			arrays: Vec::new(),
		}
	}

	#[inline]
	pub fn name(&self) -> &str {
		&self.name
	}

	#[inline]
	pub fn kind(&self) -> MatrixKind {
		self.kind
	}

	#[inline]
	pub fn tuple_dims(&self) -> &[usize] {
		&self.tuple_dims
	}

	#[inline]
	pub fn num_tuples(&self) -> usize {
		self.tuple_dims.iter().product()
	}

	/// Insert or replace an array. Its tuple count must match the matrix.
	pub fn add_array(&mut self, array: DataArray) -> FilterResult<ArrayHandle> {
		if array.num_tuples() != self.num_tuples() {
			return Err(FilterError::TupleCountMismatch {
				array: array.name().to_string(),
				expected: self.num_tuples(),
				found: array.num_tuples(),
			});
		}
		match self.handle(array.name()) {
			Some(h) => {
				self.arrays[h.0] = array;
				Ok(h)
			}
			None => {
				self.arrays.push(array);
				Ok(ArrayHandle(self.arrays.len() - 1))
			}
		}
	}

	#[inline]
	pub fn handle(&self, name: &str) -> Option<ArrayHandle> {
		self.arrays.iter().position(|a| a.name() == name).map(ArrayHandle)
	}

	/// Handle of a required array.
	pub fn require(&self, name: &str) -> FilterResult<ArrayHandle> {
		self.handle(name).ok_or_else(|| FilterError::MissingArray {
			matrix: self.name.clone(),
			array: name.to_string(),
		})
	}

	/// Check that a required array exists with the given type and width.
	pub fn require_typed<T: Element>(&self, name: &str, components: usize) -> FilterResult<ArrayHandle> {
		let h = self.require(name)?;
		self.arrays[h.0].view::<T>(components)?;
		Ok(h)
	}

	/// Handle of `name`, creating it filled with `init` if absent.
	pub fn create_if_absent<T: Element>(&mut self, name: &str, components: usize, init: T) -> FilterResult<ArrayHandle> {
		match self.handle(name) {
			Some(h) => {
				self.arrays[h.0].view::<T>(components)?;
				Ok(h)
			}
			None => self.add_array(DataArray::filled(name, components, self.num_tuples(), init)),
		}
	}

	#[inline]
	pub fn array(&self, h: ArrayHandle) -> &DataArray {
		&self.arrays[h.0]
	}

	pub fn array_by_name(&self, name: &str) -> FilterResult<&DataArray> {
		let h = self.require(name)?;
		Ok(&self.arrays[h.0])
	}

	#[inline]
	pub fn values<T: Element>(&self, h: ArrayHandle) -> FilterResult<&[T]> {
		self.arrays[h.0].as_slice()
	}

	#[inline]
	pub fn values_mut<T: Element>(&mut self, h: ArrayHandle) -> FilterResult<&mut [T]> {
		self.arrays[h.0].as_mut_slice()
	}

	/// Write one tuple of `h` at `tuple`.
	pub fn set_tuple<T: Element>(&mut self, h: ArrayHandle, tuple: usize, values: &[T]) -> FilterResult<()> {
		let comps = self.arrays[h.0].components();
		let slice = self.values_mut::<T>(h)?;
		slice[tuple * comps..(tuple + 1) * comps].copy_from_slice(values);
		Ok(())
	}

	/// Resize every array to a single-dimension tuple count of `tuples`.
	pub fn resize_tuples(&mut self, tuples: usize) {
		self.tuple_dims = vec![tuples];
		for array in self.arrays.iter_mut() {
			array.resize_tuples(tuples);
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn handles_survive_resize() {
		let mut m = AttributeMatrix::new("CellFeatureData", MatrixKind::Feature, vec![2]);
		let h = m.add_array(DataArray::filled("Phases", 1, 2, 1_i32)).unwrap();
		m.resize_tuples(3);
		m.set_tuple(h, 2, &[4_i32]).unwrap();
		assert_eq!(m.values::<i32>(h).unwrap(), &[1, 1, 4]);
	}

	#[test]
	fn tuple_mismatch_rejected() {
		let mut m = AttributeMatrix::new("CellEnsembleData", MatrixKind::Ensemble, vec![2]);
		let err = m.add_array(DataArray::filled("PhaseTypes", 1, 3, 0_u32)).unwrap_err();
		assert_eq!(err.code(), -90004);
	}

	#[test]
	fn require_typed_checks_width() {
		let mut m = AttributeMatrix::new("F", MatrixKind::Feature, vec![1]);
		m.add_array(DataArray::filled("AvgQuats", 4, 1, 0.0_f32)).unwrap();
		assert!(m.require_typed::<f32>("AvgQuats", 4).is_ok());
		assert!(m.require_typed::<f32>("AvgQuats", 3).is_err());
		assert!(m.require_typed::<i32>("AvgQuats", 4).is_err());
		assert_eq!(m.require("Missing").unwrap_err().code(), -90002);
	}

	#[test]
	fn create_if_absent_uses_initial_value() {
		let mut m = AttributeMatrix::new("F", MatrixKind::Feature, vec![3]);
		let h = m.create_if_absent("ParentIds", 1, -1_i32).unwrap();
		assert_eq!(m.values::<i32>(h).unwrap(), &[-1, -1, -1]);
		let again = m.create_if_absent("ParentIds", 1, 7_i32).unwrap();
		assert_eq!(h, again);
		assert_eq!(m.values::<i32>(h).unwrap(), &[-1, -1, -1]);
	}
}
