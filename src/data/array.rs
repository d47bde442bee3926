use crate::error::{FilterError, FilterResult};

/// Backing storage of a [`DataArray`].
#[derive(Debug, Clone, PartialEq)]
pub enum ArrayData {
	Int32(Vec<i32>),
	UInt32(Vec<u32>),
	Int64(Vec<i64>),
	Float32(Vec<f32>),
}

impl ArrayData {
	pub fn type_name(&self) -> &'static str {
		match self {
			ArrayData::Int32(_) => "int32_t",
			ArrayData::UInt32(_) => "uint32_t",
			ArrayData::Int64(_) => "int64_t",
			ArrayData::Float32(_) => "float",
		}
	}

	fn len(&self) -> usize {
		match self {
			ArrayData::Int32(v) => v.len(),
			ArrayData::UInt32(v) => v.len(),
			ArrayData::Int64(v) => v.len(),
			ArrayData::Float32(v) => v.len(),
		}
	}

	fn resize(&mut self, len: usize) {
		match self {
			ArrayData::Int32(v) => v.resize(len, 0),
			ArrayData::UInt32(v) => v.resize(len, 0),
			ArrayData::Int64(v) => v.resize(len, 0),
			ArrayData::Float32(v) => v.resize(len, 0.0),
		}
	}
}

/// Element types a [`DataArray`] can hold.
pub trait Element: Copy + Default + PartialOrd + std::fmt::Debug + 'static {
	const TYPE_NAME: &'static str;
	fn slice(data: &ArrayData) -> Option<&[Self]>;
	fn slice_mut(data: &mut ArrayData) -> Option<&mut [Self]>;
	fn wrap(values: Vec<Self>) -> ArrayData;
}

macro_rules! impl_element {
	($ty:ty, $variant:ident, $name:literal) => {
		impl Element for $ty {
			const TYPE_NAME: &'static str = $name;

			#[inline]
			fn slice(data: &ArrayData) -> Option<&[Self]> {
				match data {
					ArrayData::$variant(v) => Some(v.as_slice()),
					_ => None,
				}
			}

			#[inline]
			fn slice_mut(data: &mut ArrayData) -> Option<&mut [Self]> {
				match data {
					ArrayData::$variant(v) => Some(v.as_mut_slice()),
					_ => None,
				}
			}

			#[inline]
			fn wrap(values: Vec<Self>) -> ArrayData {
				ArrayData::$variant(values)
			}
		}
	};
}

impl_element!(i32, Int32, "int32_t");
impl_element!(u32, UInt32, "uint32_t");
impl_element!(i64, Int64, "int64_t");
impl_element!(f32, Float32, "float");

/// A named array of tuples, each `components` values wide.
#[derive(Debug, Clone, PartialEq)]
pub struct DataArray {
	name: String,
	components: usize,
	data: ArrayData,
}

impl DataArray {
	/// Array of `tuples` tuples with every value set to `init`.
	pub fn filled<T: Element>(name: impl Into<String>, components: usize, tuples: usize, init: T) -> Self {
		Self {
			name: name.into(),
			components: components.max(1),
			data: T::wrap(vec![init; tuples * components.max(1)]),
		}
	}

	/// Wrap existing values. Fails if `values` is not a whole number of tuples.
	pub fn from_vec<T: Element>(name: impl Into<String>, components: usize, values: Vec<T>) -> FilterResult<Self> {
		let name = name.into();
		let components = components.max(1);
		if values.len() % components != 0 {
			return Err(FilterError::WrongComponentCount {
				array: name,
				expected: components,
				found: values.len() % components,
			});
		}
		Ok(Self {
			name,
			components,
			data: T::wrap(values),
		})
	}

	#[inline]
	pub fn name(&self) -> &str {
		&self.name
	}

	#[inline]
	pub fn components(&self) -> usize {
		self.components
	}

	#[inline]
	pub fn num_tuples(&self) -> usize {
		self.data.len() / self.components
	}

	/// Total number of values (tuples times components).
	#[inline]
	pub fn size(&self) -> usize {
		self.data.len()
	}

	#[inline]
	pub fn type_name(&self) -> &'static str {
		self.data.type_name()
	}

	/// Grow or shrink to `tuples` tuples; new values are zero.
	pub fn resize_tuples(&mut self, tuples: usize) {
		self.data.resize(tuples * self.components);
	}

	pub fn as_slice<T: Element>(&self) -> FilterResult<&[T]> {
		T::slice(&self.data).ok_or_else(|| FilterError::WrongArrayType {
			array: self.name.clone(),
			expected: T::TYPE_NAME,
			found: self.data.type_name(),
		})
	}

	pub fn as_mut_slice<T: Element>(&mut self) -> FilterResult<&mut [T]> {
		let found = self.data.type_name();
		let name = &self.name;
		T::slice_mut(&mut self.data).ok_or_else(|| FilterError::WrongArrayType {
			array: name.clone(),
			expected: T::TYPE_NAME,
			found,
		})
	}

	/// Typed view, also checking the component count.
	pub fn view<T: Element>(&self, components: usize) -> FilterResult<&[T]> {
		self.check_components(components)?;
		self.as_slice()
	}

	fn check_components(&self, components: usize) -> FilterResult<()> {
		if self.components != components {
			return Err(FilterError::WrongComponentCount {
				array: self.name.clone(),
				expected: components,
				found: self.components,
			});
		}
		Ok(())
	}
}
