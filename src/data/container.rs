use crate::data::array::DataArray;
use crate::data::matrix::AttributeMatrix;
use crate::error::{FilterError, FilterResult};
use crate::geometry::kinds::Geometry;

/// Address of an array: container, attribute matrix, array name.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DataArrayPath {
	pub container: String,
	pub matrix: String,
	pub array: String,
}

impl DataArrayPath {
	pub fn new(container: impl Into<String>, matrix: impl Into<String>, array: impl Into<String>) -> Self {
		Self {
			container: container.into(),
			matrix: matrix.into(),
			array: array.into(),
		}
	}
}

impl std::fmt::Display for DataArrayPath {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "{}/{}/{}", self.container, self.matrix, self.array)
	}
}

/// A geometry plus the attribute matrices attached to it.
#[derive(Debug, Clone, Default)]
pub struct DataContainer {
	pub name: String,
	pub geometry: Option<Geometry>,
	matrices: Vec<AttributeMatrix>,
}

impl DataContainer {
	pub fn new(name: impl Into<String>) -> Self {
		Self {
			name: name.into(),
			geometry: None,
			matrices: Vec::new(),
		}
	}

	/// Insert or replace a matrix of the same name.
	pub fn add_matrix(&mut self, matrix: AttributeMatrix) {
		match self.matrices.iter().position(|m| m.name() == matrix.name()) {
			Some(i) => self.matrices[i] = matrix,
			None => self.matrices.push(matrix),
		}
	}

	pub fn matrix(&self, name: &str) -> FilterResult<&AttributeMatrix> {
		self.matrices
			.iter()
			.find(|m| m.name() == name)
			.ok_or_else(|| FilterError::MissingAttributeMatrix(name.to_string()))
	}

	pub fn matrix_mut(&mut self, name: &str) -> FilterResult<&mut AttributeMatrix> {
		self.matrices
			.iter_mut()
			.find(|m| m.name() == name)
			.ok_or_else(|| FilterError::MissingAttributeMatrix(name.to_string()))
	}

	pub fn matrices(&self) -> &[AttributeMatrix] {
		&self.matrices
	}

	/// Remove and return a matrix, e.g. to hand it to a filter by value.
	pub fn take_matrix(&mut self, name: &str) -> FilterResult<AttributeMatrix> {
		let i = self
			.matrices
			.iter()
			.position(|m| m.name() == name)
			.ok_or_else(|| FilterError::MissingAttributeMatrix(name.to_string()))?;
		Ok(self.matrices.remove(i))
	}
}

/// Every data container in a pipeline.
#[derive(Debug, Clone, Default)]
pub struct DataContainerArray {
	containers: Vec<DataContainer>,
}

impl DataContainerArray {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn add_container(&mut self, dc: DataContainer) {
		match self.containers.iter().position(|c| c.name == dc.name) {
			Some(i) => self.containers[i] = dc,
			None => self.containers.push(dc),
		}
	}

	pub fn container(&self, name: &str) -> FilterResult<&DataContainer> {
		self.containers
			.iter()
			.find(|c| c.name == name)
			.ok_or_else(|| FilterError::MissingDataContainer(name.to_string()))
	}

	pub fn container_mut(&mut self, name: &str) -> FilterResult<&mut DataContainer> {
		self.containers
			.iter_mut()
			.find(|c| c.name == name)
			.ok_or_else(|| FilterError::MissingDataContainer(name.to_string()))
	}

	/// Resolve a path to its array.
	pub fn array(&self, path: &DataArrayPath) -> FilterResult<&DataArray> {
		self.container(&path.container)?
			.matrix(&path.matrix)?
			.array_by_name(&path.array)
	}
}
