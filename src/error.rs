use thiserror::Error;

/// Result alias used by every filter in this crate.
pub type FilterResult<T> = Result<T, FilterError>;

/// Failures that abort a filter before (or instead of) mutating its inputs.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FilterError {
	#[error("data container '{0}' does not exist")]
	MissingDataContainer(String),
	#[error("data container '{0}' has no geometry")]
	MissingGeometry(String),
	#[error("attribute matrix '{0}' does not exist")]
	MissingAttributeMatrix(String),
	#[error("array '{array}' does not exist in '{matrix}'")]
	MissingArray { matrix: String, array: String },
	#[error("array '{array}' holds {found}, expected {expected}")]
	WrongArrayType {
		array: String,
		expected: &'static str,
		found: &'static str,
	},
	#[error("array '{array}' has {found} components per tuple, expected {expected}")]
	WrongComponentCount {
		array: String,
		expected: usize,
		found: usize,
	},
	#[error("array '{array}' has {found} tuples, expected {expected}")]
	TupleCountMismatch {
		array: String,
		expected: usize,
		found: usize,
	},
	#[error("invalid parameter: {0}")]
	InvalidParameter(String),
	#[error("data container '{0}' already contains a geometry")]
	GeometryAlreadyExists(String),
	#[error("{0}")]
	DataQuality(String),
}

impl FilterError {
	/// Numeric error condition reported to the pipeline (always negative).
	pub fn code(&self) -> i32 {
		match self {
			FilterError::MissingDataContainer(_) => -999,
			FilterError::MissingGeometry(_) => -385,
			FilterError::MissingAttributeMatrix(_) => -301,
			FilterError::MissingArray { .. } => -90002,
			FilterError::WrongArrayType { .. } | FilterError::WrongComponentCount { .. } => -90003,
			FilterError::TupleCountMismatch { .. } => -90004,
			FilterError::InvalidParameter(_) => -390,
			FilterError::GeometryAlreadyExists(_) => -701,
			FilterError::DataQuality(_) => -1,
		}
	}
}

/// A single line on a filter's status/warning/error channel.
#[derive(Debug, Clone, PartialEq)]
pub enum PipelineMessage {
	Status(String),
	Warning { code: i32, text: String },
	Error { code: i32, text: String },
}

/// Collects the messages a filter emits and mirrors each one to `tracing`.
#[derive(Debug, Clone, Default)]
pub struct Messenger {
	label: String,
	messages: Vec<PipelineMessage>,
}

impl Messenger {
	pub fn new(label: impl Into<String>) -> Self {
		Self {
			label: label.into(),
			messages: Vec::new(),
		}
	}

	pub fn status(&mut self, text: impl Into<String>) {
		let text = text.into();
		tracing::info!(filter = %self.label, "{}", text);
		self.messages.push(PipelineMessage::Status(text));
	}

	pub fn warning(&mut self, code: i32, text: impl Into<String>) {
		let text = text.into();
		tracing::warn!(filter = %self.label, code, "{}", text);
		self.messages.push(PipelineMessage::Warning { code, text });
	}

	/// Record `err` on the channel and hand it back for propagation.
	pub fn error(&mut self, err: FilterError) -> FilterError {
		tracing::error!(filter = %self.label, code = err.code(), "{}", err);
		self.messages.push(PipelineMessage::Error {
			code: err.code(),
			text: err.to_string(),
		});
		err
	}

	/// Report a data-quality problem as a warning, or return it as a hard
	/// error when `as_error` is set. The caller records returned errors.
	pub fn data_quality(&mut self, as_error: bool, text: String) -> FilterResult<()> {
		if as_error {
			Err(FilterError::DataQuality(text))
		} else {
			self.warning(-1, text);
			Ok(())
		}
	}

	pub fn messages(&self) -> &[PipelineMessage] {
		&self.messages
	}

	pub fn warnings(&self) -> impl Iterator<Item = &PipelineMessage> {
		self.messages
			.iter()
			.filter(|m| matches!(m, PipelineMessage::Warning { .. }))
	}
}
