use std::str::FromStr;

use regex::Regex;

use plate_phase::orientation::symmetry::CrystalStructure;
use plate_phase::transformation::settings::InsertionSettings;

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, clap::ValueEnum)]
pub enum LogFormat {
	Compact,
	Full,
	Pretty,
	Json,
}

impl std::fmt::Display for LogFormat {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			LogFormat::Compact => f.write_str("compact"),
			LogFormat::Full => f.write_str("full"),
			LogFormat::Pretty => f.write_str("pretty"),
			LogFormat::Json => f.write_str("json"),
		}
	}
}

/// Insert transformation-phase plates into a synthetic blocky polycrystal
#[derive(Debug, clap::Parser)]
#[command(author, version, about)]
pub struct Cli {
	/// Logging output filters; comma-separated
	#[arg(short, long, default_value = "warn,plate_phase=info", env = "PLATE_PHASE_LOG")]
	pub log_filter: String,
	/// Logging output format
	#[arg(long, default_value_t = LogFormat::Compact)]
	pub log_format: LogFormat,
	/// Voxels along each axis
	#[arg(short, long, default_value = "64,64,64", value_parser = parse_vec3::<usize>, value_name = "X,Y,Z")]
	pub dimensions: [usize; 3],
	/// Edge length of a voxel along each axis
	#[arg(short, long, default_value = "1,1,1", value_parser = parse_vec3::<f32>, value_name = "X,Y,Z")]
	pub resolution: [f32; 3],
	/// Grains along each axis of the blocky polycrystal
	#[arg(short, long, default_value_t = 4)]
	pub grains: usize,
	/// Seed for a reproducible run; OS entropy when omitted
	#[arg(short, long)]
	pub seed: Option<u64>,
	/// Phase whose grains receive plates
	#[arg(long, default_value_t = 1)]
	pub parent_phase: i32,
	/// Rotation of the plates about the habit-plane normal, in degrees
	#[arg(long, default_value_t = 60.0)]
	pub misorientation: f32,
	/// Crystal-frame habit-plane normal
	#[arg(long, default_value = "1,1,1", value_parser = parse_vec3::<f32>, value_name = "H,K,L")]
	pub habit_plane: [f32; 3],
	/// Start from a random habit plane instead of --habit-plane
	#[arg(long)]
	pub random_habit_plane: bool,
	/// Keep the habit plane's polarity and index order fixed
	#[arg(long)]
	pub no_variants: bool,
	#[arg(long, default_value_t = 1.0)]
	pub coherent_fraction: f32,
	/// Plate thickness as a fraction of the grain's equivalent diameter
	#[arg(long, default_value_t = 0.2)]
	pub thickness_fraction: f32,
	/// Mean number of plates per grain
	#[arg(long, default_value_t = 1)]
	pub plates_per_feature: u32,
	/// Probability of cutting a plate back to a peninsula
	#[arg(long, default_value_t = 0.0)]
	pub peninsula_fraction: f32,
	/// Crystal structure of the inserted phase (0-10, or 999 for unknown)
	#[arg(long, default_value_t = 999)]
	pub crystal_structure: u32,
	/// Replace placeholder centroids and diameters after insertion
	#[arg(long)]
	pub recompute: bool,
	/// Show a progress bar over the grain loop
	#[arg(long)]
	pub progress: bool,
}

impl Cli {
	pub fn insertion_settings(&self) -> anyhow::Result<InsertionSettings> {
		let crystal_structure = CrystalStructure::from_u32(self.crystal_structure)?;
		Ok(InsertionSettings {
			parent_phase: self.parent_phase,
			misorientation_degrees: self.misorientation,
			define_habit_plane: !self.random_habit_plane,
			habit_plane: self.habit_plane.into(),
			use_all_variants: !self.no_variants,
			coherent_fraction: self.coherent_fraction,
			thickness_fraction: self.thickness_fraction,
			plates_per_feature: self.plates_per_feature,
			peninsula_fraction: self.peninsula_fraction,
			crystal_structure,
		})
	}
}

/// Parse `X,Y,Z`, `X Y Z` or `[X, Y, Z]`
pub fn parse_vec3<R: FromStr>(s: &str) -> Result<[R; 3], String>
where
	<R as FromStr>::Err: std::fmt::Display,
{
	let re = Regex::new(r"^\s*\[?\s*([^,\s\[\]]+)\s*[,\s]\s*([^,\s\[\]]+)\s*[,\s]\s*([^,\s\[\]]+)\s*\]?\s*$")
		.map_err(|e| e.to_string())?;
	let caps = re
		.captures(s)
		.ok_or_else(|| format!("expected three values like 1,2,3, got '{}'", s))?;
	let parse = |i: usize| -> Result<R, String> {
		let text = &caps[i];
		R::from_str(text).map_err(|e| format!("'{}': {}", text, e))
	};
	Ok([parse(1)?, parse(2)?, parse(3)?])
}

/// Set up log output on stderr
pub fn initialize_tracing(log_filter: &str, log_format: LogFormat) {
	let tsub = tracing_subscriber::fmt()
		.with_writer(std::io::stderr)
		.with_env_filter(log_filter);

	match log_format {
		LogFormat::Compact => tsub.compact().init(),
		LogFormat::Full => tsub.init(),
		LogFormat::Pretty => tsub.pretty().init(),
		LogFormat::Json => tsub.json().init(),
	}
}
