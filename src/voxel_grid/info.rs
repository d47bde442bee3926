use std::env;
use std::sync::Once;

/// Print citation information (only prints once)
pub fn print_citation() {
	static PRINT_CITATION_ONCE: Once = Once::new();
	PRINT_CITATION_ONCE.call_once(|| {
		eprintln!("Transformation phase insertion follows the DREAM.3D synthetic building pipeline.");
		eprintln!("Citation: M A Groeber, M A Jackson. Integr Mater Manuf Innov. v3: 2014, p. 5.");
		eprintln!("DOI: http://dx.doi.org/10.1186/2193-9772-3-5\n");
	});
}

/// Print compilation information (only prints once)
pub fn print_compile_info() {
	static PRINT_COMPILE_ONCE: Once = Once::new();
	PRINT_COMPILE_ONCE.call_once(|| {
		eprintln!("Program: {}", program_name());
		eprintln!(
			"Compiled on: {} at {}",
			env!("COMPILE_DATE"),
			env!("COMPILE_TIME")
		);
		eprintln!("Version: {}", env!("CARGO_PKG_VERSION"));
	});
}

/// File name of the running executable
fn program_name() -> String {
	env::current_exe()
		.ok()
		.as_ref()
		.and_then(|path| path.file_name())
		.and_then(|name| name.to_str())
		.unwrap_or("Unknown Program")
		.to_string()
}
