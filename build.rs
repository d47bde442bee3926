use std::process::Command;

fn main() {
	// One call so date and time can never straddle midnight.
	let stamp = Command::new("date")
	.arg("+%Y-%m-%d %H:%M:%S")
	.output()
	.ok()
	.map(|out| String::from_utf8_lossy(&out.stdout).trim().to_string())
	.unwrap_or_default();

	let (compile_date, compile_time) = match stamp.split_once(' ') {
		Some((date, time)) => (date.to_string(), time.to_string()),
		None => ("unknown".to_string(), "unknown".to_string()),
	};

	println!("cargo:rustc-env=COMPILE_DATE={}", compile_date);
	println!("cargo:rustc-env=COMPILE_TIME={}", compile_time);
	println!("cargo:rerun-if-changed=build.rs");
}
