use std::{fs, path::Path};

use serde::Deserialize;

/// The `[toolchain]` table of a manifest, or a standalone toolchain file.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct ToolchainFile {
	c_compiler: Option<Vec<String>>,
	cpp_compiler: Option<Vec<String>>,
	static_linker: Option<Vec<String>>,
	shared_linker: Option<Vec<String>>,
	exe_linker: Option<Vec<String>>,
	install: Option<Vec<String>>,
	doxygen: Option<Vec<String>>,
	indent: Option<Vec<String>>,
}

/// Commands the Ninja environment writes into its rules.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Toolchain {
	pub c_compiler: Vec<String>,
	pub cpp_compiler: Vec<String>,
	pub static_linker: Vec<String>,
	pub shared_linker: Vec<String>,
	pub exe_linker: Vec<String>,
	pub install: Vec<String>,
	pub doxygen: Vec<String>,
	pub indent: Vec<String>,
}

fn to_vec_strs(cmd: &[&str]) -> Vec<String> {
	cmd.iter().copied().map(String::from).collect()
}

impl Default for Toolchain {
	fn default() -> Self {
		Toolchain {
			c_compiler: to_vec_strs(&["cc"]),
			cpp_compiler: to_vec_strs(&["c++"]),
			static_linker: to_vec_strs(&["ar", "qc"]),
			shared_linker: to_vec_strs(&["c++"]),
			exe_linker: to_vec_strs(&["c++"]),
			install: to_vec_strs(&["install", "-D"]),
			doxygen: to_vec_strs(&["doxygen"]),
			indent: to_vec_strs(&["astyle", "--quiet"]),
		}
	}
}

impl Toolchain {
	/// Fills in every command `file` leaves out with the default one.
	pub fn from_file(file: ToolchainFile) -> Result<Toolchain, String> {
		let default = Toolchain::default();
		let pick = |key: &str, cmd: Option<Vec<String>>, default: Vec<String>| -> Result<Vec<String>, String> {
			match cmd {
				Some(x) if x.is_empty() => Err(format!("Toolchain command \"{}\" is empty", key)),
				Some(x) => Ok(x),
				None => Ok(default),
			}
		};
		Ok(Toolchain {
			c_compiler: pick("c_compiler", file.c_compiler, default.c_compiler)?,
			cpp_compiler: pick("cpp_compiler", file.cpp_compiler, default.cpp_compiler)?,
			static_linker: pick("static_linker", file.static_linker, default.static_linker)?,
			shared_linker: pick("shared_linker", file.shared_linker, default.shared_linker)?,
			exe_linker: pick("exe_linker", file.exe_linker, default.exe_linker)?,
			install: pick("install", file.install, default.install)?,
			doxygen: pick("doxygen", file.doxygen, default.doxygen)?,
			indent: pick("indent", file.indent, default.indent)?,
		})
	}
}

pub fn read_toolchain(toolchain_path: &Path) -> Result<Toolchain, String> {
	let toolchain_toml = match fs::read_to_string(toolchain_path) {
		Ok(x) => x,
		Err(e) => return Err(format!("Error opening toolchain file \"{}\": {}", toolchain_path.display(), e)),
	};

	let toolchain_file = match toml::from_str::<ToolchainFile>(&toolchain_toml) {
		Ok(x) => x,
		Err(e) => return Err(format!("Error reading toolchain file \"{}\": {}", toolchain_path.display(), e)),
	};

	let toolchain = Toolchain::from_file(toolchain_file)?;
	log::info!("toolchain: {}", toolchain_path.display());
	Ok(toolchain)
}

#[test]
fn test_partial_toolchain() {
	let file = toml::from_str::<ToolchainFile>(
		r#"
c_compiler = ["clang"]
cpp_compiler = ["clang++", "-stdlib=libc++"]
"#,
	)
	.unwrap();
	let toolchain = Toolchain::from_file(file).unwrap();
	assert_eq!(toolchain.c_compiler, vec!["clang"]);
	assert_eq!(toolchain.cpp_compiler, vec!["clang++", "-stdlib=libc++"]);
	assert_eq!(toolchain.static_linker, Toolchain::default().static_linker);
	assert_eq!(toolchain.doxygen, vec!["doxygen"]);
}

#[test]
fn test_empty_command() {
	let file = toml::from_str::<ToolchainFile>("indent = []").unwrap();
	let err = Toolchain::from_file(file).unwrap_err();
	assert!(err.contains("indent"), "{}", err);
}
