//! Layout conventions for C and C++ library projects and the samples built against them.
//!
//! A [`LibraryProject`] finds its headers under `<path>/include/<name>` and its sources
//! under `<path>/src`, and registers build, install, documentation and indentation
//! targets with an [`Environment`]. A [`SampleProject`] is a single executable linked
//! against its parent library.

mod environment;
pub mod generator;
mod library;
mod misc;
pub mod project;
mod sample;
pub mod toolchain;

use std::{
	collections::BTreeMap, //
	fs,
	path::{Path, PathBuf},
	sync::Arc,
};

use serde::Deserialize;

pub use environment::{BuildSettings, Environment};
pub use library::{LibraryProject, BUILD_ALIAS, DOC_ALIAS, INDENT_ALIAS, INSTALL_ALIAS};
pub use misc::{normalize, relative_to, scan, FileFilter, HEADER_PATTERNS, SOURCE_PATTERNS};
pub use project::{Project, ProjectError};
pub use sample::SampleProject;

use toolchain::{Toolchain, ToolchainFile};

pub const PROJECT_TOML: &str = "project.toml";
pub const LIBDIR_ARG: &str = "libdir";
pub const DEFAULT_LIBDIR: &str = "lib";
pub const DEFAULT_PREFIX: &str = "/usr/local";

pub(crate) fn err_msg<T>(msg: String) -> Result<T, anyhow::Error> {
	Err(anyhow::Error::msg(msg))
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Manifest {
	pub library: LibraryManifest,
	#[serde(default)]
	pub sample: Vec<SampleManifest>,
	/// Default `KEY=VALUE` arguments, `prefix` and `libdir` among them.
	#[serde(default)]
	pub environment: BTreeMap<String, String>,
	pub toolchain: Option<ToolchainFile>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LibraryManifest {
	pub name: String,
	pub major: u32,
	pub minor: u32,
	#[serde(default)]
	pub libraries: Vec<String>,
	pub path: Option<PathBuf>,
	pub include_path: Option<PathBuf>,
	pub source_path: Option<PathBuf>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SampleManifest {
	pub path: Option<PathBuf>,
	#[serde(default)]
	pub libraries: Vec<String>,
	pub source_files: Option<Vec<PathBuf>>,
}

impl Manifest {
	/// Built-in defaults, then the manifest's `[environment]`, then `overrides`.
	pub fn arguments(&self, overrides: &BTreeMap<String, String>) -> BTreeMap<String, String> {
		let mut arguments = BTreeMap::from([
			(library::PREFIX_ARG.to_owned(), DEFAULT_PREFIX.to_owned()),
			(LIBDIR_ARG.to_owned(), DEFAULT_LIBDIR.to_owned()),
		]);
		arguments.extend(self.environment.clone());
		arguments.extend(overrides.clone());
		arguments
	}

	pub fn toolchain(&self) -> Result<Toolchain, String> {
		match &self.toolchain {
			Some(x) => Toolchain::from_file(x.clone()),
			None => Ok(Toolchain::default()),
		}
	}
}

/// Splits a `KEY=VALUE` command line argument.
pub fn parse_argument(arg: &str) -> Result<(String, String), String> {
	match arg.split_once('=') {
		Some((key, value)) if !key.is_empty() => Ok((key.to_owned(), value.to_owned())),
		_ => Err(format!("Expected KEY=VALUE, got \"{}\"", arg)),
	}
}

pub fn read_manifest(src_dir: &Path) -> Result<Manifest, anyhow::Error> {
	let manifest_path = src_dir.join(PROJECT_TOML);
	let manifest_toml = match fs::read_to_string(&manifest_path) {
		Ok(x) => x,
		Err(e) => return err_msg(format!("Error opening {}: {}", manifest_path.display(), e)),
	};

	let manifest = match toml::from_str::<Manifest>(&manifest_toml) {
		Ok(x) => x,
		Err(e) => return err_msg(format!("Error reading {}: {}", manifest_path.display(), e)),
	};

	Ok(manifest)
}

/// Describes the library and samples of `manifest`, resolving paths against `root`.
pub fn load_projects(
	manifest: &Manifest,
	root: &Path,
) -> Result<(Arc<LibraryProject>, Vec<SampleProject>), ProjectError> {
	let lib = &manifest.library;
	let project = Project::with_root(root, &lib.name, lib.libraries.clone(), lib.path.as_deref())?;
	let library = Arc::new(LibraryProject::with_layout(
		project,
		lib.major,
		lib.minor,
		lib.include_path.clone(),
		lib.source_path.clone(),
	)?);
	log::debug!(
		"library {} {}.{}: {} header(s), {} source(s)",
		library.name(),
		library.major,
		library.minor,
		library.include_files.len(),
		library.source_files.len()
	);

	let mut samples = Vec::with_capacity(manifest.sample.len());
	for sample in &manifest.sample {
		samples.push(library.sample_with_sources(
			&sample.libraries,
			sample.path.as_deref(),
			sample.source_files.clone(),
		)?);
	}
	Ok((library, samples))
}

/// Configures `library` and then each of `samples`, returning every target in that order.
pub fn configure<E: Environment>(
	library: &LibraryProject,
	samples: &[SampleProject],
	env: &mut E,
) -> Result<Vec<E::Target>, anyhow::Error> {
	let mut targets = library.configure_environment(env)?;
	for sample in samples {
		targets.extend(sample.configure_environment(env)?);
	}
	Ok(targets)
}

#[test]
fn test_parse_argument() {
	assert_eq!(parse_argument("prefix=/usr"), Ok(("prefix".to_owned(), "/usr".to_owned())));
	assert_eq!(parse_argument("flags=a=b"), Ok(("flags".to_owned(), "a=b".to_owned())));
	assert_eq!(parse_argument("empty="), Ok(("empty".to_owned(), String::new())));
	assert!(parse_argument("prefix").is_err());
	assert!(parse_argument("=x").is_err());
}

#[test]
fn test_manifest_arguments() {
	let manifest = toml::from_str::<Manifest>(
		r#"
[library]
name = "foo"
major = 1
minor = 0

[environment]
prefix = "/opt/foo"
"#,
	)
	.unwrap();
	assert!(manifest.sample.is_empty());
	assert!(manifest.library.libraries.is_empty());

	let args = manifest.arguments(&BTreeMap::new());
	assert_eq!(args["prefix"], "/opt/foo");
	assert_eq!(args[LIBDIR_ARG], DEFAULT_LIBDIR);

	let args = manifest.arguments(&BTreeMap::from([("prefix".to_owned(), "/tmp/stage".to_owned())]));
	assert_eq!(args["prefix"], "/tmp/stage");

	assert_eq!(manifest.toolchain().unwrap(), Toolchain::default());
}

#[test]
fn test_manifest_unknown_key() {
	let manifest = toml::from_str::<Manifest>(
		r#"
[library]
name = "foo"
major = 1
minor = 0
verison = "typo"
"#,
	);
	assert!(manifest.is_err());
}
