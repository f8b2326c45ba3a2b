use std::{
	fmt::Debug, //
	path::{Path, PathBuf},
};

/// Compile and link settings handed to the library and program factories.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BuildSettings {
	pub include_dirs: Vec<PathBuf>,
	pub library_dirs: Vec<PathBuf>,
	pub libraries: Vec<String>,
}

/// The build engine a project registers its targets with.
///
/// Target factories return the handles of everything they registered. Errors are
/// returned as is and projects pass them on to their caller untouched.
pub trait Environment {
	type Target: Clone + Debug;

	/// Directory name libraries are built into and installed under.
	fn libdir(&self) -> &Path;

	/// Looks up a user supplied `KEY=VALUE` argument.
	fn argument(&self, key: &str) -> Option<&str>;

	fn library(
		&mut self,
		output_dir: &Path,
		name: &str,
		major: u32,
		minor: u32,
		sources: &[PathBuf],
		settings: &BuildSettings,
	) -> anyhow::Result<Vec<Self::Target>>;

	fn program(
		&mut self,
		output_dir: &Path,
		name: &str,
		sources: &[PathBuf],
		settings: &BuildSettings,
	) -> anyhow::Result<Vec<Self::Target>>;

	/// Copies the outputs of `targets` into `dest_dir`.
	fn install(&mut self, dest_dir: &Path, targets: &[Self::Target]) -> anyhow::Result<Vec<Self::Target>>;

	/// Copies a plain file into `dest_dir`.
	fn install_file(&mut self, dest_dir: &Path, file: &Path) -> anyhow::Result<Vec<Self::Target>>;

	fn documentation(&mut self, doxyfile: &Path) -> anyhow::Result<Vec<Self::Target>>;

	fn format_sources(&mut self, files: &[PathBuf]) -> anyhow::Result<Vec<Self::Target>>;

	fn alias(&mut self, name: &str, targets: &[Self::Target]) -> anyhow::Result<()>;

	/// Marks `targets` as out of date on every run.
	fn always_build(&mut self, targets: &[Self::Target]) -> anyhow::Result<()>;

	fn set_default(&mut self, alias: &str) -> anyhow::Result<()>;
}
