use std::{
	path::{Path, PathBuf},
	sync::Arc,
};

use crate::{
	environment::{BuildSettings, Environment},
	err_msg,
	misc::{join_parent, normalize, scan, FileFilter},
	project::{Project, ProjectError},
	sample::SampleProject,
};

pub(crate) const INCLUDE_DIR: &str = "include";
pub(crate) const SOURCE_DIR: &str = "src";
pub(crate) const DOXYFILE: &str = "doxyfile";
pub(crate) const PREFIX_ARG: &str = "prefix";

pub const BUILD_ALIAS: &str = "build";
pub const INSTALL_ALIAS: &str = "install";
pub const DOC_ALIAS: &str = "doc";
pub const INDENT_ALIAS: &str = "indent";

/// A versioned library with its headers under `include/<name>` and its sources under `src`.
#[derive(Debug)]
pub struct LibraryProject {
	pub project: Project,
	pub major: u32,
	pub minor: u32,
	pub include_path: PathBuf,
	pub source_path: PathBuf,
	pub include_files: Vec<PathBuf>,
	pub source_files: Vec<PathBuf>,
}

impl LibraryProject {
	pub fn new(project: Project, major: u32, minor: u32) -> Result<Self, ProjectError> {
		LibraryProject::with_layout(project, major, minor, None, None)
	}

	/// Like [`LibraryProject::new`], overriding where headers and sources are looked for.
	/// Overrides are relative to the working directory, not to the project.
	pub fn with_layout(
		project: Project,
		major: u32,
		minor: u32,
		include_path: Option<PathBuf>,
		source_path: Option<PathBuf>,
	) -> Result<Self, ProjectError> {
		let include_path =
			include_path.unwrap_or_else(|| join_parent(&project.path, Path::new(INCLUDE_DIR).join(&project.name)));
		let source_path = source_path.unwrap_or_else(|| join_parent(&project.path, SOURCE_DIR));

		let include_files = scan(&project.root, &include_path, &FileFilter::headers()?);
		let source_files = scan(&project.root, &source_path, &FileFilter::sources()?);

		Ok(LibraryProject { project, major, minor, include_path, source_path, include_files, source_files })
	}

	pub fn name(&self) -> &str {
		&self.project.name
	}

	/// Registers the library, its install rules, its documentation and its indentation
	/// with `env`, along with the `build`, `install`, `doc` and `indent` aliases.
	///
	/// Returns the library, install, doc and indent targets, in that order.
	pub fn configure_environment<E: Environment>(&self, env: &mut E) -> anyhow::Result<Vec<E::Target>> {
		let prefix = match env.argument(PREFIX_ARG) {
			Some(x) => PathBuf::from(x),
			None => return err_msg(format!("Missing \"{}\" argument for {}", PREFIX_ARG, self.name())),
		};
		let libdir = env.libdir().to_owned();

		let settings = BuildSettings {
			include_dirs: vec![self.include_path.clone()],
			library_dirs: Vec::new(),
			libraries: self.project.libraries.clone(),
		};
		let libraries = env.library(
			&join_parent(&self.project.path, &libdir),
			self.name(),
			self.major,
			self.minor,
			&self.source_files,
			&settings,
		)?;

		let mut libraries_install = env.install(&prefix.join(&libdir), &libraries)?;
		for include_file in &self.include_files {
			libraries_install.extend(env.install_file(&header_install_dir(&prefix, include_file), include_file)?);
		}

		let documentation = env.documentation(Path::new(DOXYFILE))?;
		env.always_build(&documentation)?;

		let mut indent_files = self.source_files.clone();
		indent_files.extend_from_slice(&self.include_files);
		let indentation = env.format_sources(&indent_files)?;
		env.always_build(&indentation)?;

		env.alias(BUILD_ALIAS, &libraries)?;
		env.alias(INSTALL_ALIAS, &libraries_install)?;
		env.alias(DOC_ALIAS, &documentation)?;
		env.alias(INDENT_ALIAS, &indentation)?;
		env.set_default(BUILD_ALIAS)?;

		log::debug!(
			"library {}: {} library, {} install, {} doc, {} indent target(s)",
			self.name(),
			libraries.len(),
			libraries_install.len(),
			documentation.len(),
			indentation.len()
		);

		let mut targets = libraries;
		targets.extend(libraries_install);
		targets.extend(documentation);
		targets.extend(indentation);
		Ok(targets)
	}

	/// Describes a sample living at `path`, or at the working directory if `path` is `None`.
	/// The sample is named after the last component of its location.
	pub fn sample(self: &Arc<Self>, libraries: &[String], path: Option<&Path>) -> Result<SampleProject, ProjectError> {
		self.sample_with_sources(libraries, path, None)
	}

	/// Like [`LibraryProject::sample`], with an explicit source list instead of a scan.
	pub fn sample_with_sources(
		self: &Arc<Self>,
		libraries: &[String],
		path: Option<&Path>,
		source_files: Option<Vec<PathBuf>>,
	) -> Result<SampleProject, ProjectError> {
		let root = &self.project.root;
		let location = match path {
			Some(x) => normalize(&root.join(x)),
			None => root.clone(),
		};
		let name = match location.file_name() {
			Some(x) => x.to_string_lossy().into_owned(),
			None => return Err(ProjectError::InvalidPath { path: location, root: root.clone() }),
		};
		SampleProject::new(self.clone(), &name, libraries, path, source_files)
	}
}

/// Headers keep their project-relative directory below the prefix.
fn header_install_dir(prefix: &Path, include_file: &Path) -> PathBuf {
	let dest = normalize(&prefix.join(include_file));
	match dest.parent() {
		Some(x) => x.to_owned(),
		None => prefix.to_owned(),
	}
}

#[test]
fn test_default_layout() {
	let tmp = tempfile::tempdir().unwrap();
	let project = Project::with_root(tmp.path(), "foo", Vec::new(), Some(Path::new("libs/foo"))).unwrap();
	let lib = LibraryProject::new(project, 1, 2).unwrap();
	assert_eq!(lib.include_path, PathBuf::from("libs/foo/include/foo"));
	assert_eq!(lib.source_path, PathBuf::from("libs/foo/src"));
	assert!(lib.include_files.is_empty());
	assert!(lib.source_files.is_empty());

	let project = Project::with_root(tmp.path(), "foo", Vec::new(), None).unwrap();
	let lib = LibraryProject::new(project, 1, 2).unwrap();
	assert_eq!(lib.include_path, PathBuf::from("include/foo"));
	assert_eq!(lib.source_path, PathBuf::from("src"));
}

#[test]
fn test_layout_override() {
	use std::fs;

	let tmp = tempfile::tempdir().unwrap();
	fs::create_dir_all(tmp.path().join("headers/sub")).unwrap();
	fs::create_dir_all(tmp.path().join("code")).unwrap();
	fs::write(tmp.path().join("headers/sub/x.hpp"), "").unwrap();
	fs::write(tmp.path().join("code/x.cpp"), "").unwrap();

	let project = Project::with_root(tmp.path(), "foo", Vec::new(), None).unwrap();
	let lib =
		LibraryProject::with_layout(project, 0, 1, Some(PathBuf::from("headers")), Some(PathBuf::from("code"))).unwrap();
	assert_eq!(lib.include_files, vec![PathBuf::from("headers/sub/x.hpp")]);
	assert_eq!(lib.source_files, vec![PathBuf::from("code/x.cpp")]);
}

#[test]
fn test_header_install_dir() {
	let prefix = Path::new("/usr/local");
	assert_eq!(header_install_dir(prefix, Path::new("include/foo/a.h")), PathBuf::from("/usr/local/include/foo"));
	assert_eq!(
		header_install_dir(prefix, Path::new("libs/foo/include/foo/detail/b.hpp")),
		PathBuf::from("/usr/local/libs/foo/include/foo/detail")
	);
}
