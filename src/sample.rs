use std::{
	path::{Path, PathBuf},
	sync::Arc,
};

use crate::{
	environment::{BuildSettings, Environment},
	library::{LibraryProject, INCLUDE_DIR},
	misc::{scan, FileFilter},
	project::{Project, ProjectError},
};

/// A demo executable built against its parent library.
#[derive(Debug)]
pub struct SampleProject {
	pub project: Project,
	pub parent_project: Arc<LibraryProject>,
	pub source_files: Vec<PathBuf>,
}

/// The parent library leads the link list unless it is already in it.
fn with_parent_first(parent: &str, libraries: &[String]) -> Vec<String> {
	let mut ret = Vec::with_capacity(libraries.len() + 1);
	if !libraries.iter().any(|x| x == parent) {
		ret.push(parent.to_owned());
	}
	ret.extend_from_slice(libraries);
	ret
}

impl SampleProject {
	/// Sources are scanned for under `path` unless `source_files` is given.
	/// `path` is resolved against the parent's working directory.
	pub fn new(
		parent_project: Arc<LibraryProject>,
		name: &str,
		libraries: &[String],
		path: Option<&Path>,
		source_files: Option<Vec<PathBuf>>,
	) -> Result<Self, ProjectError> {
		let libraries = with_parent_first(parent_project.name(), libraries);
		let project = Project::with_root(&parent_project.project.root, name, libraries, path)?;

		let source_files = match source_files {
			Some(x) => x,
			None => scan(&project.root, &project.path, &FileFilter::sources()?),
		};

		Ok(SampleProject { project, parent_project, source_files })
	}

	pub fn name(&self) -> &str {
		&self.project.name
	}

	pub fn configure_environment<E: Environment>(&self, env: &mut E) -> anyhow::Result<Vec<E::Target>> {
		let parent_path = &self.parent_project.project.abspath;
		let settings = BuildSettings {
			include_dirs: vec![self.project.path.clone(), parent_path.join(INCLUDE_DIR)],
			library_dirs: vec![self.project.path.clone(), parent_path.join(env.libdir())],
			libraries: self.project.libraries.clone(),
		};

		let sample = env.program(&self.project.path, self.name(), &self.source_files, &settings)?;
		log::debug!("sample {}: {} target(s)", self.name(), sample.len());
		Ok(sample)
	}
}

#[test]
fn test_with_parent_first() {
	let libs = |x: &[&str]| x.iter().map(|s| s.to_string()).collect::<Vec<_>>();
	assert_eq!(with_parent_first("foo", &libs(&["bar"])), libs(&["foo", "bar"]));
	assert_eq!(with_parent_first("foo", &libs(&[])), libs(&["foo"]));
	// Already present: left where the caller put it
	assert_eq!(with_parent_first("foo", &libs(&["bar", "foo"])), libs(&["bar", "foo"]));
}
