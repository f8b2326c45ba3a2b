use std::{
	env, //
	io,
	path::{Path, PathBuf},
};

use crate::misc::{normalize, relative_to};

#[derive(Debug, thiserror::Error)]
pub enum ProjectError {
	#[error("Invalid path: {} is not inside {}", .path.display(), .root.display())]
	InvalidPath { path: PathBuf, root: PathBuf },
	#[error("Project name must not be empty")]
	EmptyName,
	#[error("Invalid file pattern \"{pattern}\": {source}")]
	Pattern { pattern: String, source: glob::PatternError },
	#[error("Error getting cwd: {0}")]
	CurrentDir(#[source] io::Error),
}

/// A named build unit rooted somewhere below the working directory.
#[derive(Clone, Debug)]
pub struct Project {
	pub name: String,
	pub libraries: Vec<String>,
	/// The working directory every relative path is resolved against.
	pub root: PathBuf,
	pub abspath: PathBuf,
	/// `abspath` relative to `root`. Never absolute, `.` for `root` itself.
	pub path: PathBuf,
}

impl Project {
	/// Creates a project rooted at `path`, relative to the process' current directory.
	pub fn new(name: &str, libraries: Vec<String>, path: Option<&Path>) -> Result<Self, ProjectError> {
		let cwd = env::current_dir().map_err(ProjectError::CurrentDir)?;
		Project::with_root(&cwd, name, libraries, path)
	}

	/// Creates a project rooted at `path`, relative to `root`.
	///
	/// Fails with [`ProjectError::InvalidPath`] if the resolved location is not `root`
	/// or one of its descendants.
	pub fn with_root(
		root: &Path,
		name: &str,
		libraries: Vec<String>,
		path: Option<&Path>,
	) -> Result<Self, ProjectError> {
		if name.is_empty() {
			return Err(ProjectError::EmptyName);
		}
		let root = absolute_root(root)?;
		let abspath = match path {
			None => root.clone(),
			Some(x) => normalize(&root.join(x)),
		};
		let path = match relative_to(&abspath, &root) {
			Some(x) => x,
			None => return Err(ProjectError::InvalidPath { path: abspath, root }),
		};
		log::debug!("project {}: {} ({})", name, path.display(), abspath.display());

		Ok(Project { name: name.to_owned(), libraries, root, abspath, path })
	}
}

fn absolute_root(root: &Path) -> Result<PathBuf, ProjectError> {
	if root.is_absolute() {
		Ok(normalize(root))
	} else {
		let cwd = env::current_dir().map_err(ProjectError::CurrentDir)?;
		Ok(normalize(&cwd.join(root)))
	}
}

#[test]
fn test_default_path_is_root() {
	let project = Project::with_root(Path::new("/work/tree"), "foo", Vec::new(), None).unwrap();
	assert_eq!(project.abspath, PathBuf::from("/work/tree"));
	assert_eq!(project.path, PathBuf::from("."));
	assert_eq!(project.root, PathBuf::from("/work/tree"));
}

#[test]
fn test_relative_path() {
	let root = Path::new("/work/tree");
	for (input, abspath, path) in [
		("libs/foo", "/work/tree/libs/foo", "libs/foo"),
		("./libs/../libs/foo/", "/work/tree/libs/foo", "libs/foo"),
		(".", "/work/tree", "."),
		("/work/tree/bar", "/work/tree/bar", "bar"),
	] {
		let project = Project::with_root(root, "foo", Vec::new(), Some(Path::new(input))).unwrap();
		assert_eq!(project.abspath, PathBuf::from(abspath), "{}", input);
		assert_eq!(project.path, PathBuf::from(path), "{}", input);
		assert!(project.path.is_relative());
		assert_eq!(normalize(&root.join(&project.path)), project.abspath);
	}
}

#[test]
fn test_path_outside_root() {
	let root = Path::new("/work/tree");
	for input in ["..", "../tree2", "/elsewhere", "a/../../b"] {
		match Project::with_root(root, "foo", Vec::new(), Some(Path::new(input))) {
			Err(ProjectError::InvalidPath { path, root: err_root }) => {
				assert_eq!(err_root, PathBuf::from("/work/tree"));
				assert!(!path.starts_with(root), "{}", path.display());
			}
			x => panic!("expected InvalidPath for {}, got {:?}", input, x),
		}
	}
}

#[test]
fn test_empty_name() {
	assert!(matches!(
		Project::with_root(Path::new("/work"), "", Vec::new(), None),
		Err(ProjectError::EmptyName)
	));
}
