use std::path::{
	Component, //
	Path,
	PathBuf,
};

use glob::Pattern;
use walkdir::{DirEntry, WalkDir};

use crate::project::ProjectError;

pub const HEADER_PATTERNS: &[&str] = &["*.h", "*.hpp"];
pub const SOURCE_PATTERNS: &[&str] = &["*.c", "*.cpp"];

/// Lexically normalizes a path, like `os.path.normpath`.
/// `.` components are dropped and `..` removes the previous normal component.
/// The filesystem is never consulted, so symlinks are not resolved.
pub fn normalize(path: &Path) -> PathBuf {
	let mut ret = PathBuf::new();
	for component in path.components() {
		match component {
			Component::Prefix(_) | Component::RootDir => ret.push(component.as_os_str()),
			Component::CurDir => {}
			Component::ParentDir => match ret.components().next_back() {
				Some(Component::Normal(_)) => {
					ret.pop();
				}
				// `/..` is `/`
				Some(Component::RootDir) | Some(Component::Prefix(_)) => {}
				_ => ret.push(".."),
			},
			Component::Normal(x) => ret.push(x),
		}
	}
	if ret.as_os_str().is_empty() {
		ret.push(".");
	}
	ret
}

/// Returns `path` relative to `root`, or `None` if `path` is not inside `root`.
/// Both paths are expected to be normalized. `root` itself maps to `.`.
pub fn relative_to(path: &Path, root: &Path) -> Option<PathBuf> {
	match path.strip_prefix(root) {
		Ok(x) if x.as_os_str().is_empty() => Some(PathBuf::from(".")),
		Ok(x) => Some(x.to_owned()),
		Err(_) => None,
	}
}

/// Joins `x` onto a project-relative `parent_path` without a leading `./`.
pub(crate) fn join_parent(parent_path: &Path, x: impl AsRef<Path>) -> PathBuf {
	if parent_path == Path::new(".") {
		x.as_ref().to_owned()
	} else {
		parent_path.join(x) // If x is absolute, it replaces the current path.
	}
}

pub(crate) fn is_c_source(src: &Path) -> bool {
	matches!(src.extension().and_then(|x| x.to_str()), Some("c") | Some("C"))
}

pub(crate) fn is_cpp_source(src: &Path) -> bool {
	matches!(src.extension().and_then(|x| x.to_str()), Some("cpp") | Some("cc") | Some("cxx"))
}

/// Shell-style patterns matched against a file's base name.
#[derive(Clone, Debug)]
pub struct FileFilter {
	patterns: Vec<Pattern>,
}

impl FileFilter {
	pub fn new(patterns: &[&str]) -> Result<Self, ProjectError> {
		let patterns = patterns
			.iter()
			.map(|x| {
				Pattern::new(x).map_err(|e| ProjectError::Pattern { pattern: (*x).to_owned(), source: e })
			})
			.collect::<Result<Vec<_>, _>>()?;
		Ok(FileFilter { patterns })
	}

	pub fn headers() -> Result<Self, ProjectError> {
		FileFilter::new(HEADER_PATTERNS)
	}

	pub fn sources() -> Result<Self, ProjectError> {
		FileFilter::new(SOURCE_PATTERNS)
	}

	pub fn matches(&self, file_name: &str) -> bool {
		self.patterns.iter().any(|x| x.matches(file_name))
	}
}

fn is_file(entry: &DirEntry) -> bool {
	// Symlinks to files count as files, symlinked directories are not followed
	entry.file_type().is_file() || (entry.path_is_symlink() && entry.path().is_file())
}

/// Recursively collects the files under `root/dir` whose base name passes `filter`.
///
/// A directory's files are listed before its subdirectories are visited, and
/// siblings are ordered by name. Returned paths are `dir` joined with the path
/// below it, so they keep whatever form `dir` was given in.
/// A missing directory yields no files, entries that cannot be read are skipped.
pub fn scan(root: &Path, dir: &Path, filter: &FileFilter) -> Vec<PathBuf> {
	let full = root.join(dir);
	if !full.is_dir() {
		log::debug!("Not scanning \"{}\": not a directory", full.display());
		return Vec::new();
	}

	let walker = WalkDir::new(&full).sort_by(|a, b| {
		a.file_type()
			.is_dir()
			.cmp(&b.file_type().is_dir())
			.then_with(|| a.file_name().cmp(b.file_name()))
	});

	let mut files = Vec::new();
	for entry in walker {
		let entry = match entry {
			Ok(x) => x,
			Err(e) => {
				log::warn!("Skipping unreadable entry while scanning \"{}\": {}", full.display(), e);
				continue;
			}
		};
		if !is_file(&entry) || !filter.matches(&entry.file_name().to_string_lossy()) {
			continue;
		}
		match entry.path().strip_prefix(&full) {
			Ok(below) => files.push(join_parent(dir, below)),
			Err(_) => log::warn!("Skipping \"{}\": outside of \"{}\"", entry.path().display(), full.display()),
		}
	}
	log::debug!("Scanned \"{}\": {} file(s)", full.display(), files.len());
	files
}

#[test]
fn test_normalize() {
	assert_eq!(normalize(Path::new("/a/b/../c/./d")), PathBuf::from("/a/c/d"));
	assert_eq!(normalize(Path::new("/a/..")), PathBuf::from("/"));
	assert_eq!(normalize(Path::new("/..")), PathBuf::from("/"));
	assert_eq!(normalize(Path::new("a/./b/")), PathBuf::from("a/b"));
	assert_eq!(normalize(Path::new("a/../..")), PathBuf::from(".."));
	assert_eq!(normalize(Path::new("./")), PathBuf::from("."));
}

#[test]
fn test_relative_to() {
	let root = Path::new("/work/project");
	assert_eq!(relative_to(Path::new("/work/project"), root), Some(PathBuf::from(".")));
	assert_eq!(relative_to(Path::new("/work/project/libs/foo"), root), Some(PathBuf::from("libs/foo")));
	assert_eq!(relative_to(Path::new("/work"), root), None);
	// Component-wise, not a string prefix
	assert_eq!(relative_to(Path::new("/work/project2"), root), None);
}

#[test]
fn test_file_filter() {
	let headers = FileFilter::headers().unwrap();
	assert!(headers.matches("a.h"));
	assert!(headers.matches("b.hpp"));
	assert!(!headers.matches("c.txt"));
	assert!(!headers.matches("a.H"));
	assert!(!headers.matches("a.hpp.bak"));

	let sources = FileFilter::sources().unwrap();
	assert!(sources.matches("main.cpp"));
	assert!(sources.matches("impl.c"));
	assert!(!sources.matches("README.md"));

	assert!(FileFilter::new(&["[.h"]).is_err());
}

#[test]
fn test_source_kinds() {
	assert!(is_c_source(Path::new("src/a.c")));
	assert!(!is_c_source(Path::new("src/a.cpp")));
	assert!(is_cpp_source(Path::new("src/a.cpp")));
	assert!(is_cpp_source(Path::new("src/a.cc")));
	assert!(!is_cpp_source(Path::new("src/a.h")));
}

#[test]
fn test_scan_order_and_filter() {
	use std::fs;

	let tmp = tempfile::tempdir().unwrap();
	let root = tmp.path();
	fs::create_dir_all(root.join("src/b_sub")).unwrap();
	fs::create_dir_all(root.join("src/a_sub")).unwrap();
	for file in ["src/z.cpp", "src/a.c", "src/notes.txt", "src/a_sub/x.cpp", "src/b_sub/y.c"] {
		fs::write(root.join(file), "").unwrap();
	}

	let files = scan(root, Path::new("src"), &FileFilter::sources().unwrap());
	assert_eq!(
		files,
		vec![
			PathBuf::from("src/a.c"),
			PathBuf::from("src/z.cpp"),
			PathBuf::from("src/a_sub/x.cpp"),
			PathBuf::from("src/b_sub/y.c"),
		]
	);

	let files = scan(root, Path::new("."), &FileFilter::sources().unwrap());
	assert_eq!(files.first(), Some(&PathBuf::from("src/a.c")));

	let missing = scan(root, Path::new("does/not/exist"), &FileFilter::sources().unwrap());
	assert!(missing.is_empty());
}

#[cfg(unix)]
#[test]
fn test_scan_skips_unreadable_dir() {
	use std::{fs, os::unix::fs::PermissionsExt};

	let tmp = tempfile::tempdir().unwrap();
	let root = tmp.path();
	fs::create_dir_all(root.join("include/locked")).unwrap();
	fs::write(root.join("include/a.h"), "").unwrap();
	fs::write(root.join("include/locked/b.h"), "").unwrap();
	fs::set_permissions(root.join("include/locked"), fs::Permissions::from_mode(0o000)).unwrap();

	let files = scan(root, Path::new("include"), &FileFilter::headers().unwrap());
	fs::set_permissions(root.join("include/locked"), fs::Permissions::from_mode(0o755)).unwrap();

	// Readable anyway when running as root
	assert_eq!(files.first(), Some(&PathBuf::from("include/a.h")));
	assert!(files.len() <= 2);
}
