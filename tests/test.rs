use std::{
	collections::BTreeMap, //
	fs,
	path::{Path, PathBuf},
	sync::Arc,
};

use layout::{
	generator::Ninja, //
	toolchain::Toolchain,
	BuildSettings,
	Environment,
	LibraryProject,
	Project,
};

fn fixture() -> PathBuf {
	Path::new(env!("CARGO_MANIFEST_DIR")).join("test_data").join("foo")
}

fn paths(x: &[&str]) -> Vec<PathBuf> {
	x.iter().map(PathBuf::from).collect()
}

fn strings(x: &[&str]) -> Vec<String> {
	x.iter().map(|s| s.to_string()).collect()
}

fn foo_library() -> Arc<LibraryProject> {
	let project = Project::with_root(&fixture(), "foo", Vec::new(), None).expect("Could not create project");
	Arc::new(LibraryProject::new(project, 1, 2).expect("Could not scan library"))
}

/// Records every call and hands out `<kind>:<name>` handles.
#[derive(Default)]
struct Recorder {
	libdir: PathBuf,
	arguments: BTreeMap<String, String>,
	libraries: Vec<(PathBuf, String, u32, u32, Vec<PathBuf>, BuildSettings)>,
	programs: Vec<(PathBuf, String, Vec<PathBuf>, BuildSettings)>,
	installs: Vec<(PathBuf, String)>,
	docs: Vec<PathBuf>,
	indents: Vec<Vec<PathBuf>>,
	aliases: BTreeMap<String, Vec<String>>,
	always: Vec<String>,
	default: Option<String>,
	fail_on: Option<&'static str>,
}

impl Recorder {
	fn new(prefix: Option<&str>) -> Self {
		let mut arguments = BTreeMap::new();
		if let Some(prefix) = prefix {
			arguments.insert("prefix".to_owned(), prefix.to_owned());
		}
		Recorder { libdir: PathBuf::from("lib"), arguments, ..Default::default() }
	}

	fn check(&self, call: &str) -> anyhow::Result<()> {
		match self.fail_on {
			Some(x) if x == call => Err(anyhow::anyhow!("{} failed", call)),
			_ => Ok(()),
		}
	}
}

impl Environment for Recorder {
	type Target = String;

	fn libdir(&self) -> &Path {
		&self.libdir
	}

	fn argument(&self, key: &str) -> Option<&str> {
		self.arguments.get(key).map(String::as_str)
	}

	fn library(
		&mut self,
		output_dir: &Path,
		name: &str,
		major: u32,
		minor: u32,
		sources: &[PathBuf],
		settings: &BuildSettings,
	) -> anyhow::Result<Vec<String>> {
		self.check("library")?;
		self.libraries.push((
			output_dir.to_owned(),
			name.to_owned(),
			major,
			minor,
			sources.to_vec(),
			settings.clone(),
		));
		Ok(vec![format!("static:{}", name), format!("shared:{}", name)])
	}

	fn program(
		&mut self,
		output_dir: &Path,
		name: &str,
		sources: &[PathBuf],
		settings: &BuildSettings,
	) -> anyhow::Result<Vec<String>> {
		self.check("program")?;
		self.programs.push((output_dir.to_owned(), name.to_owned(), sources.to_vec(), settings.clone()));
		Ok(vec![format!("program:{}", name)])
	}

	fn install(&mut self, dest_dir: &Path, targets: &[String]) -> anyhow::Result<Vec<String>> {
		self.check("install")?;
		let mut installed = Vec::new();
		for target in targets {
			self.installs.push((dest_dir.to_owned(), target.clone()));
			installed.push(format!("install:{}", target));
		}
		Ok(installed)
	}

	fn install_file(&mut self, dest_dir: &Path, file: &Path) -> anyhow::Result<Vec<String>> {
		self.check("install_file")?;
		self.installs.push((dest_dir.to_owned(), file.display().to_string()));
		Ok(vec![format!("install:{}", file.display())])
	}

	fn documentation(&mut self, doxyfile: &Path) -> anyhow::Result<Vec<String>> {
		self.check("documentation")?;
		self.docs.push(doxyfile.to_owned());
		Ok(vec!["doc".to_owned()])
	}

	fn format_sources(&mut self, files: &[PathBuf]) -> anyhow::Result<Vec<String>> {
		self.check("format_sources")?;
		self.indents.push(files.to_vec());
		Ok(vec!["indent".to_owned()])
	}

	fn alias(&mut self, name: &str, targets: &[String]) -> anyhow::Result<()> {
		self.aliases.entry(name.to_owned()).or_default().extend_from_slice(targets);
		Ok(())
	}

	fn always_build(&mut self, targets: &[String]) -> anyhow::Result<()> {
		self.always.extend_from_slice(targets);
		Ok(())
	}

	fn set_default(&mut self, alias: &str) -> anyhow::Result<()> {
		self.default = Some(alias.to_owned());
		Ok(())
	}
}

#[test]
fn test_library_discovery() {
	let lib = foo_library();
	assert_eq!(lib.project.path, PathBuf::from("."));
	assert_eq!(lib.project.abspath, layout::normalize(&fixture()));
	assert_eq!(lib.include_path, PathBuf::from("include/foo"));
	assert_eq!(lib.source_path, PathBuf::from("src"));
	assert_eq!(lib.include_files, paths(&["include/foo/a.h", "include/foo/b.hpp"]));
	assert_eq!(lib.source_files, paths(&["src/foo.cpp", "src/detail/impl.c"]));
}

#[test]
fn test_library_in_subdirectory() {
	let root = fixture().join("..");
	let project = Project::with_root(&root, "foo", Vec::new(), Some(Path::new("foo"))).unwrap();
	let lib = LibraryProject::new(project, 1, 2).unwrap();
	assert_eq!(lib.project.path, PathBuf::from("foo"));
	assert_eq!(lib.include_files, paths(&["foo/include/foo/a.h", "foo/include/foo/b.hpp"]));
	assert_eq!(lib.source_files, paths(&["foo/src/foo.cpp", "foo/src/detail/impl.c"]));
}

#[test]
fn test_sample_from_library() {
	let lib = foo_library();
	let libraries = strings(&["bar"]);
	let sample = lib.sample(&libraries, Some(Path::new("samples/bar"))).unwrap();

	assert_eq!(sample.name(), "bar");
	assert_eq!(sample.project.libraries, strings(&["foo", "bar"]));
	assert_eq!(sample.project.path, PathBuf::from("samples/bar"));
	assert_eq!(sample.source_files, paths(&["samples/bar/main.cpp"]));
	assert!(Arc::ptr_eq(&sample.parent_project, &lib));
	// The caller's list is left alone
	assert_eq!(libraries, strings(&["bar"]));

	let sample = lib.sample(&strings(&["foo", "bar"]), Some(Path::new("samples/bar"))).unwrap();
	assert_eq!(sample.project.libraries, strings(&["foo", "bar"]));
}

#[test]
fn test_sample_at_working_directory() {
	let lib = foo_library();
	let sample = lib.sample(&[], None).unwrap();
	assert_eq!(sample.name(), "foo");
	assert_eq!(sample.project.path, PathBuf::from("."));
	assert_eq!(sample.project.libraries, strings(&["foo"]));
	assert_eq!(sample.source_files, paths(&["samples/bar/main.cpp", "src/foo.cpp", "src/detail/impl.c"]));
}

#[test]
fn test_sample_explicit_sources() {
	let lib = foo_library();
	let sample = lib
		.sample_with_sources(&[], Some(Path::new("samples/bar")), Some(paths(&["samples/bar/other.c"])))
		.unwrap();
	assert_eq!(sample.source_files, paths(&["samples/bar/other.c"]));
}

#[test]
fn test_sample_outside_working_directory() {
	let lib = foo_library();
	let result = lib.sample(&[], Some(Path::new("../elsewhere")));
	assert!(matches!(result, Err(layout::ProjectError::InvalidPath { .. })));
}

#[test]
fn test_configure_library() {
	let lib = foo_library();
	let mut env = Recorder::new(Some("/opt/foo"));
	let targets = lib.configure_environment(&mut env).unwrap();

	assert_eq!(
		targets,
		strings(&[
			"static:foo",
			"shared:foo",
			"install:static:foo",
			"install:shared:foo",
			"install:include/foo/a.h",
			"install:include/foo/b.hpp",
			"doc",
			"indent",
		])
	);

	assert_eq!(env.libraries.len(), 1);
	let (output_dir, name, major, minor, sources, settings) = &env.libraries[0];
	assert_eq!(output_dir, &PathBuf::from("lib"));
	assert_eq!(name, "foo");
	assert_eq!((*major, *minor), (1, 2));
	assert_eq!(sources, &lib.source_files);
	assert_eq!(settings.include_dirs, paths(&["include/foo"]));
	assert!(settings.library_dirs.is_empty());
	assert!(settings.libraries.is_empty());

	assert_eq!(
		env.installs,
		vec![
			(PathBuf::from("/opt/foo/lib"), "static:foo".to_owned()),
			(PathBuf::from("/opt/foo/lib"), "shared:foo".to_owned()),
			(PathBuf::from("/opt/foo/include/foo"), "include/foo/a.h".to_owned()),
			(PathBuf::from("/opt/foo/include/foo"), "include/foo/b.hpp".to_owned()),
		]
	);
	assert_eq!(env.docs, paths(&["doxyfile"]));
	assert_eq!(
		env.indents,
		vec![paths(&["src/foo.cpp", "src/detail/impl.c", "include/foo/a.h", "include/foo/b.hpp"])]
	);

	assert_eq!(env.aliases.keys().collect::<Vec<_>>(), vec!["build", "doc", "indent", "install"]);
	assert_eq!(env.aliases["build"], strings(&["static:foo", "shared:foo"]));
	assert_eq!(env.aliases["install"].len(), 4);
	assert_eq!(env.aliases["doc"], strings(&["doc"]));
	assert_eq!(env.aliases["indent"], strings(&["indent"]));
	assert_eq!(env.always, strings(&["doc", "indent"]));
	assert_eq!(env.default.as_deref(), Some("build"));
}

#[test]
fn test_configure_library_without_prefix() {
	let lib = foo_library();
	let mut env = Recorder::new(None);
	let err = lib.configure_environment(&mut env).unwrap_err();
	assert!(err.to_string().contains("prefix"), "{}", err);
	assert!(env.libraries.is_empty());
	assert!(env.aliases.is_empty());
}

#[test]
fn test_configure_library_error_propagates() {
	let lib = foo_library();
	let mut env = Recorder::new(Some("/opt/foo"));
	env.fail_on = Some("install_file");
	let err = lib.configure_environment(&mut env).unwrap_err();
	assert_eq!(err.to_string(), "install_file failed");
	// Nothing is rolled back
	assert_eq!(env.libraries.len(), 1);
	assert_eq!(env.installs.len(), 2);
	assert!(env.aliases.is_empty());
	assert!(env.default.is_none());
}

#[test]
fn test_configure_sample() {
	let lib = foo_library();
	let sample = lib.sample(&strings(&["bar"]), Some(Path::new("samples/bar"))).unwrap();
	let mut env = Recorder::new(Some("/opt/foo"));
	let targets = sample.configure_environment(&mut env).unwrap();

	assert_eq!(targets, strings(&["program:bar"]));
	assert!(env.libraries.is_empty());
	assert!(env.installs.is_empty());
	assert!(env.aliases.is_empty());

	let (output_dir, name, sources, settings) = &env.programs[0];
	assert_eq!(output_dir, &PathBuf::from("samples/bar"));
	assert_eq!(name, "bar");
	assert_eq!(sources, &paths(&["samples/bar/main.cpp"]));
	let abspath = layout::normalize(&fixture());
	assert_eq!(settings.include_dirs, vec![PathBuf::from("samples/bar"), abspath.join("include")]);
	assert_eq!(settings.library_dirs, vec![PathBuf::from("samples/bar"), abspath.join("lib")]);
	assert_eq!(settings.libraries, strings(&["foo", "bar"]));
}

#[test]
fn test_manifest_to_ninja() {
	let src_dir = layout::normalize(&fixture());
	let build_dir = tempfile::tempdir().unwrap();

	let manifest = layout::read_manifest(&src_dir).expect("Could not read manifest");
	assert_eq!(manifest.library.name, "foo");
	assert_eq!(manifest.sample.len(), 1);

	let arguments = manifest.arguments(&BTreeMap::new());
	let (library, samples) = layout::load_projects(&manifest, &src_dir).unwrap();
	assert_eq!(library.project.libraries, strings(&["ssl"]));
	assert_eq!(samples[0].project.libraries, strings(&["foo", "bar"]));

	let mut ninja = Ninja::new(&src_dir, build_dir.path(), Path::new("lib"), arguments, Toolchain::default());
	let targets = layout::configure(&library, &samples, &mut ninja).unwrap();
	// static + shared, 2 installed libs + 2 headers, doc, indent, sample
	assert_eq!(targets.len(), 9);
	assert_eq!(targets[8], src_dir.join("samples/bar/bar"));

	let build_ninja = ninja.write().unwrap();
	assert_eq!(build_ninja, layout::normalize(build_dir.path()).join("build.ninja"));
	let contents = fs::read_to_string(&build_ninja).unwrap();

	let src = src_dir.display().to_string();
	assert!(contents.contains(&format!("build build: phony {src}/lib/libfoo.a {src}/lib/libfoo.so.1.2\n")));
	assert!(contents.contains(&format!("build /opt/foo/include/foo/a.h: install {src}/include/foo/a.h\n")));
	assert!(contents.contains("  LIBS = -lfoo -lbar\n"));
	assert!(contents.contains("  LIBS = -lssl\n"));
	assert!(contents.contains("build always_build: phony\n"));
	assert!(contents.ends_with("default build\n"));
	for alias in ["build", "install", "doc", "indent"] {
		assert_eq!(contents.matches(&format!("build {}: phony", alias)).count(), 1, "{}", alias);
	}
}

#[test]
fn test_sample_sharing_library_name_to_ninja() {
	let lib = foo_library();
	let sample = lib.sample(&[], None).unwrap();
	assert_eq!(sample.name(), lib.name());

	let src_dir = layout::normalize(&fixture());
	let build_dir = tempfile::tempdir().unwrap();
	let arguments = BTreeMap::from([("prefix".to_owned(), "/opt/foo".to_owned())]);
	let mut ninja = Ninja::new(&src_dir, build_dir.path(), Path::new("lib"), arguments, Toolchain::default());
	lib.configure_environment(&mut ninja).unwrap();
	sample.configure_environment(&mut ninja).unwrap();

	let contents = ninja.as_string();
	let mut outputs = BTreeMap::new();
	for line in contents.lines().filter_map(|x| x.strip_prefix("build ")) {
		let (out, _) = line.split_once(": ").unwrap();
		*outputs.entry(out.to_owned()).or_insert(0) += 1;
	}
	let duplicates = outputs.iter().filter(|(_, count)| **count > 1).collect::<Vec<_>>();
	assert!(duplicates.is_empty(), "{:?}", duplicates);
	assert!(outputs.contains_key(&src_dir.join("foo").display().to_string()));

	// The same program twice is rejected
	assert!(sample.configure_environment(&mut ninja).is_err());
}

#[test]
fn test_missing_manifest() {
	let dir = tempfile::tempdir().unwrap();
	let err = layout::read_manifest(dir.path()).unwrap_err();
	assert!(err.to_string().contains("project.toml"), "{}", err);
}
