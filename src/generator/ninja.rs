use std::{
	collections::{BTreeMap, HashMap},
	fs,
	path::{Component, Path, PathBuf},
};

use super::TargetPlatform;
use crate::{
	environment::{BuildSettings, Environment},
	err_msg,
	misc::{is_c_source, is_cpp_source, normalize},
	toolchain::Toolchain,
};

const BUILD_NINJA: &str = "build.ninja";
const ALWAYS_BUILD: &str = "always_build";
const PHONY: &str = "phony";
// Libraries and programs compile into separate trees, a sample may share its library's name
const LIBRARY_OBJECT_DIR: &str = "lib";
const PROGRAM_OBJECT_DIR: &str = "bin";

fn escape_path(path: &str) -> String {
	path.replace('$', "$$").replace(' ', "$ ").replace(':', "$:")
}

fn escape_paths(paths: &[String]) -> String {
	paths.iter().map(|x| escape_path(x)).collect::<Vec<_>>().join(" ")
}

/// Quotes `arg` for `/bin/sh` unless it is made of characters the shell leaves alone.
fn shell_quote(arg: &str) -> String {
	let plain = |c: char| c.is_ascii_alphanumeric() || "-_./=+,:@%".contains(c);
	if !arg.is_empty() && arg.chars().all(plain) {
		return arg.to_owned();
	}
	format!("'{}'", arg.replace('\'', r"'\''"))
}

fn path_str(path: &Path) -> String {
	path.to_string_lossy().into_owned()
}

fn push_relative(ret: &mut PathBuf, path: &Path) {
	for component in normalize(path).components() {
		match component {
			Component::Normal(x) => ret.push(x),
			Component::ParentDir => ret.push("__"),
			_ => {}
		}
	}
}

/// `<build_dir>/<target_dir>/<src>.o`, with `..` mapped to `__` so objects never leave `target_dir`.
fn object_path(build_dir: &Path, target_dir: &Path, src: &Path, ext: &str) -> PathBuf {
	let mut ret = build_dir.to_owned();
	push_relative(&mut ret, target_dir);
	push_relative(&mut ret, src);
	let mut ret = ret.into_os_string();
	ret.push(ext);
	PathBuf::from(ret)
}

#[derive(Clone, Default)]
struct NinjaRule {
	name: String,
	command: Vec<String>,
	depfile: Option<String>,
	deps: Option<String>,
	description: Option<String>,
}

impl NinjaRule {
	fn as_string(&self) -> String {
		let mut ret = format!(
			r#"rule {}
  command = {}"#,
			self.name,
			self.command.join(" ")
		);
		if let Some(depfile) = &self.depfile {
			ret += "\n  depfile = ";
			ret += depfile;
		}
		if let Some(deps) = &self.deps {
			ret += "\n  deps = ";
			ret += deps;
		}
		if let Some(desc) = &self.description {
			ret += "\n  description = ";
			ret += desc;
		}
		ret += "\n\n";
		ret
	}
}

struct NinjaBuild {
	inputs: Vec<String>,
	implicit: Vec<String>,
	output_targets: Vec<String>,
	rule: String,
	keyval_set: BTreeMap<String, Vec<String>>,
}

impl NinjaBuild {
	fn new(rule: String, inputs: Vec<String>, output_targets: Vec<String>) -> Self {
		NinjaBuild { inputs, implicit: Vec::new(), output_targets, rule, keyval_set: BTreeMap::new() }
	}

	fn as_string(&self) -> String {
		let mut ret = format!("build {}: {}", escape_paths(&self.output_targets), self.rule);
		if !self.inputs.is_empty() {
			ret += " ";
			ret += &escape_paths(&self.inputs);
		}
		if !self.implicit.is_empty() {
			ret += " | ";
			ret += &escape_paths(&self.implicit);
		}
		ret += "\n";
		for (key, values) in &self.keyval_set {
			if !values.is_empty() {
				let values = values.iter().map(|x| shell_quote(x)).collect::<Vec<_>>();
				ret += &format!("  {key} = {}\n", values.join(" ").replace('$', "$$"));
			}
		}
		ret += "\n";
		ret
	}
}

fn compile_object(name: &str, compiler: &[String], language: &str) -> NinjaRule {
	let mut command = compiler.to_owned();
	command.extend(vec!["$INCLUDES".to_string(), "$FLAGS".to_string()]);
	command.extend(vec!["-MMD".to_string(), "-MF".to_string(), "$out.d".to_string()]);
	command.extend(vec!["-o".to_string(), "$out".to_string(), "-c".to_string(), "$in".to_string()]);
	NinjaRule {
		name: name.to_owned(),
		command,
		depfile: Some("$out.d".to_owned()),
		deps: Some("gcc".to_owned()),
		description: Some(format!("Compiling {} object $out", language)),
	}
}
fn compile_c_object(compiler: &[String]) -> NinjaRule {
	compile_object("compile_c_object", compiler, "C")
}
fn compile_cpp_object(compiler: &[String]) -> NinjaRule {
	compile_object("compile_cpp_object", compiler, "C++")
}
fn link_static_lib(static_linker: &[String]) -> NinjaRule {
	// Archivers append, so start from scratch
	let mut command = vec!["rm".to_string(), "-f".to_string(), "$out".to_string(), "&&".to_string()];
	command.extend_from_slice(static_linker);
	command.extend(vec!["$out".to_string(), "$in".to_string()]);
	NinjaRule {
		name: String::from("link_static_lib"),
		command,
		description: Some("Linking static library $out".to_owned()),
		..Default::default()
	}
}
fn link(name: &str, linker: &[String], description: &str) -> NinjaRule {
	let mut command = linker.to_owned();
	command.extend(vec![
		"$LINK_FLAGS".to_string(),
		"-o".to_string(),
		"$out".to_string(),
		"$in".to_string(),
		"$LINK_PATH".to_string(),
		"$LIBS".to_string(),
	]);
	NinjaRule { name: name.to_owned(), command, description: Some(description.to_owned()), ..Default::default() }
}
fn link_shared_lib(shared_linker: &[String]) -> NinjaRule {
	link("link_shared_lib", shared_linker, "Linking shared library $out")
}
fn link_exe(exe_linker: &[String]) -> NinjaRule {
	link("link_exe", exe_linker, "Linking executable $out")
}
fn install(install: &[String]) -> NinjaRule {
	let mut command = install.to_owned();
	command.extend(vec!["$in".to_string(), "$out".to_string()]);
	NinjaRule {
		name: String::from("install"),
		command,
		description: Some("Installing $out".to_owned()),
		..Default::default()
	}
}
fn doxygen(doxygen: &[String]) -> NinjaRule {
	let mut command = vec!["cd".to_string(), "$SOURCE_DIR".to_string(), "&&".to_string()];
	command.extend_from_slice(doxygen);
	command.extend(vec!["$in".to_string(), "&&".to_string(), "touch".to_string(), "$out".to_string()]);
	NinjaRule {
		name: String::from("doxygen"),
		command,
		description: Some("Generating documentation from $in".to_owned()),
		..Default::default()
	}
}
fn indent(indent: &[String]) -> NinjaRule {
	let mut command = indent.to_owned();
	command.extend(vec!["$in".to_string(), "&&".to_string(), "touch".to_string(), "$out".to_string()]);
	NinjaRule {
		name: String::from("indent"),
		command,
		description: Some("Indenting sources".to_owned()),
		..Default::default()
	}
}

/// An [`Environment`] that describes its targets as a `build.ninja` file.
///
/// Relative paths are taken relative to the source directory. Objects and stamp
/// files are placed in the build directory, everything else where it is asked for.
pub struct Ninja {
	source_dir: PathBuf,
	build_dir: PathBuf,
	libdir: PathBuf,
	arguments: BTreeMap<String, String>,
	toolchain: Toolchain,
	target_platform: TargetPlatform,

	rules: Vec<NinjaRule>,
	build_lines: Vec<NinjaBuild>,
	library_outputs: HashMap<String, Vec<PathBuf>>,
	defaults: Vec<String>,
	stamps: usize,
	always_build_used: bool,
}

impl Ninja {
	pub fn new(
		source_dir: &Path,
		build_dir: &Path,
		libdir: &Path,
		arguments: BTreeMap<String, String>,
		toolchain: Toolchain,
	) -> Self {
		Ninja {
			source_dir: normalize(source_dir),
			build_dir: normalize(build_dir),
			libdir: libdir.to_owned(),
			arguments,
			toolchain,
			target_platform: TargetPlatform::default(),
			rules: Vec::new(),
			build_lines: Vec::new(),
			library_outputs: HashMap::new(),
			defaults: Vec::new(),
			stamps: 0,
			always_build_used: false,
		}
	}

	pub fn with_target_platform(mut self, target_platform: TargetPlatform) -> Self {
		self.target_platform = target_platform;
		self
	}

	pub fn build_ninja_path(&self) -> PathBuf {
		self.build_dir.join(BUILD_NINJA)
	}

	fn resolve(&self, path: &Path) -> PathBuf {
		normalize(&self.source_dir.join(path))
	}

	fn use_rule(&mut self, rule: NinjaRule) -> String {
		let name = rule.name.clone();
		if !self.rules.iter().any(|x| x.name == name) {
			self.rules.push(rule);
		}
		name
	}

	fn is_output(&self, target: &str) -> bool {
		self.build_lines.iter().any(|x| x.output_targets.iter().any(|y| y == target))
	}

	fn next_stamp(&mut self, kind: &str) -> PathBuf {
		self.stamps += 1;
		self.build_dir.join(format!("{}.{}.stamp", kind, self.stamps))
	}

	fn compile_sources(
		&mut self,
		target_dir: &Path,
		sources: &[PathBuf],
		settings: &BuildSettings,
		flags: &[&str],
	) -> anyhow::Result<Vec<String>> {
		let includes = settings
			.include_dirs
			.iter()
			.map(|x| "-I".to_owned() + &path_str(&self.resolve(x)))
			.collect::<Vec<_>>();
		let flags = flags.iter().copied().map(String::from).collect::<Vec<_>>();

		let mut objects = Vec::with_capacity(sources.len());
		for src in sources {
			let rule = if is_c_source(src) {
				compile_c_object(&self.toolchain.c_compiler)
			} else if is_cpp_source(src) {
				compile_cpp_object(&self.toolchain.cpp_compiler)
			} else {
				return err_msg(format!("Unknown source type: {}", src.display()));
			};
			let rule = self.use_rule(rule);
			let object = path_str(&object_path(&self.build_dir, target_dir, src, &self.target_platform.obj_ext));
			let mut build = NinjaBuild::new(rule, vec![path_str(&self.resolve(src))], vec![object.clone()]);
			build.keyval_set.insert("INCLUDES".to_owned(), includes.clone());
			build.keyval_set.insert("FLAGS".to_owned(), flags.clone());
			self.build_lines.push(build);
			objects.push(object);
		}
		Ok(objects)
	}

	/// The `-L`/`-l` flags for `settings`, and the outputs of the libraries
	/// described here that the link has to wait for.
	fn link_inputs(&self, settings: &BuildSettings) -> (Vec<String>, Vec<String>, Vec<String>) {
		let link_path = settings
			.library_dirs
			.iter()
			.map(|x| "-L".to_owned() + &path_str(&self.resolve(x)))
			.collect();
		let libs = settings.libraries.iter().map(|x| "-l".to_owned() + x).collect();
		let implicit = settings
			.libraries
			.iter()
			.filter_map(|x| self.library_outputs.get(x))
			.flatten()
			.map(|x| path_str(x))
			.collect();
		(link_path, libs, implicit)
	}

	pub fn as_string(&self) -> String {
		let mut ret = String::from("# Generated by layout. Do not edit.\n\n");
		for rule in &self.rules {
			ret += &rule.as_string();
		}
		for line in &self.build_lines {
			ret += &line.as_string();
		}
		if self.always_build_used {
			ret += &NinjaBuild::new(PHONY.to_owned(), Vec::new(), vec![ALWAYS_BUILD.to_owned()]).as_string();
		}
		for default in &self.defaults {
			ret += &format!("default {}\n", escape_path(default));
		}
		ret
	}

	pub fn write(&self) -> anyhow::Result<PathBuf> {
		let build_ninja_path = self.build_ninja_path();
		if let Err(e) = fs::write(&build_ninja_path, self.as_string()) {
			return err_msg(format!("Error writing to {}: {}", build_ninja_path.display(), e));
		}
		log::info!("wrote {}", build_ninja_path.display());
		Ok(build_ninja_path)
	}
}

impl Environment for Ninja {
	type Target = PathBuf;

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
	) -> anyhow::Result<Vec<PathBuf>> {
		if self.library_outputs.contains_key(name) {
			return err_msg(format!("Library \"{}\" is already described", name));
		}
		if sources.is_empty() {
			log::warn!("Library \"{}\" has no sources", name);
		}
		let target_dir = Path::new(LIBRARY_OBJECT_DIR).join(name);
		let objects = self.compile_sources(&target_dir, sources, settings, &["-fPIC"])?;

		let platform = &self.target_platform;
		let shared_name = format!("{}{}{}", platform.lib_prefix, name, platform.shared_lib_ext);
		let output_dir = self.resolve(output_dir);
		let static_lib = output_dir.join(format!("{}{}{}", platform.lib_prefix, name, platform.static_lib_ext));
		let shared_lib = output_dir.join(format!("{}.{}.{}", shared_name, major, minor));
		let soname = format!("-Wl,-soname,{}.{}", shared_name, major);

		let rule = self.use_rule(link_static_lib(&self.toolchain.static_linker));
		self.build_lines.push(NinjaBuild::new(rule, objects.clone(), vec![path_str(&static_lib)]));

		let (link_path, libs, implicit) = self.link_inputs(settings);
		let rule = self.use_rule(link_shared_lib(&self.toolchain.shared_linker));
		let mut build = NinjaBuild::new(rule, objects, vec![path_str(&shared_lib)]);
		build.implicit = implicit;
		build.keyval_set.insert("LINK_FLAGS".to_owned(), vec!["-shared".to_owned(), soname]);
		build.keyval_set.insert("LINK_PATH".to_owned(), link_path);
		build.keyval_set.insert("LIBS".to_owned(), libs);
		self.build_lines.push(build);

		log::debug!("library target: {} ({} sources)", name, sources.len());
		let outputs = vec![static_lib, shared_lib];
		self.library_outputs.insert(name.to_owned(), outputs.clone());
		Ok(outputs)
	}

	fn program(
		&mut self,
		output_dir: &Path,
		name: &str,
		sources: &[PathBuf],
		settings: &BuildSettings,
	) -> anyhow::Result<Vec<PathBuf>> {
		if sources.is_empty() {
			return err_msg(format!("Program \"{}\" has no sources", name));
		}
		let exe = self.resolve(output_dir).join(name.to_owned() + &self.target_platform.exe_ext);
		if self.is_output(&path_str(&exe)) {
			return err_msg(format!("Program \"{}\" is already described in \"{}\"", name, output_dir.display()));
		}
		let target_dir = Path::new(PROGRAM_OBJECT_DIR).join(output_dir).join(name);
		let objects = self.compile_sources(&target_dir, sources, settings, &[])?;

		let (link_path, libs, implicit) = self.link_inputs(settings);
		let rule = self.use_rule(link_exe(&self.toolchain.exe_linker));
		let mut build = NinjaBuild::new(rule, objects, vec![path_str(&exe)]);
		build.implicit = implicit;
		build.keyval_set.insert("LINK_PATH".to_owned(), link_path);
		build.keyval_set.insert("LIBS".to_owned(), libs);
		self.build_lines.push(build);

		log::debug!("program target: {} ({} sources)", name, sources.len());
		Ok(vec![exe])
	}

	fn install(&mut self, dest_dir: &Path, targets: &[PathBuf]) -> anyhow::Result<Vec<PathBuf>> {
		let mut installed = Vec::with_capacity(targets.len());
		for target in targets {
			installed.extend(self.install_file(dest_dir, target)?);
		}
		Ok(installed)
	}

	fn install_file(&mut self, dest_dir: &Path, file: &Path) -> anyhow::Result<Vec<PathBuf>> {
		let file_name = match file.file_name() {
			Some(x) => x,
			None => return err_msg(format!("Cannot install \"{}\": no file name", file.display())),
		};
		let dest = self.resolve(dest_dir).join(file_name);
		let input = path_str(&self.resolve(file));
		let rule = self.use_rule(install(&self.toolchain.install));
		self.build_lines.push(NinjaBuild::new(rule, vec![input], vec![path_str(&dest)]));
		Ok(vec![dest])
	}

	fn documentation(&mut self, doxyfile: &Path) -> anyhow::Result<Vec<PathBuf>> {
		let stamp = self.next_stamp("doc");
		let rule = self.use_rule(doxygen(&self.toolchain.doxygen));
		let mut build = NinjaBuild::new(rule, vec![path_str(&self.resolve(doxyfile))], vec![path_str(&stamp)]);
		build.keyval_set.insert("SOURCE_DIR".to_owned(), vec![path_str(&self.source_dir)]);
		self.build_lines.push(build);
		Ok(vec![stamp])
	}

	fn format_sources(&mut self, files: &[PathBuf]) -> anyhow::Result<Vec<PathBuf>> {
		let stamp = self.next_stamp("indent");
		let rule = self.use_rule(indent(&self.toolchain.indent));
		let inputs = files.iter().map(|x| path_str(&self.resolve(x))).collect();
		self.build_lines.push(NinjaBuild::new(rule, inputs, vec![path_str(&stamp)]));
		Ok(vec![stamp])
	}

	fn alias(&mut self, name: &str, targets: &[PathBuf]) -> anyhow::Result<()> {
		let targets = targets.iter().map(|x| path_str(x));
		// Aliasing the same name again adds to it
		match self
			.build_lines
			.iter_mut()
			.find(|x| x.rule == PHONY && x.output_targets.len() == 1 && x.output_targets[0] == name)
		{
			Some(existing) => existing.inputs.extend(targets),
			None => self.build_lines.push(NinjaBuild::new(PHONY.to_owned(), targets.collect(), vec![name.to_owned()])),
		}
		Ok(())
	}

	fn always_build(&mut self, targets: &[PathBuf]) -> anyhow::Result<()> {
		for target in targets {
			let target = path_str(target);
			let build = match self.build_lines.iter_mut().find(|x| x.output_targets.contains(&target)) {
				Some(x) => x,
				None => return err_msg(format!("Cannot always build unknown target \"{}\"", target)),
			};
			if !build.implicit.iter().any(|x| x == ALWAYS_BUILD) {
				build.implicit.push(ALWAYS_BUILD.to_owned());
			}
		}
		self.always_build_used = true;
		Ok(())
	}

	fn set_default(&mut self, alias: &str) -> anyhow::Result<()> {
		if !self.defaults.iter().any(|x| x == alias) {
			self.defaults.push(alias.to_owned());
		}
		Ok(())
	}
}

#[cfg(test)]
fn test_ninja() -> Ninja {
	Ninja::new(
		Path::new("/src/proj"),
		Path::new("/src/proj/build"),
		Path::new("lib"),
		BTreeMap::from([("prefix".to_owned(), "/opt/foo".to_owned())]),
		Toolchain::default(),
	)
}

#[test]
fn test_object_path() {
	let build_dir = Path::new("/b");
	let lib_dir = Path::new("lib/foo");
	assert_eq!(object_path(build_dir, lib_dir, Path::new("src/a.cpp"), ".o"), PathBuf::from("/b/lib/foo/src/a.cpp.o"));
	assert_eq!(object_path(build_dir, lib_dir, Path::new("../x/a.c"), ".o"), PathBuf::from("/b/lib/foo/__/x/a.c.o"));
	assert_eq!(object_path(build_dir, lib_dir, Path::new("/abs/a.c"), ".o"), PathBuf::from("/b/lib/foo/abs/a.c.o"));
	assert_eq!(
		object_path(build_dir, Path::new("bin/./foo"), Path::new("src/a.cpp"), ".o"),
		PathBuf::from("/b/bin/foo/src/a.cpp.o")
	);
}

#[test]
fn test_library_and_program() {
	let mut ninja = test_ninja();
	assert_eq!(ninja.argument("prefix"), Some("/opt/foo"));
	assert_eq!(ninja.argument("missing"), None);

	let settings = BuildSettings {
		include_dirs: vec![PathBuf::from("include/foo")],
		library_dirs: Vec::new(),
		libraries: vec!["ssl".to_owned()],
	};
	let libs = ninja
		.library(
			Path::new("lib"),
			"foo",
			1,
			2,
			&[PathBuf::from("src/a.cpp"), PathBuf::from("src/b.c")],
			&settings,
		)
		.unwrap();
	assert_eq!(libs, vec![PathBuf::from("/src/proj/lib/libfoo.a"), PathBuf::from("/src/proj/lib/libfoo.so.1.2")]);

	let sample_settings = BuildSettings {
		include_dirs: vec![PathBuf::from("samples/bar"), PathBuf::from("/src/proj/include")],
		library_dirs: vec![PathBuf::from("samples/bar"), PathBuf::from("/src/proj/lib")],
		libraries: vec!["foo".to_owned()],
	};
	let exe = ninja
		.program(Path::new("samples/bar"), "bar", &[PathBuf::from("samples/bar/main.cpp")], &sample_settings)
		.unwrap();
	assert_eq!(exe, vec![PathBuf::from("/src/proj/samples/bar/bar")]);

	// 2 C++ objects + 1 C object, archive, shared object, exe
	assert_eq!(ninja.build_lines.len(), 6);
	let rule_names = ninja.rules.iter().map(|x| x.name.as_str()).collect::<Vec<_>>();
	assert_eq!(
		rule_names,
		vec!["compile_cpp_object", "compile_c_object", "link_static_lib", "link_shared_lib", "link_exe"]
	);

	let a_obj = ninja
		.build_lines
		.iter()
		.find(|x| x.inputs == vec!["/src/proj/src/a.cpp".to_owned()])
		.unwrap();
	assert_eq!(a_obj.output_targets, vec!["/src/proj/build/lib/foo/src/a.cpp.o".to_owned()]);
	assert_eq!(a_obj.keyval_set.get("FLAGS").unwrap(), &vec!["-fPIC".to_owned()]);
	assert_eq!(a_obj.keyval_set.get("INCLUDES").unwrap(), &vec!["-I/src/proj/include/foo".to_owned()]);

	let shared = ninja
		.build_lines
		.iter()
		.find(|x| x.output_targets == vec!["/src/proj/lib/libfoo.so.1.2".to_owned()])
		.unwrap();
	assert!(shared.keyval_set["LINK_FLAGS"].contains(&"-Wl,-soname,libfoo.so.1".to_owned()));
	assert_eq!(shared.keyval_set["LIBS"], vec!["-lssl".to_owned()]);

	let exe_line = ninja
		.build_lines
		.iter()
		.find(|x| x.output_targets == vec!["/src/proj/samples/bar/bar".to_owned()])
		.unwrap();
	assert_eq!(exe_line.inputs, vec!["/src/proj/build/bin/samples/bar/bar/samples/bar/main.cpp.o".to_owned()]);
	assert_eq!(
		exe_line.implicit,
		vec!["/src/proj/lib/libfoo.a".to_owned(), "/src/proj/lib/libfoo.so.1.2".to_owned()]
	);
	assert_eq!(
		exe_line.keyval_set["LINK_PATH"],
		vec!["-L/src/proj/samples/bar".to_owned(), "-L/src/proj/lib".to_owned()]
	);

	assert!(ninja.library(Path::new("lib"), "foo", 1, 2, &[], &settings).is_err());
	assert!(ninja.program(Path::new("."), "empty", &[], &settings).is_err());
	assert!(ninja
		.program(Path::new("samples/bar"), "bar", &[PathBuf::from("samples/bar/main.cpp")], &sample_settings)
		.is_err());
	assert!(ninja
		.program(Path::new("."), "bad", &[PathBuf::from("notes.txt")], &settings)
		.is_err());
}

#[test]
fn test_aliases_and_always_build() {
	let mut ninja = test_ninja();
	let doc = ninja.documentation(Path::new("doxyfile")).unwrap();
	assert_eq!(doc, vec![PathBuf::from("/src/proj/build/doc.1.stamp")]);
	let indent = ninja.format_sources(&[PathBuf::from("src/a.cpp")]).unwrap();
	assert_eq!(indent, vec![PathBuf::from("/src/proj/build/indent.2.stamp")]);

	ninja.always_build(&doc).unwrap();
	assert!(ninja.always_build(&[PathBuf::from("/nowhere")]).is_err());

	ninja.alias("doc", &doc).unwrap();
	ninja.alias("doc", &indent).unwrap();
	ninja.set_default("doc").unwrap();
	ninja.set_default("doc").unwrap();

	let out = ninja.as_string();
	assert!(out.contains("build /src/proj/build/doc.1.stamp: doxygen /src/proj/doxyfile | always_build\n"));
	assert!(out.contains("  SOURCE_DIR = /src/proj\n"));
	assert!(out.contains("build /src/proj/build/indent.2.stamp: indent /src/proj/src/a.cpp\n"));
	assert!(out.contains("build doc: phony /src/proj/build/doc.1.stamp /src/proj/build/indent.2.stamp\n"));
	assert!(out.contains("build always_build: phony\n"));
	assert_eq!(out.matches("default doc\n").count(), 1);
	assert_eq!(out.matches("rule doxygen\n").count(), 1);
}

#[test]
fn test_install() {
	let mut ninja = test_ninja();
	let installed = ninja
		.install(Path::new("/opt/foo/lib"), &[PathBuf::from("/src/proj/lib/libfoo.a")])
		.unwrap();
	assert_eq!(installed, vec![PathBuf::from("/opt/foo/lib/libfoo.a")]);
	let header = ninja
		.install_file(Path::new("/opt/foo/include/foo"), Path::new("include/foo/a.h"))
		.unwrap();
	assert_eq!(header, vec![PathBuf::from("/opt/foo/include/foo/a.h")]);
	assert_eq!(ninja.rules.len(), 1);

	let out = ninja.as_string();
	assert!(out.contains("command = install -D $in $out"));
	assert!(out.contains("build /opt/foo/include/foo/a.h: install /src/proj/include/foo/a.h\n"));
}

#[test]
fn test_escape() {
	let build = NinjaBuild::new(
		"install".to_owned(),
		vec!["C:/dir with space/a$b.h".to_owned()],
		vec!["out.h".to_owned()],
	);
	assert_eq!(build.as_string(), "build out.h: install C$:/dir$ with$ space/a$$b.h\n\n");

	let mut build = NinjaBuild::new("compile_c_object".to_owned(), Vec::new(), vec!["a.o".to_owned()]);
	build.keyval_set.insert(
		"INCLUDES".to_owned(),
		vec!["-I/src/my proj/include".to_owned(), "-I/src/it's".to_owned(), "-I/src/$HOME".to_owned()],
	);
	build.keyval_set.insert("LINK_FLAGS".to_owned(), vec!["-Wl,-soname,libfoo.so.1".to_owned()]);
	assert_eq!(
		build.as_string(),
		"build a.o: compile_c_object\n  INCLUDES = '-I/src/my proj/include' '-I/src/it'\\''s' '-I/src/$$HOME'\n  LINK_FLAGS = -Wl,-soname,libfoo.so.1\n\n"
	);
}

#[test]
fn test_shell_quote() {
	assert_eq!(shell_quote("-I/src/proj/include"), "-I/src/proj/include");
	assert_eq!(shell_quote("a b"), "'a b'");
	assert_eq!(shell_quote(""), "''");
}

#[test]
fn test_target_platform() {
	let platform = TargetPlatform {
		obj_ext: ".obj".to_owned(),
		lib_prefix: String::new(),
		static_lib_ext: ".lib".to_owned(),
		shared_lib_ext: ".dll".to_owned(),
		exe_ext: ".exe".to_owned(),
	};
	let mut ninja = test_ninja().with_target_platform(platform);
	let settings = BuildSettings::default();
	let libs = ninja
		.library(Path::new("lib"), "foo", 0, 1, &[PathBuf::from("src/a.c")], &settings)
		.unwrap();
	assert_eq!(libs, vec![PathBuf::from("/src/proj/lib/foo.lib"), PathBuf::from("/src/proj/lib/foo.dll.0.1")]);
	let exe = ninja
		.program(Path::new("."), "demo", &[PathBuf::from("main.c")], &settings)
		.unwrap();
	assert_eq!(exe, vec![PathBuf::from("/src/proj/demo.exe")]);
	assert!(ninja.as_string().contains("build /src/proj/build/bin/demo/main.c.obj: compile_c_object /src/proj/main.c\n"));
}
