use std::{
	collections::BTreeMap, //
	env,
	fs,
	path::{Path, PathBuf},
	process::ExitCode,
};

use clap::{Arg, ArgAction, Command};

use layout::{
	generator::Ninja, //
	toolchain::read_toolchain,
	LIBDIR_ARG,
};

const SOURCE_DIR: &str = "source-dir";
const BUILD_DIR: &str = "build-dir";
const TOOLCHAIN: &str = "toolchain";
const ARGUMENTS: &str = "arguments";

fn command() -> Command {
	Command::new("layout")
		.about("Describes a C/C++ library and its samples as a build.ninja file")
		.arg(
			Arg::new(SOURCE_DIR)
				.short('S')
				.long(SOURCE_DIR)
				.value_name("path-to-source")
				.required(true)
				.help("Specify the source directory"),
		)
		.arg(
			Arg::new(BUILD_DIR)
				.short('B')
				.long(BUILD_DIR)
				.value_name("path-to-build")
				.required(true)
				.help("Specify the build directory"),
		)
		.arg(
			Arg::new(TOOLCHAIN)
				.short('T')
				.long(TOOLCHAIN)
				.value_name("path-to-toolchain-file")
				.help("Use the commands of a toolchain file instead of the manifest's"),
		)
		.arg(
			Arg::new(ARGUMENTS)
				.value_name("KEY=VALUE")
				.num_args(0..)
				.action(ArgAction::Append)
				.help("Override an [environment] entry of the manifest, e.g. prefix=/usr"),
		)
}

fn main() -> ExitCode {
	env_logger::Builder::from_env(env_logger::Env::default().filter_or("LAYOUT_LOG", "off"))
		.format_timestamp(None)
		.init();

	let matches = command().get_matches();
	let src_dir = matches.get_one::<String>(SOURCE_DIR).cloned().unwrap_or_default();
	let build_dir = matches.get_one::<String>(BUILD_DIR).cloned().unwrap_or_default();

	let mut overrides = BTreeMap::new();
	for arg in matches.get_many::<String>(ARGUMENTS).unwrap_or_default() {
		match layout::parse_argument(arg) {
			Ok((key, value)) => {
				overrides.insert(key, value);
			}
			Err(e) => {
				println!("Error: {}", e);
				return ExitCode::FAILURE;
			}
		}
	}

	println!("source-dir: {}", src_dir);
	println!(" build-dir: {}", build_dir);

	let original_dir = match env::current_dir() {
		Ok(x) => x,
		Err(e) => {
			println!("Error getting cwd: {}", e);
			return ExitCode::FAILURE;
		}
	};

	// Check source dir exists before erroring on anything else
	let src_dir = match fs::canonicalize(original_dir.join(&src_dir)) {
		Ok(x) => x,
		Err(e) => {
			println!("Error finding source directory: {} (path: {})", e, src_dir);
			return ExitCode::FAILURE;
		}
	};

	// Check build dir can be created before erroring on anything else
	let build_dir_path = original_dir.join(build_dir);
	if let Err(e) = fs::create_dir_all(&build_dir_path) {
		println!("Error creating directory: {} (path: {})", e, build_dir_path.display());
		return ExitCode::FAILURE;
	}
	let build_dir_path = match fs::canonicalize(&build_dir_path) {
		Ok(x) => x,
		Err(e) => {
			println!("Error finding build directory: {} (path: {})", e, build_dir_path.display());
			return ExitCode::FAILURE;
		}
	};

	match run(&src_dir, &build_dir_path, matches.get_one::<String>(TOOLCHAIN), &overrides) {
		Ok(build_ninja) => {
			println!("wrote {}", build_ninja.display());
			ExitCode::SUCCESS
		}
		Err(e) => {
			println!("{}", e);
			ExitCode::FAILURE
		}
	}
}

fn run(
	src_dir: &Path,
	build_dir: &Path,
	toolchain_path: Option<&String>,
	overrides: &BTreeMap<String, String>,
) -> Result<PathBuf, anyhow::Error> {
	let manifest = layout::read_manifest(src_dir)?;

	let toolchain = match toolchain_path {
		Some(x) => read_toolchain(Path::new(x)),
		None => manifest.toolchain(),
	};
	let toolchain = match toolchain {
		Ok(x) => x,
		Err(e) => return Err(anyhow::Error::msg(e)),
	};

	let arguments = manifest.arguments(overrides);
	let libdir = PathBuf::from(arguments.get(LIBDIR_ARG).map_or(layout::DEFAULT_LIBDIR, String::as_str));

	let (library, samples) = layout::load_projects(&manifest, src_dir)?;
	let mut ninja = Ninja::new(src_dir, build_dir, &libdir, arguments, toolchain);
	let targets = layout::configure(&library, &samples, &mut ninja)?;
	log::info!("{} target(s) for {} and {} sample(s)", targets.len(), library.name(), samples.len());

	ninja.write()
}

#[test]
fn test_command() {
	command().debug_assert();

	let matches = command()
		.try_get_matches_from(["layout", "-S", "src", "-B", "build", "prefix=/usr", "libdir=lib64"])
		.unwrap();
	assert_eq!(matches.get_one::<String>(SOURCE_DIR).unwrap(), "src");
	let args = matches.get_many::<String>(ARGUMENTS).unwrap().collect::<Vec<_>>();
	assert_eq!(args, vec!["prefix=/usr", "libdir=lib64"]);

	assert!(command().try_get_matches_from(["layout", "-S", "src"]).is_err());
}
