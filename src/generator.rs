mod ninja;

pub use ninja::Ninja;

/// File naming of the platform the generated build description targets.
#[derive(Clone, Debug)]
pub struct TargetPlatform {
	pub obj_ext: String,
	pub lib_prefix: String,
	pub static_lib_ext: String,
	pub shared_lib_ext: String,
	pub exe_ext: String,
}

impl Default for TargetPlatform {
	fn default() -> Self {
		TargetPlatform {
			obj_ext: ".o".to_owned(),
			lib_prefix: "lib".to_owned(),
			static_lib_ext: ".a".to_owned(),
			shared_lib_ext: ".so".to_owned(),
			exe_ext: "".to_owned(),
		}
	}
}
