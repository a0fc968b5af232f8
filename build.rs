fn main() {
	println!("cargo:rerun-if-changed=build.rs");

	#[cfg(all(feature = "vendored", feature = "link-system"))]
	println!("cargo:warning=both `vendored` and `link-system` are enabled; using the vendored Lua");

	#[cfg(feature = "vendored")]
	{
		let artifacts = lua_src::Build::new().build(lua_src::Lua54);
		artifacts.print_cargo_metadata();
	}
}
