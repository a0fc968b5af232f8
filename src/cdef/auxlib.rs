//! FFI definitions for `lauxlib.h`.

#![allow(non_snake_case)]

use super::*;

use core::{
	ffi::CStr,
	ptr::null,
};

/// Global table name.
///
/// This cannot be changed for Lua that's already compiled.
pub const GLOBAL_TABLE: &CStr = c"_G";

#[cfg_attr(all(feature = "link-system", not(feature = "vendored"), feature = "link-dynamic", target_os = "windows"), link(name = "lua54", kind = "raw-dylib"))]
#[cfg_attr(all(feature = "link-system", not(feature = "vendored"), feature = "link-dynamic", not(target_os = "windows")), link(name = "lua5.4", kind = "dylib"))]
#[cfg_attr(all(feature = "link-system", not(feature = "vendored"), not(feature = "link-dynamic"), target_os = "windows"), link(name = "lua54", kind = "static"))]
#[cfg_attr(all(feature = "link-system", not(feature = "vendored"), not(feature = "link-dynamic"), not(target_os = "windows")), link(name = "lua5.4", kind = "static"))]
unsafe extern "C-unwind" {
	pub fn luaL_newstate() -> *mut State;

	lua_state_func! {
		pub fn luaL_loadbufferx(
			self,
			buffer: *const c_char, buffer_sz: usize,
			name: *const c_char,
			mode: *const c_char
		) -> c_int;
		pub fn luaL_loadstring(self, code: *const c_char) -> c_int;
	}
}

/// Equivalent to the `luaL_loadbuffer` C macro.
///
/// # Safety
/// `l` must be a valid pointer to a Lua state.
/// `buffer` must be the size of `buffer_sz`,
/// and `name` must be a valid C string.
pub unsafe fn luaL_loadbuffer(
	l: *mut State,
	buffer: *const c_char, buffer_sz: usize,
	name: *const c_char
) -> c_int {
	unsafe { luaL_loadbufferx(l, buffer, buffer_sz, name, null()) }
}
