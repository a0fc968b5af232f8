//! Definitions for FFI.
//!
//! Only the part of `lua.h` that the typed stack and [`Thread`](crate::Thread)
//! call through to is declared here, although there *may be* re-exports:
//! - If the `auxlib` feature is enabled, then there will be definitions from `lauxlib.h`.
//! - If the `stdlibs` feature is enabled, then there will be definitions from `lualib.h`.
//!
//! # Linking
//! With the `vendored` feature, `build.rs` compiles Lua 5.4 from source and
//! links it statically.
//! With `link-system` (and without `vendored`), the extern blocks carry link
//! attributes for an installed `lua5.4` (`lua54` on Windows).
//!
//! # Safety
//! Functions that raise an error *will not run any Rust drop glue upon doing so*.
//! [`TypedStack`](crate::TypedStack) holds no resources that need dropping,
//! which is what makes it usable inside of C functions.

use core::{
	ffi::{
		c_char, c_int,
	},
	fmt,
	ptr::null_mut,
};

#[cfg(feature = "auxlib")]
pub mod auxlib;

#[cfg(feature = "stdlibs")]
pub mod stdlibs;

/// Lua version number.
pub const VERSION_NUM: Number = 504 as _;

/// Option for multiple returns in `lua_pcall` and `lua_call`.
pub const MULT_RET: c_int = -1;

/// Number of stack slots that Lua guarantees to be free when a C function is
/// called, or when the host starts using a state.
/// Also known as `LUA_MINSTACK`.
pub const MIN_STACK: c_int = 20;

mod dependent {
	#[cfg(feature = "use-32-bits")]
	mod on_32_bits {
		use core::ffi::{
			c_float,
			c_int,
			c_long,
		};

		// Use `c_int` if big enough.
		#[cfg(any(target_pointer_width = "32", target_pointer_width = "64"))]
		pub type Integer = c_int;

		// Otherwise, use `c_long`.
		#[cfg(not(any(target_pointer_width = "32", target_pointer_width = "64")))]
		pub type Integer = c_long;

		pub type Number = c_float;
	}

	#[cfg(not(feature = "use-32-bits"))]
	mod on_32_bits {
		use core::ffi::{
			c_double,
			c_longlong,
		};

		pub type Integer = c_longlong;
		pub type Number = c_double;
	}

	pub use on_32_bits::{
		Integer,
		Number,
	};
}

/// Type of signed Lua integers.
/// Also known as `lua_Integer`.
///
/// The actual definition for this type depends on the `use-32-bits` feature.
/// If that feature is enabled, then
/// - if `c_int` is big enough, then this is `c_int`,
/// - otherwise, this is `c_long`.
///
/// If the feature is not enabled, then this is `c_longlong`.
pub use dependent::Integer;

/// Type of Lua numbers.
/// Also known as `lua_Number`.
///
/// The actual definition for this type depends on the `use-32-bits` feature.
/// If that feature is enabled, then this is `c_float`. Otherwise, it's
/// `c_double`.
pub use dependent::Number;

/// Type of the context used for continuation functions.
/// Also known as `lua_KContext`.
pub type KContext = isize;

macro_rules! c_int_enum {
	(
		$(#[$attr:meta])*
		$vis:vis enum $name:ident {
			$(
				$(#[$variant_attr:meta])*
				$variant:ident = $def:expr,
			)*
		}
	) => {
		$(#[$attr])*
		$vis enum $name {
			$(
				$(#[$variant_attr])*
				$variant = $def as c_int as _
			),*
		}

		impl $name {
			/// Construct an instance of this enum from a [`c_int`], but without
			/// checking if that value is valid.
			///
			/// # Safety
			/// It is undefined behavior to use a value that doesn't correspond
			/// to a valid variant.
			pub const unsafe fn from_c_int_unchecked(value: c_int) -> Self {
				match value {
					$($def => Self::$variant,)*
					_ => unsafe { ::core::hint::unreachable_unchecked() }
				}
			}
		}

		impl From<$name> for c_int {
			fn from(value: $name) -> c_int {
				value as c_int
			}
		}

		impl TryFrom<c_int> for $name {
			type Error = ();
			fn try_from(value: c_int) -> Result<Self, Self::Error> {
				match value {
					$(
						$def => Ok(Self::$variant),
					)*
					_ => Err(())
				}
			}
		}
	};
}

c_int_enum! {
	/// Lua status code enumeration.
	///
	/// This status indicates a success or some sort of failure in the form of a
	/// caught raised error.
	#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
	pub enum Status {
		/// No errors.
		/// Also known as `LUA_OK`.
		Ok = 0,
		/// Yielded.
		/// Also known as `LUA_YIELD`.
		Yielded = 1,
		/// Encountered a runtime error.
		/// Also known as `LUA_ERRRUN`.
		RuntimeError = 2,
		/// Encountered a syntax error.
		/// Also known as `LUA_ERRSYNTAX`.
		SyntaxError = 3,
		/// Encountered a memory-related error.
		/// Also known as `LUA_ERRMEM`.
		MemoryError = 4,
		/// Encountered some error while handling an error.
		/// Also known as `LUA_ERRERR`.
		HandlerError = 5,
		/// Encountered a file-related error.
		/// Also known as `LUA_ERRFILE`.
		FileError = 6,
	}
}

impl Status {
	/// Return true if the status represents no error.
	///
	/// # Examples
	/// ```
	/// use lua_cts::cdef::Status;
	/// assert!(Status::Ok.is_ok());
	/// assert!(Status::Yielded.is_ok());
	/// assert!(!Status::MemoryError.is_ok());
	/// ```
	pub const fn is_ok(self) -> bool {
		matches!(self, Self::Ok | Self::Yielded)
	}

	/// Map this status into a [`Result`], producing `err` for an error status.
	pub fn or<E>(self, err: E) -> Result<(), E> {
		if self.is_ok() {
			Ok(())
		} else {
			Err(err)
		}
	}
}

c_int_enum! {
	/// Lua basic type enumeration.
	#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
	pub enum Type {
		/// "Pseudo-type" that indicates that there's *nothing* somewhere.
		None = -1,
		/// `nil`.
		Nil = 0,
		/// Boolean - `true` and `false`.
		Boolean = 1,
		/// Light userdata - plain pointer.
		LightUserdata = 2,
		/// Number, which can also mean "integer".
		Number = 3,
		/// Garbage-collected string.
		String = 4,
		/// Table.
		Table = 5,
		/// Function, which can mean a Lua function or a C function.
		Function = 6,
		/// Full userdata - garbage-collected pointer.
		Userdata = 7,
		/// Thread - a Lua state, or coroutine.
		Thread = 8,
	}
}

impl Type {
	/// Return the name that `lua_typename` gives to this type.
	///
	/// # Examples
	/// ```
	/// use lua_cts::cdef::Type;
	/// assert_eq!(Type::LightUserdata.name(), "userdata");
	/// assert_eq!(Type::None.name(), "no value");
	/// ```
	pub const fn name(self) -> &'static str {
		match self {
			Self::None => "no value",
			Self::Nil => "nil",
			Self::Boolean => "boolean",
			Self::LightUserdata | Self::Userdata => "userdata",
			Self::Number => "number",
			Self::String => "string",
			Self::Table => "table",
			Self::Function => "function",
			Self::Thread => "thread",
		}
	}
}

impl fmt::Display for Type {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.name())
	}
}

/// Opaque type that represents a Lua state.
/// Also known as `lua_State`.
///
/// This type is *always* used behind a pointer, and does not store any
/// information - it's always a ZST.
#[repr(C)]
#[derive(Debug)]
pub struct State {
	_data: [u8; 0],
	_marker: core::marker::PhantomData<(*mut u8, core::marker::PhantomPinned)>
}

/// C function registered with Lua.
/// Also known as `lua_CFunction`.
///
/// C functions accept a pointer to a Lua state that they can manipulate.
/// If a C function pushes some values onto the Lua stack that it wishes to
/// return, then it must return the number of values it wants to return.
///
/// # Safety
/// When a C function is called from Lua, `l` always points to a valid Lua state.
pub type CFunction = unsafe extern "C-unwind" fn(l: *mut State) -> c_int;

/// Continuation function.
/// Also known as `lua_KFunction`.
pub type KFunction = unsafe extern "C-unwind" fn (
	l: *mut State, status: c_int, ctx: KContext
) -> c_int;

macro_rules! lua_state_func {
	(
		$(
			$(#[$attr:meta])*
			$vis:vis fn $name:ident(self $($param:tt)*) $( -> $ret:ty )?;
		)*
	) => {
		$(
			$(#[$attr])*
			$vis fn $name(l: *mut $crate::cdef::State $($param)*) $( -> $ret )?;
		)*
	};
}
pub(crate) use lua_state_func;

#[cfg_attr(all(feature = "link-system", not(feature = "vendored"), feature = "link-dynamic", target_os = "windows"), link(name = "lua54", kind = "raw-dylib"))]
#[cfg_attr(all(feature = "link-system", not(feature = "vendored"), feature = "link-dynamic", not(target_os = "windows")), link(name = "lua5.4", kind = "dylib"))]
#[cfg_attr(all(feature = "link-system", not(feature = "vendored"), not(feature = "link-dynamic"), target_os = "windows"), link(name = "lua54", kind = "static"))]
#[cfg_attr(all(feature = "link-system", not(feature = "vendored"), not(feature = "link-dynamic"), not(target_os = "windows")), link(name = "lua5.4", kind = "static"))]
unsafe extern "C-unwind" {
	pub fn lua_close(l: *mut State);

	lua_state_func! {
		pub fn lua_atpanic(
			self, panicf: Option<CFunction>
		) -> Option<CFunction>;

		pub fn lua_version(self) -> Number;

		pub fn lua_gettop(self) -> c_int;
		pub fn lua_settop(self, idx: c_int);
		pub fn lua_pushvalue(self, idx: c_int);
		pub fn lua_rotate(self, idx: c_int, n: c_int);
		pub fn lua_copy(self, from_idx: c_int, to_idx: c_int);
		pub fn lua_checkstack(self, n: c_int) -> c_int;

		pub fn lua_type(self, idx: c_int) -> c_int;
		pub fn lua_typename(self, type_tag: c_int) -> *const c_char;

		pub fn lua_tonumberx(self, idx: c_int, is_num: *mut c_int) -> Number;
		pub fn lua_tointegerx(self, idx: c_int, is_num: *mut c_int) -> Integer;
		pub fn lua_tolstring(
			self, idx: c_int, len: *mut usize
		) -> *const c_char;
		pub fn lua_tocfunction(self, idx: c_int) -> Option<CFunction>;

		pub fn lua_pushnil(self);
		pub fn lua_pushnumber(self, n: Number);
		pub fn lua_pushinteger(self, n: Integer);
		pub fn lua_pushlstring(
			self, s: *const c_char, len: usize
		) -> *const c_char;
		pub fn lua_pushcclosure(self, func: CFunction, n: c_int);

		pub fn lua_getglobal(self, name: *const c_char) -> c_int;
		pub fn lua_getfield(self, idx: c_int, k: *const c_char) -> c_int;

		pub fn lua_createtable(self, n_arr: c_int, n_rec: c_int);

		pub fn lua_setglobal(self, name: *const c_char);
		pub fn lua_setfield(self, idx: c_int, k: *const c_char);

		pub fn lua_callk(
			self,
			n_args: c_int, n_results: c_int,
			ctx: KContext, k: Option<KFunction>
		);
		pub fn lua_pcallk(
			self,
			n_args: c_int, n_results: c_int,
			err_func: c_int,
			ctx: KContext, k: Option<KFunction>
		) -> c_int;

		/// # Note
		/// The return type should be [`c_int`] judging from the C header,
		/// however the documentation states that this function *never* returns.
		pub fn lua_error(self) -> !;
	}
}

/// Equivalent to the `lua_call` C macro.
///
/// # Safety
/// `l` must be a valid pointer to a Lua state.
pub unsafe fn lua_call(l: *mut State, n_args: c_int, n_results: c_int) {
	unsafe { lua_callk(l, n_args, n_results, 0, None) }
}

/// Equivalent to the `lua_pcall` C macro.
///
/// # Safety
/// `l` must be a valid pointer to a Lua state.
pub unsafe fn lua_pcall(
	l: *mut State,
	n_args: c_int, n_results: c_int,
	err_func: c_int
) -> c_int {
	unsafe { lua_pcallk(l, n_args, n_results, err_func, 0, None) }
}

/// Equivalent to the `lua_tonumber` C macro.
///
/// # Safety
/// `l` must be a valid pointer to a Lua state.
pub unsafe fn lua_tonumber(l: *mut State, idx: c_int) -> Number {
	unsafe { lua_tonumberx(l, idx, null_mut()) }
}

/// Equivalent to the `lua_tointeger` C macro.
///
/// # Safety
/// `l` must be a valid pointer to a Lua state.
pub unsafe fn lua_tointeger(l: *mut State, idx: c_int) -> Integer {
	unsafe { lua_tointegerx(l, idx, null_mut()) }
}

/// Equivalent to the `lua_pop` C macro.
///
/// # Safety
/// `l` must be a valid pointer to a Lua state.
pub unsafe fn lua_pop(l: *mut State, n: c_int) {
	unsafe { lua_settop(l, -n - 1) }
}

/// Equivalent to the `lua_newtable` C macro.
///
/// # Safety
/// `l` must be a valid pointer to a Lua state.
pub unsafe fn lua_newtable(l: *mut State) {
	unsafe { lua_createtable(l, 0, 0) }
}

/// Equivalent to the `lua_pushcfunction` C macro.
///
/// # Safety
/// `l` must be a valid pointer to a Lua state.
pub unsafe fn lua_pushcfunction(l: *mut State, func: CFunction) {
	unsafe { lua_pushcclosure(l, func, 0) }
}

/// Equivalent to the `lua_insert` C macro.
///
/// # Safety
/// `l` must be a valid pointer to a Lua state.
pub unsafe fn lua_insert(l: *mut State, idx: c_int) {
	unsafe { lua_rotate(l, idx, 1) }
}

/// Equivalent to the `lua_remove` C macro.
///
/// # Safety
/// `l` must be a valid pointer to a Lua state.
pub unsafe fn lua_remove(l: *mut State, idx: c_int) {
	unsafe {
		lua_rotate(l, idx, -1);
		lua_pop(l, 1)
	}
}

/// Equivalent to the `lua_replace` C macro.
///
/// # Safety
/// `l` must be a valid pointer to a Lua state.
pub unsafe fn lua_replace(l: *mut State, idx: c_int) {
	unsafe {
		lua_copy(l, -1, idx);
		lua_pop(l, 1)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn type_round_trips_through_c_int() {
		for raw in -1..=8 {
			let ty = Type::try_from(raw).unwrap();
			assert_eq!(c_int::from(ty), raw);
		}
		assert!(Type::try_from(9).is_err());
	}

	#[test]
	fn status_or_maps_errors() {
		assert_eq!(Status::Ok.or("boom"), Ok(()));
		assert_eq!(Status::RuntimeError.or("boom"), Err("boom"));
	}
}
