use core::{
	ffi::{
		CStr, c_int,
	},
	ops::{
		Deref, DerefMut,
	},
};

use crate::{
	cdef::*,
	Thread,
};

#[cfg(feature = "auxlib")]
use crate::cdef::auxlib::*;

/// Panic function that's similar to the panic function defined in `lauxlib.h`.
///
/// Without it, an error raised outside of a protected call (for example, by
/// [`TypedStack::call`](crate::TypedStack::call)) would abort the process.
///
/// # Safety
/// `l` must be a valid pointer to a Lua state.
pub unsafe extern "C-unwind" fn lua_panic_handler(l: *mut State) -> c_int {
	let msg_ptr = unsafe { lua_tolstring(l, -1, core::ptr::null_mut()) };
	let msg = if !msg_ptr.is_null() {
		let msg = unsafe { CStr::from_ptr(msg_ptr) };
		msg.to_str().unwrap_or("error object does not contain valid UTF-8")
	} else {
		"error object is not a string"
	};
	tracing::error!(error = msg, "unprotected error in call to Lua API");
	panic!("unprotected error in call to Lua API ({msg})")
}

/// Data structure that represents a main Lua thread.
///
/// This data structure owns the Lua state and has a [`Drop`] implementation
/// that automatically closes (frees) it.
/// [`TypedStack`](crate::TypedStack) handles made from it only borrow the
/// state.
///
/// # Thread safety
/// [`Lua`] isn't [`Send`] nor [`Sync`] because of [`Thread`], which doesn't
/// implement any of those traits either.
#[derive(Debug)]
#[repr(transparent)]
pub struct Lua {
	thread: &'static mut Thread,
}

impl Drop for Lua {
	fn drop(&mut self) {
		unsafe { lua_close(self.thread.as_ptr()) }
	}
}

impl AsRef<Thread> for Lua {
	fn as_ref(&self) -> &Thread {
		self.thread
	}
}

impl AsMut<Thread> for Lua {
	fn as_mut(&mut self) -> &mut Thread {
		self.thread
	}
}

impl Deref for Lua {
	type Target = Thread;

	fn deref(&self) -> &Self::Target {
		self.thread
	}
}

impl DerefMut for Lua {
	fn deref_mut(&mut self) -> &mut Self::Target {
		self.thread
	}
}

impl Lua {
	/// Construct a new [`Lua`] using an already-allocated Lua state.
	///
	/// # Safety
	/// `l` must be a valid pointer to a Lua state.
	///
	/// With this function, the [`Lua`] takes ownership of the Lua state.
	/// You may not, for example, pass a coroutine pointer to this, as the
	/// coroutine will not be owned by Rust code.
	pub unsafe fn from_ptr(l: *mut State) -> Self {
		let thread = unsafe { Thread::from_ptr_mut(l) };
		Self {
			thread
		}
	}

	unsafe fn from_new_ptr(l: *mut State) -> Option<Self> {
		if !l.is_null() {
			let lua = Self {
				thread: unsafe { Thread::from_ptr_mut(l) }
			};
			lua.at_panic(Some(lua_panic_handler));
			Some(lua)
		} else {
			None
		}
	}

	/// Construct a new [`Lua`] using the `lauxlib` function [`luaL_newstate`].
	///
	/// Unlike [`Lua::try_new`], this function never fails.
	#[cfg(feature = "auxlib")]
	pub fn new() -> Self {
		match Self::try_new() {
			Some(lua) => lua,
			_ => panic!("not enough memory to create Lua state using the `lauxlib.h` allocator"),
		}
	}

	/// Construct a new [`Lua`] using the `lauxlib` function [`luaL_newstate`].
	///
	/// The function will return `None` if allocation failed.
	#[cfg(feature = "auxlib")]
	pub fn try_new() -> Option<Self> {
		unsafe { Self::from_new_ptr(luaL_newstate()) }
	}

	/// Return the raw pointer to the underlying Lua state.
	pub fn as_ptr(&self) -> *mut State {
		self.thread.as_ptr()
	}
}

#[cfg(feature = "auxlib")]
impl Default for Lua {
	fn default() -> Self {
		Self::new()
	}
}
