//! See [`Thread`].

use crate::{
	cdef::*,
	error::StackError,
	shape::Shape,
	stack::TypedStack,
};

#[cfg(feature = "auxlib")]
use crate::cdef::auxlib::*;

use core::{
	ffi::{
		c_int, c_uint, CStr,
	},
	marker::PhantomData,
	slice::from_raw_parts,
};

/// Opaque type that represents a Lua thread, which is used by
/// [`Lua`](crate::Lua) and [`TypedStack`].
///
/// This type can never have an instance made of it; there can only be
/// references to this type, which are the only kind of valid value.
///
/// # Untyped and typed access
/// Methods on [`Thread`] are the untyped layer: they see the stack the way the
/// C API does, as a list of dynamically-typed values.
/// [`Thread::stack`] asserts a shape for the whole stack and hands out a
/// [`TypedStack`], which borrows the thread mutably for as long as it lives.
/// Methods that change the stack take `&mut self`, so the untyped layer
/// can't change the stack behind the handle's back; the handle only lends
/// out a shared [`Thread`] through [`TypedStack::thread`].
///
/// [`Thread`] is neither [`Send`] nor [`Sync`].
#[derive(Debug)]
#[repr(transparent)]
pub struct Thread {
	_no_new: (),
	_not_send: PhantomData<*mut State>,
}

impl Thread {
	/// Construct a reference to [`Thread`] from a raw C pointer to a Lua state.
	///
	/// # Safety
	/// `l` must point to a valid Lua state (`lua_State *` in C), for the
	/// duration specified by `'a`.
	pub unsafe fn from_ptr<'a>(l: *mut State) -> &'a Self {
		unsafe { &*(l as *mut Self) }
	}

	/// Construct a _mutable_ reference to [`Thread`] from a raw C pointer to a
	/// Lua state.
	///
	/// # Safety
	/// `l` must point to a valid Lua state (`lua_State *` in C), for the
	/// duration specified by `'a`.
	///
	/// **You must also, however, abide by Rust's aliasing rules.**
	/// This means that you must guarantee that there
	/// may not be two `&mut Thread`s that point to the same state,
	/// nor a `&Thread` and a `&mut Thread`.
	pub unsafe fn from_ptr_mut<'a>(l: *mut State) -> &'a mut Self {
		unsafe { &mut *(l as *mut Self) }
	}

	/// Return the raw C pointer that represents the underlying Lua state.
	pub fn as_ptr(&self) -> *mut State {
		self as *const Self as *mut State
	}

	/// Assert that the stack currently has the shape `S`, and return a handle
	/// that tracks it from now on.
	///
	/// # Errors
	/// Fails if the stack size differs from `S::LEN`, or if a value whose tag
	/// is known has a different runtime type.
	///
	/// # Examples
	/// ```
	/// use lua_cts::prelude::*;
	///
	/// let mut lua = Lua::new();
	/// let stack = lua.stack::<lua_stack![]>().unwrap();
	/// assert_eq!(stack.len(), 0);
	/// ```
	pub fn stack<S: Shape>(&mut self) -> Result<TypedStack<'_, S>, StackError> {
		TypedStack::new(self)
	}

	/// Set a new panic function and return the old one.
	pub fn at_panic(&self, func: Option<CFunction>) -> Option<CFunction> {
		unsafe { lua_atpanic(self.as_ptr(), func) }
	}

	/// Raise a Lua error, using the value on the top of the stack as the error
	/// object.
	///
	/// This function does a long jump, and therefore never returns.
	pub fn error(&mut self) -> ! {
		unsafe { lua_error(self.as_ptr()) }
	}

	/// Return the version number of the Lua core this thread runs on.
	pub fn version(&self) -> Number {
		unsafe { lua_version(self.as_ptr()) }
	}

	/// Return the index of the top element in the stack.
	///
	/// Because indices start at `1`, this result is equal to the number of
	/// elements in the stack; in particular, `0` means an empty stack.
	pub fn top(&self) -> c_int {
		unsafe { lua_gettop(self.as_ptr()) }
	}

	/// Accept any index, or `0`, and set the stack top to this index.
	///
	/// If the new top is greater than the old one, then the new elements are
	/// filled with `nil`.
	/// If `index` is `0`, then all stack elements are removed.
	pub fn set_top(&mut self, index: c_int) {
		unsafe { lua_settop(self.as_ptr(), index) }
	}

	/// Ensure that the stack has space for at least `n` extra elements.
	///
	/// Returns `false` if it cannot fulfill the request.
	pub fn test_stack(&self, n: c_uint) -> bool {
		(unsafe { lua_checkstack(self.as_ptr(), n as _) }) != 0
	}

	/// Return the type of the value in the given valid index, or [`Type::None`]
	/// for a non-valid but acceptable index.
	pub fn type_of(&self, index: c_int) -> Type {
		unsafe { Type::from_c_int_unchecked(lua_type(self.as_ptr(), index)) }
	}

	/// Return the name of the type encoded by `type_tag`, as Lua sees it.
	pub fn type_name(&self, type_tag: Type) -> &CStr {
		unsafe { CStr::from_ptr(lua_typename(self.as_ptr(), type_tag as _)) }
	}

	/// Push a string with the bytes of `data` onto the stack.
	pub fn push_string(&mut self, data: impl AsRef<[u8]>) {
		let slice = data.as_ref();
		unsafe { lua_pushlstring(self.as_ptr(), slice.as_ptr() as *const _, slice.len()) };
	}

	/// Convert the Lua value at the given index to a slice of bytes.
	///
	/// The value must be a string or a number, otherwise `None` is returned.
	/// A number is converted to a string in place.
	pub fn to_string(&mut self, index: c_int) -> Option<&[u8]> {
		let mut len = 0;
		let str_ptr = unsafe { lua_tolstring(self.as_ptr(), index, &mut len as *mut _) };
		if !str_ptr.is_null() {
			Some(unsafe { from_raw_parts(str_ptr as *const _, len) })
		} else {
			None
		}
	}

	/// Return the bytes of the string at the given index, or `None` if the
	/// value isn't a string.
	///
	/// Unlike [`Thread::to_string`], this never converts the value.
	pub fn peek_string(&self, index: c_int) -> Option<&[u8]> {
		if self.type_of(index) != Type::String {
			return None
		}
		let mut len = 0;
		let str_ptr = unsafe { lua_tolstring(self.as_ptr(), index, &mut len as *mut _) };
		if !str_ptr.is_null() {
			Some(unsafe { from_raw_parts(str_ptr as *const _, len) })
		} else {
			None
		}
	}

	/// Open all standard Lua libraries into this thread.
	#[cfg(feature = "stdlibs")]
	pub fn open_libs(&mut self) {
		unsafe { stdlibs::luaL_openlibs(self.as_ptr()) }
	}
}

#[cfg(feature = "auxlib")]
impl Thread {
	/// Load a buffer as a Lua chunk, pushing the compiled chunk as a function
	/// on top of the stack.
	///
	/// `name` is the chunk name, used for debug information and error messages.
	/// On failure, the error message is pushed instead.
	pub fn load_string(&mut self, buffer: impl AsRef<[u8]>, name: &CStr) -> Status {
		let slice = buffer.as_ref();
		unsafe { Status::from_c_int_unchecked(
			luaL_loadbuffer(
				self.as_ptr(),
				slice.as_ptr() as *const _, slice.len(),
				name.as_ptr()
			)
		) }
	}
}
