//! # lua-cts
//! `#![no_std]` bindings to Lua 5.4 that track the shape of the Lua stack at
//! compile time.
//!
//! [`TypedStack`] carries, in its type, the tags of every value on the Lua
//! stack. Each operation consumes the handle and returns one typed with the
//! shape after the operation, so popping too many values, using a value as the
//! wrong type, or calling something that isn't a function fails to compile.
//! What can only be known at runtime (the stack size when a shape is first
//! asserted, and the type of a value tagged [`Unknown`](tag::Unknown)) is
//! checked when it happens and reported as a [`StackError`].
//!
//! ```
//! use lua_cts::prelude::*;
//!
//! unsafe extern "C-unwind" fn l_add(l: *mut LuaState) -> core::ffi::c_int {
//! 	let Ok(stack) = (unsafe { TypedStack::<lua_stack![Number, Number]>::from_ptr(l) }) else {
//! 		return 0
//! 	};
//! 	let (mut a, mut b) = (0, 0);
//! 	let sum = stack.to_integer::<1>(|v| a = v)
//! 		.and_then(|stack| stack.to_integer::<2>(|v| b = v))
//! 		.map(|stack| stack.push_integer(a + b));
//! 	if sum.is_ok() { 1 } else { 0 }
//! }
//!
//! let mut lua = Lua::new();
//! let mut result = 0;
//! let _stack = lua.stack::<lua_stack![]>()?
//! 	.push_c_function(l_add)
//! 	.push_integer(2)
//! 	.push_integer(40)
//! 	.call::<2, 1>()?
//! 	.to_integer::<-1>(|v| result = v)?;
//! assert_eq!(result, 42);
//! # Ok::<(), StackError>(())
//! ```
//!
//! The untyped layer, [`Thread`] and [`cdef`], follows the C API closely.

#![cfg_attr(not(test), no_std)]

pub mod cdef;
pub mod error;
pub mod index;
pub mod prelude;
pub mod shape;
pub mod stack;
pub mod tag;

mod macros;
mod state;
mod thread;

pub use error::StackError;
pub use stack::{
	Raised, TypedStack,
};
pub use state::*;
pub use thread::*;
