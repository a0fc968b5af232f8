//! Errors raised when the Lua stack does not have the asserted shape.

use core::ffi::c_int;
use thiserror::Error;

use crate::cdef::Type;

/// Error produced by runtime checks on the Lua stack.
///
/// These are the mismatches that the type system can't see: the size of the
/// stack when a shape is first asserted, and the actual type of a value whose
/// tag is [`Unknown`](crate::tag::Unknown).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum StackError {
	#[error("expected stack size is {expected} (got {got})")]
	SizeMismatch {
		expected: usize,
		got: c_int,
	},

	#[error("stack value #{index} should have been of type {expected} (got {got})")]
	TypeMismatch {
		/// Absolute index of the offending value.
		index: c_int,
		expected: Type,
		got: Type,
	},
}
