//! Tag types: compile-time markers for the kind of a value on the Lua stack.
//!
//! Tags are uninhabited; they only ever appear as type parameters of a
//! [`Shape`](crate::shape::Shape).

use core::ffi::c_int;

use crate::{
	cdef::Type,
	error::StackError,
	Thread,
};

mod sealed {
	pub trait Sealed {}
}

/// Compile-time marker for a kind of Lua value.
///
/// This trait is sealed; the set of tags is fixed.
pub trait Tag: sealed::Sealed + 'static {
	/// Description used in messages, e.g. `"a number"`.
	const NAME: &'static str;

	/// The Lua type this tag stands for, or `None` for [`Unknown`].
	const TYPE: Option<Type>;

	/// Check that the value at absolute `index` matches this tag.
	///
	/// Known tags compare against the runtime type; [`Unknown`] accepts
	/// anything.
	fn verify(thread: &Thread, index: c_int) -> Result<(), StackError> {
		match Self::TYPE {
			Some(expected) => expect_type(thread, index, expected, Self::NAME),
			None => Ok(()),
		}
	}
}

/// Tag whose Lua type is known at compile time.
#[diagnostic::on_unimplemented(
	message = "the type of `{Self}` is not known at compile time",
	note = "use `TypedStack::cast` to check the value at runtime first"
)]
pub trait KnownTag: Tag {
	const TYPE_OF: Type;
}

/// Tag that may stand for a value of kind `Expected`: either `Expected`
/// itself, or [`Unknown`], in which case the check happens at runtime.
#[diagnostic::on_unimplemented(
	message = "the selected element is `{Self}`, which is not `{Expected}`",
	label = "expected `{Expected}` (or `Unknown`) here"
)]
pub trait Conforms<Expected: KnownTag>: Tag {
	/// Check the value at `index` (a raw Lua index, relative or absolute).
	fn conform(thread: &Thread, index: c_int) -> Result<(), StackError>;
}

/// A Lua number, float or integer.
#[derive(Debug)]
pub enum Number {}

/// `nil`.
#[derive(Debug)]
pub enum Nil {}

/// A Lua or C function.
#[derive(Debug)]
pub enum Function {}

/// A table.
#[derive(Debug)]
pub enum Table {}

/// A value whose type hasn't been verified.
///
/// Operations that need a particular type accept `Unknown` in its place and
/// check the value when they run.
#[derive(Debug)]
pub enum Unknown {}

macro_rules! known_tags {
	($($tag:ident => $ty:expr, $name:literal;)*) => {
		$(
			impl sealed::Sealed for $tag {}

			impl Tag for $tag {
				const NAME: &'static str = $name;
				const TYPE: Option<Type> = Some($ty);
			}

			impl KnownTag for $tag {
				const TYPE_OF: Type = $ty;
			}

			impl Conforms<$tag> for $tag {
				#[inline(always)]
				fn conform(_: &Thread, _: c_int) -> Result<(), StackError> {
					Ok(())
				}
			}

			impl Conforms<$tag> for Unknown {
				fn conform(thread: &Thread, index: c_int) -> Result<(), StackError> {
					expect_type(thread, index, $ty, $name)
				}
			}
		)*
	};
}

known_tags! {
	Number => Type::Number, "a number";
	Nil => Type::Nil, "nil";
	Function => Type::Function, "a function";
	Table => Type::Table, "a table";
}

impl sealed::Sealed for Unknown {}

impl Tag for Unknown {
	const NAME: &'static str = "an unknown type";
	const TYPE: Option<Type> = None;
}

fn expect_type(thread: &Thread, index: c_int, expected: Type, name: &str) -> Result<(), StackError> {
	let got = thread.type_of(index);
	if got == expected {
		Ok(())
	} else {
		let index = absolute(thread, index);
		tracing::debug!(index, %expected, %got, "the selected element is not {name}");
		Err(StackError::TypeMismatch { index, expected, got })
	}
}

fn absolute(thread: &Thread, index: c_int) -> c_int {
	if index > 0 {
		index
	} else {
		thread.top() + index + 1
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn names_match_types() {
		assert_eq!(Number::NAME, "a number");
		assert_eq!(Table::NAME, "a table");
		assert_eq!(<Table as Tag>::TYPE, Some(Type::Table));
		assert_eq!(Function::TYPE_OF, Type::Function);
		assert_eq!(<Unknown as Tag>::TYPE, None);
	}
}
