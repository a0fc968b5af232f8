//! Type-level shape of the Lua stack, and the list algorithms that compute
//! the shape after each operation.
//!
//! A shape is a list of [tags](crate::tag) built from [`Empty`] and
//! [`Push`], with the top of the stack last: `[Number, Table]` is
//! `Push<Push<Empty, Number>, Table>`, and is usually written with
//! [`lua_stack!`](crate::lua_stack).
//!
//! All algorithms here are pure type-level computations.
//! Positions are [offsets](crate::index) from the top of the stack.
//! When an algorithm has no implementation for some input (popping too many
//! values, selecting past the bottom), the operation asking for it doesn't
//! compile.

use core::{
	ffi::c_int,
	marker::PhantomData,
};

use crate::{
	error::StackError,
	index::{
		Minus, Nat, Succ, Zero,
	},
	tag::Tag,
	Thread,
};

mod sealed {
	pub trait Sealed {}
}

/// The empty stack.
#[derive(Debug)]
pub enum Empty {}

/// The stack `Below` with a value tagged `Top` pushed onto it.
#[derive(Debug)]
pub struct Push<Below, Top>(PhantomData<fn() -> (Below, Top)>);

/// Type-level list of tags describing the whole Lua stack.
#[diagnostic::on_unimplemented(
	message = "`{Self}` is not a stack shape",
	note = "shapes are written with `lua_stack![...]`"
)]
pub trait Shape: sealed::Sealed + 'static {
	/// Number of values in the shape.
	type Len: Nat;

	/// [`Shape::Len`] as a constant.
	const LEN: usize = <Self::Len as Nat>::VALUE;

	/// Check that every value on the stack of `thread` matches its tag.
	///
	/// The stack size is checked separately by
	/// [`TypedStack::new`](crate::TypedStack::new).
	fn verify(thread: &Thread) -> Result<(), StackError>;
}

impl sealed::Sealed for Empty {}

impl Shape for Empty {
	type Len = Zero;

	fn verify(_: &Thread) -> Result<(), StackError> {
		Ok(())
	}
}

impl<B: Shape, T: Tag> sealed::Sealed for Push<B, T> {}

impl<B: Shape, T: Tag> Shape for Push<B, T> {
	type Len = Succ<B::Len>;

	fn verify(thread: &Thread) -> Result<(), StackError> {
		B::verify(thread)?;
		T::verify(thread, B::LEN as c_int + 1)
	}
}

/// Remove the top `N` values.
#[diagnostic::on_unimplemented(
	message = "can't pop more values than present on the stack `{Self}`",
	label = "not enough values to pop"
)]
pub trait PopBack<N: Nat>: Shape {
	type Output: Shape;
}

impl<S: Shape> PopBack<Zero> for S {
	type Output = S;
}

impl<B, T: Tag, N: Nat> PopBack<Succ<N>> for Push<B, T>
where
	B: PopBack<N>,
{
	type Output = <B as PopBack<N>>::Output;
}

/// Keep only the top `N` values.
pub trait TakeTop<N: Nat>: Shape {
	type Output: Shape;
}

impl<S: Shape> TakeTop<Zero> for S {
	type Output = Empty;
}

impl<B, T: Tag, N: Nat> TakeTop<Succ<N>> for Push<B, T>
where
	B: TakeTop<N>,
{
	type Output = Push<<B as TakeTop<N>>::Output, T>;
}

/// Remove the bottom `N` values.
#[diagnostic::on_unimplemented(
	message = "can't remove more values than present on the stack `{Self}`"
)]
pub trait PopFront<N: Nat>: Shape {
	type Output: Shape;
}

impl<S: Shape, N: Nat> PopFront<N> for S
where
	<S as Shape>::Len: Minus<N>,
	S: TakeTop<<<S as Shape>::Len as Minus<N>>::Output>,
{
	type Output = <S as TakeTop<<<S as Shape>::Len as Minus<N>>::Output>>::Output;
}

/// Put the values of `Other` on top of `Self`, keeping their order.
pub trait Concat<Other: Shape>: Shape {
	type Output: Shape;
}

impl<S: Shape> Concat<Empty> for S {
	type Output = S;
}

impl<S: Shape, B: Shape, T: Tag> Concat<Push<B, T>> for S
where
	S: Concat<B>,
{
	type Output = Push<<S as Concat<B>>::Output, T>;
}

/// Tag of the value at offset `Off`.
#[diagnostic::on_unimplemented(
	message = "the stack `{Self}` has no value at the selected position",
	label = "index out of range"
)]
pub trait Select<Off: Nat>: Shape {
	type Output: Tag;
}

impl<B: Shape, T: Tag> Select<Zero> for Push<B, T> {
	type Output = T;
}

impl<B, T: Tag, O: Nat> Select<Succ<O>> for Push<B, T>
where
	B: Select<O>,
{
	type Output = <B as Select<O>>::Output;
}

/// Replace the tag at offset `Off` with `New`.
#[diagnostic::on_unimplemented(
	message = "the stack `{Self}` has no value at the selected position",
	label = "index out of range"
)]
pub trait ReplaceAt<Off: Nat, New: Tag>: Shape {
	type Output: Shape;
}

impl<B: Shape, T: Tag, New: Tag> ReplaceAt<Zero, New> for Push<B, T> {
	type Output = Push<B, New>;
}

impl<B, T: Tag, O: Nat, New: Tag> ReplaceAt<Succ<O>, New> for Push<B, T>
where
	B: ReplaceAt<O, New>,
{
	type Output = Push<<B as ReplaceAt<O, New>>::Output, T>;
}

/// Insert `New` so that it ends up at offset `Off`.
///
/// `Off` may be equal to the length, which inserts at the bottom.
pub trait InsertAt<Off: Nat, New: Tag>: Shape {
	type Output: Shape;
}

impl<S: Shape, New: Tag> InsertAt<Zero, New> for S {
	type Output = Push<S, New>;
}

impl<B, T: Tag, O: Nat, New: Tag> InsertAt<Succ<O>, New> for Push<B, T>
where
	B: InsertAt<O, New>,
{
	type Output = Push<<B as InsertAt<O, New>>::Output, T>;
}

/// Remove the value at offset `Off`, shifting down the values above it.
#[diagnostic::on_unimplemented(
	message = "the stack `{Self}` has no value at the selected position",
	label = "index out of range"
)]
pub trait RemoveAt<Off: Nat>: Shape {
	type Output: Shape;
}

impl<B: Shape, T: Tag> RemoveAt<Zero> for Push<B, T> {
	type Output = B;
}

impl<B, T: Tag, O: Nat> RemoveAt<Succ<O>> for Push<B, T>
where
	B: RemoveAt<O>,
{
	type Output = Push<<B as RemoveAt<O>>::Output, T>;
}

/// Rotate the values between offset `Off` and the top `N` positions in the
/// direction of the top, like `lua_rotate` does for a non-negative `n`.
///
/// Each step moves the top value down to offset `Off`.
pub trait Rotate<Off: Nat, N: Nat>: Shape {
	type Output: Shape;
}

impl<S: Shape, Off: Nat> Rotate<Off, Zero> for S {
	type Output = S;
}

impl<B, T: Tag, Off: Nat, N: Nat> Rotate<Off, Succ<N>> for Push<B, T>
where
	B: InsertAt<Off, T>,
	<B as InsertAt<Off, T>>::Output: Rotate<Off, N>,
{
	type Output = <<B as InsertAt<Off, T>>::Output as Rotate<Off, N>>::Output;
}

/// Push `N` values tagged `T`.
pub trait AppendTimes<T: Tag, N: Nat>: Shape {
	type Output: Shape;
}

impl<S: Shape, T: Tag> AppendTimes<T, Zero> for S {
	type Output = S;
}

impl<S: Shape, T: Tag, N: Nat> AppendTimes<T, Succ<N>> for S
where
	Push<S, T>: AppendTimes<T, N>,
{
	type Output = <Push<S, T> as AppendTimes<T, N>>::Output;
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::index::*;
	use crate::lua_stack;
	use crate::tag::*;
	use core::any::TypeId;

	fn same<A: 'static, B: 'static>() -> bool {
		TypeId::of::<A>() == TypeId::of::<B>()
	}

	type Four = lua_stack![Number, Nil, Function, Table];

	#[test]
	fn length() {
		assert_eq!(<lua_stack![]>::LEN, 0);
		assert_eq!(Four::LEN, 4);
	}

	#[test]
	fn pop_back() {
		assert!(same::<<Four as PopBack<U0>>::Output, Four>());
		assert!(same::<<Four as PopBack<U1>>::Output, lua_stack![Number, Nil, Function]>());
		assert!(same::<<Four as PopBack<U4>>::Output, lua_stack![]>());
	}

	#[test]
	fn pop_front() {
		assert!(same::<<Four as PopFront<U1>>::Output, lua_stack![Nil, Function, Table]>());
		assert!(same::<<Four as PopFront<U3>>::Output, lua_stack![Table]>());
		assert!(same::<<Four as PopFront<U4>>::Output, lua_stack![]>());
	}

	#[test]
	fn concat() {
		type Head = lua_stack![Number, Nil];
		type Tail = lua_stack![Function, Table];
		assert!(same::<<Head as Concat<Tail>>::Output, Four>());
		assert!(same::<<Four as Concat<lua_stack![]>>::Output, Four>());
		assert!(same::<<lua_stack![] as Concat<Four>>::Output, Four>());
	}

	#[test]
	fn select() {
		assert!(same::<<Four as Select<U0>>::Output, Table>());
		assert!(same::<<Four as Select<U3>>::Output, Number>());
	}

	#[test]
	fn replace_at() {
		assert!(same::<
			<Four as ReplaceAt<U0, Unknown>>::Output,
			lua_stack![Number, Nil, Function, Unknown]
		>());
		assert!(same::<
			<Four as ReplaceAt<U2, Table>>::Output,
			lua_stack![Number, Table, Function, Table]
		>());
	}

	#[test]
	fn insert_and_remove() {
		assert!(same::<
			<Four as InsertAt<U4, Unknown>>::Output,
			lua_stack![Unknown, Number, Nil, Function, Table]
		>());
		assert!(same::<
			<Four as InsertAt<U1, Unknown>>::Output,
			lua_stack![Number, Nil, Function, Unknown, Table]
		>());
		assert!(same::<<Four as RemoveAt<U0>>::Output, lua_stack![Number, Nil, Function]>());
		assert!(same::<<Four as RemoveAt<U2>>::Output, lua_stack![Number, Function, Table]>());
	}

	#[test]
	fn rotate() {
		assert!(same::<<Four as Rotate<U3, U0>>::Output, Four>());
		assert!(same::<
			<Four as Rotate<U1, U1>>::Output,
			lua_stack![Number, Nil, Table, Function]
		>());
		assert!(same::<
			<Four as Rotate<U3, U1>>::Output,
			lua_stack![Table, Number, Nil, Function]
		>());
		assert!(same::<
			<Four as Rotate<U3, U2>>::Output,
			lua_stack![Function, Table, Number, Nil]
		>());
		// A full turn brings the segment back.
		assert!(same::<<Four as Rotate<U2, U3>>::Output, Four>());
	}

	#[test]
	fn append_times() {
		assert!(same::<<lua_stack![Function] as AppendTimes<Unknown, U0>>::Output, lua_stack![Function]>());
		assert!(same::<
			<lua_stack![Function] as AppendTimes<Unknown, U3>>::Output,
			lua_stack![Function, Unknown, Unknown, Unknown]
		>());
	}
}
