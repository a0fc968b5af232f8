//! Type-level naturals, and the mapping from Lua stack indices and counts
//! written as const generics onto them.
//!
//! Lua indices are either negative, counting from the top of the stack (`-1`
//! is the top), or positive, counting from the bottom (`1` is the first value
//! pushed). Both resolve against a [`Shape`] to an *offset*: the distance from
//! the top, `Zero` being the top itself.
//!
//! Stable Rust can't do arithmetic on const generic parameters, so indices in
//! `-16..=-1` and `1..=16`, and counts in `0..=16`, are mapped by hand.

use core::marker::PhantomData;

use crate::shape::Shape;

/// Type-level natural number.
pub trait Nat: 'static {
	const VALUE: usize;
}

/// Type-level `0`.
#[derive(Debug)]
pub enum Zero {}

/// Type-level `N + 1`.
#[derive(Debug)]
pub struct Succ<N>(PhantomData<fn() -> N>);

impl Nat for Zero {
	const VALUE: usize = 0;
}

impl<N: Nat> Nat for Succ<N> {
	const VALUE: usize = N::VALUE + 1;
}

/// Type-level subtraction, which only exists when `Rhs <= Self`.
pub trait Minus<Rhs: Nat>: Nat {
	type Output: Nat;
}

impl<A: Nat> Minus<Zero> for A {
	type Output = A;
}

impl<A: Nat, B: Nat> Minus<Succ<B>> for Succ<A>
where
	A: Minus<B>,
{
	type Output = <A as Minus<B>>::Output;
}

/// Natural number that isn't `Zero`.
#[diagnostic::on_unimplemented(
	message = "the selected element can't be on top of the stack",
	label = "this operation also uses the top of the stack"
)]
pub trait NonZero: Nat {}

impl<N: Nat> NonZero for Succ<N> {}

/// `Self <= Limit`.
#[diagnostic::on_unimplemented(
	message = "can't rotate by more positions than the rotated segment holds",
	label = "the count is larger than the segment between the index and the top"
)]
pub trait AtMost<Limit: Nat>: Nat {}

impl<L: Nat> AtMost<L> for Zero {}

impl<A: Nat, B: Nat> AtMost<Succ<B>> for Succ<A> where A: AtMost<B> {}

pub type U0 = Zero;
pub type U1 = Succ<U0>;
pub type U2 = Succ<U1>;
pub type U3 = Succ<U2>;
pub type U4 = Succ<U3>;
pub type U5 = Succ<U4>;
pub type U6 = Succ<U5>;
pub type U7 = Succ<U6>;
pub type U8 = Succ<U7>;
pub type U9 = Succ<U8>;
pub type U10 = Succ<U9>;
pub type U11 = Succ<U10>;
pub type U12 = Succ<U11>;
pub type U13 = Succ<U12>;
pub type U14 = Succ<U13>;
pub type U15 = Succ<U14>;
pub type U16 = Succ<U15>;

/// Lua stack index `I`, as used by [`TypedStack`](crate::TypedStack) methods.
#[derive(Debug)]
pub struct Idx<const I: i32>;

/// Resolve an index against the shape `S` to an offset from the top.
///
/// There is no implementation for `0`, for positive indices past the top of
/// `S`, or for indices outside of `-16..=16`.
/// Negative indices past the bottom resolve, but are then rejected by the
/// operation that uses the offset.
#[diagnostic::on_unimplemented(
	message = "`{Self}` does not point into the stack `{S}`",
	label = "invalid stack index"
)]
pub trait Resolve<S> {
	type Offset: Nat;
}

/// Offset from the top of `S` that the Lua index `I` refers to.
pub type OffsetOf<S, const I: i32> = <Idx<I> as Resolve<S>>::Offset;

macro_rules! indices {
	($($relative:literal, $absolute:literal => $nat:ty;)*) => {
		$(
			impl<S: Shape> Resolve<S> for Idx<{ $relative }> {
				type Offset = $nat;
			}

			// `$absolute` is `-$relative`, and the offset is `LEN - $absolute`.
			impl<S: Shape> Resolve<S> for Idx<{ $absolute }>
			where
				S::Len: Minus<Succ<$nat>>,
			{
				type Offset = <S::Len as Minus<Succ<$nat>>>::Output;
			}
		)*
	};
}

indices! {
	-1, 1 => U0;
	-2, 2 => U1;
	-3, 3 => U2;
	-4, 4 => U3;
	-5, 5 => U4;
	-6, 6 => U5;
	-7, 7 => U6;
	-8, 8 => U7;
	-9, 9 => U8;
	-10, 10 => U9;
	-11, 11 => U10;
	-12, 12 => U11;
	-13, 13 => U12;
	-14, 14 => U13;
	-15, 15 => U14;
	-16, 16 => U15;
}

/// Count `N` of values, as used by [`TypedStack`](crate::TypedStack) methods.
#[derive(Debug)]
pub struct Count<const N: usize>;

/// Map a [`Count`] onto a type-level natural.
#[diagnostic::on_unimplemented(
	message = "`{Self}` is too large to be tracked on the stack",
	note = "counts from 0 to 16 are supported"
)]
pub trait ToNat {
	type Nat: Nat;
}

/// Type-level natural for the count `N`.
pub type NatOf<const N: usize> = <Count<N> as ToNat>::Nat;

macro_rules! counts {
	($($n:literal => $nat:ty;)*) => {
		$(
			impl ToNat for Count<$n> {
				type Nat = $nat;
			}
		)*
	};
}

counts! {
	0 => U0;
	1 => U1;
	2 => U2;
	3 => U3;
	4 => U4;
	5 => U5;
	6 => U6;
	7 => U7;
	8 => U8;
	9 => U9;
	10 => U10;
	11 => U11;
	12 => U12;
	13 => U13;
	14 => U14;
	15 => U15;
	16 => U16;
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::lua_stack;
	use crate::tag::*;
	use core::any::TypeId;

	fn same<A: 'static, B: 'static>() -> bool {
		TypeId::of::<A>() == TypeId::of::<B>()
	}

	type Three = lua_stack![Number, Nil, Table];

	#[test]
	fn nat_values() {
		assert_eq!(U0::VALUE, 0);
		assert_eq!(U7::VALUE, 7);
		assert_eq!(<NatOf<16> as Nat>::VALUE, 16);
	}

	#[test]
	fn subtraction() {
		assert!(same::<<U5 as Minus<U2>>::Output, U3>());
		assert!(same::<<U2 as Minus<U2>>::Output, U0>());
	}

	fn at_most<A: AtMost<B>, B: Nat>() {}

	#[test]
	fn at_most_compares() {
		at_most::<U0, U0>();
		at_most::<U2, U2>();
		at_most::<U1, U3>();
	}

	#[test]
	fn negative_indices_count_from_the_top() {
		assert!(same::<OffsetOf<Three, -1>, U0>());
		assert!(same::<OffsetOf<Three, -3>, U2>());
	}

	#[test]
	fn positive_indices_count_from_the_bottom() {
		assert!(same::<OffsetOf<Three, 1>, U2>());
		assert!(same::<OffsetOf<Three, 2>, U1>());
		assert!(same::<OffsetOf<Three, 3>, U0>());
	}
}
