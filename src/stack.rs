//! See [`TypedStack`].

use core::{
	ffi::{
		c_int, CStr,
	},
	fmt,
	marker::PhantomData,
};

use crate::{
	cdef::{
		self, CFunction, Integer, State, Status, Type,
	},
	error::StackError,
	index::{
		AtMost, Count, Idx, NatOf, NonZero, OffsetOf, Resolve, Succ, ToNat, U1,
	},
	shape::{
		AppendTimes, PopBack, Push, RemoveAt, ReplaceAt, Rotate, Select, Shape,
	},
	tag::{
		self, Conforms, KnownTag, Unknown,
	},
	Thread,
};

/// Tag of the value at Lua index `I` of `S`.
pub type TagAt<S, const I: i32> = <S as Select<OffsetOf<S, I>>>::Output;

/// `S` with the tag at Lua index `I` replaced by `T`.
pub type Narrowed<S, const I: i32, T> = <S as ReplaceAt<OffsetOf<S, I>, T>>::Output;

/// Shape after calling the function below `A` arguments, with `R` results.
pub type Called<S, const A: usize, const R: usize> =
	<<S as PopBack<Succ<NatOf<A>>>>::Output as AppendTimes<Unknown, NatOf<R>>>::Output;

/// Shape after a protected call raised an error: the function and its
/// arguments are replaced by the error object.
pub type Errored<S, const A: usize> = Push<<S as PopBack<Succ<NatOf<A>>>>::Output, Unknown>;

/// Handle to a Lua stack whose shape is `S`.
///
/// The handle borrows a [`Thread`] for `'l`; it never owns or closes the
/// state. Every operation consumes the handle and returns a new one for the
/// same state, typed with the shape the stack has after the operation.
///
/// Index parameters (`I`) are Lua stack indices: negative ones count from the
/// top (`-1` is the top), positive ones from the bottom (`1` is the bottom).
/// Count parameters (`N`, `A`, `R`) are numbers of values.
/// See [`index`](crate::index) for the supported ranges.
///
/// Methods that read a value hand it to a closure, and return the handle so
/// the chain can continue.
/// When a value is tagged [`Unknown`], methods that need a particular type
/// check it at runtime and narrow the tag on success.
///
/// # Stack space
/// Lua only guarantees [`MIN_STACK`](crate::cdef::MIN_STACK) free slots.
/// Every method that pushes values grows the stack with `lua_checkstack`
/// first.
///
/// # Panics
/// Methods that push values panic if the stack can't grow any more (Lua
/// allows about a million slots).
///
/// # Examples
/// ```
/// use lua_cts::prelude::*;
///
/// let mut lua = Lua::new();
/// let stack = lua.stack::<lua_stack![]>()?
/// 	.push_integer(1)
/// 	.push_nil()
/// 	.pop::<1>();
/// assert_eq!(stack.len(), 1);
///
/// let mut seen = 0;
/// let _stack = stack.to_integer::<1>(|value| seen = value)?;
/// assert_eq!(seen, 1);
/// # Ok::<(), StackError>(())
/// ```
///
/// # Compile-time checks
/// Popping more values than present:
/// ```compile_fail
/// use lua_cts::prelude::*;
/// let mut lua = Lua::new();
/// let _ = lua.stack::<lua_stack![Number]>().unwrap().pop::<2>();
/// ```
///
/// Calling something that isn't a function:
/// ```compile_fail
/// use lua_cts::prelude::*;
/// let mut lua = Lua::new();
/// let _ = lua.stack::<lua_stack![]>().unwrap()
/// 	.push_integer(1)
/// 	.push_integer(2)
/// 	.call::<1, 0>();
/// ```
///
/// Using `set_field` with the table on top of the stack:
/// ```compile_fail
/// use lua_cts::prelude::*;
/// let mut lua = Lua::new();
/// let _ = lua.stack::<lua_stack![]>().unwrap()
/// 	.new_table()
/// 	.set_field::<-1>(c"key");
/// ```
///
/// Reading an integer out of a table:
/// ```compile_fail
/// use lua_cts::prelude::*;
/// let mut lua = Lua::new();
/// let _ = lua.stack::<lua_stack![]>().unwrap()
/// 	.new_table()
/// 	.to_integer::<1>(|_| ());
/// ```
///
/// Indexing past the top, or with `0`:
/// ```compile_fail
/// use lua_cts::prelude::*;
/// let mut lua = Lua::new();
/// let _ = lua.stack::<lua_stack![]>().unwrap()
/// 	.push_nil()
/// 	.type_of::<2>(|_| ());
/// ```
/// ```compile_fail
/// use lua_cts::prelude::*;
/// let mut lua = Lua::new();
/// let _ = lua.stack::<lua_stack![]>().unwrap()
/// 	.push_nil()
/// 	.type_of::<0>(|_| ());
/// ```
///
/// Asking for the static type of an unverified value:
/// ```compile_fail
/// use lua_cts::prelude::*;
/// let mut lua = Lua::new();
/// let _ = lua.stack::<lua_stack![Unknown]>().unwrap().type_of::<-1>(|_| ());
/// ```
///
/// Rotating by more positions than the segment holds:
/// ```compile_fail
/// use lua_cts::prelude::*;
/// let mut lua = Lua::new();
/// let _ = lua.stack::<lua_stack![]>().unwrap()
/// 	.push_integer(1)
/// 	.push_nil()
/// 	.rotate::<-1, 2>();
/// ```
///
/// Changing the stack through the thread while a handle tracks it:
/// ```compile_fail
/// use lua_cts::prelude::*;
/// let mut lua = Lua::new();
/// let stack = lua.stack::<lua_stack![]>().unwrap().push_integer(1);
/// stack.thread().set_top(0);
/// ```
/// ```compile_fail
/// use lua_cts::prelude::*;
/// let mut lua = Lua::new();
/// let stack = lua.stack::<lua_stack![]>().unwrap().push_integer(1);
/// stack.thread().push_string("x");
/// ```
///
/// Anything that needs a value, on an empty stack:
/// ```compile_fail
/// use lua_cts::prelude::*;
/// let mut lua = Lua::new();
/// let _ = lua.stack::<lua_stack![]>().unwrap().pop::<1>();
/// ```
/// ```compile_fail
/// use lua_cts::prelude::*;
/// let mut lua = Lua::new();
/// let _ = lua.stack::<lua_stack![]>().unwrap().call::<0, 0>();
/// ```
/// ```compile_fail
/// use lua_cts::prelude::*;
/// let mut lua = Lua::new();
/// let _ = lua.stack::<lua_stack![]>().unwrap().to_integer::<-1>(|_| ());
/// ```
/// ```compile_fail
/// use lua_cts::prelude::*;
/// let mut lua = Lua::new();
/// let _ = lua.stack::<lua_stack![]>().unwrap().set_field::<1>(c"key");
/// ```
#[must_use = "the returned handle describes the stack after the operation"]
pub struct TypedStack<'l, S: Shape> {
	l: *mut State,
	_life: PhantomData<&'l mut Thread>,
	_shape: PhantomData<S>,
}

impl<S: Shape> fmt::Debug for TypedStack<'_, S> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("TypedStack")
			.field("state", &self.l)
			.field("shape", &core::any::type_name::<S>())
			.finish()
	}
}

impl<'l, S: Shape> TypedStack<'l, S> {
	/// Number of values on the stack.
	pub const SIZE: usize = S::LEN;

	/// Assert that the stack of `thread` has the shape `S`.
	///
	/// # Errors
	/// [`StackError::SizeMismatch`] if the stack doesn't hold exactly
	/// `S::LEN` values, and [`StackError::TypeMismatch`] for the first value
	/// whose type contradicts a known tag.
	pub fn new(thread: &'l mut Thread) -> Result<Self, StackError> {
		let got = thread.top();
		tracing::trace!(
			expected = S::LEN, got,
			shape = core::any::type_name::<S>(),
			"asserting stack shape"
		);
		if usize::try_from(got).ok() != Some(S::LEN) {
			tracing::debug!(expected = S::LEN, got, "stack has the wrong size");
			return Err(StackError::SizeMismatch { expected: S::LEN, got })
		}
		S::verify(thread)?;
		Ok(Self {
			l: thread.as_ptr(),
			_life: PhantomData,
			_shape: PhantomData,
		})
	}

	/// Assert the shape of the stack of a raw Lua state, like
	/// [`TypedStack::new`].
	///
	/// This is the entry point for C functions, whose arguments are the whole
	/// stack when they are called.
	///
	/// # Safety
	/// `l` must point to a valid Lua state for `'l`, and no other reference
	/// to the same [`Thread`] may be used while the handle lives.
	pub unsafe fn from_ptr(l: *mut State) -> Result<Self, StackError> {
		Self::new(unsafe { Thread::from_ptr_mut(l) })
	}

	/// Return the number of values on the stack.
	pub const fn len(&self) -> usize {
		S::LEN
	}

	/// Return `true` if the stack is empty.
	pub const fn is_empty(&self) -> bool {
		S::LEN == 0
	}

	/// Return the thread this handle works on, for untyped queries.
	pub fn thread(&self) -> &Thread {
		unsafe { Thread::from_ptr(self.l) }
	}

	/// Stop tracking the stack, and give back the thread.
	pub fn release(self) -> &'l mut Thread {
		unsafe { Thread::from_ptr_mut(self.l) }
	}

	fn reserve(&self, n: usize) {
		let n = n as c_int;
		if unsafe { cdef::lua_checkstack(self.l, n) } == 0 {
			tracing::error!(n, top = self.thread().top(), "can't grow the Lua stack");
			panic!("stack overflow (can't make room for {n} more values)")
		}
	}

	fn retype<T: Shape>(self) -> TypedStack<'l, T> {
		TypedStack {
			l: self.l,
			_life: PhantomData,
			_shape: PhantomData,
		}
	}

	/// Pop `N` values from the stack.
	pub fn pop<const N: usize>(self) -> TypedStack<'l, <S as PopBack<NatOf<N>>>::Output>
	where
		Count<N>: ToNat,
		S: PopBack<NatOf<N>>,
	{
		unsafe { cdef::lua_pop(self.l, N as c_int) }
		self.retype()
	}

	/// Push an integer.
	pub fn push_integer(self, value: Integer) -> TypedStack<'l, Push<S, tag::Number>> {
		self.reserve(1);
		unsafe { cdef::lua_pushinteger(self.l, value) }
		self.retype()
	}

	/// Push a float.
	pub fn push_number(self, value: cdef::Number) -> TypedStack<'l, Push<S, tag::Number>> {
		self.reserve(1);
		unsafe { cdef::lua_pushnumber(self.l, value) }
		self.retype()
	}

	/// Push `nil`.
	pub fn push_nil(self) -> TypedStack<'l, Push<S, tag::Nil>> {
		self.reserve(1);
		unsafe { cdef::lua_pushnil(self.l) }
		self.retype()
	}

	/// Push a C function.
	pub fn push_c_function(self, func: CFunction) -> TypedStack<'l, Push<S, tag::Function>> {
		self.reserve(1);
		unsafe { cdef::lua_pushcfunction(self.l, func) }
		self.retype()
	}

	/// Create a new empty table and push it.
	pub fn new_table(self) -> TypedStack<'l, Push<S, tag::Table>> {
		self.reserve(1);
		unsafe { cdef::lua_newtable(self.l) }
		self.retype()
	}

	/// Push a copy of the value at index `I`.
	pub fn push_value<const I: i32>(self) -> TypedStack<'l, Push<S, TagAt<S, I>>>
	where
		Idx<I>: Resolve<S>,
		S: Select<OffsetOf<S, I>>,
	{
		self.reserve(1);
		unsafe { cdef::lua_pushvalue(self.l, I as c_int) }
		self.retype()
	}

	/// Call the function that sits below the top `A` values, passing those
	/// values as arguments, and keep `R` results.
	///
	/// The function and its arguments are popped; the results are tagged
	/// [`Unknown`].
	///
	/// An error raised by the callee is not caught here; it reaches the
	/// panic handler of the state. Use [`TypedStack::pcall`] to catch it.
	///
	/// # Errors
	/// [`StackError::TypeMismatch`] if the function is tagged [`Unknown`] and
	/// isn't a function. Nothing is called in that case.
	pub fn call<const A: usize, const R: usize>(self) -> Result<TypedStack<'l, Called<S, A, R>>, StackError>
	where
		Count<A>: ToNat,
		Count<R>: ToNat,
		S: Select<NatOf<A>>,
		<S as Select<NatOf<A>>>::Output: Conforms<tag::Function>,
		S: PopBack<Succ<NatOf<A>>>,
		<S as PopBack<Succ<NatOf<A>>>>::Output: AppendTimes<Unknown, NatOf<R>>,
	{
		let func = -(A as c_int) - 1;
		<<S as Select<NatOf<A>>>::Output as Conforms<tag::Function>>::conform(self.thread(), func)?;
		tracing::trace!(n_args = A, n_results = R, "calling Lua function");
		self.reserve(R.saturating_sub(A + 1));
		unsafe { cdef::lua_call(self.l, A as c_int, R as c_int) }
		Ok(self.retype())
	}

	/// Call the function below the top `A` values in protected mode, keeping
	/// `R` results.
	///
	/// If the call raises an error, the function and its arguments are
	/// replaced by the error object, and the handle comes back inside
	/// [`Raised`].
	/// Calling a value tagged [`Unknown`] that isn't a function is such an
	/// error.
	pub fn pcall<const A: usize, const R: usize>(self) -> Result<TypedStack<'l, Called<S, A, R>>, Raised<'l, Errored<S, A>>>
	where
		Count<A>: ToNat,
		Count<R>: ToNat,
		S: Select<NatOf<A>>,
		<S as Select<NatOf<A>>>::Output: Conforms<tag::Function>,
		S: PopBack<Succ<NatOf<A>>>,
		<S as PopBack<Succ<NatOf<A>>>>::Output: AppendTimes<Unknown, NatOf<R>>,
	{
		tracing::trace!(n_args = A, n_results = R, "calling Lua function in protected mode");
		self.reserve(R.saturating_sub(A + 1));
		let status = unsafe {
			Status::from_c_int_unchecked(cdef::lua_pcall(self.l, A as c_int, R as c_int, 0))
		};
		if status.is_ok() {
			Ok(self.retype())
		} else {
			tracing::debug!(?status, "protected call raised an error");
			Err(Raised {
				status,
				stack: self.retype(),
			})
		}
	}

	/// Rotate the values between index `I` and the top `N` positions in the
	/// direction of the top.
	///
	/// `N` can't be larger than the number of values in that segment.
	pub fn rotate<const I: i32, const N: usize>(self) -> TypedStack<'l, <S as Rotate<OffsetOf<S, I>, NatOf<N>>>::Output>
	where
		Idx<I>: Resolve<S>,
		Count<N>: ToNat,
		S: Select<OffsetOf<S, I>>,
		NatOf<N>: AtMost<Succ<OffsetOf<S, I>>>,
		S: Rotate<OffsetOf<S, I>, NatOf<N>>,
	{
		unsafe { cdef::lua_rotate(self.l, I as c_int, N as c_int) }
		self.retype()
	}

	/// Move the top value into index `I`, shifting up the values above it.
	pub fn insert<const I: i32>(self) -> TypedStack<'l, <S as Rotate<OffsetOf<S, I>, U1>>::Output>
	where
		Idx<I>: Resolve<S>,
		S: Select<OffsetOf<S, I>>,
		S: Rotate<OffsetOf<S, I>, U1>,
	{
		unsafe { cdef::lua_insert(self.l, I as c_int) }
		self.retype()
	}

	/// Remove the value at index `I`, shifting down the values above it.
	pub fn remove<const I: i32>(self) -> TypedStack<'l, <S as RemoveAt<OffsetOf<S, I>>>::Output>
	where
		Idx<I>: Resolve<S>,
		S: RemoveAt<OffsetOf<S, I>>,
	{
		unsafe { cdef::lua_remove(self.l, I as c_int) }
		self.retype()
	}

	/// Move the top value into index `I`, replacing the value there, and pop
	/// it.
	pub fn replace<const I: i32>(self) -> TypedStack<'l, <Narrowed<S, I, TagAt<S, -1>> as PopBack<U1>>::Output>
	where
		Idx<I>: Resolve<S>,
		Idx<-1>: Resolve<S>,
		OffsetOf<S, I>: NonZero,
		S: Select<OffsetOf<S, -1>>,
		S: ReplaceAt<OffsetOf<S, I>, TagAt<S, -1>>,
		Narrowed<S, I, TagAt<S, -1>>: PopBack<U1>,
	{
		unsafe { cdef::lua_replace(self.l, I as c_int) }
		self.retype()
	}

	/// Do the equivalent to `t[key] = v`, where `t` is the table at index `I`
	/// and `v` is the value on the top of the stack, which is popped.
	///
	/// This may trigger a metamethod for the "newindex" event.
	///
	/// # Errors
	/// [`StackError::TypeMismatch`] if the value at `I` is tagged [`Unknown`]
	/// and isn't a table.
	pub fn set_field<const I: i32>(self, key: &CStr) -> Result<TypedStack<'l, <Narrowed<S, I, tag::Table> as PopBack<U1>>::Output>, StackError>
	where
		Idx<I>: Resolve<S>,
		OffsetOf<S, I>: NonZero,
		S: Select<OffsetOf<S, I>>,
		TagAt<S, I>: Conforms<tag::Table>,
		S: ReplaceAt<OffsetOf<S, I>, tag::Table>,
		Narrowed<S, I, tag::Table>: PopBack<U1>,
	{
		<TagAt<S, I> as Conforms<tag::Table>>::conform(self.thread(), I as c_int)?;
		unsafe { cdef::lua_setfield(self.l, I as c_int, key.as_ptr()) }
		Ok(self.retype())
	}

	/// Push the value `t[key]`, where `t` is the table at index `I`.
	///
	/// This may trigger a metamethod for the "index" event.
	///
	/// # Errors
	/// [`StackError::TypeMismatch`] if the value at `I` is tagged [`Unknown`]
	/// and isn't a table.
	pub fn get_field<const I: i32>(self, key: &CStr) -> Result<TypedStack<'l, Push<Narrowed<S, I, tag::Table>, Unknown>>, StackError>
	where
		Idx<I>: Resolve<S>,
		S: Select<OffsetOf<S, I>>,
		TagAt<S, I>: Conforms<tag::Table>,
		S: ReplaceAt<OffsetOf<S, I>, tag::Table>,
	{
		<TagAt<S, I> as Conforms<tag::Table>>::conform(self.thread(), I as c_int)?;
		self.reserve(1);
		unsafe { cdef::lua_getfield(self.l, I as c_int, key.as_ptr()) };
		Ok(self.retype())
	}

	/// Push the value of the global `name`.
	pub fn get_global(self, name: &CStr) -> TypedStack<'l, Push<S, Unknown>> {
		self.reserve(1);
		unsafe { cdef::lua_getglobal(self.l, name.as_ptr()) };
		self.retype()
	}

	/// Pop a value and set it as the new value of the global `name`.
	pub fn set_global(self, name: &CStr) -> TypedStack<'l, <S as PopBack<U1>>::Output>
	where
		S: PopBack<U1>,
	{
		unsafe { cdef::lua_setglobal(self.l, name.as_ptr()) }
		self.retype()
	}

	/// Pass the C function at index `I` to `func`.
	///
	/// `func` receives `None` for a Lua function.
	///
	/// # Errors
	/// [`StackError::TypeMismatch`] if the value at `I` is tagged [`Unknown`]
	/// and isn't a function.
	pub fn to_c_function<const I: i32>(self, func: impl FnOnce(Option<CFunction>)) -> Result<TypedStack<'l, Narrowed<S, I, tag::Function>>, StackError>
	where
		Idx<I>: Resolve<S>,
		S: Select<OffsetOf<S, I>>,
		TagAt<S, I>: Conforms<tag::Function>,
		S: ReplaceAt<OffsetOf<S, I>, tag::Function>,
	{
		<TagAt<S, I> as Conforms<tag::Function>>::conform(self.thread(), I as c_int)?;
		func(unsafe { cdef::lua_tocfunction(self.l, I as c_int) });
		Ok(self.retype())
	}

	/// Pass the number at index `I`, converted to an integer, to `func`.
	///
	/// A float without an exact integer representation converts to `0`.
	///
	/// # Errors
	/// [`StackError::TypeMismatch`] if the value at `I` is tagged [`Unknown`]
	/// and isn't a number.
	pub fn to_integer<const I: i32>(self, func: impl FnOnce(Integer)) -> Result<TypedStack<'l, Narrowed<S, I, tag::Number>>, StackError>
	where
		Idx<I>: Resolve<S>,
		S: Select<OffsetOf<S, I>>,
		TagAt<S, I>: Conforms<tag::Number>,
		S: ReplaceAt<OffsetOf<S, I>, tag::Number>,
	{
		<TagAt<S, I> as Conforms<tag::Number>>::conform(self.thread(), I as c_int)?;
		func(unsafe { cdef::lua_tointeger(self.l, I as c_int) });
		Ok(self.retype())
	}

	/// Pass the number at index `I` to `func`.
	///
	/// # Errors
	/// [`StackError::TypeMismatch`] if the value at `I` is tagged [`Unknown`]
	/// and isn't a number.
	pub fn to_number<const I: i32>(self, func: impl FnOnce(cdef::Number)) -> Result<TypedStack<'l, Narrowed<S, I, tag::Number>>, StackError>
	where
		Idx<I>: Resolve<S>,
		S: Select<OffsetOf<S, I>>,
		TagAt<S, I>: Conforms<tag::Number>,
		S: ReplaceAt<OffsetOf<S, I>, tag::Number>,
	{
		<TagAt<S, I> as Conforms<tag::Number>>::conform(self.thread(), I as c_int)?;
		func(unsafe { cdef::lua_tonumber(self.l, I as c_int) });
		Ok(self.retype())
	}

	/// Pass the type of the value at index `I`, which is known statically, to
	/// `func`.
	pub fn type_of<const I: i32>(self, func: impl FnOnce(Type)) -> Self
	where
		Idx<I>: Resolve<S>,
		S: Select<OffsetOf<S, I>>,
		TagAt<S, I>: KnownTag,
	{
		func(<TagAt<S, I> as KnownTag>::TYPE_OF);
		self
	}

	/// Check that the value at index `I` has the type of `T`, and track it
	/// as `T` from now on.
	///
	/// # Errors
	/// [`StackError::TypeMismatch`] if the value at `I` is tagged [`Unknown`]
	/// and has a different type.
	///
	/// # Examples
	/// ```
	/// use lua_cts::prelude::*;
	///
	/// let mut lua = Lua::new();
	/// let stack = lua.stack::<lua_stack![]>()?
	/// 	.get_global(c"missing");
	/// assert!(stack.cast::<-1, Table>().is_err());
	/// # Ok::<(), StackError>(())
	/// ```
	pub fn cast<const I: i32, T: KnownTag>(self) -> Result<TypedStack<'l, Narrowed<S, I, T>>, StackError>
	where
		Idx<I>: Resolve<S>,
		S: Select<OffsetOf<S, I>>,
		TagAt<S, I>: Conforms<T>,
		S: ReplaceAt<OffsetOf<S, I>, T>,
	{
		<TagAt<S, I> as Conforms<T>>::conform(self.thread(), I as c_int)?;
		Ok(self.retype())
	}
}

/// A protected call that raised an error.
///
/// The stack holds the error object on top, where the function and its
/// arguments were.
pub struct Raised<'l, S: Shape> {
	pub status: Status,
	pub stack: TypedStack<'l, S>,
}

impl<'l, S: Shape> Raised<'l, S> {
	/// Return the error object as bytes, if it is a string.
	///
	/// Other error objects, numbers included, give `None` and are left as
	/// they are.
	pub fn message(&self) -> Option<&[u8]> {
		self.stack.thread().peek_string(-1)
	}

	/// Drop the error details, keeping the handle.
	pub fn into_stack(self) -> TypedStack<'l, S> {
		self.stack
	}
}

impl<S: Shape> fmt::Debug for Raised<'_, S> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let mut debug = f.debug_struct("Raised");
		debug.field("status", &self.status);
		match self.message().map(core::str::from_utf8) {
			Some(Ok(message)) => debug.field("message", &message),
			_ => debug.field("message", &"<not a string>"),
		};
		debug.field("stack", &self.stack).finish()
	}
}
