/// Write a stack [`Shape`](crate::shape::Shape) as a list of tags, from the
/// bottom of the stack to the top.
///
/// # Examples
/// ```
/// use lua_cts::prelude::*;
/// use lua_cts::shape::{Empty, Push, Shape};
///
/// type Args = lua_stack![Function, Number, Number];
/// assert_eq!(Args::LEN, 3);
///
/// fn same<A: 'static, B: 'static>() -> bool {
/// 	core::any::TypeId::of::<A>() == core::any::TypeId::of::<B>()
/// }
/// assert!(same::<lua_stack![Table, Nil], Push<Push<Empty, Table>, Nil>>());
/// assert!(same::<lua_stack![], Empty>());
/// ```
#[macro_export]
macro_rules! lua_stack {
	(@push $below:ty;) => {
		$below
	};

	(@push $below:ty; $tag:ty $(, $rest:ty)*) => {
		$crate::lua_stack!(@push $crate::shape::Push<$below, $tag>; $($rest),*)
	};

	() => {
		$crate::shape::Empty
	};

	($($tag:ty),+ $(,)?) => {
		$crate::lua_stack!(@push $crate::shape::Empty; $($tag),+)
	};
}

/// Create an unnamed function that conforms to the signature of [`CFunction`](crate::cdef::CFunction).
///
/// The macro accepts the pattern for the [`State`](crate::cdef::State) argument,
/// followed by `=>` and the function body.
/// The function is not a closure; it may not capture any variables.
///
/// # Examples
/// ```
/// use lua_cts::prelude::*;
///
/// let answer = lua_function!(l => {
/// 	let stack = unsafe { TypedStack::<lua_stack![]>::from_ptr(l) };
/// 	match stack {
/// 		Ok(stack) => {
/// 			let _ = stack.push_integer(42);
/// 			1
/// 		}
/// 		Err(_) => 0,
/// 	}
/// });
///
/// let mut lua = Lua::new();
/// let mut value = 0;
/// let _stack = lua.stack::<lua_stack![]>()
/// 	.and_then(|stack| stack.push_c_function(answer).call::<0, 1>())
/// 	.and_then(|stack| stack.to_integer::<-1>(|v| value = v))
/// 	.unwrap();
/// assert_eq!(value, 42);
/// ```
#[macro_export]
macro_rules! lua_function {
	($l:pat => $body:expr) => {{
		unsafe extern "C-unwind" fn __lua_function_inner($l: *mut $crate::cdef::State) -> ::core::ffi::c_int {
			$body
		}
		__lua_function_inner
	}};
}
