#![cfg(all(feature = "auxlib", feature = "stdlibs"))]

use core::ffi::c_int;

use lua_cts::prelude::*;
use pretty_assertions::assert_eq;

unsafe extern "C-unwind" fn l_sub(l: *mut LuaState) -> c_int {
	let (mut a, mut b) = (0, 0);
	let result = unsafe { TypedStack::<lua_stack![Unknown, Unknown]>::from_ptr(l) }
		.and_then(|stack| stack.to_integer::<1>(|value| a = value))
		.and_then(|stack| stack.to_integer::<2>(|value| b = value));
	match result {
		Ok(stack) => {
			let _ = stack.push_integer(a - b);
			1
		}
		Err(_) => 0,
	}
}

fn types(thread: &LuaThread) -> Vec<LuaType> {
	(1..=thread.top()).map(|index| thread.type_of(index)).collect()
}

#[test]
fn asserting_a_shape_checks_the_size() {
	let mut lua = Lua::new();
	let _ = lua.stack::<lua_stack![]>().unwrap().push_integer(1).release();

	assert_eq!(
		lua.stack::<lua_stack![]>().unwrap_err(),
		StackError::SizeMismatch { expected: 0, got: 1 }
	);
	assert_eq!(
		lua.stack::<lua_stack![Number, Number]>().unwrap_err(),
		StackError::SizeMismatch { expected: 2, got: 1 }
	);
	assert!(lua.stack::<lua_stack![Number]>().is_ok());
}

#[test]
fn asserting_a_shape_checks_known_tags() {
	let mut lua = Lua::new();
	let _ = lua.stack::<lua_stack![]>().unwrap()
		.push_integer(1)
		.push_nil()
		.release();

	assert_eq!(
		lua.stack::<lua_stack![Number, Table]>().unwrap_err(),
		StackError::TypeMismatch { index: 2, expected: LuaType::Table, got: LuaType::Nil }
	);
	assert!(lua.stack::<lua_stack![Unknown, Nil]>().is_ok());
	assert!(lua.stack::<lua_stack![Unknown, Unknown]>().is_ok());
}

#[test]
fn push_and_pop() {
	let mut lua = Lua::new();
	let stack = lua.stack::<lua_stack![]>().unwrap()
		.push_integer(1)
		.push_number(0.5)
		.push_nil()
		.new_table()
		.push_c_function(l_sub);
	assert_eq!(stack.len(), 5);
	assert_eq!(
		types(stack.thread()),
		vec![LuaType::Number, LuaType::Number, LuaType::Nil, LuaType::Table, LuaType::Function]
	);

	let stack = stack.pop::<3>();
	assert_eq!(stack.len(), 2);
	assert_eq!(stack.thread().top(), 2);

	let stack = stack.pop::<2>();
	assert!(stack.is_empty());
	assert_eq!(stack.thread().top(), 0);
}

#[test]
fn size_is_a_constant() {
	assert_eq!(TypedStack::<lua_stack![]>::SIZE, 0);
	assert_eq!(TypedStack::<lua_stack![Number, Nil, Unknown]>::SIZE, 3);
}

#[test]
fn call_a_rust_function() {
	let mut lua = Lua::new();
	let mut difference = 0;
	let stack = lua.stack::<lua_stack![]>().unwrap()
		.push_nil()
		.push_c_function(l_sub)
		.push_integer(50)
		.push_integer(8)
		.call::<2, 1>().unwrap()
		.to_integer::<-1>(|value| difference = value).unwrap();
	assert_eq!(difference, 42);
	assert_eq!(types(stack.thread()), vec![LuaType::Nil, LuaType::Number]);
}

#[test]
fn call_fills_missing_results_with_nil() {
	let mut lua = Lua::new();
	let constant = lua_function!(l => {
		let stack = unsafe { TypedStack::<lua_stack![]>::from_ptr(l) };
		match stack {
			Ok(stack) => {
				let _ = stack.push_integer(7);
				1
			}
			Err(_) => 0,
		}
	});

	let stack = lua.stack::<lua_stack![]>().unwrap()
		.push_c_function(constant)
		.call::<0, 3>().unwrap();
	assert_eq!(stack.len(), 3);
	assert_eq!(types(stack.thread()), vec![LuaType::Number, LuaType::Nil, LuaType::Nil]);
}

#[test]
fn call_checks_unknown_functions() {
	let mut lua = Lua::new();
	let error = lua.stack::<lua_stack![]>().unwrap()
		.push_integer(1)
		.get_global(c"missing")
		.push_integer(2)
		.call::<1, 0>()
		.unwrap_err();
	assert_eq!(
		error,
		StackError::TypeMismatch { index: 2, expected: LuaType::Function, got: LuaType::Nil }
	);
	// Nothing was called, so the stack is untouched.
	assert_eq!(lua.top(), 3);
}

#[test]
fn call_an_unknown_function() {
	let mut lua = Lua::new();
	lua.open_libs();
	let mut selected = 0;
	let stack = lua.stack::<lua_stack![]>().unwrap()
		.push_nil()
		.get_global(c"select")
		.push_integer(2)
		.push_integer(10)
		.push_integer(20)
		.call::<3, 1>().unwrap()
		.to_integer::<-1>(|value| selected = value).unwrap();
	assert_eq!(selected, 20);
	assert_eq!(types(stack.thread()), vec![LuaType::Nil, LuaType::Number]);
}

#[test]
fn rotate_moves_the_top_down() {
	let mut lua = Lua::new();
	let stack = lua.stack::<lua_stack![]>().unwrap()
		.push_integer(1)
		.push_nil()
		.new_table()
		.rotate::<1, 1>();
	assert_eq!(types(stack.thread()), vec![LuaType::Table, LuaType::Number, LuaType::Nil]);

	let stack = stack.rotate::<-2, 1>();
	assert_eq!(types(stack.thread()), vec![LuaType::Table, LuaType::Nil, LuaType::Number]);

	let mut value = 0;
	let stack = stack.rotate::<1, 2>().to_integer::<2>(|v| value = v).unwrap();
	assert_eq!(value, 1);
	assert_eq!(types(stack.thread()), vec![LuaType::Nil, LuaType::Number, LuaType::Table]);
}

#[test]
fn insert_remove_replace() {
	let mut lua = Lua::new();
	let stack = lua.stack::<lua_stack![]>().unwrap()
		.push_integer(1)
		.push_nil()
		.new_table()
		.insert::<1>();
	assert_eq!(types(stack.thread()), vec![LuaType::Table, LuaType::Number, LuaType::Nil]);

	let stack = stack.remove::<2>();
	assert_eq!(types(stack.thread()), vec![LuaType::Table, LuaType::Nil]);

	let stack = stack.push_integer(3).replace::<1>();
	assert_eq!(types(stack.thread()), vec![LuaType::Number, LuaType::Nil]);

	let mut value = 0;
	let _stack = stack.to_integer::<1>(|v| value = v).unwrap();
	assert_eq!(value, 3);
}

#[test]
fn push_value_copies() {
	let mut lua = Lua::new();
	let (mut first, mut copy) = (0, 0);
	let stack = lua.stack::<lua_stack![]>().unwrap()
		.push_integer(11)
		.push_nil()
		.push_value::<1>()
		.to_integer::<-3>(|v| first = v).unwrap()
		.to_integer::<-1>(|v| copy = v).unwrap();
	assert_eq!((first, copy), (11, 11));
	assert_eq!(stack.len(), 3);
}

#[test]
fn fields() {
	let mut lua = Lua::new();
	let mut value = 0;
	let stack = lua.stack::<lua_stack![]>().unwrap()
		.new_table()
		.push_integer(5)
		.set_field::<1>(c"x").unwrap()
		.get_field::<1>(c"x").unwrap()
		.to_integer::<-1>(|v| value = v).unwrap()
		.pop::<1>()
		.get_field::<-1>(c"y").unwrap();
	assert_eq!(value, 5);
	assert_eq!(types(stack.thread()), vec![LuaType::Table, LuaType::Nil]);
}

#[test]
fn fields_of_unknown_values_are_checked() {
	let mut lua = Lua::new();
	let error = lua.stack::<lua_stack![]>().unwrap()
		.get_global(c"missing")
		.get_field::<-1>(c"x")
		.unwrap_err();
	assert_eq!(
		error,
		StackError::TypeMismatch { index: 1, expected: LuaType::Table, got: LuaType::Nil }
	);

	let mut lua = Lua::new();
	let error = lua.stack::<lua_stack![]>().unwrap()
		.get_global(c"missing")
		.push_integer(1)
		.set_field::<-2>(c"x")
		.unwrap_err();
	assert_eq!(
		error,
		StackError::TypeMismatch { index: 1, expected: LuaType::Table, got: LuaType::Nil }
	);
}

#[test]
fn globals() {
	let mut lua = Lua::new();
	let mut value = 0;
	let stack = lua.stack::<lua_stack![]>().unwrap()
		.push_integer(9)
		.set_global(c"answer")
		.get_global(c"answer")
		.to_integer::<-1>(|v| value = v).unwrap()
		.pop::<1>();
	assert_eq!(value, 9);
	assert!(stack.is_empty());
}

#[test]
fn numbers() {
	let mut lua = Lua::new();
	let (mut float, mut truncated, mut whole) = (0.0, -1, 0.0);
	let _stack = lua.stack::<lua_stack![]>().unwrap()
		.push_number(1.5)
		.push_integer(4)
		.to_number::<1>(|v| float = v).unwrap()
		.to_integer::<1>(|v| truncated = v).unwrap()
		.to_number::<2>(|v| whole = v).unwrap();
	assert_eq!(float, 1.5);
	assert_eq!(truncated, 0);
	assert_eq!(whole, 4.0);
}

#[test]
fn reading_unknown_values_is_checked() {
	let mut lua = Lua::new();
	let error = lua.stack::<lua_stack![]>().unwrap()
		.get_global(c"missing")
		.to_number::<-1>(|_| ())
		.unwrap_err();
	assert_eq!(
		error,
		StackError::TypeMismatch { index: 1, expected: LuaType::Number, got: LuaType::Nil }
	);
}

#[test]
fn type_of_known_tags() {
	let mut lua = Lua::new();
	let mut seen = Vec::new();
	let _stack = lua.stack::<lua_stack![]>().unwrap()
		.push_integer(1)
		.push_nil()
		.new_table()
		.push_c_function(l_sub)
		.type_of::<1>(|t| seen.push(t))
		.type_of::<2>(|t| seen.push(t))
		.type_of::<-2>(|t| seen.push(t))
		.type_of::<-1>(|t| seen.push(t));
	assert_eq!(seen, vec![LuaType::Number, LuaType::Nil, LuaType::Table, LuaType::Function]);
}

#[test]
fn c_functions() {
	let mut lua = Lua::new();
	let mut c_function = None;
	let stack = lua.stack::<lua_stack![]>().unwrap()
		.push_c_function(l_sub)
		.to_c_function::<-1>(|f| c_function = f).unwrap();
	assert!(c_function.is_some_and(|f| f as usize == l_sub as usize));

	let thread = stack.pop::<1>().release();
	assert!(thread.load_string("return 1", c"=chunk").is_ok());
	let mut c_function = None;
	let _stack = thread.stack::<lua_stack![Unknown]>().unwrap()
		.to_c_function::<-1>(|f| c_function = f).unwrap();
	assert!(c_function.is_none());
}

#[test]
fn cast_narrows_unknown_values() {
	let mut lua = Lua::new();
	lua.open_libs();
	let stack = lua.stack::<lua_stack![]>().unwrap()
		.get_global(c"print")
		.cast::<-1, Function>().unwrap();
	assert_eq!(types(stack.thread()), vec![LuaType::Function]);

	let error = stack.get_global(c"string").cast::<2, Function>().unwrap_err();
	assert_eq!(
		error,
		StackError::TypeMismatch { index: 2, expected: LuaType::Function, got: LuaType::Table }
	);
}

#[test]
fn protected_call_returns_results() {
	let mut lua = Lua::new();
	assert!(lua.load_string("local a, b = ... return b, a", c"=swap").is_ok());
	let (mut first, mut second) = (0, 0);
	let _stack = lua.stack::<lua_stack![Function]>().unwrap()
		.push_integer(1)
		.push_integer(2)
		.pcall::<2, 2>().unwrap()
		.to_integer::<1>(|v| first = v).unwrap()
		.to_integer::<2>(|v| second = v).unwrap();
	assert_eq!((first, second), (2, 1));
}

#[test]
fn protected_call_catches_errors() {
	let mut lua = Lua::new();
	lua.open_libs();
	assert!(lua.load_string("error('boom')", c"=test").is_ok());
	let raised = lua.stack::<lua_stack![Unknown]>().unwrap()
		.push_integer(1)
		.pcall::<1, 0>()
		.unwrap_err();
	assert_eq!(raised.status, LuaStatus::RuntimeError);
	assert_eq!(raised.message(), Some(&b"test:1: boom"[..]));

	let stack = raised.into_stack();
	assert_eq!(stack.len(), 1);
	assert_eq!(stack.thread().top(), 1);
}

#[test]
fn protected_call_of_a_non_function() {
	let mut lua = Lua::new();
	let raised = lua.stack::<lua_stack![]>().unwrap()
		.get_global(c"missing")
		.pcall::<0, 1>()
		.unwrap_err();
	assert_eq!(raised.status, LuaStatus::RuntimeError);
	assert!(raised.message().is_some());
	assert_eq!(raised.stack.len(), 1);
}

#[test]
fn load_string_reports_syntax_errors() {
	let mut lua = Lua::new();
	assert_eq!(lua.load_string("return +", c"=bad"), LuaStatus::SyntaxError);
	assert!(lua.to_string(-1).is_some());
	assert_eq!(lua.top(), 1);
}

#[test]
fn rotate_by_the_whole_segment() {
	let mut lua = Lua::new();
	let stack = lua.stack::<lua_stack![]>().unwrap()
		.push_integer(1)
		.push_nil()
		.new_table()
		.rotate::<1, 3>()
		.rotate::<-2, 2>();
	assert_eq!(types(stack.thread()), vec![LuaType::Number, LuaType::Nil, LuaType::Table]);

	let stack = stack.rotate::<-1, 1>();
	assert_eq!(types(stack.thread()), vec![LuaType::Number, LuaType::Nil, LuaType::Table]);
}

#[test]
fn error_messages_are_read_without_conversion() {
	let mut lua = Lua::new();
	lua.open_libs();
	let raised = lua.stack::<lua_stack![]>().unwrap()
		.get_global(c"error")
		.push_integer(7)
		.pcall::<1, 0>()
		.unwrap_err();
	assert_eq!(raised.message(), None);
	assert_eq!(raised.stack.thread().type_of(-1), LuaType::Number);

	let mut code = 0;
	let _stack = raised.into_stack()
		.to_integer::<-1>(|v| code = v)
		.unwrap();
	assert_eq!(code, 7);
}

#[test]
fn peek_string_leaves_numbers_alone() {
	let mut lua = Lua::new();
	lua.push_string("text");
	let _ = lua.stack::<lua_stack![Unknown]>().unwrap().push_integer(3).release();

	assert_eq!(lua.peek_string(1), Some(&b"text"[..]));
	assert_eq!(lua.peek_string(2), None);
	assert_eq!(lua.type_of(2), LuaType::Number);
}

macro_rules! push_integers {
	($stack:expr; $($value:literal)*) => {
		$stack $(.push_integer($value))*
	};
}

#[test]
fn pushing_grows_the_stack() {
	let mut lua = Lua::new();
	let mut last = 0;
	let stack = push_integers!(lua.stack::<lua_stack![]>().unwrap();
		1 2 3 4 5 6 7 8 9 10 11 12 13 14 15 16
		17 18 19 20 21 22 23 24 25 26 27 28 29 30 31 32
		33 34 35 36 37 38 39 40 41 42 43 44 45 46 47 48
	)
		.to_integer::<-1>(|v| last = v)
		.unwrap();
	assert_eq!(last, 48);
	assert_eq!(stack.len(), 48);
	assert_eq!(stack.thread().top(), 48);
}
