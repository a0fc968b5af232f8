//! Walk through the typed stack on a real Lua state.
//!
//! Set `RUST_LOG=lua_cts=trace` to see the checks as they happen.

use core::ffi::c_int;
use std::error::Error;

use lua_cts::prelude::*;
use tracing::{
	info, warn,
};
use tracing_subscriber::EnvFilter;

/// `add(a, b)`, checking both arguments at runtime.
unsafe extern "C-unwind" fn l_add(l: *mut LuaState) -> c_int {
	let (mut a, mut b) = (0, 0);
	let result = unsafe { TypedStack::<lua_stack![Unknown, Unknown]>::from_ptr(l) }
		.and_then(|stack| stack.to_integer::<1>(|value| a = value))
		.and_then(|stack| stack.to_integer::<2>(|value| b = value))
		.map(|stack| {
			let _ = stack.push_integer(a + b);
		});

	match result {
		Ok(()) => 1,
		Err(error) => {
			let lua = unsafe { LuaThread::from_ptr_mut(l) };
			{
				let message = error.to_string();
				lua.push_string(&message);
			}
			lua.error()
		}
	}
}

fn main() -> Result<(), Box<dyn Error>> {
	tracing_subscriber::fmt()
		.with_env_filter(EnvFilter::from_default_env().add_directive("lua_cts_demo=info".parse()?))
		.init();

	let mut lua = Lua::try_new().ok_or("couldn't allocate Lua state")?;
	lua.open_libs();
	info!(version = lua.version(), "running Lua");

	let mut sum = 0;
	let stack = lua.stack::<lua_stack![]>()?
		.push_c_function(l_add)
		.push_integer(2)
		.push_integer(40)
		.call::<2, 1>()?
		.to_integer::<-1>(|value| sum = value)?
		.pop::<1>();
	info!(sum, "called a Rust function");

	let mut answer = 0;
	let stack = stack
		.new_table()
		.push_integer(sum)
		.set_field::<-2>(c"answer")?
		.get_field::<-1>(c"answer")?
		.to_integer::<-1>(|value| answer = value)?
		.pop::<2>();
	info!(answer, "read a table field back");

	let thread = stack.release();
	thread.load_string("local a, b = ... return a * b, a - b", c"=demo")
		.or("couldn't load the demo chunk")?;

	let (mut product, mut difference) = (0, 0);
	let stack = thread.stack::<lua_stack![Function]>()?
		.push_integer(6)
		.push_integer(7)
		.pcall::<2, 2>()
		.map_err(|raised| format!("demo chunk raised an error: {raised:?}"))?
		.to_integer::<-2>(|value| product = value)?
		.to_integer::<-1>(|value| difference = value)?
		.pop::<2>();
	info!(product, difference, "called a Lua chunk");

	let thread = match stack.get_global(c"error").push_integer(7).pcall::<1, 0>() {
		Ok(stack) => {
			warn!("`error` returned normally");
			stack.release()
		}
		Err(raised) => {
			info!(
				status = ?raised.status,
				message = ?raised.message().map(String::from_utf8_lossy),
				"caught an error raised by Lua"
			);
			raised.into_stack().release()
		}
	};
	thread.set_top(0);

	match thread.stack::<lua_stack![]>()?.get_global(c"print").cast::<-1, Table>() {
		Ok(_) => warn!("`print` is a table"),
		Err(error) => info!(%error, "`print` is not a table"),
	}

	Ok(())
}
