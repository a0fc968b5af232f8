//! Prelude that re-exports useful things.
//!
//! Raw C API types get a `Lua` prefix to prevent name clashes.
//! Tag types keep their names, since they are what shapes are written with.

pub use {
	crate::cdef::{
		CFunction as LuaCFunction,
		Integer as LuaInteger,
		Number as LuaNumber,
		State as LuaState,
		Status as LuaStatus,
		Type as LuaType,
	},
	crate::tag::{
		Function,
		Nil,
		Number,
		Table,
		Unknown,
	},
	crate::Lua,
	crate::Thread as LuaThread,
	crate::Raised,
	crate::StackError,
	crate::TypedStack,
	crate::lua_function,
	crate::lua_stack,
};
