// Core modules implementing path lookup, value coercion, populate, and the parse gate.
pub mod error;
pub mod gate;
pub mod kind;
pub mod path;
pub mod populate;
