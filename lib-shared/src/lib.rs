/// Module with shared code.
#[macro_use]
extern crate error_chain;

#[macro_use]
extern crate slog;

extern crate shlex;

pub mod exec;
pub mod paths;
