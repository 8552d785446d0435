//! Interactive debugger console for the EFI DXE emulator.
//!
//! The console is a keyed command registry plus a line dispatcher. The outer
//! REPL reads one line at a time and hands it to [`dispatch_line`]; the
//! resolved handler runs to completion and returns a [`ControlSignal`] that
//! tells the driver whether to keep reading input (`Stay`) or hand control
//! back to the emulation engine (`Resume`). Handlers never run concurrently
//! and return exactly one signal per line.
//!
//! Sibling subsystems (boot/runtime service hooks, NVRAM) add their own
//! commands through the same [`CommandRegistry::register`] entry point.

#![forbid(unsafe_code)]

mod dispatch;
mod global_cmds;
mod registry;

pub use dispatch::{dispatch_line, CommandCtx, ControlSignal, EmuEngine, Session};
pub use global_cmds::register_global_cmds;
pub use registry::{Command, CommandRegistry, RegistryError};
