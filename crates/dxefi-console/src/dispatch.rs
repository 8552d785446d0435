use std::io::{self, Write};

use dxefi_loader::ImageRegistry;

use crate::registry::CommandRegistry;

/// Loop-level intent returned by every command handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlSignal {
    /// Remain in the interactive loop; the engine is not touched.
    Stay,
    /// Hand control back to the emulation driver (step or free-run).
    Resume,
}

/// The slice of the emulation engine the console is allowed to touch.
///
/// The console only ever asks the engine to stop; stepping and running are
/// the driver's business.
pub trait EmuEngine {
    /// Fire-and-forget stop request. Interrupts an in-progress or pending
    /// run; the console does not wait for or verify its effect.
    fn request_stop(&mut self);
}

/// Per-session state owned by the REPL driver and mutated by handlers.
#[derive(Debug, Default)]
pub struct Session {
    /// Prior input lines, oldest first. The driver records each non-empty
    /// line before dispatching it.
    pub history: Vec<String>,
    /// Set by `run`; the driver starts emulation once its own gating
    /// conditions (a loaded target, notably) are met.
    pub run_pending: bool,
    /// Set by `quit`; tells the driver the `Resume` it just saw means exit.
    pub exiting: bool,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Everything a handler may reach: the command table (for help rendering),
/// the engine handle, the mutable session, the read-only image registry, and
/// the output sink for result text.
pub struct CommandCtx<'a> {
    pub commands: &'a CommandRegistry,
    pub engine: &'a mut dyn EmuEngine,
    pub session: &'a mut Session,
    pub images: &'a ImageRegistry,
    pub out: &'a mut dyn Write,
}

/// Dispatches one input line.
///
/// The first whitespace-separated token selects the command; the remainder of
/// the line is passed to the handler verbatim. An unresolved token is
/// reported to the sink and yields [`ControlSignal::Stay`] without invoking
/// anything. A resolved handler's signal is propagated unchanged.
pub fn dispatch_line(line: &str, ctx: &mut CommandCtx<'_>) -> io::Result<ControlSignal> {
    let line = line.trim();
    let Some(token) = line.split_whitespace().next() else {
        return Ok(ControlSignal::Stay);
    };
    let args = line[token.len()..].trim_start();

    let commands = ctx.commands;
    match commands.resolve(token) {
        Some(cmd) => (cmd.handler())(args, ctx),
        None => {
            writeln!(ctx.out, "unknown command: {token}")?;
            Ok(ControlSignal::Stay)
        }
    }
}
