//! Built-in command set: session control, help, history, and image
//! introspection. Sibling subsystems register their own commands next to
//! these through the same registry entry point.

use std::io::{self, Write};

use crate::dispatch::{CommandCtx, ControlSignal};
use crate::registry::{CommandRegistry, RegistryError};

/// Registers the global command set. Called once at session start, before any
/// sibling module adds its own commands.
pub fn register_global_cmds(registry: &mut CommandRegistry) -> Result<(), RegistryError> {
    registry.register("run", Some("r"), run_cmd, "Start emulating target.\n\nrun")?;
    registry.register("quit", Some("q"), quit_cmd, "Quit emulator.\n\nquit")?;
    registry.register("help", Some("h"), help_cmd, "Help.\n\nhelp")?;
    registry.register(
        "continue",
        Some("c"),
        continue_cmd,
        "Continue running.\n\ncontinue",
    )?;
    registry.register("info", None, info_cmd, "Info.\n\ninfo {target|all}")?;
    registry.register(
        "history",
        None,
        history_cmd,
        "Display command line history.\n\nhistory",
    )?;
    Ok(())
}

/// Marks a run as pending and stays in the loop. Actually starting emulation
/// is gated by the driver, which first confirms a target is loaded.
fn run_cmd(_args: &str, ctx: &mut CommandCtx<'_>) -> io::Result<ControlSignal> {
    ctx.session.run_pending = true;
    Ok(ControlSignal::Stay)
}

fn continue_cmd(_args: &str, _ctx: &mut CommandCtx<'_>) -> io::Result<ControlSignal> {
    Ok(ControlSignal::Resume)
}

/// Stops the engine and ends the session. The driver treats the returned
/// `Resume` as "exit" once it sees the session marked as exiting.
fn quit_cmd(_args: &str, ctx: &mut CommandCtx<'_>) -> io::Result<ControlSignal> {
    ctx.engine.request_stop();
    ctx.session.exiting = true;
    Ok(ControlSignal::Resume)
}

fn help_cmd(_args: &str, ctx: &mut CommandCtx<'_>) -> io::Result<ControlSignal> {
    let commands = ctx.commands;
    writeln!(ctx.out, "Available commands:")?;
    for (name, alias, help) in commands.list() {
        let summary = help.lines().next().unwrap_or_default();
        match alias {
            Some(alias) => writeln!(ctx.out, "  {name} ({alias}) -- {summary}")?,
            None => writeln!(ctx.out, "  {name} -- {summary}")?,
        }
    }
    Ok(ControlSignal::Stay)
}

fn history_cmd(_args: &str, ctx: &mut CommandCtx<'_>) -> io::Result<ControlSignal> {
    for (idx, line) in ctx.session.history.iter().enumerate() {
        writeln!(ctx.out, "{:>4}  {line}", idx + 1)?;
    }
    Ok(ControlSignal::Stay)
}

fn info_cmd_help(out: &mut dyn Write) -> io::Result<()> {
    writeln!(out, "\"info\" must be followed by the name of an info command.")?;
    writeln!(out, "List of info subcommands:")?;
    writeln!(out)?;
    writeln!(out, "info target -- Information about main binary")?;
    writeln!(out, "info all    -- Information about all mapped binaries")?;
    writeln!(out)
}

/// `info {target|all}`. A missing or unrecognized subcommand renders the
/// usage text; the image registry is guaranteed non-empty by the loader
/// before introspection runs.
fn info_cmd(args: &str, ctx: &mut CommandCtx<'_>) -> io::Result<ControlSignal> {
    let Some(subcommand) = args.split_whitespace().next() else {
        info_cmd_help(ctx.out)?;
        return Ok(ControlSignal::Stay);
    };

    let images = ctx.images;
    match subcommand {
        "target" => {
            let main_image = images
                .primary()
                .expect("loader contract: image registry populated before introspection");
            writeln!(ctx.out, "EFI Executable:")?;
            writeln!(ctx.out, "{}", main_image.file_path)?;
            writeln!(ctx.out, "Base address: 0x{:x}", main_image.base_addr)?;
            writeln!(
                ctx.out,
                "Entrypoint: 0x{:x} (0x{:x})",
                main_image.absolute_entry(),
                main_image.entrypoint
            )?;
            writeln!(ctx.out, "Image size: 0x{:x}", main_image.size)?;
            writeln!(ctx.out, "Number of sections: {}", main_image.nr_sections)?;
        }
        "all" => {
            assert!(
                !images.is_empty(),
                "loader contract: image registry populated before introspection"
            );
            for (idx, image) in images.iter().enumerate() {
                writeln!(ctx.out, "---[ Image #{:02} ]---", idx + 1)?;
                writeln!(ctx.out, "EFI Executable:")?;
                writeln!(ctx.out, "{}", image.file_path)?;
                writeln!(ctx.out, "Mapped address: 0x{:x}", image.mapped_addr)?;
                writeln!(ctx.out, "Mapped entrypoint: 0x{:x}", image.mapped_entry())?;
                writeln!(ctx.out, "Base address: 0x{:x}", image.base_addr)?;
                writeln!(
                    ctx.out,
                    "Entrypoint: 0x{:x} (0x{:x})",
                    image.absolute_entry(),
                    image.entrypoint
                )?;
                writeln!(ctx.out, "Image size: 0x{:x}", image.size)?;
                writeln!(ctx.out, "Number of sections: {}", image.nr_sections)?;
            }
        }
        _ => info_cmd_help(ctx.out)?,
    }
    Ok(ControlSignal::Stay)
}
