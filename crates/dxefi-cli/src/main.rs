#![forbid(unsafe_code)]

use std::fs::File;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::Parser;
use dxefi_console::{
    dispatch_line, register_global_cmds, CommandCtx, CommandRegistry, ControlSignal, EmuEngine,
    Session,
};
use dxefi_loader::ImageRegistry;

const MIB: usize = 1024 * 1024;

#[derive(Debug, Parser)]
#[command(
    name = "dxefi",
    about = "Interactive debugger console for the EFI DXE emulator"
)]
struct Args {
    /// JSON manifest of loaded-image records produced by the loader.
    #[arg(long)]
    images: PathBuf,

    /// Emulated RAM size in MiB.
    #[arg(long, default_value_t = 16)]
    ram: usize,

    /// Instruction budget per emulation slice.
    #[arg(long, default_value_t = 100_000)]
    slice_insts: u64,
}

/// Placeholder engine wired for the console's control contract; the real CPU
/// model attaches here. RAM goes through the fail-fast allocator so
/// exhaustion aborts with a recorded reason instead of surfacing as an error
/// nothing downstream is prepared to handle.
struct StubEngine {
    ram: Box<[u8]>,
    executed: u64,
    stop_requested: bool,
}

impl StubEngine {
    fn new(ram_mib: usize) -> Self {
        Self {
            ram: dxefi_mem::alloc_zeroed_bytes(ram_mib, MIB),
            executed: 0,
            stop_requested: false,
        }
    }

    /// Runs one emulation slice, or nothing if a stop was requested.
    fn run_slice(&mut self, budget: u64) {
        if self.stop_requested {
            tracing::info!("emulation stopped");
            return;
        }
        self.executed = self.executed.saturating_add(budget);
        tracing::debug!(executed = self.executed, "emulation slice complete");
    }
}

impl EmuEngine for StubEngine {
    fn request_stop(&mut self) {
        self.stop_requested = true;
    }
}

fn load_images(path: &Path) -> Result<ImageRegistry> {
    let file = File::open(path)
        .with_context(|| format!("failed to open image manifest: {}", path.display()))?;
    let images: ImageRegistry = serde_json::from_reader(file)
        .with_context(|| format!("failed to parse image manifest: {}", path.display()))?;
    if images.is_empty() {
        bail!("image manifest {} contains no images", path.display());
    }
    Ok(images)
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let args = Args::parse();
    let images = load_images(&args.images)?;
    tracing::info!(
        count = images.len(),
        "image registry loaded, primary target: {}",
        images
            .primary()
            .map(|i| i.file_path.as_str())
            .unwrap_or_default()
    );

    let mut registry = CommandRegistry::new();
    if let Err(err) = register_global_cmds(&mut registry) {
        // Collisions among the built-ins would be a packaging bug, but the
        // contract is report-and-continue, so the session still starts.
        tracing::error!("command registration failed: {err}");
    }

    let mut engine = StubEngine::new(args.ram);
    tracing::debug!(ram_bytes = engine.ram.len(), "engine ready");
    let mut session = Session::new();
    let mut started = false;

    let stdin = io::stdin();
    let mut stdout = io::stdout();
    let mut input = String::new();

    loop {
        write!(stdout, "(dxefi) ")?;
        stdout.flush()?;

        input.clear();
        if stdin.lock().read_line(&mut input)? == 0 {
            // EOF behaves like `quit`: stop the engine and end the session.
            engine.request_stop();
            break;
        }
        let line = input.trim();
        if line.is_empty() {
            continue;
        }
        session.history.push(line.to_string());

        let signal = dispatch_line(
            line,
            &mut CommandCtx {
                commands: &registry,
                engine: &mut engine,
                session: &mut session,
                images: &images,
                out: &mut stdout,
            },
        )?;

        match signal {
            ControlSignal::Stay => {
                // `run` only marks intent; the driver owns the gate. The
                // manifest is non-empty by construction, so the remaining
                // condition is not having started already.
                if session.run_pending && !started {
                    started = true;
                    session.run_pending = false;
                    tracing::info!("starting emulation");
                    engine.run_slice(args.slice_insts);
                } else if session.run_pending {
                    session.run_pending = false;
                    writeln!(stdout, "emulation already started")?;
                }
            }
            ControlSignal::Resume => {
                if session.exiting {
                    tracing::info!("session ended");
                    break;
                }
                engine.run_slice(args.slice_insts);
            }
        }
    }

    Ok(())
}
