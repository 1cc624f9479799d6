use std::cell::RefCell;
use std::io::Write;
use std::path::PathBuf;
use std::rc::Rc;

use anyhow::{bail, Context, Result};
use clap::Parser;
use sim6502::memory::{palette_index, pixel_coordinates, DISPLAY_SIDE, FRAME_BUFFER_START};
use sim6502::{HaltReason, HostEvents, RunState, Simulator, SimulatorConfig};
use tracing_subscriber::EnvFilter;

/// Assemble a 6502-family program and run it.
#[derive(Parser, Debug)]
#[command(name = "sim6502", version, about)]
struct Args {
    /// Assembly source file
    source: PathBuf,

    /// Data bus width in bits (8, 16 or 32)
    #[arg(long, default_value_t = 8)]
    width: u32,

    /// Give up after this many instructions
    #[arg(long, default_value_t = 1_000_000)]
    max_steps: u64,

    /// Instructions per run batch
    #[arg(long, default_value_t = sim6502::simulator::DEFAULT_BATCH_SIZE)]
    batch_size: u32,

    /// Seed for the random cell at $FE
    #[arg(long)]
    seed: Option<u64>,

    /// Print a hex dump of the assembled program
    #[arg(long)]
    hexdump: bool,

    /// Print a disassembly of the assembled program
    #[arg(long)]
    disassemble: bool,

    /// Print the label table
    #[arg(long)]
    labels: bool,

    /// Print the frame buffer after the run
    #[arg(long)]
    screen: bool,

    /// Start at this label or hex address instead of the origin
    #[arg(long)]
    goto: Option<String>,

    /// Log run control at debug level
    #[arg(short, long)]
    verbose: bool,
}

/// Prints WDM output as it happens.
struct ConsoleHost;

impl HostEvents for ConsoleHost {
    fn on_output(&mut self, value: u32) {
        let mut stdout = std::io::stdout();
        let _ = write!(stdout, "{}", char::from_u32(value).unwrap_or('?'));
        let _ = stdout.flush();
    }

    fn on_halt(&mut self, pc: u32, reason: &HaltReason) {
        eprintln!("program stopped at ${:X}: {}", pc, reason);
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    let default_level = if args.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let source = std::fs::read_to_string(&args.source)
        .with_context(|| format!("reading {}", args.source.display()))?;

    let mut sim = Simulator::new(SimulatorConfig {
        data_width: args.width,
        batch_size: args.batch_size,
        rng_seed: args.seed,
    })
    .context("invalid configuration")?;
    sim.set_host(Rc::new(RefCell::new(ConsoleHost)));

    let program = sim
        .assemble(&source)
        .with_context(|| format!("assembling {}", args.source.display()))?;
    eprintln!(
        "assembled {} cells at ${:04X}, {} label(s)",
        program.length,
        program.origin,
        program.labels.len()
    );
    for warning in &program.warnings {
        eprintln!("warning: {}", warning);
    }

    if args.labels {
        if let Some(labels) = sim.labels() {
            for label in labels.labels() {
                println!("{:<16} ${:04X}", label.name, label.address);
            }
        }
    }
    if args.hexdump {
        if let Some(dump) = sim.hexdump() {
            println!("{}", dump);
        }
    }
    if args.disassemble {
        if let Some(listing) = sim.disassembly() {
            println!("{}", listing);
        }
    }

    if let Some(target) = &args.goto {
        sim.goto(target).context("goto")?;
    }

    let batches = args.max_steps.div_ceil(args.batch_size as u64);
    sim.start();
    let mut state = RunState::Running;
    for _ in 0..batches {
        state = sim.run_batch();
        if state != RunState::Running {
            break;
        }
    }
    sim.stop();

    println!();
    println!("{}", sim.registers());

    if args.screen {
        print_screen(&sim);
    }

    match state {
        RunState::Halted(HaltReason::Fault(err)) => {
            let line = sim
                .source_line(err.pc())
                .map(|line| format!(" (line {})", line))
                .unwrap_or_default();
            bail!("execution fault{}: {}", line, err)
        }
        RunState::Running => bail!("no halt after {} instructions", args.max_steps),
        _ => Ok(()),
    }
}

/// ASCII rendering: one character per pixel, by palette index.
fn print_screen(sim: &Simulator) {
    const SHADES: &[u8; 16] = b" #+=-:.*%@&$oxOX";

    let mut rows = vec![vec![b' '; DISPLAY_SIDE as usize]; DISPLAY_SIDE as usize];
    for offset in 0..DISPLAY_SIDE * DISPLAY_SIDE {
        let address = FRAME_BUFFER_START + offset;
        if let Some((x, y)) = pixel_coordinates(address) {
            let shade = SHADES[palette_index(sim.memory().get(address)) as usize];
            rows[y as usize][x as usize] = shade;
        }
    }

    println!("+{}+", "-".repeat(DISPLAY_SIDE as usize));
    for row in rows {
        println!("|{}|", String::from_utf8_lossy(&row));
    }
    println!("+{}+", "-".repeat(DISPLAY_SIDE as usize));
}
