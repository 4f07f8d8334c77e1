mod batpu;
mod serve;
mod ui;

use std::io;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use batpu::errors::BatError;
use batpu::ports::SCREEN_SIZE;
use batpu::session::{DEFAULT_RUN_LIMIT, Session, SessionConfig, StateSnapshot};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "batpu", version, about = "BatPU-2 assembler, emulator and debugger")]
struct Cli {
    /// Default instruction limit for a run
    #[arg(long, global = true, env = "BATPU_MAX", default_value_t = DEFAULT_RUN_LIMIT)]
    max: u64,

    /// Fixed RNG seed, for reproducible runs
    #[arg(long, global = true, env = "BATPU_SEED")]
    seed: Option<u64>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run a program to completion and print the final state
    Run { file: PathBuf },
    /// Answer JSON requests on stdin, one per line
    Serve,
    /// Interactive terminal debugger
    Tui { file: PathBuf },
    /// Print the disassembly listing of a program
    Disasm { file: PathBuf },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    // the TUI owns the terminal, so it gets no stderr logger
    if !matches!(cli.command, Command::Tui { .. }) {
        init_tracing();
    }
    let config = SessionConfig { default_run_limit: cli.max, rng_seed: cli.seed };

    match execute(cli.command, config) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn execute(command: Command, config: SessionConfig) -> Result<ExitCode, BatError> {
    let mut session = Session::new(config);
    match command {
        Command::Run { file } => {
            load_file(&mut session, &file)?;
            let st = session.run(None);
            print_state(&st);
            if st.fault.is_some() {
                return Ok(ExitCode::FAILURE);
            }
        }
        Command::Serve => {
            let stdin = io::stdin().lock();
            serve::serve(&mut session, stdin, io::stdout().lock())?;
        }
        Command::Tui { file } => {
            load_file(&mut session, &file)?;
            let title = file.display().to_string();
            let mut terminal = ratatui::init();
            let result = ui::run(&mut terminal, ui::App::new(session, title));
            ratatui::restore();
            result?;
        }
        Command::Disasm { file } => {
            load_file(&mut session, &file)?;
            for line in session.disasm().disasm {
                println!("{:4}  {}  {}", line.addr, line.binary, line.text);
            }
        }
    }
    Ok(ExitCode::SUCCESS)
}

/// `.mc` files are machine code images, `.as`/`.asm` are assembly source.
fn load_file(session: &mut Session, path: &Path) -> Result<(), BatError> {
    let text = std::fs::read_to_string(path)?;
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
    let resp = match ext {
        "mc" => session.load_machine_code(&text),
        "as" | "asm" => session.load(&text),
        _ => return Err(BatError::FileType(path.display().to_string())),
    };
    if !resp.success {
        return Err(BatError::Load(resp.message));
    }
    tracing::info!(file = %path.display(), "{}", resp.message);
    Ok(())
}

fn print_state(st: &StateSnapshot) {
    match (&st.fault, st.stop_reason) {
        (Some(fault), _) => println!("fault: {fault}"),
        (None, Some(batpu::exec::StopReason::Limit)) => {
            println!("stopped after {} instructions (limit)", st.instructions)
        }
        _ => println!("halted after {} instructions", st.instructions),
    }
    println!("pc = {}", st.pc);
    for out in &st.outputs {
        println!("{out}");
    }
    println!(
        "flags: zero={} carry={}",
        st.flags.zero as u8, st.flags.carry as u8
    );
    if let Some(n) = st.number_display {
        println!("number: {n}");
    }
    if !st.char_buffer.is_empty() {
        println!("chars: {}", st.char_buffer);
    }
    if st.screen.iter().flatten().any(|&p| p != 0) {
        println!("+{}+", "-".repeat(SCREEN_SIZE));
        for row in &st.screen {
            let line: String = row.iter().map(|&p| if p != 0 { '█' } else { ' ' }).collect();
            println!("|{line}|");
        }
        println!("+{}+", "-".repeat(SCREEN_SIZE));
    }
}
