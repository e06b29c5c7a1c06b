mod mapper;
mod transcript;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use lapkey_core::Board;
use log::{info, warn};
use std::fs;
use std::path::PathBuf;

use mapper::Matrix;

#[derive(Parser)]
#[command(name = "lapkey")]
#[command(about = "Laptop keyboard matrix mapper")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Turn an annotated scanner transcript into firmware keymap tables
    Map {
        /// Transcript: one `NAME [FN] PIN PIN` line per key
        transcript: PathBuf,
        /// Board the daughterboard carries, unless the transcript names one
        #[arg(short, long, default_value = "Teensy2", value_parser = parse_board)]
        board: Board,
        /// Write the generated keymap.rs here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// List supported boards and their FPC pin wiring
    Boards,
}

fn parse_board(name: &str) -> Result<Board, String> {
    Board::from_name(name).ok_or_else(|| {
        let known: Vec<&str> = Board::ALL.iter().map(|b| b.name()).collect();
        format!("unknown board `{}` (expected one of: {})", name, known.join(", "))
    })
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    match cli.command {
        Command::Map {
            transcript: input,
            board,
            output,
        } => {
            let contents = fs::read_to_string(&input)
                .with_context(|| format!("reading {}", input.display()))?;

            let parsed = transcript::parse(&contents, board).context("parsing transcript")?;
            let matrix = Matrix::derive(&parsed.entries).context("deriving matrix")?;

            info!("Row pins: {:?}", matrix.rows);
            info!("Column pins: {:?}", matrix.cols);

            let gaps = matrix.gaps();
            if !gaps.is_empty() {
                warn!(
                    "The following FPC pins appear to be unconnected: {:?}. Was everything wired up properly?",
                    gaps
                );
            }

            let source = mapper::render(&parsed, &matrix).context("generating keymap")?;
            match output {
                Some(path) => {
                    fs::write(&path, source)
                        .with_context(|| format!("writing {}", path.display()))?;
                    println!(
                        "Wrote {}x{} matrix for {} to {}",
                        matrix.rows.len(),
                        matrix.cols.len(),
                        parsed.board.name(),
                        path.display()
                    );
                }
                None => print!("{}", source),
            }
        }
        Command::Boards => {
            for board in Board::ALL {
                println!(
                    "{:<9} {} pins, LED on {}",
                    board.name(),
                    board.pin_count(),
                    board.led_pin()
                );
                let wiring: Vec<String> = board
                    .fpc_map()
                    .iter()
                    .enumerate()
                    .map(|(i, pin)| format!("{}:{}", i + 1, pin))
                    .collect();
                println!("          {}", wiring.join(" "));
            }
        }
    }

    Ok(())
}
