// Command-line interface for rollsync.
//
// Thin wrapper around the library: `encode` drives one encode call over
// files or stdio, `info` walks a produced token stream and prints a
// per-command summary. Everything substantive lives in the library.

use std::fs::File;
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};
use std::process;

use clap::{ArgAction, Args, Parser, Subcommand};

use crate::encode::{encode, EncodeStats};
use crate::token::{read_command, read_token_header, Command as Token};

const BUF_SIZE: usize = 64 * 1024;

// ---------------------------------------------------------------------------
// Clap CLI definition
// ---------------------------------------------------------------------------

/// Streaming rsync-style delta encoder with combined signing.
#[derive(Parser, Debug)]
#[command(
    name = "rollsync",
    version,
    about = "Delta-encode a stream against an old file's block signature",
    arg_required_else_help = true
)]
struct Cli {
    #[command(subcommand)]
    command: Cmd,

    /// Force overwrite existing output files.
    #[arg(short = 'f', long, global = true)]
    force: bool,

    /// Quiet mode (suppress non-error output).
    #[arg(short = 'q', long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    /// Verbose mode (use multiple times for more detail).
    #[arg(short = 'v', long, global = true, action = ArgAction::Count)]
    verbose: u8,

    /// Output stats as JSON to stderr.
    #[arg(long = "json", global = true)]
    json_output: bool,
}

#[derive(Subcommand, Debug)]
enum Cmd {
    /// Encode a delta-and-sign token stream.
    Encode(EncodeArgs),
    /// Print information about a token stream.
    Info(InfoArgs),
}

#[derive(Args, Debug)]
struct EncodeArgs {
    /// Signature stream of the old file.
    #[arg(short = 's', long = "signature")]
    signature: PathBuf,

    /// New file to encode (stdin when omitted).
    input: Option<PathBuf>,

    /// Token stream output (stdout when omitted).
    output: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct InfoArgs {
    /// Token stream to inspect.
    delta: PathBuf,
}

// ---------------------------------------------------------------------------
// Encode command
// ---------------------------------------------------------------------------

fn open_input(path: Option<&Path>) -> io::Result<Box<dyn Read>> {
    Ok(match path {
        Some(p) => Box::new(BufReader::with_capacity(BUF_SIZE, File::open(p)?)),
        None => Box::new(io::stdin().lock()),
    })
}

fn open_output(path: Option<&Path>, force: bool) -> io::Result<Box<dyn Write>> {
    Ok(match path {
        Some(p) => {
            if p.exists() && !force {
                return Err(io::Error::new(
                    io::ErrorKind::AlreadyExists,
                    format!("{} exists; use --force to overwrite", p.display()),
                ));
            }
            Box::new(BufWriter::with_capacity(BUF_SIZE, File::create(p)?))
        }
        None => Box::new(io::stdout().lock()),
    })
}

fn cmd_encode(cli: &Cli, args: &EncodeArgs) -> i32 {
    let sig_file = match File::open(&args.signature) {
        Ok(f) => f,
        Err(e) => {
            eprintln!("rollsync: {}: {e}", args.signature.display());
            return 1;
        }
    };
    let mut sig_reader = BufReader::with_capacity(BUF_SIZE, sig_file);

    let mut input = match open_input(args.input.as_deref()) {
        Ok(r) => r,
        Err(e) => {
            eprintln!("rollsync: input: {e}");
            return 1;
        }
    };
    let mut output = match open_output(args.output.as_deref(), cli.force) {
        Ok(w) => w,
        Err(e) => {
            eprintln!("rollsync: output: {e}");
            return 1;
        }
    };

    let stats = match encode(&mut input, &mut output, &mut sig_reader) {
        Ok(stats) => stats,
        Err(e) => {
            eprintln!("rollsync: encode error: {e}");
            return 1;
        }
    };
    if let Err(e) = output.flush() {
        eprintln!("rollsync: write flush error: {e}");
        return 1;
    }

    if cli.verbose > 0 && !cli.quiet {
        eprintln!(
            "rollsync: literal[{} cmds, {} bytes], signature[{} cmds, {} bytes], \
             copy[{} cmds, {} bytes]",
            stats.literal_cmds,
            stats.literal_bytes,
            stats.signature_cmds,
            stats.signature_bytes,
            stats.copy_cmds,
            stats.copy_bytes
        );
    }

    if cli.json_output {
        print_json_stats(&stats);
    }

    0
}

fn print_json_stats(stats: &EncodeStats) {
    let json = serde_json::json!({
        "command": "encode",
        "literal_cmds": stats.literal_cmds,
        "literal_bytes": stats.literal_bytes,
        "signature_cmds": stats.signature_cmds,
        "signature_bytes": stats.signature_bytes,
        "copy_cmds": stats.copy_cmds,
        "copy_bytes": stats.copy_bytes,
    });
    eprintln!("{}", serde_json::to_string_pretty(&json).unwrap());
}

// ---------------------------------------------------------------------------
// Info command
// ---------------------------------------------------------------------------

fn cmd_info(cli: &Cli, args: &InfoArgs) -> i32 {
    let file = match File::open(&args.delta) {
        Ok(f) => f,
        Err(e) => {
            eprintln!("rollsync: {}: {e}", args.delta.display());
            return 1;
        }
    };
    let mut reader = BufReader::with_capacity(BUF_SIZE, file);

    if let Err(e) = read_token_header(&mut reader) {
        eprintln!("rollsync: {e}");
        return 1;
    }

    let mut literal_bytes = 0u64;
    let mut copy_bytes = 0u64;
    let mut signature_bytes = 0u64;
    let mut commands = 0u64;
    loop {
        let cmd = match read_command(&mut reader) {
            Ok(cmd) => cmd,
            Err(e) => {
                eprintln!("rollsync: {e}");
                return 1;
            }
        };
        commands += 1;
        match cmd {
            Token::Literal(data) => {
                literal_bytes += data.len() as u64;
                if !cli.quiet {
                    println!("literal    {:>10} bytes", data.len());
                }
            }
            Token::Copy { offset, len } => {
                copy_bytes += u64::from(len);
                if !cli.quiet {
                    println!("copy       {len:>10} bytes @ {offset}");
                }
            }
            Token::Signature(payload) => {
                signature_bytes += payload.len() as u64;
                if !cli.quiet {
                    println!("signature  {:>10} bytes", payload.len());
                }
            }
            Token::End => {
                if !cli.quiet {
                    println!("end");
                }
                break;
            }
        }
    }

    if !cli.quiet {
        println!(
            "total: {commands} commands, {literal_bytes} literal bytes, \
             {copy_bytes} copied bytes, {signature_bytes} signature bytes"
        );
    }

    if cli.json_output {
        let json = serde_json::json!({
            "command": "info",
            "commands": commands,
            "literal_bytes": literal_bytes,
            "copy_bytes": copy_bytes,
            "signature_bytes": signature_bytes,
        });
        eprintln!("{}", serde_json::to_string_pretty(&json).unwrap());
    }

    0
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

/// Main CLI entry point. Parses arguments via clap, dispatches commands.
pub fn run() -> ! {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"))
        .format_timestamp(None)
        .format_target(false)
        .init();

    let cli = Cli::parse();

    let exit_code = match &cli.command {
        Cmd::Encode(args) => cmd_encode(&cli, args),
        Cmd::Info(args) => cmd_info(&cli, args),
    };

    process::exit(exit_code);
}
