use anyhow::{Context, Result};
use chrono::Local;
use clap::Parser;
use env_logger::Builder;
use kls2kla::{convert_kls_to_kla, ConvertOptions};
use log::{error, info, LevelFilter};
use std::io::Write;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about = "Keylayer Script to KLA automaton compiler", long_about = None)]
struct Args {
    /// Input KLS file path
    input: PathBuf,

    /// Output directory (defaults to the input file's directory)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Also export each variant as a .keylayout file
    #[arg(long)]
    keylayout: bool,

    /// Build on top of a previously shipped .kla document
    #[arg(long, value_name = "FILE")]
    base: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn init_logging(verbose: bool) {
    let level = if verbose { LevelFilter::Debug } else { LevelFilter::Info };

    Builder::new()
        .format(|buf, record| {
            writeln!(
                buf,
                "{} [{}] {} - {}",
                Local::now().format("%H:%M:%S%.3f"),
                record.level(),
                record.target(),
                record.args()
            )
        })
        .filter_level(level)
        .init();
}

fn run(args: Args) -> Result<()> {
    let output_dir = args.output.unwrap_or_else(|| {
        args.input
            .parent()
            .map(|p| p.to_path_buf())
            .unwrap_or_else(|| PathBuf::from("."))
    });

    info!("Converting {} into {}", args.input.display(), output_dir.display());

    let options = ConvertOptions {
        keylayout: args.keylayout,
        base: args.base,
    };
    let written = convert_kls_to_kla(&args.input, &output_dir, &options)
        .with_context(|| format!("Failed to convert {}", args.input.display()))?;

    info!("Conversion successful: {} file(s) written", written.len());
    Ok(())
}

fn main() {
    let args = Args::parse();
    init_logging(args.verbose);

    if let Err(e) = run(args) {
        error!("{:#}", e);
        std::process::exit(1);
    }
}
