use clap::Parser;
use recordbeam::logging::{LogConfig, init_logging};
use recordbeam::{AggregateConfig, AggregateJob, LocalFs};
use std::process::exit;

/// Count and average durations per `(source, destination)` pair.
#[derive(Parser)]
#[command(name = "recordbeam-aggregate")]
struct Args {
    /// `<in> [<in>...] <out>`: files, directories or glob patterns, then the
    /// output directory
    paths: Vec<String>,

    /// Number of input splits and reduce partitions
    #[arg(long)]
    partitions: Option<usize>,

    /// Worker threads (default: one per core)
    #[arg(long)]
    threads: Option<usize>,

    /// Pre-aggregate each split before the shuffle
    #[arg(long)]
    combine: bool,

    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() {
    let args = Args::parse();
    init_logging(&LogConfig {
        verbose: args.verbose,
    });

    let mut config = match AggregateConfig::from_args(args.paths) {
        Ok(c) => c,
        Err(_) => {
            eprintln!("Usage: recordbeam-aggregate <in> [<in>...] <out>");
            exit(2);
        }
    };
    config.partitions = args.partitions;
    config.threads = args.threads;
    config.map_side_combine = args.combine;

    match AggregateJob::new(&config).run(&LocalFs) {
        Ok(_) => exit(0),
        Err(e) => {
            eprintln!("{e}");
            exit(1);
        }
    }
}
