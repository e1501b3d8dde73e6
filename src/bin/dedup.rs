use clap::Parser;
use recordbeam::logging::{LogConfig, init_logging};
use recordbeam::{DedupConfig, DedupPipeline, JsonDirStore, LocalFs, PipelineError, ShortRowPolicy};
use std::path::PathBuf;
use std::process::exit;

const USAGE: &str = "recordbeam-dedup R=<file> select:R<1>,<gt>,<5.1> distinct:<R2,R3,R5>";

/// Filter, project and deduplicate a `|`-delimited file into a table.
#[derive(Parser)]
#[command(name = "recordbeam-dedup", override_usage = USAGE)]
struct Args {
    /// `R=<file>`
    input: Option<String>,
    /// `select:R<col>,<op>,<threshold>`
    select: Option<String>,
    /// `distinct:R<col>,R<col>,...`
    distinct: Option<String>,

    /// Directory holding the table store
    #[arg(long, default_value = "store")]
    store: PathBuf,

    /// Table to replace
    #[arg(long, default_value = recordbeam::sink::DEFAULT_TABLE)]
    table: String,

    /// Drop lines that are too short instead of failing the run
    #[arg(long)]
    skip_short_rows: bool,

    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn run(args: Args) -> Result<(), PipelineError> {
    let (Some(input), Some(select), Some(distinct)) = (args.input, args.select, args.distinct)
    else {
        return Err(PipelineError::Argument(USAGE.to_string()));
    };
    let mut config = DedupConfig::from_tokens(&input, &select, &distinct)?;
    config.table = args.table;
    if args.skip_short_rows {
        config.short_rows = ShortRowPolicy::Skip;
    }

    let mut store = JsonDirStore::open(&args.store)?;
    DedupPipeline::new(&config).run(&LocalFs, &mut store)?;
    println!("write table success");
    Ok(())
}

fn main() {
    let args = Args::parse();
    init_logging(&LogConfig {
        verbose: args.verbose,
    });
    if let Err(e) = run(args) {
        println!("{e}");
        exit(e.exit_code());
    }
}
