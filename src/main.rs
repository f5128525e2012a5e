// Main entry point for the anniversaries CLI
// Maps command-line flags onto a request, builds the plan and runs it

use anniversaries::query::parser::{parse_sort_keys, Condition};
use anniversaries::{Config, Interpreter, QueryExecutor, RenderMode, Request, Store};
use anyhow::{Context, Result};
use clap::Parser as ClapParser;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

const EXAMPLES: &str = "\
Examples:
  anniversaries                                  list everything, oldest date first
  anniversaries 12                               show entry 12
  anniversaries --where who = Nabi               filter (column, operator, value)
  anniversaries -w who = ahmad --and type = marriage
  anniversaries --ord +date,-who --lim 3         sort, then take a page
  anniversaries --add --who Joe --date 2024-12-23 --type birthday --note 'a note'
  anniversaries 12 --mod --date 2025-12-23
  anniversaries --del 12";

/// Query and edit a personal table of anniversaries
#[derive(ClapParser, Debug)]
#[command(name = "anniversaries", author, version, about, long_about = None, after_help = EXAMPLES)]
struct Args {
    /// Row id of a specific entry
    id: Option<i64>,

    /// Insert a new entry from --who/--date/--type/--note
    #[arg(short = 'a', long = "add")]
    insert: bool,

    /// Update the entry given by ID with --who/--date/--type/--note
    #[arg(short = 'm', long = "mod")]
    update: bool,

    /// Delete the entry with this row id
    #[arg(short = 'd', long = "del", value_name = "ID")]
    delete: Option<i64>,

    /// Name for the anniversary
    #[arg(long)]
    who: Option<String>,

    /// Date for the anniversary (YYYY-MM-DD)
    #[arg(long)]
    date: Option<String>,

    /// Type for the anniversary
    #[arg(long = "type")]
    kind: Option<String>,

    /// Note for the anniversary
    #[arg(long)]
    note: Option<String>,

    /// Filter condition
    #[arg(short = 'w', long = "where", num_args = 3, value_names = ["COLUMN", "OP", "VALUE"], allow_hyphen_values = true)]
    filter: Option<Vec<String>>,

    /// Extra condition joined with AND
    #[arg(long = "and", num_args = 3, value_names = ["COLUMN", "OP", "VALUE"], allow_hyphen_values = true)]
    and: Option<Vec<String>>,

    /// Extra condition joined with OR
    #[arg(long = "or", num_args = 3, value_names = ["COLUMN", "OP", "VALUE"], allow_hyphen_values = true)]
    or: Option<Vec<String>>,

    /// Sort keys: +col ascending, -col descending, comma separated or repeated
    #[arg(short = 'o', long = "ord", value_name = "KEY", value_delimiter = ',', allow_hyphen_values = true)]
    order: Vec<String>,

    /// Maximum number of entries to show
    #[arg(short = 'l', long = "lim", value_name = "N")]
    limit: Option<u64>,

    /// Number of entries to skip before the limit
    #[arg(long = "ofs", value_name = "N")]
    offset: Option<u64>,

    /// Run this SQL as is
    #[arg(long = "sql", value_name = "SQL")]
    raw: Option<String>,

    /// Path of the anniversaries database
    #[arg(long, env = "ANNIVERSARIES_DB", value_name = "PATH")]
    db: Option<PathBuf>,

    /// Render mode for lists: column or line
    #[arg(long, value_name = "MODE")]
    mode: Option<RenderMode>,

    /// Configuration file path
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Print the plan as JSON instead of running it
    #[arg(long)]
    dry_run: bool,

    /// Enable verbose output
    #[arg(short = 'v', long)]
    verbose: bool,
}

impl Args {
    /// Turn the raw flag values into a typed request
    fn to_request(&self) -> anniversaries::Result<Request> {
        let condition = |tokens: &Option<Vec<String>>| {
            tokens.as_deref().map(Condition::parse).transpose()
        };

        Ok(Request {
            id: self.id,
            insert: self.insert,
            update: self.update,
            delete: self.delete,
            who: self.who.clone(),
            date: self.date.clone(),
            kind: self.kind.clone(),
            note: self.note.clone(),
            filter: condition(&self.filter)?,
            and: condition(&self.and)?,
            or: condition(&self.or)?,
            order: parse_sort_keys(&self.order)?,
            limit: self.limit,
            offset: self.offset,
            raw: self.raw.clone(),
        })
    }
}

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<()> {
    let args = Args::parse();

    init_logging(args.verbose);

    let config = load_config(&args)?;
    let request = args.to_request()?;
    let plan = Interpreter::new(&config).build(&request)?;

    if args.dry_run {
        println!("{}", serde_json::to_string_pretty(&plan)?);
        return Ok(());
    }

    let store = Store::open(&config.store_location)
        .with_context(|| format!("cannot open {}", config.store_location.display()))?;
    let executor = QueryExecutor::new(store);

    for result in executor.execute(&plan)? {
        let output = result.format(plan.render_mode);
        if !output.is_empty() {
            println!("{}", output);
        }
    }

    if let Some(message) = &plan.message {
        println!("{}", message);
    }

    Ok(())
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("anniversaries=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("anniversaries=warn"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .init();
}

fn load_config(args: &Args) -> Result<Config> {
    let mut config = match &args.config {
        Some(path) => Config::from_file(path)?,
        None => Config::load_default()?,
    };

    // Command line wins over the config file
    if let Some(db) = &args.db {
        config.store_location = db.clone();
    }
    if let Some(mode) = args.mode {
        config.default_render_mode = mode;
    }

    Ok(config)
}
