use std::fs::File;
use std::io::{self, BufReader, BufWriter, Read};
use std::path::{Path, PathBuf};
use std::process;

use anyhow::{anyhow, bail, Context, Result};
use clap::{ArgGroup, Args, Parser, Subcommand, ValueEnum};
use polymorph::config::{self, ConfigError, Configuration};
use polymorph::generator::{self, DeriveError};
use polymorph::history::{Entry, History};
use polymorph::schema::{self, FormatVersion, Schema, SchemaError, SchemaKind};
use serde_json::json;
use tracing_subscriber::EnvFilter;
use zeroize::Zeroize;

/// CLI for deterministic password derivation.
#[derive(Debug, Parser)]
#[command(name = "polymorph", version, about = "Deterministic password derivation using scrypt")]
struct Cli {
    /// Log derivation stages to stderr
    #[arg(long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Derive the password for a domain
    Derive(DeriveArgs),
    /// Inspect or edit a history file
    #[command(subcommand)]
    History(HistoryCommand),
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum CliSchema {
    Safe,
    Alpha,
}

impl From<CliSchema> for SchemaKind {
    fn from(value: CliSchema) -> Self {
        match value {
            CliSchema::Safe => SchemaKind::Safe,
            CliSchema::Alpha => SchemaKind::Alphanumeric,
        }
    }
}

#[derive(Debug, Args)]
struct SchemaArgs {
    /// Password schema
    #[arg(long, value_enum, default_value_t = CliSchema::Safe)]
    schema: CliSchema,

    /// Password length
    #[arg(long, value_name = "INT", default_value_t = schema::DEFAULT_SIZE)]
    size: u32,

    /// Schema format version
    #[arg(long = "format-version", value_name = "UINT", default_value_t = FormatVersion::CURRENT.as_u32())]
    format_version: u32,
}

impl SchemaArgs {
    fn to_schema(&self) -> Result<(Schema, FormatVersion), SchemaError> {
        let version = FormatVersion::try_from(self.format_version)?;
        let schema = Schema::new(self.schema.into(), self.size, version)?;
        Ok((schema, version))
    }
}

#[derive(Debug, Args)]
struct CostArgs {
    /// Extra code appended to the master secret
    #[arg(long, env = "POLYMORPH_CODE", value_name = "STRING", default_value = config::DEFAULT_EXTRA_CODE, hide_env_values = true)]
    code: String,

    /// Base 2 logarithm of the scrypt cost N
    #[arg(long = "log-n", value_name = "UINT", default_value_t = config::DEFAULT_LOG_COST)]
    log_n: u8,

    /// scrypt block size r
    #[arg(short = 'r', value_name = "UINT", default_value_t = config::DEFAULT_BLOCK_SIZE)]
    block_size: u32,

    /// scrypt parallelism p
    #[arg(short = 'p', value_name = "UINT", default_value_t = config::DEFAULT_PARALLELISM)]
    parallelism: u32,
}

impl CostArgs {
    fn to_config(&self) -> Result<Configuration, ConfigError> {
        Configuration::new(self.log_n, self.block_size, self.parallelism, self.code.as_str())
    }
}

#[derive(Debug, Args)]
#[command(group(
    ArgGroup::new("master_input")
        .required(true)
        .args(["master", "master_prompt", "master_stdin"])
))]
struct DeriveArgs {
    /// Domain the password is for
    #[arg(long, value_name = "STRING")]
    domain: String,

    #[command(flatten)]
    schema: SchemaArgs,

    /// Take the schema from the entry for --domain in this history file
    #[arg(long = "from-history", value_name = "FILE")]
    from_history: Option<PathBuf>,

    #[command(flatten)]
    cost: CostArgs,

    /// Master secret provided directly (dangerous)
    #[arg(long, value_name = "STRING")]
    master: Option<String>,

    /// Prompt for master secret on the TTY (preferred)
    #[arg(long = "master-prompt")]
    master_prompt: bool,

    /// Read entire stdin as master secret
    #[arg(long = "master-stdin")]
    master_stdin: bool,

    /// Print a JSON object with details instead of plain password
    #[arg(long)]
    json: bool,
}

#[derive(Debug, Subcommand)]
enum HistoryCommand {
    /// List entries, sorted
    List {
        #[arg(long, value_name = "FILE")]
        file: PathBuf,

        /// Print the raw JSON history
        #[arg(long)]
        json: bool,
    },
    /// Add an entry (creates the file if missing)
    Add(EntryArgs),
    /// Remove an entry
    Remove(EntryArgs),
}

#[derive(Debug, Args)]
struct EntryArgs {
    #[arg(long, value_name = "FILE")]
    file: PathBuf,

    #[arg(long, value_name = "STRING")]
    domain: String,

    #[command(flatten)]
    schema: SchemaArgs,
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    let exit_code = match run(cli) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("error: {:#}", err);
            4
        }
    };
    process::exit(exit_code);
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "polymorph=debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn run(cli: Cli) -> Result<i32> {
    match cli.command {
        Commands::Derive(args) => handle_derive(args),
        Commands::History(cmd) => handle_history(cmd),
    }
}

fn handle_derive(args: DeriveArgs) -> Result<i32> {
    let domain = args.domain.as_str();
    if domain.is_empty() {
        eprintln!("invalid input: --domain must be nonempty");
        return Ok(2);
    }

    let config = match args.cost.to_config() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("invalid configuration: {}", e);
            return Ok(2);
        }
    };

    let schema = match &args.from_history {
        Some(path) => match schema_from_history(path, domain) {
            Ok(s) => s,
            Err(e) => {
                eprintln!("invalid history: {:#}", e);
                return Ok(2);
            }
        },
        None => match args.schema.to_schema() {
            Ok((s, _)) => s,
            Err(e) => {
                eprintln!("invalid input: {}", e);
                return Ok(2);
            }
        },
    };

    // Resolve master secret via exactly one method (clap group enforces one)
    let mut master = match (args.master, args.master_prompt, args.master_stdin) {
        (Some(m), false, false) => m,
        (None, true, false) => read_master_prompt()?,
        (None, false, true) => read_master_stdin()?,
        _ => unreachable!("clap ArgGroup enforces exclusivity"),
    };

    if master.is_empty() {
        eprintln!("invalid input: master secret must be nonempty");
        return Ok(2);
    }

    let result = generator::derive(&schema, domain, &master, &config);

    // Zeroize master ASAP after derivation returns
    master.zeroize();

    match result {
        Ok(mut password) => {
            if args.json {
                let out = json!({
                    "password": password,
                    "domain": domain,
                    "schema": schema.name(),
                    "size": schema.size(),
                    "log_n": config.log_cost(),
                    "r": config.block_size(),
                    "p": config.parallelism(),
                });
                println!("{}", out);
            } else {
                println!("{}", password);
            }
            password.zeroize();
            Ok(0)
        }
        Err(e @ (DeriveError::Config(_) | DeriveError::Kdf(_))) => {
            eprintln!("configuration error: {}", e);
            Ok(4)
        }
        Err(DeriveError::Schema(e)) => {
            eprintln!("schema error: {}", e);
            Ok(2)
        }
    }
}

/// Schema stored for `domain`; fails unless exactly one entry matches.
fn schema_from_history(path: &Path, domain: &str) -> Result<Schema> {
    let history = load_history(path)?;
    let mut matches = history.for_domain(domain);
    let entry = matches
        .next()
        .ok_or_else(|| anyhow!("no entry for domain {:?} in {}", domain, path.display()))?;
    if matches.next().is_some() {
        bail!(
            "several entries for domain {:?} in {}; pass --schema and --size instead",
            domain,
            path.display()
        );
    }
    Ok(entry.schema)
}

fn handle_history(cmd: HistoryCommand) -> Result<i32> {
    match cmd {
        HistoryCommand::List { file, json } => {
            let history = match load_history(&file) {
                Ok(h) => h,
                Err(e) => {
                    eprintln!("invalid history: {:#}", e);
                    return Ok(2);
                }
            };
            if json {
                history.save_to(io::stdout().lock())?;
                println!();
            } else {
                for entry in history.entries() {
                    println!("{}\t{}", entry.domain, entry.schema);
                }
            }
            Ok(0)
        }
        HistoryCommand::Add(args) | HistoryCommand::Remove(args) if args.domain.is_empty() => {
            eprintln!("invalid input: --domain must be nonempty");
            Ok(2)
        }
        HistoryCommand::Add(args) => edit_history(args, true),
        HistoryCommand::Remove(args) => edit_history(args, false),
    }
}

fn edit_history(args: EntryArgs, add: bool) -> Result<i32> {
    let (schema, version) = match args.schema.to_schema() {
        Ok(s) => s,
        Err(e) => {
            eprintln!("invalid input: {}", e);
            return Ok(2);
        }
    };

    let mut history = if add && !args.file.exists() {
        History::new()
    } else {
        match load_history(&args.file) {
            Ok(h) => h,
            Err(e) => {
                eprintln!("invalid history: {:#}", e);
                return Ok(2);
            }
        }
    };

    let entry = Entry::with_version(args.domain, schema, version);
    let changed = if add {
        history.add(entry)
    } else {
        history.remove(&entry)
    };

    if changed {
        let file = File::create(&args.file)
            .with_context(|| format!("failed to create {}", args.file.display()))?;
        history
            .save_to(BufWriter::new(file))
            .with_context(|| format!("failed to write {}", args.file.display()))?;
    }
    tracing::debug!(changed, entries = history.len(), "history updated");
    Ok(0)
}

fn load_history(path: &Path) -> Result<History> {
    let file = File::open(path).with_context(|| format!("failed to open {}", path.display()))?;
    History::load_from(BufReader::new(file))
        .with_context(|| format!("failed to load {}", path.display()))
}

fn read_master_prompt() -> Result<String> {
    #[cfg(feature = "tty")]
    {
        let prompt = "Master: ";
        let master = rpassword::prompt_password(prompt).context("failed to read TTY password")?;
        Ok(master)
    }

    #[cfg(not(feature = "tty"))]
    {
        Err(anyhow!(
            "--master-prompt requested but binary built without 'tty' feature (enable with --features tty)"
        ))
    }
}

fn read_master_stdin() -> Result<String> {
    let mut buf = String::new();
    io::stdin()
        .read_to_string(&mut buf)
        .context("failed to read from stdin")?;
    // Keep as provided (no trim), but normalize Windows CRLF
    if buf.ends_with('\n') {
        while buf.ends_with('\n') || buf.ends_with('\r') {
            buf.pop();
        }
    }
    Ok(buf)
}
