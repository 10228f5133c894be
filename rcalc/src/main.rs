use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use miette::{MietteHandlerOpts, Result};
use rcalc_interpreter::{CalculatorSession, LookupStrategy, OperatorMap, standard_operator_map};
use std::process;
use tracing_subscriber::EnvFilter;

mod render;
mod repl;

#[derive(Parser)]
#[command(
    name = "rcalc",
    version,
    about = "RPN calculator with typed operator dispatch",
    long_about = "RCalc evaluates RPN input against operator tables built from typed implementations, \
                  widened and reversed into every signature they can serve."
)]
struct Cli {
    /// How operator names are looked up
    #[arg(long, value_enum, default_value_t = Lookup::Ordered, global = true)]
    lookup: Lookup,

    /// Increase log output (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// List every operator by category
    Ops,

    /// Show the dispatch table of one operator
    Table {
        /// Operator name, case-insensitive
        operator: String,
    },

    /// Show implementation counts
    Stats,

    /// Evaluate RPN input and print the resulting stack
    Eval {
        /// Values and operators, e.g. `2 3 +`
        #[arg(required = true, allow_hyphen_values = true, value_name = "TOKEN")]
        input: Vec<String>,

        /// Show the type of every stack level
        #[arg(short, long)]
        types: bool,
    },

    /// Start an interactive session
    Repl {
        /// Do not read or write the history file
        #[arg(long)]
        no_history: bool,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Lookup {
    Ordered,
    PerfectHash,
}

impl From<Lookup> for LookupStrategy {
    fn from(lookup: Lookup) -> Self {
        match lookup {
            Lookup::Ordered => LookupStrategy::Ordered,
            Lookup::PerfectHash => LookupStrategy::PerfectHash,
        }
    }
}

fn main() {
    setup_miette_handler();

    let cli = Cli::parse();
    setup_logging(cli.verbose);

    let Some(command) = cli.command else {
        Cli::parse_from(["rcalc", "--help"]);
        return;
    };

    if let Err(report) = run(command, cli.lookup.into()) {
        eprintln!("{report:?}");
        process::exit(1);
    }
}

fn run(command: Commands, lookup: LookupStrategy) -> Result<()> {
    match command {
        Commands::Ops => {
            println!("{}", render::operators(&operator_map(lookup)?));
        }
        Commands::Table { operator } => {
            let map = operator_map(lookup)?;
            let registry = map
                .operator(&operator)
                .ok_or_else(|| miette::miette!("Unknown operator: {operator}"))?;
            println!("{}", render::table(registry));
        }
        Commands::Stats => {
            println!("{}", render::stats(&operator_map(lookup)?));
        }
        Commands::Eval { input, types } => {
            let mut session = CalculatorSession::new(operator_map(lookup)?);
            let line = input.join(" ");
            session
                .eval_line(&line)
                .map_err(|error| miette::Report::new(error).with_source_code(line.clone()))?;
            for level in render::stack(session.stack(), types, usize::MAX) {
                println!("{level}");
            }
        }
        Commands::Repl { no_history } => {
            let config = repl::ReplConfig {
                persist_history: !no_history,
                lookup,
                ..Default::default()
            };
            repl::ReplSession::with_config(config)?.run()?;
        }
    }
    Ok(())
}

fn operator_map(lookup: LookupStrategy) -> Result<OperatorMap> {
    let map = standard_operator_map(lookup)?;
    tracing::info!(stats = %map.stats(), strategy = ?map.strategy(), "loaded operators");
    Ok(map)
}

/// Configure miette for error reporting
fn setup_miette_handler() {
    miette::set_hook(Box::new(|_| {
        Box::new(
            MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(true)
                .tab_width(4)
                .with_cause_chain()
                .build(),
        )
    }))
    .ok();
}

/// `RUST_LOG` wins over `-v`
fn setup_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)))
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
