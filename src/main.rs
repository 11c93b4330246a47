use std::fs::File;
use std::io::{self, BufRead, BufReader, Read, Write};
use std::path::{Path, PathBuf};
use std::process;

use anyhow::{Context, Result};
use clap::Parser as ClapParser;
use clap::Subcommand;
use env_logger::Builder;
use log::{debug, info};

use rox::ast_printer::AstPrinter;
use rox::scanner::Scanner;
use rox::sink::{Reporter, StderrReporter};
use rox::{Lox, Outcome};

#[derive(ClapParser, Debug)]
#[command(version, about = "Lox language interpreter", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    commands: Commands,

    /// Enable logging to app.log
    #[arg(long, global = true)]
    log: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Tokenizes input from a file, printing each token
    Tokenize { filename: PathBuf },

    /// Parses a Lox program and prints its syntax tree
    Parse {
        filename: PathBuf,

        /// Print the tree as JSON instead of s-expressions
        #[arg(long)]
        json: bool,
    },

    /// Evaluates input from a file as a single expression and prints the result
    Evaluate { filename: PathBuf },

    /// Runs input from a file as a Lox program
    Run { filename: PathBuf },

    /// Starts an interactive prompt
    Repl,
}

/// Reads a whole source file as UTF‑8.
fn read_file(filename: &Path) -> Result<String> {
    info!("Reading file: {:?}", filename);

    let file = File::open(filename).context(format!("Failed to open file {:?}", filename))?;
    let mut reader = BufReader::new(file);
    let mut buf = Vec::new();

    let bytes = reader
        .read_to_end(&mut buf)
        .context(format!("Failed to read file {:?}", filename))?;

    info!("Read {} bytes from {:?}", bytes, filename);

    String::from_utf8(buf).context(format!("{:?} is not valid UTF-8", filename))
}

fn init_logger() -> Result<()> {
    let log_file = File::create("app.log").context("Failed to create app.log")?;

    Builder::new()
        .format(|buf, record| {
            let module = record.module_path().unwrap_or("<unnamed>");
            let module = module.strip_prefix("rox::").unwrap_or(module);

            writeln!(
                buf,
                "[{}:{}] - {}",
                module,
                record.line().unwrap_or(0),
                record.args()
            )
        })
        .target(env_logger::Target::Pipe(Box::new(log_file)))
        .filter(None, log::LevelFilter::Debug)
        .parse_default_env() // RUST_LOG overrides the default level
        .init();

    info!("Logger initialized, writing to app.log");

    Ok(())
}

fn exit_with(outcome: Outcome) {
    if outcome != Outcome::Completed {
        debug!("Exiting with {:?}", outcome);
        process::exit(outcome.exit_code());
    }
}

fn tokenize(source: &str) {
    let mut reporter = StderrReporter;
    let mut tokenized = true;

    for token in Scanner::new(source) {
        match token {
            Ok(token) => println!("{}", token),
            Err(e) => {
                tokenized = false;
                reporter.report(&e);
            }
        }
    }

    if !tokenized {
        exit_with(Outcome::StaticError);
    }
}

fn parse(source: &str, json: bool) -> Result<()> {
    let mut lox = Lox::new();

    let Some(statements) = lox.parse(source) else {
        exit_with(Outcome::StaticError);
        return Ok(());
    };

    if json {
        let rendered =
            serde_json::to_string_pretty(&statements).context("Failed to serialise the AST")?;
        println!("{}", rendered);
    } else {
        for stmt in &statements {
            println!("{}", AstPrinter::print_stmt(stmt));
        }
    }

    Ok(())
}

fn repl() -> Result<()> {
    let mut lox = Lox::new();
    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();

    loop {
        print!("> ");
        io::stdout().flush().context("Failed to flush prompt")?;

        let Some(line) = lines.next() else {
            println!();
            break;
        };

        let line = line.context("Failed to read from stdin")?;

        // Errors are already reported; the session carries on.
        let outcome = lox.run(&line);
        debug!("REPL line finished: {:?}", outcome);
    }

    Ok(())
}

fn main() -> Result<()> {
    let args: Cli = Cli::parse();

    if args.log {
        init_logger()?;
    }

    info!("CLI arguments: {:?}", args);

    match args.commands {
        Commands::Tokenize { filename } => {
            info!("Running Tokenize subcommand");
            tokenize(&read_file(&filename)?);
        }

        Commands::Parse { filename, json } => {
            info!("Running Parse subcommand");
            parse(&read_file(&filename)?, json)?;
        }

        Commands::Evaluate { filename } => {
            info!("Running Evaluate subcommand");

            let source = read_file(&filename)?;
            let mut lox = Lox::new();

            match lox.evaluate(&source) {
                Ok(value) => println!("{}", value),
                Err(outcome) => exit_with(outcome),
            }
        }

        Commands::Run { filename } => {
            info!("Running Run subcommand");

            let source = read_file(&filename)?;
            let outcome = Lox::new().run(&source);

            info!("Run finished: {:?}", outcome);
            exit_with(outcome);
        }

        Commands::Repl => {
            info!("Running Repl subcommand");
            repl()?;
        }
    }

    Ok(())
}
