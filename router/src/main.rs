use std::io::{self, BufRead, Write};

use anyhow::Result;
use clap::Parser;
use log::info;
use ledger_tables_router::{OutputFormat, Router, RouterConfig, SystemClock};

#[derive(Parser, Debug)]
#[clap(author, version, about = "Append-only history tables keyed by composite keys")]
struct Args {
    /// Config file path
    #[clap(short, long, env = "LEDGER_TABLES_CONFIG")]
    config: Option<String>,

    /// Output format for query results
    #[clap(short, long, value_enum)]
    output: Option<OutputFormat>,

    /// Define the router tables before running commands
    #[clap(long)]
    bootstrap: bool,

    /// Command to run; reads one command per stdin line when omitted
    command: Option<String>,

    /// Command arguments
    #[clap(trailing_var_arg = true, allow_hyphen_values = true)]
    args: Vec<String>,
}

fn main() -> Result<()> {
    // Parse command-line arguments
    let args = Args::parse();

    // Load configuration
    let mut config = RouterConfig::new();
    if let Some(config_path) = &args.config {
        config = RouterConfig::from_file(config_path)?;
    }

    // Override config with command-line arguments
    if let Some(output) = args.output {
        config.output = output;
    }

    // Initialize logging
    env_logger::init_from_env(
        env_logger::Env::default().filter_or(env_logger::DEFAULT_FILTER_ENV, &config.store.log_level),
    );

    let router = Router::new(config, SystemClock)?;
    if args.bootstrap {
        router.bootstrap()?;
    }

    match &args.command {
        Some(command) => {
            let response = router.dispatch(command, args.args.as_slice())?;
            if let Some(text) = router.render(response)? {
                println!("{}", text);
            }
        }
        None => run_lines(&router)?,
    }

    Ok(())
}

/// Run one command per stdin line, committing each on its own
fn run_lines(router: &Router) -> Result<()> {
    let stdin = io::stdin();
    let mut stdout = io::stdout().lock();
    let mut handled = 0usize;

    for line in stdin.lock().lines() {
        let line = line?;
        let mut words = line.split_whitespace();
        let Some(command) = words.next() else {
            continue;
        };
        let args: Vec<&str> = words.collect();

        match router.dispatch(command, args.as_slice()).and_then(|response| router.render(response)) {
            Ok(Some(text)) => writeln!(stdout, "{}", text)?,
            Ok(None) => {}
            Err(e) => eprintln!("{}: {}", command, e),
        }
        handled += 1;
    }

    info!("Processed {} commands", handled);
    Ok(())
}
