use clap::Parser;
use std::process;

use choreboard::cli::commands::{Cli, Commands};
use choreboard::cli::{self, Globals};

fn main() {
    dotenvy::dotenv().ok();
    if let Err(e) = choreboard::logging::init() {
        eprintln!("Warning: logging disabled: {e}");
    }

    let cli_args = Cli::parse();
    let globals = Globals {
        json: cli_args.json,
        db: cli_args.db,
        now: cli_args.now,
    };

    let exit_code = match cli_args.command {
        Commands::Init => cli::init::run(&globals),
        Commands::Household(cmd) => cli::household::run(cmd, &globals),
        Commands::Member(cmd) => cli::member::run(cmd, &globals),
        Commands::Template(cmd) => cli::template::run(cmd, &globals),
        Commands::Generate { today, window_days, household } => {
            cli::generate::run(today.as_deref(), window_days, household.as_deref(), &globals)
        }
        Commands::Offer(cmd) => cli::offer::run(cmd, &globals),
        Commands::Assignment(cmd) => cli::assignment::run(cmd, &globals),
        Commands::Events(cmd) => cli::events::run(cmd, &globals),
        Commands::Run { iterations } => cli::run::run(iterations, &globals),
    };

    process::exit(exit_code);
}
