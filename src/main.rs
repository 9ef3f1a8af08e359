use clap::Parser;
use std::process;
use tracing_subscriber::EnvFilter;

use shiftops::cli::commands::{Cli, Commands};
use shiftops::cli::{self, Context};

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli_args = Cli::parse();
    let ctx = Context::from_cli(&cli_args);

    let exit_code = match cli_args.command {
        Commands::Init { timezone } => cli::init::run(&timezone, &ctx),
        Commands::Dealership(cmd) => cli::dealership::run(cmd, &ctx),
        Commands::User(cmd) => cli::user::run(cmd, &ctx),
        Commands::Generator(cmd) => cli::generator::run(cmd, &ctx),
        Commands::Task(cmd) => cli::task::run(cmd, &ctx),
        Commands::Respond { task, user, status, comment } => {
            cli::respond::run(&task, &user, &status, comment.as_deref(), &ctx)
        }
        Commands::Shift(cmd) => cli::shift::run(cmd, &ctx),
        Commands::Setting(cmd) => cli::setting::run(cmd, &ctx),
        Commands::Sweep(cmd) => cli::sweep::run(cmd, &ctx),
    };

    process::exit(exit_code);
}
