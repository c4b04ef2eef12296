use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod commands;

#[derive(Parser)]
#[command(name = "certguard")]
#[command(version, about = "Certificate enrollment policy CLI", long_about = None)]
struct Cli {
    /// Log evaluation stages (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Policy validation and management
    Policy {
        #[command(subcommand)]
        command: PolicyCommands,
    },
    /// Evaluate a certificate request against a policy
    Evaluate {
        /// Policy document (.toml, .yaml)
        #[arg(long)]
        policy: PathBuf,

        /// Certificate request (.toml, .yaml)
        #[arg(long)]
        request: PathBuf,

        /// Resolved directory account of the requester
        #[arg(long)]
        directory: Option<PathBuf>,

        /// Verified key attestation attributes
        #[arg(long)]
        attestation: Option<PathBuf>,

        /// Certificate template name
        #[arg(long, default_value = "default")]
        template: String,

        /// Evaluation time in Unix seconds (defaults to now)
        #[arg(long)]
        now: Option<u64>,

        /// Latest expiration the CA issues, in Unix seconds
        #[arg(long)]
        ca_max_not_after: Option<u64>,
    },
}

#[derive(Subcommand)]
enum PolicyCommands {
    /// Validate a policy file
    Check {
        /// Path to the policy file (.toml, .yaml)
        file: PathBuf,
    },
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_level.into()),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Policy { command } => match command {
            PolicyCommands::Check { file } => {
                commands::policy::check(&file)?;
            }
        },
        Commands::Evaluate {
            policy,
            request,
            directory,
            attestation,
            template,
            now,
            ca_max_not_after,
        } => {
            let args = commands::evaluate::EvaluateArgs {
                policy,
                request,
                directory,
                attestation,
                template,
                now,
                ca_max_not_after,
            };
            if !commands::evaluate::run(&args)? {
                std::process::exit(1);
            }
        }
    }

    Ok(())
}
