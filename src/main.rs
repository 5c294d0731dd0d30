use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::{info, warn};

use market_scout::instrumentation::RunLogger;
use market_scout::session::{AddDomain, DEFAULT_DOMAINS};
use market_scout::{
    build_provider, render, shell, Config, DomainSet, PriceObjective, ProviderKind, SearchQuery,
};

#[derive(Parser)]
#[command(
    name = "market-scout",
    about = "Find products on the Lithuanian market that match a technical specification"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a single search and print the products found
    Search {
        /// Technical specification of the product you are looking for
        spec: Option<String>,

        /// Read the specification from a file
        #[arg(long, conflicts_with = "spec")]
        file: Option<PathBuf>,

        /// perplexity (single request) or openai (page discovery + per-page extraction)
        #[arg(short, long, default_value = "perplexity")]
        provider: ProviderKind,

        /// Secondary price to compute: none, unit, kg, liter or package
        #[arg(short, long, default_value = "none")]
        objective: PriceObjective,

        /// Unit label for the `unit` objective (e.g. tablet)
        #[arg(long)]
        unit: Option<String>,

        /// Extra search domain, repeatable
        #[arg(short, long = "domain")]
        domains: Vec<String>,

        /// Search only the domains given with --domain
        #[arg(long, requires = "domains")]
        only_domains: bool,

        /// Print the prompt sent to the provider
        #[arg(long)]
        show_prompt: bool,

        /// Print the raw provider responses
        #[arg(long)]
        show_raw: bool,
    },
    /// Start an interactive session with search history
    Shell {
        #[arg(short, long, default_value = "perplexity")]
        provider: ProviderKind,
    },
    /// Print the default search domains
    Domains,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "market_scout=debug,info" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_level.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = Config::from_env()?;
    let run_logger = config
        .run_log_dir
        .as_deref()
        .map(RunLogger::new)
        .transpose()?;

    match cli.command {
        Commands::Domains => {
            for domain in DEFAULT_DOMAINS {
                println!("{}", domain);
            }
        }
        Commands::Shell { provider } => {
            let provider = build_provider(provider, &config)?;
            let stdin = std::io::stdin();
            let session = shell::run(
                provider.as_ref(),
                run_logger.as_ref(),
                stdin.lock(),
                std::io::stdout(),
            )
            .await?;
            info!(searches = session.history().len(), "session ended");
        }
        Commands::Search {
            spec,
            file,
            provider,
            objective,
            unit,
            domains,
            only_domains,
            show_prompt,
            show_raw,
        } => {
            let spec = match (spec, file) {
                (Some(spec), _) => spec,
                (None, Some(path)) => std::fs::read_to_string(&path)
                    .context(format!("Failed to read specification file: {}", path.display()))?,
                (None, None) => anyhow::bail!("Provide a specification or --file <path>"),
            };

            let provider = build_provider(provider, &config)?;

            let mut domain_set = DomainSet::default();
            if only_domains {
                domain_set.replace(&domains);
            } else {
                for domain in &domains {
                    if domain_set.add(domain) == AddDomain::AlreadyPresent {
                        warn!(domain = %domain, "domain is already in the default list");
                    }
                }
            }

            let query = SearchQuery::new(&spec, domain_set.as_slice(), objective, unit.as_deref());
            eprintln!("Searching... (this may take 30-120 seconds)");

            let outcome = match provider.search(&query).await {
                Ok(outcome) => outcome,
                Err(e) => {
                    if let Some(raw) = e.raw_payload() {
                        eprintln!("Raw content:\n{}", raw);
                    }
                    return Err(e.into());
                }
            };

            if let Some(logger) = &run_logger {
                logger.write(&query.spec, &query.domains, &outcome.run)?;
            }

            if show_prompt {
                println!("{}\n", outcome.prompt);
            }
            print!("{}", render::pages(&outcome));
            print!("{}", render::products(&outcome.products));
            if show_raw {
                print!("\n{}", render::raw(&outcome));
            }
            eprintln!("{}", outcome.run.summary());
        }
    }

    Ok(())
}
