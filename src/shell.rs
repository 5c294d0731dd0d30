//! Interactive session: search repeatedly, tune domains and the price
//! objective, and browse the history of this session.

use anyhow::Result;
use std::io::{BufRead, Write};
use tracing::{info, warn};

use crate::instrumentation::RunLogger;
use crate::product::PriceObjective;
use crate::provider::{SearchProvider, SearchQuery};
use crate::render;
use crate::session::{AddDomain, Session};

const HELP: &str = "\
Type a technical specification and press Enter to search.

Commands:
  :domains              list the active search domains
  :add <domain>         add a search domain
  :remove <domain>      remove a search domain
  :reset                restore the default domains
  :objective <mode>     price objective: none, unit, kg, liter, package
  :unit <label>         custom unit label for the `unit` objective
  :history              show past searches
  :show <n>             show full details of history entry n (1 = newest)
  :prompt               show the prompt of the last search
  :raw                  show the raw provider responses of the last search
  :help                 show this help
  :quit                 leave the session
";

#[derive(Debug, Clone, PartialEq)]
pub enum ShellCommand {
    Search(String),
    Domains,
    Add(String),
    Remove(String),
    Reset,
    Objective(PriceObjective),
    Unit(Option<String>),
    History,
    Show(usize),
    Prompt,
    Raw,
    Help,
    Quit,
    Empty,
    Invalid(String),
}

pub fn parse_command(line: &str) -> ShellCommand {
    let line = line.trim();
    if line.is_empty() {
        return ShellCommand::Empty;
    }
    let Some(command) = line.strip_prefix(':') else {
        return ShellCommand::Search(line.to_string());
    };

    let (name, arg) = match command.split_once(char::is_whitespace) {
        Some((name, arg)) => (name, arg.trim()),
        None => (command, ""),
    };

    match (name, arg) {
        ("domains", _) => ShellCommand::Domains,
        ("add", "") | ("remove", "") => ShellCommand::Invalid(format!(":{} needs a domain", name)),
        ("add", domain) => ShellCommand::Add(domain.to_string()),
        ("remove", domain) => ShellCommand::Remove(domain.to_string()),
        ("reset", _) => ShellCommand::Reset,
        ("objective", mode) => match mode.parse() {
            Ok(objective) => ShellCommand::Objective(objective),
            Err(e) => ShellCommand::Invalid(e),
        },
        ("unit", "") => ShellCommand::Unit(None),
        ("unit", label) => ShellCommand::Unit(Some(label.to_string())),
        ("history", _) => ShellCommand::History,
        ("show", n) => match n.parse::<usize>() {
            Ok(n) if n > 0 => ShellCommand::Show(n),
            _ => ShellCommand::Invalid(":show needs a history number, e.g. :show 1".into()),
        },
        ("prompt", _) => ShellCommand::Prompt,
        ("raw", _) => ShellCommand::Raw,
        ("help", _) | ("h", _) => ShellCommand::Help,
        ("quit", _) | ("q", _) | ("exit", _) => ShellCommand::Quit,
        _ => ShellCommand::Invalid(format!("unknown command ':{}' (try :help)", name)),
    }
}

/// Runs the session until `:quit` or end of input.
pub async fn run(
    provider: &dyn SearchProvider,
    run_logger: Option<&RunLogger>,
    input: impl BufRead,
    mut out: impl Write,
) -> Result<Session> {
    let mut session = Session::new();
    writeln!(
        out,
        "Product search ({}). Type :help for commands.",
        provider.name()
    )?;

    for line in input.lines() {
        let line = line?;
        match parse_command(&line) {
            ShellCommand::Empty => continue,
            ShellCommand::Quit => break,
            ShellCommand::Help => write!(out, "{}", HELP)?,
            ShellCommand::Invalid(message) => writeln!(out, "{}", message)?,
            ShellCommand::Domains => {
                for domain in session.domains.as_slice() {
                    writeln!(out, "  {}", domain)?;
                }
                if session.domains.is_empty() {
                    writeln!(out, "  (no domains selected)")?;
                }
            }
            ShellCommand::Add(domain) => match session.domains.add(&domain) {
                AddDomain::Added => writeln!(out, "Added {}", domain.trim())?,
                AddDomain::AlreadyPresent => {
                    writeln!(out, "{} is already in the list", domain.trim())?
                }
                AddDomain::Empty => writeln!(out, ":add needs a domain")?,
            },
            ShellCommand::Remove(domain) => {
                if session.domains.remove(&domain) {
                    writeln!(out, "Removed {}", domain)?;
                } else {
                    writeln!(out, "{} is not in the list", domain)?;
                }
            }
            ShellCommand::Reset => {
                session.domains.reset();
                writeln!(out, "Domains reset to defaults")?;
            }
            ShellCommand::Objective(objective) => {
                session.objective = objective;
                writeln!(out, "Price objective: {}", objective)?;
            }
            ShellCommand::Unit(label) => {
                session.unit = label;
                writeln!(
                    out,
                    "Unit label: {}",
                    session.unit.as_deref().unwrap_or("(none)")
                )?;
            }
            ShellCommand::History => write!(out, "{}", render::history(session.history()))?,
            ShellCommand::Show(n) => {
                let entry = session.history().iter().rev().nth(n - 1);
                match entry {
                    Some(entry) => write!(out, "{}", render::products(&entry.products))?,
                    None => writeln!(out, "No history entry {}", n)?,
                }
            }
            ShellCommand::Prompt => match session.last_outcome() {
                Some(outcome) => writeln!(out, "{}", outcome.prompt)?,
                None => writeln!(out, "No search yet")?,
            },
            ShellCommand::Raw => match session.last_outcome() {
                Some(outcome) => write!(out, "{}", render::raw(outcome))?,
                None => writeln!(out, "No search yet")?,
            },
            ShellCommand::Search(spec) => {
                search(provider, run_logger, &mut session, &spec, &mut out).await?;
            }
        }
    }

    Ok(session)
}

async fn search(
    provider: &dyn SearchProvider,
    run_logger: Option<&RunLogger>,
    session: &mut Session,
    spec: &str,
    out: &mut impl Write,
) -> Result<()> {
    let query = SearchQuery::new(
        spec,
        session.domains.as_slice(),
        session.objective,
        session.unit.as_deref(),
    );
    writeln!(out, "Searching... (this may take 30-120 seconds)")?;
    out.flush()?;

    let outcome = match provider.search(&query).await {
        Ok(outcome) => outcome,
        Err(e) => {
            writeln!(out, "Error: {}", e)?;
            if let Some(raw) = e.raw_payload() {
                writeln!(out, "Raw content:\n{}", raw)?;
            }
            return Ok(());
        }
    };

    info!("{}", outcome.run.summary());
    if let Some(logger) = run_logger {
        if let Err(e) = logger.write(&query.spec, &query.domains, &outcome.run) {
            warn!(error = %e, "failed to write search log");
        }
    }

    write!(out, "{}", render::pages(&outcome))?;
    write!(out, "{}", render::products(&outcome.products))?;
    session.record(&query.spec, provider.name(), outcome);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_text_is_a_search() {
        assert_eq!(
            parse_command("  laptop with 16GB RAM "),
            ShellCommand::Search("laptop with 16GB RAM".into())
        );
        assert_eq!(parse_command("   "), ShellCommand::Empty);
    }

    #[test]
    fn commands_take_arguments() {
        assert_eq!(parse_command(":add pigu.lt"), ShellCommand::Add("pigu.lt".into()));
        assert_eq!(parse_command(":remove  kainos.lt"), ShellCommand::Remove("kainos.lt".into()));
        assert_eq!(parse_command(":objective kg"), ShellCommand::Objective(PriceObjective::Kg));
        assert_eq!(parse_command(":unit tablet"), ShellCommand::Unit(Some("tablet".into())));
        assert_eq!(parse_command(":unit"), ShellCommand::Unit(None));
        assert_eq!(parse_command(":show 2"), ShellCommand::Show(2));
        assert_eq!(parse_command(":q"), ShellCommand::Quit);
    }

    #[test]
    fn bad_commands_are_reported() {
        assert!(matches!(parse_command(":add"), ShellCommand::Invalid(_)));
        assert!(matches!(parse_command(":objective gram"), ShellCommand::Invalid(_)));
        assert!(matches!(parse_command(":show 0"), ShellCommand::Invalid(_)));
        assert!(matches!(parse_command(":frobnicate"), ShellCommand::Invalid(_)));
    }
}
