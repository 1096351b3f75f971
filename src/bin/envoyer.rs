//! Envoyer command line tool
//!
//! Usage:
//!   envoyer list                        # every project
//!   envoyer search shop                 # projects whose name contains "shop"
//!   envoyer invite dev@acme.test shop   # invite to every match
//!   envoyer deploy shop --branch main   # confirm, then deploy every match
//!
//! The API key is read from `ENVOYER_API_KEY` (or `API_KEY`).

use std::io::{self, Write};
use std::process::ExitCode;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use console::{style, Term};
use dialoguer::{theme::ColorfulTheme, Confirm};
use serde::Serialize;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use envoyer_client::{
    CollaboratorListing, Config, ConfirmedAction, CreatedProject, EnvoyerClient, FanOutReport,
    Hook, MatchSet, Orchestrator, Outcome, Project, ProjectId, DEFAULT_BRANCH,
};

#[derive(Parser)]
#[command(name = "envoyer")]
#[command(about = "Search, invite, deploy and prune Envoyer projects", long_about = None)]
struct Cli {
    /// API root (defaults to ENVOYER_BASE_URL or https://envoyer.io/api)
    #[arg(long, global = true)]
    base_url: Option<String>,

    /// Per-request timeout in seconds
    #[arg(long, global = true, value_parser = clap::value_parser!(u64).range(1..))]
    timeout: Option<u64>,

    /// Output format
    #[arg(short, long, global = true, default_value = "table")]
    format: OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List every project
    List,

    /// Show projects whose name contains TERM (case-insensitive)
    Search {
        /// Part of a project name; empty matches everything
        term: String,
    },

    /// List the deployment hooks of a project
    Hooks {
        /// Envoyer project id
        project_id: String,
    },

    /// Invite a collaborator to every project matching TERM
    Invite {
        /// Email address to invite
        email: String,
        /// Part of a project name
        term: String,
    },

    /// Show the collaborators of every project matching TERM
    Collaborators {
        /// Part of a project name
        term: String,
    },

    /// Delete every project matching TERM after confirmation
    #[command(alias = "rm")]
    Delete {
        /// Part of a project name
        term: String,
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },

    /// Deploy every project matching TERM after confirmation
    Deploy {
        /// Part of a project name
        term: String,
        /// Branch to deploy
        #[arg(short, long, default_value = DEFAULT_BRANCH)]
        branch: String,
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },

    /// Register a server (ubuntu@HOSTNAME:22) on a project
    AddServer {
        /// Server hostname
        hostname: String,
        /// Envoyer project id
        project_id: String,
    },

    /// Create a GitHub Laravel project deploying `main` on push
    CreateProject {
        /// Project name
        name: String,
        /// GitHub repository, e.g. acme/shop
        repository: String,
        /// URL Envoyer monitors after deployments
        #[arg(long)]
        health_check_url: Option<String>,
    },
}

#[derive(Clone, Copy, ValueEnum, Default, PartialEq)]
enum OutputFormat {
    /// Human-readable table
    #[default]
    Table,
    /// Machine-readable JSON
    Json,
}

fn main() -> Result<ExitCode> {
    // Logs go to stderr so JSON output stays parseable.
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "envoyer_client=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let mut config = Config::from_env().context("Cannot start without an API key")?;
    if let Some(url) = cli.base_url {
        config = config.with_base_url(url);
    }
    if let Some(secs) = cli.timeout {
        config = config.with_timeout(Duration::from_secs(secs));
    }

    let client = EnvoyerClient::new(&config).context("Failed to build HTTP client")?;
    let orchestrator = Orchestrator::new(client);
    let out = Printer { format: cli.format };

    let ok = run(cli.command, &orchestrator, &out)?;
    Ok(if ok { ExitCode::SUCCESS } else { ExitCode::FAILURE })
}

/// Execute one command. Returns `false` when any targeted item failed.
fn run(
    command: Commands,
    orchestrator: &Orchestrator<EnvoyerClient>,
    out: &Printer,
) -> Result<bool> {
    let catalog = orchestrator.catalog();

    match command {
        Commands::List => {
            let projects = catalog
                .try_list_projects()
                .context("Failed to list projects")?;
            out.projects(&projects)?;
        }
        Commands::Search { term } => {
            let matches = orchestrator
                .try_resolve_matches(&term)
                .context("Failed to list projects")?;
            out.matches(&matches)?;
        }
        Commands::Hooks { project_id } => {
            let hooks = catalog
                .try_list_hooks(&ProjectId::new(project_id.as_str()))
                .with_context(|| format!("Failed to list hooks of project {project_id}"))?;
            out.hooks(&hooks)?;
        }
        Commands::Invite { email, term } => {
            let report = orchestrator.invite_to_matches(&email, &term);
            out.report(&report)?;
            return Ok(report.all_succeeded());
        }
        Commands::Collaborators { term } => {
            let listings = orchestrator
                .list_collaborators_of_matches(&term)
                .context("Failed to list projects")?;
            out.collaborators(&listings)?;
            return Ok(listings.iter().all(|l| l.collaborators.is_ok()));
        }
        Commands::Delete { term, yes } => {
            let result = orchestrator.delete_matches(&term, |matches| {
                confirm(matches, "Delete these projects?", yes)
            });
            return out.confirmed(&result, "deleted");
        }
        Commands::Deploy { term, branch, yes } => {
            let prompt = format!("Deploy these projects from '{branch}'?");
            let result = orchestrator
                .deploy_matches(&term, &branch, |matches| confirm(matches, &prompt, yes));
            return out.confirmed(&result, "deployed");
        }
        Commands::AddServer {
            hostname,
            project_id,
        } => {
            let outcome = catalog.add_server(&hostname, &ProjectId::new(project_id));
            out.outcome(&outcome)?;
            return Ok(outcome.is_success());
        }
        Commands::CreateProject {
            name,
            repository,
            health_check_url,
        } => {
            let created =
                catalog.create_project(&name, &repository, health_check_url.as_deref());
            out.created(&created)?;
            return Ok(created.fully_configured());
        }
    }

    Ok(true)
}

/// Show the match set and ask before acting on it.
///
/// The list goes to stderr next to the prompt, so stdout stays clean for
/// `--format json`.
fn confirm(matches: &MatchSet, prompt: &str, yes: bool) -> bool {
    if let Err(e) = show_matches(&mut Term::stderr(), matches) {
        tracing::warn!(error = %e, "cannot show matching projects");
        return false;
    }
    if yes {
        return true;
    }

    Confirm::with_theme(&ColorfulTheme::default())
        .with_prompt(prompt)
        .default(false)
        .interact()
        .unwrap_or_else(|e| {
            tracing::warn!(error = %e, "confirmation prompt failed, treating as no");
            false
        })
}

fn show_matches(w: &mut impl Write, matches: &MatchSet) -> io::Result<()> {
    writeln!(w, "{}", style("Matching projects:").bold())?;
    for m in matches {
        writeln!(w, "  - {} ({})", m.name, style(&m.id).dim())?;
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Output
// ---------------------------------------------------------------------------

struct Printer {
    format: OutputFormat,
}

impl Printer {
    fn json<T: Serialize + ?Sized>(&self, value: &T) -> Result<()> {
        println!("{}", serde_json::to_string_pretty(value)?);
        Ok(())
    }

    fn projects(&self, projects: &[Project]) -> Result<()> {
        if self.format == OutputFormat::Json {
            return self.json(projects);
        }
        if projects.is_empty() {
            println!("No projects.");
        }
        for p in projects {
            println!("{:>8}  {}", style(&p.id).dim(), p.name);
        }
        Ok(())
    }

    fn matches(&self, matches: &MatchSet) -> Result<()> {
        if self.format == OutputFormat::Json {
            return self.json(matches);
        }
        if matches.is_empty() {
            println!("No projects match.");
        }
        for m in matches {
            println!("{:>8}  {}", style(&m.id).dim(), m.name);
        }
        Ok(())
    }

    fn hooks(&self, hooks: &[Hook]) -> Result<()> {
        if self.format == OutputFormat::Json {
            return self.json(hooks);
        }
        if hooks.is_empty() {
            println!("No hooks.");
        }
        for h in hooks {
            println!(
                "{:>8}  {:<6}  {}",
                style(&h.id).dim(),
                h.timing.as_deref().unwrap_or("-"),
                h.name
            );
        }
        Ok(())
    }

    fn outcome(&self, outcome: &Outcome) -> Result<()> {
        if self.format == OutputFormat::Json {
            return self.json(outcome);
        }
        match outcome {
            Outcome::Succeeded(m) => println!("{} {m}", style("✓").green()),
            Outcome::Failed(m) => println!("{} {m}", style("✗").red()),
        }
        Ok(())
    }

    fn report(&self, report: &FanOutReport) -> Result<()> {
        if self.format == OutputFormat::Json {
            return self.json(report);
        }
        if let Some(error) = &report.listing_error {
            println!("{} {error}", style("✗").red());
            return Ok(());
        }
        if report.items.is_empty() {
            println!("No projects match.");
            return Ok(());
        }
        for item in &report.items {
            self.outcome(&item.outcome)?;
        }
        println!(
            "{} succeeded, {} failed",
            style(report.succeeded()).green(),
            style(report.failed()).red()
        );
        Ok(())
    }

    fn confirmed(&self, result: &ConfirmedAction, verb: &str) -> Result<bool> {
        if self.format == OutputFormat::Json {
            self.json(result)?;
        } else {
            match result {
                ConfirmedAction::NothingToDo => println!("No projects match; nothing {verb}."),
                ConfirmedAction::ListingFailed { message } => {
                    println!("{} {message}; nothing {verb}.", style("✗").red())
                }
                ConfirmedAction::Cancelled { .. } => println!("Cancelled; nothing {verb}."),
                ConfirmedAction::Completed { report } => self.report(report)?,
            }
        }
        Ok(result.succeeded())
    }

    fn collaborators(&self, listings: &[CollaboratorListing]) -> Result<()> {
        if self.format == OutputFormat::Json {
            return self.json(listings);
        }
        if listings.is_empty() {
            println!("No projects match.");
        }
        for listing in listings {
            println!(
                "{} ({})",
                style(&listing.project.name).bold(),
                style(&listing.project.id).dim()
            );
            match &listing.collaborators {
                Ok(collaborators) if collaborators.is_empty() => println!("  (none)"),
                Ok(collaborators) => {
                    for c in collaborators {
                        println!("  - {}", c.email);
                    }
                }
                Err(e) => println!("  {} {e}", style("✗").red()),
            }
        }
        Ok(())
    }

    fn created(&self, created: &CreatedProject) -> Result<()> {
        if self.format == OutputFormat::Json {
            return self.json(created);
        }
        self.outcome(&created.creation)?;
        if let Some(update) = &created.source_update {
            self.outcome(update)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use envoyer_client::Match;

    #[test]
    fn zero_timeout_is_rejected() {
        assert!(Cli::try_parse_from(["envoyer", "--timeout", "0", "list"]).is_err());
        let cli = Cli::try_parse_from(["envoyer", "list", "--timeout", "5"]).unwrap();
        assert_eq!(cli.timeout, Some(5));
    }

    #[test]
    fn match_list_names_every_target() {
        let matches = MatchSet::new(vec![
            Match {
                name: "Alpha".into(),
                id: ProjectId::new("1"),
            },
            Match {
                name: "Alphabet".into(),
                id: ProjectId::new("2"),
            },
        ]);
        let mut buf = Vec::new();
        show_matches(&mut buf, &matches).unwrap();

        let text = String::from_utf8(buf).unwrap();
        assert!(text.contains("Alpha ("));
        assert!(text.contains("Alphabet ("));
        assert_eq!(text.lines().count(), 3);
    }
}
