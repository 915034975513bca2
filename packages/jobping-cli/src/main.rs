//! `jobping`: terminal frontend for the JobPing job board.
//!
//! One-shot subcommands over the client library: auth, preference CRUD,
//! job listing, and the scan/fetch triggers (draining their scheduled
//! reloads before printing, so the output reflects reconciled state).

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use dialoguer::{theme::ColorfulTheme, Password};
use uuid::Uuid;

use jobping_client::{ApiClient, BoardState, FetchParams, Job, JobBoard, Preference};

#[derive(Parser)]
#[command(name = "jobping", about = "AI-powered job scanner", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Create an account and start a session
    Register { username: String },
    /// Log in and persist the session token
    Login { username: String },
    /// Drop the local session token
    Logout,
    /// Show the authenticated profile
    Whoami,
    /// List scored jobs
    Jobs {
        /// Maximum number of jobs to show
        #[arg(long, default_value_t = 20)]
        limit: u32,
    },
    /// Show one job in full
    Job { id: Uuid },
    /// Run a synchronous scan-and-ingest pass, then show the refreshed board
    Scan,
    /// Queue a scrape on the fetcher service, wait, then show the refreshed board
    Fetch {
        /// Search term, e.g. "rust engineer"
        #[arg(long)]
        search: Option<String>,
        /// Location, e.g. "Berlin, Germany"
        #[arg(long)]
        location: Option<String>,
        /// How many postings to request
        #[arg(long)]
        count: Option<u32>,
    },
    /// Manage match preferences
    Prefs {
        #[command(subcommand)]
        command: PrefsCommand,
    },
    /// List AI matches for the authenticated user
    Matches,
    /// Check that the API is reachable
    Health,
}

#[derive(Subcommand)]
enum PrefsCommand {
    /// List preferences
    List,
    /// Add a key/value preference
    Add { key: String, value: String },
    /// Change an existing preference's value
    Set { id: Uuid, value: String },
    /// Delete a preference
    Rm { id: Uuid },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .init();

    let cli = Cli::parse();
    let client = ApiClient::from_env();

    match cli.command {
        Command::Register { username } => {
            let password = prompt_password()?;
            let auth = client.register(&username, &password).await?;
            println!(
                "{} registered as {}",
                "✓".green(),
                auth.user.username.bold()
            );
        }
        Command::Login { username } => {
            let password = prompt_password()?;
            let auth = client.login(&username, &password).await?;
            println!("{} logged in as {}", "✓".green(), auth.user.username.bold());
        }
        Command::Logout => {
            client.logout();
            println!("{} logged out", "✓".green());
        }
        Command::Whoami => {
            let profile = client.profile().await.context("not logged in?")?;
            println!("{} ({})", profile.username.bold(), profile.id);
            println!("notify threshold: {}", profile.notify_threshold);
            if let Some(prompt) = profile.ai_prompt {
                println!("ai prompt: {prompt}");
            }
        }
        Command::Jobs { limit } => {
            let board = JobBoard::new(client).with_job_limit(limit);
            board.load_jobs().await;
            print_board(&board.state())?;
        }
        Command::Job { id } => {
            let job = client.job(id).await?;
            print_job_full(&job);
        }
        Command::Scan => {
            let board = JobBoard::new(client);
            board.trigger_scan().await;
            board.drain_pending_reloads().await;
            print_board(&board.state())?;
        }
        Command::Fetch {
            search,
            location,
            count,
        } => {
            let board = JobBoard::new(client);
            let params = FetchParams {
                search_term: search,
                location,
                results_wanted: count,
            };
            board.trigger_fetch(params).await;
            if board.state().error.is_none() {
                println!("waiting for the fetcher to finish...");
            }
            board.drain_pending_reloads().await;
            print_board(&board.state())?;
        }
        Command::Prefs { command } => {
            let board = JobBoard::new(client);
            board.load_preferences().await;
            match command {
                PrefsCommand::List => {}
                PrefsCommand::Add { key, value } => board.add_preference(&key, &value).await,
                PrefsCommand::Set { id, value } => board.change_preference(id, &value).await,
                PrefsCommand::Rm { id } => board.remove_preference(id).await,
            }
            let state = board.state();
            if let Some(error) = state.error {
                bail!(error);
            }
            print_preferences(&state.preferences);
        }
        Command::Matches => {
            let matches = client.matches().await?;
            if matches.is_empty() {
                println!("no matches yet");
            }
            for m in matches {
                println!("{} job {} ({})", score_badge(m.score), m.job_id, m.id);
            }
        }
        Command::Health => match client.health().await {
            Ok(()) => println!("{} API is up", "✓".green()),
            Err(e) => bail!("API unreachable: {e}"),
        },
    }

    Ok(())
}

fn prompt_password() -> Result<String> {
    let password = Password::with_theme(&ColorfulTheme::default())
        .with_prompt("Password")
        .interact()?;
    Ok(password)
}

fn print_board(state: &BoardState) -> Result<()> {
    if let Some(error) = &state.error {
        bail!(error.clone());
    }
    if let Some(message) = &state.message {
        println!("{}", message.green());
    }
    if state.jobs.is_empty() {
        println!("no jobs stored; run `jobping fetch` or `jobping scan`");
        return Ok(());
    }
    for job in &state.jobs {
        print_job_line(job);
    }
    Ok(())
}

fn print_job_line(job: &Job) {
    let score = match job.ai_score {
        Some(score) => score_badge(score),
        None => "  --".normal().to_string(),
    };
    let remote = if job.is_remote { " [remote]" } else { "" };
    println!(
        "{score}  {} at {}{}  ({})",
        job.title.bold(),
        job.company.cyan(),
        remote.dimmed(),
        job.location
    );
}

fn print_job_full(job: &Job) {
    print_job_line(job);
    if let (Some(min), Some(max)) = (job.min_salary, job.max_salary) {
        println!("salary: ${min:.0} - ${max:.0}");
    }
    if let Some(analysis) = &job.ai_analysis {
        println!("{} {analysis}", "analysis:".bold());
    }
    if !job.description.is_empty() {
        println!("\n{}", job.description);
    }
    if !job.job_url.is_empty() {
        println!("\n{}", job.job_url.underline());
    }
}

fn print_preferences(preferences: &[Preference]) {
    if preferences.is_empty() {
        println!("no preferences set");
        return;
    }
    for p in preferences {
        println!("{}  {} = {}", p.id.to_string().dimmed(), p.key.bold(), p.value);
    }
}

/// Score colors follow the board UI tiers: 80+ strong, 60+ middling.
fn score_badge(score: i32) -> String {
    let badge = format!("{score:>3}%");
    if score >= 80 {
        badge.green().to_string()
    } else if score >= 60 {
        badge.yellow().to_string()
    } else {
        badge.red().to_string()
    }
}
