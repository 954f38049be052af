//! `opencourse`: operator CLI for the OpenCourse review core.
//!
//! Usage:
//!   opencourse -c <config.toml> <command>
//!
//! Every command prints JSON on stdout; logs go to stderr.

mod commands;
mod config;

use clap::{Parser, Subcommand};
use tracing::info;

use config::ServerConfig;

/// OpenCourse CLI.
#[derive(Parser, Debug)]
#[command(name = "opencourse", about = "OpenCourse review and audit-history CLI")]
struct Cli {
    /// Path to the config file.
    #[arg(short = 'c', long = "config", required = true)]
    config: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Create the database schema.
    Init,

    /// User management.
    User {
        #[command(subcommand)]
        action: UserAction,
    },

    /// Course management.
    Course {
        #[command(subcommand)]
        action: CourseAction,
    },

    /// Reviews, ratings and likes.
    Review {
        #[command(subcommand)]
        action: ReviewAction,
    },

    /// List a user's history.
    History {
        #[arg(long)]
        user: i64,
        /// Attach the live object each entry points at.
        #[arg(long)]
        resolve: bool,
        #[arg(long)]
        limit: Option<usize>,
        #[arg(long)]
        offset: Option<usize>,
    },
}

#[derive(Subcommand, Debug)]
enum UserAction {
    Add {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        /// Grant the admin role.
        #[arg(long)]
        admin: bool,
    },
}

#[derive(Subcommand, Debug)]
enum CourseAction {
    Add {
        #[arg(long)]
        code: String,
        #[arg(long)]
        name: String,
    },
}

#[derive(Subcommand, Debug)]
enum ReviewAction {
    /// Create or update the user's review of a course.
    Submit {
        #[arg(long)]
        user: i64,
        #[arg(long)]
        course: i64,
        #[arg(long)]
        content: Option<String>,
        /// 1 to 10.
        #[arg(long)]
        rating: Option<u8>,
    },
    /// Edit a review by id (author only).
    Update {
        #[arg(long)]
        user: i64,
        #[arg(long)]
        id: i64,
        #[arg(long)]
        content: Option<String>,
        #[arg(long)]
        rating: Option<u8>,
    },
    /// Delete a review (author or admin).
    Delete {
        #[arg(long)]
        user: i64,
        #[arg(long)]
        id: i64,
    },
    Like {
        #[arg(long)]
        user: i64,
        #[arg(long)]
        id: i64,
    },
    Unlike {
        #[arg(long)]
        user: i64,
        #[arg(long)]
        id: i64,
    },
    /// List reviews of a course (most liked first) or by a user.
    List {
        #[arg(long)]
        course: Option<i64>,
        #[arg(long)]
        user: Option<i64>,
    },
    Show {
        #[arg(long)]
        id: i64,
    },
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let config_path = std::path::PathBuf::from(&cli.config);
    info!("Loading configuration from {}", config_path.display());
    let server_config = ServerConfig::load(&config_path)?;

    let module = commands::open(&server_config)?;

    match cli.command {
        Commands::Init => {
            info!("Schema ready");
        }

        Commands::User { action } => match action {
            UserAction::Add { name, email, admin } => {
                commands::catalog::add_user(&module, &name, &email, admin)?;
            }
        },

        Commands::Course { action } => match action {
            CourseAction::Add { code, name } => {
                commands::catalog::add_course(&module, &code, &name)?;
            }
        },

        Commands::Review { action } => match action {
            ReviewAction::Submit {
                user,
                course,
                content,
                rating,
            } => {
                commands::interaction::submit(&module, user, course, content.as_deref(), rating)?;
            }
            ReviewAction::Update {
                user,
                id,
                content,
                rating,
            } => {
                commands::interaction::update(&module, user, id, content.as_deref(), rating)?;
            }
            ReviewAction::Delete { user, id } => {
                commands::interaction::delete(&module, user, id)?;
            }
            ReviewAction::Like { user, id } => {
                commands::interaction::like(&module, user, id, true)?;
            }
            ReviewAction::Unlike { user, id } => {
                commands::interaction::like(&module, user, id, false)?;
            }
            ReviewAction::List { course, user } => {
                commands::interaction::list(&module, course, user)?;
            }
            ReviewAction::Show { id } => {
                commands::interaction::show(&module, id)?;
            }
        },

        Commands::History {
            user,
            resolve,
            limit,
            offset,
        } => {
            commands::history::list(&module, user, resolve, limit, offset)?;
        }
    }

    Ok(())
}
