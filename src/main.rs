mod cli;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use campus_admin::AdminError;

use crate::cli::{App, Cli, Commands, CourseCommands, EventCommands, UniversityCommands};

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "campus_admin=warn".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();

    let cli = Cli::parse();

    if let Err(err) = run(cli).await {
        tracing::debug!("{:?}", err);
        let expired = err
            .downcast_ref::<AdminError>()
            .is_some_and(AdminError::is_session_expired);
        if expired {
            eprintln!("Session expired. Run `campus-admin login -u <username>` to sign in again.");
        } else {
            eprintln!("Error: {}", err);
        }
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let app = App::init(cli.api_url, cli.state_dir, cli.format)?;

    match cli.command {
        Commands::Login { username, password } => {
            cli::login(&app, &username, password).await?;
        }
        Commands::Logout => {
            cli::logout(&app)?;
        }
        Commands::Whoami => {
            cli::whoami(&app)?;
        }
        Commands::Dashboard => {
            cli::dashboard(&app).await?;
        }
        Commands::Universities { command } => match command {
            UniversityCommands::List(args) => cli::list_universities(&app, args).await?,
            UniversityCommands::Show { id } => cli::show_university(&app, id).await?,
            UniversityCommands::Create(fields) => cli::save_university(&app, None, fields).await?,
            UniversityCommands::Update { id, fields } => {
                cli::save_university(&app, Some(id), fields).await?
            }
            UniversityCommands::Delete { id, yes } => cli::delete_university(&app, id, yes).await?,
        },
        Commands::Courses { command } => match command {
            CourseCommands::List(args) => cli::list_courses(&app, args).await?,
            CourseCommands::Show { id } => cli::show_course(&app, id).await?,
            CourseCommands::Create(fields) => cli::save_course(&app, None, fields).await?,
            CourseCommands::Update { id, fields } => cli::save_course(&app, Some(id), fields).await?,
            CourseCommands::Delete { id, yes } => cli::delete_course(&app, id, yes).await?,
            CourseCommands::Universities => cli::course_university_options(&app).await?,
        },
        Commands::Events { command } => match command {
            EventCommands::List(args) => cli::list_events(&app, args).await?,
            EventCommands::Show { id } => cli::show_event(&app, id).await?,
            EventCommands::Create(fields) => cli::save_event_command(&app, None, fields).await?,
            EventCommands::Update { id, fields } => {
                cli::save_event_command(&app, Some(id), fields).await?
            }
            EventCommands::Delete { id, yes } => cli::delete_event(&app, id, yes).await?,
            EventCommands::Courses => cli::event_course_options(&app).await?,
        },
    }

    Ok(())
}
