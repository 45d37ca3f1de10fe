use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use campus_admin::RecordId;

#[derive(Parser)]
#[command(name = "campus-admin")]
#[command(about = "Administer universities, courses and events through the admin API")]
#[command(version)]
#[command(after_long_help = r#"
EXAMPLES:
    # Sign in (password is prompted when not given)
    campus-admin login -u admin

    # Summary counts
    campus-admin dashboard

    # Second page of courses as JSON
    campus-admin --format json courses list --page 2

    # Create an event linked to two courses
    campus-admin events create --name "Open Day" --start-date 2025-03-01 --course 4 --course 9

    # Replace an event's courses
    campus-admin events update 12 --course 4

    # Delete a university
    campus-admin universities delete 3 --yes
"#)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Base URL of the admin API (overrides config and CAMPUS_ADMIN_API_URL)
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    /// Directory holding config.toml and the saved session
    #[arg(long, global = true)]
    pub state_dir: Option<PathBuf>,

    /// Output format (text or json)
    #[arg(long, global = true, default_value = "text")]
    pub format: String,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Sign in and store the session
    Login {
        #[arg(short, long)]
        username: String,

        /// Password; read from CAMPUS_ADMIN_PASSWORD or stdin when omitted
        #[arg(short, long)]
        password: Option<String>,
    },

    /// Forget the stored session
    Logout,

    /// Show the signed-in administrator
    Whoami,

    /// Show record counts
    Dashboard,

    /// Manage universities
    Universities {
        #[command(subcommand)]
        command: UniversityCommands,
    },

    /// Manage courses
    Courses {
        #[command(subcommand)]
        command: CourseCommands,
    },

    /// Manage events and their courses
    Events {
        #[command(subcommand)]
        command: EventCommands,
    },
}

#[derive(Args, Debug, Clone, Copy)]
pub struct ListArgs {
    /// Page number, starting at 1
    #[arg(long, default_value = "1")]
    pub page: u32,

    /// Rows per page (defaults to page_size from config)
    #[arg(long)]
    pub limit: Option<u32>,
}

#[derive(Subcommand)]
pub enum UniversityCommands {
    /// List universities
    List(ListArgs),
    /// Show one university
    Show { id: RecordId },
    /// Create a university
    Create(UniversityFields),
    /// Edit a university; omitted fields keep their current value
    Update {
        id: RecordId,
        #[command(flatten)]
        fields: UniversityFields,
    },
    /// Delete a university
    Delete {
        id: RecordId,
        /// Confirm the deletion
        #[arg(long)]
        yes: bool,
    },
}

#[derive(Args, Debug, Clone, Default)]
pub struct UniversityFields {
    #[arg(long)]
    pub name: Option<String>,
    #[arg(long)]
    pub location: Option<String>,
    #[arg(long)]
    pub website: Option<String>,
    #[arg(long)]
    pub description: Option<String>,
    #[arg(long)]
    pub logo_url: Option<String>,
    /// true or false
    #[arg(long)]
    pub active: Option<bool>,
}

#[derive(Subcommand)]
pub enum CourseCommands {
    /// List courses
    List(ListArgs),
    /// Show one course
    Show { id: RecordId },
    /// Create a course
    Create(CourseFields),
    /// Edit a course; omitted fields keep their current value
    Update {
        id: RecordId,
        #[command(flatten)]
        fields: CourseFields,
    },
    /// Delete a course
    Delete {
        id: RecordId,
        #[arg(long)]
        yes: bool,
    },
    /// List universities a course can belong to
    Universities,
}

#[derive(Args, Debug, Clone, Default)]
pub struct CourseFields {
    #[arg(long)]
    pub title: Option<String>,
    #[arg(long)]
    pub description: Option<String>,
    #[arg(long)]
    pub duration: Option<String>,
    #[arg(long)]
    pub level: Option<String>,
    #[arg(long)]
    pub course_url: Option<String>,
    #[arg(long)]
    pub image_url: Option<String>,
    #[arg(long)]
    pub active: Option<bool>,
    /// Owning university ID
    #[arg(long)]
    pub university: Option<RecordId>,
}

#[derive(Subcommand)]
pub enum EventCommands {
    /// List events
    List(ListArgs),
    /// Show one event with its courses
    Show { id: RecordId },
    /// Create an event
    Create(EventFields),
    /// Edit an event; omitted fields keep their current value
    Update {
        id: RecordId,
        #[command(flatten)]
        fields: EventFields,
    },
    /// Delete an event
    Delete {
        id: RecordId,
        #[arg(long)]
        yes: bool,
    },
    /// List courses an event can be linked to
    Courses,
}

#[derive(Args, Debug, Clone, Default)]
pub struct EventFields {
    #[arg(long)]
    pub name: Option<String>,
    #[arg(long)]
    pub description: Option<String>,
    #[arg(long)]
    pub location: Option<String>,
    /// YYYY-MM-DD
    #[arg(long)]
    pub start_date: Option<String>,
    /// YYYY-MM-DD
    #[arg(long)]
    pub end_date: Option<String>,
    #[arg(long)]
    pub organizer: Option<String>,
    #[arg(long)]
    pub event_url: Option<String>,
    #[arg(long)]
    pub image_url: Option<String>,
    #[arg(long)]
    pub active: Option<bool>,

    /// Linked course ID; repeat for several. Replaces the current set.
    #[arg(long = "course")]
    pub courses: Vec<RecordId>,

    /// Unlink every course
    #[arg(long, conflicts_with = "courses")]
    pub clear_courses: bool,
}
