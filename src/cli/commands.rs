use std::collections::BTreeSet;
use std::io::{self, BufRead};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context};
use chrono::NaiveDate;
use indicatif::{ProgressBar, ProgressStyle};

use campus_admin::config::default_state_dir;
use campus_admin::{
    save_event, AdminConfig, AdminError, ApiClient, Course, CourseForm, DashboardStats, Event,
    EventForm, FileStorage, Navigator, PageRequest, RecordId, Resource, Resources, Route,
    SaveMode, SessionStore, University, UniversityForm,
};

use super::args::{CourseFields, EventFields, ListArgs, UniversityFields};
use super::output::{self, is_json, print_json};

pub const PASSWORD_ENV: &str = "CAMPUS_ADMIN_PASSWORD";

/// Everything a command needs: config, the shared session and the client.
pub struct App {
    pub config: AdminConfig,
    pub session: Arc<SessionStore>,
    pub navigator: Arc<Navigator>,
    pub client: ApiClient,
    pub format: String,
}

impl App {
    pub fn init(
        api_url: Option<String>,
        state_dir: Option<PathBuf>,
        format: String,
    ) -> anyhow::Result<Self> {
        let state_dir = state_dir.unwrap_or_else(default_state_dir);
        let mut config = AdminConfig::load(&state_dir)?;
        if let Some(url) = api_url {
            config = config.with_api_url(url);
        }
        tracing::debug!("Using API at {}", config.base_url());

        let session = Arc::new(SessionStore::open(FileStorage::new(&config.state_dir)));
        let navigator = Arc::new(Navigator::default());
        let client = ApiClient::from_config(&config, session.clone())?
            .with_unauthorized_hook(navigator.login_redirect_hook());

        Ok(Self {
            config,
            session,
            navigator,
            client,
            format,
        })
    }

    /// Passes `route` through the auth gate; fails when it lands on login.
    pub fn enter(&self, route: Route) -> anyhow::Result<()> {
        let landed = self.navigator.navigate(route, &self.session);
        if landed == Route::Login && route != Route::Login {
            bail!("Not logged in. Run `campus-admin login -u <username>` first.");
        }
        Ok(())
    }

    fn json(&self) -> bool {
        is_json(&self.format)
    }

    fn page_request(&self, args: ListArgs) -> PageRequest {
        PageRequest::new(args.page, args.limit.unwrap_or(self.config.page_size))
    }
}

fn spinner(message: &'static str) -> ProgressBar {
    let bar = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::with_template("{spinner} {msg}") {
        bar.set_style(style);
    }
    bar.set_message(message);
    bar.enable_steady_tick(Duration::from_millis(100));
    bar
}

/// Wraps a library error with the message the user should see.
fn user_error(error: AdminError, fallback: &str) -> anyhow::Error {
    let message = error.user_message(fallback);
    anyhow::Error::new(error).context(message)
}

// === Session ===

pub async fn login(app: &App, username: &str, password: Option<String>) -> anyhow::Result<()> {
    app.enter(Route::Login)?;

    let password = match password {
        Some(p) => p,
        None => read_password()?,
    };
    if username.is_empty() || password.is_empty() {
        bail!("Username and password are required");
    }

    let bar = spinner("Logging in...");
    let result = app.client.login(username, &password).await;
    bar.finish_and_clear();

    let profile = result.map_err(|e| user_error(e, "Failed to login. Please check your credentials."))?;
    app.navigator.redirect(Route::Dashboard);

    if app.json() {
        print_json(&profile);
    } else {
        println!("Logged in as {} <{}>", profile.username, profile.email);
    }
    Ok(())
}

fn read_password() -> anyhow::Result<String> {
    if let Ok(password) = std::env::var(PASSWORD_ENV) {
        return Ok(password);
    }
    eprint!("Password: ");
    let mut line = String::new();
    io::stdin()
        .lock()
        .read_line(&mut line)
        .context("Failed to read password from stdin")?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

pub fn logout(app: &App) -> anyhow::Result<()> {
    app.client.logout();
    app.navigator.redirect(Route::Login);
    if !app.json() {
        println!("Logged out");
    }
    Ok(())
}

pub fn whoami(app: &App) -> anyhow::Result<()> {
    let profile = app.session.profile();
    if app.json() {
        print_json(&profile);
        return Ok(());
    }
    match profile {
        Some(p) => println!("{} <{}> (#{})", p.username, p.email, p.id),
        None => println!("Not logged in"),
    }
    Ok(())
}

pub async fn dashboard(app: &App) -> anyhow::Result<()> {
    app.enter(Route::Dashboard)?;

    let stats = DashboardStats::fetch(&app.client)
        .await
        .map_err(|e| user_error(e, "Failed to load dashboard stats"))?;

    if app.json() {
        print_json(&stats);
    } else {
        println!("Dashboard:");
        println!("  Universities: {}", stats.universities_count);
        println!("  Courses: {}", stats.courses_count);
        println!("  Events: {}", stats.events_count);
    }
    Ok(())
}

// === Shared record handlers ===

async fn list_records<R>(
    app: &App,
    route: Route,
    args: ListArgs,
    line: fn(&R) -> String,
) -> anyhow::Result<()>
where
    R: Resource + serde::Serialize,
{
    app.enter(route)?;
    let request = app.page_request(args);
    let resources: Resources<R> = Resources::new(app.client.clone());

    let page = resources.list(request).await.map_err(|e| {
        let fallback = format!("Failed to fetch {}. Run the command again to retry.", R::PATH.trim_start_matches('/'));
        user_error(e, &fallback)
    })?;

    if app.json() {
        print_json(&serde_json::json!({
            "items": page.items,
            "total": page.total,
            "page": request.page,
            "totalPages": page.total_pages(request.limit),
        }));
        return Ok(());
    }

    if page.items.is_empty() {
        println!("No {} found", R::PATH.trim_start_matches('/'));
    }
    for item in &page.items {
        println!("{}", line(item));
    }
    output::print_page_footer(&page, request.page, request.limit);
    Ok(())
}

async fn fetch_record<R: Resource>(app: &App, id: RecordId) -> anyhow::Result<R> {
    let resources: Resources<R> = Resources::new(app.client.clone());
    resources
        .get(id)
        .await
        .map_err(|e| user_error(e, &format!("Failed to fetch {} {}", R::NOUN, id)))
}

async fn delete_record<R: Resource>(app: &App, route: Route, id: RecordId, yes: bool) -> anyhow::Result<()> {
    app.enter(route)?;
    if !yes {
        bail!("Refusing to delete {} {} without --yes", R::NOUN, id);
    }

    let resources: Resources<R> = Resources::new(app.client.clone());
    resources
        .delete(id)
        .await
        .map_err(|e| user_error(e, &format!("Failed to delete {}", R::NOUN)))?;

    if !app.json() {
        println!("Deleted {} {}", R::NOUN, id);
    }
    Ok(())
}

fn ensure_present(value: &str, field: &str) -> anyhow::Result<()> {
    if value.trim().is_empty() {
        bail!("--{} is required", field);
    }
    Ok(())
}

// === Universities ===

impl UniversityFields {
    pub fn apply(self, form: &mut UniversityForm) {
        if let Some(v) = self.name {
            form.name = v;
        }
        if let Some(v) = self.location {
            form.location = v;
        }
        if let Some(v) = self.website {
            form.website = v;
        }
        if let Some(v) = self.description {
            form.description = v;
        }
        if let Some(v) = self.logo_url {
            form.logo_url = v;
        }
        if let Some(v) = self.active {
            form.is_active = v;
        }
    }
}

pub async fn list_universities(app: &App, args: ListArgs) -> anyhow::Result<()> {
    list_records::<University>(app, Route::Universities, args, output::university_line).await
}

pub async fn show_university(app: &App, id: RecordId) -> anyhow::Result<()> {
    app.enter(Route::University(id))?;
    let university: University = fetch_record(app, id).await?;
    if app.json() {
        print_json(&university);
    } else {
        output::print_university(&university);
    }
    Ok(())
}

pub async fn save_university(
    app: &App,
    id: Option<RecordId>,
    fields: UniversityFields,
) -> anyhow::Result<()> {
    let route = id.map(Route::University).unwrap_or(Route::UniversityNew);
    app.enter(route)?;

    let universities = app.client.universities();
    let mut form = match id {
        Some(id) => UniversityForm::from(&fetch_record::<University>(app, id).await?),
        None => UniversityForm {
            is_active: true,
            ..Default::default()
        },
    };
    fields.apply(&mut form);
    ensure_present(&form.name, "name")?;

    let fallback = "An error occurred while saving the university";
    let saved_id = match id {
        Some(id) => {
            universities.update(id, &form).await.map_err(|e| user_error(e, fallback))?;
            id
        }
        None => universities.create(&form).await.map_err(|e| user_error(e, fallback))?.id,
    };
    app.navigator.redirect(Route::Universities);

    report_saved(app, "university", saved_id, id.is_none());
    Ok(())
}

pub async fn delete_university(app: &App, id: RecordId, yes: bool) -> anyhow::Result<()> {
    delete_record::<University>(app, Route::Universities, id, yes).await
}

// === Courses ===

impl CourseFields {
    pub fn apply(self, form: &mut CourseForm) {
        if let Some(v) = self.title {
            form.title = v;
        }
        if let Some(v) = self.description {
            form.description = v;
        }
        if let Some(v) = self.duration {
            form.duration = v;
        }
        if let Some(v) = self.level {
            form.level = v;
        }
        if let Some(v) = self.course_url {
            form.course_url = v;
        }
        if let Some(v) = self.image_url {
            form.image_url = v;
        }
        if let Some(v) = self.active {
            form.is_active = v;
        }
        if let Some(v) = self.university {
            form.university_id = v;
        }
    }
}

pub async fn list_courses(app: &App, args: ListArgs) -> anyhow::Result<()> {
    list_records::<Course>(app, Route::Courses, args, output::course_line).await
}

pub async fn show_course(app: &App, id: RecordId) -> anyhow::Result<()> {
    app.enter(Route::Course(id))?;
    let course: Course = fetch_record(app, id).await?;
    if app.json() {
        print_json(&course);
    } else {
        output::print_course(&course);
    }
    Ok(())
}

/// Universities offered when choosing a course's owner.
pub async fn course_university_options(app: &App) -> anyhow::Result<()> {
    app.enter(Route::CourseNew)?;
    let page = app
        .client
        .universities()
        .list(PageRequest::picker())
        .await
        .map_err(|e| user_error(e, "Failed to fetch data"))?;

    if app.json() {
        print_json(&page.items);
    } else {
        for university in &page.items {
            println!("{}", output::university_line(university));
        }
    }
    Ok(())
}

pub async fn save_course(app: &App, id: Option<RecordId>, fields: CourseFields) -> anyhow::Result<()> {
    let route = id.map(Route::Course).unwrap_or(Route::CourseNew);
    app.enter(route)?;

    let courses = app.client.courses();
    let mut form = match id {
        Some(id) => CourseForm::from(&fetch_record::<Course>(app, id).await?),
        None => CourseForm {
            is_active: true,
            ..Default::default()
        },
    };
    fields.apply(&mut form);
    ensure_present(&form.title, "title")?;
    if form.university_id <= 0 {
        bail!("--university is required");
    }

    let fallback = "An error occurred while saving the course";
    let saved_id = match id {
        Some(id) => {
            courses.update(id, &form).await.map_err(|e| user_error(e, fallback))?;
            id
        }
        None => courses.create(&form).await.map_err(|e| user_error(e, fallback))?.id,
    };
    app.navigator.redirect(Route::Courses);

    report_saved(app, "course", saved_id, id.is_none());
    Ok(())
}

pub async fn delete_course(app: &App, id: RecordId, yes: bool) -> anyhow::Result<()> {
    delete_record::<Course>(app, Route::Courses, id, yes).await
}

// === Events ===

impl EventFields {
    /// Copies field flags into `form` and returns the desired course set,
    /// `None` when the flags say nothing about courses.
    pub fn apply(self, form: &mut EventForm) -> anyhow::Result<Option<BTreeSet<RecordId>>> {
        if let Some(v) = self.name {
            form.name = v;
        }
        if let Some(v) = self.description {
            form.description = v;
        }
        if let Some(v) = self.location {
            form.location = v;
        }
        if let Some(v) = self.start_date {
            form.start_date = checked_date(v, "start-date")?;
        }
        if let Some(v) = self.end_date {
            form.end_date = checked_date(v, "end-date")?;
        }
        if let Some(v) = self.organizer {
            form.organizer = v;
        }
        if let Some(v) = self.event_url {
            form.event_url = v;
        }
        if let Some(v) = self.image_url {
            form.image_url = v;
        }
        if let Some(v) = self.active {
            form.is_active = v;
        }

        if self.clear_courses {
            return Ok(Some(BTreeSet::new()));
        }
        if self.courses.is_empty() {
            return Ok(None);
        }
        Ok(Some(self.courses.into_iter().collect()))
    }
}

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Accepts an existing `YYYY-MM-DD` date or an empty string (clears the date).
pub fn checked_date(value: String, flag: &str) -> anyhow::Result<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Ok(String::new());
    }

    let date = NaiveDate::parse_from_str(trimmed, DATE_FORMAT)
        .with_context(|| format!("--{} is not a valid YYYY-MM-DD date: '{}'", flag, value))?;
    // chrono also accepts unpadded fields such as 2025-1-01
    if date.format(DATE_FORMAT).to_string() != trimmed {
        bail!("--{} must be YYYY-MM-DD, got '{}'", flag, value);
    }
    Ok(trimmed.to_string())
}

pub async fn list_events(app: &App, args: ListArgs) -> anyhow::Result<()> {
    list_records::<Event>(app, Route::Events, args, output::event_line).await
}

pub async fn show_event(app: &App, id: RecordId) -> anyhow::Result<()> {
    app.enter(Route::Event(id))?;
    let event: Event = fetch_record(app, id).await?;
    if app.json() {
        print_json(&event);
    } else {
        output::print_event(&event);
    }
    Ok(())
}

/// Courses offered when linking an event.
pub async fn event_course_options(app: &App) -> anyhow::Result<()> {
    app.enter(Route::EventNew)?;
    let page = app
        .client
        .courses()
        .list(PageRequest::picker())
        .await
        .map_err(|e| user_error(e, "Failed to fetch data"))?;

    if app.json() {
        print_json(&page.items);
    } else if page.items.is_empty() {
        println!("No courses available. Please add courses first.");
    } else {
        for course in &page.items {
            println!("{}", output::course_line(course));
        }
    }
    Ok(())
}

pub async fn save_event_command(
    app: &App,
    id: Option<RecordId>,
    fields: EventFields,
) -> anyhow::Result<()> {
    let route = id.map(Route::Event).unwrap_or(Route::EventNew);
    app.enter(route)?;

    let events: Resources<Event> = app.client.events();
    let mut form = match id {
        Some(id) => EventForm::from(&fetch_record::<Event>(app, id).await?),
        None => EventForm {
            is_active: true,
            ..Default::default()
        },
    };
    let courses = fields.apply(&mut form)?;
    ensure_present(&form.name, "name")?;

    let bar = spinner("Saving...");
    let result = save_event(&events, id, &form, courses.as_ref()).await;
    bar.finish_and_clear();

    let saved = result.map_err(|e| user_error(e, "An error occurred while saving the event"))?;
    app.navigator.redirect(Route::Events);

    if app.json() {
        print_json(&serde_json::json!({
            "id": saved.id,
            "created": saved.mode == SaveMode::Create,
            "attached": saved.links.attached,
            "detached": saved.links.detached,
        }));
        return Ok(());
    }

    report_saved(app, "event", saved.id, saved.mode == SaveMode::Create);
    if saved.links.applied() > 0 {
        println!(
            "  Courses: +{:?} -{:?}",
            saved.links.attached, saved.links.detached
        );
    }
    Ok(())
}

pub async fn delete_event(app: &App, id: RecordId, yes: bool) -> anyhow::Result<()> {
    delete_record::<Event>(app, Route::Events, id, yes).await
}

fn report_saved(app: &App, noun: &str, id: RecordId, created: bool) {
    if app.json() {
        print_json(&serde_json::json!({ "id": id, "created": created }));
    } else if created {
        println!("Created {} {}", noun, id);
    } else {
        println!("Updated {} {}", noun, id);
    }
}
