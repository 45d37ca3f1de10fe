use serde::Serialize;

use campus_admin::{Course, Event, Page, University};

pub fn is_json(format: &str) -> bool {
    format == "json"
}

pub fn print_json<T: Serialize + ?Sized>(value: &T) {
    let output = serde_json::to_string_pretty(value).unwrap_or_default();
    println!("{}", output);
}

fn or_dash(value: Option<&str>) -> &str {
    match value {
        Some(v) if !v.is_empty() => v,
        _ => "-",
    }
}

fn status(active: bool) -> &'static str {
    if active {
        "active"
    } else {
        "inactive"
    }
}

/// Shared footer for paged listings.
pub fn print_page_footer<T>(page: &Page<T>, current: u32, limit: u32) {
    let pages = page.total_pages(limit);
    if pages > 1 {
        println!("\nPage {} of {} ({} total)", current, pages, page.total);
    } else {
        println!("\n{} total", page.total);
    }
}

pub fn university_line(u: &University) -> String {
    format!(
        "#{} {} - {} [{}]",
        u.id,
        u.name,
        or_dash(u.location.as_deref()),
        status(u.is_active)
    )
}

pub fn print_university(u: &University) {
    println!("{} (#{})", u.name, u.id);
    println!("  Location: {}", or_dash(u.location.as_deref()));
    println!("  Website: {}", or_dash(u.website.as_deref()));
    println!("  Logo: {}", or_dash(u.logo_url.as_deref()));
    println!("  Status: {}", status(u.is_active));
    if let Some(description) = u.description.as_deref().filter(|d| !d.is_empty()) {
        println!("\n  {}", description);
    }
}

pub fn course_line(c: &Course) -> String {
    format!(
        "#{} {} - {} ({}, {}) [{}]",
        c.id,
        c.title,
        c.university_name(),
        or_dash(c.level.as_deref()),
        or_dash(c.duration.as_deref()),
        status(c.is_active)
    )
}

pub fn print_course(c: &Course) {
    println!("{} (#{})", c.title, c.id);
    println!("  University: {}", c.university_name());
    println!("  Level: {}", or_dash(c.level.as_deref()));
    println!("  Duration: {}", or_dash(c.duration.as_deref()));
    println!("  URL: {}", or_dash(c.course_url.as_deref()));
    println!("  Status: {}", status(c.is_active));
    if let Some(description) = c.description.as_deref().filter(|d| !d.is_empty()) {
        println!("\n  {}", description);
    }
}

fn date_range(e: &Event) -> String {
    let start = e.start_date.as_deref().map(campus_admin::api::date_part);
    let end = e.end_date.as_deref().map(campus_admin::api::date_part);
    match (start, end) {
        (Some(start), Some(end)) if start != end => format!("{} - {}", start, end),
        (Some(start), _) => start,
        (None, Some(end)) => end,
        (None, None) => "-".to_string(),
    }
}

pub fn event_line(e: &Event) -> String {
    format!(
        "#{} {} - {} ({}) [{}]",
        e.id,
        e.name,
        or_dash(e.location.as_deref()),
        date_range(e),
        status(e.is_active)
    )
}

pub fn print_event(e: &Event) {
    println!("{} (#{})", e.name, e.id);
    println!("  Dates: {}", date_range(e));
    println!("  Location: {}", or_dash(e.location.as_deref()));
    println!("  Organizer: {}", or_dash(e.organizer.as_deref()));
    println!("  URL: {}", or_dash(e.event_url.as_deref()));
    println!("  Status: {}", status(e.is_active));

    let courses = e.courses.as_deref().unwrap_or_default();
    if courses.is_empty() {
        println!("  Courses: none");
    } else {
        println!("  Courses:");
        for course in courses {
            println!("    #{} {} ({})", course.id, course.title, course.university_name());
        }
    }
    if let Some(description) = e.description.as_deref().filter(|d| !d.is_empty()) {
        println!("\n  {}", description);
    }
}
