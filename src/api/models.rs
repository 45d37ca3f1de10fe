//! Record and form types exchanged with the backend.
//!
//! Records tolerate missing optional fields; forms always send every field,
//! mirroring the admin forms they replace.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub type RecordId = i64;

/// One page of a list endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    #[serde(default)]
    pub total: u64,
}

impl<T> Page<T> {
    pub fn total_pages(&self, limit: u32) -> u64 {
        total_pages(self.total, limit)
    }
}

/// `ceil(total / limit)`; a zero limit is treated as one row per page.
pub fn total_pages(total: u64, limit: u32) -> u64 {
    let limit = u64::from(limit.max(1));
    total.div_ceil(limit)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u32,
    pub limit: u32,
}

impl PageRequest {
    pub fn new(page: u32, limit: u32) -> Self {
        Self {
            page: page.max(1),
            limit: limit.max(1),
        }
    }

    /// Option pickers load up to 100 rows in one go.
    pub fn picker() -> Self {
        Self::new(1, 100)
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::new(1, 10)
    }
}

fn default_active() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct University {
    pub id: RecordId,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub website: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub logo_url: Option<String>,
    #[serde(default = "default_active")]
    pub is_active: bool,
    #[serde(default)]
    pub created_at: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UniversityRef {
    pub id: RecordId,
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Course {
    pub id: RecordId,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub duration: Option<String>,
    #[serde(default)]
    pub level: Option<String>,
    #[serde(default)]
    pub course_url: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default = "default_active")]
    pub is_active: bool,
    #[serde(default)]
    pub university_id: Option<RecordId>,
    #[serde(default)]
    pub university: Option<UniversityRef>,
    #[serde(default)]
    pub created_at: Option<String>,
}

impl Course {
    pub fn university_name(&self) -> &str {
        self.university
            .as_ref()
            .map(|u| u.name.as_str())
            .unwrap_or("University not specified")
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub id: RecordId,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub start_date: Option<String>,
    #[serde(default)]
    pub end_date: Option<String>,
    #[serde(default)]
    pub organizer: Option<String>,
    #[serde(default)]
    pub event_url: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default = "default_active")]
    pub is_active: bool,
    #[serde(default)]
    pub courses: Option<Vec<Course>>,
    #[serde(default)]
    pub created_at: Option<String>,
}

impl Event {
    /// Course IDs currently linked to this event; absent means none.
    pub fn course_ids(&self) -> BTreeSet<RecordId> {
        self.courses
            .iter()
            .flatten()
            .map(|course| course.id)
            .collect()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UniversityForm {
    pub name: String,
    pub location: String,
    pub website: String,
    pub description: String,
    pub logo_url: String,
    pub is_active: bool,
}

impl From<&University> for UniversityForm {
    fn from(u: &University) -> Self {
        Self {
            name: u.name.clone(),
            location: u.location.clone().unwrap_or_default(),
            website: u.website.clone().unwrap_or_default(),
            description: u.description.clone().unwrap_or_default(),
            logo_url: u.logo_url.clone().unwrap_or_default(),
            is_active: u.is_active,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseForm {
    pub title: String,
    pub description: String,
    pub duration: String,
    pub level: String,
    pub course_url: String,
    pub image_url: String,
    pub is_active: bool,
    pub university_id: RecordId,
}

impl From<&Course> for CourseForm {
    fn from(c: &Course) -> Self {
        Self {
            title: c.title.clone(),
            description: c.description.clone().unwrap_or_default(),
            duration: c.duration.clone().unwrap_or_default(),
            level: c.level.clone().unwrap_or_default(),
            course_url: c.course_url.clone().unwrap_or_default(),
            image_url: c.image_url.clone().unwrap_or_default(),
            is_active: c.is_active,
            university_id: c
                .university_id
                .or_else(|| c.university.as_ref().map(|u| u.id))
                .unwrap_or_default(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventForm {
    pub name: String,
    pub description: String,
    pub location: String,
    /// `YYYY-MM-DD` or empty.
    pub start_date: String,
    pub end_date: String,
    pub organizer: String,
    pub event_url: String,
    pub image_url: String,
    pub is_active: bool,
}

impl From<&Event> for EventForm {
    fn from(e: &Event) -> Self {
        Self {
            name: e.name.clone(),
            description: e.description.clone().unwrap_or_default(),
            location: e.location.clone().unwrap_or_default(),
            start_date: e.start_date.as_deref().map(date_part).unwrap_or_default(),
            end_date: e.end_date.as_deref().map(date_part).unwrap_or_default(),
            organizer: e.organizer.clone().unwrap_or_default(),
            event_url: e.event_url.clone().unwrap_or_default(),
            image_url: e.image_url.clone().unwrap_or_default(),
            is_active: e.is_active,
        }
    }
}

/// UTC calendar date of an RFC 3339 timestamp (`2024-05-01T09:00:00Z` -> `2024-05-01`).
///
/// Values that do not parse fall back to the text before `T`.
pub fn date_part(timestamp: &str) -> String {
    match DateTime::parse_from_rfc3339(timestamp) {
        Ok(parsed) => parsed
            .with_timezone(&Utc)
            .date_naive()
            .format("%Y-%m-%d")
            .to_string(),
        Err(_) => timestamp
            .split_once('T')
            .map(|(date, _)| date)
            .unwrap_or(timestamp)
            .to_string(),
    }
}
