use serde::Serialize;

use crate::api::ApiClient;
use crate::error::Result;

/// Record counts shown on the dashboard.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub universities_count: u64,
    pub courses_count: u64,
    pub events_count: u64,
}

impl DashboardStats {
    /// Fetches the three totals concurrently; any failure fails the whole dashboard.
    pub async fn fetch(client: &ApiClient) -> Result<Self> {
        let universities = client.universities();
        let courses = client.courses();
        let events = client.events();

        let (universities_count, courses_count, events_count) =
            tokio::try_join!(universities.count(), courses.count(), events.count())?;

        Ok(Self {
            universities_count,
            courses_count,
            events_count,
        })
    }
}
