use std::collections::BTreeSet;
use std::marker::PhantomData;

use serde::de::DeserializeOwned;
use serde::Serialize;

use super::client::ApiClient;
use super::models::{Course, CourseForm, Event, EventForm, Page, PageRequest, RecordId, University, UniversityForm};
use super::transport::ApiRequest;
use crate::error::Result;

/// A record type served under `/{PATH}` with the usual CRUD endpoints.
pub trait Resource: DeserializeOwned + Send + 'static {
    const PATH: &'static str;
    /// Singular name for messages ("university").
    const NOUN: &'static str;
    type Form: Serialize + Sync;

    fn id(&self) -> RecordId;
}

impl Resource for University {
    const PATH: &'static str = "/universities";
    const NOUN: &'static str = "university";
    type Form = UniversityForm;

    fn id(&self) -> RecordId {
        self.id
    }
}

impl Resource for Course {
    const PATH: &'static str = "/courses";
    const NOUN: &'static str = "course";
    type Form = CourseForm;

    fn id(&self) -> RecordId {
        self.id
    }
}

impl Resource for Event {
    const PATH: &'static str = "/events";
    const NOUN: &'static str = "event";
    type Form = EventForm;

    fn id(&self) -> RecordId {
        self.id
    }
}

/// Typed CRUD access to one resource. Nothing is cached: every call hits the backend.
pub struct Resources<R> {
    client: ApiClient,
    _record: PhantomData<fn() -> R>,
}

impl<R> Clone for Resources<R> {
    fn clone(&self) -> Self {
        Self {
            client: self.client.clone(),
            _record: PhantomData,
        }
    }
}

impl<R: Resource> Resources<R> {
    pub fn new(client: ApiClient) -> Self {
        Self {
            client,
            _record: PhantomData,
        }
    }

    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    fn item_path(id: RecordId) -> String {
        format!("{}/{}", R::PATH, id)
    }

    pub async fn list(&self, page: PageRequest) -> Result<Page<R>> {
        let request = ApiRequest::get(R::PATH)
            .query("page", page.page)
            .query("limit", page.limit);
        self.client.get_json(request).await
    }

    /// Total number of records, read from a one-row page.
    pub async fn count(&self) -> Result<u64> {
        let request = ApiRequest::get(R::PATH).query("limit", 1);
        let page: Page<serde_json::Value> = self.client.get_json(request).await?;
        Ok(page.total)
    }

    pub async fn get(&self, id: RecordId) -> Result<R> {
        self.client.get_json(ApiRequest::get(Self::item_path(id))).await
    }

    pub async fn create(&self, form: &R::Form) -> Result<R> {
        let request = ApiRequest::post(R::PATH).json(form)?;
        self.client.get_json(request).await
    }

    pub async fn update(&self, id: RecordId, form: &R::Form) -> Result<()> {
        let request = ApiRequest::patch(Self::item_path(id)).json(form)?;
        self.client.send_discard(request).await
    }

    pub async fn delete(&self, id: RecordId) -> Result<()> {
        self.client
            .send_discard(ApiRequest::delete(Self::item_path(id)))
            .await
    }
}

impl Resources<Event> {
    /// Fresh read of the event's linked course IDs.
    pub async fn course_ids(&self, event_id: RecordId) -> Result<BTreeSet<RecordId>> {
        Ok(self.get(event_id).await?.course_ids())
    }

    pub async fn attach_course(&self, event_id: RecordId, course_id: RecordId) -> Result<()> {
        let path = format!("{}/{}/courses/{}", Event::PATH, event_id, course_id);
        self.client.send_discard(ApiRequest::post(path)).await
    }

    pub async fn detach_course(&self, event_id: RecordId, course_id: RecordId) -> Result<()> {
        let path = format!("{}/{}/courses/{}", Event::PATH, event_id, course_id);
        self.client.send_discard(ApiRequest::delete(path)).await
    }
}

impl ApiClient {
    pub fn universities(&self) -> Resources<University> {
        Resources::new(self.clone())
    }

    pub fn courses(&self) -> Resources<Course> {
        Resources::new(self.clone())
    }

    pub fn events(&self) -> Resources<Event> {
        Resources::new(self.clone())
    }
}
