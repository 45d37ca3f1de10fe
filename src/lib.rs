pub mod api;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod routes;
pub mod session;
pub mod sync;

pub use api::{
    ApiClient, ApiRequest, ApiResponse, Course, CourseForm, Event, EventForm, HttpTransport, Page,
    PageRequest, RecordId, Resource, Resources, Transport, University, UniversityForm,
};
pub use config::AdminConfig;
pub use dashboard::DashboardStats;
pub use error::{AdminError, Result};
pub use routes::{Navigator, Route};
pub use session::{FileStorage, MemoryStorage, SessionStorage, SessionStore, UserProfile};
pub use sync::{save_event, LinkPlan, LinkStore, Reconciler, SaveMode, SavedEvent, SyncReport};
