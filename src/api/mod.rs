//! Backend API access: transport seam, the intercepting client and typed resources.

pub mod client;
pub mod models;
pub mod resources;
pub mod transport;

pub use client::{ApiClient, UnauthorizedHook};
pub use models::{
    date_part, total_pages, Course, CourseForm, Event, EventForm, Page, PageRequest, RecordId,
    University, UniversityForm, UniversityRef,
};
pub use resources::{Resource, Resources};
pub use transport::{ApiRequest, ApiResponse, HttpTransport, Transport};
