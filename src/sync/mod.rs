//! Event save flow and course association sync.

pub mod reconciler;

use std::collections::BTreeSet;

pub use reconciler::{LinkPlan, LinkStore, Reconciler, SaveMode, SyncReport};

use crate::api::{Event, EventForm, RecordId, Resource, Resources};
use crate::error::Result;

/// Outcome of [`save_event`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SavedEvent {
    pub id: RecordId,
    pub mode: SaveMode,
    pub links: SyncReport,
}

/// Creates (`id == None`) or updates an event, then makes its course set
/// match `courses`. `None` leaves existing associations untouched.
pub async fn save_event(
    events: &Resources<Event>,
    id: Option<RecordId>,
    form: &EventForm,
    courses: Option<&BTreeSet<RecordId>>,
) -> Result<SavedEvent> {
    let (id, mode) = match id {
        Some(id) => {
            events.update(id, form).await?;
            (id, SaveMode::Edit)
        }
        None => {
            let created = events.create(form).await?;
            tracing::info!("Created event {}", created.id());
            (created.id(), SaveMode::Create)
        }
    };

    let links = match courses {
        Some(desired) => Reconciler::new(events).reconcile(id, desired, mode).await?,
        None => SyncReport::default(),
    };

    Ok(SavedEvent { id, mode, links })
}
