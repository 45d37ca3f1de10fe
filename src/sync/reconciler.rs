//! Association Reconciler
//!
//! Makes a backend-stored link set match a desired set with independent
//! attach/detach calls. Calls run one at a time; there is no rollback, and
//! the first failure stops the run. A re-run converges because the current
//! set is re-read from the backend each time.

use std::collections::BTreeSet;

use async_trait::async_trait;

use crate::api::{Event, RecordId, Resources};
use crate::error::{AdminError, Result};

/// Backend operations on a parent's link set.
#[async_trait]
pub trait LinkStore: Send + Sync {
    async fn current_links(&self, parent: RecordId) -> Result<BTreeSet<RecordId>>;
    async fn attach(&self, parent: RecordId, child: RecordId) -> Result<()>;
    async fn detach(&self, parent: RecordId, child: RecordId) -> Result<()>;
}

#[async_trait]
impl LinkStore for Resources<Event> {
    async fn current_links(&self, parent: RecordId) -> Result<BTreeSet<RecordId>> {
        self.course_ids(parent).await
    }

    async fn attach(&self, parent: RecordId, child: RecordId) -> Result<()> {
        self.attach_course(parent, child).await
    }

    async fn detach(&self, parent: RecordId, child: RecordId) -> Result<()> {
        self.detach_course(parent, child).await
    }
}

/// Whether the parent record existed before this save.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveMode {
    /// Parent was just created; its link set is empty.
    Create,
    /// Parent existed; its link set is fetched before diffing.
    Edit,
}

/// The add/remove operations that turn `current` into `desired`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LinkPlan {
    pub to_add: BTreeSet<RecordId>,
    pub to_remove: BTreeSet<RecordId>,
}

impl LinkPlan {
    pub fn diff(desired: &BTreeSet<RecordId>, current: &BTreeSet<RecordId>) -> Self {
        Self {
            to_add: desired.difference(current).copied().collect(),
            to_remove: current.difference(desired).copied().collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.to_add.is_empty() && self.to_remove.is_empty()
    }

    pub fn len(&self) -> usize {
        self.to_add.len() + self.to_remove.len()
    }
}

/// What a completed reconcile run changed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncReport {
    pub attached: Vec<RecordId>,
    pub detached: Vec<RecordId>,
}

impl SyncReport {
    pub fn applied(&self) -> usize {
        self.attached.len() + self.detached.len()
    }
}

pub struct Reconciler<'a, S: LinkStore + ?Sized> {
    store: &'a S,
}

impl<'a, S: LinkStore + ?Sized> Reconciler<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    /// Computes the plan for `parent`. In edit mode the current set is read
    /// from the backend, never from caller state.
    pub async fn plan(
        &self,
        parent: RecordId,
        desired: &BTreeSet<RecordId>,
        mode: SaveMode,
    ) -> Result<LinkPlan> {
        let current = match mode {
            SaveMode::Create => BTreeSet::new(),
            SaveMode::Edit => self.store.current_links(parent).await?,
        };
        Ok(LinkPlan::diff(desired, &current))
    }

    /// Plans and applies. If a call fails after earlier ones succeeded, the
    /// error is wrapped in [`AdminError::PartialSync`].
    pub async fn reconcile(
        &self,
        parent: RecordId,
        desired: &BTreeSet<RecordId>,
        mode: SaveMode,
    ) -> Result<SyncReport> {
        let plan = self.plan(parent, desired, mode).await?;
        self.apply(parent, &plan).await
    }

    pub async fn apply(&self, parent: RecordId, plan: &LinkPlan) -> Result<SyncReport> {
        let mut report = SyncReport::default();
        if plan.is_empty() {
            tracing::debug!("Links of {} already up to date", parent);
            return Ok(report);
        }

        for &child in &plan.to_add {
            if let Err(e) = self.store.attach(parent, child).await {
                return Err(partial(e, &report, parent));
            }
            report.attached.push(child);
        }

        for &child in &plan.to_remove {
            if let Err(e) = self.store.detach(parent, child).await {
                return Err(partial(e, &report, parent));
            }
            report.detached.push(child);
        }

        tracing::debug!(
            "Links of {}: attached {:?}, detached {:?}",
            parent,
            report.attached,
            report.detached
        );
        Ok(report)
    }
}

fn partial(error: AdminError, report: &SyncReport, parent: RecordId) -> AdminError {
    let applied = report.applied();
    if applied == 0 {
        return error;
    }
    tracing::warn!(
        "Link sync for {} stopped after {} change(s): {}",
        parent,
        applied,
        error
    );
    AdminError::PartialSync {
        applied,
        source: Box::new(error),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;

    fn set(ids: &[RecordId]) -> BTreeSet<RecordId> {
        ids.iter().copied().collect()
    }

    #[derive(Debug, Clone, PartialEq, Eq)]
    enum Call {
        Fetch,
        Attach(RecordId),
        Detach(RecordId),
    }

    #[derive(Default)]
    struct FakeLinks {
        links: Mutex<BTreeSet<RecordId>>,
        calls: Mutex<Vec<Call>>,
        fail_on: Option<RecordId>,
    }

    impl FakeLinks {
        fn with(ids: &[RecordId]) -> Self {
            Self {
                links: Mutex::new(set(ids)),
                ..Default::default()
            }
        }

        fn calls(&self) -> Vec<Call> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl LinkStore for FakeLinks {
        async fn current_links(&self, _parent: RecordId) -> Result<BTreeSet<RecordId>> {
            self.calls.lock().unwrap().push(Call::Fetch);
            Ok(self.links.lock().unwrap().clone())
        }

        async fn attach(&self, _parent: RecordId, child: RecordId) -> Result<()> {
            self.calls.lock().unwrap().push(Call::Attach(child));
            if self.fail_on == Some(child) {
                return Err(AdminError::Network("connection reset".to_string()));
            }
            self.links.lock().unwrap().insert(child);
            Ok(())
        }

        async fn detach(&self, _parent: RecordId, child: RecordId) -> Result<()> {
            self.calls.lock().unwrap().push(Call::Detach(child));
            if self.fail_on == Some(child) {
                return Err(AdminError::Network("connection reset".to_string()));
            }
            self.links.lock().unwrap().remove(&child);
            Ok(())
        }
    }

    #[test]
    fn test_diff_edit() {
        let plan = LinkPlan::diff(&set(&[2, 3, 4]), &set(&[1, 2, 3]));
        assert_eq!(plan.to_add, set(&[4]));
        assert_eq!(plan.to_remove, set(&[1]));
        assert_eq!(plan.len(), 2);
    }

    #[test]
    fn test_diff_from_empty() {
        let plan = LinkPlan::diff(&set(&[5, 6]), &set(&[]));
        assert_eq!(plan.to_add, set(&[5, 6]));
        assert!(plan.to_remove.is_empty());
    }

    #[test]
    fn test_diff_equal_sets() {
        let plan = LinkPlan::diff(&set(&[1, 2, 3]), &set(&[1, 2, 3]));
        assert!(plan.is_empty());
    }

    #[tokio::test]
    async fn test_create_skips_fetch() {
        let store = FakeLinks::with(&[9]);
        let report = Reconciler::new(&store)
            .reconcile(1, &set(&[5, 6]), SaveMode::Create)
            .await
            .unwrap();

        assert_eq!(report.attached, vec![5, 6]);
        assert!(report.detached.is_empty());
        assert_eq!(store.calls(), vec![Call::Attach(5), Call::Attach(6)]);
    }

    #[tokio::test]
    async fn test_edit_fetches_then_applies() {
        let store = FakeLinks::with(&[1, 2, 3]);
        let report = Reconciler::new(&store)
            .reconcile(1, &set(&[2, 3, 4]), SaveMode::Edit)
            .await
            .unwrap();

        assert_eq!(report.attached, vec![4]);
        assert_eq!(report.detached, vec![1]);
        assert_eq!(
            store.calls(),
            vec![Call::Fetch, Call::Attach(4), Call::Detach(1)]
        );
        assert_eq!(*store.links.lock().unwrap(), set(&[2, 3, 4]));
    }

    #[tokio::test]
    async fn test_no_calls_when_in_sync() {
        let store = FakeLinks::with(&[1, 2]);
        let report = Reconciler::new(&store)
            .reconcile(1, &set(&[1, 2]), SaveMode::Edit)
            .await
            .unwrap();

        assert_eq!(report.applied(), 0);
        assert_eq!(store.calls(), vec![Call::Fetch]);
    }

    #[tokio::test]
    async fn test_partial_failure_then_rerun_converges() {
        let mut store = FakeLinks::with(&[1]);
        store.fail_on = Some(1);

        let err = Reconciler::new(&store)
            .reconcile(7, &set(&[2, 3]), SaveMode::Edit)
            .await
            .unwrap_err();
        match err {
            AdminError::PartialSync { applied, .. } => assert_eq!(applied, 2),
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(*store.links.lock().unwrap(), set(&[1, 2, 3]));

        store.fail_on = None;
        let report = Reconciler::new(&store)
            .reconcile(7, &set(&[2, 3]), SaveMode::Edit)
            .await
            .unwrap();
        assert!(report.attached.is_empty());
        assert_eq!(report.detached, vec![1]);
        assert_eq!(*store.links.lock().unwrap(), set(&[2, 3]));
    }

    #[tokio::test]
    async fn test_first_call_failure_is_not_partial() {
        let mut store = FakeLinks::with(&[]);
        store.fail_on = Some(4);

        let err = Reconciler::new(&store)
            .reconcile(7, &set(&[4]), SaveMode::Create)
            .await
            .unwrap_err();
        assert!(matches!(err, AdminError::Network(_)));
    }
}
