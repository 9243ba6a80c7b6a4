//! Generic back office controller for editable content.
//!
//! An [`AdminList`] keeps the last fetched list of any [`Listed`] record and deletes from it. One
//! [`AdminCrud`] adds the edit dialog for [`Editable`] records (projects, testimonials and blog
//! posts): at most one open dialog holding a draft and the record being edited (none when
//! creating). The inquiry desk builds on the bare list.
//!
//! Writes are never applied to the cached list directly. A failed adapter call emits an error
//! notification and leaves the list and the open dialog as they were; a successful one closes the
//! dialog and refetches the whole list.

use std::{fmt::Debug, sync::Arc};

use chrono::{DateTime, Utc};
use serde::{Serialize, de::DeserializeOwned};
use thiserror::Error;
use tracing::{debug, instrument};
use uuid::Uuid;

use crate::db::{
    errors::DbError,
    persistence::{ListQuery, Persistence, Record, Stores},
};
use crate::forms::validation::FieldError;
use crate::notifications::{Notification, Notifier};
use crate::types::abbrev_uuid;

/// A record the back office lists and deletes.
pub trait Listed: Record {
    /// Singular name used in notifications, e.g. "Blog post"
    const LABEL: &'static str;
    /// Plural name used in notifications, e.g. "projects"
    const PLURAL: &'static str;

    /// The query behind the admin list
    fn list_query() -> ListQuery<Self::Filter> {
        ListQuery::default()
    }
}

/// A record the back office can create and edit through a flat text draft.
pub trait Editable: Listed {
    /// Dialog contents: plain strings, flags and numbers
    type Draft: Debug + Clone + Default + PartialEq + Serialize + DeserializeOwned + Send + Sync + 'static;

    fn to_draft(&self) -> Self::Draft;

    /// Convert a draft into the columns to write. `editing` is the record the dialog was opened
    /// for, if any.
    fn from_draft(draft: &Self::Draft, editing: Option<&Self>, now: DateTime<Utc>) -> Result<Self::Create, Vec<FieldError>>;

    fn into_update(fields: Self::Create) -> Self::Update;
}

/// A record that can be published and unpublished in place.
pub trait Publishable: Editable {
    /// Short name used in publish notifications, e.g. "Blog"
    const NOUN: &'static str;

    fn is_published(&self) -> bool;

    /// The update that flips the published flag. `published_at` is stamped on every move into the
    /// published state and never cleared.
    fn toggled(&self, now: DateTime<Utc>) -> Self::Update;
}

#[derive(Debug, Error)]
pub enum AdminError {
    #[error("draft failed validation")]
    Invalid(Vec<FieldError>),

    #[error("deletion was not confirmed")]
    ConfirmationRequired,

    #[error(transparent)]
    Persistence(#[from] DbError),
}

impl AdminError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, AdminError::Persistence(DbError::NotFound))
    }
}

/// The last fetched list of one table. Every successful write through it refetches the list.
pub struct AdminList<R: Listed> {
    store: Arc<dyn Persistence<R>>,
    records: Vec<R>,
}

impl<R: Listed> AdminList<R> {
    pub fn new(store: Arc<dyn Persistence<R>>) -> Self {
        Self {
            store,
            records: Vec::new(),
        }
    }

    pub fn from_stores(stores: &Stores) -> Self {
        Self::new(R::store(stores).clone())
    }

    pub fn store(&self) -> &Arc<dyn Persistence<R>> {
        &self.store
    }

    /// The list as of the last successful fetch
    pub fn records(&self) -> &[R] {
        &self.records
    }

    /// Refetch the list. On failure the previous list is kept.
    #[instrument(skip(self, notifier), fields(table = R::TABLE), err)]
    pub async fn refresh(&mut self, notifier: &dyn Notifier) -> Result<&[R], AdminError> {
        match self.store.list(&R::list_query()).await {
            Ok(records) => {
                self.records = records;
                Ok(&self.records)
            }
            Err(err) => {
                notifier.notify(Notification::error(format!("Error loading {}", R::PLURAL)));
                Err(err.into())
            }
        }
    }

    /// Delete a record. Nothing is sent to the store unless `confirmed` is set.
    #[instrument(skip(self, notifier), fields(table = R::TABLE, id = %abbrev_uuid(&id)), err)]
    pub async fn remove(&mut self, id: Uuid, confirmed: bool, notifier: &dyn Notifier) -> Result<(), AdminError> {
        if !confirmed {
            return Err(AdminError::ConfirmationRequired);
        }

        match self.store.delete(id).await {
            Ok(()) => {
                notifier.notify(Notification::success(format!("{} deleted", R::LABEL)));
                self.refetch_after_write(notifier).await;
                Ok(())
            }
            Err(err) => {
                notifier.notify(
                    Notification::error(format!("Error deleting {}", R::LABEL.to_lowercase())).with_description(err.user_message()),
                );
                Err(err.into())
            }
        }
    }

    pub(crate) async fn refetch_after_write(&mut self, notifier: &dyn Notifier) {
        // The write itself succeeded; a failed refetch has already been reported
        if let Err(err) = self.refresh(notifier).await {
            debug!(error = %err, "refetch after write failed");
        }
    }
}

struct Dialog<R: Editable> {
    editing: Option<R>,
    draft: R::Draft,
}

pub struct AdminCrud<R: Editable> {
    list: AdminList<R>,
    dialog: Option<Dialog<R>>,
}

impl<R: Editable> AdminCrud<R> {
    pub fn new(store: Arc<dyn Persistence<R>>) -> Self {
        Self {
            list: AdminList::new(store),
            dialog: None,
        }
    }

    pub fn from_stores(stores: &Stores) -> Self {
        Self::new(R::store(stores).clone())
    }

    pub fn records(&self) -> &[R] {
        self.list.records()
    }

    pub fn draft(&self) -> Option<&R::Draft> {
        self.dialog.as_ref().map(|dialog| &dialog.draft)
    }

    /// The record the open dialog edits. `None` when creating or when no dialog is open.
    pub fn editing(&self) -> Option<&R> {
        self.dialog.as_ref().and_then(|dialog| dialog.editing.as_ref())
    }

    pub fn close(&mut self) {
        self.dialog = None;
    }

    pub async fn refresh(&mut self, notifier: &dyn Notifier) -> Result<&[R], AdminError> {
        self.list.refresh(notifier).await
    }

    pub async fn remove(&mut self, id: Uuid, confirmed: bool, notifier: &dyn Notifier) -> Result<(), AdminError> {
        self.list.remove(id, confirmed, notifier).await
    }

    /// Open an empty dialog for a new record.
    pub fn open_create(&mut self) -> &R::Draft {
        let dialog = self.dialog.insert(Dialog {
            editing: None,
            draft: R::Draft::default(),
        });
        &dialog.draft
    }

    /// Open a dialog pre-populated from `record`.
    pub fn open_edit(&mut self, record: R) -> &R::Draft {
        let draft = record.to_draft();
        let dialog = self.dialog.insert(Dialog {
            editing: Some(record),
            draft,
        });
        &dialog.draft
    }

    /// Fetch a record by id and open it for editing.
    pub async fn open_edit_by_id(&mut self, id: Uuid) -> Result<&R::Draft, AdminError> {
        let record = self.list.store().get(id).await?.ok_or(DbError::NotFound)?;
        Ok(self.open_edit(record))
    }

    /// Save `draft` through the open dialog: an update when it was opened for a record, an insert
    /// otherwise (including when no dialog is open).
    #[instrument(skip(self, draft, notifier), fields(table = R::TABLE), err)]
    pub async fn save(&mut self, draft: R::Draft, notifier: &dyn Notifier) -> Result<R, AdminError> {
        let editing = self.dialog.take().and_then(|dialog| dialog.editing);

        let fields = match R::from_draft(&draft, editing.as_ref(), Utc::now()) {
            Ok(fields) => fields,
            Err(errors) => {
                self.dialog = Some(Dialog { editing, draft });
                return Err(AdminError::Invalid(errors));
            }
        };

        let result = match &editing {
            Some(record) => self.list.store().update(record.id(), &R::into_update(fields)).await,
            None => self.list.store().insert(&fields).await,
        };

        match result {
            Ok(saved) => {
                let verb = if editing.is_some() { "updated" } else { "created" };
                notifier.notify(Notification::success(format!("{} {verb} successfully", R::LABEL)));
                debug!(id = %abbrev_uuid(&saved.id()), "{} {verb}", R::TABLE);
                self.list.refetch_after_write(notifier).await;
                Ok(saved)
            }
            Err(err) => {
                notifier.notify(
                    Notification::error(format!("Error saving {}", R::LABEL.to_lowercase())).with_description(err.user_message()),
                );
                self.dialog = Some(Dialog { editing, draft });
                Err(err.into())
            }
        }
    }
}

impl<R: Publishable> AdminCrud<R> {
    /// Flip the published flag of `record`.
    #[instrument(skip(self, record, notifier), fields(table = R::TABLE, id = %abbrev_uuid(&record.id())), err)]
    pub async fn toggle_publish(&mut self, record: &R, notifier: &dyn Notifier) -> Result<R, AdminError> {
        match self.list.store().update(record.id(), &record.toggled(Utc::now())).await {
            Ok(updated) => {
                let title = if updated.is_published() {
                    format!("{} published", R::NOUN)
                } else {
                    format!("{} unpublished", R::NOUN)
                };
                notifier.notify(Notification::success(title));
                self.list.refetch_after_write(notifier).await;
                Ok(updated)
            }
            Err(err) => {
                notifier.notify(
                    Notification::error(format!("Error updating {}", R::NOUN.to_lowercase())).with_description(err.user_message()),
                );
                Err(err.into())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::admin::{blogs::BlogDraft, projects::ProjectDraft};
    use crate::db::{
        in_memory::InMemoryStore,
        models::{
            blogs::BlogPost,
            projects::{Project, ProjectFields},
        },
    };
    use crate::notifications::{NotificationBuffer, Severity};
    use async_trait::async_trait;
    use parking_lot::Mutex;

    /// Records every update patch before handing it to an in-memory store.
    #[derive(Default)]
    struct RecordingProjects {
        inner: InMemoryStore<Project>,
        updates: Mutex<Vec<(Uuid, ProjectFields)>>,
    }

    #[async_trait]
    impl Persistence<Project> for RecordingProjects {
        async fn insert(&self, request: &ProjectFields) -> crate::db::errors::Result<Project> {
            self.inner.insert(request).await
        }

        async fn update(&self, id: Uuid, request: &ProjectFields) -> crate::db::errors::Result<Project> {
            self.updates.lock().push((id, request.clone()));
            self.inner.update(id, request).await
        }

        async fn delete(&self, id: Uuid) -> crate::db::errors::Result<()> {
            self.inner.delete(id).await
        }

        async fn get(&self, id: Uuid) -> crate::db::errors::Result<Option<Project>> {
            self.inner.get(id).await
        }

        async fn list(&self, query: &ListQuery<<Project as Record>::Filter>) -> crate::db::errors::Result<Vec<Project>> {
            self.inner.list(query).await
        }

        async fn count(&self) -> crate::db::errors::Result<i64> {
            self.inner.count().await
        }
    }

    fn project_draft(title: &str, display_order: i32) -> ProjectDraft {
        ProjectDraft {
            title: title.to_string(),
            display_order,
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_create_refetches_list_in_display_order() {
        let stores = Stores::in_memory();
        let notifications = NotificationBuffer::new();
        let mut crud = AdminCrud::<Project>::from_stores(&stores);

        crud.open_create();
        crud.save(project_draft("Second Project", 2), &notifications).await.unwrap();
        crud.open_create();
        crud.save(project_draft("First Project", 1), &notifications).await.unwrap();

        let titles: Vec<_> = crud.records().iter().map(|p| p.title.as_str()).collect();
        assert_eq!(titles, vec!["First Project", "Second Project"]);
        assert_eq!(crud.records()[0].slug, "first-project");
        assert!(crud.draft().is_none());

        let emitted = notifications.drain();
        assert_eq!(emitted.len(), 2);
        assert!(emitted.iter().all(|n| n.title == "Project created successfully"));
    }

    #[tokio::test]
    async fn test_unchanged_edit_saves_identical_fields() {
        let store = Arc::new(RecordingProjects::default());
        let notifications = NotificationBuffer::new();
        let mut crud = AdminCrud::<Project>::new(store.clone());

        crud.open_create();
        let created = crud
            .save(
                ProjectDraft {
                    title: "Clinic Portal".to_string(),
                    slug: "clinic".to_string(),
                    description: "Booking for a dental chain".to_string(),
                    industry: "Healthcare".to_string(),
                    stack_frontend: "React, TypeScript".to_string(),
                    stack_database: "Postgres".to_string(),
                    results: "Fewer no-shows\nFaster check-in".to_string(),
                    is_featured: true,
                    display_order: 3,
                    testimonial_author: "Dr. Lee".to_string(),
                    ..Default::default()
                },
                &notifications,
            )
            .await
            .unwrap();

        let draft = crud.open_edit(created.clone()).clone();
        let updated = crud.save(draft, &notifications).await.unwrap();

        let updates = store.updates.lock().clone();
        assert_eq!(updates.len(), 1);
        assert_eq!(updates[0].0, created.id);
        assert_eq!(updates[0].1, ProjectFields::from(&created));
        assert_eq!(ProjectFields::from(&updated), ProjectFields::from(&created));
        assert_eq!(notifications.drain()[1].title, "Project updated successfully");
    }

    #[tokio::test]
    async fn test_failed_save_keeps_list_and_dialog() {
        let stores = Stores::in_memory();
        let notifications = NotificationBuffer::new();
        let mut crud = AdminCrud::<Project>::from_stores(&stores);

        crud.open_create();
        crud.save(project_draft("Same Name", 0), &notifications).await.unwrap();
        let before = crud.records().to_vec();
        notifications.drain();

        crud.open_create();
        let duplicate = project_draft("Same  Name", 1);
        let err = crud.save(duplicate.clone(), &notifications).await.unwrap_err();

        assert!(matches!(err, AdminError::Persistence(DbError::UniqueViolation { .. })));
        assert_eq!(crud.records(), before.as_slice());
        assert_eq!(crud.draft(), Some(&duplicate));
        assert!(crud.editing().is_none());

        let emitted = notifications.drain();
        assert_eq!(emitted.len(), 1);
        assert_eq!(emitted[0].severity, Severity::Error);
        assert_eq!(emitted[0].title, "Error saving project");
        assert_eq!(emitted[0].description.as_deref(), Some("A project with this slug already exists"));
    }

    #[tokio::test]
    async fn test_invalid_draft_is_not_sent() {
        let stores = Stores::in_memory();
        let notifications = NotificationBuffer::new();
        let mut crud = AdminCrud::<Project>::from_stores(&stores);

        crud.open_create();
        let err = crud.save(project_draft("   ", 0), &notifications).await.unwrap_err();

        let AdminError::Invalid(errors) = err else {
            panic!("expected validation errors");
        };
        assert_eq!(errors[0].field, "title");
        assert_eq!(stores.projects.count().await.unwrap(), 0);
        assert!(crud.draft().is_some());
        assert!(notifications.is_empty());
    }

    #[tokio::test]
    async fn test_remove_requires_confirmation() {
        let stores = Stores::in_memory();
        let notifications = NotificationBuffer::new();
        let mut crud = AdminCrud::<Project>::from_stores(&stores);

        crud.open_create();
        let project = crud.save(project_draft("Keep Me", 0), &notifications).await.unwrap();
        notifications.drain();

        let err = crud.remove(project.id, false, &notifications).await.unwrap_err();
        assert!(matches!(err, AdminError::ConfirmationRequired));
        assert_eq!(stores.projects.count().await.unwrap(), 1);
        assert!(notifications.is_empty());

        crud.remove(project.id, true, &notifications).await.unwrap();
        assert_eq!(stores.projects.count().await.unwrap(), 0);
        assert!(crud.records().is_empty());
        assert_eq!(notifications.drain()[0].title, "Project deleted");

        let err = crud.remove(project.id, true, &notifications).await.unwrap_err();
        assert!(matches!(err, AdminError::Persistence(DbError::NotFound)));
        assert_eq!(notifications.drain()[0].title, "Error deleting project");
    }

    #[tokio::test]
    async fn test_toggle_publish_restamps_each_publication() {
        let stores = Stores::in_memory();
        let notifications = NotificationBuffer::new();
        let mut crud = AdminCrud::<BlogPost>::from_stores(&stores);

        crud.open_create();
        let draft = BlogDraft {
            title: "Shipping Faster".to_string(),
            ..Default::default()
        };
        let post = crud.save(draft, &notifications).await.unwrap();
        assert!(!post.is_published);
        assert_eq!(post.published_at, None);

        let before = Utc::now();
        let published = crud.toggle_publish(&post, &notifications).await.unwrap();
        assert!(published.is_published);
        let stamped = published.published_at.expect("published_at is set");
        assert!(stamped >= before && stamped <= Utc::now());

        let unpublished = crud.toggle_publish(&published, &notifications).await.unwrap();
        assert!(!unpublished.is_published);
        assert_eq!(unpublished.published_at, Some(stamped));

        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        let republished = crud.toggle_publish(&unpublished, &notifications).await.unwrap();
        assert!(republished.is_published);
        let restamped = republished.published_at.expect("published_at is set");
        assert!(restamped > stamped);

        let titles: Vec<_> = notifications.drain().into_iter().map(|n| n.title).collect();
        assert_eq!(
            titles,
            vec!["Blog post created successfully", "Blog published", "Blog unpublished", "Blog published"]
        );
        assert_eq!(crud.records()[0].published_at, Some(restamped));
    }

    #[tokio::test]
    async fn test_open_edit_by_unknown_id() {
        let stores = Stores::in_memory();
        let mut crud = AdminCrud::<BlogPost>::from_stores(&stores);

        let err = crud.open_edit_by_id(Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err, AdminError::Persistence(DbError::NotFound)));
        assert!(crud.draft().is_none());
    }
}
