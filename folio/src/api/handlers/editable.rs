//! Shared plumbing for the admin content endpoints.
//!
//! Each request gets a fresh [`AdminCrud`] and a fresh [`NotificationBuffer`]; whatever the
//! controller emitted is returned with the response, success or failure.

use axum::http::StatusCode;
use serde::Serialize;
use uuid::Uuid;

use crate::{
    admin::crud::{AdminCrud, Editable, Publishable},
    api::models::admin::{AdminFailure, AdminResponse, AdminResult, WithStatus},
    db::{errors::DbError, persistence::Stores},
    notifications::NotificationBuffer,
};

pub(crate) async fn list<R: Editable + Serialize>(stores: &Stores) -> AdminResult<Vec<R>> {
    let notifications = NotificationBuffer::new();
    let mut crud = AdminCrud::<R>::from_stores(stores);

    match crud.refresh(&notifications).await {
        Ok(records) => {
            let records = records.to_vec();
            Ok(AdminResponse::new(records, &notifications))
        }
        Err(err) => Err(AdminFailure::new(err, &notifications)),
    }
}

pub(crate) fn blank_draft<R: Editable>(stores: &Stores) -> AdminResponse<R::Draft> {
    let mut crud = AdminCrud::<R>::from_stores(stores);
    let draft = crud.open_create().clone();
    AdminResponse {
        data: draft,
        notifications: Vec::new(),
    }
}

pub(crate) async fn edit_draft<R: Editable>(stores: &Stores, id: Uuid) -> AdminResult<R::Draft> {
    let notifications = NotificationBuffer::new();
    let mut crud = AdminCrud::<R>::from_stores(stores);

    match crud.open_edit_by_id(id).await {
        Ok(draft) => {
            let draft = draft.clone();
            Ok(AdminResponse::new(draft, &notifications))
        }
        Err(err) => Err(AdminFailure::new(err, &notifications)),
    }
}

pub(crate) async fn create<R: Editable + Serialize>(stores: &Stores, draft: R::Draft) -> Result<WithStatus<R>, AdminFailure> {
    let notifications = NotificationBuffer::new();
    let mut crud = AdminCrud::<R>::from_stores(stores);
    crud.open_create();

    match crud.save(draft, &notifications).await {
        Ok(saved) => Ok(WithStatus(StatusCode::CREATED, AdminResponse::new(saved, &notifications))),
        Err(err) => Err(AdminFailure::new(err, &notifications)),
    }
}

pub(crate) async fn update<R: Editable + Serialize>(stores: &Stores, id: Uuid, draft: R::Draft) -> AdminResult<R> {
    let notifications = NotificationBuffer::new();
    let mut crud = AdminCrud::<R>::from_stores(stores);

    if let Err(err) = crud.open_edit_by_id(id).await {
        return Err(AdminFailure::new(err, &notifications));
    }

    match crud.save(draft, &notifications).await {
        Ok(saved) => Ok(AdminResponse::new(saved, &notifications)),
        Err(err) => Err(AdminFailure::new(err, &notifications)),
    }
}

pub(crate) async fn remove<R: Editable>(stores: &Stores, id: Uuid, confirmed: bool) -> AdminResult<()> {
    let notifications = NotificationBuffer::new();
    let mut crud = AdminCrud::<R>::from_stores(stores);

    match crud.remove(id, confirmed, &notifications).await {
        Ok(()) => Ok(AdminResponse::new((), &notifications)),
        Err(err) => Err(AdminFailure::new(err, &notifications)),
    }
}

pub(crate) async fn toggle_publish<R: Publishable + Serialize>(stores: &Stores, id: Uuid) -> AdminResult<R> {
    let notifications = NotificationBuffer::new();

    let record = match R::store(stores).get(id).await {
        Ok(Some(record)) => record,
        Ok(None) => return Err(AdminFailure::new(DbError::NotFound, &notifications)),
        Err(err) => return Err(AdminFailure::new(err, &notifications)),
    };

    let mut crud = AdminCrud::<R>::from_stores(stores);
    match crud.toggle_publish(&record, &notifications).await {
        Ok(updated) => Ok(AdminResponse::new(updated, &notifications)),
        Err(err) => Err(AdminFailure::new(err, &notifications)),
    }
}
