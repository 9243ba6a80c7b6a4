//! Database models for newsletter subscribers.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::db::persistence::{Persistence, Record, Stores};
use crate::types::SubscriberId;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Subscriber {
    #[schema(value_type = String, format = "uuid")]
    pub id: SubscriberId,
    /// Unique across all subscribers
    pub email: String,
    pub is_active: bool,
    pub subscribed_at: DateTime<Utc>,
    pub unsubscribed_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SubscriberCreateDBRequest {
    pub email: String,
}

/// Toggle a subscription. Deactivating stamps `unsubscribed_at`, reactivating clears it.
#[derive(Debug, Clone, PartialEq)]
pub struct SubscriberUpdateDBRequest {
    pub is_active: bool,
}

#[derive(Debug, Clone, Default)]
pub struct SubscriberFilter {
    pub active: Option<bool>,
}

impl Record for Subscriber {
    type Create = SubscriberCreateDBRequest;
    type Update = SubscriberUpdateDBRequest;
    type Filter = SubscriberFilter;

    const TABLE: &'static str = "newsletter_subscribers";

    fn id(&self) -> Uuid {
        self.id
    }

    fn store(stores: &Stores) -> &Arc<dyn Persistence<Self>> {
        &stores.subscribers
    }
}
