//! Database models for contact form inquiries.

use std::{fmt, str::FromStr, sync::Arc};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::db::persistence::{Persistence, Record, Stores};
use crate::types::InquiryId;

/// Triage state of an inquiry. New rows always start as [`InquiryStatus::New`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "inquiry_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum InquiryStatus {
    #[default]
    New,
    Contacted,
    Closed,
}

impl InquiryStatus {
    pub const ALL: [InquiryStatus; 3] = [InquiryStatus::New, InquiryStatus::Contacted, InquiryStatus::Closed];

    pub fn as_str(&self) -> &'static str {
        match self {
            InquiryStatus::New => "new",
            InquiryStatus::Contacted => "contacted",
            InquiryStatus::Closed => "closed",
        }
    }
}

impl fmt::Display for InquiryStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for InquiryStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        InquiryStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| format!("Unknown inquiry status: {s}"))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct ContactInquiry {
    #[schema(value_type = String, format = "uuid")]
    pub id: InquiryId,
    pub name: String,
    pub email: String,
    pub company: Option<String>,
    pub project_type: Option<String>,
    pub budget_range: Option<String>,
    pub message: String,
    pub status: InquiryStatus,
    pub created_at: DateTime<Utc>,
}

/// Row written by the contact form. Status is always set server side.
#[derive(Debug, Clone, PartialEq)]
pub struct InquiryCreateDBRequest {
    pub name: String,
    pub email: String,
    pub company: Option<String>,
    pub project_type: Option<String>,
    pub budget_range: Option<String>,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct InquiryUpdateDBRequest {
    pub status: InquiryStatus,
}

#[derive(Debug, Clone, Default)]
pub struct InquiryFilter {
    pub status: Option<InquiryStatus>,
}

impl Record for ContactInquiry {
    type Create = InquiryCreateDBRequest;
    type Update = InquiryUpdateDBRequest;
    type Filter = InquiryFilter;

    const TABLE: &'static str = "contact_inquiries";

    fn id(&self) -> Uuid {
        self.id
    }

    fn store(stores: &Stores) -> &Arc<dyn Persistence<Self>> {
        &stores.inquiries
    }
}
