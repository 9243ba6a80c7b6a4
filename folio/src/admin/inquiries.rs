//! Inquiry desk: triage of contact form submissions.

use tracing::instrument;
use uuid::Uuid;

use crate::admin::crud::{AdminError, AdminList, Listed};
use crate::db::{
    models::inquiries::{ContactInquiry, InquiryStatus, InquiryUpdateDBRequest},
    persistence::{ListQuery, Stores},
};
use crate::forms::validation::FieldError;
use crate::notifications::{Notification, Notifier};
use crate::types::abbrev_uuid;

impl Listed for ContactInquiry {
    const LABEL: &'static str = "Inquiry";
    const PLURAL: &'static str = "inquiries";

    fn list_query() -> ListQuery<Self::Filter> {
        ListQuery::default().newest_first()
    }
}

/// The admin list of inquiries plus status changes.
pub struct InquiryDesk {
    list: AdminList<ContactInquiry>,
}

impl InquiryDesk {
    pub fn from_stores(stores: &Stores) -> Self {
        Self {
            list: AdminList::from_stores(stores),
        }
    }

    pub fn inquiries(&self) -> &[ContactInquiry] {
        self.list.records()
    }

    /// Newest first. On failure the previous list is kept.
    pub async fn refresh(&mut self, notifier: &dyn Notifier) -> Result<&[ContactInquiry], AdminError> {
        self.list.refresh(notifier).await
    }

    pub async fn remove(&mut self, id: Uuid, confirmed: bool, notifier: &dyn Notifier) -> Result<(), AdminError> {
        self.list.remove(id, confirmed, notifier).await
    }

    /// Move an inquiry to another status. `status` must be one of `new`, `contacted` or `closed`.
    #[instrument(skip(self, notifier), fields(id = %abbrev_uuid(&id)), err)]
    pub async fn update_status(&mut self, id: Uuid, status: &str, notifier: &dyn Notifier) -> Result<ContactInquiry, AdminError> {
        let status: InquiryStatus = status
            .parse()
            .map_err(|message: String| AdminError::Invalid(vec![FieldError::new("status", message)]))?;

        match self.list.store().update(id, &InquiryUpdateDBRequest { status }).await {
            Ok(updated) => {
                notifier.notify(Notification::success("Status updated"));
                self.list.refetch_after_write(notifier).await;
                Ok(updated)
            }
            Err(err) => {
                notifier.notify(Notification::error("Error updating status").with_description(err.user_message()));
                Err(err.into())
            }
        }
    }
}
