//! Content counts for the admin landing page.

use serde::{Deserialize, Serialize};
use tracing::instrument;
use utoipa::ToSchema;

use crate::db::{errors::Result, persistence::Stores};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct DashboardStats {
    pub projects: i64,
    pub testimonials: i64,
    pub blogs: i64,
    pub inquiries: i64,
}

impl DashboardStats {
    #[instrument(skip(stores), err)]
    pub async fn load(stores: &Stores) -> Result<Self> {
        let (projects, testimonials, blogs, inquiries) = tokio::try_join!(
            stores.projects.count(),
            stores.testimonials.count(),
            stores.blogs.count(),
            stores.inquiries.count(),
        )?;

        Ok(Self {
            projects,
            testimonials,
            blogs,
            inquiries,
        })
    }
}
