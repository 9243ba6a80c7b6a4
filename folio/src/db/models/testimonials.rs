//! Database models for client testimonials.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::db::persistence::{Persistence, Record, Stores};
use crate::types::TestimonialId;

/// Default star rating for new testimonials.
pub const DEFAULT_RATING: i32 = 5;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Testimonial {
    #[schema(value_type = String, format = "uuid")]
    pub id: TestimonialId,
    pub quote: String,
    pub author_name: String,
    pub author_role: Option<String>,
    pub author_company: Option<String>,
    pub author_image_url: Option<String>,
    /// Star rating between 1 and 5
    pub rating: i32,
    pub is_featured: bool,
    pub display_order: i32,
    pub created_at: DateTime<Utc>,
}

/// Editable columns of a testimonial. Used for both inserts and updates.
#[derive(Debug, Clone, PartialEq)]
pub struct TestimonialFields {
    pub quote: String,
    pub author_name: String,
    pub author_role: Option<String>,
    pub author_company: Option<String>,
    pub author_image_url: Option<String>,
    pub rating: i32,
    pub is_featured: bool,
    pub display_order: i32,
}

impl Default for TestimonialFields {
    fn default() -> Self {
        Self {
            quote: String::new(),
            author_name: String::new(),
            author_role: None,
            author_company: None,
            author_image_url: None,
            rating: DEFAULT_RATING,
            is_featured: false,
            display_order: 0,
        }
    }
}

impl From<&Testimonial> for TestimonialFields {
    fn from(testimonial: &Testimonial) -> Self {
        Self {
            quote: testimonial.quote.clone(),
            author_name: testimonial.author_name.clone(),
            author_role: testimonial.author_role.clone(),
            author_company: testimonial.author_company.clone(),
            author_image_url: testimonial.author_image_url.clone(),
            rating: testimonial.rating,
            is_featured: testimonial.is_featured,
            display_order: testimonial.display_order,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct TestimonialFilter {
    pub featured: Option<bool>,
}

impl Record for Testimonial {
    type Create = TestimonialFields;
    type Update = TestimonialFields;
    type Filter = TestimonialFilter;

    const TABLE: &'static str = "testimonials";

    fn id(&self) -> Uuid {
        self.id
    }

    fn store(stores: &Stores) -> &Arc<dyn Persistence<Self>> {
        &stores.testimonials
    }
}
