//! Testimonial edit dialog.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::admin::{
    crud::{Editable, Listed},
    draft::{none_if_empty, or_empty},
};
use crate::db::models::testimonials::{DEFAULT_RATING, Testimonial, TestimonialFields};
use crate::forms::validation::FieldError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct TestimonialDraft {
    pub quote: String,
    pub author_name: String,
    pub author_role: String,
    pub author_company: String,
    pub author_image_url: String,
    /// 1 to 5 stars
    pub rating: i32,
    pub is_featured: bool,
    pub display_order: i32,
}

impl Default for TestimonialDraft {
    fn default() -> Self {
        Self {
            quote: String::new(),
            author_name: String::new(),
            author_role: String::new(),
            author_company: String::new(),
            author_image_url: String::new(),
            rating: DEFAULT_RATING,
            is_featured: false,
            display_order: 0,
        }
    }
}

impl Listed for Testimonial {
    const LABEL: &'static str = "Testimonial";
    const PLURAL: &'static str = "testimonials";
}

impl Editable for Testimonial {
    type Draft = TestimonialDraft;

    fn to_draft(&self) -> TestimonialDraft {
        TestimonialDraft {
            quote: self.quote.clone(),
            author_name: self.author_name.clone(),
            author_role: or_empty(&self.author_role),
            author_company: or_empty(&self.author_company),
            author_image_url: or_empty(&self.author_image_url),
            rating: self.rating,
            is_featured: self.is_featured,
            display_order: self.display_order,
        }
    }

    fn from_draft(
        draft: &TestimonialDraft,
        _editing: Option<&Self>,
        _now: DateTime<Utc>,
    ) -> Result<TestimonialFields, Vec<FieldError>> {
        let mut errors = Vec::new();
        if draft.quote.trim().is_empty() {
            errors.push(FieldError::new("quote", "Quote is required"));
        }
        if draft.author_name.trim().is_empty() {
            errors.push(FieldError::new("author_name", "Author name is required"));
        }
        if !(1..=5).contains(&draft.rating) {
            errors.push(FieldError::new("rating", "Rating must be between 1 and 5"));
        }
        if !errors.is_empty() {
            return Err(errors);
        }

        Ok(TestimonialFields {
            quote: draft.quote.trim().to_string(),
            author_name: draft.author_name.trim().to_string(),
            author_role: none_if_empty(&draft.author_role),
            author_company: none_if_empty(&draft.author_company),
            author_image_url: none_if_empty(&draft.author_image_url),
            rating: draft.rating,
            is_featured: draft.is_featured,
            display_order: draft.display_order,
        })
    }

    fn into_update(fields: TestimonialFields) -> TestimonialFields {
        fields
    }
}
