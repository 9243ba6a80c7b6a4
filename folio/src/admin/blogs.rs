//! Blog post edit dialog and publishing.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::admin::{
    crud::{Editable, Listed, Publishable},
    draft::{join_list, none_if_empty, or_empty, split_list},
    slug::slug_or_derive,
};
use crate::db::models::blogs::{BlogFields, BlogPost};
use crate::db::persistence::ListQuery;
use crate::forms::validation::FieldError;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct BlogDraft {
    pub title: String,
    /// Derived from the title when left empty
    pub slug: String,
    pub excerpt: String,
    pub content: String,
    pub category: String,
    pub image_url: String,
    pub read_time: String,
    pub is_published: bool,
    pub meta_title: String,
    pub meta_description: String,
    /// Comma separated
    pub meta_keywords: String,
}

impl Listed for BlogPost {
    const LABEL: &'static str = "Blog post";
    const PLURAL: &'static str = "blogs";

    fn list_query() -> ListQuery<Self::Filter> {
        ListQuery::default().newest_first()
    }
}

impl Editable for BlogPost {
    type Draft = BlogDraft;

    fn to_draft(&self) -> BlogDraft {
        BlogDraft {
            title: self.title.clone(),
            slug: self.slug.clone(),
            excerpt: or_empty(&self.excerpt),
            content: or_empty(&self.content),
            category: or_empty(&self.category),
            image_url: or_empty(&self.image_url),
            read_time: or_empty(&self.read_time),
            is_published: self.is_published,
            meta_title: or_empty(&self.meta_title),
            meta_description: or_empty(&self.meta_description),
            meta_keywords: join_list(&self.meta_keywords),
        }
    }

    /// A post saved as published gets a `published_at` the first time only.
    fn from_draft(draft: &BlogDraft, editing: Option<&Self>, now: DateTime<Utc>) -> Result<BlogFields, Vec<FieldError>> {
        let title = draft.title.trim();
        if title.is_empty() {
            return Err(vec![FieldError::new("title", "Title is required")]);
        }

        let previously_published_at = editing.and_then(|post| post.published_at);
        let published_at = match previously_published_at {
            None if draft.is_published => Some(now),
            existing => existing,
        };

        Ok(BlogFields {
            title: title.to_string(),
            slug: slug_or_derive(&draft.slug, title),
            excerpt: none_if_empty(&draft.excerpt),
            content: none_if_empty(&draft.content),
            category: none_if_empty(&draft.category),
            image_url: none_if_empty(&draft.image_url),
            read_time: none_if_empty(&draft.read_time),
            is_published: draft.is_published,
            published_at,
            meta_title: none_if_empty(&draft.meta_title),
            meta_description: none_if_empty(&draft.meta_description),
            meta_keywords: split_list(&draft.meta_keywords),
        })
    }

    fn into_update(fields: BlogFields) -> BlogFields {
        fields
    }
}

impl Publishable for BlogPost {
    const NOUN: &'static str = "Blog";

    fn is_published(&self) -> bool {
        self.is_published
    }

    fn toggled(&self, now: DateTime<Utc>) -> BlogFields {
        let mut fields = BlogFields::from(self);
        fields.is_published = !self.is_published;
        // Every publish restamps; unpublishing keeps the last date
        if fields.is_published {
            fields.published_at = Some(now);
        }
        fields
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn post(is_published: bool, published_at: Option<DateTime<Utc>>) -> BlogPost {
        let now = Utc::now();
        BlogPost {
            id: uuid::Uuid::new_v4(),
            title: "Why We Chose Rust".to_string(),
            slug: "why-we-chose-rust".to_string(),
            excerpt: None,
            content: Some("Body".to_string()),
            category: None,
            image_url: None,
            read_time: Some("4 min read".to_string()),
            is_published,
            published_at,
            meta_title: None,
            meta_description: None,
            meta_keywords: vec!["rust".to_string(), "backend".to_string()],
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_saving_published_draft_stamps_once() {
        let now = Utc::now();
        let draft = BlogDraft {
            title: "Launch Notes".to_string(),
            is_published: true,
            ..Default::default()
        };
        let fields = BlogPost::from_draft(&draft, None, now).unwrap();
        assert_eq!(fields.published_at, Some(now));

        let first = now - Duration::days(30);
        let existing = post(false, Some(first));
        let mut draft = existing.to_draft();
        draft.is_published = true;
        let fields = BlogPost::from_draft(&draft, Some(&existing), now).unwrap();
        assert_eq!(fields.published_at, Some(first));
    }

    #[test]
    fn test_saving_unpublished_draft_keeps_history() {
        let now = Utc::now();
        let first = now - Duration::days(3);
        let existing = post(true, Some(first));
        let mut draft = existing.to_draft();
        draft.is_published = false;

        let fields = BlogPost::from_draft(&draft, Some(&existing), now).unwrap();
        assert!(!fields.is_published);
        assert_eq!(fields.published_at, Some(first));

        let draft = BlogDraft {
            title: "Draft".to_string(),
            ..Default::default()
        };
        let fields = BlogPost::from_draft(&draft, None, now).unwrap();
        assert_eq!(fields.published_at, None);
    }

    #[test]
    fn test_unchanged_draft_round_trips() {
        let existing = post(true, Some(Utc::now() - Duration::hours(1)));
        let fields = BlogPost::from_draft(&existing.to_draft(), Some(&existing), Utc::now()).unwrap();
        assert_eq!(fields, BlogFields::from(&existing));
    }

    #[test]
    fn test_toggled() {
        let now = Utc::now();
        let fields = post(false, None).toggled(now);
        assert!(fields.is_published);
        assert_eq!(fields.published_at, Some(now));

        let first = now - Duration::days(1);
        let fields = post(true, Some(first)).toggled(now);
        assert!(!fields.is_published);
        assert_eq!(fields.published_at, Some(first));
    }

    #[test]
    fn test_republishing_restamps() {
        let now = Utc::now();
        let first = now - Duration::days(10);
        let fields = post(false, Some(first)).toggled(now);
        assert!(fields.is_published);
        assert_eq!(fields.published_at, Some(now));
    }
}
