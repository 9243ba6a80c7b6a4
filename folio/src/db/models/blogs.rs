//! Database models for blog posts.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::db::persistence::{Persistence, Record, Stores};
use crate::types::BlogId;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct BlogPost {
    #[schema(value_type = String, format = "uuid")]
    pub id: BlogId,
    pub title: String,
    pub slug: String,
    pub excerpt: Option<String>,
    pub content: Option<String>,
    pub category: Option<String>,
    pub image_url: Option<String>,
    /// Free-form reading time label, e.g. "5 min read"
    pub read_time: Option<String>,
    pub is_published: bool,
    /// Set the first time the post is published, kept when it is unpublished
    pub published_at: Option<DateTime<Utc>>,
    pub meta_title: Option<String>,
    pub meta_description: Option<String>,
    pub meta_keywords: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Editable columns of a blog post. Used for both inserts and updates.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct BlogFields {
    pub title: String,
    pub slug: String,
    pub excerpt: Option<String>,
    pub content: Option<String>,
    pub category: Option<String>,
    pub image_url: Option<String>,
    pub read_time: Option<String>,
    pub is_published: bool,
    pub published_at: Option<DateTime<Utc>>,
    pub meta_title: Option<String>,
    pub meta_description: Option<String>,
    pub meta_keywords: Vec<String>,
}

impl From<&BlogPost> for BlogFields {
    fn from(post: &BlogPost) -> Self {
        Self {
            title: post.title.clone(),
            slug: post.slug.clone(),
            excerpt: post.excerpt.clone(),
            content: post.content.clone(),
            category: post.category.clone(),
            image_url: post.image_url.clone(),
            read_time: post.read_time.clone(),
            is_published: post.is_published,
            published_at: post.published_at,
            meta_title: post.meta_title.clone(),
            meta_description: post.meta_description.clone(),
            meta_keywords: post.meta_keywords.clone(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct BlogFilter {
    pub published: Option<bool>,
    pub slug: Option<String>,
}

impl Record for BlogPost {
    type Create = BlogFields;
    type Update = BlogFields;
    type Filter = BlogFilter;

    const TABLE: &'static str = "blogs";

    fn id(&self) -> Uuid {
        self.id
    }

    fn store(stores: &Stores) -> &Arc<dyn Persistence<Self>> {
        &stores.blogs
    }
}
