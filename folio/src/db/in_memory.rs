//! Process-local persistence adapter.
//!
//! Backs the `memory` database mode and most of the test suite. Rows live in insertion order
//! behind a [`parking_lot::RwLock`], and the unique and check constraints from the migrations are
//! replayed here so callers see the same [`DbError`] variants they would get from Postgres.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use uuid::Uuid;

use crate::db::{
    errors::{DbError, Result},
    models::{
        blogs::BlogPost,
        inquiries::{ContactInquiry, InquiryStatus},
        projects::Project,
        subscribers::Subscriber,
        testimonials::Testimonial,
        users::{Role, UserAccount},
    },
    persistence::{AccountStore, ListOrder, ListQuery, Persistence, Record, Stores},
};
use crate::types::UserId;

/// How a record type behaves inside an [`InMemoryStore`].
pub trait InMemoryRecord: Record {
    fn build(id: Uuid, now: DateTime<Utc>, request: &Self::Create) -> Self;

    fn apply(&mut self, request: &Self::Update, now: DateTime<Utc>);

    /// `(column, value)` pairs covered by a unique constraint
    fn unique_keys(&self) -> Vec<(&'static str, String)> {
        Vec::new()
    }

    /// Name of the check constraint this row violates, if any
    fn check_violation(&self) -> Option<&'static str> {
        None
    }

    fn matches(&self, filter: &Self::Filter) -> bool;

    /// Sort rows that arrive newest first. Sorting must be stable.
    fn sort(rows: &mut [Self], order: ListOrder);
}

pub struct InMemoryStore<R> {
    rows: Arc<RwLock<Vec<R>>>,
}

impl<R> Default for InMemoryStore<R> {
    fn default() -> Self {
        Self {
            rows: Arc::new(RwLock::new(Vec::new())),
        }
    }
}

impl<R: InMemoryRecord> InMemoryStore<R> {
    pub fn new() -> Self {
        Self::default()
    }

    fn ensure_valid(rows: &[R], candidate: &R) -> Result<()> {
        if let Some(constraint) = candidate.check_violation() {
            return Err(DbError::CheckViolation {
                constraint: Some(constraint.to_string()),
                table: Some(R::TABLE.to_string()),
                message: format!("new row for relation \"{}\" violates check constraint \"{constraint}\"", R::TABLE),
            });
        }

        let keys = candidate.unique_keys();
        for row in rows.iter().filter(|row| row.id() != candidate.id()) {
            for (column, value) in row.unique_keys() {
                if keys.iter().any(|(c, v)| *c == column && *v == value) {
                    let constraint = format!("{}_{column}_unique", R::TABLE);
                    return Err(DbError::UniqueViolation {
                        message: format!("duplicate key value violates unique constraint \"{constraint}\""),
                        constraint: Some(constraint),
                        table: Some(R::TABLE.to_string()),
                        conflicting_value: Some(value),
                    });
                }
            }
        }
        Ok(())
    }
}

#[async_trait]
impl<R: InMemoryRecord> Persistence<R> for InMemoryStore<R> {
    async fn insert(&self, request: &R::Create) -> Result<R> {
        let row = R::build(Uuid::new_v4(), Utc::now(), request);
        let mut rows = self.rows.write();
        Self::ensure_valid(&rows, &row)?;
        rows.push(row.clone());
        Ok(row)
    }

    async fn update(&self, id: Uuid, request: &R::Update) -> Result<R> {
        let mut rows = self.rows.write();
        let index = rows.iter().position(|row| row.id() == id).ok_or(DbError::NotFound)?;

        let mut updated = rows[index].clone();
        updated.apply(request, Utc::now());
        Self::ensure_valid(&rows, &updated)?;

        rows[index] = updated.clone();
        Ok(updated)
    }

    async fn delete(&self, id: Uuid) -> Result<()> {
        let mut rows = self.rows.write();
        let before = rows.len();
        rows.retain(|row| row.id() != id);
        if rows.len() == before {
            return Err(DbError::NotFound);
        }
        Ok(())
    }

    async fn get(&self, id: Uuid) -> Result<Option<R>> {
        Ok(self.rows.read().iter().find(|row| row.id() == id).cloned())
    }

    async fn list(&self, query: &ListQuery<R::Filter>) -> Result<Vec<R>> {
        let mut rows: Vec<R> = self
            .rows
            .read()
            .iter()
            .rev()
            .filter(|row| row.matches(&query.filter))
            .cloned()
            .collect();

        R::sort(&mut rows, query.order);

        if let Some(limit) = query.limit {
            rows.truncate(usize::try_from(limit).unwrap_or(0));
        }
        Ok(rows)
    }

    async fn count(&self) -> Result<i64> {
        Ok(self.rows.read().len() as i64)
    }
}

fn newest_first<R>(rows: &mut [R], created_at: impl Fn(&R) -> DateTime<Utc>) {
    rows.sort_by(|a, b| created_at(b).cmp(&created_at(a)));
}

impl InMemoryRecord for Project {
    fn build(id: Uuid, now: DateTime<Utc>, request: &Self::Create) -> Self {
        let mut project = Project {
            id,
            title: String::new(),
            slug: String::new(),
            description: None,
            problem: None,
            solution: None,
            category: None,
            industry: None,
            image_url: None,
            stack_frontend: Vec::new(),
            stack_backend: Vec::new(),
            stack_database: Vec::new(),
            stack_tools: Vec::new(),
            results: Vec::new(),
            is_featured: false,
            display_order: 0,
            testimonial_quote: None,
            testimonial_author: None,
            testimonial_role: None,
            created_at: now,
            updated_at: now,
        };
        project.apply(request, now);
        project
    }

    fn apply(&mut self, request: &Self::Update, now: DateTime<Utc>) {
        self.title = request.title.clone();
        self.slug = request.slug.clone();
        self.description = request.description.clone();
        self.problem = request.problem.clone();
        self.solution = request.solution.clone();
        self.category = request.category.clone();
        self.industry = request.industry.clone();
        self.image_url = request.image_url.clone();
        self.stack_frontend = request.stack_frontend.clone();
        self.stack_backend = request.stack_backend.clone();
        self.stack_database = request.stack_database.clone();
        self.stack_tools = request.stack_tools.clone();
        self.results = request.results.clone();
        self.is_featured = request.is_featured;
        self.display_order = request.display_order;
        self.testimonial_quote = request.testimonial_quote.clone();
        self.testimonial_author = request.testimonial_author.clone();
        self.testimonial_role = request.testimonial_role.clone();
        self.updated_at = now;
    }

    fn unique_keys(&self) -> Vec<(&'static str, String)> {
        vec![("slug", self.slug.clone())]
    }

    fn matches(&self, filter: &Self::Filter) -> bool {
        filter.featured.is_none_or(|featured| self.is_featured == featured)
            && filter.slug.as_deref().is_none_or(|slug| self.slug == slug)
    }

    fn sort(rows: &mut [Self], order: ListOrder) {
        match order {
            ListOrder::Natural => rows.sort_by(|a, b| {
                a.display_order
                    .cmp(&b.display_order)
                    .then_with(|| b.created_at.cmp(&a.created_at))
            }),
            ListOrder::NewestFirst => newest_first(rows, |p| p.created_at),
        }
    }
}

impl InMemoryRecord for Testimonial {
    fn build(id: Uuid, now: DateTime<Utc>, request: &Self::Create) -> Self {
        Testimonial {
            id,
            quote: request.quote.clone(),
            author_name: request.author_name.clone(),
            author_role: request.author_role.clone(),
            author_company: request.author_company.clone(),
            author_image_url: request.author_image_url.clone(),
            rating: request.rating,
            is_featured: request.is_featured,
            display_order: request.display_order,
            created_at: now,
        }
    }

    fn apply(&mut self, request: &Self::Update, _now: DateTime<Utc>) {
        self.quote = request.quote.clone();
        self.author_name = request.author_name.clone();
        self.author_role = request.author_role.clone();
        self.author_company = request.author_company.clone();
        self.author_image_url = request.author_image_url.clone();
        self.rating = request.rating;
        self.is_featured = request.is_featured;
        self.display_order = request.display_order;
    }

    fn check_violation(&self) -> Option<&'static str> {
        (!(1..=5).contains(&self.rating)).then_some("testimonials_rating_range")
    }

    fn matches(&self, filter: &Self::Filter) -> bool {
        filter.featured.is_none_or(|featured| self.is_featured == featured)
    }

    fn sort(rows: &mut [Self], order: ListOrder) {
        match order {
            ListOrder::Natural => rows.sort_by(|a, b| {
                a.display_order
                    .cmp(&b.display_order)
                    .then_with(|| b.created_at.cmp(&a.created_at))
            }),
            ListOrder::NewestFirst => newest_first(rows, |t| t.created_at),
        }
    }
}

impl InMemoryRecord for BlogPost {
    fn build(id: Uuid, now: DateTime<Utc>, request: &Self::Create) -> Self {
        let mut post = BlogPost {
            id,
            title: String::new(),
            slug: String::new(),
            excerpt: None,
            content: None,
            category: None,
            image_url: None,
            read_time: None,
            is_published: false,
            published_at: None,
            meta_title: None,
            meta_description: None,
            meta_keywords: Vec::new(),
            created_at: now,
            updated_at: now,
        };
        post.apply(request, now);
        post
    }

    fn apply(&mut self, request: &Self::Update, now: DateTime<Utc>) {
        self.title = request.title.clone();
        self.slug = request.slug.clone();
        self.excerpt = request.excerpt.clone();
        self.content = request.content.clone();
        self.category = request.category.clone();
        self.image_url = request.image_url.clone();
        self.read_time = request.read_time.clone();
        self.is_published = request.is_published;
        self.published_at = request.published_at;
        self.meta_title = request.meta_title.clone();
        self.meta_description = request.meta_description.clone();
        self.meta_keywords = request.meta_keywords.clone();
        self.updated_at = now;
    }

    fn unique_keys(&self) -> Vec<(&'static str, String)> {
        vec![("slug", self.slug.clone())]
    }

    fn matches(&self, filter: &Self::Filter) -> bool {
        filter.published.is_none_or(|published| self.is_published == published)
            && filter.slug.as_deref().is_none_or(|slug| self.slug == slug)
    }

    fn sort(rows: &mut [Self], _order: ListOrder) {
        newest_first(rows, |p| p.created_at);
    }
}

impl InMemoryRecord for ContactInquiry {
    fn build(id: Uuid, now: DateTime<Utc>, request: &Self::Create) -> Self {
        ContactInquiry {
            id,
            name: request.name.clone(),
            email: request.email.clone(),
            company: request.company.clone(),
            project_type: request.project_type.clone(),
            budget_range: request.budget_range.clone(),
            message: request.message.clone(),
            status: InquiryStatus::New,
            created_at: now,
        }
    }

    fn apply(&mut self, request: &Self::Update, _now: DateTime<Utc>) {
        self.status = request.status;
    }

    fn matches(&self, filter: &Self::Filter) -> bool {
        filter.status.is_none_or(|status| self.status == status)
    }

    fn sort(rows: &mut [Self], _order: ListOrder) {
        newest_first(rows, |i| i.created_at);
    }
}

impl InMemoryRecord for Subscriber {
    fn build(id: Uuid, now: DateTime<Utc>, request: &Self::Create) -> Self {
        Subscriber {
            id,
            email: request.email.clone(),
            is_active: true,
            subscribed_at: now,
            unsubscribed_at: None,
        }
    }

    fn apply(&mut self, request: &Self::Update, now: DateTime<Utc>) {
        self.is_active = request.is_active;
        self.unsubscribed_at = if request.is_active {
            None
        } else {
            self.unsubscribed_at.or(Some(now))
        };
    }

    fn unique_keys(&self) -> Vec<(&'static str, String)> {
        vec![("email", self.email.clone())]
    }

    fn matches(&self, filter: &Self::Filter) -> bool {
        filter.active.is_none_or(|active| self.is_active == active)
    }

    fn sort(rows: &mut [Self], _order: ListOrder) {
        newest_first(rows, |s| s.subscribed_at);
    }
}

/// [`AccountStore`] kept in process memory.
#[derive(Default)]
pub struct InMemoryAccounts {
    accounts: RwLock<Vec<UserAccount>>,
}

#[async_trait]
impl AccountStore for InMemoryAccounts {
    async fn find_by_email(&self, email: &str) -> Result<Option<UserAccount>> {
        Ok(self.accounts.read().iter().find(|a| a.email == email).cloned())
    }

    async fn ensure_admin(&self, email: &str, password_hash: Option<String>) -> Result<UserId> {
        let mut accounts = self.accounts.write();

        if let Some(existing) = accounts.iter_mut().find(|a| a.email == email) {
            if password_hash.is_some() {
                existing.password_hash = password_hash;
            }
            if !existing.is_admin() {
                existing.roles.insert(0, Role::Admin);
            }
            return Ok(existing.id);
        }

        let account = UserAccount {
            id: Uuid::new_v4(),
            email: email.to_string(),
            password_hash,
            roles: vec![Role::Admin, Role::User],
            created_at: Utc::now(),
        };
        let id = account.id;
        accounts.push(account);
        Ok(id)
    }
}

impl Stores {
    /// Empty adapters that keep everything in process memory
    pub fn in_memory() -> Self {
        Self {
            projects: Arc::new(InMemoryStore::<Project>::new()),
            testimonials: Arc::new(InMemoryStore::<Testimonial>::new()),
            blogs: Arc::new(InMemoryStore::<BlogPost>::new()),
            inquiries: Arc::new(InMemoryStore::<ContactInquiry>::new()),
            subscribers: Arc::new(InMemoryStore::<Subscriber>::new()),
            accounts: Arc::new(InMemoryAccounts::default()),
        }
    }
}
