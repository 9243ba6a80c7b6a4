//! Public form submissions.
//!
//! Every form runs the same pipeline in [`controller::SubmissionController`]: bot trap, cooldown,
//! validation, a single persistence call, and a state transition. The forms differ only in their
//! [`validation::Schema`], their copy and the table they write to.
//!
//! - [`contact`]: project inquiries written to `contact_inquiries`
//! - [`newsletter`]: signups written to `newsletter_subscribers`
//! - [`registry`]: one controller per visitor, kept between requests

pub mod contact;
pub mod controller;
pub mod cooldown;
pub mod honeypot;
pub mod newsletter;
pub mod registry;
pub mod validation;

use crate::{config::FormsConfig, db::persistence::Stores};

use contact::ContactForm;
use newsletter::NewsletterForm;
use registry::FormRegistry;

/// The registries for every public form.
pub struct Forms {
    pub contact: FormRegistry<ContactForm>,
    pub newsletter: FormRegistry<NewsletterForm>,
}

impl Forms {
    pub fn new(stores: &Stores, config: &FormsConfig) -> Self {
        Self {
            contact: FormRegistry::new(ContactForm::new(stores.inquiries.clone()), config),
            newsletter: FormRegistry::new(NewsletterForm::new(stores.subscribers.clone()), config),
        }
    }
}
