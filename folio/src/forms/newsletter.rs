//! Newsletter signup form.

use std::sync::Arc;

use async_trait::async_trait;

use crate::db::{
    errors::Result,
    models::subscribers::{Subscriber, SubscriberCreateDBRequest},
    persistence::Persistence,
};
use crate::forms::{
    controller::{FormDefinition, FormMessages},
    validation::{FieldSpec, Rule, Schema, ValidatedPayload},
};

pub struct NewsletterForm {
    subscribers: Arc<dyn Persistence<Subscriber>>,
    schema: Schema,
    messages: FormMessages,
}

impl NewsletterForm {
    pub fn new(subscribers: Arc<dyn Persistence<Subscriber>>) -> Self {
        let schema = Schema::new().field(
            FieldSpec::required("email")
                .rule(Rule::Email {
                    message: "Please enter a valid email address",
                })
                .rule(Rule::MaxLen {
                    max: 255,
                    message: "Email must be less than 255 characters",
                }),
        );

        Self {
            subscribers,
            schema,
            messages: FormMessages {
                success_title: "Subscribed!",
                success_description: "You'll receive the latest articles in your inbox.",
                duplicate_title: "Already subscribed",
                failure_description: "We couldn't complete your subscription. Please try again later.",
                retry_verb: "subscribe",
                invalid_title: Some("Invalid email"),
            },
        }
    }
}

#[async_trait]
impl FormDefinition for NewsletterForm {
    const NAME: &'static str = "newsletter";

    fn schema(&self) -> &Schema {
        &self.schema
    }

    fn messages(&self) -> &FormMessages {
        &self.messages
    }

    async fn persist(&self, payload: &ValidatedPayload) -> Result<()> {
        self.subscribers
            .insert(&SubscriberCreateDBRequest {
                email: payload.text("email"),
            })
            .await?;
        Ok(())
    }
}
