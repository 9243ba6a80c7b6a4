//! Contact form: visitors asking about a project.

use std::sync::Arc;

use async_trait::async_trait;

use crate::db::{
    errors::Result,
    models::inquiries::{ContactInquiry, InquiryCreateDBRequest},
    persistence::Persistence,
};
use crate::forms::{
    controller::{FormDefinition, FormMessages},
    validation::{FieldSpec, Rule, Schema, ValidatedPayload},
};

pub const PROJECT_TYPES: &[&str] = &["website", "web-app", "ecommerce", "other"];
pub const BUDGET_RANGES: &[&str] = &["5k-10k", "10k-25k", "25k-50k", "50k+"];

pub struct ContactForm {
    inquiries: Arc<dyn Persistence<ContactInquiry>>,
    schema: Schema,
    messages: FormMessages,
}

impl ContactForm {
    pub fn new(inquiries: Arc<dyn Persistence<ContactInquiry>>) -> Self {
        let schema = Schema::new()
            .field(
                FieldSpec::required("name")
                    .rule(Rule::Required {
                        message: "Name is required",
                    })
                    .rule(Rule::MaxLen {
                        max: 100,
                        message: "Name must be less than 100 characters",
                    }),
            )
            .field(
                FieldSpec::required("email")
                    .rule(Rule::Email {
                        message: "Invalid email address",
                    })
                    .rule(Rule::MaxLen {
                        max: 255,
                        message: "Email must be less than 255 characters",
                    }),
            )
            .field(FieldSpec::optional("company").rule(Rule::MaxLen {
                max: 100,
                message: "Company must be less than 100 characters",
            }))
            .field(FieldSpec::optional("project_type").rule(Rule::OneOf {
                allowed: PROJECT_TYPES,
                message: "Please choose a listed project type",
            }))
            .field(FieldSpec::optional("budget_range").rule(Rule::OneOf {
                allowed: BUDGET_RANGES,
                message: "Please choose a listed budget range",
            }))
            .field(
                FieldSpec::required("message")
                    .rule(Rule::Required {
                        message: "Message is required",
                    })
                    .rule(Rule::MaxLen {
                        max: 2000,
                        message: "Message must be less than 2000 characters",
                    }),
            );

        Self {
            inquiries,
            schema,
            messages: FormMessages {
                success_title: "Message sent!",
                success_description: "Thanks for reaching out. I'll get back to you within 24-48 hours.",
                duplicate_title: "Already sent",
                failure_description: "We couldn't send your message. Please try again later.",
                retry_verb: "submit",
                invalid_title: None,
            },
        }
    }
}

#[async_trait]
impl FormDefinition for ContactForm {
    const NAME: &'static str = "contact";

    fn schema(&self) -> &Schema {
        &self.schema
    }

    fn messages(&self) -> &FormMessages {
        &self.messages
    }

    async fn persist(&self, payload: &ValidatedPayload) -> Result<()> {
        let request = InquiryCreateDBRequest {
            name: payload.text("name"),
            email: payload.text("email"),
            company: payload.optional("company"),
            project_type: payload.optional("project_type"),
            budget_range: payload.optional("budget_range"),
            message: payload.text("message"),
        };
        self.inquiries.insert(&request).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{
        models::inquiries::InquiryStatus,
        persistence::{ListQuery, Stores},
    };
    use crate::forms::{
        controller::{FormState, SubmissionController, SubmitOutcome},
        honeypot::Honeypot,
        validation::RawForm,
    };
    use crate::notifications::NotificationBuffer;
    use std::time::Duration;

    fn raw(pairs: &[(&str, &str)]) -> RawForm {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    fn setup() -> (Stores, SubmissionController<ContactForm>) {
        let stores = Stores::in_memory();
        let controller = SubmissionController::new(
            Arc::new(ContactForm::new(stores.inquiries.clone())),
            Honeypot::new("website"),
            Duration::from_secs(60),
            Duration::from_secs(10),
        );
        (stores, controller)
    }

    #[tokio::test]
    async fn test_contact_submission_is_stored_as_new_inquiry() {
        let (stores, controller) = setup();
        let notifications = NotificationBuffer::new();

        let outcome = controller
            .submit(
                &raw(&[
                    ("name", "  Jane "),
                    ("email", "jane@x.com "),
                    ("company", "   "),
                    ("project_type", "web-app"),
                    ("message", " Hello "),
                ]),
                &notifications,
            )
            .await;

        assert_eq!(outcome, SubmitOutcome::Accepted);
        assert_eq!(controller.state(), FormState::Success);

        let stored = stores.inquiries.list(&ListQuery::default()).await.unwrap();
        assert_eq!(stored.len(), 1);
        let inquiry = &stored[0];
        assert_eq!(inquiry.name, "Jane");
        assert_eq!(inquiry.email, "jane@x.com");
        assert_eq!(inquiry.message, "Hello");
        assert_eq!(inquiry.company, None);
        assert_eq!(inquiry.project_type.as_deref(), Some("web-app"));
        assert_eq!(inquiry.status, InquiryStatus::New);

        let emitted = notifications.drain();
        assert_eq!(emitted[0].title, "Message sent!");
    }

    #[tokio::test]
    async fn test_contact_validation_messages() {
        let (stores, controller) = setup();
        let long_name = "x".repeat(101);

        let outcome = controller
            .submit(
                &raw(&[("name", long_name.as_str()), ("email", "jane"), ("budget_range", "1m+")]),
                &NotificationBuffer::new(),
            )
            .await;

        let SubmitOutcome::Invalid { errors } = outcome else {
            panic!("expected validation errors");
        };
        let messages: Vec<_> = errors.iter().map(|e| (e.field.as_str(), e.message.as_str())).collect();
        assert_eq!(
            messages,
            vec![
                ("name", "Name must be less than 100 characters"),
                ("email", "Invalid email address"),
                ("budget_range", "Please choose a listed budget range"),
                ("message", "Message is required"),
            ]
        );
        assert_eq!(stores.inquiries.count().await.unwrap(), 0);
    }
}
