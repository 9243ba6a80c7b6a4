//! Submission pipeline shared by every public form.
//!
//! ```text
//! submit ─▶ in flight? ─▶ honeypot ─▶ cooldown ─▶ validate ─▶ persist (timeout) ─▶ state
//!              │             │           │            │              │
//!           InFlight      Accepted   RateLimited   Invalid     Accepted / Duplicate / Failed
//! ```
//!
//! A controller belongs to one client. Its state lives behind a [`parking_lot::Mutex`] that is
//! only held for the synchronous steps, never across the persistence call.

use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tokio::time::Instant;
use tracing::{debug, error, info, instrument, warn};
use utoipa::ToSchema;

use crate::db::errors::{DbError, Result as DbResult};
use crate::forms::{
    cooldown::Cooldown,
    honeypot::Honeypot,
    validation::{FieldError, RawForm, Schema, ValidatedPayload},
};
use crate::notifications::{Notification, Notifier};

const FAILURE_TITLE: &str = "Something went wrong";
const RATE_LIMIT_TITLE: &str = "Please wait";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum FormState {
    #[default]
    Idle,
    Submitting,
    Success,
    Duplicate,
    Error,
}

/// Copy shown to the visitor for each outcome of one form.
#[derive(Debug, Clone)]
pub struct FormMessages {
    pub success_title: &'static str,
    pub success_description: &'static str,
    pub duplicate_title: &'static str,
    pub failure_description: &'static str,
    /// Verb used in the cooldown notice, e.g. "You can submit again in 5 seconds."
    pub retry_verb: &'static str,
    /// When set, validation failures also raise a notification with the first field message
    pub invalid_title: Option<&'static str>,
}

/// One public form: its rules, its copy, and where accepted submissions go.
#[async_trait]
pub trait FormDefinition: Send + Sync + 'static {
    const NAME: &'static str;

    fn schema(&self) -> &Schema;

    fn messages(&self) -> &FormMessages;

    /// Exactly one write per accepted submission
    async fn persist(&self, payload: &ValidatedPayload) -> DbResult<()>;
}

/// What happened to a single call to [`SubmissionController::submit`].
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    Accepted,
    Duplicate { message: String },
    RateLimited { wait_seconds: u64, message: String },
    Invalid { errors: Vec<FieldError> },
    Failed { message: String, timed_out: bool },
    /// A previous submission from the same client has not finished yet
    InFlight,
}

impl SubmitOutcome {
    /// Label used for metrics and logs
    pub fn label(&self) -> &'static str {
        match self {
            SubmitOutcome::Accepted => "accepted",
            SubmitOutcome::Duplicate { .. } => "duplicate",
            SubmitOutcome::RateLimited { .. } => "rate_limited",
            SubmitOutcome::Invalid { .. } => "invalid",
            SubmitOutcome::Failed { timed_out: true, .. } => "timed_out",
            SubmitOutcome::Failed { .. } => "failed",
            SubmitOutcome::InFlight => "in_flight",
        }
    }

    /// State the form settled in when this outcome was produced.
    pub fn state(&self) -> FormState {
        match self {
            SubmitOutcome::Accepted => FormState::Success,
            SubmitOutcome::Duplicate { .. } => FormState::Duplicate,
            SubmitOutcome::RateLimited { .. } | SubmitOutcome::Invalid { .. } | SubmitOutcome::Failed { .. } => FormState::Error,
            SubmitOutcome::InFlight => FormState::Submitting,
        }
    }
}

#[derive(Debug)]
struct Inner {
    state: FormState,
    cooldown: Cooldown,
}

pub struct SubmissionController<F> {
    form: Arc<F>,
    honeypot: Honeypot,
    timeout: Duration,
    inner: Mutex<Inner>,
}

/// Puts the controller back to idle if a submission is dropped mid-flight.
struct InFlightGuard<'a> {
    inner: &'a Mutex<Inner>,
    armed: bool,
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        if self.armed {
            let mut inner = self.inner.lock();
            if inner.state == FormState::Submitting {
                inner.state = FormState::Idle;
            }
        }
    }
}

impl<F: FormDefinition> SubmissionController<F> {
    pub fn new(form: Arc<F>, honeypot: Honeypot, cooldown: Duration, timeout: Duration) -> Self {
        Self {
            form,
            honeypot,
            timeout,
            inner: Mutex::new(Inner {
                state: FormState::Idle,
                cooldown: Cooldown::new(cooldown),
            }),
        }
    }

    pub fn state(&self) -> FormState {
        self.inner.lock().state
    }

    /// Back to idle unless a submission is in flight. The cooldown keeps running.
    pub fn reset(&self) -> FormState {
        let mut inner = self.inner.lock();
        if inner.state != FormState::Submitting {
            inner.state = FormState::Idle;
        }
        inner.state
    }

    #[instrument(skip_all, fields(form = F::NAME))]
    pub async fn submit(&self, raw: &RawForm, notifier: &dyn Notifier) -> SubmitOutcome {
        let outcome = self.run(raw, notifier).await;
        metrics::counter!("folio_form_submissions_total", "form" => F::NAME, "outcome" => outcome.label()).increment(1);
        debug!(outcome = outcome.label(), "form submission handled");
        outcome
    }

    async fn run(&self, raw: &RawForm, notifier: &dyn Notifier) -> SubmitOutcome {
        let messages = self.form.messages();

        // Everything up to the switch to Submitting happens under one lock
        let (payload, mut guard) = {
            let mut inner = self.inner.lock();

            if inner.state == FormState::Submitting {
                return SubmitOutcome::InFlight;
            }

            if self.honeypot.is_tripped(raw) {
                info!(field = self.honeypot.field(), "honeypot tripped, discarding submission");
                inner.state = FormState::Success;
                notifier.notify(Notification::success(messages.success_title).with_description(messages.success_description));
                return SubmitOutcome::Accepted;
            }

            if let Err(wait_seconds) = inner.cooldown.check(Instant::now()) {
                inner.state = FormState::Error;
                let message = format!("You can {} again in {wait_seconds} seconds.", messages.retry_verb);
                notifier.notify(Notification::error(RATE_LIMIT_TITLE).with_description(message.clone()));
                return SubmitOutcome::RateLimited { wait_seconds, message };
            }

            let payload = match self.form.schema().validate(raw) {
                Ok(payload) => payload,
                Err(errors) => {
                    inner.state = FormState::Error;
                    if let (Some(title), Some(first)) = (messages.invalid_title, errors.first()) {
                        notifier.notify(Notification::error(title).with_description(first.message.clone()));
                    }
                    return SubmitOutcome::Invalid { errors };
                }
            };

            inner.state = FormState::Submitting;
            let guard = InFlightGuard {
                inner: &self.inner,
                armed: true,
            };
            (payload, guard)
        };

        let result = tokio::time::timeout(self.timeout, self.form.persist(&payload)).await;
        guard.armed = false;

        let mut inner = self.inner.lock();
        match result {
            Ok(Ok(())) => {
                inner.cooldown.record(Instant::now());
                inner.state = FormState::Success;
                notifier.notify(Notification::success(messages.success_title).with_description(messages.success_description));
                SubmitOutcome::Accepted
            }
            Ok(Err(err @ DbError::UniqueViolation { .. })) => {
                info!(form = F::NAME, "duplicate submission");
                inner.state = FormState::Duplicate;
                let message = err.user_message();
                notifier.notify(Notification::info(messages.duplicate_title).with_description(message.clone()));
                SubmitOutcome::Duplicate { message }
            }
            Ok(Err(err)) => {
                error!(form = F::NAME, error = %err, "failed to persist form submission");
                inner.state = FormState::Error;
                notifier.notify(Notification::error(FAILURE_TITLE).with_description(messages.failure_description));
                SubmitOutcome::Failed {
                    message: messages.failure_description.to_string(),
                    timed_out: false,
                }
            }
            Err(_) => {
                warn!(form = F::NAME, timeout = ?self.timeout, "form submission timed out");
                inner.state = FormState::Error;
                notifier.notify(Notification::error(FAILURE_TITLE).with_description(messages.failure_description));
                SubmitOutcome::Failed {
                    message: messages.failure_description.to_string(),
                    timed_out: true,
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::forms::validation::{FieldSpec, Rule};
    use crate::notifications::{NotificationBuffer, Severity};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::sync::{Notify, oneshot};

    #[derive(Clone, Copy)]
    enum Behaviour {
        Succeed,
        Duplicate,
        Fail,
        Hang,
    }

    struct ScriptedForm {
        schema: Schema,
        messages: FormMessages,
        behaviour: Behaviour,
        calls: AtomicUsize,
        payloads: Mutex<Vec<ValidatedPayload>>,
        entered: Mutex<Option<oneshot::Sender<()>>>,
        release: Notify,
    }

    impl ScriptedForm {
        fn new(behaviour: Behaviour) -> Self {
            Self {
                schema: Schema::new()
                    .field(FieldSpec::required("name").rule(Rule::Required { message: "Name is required" }))
                    .field(FieldSpec::required("email").rule(Rule::Email {
                        message: "Invalid email address",
                    })),
                messages: FormMessages {
                    success_title: "Sent",
                    success_description: "Thanks",
                    duplicate_title: "Already subscribed",
                    failure_description: "Please try again later.",
                    retry_verb: "submit",
                    invalid_title: None,
                },
                behaviour,
                calls: AtomicUsize::new(0),
                payloads: Mutex::new(Vec::new()),
                entered: Mutex::new(None),
                release: Notify::new(),
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl FormDefinition for ScriptedForm {
        const NAME: &'static str = "scripted";

        fn schema(&self) -> &Schema {
            &self.schema
        }

        fn messages(&self) -> &FormMessages {
            &self.messages
        }

        async fn persist(&self, payload: &ValidatedPayload) -> DbResult<()> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.payloads.lock().push(payload.clone());
            if let Some(entered) = self.entered.lock().take() {
                let _ = entered.send(());
            }
            match self.behaviour {
                Behaviour::Succeed => Ok(()),
                Behaviour::Duplicate => Err(DbError::UniqueViolation {
                    constraint: Some("newsletter_subscribers_email_unique".to_string()),
                    table: Some("newsletter_subscribers".to_string()),
                    message: "duplicate key".to_string(),
                    conflicting_value: None,
                }),
                Behaviour::Fail => Err(DbError::Other(anyhow::anyhow!("connection reset by peer"))),
                Behaviour::Hang => {
                    self.release.notified().await;
                    Ok(())
                }
            }
        }
    }

    fn controller(form: Arc<ScriptedForm>) -> SubmissionController<ScriptedForm> {
        SubmissionController::new(form, Honeypot::new("website"), Duration::from_secs(60), Duration::from_secs(10))
    }

    fn raw(pairs: &[(&str, &str)]) -> RawForm {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    fn valid() -> RawForm {
        raw(&[("name", " Jane "), ("email", "jane@x.com")])
    }

    #[tokio::test]
    async fn test_accepted_submission_persists_trimmed_values_once() {
        let form = Arc::new(ScriptedForm::new(Behaviour::Succeed));
        let controller = controller(form.clone());
        let notifications = NotificationBuffer::new();

        let outcome = controller.submit(&valid(), &notifications).await;

        assert_eq!(outcome, SubmitOutcome::Accepted);
        assert_eq!(controller.state(), FormState::Success);
        assert_eq!(form.calls(), 1);
        assert_eq!(form.payloads.lock()[0].text("name"), "Jane");
        assert_eq!(notifications.drain()[0].title, "Sent");
    }

    #[tokio::test]
    async fn test_every_invalid_field_is_reported_without_persisting() {
        let form = Arc::new(ScriptedForm::new(Behaviour::Succeed));
        let controller = controller(form.clone());
        let notifications = NotificationBuffer::new();

        let outcome = controller.submit(&raw(&[("name", ""), ("email", "bad")]), &notifications).await;

        match outcome {
            SubmitOutcome::Invalid { errors } => {
                let fields: Vec<_> = errors.iter().map(|e| e.field.as_str()).collect();
                assert_eq!(fields, vec!["name", "email"]);
            }
            other => panic!("expected invalid outcome, got {other:?}"),
        }
        assert_eq!(controller.state(), FormState::Error);
        assert_eq!(form.calls(), 0);
        assert!(notifications.is_empty());
    }

    #[tokio::test]
    async fn test_honeypot_reports_success_without_persisting() {
        let form = Arc::new(ScriptedForm::new(Behaviour::Succeed));
        let controller = controller(form.clone());
        let notifications = NotificationBuffer::new();

        let mut bot = valid();
        bot.insert("website".to_string(), "http://spam.example".to_string());
        // Even an otherwise invalid payload looks like a success to the bot
        let mut invalid_bot = raw(&[("name", "")]);
        invalid_bot.insert("website".to_string(), "x".to_string());

        assert_eq!(controller.submit(&bot, &notifications).await, SubmitOutcome::Accepted);
        assert_eq!(controller.submit(&invalid_bot, &notifications).await, SubmitOutcome::Accepted);
        assert_eq!(controller.state(), FormState::Success);
        assert_eq!(form.calls(), 0);
        assert!(notifications.drain().iter().all(|n| n.severity == Severity::Success));

        // No cooldown was started
        assert_eq!(controller.submit(&valid(), &notifications).await, SubmitOutcome::Accepted);
        assert_eq!(form.calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_resubmitting_within_cooldown_is_rate_limited() {
        let form = Arc::new(ScriptedForm::new(Behaviour::Succeed));
        let controller = controller(form.clone());
        let notifications = NotificationBuffer::new();

        assert_eq!(controller.submit(&valid(), &notifications).await, SubmitOutcome::Accepted);
        notifications.drain();

        tokio::time::advance(Duration::from_secs(10)).await;
        let outcome = controller.submit(&valid(), &notifications).await;

        match &outcome {
            SubmitOutcome::RateLimited { wait_seconds, message } => {
                assert_eq!(*wait_seconds, 50);
                assert!(message.contains("50"));
            }
            other => panic!("expected rate limit, got {other:?}"),
        }
        assert_eq!(controller.state(), FormState::Error);
        assert_eq!(form.calls(), 1);
        let emitted = notifications.drain();
        assert_eq!(emitted[0].title, "Please wait");
        assert_eq!(emitted[0].description.as_deref(), Some("You can submit again in 50 seconds."));

        tokio::time::advance(Duration::from_secs(50)).await;
        assert_eq!(controller.submit(&valid(), &notifications).await, SubmitOutcome::Accepted);
        assert_eq!(form.calls(), 2);
    }

    #[tokio::test]
    async fn test_unique_violation_is_duplicate_not_error() {
        let form = Arc::new(ScriptedForm::new(Behaviour::Duplicate));
        let controller = controller(form.clone());
        let notifications = NotificationBuffer::new();

        let outcome = controller.submit(&valid(), &notifications).await;

        assert_eq!(
            outcome,
            SubmitOutcome::Duplicate {
                message: "You're already on our mailing list!".to_string()
            }
        );
        assert_eq!(controller.state(), FormState::Duplicate);
        let emitted = notifications.drain();
        assert_eq!(emitted[0].severity, Severity::Info);

        // Duplicates do not start the cooldown
        assert!(matches!(
            controller.submit(&valid(), &notifications).await,
            SubmitOutcome::Duplicate { .. }
        ));
        assert_eq!(form.calls(), 2);
    }

    #[tokio::test]
    async fn test_backend_failure_is_sanitized() {
        let form = Arc::new(ScriptedForm::new(Behaviour::Fail));
        let controller = controller(form.clone());
        let notifications = NotificationBuffer::new();

        let outcome = controller.submit(&valid(), &notifications).await;

        assert_eq!(
            outcome,
            SubmitOutcome::Failed {
                message: "Please try again later.".to_string(),
                timed_out: false
            }
        );
        let emitted = notifications.drain();
        assert_eq!(emitted[0].title, "Something went wrong");
        assert!(!format!("{emitted:?}").contains("connection reset"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_persistence_times_out() {
        let form = Arc::new(ScriptedForm::new(Behaviour::Hang));
        let controller = controller(form.clone());
        let notifications = NotificationBuffer::new();

        let outcome = controller.submit(&valid(), &notifications).await;

        assert!(matches!(outcome, SubmitOutcome::Failed { timed_out: true, .. }));
        assert_eq!(controller.state(), FormState::Error);
        assert_eq!(form.calls(), 1);
    }

    #[tokio::test]
    async fn test_submit_while_in_flight_is_ignored() {
        let form = Arc::new(ScriptedForm::new(Behaviour::Hang));
        let (entered_tx, entered_rx) = oneshot::channel();
        *form.entered.lock() = Some(entered_tx);
        let controller = Arc::new(controller(form.clone()));

        let first = {
            let controller = controller.clone();
            tokio::spawn(async move { controller.submit(&valid(), &NotificationBuffer::new()).await })
        };
        entered_rx.await.unwrap();
        assert_eq!(controller.state(), FormState::Submitting);

        let notifications = NotificationBuffer::new();
        assert_eq!(controller.submit(&valid(), &notifications).await, SubmitOutcome::InFlight);
        assert!(notifications.is_empty());

        form.release.notify_one();
        assert_eq!(first.await.unwrap(), SubmitOutcome::Accepted);
        assert_eq!(form.calls(), 1);
    }

    #[tokio::test]
    async fn test_reset_returns_to_idle() {
        let form = Arc::new(ScriptedForm::new(Behaviour::Succeed));
        let controller = controller(form);
        controller.submit(&valid(), &NotificationBuffer::new()).await;
        assert_eq!(controller.state(), FormState::Success);

        assert_eq!(controller.reset(), FormState::Idle);
        assert_eq!(controller.state(), FormState::Idle);
    }

    #[test]
    fn test_outcome_maps_to_settled_state() {
        assert_eq!(SubmitOutcome::Accepted.state(), FormState::Success);
        assert_eq!(
            SubmitOutcome::Duplicate { message: String::new() }.state(),
            FormState::Duplicate
        );
        assert_eq!(
            SubmitOutcome::RateLimited {
                wait_seconds: 1,
                message: String::new()
            }
            .state(),
            FormState::Error
        );
        assert_eq!(SubmitOutcome::InFlight.state(), FormState::Submitting);
    }

    #[tokio::test]
    async fn test_concurrent_submissions_persist_once() {
        let form = Arc::new(ScriptedForm::new(Behaviour::Succeed));
        let controller = Arc::new(controller(form.clone()));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let controller = controller.clone();
                tokio::spawn(async move { controller.submit(&valid(), &NotificationBuffer::new()).await })
            })
            .collect();

        let mut accepted = 0;
        for handle in handles {
            let outcome = handle.await.unwrap();
            if outcome == SubmitOutcome::Accepted {
                accepted += 1;
            } else {
                assert!(matches!(outcome, SubmitOutcome::InFlight | SubmitOutcome::RateLimited { .. }));
            }
        }

        assert_eq!(accepted, 1);
        assert_eq!(form.calls(), 1);
    }

    #[tokio::test]
    async fn test_dropped_submission_does_not_leave_form_stuck() {
        let form = Arc::new(ScriptedForm::new(Behaviour::Hang));
        let controller = controller(form.clone());
        let notifications = NotificationBuffer::new();

        let submission = valid();
        let pending = controller.submit(&submission, &notifications);
        assert!(tokio::time::timeout(Duration::from_millis(10), pending).await.is_err());

        assert_eq!(controller.state(), FormState::Idle);
        assert_eq!(form.calls(), 1);
    }
}
