#![forbid(unsafe_code)]

//! Contact form validation and submission.
//!
//! The validator disables native validation and owns the whole lifecycle:
//! fields are checked on blur, errors are cleared on input, and a submit
//! validates everything before handing the serialized fields to a
//! [`FormSubmitter`]. The submitter's outcome arrives after its declared
//! latency and is reported through a transient banner.

use std::collections::{BTreeMap, HashMap};
use std::sync::LazyLock;

use pagekit_core::{
    Binding, Ctx, Dispatch, Dom, EventKind, Mount, NodeId, PageConfig, PageError, PageEvent,
    SubmitError, TimerId,
};
use regex::Regex;
use web_time::Duration;

use crate::Controller;

pub const FORM_SELECTOR: &str = "#contactForm";
pub const FIELD_SELECTOR: &str = "input, textarea, select";
pub const ERROR_CLASS: &str = "error";
pub const ERROR_MESSAGE_CLASS: &str = "error-message";

pub const SUCCESS_TEXT: &str = "Thank you! Your message has been sent successfully.";
pub const FAILURE_TEXT: &str = "There was an error sending your message. Please try again.";

static EMAIL_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern compiles"));
static PHONE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9\s()+\-]{10,}$").expect("phone pattern compiles"));

/// Serialized form fields, `name -> value`.
pub type FormData = BTreeMap<String, String>;

/// Why a field failed validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldIssue {
    Required,
    InvalidEmail,
    InvalidPhone,
}

impl FieldIssue {
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::Required => "This field is required",
            Self::InvalidEmail => "Please enter a valid email address",
            Self::InvalidPhone => "Please enter a valid phone number",
        }
    }
}

/// Declared input type, as far as validation cares.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Email,
    Tel,
    Other,
}

impl FieldKind {
    #[must_use]
    pub fn from_type_attr(value: Option<&str>) -> Self {
        match value.map(str::to_ascii_lowercase).as_deref() {
            Some("email") => Self::Email,
            Some("tel") => Self::Tel,
            _ => Self::Other,
        }
    }
}

#[must_use]
pub fn is_valid_email(value: &str) -> bool {
    EMAIL_PATTERN.is_match(value)
}

#[must_use]
pub fn is_valid_phone(value: &str) -> bool {
    PHONE_PATTERN.is_match(value)
}

/// Check one value. Format checks only apply to non-empty values.
#[must_use]
pub fn check_value(kind: FieldKind, required: bool, value: &str) -> Option<FieldIssue> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return required.then_some(FieldIssue::Required);
    }
    match kind {
        FieldKind::Email if !is_valid_email(trimmed) => Some(FieldIssue::InvalidEmail),
        FieldKind::Tel if !is_valid_phone(trimmed) => Some(FieldIssue::InvalidPhone),
        _ => None,
    }
}

/// Outcome of handing form data to a [`FormSubmitter`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionReceipt {
    /// Delay after which `outcome` becomes visible to the page.
    pub settle_after: Duration,
    pub outcome: Result<(), SubmitError>,
}

/// Collaborator that delivers form data somewhere.
pub trait FormSubmitter {
    fn submit(&mut self, data: &FormData) -> SubmissionReceipt;
}

/// Placeholder submitter: always succeeds after a fixed latency.
#[derive(Debug, Clone)]
pub struct SimulatedSubmitter {
    latency: Duration,
}

impl SimulatedSubmitter {
    #[must_use]
    pub const fn new(latency: Duration) -> Self {
        Self { latency }
    }
}

impl FormSubmitter for SimulatedSubmitter {
    fn submit(&mut self, data: &FormData) -> SubmissionReceipt {
        tracing::info!(fields = data.len(), "simulated form submission");
        SubmissionReceipt {
            settle_after: self.latency,
            outcome: Ok(()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BannerKind {
    Success,
    Error,
}

impl BannerKind {
    const fn class(self) -> &'static str {
        match self {
            Self::Success => "form-message success",
            Self::Error => "form-message error",
        }
    }

    const fn text(self) -> &'static str {
        match self {
            Self::Success => SUCCESS_TEXT,
            Self::Error => FAILURE_TEXT,
        }
    }
}

struct InFlight {
    timer: TimerId,
    outcome: Result<(), SubmitError>,
}

pub struct FormValidator {
    form: NodeId,
    fields: Vec<NodeId>,
    errors: HashMap<NodeId, NodeId>,
    submitter: Box<dyn FormSubmitter>,
    in_flight: Option<InFlight>,
    banners: Vec<(TimerId, NodeId)>,
    banner_ttl: Duration,
    active: bool,
}

impl core::fmt::Debug for FormValidator {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("FormValidator")
            .field("form", &self.form)
            .field("fields", &self.fields.len())
            .field("errors", &self.errors.len())
            .field("in_flight", &self.in_flight.is_some())
            .field("banners", &self.banners.len())
            .finish()
    }
}

impl FormValidator {
    /// Mount on `#contactForm` with the given submission collaborator.
    pub fn mount(
        ctx: &mut Ctx<'_>,
        config: &PageConfig,
        submitter: Box<dyn FormSubmitter>,
    ) -> Mount<Self> {
        let found = ctx
            .dom
            .query(FORM_SELECTOR)
            .ok_or_else(|| PageError::missing("form", FORM_SELECTOR));
        found
            .map(|form| {
                ctx.dom.set_attribute(form, "novalidate", "");
                Self {
                    form,
                    fields: ctx.dom.query_all_within(form, FIELD_SELECTOR),
                    errors: HashMap::new(),
                    submitter,
                    in_flight: None,
                    banners: Vec::new(),
                    banner_ttl: config.banner_ttl_duration(),
                    active: true,
                }
            })
            .into()
    }

    #[must_use]
    pub fn fields(&self) -> &[NodeId] {
        &self.fields
    }

    #[must_use]
    pub fn error_node(&self, field: NodeId) -> Option<NodeId> {
        self.errors.get(&field).copied()
    }

    #[must_use]
    pub fn is_submitting(&self) -> bool {
        self.in_flight.is_some()
    }

    /// Validate one field, rendering or clearing its error.
    pub fn validate_field(&mut self, field: NodeId, dom: &mut dyn Dom) -> bool {
        self.clear_error(field, dom);
        let kind = FieldKind::from_type_attr(dom.attribute(field, "type").as_deref());
        let required = dom.attribute(field, "required").is_some();
        match check_value(kind, required, &dom.value(field)) {
            None => true,
            Some(issue) => {
                self.show_error(field, issue, dom);
                false
            }
        }
    }

    fn error_id(&self, field: NodeId, dom: &dyn Dom) -> String {
        let key = dom
            .attribute(field, "id")
            .filter(|id| !id.is_empty())
            .or_else(|| dom.attribute(field, "name").filter(|name| !name.is_empty()))
            .unwrap_or_else(|| {
                let index = self.fields.iter().position(|f| *f == field).unwrap_or(0);
                format!("field-{index}")
            });
        format!("error-{key}")
    }

    fn show_error(&mut self, field: NodeId, issue: FieldIssue, dom: &mut dyn Dom) {
        let error_id = self.error_id(field, dom);
        let node = dom.create_element("div");
        dom.set_attribute(node, "class", ERROR_MESSAGE_CLASS);
        dom.set_attribute(node, "id", &error_id);
        dom.set_text(node, issue.message());

        if let Some(parent) = dom.parent(field) {
            let after = dom
                .children(parent)
                .into_iter()
                .skip_while(|child| *child != field)
                .nth(1);
            match after {
                Some(sibling) => dom.insert_before(parent, node, sibling),
                None => dom.append_child(parent, node),
            }
        }

        dom.add_class(field, ERROR_CLASS);
        dom.set_attribute(field, "aria-invalid", "true");
        dom.set_attribute(field, "aria-describedby", &error_id);
        self.errors.insert(field, node);
        tracing::debug!(field = %error_id, ?issue, "field invalid");
    }

    /// Remove the field's error message and invalid markers, if any.
    pub fn clear_error(&mut self, field: NodeId, dom: &mut dyn Dom) {
        if let Some(node) = self.errors.remove(&field) {
            dom.remove(node);
            dom.remove_class(field, ERROR_CLASS);
            dom.remove_attribute(field, "aria-invalid");
            dom.remove_attribute(field, "aria-describedby");
        }
    }

    /// Serialize named, enabled, successful controls.
    #[must_use]
    pub fn serialize(&self, dom: &dyn Dom) -> FormData {
        let mut data = FormData::new();
        for field in &self.fields {
            let Some(name) = dom.attribute(*field, "name").filter(|n| !n.is_empty()) else {
                continue;
            };
            if dom.attribute(*field, "disabled").is_some() {
                continue;
            }
            let input_type = dom
                .attribute(*field, "type")
                .map(|t| t.to_ascii_lowercase())
                .unwrap_or_default();
            let value = match input_type.as_str() {
                "submit" | "button" | "reset" | "file" | "image" => continue,
                "checkbox" | "radio" => {
                    if !dom.is_checked(*field) {
                        continue;
                    }
                    dom.attribute(*field, "value")
                        .unwrap_or_else(|| "on".to_owned())
                }
                _ => dom.value(*field),
            };
            data.insert(name, value);
        }
        data
    }

    fn submit(&mut self, ctx: &mut Ctx<'_>) {
        if self.in_flight.is_some() {
            tracing::debug!("submit ignored while a submission is in flight");
            return;
        }
        let fields = self.fields.clone();
        let mut first_invalid = None;
        for field in fields {
            if !self.validate_field(field, ctx.dom) && first_invalid.is_none() {
                first_invalid = Some(field);
            }
        }
        if let Some(field) = first_invalid {
            ctx.dom.focus(field);
            return;
        }

        let data = self.serialize(ctx.dom);
        let receipt = self.submitter.submit(&data);
        let timer = ctx.schedule_once(receipt.settle_after);
        self.in_flight = Some(InFlight {
            timer,
            outcome: receipt.outcome,
        });
    }

    fn settle(&mut self, outcome: Result<(), SubmitError>, ctx: &mut Ctx<'_>) {
        match outcome {
            Ok(()) => {
                self.show_banner(BannerKind::Success, ctx);
                ctx.dom.reset_form(self.form);
            }
            Err(err) => {
                tracing::error!(error = %err, "form submission error");
                self.show_banner(BannerKind::Error, ctx);
            }
        }
    }

    fn show_banner(&mut self, kind: BannerKind, ctx: &mut Ctx<'_>) {
        let banner = ctx.dom.create_element("div");
        ctx.dom.set_attribute(banner, "class", kind.class());
        ctx.dom.set_text(banner, kind.text());
        match ctx.dom.parent(self.form) {
            Some(parent) => ctx.dom.insert_before(parent, banner, self.form),
            None => {
                let body = ctx.dom.body();
                ctx.dom.append_child(body, banner);
            }
        }
        let timer = ctx.schedule_once(self.banner_ttl);
        self.banners.push((timer, banner));
    }
}

impl Controller for FormValidator {
    fn name(&self) -> &'static str {
        "form"
    }

    fn bindings(&self) -> Vec<Binding> {
        let mut bindings = vec![Binding::node(self.form, EventKind::Submit)];
        for field in &self.fields {
            bindings.push(Binding::node(*field, EventKind::Blur));
            bindings.push(Binding::node(*field, EventKind::Input));
        }
        bindings
    }

    fn handle(&mut self, event: &PageEvent, ctx: &mut Ctx<'_>) -> Dispatch {
        if !self.active {
            return Dispatch::default();
        }
        match event {
            PageEvent::Submit { target } if *target == self.form => {
                self.submit(ctx);
                return Dispatch {
                    prevent_default: true,
                    ..Dispatch::default()
                };
            }
            PageEvent::Blur { target } if self.fields.contains(target) => {
                self.validate_field(*target, ctx.dom);
            }
            PageEvent::Input { target } if self.fields.contains(target) => {
                self.clear_error(*target, ctx.dom);
            }
            _ => {}
        }
        Dispatch::default()
    }

    fn on_timer(&mut self, id: TimerId, ctx: &mut Ctx<'_>) -> bool {
        if self.in_flight.as_ref().is_some_and(|f| f.timer == id) {
            if let Some(done) = self.in_flight.take() {
                self.settle(done.outcome, ctx);
            }
            return true;
        }
        if let Some(index) = self.banners.iter().position(|(timer, _)| *timer == id) {
            let (_, banner) = self.banners.remove(index);
            ctx.dom.remove(banner);
            return true;
        }
        false
    }

    fn teardown(&mut self, ctx: &mut Ctx<'_>) {
        if let Some(pending) = self.in_flight.take() {
            ctx.timers.cancel(pending.timer);
        }
        for (timer, banner) in self.banners.drain(..) {
            ctx.timers.cancel(timer);
            ctx.dom.remove(banner);
        }
        self.active = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::Harness;
    use pretty_assertions::assert_eq;
    use tracing_test::traced_test;

    struct Offline;

    impl FormSubmitter for Offline {
        fn submit(&mut self, _data: &FormData) -> SubmissionReceipt {
            SubmissionReceipt {
                settle_after: Duration::from_millis(300),
                outcome: Err(SubmitError::new("offline")),
            }
        }
    }

    #[test]
    fn email_shapes() {
        assert!(is_valid_email("ada@example.com"));
        assert!(is_valid_email("a.b@mail.example.co"));
        assert!(!is_valid_email("ada@example"));
        assert!(!is_valid_email("ada example@x.io"));
        assert!(!is_valid_email("@example.com"));
        assert!(!is_valid_email("a@@example.com"));
        assert!(!is_valid_email("a@.com"));
    }

    #[test]
    fn phone_shapes() {
        assert!(is_valid_phone("+1 (555) 123-4567"));
        assert!(is_valid_phone("0123456789"));
        assert!(!is_valid_phone("555-1234"));
        assert!(!is_valid_phone("call 5551234567"));
    }

    #[test]
    fn check_value_rules() {
        assert_eq!(check_value(FieldKind::Other, true, "   "), Some(FieldIssue::Required));
        assert_eq!(check_value(FieldKind::Other, false, ""), None);
        assert_eq!(check_value(FieldKind::Email, false, ""), None);
        assert_eq!(
            check_value(FieldKind::Email, false, "nope"),
            Some(FieldIssue::InvalidEmail)
        );
        assert_eq!(check_value(FieldKind::Email, true, "  ada@example.com "), None);
        assert_eq!(
            check_value(FieldKind::Tel, true, "12345"),
            Some(FieldIssue::InvalidPhone)
        );
    }

    #[test]
    fn field_kind_is_case_insensitive() {
        assert_eq!(FieldKind::from_type_attr(Some("EMAIL")), FieldKind::Email);
        assert_eq!(FieldKind::from_type_attr(Some("tel")), FieldKind::Tel);
        assert_eq!(FieldKind::from_type_attr(None), FieldKind::Other);
    }

    fn form_page(h: &mut Harness) -> (NodeId, NodeId, NodeId) {
        let body = h.dom.body();
        let form = h.dom.append_with(body, "form", &[("id", "contactForm")]);
        let group = h.dom.append_with(form, "div", &[("class", "form-group")]);
        let name = h.dom.append_with(
            group,
            "input",
            &[("id", "name"), ("name", "name"), ("required", "")],
        );
        h.dom.append(group, "small");
        let phone = h.dom.append_with(form, "input", &[("name", "phone"), ("type", "tel")]);
        (form, name, phone)
    }

    fn mounted(h: &mut Harness) -> FormValidator {
        h.with(|ctx| {
            FormValidator::mount(
                ctx,
                &PageConfig::default(),
                Box::new(SimulatedSubmitter::new(Duration::from_millis(1000))),
            )
        })
        .into_active()
        .expect("form should mount")
    }

    #[test]
    fn mount_disables_native_validation() {
        let mut h = Harness::new();
        let (form, _, _) = form_page(&mut h);
        let v = mounted(&mut h);
        assert!(h.dom.attribute(form, "novalidate").is_some());
        assert_eq!(v.fields().len(), 2);
    }

    #[test]
    fn blur_renders_error_right_after_field() {
        let mut h = Harness::new();
        let (_, name, _) = form_page(&mut h);
        let mut v = mounted(&mut h);
        h.dispatch(&mut v, PageEvent::Blur { target: name });

        let error = v.error_node(name).expect("error rendered");
        let group = h.dom.parent(name).unwrap();
        let children = h.dom.children(group);
        assert_eq!(children[1], error);
        assert_eq!(h.dom.text(error), "This field is required");
        assert_eq!(h.dom.attribute(error, "id").as_deref(), Some("error-name"));
        assert!(h.dom.has_class(name, ERROR_CLASS));
        assert_eq!(h.dom.attribute(name, "aria-invalid").as_deref(), Some("true"));
        assert_eq!(
            h.dom.attribute(name, "aria-describedby").as_deref(),
            Some("error-name")
        );
    }

    #[test]
    fn repeated_blur_keeps_single_error() {
        let mut h = Harness::new();
        let (form, name, _) = form_page(&mut h);
        let mut v = mounted(&mut h);
        for _ in 0..3 {
            h.dispatch(&mut v, PageEvent::Blur { target: name });
        }
        assert_eq!(h.dom.query_all_within(form, ".error-message").len(), 1);
    }

    #[test]
    fn input_clears_error_and_valid_blur_stays_clean() {
        let mut h = Harness::new();
        let (form, name, _) = form_page(&mut h);
        let mut v = mounted(&mut h);
        h.dispatch(&mut v, PageEvent::Blur { target: name });
        h.dom.set_value(name, "A");
        h.dispatch(&mut v, PageEvent::Input { target: name });
        assert!(v.error_node(name).is_none());
        assert!(!h.dom.has_class(name, ERROR_CLASS));
        assert_eq!(h.dom.attribute(name, "aria-invalid"), None);

        h.dispatch(&mut v, PageEvent::Blur { target: name });
        assert!(h.dom.query_within(form, ".error-message").is_none());
    }

    #[test]
    fn unnamed_field_error_id_falls_back_to_position() {
        let mut h = Harness::new();
        let body = h.dom.body();
        let form = h.dom.append_with(body, "form", &[("id", "contactForm")]);
        h.dom.append_with(form, "input", &[("name", "a")]);
        let anon = h.dom.append_with(form, "textarea", &[("required", "")]);
        let mut v = mounted(&mut h);
        h.dispatch(&mut v, PageEvent::Blur { target: anon });
        let error = v.error_node(anon).unwrap();
        assert_eq!(h.dom.attribute(error, "id").as_deref(), Some("error-field-1"));
    }

    #[test]
    fn serialize_skips_unsuccessful_controls() {
        let mut h = Harness::new();
        let body = h.dom.body();
        let form = h.dom.append_with(body, "form", &[("id", "contactForm")]);
        let name = h.dom.append_with(form, "input", &[("name", "name")]);
        h.dom.append_with(form, "input", &[("name", "go"), ("type", "submit")]);
        let off = h.dom.append_with(form, "input", &[("name", "off"), ("disabled", "")]);
        h.dom
            .append_with(form, "input", &[("name", "news"), ("type", "checkbox")]);
        let terms = h
            .dom
            .append_with(form, "input", &[("name", "terms"), ("type", "checkbox")]);
        h.dom.append_with(form, "input", &[]);
        h.dom.set_value(name, "Ada");
        h.dom.set_value(off, "x");
        h.dom.set_checked(terms, true);

        let v = mounted(&mut h);
        let data = v.serialize(&h.dom);
        let expected: FormData = [("name", "Ada"), ("terms", "on")]
            .into_iter()
            .map(|(key, value)| (key.to_owned(), value.to_owned()))
            .collect();
        assert_eq!(data, expected);
    }

    #[test]
    fn missing_form_is_inactive() {
        let mut h = Harness::new();
        let mount = h.with(|ctx| {
            FormValidator::mount(
                ctx,
                &PageConfig::default(),
                Box::new(SimulatedSubmitter::new(Duration::ZERO)),
            )
        });
        assert_eq!(
            mount.inactive_reason(),
            Some(&PageError::missing("form", FORM_SELECTOR))
        );
    }

    #[test]
    fn successful_submit_shows_banner_then_expires() {
        let mut h = Harness::new();
        let (form, name, phone) = form_page(&mut h);
        let mut v = mounted(&mut h);
        h.dom.set_value(name, "Ada");
        h.dom.set_value(phone, "555 123 4567");

        let out = h.dispatch(&mut v, PageEvent::Submit { target: form });
        assert!(out.prevent_default);
        assert!(v.is_submitting());

        h.advance(&mut v, Duration::from_millis(1000));
        let body = h.dom.body();
        let banner = h.dom.query(".form-message").expect("banner shown");
        assert!(h.dom.has_class(banner, "success"));
        assert_eq!(h.dom.children(body)[0], banner);
        assert_eq!(h.dom.value(name), "");
        assert_eq!(h.dom.value(phone), "");

        h.advance(&mut v, Duration::from_millis(4999));
        assert!(h.dom.query(".form-message").is_some());
        h.advance(&mut v, Duration::from_millis(1));
        assert!(h.dom.query(".form-message").is_none());
    }

    #[test]
    fn teardown_cancels_pending_work() {
        let mut h = Harness::new();
        let (form, name, _) = form_page(&mut h);
        let mut v = mounted(&mut h);
        h.dom.set_value(name, "Ada");
        h.dispatch(&mut v, PageEvent::Submit { target: form });
        h.with(|ctx| v.teardown(ctx));
        assert!(h.timers.is_empty());
        let out = h.dispatch(&mut v, PageEvent::Submit { target: form });
        assert!(!out.prevent_default);
    }

    #[test]
    fn invalid_submit_focuses_first_invalid_field() {
        let mut h = Harness::new();
        let (form, name, phone) = form_page(&mut h);
        let mut v = mounted(&mut h);
        h.dom.set_value(phone, "123");
        let out = h.dispatch(&mut v, PageEvent::Submit { target: form });
        assert!(out.prevent_default);
        assert!(!v.is_submitting());
        assert_eq!(h.dom.focused(), Some(name));
        assert!(v.error_node(name).is_some());
        let phone_error = v.error_node(phone).expect("phone error");
        assert_eq!(h.dom.text(phone_error), "Please enter a valid phone number");
        assert!(h.timers.is_empty());
    }

    #[test]
    fn submit_while_in_flight_is_ignored() {
        let mut h = Harness::new();
        let (form, name, _) = form_page(&mut h);
        let mut v = mounted(&mut h);
        h.dom.set_value(name, "Ada");
        h.dispatch(&mut v, PageEvent::Submit { target: form });
        let out = h.dispatch(&mut v, PageEvent::Submit { target: form });
        assert!(out.prevent_default);
        assert_eq!(h.timers.len(), 1);

        h.advance(&mut v, Duration::from_millis(1000));
        assert_eq!(h.dom.query_all(".form-message").len(), 1);
    }

    #[test]
    #[traced_test]
    fn failed_submit_logs_and_shows_error_banner() {
        let mut h = Harness::new();
        let (form, name, _) = form_page(&mut h);
        let mut v = h
            .with(|ctx| FormValidator::mount(ctx, &PageConfig::default(), Box::new(Offline)))
            .into_active()
            .expect("form should mount");
        h.dom.set_value(name, "Ada");
        h.dispatch(&mut v, PageEvent::Submit { target: form });
        h.advance(&mut v, Duration::from_millis(300));

        let banner = h.dom.query(".form-message").expect("banner shown");
        assert!(h.dom.has_class(banner, "error"));
        assert_eq!(h.dom.text(banner), FAILURE_TEXT);
        assert_eq!(h.dom.value(name), "Ada", "failed submissions keep input");
        assert!(logs_contain("form submission error"));
        assert!(!v.is_submitting());
    }
}
