//! The contact form: collecting the POSTed fields, validating them,
//! and handing the submission to the email endpoint.

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::http_request_method::HttpRequestMethod;
use crate::mail::{EmailRelay, EMAIL_RE, local_timestamp};
use crate::{info, warn};

pub const DEFAULT_API_ENDPOINT: &str = "/api/send-email";

/// Value of the subject choice that selects the free text input.
pub const CUSTOM_SUBJECT: &str = "__custom";

lazy_static! {
    static ref PHONE_FORMATTING_RE: Regex = Regex::new(r"[\s\-().]").expect("valid regex");
    static ref PHONE_RE: Regex = Regex::new(r"^\d{10,}$").expect("valid regex");
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContactForm {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub company: String,
    /// The selected option; `CUSTOM_SUBJECT` means `custom_subject`
    /// holds the subject.
    pub subject: String,
    pub custom_subject: String,
    pub message: String,
}

impl ContactForm {
    /// From decoded form fields (name, value). Unknown fields are
    /// ignored, later duplicates win.
    pub fn from_pairs<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> ContactForm
    where K: AsRef<str>,
          V: Into<String>
    {
        let mut form = ContactForm::default();
        for (k, v) in pairs {
            let slot = match k.as_ref() {
                "name" => &mut form.name,
                "email" => &mut form.email,
                "phone" => &mut form.phone,
                "company" => &mut form.company,
                "subject" => &mut form.subject,
                "customSubject" => &mut form.custom_subject,
                "message" => &mut form.message,
                _ => continue
            };
            *slot = v.into();
        }
        form
    }

    /// The effective subject.
    /// Identifies a submission independent of when it was made.
    pub fn fingerprint(&self) -> blake3::Hash {
        let mut hasher = blake3::Hasher::new();
        for field in [&self.name, &self.email, &self.phone, &self.company,
                      &self.subject, &self.custom_subject, &self.message] {
            hasher.update(field.as_bytes());
            hasher.update(b"\0");
        }
        hasher.finalize()
    }

    pub fn subject(&self) -> &str {
        if self.subject == CUSTOM_SUBJECT {
            &self.custom_subject
        } else {
            &self.subject
        }
    }

    /// Checks in order: name, email, subject, message, then the
    /// optional phone number.
    pub fn validate(&self) -> Result<(), FormError> {
        if self.name.trim().is_empty() {
            return Err(FormError::NameRequired)
        }
        if !validate_email(&self.email) {
            return Err(FormError::EmailInvalid)
        }
        if self.subject().trim().is_empty() {
            return Err(FormError::SubjectRequired)
        }
        if self.message.trim().is_empty() {
            return Err(FormError::MessageRequired)
        }
        if !self.phone.is_empty() && !validate_phone(&self.phone) {
            return Err(FormError::PhoneInvalid)
        }
        Ok(())
    }
}

pub fn validate_email(email: &str) -> bool {
    EMAIL_RE.is_match(email.trim())
}

/// At least 10 digits once spaces, dashes, parens and dots are
/// removed.
pub fn validate_phone(phone: &str) -> bool {
    PHONE_RE.is_match(&PHONE_FORMATTING_RE.replace_all(phone, ""))
}

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormError {
    #[error("⚠️ Name is required")]
    NameRequired,
    #[error("⚠️ Valid email is required")]
    EmailInvalid,
    #[error("⚠️ Subject is required")]
    SubjectRequired,
    #[error("⚠️ Message is required")]
    MessageRequired,
    #[error("⚠️ Please provide a valid phone number")]
    PhoneInvalid,
}

#[derive(Error, Debug)]
pub enum SubmitError {
    #[error(transparent)]
    Validation(#[from] FormError),
    #[error("form submission already in progress")]
    InProgress,
    #[error("HTTP error! status: {status}")]
    Http { status: u16 },
    #[error("network error: {0}")]
    Network(String),
    #[error("{0}")]
    Other(String),
}

impl SubmitError {
    /// The text shown to the visitor.
    pub fn user_message(&self) -> String {
        match self {
            SubmitError::Validation(e) => e.to_string(),
            SubmitError::InProgress =>
                "⚠️ Form submission already in progress".into(),
            SubmitError::Http { .. } =>
                format!("❌ Server error: {self}. Please try again later."),
            SubmitError::Network(_) =>
                "❌ Network error. Please check your connection and try again.".into(),
            SubmitError::Other(_) =>
                "❌ Oops! Something went wrong. Please check your information and \
                 try again.".into(),
        }
    }
}

/// The JSON body POSTed to the email endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmitPayload {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub company: String,
    pub subject: String,
    pub message: String,
    pub timestamp: String,
}

impl SubmitPayload {
    pub fn new(form: &ContactForm, timestamp: String) -> SubmitPayload {
        SubmitPayload {
            name: form.name.clone(),
            email: form.email.clone(),
            phone: form.phone.clone(),
            company: form.company.clone(),
            subject: form.subject().into(),
            message: form.message.clone(),
            timestamp,
        }
    }
}

pub trait SubmitTransport: Send + Sync {
    /// Deliver the payload to `endpoint`. A non-success status must
    /// be reported as `SubmitError::Http`.
    fn submit(&self, endpoint: &str, payload: &SubmitPayload) -> Result<(), SubmitError>;
}

/// POSTs the payload as JSON over HTTP; `endpoint` must be an
/// absolute URL.
pub struct HttpTransport {
    client: reqwest::blocking::Client,
}

impl HttpTransport {
    pub fn new() -> anyhow::Result<HttpTransport> {
        let client = reqwest::blocking::Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()?;
        Ok(HttpTransport { client })
    }
}

impl SubmitTransport for HttpTransport {
    fn submit(&self, endpoint: &str, payload: &SubmitPayload) -> Result<(), SubmitError> {
        let response = self.client.post(endpoint).json(payload).send().map_err(|e| {
            if e.is_connect() || e.is_timeout() {
                SubmitError::Network(e.to_string())
            } else {
                SubmitError::Other(e.to_string())
            }
        })?;
        let status = response.status();
        if !status.is_success() {
            return Err(SubmitError::Http { status: status.as_u16() })
        }
        let result: serde_json::Value = response.json()
            .map_err(|e| SubmitError::Other(format!("invalid response body: {e}")))?;
        info!("email endpoint replied: {result}");
        Ok(())
    }
}

/// Hands the payload to an in-process relay, as if POSTed to it.
pub struct RelayTransport {
    relay: Arc<EmailRelay>,
}

impl RelayTransport {
    pub fn new(relay: Arc<EmailRelay>) -> RelayTransport {
        RelayTransport { relay }
    }
}

impl SubmitTransport for RelayTransport {
    fn submit(&self, _endpoint: &str, payload: &SubmitPayload) -> Result<(), SubmitError> {
        let body = serde_json::to_vec(payload)
            .map_err(|e| SubmitError::Other(e.to_string()))?;
        let response = self.relay.handle(HttpRequestMethod::POST, &body);
        let status = response.status.code();
        if status != 200 {
            if let Some(error) = response.body.and_then(|r| r.error) {
                warn!("email relay refused submission: {error}");
            }
            return Err(SubmitError::Http { status })
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormConfig {
    pub api_endpoint: String,
}

impl Default for FormConfig {
    fn default() -> Self {
        FormConfig { api_endpoint: DEFAULT_API_ENDPOINT.into() }
    }
}

/// Shared by all requests; a form identical to one still being sent
/// is refused.
pub struct FormService {
    config: Mutex<FormConfig>,
    in_flight: Mutex<HashSet<blake3::Hash>>,
    transport: Arc<dyn SubmitTransport>,
}

/// Removes the submission from the in-flight set when dropped.
pub struct SubmittingGuard<'s> {
    in_flight: &'s Mutex<HashSet<blake3::Hash>>,
    fingerprint: blake3::Hash,
}

impl<'s> Drop for SubmittingGuard<'s> {
    fn drop(&mut self) {
        self.in_flight.lock().unwrap_or_else(|p| p.into_inner()).remove(&self.fingerprint);
    }
}

impl FormService {
    pub fn new(config: FormConfig, transport: Arc<dyn SubmitTransport>) -> FormService {
        FormService {
            config: Mutex::new(config),
            in_flight: Mutex::new(HashSet::new()),
            transport,
        }
    }

    pub fn config(&self) -> FormConfig {
        self.config.lock().unwrap_or_else(|p| p.into_inner()).clone()
    }

    pub fn set_config(&self, config: FormConfig) {
        info!("form service config updated: {config:?}");
        *self.config.lock().unwrap_or_else(|p| p.into_inner()) = config;
    }

    pub fn is_submitting(&self, form: &ContactForm) -> bool {
        self.in_flight.lock().unwrap_or_else(|p| p.into_inner())
            .contains(&form.fingerprint())
    }

    /// Mark `form` as being sent until the guard is dropped.
    pub fn begin_submission(&self, form: &ContactForm)
                            -> Result<SubmittingGuard<'_>, SubmitError>
    {
        let fingerprint = form.fingerprint();
        if !self.in_flight.lock().unwrap_or_else(|p| p.into_inner()).insert(fingerprint) {
            return Err(SubmitError::InProgress)
        }
        Ok(SubmittingGuard { in_flight: &self.in_flight, fingerprint })
    }

    /// Validate and send the form; returns the confirmation text to
    /// show to the visitor.
    pub fn submit(&self, form: &ContactForm) -> Result<String, SubmitError> {
        if self.is_submitting(form) {
            warn!("form submission already in progress");
            return Err(SubmitError::InProgress)
        }
        form.validate().map_err(|e| {
            warn!("form validation failed: {e}");
            e
        })?;
        let _guard = self.begin_submission(form).map_err(|e| {
            warn!("form submission already in progress");
            e
        })?;
        let payload = SubmitPayload::new(form, local_timestamp());
        let endpoint = self.config().api_endpoint;
        info!("sending form data for {:?} to {endpoint:?}", payload.email);
        self.transport.submit(&endpoint, &payload).map_err(|e| {
            warn!("error sending form data: {e}");
            e
        })?;
        Ok(success_message(&form.email, &form.phone))
    }
}

pub fn success_message(email: &str, phone: &str) -> String {
    let mut msg = String::from(
        "We've received your message. Our team will get back to you shortly at ");
    match (email.is_empty(), phone.is_empty()) {
        (false, false) => { msg.push_str(email); msg.push_str(" or "); msg.push_str(phone); }
        (false, true) => msg.push_str(email),
        (true, false) => msg.push_str(phone),
        (true, true) => (),
    }
    msg
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::mail::{EmailRelay, tests::{FakeMailer, test_config}};

    #[derive(Default)]
    struct RecordingTransport {
        sent: Mutex<Vec<(String, SubmitPayload)>>,
        fail_status: Option<u16>,
    }

    impl SubmitTransport for RecordingTransport {
        fn submit(&self, endpoint: &str, payload: &SubmitPayload) -> Result<(), SubmitError> {
            if let Some(status) = self.fail_status {
                return Err(SubmitError::Http { status })
            }
            self.sent.lock().unwrap().push((endpoint.into(), payload.clone()));
            Ok(())
        }
    }

    fn valid_form() -> ContactForm {
        ContactForm::from_pairs([
            ("name", "Ann"),
            ("email", "ann@example.com"),
            ("subject", "Web Development"),
            ("message", "Hello there"),
            ("ignored", "x"),
        ])
    }

    #[test]
    fn t_validation_order() {
        let mut f = valid_form();
        assert_eq!(f.validate(), Ok(()));
        f.phone = "123".into();
        assert_eq!(f.validate(), Err(FormError::PhoneInvalid));
        f.message = " ".into();
        assert_eq!(f.validate(), Err(FormError::MessageRequired));
        f.subject = "".into();
        assert_eq!(f.validate(), Err(FormError::SubjectRequired));
        f.email = "ann@".into();
        assert_eq!(f.validate(), Err(FormError::EmailInvalid));
        f.name = "".into();
        assert_eq!(f.validate().unwrap_err().to_string(), "⚠️ Name is required");
    }

    #[test]
    fn t_email_and_phone() {
        assert!(validate_email(" ann@example.com "));
        assert!(!validate_email("ann@example"));
        assert!(!validate_email("a b@example.com"));
        assert!(validate_phone("(555) 123-4567"));
        assert!(!validate_phone("+1 555.123.4567"));
        assert!(validate_phone("1 555.123.4567"));
        assert!(!validate_phone("555-1234"));
    }

    #[test]
    fn t_custom_subject() {
        let mut f = valid_form();
        f.subject = CUSTOM_SUBJECT.into();
        assert_eq!(f.validate(), Err(FormError::SubjectRequired));
        f.custom_subject = "Consulting".into();
        assert_eq!(f.subject(), "Consulting");
        assert_eq!(f.validate(), Ok(()));
    }

    #[test]
    fn t_submit_success() {
        let transport = Arc::new(RecordingTransport::default());
        let service = FormService::new(FormConfig::default(), transport.clone());
        let mut f = valid_form();
        assert_eq!(service.submit(&f).unwrap(),
                   "We've received your message. Our team will get back to you \
                    shortly at ann@example.com");
        f.phone = "555 123 4567".into();
        assert!(service.submit(&f).unwrap().ends_with("ann@example.com or 555 123 4567"));
        let sent = transport.sent.lock().unwrap();
        assert_eq!(sent.len(), 2);
        assert_eq!(sent[0].0, DEFAULT_API_ENDPOINT);
        assert_eq!(sent[1].1.phone, "555 123 4567");
        assert!(!service.is_submitting(&f));
    }

    #[test]
    fn t_submit_errors() {
        let transport = Arc::new(RecordingTransport { fail_status: Some(500), ..Default::default() });
        let service = FormService::new(FormConfig::default(), transport);
        let e = service.submit(&valid_form()).unwrap_err();
        assert_eq!(e.user_message(),
                   "❌ Server error: HTTP error! status: 500. Please try again later.");
        assert!(!service.is_submitting(&valid_form()));
        assert_eq!(SubmitError::Network("refused".into()).user_message(),
                   "❌ Network error. Please check your connection and try again.");
        assert!(SubmitError::Other("x".into()).user_message().starts_with("❌ Oops!"));

        let e = service.submit(&ContactForm::default()).unwrap_err();
        assert_eq!(e.user_message(), "⚠️ Name is required");
    }

    #[test]
    fn t_double_submission() {
        let transport = Arc::new(RecordingTransport::default());
        let service = FormService::new(FormConfig::default(), transport.clone());
        let mut other = valid_form();
        other.name = "Bob".into();
        {
            let _guard = service.begin_submission(&valid_form()).unwrap();
            assert!(service.is_submitting(&valid_form()));
            assert!(matches!(service.begin_submission(&valid_form()),
                             Err(SubmitError::InProgress)));
            let e = service.submit(&valid_form()).unwrap_err();
            assert_eq!(e.user_message(), "⚠️ Form submission already in progress");
            // someone else's form is not held up
            assert!(service.submit(&other).is_ok());
        }
        assert!(service.submit(&valid_form()).is_ok());
        assert_eq!(transport.sent.lock().unwrap().len(), 2);
    }

    #[test]
    fn t_fingerprint() {
        let f = valid_form();
        assert_eq!(f.fingerprint(), valid_form().fingerprint());
        let mut g = valid_form();
        g.message = "Hello there ".into();
        assert_ne!(f.fingerprint(), g.fingerprint());
        // fields don't run into each other
        let a = ContactForm { name: "ab".into(), ..Default::default() };
        let b = ContactForm { name: "a".into(), email: "b".into(), ..Default::default() };
        assert_ne!(a.fingerprint(), b.fingerprint());
    }

    fn serve<F>(handler: F) -> (String, std::thread::JoinHandle<()>, std::sync::mpsc::Sender<()>)
    where F: Fn(&rouille::Request) -> rouille::Response + Send + Sync + 'static
    {
        let server = rouille::Server::new("127.0.0.1:0", handler).unwrap();
        let url = format!("http://{}{DEFAULT_API_ENDPOINT}", server.server_addr());
        let (handle, stop) = server.stoppable();
        (url, handle, stop)
    }

    #[test]
    fn t_http_transport() {
        let transport = HttpTransport::new().unwrap();
        let payload = SubmitPayload::new(&valid_form(), "1/2/2025, 3:04:05 PM".into());

        let received = Arc::new(Mutex::new(Vec::new()));
        let (url, handle, stop) = {
            let received = received.clone();
            serve(move |request: &rouille::Request| {
                let payload: SubmitPayload = rouille::input::json_input(request).unwrap();
                received.lock().unwrap().push(payload);
                rouille::Response::json(&serde_json::json!({"success": true}))
            })
        };
        assert!(transport.submit(&url, &payload).is_ok());
        assert_eq!(*received.lock().unwrap(), vec![payload.clone()]);
        stop.send(()).unwrap();
        handle.join().unwrap();

        let (url, handle, stop) = serve(|_: &rouille::Request| {
            rouille::Response::text("failed").with_status_code(500)
        });
        let e = transport.submit(&url, &payload).unwrap_err();
        assert!(matches!(e, SubmitError::Http { status: 500 }));
        assert_eq!(e.user_message(),
                   "❌ Server error: HTTP error! status: 500. Please try again later.");
        stop.send(()).unwrap();
        handle.join().unwrap();

        // success status, but not JSON
        let (url, handle, stop) = serve(|_: &rouille::Request| rouille::Response::text("ok"));
        assert!(matches!(transport.submit(&url, &payload), Err(SubmitError::Other(_))));
        stop.send(()).unwrap();
        handle.join().unwrap();
    }

    #[test]
    fn t_http_transport_unreachable() {
        let port = {
            let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap().port()
        };
        let transport = HttpTransport::new().unwrap();
        let payload = SubmitPayload::new(&valid_form(), "now".into());
        let e = transport.submit(&format!("http://127.0.0.1:{port}/api/send-email"), &payload)
            .unwrap_err();
        assert!(matches!(e, SubmitError::Network(_)), "{e:?}");
        assert_eq!(e.user_message(),
                   "❌ Network error. Please check your connection and try again.");
    }

    #[test]
    fn t_config() {
        let service = FormService::new(FormConfig::default(),
                                        Arc::new(RecordingTransport::default()));
        service.set_config(FormConfig { api_endpoint: "http://localhost:1/x".into() });
        assert_eq!(service.config().api_endpoint, "http://localhost:1/x");
    }

    #[test]
    fn t_relay_transport() {
        let mailer = Arc::new(FakeMailer::default());
        let relay = Arc::new(EmailRelay::new(test_config(), mailer.clone()));
        let service = FormService::new(FormConfig::default(),
                                       Arc::new(RelayTransport::new(relay)));
        assert!(service.submit(&valid_form()).is_ok());
        assert_eq!(mailer.sent.lock().unwrap()[0].subject, "New Contact: Web Development");

        let unconfigured = FormService::new(
            FormConfig::default(),
            Arc::new(RelayTransport::new(Arc::new(EmailRelay::unconfigured()))));
        assert!(matches!(unconfigured.submit(&valid_form()),
                         Err(SubmitError::Http { status: 500 })));
    }
}
