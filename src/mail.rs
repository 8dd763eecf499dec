//! The email relay behind `POST /api/send-email`: validates a contact
//! submission, forwards it to the business mailbox, and sends the
//! submitter a confirmation.

use std::sync::Arc;

use anyhow::{Result, Context, anyhow};
use chrono::Local;
use lazy_static::lazy_static;
use lettre::{Message, SmtpTransport, Transport,
             message::{Mailbox, header::ContentType},
             transport::smtp::authentication::Credentials};
use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::ahtml::html_escape_into_with;
use crate::http_request_method::HttpRequestMethod;
use crate::http_response_status_codes::HttpResponseStatusCode;
use crate::util::{getenv, getenv_or};
use crate::{info, warn};

pub const DEFAULT_MAIL_TO: &str = "dev@fttgsolutions.com";
pub const DEFAULT_SMTP_RELAY: &str = "smtp.gmail.com";
pub const SENDER_NAME: &str = "FTTG Solutions";
pub const SUCCESS_MESSAGE: &str = "Email sent successfully. We will get back to you soon!";

lazy_static! {
    pub static ref EMAIL_RE: Regex = Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$")
        .expect("valid regex");
}

/// The JSON body of a submission. Every field may be missing or
/// null; validation decides what's required.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SendEmailRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub company: Option<String>,
    #[serde(default)]
    pub subject: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub timestamp: Option<String>,
}

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Name is required")]
    NameRequired,
    #[error("Valid email is required")]
    EmailInvalid,
    #[error("Subject is required")]
    SubjectRequired,
    #[error("Message is required")]
    MessageRequired,
}

#[derive(Error, Debug)]
pub enum RelayError {
    #[error("Missing required environment variables: EMAIL_USER, EMAIL_PASSWORD")]
    MissingEnv,
    #[error("Invalid JSON body: {0}")]
    BadRequest(String),
    #[error(transparent)]
    Validation(#[from] ValidationError),
    /// Sending the business email failed; carries the error message.
    #[error("{0}")]
    Send(String),
}

impl RelayError {
    pub fn status(&self) -> HttpResponseStatusCode {
        match self {
            RelayError::MissingEnv => HttpResponseStatusCode::InternalServerError500,
            RelayError::BadRequest(_) => HttpResponseStatusCode::BadRequest400,
            RelayError::Validation(_) => HttpResponseStatusCode::BadRequest400,
            RelayError::Send(_) => HttpResponseStatusCode::InternalServerError500,
        }
    }
}

fn is_blank(s: &Option<String>) -> bool {
    match s {
        Some(s) => s.trim().is_empty(),
        None => true
    }
}

/// Checks in order: name, email, subject, message. The email is
/// matched as given, not trimmed.
pub fn validate_form_data(data: &SendEmailRequest) -> Result<(), ValidationError> {
    if is_blank(&data.name) {
        return Err(ValidationError::NameRequired)
    }
    match &data.email {
        Some(email) if EMAIL_RE.is_match(email) => (),
        _ => return Err(ValidationError::EmailInvalid)
    }
    if is_blank(&data.subject) {
        return Err(ValidationError::SubjectRequired)
    }
    if is_blank(&data.message) {
        return Err(ValidationError::MessageRequired)
    }
    Ok(())
}

/// Escape text for inclusion in the email HTML. Apostrophes become
/// `&#039;` here, unlike in the pages.
pub fn sanitize_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    html_escape_into_with(&mut out, text, "&#039;");
    out
}

fn field(s: &Option<String>) -> String {
    sanitize_html(s.as_deref().unwrap_or(""))
}

fn nonempty(s: &Option<String>) -> Option<&str> {
    s.as_deref().filter(|s| !s.is_empty())
}

/// Like JavaScript's `toLocaleString()` in the en-US locale.
pub fn local_timestamp() -> String {
    Local::now().format("%-m/%-d/%Y, %-I:%M:%S %p").to_string()
}

/// The HTML body of the email to the business mailbox. All user
/// supplied text is escaped.
pub fn format_email_html(data: &SendEmailRequest) -> String {
    let row = |label: &str, value: String| {
        format!("<p style=\"margin: 12px 0;\"><strong style=\"color: #0891b2;\">{label}:</strong> \
                 {value}</p>")
    };
    let email = field(&data.email);
    let mut rows = vec![
        row("Name", field(&data.name)),
        row("Email", format!("<a href=\"mailto:{email}\">{email}</a>")),
    ];
    if let Some(phone) = nonempty(&data.phone) {
        rows.push(row("Phone", sanitize_html(phone)));
    }
    if let Some(company) = nonempty(&data.company) {
        rows.push(row("Company", sanitize_html(company)));
    }
    rows.push(row("Subject", field(&data.subject)));
    let timestamp = match &data.timestamp {
        Some(t) => sanitize_html(t),
        None => local_timestamp(),
    };
    format!(
        "<div style=\"font-family: Arial, sans-serif; max-width: 600px; margin: 0 auto;\">\n\
         <h2 style=\"color: #333; border-bottom: 2px solid #0891b2; padding-bottom: 10px;\">\
         New Contact Form Submission</h2>\n\
         <div style=\"background-color: #f8fafc; padding: 20px; border-radius: 8px; margin: 20px 0;\">\n\
         {rows}\n\
         </div>\n\
         <div style=\"background-color: #fff; padding: 20px; border: 1px solid #e2e8f0; \
         border-radius: 8px; margin: 20px 0;\">\n\
         <h3 style=\"color: #333; margin-top: 0;\">Message:</h3>\n\
         <p style=\"color: #555; line-height: 1.6; white-space: pre-wrap;\">{message}</p>\n\
         </div>\n\
         <div style=\"color: #999; font-size: 12px; margin-top: 20px; padding-top: 20px; \
         border-top: 1px solid #e2e8f0;\">\n\
         <p>Submitted at: {timestamp}</p>\n\
         <p>From: <strong>FTTG Solutions Contact Form</strong></p>\n\
         </div>\n\
         </div>\n",
        rows = rows.join("\n"),
        message = field(&data.message),
    )
}

/// The HTML body of the confirmation email to the submitter.
pub fn format_confirmation_html(data: &SendEmailRequest) -> String {
    let or_phone = match nonempty(&data.phone) {
        Some(phone) => format!(" or <strong>{}</strong>", sanitize_html(phone)),
        None => String::new(),
    };
    format!(
        "<div style=\"font-family: Arial, sans-serif; max-width: 600px; margin: 0 auto;\">\n\
         <h2 style=\"color: #0891b2;\">Thank you for contacting FTTG Solutions!</h2>\n\
         <p>Hi {name},</p>\n\
         <p>We've received your message and will get back to you as soon as possible.</p>\n\
         <div style=\"background-color: #f8fafc; padding: 20px; border-radius: 8px; margin: 20px 0;\">\n\
         <p><strong>Your Message Summary:</strong></p>\n\
         <p><strong>Subject:</strong> {subject}</p>\n\
         <p>We'll contact you at <strong>{email}</strong>{or_phone}.</p>\n\
         </div>\n\
         <p>Best regards,<br><strong>FTTG Solutions Team</strong></p>\n\
         <hr style=\"border: none; border-top: 1px solid #e2e8f0; margin: 30px 0;\">\n\
         <p style=\"color: #999; font-size: 12px;\">\
         This is an automated response. Please do not reply to this email.</p>\n\
         </div>\n",
        name = field(&data.name),
        subject = field(&data.subject),
        email = field(&data.email),
    )
}

// ------------------------------------------------------------------
// Configuration and sending

#[derive(Clone)]
pub struct MailConfig {
    /// Account used for SMTP auth and as sender address.
    pub user: String,
    pub password: String,
    /// Business mailbox receiving the submissions.
    pub to: String,
    pub relay_host: String,
}

impl std::fmt::Debug for MailConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MailConfig")
            .field("user", &self.user)
            .field("password", &"<hidden>")
            .field("to", &self.to)
            .field("relay_host", &self.relay_host)
            .finish()
    }
}

impl MailConfig {
    /// Reads `EMAIL_USER`, `EMAIL_PASSWORD` (both required),
    /// `MAIL_TO` and `SMTP_RELAY`.
    pub fn from_env() -> Result<MailConfig, RelayError> {
        let get = |name| getenv(name).ok().flatten();
        match (get("EMAIL_USER"), get("EMAIL_PASSWORD")) {
            (Some(user), Some(password)) => Ok(MailConfig {
                user,
                password,
                to: getenv_or("MAIL_TO", Some(DEFAULT_MAIL_TO))
                    .unwrap_or_else(|_| DEFAULT_MAIL_TO.into()),
                relay_host: getenv_or("SMTP_RELAY", Some(DEFAULT_SMTP_RELAY))
                    .unwrap_or_else(|_| DEFAULT_SMTP_RELAY.into()),
            }),
            _ => Err(RelayError::MissingEnv)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingEmail {
    pub from_name: String,
    pub from_address: String,
    pub to: String,
    pub reply_to: Option<String>,
    pub subject: String,
    pub html: String,
}

impl OutgoingEmail {
    /// The `From:` header value.
    pub fn from_header(&self) -> String {
        format!("\"{}\" <{}>", self.from_name, self.from_address)
    }
}

pub trait Mailer: Send + Sync {
    fn send(&self, email: &OutgoingEmail) -> Result<()>;
}

/// Sends via an SMTP relay with TLS and the configured credentials.
pub struct SmtpMailer {
    transport: SmtpTransport,
}

impl SmtpMailer {
    pub fn new(config: &MailConfig) -> Result<SmtpMailer> {
        let transport = SmtpTransport::relay(&config.relay_host)
            .with_context(|| anyhow!("setting up SMTP relay {:?}", config.relay_host))?
            .credentials(Credentials::new(config.user.clone(), config.password.clone()))
            .build();
        Ok(SmtpMailer { transport })
    }
}

impl Mailer for SmtpMailer {
    fn send(&self, email: &OutgoingEmail) -> Result<()> {
        let from = Mailbox::new(Some(email.from_name.clone()),
                                email.from_address.parse().with_context(
                                    || anyhow!("invalid sender address {:?}",
                                               email.from_address))?);
        let mut builder = Message::builder()
            .from(from)
            .to(email.to.parse().with_context(
                || anyhow!("invalid recipient address {:?}", email.to))?)
            .subject(email.subject.clone())
            .header(ContentType::TEXT_HTML);
        if let Some(reply_to) = &email.reply_to {
            builder = builder.reply_to(reply_to.parse().with_context(
                || anyhow!("invalid reply-to address {:?}", reply_to))?);
        }
        let message = builder.body(email.html.clone())?;
        self.transport.send(&message)?;
        Ok(())
    }
}

struct RelayBackend {
    config: MailConfig,
    mailer: Arc<dyn Mailer>,
}

/// Status and JSON reply of the endpoint.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RelayReply {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl RelayReply {
    pub fn ok(message: &str) -> RelayReply {
        RelayReply { success: true, message: Some(message.into()), error: None }
    }
    pub fn error(error: String) -> RelayReply {
        RelayReply { success: false, message: None, error: Some(error) }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RelayResponse {
    pub status: HttpResponseStatusCode,
    /// None for the empty preflight response.
    pub body: Option<RelayReply>,
}

pub struct EmailRelay {
    backend: Option<RelayBackend>,
}

impl EmailRelay {
    pub fn new(config: MailConfig, mailer: Arc<dyn Mailer>) -> EmailRelay {
        EmailRelay { backend: Some(RelayBackend { config, mailer }) }
    }

    /// A relay that answers every submission with the missing
    /// configuration error.
    pub fn unconfigured() -> EmailRelay {
        EmailRelay { backend: None }
    }

    /// Configured from the environment, sending via SMTP. Missing
    /// credentials are not an error here: the endpoint reports them
    /// per request.
    pub fn from_env() -> Result<EmailRelay> {
        match MailConfig::from_env() {
            Ok(config) => {
                let mailer = Arc::new(SmtpMailer::new(&config)?);
                info!("email relay: sending via {:?} to {:?}", config.relay_host, config.to);
                Ok(EmailRelay::new(config, mailer))
            }
            Err(e) => {
                warn!("email relay: {e}");
                Ok(EmailRelay::unconfigured())
            }
        }
    }

    pub fn is_configured(&self) -> bool {
        self.backend.is_some()
    }

    /// Validate and send a submission: the business email must go
    /// out, the confirmation to the submitter is best effort.
    pub fn send(&self, data: &SendEmailRequest) -> Result<(), RelayError> {
        let backend = self.backend.as_ref().ok_or(RelayError::MissingEnv)?;
        info!("received form submission: name={:?} email={:?} subject={:?}",
              data.name, data.email, data.subject);
        validate_form_data(data).map_err(|e| {
            warn!("validation error: {e}");
            e
        })?;
        let email = data.email.clone().unwrap_or_default();
        let subject = data.subject.clone().unwrap_or_default();

        let business = OutgoingEmail {
            from_name: SENDER_NAME.into(),
            from_address: backend.config.user.clone(),
            to: backend.config.to.clone(),
            reply_to: Some(email.clone()),
            subject: format!("New Contact: {subject}"),
            html: format_email_html(data),
        };
        backend.mailer.send(&business).map_err(|e| {
            warn!("error sending email to {:?}: {e:#}", business.to);
            RelayError::Send(format!("{e:#}"))
        })?;
        info!("email sent successfully to {:?}", business.to);

        let confirmation = OutgoingEmail {
            from_name: SENDER_NAME.into(),
            from_address: backend.config.user.clone(),
            to: email,
            reply_to: None,
            subject: "We received your message - FTTG Solutions".into(),
            html: format_confirmation_html(data),
        };
        match backend.mailer.send(&confirmation) {
            Ok(()) => info!("confirmation email sent to {:?}", confirmation.to),
            Err(e) => warn!("failed to send confirmation email: {e:#}"),
        }
        Ok(())
    }

    /// The endpoint: method dispatch, configuration check, body
    /// parsing, sending.
    pub fn handle(&self, method: HttpRequestMethod, body: &[u8]) -> RelayResponse {
        if method.is_options() {
            return RelayResponse { status: HttpResponseStatusCode::OK200, body: None }
        }
        if !method.is_post() {
            return RelayResponse {
                status: HttpResponseStatusCode::MethodNotAllowed405,
                body: Some(RelayReply::error("Method not allowed. Use POST.".into())),
            }
        }
        let result = (|| -> Result<(), RelayError> {
            if self.backend.is_none() {
                return Err(RelayError::MissingEnv)
            }
            let data: SendEmailRequest = serde_json::from_slice(body)
                .map_err(|e| RelayError::BadRequest(e.to_string()))?;
            self.send(&data)
        })();
        match result {
            Ok(()) => RelayResponse {
                status: HttpResponseStatusCode::OK200,
                body: Some(RelayReply::ok(SUCCESS_MESSAGE)),
            },
            Err(e) => RelayResponse {
                status: e.status(),
                body: Some(RelayReply::error(e.to_string())),
            }
        }
    }
}


#[cfg(test)]
pub mod tests {
    use super::*;
    use std::sync::Mutex;
    use anyhow::bail;
    use serde_json::json;

    /// Records sent emails; fails sends to addresses in `fail_to`.
    #[derive(Default)]
    pub struct FakeMailer {
        pub sent: Mutex<Vec<OutgoingEmail>>,
        pub fail_to: Vec<String>,
    }

    impl Mailer for FakeMailer {
        fn send(&self, email: &OutgoingEmail) -> Result<()> {
            if self.fail_to.contains(&email.to) {
                bail!("connection refused")
            }
            self.sent.lock().unwrap().push(email.clone());
            Ok(())
        }
    }

    pub fn test_config() -> MailConfig {
        MailConfig {
            user: "robot@fttgsolutions.com".into(),
            password: "secret".into(),
            to: DEFAULT_MAIL_TO.into(),
            relay_host: "localhost".into(),
        }
    }

    fn body(v: serde_json::Value) -> Vec<u8> {
        serde_json::to_vec(&v).unwrap()
    }

    fn valid() -> serde_json::Value {
        json!({"name": "Ann", "email": "ann@example.com", "subject": "Web",
               "message": "Hello", "timestamp": "1/2/2025, 3:04:05 PM"})
    }

    #[test]
    fn t_validate_form_data() {
        let mut d: SendEmailRequest = serde_json::from_value(valid()).unwrap();
        assert_eq!(validate_form_data(&d), Ok(()));
        d.message = Some("  ".into());
        assert_eq!(validate_form_data(&d), Err(ValidationError::MessageRequired));
        d.subject = None;
        assert_eq!(validate_form_data(&d), Err(ValidationError::SubjectRequired));
        d.email = Some(" ann@example.com".into());
        assert_eq!(validate_form_data(&d), Err(ValidationError::EmailInvalid));
        d.email = Some("ann@example".into());
        assert_eq!(validate_form_data(&d), Err(ValidationError::EmailInvalid));
        d.name = Some("".into());
        assert_eq!(validate_form_data(&d), Err(ValidationError::NameRequired));
    }

    #[test]
    fn t_sanitize_and_format() {
        assert_eq!(sanitize_html(r#"<a href="x">'&'</a>"#),
                   "&lt;a href=&quot;x&quot;&gt;&#039;&amp;&#039;&lt;/a&gt;");
        let d = SendEmailRequest {
            name: Some("<b>Ann</b>".into()),
            email: Some("ann@example.com".into()),
            phone: Some("".into()),
            company: Some("ACME & Sons".into()),
            subject: Some("Web".into()),
            message: Some("<script>x</script>".into()),
            timestamp: Some("now".into()),
        };
        let html = format_email_html(&d);
        assert!(html.contains("&lt;b&gt;Ann&lt;/b&gt;"));
        assert!(html.contains("ACME &amp; Sons"));
        assert!(html.contains("&lt;script&gt;x&lt;/script&gt;"));
        assert!(!html.contains("<script>"));
        assert!(!html.contains("Phone:"));
        assert!(html.contains("Submitted at: now"));
        let conf = format_confirmation_html(&d);
        assert!(conf.contains("Hi &lt;b&gt;Ann&lt;/b&gt;,"));
        assert!(!conf.contains(" or <strong>"));
    }

    #[test]
    fn t_method_handling() {
        let relay = EmailRelay::unconfigured();
        let r = relay.handle(HttpRequestMethod::OPTIONS, b"");
        assert_eq!(r, RelayResponse { status: HttpResponseStatusCode::OK200, body: None });
        let r = relay.handle(HttpRequestMethod::GET, b"");
        assert_eq!(r.status.code(), 405);
        assert_eq!(r.body.unwrap().error.as_deref(), Some("Method not allowed. Use POST."));
    }

    #[test]
    fn t_missing_env() {
        let relay = EmailRelay::unconfigured();
        let r = relay.handle(HttpRequestMethod::POST, &body(valid()));
        assert_eq!(r.status.code(), 500);
        assert_eq!(r.body.unwrap().error.as_deref(),
                   Some("Missing required environment variables: EMAIL_USER, EMAIL_PASSWORD"));
    }

    #[test]
    fn t_bad_requests() {
        let relay = EmailRelay::new(test_config(), Arc::new(FakeMailer::default()));
        assert_eq!(relay.handle(HttpRequestMethod::POST, b"{not json").status.code(), 400);
        let mut v = valid();
        v["email"] = json!("nope");
        let r = relay.handle(HttpRequestMethod::POST, &body(v));
        assert_eq!(r.status.code(), 400);
        assert_eq!(r.body.unwrap().error.as_deref(), Some("Valid email is required"));
    }

    #[test]
    fn t_success_sends_both() {
        let mailer = Arc::new(FakeMailer::default());
        let relay = EmailRelay::new(test_config(), mailer.clone());
        let r = relay.handle(HttpRequestMethod::POST, &body(valid()));
        assert_eq!(r.status.code(), 200);
        assert_eq!(serde_json::to_value(r.body.unwrap()).unwrap(),
                   json!({"success": true, "message": SUCCESS_MESSAGE}));
        let sent = mailer.sent.lock().unwrap();
        assert_eq!(sent.len(), 2);
        assert_eq!(sent[0].to, DEFAULT_MAIL_TO);
        assert_eq!(sent[0].reply_to.as_deref(), Some("ann@example.com"));
        assert_eq!(sent[0].subject, "New Contact: Web");
        assert_eq!(sent[0].from_header(), "\"FTTG Solutions\" <robot@fttgsolutions.com>");
        assert_eq!(sent[1].to, "ann@example.com");
        assert_eq!(sent[1].subject, "We received your message - FTTG Solutions");
    }

    #[test]
    fn t_confirmation_failure_swallowed() {
        let mailer = Arc::new(FakeMailer {
            fail_to: vec!["ann@example.com".into()],
            ..Default::default()
        });
        let relay = EmailRelay::new(test_config(), mailer.clone());
        assert_eq!(relay.handle(HttpRequestMethod::POST, &body(valid())).status.code(), 200);
        assert_eq!(mailer.sent.lock().unwrap().len(), 1);
    }

    #[test]
    fn t_business_failure_is_500() {
        let mailer = Arc::new(FakeMailer {
            fail_to: vec![DEFAULT_MAIL_TO.into()],
            ..Default::default()
        });
        let relay = EmailRelay::new(test_config(), mailer);
        let r = relay.handle(HttpRequestMethod::POST, &body(valid()));
        assert_eq!(r.status.code(), 500);
        assert_eq!(r.body.unwrap().error.as_deref(), Some("connection refused"));
    }
}
