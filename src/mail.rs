//! Report delivery over authenticated SMTP.

use std::fs;
use std::time::Duration;

use lettre::message::header::ContentType;
use lettre::message::{Attachment, Mailbox, MultiPart, SinglePart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::transport::smtp::response::{Category, Code, Detail, Severity};
use lettre::transport::smtp::{self, SmtpTransport};
use lettre::{Message, Transport};
use log::{debug, info};

use crate::config::SmtpConfig;
use crate::error::{ReportError, Result};
use crate::model::Delivery;

/// Sends a rendered report to its recipient.
pub trait Mailer {
    /// Transmits `delivery` once. Implementations do not retry.
    fn deliver(&self, delivery: &Delivery) -> Result<()>;
}

/// Delivers reports through an SMTP relay using implicit TLS.
#[derive(Clone, Debug)]
pub struct SmtpMailer {
    config: SmtpConfig,
}

impl SmtpMailer {
    pub fn new(config: SmtpConfig) -> Self {
        Self { config }
    }

    /// Address used in the `From` header.
    pub fn sender(&self) -> &str {
        self.config.sender.as_deref().unwrap_or(&self.config.username)
    }

    /// Builds the message for `delivery` with the report attached.
    pub fn build_message(&self, delivery: &Delivery) -> Result<Message> {
        let recipient = delivery.recipient.as_str();
        let from: Mailbox = self
            .sender()
            .parse()
            .map_err(|err| ReportError::delivery(recipient, err))?;
        let to: Mailbox = recipient
            .parse()
            .map_err(|err| ReportError::delivery(recipient, err))?;

        let path = &delivery.attachment_path;
        let bytes = fs::read(path).map_err(|err| ReportError::delivery(recipient, err))?;
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "report".to_owned());
        let mime = mime_guess::from_path(path).first_or_octet_stream();
        let content_type = ContentType::parse(mime.essence_str())
            .map_err(|err| ReportError::delivery(recipient, err))?;

        Message::builder()
            .from(from)
            .to(to)
            .subject(delivery.subject.as_str())
            .multipart(
                MultiPart::mixed()
                    .singlepart(SinglePart::plain(delivery.body.clone()))
                    .singlepart(Attachment::new(file_name).body(bytes, content_type)),
            )
            .map_err(|err| ReportError::delivery(recipient, err))
    }

    fn transport(&self) -> std::result::Result<SmtpTransport, smtp::Error> {
        let credentials = Credentials::new(
            self.config.username.clone(),
            self.config.password.clone(),
        );
        Ok(SmtpTransport::relay(&self.config.host)?
            .port(self.config.port)
            .credentials(credentials)
            .timeout(Some(Duration::from_secs(self.config.timeout_secs)))
            .build())
    }

    fn classify(&self, recipient: &str, err: smtp::Error) -> ReportError {
        if is_auth_rejection(err.status()) {
            ReportError::Authentication {
                username: self.config.username.clone(),
                source: err,
            }
        } else {
            ReportError::delivery(recipient, err)
        }
    }
}

/// True for the 530, 534 and 535 replies a relay uses to refuse credentials.
/// Errors without a reply code (connect, TLS, timeout) are not rejections.
fn is_auth_rejection(status: Option<Code>) -> bool {
    matches!(
        status,
        Some(Code {
            severity: Severity::PermanentNegativeCompletion,
            category: Category::Unspecified3,
            detail: Detail::Zero | Detail::Four | Detail::Five,
        })
    )
}

impl Mailer for SmtpMailer {
    fn deliver(&self, delivery: &Delivery) -> Result<()> {
        let recipient = delivery.recipient.as_str();
        let message = self.build_message(delivery)?;

        debug!(
            "Connecting to {}:{} as {}",
            self.config.host, self.config.port, self.config.username
        );
        let transport = self
            .transport()
            .map_err(|err| self.classify(recipient, err))?;
        transport
            .send(&message)
            .map_err(|err| self.classify(recipient, err))?;

        info!(
            "Emailed {} to {}",
            delivery.attachment_path.display(),
            recipient
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> SmtpConfig {
        SmtpConfig {
            username: "reports@example.com".to_owned(),
            password: "app-password".to_owned(),
            ..SmtpConfig::default()
        }
    }

    fn delivery(dir: &tempfile::TempDir) -> Delivery {
        let attachment_path = dir.path().join("daily_report_2024-03-05.pdf");
        fs::write(&attachment_path, b"%PDF-1.3 test").unwrap();
        Delivery {
            recipient: "owner@example.com".to_owned(),
            subject: "Daily Sales Report".to_owned(),
            body: "Here is the daily sales report.".to_owned(),
            attachment_path,
        }
    }

    #[test]
    fn sender_defaults_to_username() {
        let mailer = SmtpMailer::new(config());
        assert_eq!(mailer.sender(), "reports@example.com");

        let mailer = SmtpMailer::new(SmtpConfig {
            sender: Some("Reports <noreply@example.com>".to_owned()),
            ..config()
        });
        assert_eq!(mailer.sender(), "Reports <noreply@example.com>");
    }

    #[test]
    fn message_carries_typed_attachment() {
        let dir = tempfile::tempdir().unwrap();
        let message = SmtpMailer::new(config())
            .build_message(&delivery(&dir))
            .unwrap();

        let formatted = String::from_utf8(message.formatted()).unwrap();
        assert!(formatted.contains("Subject: Daily Sales Report"));
        assert!(formatted.contains("To: owner@example.com"));
        assert!(formatted.contains("Content-Type: application/pdf"));
        assert!(formatted.contains("filename=\"daily_report_2024-03-05.pdf\""));
        assert!(formatted.contains("Here is the daily sales report."));
    }

    fn reply(severity: Severity, category: Category, detail: Detail) -> Option<Code> {
        Some(Code::new(severity, category, detail))
    }

    #[test]
    fn credential_replies_are_auth_rejections() {
        use Severity::PermanentNegativeCompletion as Permanent;

        // 535, 530, 534
        assert!(is_auth_rejection(reply(Permanent, Category::Unspecified3, Detail::Five)));
        assert!(is_auth_rejection(reply(Permanent, Category::Unspecified3, Detail::Zero)));
        assert!(is_auth_rejection(reply(Permanent, Category::Unspecified3, Detail::Four)));
    }

    #[test]
    fn other_failures_are_not_auth_rejections() {
        // 550 mailbox unavailable
        assert!(!is_auth_rejection(reply(
            Severity::PermanentNegativeCompletion,
            Category::MailSystem,
            Detail::Zero
        )));
        // 454 temporary auth failure
        assert!(!is_auth_rejection(reply(
            Severity::TransientNegativeCompletion,
            Category::MailSystem,
            Detail::Four
        )));
        // no reply at all (connect or TLS failure)
        assert!(!is_auth_rejection(None));
    }

    #[test]
    fn invalid_recipient_is_a_delivery_error() {
        let dir = tempfile::tempdir().unwrap();
        let mut delivery = delivery(&dir);
        delivery.recipient = "not an address".to_owned();

        let err = SmtpMailer::new(config()).build_message(&delivery).unwrap_err();
        assert!(matches!(err, ReportError::Delivery { .. }), "{err:?}");
    }

    #[test]
    fn missing_attachment_is_a_delivery_error() {
        let dir = tempfile::tempdir().unwrap();
        let mut delivery = delivery(&dir);
        delivery.attachment_path = dir.path().join("missing.pdf");

        let err = SmtpMailer::new(config()).build_message(&delivery).unwrap_err();
        assert!(matches!(err, ReportError::Delivery { .. }), "{err:?}");
    }
}
