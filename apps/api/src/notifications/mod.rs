// Status notification emails: template rendering plus the admin-triggered send endpoints.

pub mod handlers;
pub mod templates;

use crate::email_client::{EmailError, EmailSender, OutgoingEmail};
use templates::{render, Brand, EmailStatus};

/// Who a status email goes to and what it is about.
#[derive(Debug, Clone)]
pub struct Recipient<'a> {
    pub email: &'a str,
    pub name: &'a str,
    pub position: &'a str,
}

pub fn compose(brand: &Brand, recipient: &Recipient<'_>, status: &EmailStatus) -> OutgoingEmail {
    let rendered = render(brand, recipient.name, recipient.position, status);
    OutgoingEmail {
        to_email: recipient.email.to_string(),
        to_name: recipient.name.to_string(),
        subject: rendered.subject,
        html: rendered.html,
    }
}

pub async fn send_status_email(
    mailer: &dyn EmailSender,
    brand: &Brand,
    recipient: &Recipient<'_>,
    status: &EmailStatus,
) -> Result<(), EmailError> {
    mailer.send(&compose(brand, recipient, status)).await
}
