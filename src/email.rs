//! Email notification side channel.
//!
//! Booking and property lifecycle events trigger templated HTML mails over
//! SMTP (STARTTLS). Sends are best-effort: every failure is logged and
//! swallowed so the triggering request never fails because of the mailer.
//! Without SMTP configuration the mailer is a no-op.

use lettre::{
    message::{header::ContentType, Mailbox},
    transport::smtp::authentication::Credentials,
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::models::{BookingStatus, Property};

#[derive(Error, Debug)]
pub enum MailError {
    #[error("invalid address: {0}")]
    Address(#[from] lettre::address::AddressError),

    #[error("message build error: {0}")]
    Message(#[from] lettre::error::Error),

    #[error("smtp error: {0}")]
    Smtp(#[from] lettre::transport::smtp::Error),
}

pub struct Mailer {
    transport: Option<AsyncSmtpTransport<Tokio1Executor>>,
    from_name: String,
    from_addr: String,
    app_url: String,
}

impl Mailer {
    pub fn from_config(config: &Config) -> Self {
        let transport = config.smtp.as_ref().and_then(|smtp| {
            match AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&smtp.host) {
                Ok(builder) => Some(
                    builder
                        .port(smtp.port)
                        .credentials(Credentials::new(smtp.user.clone(), smtp.pass.clone()))
                        .build(),
                ),
                Err(e) => {
                    warn!("SMTP relay setup failed, email notifications disabled: {e}");
                    None
                }
            }
        });
        Self {
            transport,
            from_name: config.email_from_name.clone(),
            from_addr: config.email_from.clone(),
            app_url: config.app_url.clone(),
        }
    }

    /// Mailer with no transport, for tests and SMTP-less deployments.
    pub fn disabled() -> Self {
        Self {
            transport: None,
            from_name: "House Rental System".to_string(),
            from_addr: "noreply@houserental.local".to_string(),
            app_url: "http://localhost:4200".to_string(),
        }
    }

    pub async fn notify_owner_booking_request(
        &self,
        owner_email: &str,
        owner_name: &str,
        tenant_name: &str,
        property: &Property,
    ) {
        let subject = "New Booking Request for Your Property";
        let html = booking_request_html(&self.app_url, owner_name, tenant_name, property);
        match self.send(owner_email, subject, &html).await {
            Ok(()) => info!("owner notification sent to {owner_email}"),
            Err(e) => warn!("owner notification to {owner_email} failed: {e}"),
        }
    }

    pub async fn notify_tenant_booking_status(
        &self,
        tenant_email: &str,
        tenant_name: &str,
        property: &Property,
        status: BookingStatus,
        owner_name: &str,
    ) {
        let subject = match status {
            BookingStatus::Approved => {
                format!("Your booking request has been approved — {}", property.title)
            }
            _ => format!("Booking request {status}: {}", property.title),
        };
        let html = booking_status_html(&self.app_url, tenant_name, property, status, owner_name);
        match self.send(tenant_email, &subject, &html).await {
            Ok(()) => info!("tenant status notification sent to {tenant_email}"),
            Err(e) => warn!("tenant status notification to {tenant_email} failed: {e}"),
        }
    }

    /// Broadcast a new listing to tenants, one message per recipient so
    /// addresses are not exposed to each other.
    pub async fn notify_tenants_new_property(
        &self,
        tenant_emails: &[String],
        property: &Property,
        owner_name: &str,
    ) {
        if tenant_emails.is_empty() {
            return;
        }
        let subject = "New Property Alert!";
        let html = new_property_html(owner_name, property);
        for email in tenant_emails {
            if let Err(e) = self.send(email, subject, &html).await {
                warn!("new-property notification to {email} failed: {e}");
            }
        }
    }

    async fn send(&self, to: &str, subject: &str, html: &str) -> Result<(), MailError> {
        let transport = match &self.transport {
            Some(t) => t,
            None => {
                debug!("mailer disabled, dropping \"{subject}\" to {to}");
                return Ok(());
            }
        };
        let from: Mailbox = format!("{} <{}>", self.from_name, self.from_addr).parse()?;
        let message = Message::builder()
            .from(from)
            .to(to.parse()?)
            .subject(subject)
            .header(ContentType::TEXT_HTML)
            .body(html.to_string())?;
        transport.send(message).await?;
        Ok(())
    }
}

fn booking_request_html(
    app_url: &str,
    owner_name: &str,
    tenant_name: &str,
    property: &Property,
) -> String {
    format!(
        r#"<div style="font-family: Arial, sans-serif; max-width: 600px; margin: 0 auto;">
  <h2>New Booking Request</h2>
  <p>Hello {owner_name},</p>
  <p><strong>{tenant_name}</strong> has submitted a booking request for your property:</p>
  <div style="background-color: #f9f9f9; padding: 12px; border-radius: 6px; margin: 12px 0;">
    <h3 style="margin:0">{title}</h3>
    <p style="margin:4px 0"><strong>Location:</strong> {location}</p>
    <p style="margin:4px 0"><strong>Rent:</strong> ${rent}/month</p>
  </div>
  <p>Please open the application to review and respond to the request.</p>
  <p style="margin-top:12px"><a href="{app_url}/owner/bookings" style="background:#1e88e5;color:#fff;padding:8px 12px;border-radius:4px;text-decoration:none;">Open Dashboard</a></p>
  <p style="margin-top:12px">Best regards,<br>Online House Rental Team</p>
</div>"#,
        title = property.title,
        location = property.location,
        rent = property.rent,
    )
}

fn booking_status_html(
    app_url: &str,
    tenant_name: &str,
    property: &Property,
    status: BookingStatus,
    owner_name: &str,
) -> String {
    let approved = status == BookingStatus::Approved;
    let heading = if approved {
        "Request Approved".to_string()
    } else {
        format!("Request {status}")
    };
    let color = if approved { "#2E7D32" } else { "#C62828" };
    let detail = if approved {
        r#"<div style="background-color: #e8f5e9; padding: 12px; border-radius: 6px; margin: 12px 0;">
    <p><strong>Great news!</strong> Please open the application to view the owner's contact details and next steps.</p>
  </div>"#
    } else {
        "<p>For more information, please open the application to view details and other available properties.</p>"
    };
    format!(
        r#"<div style="font-family: Arial, sans-serif; max-width: 600px; margin: 0 auto;">
  <h2 style="color: {color};">{heading}</h2>
  <p>Hello {tenant_name},</p>
  <p><strong>{owner_name}</strong> has {status_lower} your booking request for <strong>{title}</strong> ({location}).</p>
  {detail}
  <p style="margin-top:12px"><a href="{app_url}/bookings" style="background:#1e88e5;color:#fff;padding:8px 12px;border-radius:4px;text-decoration:none;">Open My Bookings</a></p>
  <p style="margin-top:12px">Best regards,<br>Online House Rental Team</p>
</div>"#,
        status_lower = status.to_string().to_lowercase(),
        title = property.title,
        location = property.location,
    )
}

fn new_property_html(owner_name: &str, property: &Property) -> String {
    format!(
        r#"<div style="font-family: Arial, sans-serif; max-width: 600px; margin: 0 auto;">
  <h2>New Property Listed!</h2>
  <p>Hello,</p>
  <p><strong>{owner_name}</strong> has uploaded a new property on our website.</p>
  <div style="background-color: #f9f9f9; padding: 15px; border-radius: 5px; margin: 15px 0;">
    <h3 style="margin-top: 0;">{title}</h3>
    <p><strong>Location:</strong> {location}</p>
    <p><strong>Rent:</strong> ${rent}/month</p>
    <p>{description}</p>
  </div>
  <p>Please check it out if you are interested.</p>
  <p>Best regards,<br>Online House Rental Team</p>
</div>"#,
        title = property.title,
        location = property.location,
        rent = property.rent,
        description = property.description.as_deref().unwrap_or(""),
    )
}
