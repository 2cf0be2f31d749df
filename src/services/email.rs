use crate::{
    config::{Config, SmtpConfig},
    errors::AppError,
    models::{Booking, Payment},
};
use lettre::{
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
    message::{MultiPart, SinglePart, header::ContentType},
    transport::smtp::authentication::Credentials,
};
use rust_decimal::Decimal;
use std::{sync::Arc, time::Duration};
use tracing::{error, info};

const SMTP_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Clone)]
pub struct EmailService {
    config: Arc<Config>,
}

impl EmailService {
    pub fn new(config: Arc<Config>) -> Self {
        Self { config }
    }

    fn smtp(&self) -> Result<&SmtpConfig, AppError> {
        self.config.smtp.as_ref().ok_or_else(|| {
            AppError::ServiceUnavailable("Email service is not configured".to_string())
        })
    }

    fn build_transport(smtp: &SmtpConfig) -> Result<AsyncSmtpTransport<Tokio1Executor>, AppError> {
        let creds = Credentials::new(smtp.username.clone(), smtp.password.clone());

        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&smtp.host)
            .map_err(|e| AppError::Email(e.to_string()))?
            .credentials(creds)
            .port(smtp.port)
            .timeout(Some(SMTP_TIMEOUT))
            .build();

        Ok(transport)
    }

    async fn send(
        &self,
        to_email: &str,
        to_name: &str,
        subject: String,
        text_body: String,
        html_body: String,
    ) -> Result<(), AppError> {
        let smtp = self.smtp()?;

        let from_mailbox = format!("{} <{}>", smtp.from_name, smtp.from_address)
            .parse()
            .map_err(|e: lettre::address::AddressError| AppError::Email(e.to_string()))?;

        let to_mailbox = format!("{} <{}>", to_name, to_email)
            .parse()
            .map_err(|e: lettre::address::AddressError| AppError::Email(e.to_string()))?;

        let email = Message::builder()
            .from(from_mailbox)
            .to(to_mailbox)
            .subject(subject)
            .multipart(
                MultiPart::alternative()
                    .singlepart(
                        SinglePart::builder()
                            .header(ContentType::TEXT_PLAIN)
                            .body(text_body),
                    )
                    .singlepart(
                        SinglePart::builder()
                            .header(ContentType::TEXT_HTML)
                            .body(html_body),
                    ),
            )
            .map_err(|e| AppError::Email(e.to_string()))?;

        let transport = Self::build_transport(smtp)?;

        match transport.send(email).await {
            Ok(_) => {
                info!("Email sent to {}", to_email);
                Ok(())
            }
            Err(e) => {
                error!("Failed to send email to {}: {}", to_email, e);
                Err(AppError::Email(e.to_string()))
            }
        }
    }

    /// Password reset link, valid for ten minutes
    pub async fn send_password_reset(
        &self,
        to_email: &str,
        to_name: &str,
        reset_url: &str,
    ) -> Result<(), AppError> {
        let site = self.site_name();
        self.send(
            to_email,
            to_name,
            format!("{site} password reset"),
            build_reset_text(to_name, reset_url, site),
            build_reset_html(to_name, reset_url, site),
        )
        .await
    }

    pub async fn send_booking_confirmed(
        &self,
        to_email: &str,
        to_name: &str,
        booking: &Booking,
        payment: &Payment,
    ) -> Result<(), AppError> {
        let site = self.site_name();
        self.send(
            to_email,
            to_name,
            format!("Your {site} booking is confirmed"),
            build_confirmation_text(to_name, booking, payment, site),
            build_confirmation_html(to_name, booking, payment, site),
        )
        .await
    }

    fn site_name(&self) -> &str {
        self.config
            .smtp
            .as_ref()
            .map(|s| s.from_name.as_str())
            .unwrap_or("Fixly")
    }
}

fn format_amount(amount: Decimal) -> String {
    format!("₹{:.2}", amount)
}

const STYLE: &str = r#"
    body { font-family: Arial, sans-serif; background: #f4f4f4; color: #333; }
    .container { max-width: 600px; margin: 30px auto; background: #fff; border-radius: 8px; overflow: hidden; box-shadow: 0 2px 8px rgba(0,0,0,0.1); }
    .header { background: #0f766e; color: #fff; padding: 24px 32px; }
    .header h1 { margin: 0; font-size: 22px; }
    .body { padding: 24px 32px; }
    table { width: 100%; border-collapse: collapse; margin-bottom: 16px; }
    td { padding: 8px 4px; border-bottom: 1px solid #f1f1f1; }
    td:last-child { text-align: right; font-weight: 600; }
    .button { display: inline-block; background: #0f766e; color: #fff; padding: 10px 20px; border-radius: 6px; text-decoration: none; }
    .footer { background: #f9fafb; padding: 16px 32px; font-size: 12px; color: #6b7280; text-align: center; }
"#;

fn build_reset_html(name: &str, reset_url: &str, site: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head><meta charset="UTF-8" /><style>{STYLE}</style></head>
<body>
<div class="container">
  <div class="header"><h1>{site}</h1></div>
  <div class="body">
    <p>Hi <strong>{name}</strong>,</p>
    <p>We received a request to reset your password. The link below expires in 10 minutes.</p>
    <p><a class="button" href="{reset_url}">Reset password</a></p>
    <p style="font-size:13px; color:#6b7280;">If you did not ask for this, you can ignore this email.</p>
  </div>
  <div class="footer"><p>This is an automated message from {site}. Please do not reply.</p></div>
</div>
</body>
</html>"#
    )
}

fn build_reset_text(name: &str, reset_url: &str, site: &str) -> String {
    format!(
        "Hi {name},\n\n\
        We received a request to reset your {site} password.\n\
        Open this link within 10 minutes to choose a new one:\n\n\
        {reset_url}\n\n\
        If you did not ask for this, you can ignore this email."
    )
}

fn build_confirmation_html(name: &str, booking: &Booking, payment: &Payment, site: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head><meta charset="UTF-8" /><style>{STYLE}</style></head>
<body>
<div class="container">
  <div class="header"><h1>{site}</h1></div>
  <div class="body">
    <p>Hi <strong>{name}</strong>,</p>
    <p>Your payment was received and your booking is confirmed.</p>
    <table>
      <tr><td>Booking</td><td>{booking_id}</td></tr>
      <tr><td>Scheduled for</td><td>{scheduled}</td></tr>
      <tr><td>Amount paid</td><td>{amount}</td></tr>
      <tr><td>Payment method</td><td>{method}</td></tr>
    </table>
    <p style="font-size:13px; color:#6b7280;">Transaction reference: <code>{reference}</code></p>
  </div>
  <div class="footer"><p>This is an automated message from {site}. Please do not reply.</p></div>
</div>
</body>
</html>"#,
        booking_id = booking.id,
        scheduled = booking.service_date_time.format("%d %b %Y, %H:%M UTC"),
        amount = format_amount(payment.amount),
        method = payment.payment_method,
        reference = payment.transaction_id,
    )
}

fn build_confirmation_text(name: &str, booking: &Booking, payment: &Payment, site: &str) -> String {
    format!(
        "Hi {name},\n\n\
        Your payment was received and your {site} booking is confirmed.\n\n\
        Booking:         {booking_id}\n\
        Scheduled for:   {scheduled}\n\
        Amount paid:     {amount}\n\
        Payment method:  {method}\n\n\
        Transaction reference: {reference}",
        booking_id = booking.id,
        scheduled = booking.service_date_time.format("%d %b %Y, %H:%M UTC"),
        amount = format_amount(payment.amount),
        method = payment.payment_method,
        reference = payment.transaction_id,
    )
}
