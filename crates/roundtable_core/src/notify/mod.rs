//! Outbound candidate notifications.
//!
//! # Responsibility
//! - Define the delivery seam used after a slot is claimed.
//! - Render the interview invite.
//!
//! # Invariants
//! - Delivery is fire-and-forget: callers log failures and carry on.
//! - `LogNotifier` records metadata only, never message bodies.

use log::info;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub const INVITE_SUBJECT: &str = "IEEE-VIT Interview";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotifyError {
    pub recipient: String,
    pub reason: String,
}

impl NotifyError {
    pub fn new(recipient: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            recipient: recipient.into(),
            reason: reason.into(),
        }
    }
}

impl Display for NotifyError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "delivery failed: {}", self.reason)
    }
}

impl Error for NotifyError {}

/// Delivery backend for candidate emails.
pub trait Notifier {
    fn send(&self, to: &str, subject: &str, html_body: &str) -> Result<(), NotifyError>;
}

impl<N: Notifier + ?Sized> Notifier for &N {
    fn send(&self, to: &str, subject: &str, html_body: &str) -> Result<(), NotifyError> {
        (**self).send(to, subject, html_body)
    }
}

/// Default notifier: writes one log line per message and always succeeds.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn send(&self, _to: &str, subject: &str, html_body: &str) -> Result<(), NotifyError> {
        info!(
            "event=notify_send module=notify status=ok subject_len={} body_len={}",
            subject.len(),
            html_body.len()
        );
        Ok(())
    }
}

/// Rendered message ready for a [`Notifier`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub subject: &'static str,
    pub html_body: String,
}

/// Invite sent to a candidate once their slot has a reviewer.
pub fn interview_invite(candidate_name: &str, meet_link: &str) -> Message {
    let html_body = format!(
        "<div>Dear {},<br><br>\n\
         Kindly join the below meet for your scheduled interview<br><br>\n\
         {}<br><br>\n\
         Good luck\n\
         <br><br>\n\
         Regards,<br>\n\
         IEEE-VIT</div>",
        escape_html(candidate_name),
        escape_html(meet_link)
    );
    Message {
        subject: INVITE_SUBJECT,
        html_body,
    }
}

fn escape_html(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            other => escaped.push(other),
        }
    }
    escaped
}
