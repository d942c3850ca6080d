//! Heartbeat workflow: scan for urgent items and alert by email.
//!
//! Intended to run every 30 minutes from a scheduler. It stays silent when
//! nothing qualifies.

use crate::sync::{push_memory, sync_memory};
use crate::{WorkflowContext, WorkflowError};
use chrono::{DateTime, Duration, Utc};
use eva_actions::{CalendarEvent, EmailSummary};
use eva_memory::ContextEntry;
use tracing::info;

/// Subject keywords that mark an email as urgent.
pub const URGENT_KEYWORDS: [&str; 6] = [
    "urgent",
    "asap",
    "emergency",
    "critical",
    "action required",
    "immediately",
];

/// Senders that always warrant an alert.
pub const VIP_SENDERS: [&str; 2] = ["louis", "lewkai"];

/// Filter emails down to urgent ones (keyword in subject or VIP sender).
pub fn check_urgent_emails(emails: &[EmailSummary]) -> Vec<&EmailSummary> {
    emails
        .iter()
        .filter(|email| {
            let subject = email.subject.to_lowercase();
            let sender = email.from.to_lowercase();
            let is_urgent = URGENT_KEYWORDS.iter().any(|kw| subject.contains(kw));
            let is_vip = VIP_SENDERS.iter().any(|vip| sender.contains(vip));
            is_urgent || is_vip
        })
        .collect()
}

/// Filter events to those starting within the next `hours` hours.
/// All-day events (no start time) are skipped.
pub fn check_upcoming_meetings(events: &[CalendarEvent], hours: i64) -> Vec<&CalendarEvent> {
    let now = Utc::now();
    let cutoff = now + Duration::hours(hours);

    events
        .iter()
        .filter(|event| {
            let Some(start_str) = event.start.date_time.as_deref() else {
                return false;
            };
            let Ok(start) = DateTime::parse_from_rfc3339(start_str) else {
                return false;
            };
            let start = start.with_timezone(&Utc);
            now <= start && start <= cutoff
        })
        .collect()
}

fn truncate(s: &str, max_chars: usize) -> String {
    s.chars().take(max_chars).collect()
}

/// Render the alert body, or None when nothing is urgent.
pub fn build_alert(urgent: &[&EmailSummary], upcoming: &[&CalendarEvent]) -> Option<String> {
    let mut lines = Vec::new();

    if !urgent.is_empty() {
        lines.push(format!("📧 {} urgent email(s):", urgent.len()));
        for email in urgent.iter().take(3) {
            let subject = if email.subject.is_empty() {
                "No subject"
            } else {
                &email.subject
            };
            lines.push(format!("  • {}", truncate(subject, 50)));
        }
    }

    if !upcoming.is_empty() {
        lines.push(format!(
            "📅 {} meeting(s) in next 2 hours:",
            upcoming.len()
        ));
        for event in upcoming.iter().take(3) {
            let summary = if event.summary.is_empty() {
                "No title"
            } else {
                &event.summary
            };
            lines.push(format!("  • {}", truncate(summary, 50)));
        }
    }

    if lines.is_empty() {
        None
    } else {
        Some(lines.join("\n"))
    }
}

/// Run the heartbeat check end to end.
pub async fn run_heartbeat(ctx: &WorkflowContext) -> Result<(), WorkflowError> {
    let user_email = ctx
        .user
        .email
        .as_deref()
        .ok_or_else(|| WorkflowError::MissingTarget("user email".into()))?;

    sync_memory(&ctx.repo_dir).await?;

    let emails = ctx.actions.fetch_emails(20, "is:unread").await?;
    let events = ctx.actions.fetch_calendar_events(2).await?;

    let urgent = check_urgent_emails(&emails);
    let upcoming = check_upcoming_meetings(&events, 2);

    let Some(body) = build_alert(&urgent, &upcoming) else {
        info!("Heartbeat: nothing urgent");
        return Ok(());
    };

    ctx.actions
        .send_email(user_email, "⚡ Eva Heartbeat Alert", &body)
        .await?;

    ctx.store
        .append_context_entry(&ContextEntry {
            category: "Heartbeat".into(),
            summary: format!(
                "Sent alert: {} emails, {} meetings",
                urgent.len(),
                upcoming.len()
            ),
            details: body,
            followup: None,
        })
        .await?;

    push_memory(&ctx.repo_dir, "eva: heartbeat alert sent").await?;

    info!(
        urgent = urgent.len(),
        meetings = upcoming.len(),
        "Heartbeat alert sent"
    );
    Ok(())
}
