//! Morning brief workflow: daily WhatsApp summary.

use crate::sync::{push_memory, sync_memory};
use crate::{WorkflowContext, WorkflowError};
use chrono::{DateTime, Local};
use eva_actions::{CalendarEvent, EmailSummary};
use eva_memory::ContextEntry;
use tracing::info;

fn truncate(s: &str, max_chars: usize) -> String {
    s.chars().take(max_chars).collect()
}

/// Render the morning brief from the day's inputs.
pub fn generate_brief(emails: &[EmailSummary], events: &[CalendarEvent], context: &str) -> String {
    let today = Local::now().format("%A, %B %d");

    let mut lines = vec![
        "☀️ Good morning, Louis!".to_string(),
        format!("📅 {today}"),
        String::new(),
    ];

    if events.is_empty() {
        lines.push("**Today's Schedule:** Clear day! 🎉".into());
    } else {
        lines.push(format!("**Today's Schedule** ({} events):", events.len()));
        for event in events.iter().take(5) {
            // Keep the event's own offset: a 09:30+02:00 meeting is 09:30
            let time_fmt = event
                .start
                .date_time
                .as_deref()
                .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
                .map(|t| t.format("%H:%M").to_string())
                .unwrap_or_else(|| "All day".into());
            let summary = if event.summary.is_empty() {
                "No title"
            } else {
                &event.summary
            };
            lines.push(format!("  • {time_fmt} - {}", truncate(summary, 40)));
        }
    }

    lines.push(String::new());

    if emails.is_empty() {
        lines.push("**Inbox:** All caught up! ✅".into());
    } else {
        lines.push(format!("**Inbox** ({} unread):", emails.len()));
        for email in emails.iter().take(5) {
            let sender = if email.from.is_empty() {
                "Unknown"
            } else {
                &email.from
            };
            let subject = if email.subject.is_empty() {
                "No subject"
            } else {
                &email.subject
            };
            lines.push(format!(
                "  • {}: {}",
                truncate(sender, 20),
                truncate(subject, 35)
            ));
        }
    }

    lines.push(String::new());

    if context.contains("Commitment") || context.contains("Follow-up") {
        lines.push("**Open Items:** Check context.md for pending follow-ups".into());
    } else {
        lines.push("**Open Items:** None tracked".into());
    }

    lines.push(String::new());
    lines.push("— Eva".into());

    lines.join("\n")
}

/// Run the morning brief end to end.
pub async fn run_morning_brief(ctx: &WorkflowContext) -> Result<(), WorkflowError> {
    let phone_number = ctx
        .user
        .whatsapp
        .as_deref()
        .ok_or_else(|| WorkflowError::MissingTarget("user WhatsApp number".into()))?;

    sync_memory(&ctx.repo_dir).await?;

    let emails = ctx.actions.fetch_emails(20, "is:unread").await?;
    let events = ctx.actions.fetch_calendar_events(16).await?;
    let context = ctx.store.load_document("context").await?;

    let brief = generate_brief(&emails, &events, &context);
    ctx.actions.send_whatsapp(phone_number, &brief).await?;

    ctx.store
        .append_context_entry(&ContextEntry {
            category: "MorningBrief".into(),
            summary: format!(
                "Sent daily brief: {} events, {} emails",
                events.len(),
                emails.len()
            ),
            details: format!("Brief sent at {}", Local::now().format("%H:%M")),
            followup: None,
        })
        .await?;

    push_memory(&ctx.repo_dir, "eva: morning brief sent").await?;

    info!(
        events = events.len(),
        emails = emails.len(),
        "Morning brief sent"
    );
    Ok(())
}
