//! Weekly review workflow: Sunday-evening email recap.

use crate::sync::{push_memory, sync_memory};
use crate::{WorkflowContext, WorkflowError};
use chrono::Local;
use eva_actions::CalendarEvent;
use eva_memory::ContextEntry;
use tracing::info;

/// Render the weekly review body from the context log and next week's
/// calendar.
pub fn build_review(context: &str, next_week_events: &[CalendarEvent]) -> String {
    let mut lines = vec![
        "📊 **Weekly Review**".to_string(),
        format!("Week ending {}", Local::now().format("%B %d, %Y")),
        String::new(),
        "**This Week's Activity:**".to_string(),
    ];

    // Rough counts over the raw log text
    let entry_count = context.matches("## 202").count();
    lines.push(format!("  • {entry_count} context entries logged"));

    let commitments = context.matches("Commitment").count();
    let followups = context.matches("Follow-up").count();
    if commitments > 0 || followups > 0 {
        lines.push(format!(
            "  • {commitments} commitments, {followups} follow-ups tracked"
        ));
    }

    lines.push(String::new());
    lines.push("**Next Week Preview:**".into());

    if next_week_events.is_empty() {
        lines.push("  • Calendar is clear".into());
    } else {
        lines.push(format!("  • {} events scheduled", next_week_events.len()));
        lines.push("  • Check calendar for details".into());
    }

    lines.push(String::new());
    lines.push("Take time to reflect. What went well? What could improve?".into());
    lines.push(String::new());
    lines.push("— Eva".into());

    lines.join("\n")
}

/// Run the weekly review end to end.
pub async fn run_weekly_review(ctx: &WorkflowContext) -> Result<(), WorkflowError> {
    let user_email = ctx
        .user
        .email
        .as_deref()
        .ok_or_else(|| WorkflowError::MissingTarget("user email".into()))?;

    sync_memory(&ctx.repo_dir).await?;

    let context = ctx.store.load_document("context").await?;
    let next_week_events = ctx.actions.fetch_calendar_events(168).await?;

    let body = build_review(&context, &next_week_events);
    let week_ending = Local::now().format("%B %d, %Y");
    ctx.actions
        .send_email(
            user_email,
            &format!("📊 Eva Weekly Review - {week_ending}"),
            &body,
        )
        .await?;

    ctx.store
        .append_context_entry(&ContextEntry {
            category: "WeeklyReview".into(),
            summary: "Sent weekly review digest".into(),
            details: format!("Review sent at {}", Local::now().format("%H:%M")),
            followup: None,
        })
        .await?;

    push_memory(&ctx.repo_dir, "eva: weekly review sent").await?;

    info!(events = next_week_events.len(), "Weekly review sent");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use eva_actions::EventTime;

    #[test]
    fn counts_context_entries() {
        let context = "\
## 2026-08-20\n### a\n**Summary:** one\n\
## 2026-08-22\n**Follow-up:** call back\nCommitment noted\n";
        let review = build_review(context, &[]);
        assert!(review.contains("2 context entries logged"));
        assert!(review.contains("1 commitments, 1 follow-ups tracked"));
        assert!(review.contains("Calendar is clear"));
    }

    #[test]
    fn quiet_week_omits_commitment_line() {
        let review = build_review("", &[]);
        assert!(review.contains("0 context entries logged"));
        assert!(!review.contains("commitments,"));
    }

    #[test]
    fn next_week_preview_counts_events() {
        let events = vec![CalendarEvent {
            id: "e".into(),
            summary: "Board meeting".into(),
            start: EventTime { date_time: None },
            end: EventTime { date_time: None },
        }];
        let review = build_review("", &events);
        assert!(review.contains("1 events scheduled"));
    }
}
