//! System prompt assembly from the memory documents.
//!
//! The prompt is rebuilt from scratch on every invocation; nothing is
//! cached between runs, so edits to the memory files take effect on the
//! next message.

use eva_memory::MemoryDocuments;

const PREAMBLE: &str = "You are Eva, Louis's private optimization engine.";

/// Section headings, paired with the document that fills each one.
/// Order is fixed: identity, user, purpose, recent context, architecture.
const SECTIONS: [(&str, &str); 5] = [
    ("## Your Identity", "soul"),
    ("## Your User", "user"),
    ("## Your Purpose", "telos"),
    ("## Recent Context", "context"),
    ("## Your Architecture (Self-Awareness)", "harness"),
];

/// Assemble the system prompt from the five memory documents.
///
/// Document contents are included verbatim, never summarized or truncated.
pub fn build_system_prompt(docs: &MemoryDocuments) -> String {
    let mut prompt = String::from(PREAMBLE);

    for (heading, doc_name) in SECTIONS {
        let body = docs.get(doc_name).map(String::as_str).unwrap_or_default();
        prompt.push_str("\n\n");
        prompt.push_str(heading);
        prompt.push_str("\n\n");
        prompt.push_str(body);
    }

    prompt
}
