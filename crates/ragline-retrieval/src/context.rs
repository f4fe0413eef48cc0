//! Token-budgeted context assembly.

use ragline_core::tokens::{estimate_tokens, truncate_to_tokens};
use ragline_core::types::SearchResult;

pub const NO_CONTEXT: &str = "No relevant context found.";

/// Reserved for the header line so the assembled string stays inside the
/// caller's budget.
const HEADER_RESERVE: usize = 16;
/// Safety margin when truncating the final entry.
const TRUNCATION_BUFFER: usize = 50;
/// Entries are only truncated in when a meaningful amount of text still fits.
const MIN_REMAINING: usize = 100;

/// Emit `**title**\ncontent` blocks until the token budget is reached. An
/// entry that would overflow is truncated to the remaining budget and
/// assembly stops; nothing past the budget boundary is ever emitted.
pub fn build_context(results: &[SearchResult], max_tokens: usize) -> String {
    if results.is_empty() {
        return NO_CONTEXT.to_string();
    }

    let budget = max_tokens.saturating_sub(HEADER_RESERVE);
    let mut parts: Vec<String> = Vec::new();
    let mut total = 0usize;

    for result in results {
        let entry = format!("**{}**\n{}\n", result.title, result.content);
        let entry_tokens = estimate_tokens(&entry);
        if total + entry_tokens > budget {
            let remaining = budget.saturating_sub(total).saturating_sub(TRUNCATION_BUFFER);
            if remaining > MIN_REMAINING {
                let truncated = truncate_to_tokens(&result.content, remaining);
                parts.push(format!("**{}**\n{}\n", result.title, truncated));
            }
            break;
        }
        parts.push(entry);
        total += entry_tokens;
    }

    if parts.is_empty() {
        return NO_CONTEXT.to_string();
    }

    format!(
        "**Relevant Information** (from {} sources):\n\n{}",
        parts.len(),
        parts.join("\n")
    )
}
