//! Query clean-up applied before classification and retrieval: whitespace
//! normalisation, key-term extraction from common question shapes, short
//! acronym expansion and length caps.

use ragline_core::tokens::truncate_to_tokens;

const MAX_QUERY_CHARS: usize = 1000;
const MAX_QUERY_TOKENS: usize = 500;

/// (prefix, suffix) question shapes whose inner term is the real query.
const QUESTION_PATTERNS: &[(&str, &str)] = &[
    ("what is ", ""),
    ("what are ", ""),
    ("what does ", " mean"),
    ("what do you mean by ", ""),
    ("can you explain ", ""),
    ("how does ", " work"),
    ("define ", ""),
    ("tell me about ", ""),
];

pub fn optimize_query(query: &str) -> String {
    let collapsed = query.split_whitespace().collect::<Vec<_>>().join(" ");
    if collapsed.is_empty() {
        return "search".to_string();
    }

    let without_terminal = collapsed.trim_end_matches(['?', '.', '!']).trim_end();

    let mut cleaned = match extract_key_term(without_terminal) {
        Some(term) => term,
        // Strip punctuation only when no question shape matched; extracted
        // terms keep theirs.
        None => without_terminal
            .chars()
            .filter(|c| !matches!(c, '?' | '.' | ',' | '!' | ';' | ':'))
            .collect::<String>()
            .trim()
            .to_string(),
    };
    if cleaned.is_empty() {
        return "search".to_string();
    }

    cleaned = expand_acronym(&cleaned);

    if cleaned.len() > MAX_QUERY_CHARS {
        let mut cut = String::new();
        for c in cleaned.chars() {
            if cut.len() + c.len_utf8() > MAX_QUERY_CHARS {
                break;
            }
            cut.push(c);
        }
        cleaned = format!("{}...", cut.trim_end());
    }

    truncate_to_tokens(&cleaned, MAX_QUERY_TOKENS)
}

fn extract_key_term(query: &str) -> Option<String> {
    for (prefix, suffix) in QUESTION_PATTERNS {
        if query.len() <= prefix.len() + suffix.len() {
            continue;
        }
        if !query.is_char_boundary(prefix.len()) {
            continue;
        }
        let (head, rest) = query.split_at(prefix.len());
        if !head.eq_ignore_ascii_case(prefix) {
            continue;
        }
        let term = if suffix.is_empty() {
            rest
        } else {
            if rest.len() <= suffix.len() || !rest.is_char_boundary(rest.len() - suffix.len()) {
                continue;
            }
            let (middle, tail) = rest.split_at(rest.len() - suffix.len());
            if !tail.eq_ignore_ascii_case(suffix) {
                continue;
            }
            middle
        };
        let term = term.trim();
        if !term.is_empty() {
            tracing::debug!("extracted key term '{}' from '{}'", term, query);
            return Some(term.to_string());
        }
    }
    None
}

fn expand_acronym(query: &str) -> String {
    if query.len() > 3 {
        return query.to_string();
    }
    match query.to_uppercase().as_str() {
        "AI" => "Artificial Intelligence".to_string(),
        "ML" => "Machine Learning".to_string(),
        "NLP" => "Natural Language Processing".to_string(),
        _ => query.to_string(),
    }
}
