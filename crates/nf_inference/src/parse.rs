//! Interpretation of raw classifier output.
//!
//! Models wrap their answer in all sorts of ways: a fenced JSON block, a
//! bare JSON object, or just the word itself, sometimes quoted. Everything
//! that cannot be read as one of the three tones is an error, and callers
//! decide how to fall back.

use nf_core::{Error, Result, Sentiment};
use serde::Deserialize;

#[derive(Deserialize)]
struct SentimentAnswer {
    sentiment: String,
}

fn strip_fences(raw: &str) -> &str {
    let mut text = raw.trim();
    if let Some(rest) = text.strip_prefix("```") {
        // Drop a language tag such as `json` or `JSON` on the opening line.
        text = match rest.split_once('\n') {
            Some((tag, body)) if is_language_tag(tag) => body,
            _ => match rest.get(..4) {
                Some(tag) if tag.eq_ignore_ascii_case("json") => &rest[4..],
                _ => rest,
            },
        };
    }
    if let Some(rest) = text.trim_end().strip_suffix("```") {
        text = rest;
    }
    text.trim()
}

fn is_language_tag(line: &str) -> bool {
    let line = line.trim();
    line.chars().all(|c| c.is_ascii_alphanumeric()) && tone(line).is_none()
}

fn tone(word: &str) -> Option<Sentiment> {
    let word = word.trim().trim_matches(|c| c == '"' || c == '\'').trim_end_matches('.');
    match word.parse::<Sentiment>() {
        Ok(Sentiment::Unknown) | Err(_) => None,
        Ok(sentiment) => Some(sentiment),
    }
}

/// Read a sentiment out of whatever the model returned.
pub fn parse_sentiment_output(raw: &str) -> Result<Sentiment> {
    let text = strip_fences(raw);

    if let Ok(answer) = serde_json::from_str::<SentimentAnswer>(text) {
        return tone(&answer.sentiment)
            .ok_or_else(|| Error::Classification(format!("unexpected sentiment value: {:?}", answer.sentiment)));
    }

    tone(text).ok_or_else(|| Error::Classification(format!("unparseable classifier output: {raw:?}")))
}

/// Like [`parse_sentiment_output`], but settles on `Unknown` instead of failing.
pub fn parse_sentiment_or_unknown(raw: &str) -> Sentiment {
    parse_sentiment_output(raw).unwrap_or_else(|err| {
        tracing::debug!(error = %err, "falling back to unknown sentiment");
        Sentiment::Unknown
    })
}
