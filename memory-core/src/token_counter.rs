//! Deterministic token estimation (C14).
//!
//! Not a real tokenizer: a fast, reproducible character-based estimate
//! good enough for budget allocation. No external dependency, no model
//! vocabulary to keep in sync.

/// Characters-per-token ratio used by [`estimate_tokens`]. Matches common
/// english-text tokenizer output closely enough for budgeting purposes.
pub const CHARS_PER_TOKEN: usize = 4;

/// Estimate the token count of `text`. Empty input is zero tokens;
/// anything else rounds up so a `1`-char string costs `1` token rather
/// than `0`.
#[must_use]
pub fn estimate_tokens(text: &str) -> usize {
    let chars = text.chars().count();
    if chars == 0 {
        return 0;
    }
    chars.div_ceil(CHARS_PER_TOKEN)
}

/// Estimate the total token count across several pieces of text.
#[must_use]
pub fn estimate_tokens_many<'a>(pieces: impl IntoIterator<Item = &'a str>) -> usize {
    pieces.into_iter().map(estimate_tokens).sum()
}
