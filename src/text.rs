//! Text rules shared by every label family: price tiers, hour-word agreement, sentence case and
//! output file naming.

use std::collections::HashMap;
use std::fmt;

/// Currency sign appended to prices, without a separating space.
pub const CURRENCY_SIGN: char = '₽';

/// Longest output base name, in characters.
pub const MAX_FILENAME_CHARS: usize = 80;

/// Base name used when a record name normalizes to nothing.
pub const FALLBACK_FILENAME: &str = "item";

/// Quality category derived from a price.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PriceTier {
    /// Up to 20.
    A,
    /// 21 to 35.
    APlus,
    /// 36 to 55.
    APlusPlus,
    /// Above 55.
    Premium,
}

impl PriceTier {
    /// Tier for `price`.  Upper bounds are inclusive.
    pub fn from_price(price: u32) -> Self {
        match price {
            0..=20 => Self::A,
            21..=35 => Self::APlus,
            36..=55 => Self::APlusPlus,
            _ => Self::Premium,
        }
    }

    /// Printed label of the tier.
    pub fn label(self) -> &'static str {
        match self {
            Self::A => "A",
            Self::APlus => "A+",
            Self::APlusPlus => "A++",
            Self::Premium => "ПРЕМИУМ",
        }
    }
}

impl fmt::Display for PriceTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Grammatical number a count takes in Russian.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NumeralForm {
    /// 1, 21, 101 ...
    Singular,
    /// 2-4, 22-24 ...
    Paucal,
    /// 0, 5-20, 25-30 ...
    Plural,
}

impl NumeralForm {
    /// Form agreeing with `n`.
    pub fn of(n: u64) -> Self {
        let hundreds = n % 100;
        let tens = n % 10;
        if (11..=14).contains(&hundreds) {
            Self::Plural
        } else if tens == 1 {
            Self::Singular
        } else if (2..=4).contains(&tens) {
            Self::Paucal
        } else {
            Self::Plural
        }
    }
}

/// The word "hour" agreeing with `hours`.
pub fn hours_word(hours: u32) -> &'static str {
    match NumeralForm::of(u64::from(hours)) {
        NumeralForm::Singular => "час",
        NumeralForm::Paucal => "часа",
        NumeralForm::Plural => "часов",
    }
}

/// Shelf-life phrase such as `"24 часа"`.
pub fn hours_phrase(hours: u32) -> String {
    format!("{hours} {}", hours_word(hours))
}

/// Price with the currency sign, e.g. `"350₽"`.
pub fn format_price(price: u32) -> String {
    format!("{price}{CURRENCY_SIGN}")
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn is_terminator(c: char) -> bool {
    matches!(c, '.' | '!' | '?')
}

fn capitalize_first_letter(chunk: &str) -> String {
    let mut out = String::with_capacity(chunk.len());
    let mut done = false;
    for c in chunk.chars() {
        if !done && c.is_alphabetic() {
            out.extend(c.to_uppercase());
            done = true;
        } else {
            out.push(c);
        }
    }
    out
}

/// Capitalizes the first letter of every sentence.
///
/// Whitespace is collapsed, the text is split after each run of `.`, `!` or `?`, and the pieces
/// are rejoined with single spaces.  Whitespace left in front of a terminator is removed.  Letters
/// other than the first of each sentence keep their case.
pub fn sentence_case(text: &str) -> String {
    let collapsed = collapse_whitespace(text);
    let mut pieces: Vec<String> = Vec::new();
    let mut chunk = String::new();
    let mut chars = collapsed.chars().peekable();

    while let Some(c) = chars.next() {
        chunk.push(c);
        if is_terminator(c) && !chars.peek().copied().is_some_and(is_terminator) {
            pieces.push(std::mem::take(&mut chunk));
        }
    }
    pieces.push(chunk);

    let joined = pieces
        .iter()
        .map(|piece| capitalize_first_letter(piece.trim()))
        .filter(|piece| !piece.is_empty())
        .collect::<Vec<_>>()
        .join(" ");

    let mut out = String::with_capacity(joined.len());
    for c in joined.chars() {
        if is_terminator(c) {
            let trimmed = out.trim_end().len();
            out.truncate(trimmed);
        }
        out.push(c);
    }
    out
}

/// Output base name for a record.
///
/// Path separators, characters reserved on common filesystems and control whitespace become
/// spaces, whitespace is collapsed, and the result is capped at [`MAX_FILENAME_CHARS`].
pub fn safe_filename(name: &str) -> String {
    let replaced: String = name
        .chars()
        .map(|c| match c {
            '\\' | '/' | ':' | '*' | '?' | '"' | '<' | '>' | '|' | '\n' | '\r' | '\t' => ' ',
            other => other,
        })
        .collect();
    let collapsed = collapse_whitespace(&replaced);
    if collapsed.is_empty() {
        return FALLBACK_FILENAME.to_owned();
    }
    let capped: String = collapsed.chars().take(MAX_FILENAME_CHARS).collect();
    capped.trim_end().to_owned()
}

/// De-duplicates base names: the first occurrence is kept, the k-th repeat becomes `name_k`.
pub fn unique_names<S: AsRef<str>>(names: &[S]) -> Vec<String> {
    let mut seen: HashMap<&str, usize> = HashMap::new();
    names
        .iter()
        .map(|name| {
            let name = name.as_ref();
            let count = seen.entry(name).or_insert(0);
            *count += 1;
            if *count == 1 {
                name.to_owned()
            } else {
                format!("{name}_{count}")
            }
        })
        .collect()
}
