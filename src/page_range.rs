use crate::error::{PageError, Result};
use log::debug;
use std::collections::BTreeSet;
use std::num::IntErrorKind;

/// Separates the group-definitions of a split specification.
pub const GROUP_SEPARATOR: char = ';';

/// How the parser treats tokens it cannot use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ParseMode {
    /// Skip malformed tokens and out-of-range pages without complaint.
    #[default]
    Lenient,
    /// Reject malformed tokens and pages outside `1..=total`.
    Strict,
}

impl ParseMode {
    pub fn from_strict(strict: bool) -> Self {
        if strict {
            ParseMode::Strict
        } else {
            ParseMode::Lenient
        }
    }
}

/// A single token of a page specification, with 1-based page numbers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageToken {
    Single(u64),
    /// Inclusive range, always stored with `start <= end`.
    Range(u64, u64),
}

impl PageToken {
    /// Parse a token like "5", "3-7" or "7-3". Returns `None` for anything else.
    pub fn parse(s: &str) -> Option<Self> {
        match s.split_once('-') {
            Some((start, end)) => {
                let start = parse_page_number(start)?;
                let end = parse_page_number(end)?;
                Some(PageToken::Range(start.min(end), start.max(end)))
            }
            None => parse_page_number(s).map(PageToken::Single),
        }
    }

    fn bounds(self) -> (u64, u64) {
        match self {
            PageToken::Single(n) => (n, n),
            PageToken::Range(start, end) => (start, end),
        }
    }
}

/// Digits too large for `u64` saturate, so they still read as a page past
/// the end of any document rather than as a malformed token.
fn parse_page_number(s: &str) -> Option<u64> {
    match s.parse::<u64>() {
        Ok(n) => Some(n),
        Err(e) if *e.kind() == IntErrorKind::PosOverflow => Some(u64::MAX),
        Err(_) => None,
    }
}

/// Ascending, duplicate-free 0-based page indices of one source document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageSpec(Vec<u32>);

impl PageSpec {
    /// Every page of a `total_pages` document, in natural order.
    pub fn all(total_pages: u32) -> Self {
        PageSpec((0..total_pages).collect())
    }

    pub fn indices(&self) -> &[u32] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<BTreeSet<u32>> for PageSpec {
    fn from(set: BTreeSet<u32>) -> Self {
        PageSpec(set.into_iter().collect())
    }
}

/// One `;`-separated group of a split specification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputGroup {
    /// The trimmed group-definition text, e.g. "1-5".
    pub label: String,
    pub pages: PageSpec,
}

/// Parse a specification like "1, 3-5 8" leniently.
///
/// Tokens are separated by runs of commas and/or whitespace. Malformed tokens
/// and pages outside `1..=total_pages` are dropped. An empty specification
/// yields an empty [`PageSpec`].
pub fn parse(spec: &str, total_pages: u32) -> PageSpec {
    // Lenient resolution never fails.
    parse_with_mode(spec, total_pages, ParseMode::Lenient).unwrap_or_default()
}

/// Parse a specification with an explicit [`ParseMode`].
pub fn parse_with_mode(spec: &str, total_pages: u32, mode: ParseMode) -> Result<PageSpec> {
    let mut pages = BTreeSet::new();
    for token in tokens(spec) {
        resolve_token(token, total_pages, mode, &mut pages)?;
    }
    Ok(PageSpec::from(pages))
}

/// Split a specification on `;` and resolve every non-blank group-definition.
///
/// Groups that resolve to no pages are kept so callers can report them; see
/// [`parse_groups`] for the filtered form.
pub fn group_definitions(
    spec: &str,
    total_pages: u32,
    mode: ParseMode,
) -> Result<Vec<OutputGroup>> {
    spec.split(GROUP_SEPARATOR)
        .map(str::trim)
        .filter(|definition| !definition.is_empty())
        .map(|definition| {
            Ok(OutputGroup {
                label: definition.to_string(),
                pages: parse_with_mode(definition, total_pages, mode)?,
            })
        })
        .collect()
}

/// Parse a multi-group specification like "1-5; 6-10" leniently, dropping
/// groups that select no pages.
pub fn parse_groups(spec: &str, total_pages: u32) -> Vec<OutputGroup> {
    group_definitions(spec, total_pages, ParseMode::Lenient)
        .unwrap_or_default()
        .into_iter()
        .filter(|group| !group.pages.is_empty())
        .collect()
}

fn tokens(spec: &str) -> impl Iterator<Item = &str> {
    spec.split(|c: char| c == ',' || c.is_whitespace())
        .filter(|token| !token.is_empty())
}

fn resolve_token(
    raw: &str,
    total_pages: u32,
    mode: ParseMode,
    pages: &mut BTreeSet<u32>,
) -> Result<()> {
    let Some(token) = PageToken::parse(raw) else {
        if mode == ParseMode::Strict {
            return Err(PageError::InvalidToken(raw.to_string()));
        }
        debug!("Skipping malformed page token '{}'", raw);
        return Ok(());
    };

    let (start, end) = token.bounds();
    let total = u64::from(total_pages);
    if start < 1 || end > total {
        if mode == ParseMode::Strict {
            let page = if start < 1 { start } else { end };
            return Err(PageError::PageOutOfRange {
                page,
                total: total_pages,
            });
        }
        debug!("Ignoring pages outside 1-{} in '{}'", total_pages, raw);
    }

    // Clamp before iterating so "1-4000000000" stays cheap.
    for page in start.max(1)..=end.min(total) {
        pages.insert((page - 1) as u32);
    }
    Ok(())
}
