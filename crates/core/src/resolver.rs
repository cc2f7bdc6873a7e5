use std::borrow::Cow;
use std::sync::OnceLock;

use regex::{Captures, Regex};

use crate::hierarchy::ViewHierarchyIndex;
use crate::logger;
use crate::types::Rectangle;
use crate::wildcard::WildcardPattern;

const DEFAULT_FRACTION: f64 = 0.5;

/// A parsed `@id[px,py]` reference (without the `@`).
#[derive(Debug, Clone, PartialEq)]
pub struct Reference {
    pub pattern: String,
    pub fx: f64,
    pub fy: f64,
}

impl Reference {
    pub fn parse(token: &str) -> Self {
        let Some(open) = token.find('[') else {
            return Self::centered(token);
        };

        let pattern = &token[..open];
        let inner = token[open + 1..].trim_end_matches(']');
        match parse_percent_pair(inner) {
            Some((fx, fy)) => Self { pattern: pattern.to_string(), fx, fy },
            None => {
                logger::warn_p("resolve", &format!("bad offsets in @{}, using center", token));
                Self::centered(pattern)
            }
        }
    }

    fn centered(pattern: &str) -> Self {
        Self { pattern: pattern.to_string(), fx: DEFAULT_FRACTION, fy: DEFAULT_FRACTION }
    }

    /// Pattern used for wildcard lookup; ids without a package get `*:`.
    pub fn normalized_pattern(&self) -> Cow<'_, str> {
        if self.pattern.contains(':') {
            Cow::Borrowed(&self.pattern)
        } else {
            Cow::Owned(format!("*:{}", self.pattern))
        }
    }
}

fn parse_percent_pair(s: &str) -> Option<(f64, f64)> {
    let (a, b) = s.split_once(',')?;
    let pct = |v: &str| {
        v.trim()
            .parse::<f64>()
            .ok()
            .filter(|p| p.is_finite() && *p >= 0.0)
            .map(|p| p / 100.0)
    };
    Some((pct(a)?, pct(b)?))
}

/// Bounds for a reference: exact id first, then the first wildcard hit in
/// document order, else a zero rectangle at the origin.
pub fn lookup(reference: &Reference, index: &ViewHierarchyIndex) -> Rectangle {
    if let Some(rect) = index.get(&reference.pattern) {
        return *rect;
    }

    let wildcard = WildcardPattern::compile(&reference.normalized_pattern());
    if let Some((_, rect)) = index.iter().find(|(id, _)| wildcard.matches(id)) {
        return *rect;
    }

    logger::warn_p("resolve", &format!("no element matches {:?}, using origin", reference.pattern));
    Rectangle::default()
}

/// Resolve a reference token (text after `@`) to absolute coordinates.
pub fn resolve(token: &str, index: &ViewHierarchyIndex) -> (i32, i32) {
    let reference = Reference::parse(token);
    let rect = lookup(&reference, index);
    rect.point_at(reference.fx, reference.fy)
}

fn reference_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"@(\S+)").expect("static regex"))
}

pub fn has_references(command: &str) -> bool {
    command.contains('@')
}

/// Replace every `@token` in `command` with `"x y"`.
pub fn expand_references(command: &str, index: &ViewHierarchyIndex) -> String {
    reference_regex()
        .replace_all(command, |caps: &Captures| {
            let (x, y) = resolve(&caps[1], index);
            format!("{} {}", x, y)
        })
        .into_owned()
}
