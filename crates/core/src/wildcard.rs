use regex::Regex;

/// Glob-style pattern over resource ids.
///
/// `*` matches any run of characters, `?` matches at most one character
/// (zero or one, kept for compatibility with existing macros). Everything
/// else is literal and the whole candidate must match.
#[derive(Debug, Clone)]
pub struct WildcardPattern {
    regex: Option<Regex>,
}

impl WildcardPattern {
    pub fn compile(pattern: &str) -> Self {
        let mut re = String::with_capacity(pattern.len() + 8);
        re.push_str("(?s)^");
        let mut lit = [0u8; 4];
        for c in pattern.chars() {
            match c {
                '?' => re.push_str(".?"),
                '*' => re.push_str(".*"),
                _ => re.push_str(&regex::escape(c.encode_utf8(&mut lit))),
            }
        }
        re.push('$');
        Self { regex: Regex::new(&re).ok() }
    }

    pub fn matches(&self, candidate: &str) -> bool {
        self.regex.as_ref().is_some_and(|r| r.is_match(candidate))
    }
}

/// One-shot match of `candidate` against `pattern`.
pub fn matches(pattern: &str, candidate: &str) -> bool {
    WildcardPattern::compile(pattern).matches(candidate)
}
