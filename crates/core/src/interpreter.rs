//! Macro language.
//!
//! A macro mixes literal text, which is typed on the device, with
//! backtick-delimited commands:
//!
//! ```text
//! Hello `tap @id/send` `#500` `swipe @list[50,90] @list[50,10] 300`
//! ```
//!
//! * `` `#<ms>` `` pauses for the given number of milliseconds.
//! * Any other command is sent as `input <command>`, after every `@id`
//!   or `@id[px,py]` reference in it was replaced by the `x y` of the
//!   matching element in a freshly fetched view hierarchy.
//! * ```` ``` ```` stands for one literal backtick.
//!
//! The interpreter is pulled one action at a time so references are only
//! resolved after everything before them has run.

use std::collections::VecDeque;

use crate::hierarchy::ViewHierarchyIndex;
use crate::logger;
use crate::resolver;
use crate::settings::Settings;
use crate::types::Action;

/// Stands in for an escaped backtick while scanning. Private use area,
/// not expected in operator input.
pub const BACKTICK_SENTINEL: char = '\u{E000}';

const DELIMITER: char = '`';
const ESCAPED_BACKTICK: &str = "```";

/// Gives the interpreter a current view hierarchy on demand.
pub trait HierarchySource {
    fn view_hierarchy(&mut self) -> ViewHierarchyIndex;
}

/// A fixed snapshot, for planning against a saved dump.
impl HierarchySource for ViewHierarchyIndex {
    fn view_hierarchy(&mut self) -> ViewHierarchyIndex {
        self.clone()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MacroOptions {
    /// Pause after each typed fragment
    pub type_delay_ms: u64,
    /// Pause after the whole macro
    pub settle_delay_ms: u64,
}

impl Default for MacroOptions {
    fn default() -> Self {
        Settings::default().macro_options()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Literal,
    Command,
}

/// Lazy, single-pass interpreter over one macro.
#[derive(Debug)]
pub struct Interpreter {
    segments: Vec<String>,
    pos: usize,
    mode: Mode,
    pending: VecDeque<Action>,
    options: MacroOptions,
    finished: bool,
}

impl Interpreter {
    pub fn new(source: &str, options: MacroOptions) -> Self {
        let mut escaped = source.replace(ESCAPED_BACKTICK, &BACKTICK_SENTINEL.to_string());
        escaped.push(DELIMITER);

        Self {
            segments: escaped.split(DELIMITER).map(str::to_string).collect(),
            pos: 0,
            mode: Mode::Literal,
            pending: VecDeque::new(),
            options,
            finished: false,
        }
    }

    /// Next action, or `None` once the macro is exhausted.
    ///
    /// `source` is asked for a hierarchy only when a command with `@`
    /// references is reached.
    pub fn next_action(&mut self, source: &mut dyn HierarchySource) -> Option<Action> {
        loop {
            if let Some(action) = self.pending.pop_front() {
                return Some(action);
            }
            if self.finished {
                return None;
            }
            self.advance(source);
        }
    }

    /// Borrowing iterator over the remaining actions.
    pub fn actions<'a>(&'a mut self, source: &'a mut dyn HierarchySource) -> Actions<'a> {
        Actions { interpreter: self, source }
    }

    /// Consume one segment and the delimiter that closes it.
    fn advance(&mut self, source: &mut dyn HierarchySource) {
        // the piece after the appended delimiter is always empty
        if self.pos + 1 >= self.segments.len() {
            if self.options.settle_delay_ms > 0 {
                self.pending.push_back(Action::Sleep(self.options.settle_delay_ms));
            }
            self.finished = true;
            return;
        }

        let segment = std::mem::take(&mut self.segments[self.pos]);
        self.pos += 1;

        match self.mode {
            Mode::Literal => {
                self.flush_literal(&segment);
                self.mode = Mode::Command;
            }
            Mode::Command => {
                self.flush_command(&segment, source);
                self.mode = Mode::Literal;
            }
        }
    }

    fn flush_literal(&mut self, text: &str) {
        for fragment in split_keep_whitespace(text) {
            let restored = fragment.replace(BACKTICK_SENTINEL, "`");
            self.pending.push_back(Action::TypeText(restored));
            if self.options.type_delay_ms > 0 {
                self.pending.push_back(Action::Sleep(self.options.type_delay_ms));
            }
        }
    }

    fn flush_command(&mut self, body: &str, source: &mut dyn HierarchySource) {
        let command: String = body.chars().filter(|c| *c != '\r' && *c != '\n').collect();
        if command.is_empty() {
            return;
        }

        if let Some(ms) = command.strip_prefix('#') {
            match ms.trim().parse::<u64>() {
                Ok(ms) => self.pending.push_back(Action::Sleep(ms)),
                Err(e) => logger::warn_p("macro", &format!("skipped `{}`: {}", command, e)),
            }
            return;
        }

        let resolved = if resolver::has_references(&command) {
            let index = source.view_hierarchy();
            resolver::expand_references(&command, &index)
        } else {
            command
        };
        let restored = resolved.replace(BACKTICK_SENTINEL, "\\`");
        self.pending.push_back(Action::RawInput(format!("input {}", restored)));
    }
}

pub struct Actions<'a> {
    interpreter: &'a mut Interpreter,
    source: &'a mut dyn HierarchySource,
}

impl Iterator for Actions<'_> {
    type Item = Action;

    fn next(&mut self) -> Option<Action> {
        self.interpreter.next_action(self.source)
    }
}

/// Interpret a whole macro against one snapshot.
pub fn plan(source: &str, index: &ViewHierarchyIndex, options: MacroOptions) -> Vec<Action> {
    let mut snapshot = index.clone();
    let mut interpreter = Interpreter::new(source, options);
    let actions = interpreter.actions(&mut snapshot).collect();
    actions
}

/// Characters that separate typed fragments.
pub(crate) fn is_split_whitespace(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\r' | '\n')
}

/// Words and single whitespace characters, in order.
fn split_keep_whitespace(text: &str) -> Vec<&str> {
    let mut out = Vec::new();
    let mut start = 0;
    for (i, c) in text.char_indices() {
        if is_split_whitespace(c) {
            if start < i {
                out.push(&text[start..i]);
            }
            out.push(&text[i..i + c.len_utf8()]);
            start = i + c.len_utf8();
        }
    }
    if start < text.len() {
        out.push(&text[start..]);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Rectangle;

    const QUIET: MacroOptions = MacroOptions { type_delay_ms: 0, settle_delay_ms: 0 };

    fn index() -> ViewHierarchyIndex {
        [("foo", Rectangle::new(0, 0, 100, 100))].into_iter().collect()
    }

    fn run(src: &str) -> Vec<Action> {
        plan(src, &index(), QUIET)
    }

    fn text(s: &str) -> Action {
        Action::TypeText(s.to_string())
    }

    fn raw(s: &str) -> Action {
        Action::RawInput(s.to_string())
    }

    #[test]
    fn literal_text_is_typed_per_fragment() {
        assert_eq!(
            run("hi there\nyou"),
            vec![text("hi"), text(" "), text("there"), text("\n"), text("you")]
        );
        assert_eq!(run("a  b"), vec![text("a"), text(" "), text(" "), text("b")]);
    }

    #[test]
    fn typed_fragments_are_followed_by_delay() {
        let opts = MacroOptions { type_delay_ms: 400, settle_delay_ms: 800 };
        assert_eq!(
            plan("ab cd", &index(), opts),
            vec![
                text("ab"),
                Action::Sleep(400),
                text(" "),
                Action::Sleep(400),
                text("cd"),
                Action::Sleep(400),
                Action::Sleep(800),
            ]
        );
    }

    #[test]
    fn escaped_backtick_is_typed_literally() {
        assert_eq!(run("a```b"), vec![text("a`b")]);
    }

    #[test]
    fn escaped_backtick_in_command_is_shell_escaped() {
        assert_eq!(run("`text ```x`"), vec![raw("input text \\`x")]);
    }

    #[test]
    fn sleep_directive() {
        let actions = run("`#250`");
        assert_eq!(actions, vec![Action::Sleep(250)]);
        assert!(!actions.iter().any(|a| matches!(a, Action::RawInput(_))));
    }

    #[test]
    fn malformed_sleep_is_skipped() {
        assert_eq!(run("`#abc``tap 1 2`"), vec![raw("input tap 1 2")]);
        assert_eq!(run("`#-5`"), vec![]);
    }

    #[test]
    fn references_are_resolved() {
        assert_eq!(run("`tap @foo[10,20]`"), vec![raw("input tap 10 20")]);
        assert_eq!(run("`tap @bar`"), vec![raw("input tap 0 0")]);
    }

    #[test]
    fn command_without_leading_literal() {
        let opts = MacroOptions { type_delay_ms: 400, settle_delay_ms: 800 };
        assert_eq!(
            plan("`tap 5 5`", &index(), opts),
            vec![raw("input tap 5 5"), Action::Sleep(800)]
        );
    }

    #[test]
    fn alternating_segments() {
        assert_eq!(
            run("`abc` `tap 5 5`"),
            vec![raw("input abc"), text(" "), raw("input tap 5 5")]
        );
    }

    #[test]
    fn newlines_inside_commands_are_dropped() {
        assert_eq!(run("`tap\r\n 1 2`"), vec![raw("input tap 1 2")]);
        assert_eq!(run("`\n`x"), vec![text("x")]);
    }

    #[test]
    fn unclosed_command_is_closed() {
        assert_eq!(run("hi `tap 1 2"), vec![text("hi"), text(" "), raw("input tap 1 2")]);
    }

    #[test]
    fn empty_macro_only_settles() {
        let opts = MacroOptions { type_delay_ms: 400, settle_delay_ms: 800 };
        assert_eq!(plan("", &index(), opts), vec![Action::Sleep(800)]);
        assert_eq!(run("``"), vec![]);
    }

    struct CountingSource {
        calls: usize,
    }

    impl HierarchySource for CountingSource {
        fn view_hierarchy(&mut self) -> ViewHierarchyIndex {
            self.calls += 1;
            index()
        }
    }

    #[test]
    fn hierarchy_fetched_per_referencing_command_and_lazily() {
        let mut source = CountingSource { calls: 0 };
        let mut interp = Interpreter::new("x`tap @foo``tap 1 1``tap @foo`", QUIET);

        assert_eq!(interp.next_action(&mut source), Some(text("x")));
        assert_eq!(source.calls, 0);
        assert_eq!(interp.next_action(&mut source), Some(raw("input tap 50 50")));
        assert_eq!(source.calls, 1);
        assert_eq!(interp.next_action(&mut source), Some(raw("input tap 1 1")));
        assert_eq!(source.calls, 1);
        assert_eq!(interp.next_action(&mut source), Some(raw("input tap 50 50")));
        assert_eq!(source.calls, 2);
        assert_eq!(interp.next_action(&mut source), None);
        assert_eq!(interp.next_action(&mut source), None);
    }

    #[test]
    fn split_keeps_each_whitespace_char() {
        assert_eq!(split_keep_whitespace(" a\tbc "), vec![" ", "a", "\t", "bc", " "]);
        assert!(split_keep_whitespace("").is_empty());
    }
}
