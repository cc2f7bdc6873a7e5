use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;

use anyhow::{Context, Result};

use crate::channel::{DeviceChannel, LiveHierarchy};
use crate::interpreter::{is_split_whitespace, Interpreter};
use crate::logger;
use crate::settings::Settings;
use crate::types::Action;

const KEYCODE_TAB: u32 = 61;
const KEYCODE_SPACE: u32 = 62;
const KEYCODE_ENTER: u32 = 66;

/// Escape text for a double-quoted device shell argument.
pub fn shell_escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        if matches!(c, '\\' | '"' | '`' | '$') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

/// Shell commands that type one fragment. Whitespace goes out as key events
/// since `input text` cannot send it.
pub fn type_text_commands(text: &str) -> Vec<String> {
    if !text.chars().all(is_split_whitespace) {
        return vec![format!("input text \"{}\"", shell_escape(text))];
    }
    text.chars()
        .filter_map(|c| match c {
            ' ' => Some(KEYCODE_SPACE),
            '\t' => Some(KEYCODE_TAB),
            '\n' => Some(KEYCODE_ENTER),
            _ => None,
        })
        .map(|code| format!("input keyevent {}", code))
        .collect()
}

/// Carry out one action on the device.
pub fn execute(action: &Action, channel: &mut dyn DeviceChannel) -> Result<()> {
    match action {
        Action::TypeText(text) => {
            for command in type_text_commands(text) {
                channel
                    .send_command(&command)
                    .with_context(|| format!("typing {:?}", text))?;
            }
        }
        Action::RawInput(command) => {
            channel
                .send_command(command)
                .with_context(|| format!("sending {:?}", command))?;
        }
        Action::Sleep(ms) => thread::sleep(Duration::from_millis(*ms)),
    }
    Ok(())
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Failure {
    pub action: Action,
    pub error: String,
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RunReport {
    pub executed: usize,
    pub failures: Vec<Failure>,
    pub cancelled: bool,
}

impl RunReport {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty() && !self.cancelled
    }
}

/// Interpret and execute a macro, one action at a time.
///
/// Each action is finished before the next one is produced, so a reference
/// sees the screen left behind by the actions before it. `cancel` is only
/// checked between actions.
pub fn run_macro(
    source: &str,
    channel: &mut dyn DeviceChannel,
    settings: &Settings,
    cancel: Option<&AtomicBool>,
) -> RunReport {
    let mut interpreter = Interpreter::new(source, settings.macro_options());
    let mut live = LiveHierarchy::new(channel);
    let mut report = RunReport::default();

    loop {
        if cancel.is_some_and(|c| c.load(Ordering::SeqCst)) {
            logger::warn_p("exec", "cancelled");
            report.cancelled = true;
            break;
        }

        let Some(action) = interpreter.next_action(&mut live) else { break };
        logger::info_p("exec", &action.to_string());

        match execute(&action, &mut *live.channel) {
            Ok(()) => report.executed += 1,
            Err(e) => {
                logger::error_p("exec", &format!("{:#}", e));
                report.failures.push(Failure { action, error: format!("{:#}", e) });
                if settings.abort_on_error {
                    break;
                }
            }
        }
    }

    logger::info_p(
        "exec",
        &format!("done: {} action(s), {} failure(s)", report.executed, report.failures.len()),
    );
    report
}
