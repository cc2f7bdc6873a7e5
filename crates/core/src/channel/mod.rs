pub mod stub;

use anyhow::Result;

use crate::hierarchy::ViewHierarchyIndex;
use crate::interpreter::HierarchySource;
use crate::logger;

/// Shell command that prints the current view hierarchy to stdout.
pub const DUMP_COMMAND: &str = "uiautomator dump /dev/tty";

/// Shell access to one device.
pub trait DeviceChannel: Send {
    /// Run a shell command on the device and return its output.
    fn send_command(&mut self, command: &str) -> Result<String>;

    fn fetch_view_hierarchy_dump(&mut self) -> Result<String> {
        self.send_command(DUMP_COMMAND)
    }
}

/// Hierarchy fetched from the device every time it is asked for.
pub struct LiveHierarchy<'a> {
    pub channel: &'a mut dyn DeviceChannel,
}

impl<'a> LiveHierarchy<'a> {
    pub fn new(channel: &'a mut dyn DeviceChannel) -> Self {
        Self { channel }
    }
}

impl HierarchySource for LiveHierarchy<'_> {
    fn view_hierarchy(&mut self) -> ViewHierarchyIndex {
        match self.channel.fetch_view_hierarchy_dump() {
            Ok(xml) => {
                let index = ViewHierarchyIndex::parse(&xml);
                logger::info_p("hierarchy", &format!("indexed {} element(s)", index.len()));
                index
            }
            Err(e) => {
                logger::error_p("hierarchy", &format!("dump failed, treating screen as empty: {:#}", e));
                ViewHierarchyIndex::new()
            }
        }
    }
}

/// Create the channel for a dry run. `dump` is served as the screen contents.
pub fn create_channel(dump: Option<String>) -> stub::StubChannel {
    logger::register_prefix("hierarchy", logger::COLOR_GRAY);
    logger::register_prefix("resolve", logger::COLOR_GRAY);
    logger::register_prefix("macro", logger::COLOR_BLUE);
    logger::register_prefix("exec", logger::COLOR_BLUE);
    logger::register_prefix("stub", logger::COLOR_GRAY);
    match dump {
        Some(xml) => stub::StubChannel::new(xml),
        None => stub::StubChannel::empty(),
    }
}
