//! Fixtures shared by the macro scenarios.

use anyhow::Result;

use adc_core::channel::{DeviceChannel, DUMP_COMMAND};

/// Login screen: two fields and a button, nested like a real dump.
pub const LOGIN_SCREEN: &str = r#"<?xml version='1.0' encoding='UTF-8' standalone='yes' ?><hierarchy rotation="0"><node index="0" text="" resource-id="" class="android.widget.FrameLayout" package="com.example.app" bounds="[0,0][1080,1920]"><node index="0" text="" resource-id="com.example.app:id/user" class="android.widget.EditText" package="com.example.app" bounds="[40,300][1040,420]" /><node index="1" text="" resource-id="com.example.app:id/password" class="android.widget.EditText" package="com.example.app" bounds="[40,460][1040,580]" /><node index="2" text="Sign in" resource-id="com.example.app:id/sign_in" class="android.widget.Button" package="com.example.app" bounds="[340,700][740,820]" /></node></hierarchy>UI hierchary dumped to: /dev/tty"#;

/// Screen shown after signing in.
pub const HOME_SCREEN: &str = r#"<?xml version='1.0' encoding='UTF-8' standalone='yes' ?><hierarchy rotation="0"><node index="0" text="" resource-id="" class="android.widget.FrameLayout" package="com.example.app" bounds="[0,0][1080,1920]"><node index="0" text="Welcome" resource-id="com.example.app:id/title" class="android.widget.TextView" package="com.example.app" bounds="[0,100][1080,200]" /><node index="1" text="" resource-id="com.example.app:id/list" class="android.widget.ListView" package="com.example.app" bounds="[0,200][1080,1800]"><node index="0" text="Item" resource-id="com.example.app:id/item_text" class="android.widget.TextView" package="com.example.app" bounds="[0,200][1080,320]" /></node></node></hierarchy>UI hierchary dumped to: /dev/tty"#;

/// Device whose screen moves to the next dump after every `input tap`.
pub struct ScreenFlow {
    screens: Vec<&'static str>,
    current: usize,
    pub sent: Vec<String>,
}

impl ScreenFlow {
    pub fn new(screens: Vec<&'static str>) -> Self {
        Self { screens, current: 0, sent: Vec::new() }
    }
}

impl DeviceChannel for ScreenFlow {
    fn send_command(&mut self, command: &str) -> Result<String> {
        self.sent.push(command.to_string());
        if command == DUMP_COMMAND {
            return Ok(self.screens.get(self.current).copied().unwrap_or_default().to_string());
        }
        if command.starts_with("input tap") && self.current + 1 < self.screens.len() {
            self.current += 1;
        }
        Ok(String::new())
    }
}
