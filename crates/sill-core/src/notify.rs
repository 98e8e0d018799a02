#[cfg(any(target_os = "linux", target_os = "macos", target_os = "windows"))]
use std::process::{Command, Stdio};

#[cfg(any(target_os = "linux", target_os = "macos", target_os = "windows"))]
use anyhow::{Context, anyhow};
use tracing::debug;
#[cfg(any(target_os = "linux", target_os = "macos", target_os = "windows"))]
use tracing::info;

pub trait Notifier {
    fn send(&self, title: &str, body: &str) -> anyhow::Result<()>;
}

#[cfg(any(target_os = "linux", target_os = "macos", target_os = "windows"))]
#[derive(Debug, Default)]
pub struct ToastNotifier;

#[cfg(any(target_os = "linux", target_os = "macos", target_os = "windows"))]
impl Notifier for ToastNotifier {
    fn send(&self, title: &str, body: &str) -> anyhow::Result<()> {
        info!(title, "sending toast");
        let output = toast_command(title, body)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .context("failed to run notification command")?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            return Err(anyhow!(
                "notification command failed with status {}: {stderr}",
                output
                    .status
                    .code()
                    .map(|code| code.to_string())
                    .unwrap_or_else(|| "unknown".to_string())
            ));
        }

        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct NullNotifier;

impl Notifier for NullNotifier {
    fn send(&self, title: &str, body: &str) -> anyhow::Result<()> {
        debug!(title, body, "notifications unavailable; dropping toast");
        Ok(())
    }
}

#[cfg(any(target_os = "linux", target_os = "macos", target_os = "windows"))]
pub fn platform_notifier() -> Box<dyn Notifier> {
    Box::new(ToastNotifier)
}

#[cfg(not(any(target_os = "linux", target_os = "macos", target_os = "windows")))]
pub fn platform_notifier() -> Box<dyn Notifier> {
    Box::new(NullNotifier)
}

#[cfg(target_os = "linux")]
fn toast_command(title: &str, body: &str) -> Command {
    let mut cmd = Command::new("notify-send");
    cmd.arg("--app-name").arg("sill").arg(title).arg(body);
    cmd
}

#[cfg(target_os = "macos")]
fn toast_command(title: &str, body: &str) -> Command {
    let script = format!(
        "display notification \"{}\" with title \"{}\"",
        applescript_escape(body),
        applescript_escape(title)
    );
    let mut cmd = Command::new("osascript");
    cmd.arg("-e").arg(script);
    cmd
}

#[cfg(target_os = "macos")]
fn applescript_escape(raw: &str) -> String {
    raw.replace('\\', "\\\\").replace('"', "\\\"")
}

#[cfg(target_os = "windows")]
fn toast_command(title: &str, body: &str) -> Command {
    let script = format!(
        concat!(
            "[Windows.UI.Notifications.ToastNotificationManager, Windows.UI.Notifications, ",
            "ContentType = WindowsRuntime] | Out-Null; ",
            "$template = [Windows.UI.Notifications.ToastNotificationManager]::GetTemplateContent(",
            "[Windows.UI.Notifications.ToastTemplateType]::ToastText02); ",
            "$texts = $template.GetElementsByTagName('text'); ",
            "$texts.Item(0).AppendChild($template.CreateTextNode('{title}')) | Out-Null; ",
            "$texts.Item(1).AppendChild($template.CreateTextNode('{body}')) | Out-Null; ",
            "$toast = [Windows.UI.Notifications.ToastNotification]::new($template); ",
            "[Windows.UI.Notifications.ToastNotificationManager]::CreateToastNotifier('Sill')",
            ".Show($toast)"
        ),
        title = powershell_escape(title),
        body = powershell_escape(body)
    );
    let mut cmd = Command::new("powershell");
    cmd.arg("-NoProfile").arg("-NonInteractive").arg("-Command").arg(script);
    cmd
}

#[cfg(target_os = "windows")]
fn powershell_escape(raw: &str) -> String {
    raw.replace('\'', "''")
}
