#[cfg(any(target_os = "linux", target_os = "windows"))]
use anyhow::Context;
use tracing::debug;
#[cfg(any(target_os = "linux", target_os = "windows"))]
use tracing::info;
#[cfg(target_os = "linux")]
use tracing::warn;

pub trait StartupRegistrar {
    fn enable(&self) -> anyhow::Result<()>;
    fn disable(&self) -> anyhow::Result<()>;
    fn is_enabled(&self) -> bool;
}

#[cfg(target_os = "linux")]
#[derive(Debug)]
pub struct XdgAutostart {
    autostart_dir: std::path::PathBuf,
}

#[cfg(target_os = "linux")]
impl XdgAutostart {
    pub fn new(autostart_dir: std::path::PathBuf) -> Self {
        Self { autostart_dir }
    }

    fn desktop_file(&self) -> std::path::PathBuf {
        self.autostart_dir.join("sill.desktop")
    }
}

#[cfg(target_os = "linux")]
impl StartupRegistrar for XdgAutostart {
    fn enable(&self) -> anyhow::Result<()> {
        std::fs::create_dir_all(&self.autostart_dir)
            .with_context(|| format!("failed creating {}", self.autostart_dir.display()))?;

        let exe = std::env::current_exe().context("cannot locate current executable")?;
        let entry = format!(
            "[Desktop Entry]\nType=Application\nName=Sill\nExec={}\nX-GNOME-Autostart-enabled=true\n",
            exe.display()
        );

        let path = self.desktop_file();
        std::fs::write(&path, entry)
            .with_context(|| format!("failed writing {}", path.display()))?;
        info!(file = %path.display(), "registered autostart entry");
        Ok(())
    }

    fn disable(&self) -> anyhow::Result<()> {
        let path = self.desktop_file();
        match std::fs::remove_file(&path) {
            Ok(()) => {
                info!(file = %path.display(), "removed autostart entry");
                Ok(())
            }
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => {
                Err(err).with_context(|| format!("failed removing {}", path.display()))
            }
        }
    }

    fn is_enabled(&self) -> bool {
        self.desktop_file().exists()
    }
}

#[cfg(target_os = "windows")]
#[derive(Debug, Default)]
pub struct RunKeyAutostart;

#[cfg(target_os = "windows")]
const RUN_KEY: &str = r"HKCU\Software\Microsoft\Windows\CurrentVersion\Run";
#[cfg(target_os = "windows")]
const RUN_VALUE: &str = "Sill";

#[cfg(target_os = "windows")]
impl StartupRegistrar for RunKeyAutostart {
    fn enable(&self) -> anyhow::Result<()> {
        let exe = std::env::current_exe().context("cannot locate current executable")?;
        let exe = exe.display().to_string();
        run_reg(&[
            "add", RUN_KEY, "/v", RUN_VALUE, "/t", "REG_SZ", "/d", &exe, "/f",
        ])?;
        info!(value = RUN_VALUE, "registered autostart entry");
        Ok(())
    }

    fn disable(&self) -> anyhow::Result<()> {
        if !self.is_enabled() {
            return Ok(());
        }
        run_reg(&["delete", RUN_KEY, "/v", RUN_VALUE, "/f"])?;
        info!(value = RUN_VALUE, "removed autostart entry");
        Ok(())
    }

    fn is_enabled(&self) -> bool {
        run_reg(&["query", RUN_KEY, "/v", RUN_VALUE]).is_ok()
    }
}

#[cfg(target_os = "windows")]
fn run_reg(args: &[&str]) -> anyhow::Result<()> {
    use std::process::{Command, Stdio};

    let output = Command::new("reg")
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()
        .context("failed to run reg.exe")?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        anyhow::bail!(
            "reg.exe failed with status {}: {stderr}",
            output
                .status
                .code()
                .map(|code| code.to_string())
                .unwrap_or_else(|| "unknown".to_string())
        );
    }
    Ok(())
}

#[derive(Debug, Default)]
pub struct UnsupportedAutostart;

impl StartupRegistrar for UnsupportedAutostart {
    fn enable(&self) -> anyhow::Result<()> {
        debug!("startup registration unsupported on this platform");
        Ok(())
    }

    fn disable(&self) -> anyhow::Result<()> {
        Ok(())
    }

    fn is_enabled(&self) -> bool {
        false
    }
}

#[cfg(target_os = "linux")]
pub fn platform_registrar() -> Box<dyn StartupRegistrar> {
    match dirs::config_dir() {
        Some(config) => Box::new(XdgAutostart::new(config.join("autostart"))),
        None => {
            warn!("cannot determine config directory; startup registration disabled");
            Box::new(UnsupportedAutostart)
        }
    }
}

#[cfg(target_os = "windows")]
pub fn platform_registrar() -> Box<dyn StartupRegistrar> {
    Box::new(RunKeyAutostart)
}

#[cfg(not(any(target_os = "linux", target_os = "windows")))]
pub fn platform_registrar() -> Box<dyn StartupRegistrar> {
    Box::new(UnsupportedAutostart)
}

#[cfg(test)]
mod tests {
    use super::{StartupRegistrar, UnsupportedAutostart};

    #[test]
    fn unsupported_registrar_reports_disabled() {
        let registrar = UnsupportedAutostart;
        registrar.enable().expect("enable is a no-op");
        assert!(!registrar.is_enabled());
        registrar.disable().expect("disable is a no-op");
    }

    #[cfg(target_os = "linux")]
    mod xdg {
        use tempfile::tempdir;

        use super::super::{StartupRegistrar, XdgAutostart};

        #[test]
        fn enable_writes_desktop_entry() {
            let temp = tempdir().expect("tempdir");
            let registrar = XdgAutostart::new(temp.path().join("autostart"));
            assert!(!registrar.is_enabled());

            registrar.enable().expect("enable");
            assert!(registrar.is_enabled());

            let entry = std::fs::read_to_string(
                temp.path().join("autostart").join("sill.desktop"),
            )
            .expect("read entry");
            assert!(entry.starts_with("[Desktop Entry]\n"));
            assert!(entry.contains("Name=Sill\n"));
            assert!(entry.contains("Exec="));
        }

        #[test]
        fn disable_removes_entry_and_tolerates_absence() {
            let temp = tempdir().expect("tempdir");
            let registrar = XdgAutostart::new(temp.path().join("autostart"));

            registrar.disable().expect("disable with nothing registered");

            registrar.enable().expect("enable");
            registrar.disable().expect("disable");
            assert!(!registrar.is_enabled());
        }
    }
}
