use std::ffi::OsStr;
use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::{debug, warn};

use super::{Desktop, DesktopApp, DesktopError, KeyCombo, Modifier};

/// Delay before the previous clipboard content is put back after a paste.
const CLIPBOARD_RESTORE_DELAY: Duration = Duration::from_millis(500);

/// Desktop implementation that shells out to the platform's own tools.
#[derive(Debug, Default, Clone)]
pub struct SystemDesktop;

impl SystemDesktop {
    pub fn new() -> Self {
        Self
    }
}

async fn run<I, S>(program: &str, args: I) -> Result<(), DesktopError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    debug!("Running {}", program);
    let output = Command::new(program)
        .args(args)
        .output()
        .await
        .map_err(|e| DesktopError::CommandFailed {
            command: program.to_string(),
            message: e.to_string(),
        })?;

    // Only a failure to spawn is an error; exit codes are not a success contract.
    if !output.status.success() {
        warn!(
            "{} exited with {}: {}",
            program,
            output.status,
            String::from_utf8_lossy(&output.stderr).trim()
        );
    }
    Ok(())
}

fn paste_combo() -> KeyCombo {
    let modifier = if cfg!(target_os = "macos") {
        Modifier::Command
    } else {
        Modifier::Control
    };
    KeyCombo {
        modifiers: vec![modifier],
        key: "v".to_string(),
    }
}

fn read_clipboard() -> Result<Option<String>, DesktopError> {
    let mut clipboard =
        arboard::Clipboard::new().map_err(|e| DesktopError::Clipboard(e.to_string()))?;
    Ok(clipboard.get_text().ok())
}

fn write_clipboard(text: &str) -> Result<(), DesktopError> {
    let mut clipboard =
        arboard::Clipboard::new().map_err(|e| DesktopError::Clipboard(e.to_string()))?;
    clipboard
        .set_text(text.to_string())
        .map_err(|e| DesktopError::Clipboard(e.to_string()))
}

#[async_trait]
impl Desktop for SystemDesktop {
    async fn open_path(&self, path: &Path) -> Result<(), DesktopError> {
        if cfg!(target_os = "macos") {
            run("open", [path.as_os_str()]).await
        } else if cfg!(target_os = "windows") {
            run("cmd", [OsStr::new("/C"), OsStr::new("start"), OsStr::new(""), path.as_os_str()]).await
        } else {
            run("xdg-open", [path.as_os_str()]).await
        }
    }

    async fn launch_app(&self, app: DesktopApp) -> Result<(), DesktopError> {
        match (app, cfg!(target_os = "macos"), cfg!(target_os = "windows")) {
            (DesktopApp::Mail, true, _) => run("open", ["-a", "Mail"]).await,
            (DesktopApp::Spreadsheet, true, _) => run("open", ["-a", "Numbers"]).await,
            (DesktopApp::Mail, _, true) => run("cmd", ["/C", "start", "", "outlook:"]).await,
            (DesktopApp::Spreadsheet, _, true) => run("cmd", ["/C", "start", "", "excel"]).await,
            (DesktopApp::Mail, _, _) => run("xdg-open", ["mailto:"]).await,
            (DesktopApp::Spreadsheet, _, _) => run("libreoffice", ["--calc"]).await,
        }
    }

    async fn press_keys(&self, combo: &KeyCombo) -> Result<(), DesktopError> {
        if cfg!(target_os = "macos") {
            run("osascript", ["-e", combo.to_applescript().as_str()]).await
        } else if cfg!(target_os = "windows") {
            let script = format!(
                "Add-Type -AssemblyName System.Windows.Forms; [System.Windows.Forms.SendKeys]::SendWait('{}')",
                combo.to_sendkeys()
            );
            run("powershell", ["-command", script.as_str()]).await
        } else {
            let xdotool = combo
                .to_string()
                .replace("command+", "super+")
                .replace("control+", "ctrl+")
                .replace("option+", "alt+");
            run("xdotool", ["key", xdotool.as_str()]).await
        }
    }

    async fn paste_text(&self, text: &str) -> Result<(), DesktopError> {
        let text = text.to_string();
        let original = tokio::task::spawn_blocking(move || {
            let original = read_clipboard()?;
            write_clipboard(&text)?;
            Ok::<_, DesktopError>(original)
        })
        .await
        .map_err(|e| DesktopError::Clipboard(e.to_string()))??;

        self.press_keys(&paste_combo()).await?;

        if let Some(original) = original {
            tokio::spawn(async move {
                tokio::time::sleep(CLIPBOARD_RESTORE_DELAY).await;
                let restored = tokio::task::spawn_blocking(move || write_clipboard(&original)).await;
                if !matches!(restored, Ok(Ok(()))) {
                    warn!("Failed to restore clipboard content");
                }
            });
        }
        Ok(())
    }

    async fn capture_screen(&self, path: &Path) -> Result<(), DesktopError> {
        if cfg!(target_os = "macos") {
            run("screencapture", [OsStr::new("-x"), path.as_os_str()]).await
        } else if cfg!(target_os = "windows") {
            let script = format!(
                "Add-Type -AssemblyName System.Windows.Forms,System.Drawing; \
                 $b = [System.Windows.Forms.Screen]::PrimaryScreen.Bounds; \
                 $bmp = New-Object System.Drawing.Bitmap $b.Width, $b.Height; \
                 $g = [System.Drawing.Graphics]::FromImage($bmp); \
                 $g.CopyFromScreen($b.Location, [System.Drawing.Point]::Empty, $b.Size); \
                 $bmp.Save('{}')",
                path.display()
            );
            run("powershell", ["-command", script.as_str()]).await
        } else {
            run("import", [OsStr::new("-window"), OsStr::new("root"), path.as_os_str()]).await
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paste_combo_uses_platform_modifier() {
        let combo = paste_combo();
        assert_eq!(combo.key, "v");
        assert_eq!(combo.modifiers.len(), 1);
    }

    #[tokio::test]
    async fn run_reports_missing_program() {
        let result = run("definitely-not-a-real-program-xyz", ["--help"]).await;
        assert!(matches!(result, Err(DesktopError::CommandFailed { .. })));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn run_ignores_non_zero_exit_status() {
        let result = run("false", Vec::<&str>::new()).await;
        assert!(result.is_ok(), "unexpected {:?}", result);
    }
}
