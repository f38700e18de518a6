//! Email drafting through the default mail client.

use std::sync::Arc;
use std::time::Duration;

use tracing::info;

use super::HandlerError;
use crate::desktop::{Desktop, DesktopApp, KeyCombo};

pub const DEFAULT_DRAFT: &str = "Hey there,

Thanks for your message. I've looked into this and would be happy to discuss further.

Best regards,
[Your Name]";

const NEW_MESSAGE_KEYS: &str = "command+n";

/// Pauses between the UI actions of a draft.
#[derive(Debug, Clone, Copy)]
pub struct UiPacing {
    /// Wait after launching an application.
    pub app_launch: Duration,
    /// Wait after a keystroke that opens a window.
    pub keystroke: Duration,
}

impl Default for UiPacing {
    fn default() -> Self {
        Self {
            app_launch: Duration::from_secs(3),
            keystroke: Duration::from_secs(1),
        }
    }
}

impl UiPacing {
    pub fn none() -> Self {
        Self {
            app_launch: Duration::ZERO,
            keystroke: Duration::ZERO,
        }
    }
}

pub struct EmailDrafter {
    desktop: Arc<dyn Desktop>,
    pacing: UiPacing,
}

impl EmailDrafter {
    pub fn new(desktop: Arc<dyn Desktop>, pacing: UiPacing) -> Self {
        Self { desktop, pacing }
    }

    pub async fn draft(&self, draft_text: Option<&str>) -> Result<String, HandlerError> {
        info!("Handling email task");
        let text = draft_text.filter(|t| !t.is_empty()).unwrap_or(DEFAULT_DRAFT);

        self.desktop.launch_app(DesktopApp::Mail).await?;
        tokio::time::sleep(self.pacing.app_launch).await;

        let combo: KeyCombo = NEW_MESSAGE_KEYS.parse()?;
        self.desktop.press_keys(&combo).await?;
        tokio::time::sleep(self.pacing.keystroke).await;

        self.desktop.paste_text(text).await?;

        Ok("Email draft created".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::desktop::testing::{DesktopCall, FakeDesktop};

    #[tokio::test]
    async fn drafts_with_default_text() {
        let desktop = Arc::new(FakeDesktop::default());
        let drafter = EmailDrafter::new(desktop.clone(), UiPacing::none());

        let result = drafter.draft(None).await.unwrap();
        assert_eq!(result, "Email draft created");
        assert_eq!(
            desktop.calls(),
            vec![
                DesktopCall::LaunchApp(DesktopApp::Mail),
                DesktopCall::PressKeys("command+n".to_string()),
                DesktopCall::PasteText(DEFAULT_DRAFT.to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn drafts_with_given_text() {
        let desktop = Arc::new(FakeDesktop::default());
        let drafter = EmailDrafter::new(desktop.clone(), UiPacing::none());

        drafter.draft(Some("Hello Bob")).await.unwrap();
        assert_eq!(
            desktop.calls().last(),
            Some(&DesktopCall::PasteText("Hello Bob".to_string()))
        );
    }
}
