//! Collaborators the overlay drives: the rendering surface and the host page.

use crate::overlay::prompts::{format_minutes, format_seconds};
use crate::settings::ResolvedTheme;

/// Everything a surface needs to render one pause.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OverlayView {
    /// Normalized domain being paused.
    pub domain: String,
    /// Countdown length in seconds.
    pub pause_seconds: u32,
    /// Unlock length granted by "continue", in minutes.
    pub unlock_minutes: u32,
    /// Palette to render with.
    pub theme: ResolvedTheme,
    /// Reflection prompt for this presentation.
    pub prompt: &'static str,
}

impl OverlayView {
    /// Short line describing the pause, e.g. "Take 10 seconds before reddit.com".
    pub fn headline(&self) -> String {
        format!("Take {} before {}", format_seconds(self.pause_seconds), self.domain)
    }

    /// Line describing what "continue" grants.
    pub fn unlock_hint(&self) -> String {
        format!(
            "Continuing unlocks {} for {}",
            self.domain,
            format_minutes(self.unlock_minutes)
        )
    }
}

/// Isolated rendering surface injected into the host page.
///
/// Implementations report removals they did not cause by calling
/// [`NudgeManager::on_surface_removed`](crate::manager::NudgeManager::on_surface_removed).
pub trait Surface: Send + Sync {
    /// Show the overlay with the countdown at `view.pause_seconds` and
    /// "continue" present but disabled.
    fn present(&self, view: &OverlayView);

    /// Show the countdown value. Zero is rendered as blank.
    fn update_countdown(&self, remaining_seconds: u32);

    /// Enable the "continue" action.
    fn enable_continue(&self);

    /// Remove the overlay from the page.
    fn dismiss(&self);
}

/// The page context hosting the overlay.
pub trait Host: Send + Sync {
    /// Hostname of the current page.
    fn hostname(&self) -> String;

    /// Whether the host prefers a dark color scheme.
    fn prefers_dark(&self) -> bool {
        false
    }

    /// Ask the privileged context to close this tab. Fire-and-forget.
    fn request_close_tab(&self);
}
