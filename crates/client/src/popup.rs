//! Popup window driving
//!
//! The session manager opens the authorization page in a separate window
//! and needs to observe (coarsely) whether that window is still open, and
//! to force-close it on timeout or supersede. Embedding shells with real
//! window handles implement [`PopupDriver`]; the default [`SystemBrowser`]
//! driver launches the system browser, where neither observation nor
//! closing is possible and the watchdog remains the effective bound.

use larkwire_domain::{LarkwireError, Result};
use tracing::info;

/// Handle on an opened login window
pub trait PopupHandle: Send + Sync {
    /// Whether the user has closed the window
    fn is_closed(&self) -> bool;

    /// Force-close the window if it is still open
    fn close(&self);
}

/// Opens login windows for authorization attempts
pub trait PopupDriver: Send + Sync {
    /// Open `url` in a new window sized for an interactive login
    ///
    /// # Errors
    /// Returns an error if the window cannot be opened.
    fn open(&self, url: &str) -> Result<Box<dyn PopupHandle>>;
}

/// Driver that delegates to the operating system's default browser
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemBrowser;

impl PopupDriver for SystemBrowser {
    fn open(&self, url: &str) -> Result<Box<dyn PopupHandle>> {
        open::that(url)
            .map_err(|e| LarkwireError::Internal(format!("failed to open browser: {e}")))?;

        info!("opened authorization page in system browser");
        Ok(Box::new(DetachedWindow))
    }
}

// A tab in an external browser cannot be observed or closed from here.
struct DetachedWindow;

impl PopupHandle for DetachedWindow {
    fn is_closed(&self) -> bool {
        false
    }

    fn close(&self) {}
}
