//! Handoff document rendering
//!
//! The callback responds with a small HTML page whose sole job is to post
//! the structured handoff message to the window that opened the popup,
//! restricted to the same origin, and then close itself. This page is the
//! only channel by which the credential crosses from the relay's response
//! context into the client application.

use larkwire_domain::{HandoffMessage, LarkwireError, Result};

/// Render the handoff document embedding `message`
///
/// The payload is embedded as serialized JSON, with `<` escaped so token
/// or profile text can never terminate the script element.
///
/// # Errors
/// Returns `LarkwireError::Internal` if the message cannot be serialized.
pub fn render(message: &HandoffMessage) -> Result<String> {
    let payload = serde_json::to_string(message)
        .map_err(|e| LarkwireError::Internal(format!("failed to serialize handoff: {e}")))?
        .replace('<', "\\u003c");

    Ok(format!(
        r#"<!DOCTYPE html>
<html>
<head>
  <title>Authentication</title>
</head>
<body>
  <script>
    var message = {payload};
    if (window.opener) {{
      window.opener.postMessage(message, window.location.origin);
    }}
    window.close();
  </script>
  <p>Authentication successful! This window will close automatically.</p>
</body>
</html>
"#
    ))
}
