// src/page/render.rs
use super::ElementState;
use std::io::Write;
use tokio::sync::watch;

/// One terminal line for an element state, colored with ANSI escapes.
pub fn format_line(state: &ElementState) -> String {
    let stamp = state
        .updated_at
        .map(|t| t.format("%Y-%m-%d %H:%M:%S UTC").to_string())
        .unwrap_or_else(|| "-".to_string());
    format!(
        "[{}] \x1b[{}m{}\x1b[0m",
        stamp,
        state.color.ansi_code(),
        state.text
    )
}

/// Writes a line every time the element changes, until its owner is gone.
pub async fn render_changes<W: Write>(mut rx: watch::Receiver<ElementState>, mut out: W) {
    while rx.changed().await.is_ok() {
        let line = format_line(&rx.borrow_and_update());
        if let Err(e) = writeln!(out, "{}", line).and_then(|_| out.flush()) {
            tracing::warn!(%e, "failed to render status line");
            return;
        }
    }
}
