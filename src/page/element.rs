// src/page/element.rs
use chrono::{DateTime, Utc};
use std::fmt;
use tokio::sync::watch;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Color {
    #[default]
    Default,
    Green,
    Red,
}

impl Color {
    pub fn as_str(self) -> &'static str {
        match self {
            Color::Default => "inherit",
            Color::Green => "green",
            Color::Red => "red",
        }
    }

    /// ANSI SGR foreground code for terminal rendering.
    pub fn ansi_code(self) -> &'static str {
        match self {
            Color::Default => "39",
            Color::Green => "32",
            Color::Red => "31",
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ElementState {
    pub text: String,
    pub color: Color,
    pub updated_at: Option<DateTime<Utc>>,
}

/// A single text node with a foreground color.
///
/// Every write replaces the whole state, so concurrent writers never
/// interleave text from one with the color of another.
#[derive(Debug)]
pub struct StatusElement {
    id: String,
    state: watch::Sender<ElementState>,
}

impl StatusElement {
    pub fn new(id: &str) -> Self {
        let (state, _) = watch::channel(ElementState::default());
        Self {
            id: id.to_string(),
            state,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn text(&self) -> String {
        self.state.borrow().text.clone()
    }

    pub fn color(&self) -> Color {
        self.state.borrow().color
    }

    pub fn snapshot(&self) -> ElementState {
        self.state.borrow().clone()
    }

    pub fn set(&self, text: impl Into<String>, color: Color) {
        self.state.send_replace(ElementState {
            text: text.into(),
            color,
            updated_at: Some(Utc::now()),
        });
    }

    /// Receiver that is notified on every write, for renderers.
    pub fn subscribe(&self) -> watch::Receiver<ElementState> {
        self.state.subscribe()
    }
}
