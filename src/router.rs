//! Screen navigation contract
//!
//! The game core never touches the page directly; it asks a [`ViewRouter`]
//! to show or hide whole screens.

/// Top-level screens of the page
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Home,
    Game,
    GameOver,
}

impl Screen {
    /// CSS selector of the screen's root element
    pub fn selector(&self) -> &'static str {
        match self {
            Screen::Home => ".home",
            Screen::Game => ".game",
            Screen::GameOver => ".gameOver",
        }
    }
}

/// Shows and hides screens
pub trait ViewRouter {
    fn show(&mut self, screen: Screen);
    fn hide(&mut self, screen: Screen);
}
