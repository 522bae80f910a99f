//! Input session: a [`Screen`] plus the router that feeds it events.
//!
//! Hosts call [`Session::key_down`] for every key press and
//! [`Session::layout_changed`] whenever the container may have changed size.
//! Subscribers receive the screen as their dispatch target, so a handler can
//! draw directly:
//!
//! ```ignore
//! session.ongetch(|cx, event| {
//!     if let Some(key) = event.key() {
//!         let _ = cx.addstr(&key.code.name());
//!     }
//!     Propagation::Unset
//! });
//! ```

use crate::config::ScreenConfig;
use crate::error::Result;
use crate::screen::Screen;
use crate::surface::{GlyphSource, Surface};
use glyphgrid_core::{
    EventContext, EventKind, InputEvent, InputRouter, KeyEvent, Propagation, SubscriptionId,
};

pub struct Session<S, G> {
    screen: Screen<S, G>,
    router: InputRouter<Screen<S, G>>,
}

impl<S: Surface, G: GlyphSource> Session<S, G> {
    pub fn new(screen: Screen<S, G>) -> Self {
        Self {
            screen,
            router: InputRouter::new(),
        }
    }

    pub fn from_config(config: ScreenConfig, surface: S, source: G) -> Result<Self> {
        Ok(Self::new(Screen::new(config, surface, source)?))
    }

    pub fn screen(&self) -> &Screen<S, G> {
        &self.screen
    }

    pub fn screen_mut(&mut self) -> &mut Screen<S, G> {
        &mut self.screen
    }

    pub fn router(&self) -> &InputRouter<Screen<S, G>> {
        &self.router
    }

    pub fn into_screen(self) -> Screen<S, G> {
        self.screen
    }

    // ── Subscriptions ───────────────────────────────────────────────

    pub fn on<F>(&mut self, kind: EventKind, callback: F) -> SubscriptionId
    where
        F: FnMut(&mut EventContext<'_, Screen<S, G>>, &InputEvent) -> Propagation + 'static,
    {
        self.router.on(kind, callback)
    }

    pub fn once<F>(&mut self, kind: EventKind, callback: F) -> SubscriptionId
    where
        F: FnMut(&mut EventContext<'_, Screen<S, G>>, &InputEvent) -> Propagation + 'static,
    {
        self.router.once(kind, callback)
    }

    pub fn off(&mut self, kind: EventKind, id: SubscriptionId) -> bool {
        self.router.unsubscribe(kind, id)
    }

    /// Run `callback` on the next key press (or relayout) only.
    pub fn getch<F>(&mut self, callback: F) -> SubscriptionId
    where
        F: FnMut(&mut EventContext<'_, Screen<S, G>>, &InputEvent) -> Propagation + 'static,
    {
        self.router.once(EventKind::KeyDown, callback)
    }

    /// Run `callback` on every key press (and relayout).
    pub fn ongetch<F>(&mut self, callback: F) -> SubscriptionId
    where
        F: FnMut(&mut EventContext<'_, Screen<S, G>>, &InputEvent) -> Propagation + 'static,
    {
        self.router.on(EventKind::KeyDown, callback)
    }

    /// Remove a `getch` / `ongetch` subscription.
    pub fn ungetch(&mut self, id: SubscriptionId) -> bool {
        self.router.unsubscribe(EventKind::KeyDown, id)
    }

    // ── Host events ─────────────────────────────────────────────────

    /// Route a key press. Returns whether the host should apply its own
    /// default handling.
    ///
    /// Modifier-only keys reach no subscriber. Without an explicit verdict,
    /// defaults apply unless the screen is in raw mode.
    pub fn key_down(&mut self, key: KeyEvent) -> bool {
        let fallback = !self.screen.is_raw();
        if key.code.is_modifier() {
            return fallback;
        }

        #[cfg(feature = "tracing")]
        tracing::trace!(code = key.code.0, mods = key.mods.bits(), "key down");

        let verdict = self
            .router
            .dispatch(&mut self.screen, EventKind::KeyDown, &InputEvent::Key(key));
        // A handler may have toggled raw mode; the fallback is the mode the
        // key arrived in.
        verdict.allows_default(fallback)
    }

    /// React to the container now offering `px_width` x `px_height` pixels.
    ///
    /// Returns the new `(rows, cols)` if the screen was resized. Resize
    /// subscribers run first, then key-down subscribers, both with
    /// [`InputEvent::Resize`].
    pub fn layout_changed(&mut self, px_width: u32, px_height: u32) -> Option<(u16, u16)> {
        let (rows, cols) = self.screen.fit_to(px_width, px_height);
        if (rows, cols) == (self.screen.rows(), self.screen.cols()) {
            return None;
        }
        self.resize_and_notify(rows, cols);
        Some((rows, cols))
    }

    /// Replay a recorded event: keys go through [`key_down`](Self::key_down),
    /// resizes apply their size, raised to the configured minimums, whatever
    /// the auto-size flags say. Returns the default-handling decision for
    /// keys and `true` for resizes.
    pub fn replay(&mut self, event: &InputEvent) -> bool {
        match *event {
            InputEvent::Key(key) => self.key_down(key),
            InputEvent::Resize { rows, cols } => {
                let config = self.screen.config();
                let rows = rows.max(config.min_height);
                let cols = cols.max(config.min_width);
                if (rows, cols) != (self.screen.rows(), self.screen.cols()) {
                    self.resize_and_notify(rows, cols);
                }
                true
            }
        }
    }

    fn resize_and_notify(&mut self, rows: u16, cols: u16) {
        #[cfg(feature = "tracing")]
        tracing::debug!(rows, cols, "layout resize");

        self.screen.resize(rows, cols);
        let event = InputEvent::Resize { rows, cols };
        self.router.dispatch(&mut self.screen, EventKind::Resize, &event);
        self.router.dispatch(&mut self.screen, EventKind::KeyDown, &event);
    }
}

impl<S, G> std::fmt::Debug for Session<S, G> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("screen", &self.screen)
            .field("router", &self.router)
            .finish()
    }
}
