//! Input router: one-shot and persistent subscriptions keyed by [`EventKind`].
//!
//! Dispatch is synchronous and runs subscribers in registration order. The
//! set of subscribers is fixed when a dispatch starts: subscriptions added by
//! a callback run from the next dispatch on, while removals (including a
//! one-shot firing) take effect immediately, so a removed subscriber never
//! runs later in the same dispatch.
//!
//! Callbacks get an [`EventContext`] that dereferences to the dispatch target
//! and can queue subscribe/unsubscribe requests. The context does not expose
//! the router itself, so a callback cannot re-enter the dispatch that is
//! running it.

use crate::input::{EventKind, InputEvent};
use std::fmt;
use std::ops::{Deref, DerefMut};

/// Handle returned by `subscribe`, used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

/// A subscriber's verdict on the host's default handling of the event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Propagation {
    /// No opinion.
    #[default]
    Unset,
    /// Explicitly let the host apply its default behaviour.
    Allow,
    /// Explicitly block the host's default behaviour.
    Suppress,
}

impl Propagation {
    /// Combine two verdicts: `Suppress` wins over `Allow`, which wins over `Unset`.
    #[must_use]
    pub const fn merge(self, other: Self) -> Self {
        match (self, other) {
            (Self::Suppress, _) | (_, Self::Suppress) => Self::Suppress,
            (Self::Allow, _) | (_, Self::Allow) => Self::Allow,
            _ => Self::Unset,
        }
    }

    /// Resolve to "apply the host default?" given the fallback for `Unset`.
    #[must_use]
    pub const fn allows_default(self, fallback: bool) -> bool {
        match self {
            Self::Unset => fallback,
            Self::Allow => true,
            Self::Suppress => false,
        }
    }
}

impl From<bool> for Propagation {
    /// `true` allows the host default, `false` suppresses it.
    fn from(allow: bool) -> Self {
        if allow { Self::Allow } else { Self::Suppress }
    }
}

/// Boxed subscriber callback.
pub type Callback<C> = Box<dyn FnMut(&mut EventContext<'_, C>, &InputEvent) -> Propagation>;

struct Subscription<C> {
    id: SubscriptionId,
    kind: EventKind,
    one_shot: bool,
    // `None` only while the callback is running.
    callback: Option<Callback<C>>,
}

enum RouterOp<C> {
    Subscribe(Subscription<C>),
    Unsubscribe(EventKind, SubscriptionId),
}

/// What a running callback can see and do.
pub struct EventContext<'a, C> {
    target: &'a mut C,
    next_id: &'a mut u64,
    ops: Vec<RouterOp<C>>,
}

impl<C> EventContext<'_, C> {
    /// The object the event was dispatched against.
    pub fn target(&mut self) -> &mut C {
        self.target
    }

    /// Register a subscriber; it runs from the next dispatch on.
    pub fn subscribe<F>(&mut self, kind: EventKind, one_shot: bool, callback: F) -> SubscriptionId
    where
        F: FnMut(&mut EventContext<'_, C>, &InputEvent) -> Propagation + 'static,
    {
        let id = next_subscription_id(self.next_id);
        self.ops.push(RouterOp::Subscribe(Subscription {
            id,
            kind,
            one_shot,
            callback: Some(Box::new(callback)),
        }));
        id
    }

    /// Remove a subscriber as soon as the current callback returns.
    pub fn unsubscribe(&mut self, kind: EventKind, id: SubscriptionId) {
        self.ops.push(RouterOp::Unsubscribe(kind, id));
    }
}

impl<C> Deref for EventContext<'_, C> {
    type Target = C;

    fn deref(&self) -> &C {
        self.target
    }
}

impl<C> DerefMut for EventContext<'_, C> {
    fn deref_mut(&mut self) -> &mut C {
        self.target
    }
}

fn next_subscription_id(counter: &mut u64) -> SubscriptionId {
    let id = SubscriptionId(*counter);
    *counter = counter.wrapping_add(1);
    id
}

/// Registry of subscribers, dispatching against a target of type `C`.
pub struct InputRouter<C> {
    subs: Vec<Subscription<C>>,
    next_id: u64,
}

impl<C> InputRouter<C> {
    pub fn new() -> Self {
        Self {
            subs: Vec::new(),
            next_id: 1,
        }
    }

    /// Register `callback` for `kind`.
    ///
    /// A one-shot subscription removes itself when it fires.
    pub fn subscribe<F>(&mut self, kind: EventKind, one_shot: bool, callback: F) -> SubscriptionId
    where
        F: FnMut(&mut EventContext<'_, C>, &InputEvent) -> Propagation + 'static,
    {
        let id = next_subscription_id(&mut self.next_id);
        self.subs.push(Subscription {
            id,
            kind,
            one_shot,
            callback: Some(Box::new(callback)),
        });
        id
    }

    /// Persistent subscription.
    pub fn on<F>(&mut self, kind: EventKind, callback: F) -> SubscriptionId
    where
        F: FnMut(&mut EventContext<'_, C>, &InputEvent) -> Propagation + 'static,
    {
        self.subscribe(kind, false, callback)
    }

    /// One-shot subscription.
    pub fn once<F>(&mut self, kind: EventKind, callback: F) -> SubscriptionId
    where
        F: FnMut(&mut EventContext<'_, C>, &InputEvent) -> Propagation + 'static,
    {
        self.subscribe(kind, true, callback)
    }

    /// Remove the first registration matching `kind` and `id`.
    ///
    /// Returns whether anything was removed.
    pub fn unsubscribe(&mut self, kind: EventKind, id: SubscriptionId) -> bool {
        match self.subs.iter().position(|s| s.kind == kind && s.id == id) {
            Some(pos) => {
                self.subs.remove(pos);
                true
            }
            None => false,
        }
    }

    /// Number of subscribers registered for `kind`.
    pub fn subscriber_count(&self, kind: EventKind) -> usize {
        self.subs.iter().filter(|s| s.kind == kind).count()
    }

    pub fn len(&self) -> usize {
        self.subs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.subs.is_empty()
    }

    /// Drop every subscription.
    pub fn clear(&mut self) {
        self.subs.clear();
    }

    /// Run the subscribers for `kind` against `target`, merging their verdicts.
    pub fn dispatch(&mut self, target: &mut C, kind: EventKind, event: &InputEvent) -> Propagation {
        let snapshot: Vec<SubscriptionId> = self
            .subs
            .iter()
            .filter(|s| s.kind == kind)
            .map(|s| s.id)
            .collect();

        #[cfg(feature = "tracing")]
        tracing::trace!(?kind, subscribers = snapshot.len(), "dispatch");

        let mut outcome = Propagation::Unset;
        for id in snapshot {
            let Some(pos) = self.position(id) else {
                // Removed by an earlier callback in this dispatch.
                continue;
            };
            let one_shot = self.subs[pos].one_shot;
            let callback = if one_shot {
                self.subs.remove(pos).callback
            } else {
                self.subs[pos].callback.take()
            };
            let Some(mut callback) = callback else {
                continue;
            };

            let mut cx = EventContext {
                target: &mut *target,
                next_id: &mut self.next_id,
                ops: Vec::new(),
            };
            let verdict = callback(&mut cx, event);
            let EventContext { ops, .. } = cx;

            if !one_shot && let Some(pos) = self.position(id) {
                self.subs[pos].callback = Some(callback);
            }
            self.apply(ops);
            outcome = outcome.merge(verdict);
        }
        outcome
    }

    fn position(&self, id: SubscriptionId) -> Option<usize> {
        self.subs.iter().position(|s| s.id == id)
    }

    fn apply(&mut self, ops: Vec<RouterOp<C>>) {
        for op in ops {
            match op {
                RouterOp::Subscribe(sub) => self.subs.push(sub),
                RouterOp::Unsubscribe(kind, id) => {
                    self.unsubscribe(kind, id);
                }
            }
        }
    }
}

impl<C> Default for InputRouter<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C> fmt::Debug for InputRouter<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InputRouter")
            .field("key_down", &self.subscriber_count(EventKind::KeyDown))
            .field("resize", &self.subscriber_count(EventKind::Resize))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::{KeyCode, KeyEvent};

    fn key(code: KeyCode) -> InputEvent {
        InputEvent::Key(KeyEvent::plain(code))
    }

    #[derive(Default)]
    struct Log {
        seen: Vec<&'static str>,
    }

    #[test]
    fn one_shot_fires_once_persistent_fires_every_time() {
        let mut router: InputRouter<Log> = InputRouter::new();
        let mut log = Log::default();
        router.once(EventKind::KeyDown, |cx, _| {
            cx.seen.push("once");
            Propagation::Unset
        });
        router.on(EventKind::KeyDown, |cx, _| {
            cx.seen.push("always");
            Propagation::Unset
        });

        router.dispatch(&mut log, EventKind::KeyDown, &key(KeyCode::UP));
        router.dispatch(&mut log, EventKind::KeyDown, &key(KeyCode::UP));
        assert_eq!(log.seen, vec!["once", "always", "always"]);
        assert_eq!(router.subscriber_count(EventKind::KeyDown), 1);
    }

    #[test]
    fn dispatch_only_reaches_matching_kind() {
        let mut router: InputRouter<Log> = InputRouter::new();
        let mut log = Log::default();
        router.on(EventKind::Resize, |cx, _| {
            cx.seen.push("resize");
            Propagation::Unset
        });
        router.dispatch(&mut log, EventKind::KeyDown, &key(KeyCode::ESC));
        assert!(log.seen.is_empty());
        router.dispatch(&mut log, EventKind::Resize, &InputEvent::Resize { rows: 2, cols: 3 });
        assert_eq!(log.seen, vec!["resize"]);
    }

    #[test]
    fn unsubscribe_removes_and_is_noop_when_missing() {
        let mut router: InputRouter<Log> = InputRouter::new();
        let mut log = Log::default();
        let id = router.on(EventKind::KeyDown, |cx, _| {
            cx.seen.push("x");
            Propagation::Unset
        });
        assert!(!router.unsubscribe(EventKind::Resize, id));
        assert!(router.unsubscribe(EventKind::KeyDown, id));
        assert!(!router.unsubscribe(EventKind::KeyDown, id));
        router.dispatch(&mut log, EventKind::KeyDown, &key(KeyCode::ENTER));
        assert!(log.seen.is_empty());
    }

    #[test]
    fn verdicts_merge_with_suppress_winning() {
        let mut router: InputRouter<()> = InputRouter::new();
        router.on(EventKind::KeyDown, |_, _| Propagation::Allow);
        assert_eq!(
            router.dispatch(&mut (), EventKind::KeyDown, &key(KeyCode::TAB)),
            Propagation::Allow
        );
        router.on(EventKind::KeyDown, |_, _| Propagation::Suppress);
        router.on(EventKind::KeyDown, |_, _| Propagation::Unset);
        assert_eq!(
            router.dispatch(&mut (), EventKind::KeyDown, &key(KeyCode::TAB)),
            Propagation::Suppress
        );
        let mut empty: InputRouter<()> = InputRouter::new();
        assert_eq!(
            empty.dispatch(&mut (), EventKind::KeyDown, &key(KeyCode::TAB)),
            Propagation::Unset
        );
    }

    #[test]
    fn subscriptions_added_during_dispatch_run_next_time() {
        let mut router: InputRouter<Log> = InputRouter::new();
        let mut log = Log::default();
        router.once(EventKind::KeyDown, |cx, _| {
            cx.seen.push("first");
            cx.subscribe(EventKind::KeyDown, true, |cx, _| {
                cx.seen.push("chained");
                Propagation::Unset
            });
            Propagation::Unset
        });
        router.dispatch(&mut log, EventKind::KeyDown, &key(KeyCode::HOME));
        assert_eq!(log.seen, vec!["first"]);
        router.dispatch(&mut log, EventKind::KeyDown, &key(KeyCode::HOME));
        assert_eq!(log.seen, vec!["first", "chained"]);
        assert!(router.is_empty());
    }

    #[test]
    fn removal_during_dispatch_skips_later_subscriber() {
        let mut router: InputRouter<Log> = InputRouter::new();
        let mut log = Log::default();
        // Ids are allocated sequentially, so the second subscription gets the next id.
        let victim_id = SubscriptionId(router.next_id + 1);
        router.on(EventKind::KeyDown, move |cx, _| {
            cx.seen.push("remover");
            cx.unsubscribe(EventKind::KeyDown, victim_id);
            Propagation::Unset
        });
        let id = router.on(EventKind::KeyDown, |cx, _| {
            cx.seen.push("victim");
            Propagation::Unset
        });
        assert_eq!(id, victim_id);
        router.dispatch(&mut log, EventKind::KeyDown, &key(KeyCode::END));
        assert_eq!(log.seen, vec!["remover"]);
    }

    #[test]
    fn persistent_callback_can_unsubscribe_itself() {
        let mut router: InputRouter<Log> = InputRouter::new();
        let mut log = Log::default();
        let self_id = SubscriptionId(router.next_id);
        router.on(EventKind::KeyDown, move |cx, _| {
            cx.seen.push("bye");
            cx.unsubscribe(EventKind::KeyDown, self_id);
            Propagation::Unset
        });
        router.dispatch(&mut log, EventKind::KeyDown, &key(KeyCode::LEFT));
        router.dispatch(&mut log, EventKind::KeyDown, &key(KeyCode::LEFT));
        assert_eq!(log.seen, vec!["bye"]);
    }

    #[test]
    fn callback_state_persists_between_dispatches() {
        let mut router: InputRouter<u32> = InputRouter::new();
        let mut total = 0u32;
        let mut calls = 0u32;
        router.on(EventKind::KeyDown, move |cx, _| {
            calls += 1;
            *cx.target() = calls;
            Propagation::Unset
        });
        for _ in 0..3 {
            router.dispatch(&mut total, EventKind::KeyDown, &key(KeyCode::DOWN));
        }
        assert_eq!(total, 3);
    }

    #[test]
    fn bool_converts_to_explicit_verdict() {
        assert_eq!(Propagation::from(true), Propagation::Allow);
        assert_eq!(Propagation::from(false), Propagation::Suppress);
        assert!(Propagation::Unset.allows_default(true));
        assert!(!Propagation::Unset.allows_default(false));
        assert!(!Propagation::Suppress.allows_default(true));
    }
}
