// Copyright 2024 The Hangul Bridge Authors.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! The per-text-field input context and its key dispatcher.
//!
//! A key press that touches the preedit is dispatched twice. The first pass
//! feeds the engine, delivers any commit, then stamps the raw event and
//! hands it back to the host queue, answering "handled". The second pass,
//! recognized by its stamp, only emits the preedit signals and, if the
//! engine declined the key, tries the toolkit's own character path.
//!
//! Some toolkits cannot take a preedit visibility change inside the same
//! dispatch that decides whether the key was consumed; splitting the work
//! keeps both answers correct.

use std::collections::VecDeque;
use std::rc::Rc;

use crate::config::{Config, ReadyPolicy};
use crate::engine::{EngineClient, InputEngine, InputResult};
use crate::host::{HostEvents, InputSignals};
use crate::keyboard::{EventMarker, KeyRequest, ModifierSet};
use crate::preedit::{Preedit, PreeditState};

/// Whether the engine's results can be trusted yet.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReadyState {
    Ready,
    /// The engine reported `NOT_READY`; forced resets are not allowed until
    /// a rendezvous succeeds.
    AwaitingReady,
}

/// What became of a key event.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Disposition {
    /// Swallowed by the engine.
    Consumed,
    /// Not ours; the host should process the raw event.
    Forward,
    /// Committed as text through the toolkit keymap.
    Committed,
    /// Re-injected; the rest happens on the second pass.
    Deferred,
}

impl Disposition {
    /// The value to return from the toolkit's filter callback.
    #[inline]
    pub fn handled(self) -> bool {
        !matches!(self, Disposition::Forward)
    }
}

/// Input state for one text field.
pub struct Context<E: InputEngine> {
    pub(crate) engine: EngineClient<E>,
    pub(crate) config: Rc<Config>,
    pub(crate) preedit: PreeditState,
    pub(crate) commit_buf: String,
    preedit_buf: String,
    pub(crate) ready: ReadyState,
    pub(crate) has_focus: bool,
    /// Scancodes of re-injected events whose second pass has not arrived,
    /// oldest first. Only used for diagnostics.
    pub(crate) pending_trips: VecDeque<u16>,
}

impl<E: InputEngine> Context<E> {
    /// Create a context together with its engine.
    pub fn new(config: Rc<Config>) -> Self {
        let engine = EngineClient::new(&config);
        Self::with_engine(engine, config)
    }

    pub fn with_engine(engine: EngineClient<E>, config: Rc<Config>) -> Self {
        Context {
            engine,
            config,
            preedit: PreeditState::default(),
            commit_buf: String::new(),
            preedit_buf: String::new(),
            ready: ReadyState::Ready,
            has_focus: false,
            pending_trips: VecDeque::new(),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn ready_state(&self) -> ReadyState {
        self.ready
    }

    pub fn has_focus(&self) -> bool {
        self.has_focus
    }

    pub fn is_preedit_visible(&self) -> bool {
        self.preedit.is_visible()
    }

    /// The preedit string to report to the toolkit.
    pub fn preedit(&self) -> Preedit {
        self.preedit.snapshot()
    }

    pub fn engine(&self) -> &E {
        self.engine.engine()
    }

    /// Decide what to do with a raw key event.
    pub fn filter_keypress<H, S>(
        &mut self,
        host: &mut H,
        signals: &mut S,
        event: &H::Event,
    ) -> Disposition
    where
        H: HostEvents,
        S: InputSignals,
    {
        let Some(req) = host.classify(event) else {
            return Disposition::Forward;
        };

        if req.redelivered {
            // A stamped event never reaches the engine again, even when the
            // trip it belongs to was dropped by a reset or overtaken by
            // another key.
            match self.pending_trips.pop_front() {
                Some(code) if code != req.code => {
                    tracing::warn!(expected = code, got = req.code, "second pass for a different key");
                }
                Some(_) => {}
                None => tracing::debug!(code = req.code, "second pass without a recorded trip"),
            }
            // preedit change can't be mixed with the commit of the first pass
            self.sync_preedit(signals);
            return if req.bypass {
                self.commit_event(host, signals, event, req.modifiers)
            } else {
                Disposition::Consumed
            };
        }

        self.dispatch(host, signals, event, req)
    }

    fn dispatch<H, S>(
        &mut self,
        host: &mut H,
        signals: &mut S,
        event: &H::Event,
        req: KeyRequest,
    ) -> Disposition
    where
        H: HostEvents,
        S: InputSignals,
    {
        let mut result = self
            .engine
            .press_key(&self.config, req.code, req.modifiers);

        if !result.is_ready() {
            match self.await_ready() {
                Some(ready) => result = ready,
                None => return Disposition::Forward,
            }
        }

        let consumed = result.is_consumed();
        self.apply_result(result, signals);

        if result.contains(InputResult::HAS_PREEDIT) || self.preedit.is_visible() {
            match host.reinject(event, EventMarker::for_trip(consumed)) {
                Ok(()) => {
                    tracing::trace!(code = req.code, consumed, "trip");
                    self.pending_trips.push_back(req.code);
                    // never forward here
                    return Disposition::Deferred;
                }
                Err(err) => {
                    tracing::warn!(%err, "could not re-inject key, updating preedit in place");
                }
            }
            self.sync_preedit(signals);
        }

        if consumed {
            Disposition::Consumed
        } else {
            self.commit_event(host, signals, event, req.modifiers)
        }
    }

    /// Handle `NOT_READY` according to the configured policy.
    fn await_ready(&mut self) -> Option<InputResult> {
        self.ready = ReadyState::AwaitingReady;
        match self.config.ready_policy() {
            ReadyPolicy::Deferred => {
                tracing::debug!("engine not ready, forwarding key");
                None
            }
            ReadyPolicy::Bounded { attempts } => {
                for _ in 0..attempts {
                    if self.engine.check_ready() {
                        return self.end_ready();
                    }
                }
                tracing::debug!(attempts, "engine still not ready, forwarding key");
                None
            }
        }
    }

    /// Complete the rendezvous after `check_ready` succeeded.
    pub(crate) fn end_ready(&mut self) -> Option<InputResult> {
        let result = self.engine.end_ready();
        if result.is_ready() {
            self.ready = ReadyState::Ready;
            Some(result)
        } else {
            None
        }
    }

    /// Language change and commit handling shared by key presses and the
    /// readiness rendezvous.
    pub(crate) fn apply_result<S: InputSignals>(&mut self, result: InputResult, signals: &mut S) {
        if result.contains(InputResult::LANGUAGE_CHANGED) {
            self.engine.update_layout_state();
            signals.layout_changed();
        }

        if result.contains(InputResult::HAS_COMMIT) {
            self.engine.read_commit(&mut self.commit_buf);
            self.flush_commit(signals);
            self.engine.clear_commit();
        }
    }

    /// Emit the commit buffer, unless it is empty.
    pub(crate) fn flush_commit<S: InputSignals>(&mut self, signals: &mut S) {
        // Some toolkits take an empty commit as the end of composition
        if self.commit_buf.is_empty() {
            return;
        }

        if self.config.log_commit_text() {
            tracing::debug!(len = self.commit_buf.len(), text = %self.commit_buf, "commit");
        } else {
            tracing::debug!(len = self.commit_buf.len(), "commit");
        }

        signals.commit(&self.commit_buf);
        self.commit_buf.clear();
    }

    pub(crate) fn sync_preedit<S: InputSignals>(&mut self, signals: &mut S) {
        self.engine.read_preedit(&mut self.preedit_buf);
        self.preedit.update(&self.preedit_buf, signals);
    }

    /// Commit the key's own character, for applications which would not
    /// insert it themselves.
    fn commit_event<H, S>(
        &mut self,
        host: &H,
        signals: &mut S,
        event: &H::Event,
        modifiers: ModifierSet,
    ) -> Disposition
    where
        H: HostEvents,
        S: InputSignals,
    {
        if !self.config.commit_english() || !modifiers.is_text_input() {
            return Disposition::Forward;
        }

        match host.key_to_char(event) {
            Some(c) if !c.is_control() => {
                self.commit_buf.clear();
                self.commit_buf.push(c);
                self.flush_commit(signals);
                Disposition::Committed
            }
            _ => Disposition::Forward,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_util::{context, HostQueue, ScriptedEngine, Signal, SignalLog, TestKey};

    static_assertions::assert_not_impl_any!(Context<ScriptedEngine>: Sync, Send);

    const KEY_A: u16 = 38;
    const KEY_R: u16 = 27;

    #[test_log::test]
    fn plain_key_without_preedit_commits_natively() {
        let mut ctx = context(Config::default());
        ctx.engine.engine_mut().respond(KEY_A, InputResult::empty());
        let mut host = HostQueue::default();
        let mut log = SignalLog::default();

        let disposition = ctx.filter_keypress(&mut host, &mut log, &TestKey::press(KEY_A, 'a'));

        assert_eq!(disposition, Disposition::Committed);
        assert_eq!(log.take(), [Signal::Commit("a".into())]);
        assert!(host.is_empty());
    }

    #[test_log::test]
    fn preedit_is_deferred_to_second_pass() {
        let mut ctx = context(Config::default());
        ctx.engine
            .engine_mut()
            .respond(KEY_R, InputResult::CONSUMED | InputResult::HAS_PREEDIT)
            .with_preedit("ㄱ");
        let mut host = HostQueue::default();
        let mut log = SignalLog::default();

        let first = ctx.filter_keypress(&mut host, &mut log, &TestKey::press(KEY_R, 'r'));
        assert_eq!(first, Disposition::Deferred);
        assert!(first.handled());
        assert!(log.take().is_empty());
        assert!(!ctx.is_preedit_visible());

        let redelivered = host.pop().unwrap();
        assert!(host.is_empty());
        let second = ctx.filter_keypress(&mut host, &mut log, &redelivered);
        assert_eq!(second, Disposition::Consumed);
        assert_eq!(log.take(), [Signal::PreeditStart, Signal::PreeditChanged]);
        assert_eq!(ctx.preedit().text, "ㄱ");
        assert!(host.is_empty());
        assert_eq!(ctx.engine().press_count(), 1);
    }

    #[test_log::test]
    fn visible_preedit_trips_even_without_new_preedit() {
        let mut ctx = context(Config::default());
        let mut host = HostQueue::default();
        let mut log = SignalLog::default();
        ctx.engine
            .engine_mut()
            .respond(KEY_R, InputResult::CONSUMED | InputResult::HAS_PREEDIT)
            .with_preedit("가");
        let first = ctx.filter_keypress(&mut host, &mut log, &TestKey::press(KEY_R, 'r'));
        assert_eq!(first, Disposition::Deferred);
        let ev = host.pop().unwrap();
        ctx.filter_keypress(&mut host, &mut log, &ev);
        log.take();

        // space: engine commits the syllable and declines the key
        ctx.engine
            .engine_mut()
            .respond(65, InputResult::HAS_COMMIT)
            .with_commit("가")
            .with_preedit("");
        let first = ctx.filter_keypress(&mut host, &mut log, &TestKey::press(65, ' '));
        assert_eq!(first, Disposition::Deferred);
        assert_eq!(log.take(), [Signal::Commit("가".into())]);

        let ev = host.pop().unwrap();
        assert!(ev.marker().contains(EventMarker::BYPASS));
        let second = ctx.filter_keypress(&mut host, &mut log, &ev);
        assert_eq!(second, Disposition::Committed);
        assert_eq!(
            log.take(),
            [
                Signal::PreeditChanged,
                Signal::PreeditEnd,
                Signal::Commit(" ".into())
            ]
        );
    }

    #[test]
    fn empty_commit_is_suppressed() {
        let mut ctx = context(Config::default());
        ctx.engine
            .engine_mut()
            .respond(KEY_A, InputResult::CONSUMED | InputResult::HAS_COMMIT)
            .with_commit("");
        let mut host = HostQueue::default();
        let mut log = SignalLog::default();

        let disposition = ctx.filter_keypress(&mut host, &mut log, &TestKey::press(KEY_A, 'a'));
        assert_eq!(disposition, Disposition::Consumed);
        assert!(log.take().is_empty());
        assert_eq!(ctx.engine().clear_commit_count(), 1);
    }

    #[test]
    fn commit_then_preedit_in_one_result() {
        let mut ctx = context(Config::default());
        ctx.engine
            .engine_mut()
            .respond(
                KEY_R,
                InputResult::CONSUMED | InputResult::HAS_COMMIT | InputResult::HAS_PREEDIT,
            )
            .with_commit("가")
            .with_preedit("ㄱ");
        let mut host = HostQueue::default();
        let mut log = SignalLog::default();

        ctx.filter_keypress(&mut host, &mut log, &TestKey::press(KEY_R, 'r'));
        assert_eq!(log.take(), [Signal::Commit("가".into())]);
        let ev = host.pop().unwrap();
        ctx.filter_keypress(&mut host, &mut log, &ev);
        assert_eq!(log.take(), [Signal::PreeditStart, Signal::PreeditChanged]);
    }

    #[test]
    fn shortcuts_are_forwarded() {
        let mut ctx = context(Config::default());
        ctx.engine.engine_mut().respond(KEY_A, InputResult::empty());
        let mut host = HostQueue::default();
        let mut log = SignalLog::default();

        let key = TestKey::press(KEY_A, 'a').with_mods(TestKey::CONTROL);
        let disposition = ctx.filter_keypress(&mut host, &mut log, &key);
        assert_eq!(disposition, Disposition::Forward);
        assert!(!disposition.handled());
        assert!(log.take().is_empty());
    }

    #[test]
    fn control_characters_are_forwarded() {
        let mut ctx = context(Config::default());
        ctx.engine.engine_mut().respond(22, InputResult::empty());
        let mut host = HostQueue::default();
        let mut log = SignalLog::default();

        let disposition =
            ctx.filter_keypress(&mut host, &mut log, &TestKey::press(22, '\u{8}'));
        assert_eq!(disposition, Disposition::Forward);
        assert!(log.take().is_empty());
    }

    #[test]
    fn english_commit_can_be_disabled() {
        let mut ctx = context(Config::builder().commit_english(false).build());
        ctx.engine.engine_mut().respond(KEY_A, InputResult::empty());
        let mut host = HostQueue::default();
        let mut log = SignalLog::default();

        let disposition = ctx.filter_keypress(&mut host, &mut log, &TestKey::press(KEY_A, 'a'));
        assert_eq!(disposition, Disposition::Forward);
    }

    #[test]
    fn key_releases_are_forwarded_untouched() {
        let mut ctx = context(Config::default());
        let mut host = HostQueue::default();
        let mut log = SignalLog::default();

        let disposition = ctx.filter_keypress(&mut host, &mut log, &TestKey::release(KEY_A));
        assert_eq!(disposition, Disposition::Forward);
        assert_eq!(ctx.engine().press_count(), 0);
    }

    #[test_log::test]
    fn stamped_event_never_reaches_engine() {
        let mut ctx = context(Config::default());
        ctx.engine.engine_mut().set_preedit("ㄱ");
        let mut host = HostQueue::default();
        let mut log = SignalLog::default();

        let stray = TestKey::press(KEY_R, 'r').stamped(EventMarker::HANDLED);
        let disposition = ctx.filter_keypress(&mut host, &mut log, &stray);

        assert_eq!(disposition, Disposition::Consumed);
        assert!(host.is_empty());
        assert_eq!(log.take(), [Signal::PreeditStart, Signal::PreeditChanged]);
        assert_eq!(ctx.engine().press_count(), 0);
    }

    #[test_log::test]
    fn keys_queued_ahead_of_their_copies_are_pressed_once() {
        let mut ctx = context(Config::default());
        let engine = ctx.engine.engine_mut();
        engine
            .respond(KEY_R, InputResult::CONSUMED | InputResult::HAS_PREEDIT)
            .with_preedit("ㄱ");
        engine
            .respond(KEY_A, InputResult::CONSUMED | InputResult::HAS_PREEDIT)
            .with_preedit("가");
        let mut host = HostQueue::default();
        let mut log = SignalLog::default();

        // both physical keys arrive before either copy comes back
        let first = ctx.filter_keypress(&mut host, &mut log, &TestKey::press(KEY_R, 'r'));
        let second = ctx.filter_keypress(&mut host, &mut log, &TestKey::press(KEY_A, 'a'));
        assert_eq!((first, second), (Disposition::Deferred, Disposition::Deferred));
        assert!(log.take().is_empty());

        let mut passes = 0;
        while let Some(ev) = host.pop() {
            passes += 1;
            assert_eq!(ctx.filter_keypress(&mut host, &mut log, &ev), Disposition::Consumed);
        }

        assert_eq!(passes, 2);
        assert_eq!(ctx.engine().press_count(), 2);
        assert_eq!(
            log.take(),
            [
                Signal::PreeditStart,
                Signal::PreeditChanged,
                Signal::PreeditChanged
            ]
        );
        assert_eq!(ctx.preedit().text, "가");
        assert!(ctx.pending_trips.is_empty());
    }

    #[test]
    fn refused_reinjection_updates_preedit_in_place() {
        let mut ctx = context(Config::default());
        ctx.engine
            .engine_mut()
            .respond(KEY_R, InputResult::CONSUMED | InputResult::HAS_PREEDIT)
            .with_preedit("ㄱ");
        let mut host = HostQueue::closed();
        let mut log = SignalLog::default();

        let disposition = ctx.filter_keypress(&mut host, &mut log, &TestKey::press(KEY_R, 'r'));
        assert_eq!(disposition, Disposition::Consumed);
        assert_eq!(log.take(), [Signal::PreeditStart, Signal::PreeditChanged]);
    }

    #[test]
    fn each_press_takes_at_most_two_passes() {
        let mut ctx = context(Config::default());
        ctx.engine
            .engine_mut()
            .respond(KEY_R, InputResult::CONSUMED | InputResult::HAS_PREEDIT)
            .with_preedit("ㄱ");
        let mut host = HostQueue::default();
        let mut log = SignalLog::default();

        let mut passes = 1;
        ctx.filter_keypress(&mut host, &mut log, &TestKey::press(KEY_R, 'r'));
        while let Some(ev) = host.pop() {
            passes += 1;
            ctx.filter_keypress(&mut host, &mut log, &ev);
        }
        assert_eq!(passes, 2);
    }

    #[test]
    fn language_change_refreshes_layout() {
        let mut ctx = context(Config::default());
        ctx.engine
            .engine_mut()
            .respond(100, InputResult::CONSUMED | InputResult::LANGUAGE_CHANGED);
        let mut host = HostQueue::default();
        let mut log = SignalLog::default();

        let disposition = ctx.filter_keypress(&mut host, &mut log, &TestKey::press(100, 'x'));
        assert_eq!(disposition, Disposition::Consumed);
        assert_eq!(log.take(), [Signal::LayoutChanged]);
        assert_eq!(ctx.engine().layout_updates(), 1);
    }

    #[test_log::test]
    fn not_ready_forwards_without_touching_state() {
        let mut ctx = context(Config::default());
        ctx.engine
            .engine_mut()
            .respond(KEY_R, InputResult::NOT_READY | InputResult::HAS_COMMIT)
            .with_commit("x");
        let mut host = HostQueue::default();
        let mut log = SignalLog::default();

        let disposition = ctx.filter_keypress(&mut host, &mut log, &TestKey::press(KEY_R, 'r'));
        assert_eq!(disposition, Disposition::Forward);
        assert_eq!(ctx.ready_state(), ReadyState::AwaitingReady);
        assert!(log.take().is_empty());
        assert!(host.is_empty());
    }

    #[test]
    fn bounded_policy_polls_and_continues() {
        let mut ctx = context(
            Config::builder()
                .ready_policy(ReadyPolicy::Bounded { attempts: 3 })
                .build(),
        );
        let engine = ctx.engine.engine_mut();
        engine.respond(KEY_A, InputResult::NOT_READY);
        engine.ready_after(2);
        engine.on_end_ready(InputResult::CONSUMED | InputResult::HAS_COMMIT, "a");
        let mut host = HostQueue::default();
        let mut log = SignalLog::default();

        let disposition = ctx.filter_keypress(&mut host, &mut log, &TestKey::press(KEY_A, 'a'));
        assert_eq!(disposition, Disposition::Consumed);
        assert_eq!(ctx.ready_state(), ReadyState::Ready);
        assert_eq!(log.take(), [Signal::Commit("a".into())]);
    }

    #[test]
    fn bounded_policy_gives_up() {
        let mut ctx = context(
            Config::builder()
                .ready_policy(ReadyPolicy::Bounded { attempts: 2 })
                .build(),
        );
        let engine = ctx.engine.engine_mut();
        engine.respond(KEY_A, InputResult::NOT_READY);
        engine.ready_after(5);
        let mut host = HostQueue::default();
        let mut log = SignalLog::default();

        let disposition = ctx.filter_keypress(&mut host, &mut log, &TestKey::press(KEY_A, 'a'));
        assert_eq!(disposition, Disposition::Forward);
        assert_eq!(ctx.ready_state(), ReadyState::AwaitingReady);
        assert_eq!(ctx.engine().ready_polls(), 2);
    }
}
