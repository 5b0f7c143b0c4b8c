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

//! Scripted engine and recording host shared by the unit tests.

use std::cell::Cell;
use std::collections::{HashMap, VecDeque};
use std::rc::Rc;

use crate::classify::{ModifierTable, RawKeyEvent};
use crate::engine::{EngineClient, InputEngine, InputResult};
use crate::host::{HostEvents, InputSignals};
use crate::keyboard::{EventMarker, KeyState, ModifierSet};
use crate::{Config, Context, Error};

pub(crate) fn context(config: Config) -> Context<ScriptedEngine> {
    Context::with_engine(
        EngineClient::from_engine(ScriptedEngine::default()),
        Rc::new(config),
    )
}

/// What the engine does when a given scancode is pressed.
#[derive(Clone, Debug, Default)]
pub(crate) struct Response {
    result: InputResult,
    commit: Option<String>,
    preedit: Option<String>,
}

impl Response {
    pub(crate) fn with_commit(&mut self, text: &str) -> &mut Self {
        self.commit = Some(text.into());
        self
    }

    pub(crate) fn with_preedit(&mut self, text: &str) -> &mut Self {
        self.preedit = Some(text.into());
        self
    }
}

/// An engine that replays canned responses and counts calls.
#[derive(Default)]
pub(crate) struct ScriptedEngine {
    responses: HashMap<u16, Response>,
    commit: String,
    preedit: String,
    ready_after: Option<u32>,
    end_ready: Option<(InputResult, String)>,
    presses: u32,
    polls: u32,
    clear_commits: u32,
    clear_preedits: u32,
    flushes: u32,
    resets: u32,
    layout_updates: u32,
    drops: Rc<Cell<u32>>,
}

impl ScriptedEngine {
    pub(crate) fn respond(&mut self, code: u16, result: InputResult) -> &mut Response {
        let response = self.responses.entry(code).or_default();
        *response = Response {
            result,
            ..Response::default()
        };
        response
    }

    /// `check_ready` succeeds on the `polls`-th call.
    pub(crate) fn ready_after(&mut self, polls: u32) {
        self.ready_after = Some(polls);
    }

    pub(crate) fn on_end_ready(&mut self, result: InputResult, commit: &str) {
        self.end_ready = Some((result, commit.into()));
    }

    pub(crate) fn set_commit(&mut self, text: &str) {
        self.commit = text.into();
    }

    pub(crate) fn set_preedit(&mut self, text: &str) {
        self.preedit = text.into();
    }

    pub(crate) fn drop_counter(&self) -> Rc<Cell<u32>> {
        self.drops.clone()
    }

    pub(crate) fn press_count(&self) -> u32 {
        self.presses
    }

    pub(crate) fn ready_polls(&self) -> u32 {
        self.polls
    }

    pub(crate) fn clear_commit_count(&self) -> u32 {
        self.clear_commits
    }

    pub(crate) fn clear_preedit_count(&self) -> u32 {
        self.clear_preedits
    }

    pub(crate) fn flush_count(&self) -> u32 {
        self.flushes
    }

    pub(crate) fn reset_count(&self) -> u32 {
        self.resets
    }

    pub(crate) fn layout_updates(&self) -> u32 {
        self.layout_updates
    }
}

impl InputEngine for ScriptedEngine {
    fn new(_config: &Config) -> Self {
        ScriptedEngine::default()
    }

    fn press_key(&mut self, _config: &Config, code: u16, _modifiers: ModifierSet) -> InputResult {
        self.presses += 1;
        let Some(response) = self.responses.get(&code) else {
            return InputResult::empty();
        };
        if let Some(commit) = &response.commit {
            self.commit = commit.clone();
        }
        if let Some(preedit) = &response.preedit {
            self.preedit = preedit.clone();
        }
        response.result
    }

    fn commit_str(&self) -> &str {
        &self.commit
    }

    fn preedit_str(&self) -> &str {
        &self.preedit
    }

    fn clear_preedit(&mut self) {
        self.clear_preedits += 1;
        let preedit = std::mem::take(&mut self.preedit);
        self.commit.push_str(&preedit);
    }

    fn clear_commit(&mut self) {
        self.clear_commits += 1;
        self.commit.clear();
    }

    fn flush(&mut self) {
        self.flushes += 1;
        self.commit.clear();
    }

    fn reset(&mut self) {
        self.resets += 1;
        self.commit.clear();
        self.preedit.clear();
    }

    fn update_layout_state(&mut self) {
        self.layout_updates += 1;
    }

    fn check_ready(&mut self) -> bool {
        self.polls += 1;
        self.ready_after.map_or(true, |after| self.polls >= after)
    }

    fn end_ready(&mut self) -> InputResult {
        match self.end_ready.take() {
            Some((result, commit)) => {
                self.commit = commit;
                result
            }
            None => InputResult::empty(),
        }
    }
}

impl Drop for ScriptedEngine {
    fn drop(&mut self) {
        self.drops.set(self.drops.get() + 1);
    }
}

/// A raw key event with GDK-like modifier bits.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct TestKey {
    state: KeyState,
    code: u16,
    ch: Option<char>,
    mods: u32,
}

impl TestKey {
    pub(crate) const SHIFT: u32 = 1 << 0;
    pub(crate) const CONTROL: u32 = 1 << 2;

    pub(crate) fn press(code: u16, ch: char) -> TestKey {
        TestKey {
            state: KeyState::Down,
            code,
            ch: Some(ch),
            mods: 0,
        }
    }

    pub(crate) fn release(code: u16) -> TestKey {
        TestKey {
            state: KeyState::Up,
            code,
            ch: None,
            mods: 0,
        }
    }

    pub(crate) fn with_mods(mut self, mods: u32) -> TestKey {
        self.mods |= mods;
        self
    }

    pub(crate) fn stamped(mut self, marker: EventMarker) -> TestKey {
        self.mods |= marker.bits();
        self
    }

    pub(crate) fn marker(&self) -> EventMarker {
        EventMarker::from_state(self.mods)
    }
}

impl RawKeyEvent for TestKey {
    fn key_state(&self) -> KeyState {
        self.state
    }

    fn hardware_keycode(&self) -> u16 {
        self.code
    }

    fn modifier_state(&self) -> u32 {
        self.mods
    }
}

const TEST_TABLE: ModifierTable = ModifierTable {
    shift: TestKey::SHIFT,
    control: TestKey::CONTROL,
    alt: 1 << 3,
    super_: 1 << 26,
    num_lock: 0,
};

/// A host event queue which records re-injected events.
#[derive(Default)]
pub(crate) struct HostQueue {
    queue: VecDeque<TestKey>,
    closed: bool,
}

impl HostQueue {
    pub(crate) fn closed() -> HostQueue {
        HostQueue {
            queue: VecDeque::new(),
            closed: true,
        }
    }

    pub(crate) fn pop(&mut self) -> Option<TestKey> {
        self.queue.pop_front()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}

impl HostEvents for HostQueue {
    type Event = TestKey;

    fn modifier_table(&self) -> &ModifierTable {
        &TEST_TABLE
    }

    fn reinject(&mut self, event: &TestKey, marker: EventMarker) -> Result<(), Error> {
        if self.closed {
            return Err(Error::QueueClosed);
        }
        let mods = marker.stamp(event.mods)?;
        self.queue.push_back(TestKey {
            mods,
            ..event.clone()
        });
        Ok(())
    }

    fn key_to_char(&self, event: &TestKey) -> Option<char> {
        event.ch
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum Signal {
    Commit(String),
    PreeditStart,
    PreeditChanged,
    PreeditEnd,
    LayoutChanged,
}

/// Records signals in emission order.
#[derive(Default)]
pub(crate) struct SignalLog(Vec<Signal>);

impl SignalLog {
    pub(crate) fn take(&mut self) -> Vec<Signal> {
        std::mem::take(&mut self.0)
    }
}

impl InputSignals for SignalLog {
    fn commit(&mut self, text: &str) {
        self.0.push(Signal::Commit(text.into()));
    }

    fn preedit_start(&mut self) {
        self.0.push(Signal::PreeditStart);
    }

    fn preedit_changed(&mut self) {
        self.0.push(Signal::PreeditChanged);
    }

    fn preedit_end(&mut self) {
        self.0.push(Signal::PreeditEnd);
    }

    fn layout_changed(&mut self) {
        self.0.push(Signal::LayoutChanged);
    }
}
