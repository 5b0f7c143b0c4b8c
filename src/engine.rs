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

//! The boundary to the external composition engine.

use crate::{Config, ModifierSet};

bitflags::bitflags! {
    /// Result of a single engine call.
    ///
    /// Flags are independent and any combination may be returned, so
    /// callers must test each flag rather than match on the value.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    #[repr(transparent)]
    pub struct InputResult: u32 {
        const CONSUMED = 0b1;
        const LANGUAGE_CHANGED = 0b10;
        const HAS_PREEDIT = 0b100;
        const HAS_COMMIT = 0b1000;
        /// The engine is still initializing. No other flag can be trusted.
        const NOT_READY = 0b10000;
    }
}

impl InputResult {
    #[inline]
    pub fn is_consumed(self) -> bool {
        self.contains(InputResult::CONSUMED)
    }

    #[inline]
    pub fn is_ready(self) -> bool {
        !self.contains(InputResult::NOT_READY)
    }
}

/// The operations the external composition engine must provide.
///
/// An engine value is the handle: it is created with [`InputEngine::new`]
/// and destroyed when dropped.
///
/// The string views borrow the engine, so they cannot be held across a
/// further call into it.
pub trait InputEngine {
    fn new(config: &Config) -> Self
    where
        Self: Sized;

    fn press_key(&mut self, config: &Config, code: u16, modifiers: ModifierSet) -> InputResult;

    /// Text the engine has finalized and not yet cleared.
    fn commit_str(&self) -> &str;

    /// Text still being composed.
    fn preedit_str(&self) -> &str;

    /// Finish the current composition, appending it to the commit string.
    fn clear_preedit(&mut self);

    fn clear_commit(&mut self);

    /// Drop the commit string without delivering it.
    fn flush(&mut self);

    fn reset(&mut self);

    /// Refresh whatever layout indicator the engine keeps outside the process.
    fn update_layout_state(&mut self);

    /// Returns `true` once asynchronous initialization has finished.
    fn check_ready(&mut self) -> bool;

    /// Complete the readiness rendezvous, returning the result of any input
    /// which was queued while the engine was not ready.
    fn end_ready(&mut self) -> InputResult;
}

/// Exclusive owner of one engine handle.
///
/// Strings are copied out before any other engine call is made.
pub struct EngineClient<E: InputEngine> {
    engine: E,
}

impl<E: InputEngine> EngineClient<E> {
    pub fn new(config: &Config) -> Self {
        tracing::debug!("creating engine");
        EngineClient {
            engine: E::new(config),
        }
    }

    /// Wrap an engine which has already been created.
    pub fn from_engine(engine: E) -> Self {
        EngineClient { engine }
    }

    pub fn press_key(&mut self, config: &Config, code: u16, modifiers: ModifierSet) -> InputResult {
        let result = self.engine.press_key(config, code, modifiers);
        tracing::trace!(code, ?modifiers, ?result, "press_key");
        result
    }

    /// Copy the commit string into `buf`, replacing its contents.
    pub fn read_commit(&self, buf: &mut String) {
        buf.clear();
        buf.push_str(self.engine.commit_str());
    }

    /// Copy the preedit string into `buf`, replacing its contents.
    pub fn read_preedit(&self, buf: &mut String) {
        buf.clear();
        buf.push_str(self.engine.preedit_str());
    }

    pub fn has_preedit(&self) -> bool {
        !self.engine.preedit_str().is_empty()
    }

    pub fn clear_preedit(&mut self) {
        self.engine.clear_preedit();
    }

    pub fn clear_commit(&mut self) {
        self.engine.clear_commit();
    }

    pub fn flush(&mut self) {
        self.engine.flush();
    }

    pub fn reset(&mut self) {
        self.engine.reset();
    }

    pub fn update_layout_state(&mut self) {
        self.engine.update_layout_state();
    }

    pub fn check_ready(&mut self) -> bool {
        self.engine.check_ready()
    }

    pub fn end_ready(&mut self) -> InputResult {
        let result = self.engine.end_ready();
        tracing::debug!(?result, "end_ready");
        result
    }

    /// The wrapped engine.
    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut E {
        &mut self.engine
    }
}

impl<E: InputEngine> Drop for EngineClient<E> {
    fn drop(&mut self) {
        tracing::debug!("destroying engine");
    }
}
