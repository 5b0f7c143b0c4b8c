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

//! What a [`Context`](crate::Context) needs from the hosting toolkit.
//!
//! Each toolkit version implements [`HostEvents`] once, so the dispatcher
//! never branches on the toolkit.

use crate::classify::{classify, ModifierTable, RawKeyEvent};
use crate::keyboard::{EventMarker, KeyRequest};
use crate::Error;

/// The host event adapter: reading, re-injecting and translating raw events.
pub trait HostEvents {
    type Event: RawKeyEvent;

    /// How this toolkit spells its modifiers.
    fn modifier_table(&self) -> &ModifierTable;

    fn classify(&self, event: &Self::Event) -> Option<KeyRequest> {
        classify(event, self.modifier_table())
    }

    /// Hand `event` back to the host's own queue, stamped with `marker`.
    ///
    /// The scancode, modifiers and timing of the original event must be
    /// preserved. Events which already carry [`EventMarker::HANDLED`] are
    /// rejected with [`Error::AlreadyMarked`].
    fn reinject(&mut self, event: &Self::Event, marker: EventMarker) -> Result<(), Error>;

    /// Translate the key through the toolkit keymap.
    fn key_to_char(&self, event: &Self::Event) -> Option<char>;
}

/// Notifications delivered to the focused text field.
///
/// The preedit signals must be forwarded in the order they are called.
pub trait InputSignals {
    fn commit(&mut self, text: &str);

    fn preedit_start(&mut self);

    fn preedit_changed(&mut self);

    fn preedit_end(&mut self);

    /// The engine switched input language; refresh layout indicators.
    fn layout_changed(&mut self) {}
}
