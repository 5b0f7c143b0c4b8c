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

//! Keyboard types.

pub use keyboard_types::{KeyState, Modifiers};

use crate::Error;

bitflags::bitflags! {
    /// The modifier set understood by the composition engine.
    ///
    /// The bit values are the engine's own; toolkit modifier words are
    /// translated into this set by the [classifier](crate::classify).
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    #[repr(transparent)]
    pub struct ModifierSet: u32 {
        const CONTROL = 0b1;
        const SUPER = 0b10;
        const SHIFT = 0b100;
        const ALT = 0b1000;
        const NUMLOCK = 0b10000;
    }
}

impl ModifierSet {
    /// Modifiers which make a key press a shortcut rather than text.
    pub const NOT_TEXT: ModifierSet = ModifierSet::ALT
        .union(ModifierSet::CONTROL)
        .union(ModifierSet::SUPER);

    /// Returns `true` if a key pressed with these modifiers can produce
    /// plain text, i.e. only Shift and NumLock are held.
    #[inline]
    pub fn is_text_input(self) -> bool {
        !self.intersects(Self::NOT_TEXT)
    }
}

impl From<ModifierSet> for Modifiers {
    fn from(set: ModifierSet) -> Modifiers {
        let mut mods = Modifiers::empty();
        mods.set(Modifiers::SHIFT, set.contains(ModifierSet::SHIFT));
        mods.set(Modifiers::CONTROL, set.contains(ModifierSet::CONTROL));
        mods.set(Modifiers::ALT, set.contains(ModifierSet::ALT));
        mods.set(Modifiers::SUPER, set.contains(ModifierSet::SUPER));
        mods.set(Modifiers::NUM_LOCK, set.contains(ModifierSet::NUMLOCK));
        mods
    }
}

bitflags::bitflags! {
    /// Private bits stamped on a raw event before it is handed back to the
    /// host queue.
    ///
    /// These live in the toolkit's own modifier word, outside the bits that
    /// applications look at.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct EventMarker: u32 {
        /// The event is the second pass of a two-phase dispatch.
        const HANDLED = 1 << 25;
        /// The engine did not consume the key; try the native commit path.
        const BYPASS = 1 << 24;
    }
}

impl EventMarker {
    /// Read the marker out of a toolkit modifier word.
    #[inline]
    pub fn from_state(state: u32) -> EventMarker {
        EventMarker::from_bits_truncate(state)
    }

    /// Stamp this marker onto `state`.
    ///
    /// A word that already carries [`EventMarker::HANDLED`] is rejected, so a
    /// given key press can never be queued for a third pass.
    pub fn stamp(self, state: u32) -> Result<u32, Error> {
        if EventMarker::from_state(state).contains(EventMarker::HANDLED) {
            return Err(Error::AlreadyMarked);
        }
        Ok(state | self.bits())
    }

    /// The marker to use for a trip, given whether the engine consumed the key.
    pub fn for_trip(consumed: bool) -> EventMarker {
        if consumed {
            EventMarker::HANDLED
        } else {
            EventMarker::HANDLED | EventMarker::BYPASS
        }
    }
}

/// A key press, normalized independently of the toolkit that delivered it.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct KeyRequest {
    /// Hardware scancode.
    pub code: u16,
    /// Engine modifiers held during the press.
    pub modifiers: ModifierSet,
    /// The event was stamped by us and is being delivered a second time.
    pub redelivered: bool,
    /// The first pass saw the engine decline the key.
    pub bypass: bool,
}
