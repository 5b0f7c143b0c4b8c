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

//! Normalizing toolkit key events.

use crate::keyboard::{EventMarker, KeyRequest, KeyState, ModifierSet};

/// Read access to a raw key event, as delivered by a toolkit.
pub trait RawKeyEvent {
    fn key_state(&self) -> KeyState;

    fn hardware_keycode(&self) -> u16;

    /// The toolkit's modifier word.
    fn modifier_state(&self) -> u32;

    /// The word carrying our private [`EventMarker`] bits.
    ///
    /// For GTK this is the modifier word itself.
    fn marker_state(&self) -> u32 {
        self.modifier_state()
    }

    /// NumLock as reported by the input device, for toolkits which do not
    /// carry it in the modifier word.
    fn device_num_lock(&self) -> bool {
        false
    }
}

/// Which toolkit modifier bits map to which engine modifier.
///
/// Bits which do not appear here (CapsLock, raw Mod2 to Mod5, ...) are
/// ignored.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ModifierTable {
    pub shift: u32,
    pub control: u32,
    pub alt: u32,
    pub super_: u32,
    /// Zero when NumLock has to be read from the device instead.
    pub num_lock: u32,
}

impl ModifierTable {
    /// Map the Shift/Control/Alt/Super bits of a toolkit modifier word.
    pub fn map(&self, state: u32) -> ModifierSet {
        let mut set = ModifierSet::empty();
        for (mask, flag) in [
            (self.shift, ModifierSet::SHIFT),
            (self.control, ModifierSet::CONTROL),
            (self.alt, ModifierSet::ALT),
            (self.super_, ModifierSet::SUPER),
        ] {
            if mask != 0 && state & mask != 0 {
                set |= flag;
            }
        }
        set
    }

    fn num_lock<K: RawKeyEvent + ?Sized>(&self, event: &K) -> bool {
        if self.num_lock != 0 {
            event.modifier_state() & self.num_lock != 0
        } else {
            event.device_num_lock()
        }
    }
}

/// Turn a raw event into a [`KeyRequest`].
///
/// Returns `None` for anything but a key press; those events are always
/// forwarded untouched.
pub fn classify<K: RawKeyEvent + ?Sized>(event: &K, table: &ModifierTable) -> Option<KeyRequest> {
    if event.key_state() != KeyState::Down {
        return None;
    }

    let mut modifiers = table.map(event.modifier_state());
    if table.num_lock(event) {
        modifiers |= ModifierSet::NUMLOCK;
    }

    let marker = EventMarker::from_state(event.marker_state());

    Some(KeyRequest {
        code: event.hardware_keycode(),
        modifiers,
        redelivered: marker.contains(EventMarker::HANDLED),
        bypass: marker.contains(EventMarker::BYPASS),
    })
}
