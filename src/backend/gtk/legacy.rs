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

use std::collections::VecDeque;

use super::{keyval_to_unicode, EventQueue, GdkKeyEvent, GDK_MODIFIERS};
use crate::classify::ModifierTable;
use crate::host::HostEvents;
use crate::keyboard::{EventMarker, KeyRequest, ModifierSet};
use crate::Error;

/// The GDK 2/3 event queue, fed with `gdk_event_put`.
#[derive(Debug, Default)]
pub struct LegacyEventQueue {
    events: VecDeque<GdkKeyEvent>,
    // GTK 2 has no way to ask the device
    num_lock: bool,
}

impl LegacyEventQueue {
    pub fn gtk2() -> Self {
        LegacyEventQueue {
            events: VecDeque::new(),
            num_lock: false,
        }
    }

    pub fn gtk3() -> Self {
        LegacyEventQueue {
            events: VecDeque::new(),
            num_lock: true,
        }
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

impl HostEvents for LegacyEventQueue {
    type Event = GdkKeyEvent;

    fn modifier_table(&self) -> &ModifierTable {
        &GDK_MODIFIERS
    }

    fn classify(&self, event: &GdkKeyEvent) -> Option<KeyRequest> {
        let mut req = crate::classify::classify(event, &GDK_MODIFIERS)?;
        if !self.num_lock {
            req.modifiers.remove(ModifierSet::NUMLOCK);
        }
        Some(req)
    }

    fn reinject(&mut self, event: &GdkKeyEvent, marker: EventMarker) -> Result<(), Error> {
        let state = marker.stamp(event.state)?;
        tracing::trace!(code = event.hardware_keycode, ?marker, "gdk_event_put");
        // gdk_event_put takes a copy
        self.events.push_back(GdkKeyEvent {
            state,
            ..event.clone()
        });
        Ok(())
    }

    fn key_to_char(&self, event: &GdkKeyEvent) -> Option<char> {
        keyval_to_unicode(event.keyval)
    }
}

impl EventQueue for LegacyEventQueue {
    fn pop(&mut self) -> Option<GdkKeyEvent> {
        self.events.pop_front()
    }
}
