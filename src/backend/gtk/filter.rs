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
use crate::keyboard::EventMarker;
use crate::Error;

/// GTK 4 re-filtering through `gtk_im_context_filter_key`.
///
/// GTK builds a fresh event from the parts we pass in: press/release,
/// surface, device, time, keycode, modifier state and group. The group is
/// always passed as 0.
#[derive(Debug, Default)]
pub struct FilterKeyQueue {
    pending: VecDeque<GdkKeyEvent>,
}

impl FilterKeyQueue {
    pub fn new() -> Self {
        FilterKeyQueue::default()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

impl HostEvents for FilterKeyQueue {
    type Event = GdkKeyEvent;

    fn modifier_table(&self) -> &ModifierTable {
        &GDK_MODIFIERS
    }

    fn reinject(&mut self, event: &GdkKeyEvent, marker: EventMarker) -> Result<(), Error> {
        let state = marker.stamp(event.state)?;
        tracing::trace!(code = event.hardware_keycode, ?marker, "gtk_im_context_filter_key");
        self.pending.push_back(GdkKeyEvent {
            kind: event.kind,
            hardware_keycode: event.hardware_keycode,
            keyval: event.keyval,
            state,
            group: 0,
            time: event.time,
            num_lock: event.num_lock,
        });
        Ok(())
    }

    fn key_to_char(&self, event: &GdkKeyEvent) -> Option<char> {
        keyval_to_unicode(event.keyval)
    }
}

impl EventQueue for FilterKeyQueue {
    fn pop(&mut self) -> Option<GdkKeyEvent> {
        self.pending.pop_front()
    }
}
