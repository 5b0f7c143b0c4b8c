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

//! Focus, reset and readiness handling for [`Context`].

use crate::context::{Context, ReadyState};
use crate::engine::InputEngine;
use crate::host::InputSignals;
use crate::mouse::ButtonEvent;

impl<E: InputEngine> Context<E> {
    /// The text field gained focus.
    ///
    /// This is also where the readiness rendezvous completes: if an earlier
    /// key press found the engine initializing, it is polled once here.
    pub fn focus_in<S: InputSignals>(&mut self, signals: &mut S) {
        tracing::debug!("focus_in");
        self.has_focus = true;
        self.engine.update_layout_state();

        if self.ready == ReadyState::Ready || !self.engine.check_ready() {
            return;
        }

        if let Some(result) = self.end_ready() {
            self.apply_result(result, signals);
            // no event to re-inject here
            self.sync_preedit(signals);
        }
    }

    /// The text field lost focus: commit whatever is being composed.
    pub fn focus_out<S: InputSignals>(&mut self, signals: &mut S) {
        tracing::debug!("focus_out");
        self.has_focus = false;
        self.force_reset(signals);
    }

    /// Explicit reset request from the toolkit.
    pub fn reset<S: InputSignals>(&mut self, signals: &mut S) {
        tracing::debug!("reset");
        self.force_reset(signals);
    }

    /// A pointer button was pressed inside the client widget.
    ///
    /// Users expect the composition to be committed when they click
    /// elsewhere in the same field.
    pub fn button_press<S: InputSignals>(&mut self, event: &ButtonEvent, signals: &mut S) {
        if !self.config.reset_on_button_press() || !event.interrupts_composition() {
            return;
        }
        tracing::debug!(button = ?event.button, "button");
        self.force_reset(signals);
    }

    /// Throw the composition away without committing it, e.g. because the
    /// text field it belongs to went away.
    pub fn cancel<S: InputSignals>(&mut self, signals: &mut S) {
        if self.ready != ReadyState::Ready {
            return;
        }
        tracing::debug!("cancel");
        self.pending_trips.clear();
        self.engine.flush();
        self.engine.reset();
        self.commit_buf.clear();
        self.sync_preedit(signals);
    }

    /// Commit the preedit and reset the engine.
    ///
    /// Resetting an engine which is still initializing is undefined, so
    /// this does nothing until the engine is ready.
    fn force_reset<S: InputSignals>(&mut self, signals: &mut S) {
        if self.ready != ReadyState::Ready {
            tracing::debug!("engine not ready, skipping reset");
            return;
        }

        self.pending_trips.clear();
        self.engine.clear_preedit();
        self.engine.read_commit(&mut self.commit_buf);
        self.flush_commit(signals);
        self.engine.reset();
        self.sync_preedit(signals);
    }
}
