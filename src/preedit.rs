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

//! Preedit visibility and its start/changed/end signals.

use std::ops::Range;

use crate::host::InputSignals;

/// Visibility of the in-progress composition.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PreeditState {
    visible: bool,
    text: String,
}

impl PreeditState {
    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// Replace the preedit with `text` and emit the signals for the
    /// resulting visibility transition:
    ///
    /// - hidden to visible: `preedit-start`, `preedit-changed`
    /// - visible to hidden: `preedit-changed`, `preedit-end`
    /// - visible to visible: `preedit-changed`
    /// - hidden to hidden: nothing
    pub fn update(&mut self, text: &str, signals: &mut dyn InputSignals) {
        let visible = !text.is_empty();
        self.text.clear();
        self.text.push_str(text);
        tracing::debug!(visible, "preedit");

        match (self.visible, visible) {
            (false, true) => {
                self.visible = true;
                signals.preedit_start();
                signals.preedit_changed();
            }
            (true, false) => {
                self.visible = false;
                signals.preedit_changed();
                signals.preedit_end();
            }
            (true, true) => signals.preedit_changed(),
            (false, false) => {}
        }
    }

    /// What the toolkit should draw right now.
    pub fn snapshot(&self) -> Preedit {
        if self.visible {
            Preedit {
                cursor: self.text.chars().count(),
                text: self.text.clone(),
            }
        } else {
            Preedit::default()
        }
    }
}

/// The preedit string as reported to the toolkit.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Preedit {
    pub text: String,
    /// Cursor position, in characters.
    pub cursor: usize,
}

impl Preedit {
    /// Byte range to underline, if any.
    pub fn underline(&self) -> Option<Range<usize>> {
        if self.text.is_empty() {
            None
        } else {
            Some(0..self.text.len())
        }
    }
}
