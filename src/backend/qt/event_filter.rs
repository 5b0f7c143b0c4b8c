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

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use super::QtInputContext;
use crate::engine::InputEngine;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MouseEventKind {
    ButtonPress,
    ButtonRelease,
    ButtonDblClick,
    Move,
}

/// The parts of a `QMouseEvent` the filter looks at.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct QtMouseEvent {
    pub kind: MouseEventKind,
    /// `Qt::MouseButton`.
    pub button: u32,
}

/// Application-wide event filter that commits every live composition when
/// a mouse button goes down.
///
/// Qt gives the input context no pointer events of its own, so this is
/// installed on the application object.
pub struct ButtonEventFilter<E: InputEngine> {
    contexts: Vec<Weak<RefCell<QtInputContext<E>>>>,
}

impl<E: InputEngine> Default for ButtonEventFilter<E> {
    fn default() -> Self {
        ButtonEventFilter {
            contexts: Vec::new(),
        }
    }
}

impl<E: InputEngine> ButtonEventFilter<E> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, ctx: &Rc<RefCell<QtInputContext<E>>>) {
        self.contexts.push(Rc::downgrade(ctx));
    }

    pub fn remove(&mut self, ctx: &Rc<RefCell<QtInputContext<E>>>) {
        let ctx = Rc::downgrade(ctx);
        self.contexts.retain(|c| !c.ptr_eq(&ctx));
    }

    /// Number of contexts still alive.
    pub fn len(&self) -> usize {
        self.contexts
            .iter()
            .filter(|c| c.strong_count() > 0)
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// `eventFilter`. Never swallows the event.
    pub fn event_filter(&mut self, event: &QtMouseEvent) -> bool {
        if event.kind != MouseEventKind::ButtonPress {
            return false;
        }

        // contexts dropped since the last press
        self.contexts.retain(|c| c.strong_count() > 0);
        for ctx in self.contexts.iter().filter_map(Weak::upgrade) {
            match ctx.try_borrow_mut() {
                Ok(mut ctx) => ctx.button_press(event.button),
                Err(_) => tracing::warn!("input context busy, not resetting"),
            }
        }
        false
    }
}
