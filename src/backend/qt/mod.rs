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

//! Qt5 platform input context bridge.
//!
//! Qt has no preedit signals. Everything the application sees is a
//! `QInputMethodEvent` sent to the focus object, carrying a preedit string,
//! a commit string, or both.

mod event_filter;

pub use event_filter::{ButtonEventFilter, MouseEventKind, QtMouseEvent};

use std::collections::VecDeque;
use std::rc::Rc;

use crate::classify::{ModifierTable, RawKeyEvent};
use crate::engine::InputEngine;
use crate::host::{HostEvents, InputSignals};
use crate::keyboard::{EventMarker, KeyState};
use crate::mouse::{ButtonEvent, MouseButton};
use crate::preedit::Preedit;
use crate::{Config, Context, Error};

pub const QT_SHIFT_MODIFIER: u32 = 0x0200_0000;
pub const QT_CONTROL_MODIFIER: u32 = 0x0400_0000;
pub const QT_ALT_MODIFIER: u32 = 0x0800_0000;
pub const QT_META_MODIFIER: u32 = 0x1000_0000;
/// Set for keys on the keypad; used as the NumLock state.
pub const QT_KEYPAD_MODIFIER: u32 = 0x2000_0000;

pub const QT_MODIFIERS: ModifierTable = ModifierTable {
    shift: QT_SHIFT_MODIFIER,
    control: QT_CONTROL_MODIFIER,
    alt: QT_ALT_MODIFIER,
    super_: QT_META_MODIFIER,
    num_lock: QT_KEYPAD_MODIFIER,
};

/// A `QKeyEvent`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct QtKeyEvent {
    pub kind: KeyState,
    pub native_scan_code: u32,
    /// `Qt::KeyboardModifiers`.
    pub modifiers: u32,
    /// `nativeModifiers()`, which carries our marker bits since the
    /// `Qt::KeyboardModifiers` word is fully allocated.
    pub native_modifiers: u32,
    pub text: String,
}

impl QtKeyEvent {
    pub fn press(native_scan_code: u32, modifiers: u32, text: &str) -> QtKeyEvent {
        QtKeyEvent {
            kind: KeyState::Down,
            native_scan_code,
            modifiers,
            native_modifiers: 0,
            text: text.to_owned(),
        }
    }

    pub fn release(native_scan_code: u32, modifiers: u32) -> QtKeyEvent {
        QtKeyEvent {
            kind: KeyState::Up,
            text: String::new(),
            ..QtKeyEvent::press(native_scan_code, modifiers, "")
        }
    }
}

impl RawKeyEvent for QtKeyEvent {
    fn key_state(&self) -> KeyState {
        self.kind
    }

    fn hardware_keycode(&self) -> u16 {
        // the engine takes 16-bit scancodes
        self.native_scan_code as u16
    }

    fn modifier_state(&self) -> u32 {
        self.modifiers
    }

    fn marker_state(&self) -> u32 {
        self.native_modifiers
    }
}

/// Key events re-posted with `QCoreApplication::postEvent`.
#[derive(Debug, Default)]
pub struct QtEventQueue {
    posted: VecDeque<QtKeyEvent>,
}

impl QtEventQueue {
    pub fn len(&self) -> usize {
        self.posted.len()
    }

    pub fn is_empty(&self) -> bool {
        self.posted.is_empty()
    }

    pub fn pop(&mut self) -> Option<QtKeyEvent> {
        self.posted.pop_front()
    }
}

impl HostEvents for QtEventQueue {
    type Event = QtKeyEvent;

    fn modifier_table(&self) -> &ModifierTable {
        &QT_MODIFIERS
    }

    fn reinject(&mut self, event: &QtKeyEvent, marker: EventMarker) -> Result<(), Error> {
        let native_modifiers = marker.stamp(event.native_modifiers)?;
        tracing::trace!(code = event.native_scan_code, ?marker, "postEvent");
        self.posted.push_back(QtKeyEvent {
            native_modifiers,
            ..event.clone()
        });
        Ok(())
    }

    fn key_to_char(&self, event: &QtKeyEvent) -> Option<char> {
        let mut chars = event.text.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Some(c),
            _ => None,
        }
    }
}

/// A `QInputMethodEvent::Attribute`. Positions are in UTF-16 code units.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Attribute {
    /// An underlined span of the preedit.
    TextFormat { start: usize, length: usize },
    Cursor { position: usize },
}

/// A `QInputMethodEvent`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct InputMethodEvent {
    pub preedit: String,
    pub attributes: Vec<Attribute>,
    pub commit: String,
}

impl InputMethodEvent {
    pub fn commit(text: &str) -> InputMethodEvent {
        InputMethodEvent {
            commit: text.to_owned(),
            ..InputMethodEvent::default()
        }
    }

    /// A preedit update. An empty preedit removes it.
    pub fn preedit(preedit: &Preedit) -> InputMethodEvent {
        let mut attributes = Vec::new();
        if preedit.underline().is_some() {
            let length = preedit.text.encode_utf16().count();
            attributes.push(Attribute::TextFormat { start: 0, length });
            attributes.push(Attribute::Cursor { position: length });
        }
        InputMethodEvent {
            preedit: preedit.text.clone(),
            attributes,
            commit: String::new(),
        }
    }
}

/// Signals recorded during a context call. Preedit text is filled in
/// afterwards, once the context has settled.
#[derive(Debug, PartialEq, Eq)]
enum Pending {
    Commit(String),
    Preedit,
}

#[derive(Default)]
struct SignalQueue(Vec<Pending>);

impl InputSignals for SignalQueue {
    fn commit(&mut self, text: &str) {
        self.0.push(Pending::Commit(text.to_owned()));
    }

    fn preedit_start(&mut self) {}

    fn preedit_changed(&mut self) {
        self.0.push(Pending::Preedit);
    }

    // the changed event already carries the empty preedit
    fn preedit_end(&mut self) {}
}

/// Opaque identity of a `QObject`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ObjectId(pub u64);

/// The `QPlatformInputContext` implementation.
pub struct QtInputContext<E: InputEngine> {
    ctx: Context<E>,
    queue: QtEventQueue,
    signals: SignalQueue,
    focus: Option<ObjectId>,
    events: Vec<(ObjectId, InputMethodEvent)>,
}

impl<E: InputEngine> QtInputContext<E> {
    pub fn new(config: Rc<Config>) -> Self {
        Self::from_context(Context::new(config))
    }

    pub fn from_context(ctx: Context<E>) -> Self {
        QtInputContext {
            ctx,
            queue: QtEventQueue::default(),
            signals: SignalQueue::default(),
            focus: None,
            events: Vec::new(),
        }
    }

    pub fn context(&self) -> &Context<E> {
        &self.ctx
    }

    pub fn queue(&self) -> &QtEventQueue {
        &self.queue
    }

    pub fn focus_object(&self) -> Option<ObjectId> {
        self.focus
    }

    /// `isValid`.
    pub fn is_valid(&self) -> bool {
        true
    }

    /// `filterEvent`.
    pub fn filter_event(&mut self, event: &QtKeyEvent) -> bool {
        let handled = self
            .ctx
            .filter_keypress(&mut self.queue, &mut self.signals, event)
            .handled();
        self.deliver();
        handled
    }

    /// Run the event loop over whatever was posted back.
    ///
    /// Returns the events the context did not handle.
    pub fn dispatch_pending(&mut self) -> Vec<QtKeyEvent> {
        let mut unhandled = Vec::new();
        while let Some(event) = self.queue.pop() {
            if !self.filter_event(&event) {
                unhandled.push(event);
            }
        }
        unhandled
    }

    /// `setFocusObject`.
    ///
    /// Composition left in the previous object is committed there before
    /// focus moves on.
    pub fn set_focus_object(&mut self, object: Option<ObjectId>) {
        if self.focus.is_some() && self.focus != object {
            self.ctx.focus_out(&mut self.signals);
            self.deliver();
        }
        self.focus = object;
        if object.is_some() {
            self.ctx.focus_in(&mut self.signals);
            self.deliver();
        }
    }

    /// `reset`.
    pub fn reset(&mut self) {
        self.ctx.reset(&mut self.signals);
        self.deliver();
    }

    /// `commit`: Qt asks for the preedit to be committed.
    pub fn commit(&mut self) {
        self.reset();
    }

    /// A mouse button press seen by the application-wide event filter.
    pub fn button_press(&mut self, button: u32) {
        let event = ButtonEvent::new(MouseButton::from_qt(button));
        self.ctx.button_press(&event, &mut self.signals);
        self.deliver();
    }

    pub fn preedit(&self) -> Preedit {
        self.ctx.preedit()
    }

    /// Events sent since the last call, with their receivers.
    pub fn take_events(&mut self) -> Vec<(ObjectId, InputMethodEvent)> {
        std::mem::take(&mut self.events)
    }

    /// Turn recorded signals into events for the focus object.
    fn deliver(&mut self) {
        let pending = std::mem::take(&mut self.signals.0);
        let Some(object) = self.focus else {
            if !pending.is_empty() {
                tracing::debug!(count = pending.len(), "no focus object, dropping events");
            }
            return;
        };

        for signal in pending {
            let event = match signal {
                Pending::Commit(text) => InputMethodEvent::commit(&text),
                Pending::Preedit => InputMethodEvent::preedit(&self.ctx.preedit()),
            };
            self.events.push((object, event));
        }
    }
}
