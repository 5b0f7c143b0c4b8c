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

//! GTK im-context bridge.
//!
//! GTK 2 and 3 hand events back with `gdk_event_put`, see [`LegacyEventQueue`].
//! GTK 4 has no public way to queue an event, so the context re-filters it
//! through `gtk_im_context_filter_key`, see [`FilterKeyQueue`].

mod filter;
mod legacy;
mod module;

pub use filter::FilterKeyQueue;
pub use legacy::LegacyEventQueue;
pub use module::{ContextInfo, ContextType, Registration, TypeRegistry, CONTEXT_INFO};

use std::rc::Rc;

use xkeysym::Keysym;

use crate::classify::{ModifierTable, RawKeyEvent};
use crate::engine::InputEngine;
use crate::host::{HostEvents, InputSignals};
use crate::keyboard::KeyState;
use crate::mouse::{ButtonEvent, MouseButton};
use crate::preedit::Preedit;
use crate::{Config, Context};

pub const GDK_SHIFT_MASK: u32 = 1 << 0;
pub const GDK_LOCK_MASK: u32 = 1 << 1;
pub const GDK_CONTROL_MASK: u32 = 1 << 2;
/// `GDK_ALT_MASK` on GTK 4.
pub const GDK_MOD1_MASK: u32 = 1 << 3;
pub const GDK_MOD2_MASK: u32 = 1 << 4;
pub const GDK_MOD3_MASK: u32 = 1 << 5;
pub const GDK_MOD4_MASK: u32 = 1 << 6;
pub const GDK_MOD5_MASK: u32 = 1 << 7;
pub const GDK_SUPER_MASK: u32 = 1 << 26;
pub const GDK_HYPER_MASK: u32 = 1 << 27;
pub const GDK_META_MASK: u32 = 1 << 28;

pub const GDK_MODIFIERS: ModifierTable = ModifierTable {
    shift: GDK_SHIFT_MASK,
    control: GDK_CONTROL_MASK,
    alt: GDK_MOD1_MASK,
    super_: GDK_SUPER_MASK,
    // read from the device
    num_lock: 0,
};

/// A GDK key event.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GdkKeyEvent {
    pub kind: KeyState,
    pub hardware_keycode: u16,
    pub keyval: u32,
    pub state: u32,
    pub group: u8,
    pub time: u32,
    /// `gdk_device_get_num_lock_state` of the source device.
    pub num_lock: bool,
}

impl GdkKeyEvent {
    pub fn press(hardware_keycode: u16, keyval: u32, state: u32) -> GdkKeyEvent {
        GdkKeyEvent {
            kind: KeyState::Down,
            hardware_keycode,
            keyval,
            state,
            group: 0,
            time: 0,
            num_lock: false,
        }
    }

    pub fn release(hardware_keycode: u16, keyval: u32, state: u32) -> GdkKeyEvent {
        GdkKeyEvent {
            kind: KeyState::Up,
            ..GdkKeyEvent::press(hardware_keycode, keyval, state)
        }
    }
}

impl RawKeyEvent for GdkKeyEvent {
    fn key_state(&self) -> KeyState {
        self.kind
    }

    fn hardware_keycode(&self) -> u16 {
        self.hardware_keycode
    }

    fn modifier_state(&self) -> u32 {
        self.state
    }

    fn device_num_lock(&self) -> bool {
        self.num_lock
    }
}

/// `gdk_keyval_to_unicode`.
///
/// Control and keypad keysyms are patched up first, as GDK does; everything
/// else goes through the keysym tables.
pub fn keyval_to_unicode(keyval: u32) -> Option<char> {
    match keyval {
        0xff08 => Some('\u{8}'),
        0xff09 => Some('\t'),
        0xff0d | 0xff8d => Some('\r'),
        0xff1b => Some('\u{1b}'),
        0xffff => Some('\u{7f}'),
        0xff80 => Some(' '),
        0xffaa => Some('*'),
        0xffab => Some('+'),
        0xffac => Some(','),
        0xffad => Some('-'),
        0xffae => Some('.'),
        0xffaf => Some('/'),
        0xffb0..=0xffb9 => char::from_digit(keyval - 0xffb0, 10),
        0xffbd => Some('='),
        _ => Keysym::new(keyval).key_char(),
    }
}

/// A host queue events can be popped back out of.
pub trait EventQueue: HostEvents<Event = GdkKeyEvent> {
    fn pop(&mut self) -> Option<GdkKeyEvent>;
}

/// A signal emitted on the im-context.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GtkSignal {
    Commit(String),
    PreeditStart,
    PreeditChanged,
    PreeditEnd,
}

#[derive(Default)]
struct SignalQueue(Vec<GtkSignal>);

impl InputSignals for SignalQueue {
    fn commit(&mut self, text: &str) {
        // the commit signal takes a C string
        let end = memchr::memchr(0, text.as_bytes()).unwrap_or(text.len());
        if end == 0 {
            return;
        }
        if end != text.len() {
            tracing::warn!(len = text.len(), end, "commit text truncated at NUL");
        }
        self.0.push(GtkSignal::Commit(text[..end].to_owned()));
    }

    fn preedit_start(&mut self) {
        self.0.push(GtkSignal::PreeditStart);
    }

    fn preedit_changed(&mut self) {
        self.0.push(GtkSignal::PreeditChanged);
    }

    fn preedit_end(&mut self) {
        self.0.push(GtkSignal::PreeditEnd);
    }

    fn layout_changed(&mut self) {
        tracing::debug!("layout changed");
    }
}

/// Opaque identity of the widget a context is attached to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct WidgetId(pub u64);

/// The `GtkIMContext` implementation.
pub struct ImContext<E: InputEngine, Q: EventQueue> {
    ctx: Context<E>,
    queue: Q,
    signals: SignalQueue,
    client: Option<WidgetId>,
}

impl<E: InputEngine, Q: EventQueue> ImContext<E, Q> {
    pub fn new(config: Rc<Config>, queue: Q) -> Self {
        ImContext {
            ctx: Context::new(config),
            queue,
            signals: SignalQueue::default(),
            client: None,
        }
    }

    pub fn from_context(ctx: Context<E>, queue: Q) -> Self {
        ImContext {
            ctx,
            queue,
            signals: SignalQueue::default(),
            client: None,
        }
    }

    pub fn context(&self) -> &Context<E> {
        &self.ctx
    }

    pub fn queue_mut(&mut self) -> &mut Q {
        &mut self.queue
    }

    /// `filter_keypress` vfunc.
    pub fn filter_keypress(&mut self, event: &GdkKeyEvent) -> bool {
        self.ctx
            .filter_keypress(&mut self.queue, &mut self.signals, event)
            .handled()
    }

    /// Run the host's event loop over whatever was re-injected.
    ///
    /// Returns the events the context did not handle, which GTK would pass
    /// on to the widget.
    pub fn dispatch_pending(&mut self) -> Vec<GdkKeyEvent> {
        let mut unhandled = Vec::new();
        while let Some(event) = self.queue.pop() {
            if !self.filter_keypress(&event) {
                unhandled.push(event);
            }
        }
        unhandled
    }

    pub fn focus_in(&mut self) {
        self.ctx.focus_in(&mut self.signals);
    }

    pub fn focus_out(&mut self) {
        self.ctx.focus_out(&mut self.signals);
    }

    pub fn reset(&mut self) {
        self.ctx.reset(&mut self.signals);
    }

    /// `set_client_widget` (GTK 4) or `set_client_window` (GTK 2/3).
    ///
    /// Button presses are only watched on an attached widget. Detaching
    /// throws the composition away, since there is nothing left to commit to.
    pub fn set_client_widget(&mut self, widget: Option<WidgetId>) {
        if self.client.is_some() && widget.is_none() {
            self.ctx.cancel(&mut self.signals);
        }
        self.client = widget;
    }

    pub fn client_widget(&self) -> Option<WidgetId> {
        self.client
    }

    /// `button-press-event` on the client widget, with a GDK button number.
    ///
    /// Always returns `false` so the widget still sees the press.
    pub fn button_press(&mut self, widget: WidgetId, button: u32) -> bool {
        if self.client == Some(widget) {
            let event = ButtonEvent::new(MouseButton::from_gdk(button));
            self.ctx.button_press(&event, &mut self.signals);
        }
        false
    }

    /// `get_preedit_string` vfunc.
    pub fn preedit_string(&self) -> Preedit {
        self.ctx.preedit()
    }

    /// Signals emitted since the last call, in emission order.
    pub fn take_signals(&mut self) -> Vec<GtkSignal> {
        std::mem::take(&mut self.signals.0)
    }
}
