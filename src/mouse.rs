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

//! Pointer buttons, as far as they interrupt a composition.

/// An indicator of which mouse button was pressed.
#[derive(PartialEq, Eq, Clone, Copy, Debug)]
pub enum MouseButton {
    /// No mouse button.
    None,
    /// Primary mouse button, commonly the left mouse button.
    Primary,
    /// Secondary mouse button, commonly the right mouse button.
    Secondary,
    /// Auxiliary mouse button, commonly the middle mouse button.
    Auxiliary,
    /// First X button.
    X1,
    /// Second X button.
    X2,
}

impl MouseButton {
    /// Map a GDK button number.
    pub fn from_gdk(button: u32) -> MouseButton {
        match button {
            1 => MouseButton::Primary,
            2 => MouseButton::Auxiliary,
            3 => MouseButton::Secondary,
            8 => MouseButton::X1,
            9 => MouseButton::X2,
            _ => MouseButton::None,
        }
    }

    /// Map a `Qt::MouseButton` value.
    pub fn from_qt(button: u32) -> MouseButton {
        match button {
            0x1 => MouseButton::Primary,
            0x2 => MouseButton::Secondary,
            0x4 => MouseButton::Auxiliary,
            0x8 => MouseButton::X1,
            0x10 => MouseButton::X2,
            _ => MouseButton::None,
        }
    }

    /// Returns `true` if this is [`MouseButton::None`].
    #[inline]
    pub fn is_none(self) -> bool {
        self == MouseButton::None
    }
}

/// A button press inside the client widget.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ButtonEvent {
    pub button: MouseButton,
    /// The number of clicks associated with this press.
    pub count: u8,
}

impl ButtonEvent {
    pub fn new(button: MouseButton) -> ButtonEvent {
        ButtonEvent { button, count: 1 }
    }

    /// Scroll wheel "presses" and unknown buttons do not count.
    pub fn interrupts_composition(&self) -> bool {
        !self.button.is_none() && self.count > 0
    }
}
