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

//! Hangul Bridge connects an external Hangul composition engine to the
//! input-method protocols of GUI toolkits.
//!
//! The engine decides what a key press means for the text being composed.
//! This crate decides what the toolkit should see: whether the key is
//! swallowed, forwarded to the application, or split into a commit followed
//! by the key itself, and when the preedit starts, changes and ends.
//!
//! The core is [`Context`], one per text field. A toolkit bridge supplies a
//! [`HostEvents`] implementation for its event queue and an
//! [`InputSignals`] sink, then feeds the context raw key events and focus
//! changes:
//!
//! ```ignore
//! let config = Config::builder().commit_english(true).build_shared();
//! let mut ctx: Context<MyEngine> = Context::new(config);
//!
//! match ctx.filter_keypress(&mut queue, &mut signals, &event) {
//!     Disposition::Forward => { /* let the application see it */ }
//!     _ => { /* handled */ }
//! }
//! ```
//!
//! Ready-made bridges for GTK and Qt live in [`backend`], behind the `gtk`
//! and `qt` features.

#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod backend;
mod classify;
mod config;
mod context;
mod engine;
mod error;
mod host;
mod keyboard;
mod lifecycle;
mod mouse;
mod preedit;

#[cfg(test)]
mod test_util;

pub use classify::{classify, ModifierTable, RawKeyEvent};
pub use config::{Config, ConfigBuilder, ReadyPolicy};
pub use context::{Context, Disposition, ReadyState};
pub use engine::{EngineClient, InputEngine, InputResult};
pub use error::Error;
pub use host::{HostEvents, InputSignals};
pub use keyboard::{EventMarker, KeyRequest, KeyState, ModifierSet, Modifiers};
pub use mouse::{ButtonEvent, MouseButton};
pub use preedit::{Preedit, PreeditState};
