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

//! Toolkit bridges.
//!
//! Each bridge models the toolkit objects it talks to as plain values and
//! turns [`Context`](crate::Context) decisions into toolkit signals, events
//! and re-injections.

#[cfg(feature = "gtk")]
pub mod gtk;

#[cfg(feature = "qt")]
pub mod qt;
