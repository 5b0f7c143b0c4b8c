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

//! Errors at the host boundary.
//!
//! None of these reach the application: the dispatcher recovers from each
//! of them locally.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    #[error("event already carries the re-delivery marker")]
    AlreadyMarked,
    #[error("the host event queue refused the re-injected event")]
    QueueClosed,
    #[error("the input context type has not been registered")]
    NotRegistered,
}
