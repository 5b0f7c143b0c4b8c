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

//! Settings shared by every input context of a module.

use std::rc::Rc;

/// What to do with a key press while the engine is still initializing.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ReadyPolicy {
    /// Forward the key to the host and wait for the next focus-in to
    /// complete the rendezvous.
    #[default]
    Deferred,
    /// Poll the engine at most `attempts` times within the key press.
    ///
    /// Polling happens on the UI thread, so keep this small.
    Bounded { attempts: u32 },
}

/// Immutable settings, referenced (never owned) by each
/// [`Context`](crate::Context).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Config {
    pub(crate) ready_policy: ReadyPolicy,
    pub(crate) commit_english: bool,
    pub(crate) reset_on_button_press: bool,
    pub(crate) log_commit_text: bool,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            ready_policy: ReadyPolicy::Deferred,
            commit_english: true,
            reset_on_button_press: true,
            log_commit_text: cfg!(debug_assertions),
        }
    }
}

impl Config {
    /// Start from the default settings.
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::new()
    }

    pub fn ready_policy(&self) -> ReadyPolicy {
        self.ready_policy
    }

    /// Whether unconsumed plain keys are committed through the toolkit
    /// keymap, for applications which never handle the raw event themselves.
    pub fn commit_english(&self) -> bool {
        self.commit_english
    }

    pub fn reset_on_button_press(&self) -> bool {
        self.reset_on_button_press
    }

    /// Whether committed text may appear in logs.
    pub fn log_commit_text(&self) -> bool {
        self.log_commit_text
    }
}

/// Allows configuring a [`Config`] before the first context is created.
#[derive(Clone, Debug, Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    pub fn new() -> ConfigBuilder {
        ConfigBuilder {
            config: Config::default(),
        }
    }

    pub fn ready_policy(mut self, policy: ReadyPolicy) -> Self {
        self.config.ready_policy = policy;
        self
    }

    pub fn commit_english(mut self, enabled: bool) -> Self {
        self.config.commit_english = enabled;
        self
    }

    pub fn reset_on_button_press(mut self, enabled: bool) -> Self {
        self.config.reset_on_button_press = enabled;
        self
    }

    pub fn log_commit_text(mut self, enabled: bool) -> Self {
        self.config.log_commit_text = enabled;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }

    /// Build the config wrapped for sharing between contexts.
    pub fn build_shared(self) -> Rc<Config> {
        Rc::new(self.build())
    }
}
