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

//! The im-module entry points: listing, type registration and creation.

use std::rc::Rc;

use once_cell::sync::OnceCell;

use super::{EventQueue, ImContext};
use crate::engine::InputEngine;
use crate::{Config, Error};

/// `GtkIMContextInfo`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ContextInfo {
    pub context_id: &'static str,
    pub context_name: &'static str,
    pub domain: &'static str,
    pub domain_dirname: &'static str,
    pub default_locales: &'static str,
}

pub const CONTEXT_INFO: ContextInfo = ContextInfo {
    context_id: "hangul",
    context_name: "Hangul (Korean IME)",
    domain: "hangul-bridge",
    domain_dirname: "/usr/share/locale",
    default_locales: "ko:*",
};

/// How the context type was registered with the type system.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Registration {
    /// Through the `GTypeModule` GTK loaded us with.
    Module,
    /// Linked in directly.
    Static,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ContextType {
    pub name: &'static str,
    pub registration: Registration,
}

/// Process-wide record of the context type.
///
/// Registration happens once, when the module is loaded; later calls
/// return the first registration.
#[derive(Debug, Default)]
pub struct TypeRegistry {
    ty: OnceCell<ContextType>,
}

static REGISTRY: TypeRegistry = TypeRegistry::new();

impl TypeRegistry {
    pub const fn new() -> Self {
        TypeRegistry {
            ty: OnceCell::new(),
        }
    }

    /// The registry used by the module entry points.
    pub fn global() -> &'static TypeRegistry {
        &REGISTRY
    }

    /// `im_module_init`.
    pub fn register(&self, registration: Registration) -> &ContextType {
        self.ty.get_or_init(|| {
            tracing::debug!(?registration, "registering context type");
            ContextType {
                name: "HangulIMContext",
                registration,
            }
        })
    }

    pub fn context_type(&self) -> Option<&ContextType> {
        self.ty.get()
    }

    /// `im_module_list`.
    pub fn list(&self) -> &'static [ContextInfo] {
        &[CONTEXT_INFO]
    }

    /// `im_module_create`.
    ///
    /// Returns `Ok(None)` for a context id this module does not provide.
    pub fn create<E, Q>(
        &self,
        context_id: &str,
        config: Rc<Config>,
        queue: Q,
    ) -> Result<Option<ImContext<E, Q>>, Error>
    where
        E: InputEngine,
        Q: EventQueue,
    {
        if context_id != CONTEXT_INFO.context_id {
            return Ok(None);
        }
        if self.ty.get().is_none() {
            return Err(Error::NotRegistered);
        }
        Ok(Some(ImContext::new(config, queue)))
    }
}
