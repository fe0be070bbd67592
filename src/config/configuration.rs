//
// Copyright (c) 2020-2022 science+computing ag and other contributors
//
// This program and the accompanying materials are made
// available under the terms of the Eclipse Public License 2.0
// which is available at https://www.eclipse.org/legal/epl-2.0/
//
// SPDX-License-Identifier: EPL-2.0
//

use std::collections::BTreeMap;
use std::ops::Deref;

use anyhow::anyhow;
use anyhow::Result;

use crate::config::LanguageProfile;
use crate::config::NotValidatedConfiguration;
use crate::language::Language;

#[derive(Debug)]
pub struct Configuration {
    pub (in crate::config) inner: NotValidatedConfiguration,
    pub (in crate::config) profiles: BTreeMap<Language, LanguageProfile>,
}

impl Deref for Configuration {
    type Target = NotValidatedConfiguration;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl Configuration {
    pub fn profiles(&self) -> &BTreeMap<Language, LanguageProfile> {
        &self.profiles
    }

    /// Get the execution profile for a language
    ///
    /// Validation guarantees that every language has one.
    pub fn profile(&self, language: Language) -> Result<&LanguageProfile> {
        self.profiles
            .get(&language)
            .ok_or_else(|| anyhow!("No execution profile configured for language '{}'", language))
    }
}
