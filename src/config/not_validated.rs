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

use anyhow::anyhow;
use anyhow::Context;
use anyhow::Result;
use getset::CopyGetters;
use getset::Getters;
use serde::Deserialize;

use crate::config::Configuration;
use crate::config::DockerConfig;
use crate::config::LanguageProfile;
use crate::config::OracleConfig;
use crate::config::util::*;
use crate::language::Language;

#[derive(Debug, Getters, CopyGetters, Deserialize)]
pub struct NotValidatedConfiguration {
    #[getset(get = "pub")]
    compatibility: semver::VersionReq,

    #[serde(default = "default_spinner_format")]
    #[getset(get = "pub")]
    spinner_format: String,

    /// Number of identical attempts after which a submission is refused
    #[serde(default = "default_max_identical_iterations")]
    #[getset(get_copy = "pub")]
    max_identical_iterations: usize,

    #[getset(get = "pub")]
    #[serde(rename = "database_host")]
    database_host: String,

    #[getset(get = "pub")]
    #[serde(rename = "database_port")]
    database_port: u16,

    #[getset(get = "pub")]
    #[serde(rename = "database_user")]
    database_user: String,

    #[getset(get = "pub")]
    #[serde(rename = "database_password")]
    database_password: String,

    #[getset(get = "pub")]
    #[serde(rename = "database_name")]
    database_name: String,

    #[getset(get_copy = "pub")]
    #[serde(rename = "database_connection_timeout")]
    database_connection_timeout: Option<u16>,

    #[getset(get = "pub")]
    oracle: OracleConfig,

    #[getset(get = "pub")]
    docker: DockerConfig,

    /// Execution profiles, keyed by language tag
    #[getset(get = "pub")]
    languages: BTreeMap<String, LanguageProfile>,
}

impl NotValidatedConfiguration {
    pub fn validate(self) -> Result<Configuration> {
        let crate_version = semver::Version::parse(env!("CARGO_PKG_VERSION"))
            .context("Parsing version of crate (CARGO_PKG_VERSION) into semver::Version object")?;

        if !self.compatibility.matches(&crate_version) {
            return Err(anyhow!("Configuration is not compatible to buildinator {}", crate_version))
        }

        if self.max_identical_iterations == 0 {
            return Err(anyhow!("max_identical_iterations must be at least 1"))
        }

        let mut profiles = BTreeMap::new();
        for (tag, profile) in self.languages.iter() {
            let language = tag.parse::<Language>()
                .map_err(|_| anyhow!("Unknown language in configuration: '{}'", tag))?;

            profile.validate()
                .with_context(|| anyhow!("Validating execution profile for '{}'", tag))?;

            profiles.insert(language, profile.clone());
        }

        if let Some(missing) = Language::ALL.iter().find(|l| !profiles.contains_key(*l)) {
            return Err(anyhow!("No execution profile configured for language '{}'", missing))
        }

        Ok(Configuration { inner: self, profiles })
    }
}
