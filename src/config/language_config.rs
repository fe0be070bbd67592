//
// Copyright (c) 2020-2022 science+computing ag and other contributors
//
// This program and the accompanying materials are made
// available under the terms of the Eclipse Public License 2.0
// which is available at https://www.eclipse.org/legal/epl-2.0/
//
// SPDX-License-Identifier: EPL-2.0
//

use anyhow::anyhow;
use anyhow::Result;
use getset::Getters;
use serde::Deserialize;

use crate::util::docker::ImageName;

/// How code of one language is run inside a container
#[derive(Clone, Debug, Getters, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LanguageProfile {
    /// The image the container is created from
    #[getset(get = "pub")]
    image: ImageName,

    /// The file name the code is written to, inside the source directory of the container
    #[getset(get = "pub")]
    source_file: String,

    /// The command that is run in the container, it should compile (if necessary) and run the
    /// source file
    #[getset(get = "pub")]
    command: Vec<String>,
}

impl LanguageProfile {
    pub(in crate::config) fn validate(&self) -> Result<()> {
        if self.command.is_empty() {
            return Err(anyhow!("Empty command"))
        }

        if self.source_file.is_empty() || self.source_file.contains(|c: char| c == '/' || c == '\\') {
            return Err(anyhow!("Not a plain file name: source_file = '{}'", self.source_file))
        }

        Ok(())
    }
}

#[cfg(test)]
impl LanguageProfile {
    pub fn new(image: &str, source_file: &str, command: &[&str]) -> Self {
        LanguageProfile {
            image: ImageName::from(image),
            source_file: source_file.to_string(),
            command: command.iter().map(|s| s.to_string()).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation() {
        assert!(LanguageProfile::new("python:3.9-slim", "main.py", &["python", "main.py"]).validate().is_ok());
        assert!(LanguageProfile::new("python:3.9-slim", "main.py", &[]).validate().is_err());
        assert!(LanguageProfile::new("python:3.9-slim", "", &["python"]).validate().is_err());
        assert!(LanguageProfile::new("python:3.9-slim", "../main.py", &["python"]).validate().is_err());
    }
}
