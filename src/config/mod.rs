//
// Copyright (c) 2020-2022 science+computing ag and other contributors
//
// This program and the accompanying materials are made
// available under the terms of the Eclipse Public License 2.0
// which is available at https://www.eclipse.org/legal/epl-2.0/
//
// SPDX-License-Identifier: EPL-2.0
//

//! The configuration handling code
//!
//! This module contains all the code that implements configuration handling.

mod configuration;
pub use configuration::*;

mod docker_config;
pub use docker_config::*;

mod endpoint_config;
pub use endpoint_config::*;

mod language_config;
pub use language_config::*;

mod not_validated;
pub use not_validated::*;

mod oracle_config;
pub use oracle_config::*;

mod util;

#[cfg(test)]
mod tests {
    use super::*;

    use crate::language::Language;

    const EXAMPLE: &str = include_str!("../../config.toml");

    fn example() -> NotValidatedConfiguration {
        toml::from_str(EXAMPLE).unwrap()
    }

    #[test]
    fn test_example_configuration_validates() {
        let config = example().validate().unwrap();
        assert_eq!(config.max_identical_iterations(), 3);
        assert_eq!(*config.database_port(), 5432);
        for lang in Language::ALL {
            assert!(config.profile(lang).is_ok(), "No profile for {}", lang);
        }
    }

    #[test]
    fn test_missing_profile_is_rejected() {
        let mut toml: toml::Value = toml::from_str(EXAMPLE).unwrap();
        toml.get_mut("languages")
            .and_then(|l| l.as_table_mut())
            .unwrap()
            .remove("cs");

        let config: NotValidatedConfiguration = toml.try_into().unwrap();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("cs"), "{}", err);
    }

    #[test]
    fn test_zero_threshold_is_rejected() {
        let mut toml: toml::Value = toml::from_str(EXAMPLE).unwrap();
        *toml.get_mut("max_identical_iterations").unwrap() = toml::Value::Integer(0);

        let config: NotValidatedConfiguration = toml.try_into().unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_incompatible_version_is_rejected() {
        let mut toml: toml::Value = toml::from_str(EXAMPLE).unwrap();
        *toml.get_mut("compatibility").unwrap() = toml::Value::String(String::from(">=999"));

        let config: NotValidatedConfiguration = toml.try_into().unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_documented_install_command_validates() {
        let documented = EXAMPLE
            .lines()
            .find_map(|l| l.strip_prefix("# command = "))
            .unwrap();
        let command: toml::Value = toml::from_str(&format!("command = {}", documented)).unwrap();

        let mut toml: toml::Value = toml::from_str(EXAMPLE).unwrap();
        toml.get_mut("languages")
            .and_then(|l| l.get_mut("py"))
            .and_then(|py| py.as_table_mut())
            .unwrap()
            .insert(String::from("command"), command["command"].clone());

        let config: NotValidatedConfiguration = toml.try_into().unwrap();
        let config = config.validate().unwrap();
        let command = config.profile(Language::Python).unwrap().command();
        assert_eq!(command[0], "/bin/sh");
        assert!(command[2].starts_with("pip install"));
    }

    #[test]
    fn test_defaults() {
        let mut toml: toml::Value = toml::from_str(EXAMPLE).unwrap();
        let table = toml.as_table_mut().unwrap();
        table.remove("max_identical_iterations");
        table.remove("spinner_format");

        let config: NotValidatedConfiguration = toml.try_into().unwrap();
        assert_eq!(config.max_identical_iterations(), crate::guard::DEFAULT_MAX_IDENTICAL_ITERATIONS);
        assert!(!config.spinner_format().is_empty());
    }
}
