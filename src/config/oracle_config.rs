//
// Copyright (c) 2020-2022 science+computing ag and other contributors
//
// This program and the accompanying materials are made
// available under the terms of the Eclipse Public License 2.0
// which is available at https://www.eclipse.org/legal/epl-2.0/
//
// SPDX-License-Identifier: EPL-2.0
//

use getset::CopyGetters;
use getset::Getters;
use serde::Deserialize;
use url::Url;

use crate::config::util::*;

/// Where and how to reach the revision oracle
#[derive(Debug, Getters, CopyGetters, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OracleConfig {
    /// Base URL of an OpenAI-compatible API, `/completions` is appended to it
    #[getset(get = "pub")]
    endpoint: Url,

    #[getset(get = "pub")]
    api_key: Option<String>,

    #[serde(default = "default_max_tokens")]
    #[getset(get_copy = "pub")]
    max_tokens: u32,

    #[serde(default = "default_temperature")]
    #[getset(get_copy = "pub")]
    temperature: f32,

    #[serde(default = "default_top_p")]
    #[getset(get_copy = "pub")]
    top_p: f32,

    /// Request timeout in seconds, no timeout if not set
    #[getset(get_copy = "pub")]
    timeout: Option<u64>,
}
