//
// Copyright (c) 2020-2022 science+computing ag and other contributors
//
// This program and the accompanying materials are made
// available under the terms of the Eclipse Public License 2.0
// which is available at https://www.eclipse.org/legal/epl-2.0/
//
// SPDX-License-Identifier: EPL-2.0
//

use std::time::Duration;

use anyhow::Context;
use anyhow::Result;
use async_trait::async_trait;
use serde::Deserialize;
use serde::Serialize;
use tracing::trace;

use crate::config::OracleConfig;
use crate::oracle::OracleError;
use crate::oracle::RevisionOracle;

/// Client for an OpenAI-compatible `/completions` endpoint
#[derive(Debug)]
pub struct HttpOracle {
    client: reqwest::Client,
    url: String,
    api_key: Option<String>,
    max_tokens: u32,
    temperature: f32,
    top_p: f32,
}

#[derive(Debug, Serialize)]
struct CompletionRequest<'a> {
    prompt: &'a str,
    max_tokens: u32,
    temperature: f32,
    top_p: f32,
    n: u32,
    stream: bool,
    echo: bool,
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    choices: Vec<CompletionChoice>,
}

#[derive(Debug, Deserialize)]
struct CompletionChoice {
    text: String,
}

impl HttpOracle {
    pub fn new(config: &OracleConfig) -> Result<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(secs) = config.timeout() {
            builder = builder.timeout(Duration::from_secs(secs));
        }

        let client = builder
            .build()
            .context("Building HTTP client for revision oracle")?;

        Ok(HttpOracle {
            client,
            url: format!("{}/completions", config.endpoint().as_str().trim_end_matches('/')),
            api_key: config.api_key().clone(),
            max_tokens: config.max_tokens(),
            temperature: config.temperature(),
            top_p: config.top_p(),
        })
    }
}

#[async_trait]
impl RevisionOracle for HttpOracle {
    async fn complete(&self, completion_prompt: &str) -> Result<String, OracleError> {
        let body = CompletionRequest {
            prompt: completion_prompt,
            max_tokens: self.max_tokens,
            temperature: self.temperature,
            top_p: self.top_p,
            n: 1,
            stream: false,
            echo: false,
        };
        trace!("Sending completion request to {}", self.url);

        let mut request = self.client.post(&self.url).json(&body);
        if let Some(key) = self.api_key.as_ref() {
            request = request.bearer_auth(key);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(OracleError::Status { status: status.as_u16(), body })
        }

        response
            .json::<CompletionResponse>()
            .await?
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.text)
            .ok_or(OracleError::NoChoices)
    }
}
