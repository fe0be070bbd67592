//
// Copyright (c) 2020-2022 science+computing ag and other contributors
//
// This program and the accompanying materials are made
// available under the terms of the Eclipse Public License 2.0
// which is available at https://www.eclipse.org/legal/epl-2.0/
//
// SPDX-License-Identifier: EPL-2.0
//

//! Revision of code by an external completion model
//!
//! The oracle is best-effort: whatever goes wrong while asking it, the caller gets a
//! [`Revision`] back, never an error. A failed call degrades to passing the input code through
//! unchanged.

use async_trait::async_trait;
use thiserror::Error as ThisError;
use tracing::debug;
use tracing::warn;

use crate::language::Language;

mod extract;
pub use extract::extract_first_fenced_block;

mod http;
pub use http::HttpOracle;

/// Outcome of asking the oracle for a revision
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Revision {
    /// The oracle answered with a usable code block
    Revised(String),

    /// The oracle could not be used, `code` is the unchanged input
    Passthrough { code: String, reason: String },
}

impl Revision {
    pub fn code(&self) -> &str {
        match self {
            Revision::Revised(code) => code,
            Revision::Passthrough { code, .. } => code,
        }
    }

    pub fn is_passthrough(&self) -> bool {
        matches!(self, Revision::Passthrough { .. })
    }
}

#[derive(ThisError, Debug)]
pub enum OracleError {
    #[error("Request to revision oracle failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Revision oracle answered with status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Revision oracle answered without any choices")]
    NoChoices,

    #[error("No fenced code block in oracle response")]
    MissingFence,

    #[error("Fenced code block in oracle response is not terminated")]
    UnterminatedFence,
}

/// A completion model that can be asked to revise code
#[async_trait]
pub trait RevisionOracle: Send + Sync {
    /// Send a completion prompt, get the raw completion text back
    async fn complete(&self, completion_prompt: &str) -> Result<String, OracleError>;
}

/// Build the text that is sent to the completion model
pub fn completion_prompt(prompt: &str, input_code: &str, language: Language) -> String {
    format!(
        "Generate ONLY a complete revision of the {lang} code, addressing any build errors, surrounded by triple backticks:\n```{code}```\n{prompt}",
        lang = language.display_name(),
        code = input_code,
        prompt = prompt,
    )
}

/// Ask the oracle to revise `input_code` according to `prompt`
pub async fn revise(oracle: &dyn RevisionOracle, prompt: &str, input_code: &str, language: Language) -> Revision {
    let text = completion_prompt(prompt, input_code, language);
    let revised = oracle
        .complete(&text)
        .await
        .and_then(|raw| extract_first_fenced_block(&raw).map(String::from));

    match revised {
        Ok(code) => {
            debug!("Oracle revised {} bytes of {} code into {} bytes", input_code.len(), language, code.len());
            Revision::Revised(code)
        },
        Err(e) => {
            warn!("Revision oracle failed, passing input through: {}", e);
            Revision::Passthrough {
                code: input_code.to_string(),
                reason: e.to_string(),
            }
        },
    }
}
