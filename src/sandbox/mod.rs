//
// Copyright (c) 2020-2022 science+computing ag and other contributors
//
// This program and the accompanying materials are made
// available under the terms of the Eclipse Public License 2.0
// which is available at https://www.eclipse.org/legal/epl-2.0/
//
// SPDX-License-Identifier: EPL-2.0
//

//! Execution of code in disposable containers
//!
//! A sandbox run never fails from the perspective of the caller. If the container
//! infrastructure breaks, the error is reported as build output, which makes the run count as
//! not clean.

use std::error::Error as StdError;

use async_trait::async_trait;
use thiserror::Error as ThisError;

use crate::consts::SANDBOX_ERROR_PREFIX;
use crate::language::Language;
use crate::util::docker::ContainerHash;
use crate::util::docker::ImageName;

mod docker;
pub use docker::DockerSandbox;

#[derive(ThisError, Debug)]
pub enum SandboxError {
    #[error("No execution profile for language '{0}'")]
    NoProfile(Language),

    #[error("Creating container from image '{image}' on '{uri}'")]
    Create {
        image: ImageName,
        uri: String,
        #[source]
        source: shiplift::Error,
    },

    #[error("{action} (container {container_id})")]
    Container {
        action: &'static str,
        container_id: ContainerHash,
        #[source]
        source: shiplift::Error,
    },
}

impl SandboxError {
    pub fn container(action: &'static str, container_id: &ContainerHash, source: shiplift::Error) -> Self {
        SandboxError::Container {
            action,
            container_id: container_id.clone(),
            source,
        }
    }

    /// Render the error, including its causes, the way it is recorded as build output
    pub fn as_build_output(&self) -> String {
        let mut out = format!("{} {}", SANDBOX_ERROR_PREFIX, self);
        let mut source = StdError::source(self);
        while let Some(cause) = source {
            out.push_str(&format!(": {}", cause));
            source = StdError::source(cause);
        }
        out.push('\n');
        out
    }
}

/// An isolated, disposable place to run code
#[async_trait]
pub trait Sandbox: Send + Sync {
    /// Run `code` and return everything it wrote to stdout and stderr
    async fn execute(&self, code: &str, language: Language) -> String;
}
