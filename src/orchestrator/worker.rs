//
// Copyright (c) 2020-2022 science+computing ag and other contributors
//
// This program and the accompanying materials are made
// available under the terms of the Eclipse Public License 2.0
// which is available at https://www.eclipse.org/legal/epl-2.0/
//
// SPDX-License-Identifier: EPL-2.0
//

use std::sync::Arc;

use anyhow::Result;
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::sync::mpsc::UnboundedSender;
use tracing::debug;
use tracing::error;
use tracing::info;
use tracing::trace;
use typed_builder::TypedBuilder;

use crate::db::models::Iteration;
use crate::db::models::NewIteration;
use crate::db::BuildStore;
use crate::db::Recorded;
use crate::oracle::revise;
use crate::oracle::RevisionOracle;
use crate::orchestrator::WorkToken;
use crate::sandbox::Sandbox;

/// What happened to a token the worker took from the queue
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum PassOutcome {
    /// An iteration was appended
    ///
    /// `cleared` is false if the submission changed while the pass was running, it stays queued
    /// in that case.
    Recorded { iteration: Iteration, cleared: bool },

    /// The submission was deleted or is not queued anymore, nothing was done
    Skipped,

    /// The store failed, nothing was recorded
    Failed(String),
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PassReport {
    pub name: String,
    pub outcome: PassOutcome,
}

/// The single consumer of the build queue
#[derive(TypedBuilder)]
pub struct Worker {
    store: Arc<dyn BuildStore>,
    oracle: Arc<dyn RevisionOracle>,
    sandbox: Arc<dyn Sandbox>,

    #[builder(default)]
    reports: Option<UnboundedSender<PassReport>>,
}

impl Worker {
    /// Process tokens until every sending end of the queue is gone
    ///
    /// A failing pass is logged and reported, it never ends the loop.
    pub async fn run(self, mut tokens: UnboundedReceiver<WorkToken>) {
        info!("Build worker started");
        while let Some(token) = tokens.recv().await {
            trace!("Got token: {}", token);
            let outcome = match self.process(&token).await {
                Ok(None) => PassOutcome::Skipped,
                Ok(Some(recorded)) => PassOutcome::Recorded {
                    iteration: recorded.iteration,
                    cleared: recorded.cleared,
                },
                Err(e) => {
                    error!("Build pass for '{}' failed: {:?}", token, e);
                    PassOutcome::Failed(format!("{:#}", e))
                },
            };

            self.report(PassReport {
                name: token.name().to_string(),
                outcome,
            });
        }
        info!("Build queue closed, worker stops");
    }

    /// Run one pass for a token
    ///
    /// Returns `None` if there was nothing to do, because the submission was deleted or is not
    /// queued anymore.
    pub async fn process(&self, token: &WorkToken) -> Result<Option<Recorded>> {
        let submission = match self.store.submission(token.name())? {
            None => {
                debug!("Submission '{}' is gone, dropping token", token);
                return Ok(None)
            },
            Some(s) if !s.queued => {
                debug!("Submission '{}' is not queued anymore, dropping token", token);
                return Ok(None)
            },
            Some(s) => s,
        };

        info!("Building '{}' (generation {})", submission.name, submission.generation);
        let revision = revise(
            self.oracle.as_ref(),
            &submission.prompt,
            &submission.input_code,
            submission.language,
        )
        .await;

        let output = self.sandbox.execute(revision.code(), submission.language).await;

        let new_iteration = NewIteration::new(
            submission.name.clone(),
            submission.prompt,
            submission.input_code,
            revision,
            output,
        );

        let recorded = self.store.record_iteration(&new_iteration, submission.generation)?;
        info!(
            "Recorded iteration {} for '{}': release candidate = {}",
            recorded.iteration.id, submission.name, recorded.iteration.is_release_candidate
        );
        debug!("Build output for '{}':\n{}", submission.name, recorded.iteration.build_output);

        if !recorded.cleared {
            info!("'{}' was resubmitted during the build, it stays queued", submission.name);
        }

        Ok(Some(recorded))
    }

    fn report(&self, report: PassReport) {
        if let Some(reports) = self.reports.as_ref() {
            if reports.send(report).is_err() {
                trace!("Nobody listens for pass reports anymore");
            }
        }
    }
}
