//
// Copyright (c) 2020-2022 science+computing ag and other contributors
//
// This program and the accompanying materials are made
// available under the terms of the Eclipse Public License 2.0
// which is available at https://www.eclipse.org/legal/epl-2.0/
//
// SPDX-License-Identifier: EPL-2.0
//

//! The durable store contract of the build loop and its PostgreSQL implementation

use anyhow::Context;
use anyhow::Error;
use anyhow::Result;
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::r2d2::ConnectionManager;
use diesel::r2d2::Pool;
use getset::Getters;
use tracing::debug;
use tracing::trace;
use typed_builder::TypedBuilder;

use crate::db::models::Iteration;
use crate::db::models::NewIteration;
use crate::db::models::Submission;
use crate::guard::DuplicateGuard;
use crate::guard::GuardDecision;
use crate::language::Language;

/// A build request as it arrives from the outside
#[derive(Clone, Debug, Eq, PartialEq, Getters, TypedBuilder)]
pub struct SubmissionRequest {
    #[builder(setter(into))]
    #[getset(get = "pub")]
    name: String,

    #[builder(setter(into))]
    #[getset(get = "pub")]
    prompt: String,

    #[getset(get = "pub")]
    language: Language,

    #[builder(setter(into))]
    #[getset(get = "pub")]
    input_code: String,
}

/// The result of handing a request to the store
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Acceptance {
    /// The submission was created or updated and is now queued
    Queued(Submission),

    /// The duplicate guard refused the request, nothing was written
    Rejected { name: String, identical_attempts: i32 },
}

impl Acceptance {
    pub fn is_rejected(&self) -> bool {
        matches!(self, Acceptance::Rejected { .. })
    }
}

/// The result of recording a pass
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Recorded {
    pub iteration: Iteration,

    /// Whether the queued flag of the submission was cleared
    ///
    /// This is `false` if the submission was re-armed (or deleted) while the pass was running.
    pub cleared: bool,
}

/// Persistence used by the build loop
///
/// Implementations must make `accept()` atomic with respect to concurrent `accept()` and
/// `record_iteration()` calls for the same name.
pub trait BuildStore: Send + Sync {
    /// Run the duplicate guard and, if it passes, create or overwrite the submission and mark it
    /// queued
    fn accept(&self, request: &SubmissionRequest, guard: &DuplicateGuard) -> Result<Acceptance>;

    fn submission(&self, name: &str) -> Result<Option<Submission>>;

    /// All submissions, ordered by name
    fn submissions(&self) -> Result<Vec<Submission>>;

    /// Names of all submissions that still wait for a build
    fn queued_names(&self) -> Result<Vec<String>>;

    /// All iterations of an application, oldest first
    fn iterations(&self, name: &str) -> Result<Vec<Iteration>>;

    fn iteration(&self, id: i32) -> Result<Option<Iteration>>;

    /// Append an iteration and clear the queued flag if the submission is still at `generation`
    fn record_iteration(&self, new_iteration: &NewIteration, generation: i64) -> Result<Recorded>;

    fn unqueue(&self, name: &str) -> Result<bool>;

    /// Delete a submission, its iterations only if `with_iterations` is set
    fn delete_submission(&self, name: &str, with_iterations: bool) -> Result<bool>;

    fn delete_iteration(&self, id: i32) -> Result<bool>;
}

pub struct PgStore {
    pool: Pool<ConnectionManager<PgConnection>>,
}

impl PgStore {
    pub fn new(pool: Pool<ConnectionManager<PgConnection>>) -> Self {
        PgStore { pool }
    }

    fn with_connection<T, F>(&self, f: F) -> Result<T>
        where F: FnOnce(&mut PgConnection) -> Result<T>
    {
        let mut pooled = self.pool
            .get()
            .context("Getting database connection from pool")?;
        f(&mut *pooled)
    }
}

impl BuildStore for PgStore {
    fn accept(&self, request: &SubmissionRequest, guard: &DuplicateGuard) -> Result<Acceptance> {
        self.with_connection(|conn| {
            conn.transaction::<_, Error, _>(|conn| {
                let previous = Submission::with_name_for_update(conn, request.name())?;
                let last = Iteration::latest_for_app(conn, request.name())?;
                trace!("Guard input for '{}': previous = {:?}, last iteration = {:?}",
                    request.name(), previous.as_ref().map(|s| s.identical_attempts), last.as_ref().map(|i| i.id));

                match guard.check(previous.as_ref(), last.as_ref(), request.input_code()) {
                    GuardDecision::Reject { identical_attempts } => {
                        debug!("Rejecting '{}' after {} identical attempts", request.name(), identical_attempts);
                        Ok(Acceptance::Rejected {
                            name: request.name().clone(),
                            identical_attempts,
                        })
                    },

                    GuardDecision::Pass { identical_attempts } => {
                        Submission::upsert(conn,
                            request.name(),
                            request.prompt(),
                            request.input_code(),
                            *request.language(),
                            identical_attempts,
                            chrono::Utc::now())
                            .map(Acceptance::Queued)
                    },
                }
            })
        })
        .with_context(|| format!("Accepting build request for '{}'", request.name()))
    }

    fn submission(&self, name: &str) -> Result<Option<Submission>> {
        self.with_connection(|conn| Submission::with_name(conn, name))
    }

    fn submissions(&self) -> Result<Vec<Submission>> {
        self.with_connection(Submission::all)
    }

    fn queued_names(&self) -> Result<Vec<String>> {
        self.with_connection(Submission::queued_names)
    }

    fn iterations(&self, name: &str) -> Result<Vec<Iteration>> {
        self.with_connection(|conn| Iteration::for_app(conn, name))
    }

    fn iteration(&self, id: i32) -> Result<Option<Iteration>> {
        self.with_connection(|conn| Iteration::with_id(conn, id))
    }

    fn record_iteration(&self, new_iteration: &NewIteration, generation: i64) -> Result<Recorded> {
        self.with_connection(|conn| {
            conn.transaction::<_, Error, _>(|conn| {
                let iteration = Iteration::create(conn, new_iteration)?;
                let cleared = Submission::clear_queued(conn, new_iteration.app_name(), generation)?;
                Ok(Recorded { iteration, cleared })
            })
        })
    }

    fn unqueue(&self, name: &str) -> Result<bool> {
        self.with_connection(|conn| Submission::unqueue(conn, name))
    }

    fn delete_submission(&self, name: &str, with_iterations: bool) -> Result<bool> {
        self.with_connection(|conn| {
            conn.transaction::<_, Error, _>(|conn| {
                if with_iterations {
                    let n = Iteration::delete_for_app(conn, name)?;
                    debug!("Deleted {} iterations of '{}'", n, name);
                }

                Submission::delete(conn, name)
            })
        })
    }

    fn delete_iteration(&self, id: i32) -> Result<bool> {
        self.with_connection(|conn| Iteration::delete(conn, id))
    }
}
