//
// Copyright (c) 2020-2022 science+computing ag and other contributors
//
// This program and the accompanying materials are made
// available under the terms of the Eclipse Public License 2.0
// which is available at https://www.eclipse.org/legal/epl-2.0/
//
// SPDX-License-Identifier: EPL-2.0
//

use anyhow::Context;
use anyhow::Error;
use anyhow::Result;
use chrono::DateTime;
use chrono::Utc;
use diesel::prelude::*;
use diesel::PgConnection;
use tracing::trace;

use crate::language::Language;
use crate::schema::submissions;
use crate::schema::submissions::*;

/// The latest desired state of a named application
#[derive(Clone, Debug, Eq, PartialEq, Identifiable, Queryable)]
#[diesel(table_name = submissions, primary_key(name))]
pub struct Submission {
    pub name: String,
    pub prompt: String,
    pub input_code: String,
    pub language: Language,
    pub queued: bool,

    /// Bumped on every accepted request, so a worker can tell whether the row changed while it
    /// was building
    pub generation: i64,

    /// Number of consecutive accepted requests whose input code equalled the input code of the
    /// latest iteration
    pub identical_attempts: i32,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = submissions)]
struct NewSubmission<'a> {
    pub name: &'a str,
    pub prompt: &'a str,
    pub input_code: &'a str,
    pub language: Language,
    pub queued: bool,
    pub generation: i64,
    pub identical_attempts: i32,
    pub updated_at: DateTime<Utc>,
}

impl Submission {
    /// Create the submission or overwrite the existing one with the same name
    ///
    /// Either way the row ends up queued, with a fresh generation.
    #[allow(clippy::too_many_arguments)]
    pub fn upsert(
        database_connection: &mut PgConnection,
        app_name: &str,
        new_prompt: &str,
        new_input_code: &str,
        new_language: Language,
        new_identical_attempts: i32,
        now: DateTime<Utc>,
    ) -> Result<Submission> {
        let new_submission = NewSubmission {
            name: app_name,
            prompt: new_prompt,
            input_code: new_input_code,
            language: new_language,
            queued: true,
            generation: 1,
            identical_attempts: new_identical_attempts,
            updated_at: now,
        };

        trace!("Upserting submission in database: {:?}", new_submission);
        diesel::insert_into(submissions::table)
            .values(&new_submission)
            .on_conflict(name)
            .do_update()
            .set((
                prompt.eq(new_prompt),
                input_code.eq(new_input_code),
                language.eq(new_language),
                queued.eq(true),
                generation.eq(generation + 1_i64),
                identical_attempts.eq(new_identical_attempts),
                updated_at.eq(now),
            ))
            .get_result::<Submission>(database_connection)
            .with_context(|| format!("Upserting submission '{}'", app_name))
            .map_err(Error::from)
    }

    pub fn with_name(database_connection: &mut PgConnection, app_name: &str) -> Result<Option<Submission>> {
        dsl::submissions
            .find(app_name)
            .get_result::<Submission>(database_connection)
            .optional()
            .with_context(|| format!("Loading submission '{}'", app_name))
            .map_err(Error::from)
    }

    /// Like `with_name()`, but holds a row lock until the surrounding transaction ends
    pub fn with_name_for_update(database_connection: &mut PgConnection, app_name: &str) -> Result<Option<Submission>> {
        dsl::submissions
            .find(app_name)
            .for_update()
            .get_result::<Submission>(database_connection)
            .optional()
            .with_context(|| format!("Locking submission '{}'", app_name))
            .map_err(Error::from)
    }

    pub fn all(database_connection: &mut PgConnection) -> Result<Vec<Submission>> {
        dsl::submissions
            .order_by(name.asc())
            .load::<Submission>(database_connection)
            .context("Loading submissions")
            .map_err(Error::from)
    }

    pub fn queued_names(database_connection: &mut PgConnection) -> Result<Vec<String>> {
        dsl::submissions
            .filter(queued.eq(true))
            .order_by(updated_at.asc())
            .select(name)
            .load::<String>(database_connection)
            .context("Loading queued submissions")
            .map_err(Error::from)
    }

    /// Clear the queued flag, but only if nobody re-armed the row since `seen_generation`
    pub fn clear_queued(database_connection: &mut PgConnection, app_name: &str, seen_generation: i64) -> Result<bool> {
        diesel::update(dsl::submissions.filter(name.eq(app_name)).filter(generation.eq(seen_generation)))
            .set(queued.eq(false))
            .execute(database_connection)
            .with_context(|| format!("Clearing queued flag of '{}'", app_name))
            .map(|n| n > 0)
            .map_err(Error::from)
    }

    /// Clear the queued flag unconditionally
    pub fn unqueue(database_connection: &mut PgConnection, app_name: &str) -> Result<bool> {
        diesel::update(dsl::submissions.filter(name.eq(app_name)))
            .set(queued.eq(false))
            .execute(database_connection)
            .with_context(|| format!("Removing '{}' from queue", app_name))
            .map(|n| n > 0)
            .map_err(Error::from)
    }

    pub fn delete(database_connection: &mut PgConnection, app_name: &str) -> Result<bool> {
        diesel::delete(dsl::submissions.filter(name.eq(app_name)))
            .execute(database_connection)
            .with_context(|| format!("Deleting submission '{}'", app_name))
            .map(|n| n > 0)
            .map_err(Error::from)
    }
}
