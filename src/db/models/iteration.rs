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
use getset::Getters;
use tracing::trace;

use crate::oracle::Revision;
use crate::schema::iterations;
use crate::schema::iterations::*;

/// One recorded revise-and-execute pass
///
/// Rows are never updated after insertion.
#[derive(Clone, Debug, Eq, PartialEq, Identifiable, Queryable)]
#[diesel(table_name = iterations)]
pub struct Iteration {
    pub id: i32,
    pub app_name: String,
    pub prompt: String,
    pub input_code: String,
    pub output_code: String,
    pub build_output: String,
    pub is_release_candidate: bool,

    /// Set if the revision oracle failed and the input code was passed through
    pub passthrough_reason: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// An iteration that is about to be recorded
///
/// The release candidate flag is derived from the build output on construction and cannot be
/// set otherwise.
#[derive(Clone, Debug, Eq, PartialEq, Getters, Insertable)]
#[diesel(table_name = iterations)]
pub struct NewIteration {
    #[getset(get = "pub")]
    app_name: String,

    #[getset(get = "pub")]
    prompt: String,

    #[getset(get = "pub")]
    input_code: String,

    #[getset(get = "pub")]
    output_code: String,

    #[getset(get = "pub")]
    build_output: String,

    #[getset(get = "pub")]
    is_release_candidate: bool,

    #[getset(get = "pub")]
    passthrough_reason: Option<String>,
}

impl NewIteration {
    pub fn new(app: String, used_prompt: String, used_input_code: String, revision: Revision, output: String) -> Self {
        let release_candidate = is_clean_build(&output);
        let (revised_code, reason) = match revision {
            Revision::Revised(code) => (code, None),
            Revision::Passthrough { code, reason } => (code, Some(reason)),
        };

        NewIteration {
            app_name: app,
            prompt: used_prompt,
            input_code: used_input_code,
            output_code: revised_code,
            build_output: output,
            is_release_candidate: release_candidate,
            passthrough_reason: reason,
        }
    }
}

/// A run counts as clean if it printed nothing but whitespace
pub fn is_clean_build(output: &str) -> bool {
    output.trim().is_empty()
}

impl Iteration {
    pub fn create(database_connection: &mut PgConnection, new_iteration: &NewIteration) -> Result<Iteration> {
        trace!("Creating Iteration in database: {:?}", new_iteration);
        diesel::insert_into(iterations::table)
            .values(new_iteration)
            .get_result::<Iteration>(database_connection)
            .with_context(|| format!("Recording iteration for '{}'", new_iteration.app_name()))
            .map_err(Error::from)
    }

    pub fn with_id(database_connection: &mut PgConnection, iteration_id: i32) -> Result<Option<Iteration>> {
        dsl::iterations
            .find(iteration_id)
            .get_result::<Iteration>(database_connection)
            .optional()
            .with_context(|| format!("Loading iteration {}", iteration_id))
            .map_err(Error::from)
    }

    /// All iterations of an application, oldest first
    pub fn for_app(database_connection: &mut PgConnection, name: &str) -> Result<Vec<Iteration>> {
        dsl::iterations
            .filter(app_name.eq(name))
            .order_by(id.asc())
            .load::<Iteration>(database_connection)
            .with_context(|| format!("Loading iterations of '{}'", name))
            .map_err(Error::from)
    }

    pub fn latest_for_app(database_connection: &mut PgConnection, name: &str) -> Result<Option<Iteration>> {
        dsl::iterations
            .filter(app_name.eq(name))
            .order_by(id.desc())
            .first::<Iteration>(database_connection)
            .optional()
            .with_context(|| format!("Loading latest iteration of '{}'", name))
            .map_err(Error::from)
    }

    pub fn delete(database_connection: &mut PgConnection, iteration_id: i32) -> Result<bool> {
        diesel::delete(dsl::iterations.find(iteration_id))
            .execute(database_connection)
            .with_context(|| format!("Deleting iteration {}", iteration_id))
            .map(|n| n > 0)
            .map_err(Error::from)
    }

    pub fn delete_for_app(database_connection: &mut PgConnection, name: &str) -> Result<usize> {
        diesel::delete(dsl::iterations.filter(app_name.eq(name)))
            .execute(database_connection)
            .with_context(|| format!("Deleting iterations of '{}'", name))
            .map_err(Error::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_release_candidate_iff_output_is_blank() {
        let mk = |output: &str| {
            NewIteration::new(
                String::from("demo"),
                String::from("p"),
                String::from("print(1)"),
                Revision::Revised(String::from("print(2)")),
                String::from(output),
            )
        };

        assert!(*mk("").is_release_candidate());
        assert!(*mk("  \n\t\r\n").is_release_candidate());
        assert!(!*mk("2\n").is_release_candidate());
        assert!(!*mk("Traceback (most recent call last):").is_release_candidate());
    }

    #[test]
    fn test_is_clean_build() {
        assert!(is_clean_build(""));
        assert!(is_clean_build(" \n"));
        assert!(!is_clean_build("Hello\n"));
    }

    #[test]
    fn test_passthrough_reason_is_kept() {
        let it = NewIteration::new(
            String::from("demo"),
            String::from("p"),
            String::from("print(1)"),
            Revision::Passthrough {
                code: String::from("print(1)"),
                reason: String::from("connection refused"),
            },
            String::from("1\n"),
        );

        assert_eq!(it.output_code(), it.input_code());
        assert_eq!(it.passthrough_reason().as_deref(), Some("connection refused"));
    }
}
