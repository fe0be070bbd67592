//
// Copyright (c) 2020-2022 science+computing ag and other contributors
//
// This program and the accompanying materials are made
// available under the terms of the Eclipse Public License 2.0
// which is available at https://www.eclipse.org/legal/epl-2.0/
//
// SPDX-License-Identifier: EPL-2.0
//

//! A `BuildStore` that keeps everything in memory, for testing the build loop without a database

use std::collections::BTreeMap;
use std::sync::Mutex;
use std::sync::MutexGuard;

use anyhow::anyhow;
use anyhow::Result;
use chrono::Utc;

use crate::db::Acceptance;
use crate::db::BuildStore;
use crate::db::Recorded;
use crate::db::SubmissionRequest;
use crate::db::models::Iteration;
use crate::db::models::NewIteration;
use crate::db::models::Submission;
use crate::guard::DuplicateGuard;
use crate::guard::GuardDecision;

#[derive(Default)]
struct Tables {
    submissions: BTreeMap<String, Submission>,
    iterations: Vec<Iteration>,
    next_iteration_id: i32,
}

#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

impl MemoryStore {
    fn lock(&self) -> Result<MutexGuard<'_, Tables>> {
        self.tables.lock().map_err(|_| anyhow!("Memory store lock poisoned"))
    }
}

impl BuildStore for MemoryStore {
    fn accept(&self, request: &SubmissionRequest, guard: &DuplicateGuard) -> Result<Acceptance> {
        let mut tables = self.lock()?;
        let last = tables.iterations.iter().rev().find(|i| i.app_name == *request.name());

        match guard.check(tables.submissions.get(request.name()), last, request.input_code()) {
            GuardDecision::Reject { identical_attempts } => Ok(Acceptance::Rejected {
                name: request.name().clone(),
                identical_attempts,
            }),

            GuardDecision::Pass { identical_attempts } => {
                let generation = tables.submissions
                    .get(request.name())
                    .map(|s| s.generation + 1)
                    .unwrap_or(1);

                let submission = Submission {
                    name: request.name().clone(),
                    prompt: request.prompt().clone(),
                    input_code: request.input_code().clone(),
                    language: *request.language(),
                    queued: true,
                    generation,
                    identical_attempts,
                    updated_at: Utc::now(),
                };

                tables.submissions.insert(submission.name.clone(), submission.clone());
                Ok(Acceptance::Queued(submission))
            },
        }
    }

    fn submission(&self, name: &str) -> Result<Option<Submission>> {
        Ok(self.lock()?.submissions.get(name).cloned())
    }

    fn submissions(&self) -> Result<Vec<Submission>> {
        Ok(self.lock()?.submissions.values().cloned().collect())
    }

    fn queued_names(&self) -> Result<Vec<String>> {
        let tables = self.lock()?;
        let mut queued = tables.submissions
            .values()
            .filter(|s| s.queued)
            .collect::<Vec<_>>();
        queued.sort_by_key(|s| s.updated_at);
        Ok(queued.into_iter().map(|s| s.name.clone()).collect())
    }

    fn iterations(&self, name: &str) -> Result<Vec<Iteration>> {
        Ok(self.lock()?.iterations.iter().filter(|i| i.app_name == name).cloned().collect())
    }

    fn iteration(&self, id: i32) -> Result<Option<Iteration>> {
        Ok(self.lock()?.iterations.iter().find(|i| i.id == id).cloned())
    }

    fn record_iteration(&self, new_iteration: &NewIteration, generation: i64) -> Result<Recorded> {
        let mut tables = self.lock()?;
        tables.next_iteration_id += 1;

        let iteration = Iteration {
            id: tables.next_iteration_id,
            app_name: new_iteration.app_name().clone(),
            prompt: new_iteration.prompt().clone(),
            input_code: new_iteration.input_code().clone(),
            output_code: new_iteration.output_code().clone(),
            build_output: new_iteration.build_output().clone(),
            is_release_candidate: *new_iteration.is_release_candidate(),
            passthrough_reason: new_iteration.passthrough_reason().clone(),
            created_at: Utc::now(),
        };
        tables.iterations.push(iteration.clone());

        let cleared = match tables.submissions.get_mut(new_iteration.app_name()) {
            Some(s) if s.generation == generation => {
                s.queued = false;
                true
            },
            _ => false,
        };

        Ok(Recorded { iteration, cleared })
    }

    fn unqueue(&self, name: &str) -> Result<bool> {
        Ok(self.lock()?
            .submissions
            .get_mut(name)
            .map(|s| s.queued = false)
            .is_some())
    }

    fn delete_submission(&self, name: &str, with_iterations: bool) -> Result<bool> {
        let mut tables = self.lock()?;
        if with_iterations {
            tables.iterations.retain(|i| i.app_name != name);
        }
        Ok(tables.submissions.remove(name).is_some())
    }

    fn delete_iteration(&self, id: i32) -> Result<bool> {
        let mut tables = self.lock()?;
        let before = tables.iterations.len();
        tables.iterations.retain(|i| i.id != id);
        Ok(tables.iterations.len() != before)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::language::Language;
    use crate::oracle::Revision;

    fn request(name: &str, code: &str) -> SubmissionRequest {
        SubmissionRequest::builder()
            .name(name)
            .prompt("fix it")
            .language(Language::Python)
            .input_code(code)
            .build()
    }

    fn record(store: &MemoryStore, s: &Submission, output: &str) -> Recorded {
        let new = NewIteration::new(
            s.name.clone(),
            s.prompt.clone(),
            s.input_code.clone(),
            Revision::Revised(s.input_code.clone()),
            String::from(output),
        );
        store.record_iteration(&new, s.generation).unwrap()
    }

    #[test]
    fn test_resubmission_overwrites_in_place() {
        let store = MemoryStore::default();
        let guard = DuplicateGuard::default();

        store.accept(&request("demo", "a"), &guard).unwrap();
        let second = store.accept(&request("demo", "b"), &guard).unwrap();

        let submissions = store.submissions().unwrap();
        assert_eq!(submissions.len(), 1);
        assert_eq!(submissions[0].input_code, "b");
        assert_eq!(submissions[0].generation, 2);
        assert!(matches!(second, Acceptance::Queued(ref s) if s.queued));
    }

    #[test]
    fn test_stale_generation_does_not_clear_queued() {
        let store = MemoryStore::default();
        let guard = DuplicateGuard::default();

        let first = match store.accept(&request("demo", "a"), &guard).unwrap() {
            Acceptance::Queued(s) => s,
            other => panic!("Unexpected: {:?}", other),
        };
        store.accept(&request("demo", "b"), &guard).unwrap();

        let recorded = record(&store, &first, "");
        assert!(!recorded.cleared);
        assert!(store.submission("demo").unwrap().unwrap().queued);
    }

    #[test]
    fn test_delete_submission_keeps_iterations_unless_asked() {
        let store = MemoryStore::default();
        let guard = DuplicateGuard::default();

        for name in ["a", "b"] {
            if let Acceptance::Queued(s) = store.accept(&request(name, "x"), &guard).unwrap() {
                record(&store, &s, "out");
            }
        }

        assert!(store.delete_submission("a", false).unwrap());
        assert_eq!(store.iterations("a").unwrap().len(), 1);

        assert!(store.delete_submission("b", true).unwrap());
        assert!(store.iterations("b").unwrap().is_empty());

        assert!(!store.delete_submission("b", true).unwrap());
    }
}
