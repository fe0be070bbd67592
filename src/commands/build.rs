//
// Copyright (c) 2020-2022 science+computing ag and other contributors
//
// This program and the accompanying materials are made
// available under the terms of the Eclipse Public License 2.0
// which is available at https://www.eclipse.org/legal/epl-2.0/
//
// SPDX-License-Identifier: EPL-2.0
//

//! Implementation of the "build" subcommand

use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;

use anyhow::anyhow;
use anyhow::Context;
use anyhow::Result;
use clap::ArgMatches;
use colored::Colorize;
use tokio::sync::mpsc::UnboundedReceiver;
use tracing::debug;
use tracing::info;

use crate::config::Configuration;
use crate::db::models::Iteration;
use crate::db::Acceptance;
use crate::db::BuildStore;
use crate::db::SubmissionRequest;
use crate::guard::DuplicateGuard;
use crate::language::Language;
use crate::oracle::RevisionOracle;
use crate::orchestrator::BuildQueue;
use crate::orchestrator::PassOutcome;
use crate::orchestrator::PassReport;
use crate::orchestrator::Worker;
use crate::sandbox::Sandbox;
use crate::util::progress::ProgressBars;

/// How the passes for the submitted application ended
#[derive(Debug, Default)]
struct BuildOutcome {
    passes: u32,
    last: Option<Iteration>,
    release_candidate: bool,
    rejected: bool,
    failure: Option<String>,
}

/// Implementation of the "build" subcommand
pub async fn build(
    matches: &ArgMatches,
    config: &Configuration,
    progressbars: ProgressBars,
    store: Arc<dyn BuildStore>,
    oracle: Arc<dyn RevisionOracle>,
    sandbox: Arc<dyn Sandbox>,
) -> Result<()> {
    let name = matches
        .get_one::<String>("name")
        .ok_or_else(|| anyhow!("No application name given"))?;
    let language = matches
        .get_one::<String>("language")
        .map(|s| Language::from_str(s))
        .transpose()?
        .ok_or_else(|| anyhow!("No language given"))?;
    let prompt = matches
        .get_one::<String>("prompt")
        .ok_or_else(|| anyhow!("No prompt given"))?;
    let max_iterations = matches.get_one::<u32>("max_iterations").copied().unwrap_or(1);

    let input_code = match matches.get_one::<PathBuf>("code_file") {
        Some(path) => tokio::fs::read_to_string(path)
            .await
            .with_context(|| anyhow!("Reading code from {}", path.display()))?,
        None => matches
            .get_one::<String>("code")
            .cloned()
            .ok_or_else(|| anyhow!("No code given"))?,
    };

    let request = SubmissionRequest::builder()
        .name(name.clone())
        .prompt(prompt.clone())
        .language(language)
        .input_code(input_code)
        .build();

    let guard = DuplicateGuard::new(config.max_identical_iterations());
    let (queue, tokens) = BuildQueue::new(store.clone(), guard);
    let (report_sender, reports) = tokio::sync::mpsc::unbounded_channel();
    let worker = Worker::builder()
        .store(store)
        .oracle(oracle)
        .sandbox(sandbox)
        .reports(Some(report_sender))
        .build();
    let worker = tokio::spawn(worker.run(tokens));

    let bar = progressbars.spinner(format!("Building '{}'", name));
    let outcome = drive(queue, reports, request, max_iterations, |report| {
        bar.suspend(|| print_report(report));
        bar.set_message(format!("Building '{}' ({})", name, report.name));
    })
    .await;
    bar.finish_and_clear();
    let outcome = outcome?;
    worker.await?;

    debug!("Outcome for '{}': {:?}", name, outcome);
    if let Some(failure) = outcome.failure {
        return Err(anyhow!("Building '{}' failed: {}", name, failure))
    }

    if outcome.rejected {
        return Err(anyhow!("Not building '{}': too many identical iterations", name))
    }

    match outcome.last {
        Some(it) if outcome.release_candidate => {
            println!("{}: iteration {} is a release candidate", name.cyan(), it.id.to_string().green());
        },
        Some(it) => {
            println!("{}: no release candidate after {} passes, latest is iteration {}",
                name.cyan(), outcome.passes, it.id.to_string().red());
        },
        None => {
            println!("{}: nothing was built", name.cyan());
        },
    }
    Ok(())
}

fn print_report(report: &PassReport) {
    match &report.outcome {
        PassOutcome::Recorded { iteration, .. } => {
            if iteration.is_release_candidate {
                println!("{} iteration {}: {}", report.name.cyan(), iteration.id, "clean build".green());
            } else {
                println!("{} iteration {}: {}\n{}", report.name.cyan(), iteration.id, "build output".red(), iteration.build_output.trim_end());
            }
        },
        PassOutcome::Skipped => debug!("Skipped '{}'", report.name),
        PassOutcome::Failed(e) => println!("{} {}: {}", report.name.cyan(), "failed".red(), e),
    }
}

/// Submit `request`, feed the output code of failing passes back in and collect reports until
/// the worker drained the queue
///
/// Submissions that were left queued by an earlier process are built as well.
async fn drive<F>(
    queue: BuildQueue,
    mut reports: UnboundedReceiver<PassReport>,
    request: SubmissionRequest,
    max_iterations: u32,
    mut on_report: F,
) -> Result<BuildOutcome>
where
    F: FnMut(&PassReport),
{
    let pending = queue.requeue_pending()?;
    if !pending.is_empty() {
        info!("Resuming {} pending submissions: {}", pending.len(), pending.join(", "));
    }

    // Tokens for our name the worker did not report on yet
    let mut outstanding = pending.iter().filter(|n| *n == request.name()).count();
    let mut outcome = BuildOutcome::default();

    let mut queue = match queue.submit(&request)? {
        Acceptance::Queued(_) => {
            outstanding += 1;
            Some(queue)
        },
        Acceptance::Rejected { .. } => {
            // Without a sender left the worker drains what is pending and stops
            drop(queue);
            outcome.rejected = true;
            None
        },
    };

    while let Some(report) = reports.recv().await {
        on_report(&report);
        if report.name != *request.name() || queue.is_none() {
            continue
        }
        outstanding = outstanding.saturating_sub(1);

        match report.outcome {
            PassOutcome::Skipped => {},
            PassOutcome::Failed(e) => {
                outcome.failure = Some(e);
                queue = None;
            },
            PassOutcome::Recorded { iteration, cleared } => {
                outcome.passes += 1;

                // A pass that raced with a resubmission is followed by another one
                if cleared {
                    if iteration.is_release_candidate {
                        outcome.release_candidate = true;
                        queue = None;
                    } else if outcome.passes >= max_iterations {
                        queue = None;
                    } else if let Some(q) = queue.as_ref() {
                        let next = SubmissionRequest::builder()
                            .name(request.name().clone())
                            .prompt(request.prompt().clone())
                            .language(*request.language())
                            .input_code(iteration.output_code.clone())
                            .build();

                        match q.submit(&next)? {
                            Acceptance::Queued(_) => outstanding += 1,
                            Acceptance::Rejected { .. } => {
                                outcome.rejected = true;
                                queue = None;
                            },
                        }
                    }
                }
                outcome.last = Some(iteration);
            },
        }

        if outstanding == 0 {
            queue = None;
        }
    }

    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::time::Duration;

    use crate::db::models::NewIteration;
    use crate::db::MemoryStore;
    use crate::oracle::tests::ScriptedOracle;
    use crate::oracle::Revision;
    use crate::sandbox::tests::ScriptedSandbox;

    const FAILING: &str = "print(1/0)";
    const ERROR: &str = "ZeroDivisionError: division by zero\n";

    fn request(name: &str, code: &str) -> SubmissionRequest {
        SubmissionRequest::builder()
            .name(name)
            .prompt("print a number")
            .language(Language::Python)
            .input_code(code)
            .build()
    }

    /// Accept `code` for `name` and record a failing pass for it
    fn record_failing(store: &MemoryStore, name: &str, code: &str) {
        let submission = match store.accept(&request(name, code), &DuplicateGuard::default()).unwrap() {
            Acceptance::Queued(s) => s,
            other => panic!("Expected '{}' to be queued, got {:?}", name, other),
        };
        let new = NewIteration::new(
            submission.name.clone(),
            submission.prompt.clone(),
            submission.input_code.clone(),
            Revision::Revised(String::from(FAILING)),
            String::from(ERROR),
        );
        store.record_iteration(&new, submission.generation).unwrap();
    }

    async fn run(
        store: Arc<MemoryStore>,
        oracle: ScriptedOracle,
        sandbox: ScriptedSandbox,
        request: SubmissionRequest,
        max_iterations: u32,
    ) -> (BuildOutcome, Vec<PassReport>) {
        let (queue, tokens) = BuildQueue::new(store.clone(), DuplicateGuard::default());
        let (report_sender, reports) = tokio::sync::mpsc::unbounded_channel();
        let worker = Worker::builder()
            .store(store)
            .oracle(Arc::new(oracle))
            .sandbox(Arc::new(sandbox))
            .reports(Some(report_sender))
            .build();
        let worker = tokio::spawn(worker.run(tokens));

        let mut seen = Vec::new();
        let outcome = drive(queue, reports, request, max_iterations, |r| seen.push(r.clone()))
            .await
            .unwrap();
        worker.await.unwrap();
        (outcome, seen)
    }

    #[tokio::test]
    async fn test_single_pass() {
        let store = Arc::new(MemoryStore::default());
        let (outcome, reports) = run(
            store.clone(),
            ScriptedOracle::always(FAILING, 1),
            ScriptedSandbox::new([ERROR]),
            request("demo", FAILING),
            1,
        )
        .await;

        assert_eq!(outcome.passes, 1);
        assert!(!outcome.release_candidate);
        assert!(!outcome.rejected);
        assert_eq!(reports.len(), 1);
        assert_eq!(store.iterations("demo").unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_stops_at_release_candidate() {
        let store = Arc::new(MemoryStore::default());
        let (outcome, _) = run(
            store.clone(),
            ScriptedOracle::new(vec![
                Ok(format!("```\n{}\n```", FAILING)),
                Ok(String::from("```\nprint(1)\n```")),
            ]),
            ScriptedSandbox::new([ERROR, "1\n"]),
            request("demo", "prin(1)"),
            5,
        )
        .await;

        // "1\n" is output, so the second pass is not clean either, the third is
        assert_eq!(outcome.passes, 3);
        assert!(outcome.release_candidate);

        let iterations = store.iterations("demo").unwrap();
        assert_eq!(iterations.len(), 3);
        assert_eq!(iterations[1].input_code, format!("{}\n", FAILING));
        assert_eq!(iterations[2].input_code, "print(1)\n");
        assert!(iterations[2].is_release_candidate);
        assert!(!store.submission("demo").unwrap().unwrap().queued);
    }

    #[tokio::test]
    async fn test_identical_resubmissions_are_rejected() {
        let store = Arc::new(MemoryStore::default());
        let (outcome, _) = run(
            store.clone(),
            ScriptedOracle::always(FAILING, 5),
            ScriptedSandbox::new([ERROR; 5]),
            request("demo", "x"),
            5,
        )
        .await;

        // x -> print(1/0), then print(1/0) twice more until the guard refuses
        assert!(outcome.rejected);
        assert_eq!(outcome.passes, 3);
        assert_eq!(store.iterations("demo").unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_rejected_first_submission_returns() {
        let store = Arc::new(MemoryStore::default());
        record_failing(&store, "demo", "x");
        record_failing(&store, "demo", "x");

        let (outcome, reports) = tokio::time::timeout(Duration::from_secs(5), run(
            store.clone(),
            ScriptedOracle::new(Vec::new()),
            ScriptedSandbox::new(Vec::new()),
            request("demo", "x"),
            3,
        ))
        .await
        .expect("build did not return after the submission was rejected");

        assert!(outcome.rejected);
        assert_eq!(outcome.passes, 0);
        assert!(outcome.last.is_none());
        assert!(reports.is_empty());
        assert_eq!(store.iterations("demo").unwrap().len(), 2);
        assert!(!store.submission("demo").unwrap().unwrap().queued);
    }

    #[tokio::test]
    async fn test_rejected_first_submission_still_builds_pending() {
        let store = Arc::new(MemoryStore::default());
        record_failing(&store, "demo", "x");
        record_failing(&store, "demo", "x");
        store.accept(&request("left-over", "y = 1"), &DuplicateGuard::default()).unwrap();

        let (outcome, reports) = tokio::time::timeout(Duration::from_secs(5), run(
            store.clone(),
            ScriptedOracle::new(Vec::new()),
            ScriptedSandbox::new(Vec::new()),
            request("demo", "x"),
            3,
        ))
        .await
        .expect("build did not return after the submission was rejected");

        assert!(outcome.rejected);
        assert_eq!(outcome.passes, 0);
        let names = reports.iter().map(|r| r.name.as_str()).collect::<Vec<_>>();
        assert_eq!(names, vec!["left-over"]);
        assert!(store.queued_names().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_pending_submissions_are_built_too() {
        let store = Arc::new(MemoryStore::default());
        store.accept(&request("left-over", "y = 1"), &DuplicateGuard::default()).unwrap();

        let (outcome, reports) = run(
            store.clone(),
            ScriptedOracle::new(Vec::new()),
            ScriptedSandbox::new(Vec::new()),
            request("demo", "x = 1"),
            1,
        )
        .await;

        assert!(outcome.release_candidate);
        let names = reports.iter().map(|r| r.name.as_str()).collect::<Vec<_>>();
        assert_eq!(names, vec!["left-over", "demo"]);
        assert!(store.queued_names().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_pending_duplicate_of_own_name() {
        let store = Arc::new(MemoryStore::default());
        store.accept(&request("demo", "y = 1"), &DuplicateGuard::default()).unwrap();

        let (outcome, reports) = run(
            store.clone(),
            ScriptedOracle::new(Vec::new()),
            ScriptedSandbox::new(Vec::new()),
            request("demo", "x = 1"),
            1,
        )
        .await;

        assert!(outcome.release_candidate);
        assert_eq!(outcome.passes, 1);
        assert_eq!(reports.len(), 2);
        assert_eq!(reports[1].outcome, PassOutcome::Skipped);
        assert_eq!(store.iterations("demo").unwrap()[0].input_code, "x = 1");
    }
}
