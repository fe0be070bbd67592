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

use anyhow::anyhow;
use anyhow::Result;
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::sync::mpsc::UnboundedSender;
use tracing::debug;
use tracing::info;

use crate::db::Acceptance;
use crate::db::BuildStore;
use crate::db::SubmissionRequest;
use crate::guard::DuplicateGuard;

/// A reference to a submission waiting for a build
///
/// The token only carries the name. The worker reads the current state of the submission when
/// it gets to the token.
#[derive(parse_display::Display, Clone, Debug, Eq, PartialEq, Hash)]
#[display("{0}")]
pub struct WorkToken(String);

impl WorkToken {
    pub fn name(&self) -> &str {
        &self.0
    }
}

impl From<&str> for WorkToken {
    fn from(s: &str) -> Self {
        WorkToken(s.to_string())
    }
}

/// The sending end of the build queue
#[derive(Clone)]
pub struct BuildQueue {
    store: Arc<dyn BuildStore>,
    guard: DuplicateGuard,
    sender: UnboundedSender<WorkToken>,
}

impl BuildQueue {
    /// Create a queue, the receiving end belongs to the worker
    pub fn new(store: Arc<dyn BuildStore>, guard: DuplicateGuard) -> (Self, UnboundedReceiver<WorkToken>) {
        let (sender, receiver) = tokio::sync::mpsc::unbounded_channel();
        (BuildQueue { store, guard, sender }, receiver)
    }

    /// Persist a build request and enqueue it, unless the duplicate guard refuses it
    pub fn submit(&self, request: &SubmissionRequest) -> Result<Acceptance> {
        let acceptance = self.store.accept(request, &self.guard)?;
        match acceptance {
            Acceptance::Queued(ref submission) => {
                self.enqueue(&submission.name)?;
                info!("Queued '{}' (generation {})", submission.name, submission.generation);
            },
            Acceptance::Rejected { ref name, identical_attempts } => {
                info!("Not queueing '{}': {} identical iterations", name, identical_attempts);
            },
        }
        Ok(acceptance)
    }

    /// Enqueue all submissions that are marked as queued in the store
    ///
    /// Tokens do not survive a restart, the queued flags do.
    pub fn requeue_pending(&self) -> Result<Vec<String>> {
        let names = self.store.queued_names()?;
        for name in names.iter() {
            self.enqueue(name)?;
        }
        debug!("Requeued {} pending submissions", names.len());
        Ok(names)
    }

    fn enqueue(&self, name: &str) -> Result<()> {
        self.sender
            .send(WorkToken::from(name))
            .map_err(|_| anyhow!("Build worker is gone, cannot enqueue '{}'", name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::db::MemoryStore;
    use crate::language::Language;

    fn request(name: &str, code: &str) -> SubmissionRequest {
        SubmissionRequest::builder()
            .name(name)
            .prompt("make it work")
            .language(Language::Python)
            .input_code(code)
            .build()
    }

    #[tokio::test]
    async fn test_submit_enqueues_in_order() {
        let store = Arc::new(MemoryStore::default());
        let (queue, mut tokens) = BuildQueue::new(store.clone(), DuplicateGuard::default());

        for name in ["a", "b", "c"] {
            assert!(!queue.submit(&request(name, "x = 1")).unwrap().is_rejected());
        }
        drop(queue);

        let mut received = Vec::new();
        while let Some(token) = tokens.recv().await {
            received.push(token.name().to_string());
        }
        assert_eq!(received, vec!["a", "b", "c"]);
        assert_eq!(store.queued_names().unwrap(), vec!["a", "b", "c"]);
    }

    #[tokio::test]
    async fn test_requeue_pending() {
        let store = Arc::new(MemoryStore::default());
        let (queue, tokens) = BuildQueue::new(store.clone(), DuplicateGuard::default());
        queue.submit(&request("a", "x = 1")).unwrap();
        queue.submit(&request("b", "x = 2")).unwrap();
        store.unqueue("a").unwrap();
        drop(tokens);

        // a fresh queue after a restart
        let (queue, mut tokens) = BuildQueue::new(store, DuplicateGuard::default());
        assert_eq!(queue.requeue_pending().unwrap(), vec!["b"]);
        assert_eq!(tokens.recv().await, Some(WorkToken::from("b")));
    }

    #[test]
    fn test_enqueue_without_worker_fails() {
        let store = Arc::new(MemoryStore::default());
        let (queue, tokens) = BuildQueue::new(store, DuplicateGuard::default());
        drop(tokens);
        assert!(queue.submit(&request("a", "x = 1")).is_err());
    }
}
