//
// Copyright (c) 2020-2022 science+computing ag and other contributors
//
// This program and the accompanying materials are made
// available under the terms of the Eclipse Public License 2.0
// which is available at https://www.eclipse.org/legal/epl-2.0/
//
// SPDX-License-Identifier: EPL-2.0
//

//! Rejection of repeated no-op resubmissions

use getset::CopyGetters;

use crate::db::models::Iteration;
use crate::db::models::Submission;

pub const DEFAULT_MAX_IDENTICAL_ITERATIONS: usize = 3;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum GuardDecision {
    /// Accept the request, storing the new attempt count on the submission
    Pass { identical_attempts: i32 },

    /// Too many identical iterations, the request must not be enqueued
    Reject { identical_attempts: i32 },
}

impl GuardDecision {
    pub fn is_rejected(&self) -> bool {
        matches!(self, GuardDecision::Reject { .. })
    }
}

#[derive(Clone, Copy, Debug, CopyGetters)]
pub struct DuplicateGuard {
    #[getset(get_copy = "pub")]
    threshold: usize,
}

impl Default for DuplicateGuard {
    fn default() -> Self {
        DuplicateGuard::new(DEFAULT_MAX_IDENTICAL_ITERATIONS)
    }
}

impl DuplicateGuard {
    /// A threshold of zero would reject everything, it is treated as one
    pub fn new(threshold: usize) -> Self {
        DuplicateGuard { threshold: threshold.max(1) }
    }

    /// Decide about a new request for an application
    ///
    /// The attempt count starts at one for every request whose input code differs from the input
    /// code of the latest recorded iteration, and grows by one for every request that repeats it.
    /// An application without iterations always passes.
    pub fn check(&self, previous: Option<&Submission>, last_iteration: Option<&Iteration>, input_code: &str) -> GuardDecision {
        let last_iteration = match last_iteration {
            Some(it) => it,
            None => return GuardDecision::Pass { identical_attempts: 1 },
        };

        if last_iteration.input_code != input_code {
            return GuardDecision::Pass { identical_attempts: 1 };
        }

        let attempts = previous
            .map(|s| s.identical_attempts)
            .unwrap_or(1)
            .saturating_add(1);

        if attempts as usize >= self.threshold {
            GuardDecision::Reject { identical_attempts: attempts }
        } else {
            GuardDecision::Pass { identical_attempts: attempts }
        }
    }
}
