//
// Copyright (c) 2020-2022 science+computing ag and other contributors
//
// This program and the accompanying materials are made
// available under the terms of the Eclipse Public License 2.0
// which is available at https://www.eclipse.org/legal/epl-2.0/
//
// SPDX-License-Identifier: EPL-2.0
//

pub fn default_spinner_format() -> String {
    String::from("{spinner} [{elapsed_precise}] {msg}")
}

pub fn default_max_identical_iterations() -> usize {
    crate::guard::DEFAULT_MAX_IDENTICAL_ITERATIONS
}

pub fn default_max_tokens() -> u32 {
    65536
}

pub fn default_temperature() -> f32 {
    0.8
}

pub fn default_top_p() -> f32 {
    0.95
}
