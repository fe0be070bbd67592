//
// Copyright (c) 2020-2022 science+computing ag and other contributors
//
// This program and the accompanying materials are made
// available under the terms of the Eclipse Public License 2.0
// which is available at https://www.eclipse.org/legal/epl-2.0/
//
// SPDX-License-Identifier: EPL-2.0
//

//! The build loop
//!
//! Requests go through the [`BuildQueue`], which persists them and hands out [`WorkToken`]s. A
//! single [`Worker`] consumes the tokens in order and runs one revise-execute-record pass per
//! token.

mod queue;
pub use queue::*;

mod worker;
pub use worker::*;
