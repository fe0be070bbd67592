//
// Copyright (c) 2020-2022 science+computing ag and other contributors
//
// This program and the accompanying materials are made
// available under the terms of the Eclipse Public License 2.0
// which is available at https://www.eclipse.org/legal/epl-2.0/
//
// SPDX-License-Identifier: EPL-2.0
//

pub mod docker;
pub mod progress;
pub mod tty;

pub fn stdout_is_pipe() -> bool {
    !atty::is(atty::Stream::Stdout)
}
