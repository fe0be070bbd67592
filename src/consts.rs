//
// Copyright (c) 2020-2022 science+computing ag and other contributors
//
// This program and the accompanying materials are made
// available under the terms of the Eclipse Public License 2.0
// which is available at https://www.eclipse.org/legal/epl-2.0/
//
// SPDX-License-Identifier: EPL-2.0
//

/// The directory inside the container the submitted code is copied to. It is also the working
/// directory of the profile command.
pub const SOURCE_DIR_PATH: &str = "/app";

/// Prefix of the build output that is recorded if the sandbox itself failed
pub const SANDBOX_ERROR_PREFIX: &str = "buildinator: sandbox error:";
