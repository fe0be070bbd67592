//
// Copyright (c) 2020-2022 science+computing ag and other contributors
//
// This program and the accompanying materials are made
// available under the terms of the Eclipse Public License 2.0
// which is available at https://www.eclipse.org/legal/epl-2.0/
//
// SPDX-License-Identifier: EPL-2.0
//

mod build;
pub use build::build;

mod db;
pub use db::db;

mod iterations;
pub use iterations::delete_iteration;
pub use iterations::iteration;
pub use iterations::iterations;

mod status;
pub use status::delete_app;
pub use status::status;
pub use status::unqueue;

mod util;
