//
// Copyright (c) 2020-2022 science+computing ag and other contributors
//
// This program and the accompanying materials are made
// available under the terms of the Eclipse Public License 2.0
// which is available at https://www.eclipse.org/legal/epl-2.0/
//
// SPDX-License-Identifier: EPL-2.0
//

use anyhow::anyhow;
use anyhow::Result;
use clap::ArgMatches;
use diesel::pg::PgConnection;
use diesel::r2d2::ConnectionManager;
use diesel::r2d2::Pool;

use crate::db::run_migrations;

/// Implementation of the "db" subcommand
pub fn db(pool: &Pool<ConnectionManager<PgConnection>>, matches: &ArgMatches) -> Result<()> {
    match matches.subcommand() {
        Some(("setup", _)) => run_migrations(pool),
        Some((other, _)) => Err(anyhow!("Unknown subcommand: {}", other)),
        None => Err(anyhow!("No subcommand")),
    }
}
