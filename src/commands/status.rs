//
// Copyright (c) 2020-2022 science+computing ag and other contributors
//
// This program and the accompanying materials are made
// available under the terms of the Eclipse Public License 2.0
// which is available at https://www.eclipse.org/legal/epl-2.0/
//
// SPDX-License-Identifier: EPL-2.0
//

//! Implementation of the application related subcommands

use anyhow::anyhow;
use anyhow::Result;
use clap::ArgMatches;
use tracing::info;

use crate::commands::util::display_data;
use crate::commands::util::mk_header;
use crate::commands::util::yes_no;
use crate::db::BuildStore;

/// Implementation of the "status" subcommand
pub fn status(store: &dyn BuildStore, matches: &ArgMatches) -> Result<()> {
    let csv = matches.get_flag("csv");
    let only_queued = matches.get_flag("queued");

    let hdrs = mk_header(vec!["Name", "Language", "Queued", "Identical attempts", "Updated"]);
    let data = store
        .submissions()?
        .into_iter()
        .filter(|s| !only_queued || s.queued)
        .map(|s| {
            vec![
                s.name,
                s.language.to_string(),
                yes_no(s.queued).to_string(),
                s.identical_attempts.to_string(),
                s.updated_at.format("%Y-%m-%d %H:%M:%S").to_string(),
            ]
        })
        .collect::<Vec<_>>();

    display_data(hdrs, data, csv)
}

fn name_arg(matches: &ArgMatches) -> Result<&String> {
    matches
        .get_one::<String>("name")
        .ok_or_else(|| anyhow!("No application name given"))
}

/// Implementation of the "unqueue" subcommand
pub fn unqueue(store: &dyn BuildStore, matches: &ArgMatches) -> Result<()> {
    let name = name_arg(matches)?;
    if store.unqueue(name)? {
        info!("Removed '{}' from the build queue", name);
        Ok(())
    } else {
        Err(anyhow!("No application named '{}'", name))
    }
}

/// Implementation of the "delete-app" subcommand
pub fn delete_app(store: &dyn BuildStore, matches: &ArgMatches) -> Result<()> {
    let name = name_arg(matches)?;
    let with_iterations = matches.get_flag("with_iterations");

    if store.delete_submission(name, with_iterations)? {
        info!("Deleted '{}'", name);
    } else {
        info!("No application named '{}', nothing deleted", name);
    }
    Ok(())
}
