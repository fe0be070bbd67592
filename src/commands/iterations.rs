//
// Copyright (c) 2020-2022 science+computing ag and other contributors
//
// This program and the accompanying materials are made
// available under the terms of the Eclipse Public License 2.0
// which is available at https://www.eclipse.org/legal/epl-2.0/
//
// SPDX-License-Identifier: EPL-2.0
//

//! Implementation of the iteration related subcommands

use std::io::Write;

use anyhow::anyhow;
use anyhow::Result;
use clap::ArgMatches;
use colored::Colorize;
use tracing::info;

use crate::commands::util::display_data;
use crate::commands::util::first_line;
use crate::commands::util::mk_header;
use crate::commands::util::yes_no;
use crate::db::BuildStore;

/// Implementation of the "iterations" subcommand
pub fn iterations(store: &dyn BuildStore, matches: &ArgMatches) -> Result<()> {
    let csv = matches.get_flag("csv");
    let name = matches
        .get_one::<String>("name")
        .ok_or_else(|| anyhow!("No application name given"))?;

    let hdrs = mk_header(vec!["Id", "Created", "Release candidate", "Revised", "Output"]);
    let data = store
        .iterations(name)?
        .into_iter()
        .map(|it| {
            vec![
                it.id.to_string(),
                it.created_at.format("%Y-%m-%d %H:%M:%S").to_string(),
                yes_no(it.is_release_candidate).to_string(),
                yes_no(it.passthrough_reason.is_none()).to_string(),
                first_line(&it.build_output).to_string(),
            ]
        })
        .collect::<Vec<_>>();

    if data.is_empty() {
        info!("No iterations for '{}'", name);
    }

    display_data(hdrs, data, csv)
}

/// Implementation of the "iteration" subcommand
pub fn iteration(store: &dyn BuildStore, matches: &ArgMatches) -> Result<()> {
    let id = *matches
        .get_one::<i32>("id")
        .ok_or_else(|| anyhow!("No iteration id given"))?;

    let it = store
        .iteration(id)?
        .ok_or_else(|| anyhow!("No iteration with id {}", id))?;

    let revised = match it.passthrough_reason.as_ref() {
        None => "yes".green().to_string(),
        Some(reason) => format!("{} ({})", "no".red(), reason),
    };

    let s = indoc::formatdoc!(
        r#"
            Iteration:          {id}
            Application:        {app_name}
            Created:            {created_at}
            Release candidate:  {release_candidate}
            Revised:            {revised}

            Prompt:
            {prompt}

            ---- Input code ----
            {input_code}
            ---- Output code ----
            {output_code}
            ---- Build output ----
            {build_output}
        "#,
        id = if it.is_release_candidate {
            it.id.to_string().green()
        } else {
            it.id.to_string().red()
        },
        app_name = it.app_name.cyan(),
        created_at = it.created_at.to_string().cyan(),
        release_candidate = yes_no(it.is_release_candidate),
        revised = revised,
        prompt = it.prompt,
        input_code = it.input_code,
        output_code = it.output_code,
        build_output = it.build_output,
    );

    let out = std::io::stdout();
    let mut lock = out.lock();
    writeln!(lock, "{}", s).map_err(anyhow::Error::from)
}

/// Implementation of the "delete-iteration" subcommand
pub fn delete_iteration(store: &dyn BuildStore, matches: &ArgMatches) -> Result<()> {
    let id = *matches
        .get_one::<i32>("id")
        .ok_or_else(|| anyhow!("No iteration id given"))?;

    if store.delete_iteration(id)? {
        info!("Deleted iteration {}", id);
    } else {
        info!("No iteration with id {}, nothing deleted", id);
    }
    Ok(())
}
