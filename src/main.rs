//
// Copyright (c) 2020-2022 science+computing ag and other contributors
//
// This program and the accompanying materials are made
// available under the terms of the Eclipse Public License 2.0
// which is available at https://www.eclipse.org/legal/epl-2.0/
//
// SPDX-License-Identifier: EPL-2.0
//

#![deny(
    anonymous_parameters,
    bad_style,
    improper_ctypes,
    no_mangle_generic_items,
    non_shorthand_field_patterns,
    overflowing_literals,
    path_statements,
    patterns_in_fns_without_body,
    trivial_numeric_casts,
    unconditional_recursion,
    unsafe_code,
    unused_allocation,
    unused_comparisons,
    unused_extern_crates,
    unused_import_braces,
    unused_parens,
    while_true
)]
#![allow(macro_use_extern_crate)]

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::anyhow;
use anyhow::Context;
use anyhow::Result;
use tracing::debug;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::EnvFilter;

mod cli;
mod commands;
mod config;
mod consts;
mod db;
mod guard;
mod language;
mod oracle;
mod orchestrator;
mod sandbox;
mod schema;
mod util;

use crate::config::*;
use crate::db::DbConnectionConfig;
use crate::db::PgStore;
use crate::oracle::HttpOracle;
use crate::sandbox::DockerSandbox;
use crate::util::progress::ProgressBars;

#[tokio::main]
async fn main() -> Result<()> {
    human_panic::setup_panic!();

    let cli = cli::cli().get_matches();
    setup_logging(cli.get_flag("verbose"));
    debug!("Debugging enabled");

    let config_path = cli
        .get_one::<String>("config")
        .map(PathBuf::from)
        .ok_or_else(|| anyhow!("No configuration file given"))?;
    let config = load_config(&config_path)?;

    let hide_bars = cli.get_flag("hide_bars") || crate::util::stdout_is_pipe();
    let progressbars = ProgressBars::setup(config.spinner_format().clone(), hide_bars);

    let pool = DbConnectionConfig::parse(&config, &cli)?.establish_pool()?;
    let store = Arc::new(PgStore::new(pool.clone()));

    match cli.subcommand() {
        Some(("db", matches)) => crate::commands::db(&pool, matches)?,

        Some(("build", matches)) => {
            let oracle = Arc::new(HttpOracle::new(config.oracle())?);
            let sandbox = Arc::new(DockerSandbox::setup(&config).await?);
            crate::commands::build(matches, &config, progressbars, store, oracle, sandbox).await?
        },

        Some(("iterations", matches)) => crate::commands::iterations(store.as_ref(), matches)?,
        Some(("iteration", matches)) => crate::commands::iteration(store.as_ref(), matches)?,
        Some(("status", matches)) => crate::commands::status(store.as_ref(), matches)?,
        Some(("unqueue", matches)) => crate::commands::unqueue(store.as_ref(), matches)?,
        Some(("delete-app", matches)) => crate::commands::delete_app(store.as_ref(), matches)?,
        Some(("delete-iteration", matches)) => crate::commands::delete_iteration(store.as_ref(), matches)?,

        Some((other, _)) => return Err(anyhow!("Unknown subcommand: {}", other)),
        None => return Err(anyhow!("No subcommand")),
    }

    Ok(())
}

fn setup_logging(verbose: bool) {
    let mut filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    if verbose {
        filter = filter.add_directive(LevelFilter::DEBUG.into());
    }

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(path: &std::path::Path) -> Result<Configuration> {
    if !path.is_file() {
        return Err(anyhow!("Configuration file not found: {}", path.display()))
    }

    ::config::Config::builder()
        .add_source(::config::File::from(path).required(true))
        // Add in settings from the environment (with a prefix of BUILDINATOR)
        // Eg.. `BUILDINATOR_ORACLE__API_KEY=secret ./target/buildinator` would set `oracle.api_key`
        .add_source(::config::Environment::with_prefix("BUILDINATOR")
            .prefix_separator("_")
            .separator("__"))
        .build()
        .with_context(|| anyhow!("Loading configuration from {}", path.display()))?
        .try_deserialize::<NotValidatedConfiguration>()
        .with_context(|| anyhow!("Parsing configuration from {}", path.display()))?
        .validate()
}
