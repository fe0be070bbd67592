//
// Copyright (c) 2020-2022 science+computing ag and other contributors
//
// This program and the accompanying materials are made
// available under the terms of the Eclipse Public License 2.0
// which is available at https://www.eclipse.org/legal/epl-2.0/
//
// SPDX-License-Identifier: EPL-2.0
//

use clap::crate_authors;
use clap::crate_version;
use clap::Arg;
use clap::ArgAction;
use clap::ArgGroup;
use clap::Command;

use crate::language::Language;

pub fn cli() -> Command {
    Command::new("buildinator")
        .author(crate_authors!())
        .version(crate_version!())
        .about("Revise code with a language model and build it in a sandbox until it builds clean")
        .after_help(r#"
        The following environment variables can be passed to buildinator:

            RUST_LOG - to enable logging, for exact usage see the rust cookbook

            BUILDINATOR_<KEY> - to override configuration values, nested keys are separated
                                by "__", e.g. BUILDINATOR_ORACLE__API_KEY
        "#)
        .subcommand_required(true)
        .arg_required_else_help(true)

        .arg(Arg::new("config")
            .required(false)
            .long("config")
            .short('c')
            .value_name("FILE")
            .default_value("config.toml")
            .help("Path to the configuration file")
        )

        .arg(Arg::new("verbose")
            .required(false)
            .long("verbose")
            .short('v')
            .action(ArgAction::SetTrue)
            .help("Log on debug level")
        )

        .arg(Arg::new("hide_bars")
            .required(false)
            .long("hide-bars")
            .action(ArgAction::SetTrue)
            .help("Hide all progress bars")
        )

        .arg(Arg::new("database_host")
            .required(false)
            .long("db-url")
            .value_name("HOST")
            .help("Overwrite the database host set via configuration. Can also be overriden via environment, but this setting has presendence.")
        )
        .arg(Arg::new("database_port")
            .required(false)
            .long("db-port")
            .value_name("PORT")
            .help("Overwrite the database port set via configuration. Can also be overriden via environment, but this setting has presendence.")
        )
        .arg(Arg::new("database_user")
            .required(false)
            .long("db-user")
            .value_name("USER")
            .help("Overwrite the database user set via configuration. Can also be overriden via environment, but this setting has presendence.")
        )
        .arg(Arg::new("database_password")
            .required(false)
            .long("db-password")
            .value_name("PASSWORD")
            .help("Overwrite the database password set via configuration. Can also be overriden via environment, but this setting has presendence.")
        )
        .arg(Arg::new("database_name")
            .required(false)
            .long("db-name")
            .value_name("NAME")
            .help("Overwrite the database name set via configuration. Can also be overriden via environment, but this setting has presendence.")
        )
        .arg(Arg::new("database_connection_timeout")
            .required(false)
            .long("db-timeout")
            .value_name("TIMEOUT")
            .help("Overwrite the database connection timeout set via configuration. Can also be overriden via environment, but this setting has presendence.")
        )

        .subcommand(Command::new("db")
            .about("Database CLI interface")
            .subcommand_required(true)
            .arg_required_else_help(true)
            .subcommand(Command::new("setup")
                .about("Run all pending database migrations")
            )
        )

        .subcommand(Command::new("build")
            .about("Submit code for revision and build it until the queue is drained")
            .arg(Arg::new("name")
                .required(true)
                .long("name")
                .short('n')
                .value_name("NAME")
                .help("Name of the application, a second submission under the same name overwrites the first")
            )
            .arg(Arg::new("language")
                .required(true)
                .long("language")
                .short('l')
                .value_name("LANG")
                .value_parser(clap::builder::PossibleValuesParser::new(Language::ALL.iter().map(Language::tag)))
                .help("Language of the code")
            )
            .arg(Arg::new("code")
                .required(false)
                .long("code")
                .value_name("CODE")
                .help("The code to revise")
            )
            .arg(Arg::new("code_file")
                .required(false)
                .long("code-file")
                .value_name("PATH")
                .value_parser(clap::value_parser!(std::path::PathBuf))
                .help("Read the code to revise from a file")
            )
            .group(ArgGroup::new("input")
                .args(["code", "code_file"])
                .required(true)
            )
            .arg(Arg::new("prompt")
                .required(true)
                .long("prompt")
                .short('p')
                .value_name("PROMPT")
                .help("What the code should do")
            )
            .arg(Arg::new("max_iterations")
                .required(false)
                .long("max-iterations")
                .short('k')
                .value_name("K")
                .default_value("1")
                .value_parser(clap::value_parser!(u32).range(1..))
                .help("Feed the output code of a failing build back in, until it builds clean or K passes ran")
            )
        )

        .subcommand(Command::new("iterations")
            .about("List the iterations of an application, oldest first")
            .arg(Arg::new("name")
                .required(true)
                .index(1)
                .value_name("NAME")
            )
            .arg(arg_csv())
        )

        .subcommand(Command::new("iteration")
            .about("Show one iteration, including code and build output")
            .arg(Arg::new("id")
                .required(true)
                .index(1)
                .value_name("ID")
                .value_parser(clap::value_parser!(i32))
            )
        )

        .subcommand(Command::new("status")
            .about("List all applications and whether they wait for a build")
            .arg(Arg::new("queued")
                .required(false)
                .long("queued")
                .short('q')
                .action(ArgAction::SetTrue)
                .help("Only list applications that wait for a build")
            )
            .arg(arg_csv())
        )

        .subcommand(Command::new("unqueue")
            .about("Remove an application from the build queue")
            .arg(Arg::new("name")
                .required(true)
                .index(1)
                .value_name("NAME")
            )
        )

        .subcommand(Command::new("delete-app")
            .about("Delete an application")
            .arg(Arg::new("name")
                .required(true)
                .index(1)
                .value_name("NAME")
            )
            .arg(Arg::new("with_iterations")
                .required(false)
                .long("with-iterations")
                .action(ArgAction::SetTrue)
                .help("Delete the iterations of the application as well, they are kept otherwise")
            )
        )

        .subcommand(Command::new("delete-iteration")
            .about("Delete an iteration")
            .arg(Arg::new("id")
                .required(true)
                .index(1)
                .value_name("ID")
                .value_parser(clap::value_parser!(i32))
            )
        )
}

fn arg_csv() -> Arg {
    Arg::new("csv")
        .required(false)
        .long("csv")
        .action(ArgAction::SetTrue)
        .help("Format output as CSV")
}
