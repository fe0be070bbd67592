//
// Copyright (c) 2020-2022 science+computing ag and other contributors
//
// This program and the accompanying materials are made
// available under the terms of the Eclipse Public License 2.0
// which is available at https://www.eclipse.org/legal/epl-2.0/
//
// SPDX-License-Identifier: EPL-2.0
//

//! The fixed set of runtimes a submission can target

use std::io::Write;

use diesel::deserialize;
use diesel::deserialize::FromSql;
use diesel::deserialize::FromSqlRow;
use diesel::expression::AsExpression;
use diesel::pg::Pg;
use diesel::pg::PgValue;
use diesel::serialize;
use diesel::serialize::IsNull;
use diesel::serialize::Output;
use diesel::serialize::ToSql;
use diesel::sql_types::Text;
use serde::Deserialize;
use serde::Serialize;

/// A target language
///
/// Each variant maps to exactly one execution profile in the configuration.
#[derive(
    parse_display::Display,
    parse_display::FromStr,
    Serialize,
    Deserialize,
    AsExpression,
    FromSqlRow,
    Clone,
    Copy,
    Debug,
    Hash,
    Eq,
    PartialEq,
    Ord,
    PartialOrd,
)]
#[diesel(sql_type = Text)]
pub enum Language {
    #[display("py")]
    #[serde(rename = "py")]
    Python,

    #[display("cs")]
    #[serde(rename = "cs")]
    CSharp,
}

impl Language {
    pub const ALL: [Language; 2] = [Language::Python, Language::CSharp];

    /// The short tag, as used on the command line, in the configuration and in the database
    pub fn tag(&self) -> &'static str {
        match self {
            Language::Python => "py",
            Language::CSharp => "cs",
        }
    }

    /// Human readable name, used when talking to the revision oracle
    pub fn display_name(&self) -> &'static str {
        match self {
            Language::Python => "Python",
            Language::CSharp => "C#",
        }
    }
}

impl ToSql<Text, Pg> for Language {
    fn to_sql<'b>(&'b self, out: &mut Output<'b, '_, Pg>) -> serialize::Result {
        out.write_all(self.tag().as_bytes())?;
        Ok(IsNull::No)
    }
}

impl FromSql<Text, Pg> for Language {
    fn from_sql(bytes: PgValue<'_>) -> deserialize::Result<Self> {
        let tag = <String as FromSql<Text, Pg>>::from_sql(bytes)?;
        tag.parse::<Language>().map_err(|e| format!("Unknown language '{}': {}", tag, e).into())
    }
}
