//
// Copyright (c) 2020-2022 science+computing ag and other contributors
//
// This program and the accompanying materials are made
// available under the terms of the Eclipse Public License 2.0
// which is available at https://www.eclipse.org/legal/epl-2.0/
//
// SPDX-License-Identifier: EPL-2.0
//

use crate::oracle::OracleError;

const FENCE: &str = "```";

/// Get the content of the first fenced code block in `text`
///
/// The content is everything between the first and the second fence. If the opening fence is
/// followed by a language tag on its own line (`` ```python ``), or by a bare line break, that
/// line is not part of the content. Any other first line is code.
pub fn extract_first_fenced_block(text: &str) -> Result<&str, OracleError> {
    let mut parts = text.splitn(3, FENCE);
    let _preamble = parts.next();
    let block = parts.next().ok_or(OracleError::MissingFence)?;

    if parts.next().is_none() {
        return Err(OracleError::UnterminatedFence)
    }

    match block.split_once('\n') {
        Some((first_line, rest)) if is_info_string(first_line) => Ok(rest),
        _ => Ok(block),
    }
}

/// Info strings a completion may put after the opening fence
const INFO_STRINGS: &[&str] = &["", "py", "python", "python3", "cs", "csharp", "c#"];

fn is_info_string(line: &str) -> bool {
    let line = line.trim();
    INFO_STRINGS.iter().any(|tag| tag.eq_ignore_ascii_case(line))
}
