//
// Copyright (c) 2020-2022 science+computing ag and other contributors
//
// This program and the accompanying materials are made
// available under the terms of the Eclipse Public License 2.0
// which is available at https://www.eclipse.org/legal/epl-2.0/
//
// SPDX-License-Identifier: EPL-2.0
//

use shiplift::tty::TtyChunk;

/// Owned output of a container, as it arrives from the docker log stream
pub enum TtyChunkBuf {
    StdIn (Vec<u8>),
    StdOut(Vec<u8>),
    StdErr(Vec<u8>),
}

impl From<TtyChunk> for TtyChunkBuf {
    fn from(c: TtyChunk) -> Self {
        match c {
            TtyChunk::StdIn(buffer)  => TtyChunkBuf::StdIn (buffer),
            TtyChunk::StdOut(buffer) => TtyChunkBuf::StdOut(buffer),
            TtyChunk::StdErr(buffer) => TtyChunkBuf::StdErr(buffer),
        }
    }
}

impl AsRef<[u8]> for TtyChunkBuf {
    fn as_ref(&self) -> &[u8] {
        match self {
            TtyChunkBuf::StdIn(buffer)  => buffer.as_ref(),
            TtyChunkBuf::StdOut(buffer) => buffer.as_ref(),
            TtyChunkBuf::StdErr(buffer) => buffer.as_ref(),
        }
    }
}

impl TtyChunkBuf {
    /// Whether this chunk is part of the output of the process (as opposed to its input)
    pub fn is_output(&self) -> bool {
        !matches!(self, TtyChunkBuf::StdIn(_))
    }
}

/// Concatenate stdout and stderr chunks in arrival order
pub fn combined_output<I>(chunks: I) -> String
    where I: IntoIterator<Item = TtyChunk>
{
    let bytes = chunks
        .into_iter()
        .map(TtyChunkBuf::from)
        .filter(TtyChunkBuf::is_output)
        .fold(Vec::new(), |mut accu, chunk| {
            accu.extend_from_slice(chunk.as_ref());
            accu
        });

    String::from_utf8_lossy(&bytes).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_is_interleaved_in_order_without_stdin() {
        let chunks = vec![
            TtyChunk::StdOut(b"start\n".to_vec()),
            TtyChunk::StdIn(b"typed\n".to_vec()),
            TtyChunk::StdErr(b"Traceback\n".to_vec()),
            TtyChunk::StdOut(b"end\n".to_vec()),
        ];

        assert_eq!(combined_output(chunks), "start\nTraceback\nend\n");
    }

    #[test]
    fn test_invalid_utf8_is_replaced() {
        let chunks = vec![TtyChunk::StdErr(vec![0x66, 0xff, 0x6f])];
        assert_eq!(combined_output(chunks), "f\u{fffd}o");
    }
}
