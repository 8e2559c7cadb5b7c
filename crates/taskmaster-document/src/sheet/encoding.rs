// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Text decoding for CSV input with an ordered encoding fallback.

use encoding_rs::{Encoding, UTF_16LE};
use taskmaster_core::error::{Result, TaskMasterError};
use tracing::{debug, trace};

/// Labels tried in order when the bytes carry no byte-order mark.
///
/// ISO-8859-1 never rejects a byte, so `utf-16le` is only reached for input
/// that has already been claimed by an earlier label.
pub const FALLBACK_LABELS: [&str; 4] = ["utf-8", "iso-8859-1", "latin1", "utf-16le"];

/// Name reported for text decoded as true ISO-8859-1.
pub const LATIN1: &str = "ISO-8859-1";

/// Decode raw CSV bytes to text. Returns the text and the name of the
/// encoding that produced it.
///
/// A UTF-8 or UTF-16 byte-order mark selects its encoding directly. Otherwise
/// each entry of [`FALLBACK_LABELS`] is tried with strict decoding and the
/// first one that decodes without malformed sequences wins. `source` only
/// labels the error.
pub fn decode_csv_bytes(bytes: &[u8], source: &str) -> Result<(String, &'static str)> {
    if let Some((encoding, bom_len)) = Encoding::for_bom(bytes) {
        debug!(source, encoding = encoding.name(), "byte-order mark found");
        return decode_strict(encoding, &bytes[bom_len..])
            .map(|text| (text, encoding.name()))
            .ok_or_else(|| TaskMasterError::Decode(source.to_string()));
    }

    for label in FALLBACK_LABELS {
        let decoded = if is_latin1_label(label) {
            Some((decode_latin1(bytes), LATIN1))
        } else {
            Encoding::for_label(label.as_bytes()).and_then(|encoding| {
                decode_strict(encoding, bytes).map(|text| (text, encoding.name()))
            })
        };
        match decoded {
            Some((text, name)) => {
                debug!(source, encoding = name, "decoded CSV");
                return Ok((text, name));
            }
            None => trace!(source, label, "encoding rejected"),
        }
    }

    Err(TaskMasterError::Decode(source.to_string()))
}

// The WHATWG label table maps these to windows-1252, which remaps 0x80..=0x9F.
fn is_latin1_label(label: &str) -> bool {
    label.eq_ignore_ascii_case("iso-8859-1") || label.eq_ignore_ascii_case("latin1")
}

/// ISO-8859-1: every byte is the code point of the same value.
fn decode_latin1(bytes: &[u8]) -> String {
    bytes.iter().copied().map(char::from).collect()
}

fn decode_strict(encoding: &'static Encoding, bytes: &[u8]) -> Option<String> {
    if encoding == UTF_16LE && bytes.len() % 2 != 0 {
        return None;
    }
    encoding
        .decode_without_bom_handling_and_without_replacement(bytes)
        .map(|text| text.into_owned())
}
