//! Encoding-aware line reading for logger exports.
//!
//! Vendor software writes degree signs and other symbols in whatever code
//! page the host used. The encoding is passed per call so concurrent parses
//! never share decoding state.

use crate::config::TextEncoding;
use crate::error::Result;
use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;
use tracing::debug;

/// Decode raw bytes according to `encoding`
pub fn decode(bytes: &[u8], encoding: TextEncoding) -> String {
    match encoding {
        TextEncoding::Utf8 => String::from_utf8_lossy(bytes).into_owned(),
        TextEncoding::Latin1 => decode_latin1(bytes),
        TextEncoding::Auto => match std::str::from_utf8(bytes) {
            Ok(text) => text.to_string(),
            Err(_) => decode_latin1(bytes),
        },
    }
}

fn decode_latin1(bytes: &[u8]) -> String {
    bytes.iter().map(|&b| b as char).collect()
}

/// Read a whole file as text, dropping a UTF-8 byte-order mark
pub fn read_text(path: &Path, encoding: TextEncoding) -> Result<String> {
    let mut bytes = Vec::new();
    File::open(path)?.read_to_end(&mut bytes)?;

    let body = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(&bytes);
    let text = decode(body, encoding);
    debug!(
        "Read {} bytes from {} ({:?})",
        body.len(),
        path.display(),
        encoding
    );
    Ok(text)
}

/// Read every line of a file, without line terminators
pub fn read_lines(path: &Path, encoding: TextEncoding) -> Result<Vec<String>> {
    let text = read_text(path, encoding)?;
    Ok(text.lines().map(|l| l.trim_end_matches('\r').to_string()).collect())
}

/// Read only the first `count` lines; the file is closed before returning
pub fn read_head(path: &Path, count: usize, encoding: TextEncoding) -> Result<Vec<String>> {
    let mut reader = BufReader::new(File::open(path)?);
    let mut lines = Vec::with_capacity(count);
    let mut buf = Vec::new();

    while lines.len() < count {
        buf.clear();
        if reader.read_until(b'\n', &mut buf)? == 0 {
            break;
        }
        let raw = if lines.is_empty() {
            buf.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(&buf)
        } else {
            &buf[..]
        };
        let line = decode(raw, encoding);
        lines.push(line.trim_end_matches(['\n', '\r']).to_string());
    }

    Ok(lines)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_decode_latin1_degree_sign() {
        let bytes = b"Temp, \xB0F";
        assert_eq!(decode(bytes, TextEncoding::Latin1), "Temp, °F");
        assert_eq!(decode(bytes, TextEncoding::Auto), "Temp, °F");
        assert_eq!(decode("Temp, °C".as_bytes(), TextEncoding::Auto), "Temp, °C");
    }

    #[test]
    fn test_read_head_stops_early() {
        let mut temp_file = NamedTempFile::new().unwrap();
        write!(temp_file, "\u{FEFF}first\r\nsecond\nthird\n").unwrap();

        let head = read_head(temp_file.path(), 2, TextEncoding::Utf8).unwrap();
        assert_eq!(head, vec!["first".to_string(), "second".to_string()]);

        let all = read_lines(temp_file.path(), TextEncoding::Utf8).unwrap();
        assert_eq!(all.len(), 3);
        assert_eq!(all[0], "first");
    }
}
