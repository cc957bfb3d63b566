//! Rendering of outbound events into wire text.
//!
//! Two renderings exist. `Json` emits canonical JSON for every reply. `Legacy`
//! reproduces the earlier Python mock, which sent `PARSE_ERROR` through `json.dumps`
//! (spaced separators, non-ASCII escaped) but rendered the other two replies as a
//! Python dict literal:
//!
//! ```text
//! {"event_type": "PARSE_ERROR", "message": "Parsing of 'gr\u00f6\u00dfe' failed.", "error": "..."}
//! {'event_type': 'PROCESS_IMAGE_RESPONSE', 'processing_status': 'DONE', 'message': 'finished processing of a.fits'}
//! ```

use std::fmt::Write;
use std::io;
use std::str::FromStr;

use serde::Serialize;

use crate::types::{EventError, EventResult, OutboundEvent};

/// How replies are serialized on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WireFormat {
    #[default]
    Json,
    Legacy,
}

impl WireFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            WireFormat::Json => "json",
            WireFormat::Legacy => "legacy",
        }
    }

    pub fn render(&self, event: &OutboundEvent) -> EventResult<String> {
        match (self, event) {
            (WireFormat::Json, _) => serde_json::to_string(event).map_err(EventError::Encode),
            (WireFormat::Legacy, OutboundEvent::ParseError { .. }) => render_python_json(event),
            (WireFormat::Legacy, _) => Ok(render_dict(event)),
        }
    }
}

impl FromStr for WireFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "json" => Ok(WireFormat::Json),
            "legacy" | "python" => Ok(WireFormat::Legacy),
            other => Err(format!("unknown wire format '{other}' (expected json or legacy)")),
        }
    }
}

impl std::fmt::Display for WireFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// `serde_json` formatter matching Python's `json.dumps` defaults:
/// `", "` and `": "` separators, everything outside printable ASCII escaped.
struct PythonJsonFormatter;

impl serde_json::ser::Formatter for PythonJsonFormatter {
    fn begin_array_value<W>(&mut self, writer: &mut W, first: bool) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        if first {
            Ok(())
        } else {
            writer.write_all(b", ")
        }
    }

    fn begin_object_key<W>(&mut self, writer: &mut W, first: bool) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        if first {
            Ok(())
        } else {
            writer.write_all(b", ")
        }
    }

    fn begin_object_value<W>(&mut self, writer: &mut W) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        writer.write_all(b": ")
    }

    fn write_string_fragment<W>(&mut self, writer: &mut W, fragment: &str) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        for c in fragment.chars() {
            if c.is_ascii() && c != '\u{7f}' {
                writer.write_all(&[c as u8])?;
            } else {
                let mut units = [0u16; 2];
                for unit in c.encode_utf16(&mut units) {
                    writer.write_all(format!("\\u{unit:04x}").as_bytes())?;
                }
            }
        }
        Ok(())
    }
}

fn render_python_json(event: &OutboundEvent) -> EventResult<String> {
    let mut buf = Vec::new();
    let mut serializer = serde_json::Serializer::with_formatter(&mut buf, PythonJsonFormatter);
    event
        .serialize(&mut serializer)
        .map_err(EventError::Encode)?;
    String::from_utf8(buf)
        .map_err(|e| EventError::Encode(<serde_json::Error as serde::ser::Error>::custom(e)))
}

fn render_dict(event: &OutboundEvent) -> String {
    let body = event
        .entries()
        .into_iter()
        .map(|(key, value)| format!("{}: {}", py_str_repr(key), py_str_repr(value)))
        .collect::<Vec<_>>()
        .join(", ");
    format!("{{{body}}}")
}

/// Quote a string the way Python's `repr(str)` does.
///
/// Single quotes are preferred; double quotes are used when the text contains a
/// single quote and no double quote. Non-printable characters are escaped as
/// `\xNN`, `\uNNNN` or `\UNNNNNNNN`. Printability follows Python for control,
/// format, separator, private-use and noncharacter code points; other unassigned
/// code points pass through unchanged.
pub fn py_str_repr(s: &str) -> String {
    let quote = if s.contains('\'') && !s.contains('"') {
        '"'
    } else {
        '\''
    };

    let mut out = String::with_capacity(s.len() + 2);
    out.push(quote);
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c == quote => {
                out.push('\\');
                out.push(c);
            }
            c if !is_printable(c) => {
                let cp = c as u32;
                let _ = match cp {
                    0..=0xff => write!(out, "\\x{cp:02x}"),
                    0x100..=0xffff => write!(out, "\\u{cp:04x}"),
                    _ => write!(out, "\\U{cp:08x}"),
                };
            }
            c => out.push(c),
        }
    }
    out.push(quote);
    out
}

/// Python's `str.isprintable` for everything but unassigned code points.
fn is_printable(c: char) -> bool {
    if c == ' ' {
        return true;
    }
    if c.is_control() {
        return false;
    }
    let cp = c as u32;
    let hidden = matches!(
        cp,
        // Zs other than space
        0x00a0 | 0x1680 | 0x2000..=0x200a | 0x202f | 0x205f | 0x3000
        // Zl, Zp
        | 0x2028 | 0x2029
        // Cf
        | 0x00ad | 0x0600..=0x0605 | 0x061c | 0x06dd | 0x070f | 0x0890..=0x0891 | 0x08e2
        | 0x180e | 0x200b..=0x200f | 0x202a..=0x202e | 0x2060..=0x2064 | 0x2066..=0x206f
        | 0xfeff | 0xfff9..=0xfffb | 0x110bd | 0x110cd | 0x13430..=0x1343f
        | 0x1bca0..=0x1bca3 | 0x1d173..=0x1d17a | 0xe0001 | 0xe0020..=0xe007f
        // Co
        | 0xe000..=0xf8ff | 0xf0000..=0xffffd | 0x100000..=0x10fffd
        // noncharacters
        | 0xfdd0..=0xfdef
    );
    !hidden && cp & 0xfffe != 0xfffe
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_render() {
        let text = WireFormat::Json
            .render(&OutboundEvent::processed("foo.fits"))
            .unwrap();
        assert_eq!(
            text,
            r#"{"event_type":"PROCESS_IMAGE_RESPONSE","processing_status":"DONE","message":"finished processing of foo.fits"}"#
        );
    }

    #[test]
    fn test_legacy_render_process_response() {
        let text = WireFormat::Legacy
            .render(&OutboundEvent::processed("foo.fits"))
            .unwrap();
        assert_eq!(
            text,
            "{'event_type': 'PROCESS_IMAGE_RESPONSE', 'processing_status': 'DONE', 'message': 'finished processing of foo.fits'}"
        );
    }

    #[test]
    fn test_legacy_render_unknown_event_switches_quotes() {
        let raw = r#"{"event_type": "X"}"#;
        let text = WireFormat::Legacy
            .render(&OutboundEvent::unknown_event(raw))
            .unwrap();
        // message holds both quote kinds, so Python keeps single quotes and escapes them
        assert_eq!(
            text,
            r#"{'event_type': 'UNKNOWN_EVENT_ERROR', 'message': 'Unknown event in: \'{"event_type": "X"}\'.'}"#
        );
    }

    #[test]
    fn test_legacy_parse_error_matches_json_dumps() {
        let event = OutboundEvent::parse_error("größe", "expected value at line 1 column 1");
        let legacy = WireFormat::Legacy.render(&event).unwrap();
        assert_eq!(
            legacy,
            r#"{"event_type": "PARSE_ERROR", "message": "Parsing of 'gr\u00f6\u00dfe' failed.", "error": "expected value at line 1 column 1"}"#
        );

        // same document as the compact rendering, just spelled differently
        let json = WireFormat::Json.render(&event).unwrap();
        assert_ne!(legacy, json);
        let legacy: serde_json::Value = serde_json::from_str(&legacy).unwrap();
        let json: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(legacy, json);
    }

    #[test]
    fn test_legacy_parse_error_escapes_like_python() {
        let event = OutboundEvent::parse_error("🔭\u{7f}\n\"", "bad");
        let legacy = WireFormat::Legacy.render(&event).unwrap();
        assert!(legacy.is_ascii());
        assert!(
            legacy.contains(r#""Parsing of '\ud83d\udd2d\u007f\n\"' failed.""#),
            "{legacy}"
        );
    }

    #[test]
    fn test_py_str_repr() {
        assert_eq!(py_str_repr("plain"), "'plain'");
        assert_eq!(py_str_repr("it's"), "\"it's\"");
        assert_eq!(py_str_repr("say \"hi\""), "'say \"hi\"'");
        assert_eq!(py_str_repr("both ' and \""), "'both \\' and \"'");
        assert_eq!(py_str_repr("a\\b"), "'a\\\\b'");
        assert_eq!(py_str_repr("line\nbreak\t"), "'line\\nbreak\\t'");
        assert_eq!(py_str_repr("\u{1}"), "'\\x01'");
        assert_eq!(py_str_repr("größe.fits"), "'größe.fits'");
        assert_eq!(py_str_repr("a b"), "'a b'");
    }

    #[test]
    fn test_py_str_repr_non_printable() {
        assert_eq!(py_str_repr("\u{a0}"), "'\\xa0'");
        assert_eq!(py_str_repr("\u{ad}"), "'\\xad'");
        assert_eq!(py_str_repr("zero\u{200b}width"), "'zero\\u200bwidth'");
        assert_eq!(py_str_repr("\u{feff}bom"), "'\\ufeffbom'");
        assert_eq!(py_str_repr("\u{2028}"), "'\\u2028'");
        assert_eq!(py_str_repr("\u{e000}"), "'\\ue000'");
        assert_eq!(py_str_repr("\u{ffff}"), "'\\uffff'");
        assert_eq!(py_str_repr("\u{e0001}"), "'\\U000e0001'");
        assert_eq!(py_str_repr("\u{85}"), "'\\x85'");
        assert_eq!(py_str_repr("🔭"), "'🔭'");
    }

    #[test]
    fn test_wire_format_from_str() {
        assert_eq!("json".parse::<WireFormat>().unwrap(), WireFormat::Json);
        assert_eq!("LEGACY".parse::<WireFormat>().unwrap(), WireFormat::Legacy);
        assert_eq!("python".parse::<WireFormat>().unwrap(), WireFormat::Legacy);
        assert!("yaml".parse::<WireFormat>().is_err());
        assert_eq!(WireFormat::default(), WireFormat::Json);
    }
}
