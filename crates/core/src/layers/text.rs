//! Best-effort field extraction from raw PDF dictionary text.
//!
//! Input is the textual form of (part of) a PDF object, for example
//! `<< /Type /OCG /Name (Dimensions) /Intent [/View /Design] >>`, possibly
//! truncated or malformed.  Every extractor returns the first syntactically
//! matching occurrence in document order, or `None`.  Nothing here fails.

use std::sync::OnceLock;

use regex::Regex;

use super::types::{LayerConfiguration, ObjectRef, OcState, Usage, UsagePurpose};

// ---------------------------------------------------------------------------
// Text decoding helpers
// ---------------------------------------------------------------------------

/// Best-effort decoding of raw PDF string bytes into a Rust `String`.
///
/// Handles three cases in order:
/// 1. UTF-16BE with BOM (`\xFE\xFF` prefix) -- strips BOM and decodes.
/// 2. Valid UTF-8 -- returned as-is.
/// 3. Fallback to Latin-1 (ISO 8859-1) -- each byte mapped to its Unicode
///    code point.
pub fn decode_pdf_text(bytes: &[u8]) -> String {
    if bytes.len() >= 2 && bytes[0] == 0xFE && bytes[1] == 0xFF {
        let code_units: Vec<u16> = bytes[2..]
            .chunks(2)
            .filter_map(|chunk| {
                if chunk.len() == 2 {
                    Some(u16::from_be_bytes([chunk[0], chunk[1]]))
                } else {
                    None
                }
            })
            .collect();
        return String::from_utf16_lossy(&code_units);
    }

    if let Ok(s) = std::str::from_utf8(bytes) {
        return s.to_string();
    }

    bytes.iter().map(|&b| b as char).collect()
}

/// Characters that terminate a PDF name token.
pub(super) fn is_delimiter(c: char) -> bool {
    c.is_whitespace() || matches!(c, '/' | '[' | ']' | '<' | '>' | '(' | ')' | '{' | '}' | '%')
}

/// Decode the body of a PDF name (after the slash), expanding `#xx` escapes.
pub fn decode_name(raw: &str) -> String {
    let mut bytes = Vec::with_capacity(raw.len());
    let mut chars = raw.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '#' {
            let hi = chars.next();
            let lo = chars.next();
            if let (Some(hi), Some(lo)) = (hi, lo) {
                if let (Some(h), Some(l)) = (hi.to_digit(16), lo.to_digit(16)) {
                    bytes.push((h * 16 + l) as u8);
                    continue;
                }
                push_char(&mut bytes, '#');
                push_char(&mut bytes, hi);
                push_char(&mut bytes, lo);
            } else {
                push_char(&mut bytes, '#');
                if let Some(hi) = hi {
                    push_char(&mut bytes, hi);
                }
            }
        } else {
            push_char(&mut bytes, c);
        }
    }
    decode_pdf_text(&bytes)
}

/// Push a char as a single byte when it is in the Latin-1 range, otherwise as UTF-8.
fn push_char(bytes: &mut Vec<u8>, c: char) {
    if (c as u32) < 0x100 {
        bytes.push(c as u32 as u8);
    } else {
        let mut buf = [0u8; 4];
        bytes.extend_from_slice(c.encode_utf8(&mut buf).as_bytes());
    }
}

/// Read a name token starting right after its slash.
fn read_name(rest: &str) -> String {
    let end = rest.find(is_delimiter).unwrap_or(rest.len());
    decode_name(&rest[..end])
}

/// Parse a literal string starting at `(`, honoring escapes and nested parentheses.
///
/// A truncated string yields whatever was read before the input ran out.
fn read_literal_string(text: &str) -> Vec<u8> {
    let mut out = Vec::new();
    let mut depth = 0usize;
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '(' => {
                depth += 1;
                if depth > 1 {
                    out.push(b'(');
                }
            }
            ')' => {
                if depth <= 1 {
                    break;
                }
                depth -= 1;
                out.push(b')');
            }
            '\\' => match chars.next() {
                Some('n') => out.push(b'\n'),
                Some('r') => out.push(b'\r'),
                Some('t') => out.push(b'\t'),
                Some('b') => out.push(0x08),
                Some('f') => out.push(0x0C),
                Some('\r') => {
                    if chars.peek() == Some(&'\n') {
                        chars.next();
                    }
                }
                Some('\n') => {}
                Some(d) if d.is_digit(8) => {
                    let mut value = d.to_digit(8).unwrap_or(0);
                    for _ in 0..2 {
                        match chars.peek().and_then(|n| n.to_digit(8)) {
                            Some(n) => {
                                value = value * 8 + n;
                                chars.next();
                            }
                            None => break,
                        }
                    }
                    out.push((value & 0xFF) as u8);
                }
                Some(other) => push_char(&mut out, other),
                None => break,
            },
            other => push_char(&mut out, other),
        }
    }

    out
}

/// Parse a hex string starting at `<`. An odd trailing digit is padded with 0.
fn read_hex_string(text: &str) -> Vec<u8> {
    let digits: Vec<u32> = text
        .chars()
        .skip(1)
        .take_while(|&c| c != '>')
        .filter_map(|c| c.to_digit(16))
        .collect();

    digits
        .chunks(2)
        .map(|pair| {
            let hi = pair[0];
            let lo = pair.get(1).copied().unwrap_or(0);
            (hi * 16 + lo) as u8
        })
        .collect()
}

/// Decode a string or name value starting at the beginning of `value`.
fn read_text_value(value: &str) -> Option<String> {
    let decoded = if value.starts_with("<<") {
        return None;
    } else if value.starts_with('(') {
        decode_pdf_text(&read_literal_string(value))
    } else if value.starts_with('<') {
        decode_pdf_text(&read_hex_string(value))
    } else if let Some(rest) = value.strip_prefix('/') {
        read_name(rest)
    } else {
        return None;
    };

    let trimmed = decoded.trim_matches(char::from(0)).trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

// ---------------------------------------------------------------------------
// Key location
// ---------------------------------------------------------------------------

/// First `/key` occurrence whose following text `accept` takes.
fn find_key<'a>(
    text: &'a str,
    key: &str,
    accept: impl Fn(&'a str) -> Option<&'a str>,
) -> Option<&'a str> {
    text.match_indices('/')
        .filter_map(|(i, _)| text[i + 1..].strip_prefix(key))
        .find_map(accept)
}

/// The value following the first `/key` entry.
///
/// The key must be followed by whitespace or a value delimiter so that
/// `/Name` does not match `/Names`.
fn find_key_value<'a>(text: &'a str, key: &str) -> Option<&'a str> {
    find_key(text, key, |tail| {
        let value = tail.trim_start();
        let spaced = value.len() < tail.len();
        let first = value.chars().next()?;
        let delimited = matches!(first, '(' | '<' | '[' | '/');
        let numeric = spaced && (first.is_ascii_digit() || matches!(first, '-' | '+' | '.'));
        (delimited || numeric).then_some(value)
    })
}

/// Text starting at `opener` in the first `/key <opener>` entry.
fn find_key_opening<'a>(text: &'a str, key: &str, opener: &str) -> Option<&'a str> {
    find_key(text, key, |tail| {
        let value = tail.trim_start();
        value.starts_with(opener).then_some(value)
    })
}

/// Inner text of the `<< ... >>` block starting at the beginning of `text`.
///
/// Literal strings are skipped so parentheses containing `>>` do not end the
/// block early.  A truncated block yields the remaining text.
fn balanced_dict(text: &str) -> Option<&str> {
    if !text.starts_with("<<") {
        return None;
    }
    let bytes = text.as_bytes();
    let mut depth = 0usize;
    let mut i = 0;
    let mut in_string = 0usize;

    while i < bytes.len() {
        let b = bytes[i];
        if in_string > 0 {
            match b {
                b'\\' => i += 1,
                b'(' => in_string += 1,
                b')' => in_string -= 1,
                _ => {}
            }
            i += 1;
            continue;
        }
        match b {
            b'(' => in_string = 1,
            b'<' if bytes.get(i + 1) == Some(&b'<') => {
                depth += 1;
                i += 1;
            }
            b'>' if bytes.get(i + 1) == Some(&b'>') => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[2..i]);
                }
                i += 1;
            }
            _ => {}
        }
        i += 1;
    }

    Some(&text[2..])
}

/// Inner text of the `[ ... ]` array starting at the beginning of `text`.
fn bracketed_array(text: &str) -> Option<&str> {
    let rest = text.strip_prefix('[')?;
    let end = rest.find(']').unwrap_or(rest.len());
    Some(&rest[..end])
}

/// Inner text of the dictionary stored under `/key`.
pub fn extract_dict_block<'a>(text: &'a str, key: &str) -> Option<&'a str> {
    find_key_opening(text, key, "<<").and_then(balanced_dict)
}

// ---------------------------------------------------------------------------
// Field extractors
// ---------------------------------------------------------------------------

/// The `/Name` entry as text (literal, hex, or name form).
pub fn extract_name(text: &str) -> Option<String> {
    find_key_value(text, "Name").and_then(read_text_value)
}

/// The `/Intent` entry as an ordered, de-duplicated list of names.
///
/// Accepts both the single-name form (`/Intent /View`) and the array form.
pub fn extract_intent_list(text: &str) -> Option<Vec<String>> {
    let value = find_key_value(text, "Intent")?;

    let mut intents: Vec<String> = Vec::new();
    if let Some(rest) = value.strip_prefix('/') {
        intents.push(read_name(rest));
    } else if let Some(inner) = bracketed_array(value) {
        for token in inner.split('/').skip(1) {
            let name = read_name(token);
            if !name.is_empty() && !intents.contains(&name) {
                intents.push(name);
            }
        }
    }

    intents.retain(|s| !s.is_empty());
    if intents.is_empty() {
        None
    } else {
        Some(intents)
    }
}

/// The purpose -> state pairs of the `/Usage` dictionary.
///
/// Looks for `/Print << /PrintState /ON >>`-style sub-dictionaries first and
/// falls back to a bare `/PrintState /ON` anywhere inside the block.
pub fn extract_usage_block(text: &str) -> Option<Usage> {
    let block = extract_dict_block(text, "Usage")?;
    let mut usage = Usage::new();

    for purpose in UsagePurpose::ALL {
        let scope = extract_dict_block(block, purpose.dict_key()).unwrap_or(block);
        if let Some(state) = extract_state(scope, purpose.state_key()) {
            usage.insert(purpose, state);
        }
    }

    if usage.is_empty() {
        None
    } else {
        Some(usage)
    }
}

fn extract_state(text: &str, key: &str) -> Option<OcState> {
    let value = find_key_value(text, key)?;
    let rest = value.strip_prefix('/')?;
    OcState::from_name(&read_name(rest))
}

/// The `/BaseState` entry of a configuration dictionary.
pub fn extract_base_state(text: &str) -> Option<OcState> {
    extract_state(text, "BaseState")
}

/// The first `/Creator` string, either in a configuration or in `/CreatorInfo`.
pub fn extract_creator(text: &str) -> Option<String> {
    find_key_value(text, "Creator").and_then(read_text_value)
}

/// The indirect references listed in the `/key [ ... ]` array.
///
/// `Some(vec![])` means the key exists but lists nothing.
pub fn extract_reference_list(text: &str, key: &str) -> Option<Vec<ObjectRef>> {
    let value = find_key_opening(text, key, "[")?;
    let inner = bracketed_array(value)?;
    Some(parse_references(inner))
}

/// An optional-content configuration dictionary (`/D` or a `/Configs` entry).
///
/// Missing fields take their defaults: base state ON, empty reference lists.
pub fn extract_configuration(text: &str) -> LayerConfiguration {
    LayerConfiguration {
        name: extract_name(text),
        creator: extract_creator(text),
        base_state: extract_base_state(text).unwrap_or_default(),
        on: extract_reference_list(text, "ON").unwrap_or_default(),
        off: extract_reference_list(text, "OFF").unwrap_or_default(),
        locked: extract_reference_list(text, "Locked").unwrap_or_default(),
    }
}

fn reference_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(\d+)\s+(\d+)\s+R\b").unwrap())
}

/// Every `num gen R` triple in `text`, in order.
pub fn parse_references(text: &str) -> Vec<ObjectRef> {
    reference_re()
        .captures_iter(text)
        .filter_map(|caps| {
            let num = caps.get(1)?.as_str().parse::<u32>().ok()?;
            let gen = caps.get(2)?.as_str().parse::<u16>().ok()?;
            Some(ObjectRef::new(num, gen))
        })
        .collect()
}
