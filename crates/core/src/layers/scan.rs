//! Optional-content markers in decoded page content streams.

use std::collections::BTreeMap;
use std::sync::OnceLock;

use regex::Regex;

use super::text::{decode_name, is_delimiter, parse_references};
use super::types::ObjectRef;

/// A layer marker found in a content stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LayerToken {
    /// A property-list name (`/OC /oc1 BDC`) to be looked up in the page's
    /// `/Properties` resources.
    Property(String),
    /// A `/Properties` entry pairing a property name with an indirect reference.
    Reference(String, ObjectRef),
}

impl LayerToken {
    pub fn name(&self) -> &str {
        match self {
            LayerToken::Property(name) | LayerToken::Reference(name, _) => name,
        }
    }
}

fn direct_oc_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"/OC\s*/(\w+)").unwrap())
}

fn bdc_oc_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"/OC\s*/([^\s/\[\]<>(){}%]+)\s*BDC").unwrap())
}

fn properties_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?s)/Properties\s*<<(.*?)>>").unwrap())
}

fn property_entry_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"/([^\s/\[\]<>(){}%]+)\s+(\d+\s+\d+\s+R)").unwrap())
}

/// Scan decoded content-stream text for layer markers.
///
/// Applies, in order: direct `/OC /name` operands, `BDC` operators carrying an
/// `/OC` operand (names with `#xx` escapes or non-word characters), and
/// `/Properties << /name N G R >>` entries.  The union is de-duplicated,
/// keeping first-seen order.  An empty result means the page uses no layers.
pub fn scan_content(content: &str) -> Vec<LayerToken> {
    let mut tokens: Vec<LayerToken> = Vec::new();
    let mut push = |token: LayerToken| {
        if !tokens.contains(&token) {
            tokens.push(token);
        }
    };

    for name in direct_oc_re().captures_iter(content).filter_map(|caps| caps.get(1)) {
        // A name cut short at '#' or another non-word character is left to
        // the BDC pattern, which reads it whole.
        if content[name.end()..].chars().next().is_some_and(|c| !is_delimiter(c)) {
            continue;
        }
        push(LayerToken::Property(name.as_str().to_string()));
    }

    for caps in bdc_oc_re().captures_iter(content) {
        push(LayerToken::Property(decode_name(&caps[1])));
    }

    for block in properties_re().captures_iter(content) {
        for entry in property_entry_re().captures_iter(&block[1]) {
            if let Some(reference) = parse_references(&entry[2]).first() {
                push(LayerToken::Reference(decode_name(&entry[1]), *reference));
            }
        }
    }

    tokens
}

/// Turn a page's tokens into layer names.
///
/// `properties` maps the page's property-list names to the OCG references they
/// stand for (an OCMD expands to all of its OCGs).  `layer_names` maps OCG
/// references to layer names.  Tokens that cannot be resolved are kept
/// verbatim.  The result is de-duplicated in first-seen order.
pub fn resolve_tokens(
    tokens: &[LayerToken],
    properties: &BTreeMap<String, Vec<ObjectRef>>,
    layer_names: &BTreeMap<ObjectRef, String>,
) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();
    let mut push = |name: &str| {
        if !names.iter().any(|n| n == name) {
            names.push(name.to_string());
        }
    };

    for token in tokens {
        let refs: Vec<ObjectRef> = match token {
            LayerToken::Property(name) => properties.get(name).cloned().unwrap_or_default(),
            LayerToken::Reference(_, reference) => vec![*reference],
        };

        let resolved: Vec<&String> = refs.iter().filter_map(|r| layer_names.get(r)).collect();
        if resolved.is_empty() {
            push(token.name());
        } else {
            for name in resolved {
                push(name);
            }
        }
    }

    names
}
