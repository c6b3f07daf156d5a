// Copyright (c) 2023 The MobileCoin Foundation

//! String preparation for distinguished-name comparison
//!
//! RFC 5280 [section 7.1](https://datatracker.ietf.org/doc/html/rfc5280#section-7.1)
//! requires attribute values to be compared after the LDAP string
//! preparation of [RFC 4518](https://www.rfc-editor.org/rfc/rfc4518):
//! insignificant characters are mapped away, the result is normalised
//! (NFKC) and case folded, and white space runs collapse. The verifier
//! only ever asks equality of the prepared form, so white space collapses
//! to single separators instead of the doubled-space rendering RFC 4518
//! specifies for substring matching.

extern crate alloc;

use alloc::string::String;
use unicode_normalization::UnicodeNormalization;

/// Prepare `value` for equality comparison.
pub(crate) fn prepare(value: &str) -> String {
    let mapped = value.chars().filter_map(map_char).collect::<String>();
    let normalized = mapped.nfkc().collect::<String>();
    let folded = caseless::default_case_fold_str(&normalized);

    let mut prepared = String::with_capacity(folded.len());
    for word in folded.split(' ').filter(|word| !word.is_empty()) {
        if !prepared.is_empty() {
            prepared.push(' ');
        }
        prepared.push_str(word);
    }
    prepared
}

/// Step 2 of RFC 4518: white space maps to SPACE, a set of control and
/// formatting characters maps to nothing.
fn map_char(c: char) -> Option<char> {
    if c.is_whitespace() {
        return Some(' ');
    }
    match c {
        '\u{0000}'..='\u{0008}'
        | '\u{000E}'..='\u{001F}'
        | '\u{007F}'..='\u{0084}'
        | '\u{0086}'..='\u{009F}'
        | '\u{00AD}'
        | '\u{034F}'
        | '\u{06DD}'
        | '\u{070F}'
        | '\u{1806}'
        | '\u{180B}'..='\u{180E}'
        | '\u{200B}'..='\u{200F}'
        | '\u{202A}'..='\u{202E}'
        | '\u{2060}'..='\u{2063}'
        | '\u{206A}'..='\u{206F}'
        | '\u{FE00}'..='\u{FE0F}'
        | '\u{FEFF}'
        | '\u{FFF9}'..='\u{FFFC}'
        | '\u{1D173}'..='\u{1D17A}'
        | '\u{E0001}'
        | '\u{E0020}'..='\u{E0074}' => None,
        c => Some(c),
    }
}
