//! GetRecordById query construction.
//!
//! Identifiers arrive already percent-decoded by the router and are encoded
//! exactly once here, with the URI-component character set. The sitemap uses
//! the same encoding so both paths agree on what a record URL looks like.

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

/// Everything except `A-Z a-z 0-9 - _ . ! ~ * ' ( )`.
const URI_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// Percent-encode a single URI component.
pub fn encode_component(value: &str) -> String {
    utf8_percent_encode(value, URI_COMPONENT).to_string()
}

/// `{root_path}?request=GetRecordById&service=CSW&id={encoded identifier}`
pub fn get_record_by_id_path(root_path: &str, identifier: &str) -> String {
    format!(
        "{}?request=GetRecordById&service=CSW&id={}",
        root_path,
        encode_component(identifier)
    )
}
