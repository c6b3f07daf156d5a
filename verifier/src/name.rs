// Copyright (c) 2023 The MobileCoin Foundation

//! X509 distinguished names
//!
//! Issuer and subject names are RDN sequences, compared here under the
//! rules of RFC 5280
//! [section 7.1](https://datatracker.ietf.org/doc/html/rfc5280#section-7.1):
//! two names match when their RDN sequences have the same shape, the
//! attribute types agree, and the attribute values compare equal after
//! string preparation ([`crate::prep`]).
//!
//! Attribute values are supported in the `PrintableString`, `UTF8String`
//! and `IA5String` encodings. `TeletexString`, `UniversalString` and
//! `BMPString` values never compare equal to anything.

use crate::prep;
use const_oid::db::rfc4519::CN;
use x509_cert::attr::{AttributeTypeAndValue, AttributeValue};
use x509_cert::der::asn1::{Ia5StringRef, PrintableStringRef, Utf8StringRef};
use x509_cert::der::{Tag, Tagged};
use x509_cert::name::{Name, RelativeDistinguishedName};

/// Borrowed view of an X509 `Name` carrying RFC 5280 comparison semantics.
#[derive(Debug)]
pub struct DistinguishedName<'a>(&'a Name);

impl<'a> From<&'a Name> for DistinguishedName<'a> {
    fn from(name: &'a Name) -> Self {
        Self(name)
    }
}

impl<'a> DistinguishedName<'a> {
    /// The Common Name attribute value, when the name carries one.
    pub fn common_name(&self) -> Option<&'a str> {
        self.0
             .0
            .iter()
            .flat_map(|rdn| rdn.0.iter())
            .find(|attribute| attribute.oid == CN)
            .and_then(|attribute| DirectoryString::decode(&attribute.value))
            .map(|value| value.as_str())
    }
}

impl PartialEq for DistinguishedName<'_> {
    fn eq(&self, other: &Self) -> bool {
        let lhs = &self.0 .0;
        let rhs = &other.0 .0;
        lhs.len() == rhs.len()
            && lhs
                .iter()
                .zip(rhs.iter())
                .all(|(first, second)| rdn_eq(first, second))
    }
}

fn rdn_eq(lhs: &RelativeDistinguishedName, rhs: &RelativeDistinguishedName) -> bool {
    lhs.0.len() == rhs.0.len()
        && lhs
            .0
            .iter()
            .zip(rhs.0.iter())
            .all(|(first, second)| attribute_eq(first, second))
}

fn attribute_eq(lhs: &AttributeTypeAndValue, rhs: &AttributeTypeAndValue) -> bool {
    if lhs.oid != rhs.oid {
        return false;
    }
    match (
        DirectoryString::decode(&lhs.value),
        DirectoryString::decode(&rhs.value),
    ) {
        (Some(first), Some(second)) => prep::prepare(first.as_str()) == prep::prepare(second.as_str()),
        _ => false,
    }
}

enum DirectoryString<'a> {
    Printable(PrintableStringRef<'a>),
    Utf8(Utf8StringRef<'a>),
    Ia5(Ia5StringRef<'a>),
}

impl<'a> DirectoryString<'a> {
    fn decode(value: &'a AttributeValue) -> Option<Self> {
        match value.tag() {
            Tag::PrintableString => PrintableStringRef::try_from(value).ok().map(Self::Printable),
            Tag::Utf8String => Utf8StringRef::try_from(value).ok().map(Self::Utf8),
            Tag::Ia5String => Ia5StringRef::try_from(value).ok().map(Self::Ia5),
            _ => None,
        }
    }

    fn as_str(&self) -> &'a str {
        match self {
            Self::Printable(value) => value.as_str(),
            Self::Utf8(value) => value.as_str(),
            Self::Ia5(value) => value.as_str(),
        }
    }
}
