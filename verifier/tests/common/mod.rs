// Copyright (c) 2023 The MobileCoin Foundation

//! Shared fixtures for the integration tests.
//!
//! No certificate files are checked in; every certificate is issued at
//! runtime from RSA keys generated with seeded RNGs, so the fixtures are
//! deterministic and easy to vary per test.

#![allow(dead_code)]

use core::str::FromStr;
use core::time::Duration;
use const_oid::{AssociatedOid, ObjectIdentifier};
use md5::Md5;
use rand::rngs::StdRng;
use rand::SeedableRng;
use rsa::pkcs8::EncodePublicKey;
use rsa::{Pkcs1v15Sign, RsaPrivateKey, RsaPublicKey};
use sha1::{Digest, Sha1};
use tls_chain_verifier::{CertificateChain, PublicKey, TrustAnchors, UnverifiedCertificate};
use x509_cert::der::asn1::{BitString, Ia5String, OctetString, UtcTime};
use x509_cert::der::{Any, AnyRef, Decode, Encode};
use x509_cert::ext::pkix::certpolicy::PolicyInformation;
use x509_cert::ext::pkix::name::GeneralName;
use x509_cert::ext::pkix::{
    AuthorityKeyIdentifier, BasicConstraints, CertificatePolicies, ExtendedKeyUsage, KeyUsage,
    KeyUsages, SubjectAltName, SubjectKeyIdentifier,
};
use x509_cert::ext::Extension;
use x509_cert::name::Name;
use x509_cert::serial_number::SerialNumber;
use x509_cert::spki::{AlgorithmIdentifierOwned, SubjectPublicKeyInfoOwned};
use x509_cert::time::{Time, Validity};
use x509_cert::{Certificate, TbsCertificate, Version};

pub const SHA1_WITH_RSA: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.2.840.113549.1.1.5");
pub const MD5_WITH_RSA: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.2.840.113549.1.1.4");
pub const SERVER_AUTH: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.3.6.1.5.5.7.3.1");
pub const CLIENT_AUTH: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.3.6.1.5.5.7.3.2");
pub const ANY_POLICY: ObjectIdentifier = ObjectIdentifier::new_unwrap("2.5.29.32.0");

pub const ROOT_NAME: &str = "C=US,O=Chain Tests,CN=Chain Test Root";
pub const INTERMEDIATE_NAME: &str = "C=US,O=Chain Tests,CN=Chain Test CA";
pub const LEAF_NAME: &str = "C=US,O=Chain Tests,CN=www.example.com";
pub const SERVER_NAME: &str = "www.example.com";

pub const NOT_BEFORE: u64 = 1_672_531_200; // 2023-01-01T00:00:00Z
pub const NOT_AFTER: u64 = 1_704_067_200; // 2024-01-01T00:00:00Z
pub const VERIFICATION_TIME: u64 = 1_688_169_600; // 2023-07-01T00:00:00Z

pub const ROOT_KEY_ID: [u8; 20] = [0x11; 20];
pub const INTERMEDIATE_KEY_ID: [u8; 20] = [0x22; 20];

// Small keys keep the tests fast; not a production size.
const RSA_KEY_BITS: usize = 512;

pub fn at(secs: u64) -> Duration {
    Duration::from_secs(secs)
}

pub fn rsa_key(seed: u64) -> RsaPrivateKey {
    let mut rng = StdRng::seed_from_u64(seed);
    RsaPrivateKey::new(&mut rng, RSA_KEY_BITS).expect("failed to generate a key")
}

/// Issues a single certificate with a fluent set of overrides.
pub struct CertificateBuilder<'a> {
    subject: &'a str,
    issuer: &'a str,
    serial: u8,
    not_before: u64,
    not_after: u64,
    algorithm: ObjectIdentifier,
    extensions: Vec<Extension>,
}

impl<'a> CertificateBuilder<'a> {
    pub fn new(subject: &'a str, issuer: &'a str) -> Self {
        Self {
            subject,
            issuer,
            serial: 1,
            not_before: NOT_BEFORE,
            not_after: NOT_AFTER,
            algorithm: SHA1_WITH_RSA,
            extensions: Vec::new(),
        }
    }

    pub fn serial(mut self, serial: u8) -> Self {
        self.serial = serial;
        self
    }

    pub fn validity(mut self, not_before: u64, not_after: u64) -> Self {
        self.not_before = not_before;
        self.not_after = not_after;
        self
    }

    pub fn algorithm(mut self, algorithm: ObjectIdentifier) -> Self {
        self.algorithm = algorithm;
        self
    }

    pub fn extension(mut self, extension: Extension) -> Self {
        self.extensions.push(extension);
        self
    }

    pub fn extensions(mut self, extensions: Vec<Extension>) -> Self {
        self.extensions.extend(extensions);
        self
    }

    /// Issue the certificate for `subject_key`, signed by `issuer_key`.
    pub fn issue(self, subject_key: &RsaPublicKey, issuer_key: &RsaPrivateKey) -> Vec<u8> {
        let algorithm = AlgorithmIdentifierOwned {
            oid: self.algorithm,
            parameters: Some(Any::from(AnyRef::NULL)),
        };
        let tbs = TbsCertificate {
            version: Version::V3,
            serial_number: SerialNumber::new(&[self.serial]).expect("bad serial"),
            signature: algorithm.clone(),
            issuer: Name::from_str(self.issuer).expect("failed to parse issuer"),
            validity: Validity {
                not_before: time(self.not_before),
                not_after: time(self.not_after),
            },
            subject: Name::from_str(self.subject).expect("failed to parse subject"),
            subject_public_key_info: spki(subject_key),
            issuer_unique_id: None,
            subject_unique_id: None,
            extensions: if self.extensions.is_empty() {
                None
            } else {
                Some(self.extensions)
            },
        };
        let tbs_der = tbs.to_der().expect("failed to encode tbs");
        let signature = match self.algorithm {
            MD5_WITH_RSA => issuer_key.sign(Pkcs1v15Sign::new::<Md5>(), &Md5::digest(&tbs_der)),
            _ => issuer_key.sign(Pkcs1v15Sign::new::<Sha1>(), &Sha1::digest(&tbs_der)),
        }
        .expect("failed to sign");

        let certificate = Certificate {
            tbs_certificate: tbs,
            signature_algorithm: algorithm,
            signature: BitString::from_bytes(&signature).expect("bad signature bits"),
        };
        certificate.to_der().expect("failed to encode certificate")
    }
}

fn time(secs: u64) -> Time {
    Time::UtcTime(UtcTime::from_unix_duration(Duration::from_secs(secs)).expect("bad time"))
}

fn spki(key: &RsaPublicKey) -> SubjectPublicKeyInfoOwned {
    let der = key.to_public_key_der().expect("failed to encode key");
    SubjectPublicKeyInfoOwned::from_der(der.as_bytes()).expect("failed to decode key")
}

fn encode_extension<T: AssociatedOid + Encode>(value: &T, critical: bool) -> Extension {
    Extension {
        extn_id: T::OID,
        critical,
        extn_value: OctetString::new(value.to_der().expect("failed to encode extension"))
            .expect("failed to wrap extension"),
    }
}

pub fn basic_constraints(ca: bool, path_len_constraint: Option<u8>, critical: bool) -> Extension {
    encode_extension(
        &BasicConstraints {
            ca,
            path_len_constraint,
        },
        critical,
    )
}

pub fn key_usage(usage: KeyUsage, critical: bool) -> Extension {
    encode_extension(&usage, critical)
}

pub fn ext_key_usage(purposes: &[ObjectIdentifier]) -> Extension {
    encode_extension(&ExtendedKeyUsage(purposes.to_vec()), false)
}

pub fn subject_alt_name(dns_names: &[&str]) -> Extension {
    let names = dns_names
        .iter()
        .map(|name| GeneralName::DnsName(Ia5String::new(name).expect("bad DNS name")))
        .collect();
    encode_extension(&SubjectAltName(names), false)
}

pub fn subject_key_id(id: &[u8]) -> Extension {
    encode_extension(
        &SubjectKeyIdentifier(OctetString::new(id).expect("bad key id")),
        false,
    )
}

pub fn authority_key_id(id: &[u8]) -> Extension {
    encode_extension(
        &AuthorityKeyIdentifier {
            key_identifier: Some(OctetString::new(id).expect("bad key id")),
            authority_cert_issuer: None,
            authority_cert_serial_number: None,
        },
        false,
    )
}

pub fn certificate_policies(policies: &[ObjectIdentifier], critical: bool) -> Extension {
    let info = policies
        .iter()
        .map(|oid| PolicyInformation {
            policy_identifier: *oid,
            policy_qualifiers: None,
        })
        .collect();
    encode_extension(&CertificatePolicies(info), critical)
}

/// An extension the verifier has no handler for.
pub fn unknown_extension(critical: bool) -> Extension {
    Extension {
        extn_id: ObjectIdentifier::new_unwrap("1.3.6.1.4.1.99999.1"),
        critical,
        extn_value: OctetString::new([0x05, 0x00].as_slice()).expect("failed to wrap extension"),
    }
}

pub fn ca_extensions(key_id: &[u8], authority_id: Option<&[u8]>) -> Vec<Extension> {
    let mut extensions = vec![
        basic_constraints(true, None, true),
        key_usage(KeyUsage(KeyUsages::KeyCertSign | KeyUsages::CRLSign), true),
        subject_key_id(key_id),
    ];
    if let Some(id) = authority_id {
        extensions.push(authority_key_id(id));
    }
    extensions
}

pub fn leaf_extensions(dns_names: &[&str], authority_id: &[u8]) -> Vec<Extension> {
    vec![
        key_usage(
            KeyUsage(KeyUsages::DigitalSignature | KeyUsages::KeyEncipherment),
            false,
        ),
        ext_key_usage(&[SERVER_AUTH]),
        subject_alt_name(dns_names),
        authority_key_id(authority_id),
    ]
}

/// A root, an intermediate and a server certificate with consistent names,
/// key identifiers and validity windows.
pub struct TestPki {
    pub root_key: RsaPrivateKey,
    pub intermediate_key: RsaPrivateKey,
    pub leaf_key: RsaPrivateKey,
    pub root_der: Vec<u8>,
    pub intermediate_der: Vec<u8>,
    pub leaf_der: Vec<u8>,
}

impl TestPki {
    pub fn new(seed: u64) -> Self {
        let root_key = rsa_key(seed);
        let intermediate_key = rsa_key(seed + 1);
        let leaf_key = rsa_key(seed + 2);

        let root_der = CertificateBuilder::new(ROOT_NAME, ROOT_NAME)
            .serial(1)
            .extensions(ca_extensions(&ROOT_KEY_ID, None))
            .issue(&RsaPublicKey::from(&root_key), &root_key);
        let intermediate_der = CertificateBuilder::new(INTERMEDIATE_NAME, ROOT_NAME)
            .serial(2)
            .extensions(ca_extensions(&INTERMEDIATE_KEY_ID, Some(&ROOT_KEY_ID)))
            .issue(&RsaPublicKey::from(&intermediate_key), &root_key);
        let leaf_der = CertificateBuilder::new(LEAF_NAME, INTERMEDIATE_NAME)
            .serial(3)
            .extensions(leaf_extensions(&[SERVER_NAME], &INTERMEDIATE_KEY_ID))
            .issue(&RsaPublicKey::from(&leaf_key), &intermediate_key);

        Self {
            root_key,
            intermediate_key,
            leaf_key,
            root_der,
            intermediate_der,
            leaf_der,
        }
    }

    /// The presented chain: leaf first, then the intermediate.
    pub fn chain(&self) -> CertificateChain {
        chain_of(&[&self.leaf_der, &self.intermediate_der])
    }

    /// An anchor store holding only the root.
    pub fn anchors(&self) -> TrustAnchors {
        anchors_of(&[&self.root_der], at(VERIFICATION_TIME))
    }

    /// The key a successful verification should hand back.
    pub fn leaf_public_key(&self) -> PublicKey {
        expected_key(&self.leaf_der)
    }
}

pub fn certificate(der: &[u8]) -> UnverifiedCertificate {
    UnverifiedCertificate::try_from(der).expect("failed to decode certificate")
}

pub fn chain_of(der_chain: &[&[u8]]) -> CertificateChain {
    CertificateChain::try_from(der_chain).expect("failed to decode chain")
}

pub fn anchors_of(der_anchors: &[&[u8]], unix_time: Duration) -> TrustAnchors {
    let candidates = der_anchors.iter().map(|der| certificate(der)).collect();
    TrustAnchors::new(candidates, unix_time)
}

/// Extract the subject public key of `der` through the parser, bypassing
/// the verifier.
pub fn expected_key(der: &[u8]) -> PublicKey {
    let certificate = Certificate::from_der(der).expect("failed to decode DER");
    PublicKey::try_from(&certificate.tbs_certificate.subject_public_key_info)
        .expect("failed to decode key")
}

/// Flip one bit of the trailing signature byte.
pub fn tamper_signature(der: &[u8]) -> Vec<u8> {
    let mut tampered = der.to_vec();
    let last = tampered.len() - 1;
    tampered[last] ^= 0x01;
    tampered
}
