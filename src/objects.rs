//! OID definitions, short and long names
//!
//! The registry only contains the attribute types commonly found in X.509 names, and the
//! extensions handled by this crate. It is used to build human-readable strings; unknown OIDs
//! are displayed in dotted form.

use crate::error::NidError;
use asn1_rs::{oid, Oid};
use lazy_static::lazy_static;
use oid_registry::{OID_X509_EXT_ISSUER_ALT_NAME, OID_X509_EXT_SUBJECT_ALT_NAME};
use std::collections::HashMap;

pub const OID_C: Oid<'static> = oid!(2.5.4.6);
pub const OID_ST: Oid<'static> = oid!(2.5.4.8);
pub const OID_L: Oid<'static> = oid!(2.5.4.7);
pub const OID_O: Oid<'static> = oid!(2.5.4.10);
pub const OID_OU: Oid<'static> = oid!(2.5.4.11);
pub const OID_CN: Oid<'static> = oid!(2.5.4.3);
pub const OID_SERIALNUMBER: Oid<'static> = oid!(2.5.4.5);
pub const OID_SN: Oid<'static> = oid!(2.5.4.4);
pub const OID_GN: Oid<'static> = oid!(2.5.4.42);
pub const OID_TITLE: Oid<'static> = oid!(2.5.4.12);
pub const OID_DC: Oid<'static> = oid!(0.9.2342.19200300.100.1.25);
pub const OID_UID: Oid<'static> = oid!(0.9.2342.19200300.100.1.1);
pub const OID_EMAIL: Oid<'static> = oid!(1.2.840.113549.1.9.1);

pub const OID_EXT_SAN: Oid<'static> = OID_X509_EXT_SUBJECT_ALT_NAME;
pub const OID_EXT_IAN: Oid<'static> = OID_X509_EXT_ISSUER_ALT_NAME;

struct OidEntry {
    sn: &'static str,
    ln: &'static str,
}

lazy_static! {
    static ref OID_REGISTRY: HashMap<Oid<'static>, OidEntry> = {
        let mut m = HashMap::new();
        m.insert(OID_C, OidEntry{sn:"C", ln:"countryName"});
        m.insert(OID_ST, OidEntry{sn:"ST", ln:"stateOrProvinceName"});
        m.insert(OID_L, OidEntry{sn:"L", ln:"localityName"});
        m.insert(OID_O, OidEntry{sn:"O", ln:"organizationName"});
        m.insert(OID_OU, OidEntry{sn:"OU", ln:"organizationalUnitName"});
        m.insert(OID_CN, OidEntry{sn:"CN", ln:"commonName"});
        m.insert(OID_SERIALNUMBER, OidEntry{sn:"serialNumber", ln:"serialNumber"});
        m.insert(OID_SN, OidEntry{sn:"SN", ln:"surname"});
        m.insert(OID_GN, OidEntry{sn:"GN", ln:"givenName"});
        m.insert(OID_TITLE, OidEntry{sn:"title", ln:"title"});
        m.insert(OID_DC, OidEntry{sn:"DC", ln:"domainComponent"});
        m.insert(OID_UID, OidEntry{sn:"UID", ln:"userId"});
        m.insert(OID_EMAIL, OidEntry{sn:"Email", ln:"emailAddress"});
        m.insert(OID_EXT_SAN, OidEntry{sn:"subjectAltName", ln:"X509v3 Subject Alternative Name"});
        m.insert(OID_EXT_IAN, OidEntry{sn:"issuerAltName", ln:"X509v3 Issuer Alternative Name"});
        m
    };
}

/// Returns the short name corresponding to the OID
pub fn oid2sn(oid: &Oid) -> Result<&'static str, NidError> {
    OID_REGISTRY.get(oid).map(|o| o.sn).ok_or(NidError)
}

/// Returns the long name corresponding to the OID
pub fn oid2ln(oid: &Oid) -> Result<&'static str, NidError> {
    OID_REGISTRY.get(oid).map(|o| o.ln).ok_or(NidError)
}

/// Given a short name, returns the matching OID
pub fn sn2oid(sn: &str) -> Result<&'static Oid<'static>, NidError> {
    OID_REGISTRY
        .iter()
        .find(|(_, o)| o.sn == sn)
        .map(|(oid, _)| oid)
        .ok_or(NidError)
}
