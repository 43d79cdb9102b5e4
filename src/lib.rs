//! [![License: MIT](https://img.shields.io/badge/License-MIT-yellow.svg)](./LICENSE-MIT)
//! [![Apache License 2.0](https://img.shields.io/badge/License-Apache%202.0-blue.svg)](./LICENSE-APACHE)
//!
//! # X.509 Alternative Names
//!
//! Schema objects for the RFC5280 `GeneralNames` structure, as used by the Subject Alternative
//! Name and Issuer Alternative Name extensions ([RFC5280] sections 4.2.1.6 and 4.2.1.7).
//!
//! Each object of this crate implements [`SchemaObject`](traits/trait.SchemaObject.html), which
//! provides four operations:
//!
//! - a template ([`Template`](schema/struct.Template.html)), describing the expected shape of the
//!   DER tree, with optional capture names so that it can be embedded in a larger template
//! - verification of a parsed tree ([`DerNode`](node/struct.DerNode.html)) against the template,
//!   and extraction of the typed values
//! - rebuilding a DER tree from the typed values
//! - a plain data (JSON) projection
//!
//! Decoding is atomic: if any element is rejected, the object is not modified.
//!
//! # Examples
//!
//! Decoding the names of a Subject Alternative Name extension:
//!
//! ```rust
//! use x509_altname::prelude::*;
//!
//! // SEQUENCE { [2] "ca.local" }
//! static DER: &[u8] = &[0x30, 0x0a, 0x82, 0x08, 0x63, 0x61, 0x2e, 0x6c, 0x6f, 0x63, 0x61, 0x6c];
//!
//! # fn main() {
//! let res = AltName::from_der(DER);
//! match res {
//!     Ok((rem, alt_name)) => {
//!         assert!(rem.is_empty());
//!         //
//!         assert_eq!(alt_name.alt_names, vec![GeneralName::DNSName("ca.local".to_owned())]);
//!         assert_eq!(alt_name.to_der_vec().unwrap(), DER);
//!     },
//!     _ => panic!("AltName decoding failed: {:?}", res),
//! }
//! # }
//! ```
//!
//! Full extensions (`extnID`, `critical`, `extnValue`) are decoded by
//! [`X509Extension`](extensions/struct.X509Extension.html), which dispatches on the extension
//! OID to decode known extension contents.
//!
//! [RFC5280]: https://tools.ietf.org/html/rfc5280

#![deny(/*missing_docs,*/
        unstable_features,
        unused_import_braces, unused_qualifications)]
#![warn(
    missing_debug_implementations,
    /* missing_docs,
    rust_2018_idioms,*/
    unreachable_pub
)]
#![forbid(unsafe_code)]
#![doc(test(
    no_crate_inject,
    attr(deny(warnings, rust_2018_idioms), allow(dead_code, unused_variables))
))]
#![cfg_attr(docsrs, feature(doc_cfg))]

pub use x509::*;
pub mod x509;

pub mod error;
pub mod extensions;
pub mod node;
pub mod objects;
pub mod schema;
pub mod traits;
pub mod utils;

pub use asn1_rs;
pub use nom;

pub mod prelude {
    pub use crate::error::*;
    pub use crate::extensions::*;
    pub use crate::node::*;
    pub use crate::objects::*;
    pub use crate::schema::*;
    pub use crate::traits::*;
    pub use crate::utils::*;
    pub use crate::x509::*;
}
