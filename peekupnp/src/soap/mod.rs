//! # Module SOAP - invocation d'actions UPnP
//!
//! Côté client uniquement : construction de requêtes d'action, parsing des
//! enveloppes de réponse, décodage des SOAP Faults et extraction d'un tag
//! isolé dans le corps d'une réponse.
//!
//! ## Architecture
//!
//! - [`build_soap_request`] : requête d'action complète (Envelope/Body)
//! - [`parse_soap_envelope`] : enveloppe de réponse
//! - [`parse_soap_fault`] : fault SOAP + détail UPnPError éventuel
//! - [`extract_single_tag`] : premier élément nommé du corps de réponse

mod builder;
mod envelope;
mod fault;
mod parser;

pub use builder::build_soap_request;
pub use envelope::{SoapBody, SoapEnvelope};
pub use fault::{SoapFault, UpnpError};
pub use parser::{SoapParseError, extract_single_tag, parse_soap_envelope, parse_soap_fault};
