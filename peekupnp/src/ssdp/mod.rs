//! # Module SSDP - Simple Service Discovery Protocol
//!
//! Côté control point uniquement : envoi de M-SEARCH, réception des
//! réponses unicast et écoute passive des NOTIFY multicast.
//!
//! ## Architecture
//!
//! - [`SsdpListener`] : socket UDP (multicast partagé ou unicast éphémère)
//! - [`SsdpMessage`] : classification et parsing des datagrammes SSDP
//! - [`SearchTarget`] : cible de recherche d'un M-SEARCH
//!
//! ## Constantes SSDP
//!
//! - **Adresse multicast** : 239.255.255.250:1900
//! - **Max-Age par défaut** : 1800 secondes

mod listener;
mod message;
mod search_target;

pub use listener::SsdpListener;
pub use message::{SsdpMessage, build_msearch, parse_headers, parse_max_age};
pub use search_target::SearchTarget;

/// Adresse multicast SSDP
pub const SSDP_MULTICAST_ADDR: &str = "239.255.255.250";

/// Port SSDP
pub const SSDP_PORT: u16 = 1900;

/// Durée de validité des annonces (en secondes)
pub const MAX_AGE: u32 = 1800;
