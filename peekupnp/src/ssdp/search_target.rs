//! Cible de recherche d'un M-SEARCH.

use std::fmt;

/// Cible ST d'un M-SEARCH.
///
/// Par défaut on cherche les root devices ; une recherche ciblée vise un
/// type de device ou de service précis, qualifié par le domaine du schéma
/// et la version majeure UPnP configurée.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchTarget {
    RootDevice,
    Urn {
        domain: String,
        kind: String,
        name: String,
        version: String,
    },
}

impl SearchTarget {
    /// Cible `urn:schemas-upnp-org:<kind>:<name>:<major>` où `<major>` est
    /// la partie majeure de `upnp_version` ("1.0" -> "1").
    pub fn urn(kind: &str, name: &str, upnp_version: &str) -> Self {
        let major = upnp_version.split('.').next().unwrap_or(upnp_version);
        SearchTarget::Urn {
            domain: "schemas-upnp-org".to_string(),
            kind: kind.to_string(),
            name: name.to_string(),
            version: major.to_string(),
        }
    }
}

impl Default for SearchTarget {
    fn default() -> Self {
        SearchTarget::RootDevice
    }
}

impl fmt::Display for SearchTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SearchTarget::RootDevice => write!(f, "upnp:rootdevice"),
            SearchTarget::Urn {
                domain,
                kind,
                name,
                version,
            } => write!(f, "urn:{domain}:{kind}:{name}:{version}"),
        }
    }
}
