//! Réglages de session du shell.

use std::fmt;
use std::time::Duration;

/// Réglages modifiables par la commande `set`.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Dédoublonnage des réponses de découverte par identité.
    pub unique_only: bool,
    /// Verbosité des logs (debug au lieu de info).
    pub verbose: bool,
    /// Version UPnP annoncée dans les cibles de recherche ("1.0" -> urn ...:1).
    pub upnp_version: String,
    /// Délai global d'une session de découverte. Zéro = non borné.
    pub timeout: Duration,
    /// Nombre maximal de hosts par session de découverte. Zéro = non borné.
    pub max_hosts: usize,
    /// Interface réseau imposée pour l'écoute multicast.
    pub iface: Option<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            unique_only: true,
            verbose: false,
            upnp_version: "1.0".to_string(),
            timeout: Duration::from_secs(180),
            max_hosts: 0,
            iface: None,
        }
    }
}

impl fmt::Display for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "\tuniq    : {}", self.unique_only)?;
        writeln!(f, "\tverbose : {}", self.verbose)?;
        writeln!(f, "\tversion : {}", self.upnp_version)?;
        writeln!(f, "\ttimeout : {}s (0 = unbounded)", self.timeout.as_secs())?;
        writeln!(f, "\tmax     : {} (0 = unbounded)", self.max_hosts)?;
        write!(
            f,
            "\tiface   : {}",
            self.iface.as_deref().unwrap_or("(all non-loopback)")
        )
    }
}
