use thiserror::Error;

/// Taxonomie des erreurs du control point.
///
/// Toutes sont récupérables au niveau de la boucle de commandes ; aucune ne
/// doit terminer le process. L'expiration du délai de découverte et
/// l'annulation utilisateur ne sont *pas* des erreurs (voir
/// [`crate::discovery::StopReason`]).
#[derive(Error, Debug)]
pub enum ControlPointError {
    #[error("failed to bind discovery listener: {0}")]
    Bind(#[from] std::io::Error),

    #[error("{what} not found; {hint}")]
    Lookup { what: String, hint: String },

    #[error("host {index} has not been enumerated yet; run 'host get {index}' first")]
    NotEnriched { index: usize },

    #[error("failed to enumerate {name} from {url}: {reason}")]
    Description {
        name: String,
        url: String,
        reason: String,
    },

    #[error("SOAP action '{action}' failed: {reason}")]
    SoapCall { action: String, reason: String },

    #[error("unrecognized snapshot schema version {found} (this build reads version {expected})")]
    Schema { found: u32, expected: u32 },

    #[error("snapshot error: {0}")]
    Snapshot(String),
}

impl ControlPointError {
    pub fn lookup(what: impl Into<String>, hint: impl Into<String>) -> Self {
        ControlPointError::Lookup {
            what: what.into(),
            hint: hint.into(),
        }
    }

    pub fn description(
        name: impl Into<String>,
        url: impl Into<String>,
        reason: impl std::fmt::Display,
    ) -> Self {
        ControlPointError::Description {
            name: name.into(),
            url: url.into(),
            reason: reason.to_string(),
        }
    }

    pub fn soap_call(action: impl Into<String>, reason: impl std::fmt::Display) -> Self {
        ControlPointError::SoapCall {
            action: action.into(),
            reason: reason.to_string(),
        }
    }
}
