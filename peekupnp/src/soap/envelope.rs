//! Structures de l'enveloppe SOAP

use xmltree::Element;

/// Enveloppe SOAP de réponse
#[derive(Debug, Clone)]
pub struct SoapEnvelope {
    /// Corps SOAP contenant la réponse ou le fault
    pub body: SoapBody,
}

/// Corps SOAP
#[derive(Debug, Clone)]
pub struct SoapBody {
    /// Contenu XML brut du corps
    pub content: Element,
}
