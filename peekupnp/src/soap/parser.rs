//! Parsing des réponses SOAP

use super::{SoapBody, SoapEnvelope, SoapFault, UpnpError};
use std::io::BufReader;
use xmltree::Element;

/// Erreur de parsing SOAP
#[derive(Debug, thiserror::Error)]
pub enum SoapParseError {
    #[error("XML parse error: {0}")]
    XmlError(#[from] xmltree::ParseError),

    #[error("Missing SOAP Envelope")]
    MissingEnvelope,

    #[error("Missing SOAP Body")]
    MissingBody,
}

/// Parse une enveloppe SOAP complète.
///
/// Tolérant sur les préfixes de namespace : on compare le nom local.
pub fn parse_soap_envelope(xml: &[u8]) -> Result<SoapEnvelope, SoapParseError> {
    let reader = BufReader::new(xml);
    let root = Element::parse(reader)?;

    if !root.name.ends_with("Envelope") {
        return Err(SoapParseError::MissingEnvelope);
    }

    let body_elem = root
        .get_child("Body")
        .or_else(|| {
            root.children
                .iter()
                .find_map(|n| n.as_element().filter(|e| e.name.ends_with("Body")))
        })
        .ok_or(SoapParseError::MissingBody)?;

    Ok(SoapEnvelope {
        body: SoapBody {
            content: body_elem.clone(),
        },
    })
}

/// Extrait un éventuel SOAP Fault d'un corps de réponse.
///
/// Retourne `None` si le corps n'est pas du SOAP valide ou ne contient pas
/// de Fault : un fault absent n'est jamais une erreur.
pub fn parse_soap_fault(xml: &[u8]) -> Option<SoapFault> {
    let envelope = parse_soap_envelope(xml).ok()?;
    let fault_elem = find_descendant(&envelope.body.content, "Fault")?;

    let fault_code = child_text(fault_elem, "faultcode").unwrap_or_default();
    let fault_string = child_text(fault_elem, "faultstring").unwrap_or_default();

    let upnp_error = find_descendant(fault_elem, "UPnPError").map(|upnp| UpnpError {
        error_code: child_text(upnp, "errorCode").unwrap_or_default(),
        error_description: child_text(upnp, "errorDescription").unwrap_or_default(),
    });

    Some(SoapFault {
        fault_code,
        fault_string,
        upnp_error,
    })
}

/// Extrait le texte du premier élément nommé `tag` dans un corps de
/// réponse SOAP, à n'importe quelle profondeur.
///
/// Comparaison sur le nom local (les devices préfixent rarement les tags
/// de sortie, mais certains le font). Tag absent ou corps non parsable :
/// `None`, jamais une erreur.
pub fn extract_single_tag(body: &str, tag: &str) -> Option<String> {
    let reader = BufReader::new(body.as_bytes());
    let root = Element::parse(reader).ok()?;

    let elem = if local_name(&root.name) == tag {
        &root
    } else {
        find_descendant(&root, tag)?
    };

    Some(elem.get_text().map(|t| t.into_owned()).unwrap_or_default())
}

fn local_name(name: &str) -> &str {
    name.rsplit(':').next().unwrap_or(name)
}

fn find_descendant<'a>(elem: &'a Element, tag: &str) -> Option<&'a Element> {
    for child in &elem.children {
        if let Some(e) = child.as_element() {
            if local_name(&e.name) == tag {
                return Some(e);
            }
            if let Some(found) = find_descendant(e, tag) {
                return Some(found);
            }
        }
    }
    None
}

fn child_text(elem: &Element, tag: &str) -> Option<String> {
    find_descendant(elem, tag).map(|e| e.get_text().map(|t| t.into_owned()).unwrap_or_default())
}
