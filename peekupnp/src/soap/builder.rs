//! Construction de requêtes SOAP

use xmltree::{Element, XMLNode};

fn build_soap_envelope_with_body(body_child: Element) -> Result<String, xmltree::Error> {
    // Body
    let mut body = Element::new("s:Body");
    body.children.push(XMLNode::Element(body_child));

    // Envelope
    let mut envelope = Element::new("s:Envelope");
    envelope.attributes.insert(
        "xmlns:s".to_string(),
        "http://schemas.xmlsoap.org/soap/envelope/".to_string(),
    );
    envelope.attributes.insert(
        "s:encodingStyle".to_string(),
        "http://schemas.xmlsoap.org/soap/encoding/".to_string(),
    );
    envelope.children.push(XMLNode::Element(body));

    let mut buf = Vec::new();
    let config = xmltree::EmitterConfig::new()
        .write_document_declaration(true)
        .perform_indent(true)
        .indent_string("  ");
    envelope.write_with_config(&mut buf, config)?;

    Ok(String::from_utf8(buf).expect("xmltree emits valid UTF-8"))
}

/// Construit une requête d'action SOAP UPnP
///
/// # Arguments
///
/// * `service_urn` - URN du service (ex: "urn:schemas-upnp-org:service:WANIPConnection:1")
/// * `action` - Nom de l'action (ex: "GetExternalIPAddress")
/// * `args` - Arguments `in` de l'action, dans l'ordre de déclaration
///
/// # Returns
///
/// XML SOAP formaté en String
pub fn build_soap_request(
    service_urn: &str,
    action: &str,
    args: &[(String, String)],
) -> Result<String, xmltree::Error> {
    let action_name = format!("u:{}", action);
    let mut action_elem = Element::new(&action_name);
    action_elem
        .attributes
        .insert("xmlns:u".to_string(), service_urn.to_string());

    for (key, value) in args {
        let mut child = Element::new(key);
        child.children.push(XMLNode::Text(value.clone()));
        action_elem.children.push(XMLNode::Element(child));
    }

    build_soap_envelope_with_body(action_elem)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_request_without_args() {
        let xml = build_soap_request(
            "urn:schemas-upnp-org:service:WANIPConnection:1",
            "GetExternalIPAddress",
            &[],
        )
        .unwrap();

        assert!(xml.contains("<s:Envelope"));
        assert!(xml.contains("http://schemas.xmlsoap.org/soap/envelope/"));
        assert!(xml.contains("<u:GetExternalIPAddress"));
        assert!(xml.contains("urn:schemas-upnp-org:service:WANIPConnection:1"));
    }

    #[test]
    fn test_build_request_with_args() {
        let args = vec![
            ("InstanceID".to_string(), "0".to_string()),
            ("Speed".to_string(), "1".to_string()),
        ];
        let xml = build_soap_request(
            "urn:schemas-upnp-org:service:AVTransport:1",
            "Play",
            &args,
        )
        .unwrap();

        assert!(xml.contains("<u:Play"));
        assert!(xml.contains("<InstanceID>0</InstanceID>"));
        assert!(xml.contains("<Speed>1</Speed>"));
    }
}
