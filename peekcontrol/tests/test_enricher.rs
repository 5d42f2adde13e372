//! Tests de l'enrichissement sur un fetcher scripté (aucun socket).

use peekcontrol::enricher::{
    DescriptionEnricher, DescriptionFetcher, EnrichOutcome, FetchError,
};
use peekcontrol::errors::ControlPointError;
use peekcontrol::model::{Direction, HostEntry};
use peekupnp::StateVarType;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

/// Fetcher scripté : carte URL -> document. Le journal des URLs fetchées
/// est partagé avec le test (l'enrichisseur possède le fetcher).
struct MapFetcher {
    documents: HashMap<String, String>,
    calls: Rc<RefCell<Vec<String>>>,
}

impl MapFetcher {
    fn new(documents: &[(&str, &str)]) -> Self {
        Self {
            documents: documents
                .iter()
                .map(|(u, d)| (u.to_string(), d.to_string()))
                .collect(),
            calls: Rc::new(RefCell::new(Vec::new())),
        }
    }

    fn call_log(&self) -> Rc<RefCell<Vec<String>>> {
        Rc::clone(&self.calls)
    }
}

impl DescriptionFetcher for MapFetcher {
    fn fetch(&self, url: &str) -> Result<String, FetchError> {
        self.calls.borrow_mut().push(url.to_string());
        self.documents
            .get(url)
            .cloned()
            .ok_or_else(|| FetchError(format!("connection refused: {url}")))
    }
}

const DESCRIPTION_XML: &str = r#"<?xml version="1.0"?>
<root xmlns="urn:schemas-upnp-org:device-1-0">
  <device>
    <deviceType>urn:schemas-upnp-org:device:InternetGatewayDevice:1</deviceType>
    <friendlyName>Test Gateway</friendlyName>
    <manufacturer>Acme</manufacturer>
    <modelName>GW-1000</modelName>
    <UDN>uuid:igd-0001</UDN>
    <serviceList>
      <service>
        <serviceType>urn:schemas-upnp-org:service:WANIPConnection:1</serviceType>
        <serviceId>urn:upnp-org:serviceId:WANIPConn1</serviceId>
        <controlURL>/ctl/IPConn</controlURL>
        <eventSubURL>/evt/IPConn</eventSubURL>
        <SCPDURL>/WANIPCn.xml</SCPDURL>
      </service>
    </serviceList>
  </device>
</root>"#;

const SCPD_XML: &str = r#"<?xml version="1.0"?>
<scpd xmlns="urn:schemas-upnp-org:service-1-0">
  <actionList>
    <action>
      <name>GetExternalIPAddress</name>
      <argumentList>
        <argument>
          <name>NewExternalIPAddress</name>
          <direction>out</direction>
          <relatedStateVariable>ExternalIPAddress</relatedStateVariable>
        </argument>
      </argumentList>
    </action>
    <action>
      <name>SetConnectionType</name>
      <argumentList>
        <argument>
          <name>NewConnectionType</name>
          <direction>in</direction>
          <relatedStateVariable>ConnectionType</relatedStateVariable>
        </argument>
      </argumentList>
    </action>
  </actionList>
  <serviceStateTable>
    <stateVariable sendEvents="yes">
      <name>ExternalIPAddress</name>
      <dataType>string</dataType>
    </stateVariable>
    <stateVariable sendEvents="no">
      <name>ConnectionType</name>
      <dataType>string</dataType>
      <allowedValueList>
        <allowedValue>IP_Routed</allowedValue>
        <allowedValue>IP_Bridged</allowedValue>
      </allowedValueList>
    </stateVariable>
  </serviceStateTable>
</scpd>"#;

fn gateway_entry() -> HostEntry {
    HostEntry::from_location(
        0,
        "uuid:igd-0001::upnp:rootdevice",
        "http://192.168.1.1:49152/rootDesc.xml",
    )
    .unwrap()
}

#[test]
fn test_enrich_builds_full_tree() {
    let fetcher = MapFetcher::new(&[
        ("http://192.168.1.1:49152/rootDesc.xml", DESCRIPTION_XML),
        ("http://192.168.1.1:49152/WANIPCn.xml", SCPD_XML),
    ]);
    let enricher = DescriptionEnricher::new(fetcher);
    let mut entry = gateway_entry();

    let outcome = enricher.enrich(&mut entry).unwrap();
    assert_eq!(outcome, EnrichOutcome::Enriched);
    assert!(entry.data_complete);

    let device = &entry.device_list["InternetGatewayDevice"];
    assert_eq!(device.friendly_name.as_deref(), Some("Test Gateway"));
    assert_eq!(device.udn.as_deref(), Some("uuid:igd-0001"));

    let service = &device.services["WANIPConnection"];
    assert_eq!(
        service.full_name,
        "urn:schemas-upnp-org:service:WANIPConnection:1"
    );
    assert_eq!(service.control_url, "/ctl/IPConn");
    // SCPDURL relative résolue contre l'URL du description document.
    assert_eq!(service.scpd_url, "http://192.168.1.1:49152/WANIPCn.xml");

    // Actions et arguments dans l'ordre de déclaration.
    let action_names: Vec<&String> = service.actions.keys().collect();
    assert_eq!(action_names, vec!["GetExternalIPAddress", "SetConnectionType"]);

    let set_type = &service.actions["SetConnectionType"];
    let arg = &set_type.arguments["NewConnectionType"];
    assert_eq!(arg.direction, Direction::In);
    assert_eq!(arg.related_state_variable, "ConnectionType");

    let conn_type = &service.state_variables["ConnectionType"];
    assert_eq!(conn_type.data_type, StateVarType::String);
    assert_eq!(
        conn_type.allowed_values.as_deref(),
        Some(["IP_Routed".to_string(), "IP_Bridged".to_string()].as_slice())
    );
}

#[test]
fn test_enrich_failure_leaves_entry_unchanged() {
    // Le SCPD n'est pas servi : panne au second fetch.
    let fetcher = MapFetcher::new(&[("http://192.168.1.1:49152/rootDesc.xml", DESCRIPTION_XML)]);
    let enricher = DescriptionEnricher::new(fetcher);
    let mut entry = gateway_entry();

    match enricher.enrich(&mut entry) {
        Err(ControlPointError::Description { name, url, .. }) => {
            assert_eq!(name, "192.168.1.1:49152");
            assert_eq!(url, "http://192.168.1.1:49152/WANIPCn.xml");
        }
        other => panic!("expected Description error, got {other:?}"),
    }

    assert!(!entry.data_complete);
    assert!(entry.device_list.is_empty());
}

#[test]
fn test_enrich_malformed_description_is_error() {
    let fetcher = MapFetcher::new(&[(
        "http://192.168.1.1:49152/rootDesc.xml",
        "<root><device></root>",
    )]);
    let enricher = DescriptionEnricher::new(fetcher);
    let mut entry = gateway_entry();

    assert!(matches!(
        enricher.enrich(&mut entry),
        Err(ControlPointError::Description { .. })
    ));
    assert!(!entry.data_complete);
}

#[test]
fn test_already_complete_entry_is_not_refetched() {
    let fetcher = MapFetcher::new(&[
        ("http://192.168.1.1:49152/rootDesc.xml", DESCRIPTION_XML),
        ("http://192.168.1.1:49152/WANIPCn.xml", SCPD_XML),
    ]);
    let calls = fetcher.call_log();
    let enricher = DescriptionEnricher::new(fetcher);
    let mut entry = gateway_entry();

    assert_eq!(enricher.enrich(&mut entry).unwrap(), EnrichOutcome::Enriched);
    assert_eq!(calls.borrow().len(), 2);

    // Second appel : aucun fetch supplémentaire.
    assert_eq!(
        enricher.enrich(&mut entry).unwrap(),
        EnrichOutcome::AlreadyComplete
    );
    assert_eq!(calls.borrow().len(), 2);
}
