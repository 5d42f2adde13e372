//! Tests de l'invocation d'actions sur un appelant SOAP scripté.

use indexmap::IndexMap;
use peekcontrol::errors::ControlPointError;
use peekcontrol::invoker::{
    ActionInvoker, InvokeOutcome, SoapCaller, SoapResponse, ValueProvider,
};
use peekcontrol::model::{
    ActionInfo, ArgumentInfo, DeviceInfo, Direction, HostEntry, ServiceInfo, StateVariable,
};
use peekupnp::StateVarType;
use std::cell::RefCell;
use std::rc::Rc;

#[derive(Debug, Clone)]
struct RecordedCall {
    control_url: String,
    service_type: String,
    action: String,
    args: Vec<(String, String)>,
}

/// Appelant SOAP scripté : enregistre les appels, rejoue une réponse.
struct ScriptedCaller {
    response: SoapResponse,
    calls: Rc<RefCell<Vec<RecordedCall>>>,
}

impl ScriptedCaller {
    fn new(status: u16, body: &str) -> Self {
        Self {
            response: SoapResponse {
                status,
                body: body.to_string(),
            },
            calls: Rc::new(RefCell::new(Vec::new())),
        }
    }

    fn call_log(&self) -> Rc<RefCell<Vec<RecordedCall>>> {
        Rc::clone(&self.calls)
    }
}

impl SoapCaller for ScriptedCaller {
    fn call(
        &self,
        control_url: &str,
        service_type: &str,
        action: &str,
        args: &[(String, String)],
    ) -> Result<SoapResponse, ControlPointError> {
        self.calls.borrow_mut().push(RecordedCall {
            control_url: control_url.to_string(),
            service_type: service_type.to_string(),
            action: action.to_string(),
            args: args.to_vec(),
        });
        Ok(self.response.clone())
    }
}

/// Fournit des valeurs pré-écrites, dans l'ordre des prompts.
struct ScriptedProvider {
    values: Vec<Option<String>>,
    prompted: Vec<String>,
}

impl ScriptedProvider {
    fn new(values: &[Option<&str>]) -> Self {
        Self {
            values: values.iter().map(|v| v.map(|s| s.to_string())).collect(),
            prompted: Vec::new(),
        }
    }
}

impl ValueProvider for ScriptedProvider {
    fn prompt(&mut self, arg_name: &str, _state_var: &StateVariable) -> Option<String> {
        self.prompted.push(arg_name.to_string());
        if self.values.is_empty() {
            None
        } else {
            self.values.remove(0)
        }
    }
}

fn string_var() -> StateVariable {
    StateVariable {
        data_type: StateVarType::String,
        allowed_values: None,
        allowed_range: None,
        default_value: None,
    }
}

fn binary_var() -> StateVariable {
    StateVariable {
        data_type: StateVarType::BinBase64,
        allowed_values: None,
        allowed_range: None,
        default_value: None,
    }
}

/// Host enrichi avec un service de test : une action string et une action
/// à arguments binaires.
fn enriched_entry() -> HostEntry {
    let mut get_ip_args = IndexMap::new();
    get_ip_args.insert(
        "NewExternalIPAddress".to_string(),
        ArgumentInfo {
            direction: Direction::Out,
            related_state_variable: "ExternalIPAddress".to_string(),
        },
    );

    let mut echo_args = IndexMap::new();
    echo_args.insert(
        "NewData".to_string(),
        ArgumentInfo {
            direction: Direction::In,
            related_state_variable: "Payload".to_string(),
        },
    );
    echo_args.insert(
        "NewResult".to_string(),
        ArgumentInfo {
            direction: Direction::Out,
            related_state_variable: "Payload".to_string(),
        },
    );

    let mut actions = IndexMap::new();
    actions.insert(
        "GetExternalIPAddress".to_string(),
        ActionInfo {
            arguments: get_ip_args,
        },
    );
    actions.insert("EchoData".to_string(), ActionInfo { arguments: echo_args });

    let mut state_variables = IndexMap::new();
    state_variables.insert("ExternalIPAddress".to_string(), string_var());
    state_variables.insert("Payload".to_string(), binary_var());

    let mut services = IndexMap::new();
    services.insert(
        "WANIPConnection".to_string(),
        ServiceInfo {
            full_name: "urn:schemas-upnp-org:service:WANIPConnection:1".to_string(),
            control_url: "/ctl/IPConn".to_string(),
            scpd_url: "http://192.168.1.1:49152/WANIPCn.xml".to_string(),
            actions,
            state_variables,
        },
    );

    let mut device_list = IndexMap::new();
    device_list.insert(
        "WANConnectionDevice".to_string(),
        DeviceInfo {
            device_type: Some(
                "urn:schemas-upnp-org:device:WANConnectionDevice:1".to_string(),
            ),
            friendly_name: Some("Test Gateway".to_string()),
            manufacturer: None,
            model_name: None,
            udn: Some("uuid:igd-0001".to_string()),
            services,
        },
    );

    let mut entry = HostEntry::from_location(
        0,
        "uuid:igd-0001::upnp:rootdevice",
        "http://192.168.1.1:49152/rootDesc.xml",
    )
    .unwrap();
    entry.device_list = device_list;
    entry.data_complete = true;
    entry
}

fn response_body(inner: &str) -> String {
    format!(
        r#"<?xml version="1.0"?>
<s:Envelope xmlns:s="http://schemas.xmlsoap.org/soap/envelope/">
  <s:Body>
    <u:Response xmlns:u="urn:schemas-upnp-org:service:WANIPConnection:1">
      {inner}
    </u:Response>
  </s:Body>
</s:Envelope>"#
    )
}

const FAULT_BODY: &str = r#"<?xml version="1.0"?>
<s:Envelope xmlns:s="http://schemas.xmlsoap.org/soap/envelope/">
  <s:Body>
    <s:Fault>
      <faultcode>s:Client</faultcode>
      <faultstring>UPnPError</faultstring>
      <detail>
        <UPnPError xmlns="urn:schemas-upnp-org:control-1-0">
          <errorCode>401</errorCode>
          <errorDescription>Invalid Action</errorDescription>
        </UPnPError>
      </detail>
    </s:Fault>
  </s:Body>
</s:Envelope>"#;

#[test]
fn test_invoke_decodes_out_arguments() {
    let body = response_body("<NewExternalIPAddress>203.0.113.7</NewExternalIPAddress>");
    let caller = ScriptedCaller::new(200, &body);
    let calls = caller.call_log();
    let invoker = ActionInvoker::new(caller);
    let entry = enriched_entry();
    let mut provider = ScriptedProvider::new(&[]);

    let outcome = invoker
        .invoke(
            &entry,
            "WANConnectionDevice",
            "WANIPConnection",
            "GetExternalIPAddress",
            &mut provider,
        )
        .unwrap();

    assert_eq!(
        outcome,
        InvokeOutcome::Completed(vec![(
            "NewExternalIPAddress".to_string(),
            Some("203.0.113.7".to_string())
        )])
    );

    // Aucun argument `out` n'est prompté.
    assert!(provider.prompted.is_empty());

    let calls = calls.borrow();
    assert_eq!(calls.len(), 1);
    // Exactement un '/' entre la base et le chemin de contrôle.
    assert_eq!(calls[0].control_url, "http://192.168.1.1:49152/ctl/IPConn");
    assert_eq!(
        calls[0].service_type,
        "urn:schemas-upnp-org:service:WANIPConnection:1"
    );
    assert_eq!(calls[0].action, "GetExternalIPAddress");
    assert!(calls[0].args.is_empty());
}

#[test]
fn test_binary_arguments_round_trip_base64() {
    // La réponse porte "hello" encodé ; la valeur envoyée doit l'être
    // aussi, et la valeur rendue doit être le texte décodé.
    let body = response_body("<NewResult>aGVsbG8=</NewResult>");
    let caller = ScriptedCaller::new(200, &body);
    let calls = caller.call_log();
    let invoker = ActionInvoker::new(caller);
    let entry = enriched_entry();
    let mut provider = ScriptedProvider::new(&[Some("hello")]);

    let outcome = invoker
        .invoke(
            &entry,
            "WANConnectionDevice",
            "WANIPConnection",
            "EchoData",
            &mut provider,
        )
        .unwrap();

    assert_eq!(provider.prompted, vec!["NewData"]);
    assert_eq!(
        calls.borrow()[0].args,
        vec![("NewData".to_string(), "aGVsbG8=".to_string())]
    );
    assert_eq!(
        outcome,
        InvokeOutcome::Completed(vec![(
            "NewResult".to_string(),
            Some("hello".to_string())
        )])
    );
}

#[test]
fn test_missing_out_tag_is_none() {
    let body = response_body("");
    let caller = ScriptedCaller::new(200, &body);
    let invoker = ActionInvoker::new(caller);
    let entry = enriched_entry();
    let mut provider = ScriptedProvider::new(&[]);

    let outcome = invoker
        .invoke(
            &entry,
            "WANConnectionDevice",
            "WANIPConnection",
            "GetExternalIPAddress",
            &mut provider,
        )
        .unwrap();

    assert_eq!(
        outcome,
        InvokeOutcome::Completed(vec![("NewExternalIPAddress".to_string(), None)])
    );
}

#[test]
fn test_not_enriched_host_is_rejected() {
    let caller = ScriptedCaller::new(200, "");
    let calls = caller.call_log();
    let invoker = ActionInvoker::new(caller);
    let mut entry = enriched_entry();
    entry.data_complete = false;
    let mut provider = ScriptedProvider::new(&[]);

    let result = invoker.invoke(
        &entry,
        "WANConnectionDevice",
        "WANIPConnection",
        "GetExternalIPAddress",
        &mut provider,
    );

    assert!(matches!(
        result,
        Err(ControlPointError::NotEnriched { index: 0 })
    ));
    assert!(calls.borrow().is_empty());
}

#[test]
fn test_unknown_action_is_lookup_error_without_any_call() {
    let caller = ScriptedCaller::new(200, "");
    let calls = caller.call_log();
    let invoker = ActionInvoker::new(caller);
    let entry = enriched_entry();
    let mut provider = ScriptedProvider::new(&[]);

    let result = invoker.invoke(
        &entry,
        "WANConnectionDevice",
        "WANIPConnection",
        "NoSuchAction",
        &mut provider,
    );

    match result {
        Err(ControlPointError::Lookup { what, .. }) => {
            assert!(what.contains("'NoSuchAction'"), "got: {what}");
        }
        other => panic!("expected Lookup error, got {other:?}"),
    }
    assert!(calls.borrow().is_empty());
    assert!(provider.prompted.is_empty());
}

#[test]
fn test_cancelled_prompt_sends_nothing() {
    let caller = ScriptedCaller::new(200, "");
    let calls = caller.call_log();
    let invoker = ActionInvoker::new(caller);
    let entry = enriched_entry();
    let mut provider = ScriptedProvider::new(&[None]);

    let outcome = invoker
        .invoke(
            &entry,
            "WANConnectionDevice",
            "WANIPConnection",
            "EchoData",
            &mut provider,
        )
        .unwrap();

    assert_eq!(outcome, InvokeOutcome::Cancelled);
    assert!(calls.borrow().is_empty());
}

#[test]
fn test_soap_fault_surfaces_upnp_detail() {
    let caller = ScriptedCaller::new(500, FAULT_BODY);
    let invoker = ActionInvoker::new(caller);
    let entry = enriched_entry();
    let mut provider = ScriptedProvider::new(&[]);

    let result = invoker.invoke(
        &entry,
        "WANConnectionDevice",
        "WANIPConnection",
        "GetExternalIPAddress",
        &mut provider,
    );

    match result {
        Err(ControlPointError::SoapCall { action, reason }) => {
            assert_eq!(action, "GetExternalIPAddress");
            assert!(reason.contains("401"), "got: {reason}");
            assert!(reason.contains("Invalid Action"), "got: {reason}");
        }
        other => panic!("expected SoapCall error, got {other:?}"),
    }
}

#[test]
fn test_non_soap_error_status_reports_http_code() {
    let caller = ScriptedCaller::new(404, "page not found");
    let invoker = ActionInvoker::new(caller);
    let entry = enriched_entry();
    let mut provider = ScriptedProvider::new(&[]);

    match invoker.invoke(
        &entry,
        "WANConnectionDevice",
        "WANIPConnection",
        "GetExternalIPAddress",
        &mut provider,
    ) {
        Err(ControlPointError::SoapCall { reason, .. }) => {
            assert!(reason.contains("404"), "got: {reason}");
        }
        other => panic!("expected SoapCall error, got {other:?}"),
    }
}
