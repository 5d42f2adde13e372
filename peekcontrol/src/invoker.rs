//! Invocation d'une action UPnP sur un host enrichi.
//!
//! L'invocation résout le contrat d'arguments de l'action, collecte les
//! valeurs `in` auprès d'un [`ValueProvider`] (interactif ou scripté) dans
//! l'ordre de déclaration, applique le marshaling `bin.base64`, compose
//! l'URL de contrôle absolue, expédie l'appel SOAP et décode les arguments
//! `out` de la réponse. Rien n'est jamais écrit dans l'annuaire.

use crate::errors::ControlPointError;
use crate::model::{Direction, HostEntry, ServiceInfo, StateVariable};
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use peekupnp::soap::{build_soap_request, extract_single_tag, parse_soap_fault};
use tracing::{debug, warn};

/// Réponse brute d'un appel SOAP.
#[derive(Debug, Clone)]
pub struct SoapResponse {
    pub status: u16,
    pub body: String,
}

/// Couture de l'échange SOAP : scriptable dans les tests.
pub trait SoapCaller {
    fn call(
        &self,
        control_url: &str,
        service_type: &str,
        action: &str,
        args: &[(String, String)],
    ) -> Result<SoapResponse, ControlPointError>;
}

/// Client SOAP HTTP bloquant (ureq).
pub struct HttpSoapClient {
    agent: ureq::Agent,
}

impl HttpSoapClient {
    pub fn new() -> Self {
        // Indispensable : pouvoir lire le corps d'un HTTP 500, c'est là
        // que vivent les SOAP Faults.
        let config = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .build();
        Self {
            agent: config.into(),
        }
    }
}

impl Default for HttpSoapClient {
    fn default() -> Self {
        Self::new()
    }
}

impl SoapCaller for HttpSoapClient {
    fn call(
        &self,
        control_url: &str,
        service_type: &str,
        action: &str,
        args: &[(String, String)],
    ) -> Result<SoapResponse, ControlPointError> {
        let body_xml = build_soap_request(service_type, action, args)
            .map_err(|e| ControlPointError::soap_call(action, e))?;

        // En-tête SOAPAction : "urn:service#Action", guillemets compris.
        let soap_action_header = format!(r#""{}#{}""#, service_type, action);

        let mut response = self
            .agent
            .post(control_url)
            .header("Content-Type", r#"text/xml; charset="utf-8""#)
            .header("SOAPAction", &soap_action_header)
            .send(body_xml)
            .map_err(|e| ControlPointError::soap_call(action, e))?;

        let status = response.status().as_u16();
        let body = response
            .body_mut()
            .read_to_string()
            .map_err(|e| ControlPointError::soap_call(action, e))?;

        Ok(SoapResponse { status, body })
    }
}

/// Fournisseur des valeurs d'arguments `in`.
///
/// La state variable liée est exposée pour que le fournisseur puisse
/// présenter le type déclaré et les contraintes (valeurs permises, bornes,
/// défaut). `None` = saisie annulée par l'utilisateur.
pub trait ValueProvider {
    fn prompt(&mut self, arg_name: &str, state_var: &StateVariable) -> Option<String>;
}

/// Issue d'une invocation.
#[derive(Debug, PartialEq)]
pub enum InvokeOutcome {
    /// Valeurs `out` décodées, dans l'ordre de déclaration. `None` pour un
    /// tag absent de la réponse (ce n'est pas une erreur).
    Completed(Vec<(String, Option<String>)>),
    /// Saisie interrompue : aucun appel n'est parti.
    Cancelled,
}

pub struct ActionInvoker<C: SoapCaller> {
    caller: C,
}

impl Default for ActionInvoker<HttpSoapClient> {
    fn default() -> Self {
        Self::new(HttpSoapClient::new())
    }
}

impl<C: SoapCaller> ActionInvoker<C> {
    pub fn new(caller: C) -> Self {
        Self { caller }
    }

    pub fn invoke(
        &self,
        entry: &HostEntry,
        device_name: &str,
        service_name: &str,
        action_name: &str,
        provider: &mut dyn ValueProvider,
    ) -> Result<InvokeOutcome, ControlPointError> {
        if !entry.data_complete {
            return Err(ControlPointError::NotEnriched { index: entry.index });
        }

        let device = entry.device_list.get(device_name).ok_or_else(|| {
            ControlPointError::lookup(
                format!("device '{device_name}' on host {}", entry.index),
                "check the device name with 'host details'",
            )
        })?;
        let service = device.services.get(service_name).ok_or_else(|| {
            ControlPointError::lookup(
                format!("service '{service_name}' on device '{device_name}'"),
                "check the service name with 'host details'",
            )
        })?;

        let control_url = join_control_url(
            &format!("{}{}", entry.base_proto, entry.name),
            &service.control_url,
        );

        let action = service.actions.get(action_name).ok_or_else(|| {
            ControlPointError::lookup(
                format!("action '{action_name}' on service '{service_name}'"),
                "are you sure you've specified the correct action?",
            )
        })?;

        // Partition in/out dans l'ordre de déclaration du SCPD.
        let mut send_args: Vec<(String, String)> = Vec::new();
        let mut out_tags: Vec<(String, bool)> = Vec::new();

        for (arg_name, arg) in &action.arguments {
            let state_var = resolve_state_variable(service, &arg.related_state_variable)
                .ok_or_else(|| {
                    ControlPointError::lookup(
                        format!(
                            "state variable '{}' for argument '{}'",
                            arg.related_state_variable, arg_name
                        ),
                        "the device advertises an inconsistent SCPD",
                    )
                })?;

            match arg.direction {
                Direction::In => {
                    let Some(raw) = provider.prompt(arg_name, state_var) else {
                        debug!("invocation of '{}' cancelled at '{}'", action_name, arg_name);
                        return Ok(InvokeOutcome::Cancelled);
                    };
                    let value = if state_var.data_type.is_binary() && !raw.is_empty() {
                        BASE64.encode(raw.as_bytes())
                    } else {
                        raw
                    };
                    send_args.push((arg_name.clone(), value));
                }
                Direction::Out => {
                    out_tags.push((arg_name.clone(), state_var.data_type.is_binary()));
                }
            }
        }

        debug!(
            "invoking {}#{} at {} ({} in, {} out)",
            service.full_name,
            action_name,
            control_url,
            send_args.len(),
            out_tags.len()
        );
        let response = self
            .caller
            .call(&control_url, &service.full_name, action_name, &send_args)?;

        if !(200..300).contains(&response.status) {
            let reason = match parse_soap_fault(response.body.as_bytes()) {
                Some(fault) => fault.to_string(),
                None => format!("HTTP status {}", response.status),
            };
            return Err(ControlPointError::soap_call(action_name, reason));
        }

        let outputs = out_tags
            .into_iter()
            .map(|(tag, binary)| {
                let value = extract_single_tag(&response.body, &tag).map(|text| {
                    if binary {
                        decode_base64_text(&tag, &text)
                    } else {
                        text
                    }
                });
                (tag, value)
            })
            .collect();

        Ok(InvokeOutcome::Completed(outputs))
    }
}

fn resolve_state_variable<'a>(
    service: &'a ServiceInfo,
    name: &str,
) -> Option<&'a StateVariable> {
    service.state_variables.get(name)
}

fn decode_base64_text(tag: &str, text: &str) -> String {
    match BASE64.decode(text.trim()) {
        Ok(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
        Err(e) => {
            // Valeur annoncée binaire mais pas du base64 : on rend le texte
            // brut plutôt que d'échouer l'appel entier.
            warn!("out argument '{}' is not valid base64: {}", tag, e);
            text.to_string()
        }
    }
}

/// Jonction base + chemin de contrôle avec exactement un '/' de
/// séparation, quels que soient les suffixe/préfixe des deux segments.
pub fn join_control_url(base: &str, path: &str) -> String {
    let base = base.trim_end_matches('/');
    let path = path.trim_start_matches('/');
    format!("{base}/{path}")
}
