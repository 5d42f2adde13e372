//! Décodage streaming des SCPD (Service Control Protocol Description).

use super::DescriptionParseError;
use crate::variable_types::StateVarType;
use quick_xml::Reader;
use quick_xml::events::Event;

/// SCPD décodé : le contrat d'invocation d'un service.
#[derive(Debug, Clone, Default)]
pub struct Scpd {
    /// Actions dans l'ordre de déclaration.
    pub actions: Vec<ScpdAction>,
    /// State variables dans l'ordre de déclaration.
    pub state_variables: Vec<ScpdStateVariable>,
}

#[derive(Debug, Clone, Default)]
pub struct ScpdAction {
    pub name: String,
    /// Arguments dans l'ordre de déclaration : cet ordre pilote l'ordre de
    /// prompt lors d'une invocation.
    pub arguments: Vec<ScpdArgument>,
}

#[derive(Debug, Clone, Default)]
pub struct ScpdArgument {
    pub name: String,
    pub direction: String,
    pub related_state_variable: String,
}

#[derive(Debug, Clone)]
pub struct ScpdStateVariable {
    pub name: String,
    pub data_type: StateVarType,
    pub allowed_values: Option<Vec<String>>,
    pub allowed_range: Option<(String, String)>,
    pub default_value: Option<String>,
}

impl Default for ScpdStateVariable {
    fn default() -> Self {
        Self {
            name: String::new(),
            data_type: StateVarType::String,
            allowed_values: None,
            allowed_range: None,
            default_value: None,
        }
    }
}

// Portée courante du parseur : <name> apparaît sous <action>, <argument>
// et <stateVariable>, il faut savoir à qui attacher le texte.
#[derive(Debug, Clone, Copy, PartialEq)]
enum Scope {
    Top,
    Action,
    Argument,
    StateVariable,
    AllowedValueList,
    AllowedValueRange,
}

impl Scpd {
    /// Décode un document SCPD.
    pub fn parse(xml: &str) -> Result<Scpd, DescriptionParseError> {
        let mut reader = Reader::from_str(xml);
        reader.config_mut().trim_text(true);

        let mut buf = Vec::new();
        let mut parsed = Scpd::default();

        let mut scope = Scope::Top;
        let mut current_tag: Option<String> = None;
        let mut action = ScpdAction::default();
        let mut argument = ScpdArgument::default();
        let mut variable = ScpdStateVariable::default();
        let mut range_min: Option<String> = None;
        let mut range_max: Option<String> = None;

        loop {
            match reader.read_event_into(&mut buf)? {
                Event::Start(e) => {
                    let name = String::from_utf8_lossy(e.name().as_ref()).to_string();
                    match name.as_str() {
                        "action" => {
                            scope = Scope::Action;
                            action = ScpdAction::default();
                        }
                        "argument" => {
                            scope = Scope::Argument;
                            argument = ScpdArgument::default();
                        }
                        "stateVariable" => {
                            scope = Scope::StateVariable;
                            variable = ScpdStateVariable::default();
                        }
                        "allowedValueList" => {
                            scope = Scope::AllowedValueList;
                        }
                        "allowedValueRange" => {
                            scope = Scope::AllowedValueRange;
                            range_min = None;
                            range_max = None;
                        }
                        _ => {
                            current_tag = Some(name);
                        }
                    }
                }
                Event::End(e) => {
                    let name = String::from_utf8_lossy(e.name().as_ref()).to_string();
                    match name.as_str() {
                        "action" => {
                            if !action.name.is_empty() {
                                parsed.actions.push(std::mem::take(&mut action));
                            }
                            scope = Scope::Top;
                        }
                        "argument" => {
                            if !argument.name.is_empty() {
                                action.arguments.push(std::mem::take(&mut argument));
                            }
                            scope = Scope::Action;
                        }
                        "stateVariable" => {
                            if !variable.name.is_empty() {
                                parsed.state_variables.push(std::mem::take(&mut variable));
                            }
                            scope = Scope::Top;
                        }
                        "allowedValueList" => {
                            scope = Scope::StateVariable;
                        }
                        "allowedValueRange" => {
                            if let (Some(min), Some(max)) = (range_min.take(), range_max.take()) {
                                variable.allowed_range = Some((min, max));
                            }
                            scope = Scope::StateVariable;
                        }
                        _ => {}
                    }
                    current_tag = None;
                }
                Event::Text(e) => {
                    let Some(tag) = &current_tag else { continue };
                    let text = e.decode()?.into_owned();

                    match (scope, tag.as_str()) {
                        (Scope::Action, "name") => action.name = text,
                        (Scope::Argument, "name") => argument.name = text,
                        (Scope::Argument, "direction") => argument.direction = text,
                        (Scope::Argument, "relatedStateVariable") => {
                            argument.related_state_variable = text;
                        }
                        (Scope::StateVariable, "name") => variable.name = text,
                        (Scope::StateVariable, "dataType") => {
                            variable.data_type = StateVarType::from_tag(&text);
                        }
                        (Scope::StateVariable, "defaultValue") => {
                            variable.default_value = Some(text);
                        }
                        (Scope::AllowedValueList, "allowedValue") => {
                            variable
                                .allowed_values
                                .get_or_insert_with(Vec::new)
                                .push(text);
                        }
                        (Scope::AllowedValueRange, "minimum") => range_min = Some(text),
                        (Scope::AllowedValueRange, "maximum") => range_max = Some(text),
                        _ => {}
                    }
                }
                Event::Eof => break,
                _ => {}
            }

            buf.clear();
        }

        Ok(parsed)
    }
}
