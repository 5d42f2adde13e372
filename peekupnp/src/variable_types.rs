//! Tags de types des state variables UPnP.
//!
//! Un control point ne convertit pas les valeurs : elles transitent en
//! texte. Le tag de type sert à présenter le contrat d'un argument à
//! l'utilisateur et à décider du marshaling binaire (`bin.base64`).

use serde::{Deserialize, Serialize};
use std::fmt;

/// Type déclaré d'une state variable UPnP.
///
/// Les tags inconnus sont conservés tels quels (`Unknown`) : un device
/// exotique ne doit pas faire échouer l'énumération ni casser l'aller-retour
/// de sérialisation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum StateVarType {
    UI1,       // Unsigned 8-bit integer
    UI2,       // Unsigned 16-bit integer
    UI4,       // Unsigned 32-bit integer
    I1,        // Signed 8-bit integer
    I2,        // Signed 16-bit integer
    I4,        // Signed 32-bit integer
    Int,       // Synonymous with i4
    R4,        // 32-bit floating point
    R8,        // 64-bit floating point
    Number,    // Synonymous with r8
    Fixed14_4, // Fixed-point decimal
    Char,      // Single Unicode character
    String,    // Character string
    Boolean,   // Boolean value
    BinBase64, // Base64-encoded binary
    BinHex,    // Hex-encoded binary
    Date,      // Date (YYYY-MM-DD)
    DateTime,  // DateTime without timezone
    DateTimeTZ, // DateTime with timezone
    Time,      // Time without timezone
    TimeTZ,    // Time with timezone
    UUID,      // Universally unique identifier
    URI,       // Uniform Resource Identifier
    Unknown(std::string::String),
}

impl StateVarType {
    pub fn from_tag(tag: &str) -> Self {
        match tag {
            "ui1" => StateVarType::UI1,
            "ui2" => StateVarType::UI2,
            "ui4" => StateVarType::UI4,
            "i1" => StateVarType::I1,
            "i2" => StateVarType::I2,
            "i4" => StateVarType::I4,
            "int" => StateVarType::Int,
            "r4" => StateVarType::R4,
            "r8" => StateVarType::R8,
            "number" => StateVarType::Number,
            "fixed.14.4" => StateVarType::Fixed14_4,
            "char" => StateVarType::Char,
            "string" => StateVarType::String,
            "boolean" => StateVarType::Boolean,
            "bin.base64" => StateVarType::BinBase64,
            "bin.hex" => StateVarType::BinHex,
            "date" => StateVarType::Date,
            "dateTime" => StateVarType::DateTime,
            "dateTime.tz" => StateVarType::DateTimeTZ,
            "time" => StateVarType::Time,
            "time.tz" => StateVarType::TimeTZ,
            "uuid" => StateVarType::UUID,
            "uri" => StateVarType::URI,
            other => StateVarType::Unknown(other.to_string()),
        }
    }

    pub fn tag(&self) -> &str {
        match self {
            StateVarType::UI1 => "ui1",
            StateVarType::UI2 => "ui2",
            StateVarType::UI4 => "ui4",
            StateVarType::I1 => "i1",
            StateVarType::I2 => "i2",
            StateVarType::I4 => "i4",
            StateVarType::Int => "int",
            StateVarType::R4 => "r4",
            StateVarType::R8 => "r8",
            StateVarType::Number => "number",
            StateVarType::Fixed14_4 => "fixed.14.4",
            StateVarType::Char => "char",
            StateVarType::String => "string",
            StateVarType::Boolean => "boolean",
            StateVarType::BinBase64 => "bin.base64",
            StateVarType::BinHex => "bin.hex",
            StateVarType::Date => "date",
            StateVarType::DateTime => "dateTime",
            StateVarType::DateTimeTZ => "dateTime.tz",
            StateVarType::Time => "time",
            StateVarType::TimeTZ => "time.tz",
            StateVarType::UUID => "uuid",
            StateVarType::URI => "uri",
            StateVarType::Unknown(tag) => tag,
        }
    }

    /// Binaire encodé en texte : les valeurs `in` doivent être encodées
    /// base64 avant envoi, les valeurs `out` décodées après extraction.
    pub fn is_binary(&self) -> bool {
        matches!(self, StateVarType::BinBase64)
    }

    pub fn is_numeric(&self) -> bool {
        matches!(
            self,
            StateVarType::UI1
                | StateVarType::UI2
                | StateVarType::UI4
                | StateVarType::I1
                | StateVarType::I2
                | StateVarType::I4
                | StateVarType::Int
                | StateVarType::R4
                | StateVarType::R8
                | StateVarType::Number
                | StateVarType::Fixed14_4
        )
    }

    pub fn is_string(&self) -> bool {
        matches!(self, StateVarType::String | StateVarType::Char)
    }
}

impl From<String> for StateVarType {
    fn from(tag: String) -> Self {
        StateVarType::from_tag(&tag)
    }
}

impl From<StateVarType> for String {
    fn from(t: StateVarType) -> Self {
        t.tag().to_string()
    }
}

impl fmt::Display for StateVarType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}
