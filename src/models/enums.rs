//! Enumerations shared across the API.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::VisureError;

/// License requested when authenticating.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LicenseType {
    Authoring,
}

/// Base type of an attribute value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BaseType {
    Enumerated,
    Integer,
    Float,
    Date,
    Text,
    Boolean,
    User,
}

impl BaseType {
    pub const ALL: [BaseType; 7] = [
        Self::Enumerated,
        Self::Integer,
        Self::Float,
        Self::Date,
        Self::Text,
        Self::Boolean,
        Self::User,
    ];

    /// Wire form, e.g. `"ENUMERATED"`.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Enumerated => "ENUMERATED",
            Self::Integer => "INTEGER",
            Self::Float => "FLOAT",
            Self::Date => "DATE",
            Self::Text => "TEXT",
            Self::Boolean => "BOOLEAN",
            Self::User => "USER",
        }
    }
}

impl fmt::Display for BaseType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BaseType {
    type Err = VisureError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| VisureError::InvalidEnumValue {
                value: s.to_string(),
                valid: Self::ALL.iter().map(|t| t.as_str().to_string()).collect(),
            })
    }
}

/// A base type given either as [`BaseType`] or as its raw string form.
///
/// The raw form is sent to the server unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BaseTypeRef {
    Typed(BaseType),
    Raw(String),
}

impl BaseTypeRef {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Typed(t) => t.as_str(),
            Self::Raw(s) => s,
        }
    }
}

impl From<BaseType> for BaseTypeRef {
    fn from(t: BaseType) -> Self {
        Self::Typed(t)
    }
}

impl From<&str> for BaseTypeRef {
    fn from(s: &str) -> Self {
        Self::Raw(s.to_string())
    }
}

impl From<String> for BaseTypeRef {
    fn from(s: String) -> Self {
        Self::Raw(s)
    }
}

/// Built-in values of the `isRequirement` attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RequirementType {
    Heading,
    Item,
    Text,
}

impl RequirementType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Heading => "Heading",
            Self::Item => "Item",
            Self::Text => "Text",
        }
    }
}

impl AsRef<str> for RequirementType {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for RequirementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_type_wire_form() {
        assert_eq!(
            serde_json::to_value(BaseType::Enumerated).unwrap(),
            serde_json::json!("ENUMERATED")
        );
        assert_eq!(
            serde_json::to_value(BaseTypeRef::from("CUSTOM")).unwrap(),
            serde_json::json!("CUSTOM")
        );
        assert_eq!("BOOLEAN".parse::<BaseType>().unwrap(), BaseType::Boolean);
    }

    #[test]
    fn test_base_type_parse_is_case_sensitive() {
        let err = "boolean".parse::<BaseType>().unwrap_err();
        assert!(err.to_string().contains("BOOLEAN"));
    }

    #[test]
    fn test_license_type_wire_form() {
        assert_eq!(
            serde_json::to_value(LicenseType::Authoring).unwrap(),
            serde_json::json!("AUTHORING")
        );
    }
}
