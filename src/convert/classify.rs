//! Element type classification
//!
//! Data-driven: an ordered list of (pattern, category) rules evaluated in
//! priority order against the uppercased tag name, with a default
//! category. Keeping the policy as data makes it testable apart from the
//! projection code.

use serde::Serialize;

/// Coarse element categories used by consumers for icons and filtering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ElementType {
    Package,
    Component,
    Interface,
    Port,
    Element,
}

impl ElementType {
    /// Uppercase label as shown to consumers (and matched in search)
    pub fn label(&self) -> &'static str {
        match self {
            ElementType::Package => "PACKAGE",
            ElementType::Component => "COMPONENT",
            ElementType::Interface => "INTERFACE",
            ElementType::Port => "PORT",
            ElementType::Element => "ELEMENT",
        }
    }
}

/// Classification rules, evaluated top to bottom; first match wins
const RULES: [(&str, ElementType); 4] = [
    ("PACKAGE", ElementType::Package),
    ("COMPONENT", ElementType::Component),
    ("INTERFACE", ElementType::Interface),
    ("PORT", ElementType::Port),
];

/// Classify a tag name by substring match, falling back to ELEMENT
pub fn classify(tag_name: &str) -> ElementType {
    let upper = tag_name.to_ascii_uppercase();
    RULES
        .iter()
        .find(|(pattern, _)| upper.contains(pattern))
        .map(|(_, category)| *category)
        .unwrap_or(ElementType::Element)
}

/// The lowercase keyword that matched during classification, if any
pub fn matched_keyword(tag_name: &str) -> Option<&'static str> {
    let upper = tag_name.to_ascii_uppercase();
    match RULES.iter().find(|(pattern, _)| upper.contains(pattern)) {
        Some(("PACKAGE", _)) => Some("package"),
        Some(("COMPONENT", _)) => Some("component"),
        Some(("INTERFACE", _)) => Some("interface"),
        Some(("PORT", _)) => Some("port"),
        _ => None,
    }
}

/// Human-readable descriptions for the known AUTOSAR tag vocabulary
pub fn describe(tag_name: &str) -> Option<&'static str> {
    let description = match tag_name.to_ascii_uppercase().as_str() {
        "AUTOSAR" => "AUTOSAR document root",
        "AR-PACKAGES" => "Package container",
        "AR-PACKAGE" => "AUTOSAR package",
        "ELEMENTS" => "Element container",
        "SHORT-NAME" => "Short name identifier",
        "LONG-NAME" => "Long name",
        "DESC" => "Description",
        "APPLICATION-SW-COMPONENT-TYPE" => "Application software component type",
        "COMPOSITION-SW-COMPONENT-TYPE" => "Composition software component type",
        "SENDER-RECEIVER-INTERFACE" => "Sender/receiver interface",
        "CLIENT-SERVER-INTERFACE" => "Client/server interface",
        "P-PORT-PROTOTYPE" => "Provided port prototype",
        "R-PORT-PROTOTYPE" => "Required port prototype",
        "PORTS" => "Port container",
        "DATA-ELEMENTS" => "Data element container",
        "VARIABLE-DATA-PROTOTYPE" => "Variable data prototype",
        _ => return None,
    };
    Some(description)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_by_substring() {
        assert_eq!(classify("AR-PACKAGE"), ElementType::Package);
        assert_eq!(classify("APPLICATION-SW-COMPONENT-TYPE"), ElementType::Component);
        assert_eq!(classify("SENDER-RECEIVER-INTERFACE"), ElementType::Interface);
        assert_eq!(classify("P-PORT-PROTOTYPE"), ElementType::Port);
        assert_eq!(classify("SHORT-NAME"), ElementType::Element);
    }

    #[test]
    fn test_classify_case_insensitive() {
        assert_eq!(classify("ar-package"), ElementType::Package);
    }

    #[test]
    fn test_rule_priority_order() {
        // PACKAGE outranks COMPONENT when both fragments appear
        assert_eq!(classify("COMPONENT-PACKAGE"), ElementType::Package);
    }

    #[test]
    fn test_matched_keyword() {
        assert_eq!(matched_keyword("AR-PACKAGE"), Some("package"));
        assert_eq!(matched_keyword("SHORT-NAME"), None);
    }

    #[test]
    fn test_describe_known_vocabulary() {
        assert_eq!(describe("AUTOSAR"), Some("AUTOSAR document root"));
        assert_eq!(describe("UNKNOWN-TAG"), None);
    }
}
