//! Names derived from the interface name. Downstream generators (genmock)
//! rely on these exact derivations.

use lazy_static::lazy_static;
use regex::Regex;

/// Receiver bound to promoted functions
pub const RECEIVER: &str = "mck";
/// Parameter name of the generated setter
pub const SETTER_PARAM: &str = "newS";
/// Command named in the invocation directive
pub const GENERATOR: &str = "mockable";
/// Command the invocation directive is rewritten to
pub const SUCCESSOR: &str = "genmock";

lazy_static! {
    static ref IDENTIFIER: Regex = Regex::new(r"^[\p{L}_][\p{L}\p{Nd}_]*$").unwrap();
}

/// Whether `name` is a valid Go identifier
pub fn is_identifier(name: &str) -> bool {
    IDENTIFIER.is_match(name)
}

/// Upper-case the first letter so the interface is exported
pub fn capitalize(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// The directive that invokes this tool, built from the names as supplied
pub fn invocation_marker(interface: &str, file_name: &str) -> String {
    format!("//go:generate {} -interface={} -filename={}", GENERATOR, interface, file_name)
}

/// The directive left behind for the mock generator
pub fn successor_marker(interface: &str) -> String {
    format!("//go:generate {} -interface={} -mock-package=. -package=.", SUCCESSOR, interface)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Naming {
    pub interface: String,
    pub implementation: String,
    pub variable: String,
    pub setter: String,
    /// Mutex guarding the variable in synchronized mode
    pub lock: String,
    /// Read accessor for the variable in synchronized mode
    pub getter: String,
    pub receiver: String,
    pub marker: String,
    pub successor_marker: String,
}

impl Naming {
    /// Derive every name from the interface name as the user supplied it
    pub fn new(interface: &str, file_name: &str) -> Self {
        // The marker has to match the directive text, so it keeps the raw name
        let marker = invocation_marker(interface, file_name);
        let interface = capitalize(interface);
        Self {
            implementation: format!("{}Impl", interface),
            variable: format!("default{}", interface),
            setter: format!("Set{}", interface),
            lock: format!("default{}Mu", interface),
            getter: format!("current{}", interface),
            receiver: RECEIVER.to_string(),
            successor_marker: successor_marker(&interface),
            marker,
            interface,
        }
    }

    /// Names the rewrite adds at package scope
    pub fn declared(&self) -> [&str; 4] {
        [
            self.interface.as_str(),
            self.implementation.as_str(),
            self.variable.as_str(),
            self.setter.as_str(),
        ]
    }

    /// Extra names added when access to the variable is synchronized
    pub fn synchronized(&self) -> [&str; 2] {
        [self.lock.as_str(), self.getter.as_str()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_derived_names() {
        let naming = Naming::new("Foo", "foo.go");
        assert_eq!(naming.interface, "Foo");
        assert_eq!(naming.implementation, "FooImpl");
        assert_eq!(naming.variable, "defaultFoo");
        assert_eq!(naming.setter, "SetFoo");
        assert_eq!(naming.receiver, "mck");
        assert_eq!(naming.synchronized(), ["defaultFooMu", "currentFoo"]);
    }

    #[test]
    fn test_lowercase_name_is_exported() {
        let naming = Naming::new("calculator", "calc.go");
        assert_eq!(naming.interface, "Calculator");
        assert_eq!(naming.variable, "defaultCalculator");
        assert_eq!(
            naming.marker,
            "//go:generate mockable -interface=calculator -filename=calc.go"
        );
        assert_eq!(
            naming.successor_marker,
            "//go:generate genmock -interface=Calculator -mock-package=. -package=."
        );
    }

    #[test]
    fn test_identifiers() {
        assert!(is_identifier("Calculator"));
        assert!(is_identifier("_private2"));
        assert!(is_identifier("Größe"));
        assert!(!is_identifier("2fast"));
        assert!(!is_identifier("with-dash"));
        assert!(!is_identifier(""));
    }

    #[test]
    fn test_capitalize() {
        assert_eq!(capitalize("store"), "Store");
        assert_eq!(capitalize("éclair"), "Éclair");
        assert_eq!(capitalize(""), "");
    }
}
