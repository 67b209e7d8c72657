use std::collections::HashMap;

/// Register value in hex as reported by `-data-list-register-values x`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Register {
    pub number: String,
    pub name: Option<String>,
    pub value: String,
}

/// Register number to name mapping, filled once per session.
pub type RegisterNames = HashMap<String, String>;
