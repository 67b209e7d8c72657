use crate::debugger::address::AddressRange;

/// Shared library loaded in the debugee.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Library {
    pub id: String,
    pub host_name: Option<String>,
    pub target_name: Option<String>,
    pub ranges: Vec<AddressRange>,
}
