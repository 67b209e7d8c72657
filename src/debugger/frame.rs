use crate::debugger::address::Address;

/// Stack frame.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Frame {
    pub address: Address,
    pub function: Option<String>,
    pub file: Option<String>,
    /// 1-based line, 0 if unknown.
    pub line: u32,
    /// Frame level, 0 is the innermost frame.
    pub depth: u32,
}

/// Local variable or function parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Variable {
    pub name: String,
    pub type_name: Option<String>,
    pub value: Option<String>,
}

/// Disassembled instruction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Instruction {
    pub address: Address,
    pub function: Option<String>,
    pub display: String,
}
