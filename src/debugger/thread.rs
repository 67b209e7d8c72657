/// Debugee thread as identified by gdb.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct Thread {
    pub id: String,
    /// Thread group (inferior) the thread belongs to, like `i1`.
    pub group: Option<String>,
}

impl Thread {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            group: None,
        }
    }
}

/// Gdb inferior.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct ThreadGroup {
    pub id: String,
    pub pid: Option<String>,
    pub exit_code: Option<String>,
}

impl ThreadGroup {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Self::default()
        }
    }
}
