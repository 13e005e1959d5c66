use crate::sqlite::Affinity;

/// A result column: its name and the type it was declared with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    pub(crate) name: String,
    pub(crate) decltype: Option<String>,
    pub(crate) affinity: Affinity,
}

impl Column {
    pub(crate) fn new(name: String, decltype: Option<String>) -> Self {
        let affinity = Affinity::from_decltype(decltype.as_deref());
        Self {
            name,
            decltype,
            affinity,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The declared type from the schema. `None` for expressions and subqueries.
    pub fn decltype(&self) -> Option<&str> {
        self.decltype.as_deref()
    }

    pub fn affinity(&self) -> Affinity {
        self.affinity
    }
}
