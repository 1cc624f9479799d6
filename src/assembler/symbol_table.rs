//! Label table: name → address bindings collected during assembly

/// A label bound to an address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Label {
    /// Label name, case-sensitive
    pub name: String,

    /// Address of the cell that follows the label
    pub address: u32,

    /// Source line where the label was defined (1-indexed)
    pub defined_at: usize,
}

/// Ordered label table. Names are unique; definition order is kept for listings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LabelTable {
    labels: Vec<Label>,
}

impl LabelTable {
    /// Create a new empty label table
    pub fn new() -> Self {
        Self { labels: Vec::new() }
    }

    /// Bind `name` to `address`.
    ///
    /// Returns the existing label if the name is already taken.
    pub fn define(&mut self, name: &str, address: u32, defined_at: usize) -> Result<(), Label> {
        if let Some(existing) = self.lookup(name) {
            return Err(existing.clone());
        }

        self.labels.push(Label {
            name: name.to_string(),
            address,
            defined_at,
        });

        Ok(())
    }

    /// Look up a label by name
    pub fn lookup(&self, name: &str) -> Option<&Label> {
        self.labels.iter().find(|l| l.name == name)
    }

    /// Address bound to `name`, if any.
    pub fn address_of(&self, name: &str) -> Option<u32> {
        self.lookup(name).map(|l| l.address)
    }

    /// All labels in definition order
    pub fn labels(&self) -> &[Label] {
        &self.labels
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn clear(&mut self) {
        self.labels.clear();
    }
}
