use std::collections::HashMap;

use crate::response::ResourceEntry;

/// Resource id to resource name, built per response
#[derive(Debug, Clone, Default)]
pub struct ResourceIndex {
    names: HashMap<String, String>,
}

impl ResourceIndex {
    /// Index every entry under its effective resource's id
    pub fn build(resources: &[ResourceEntry]) -> Self {
        let names = resources
            .iter()
            .filter_map(ResourceEntry::effective)
            .map(|resource| (resource.id.to_string(), resource.name.clone()))
            .collect();
        Self { names }
    }

    pub fn get(&self, id: &str) -> Option<&str> {
        self.names.get(id).map(String::as_str)
    }

    /// Name for `id`, or the id itself when it is not indexed
    pub fn resolve<'a>(&'a self, id: &'a str) -> &'a str {
        self.get(id).unwrap_or(id)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}
