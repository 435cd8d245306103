//! Component base contract and the debug-name registry.
//!
//! Grounded on `strata-transport`'s trait-object dispatch style and on the
//! original implementation's `Component`/`gSim->debug` machinery — rather than
//! a process-global registry, the [`ComponentRegistry`] here is owned by
//! [`crate::network::Network`] and threaded explicitly wherever a component
//! needs to check whether its own dotted name is debug-enabled.

use std::collections::HashMap;

/// Anything that can receive a scheduled event from the kernel.
pub trait Component {
    /// Dotted hierarchical name, e.g. `"router[0][1].inputqueue[2][0]"`.
    fn full_name(&self) -> &str;

    /// Dispatch a previously scheduled event. `event_type` is a
    /// component-private tag distinguishing the reason for the callback.
    fn process_event(&mut self, event_type: i32);
}

/// Tracks which dotted component names have debug logging enabled.
#[derive(Debug, Default, Clone)]
pub struct ComponentRegistry {
    enabled: HashMap<String, bool>,
}

impl ComponentRegistry {
    pub fn new(debug_names: &[String]) -> Self {
        let mut enabled = HashMap::new();
        for name in debug_names {
            enabled.insert(name.clone(), true);
        }
        ComponentRegistry { enabled }
    }

    pub fn is_debug(&self, full_name: &str) -> bool {
        self.enabled.get(full_name).copied().unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_names_are_not_debug() {
        let reg = ComponentRegistry::new(&["router[0].inputqueue[0]".to_string()]);
        assert!(reg.is_debug("router[0].inputqueue[0]"));
        assert!(!reg.is_debug("router[1].inputqueue[0]"));
    }
}
