//! Right-of-way negotiation between agents sharing the grid.
//!
//! When a step is blocked by another agent, the policy is asked whether that
//! occupant will make room.  Rules are keyed by the **occupant's** role; a
//! role without a rule falls back to [`CrossingPolicy::default_rule`].

use std::collections::HashMap;

use sw_agent::Agent;
use sw_core::Role;

/// Marker a `Doctor` carries while it is treating someone.
pub const TREATING_MARKER: &str = "treating";

#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub enum CrossingDecision {
    /// The occupant yields; the requester keeps its path and retries.
    Allow,
    /// The occupant holds its cell; the requester routes around it.
    Deny,
}

/// `(occupant, requester) → decision`.
pub type CrossingRule = Box<dyn Fn(&Agent, &Agent) -> CrossingDecision + Send + Sync>;

#[derive(Default)]
pub struct CrossingPolicy {
    rules: HashMap<Role, CrossingRule>,
}

impl CrossingPolicy {
    /// A policy using only the default rule.
    pub fn new() -> Self {
        Self::default()
    }

    /// The default rule plus the built-in role overrides.
    ///
    /// | Occupant  | Decision                                      |
    /// |-----------|-----------------------------------------------|
    /// | Processor | always deny                                   |
    /// | Doctor    | deny while carrying the `treating` marker     |
    /// | Signer    | always allow                                  |
    /// | Claimer   | always allow                                  |
    pub fn standard() -> Self {
        Self::new()
            .with_rule(Role::Processor, |_, _| CrossingDecision::Deny)
            .with_rule(Role::Doctor, |occupant, _| {
                if occupant.custom.has_marker(TREATING_MARKER) {
                    CrossingDecision::Deny
                } else {
                    CrossingDecision::Allow
                }
            })
            .with_rule(Role::Signer, |_, _| CrossingDecision::Allow)
            .with_rule(Role::Claimer, |_, _| CrossingDecision::Allow)
    }

    /// Replace the rule for occupants of `role`.
    pub fn set_rule<F>(&mut self, role: Role, rule: F)
    where
        F: Fn(&Agent, &Agent) -> CrossingDecision + Send + Sync + 'static,
    {
        self.rules.insert(role, Box::new(rule));
    }

    pub fn with_rule<F>(mut self, role: Role, rule: F) -> Self
    where
        F: Fn(&Agent, &Agent) -> CrossingDecision + Send + Sync + 'static,
    {
        self.set_rule(role, rule);
        self
    }

    /// Drop the override for `role`, restoring the default rule.
    pub fn remove_rule(&mut self, role: Role) -> bool {
        self.rules.remove(&role).is_some()
    }

    pub fn has_rule(&self, role: Role) -> bool {
        self.rules.contains_key(&role)
    }

    pub fn decide(&self, occupant: &Agent, requester: &Agent) -> CrossingDecision {
        match self.rules.get(&occupant.role) {
            Some(rule) => rule(occupant, requester),
            None => Self::default_rule(occupant, requester),
        }
    }

    /// Deny when the occupant is working in place and the requester has the
    /// same role; allow otherwise.
    pub fn default_rule(occupant: &Agent, requester: &Agent) -> CrossingDecision {
        if occupant.working && occupant.standing && occupant.role == requester.role {
            CrossingDecision::Deny
        } else {
            CrossingDecision::Allow
        }
    }
}
