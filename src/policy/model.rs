// SPDX-License-Identifier: AGPL-3.0-or-later

//! ODRL policy model.
//!
//! Immutable value types built by the catalog transformer; required fields
//! are checked at construction, so an instance that exists is well-formed.

use serde::Serialize;

use super::bindings::ConstraintKind;
use crate::jsonld::ODRL_NS;

/// Full IRI of the ODRL `use` action.
pub const ODRL_USE_ACTION: &str = "http://www.w3.org/ns/odrl/2/use";

/// Constraint comparison operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Operator {
    Eq,
    Neq,
    Gt,
    Geq,
    Lt,
    Leq,
    In,
    HasPart,
    IsA,
    IsAllOf,
    IsAnyOf,
    IsNoneOf,
}

impl Operator {
    /// Parse an operator from its IRI or CURIE form (`odrl:eq`,
    /// `http://www.w3.org/ns/odrl/2/gteq`, plain `lt`, ...). Unknown
    /// operators default to `Eq` with a warning.
    pub fn parse(raw: &str) -> Self {
        let name = raw
            .rsplit_once('/')
            .map(|(_, name)| name)
            .or_else(|| raw.rsplit_once(':').map(|(_, name)| name))
            .unwrap_or(raw);

        match name.to_ascii_lowercase().as_str() {
            "eq" => Operator::Eq,
            "neq" => Operator::Neq,
            "gt" => Operator::Gt,
            "gteq" => Operator::Geq,
            "lt" => Operator::Lt,
            "lteq" => Operator::Leq,
            "ispartof" => Operator::In,
            "haspart" => Operator::HasPart,
            "isa" => Operator::IsA,
            "isallof" => Operator::IsAllOf,
            "isanyof" => Operator::IsAnyOf,
            "isnoneof" => Operator::IsNoneOf,
            _ => {
                tracing::warn!("unknown operator '{raw}', defaulting to eq");
                Operator::Eq
            }
        }
    }
}

impl std::fmt::Display for Operator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Operator::Eq => "eq",
            Operator::Neq => "neq",
            Operator::Gt => "gt",
            Operator::Geq => "gteq",
            Operator::Lt => "lt",
            Operator::Leq => "lteq",
            Operator::In => "isPartOf",
            Operator::HasPart => "hasPart",
            Operator::IsA => "isA",
            Operator::IsAllOf => "isAllOf",
            Operator::IsAnyOf => "isAnyOf",
            Operator::IsNoneOf => "isNoneOf",
        };
        f.write_str(name)
    }
}

/// The action a permission grants, as a full IRI.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Action {
    pub action_type: String,
}

impl Action {
    pub fn new(action_type: impl Into<String>) -> Self {
        Self {
            action_type: action_type.into(),
        }
    }

    /// The ODRL `use` action.
    pub fn use_action() -> Self {
        Self::new(ODRL_USE_ACTION)
    }

    /// Whether this is the ODRL `use` action (any namespace spelling).
    pub fn is_use(&self) -> bool {
        self.action_type == ODRL_USE_ACTION || self.action_type == format!("{ODRL_NS}use")
    }
}

/// A single comparison between a credential-derived value and a literal.
///
/// The [`ConstraintKind`] is classified once at transform time so evaluation
/// only does table lookups, never string matching.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AtomicConstraint {
    pub kind: ConstraintKind,
    pub left_operand: String,
    pub operator: Operator,
    pub right_operand: String,
}

/// A constraint tree: atomic leaves combined by logical `and` / `or` groups.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Constraint {
    Atomic(AtomicConstraint),
    And(Vec<Constraint>),
    Or(Vec<Constraint>),
}

/// A permission: an action plus the constraints gating it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Permission {
    pub action: Action,
    pub constraints: Vec<Constraint>,
}

/// An ODRL policy as attached to a dataset offer.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Policy {
    pub permissions: Vec<Permission>,
}

impl Policy {
    pub fn new(permissions: Vec<Permission>) -> Self {
        Self { permissions }
    }
}
