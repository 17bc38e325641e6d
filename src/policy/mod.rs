// SPDX-License-Identifier: AGPL-3.0-or-later

//! # Policy Module
//!
//! ODRL policy model and the evaluation engine that decides dataset
//! visibility.
//!
//! The engine's registries (constraint functions, scope bindings, post
//! validators) are configured once at startup and shared read-only across
//! requests. Everything request-scoped lives in the
//! [`context::PolicyContext`] built fresh per filter request.

pub mod bindings;
pub mod context;
pub mod engine;
pub mod functions;
pub mod model;

pub use bindings::{ConstraintKind, PolicyNamespace, RuleBindings, Scope};
pub use context::{discovery_context, ParticipantAgent, PolicyContext};
pub use engine::{ConstraintFunction, PolicyEngine, PolicyFailure, PostValidator};
pub use functions::{
    credential_list, CredentialClaimConstraintFunction, DeclaredPermissionsValidator,
    MembershipConstraintFunction,
};
pub use model::{Action, AtomicConstraint, Constraint, Operator, Permission, Policy};
