// SPDX-License-Identifier: AGPL-3.0-or-later

//! Policy evaluation engine.
//!
//! Evaluates an ODRL policy against a request-scoped context. Constraint
//! functions are registered per [`ConstraintKind`]; whether a kind applies in
//! the context's scope is a table lookup in [`RuleBindings`]. Constraints not
//! bound in the current scope are inapplicable and ignored. A failed
//! evaluation is an expected outcome, not an error: it carries the problems
//! the functions reported.

use std::collections::HashMap;
use std::sync::Arc;

use super::bindings::{ConstraintKind, RuleBindings, Scope};
use super::context::PolicyContext;
use super::model::{AtomicConstraint, Constraint, Policy};

/// Outcome of a failed policy evaluation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PolicyFailure {
    pub problems: Vec<String>,
}

impl std::fmt::Display for PolicyFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "policy evaluation failed: {}", self.problems.join("; "))
    }
}

/// Evaluates one atomic constraint against the context.
pub trait ConstraintFunction: Send + Sync {
    fn evaluate(&self, constraint: &AtomicConstraint, context: &mut PolicyContext) -> bool;
}

/// Runs after constraint evaluation succeeded; can still fail the policy.
pub trait PostValidator: Send + Sync {
    fn validate(&self, policy: &Policy, context: &PolicyContext) -> Result<(), String>;
}

/// The engine: scope bindings plus the function and validator registries.
///
/// Configured once before the service accepts traffic; evaluation only reads.
pub struct PolicyEngine {
    bindings: RuleBindings,
    functions: HashMap<ConstraintKind, Arc<dyn ConstraintFunction>>,
    post_validators: HashMap<Scope, Vec<Arc<dyn PostValidator>>>,
}

impl PolicyEngine {
    pub fn new(bindings: RuleBindings) -> Self {
        Self {
            bindings,
            functions: HashMap::new(),
            post_validators: HashMap::new(),
        }
    }

    pub fn register_function(
        &mut self,
        kind: ConstraintKind,
        function: Arc<dyn ConstraintFunction>,
    ) {
        self.functions.insert(kind, function);
    }

    pub fn register_post_validator(&mut self, scope: Scope, validator: Arc<dyn PostValidator>) {
        self.post_validators.entry(scope).or_default().push(validator);
    }

    /// Evaluate `policy` in the context's scope.
    ///
    /// Every permission whose action is bound in the scope must pass all of
    /// its constraints; afterwards the scope's post validators run. Problems
    /// reported during a failed evaluation are drained into the returned
    /// [`PolicyFailure`].
    pub fn evaluate(
        &self,
        policy: &Policy,
        context: &mut PolicyContext,
    ) -> Result<(), PolicyFailure> {
        let scope = context.scope();
        let mut passed = true;

        for permission in &policy.permissions {
            if !self
                .bindings
                .is_action_bound(&permission.action.action_type, scope)
            {
                tracing::debug!(
                    action = %permission.action.action_type,
                    scope = %scope,
                    "action not bound in scope, permission does not apply"
                );
                continue;
            }

            if permission.constraints.is_empty() {
                context.report_problem("no constraints found in permission");
                passed = false;
                continue;
            }

            for constraint in &permission.constraints {
                if !self.evaluate_constraint(constraint, context) {
                    passed = false;
                }
            }
        }

        if passed {
            for validator in self.post_validators.get(&scope).into_iter().flatten() {
                if let Err(problem) = validator.validate(policy, context) {
                    context.report_problem(problem);
                    passed = false;
                }
            }
        }

        if passed {
            context.take_problems();
            Ok(())
        } else {
            Err(PolicyFailure {
                problems: context.take_problems(),
            })
        }
    }

    fn evaluate_constraint(&self, constraint: &Constraint, context: &mut PolicyContext) -> bool {
        match constraint {
            Constraint::And(branches) => {
                if branches.is_empty() {
                    context.report_problem("empty 'and' constraint group");
                    return false;
                }
                for branch in branches {
                    if !self.evaluate_constraint(branch, context) {
                        tracing::debug!("'and' constraint branch failed, group fails");
                        return false;
                    }
                }
                true
            }
            Constraint::Or(branches) => {
                if branches.is_empty() {
                    context.report_problem("empty 'or' constraint group");
                    return false;
                }
                for branch in branches {
                    if self.evaluate_constraint(branch, context) {
                        tracing::debug!("'or' constraint branch succeeded, group passes");
                        return true;
                    }
                }
                context.report_problem("all 'or' constraint branches failed");
                false
            }
            Constraint::Atomic(atomic) => self.evaluate_atomic(atomic, context),
        }
    }

    fn evaluate_atomic(&self, atomic: &AtomicConstraint, context: &mut PolicyContext) -> bool {
        let scope = context.scope();
        if !self.bindings.is_constraint_bound(atomic.kind, scope) {
            // Out-of-scope constraints are filtered, not failed: the same
            // policy can carry negotiation-only terms next to discovery ones.
            tracing::debug!(
                left = %atomic.left_operand,
                scope = %scope,
                "constraint not bound in scope, ignoring"
            );
            return true;
        }

        let Some(function) = self.functions.get(&atomic.kind) else {
            context.report_problem(format!(
                "no constraint function registered for '{}'",
                atomic.left_operand
            ));
            return false;
        };

        let result = function.evaluate(atomic, context);
        tracing::debug!(
            left = %atomic.left_operand,
            operator = %atomic.operator,
            right = %atomic.right_operand,
            result,
            "atomic constraint evaluated"
        );
        result
    }
}
