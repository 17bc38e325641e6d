// SPDX-License-Identifier: AGPL-3.0-or-later

//! Constraint functions evaluating credential-backed constraints.

use serde_json::Value;

use super::context::{ParticipantAgent, PolicyContext};
use super::engine::{ConstraintFunction, PostValidator};
use super::model::{AtomicConstraint, Operator, Policy};
use crate::identity::{VerifiableCredential, VC_CLAIM};

/// Type suffix identifying a membership credential.
pub const MEMBERSHIP_CREDENTIAL_TYPE: &str = "MembershipCredential";

/// Right operand a membership constraint must carry.
pub const ACTIVE_MEMBERSHIP: &str = "active";

/// Extract the verifiable credential list from the agent's claims.
///
/// Fails with a human-readable problem when the claim is missing, is not a
/// credential list, or the list is empty.
pub fn credential_list(agent: &ParticipantAgent) -> Result<Vec<VerifiableCredential>, String> {
    let raw = agent
        .claims
        .get(VC_CLAIM)
        .ok_or_else(|| format!("no '{VC_CLAIM}' claim found on participant agent"))?;

    let credentials: Vec<VerifiableCredential> = serde_json::from_value(raw.clone())
        .map_err(|_| format!("'{VC_CLAIM}' claim is not a list of verifiable credentials"))?;

    if credentials.is_empty() {
        return Err("participant agent carries an empty credential list".to_string());
    }
    Ok(credentials)
}

/// Strip a namespace prefix from an expanded claim key.
///
/// JSON-LD expansion turns `domain` into `https://.../domain`; claims are
/// compared on the trailing segment.
fn sanitize_claim_key(key: &str) -> &str {
    key.rsplit_once('/').map(|(_, name)| name).unwrap_or(key)
}

/// Parse the right operand of an `in` comparison into a list of strings.
///
/// Accepts a JSON array literal (`["a", "b"]`) or a loose bracketed form
/// (`[a, b]`).
fn parse_string_list(raw: &str) -> Vec<String> {
    if let Ok(values) = serde_json::from_str::<Vec<String>>(raw) {
        return values;
    }
    raw.trim()
        .trim_start_matches('[')
        .trim_end_matches(']')
        .split(',')
        .map(|item| item.trim().trim_matches('"').trim_matches('\'').to_string())
        .filter(|item| !item.is_empty())
        .collect()
}

/// Requires the participant to hold an active membership credential.
///
/// `eq` asserts presence of a `MembershipCredential`, `neq` asserts absence.
pub struct MembershipConstraintFunction;

impl ConstraintFunction for MembershipConstraintFunction {
    fn evaluate(&self, constraint: &AtomicConstraint, context: &mut PolicyContext) -> bool {
        if !constraint
            .right_operand
            .eq_ignore_ascii_case(ACTIVE_MEMBERSHIP)
        {
            context.report_problem(format!(
                "membership constraint requires right operand '{ACTIVE_MEMBERSHIP}', got '{}'",
                constraint.right_operand
            ));
            return false;
        }

        let credentials = match credential_list(context.agent()) {
            Ok(credentials) => credentials,
            Err(problem) => {
                context.report_problem(problem);
                return false;
            }
        };

        let is_member = credentials
            .iter()
            .any(|vc| vc.has_type(MEMBERSHIP_CREDENTIAL_TYPE));

        match constraint.operator {
            Operator::Eq => {
                if !is_member {
                    context.report_problem("no membership credential present");
                }
                is_member
            }
            Operator::Neq => {
                if is_member {
                    context.report_problem("membership credential present but excluded");
                }
                !is_member
            }
            other => {
                context.report_problem(format!(
                    "operator '{other}' not supported for membership constraints"
                ));
                false
            }
        }
    }
}

/// Compares a claim from one of the participant's credentials against a
/// literal.
///
/// The left operand has the form `<prefix>.$.<CredentialType>.<dotted.path>`;
/// the path is walked through the first credential subject of the first
/// credential carrying the named type, with namespace prefixes stripped from
/// each claim key. Later credentials of the same type are never consulted.
pub struct CredentialClaimConstraintFunction {
    operand_prefix: String,
}

impl CredentialClaimConstraintFunction {
    pub fn new(operand_prefix: impl Into<String>) -> Self {
        Self {
            operand_prefix: operand_prefix.into(),
        }
    }

    /// Resolve the string value the claim path yields on the first credential
    /// of the matching type.
    fn resolve_value(
        &self,
        credentials: &[VerifiableCredential],
        credential_type: &str,
        path: &[&str],
    ) -> Result<String, String> {
        let credential = credentials
            .iter()
            .find(|vc| vc.has_type(credential_type))
            .ok_or_else(|| format!("no '{credential_type}' credential present"))?;
        let subject = credential.credential_subject.first().ok_or_else(|| {
            format!("'{credential_type}' credential has no credential subject")
        })?;

        let not_found = || {
            format!(
                "claim '{}' not found in '{credential_type}' credential",
                path.join(".")
            )
        };

        let mut current = Value::Object(subject.claims.clone());
        for segment in path {
            current = current
                .as_object()
                .and_then(|object| {
                    object
                        .iter()
                        .find(|(key, _)| sanitize_claim_key(key) == *segment)
                        .map(|(_, value)| value.clone())
                })
                .ok_or_else(not_found)?;
        }
        match current {
            Value::String(value) => Ok(value),
            _ => Err(not_found()),
        }
    }
}

impl ConstraintFunction for CredentialClaimConstraintFunction {
    fn evaluate(&self, constraint: &AtomicConstraint, context: &mut PolicyContext) -> bool {
        let marker = format!("{}.$.", self.operand_prefix);
        let Some(claim_path) = constraint
            .left_operand
            .strip_prefix(&marker)
            .filter(|path| !path.is_empty())
        else {
            context.report_problem(format!(
                "malformed claim constraint operand '{}'",
                constraint.left_operand
            ));
            return false;
        };

        let mut segments = claim_path.split('.');
        // split always yields at least one item, and the path is non-empty
        let credential_type = segments.next().unwrap_or_default();
        let path: Vec<&str> = segments.collect();
        if path.is_empty() {
            context.report_problem(format!(
                "claim constraint '{}' names no claim path",
                constraint.left_operand
            ));
            return false;
        }

        let credentials = match credential_list(context.agent()) {
            Ok(credentials) => credentials,
            Err(problem) => {
                context.report_problem(problem);
                return false;
            }
        };

        let value = match self.resolve_value(&credentials, credential_type, &path) {
            Ok(value) => value,
            Err(problem) => {
                context.report_problem(problem);
                return false;
            }
        };

        let right = &constraint.right_operand;
        let satisfied = match constraint.operator {
            Operator::Eq => &value == right,
            Operator::Neq => &value != right,
            Operator::In => parse_string_list(right).contains(&value),
            other => {
                context.report_problem(format!(
                    "operator '{other}' not supported for claim constraints"
                ));
                return false;
            }
        };

        if !satisfied {
            context.report_problem(format!(
                "claim '{}' does not satisfy {} '{right}'",
                path.join("."),
                constraint.operator
            ));
        }
        satisfied
    }
}

/// Fails any policy that declares no permissions at all.
///
/// A dataset offer without permissions grants nothing; treating it as
/// satisfied would make the dataset visible to everyone.
pub struct DeclaredPermissionsValidator;

impl PostValidator for DeclaredPermissionsValidator {
    fn validate(&self, policy: &Policy, _context: &PolicyContext) -> Result<(), String> {
        if policy.permissions.is_empty() {
            Err("policy declares no permissions".to_string())
        } else {
            Ok(())
        }
    }
}
