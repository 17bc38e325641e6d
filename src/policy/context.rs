// SPDX-License-Identifier: AGPL-3.0-or-later

//! Request-scoped policy evaluation context.

use std::collections::HashMap;

use serde_json::Value;

use super::bindings::Scope;
use crate::identity::{ClaimToken, VC_CLAIM};

/// The identity on whose behalf a policy is evaluated.
///
/// Constructed fresh for every filter request and discarded with it; never
/// persisted, never shared across requests.
#[derive(Debug, Clone, Default)]
pub struct ParticipantAgent {
    pub claims: HashMap<String, Value>,
    pub attributes: HashMap<String, String>,
}

impl ParticipantAgent {
    pub fn new(claims: HashMap<String, Value>, attributes: HashMap<String, String>) -> Self {
        Self { claims, attributes }
    }
}

/// Ephemeral evaluation context: the agent, the scope selecting which
/// constraint functions apply, and the problems reported along the way.
#[derive(Debug)]
pub struct PolicyContext {
    agent: ParticipantAgent,
    scope: Scope,
    problems: Vec<String>,
}

impl PolicyContext {
    pub fn new(agent: ParticipantAgent, scope: Scope) -> Self {
        Self {
            agent,
            scope,
            problems: Vec::new(),
        }
    }

    pub fn catalog_discovery(agent: ParticipantAgent) -> Self {
        Self::new(agent, Scope::CatalogDiscovery)
    }

    pub fn agent(&self) -> &ParticipantAgent {
        &self.agent
    }

    pub fn scope(&self) -> Scope {
        self.scope
    }

    pub fn report_problem(&mut self, problem: impl Into<String>) {
        self.problems.push(problem.into());
    }

    pub fn problems(&self) -> &[String] {
        &self.problems
    }

    pub fn take_problems(&mut self) -> Vec<String> {
        std::mem::take(&mut self.problems)
    }
}

/// Map credential claims into a discovery-scoped evaluation context.
///
/// Only the verifiable-credential claim is carried over, unchanged; the
/// agent's attribute map stays empty in this flow. A pure transform: equal
/// claims always yield an equivalent context.
pub fn discovery_context(claims: &ClaimToken) -> PolicyContext {
    let mut agent_claims = HashMap::new();
    if let Some(vc) = claims.claim(VC_CLAIM) {
        agent_claims.insert(VC_CLAIM.to_string(), vc.clone());
    }
    PolicyContext::catalog_discovery(ParticipantAgent::new(agent_claims, HashMap::new()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn discovery_context_carries_only_the_vc_claim() {
        let token = ClaimToken::new()
            .with_claim(VC_CLAIM, json!([{ "type": "MembershipCredential" }]))
            .with_claim("sub", json!("did:web:participant"));

        let context = discovery_context(&token);

        assert_eq!(context.scope(), Scope::CatalogDiscovery);
        assert_eq!(
            context.agent().claims.get(VC_CLAIM),
            Some(&json!([{ "type": "MembershipCredential" }]))
        );
        assert!(!context.agent().claims.contains_key("sub"));
        assert!(context.agent().attributes.is_empty());
    }

    #[test]
    fn discovery_context_without_vc_claim_is_empty() {
        let context = discovery_context(&ClaimToken::new());
        assert!(context.agent().claims.is_empty());
    }

    #[test]
    fn problems_accumulate_and_drain() {
        let mut context = PolicyContext::catalog_discovery(ParticipantAgent::default());
        context.report_problem("first");
        context.report_problem("second");

        assert_eq!(context.problems().len(), 2);
        assert_eq!(context.take_problems(), vec!["first", "second"]);
        assert!(context.problems().is_empty());
    }
}
