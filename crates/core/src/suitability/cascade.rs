use std::collections::BTreeMap;

use crate::suitability::evidence::{contains_any, extract_number};
use crate::suitability::normalize::CanonicalSpecMap;

/// A product attribute as it is looked up: the evidence label it is reported
/// under, and the canonical keys tried in order.
pub(crate) struct Attr {
    pub label: &'static str,
    pub keys: &'static [&'static str],
}

/// Read access to the canonical map that remembers every attribute a rule
/// looked at, so inconclusive verdicts still show what was available.
pub(crate) struct Facts<'a> {
    specs: &'a CanonicalSpecMap,
    evidence: BTreeMap<String, String>,
}

impl<'a> Facts<'a> {
    pub fn new(specs: &'a CanonicalSpecMap) -> Self {
        Self { specs, evidence: BTreeMap::new() }
    }

    pub fn text(&mut self, attr: &Attr) -> Option<&'a str> {
        let specs = self.specs;
        let value =
            attr.keys.iter().filter_map(|key| specs.get(key)).find(|value| !value.is_empty())?;
        self.evidence.insert(attr.label.to_string(), value.to_string());
        Some(value)
    }

    pub fn number(&mut self, attr: &Attr) -> Option<f64> {
        self.text(attr).and_then(extract_number)
    }

    pub fn mentions(&mut self, attr: &Attr, keywords: &[&str]) -> bool {
        self.text(attr).is_some_and(|value| contains_any(value, keywords))
    }

    pub fn has(&mut self, attr: &Attr) -> bool {
        self.text(attr).is_some()
    }

    pub fn into_evidence(self) -> BTreeMap<String, String> {
        self.evidence
    }
}

#[derive(Clone, Debug, PartialEq)]
pub(crate) struct Decision {
    pub ok: Option<bool>,
    pub confidence: f64,
    pub reason: String,
}

impl Decision {
    pub fn suitable(confidence: f64, reason: impl Into<String>) -> Self {
        Self { ok: Some(true), confidence, reason: reason.into() }
    }

    pub fn unsuitable(confidence: f64, reason: impl Into<String>) -> Self {
        Self { ok: Some(false), confidence, reason: reason.into() }
    }

    pub fn inconclusive(confidence: f64, reason: impl Into<String>) -> Self {
        Self { ok: None, confidence, reason: reason.into() }
    }
}

type RuleFn = dyn Fn(&mut Facts<'_>) -> Option<Decision> + Send + Sync;
type FallbackFn = dyn Fn(&mut Facts<'_>) -> Decision + Send + Sync;

pub(crate) struct Rule {
    pub name: &'static str,
    apply: Box<RuleFn>,
}

impl Rule {
    pub fn new<F>(name: &'static str, apply: F) -> Self
    where
        F: Fn(&mut Facts<'_>) -> Option<Decision> + Send + Sync + 'static,
    {
        Self { name, apply: Box::new(apply) }
    }
}

/// Ordered rule list for one use case. The first rule that returns a
/// decision wins; the fallback runs only when none does.
pub(crate) struct Cascade {
    rules: Vec<Rule>,
    fallback: Box<FallbackFn>,
}

impl Cascade {
    pub fn new<F>(rules: Vec<Rule>, fallback: F) -> Self
    where
        F: Fn(&mut Facts<'_>) -> Decision + Send + Sync + 'static,
    {
        Self { rules, fallback: Box::new(fallback) }
    }

    pub fn run(&self, facts: &mut Facts<'_>) -> (&'static str, Decision) {
        for rule in &self.rules {
            if let Some(decision) = (rule.apply)(facts) {
                return (rule.name, decision);
            }
        }
        ("fallback", (self.fallback)(facts))
    }

    #[cfg(test)]
    pub fn rule_names(&self) -> Vec<&'static str> {
        self.rules.iter().map(|rule| rule.name).collect()
    }
}
