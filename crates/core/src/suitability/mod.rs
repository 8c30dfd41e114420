//! Deterministic usage checks over scraped product attributes.
//!
//! Attribute records are normalized into a [`CanonicalSpecMap`], then the
//! use case's ordered rule cascade runs until one rule produces a decision.
//! Evaluation never fails: missing data yields an inconclusive verdict.

mod cascade;
pub mod evidence;
pub mod normalize;
mod rules;

use tracing::debug;

use crate::domain::product::ProductDetail;
use crate::domain::usage::{UsageVerdict, UseCase};

pub use evidence::{contains_any, extract_number};
pub use normalize::{normalize, CanonicalSpecMap};

use self::cascade::Facts;

pub fn evaluate(detail: &ProductDetail, use_case: UseCase) -> UsageVerdict {
    let specs = normalize(&detail.attributes);
    let mut facts = Facts::new(&specs);
    let (rule, decision) = rules::cascade_for(use_case).run(&mut facts);

    debug!(
        event_name = "suitability.evaluated",
        product_id = %detail.id(),
        use_case = use_case.as_str(),
        rule,
        ok = ?decision.ok,
        confidence = decision.confidence,
        "usage verdict computed"
    );

    UsageVerdict {
        product_id: detail.id().clone(),
        use_case,
        ok: decision.ok,
        confidence: decision.confidence,
        reason: decision.reason,
        evidence: facts.into_evidence(),
    }
}
