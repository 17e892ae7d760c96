// Component bucket classifier

use crate::analysis::rules::{Component, BUCKET_RULES};
use crate::analysis::AnalysisResult;
use std::collections::BTreeMap;

/// Derive component buckets from the accumulated vocabulary.
///
/// Classes are bucketed by name and ids as `#id`. Every bucket rule is
/// evaluated for every name, so one class may land in several buckets.
/// Typography comes from the ranked typography list.
pub fn classify(result: &AnalysisResult) -> BTreeMap<Component, Vec<String>> {
    let mut buckets: BTreeMap<Component, Vec<String>> = BTreeMap::new();

    for rule in BUCKET_RULES {
        buckets.entry(rule.component).or_default();
    }

    let names = result
        .classes
        .iter()
        .map(|class| (class.to_ascii_lowercase(), class.clone()))
        .chain(
            result
                .ids
                .iter()
                .map(|id| (id.to_ascii_lowercase(), format!("#{}", id))),
        );

    for (lower, selector) in names {
        for rule in BUCKET_RULES.iter().filter(|rule| rule.matches(&lower)) {
            buckets
                .entry(rule.component)
                .or_default()
                .push(selector.clone());
        }
    }

    buckets.insert(
        Component::Typography,
        result.typography.iter().map(|t| t.selector.clone()).collect(),
    );

    buckets
}
