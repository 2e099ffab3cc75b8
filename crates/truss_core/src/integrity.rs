//! Reference integrity report.
//!
//! Normalization does not check that elements, supports and loads point at existing nodes.
//! This pass reports dangling references and duplicate node ids without touching the model.

use std::collections::{BTreeSet, HashSet};

use serde::Serialize;

use crate::model::TrussModel;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DanglingReference {
    ElementFrom { element: i64, node: i64 },
    ElementTo { element: i64, node: i64 },
    Support { node: i64 },
    Load { node: i64 },
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct IntegrityReport {
    pub dangling: Vec<DanglingReference>,
    pub duplicate_node_ids: Vec<i64>,
}

impl IntegrityReport {
    pub fn is_clean(&self) -> bool {
        self.dangling.is_empty() && self.duplicate_node_ids.is_empty()
    }
}

pub fn check_references(model: &TrussModel) -> IntegrityReport {
    let mut known = HashSet::with_capacity(model.nodes.len());
    let mut duplicates = BTreeSet::new();
    for node in &model.nodes {
        if !known.insert(node.id) {
            duplicates.insert(node.id);
        }
    }

    let mut dangling = Vec::new();
    for element in &model.elements {
        if !known.contains(&element.from) {
            dangling.push(DanglingReference::ElementFrom {
                element: element.id,
                node: element.from,
            });
        }
        if !known.contains(&element.to) {
            dangling.push(DanglingReference::ElementTo {
                element: element.id,
                node: element.to,
            });
        }
    }
    dangling.extend(
        model
            .supports
            .iter()
            .filter(|s| !known.contains(&s.node))
            .map(|s| DanglingReference::Support { node: s.node }),
    );
    dangling.extend(
        model
            .loads
            .iter()
            .filter(|l| !known.contains(&l.node))
            .map(|l| DanglingReference::Load { node: l.node }),
    );

    IntegrityReport {
        dangling,
        duplicate_node_ids: duplicates.into_iter().collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::normalize;
    use serde_json::json;

    #[test]
    fn consistent_model_is_clean() {
        let model = normalize(&json!({
            "nodes": [{"id": 1}, {"id": 2, "x": 3}],
            "elements": [{"id": 1, "from": 1, "to": 2}],
            "supports": [{"node": 1, "type": "pin"}],
            "loads": [{"node": 2, "fy": -10}]
        }));
        assert!(check_references(&model).is_clean());
    }

    #[test]
    fn reports_without_rejecting() {
        let model = normalize(&json!({
            "nodes": [{"id": 1}, {"id": 1}],
            "elements": [{"id": 7, "from": 1, "to": 9}],
            "supports": [{"node": 4}],
            "loads": [{"node": 5}]
        }));
        let report = check_references(&model);

        assert_eq!(model.elements.len(), 1);
        assert_eq!(report.duplicate_node_ids, vec![1]);
        assert_eq!(
            report.dangling,
            vec![
                DanglingReference::ElementTo { element: 7, node: 9 },
                DanglingReference::Support { node: 4 },
                DanglingReference::Load { node: 5 },
            ]
        );
    }
}
