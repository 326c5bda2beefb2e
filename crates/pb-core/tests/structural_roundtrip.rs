//! Integration tests: group → ungroup round trips (pb-core).
//!
//! Grouping any non-trivial subset of siblings and ungrouping the created
//! container must give back the original list.

use pb_core::id::NodeId;
use pb_core::model::Component;
use pb_core::{group_in_tree, group_into_container, load_tree, ungroup_container};
use pretty_assertions::assert_eq;

fn siblings(n: usize) -> Vec<Component> {
    (0..n)
        .map(|i| Component::new(format!("leaf_{n}_{i}").as_str(), "Text").with_prop("i", i))
        .collect()
}

/// Every subset of indices with at least two members.
fn subsets(n: usize) -> Vec<Vec<usize>> {
    (0u32..(1 << n))
        .filter(|mask| mask.count_ones() >= 2)
        .map(|mask| (0..n).filter(|i| mask & (1 << i) != 0).collect())
        .collect()
}

/// The container is the only id in `grouped` that is not in `original`.
fn created_container(original: &[Component], grouped: &[Component]) -> NodeId {
    grouped
        .iter()
        .find(|c| !original.iter().any(|o| o.id == c.id))
        .map(|c| c.id)
        .expect("no container created")
}

#[test]
fn group_then_ungroup_restores_every_subset() {
    for n in 2..=5 {
        let list = siblings(n);
        for subset in subsets(n) {
            let selected: Vec<NodeId> = subset.iter().rev().map(|&i| list[i].id).collect();
            for kind in ["Section", "MultiColumn", "Container"] {
                let grouped = group_into_container(&list, &selected, kind);
                assert_eq!(grouped.len(), n - subset.len() + 1);
                let container = created_container(&list, &grouped);
                let restored = ungroup_container(&grouped, container);
                assert_eq!(restored, list, "n={n} subset={subset:?} kind={kind}");
            }
        }
    }
}

#[test]
fn round_trip_inside_nested_container() {
    let tree = load_tree(include_str!("fixtures/landing_page.json")).unwrap();
    let selected = [NodeId::intern("feat_food"), NodeId::intern("feat_rooms")];
    let grouped = group_in_tree(&tree, &selected, "Container", NodeId::intern("feat_pair"), 2).unwrap();

    let features = pb_core::find_by_id(&grouped, NodeId::intern("features")).unwrap();
    let kids: Vec<&str> = features.children().iter().map(|c| c.id.as_str()).collect();
    assert_eq!(kids, vec!["feat_pair", "feat_tours"]);

    let restored = ungroup_container(&grouped, NodeId::intern("feat_pair"));
    assert_eq!(restored, tree);
}

#[test]
fn multicolumn_gets_column_per_child() {
    let list = siblings(4);
    let selected: Vec<NodeId> = list.iter().map(|c| c.id).collect();
    let grouped = group_into_container(&list, &selected, "MultiColumn");
    assert_eq!(grouped.len(), 1);
    assert_eq!(grouped[0].columns(), Some(4));
}
