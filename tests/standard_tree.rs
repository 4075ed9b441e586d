use alloy_primitives::B256;
use evm_merkle::{MerkleError, StandardMerkleTree, StandardMerkleTreeData, TreeOptions};
use serde_json::{json, Value};

fn string_rows(items: &[&str]) -> Vec<Vec<Value>> {
    items.iter().map(|item| vec![json!(item)]).collect()
}

fn abc_tree() -> StandardMerkleTree {
    StandardMerkleTree::of(string_rows(&["a", "b", "c"]), &["string"]).unwrap()
}

fn airdrop_rows() -> Vec<Vec<Value>> {
    vec![
        vec![json!("0x1111111111111111111111111111111111111111"), json!(100u64)],
        vec![json!("0x2222222222222222222222222222222222222222"), json!(200u64)],
        vec![json!("0x3333333333333333333333333333333333333333"), json!(300u64)],
        vec![json!("0x4444444444444444444444444444444444444444"), json!(400u64)],
        vec![json!("0x5555555555555555555555555555555555555555"), json!(500u64)],
    ]
}

fn airdrop_tree() -> StandardMerkleTree {
    StandardMerkleTree::of(airdrop_rows(), &["address", "uint256"]).unwrap()
}

#[test]
fn three_string_leaves_hash_to_the_known_root() {
    let tree = abc_tree();
    assert_eq!(
        tree.root().to_string(),
        "0xf2129b5a697531ef818f644564a6552b35c549722385bc52aa7fe46c0b5f46b1"
    );
    let nodes: Vec<String> = tree.tree().iter().map(|node| node.to_string()).collect();
    assert!(nodes[0].starts_with("0xf2129b"));
    assert!(nodes[1].starts_with("0xfa914d"));
    assert!(nodes[2].starts_with("0x9cf5a6"));
    assert!(nodes[3].starts_with("0x9c15a6"));
}

#[test]
fn every_leaf_proves_and_verifies() {
    let values = airdrop_rows();
    let tree = airdrop_tree();
    for (index, value) in values.iter().enumerate() {
        let by_index = tree.get_proof_by_index(index).unwrap();
        let by_value = tree.get_proof_by_value(value).unwrap();
        assert_eq!(by_index, by_value);
        assert!(tree.verify_proof_at(index, &by_index).unwrap());
        assert!(tree.verify_proof(value, &by_index));
        assert!(StandardMerkleTree::verify(
            tree.root(),
            &["address", "uint256"],
            value,
            &by_index,
        ));
    }
}

#[test]
fn multi_proofs_round_trip_for_index_subsets() {
    let tree = airdrop_tree();
    let subsets: &[&[usize]] = &[&[], &[0], &[1, 3], &[0, 2, 4], &[0, 1, 2, 3, 4]];
    for subset in subsets {
        let multiproof = tree.get_multi_proof_by_indices(subset).unwrap();
        assert!(tree.verify_multi_proof(&multiproof).unwrap());
        assert!(StandardMerkleTree::multi_proof_verify(
            tree.root(),
            &["address", "uint256"],
            &multiproof,
        )
        .unwrap());
    }
}

#[test]
fn multi_proof_by_values_resolves_through_the_lookup() {
    let values = airdrop_rows();
    let tree = airdrop_tree();
    let multiproof = tree
        .get_multi_proof_by_values(&[values[4].clone(), values[1].clone()])
        .unwrap();
    assert_eq!(multiproof.leaves.len(), 2);
    assert!(tree.verify_multi_proof(&multiproof).unwrap());
}

#[test]
fn duplicated_indices_are_rejected() {
    let tree = airdrop_tree();
    let err = tree.get_multi_proof_by_indices(&[2, 2]).unwrap_err();
    assert_eq!(
        err,
        MerkleError::InvalidArgument("Cannot prove duplicated index".to_owned())
    );
}

#[test]
fn unknown_leaves_and_indices_are_rejected() {
    let tree = airdrop_tree();
    let stranger = vec![json!("0x9999999999999999999999999999999999999999"), json!(1u64)];
    assert_eq!(
        tree.get_proof_by_value(&stranger).unwrap_err(),
        MerkleError::InvalidArgument("Leaf is not in tree".to_owned())
    );
    assert!(matches!(
        tree.get_proof_by_index(17).unwrap_err(),
        MerkleError::InvalidArgument(_)
    ));
}

#[test]
fn proofs_do_not_transfer_between_trees() {
    let tree = airdrop_tree();
    let other = StandardMerkleTree::of(string_rows(&["x", "y", "z"]), &["string"]).unwrap();
    let proof = other.get_proof_by_index(0).unwrap();
    let value = other.at(0).unwrap().clone();
    assert!(!StandardMerkleTree::verify(
        tree.root(),
        &["string"],
        &value,
        &proof,
    ));
}

#[test]
fn entries_preserve_input_order() {
    let values = airdrop_rows();
    let tree = airdrop_tree();
    assert_eq!(tree.len(), values.len());
    for (index, value) in tree.entries() {
        assert_eq!(value, &values[index]);
    }
    assert_eq!(tree.at(2), Some(&values[2]));
    assert_eq!(tree.at(17), None);
}

#[test]
fn dump_and_load_are_idempotent() {
    let tree = airdrop_tree();
    let dump = tree.dump();
    let loaded = StandardMerkleTree::load(dump.clone()).unwrap();
    assert_eq!(loaded.root(), tree.root());
    assert_eq!(loaded.dump(), dump);

    let raw = tree.dump_json().unwrap();
    let reloaded = StandardMerkleTree::load_json(&raw).unwrap();
    assert_eq!(reloaded.root(), tree.root());
    assert_eq!(reloaded.dump(), dump);
}

#[test]
fn dump_layout_matches_the_documented_shape() {
    let tree = abc_tree();
    let raw: Value = serde_json::from_str(&tree.dump_json().unwrap()).unwrap();
    assert_eq!(raw["format"], json!("standard-v1"));
    assert_eq!(raw["leafEncoding"], json!(["string"]));
    assert_eq!(raw["tree"].as_array().unwrap().len(), 5);
    for node in raw["tree"].as_array().unwrap() {
        let text = node.as_str().unwrap();
        assert!(text.starts_with("0x"));
        assert_eq!(text.len(), 66);
    }
    let first = &raw["values"][0];
    assert_eq!(first["value"], json!(["a"]));
    assert!(first["treeIndex"].is_u64());
}

#[test]
fn loading_a_simple_dump_is_rejected() {
    let data = StandardMerkleTreeData {
        format: "simple-v1".to_owned(),
        leaf_encoding: vec!["string".to_owned()],
        tree: vec![B256::ZERO],
        values: vec![],
    };
    assert_eq!(
        StandardMerkleTree::load(data).unwrap_err(),
        MerkleError::InvalidArgument("Unknown format 'simple-v1'".to_owned())
    );
}

#[test]
fn load_json_reports_missing_fields() {
    let err = StandardMerkleTree::load_json(r#"{"format":"standard-v1"}"#).unwrap_err();
    assert!(matches!(err, MerkleError::InvalidArgument(_)));
}

#[test]
fn tampered_dumps_fail_validation() {
    let tree = airdrop_tree();
    let mut dump = tree.dump();
    dump.tree[1] = B256::ZERO;
    let err = StandardMerkleTree::load(dump).unwrap_err();
    assert!(matches!(err, MerkleError::Invariant(_)));
}

#[test]
fn unsorted_construction_preserves_input_order() {
    let values = airdrop_rows();
    let sorted = airdrop_tree();
    let unsorted = StandardMerkleTree::of_with_options(
        values.clone(),
        &["address", "uint256"],
        TreeOptions { sort_leaves: false },
    )
    .unwrap();
    assert!(unsorted.validate().is_ok());
    for (index, value) in values.iter().enumerate() {
        let proof = unsorted.get_proof_by_index(index).unwrap();
        assert!(unsorted.verify_proof(value, &proof));
        // Input leaf k lands at flat index size - 1 - k.
        let size = unsorted.tree().len();
        assert_eq!(
            unsorted.tree()[size - 1 - index],
            unsorted.leaf_hash(value).unwrap(),
        );
    }
    // The default placement is ascending by digest along the leaf tail.
    let size = sorted.tree().len();
    let tail: Vec<_> = (0..values.len())
        .map(|position| sorted.tree()[size - 1 - position])
        .collect();
    assert!(tail.windows(2).all(|pair| pair[0] <= pair[1]));
}

#[test]
fn bytes_leaf_encodings_accept_prefixed_hex() {
    let values = vec![
        vec![
            json!("0x1111111111111111111111111111111111111111111111111111111111111111"),
            json!("0xdead"),
        ],
        vec![
            json!("0x2222222222222222222222222222222222222222222222222222222222222222"),
            json!("0xbeef"),
        ],
        vec![
            json!("0x3333333333333333333333333333333333333333333333333333333333333333"),
            json!("0x"),
        ],
    ];
    let tree = StandardMerkleTree::of(values.clone(), &["bytes32", "bytes"]).unwrap();
    for (index, value) in values.iter().enumerate() {
        let proof = tree.get_proof_by_index(index).unwrap();
        assert!(tree.verify_proof(value, &proof));
        assert!(StandardMerkleTree::verify(
            tree.root(),
            &["bytes32", "bytes"],
            value,
            &proof,
        ));
    }
    // Unprefixed hex stays accepted and hashes identically.
    let prefixed = tree.leaf_hash(&values[0]).unwrap();
    let bare = tree
        .leaf_hash(&[
            json!("1111111111111111111111111111111111111111111111111111111111111111"),
            json!("dead"),
        ])
        .unwrap();
    assert_eq!(prefixed, bare);
}

#[test]
fn duplicated_rows_are_allowed() {
    let rows = string_rows(&["a", "a", "b"]);
    let tree = StandardMerkleTree::of(rows.clone(), &["string"]).unwrap();
    for index in 0..rows.len() {
        let proof = tree.get_proof_by_index(index).unwrap();
        assert!(tree.verify_proof(&rows[index], &proof));
    }
}

#[test]
fn empty_value_sets_are_rejected() {
    let err = StandardMerkleTree::of(vec![], &["string"]).unwrap_err();
    assert_eq!(
        err,
        MerkleError::InvalidArgument("Expected non-zero number of leaves".to_owned())
    );
}

#[test]
fn render_starts_at_the_root() {
    let tree = abc_tree();
    let rendered = tree.render().unwrap();
    assert_eq!(rendered.lines().count(), 5);
    assert!(rendered.starts_with(&format!("0) {}", tree.root())));
}
