use alloy_primitives::B256;

use crate::error::{MerkleError, MerkleResult};

use super::tree::{left_child_index, right_child_index};

/// Renders the flat tree as an ASCII diagram, one line per node.
///
/// Each line reads `<indent><branch>N) 0x…` where `N` is the flat-array
/// index. Traversal is pre-order, left child first, so the output is stable
/// and golden-testable. The root line carries no branch glyph.
pub fn render_merkle_tree(tree: &[B256]) -> MerkleResult<String> {
    if tree.is_empty() {
        return Err(MerkleError::invalid_argument("Expected non-empty tree"));
    }

    // Each pending entry carries the path of "has a following sibling" bits
    // from the root down to the node itself.
    let mut pending: Vec<(usize, Vec<bool>)> = vec![(0, Vec::new())];
    let mut lines = Vec::with_capacity(tree.len());

    while let Some((index, path)) = pending.pop() {
        let mut line = String::new();
        if let Some((&branch, ancestors)) = path.split_last() {
            for &ongoing in ancestors {
                line.push_str(if ongoing { "│  " } else { "   " });
            }
            line.push_str(if branch { "├─ " } else { "└─ " });
        }
        line.push_str(&format!("{}) {}", index, tree[index]));
        lines.push(line);

        if right_child_index(index) < tree.len() {
            let mut left_path = path.clone();
            left_path.push(true);
            let mut right_path = path;
            right_path.push(false);
            pending.push((right_child_index(index), right_path));
            pending.push((left_child_index(index), left_path));
        }
    }

    Ok(lines.join("\n"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_one_line_per_node() {
        let tree: Vec<B256> = (1..=7u8).map(B256::repeat_byte).collect();
        let rendered = render_merkle_tree(&tree).unwrap();
        assert_eq!(rendered.lines().count(), tree.len());
        assert!(rendered.starts_with("0) 0x"));
    }

    #[test]
    fn rejects_empty_input() {
        assert!(render_merkle_tree(&[]).is_err());
    }
}
