//! Binary forest format.
//!
//! A forest file is a plain concatenation of tree records with no header.
//! Each record holds `2^max_depth` node entries in heap order (slot 0
//! included). A node entry is 13 little-endian bytes without padding:
//!
//! ```text
//! [tag: i8][feature: i32][threshold: f64]
//! ```
//!
//! `tag` is -2 (uninitialized), -1 (internal) or the leaf class. Nodes that
//! are not internal are written with feature 0 and threshold 0.0. Since the
//! file carries no header, `max_depth` must be supplied when reading.

use std::fs::File;
use std::io::{BufReader, BufWriter, ErrorKind, Read, Write};
use std::path::Path;

use super::error::{ReadError, WriteError};
use crate::config::MAX_SUPPORTED_DEPTH;
use crate::repr::{DecisionTree, Forest, NodeState, TreeNode, n_slots};

/// Size of one encoded node in bytes.
pub const NODE_RECORD_SIZE: usize = 13;

/// Size of one encoded tree of the given depth in bytes.
#[inline]
pub fn tree_record_size(max_depth: u32) -> usize {
    n_slots(max_depth) * NODE_RECORD_SIZE
}

// ============================================================================
// Node encoding
// ============================================================================

/// Encode one node. Fails only for a feature index beyond `i32::MAX`.
pub fn encode_node(node: &TreeNode) -> Result<[u8; NODE_RECORD_SIZE], u32> {
    let (feature, threshold) = match node.state {
        NodeState::Internal => {
            let feature = i32::try_from(node.feature).map_err(|_| node.feature)?;
            (feature, node.threshold)
        }
        _ => (0, 0.0),
    };

    let mut buf = [0u8; NODE_RECORD_SIZE];
    buf[0] = node.state.tag() as u8;
    buf[1..5].copy_from_slice(&feature.to_le_bytes());
    buf[5..13].copy_from_slice(&threshold.to_le_bytes());
    Ok(buf)
}

/// Decoded but unchecked node fields.
#[derive(Debug, Clone, Copy, PartialEq)]
struct RawNode {
    tag: i8,
    feature: i32,
    threshold: f64,
}

/// Split one 13-byte entry into its fields.
fn decode_raw(buf: &[u8; NODE_RECORD_SIZE]) -> RawNode {
    RawNode {
        tag: buf[0] as i8,
        feature: i32::from_le_bytes([buf[1], buf[2], buf[3], buf[4]]),
        threshold: f64::from_le_bytes([
            buf[5], buf[6], buf[7], buf[8], buf[9], buf[10], buf[11], buf[12],
        ]),
    }
}

fn decode_node(
    buf: &[u8; NODE_RECORD_SIZE],
    tree_idx: usize,
    node: usize,
) -> Result<TreeNode, ReadError> {
    let raw = decode_raw(buf);
    let state = NodeState::from_tag(raw.tag).ok_or(ReadError::InvalidTag {
        tree_idx,
        node,
        tag: raw.tag,
    })?;

    Ok(match state {
        NodeState::Internal => {
            let feature = u32::try_from(raw.feature).map_err(|_| ReadError::InvalidFeature {
                tree_idx,
                node,
                feature: raw.feature,
            })?;
            TreeNode::internal(feature, raw.threshold)
        }
        NodeState::Leaf(label) => TreeNode::leaf(label),
        NodeState::Uninitialized => TreeNode::default(),
    })
}

// ============================================================================
// Forest encoding
// ============================================================================

/// Write every tree of `forest` to `writer`, in forest order.
pub fn write_forest<W: Write>(forest: &Forest, writer: &mut W) -> Result<(), WriteError> {
    let mut record = Vec::with_capacity(tree_record_size(forest.max_depth()));
    for (tree_idx, tree) in forest.trees().enumerate() {
        record.clear();
        for (node, entry) in tree.nodes().iter().enumerate() {
            let bytes = encode_node(entry).map_err(|feature| WriteError::FeatureOverflow {
                tree_idx,
                node,
                feature,
            })?;
            record.extend_from_slice(&bytes);
        }
        writer.write_all(&record)?;
    }
    writer.flush()?;
    Ok(())
}

/// Read tree records until the end of the stream.
///
/// Every tree is validated; when `features_count` is known, split features
/// must lie below it. An empty stream yields an empty forest.
pub fn read_forest<R: Read>(
    reader: &mut R,
    max_depth: u32,
    features_count: Option<usize>,
) -> Result<Forest, ReadError> {
    if max_depth == 0 || max_depth > MAX_SUPPORTED_DEPTH {
        return Err(ReadError::UnsupportedDepth(max_depth));
    }

    let expected = tree_record_size(max_depth);
    let mut record = vec![0u8; expected];
    let mut forest = Forest::new(max_depth);

    loop {
        let tree_idx = forest.n_trees();
        let actual = read_record(reader, &mut record)?;
        if actual == 0 {
            break;
        }
        if actual < expected {
            return Err(ReadError::Truncated {
                tree_idx,
                expected,
                actual,
            });
        }

        let nodes = record
            .chunks_exact(NODE_RECORD_SIZE)
            .enumerate()
            .map(|(node, chunk)| {
                let mut buf = [0u8; NODE_RECORD_SIZE];
                buf.copy_from_slice(chunk);
                decode_node(&buf, tree_idx, node)
            })
            .collect::<Result<Vec<_>, _>>()?;

        let tree = DecisionTree::from_nodes(nodes, max_depth)
            .and_then(|tree| tree.validate(features_count).map(|()| tree))
            .map_err(|source| ReadError::InvalidTree { tree_idx, source })?;
        forest.push_tree(tree.with_id(tree_idx));
    }

    Ok(forest)
}

/// Fill `buf` as far as the stream allows; returns the number of bytes read.
fn read_record<R: Read>(reader: &mut R, buf: &mut [u8]) -> Result<usize, std::io::Error> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}

// ============================================================================
// File helpers
// ============================================================================

/// Write `forest` to a file, replacing any existing content.
pub fn save_forest(forest: &Forest, path: impl AsRef<Path>) -> Result<(), WriteError> {
    let path = path.as_ref();
    let file = File::create(path).map_err(|source| WriteError::Create {
        path: path.to_path_buf(),
        source,
    })?;
    let mut writer = BufWriter::new(file);
    write_forest(forest, &mut writer)?;
    tracing::info!(path = %path.display(), n_trees = forest.n_trees(), "saved forest");
    Ok(())
}

/// Read a forest of depth `max_depth` from a file.
pub fn load_forest(
    path: impl AsRef<Path>,
    max_depth: u32,
    features_count: Option<usize>,
) -> Result<Forest, ReadError> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|source| ReadError::Open {
        path: path.to_path_buf(),
        source,
    })?;
    let mut reader = BufReader::new(file);
    let forest = read_forest(&mut reader, max_depth, features_count)?;
    tracing::info!(path = %path.display(), n_trees = forest.n_trees(), "loaded forest");
    Ok(forest)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::Label;
    use std::io::Cursor;

    fn stump() -> DecisionTree {
        let mut nodes = vec![TreeNode::default(); 4];
        nodes[1] = TreeNode::internal(3, -1.25);
        nodes[2] = TreeNode::leaf(Label::Zero);
        nodes[3] = TreeNode::leaf(Label::One);
        DecisionTree::from_nodes(nodes, 2).unwrap()
    }

    fn encode(forest: &Forest) -> Vec<u8> {
        let mut buf = Vec::new();
        write_forest(forest, &mut buf).unwrap();
        buf
    }

    #[test]
    fn node_layout_is_little_endian() {
        let bytes = encode_node(&TreeNode::internal(0x0102_0304, 1.5)).unwrap();
        assert_eq!(bytes[0], 0xFF); // -1
        assert_eq!(&bytes[1..5], &[0x04, 0x03, 0x02, 0x01]);
        assert_eq!(&bytes[5..13], &1.5f64.to_le_bytes());
    }

    #[test]
    fn non_internal_nodes_zero_their_payload() {
        let mut leaf = TreeNode::leaf(Label::One);
        leaf.feature = 9;
        leaf.threshold = 4.0;
        let bytes = encode_node(&leaf).unwrap();
        assert_eq!(bytes[0], 1);
        assert!(bytes[1..].iter().all(|&b| b == 0));

        let bytes = encode_node(&TreeNode::default()).unwrap();
        assert_eq!(bytes[0] as i8, -2);
        assert!(bytes[1..].iter().all(|&b| b == 0));
    }

    #[test]
    fn record_size() {
        let forest = Forest::from_trees(vec![stump(), stump()], 2).unwrap();
        assert_eq!(tree_record_size(2), 52);
        assert_eq!(encode(&forest).len(), 104);
    }

    #[test]
    fn round_trip_preserves_nodes() {
        let forest = Forest::from_trees(vec![stump(), stump()], 2).unwrap();
        let loaded = read_forest(&mut Cursor::new(encode(&forest)), 2, Some(4)).unwrap();

        assert_eq!(loaded.n_trees(), 2);
        for (a, b) in forest.trees().zip(loaded.trees()) {
            assert_eq!(a.nodes(), b.nodes());
        }
        assert_eq!(loaded.tree(1).id(), Some(1));
    }

    #[test]
    fn empty_stream_is_empty_forest() {
        let forest = read_forest(&mut Cursor::new(Vec::<u8>::new()), 3, None).unwrap();
        assert!(forest.is_empty());
        assert_eq!(forest.max_depth(), 3);
    }

    #[test]
    fn truncated_record_is_error() {
        let forest = Forest::from_trees(vec![stump(), stump()], 2).unwrap();
        let mut bytes = encode(&forest);
        bytes.truncate(52 + 20);

        let err = read_forest(&mut Cursor::new(bytes), 2, None).unwrap_err();
        assert!(matches!(
            err,
            ReadError::Truncated {
                tree_idx: 1,
                expected: 52,
                actual: 20
            }
        ));
    }

    #[test]
    fn invalid_tag_is_error() {
        let mut bytes = encode(&Forest::from_trees(vec![stump()], 2).unwrap());
        bytes[2 * NODE_RECORD_SIZE] = 7;
        let err = read_forest(&mut Cursor::new(bytes), 2, None).unwrap_err();
        assert!(matches!(err, ReadError::InvalidTag { tree_idx: 0, node: 2, tag: 7 }));
    }

    #[test]
    fn negative_feature_is_error() {
        let mut bytes = encode(&Forest::from_trees(vec![stump()], 2).unwrap());
        let at = NODE_RECORD_SIZE + 1;
        bytes[at..at + 4].copy_from_slice(&(-5i32).to_le_bytes());
        let err = read_forest(&mut Cursor::new(bytes), 2, None).unwrap_err();
        assert!(matches!(err, ReadError::InvalidFeature { feature: -5, .. }));
    }

    #[test]
    fn unreachable_uninitialized_root_is_invalid() {
        let forest = Forest::from_trees(vec![DecisionTree::new_uninitialized(2)], 2).unwrap();
        let err = read_forest(&mut Cursor::new(encode(&forest)), 2, None).unwrap_err();
        assert!(matches!(err, ReadError::InvalidTree { tree_idx: 0, .. }));
    }

    #[test]
    fn feature_beyond_features_count_is_invalid() {
        let bytes = encode(&Forest::from_trees(vec![stump()], 2).unwrap());
        let err = read_forest(&mut Cursor::new(bytes), 2, Some(3)).unwrap_err();
        assert!(matches!(err, ReadError::InvalidTree { .. }));
    }

    #[test]
    fn unsupported_depth_is_rejected() {
        let err = read_forest(&mut Cursor::new(Vec::<u8>::new()), 0, None).unwrap_err();
        assert!(matches!(err, ReadError::UnsupportedDepth(0)));
    }

    #[test]
    fn wrong_depth_shows_up_as_corruption() {
        // Three depth-2 records read as depth 3 leave a partial record.
        let bytes = encode(&Forest::from_trees(vec![stump(), stump(), stump()], 2).unwrap());
        let err = read_forest(&mut Cursor::new(bytes), 3, None);
        assert!(err.is_err());
    }

    #[test]
    fn save_and_load_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("forest.bin");
        let forest = Forest::from_trees(vec![stump()], 2).unwrap();

        save_forest(&forest, &path).unwrap();
        assert_eq!(std::fs::metadata(&path).unwrap().len(), 52);
        let loaded = load_forest(&path, 2, Some(4)).unwrap();
        assert_eq!(loaded.tree(0).nodes(), forest.tree(0).nodes());
    }

    #[test]
    fn load_missing_file_is_open_error() {
        let err = load_forest("/no/such/forest.bin", 2, None).unwrap_err();
        assert!(matches!(err, ReadError::Open { .. }));
    }
}
