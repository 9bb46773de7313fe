use std::collections::VecDeque;

use super::{error::EncodeError, list::NodeId};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TreeNode {
    pub val: i32,
    pub left: Option<NodeId>,
    pub right: Option<NodeId>,
}

/// Binary tree stored in an arena; children are referenced by index.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BinaryTree {
    nodes: Vec<TreeNode>,
    root: Option<NodeId>,
}

impl BinaryTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuilds a tree from its level-order form, `None` marking an absent child.
    ///
    /// Each present node consumes the next two slots as its left and right child.
    pub fn from_level_order(slots: &[Option<i32>]) -> Result<Self, &'static str> {
        let mut tree = Self::new();
        if matches!(slots, [] | [None]) {
            return Ok(tree);
        }
        let ids: Vec<Option<NodeId>> = slots
            .iter()
            .map(|slot| slot.map(|val| tree.push_node(val)))
            .collect();
        if ids[0].is_none() {
            return Err("root of a non-empty tree cannot be null");
        }
        tree.root = ids[0];

        let (mut i, mut j) = (0, 1);
        while j < ids.len() {
            if i >= j {
                return Err("node has no parent");
            }
            if let Some(parent) = ids[i] {
                tree.nodes[parent].left = ids[j];
                j += 1;
                if j >= ids.len() {
                    break;
                }
                tree.nodes[parent].right = ids[j];
                j += 1;
            }
            i += 1;
        }
        Ok(tree)
    }

    pub fn root(&self) -> Option<NodeId> {
        self.root
    }

    pub fn set_root(&mut self, root: Option<NodeId>) {
        self.root = root;
    }

    pub fn node(&self, id: NodeId) -> &TreeNode {
        &self.nodes[id]
    }

    pub fn node_mut(&mut self, id: NodeId) -> &mut TreeNode {
        &mut self.nodes[id]
    }

    /// Adds a detached node.
    pub fn push_node(&mut self, val: i32) -> NodeId {
        self.nodes.push(TreeNode {
            val,
            left: None,
            right: None,
        });
        self.nodes.len() - 1
    }

    /// Breadth-first values with `None` for absent children, trailing `None`s trimmed.
    pub fn level_order(&self) -> Result<Vec<Option<i32>>, EncodeError> {
        let mut visited = vec![false; self.nodes.len()];
        let mut slots = Vec::new();
        let mut queue = VecDeque::from([self.root]);

        while let Some(slot) = queue.pop_front() {
            let Some(id) = slot else {
                slots.push(None);
                continue
            };
            if visited[id] {
                return Err(EncodeError::InfiniteLoopDetected("TreeNode"));
            }
            visited[id] = true;

            let node = &self.nodes[id];
            slots.push(Some(node.val));
            queue.push_back(node.left);
            queue.push_back(node.right);
        }

        while let Some(None) = slots.last() {
            slots.pop();
        }
        Ok(slots)
    }
}
