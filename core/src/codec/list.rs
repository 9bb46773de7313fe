use super::error::EncodeError;

pub type NodeId = usize;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListNode {
    pub val: i32,
    pub next: Option<NodeId>,
}

/// Singly-linked list whose nodes live in an arena and link to each other by index.
///
/// Links may form a cycle; [`LinkedList::values`] detects it instead of looping.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LinkedList {
    nodes: Vec<ListNode>,
    head: Option<NodeId>,
}

impl LinkedList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_values(values: impl IntoIterator<Item = i32>) -> Self {
        let mut list = Self::new();
        let mut prev = None;
        for val in values {
            let id = list.push_node(val);
            match prev {
                Some(p) => list.set_next(p, Some(id)),
                None => list.head = Some(id),
            }
            prev = Some(id);
        }
        list
    }

    pub fn head(&self) -> Option<NodeId> {
        self.head
    }

    pub fn set_head(&mut self, head: Option<NodeId>) {
        self.head = head;
    }

    pub fn node(&self, id: NodeId) -> &ListNode {
        &self.nodes[id]
    }

    /// Number of nodes in the arena, reachable or not.
    pub fn num_nodes(&self) -> usize {
        self.nodes.len()
    }

    /// Adds an unlinked node.
    pub fn push_node(&mut self, val: i32) -> NodeId {
        self.nodes.push(ListNode { val, next: None });
        self.nodes.len() - 1
    }

    pub fn set_next(&mut self, from: NodeId, to: Option<NodeId>) {
        self.nodes[from].next = to;
    }

    /// Links the last node to the `pos`-th node (0-based, in list order).
    ///
    /// Returns `false` and leaves the list untouched when `pos` is out of range.
    pub fn close_cycle(&mut self, pos: usize) -> bool {
        let mut order = Vec::with_capacity(self.nodes.len());
        let mut seen = vec![false; self.nodes.len()];
        let mut cur = self.head;
        while let Some(id) = cur {
            if seen[id] {
                return false;
            }
            seen[id] = true;
            order.push(id);
            cur = self.nodes[id].next;
        }
        match (order.last(), order.get(pos)) {
            (Some(&tail), Some(&target)) => {
                self.set_next(tail, Some(target));
                true
            }
            _ => false,
        }
    }

    /// Values in list order.
    pub fn values(&self) -> Result<Vec<i32>, EncodeError> {
        let mut visited = vec![false; self.nodes.len()];
        let mut vals = Vec::new();
        let mut cur = self.head;
        while let Some(id) = cur {
            if visited[id] {
                return Err(EncodeError::InfiniteLoopDetected("ListNode"));
            }
            visited[id] = true;
            vals.push(self.nodes[id].val);
            cur = self.nodes[id].next;
        }
        Ok(vals)
    }

    pub fn has_cycle(&self) -> bool {
        self.values().is_err()
    }
}
