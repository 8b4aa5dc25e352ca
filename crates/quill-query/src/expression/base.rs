use bson::{Bson, Document};

use super::{ExpressionNode, LogicalGroup, LogicalOp};

/// Accumulator mapping field names (or the reserved `$and` / `$or` / `$nor`
/// keys) to exactly one node each.
///
/// Keys keep insertion order. Re-adding an existing key replaces its node in
/// place. There is at most one group per connective: adding to a connective
/// that already has a group appends to it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BaseExpression {
    entries: Vec<(String, ExpressionNode)>,
}

impl BaseExpression {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, key: impl Into<String>, node: ExpressionNode) {
        let key = key.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some((_, slot)) => *slot = node,
            None => self.entries.push((key, node)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&ExpressionNode> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, n)| n)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ExpressionNode)> {
        self.entries.iter().map(|(k, n)| (k.as_str(), n))
    }

    pub fn add_to_and(&mut self, child: BaseExpression) {
        self.group_mut(LogicalOp::And).push(child);
    }

    pub fn add_to_or(&mut self, child: BaseExpression) {
        self.group_mut(LogicalOp::Or).push(child);
    }

    pub fn add_to_nor(&mut self, child: BaseExpression) {
        self.group_mut(LogicalOp::Nor).push(child);
    }

    /// Append every child of `group` to this expression's group of the same
    /// connective.
    pub fn merge_group(&mut self, group: LogicalGroup) {
        self.group_mut(group.op).children.extend(group.children);
    }

    pub fn has_and(&self) -> bool {
        self.group(LogicalOp::And).is_some()
    }

    pub fn has_or(&self) -> bool {
        self.group(LogicalOp::Or).is_some()
    }

    pub fn group(&self, op: LogicalOp) -> Option<&LogicalGroup> {
        match self.get(op.key()) {
            Some(ExpressionNode::Group(g)) if g.op == op => Some(g),
            _ => None,
        }
    }

    fn group_mut(&mut self, op: LogicalOp) -> &mut LogicalGroup {
        let key = op.key();
        let idx = match self.entries.iter().position(|(k, _)| k == key) {
            Some(idx) => {
                // A non-group node under a reserved key is overwritten.
                if !matches!(&self.entries[idx].1, ExpressionNode::Group(g) if g.op == op) {
                    self.entries[idx].1 = ExpressionNode::Group(LogicalGroup::new(op));
                }
                idx
            }
            None => {
                self.entries
                    .push((key.to_string(), ExpressionNode::Group(LogicalGroup::new(op))));
                self.entries.len() - 1
            }
        };
        match &mut self.entries[idx].1 {
            ExpressionNode::Group(g) => g,
            _ => unreachable!("group slot holds a group node"),
        }
    }

    /// Compile into a filter document.
    ///
    /// Groups stored under their own connective key contribute their children
    /// array directly, so `{"$and": [...]}` is not nested twice.
    pub fn compile(&self) -> Document {
        let mut doc = Document::new();
        for (key, node) in &self.entries {
            match node {
                ExpressionNode::Group(g) if key == g.op.key() => {
                    doc.insert(key.clone(), g.compile_children());
                }
                _ => {
                    doc.insert(key.clone(), Bson::Document(node.compile()));
                }
            }
        }
        doc
    }
}
