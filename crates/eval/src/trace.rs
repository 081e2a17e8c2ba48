//! Explanation traces.
//!
//! A trace is a tree recording why a rule produced its result. Composite
//! operators (`and`, `or`, `if`, `?:`, `!`, `!!`) open a node; every other
//! operator that reaches the operator table leaves a `DataPoint` on the
//! node that is current when it commits. The first operator of an
//! evaluation always opens the root node.
//!
//! Nodes live in an arena and refer to their parent by `NodeId`, so the
//! cursor can walk back up without shared ownership.

use std::fmt;

use serde::ser::{Serialize, SerializeStruct, Serializer};

use crate::operator::Operator;
use crate::value::Value;

/// Handle of a node inside its `Trace`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

/// Leaf record for one non-composite operator.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct DataPoint {
    /// Variable implicated by the operator, when one of its operands is a
    /// `var` reference.
    pub variable: Option<Value>,
    pub operator: Operator,
    /// The operand list exactly as written in the rule.
    pub expected: Value,
    /// Value of the variable in the data context at commit time.
    pub current: Value,
    pub result: Value,
}

/// A child of a trace node.
#[derive(Debug, Clone, PartialEq)]
pub enum Entry {
    Node(NodeId),
    Data(DataPoint),
}

#[derive(Debug, Clone, PartialEq)]
pub struct TraceNode {
    pub operator: Operator,
    pub result: Value,
    pub parent: Option<NodeId>,
    pub depth: usize,
    pub entries: Vec<Entry>,
}

/// The finished explanation tree of one evaluation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Trace {
    nodes: Vec<TraceNode>,
}

impl Trace {
    /// The root node, absent when the rule contained no operator.
    pub fn root(&self) -> Option<NodeId> {
        if self.nodes.is_empty() {
            None
        } else {
            Some(NodeId(0))
        }
    }

    /// The node behind `id`.
    ///
    /// # Panics
    ///
    /// A `NodeId` is only meaningful for the trace that produced it; an id
    /// from a larger trace panics here. Use [`Trace::get`] when the id may
    /// come from elsewhere.
    pub fn node(&self, id: NodeId) -> &TraceNode {
        &self.nodes[id.0]
    }

    pub fn get(&self, id: NodeId) -> Option<&TraceNode> {
        self.nodes.get(id.0)
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Nested nodes directly under `id`, in evaluation order.
    pub fn children(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.node(id).entries.iter().filter_map(|entry| match entry {
            Entry::Node(child) => Some(*child),
            Entry::Data(_) => None,
        })
    }

    /// Data points recorded directly on `id`.
    pub fn data_points(&self, id: NodeId) -> impl Iterator<Item = &DataPoint> + '_ {
        self.node(id).entries.iter().filter_map(|entry| match entry {
            Entry::Data(point) => Some(point),
            Entry::Node(_) => None,
        })
    }

    /// Render the indented multi-line report.
    pub fn report(&self) -> String {
        self.to_string()
    }

    fn push_node(&mut self, operator: Operator, parent: Option<NodeId>) -> NodeId {
        let id = NodeId(self.nodes.len());
        let depth = parent.map_or(0, |p| self.node(p).depth + 1);
        self.nodes.push(TraceNode {
            operator,
            result: Value::Bool(false),
            parent,
            depth,
            entries: Vec::new(),
        });
        if let Some(p) = parent {
            self.nodes[p.0].entries.push(Entry::Node(id));
        }
        id
    }

    fn write_node(&self, f: &mut fmt::Formatter<'_>, id: NodeId) -> fmt::Result {
        let node = self.node(id);
        write!(f, "LOGIC: '{}', RESULT = {}", node.operator, node.result)?;
        let indent = "\t".repeat(node.depth + 1);
        for entry in &node.entries {
            write!(f, "\n{} ", indent)?;
            match entry {
                Entry::Node(child) => self.write_node(f, *child)?,
                Entry::Data(point) => write!(f, "{}", point)?,
            }
        }
        Ok(())
    }
}

impl fmt::Display for Trace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.root() {
            Some(root) => self.write_node(f, root),
            None => Ok(()),
        }
    }
}

impl fmt::Display for DataPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = self
            .variable
            .as_ref()
            .map(Value::to_string)
            .unwrap_or_default();
        write!(f, "DATA: '{}' data:", name)?;
        if self.current.is_null() {
            write!(f, "None")?;
        } else {
            write!(f, "{}", self.current)?;
        }
        write!(
            f,
            " {} expected:{},  RESULT = {}",
            self.operator,
            self.expected_args(),
            self.result
        )
    }
}

impl DataPoint {
    /// Bounds of a range check, otherwise the operand compared against.
    fn expected_args(&self) -> Value {
        match &self.expected {
            Value::Array(items) if items.len() == 3 => {
                Value::Array(vec![items[0].clone(), items[2].clone()])
            }
            Value::Array(items) => items.last().cloned().unwrap_or(Value::Null),
            other => other.clone(),
        }
    }
}

// ──────────────────────────────────────────────
// Serialization
// ──────────────────────────────────────────────

/// Serializes as the nested tree rooted at the first node, or `null`.
impl Serialize for Trace {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self.root() {
            Some(id) => NodeView { trace: self, id }.serialize(serializer),
            None => serializer.serialize_none(),
        }
    }
}

struct NodeView<'a> {
    trace: &'a Trace,
    id: NodeId,
}

impl Serialize for NodeView<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let node = self.trace.node(self.id);
        let reasons: Vec<EntryView<'_>> = node
            .entries
            .iter()
            .map(|entry| EntryView {
                trace: self.trace,
                entry,
            })
            .collect();
        let mut out = serializer.serialize_struct("TraceNode", 4)?;
        out.serialize_field("operator", &node.operator)?;
        out.serialize_field("result", &node.result)?;
        out.serialize_field("depth", &node.depth)?;
        out.serialize_field("reasons", &reasons)?;
        out.end()
    }
}

struct EntryView<'a> {
    trace: &'a Trace,
    entry: &'a Entry,
}

impl Serialize for EntryView<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self.entry {
            Entry::Node(id) => NodeView {
                trace: self.trace,
                id: *id,
            }
            .serialize(serializer),
            Entry::Data(point) => point.serialize(serializer),
        }
    }
}

// ──────────────────────────────────────────────
// Builder
// ──────────────────────────────────────────────

/// Cursor over a trace under construction.
///
/// One builder belongs to one top-level evaluation. The cursor mirrors the
/// stack of composite operators currently being evaluated.
#[derive(Debug, Default)]
pub(crate) struct TraceBuilder {
    trace: Trace,
    cursor: Option<NodeId>,
}

impl TraceBuilder {
    pub(crate) fn new() -> Self {
        TraceBuilder::default()
    }

    /// Called when evaluation reaches an operator, before its operands.
    pub(crate) fn enter(&mut self, operator: Operator) {
        match self.cursor {
            None => {
                tracing::debug!(%operator, "opening trace root");
                self.cursor = Some(self.trace.push_node(operator, None));
            }
            Some(current) if operator.is_composite() => {
                let id = self.trace.push_node(operator, Some(current));
                tracing::debug!(%operator, depth = self.trace.node(id).depth, "opening trace node");
                self.cursor = Some(id);
            }
            Some(_) => {}
        }
    }

    /// Record the result of the composite operator at the cursor and step
    /// back to its parent. The root stays current.
    pub(crate) fn commit_composite(&mut self, result: &Value) {
        if let Some(current) = self.cursor {
            let node = &mut self.trace.nodes[current.0];
            node.result = result.clone();
            if let Some(parent) = node.parent {
                self.cursor = Some(parent);
            }
        }
    }

    /// Append a data point to the node at the cursor.
    pub(crate) fn record(&mut self, point: DataPoint) {
        if let Some(current) = self.cursor {
            let node = &mut self.trace.nodes[current.0];
            node.result = point.result.clone();
            node.entries.push(Entry::Data(point));
        }
    }

    pub(crate) fn finish(self) -> Trace {
        self.trace
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn point(variable: &str, operator: Operator, expected: serde_json::Value, current: i64, result: bool) -> DataPoint {
        DataPoint {
            variable: Some(Value::from(variable)),
            operator,
            expected: Value::from(expected),
            current: Value::Int(current),
            result: Value::Bool(result),
        }
    }

    #[test]
    fn first_operator_opens_root_even_when_not_composite() {
        let mut builder = TraceBuilder::new();
        builder.enter(Operator::Less);
        builder.enter(Operator::Var);
        builder.record(point("temp", Operator::Less, json!([{"var": "temp"}, 0]), 5, false));
        let trace = builder.finish();

        assert_eq!(trace.len(), 1);
        let root = trace.root().unwrap();
        assert_eq!(trace.node(root).operator, Operator::Less);
        assert_eq!(trace.node(root).depth, 0);
        assert_eq!(trace.data_points(root).count(), 1);
        assert_eq!(trace.node(root).result, Value::Bool(false));
    }

    #[test]
    fn cursor_descends_and_retreats() {
        let mut builder = TraceBuilder::new();
        builder.enter(Operator::And);
        builder.enter(Operator::Not);
        builder.enter(Operator::In);
        builder.record(point("drink", Operator::In, json!([{"var": "drink"}, "cola"]), 1, true));
        builder.commit_composite(&Value::Bool(false));
        builder.enter(Operator::LessOrEqual);
        builder.record(point("age", Operator::LessOrEqual, json!([70, {"var": "age"}, 75]), 72, true));
        builder.commit_composite(&Value::Bool(false));
        let trace = builder.finish();

        let root = trace.root().unwrap();
        let children: Vec<NodeId> = trace.children(root).collect();
        assert_eq!(children.len(), 1);
        let not = trace.node(children[0]);
        assert_eq!(not.operator, Operator::Not);
        assert_eq!(not.depth, 1);
        assert_eq!(not.parent, Some(root));
        assert_eq!(not.result, Value::Bool(false));
        assert_eq!(trace.data_points(children[0]).count(), 1);
        // the range check landed on the root after `!` committed
        assert_eq!(trace.data_points(root).count(), 1);
        assert_eq!(trace.node(root).result, Value::Bool(false));
    }

    #[test]
    fn report_indents_by_depth() {
        let mut builder = TraceBuilder::new();
        builder.enter(Operator::And);
        builder.enter(Operator::LessOrEqual);
        builder.record(point("age", Operator::LessOrEqual, json!([70, {"var": "age"}, 75]), 72, true));
        builder.enter(Operator::Not);
        builder.enter(Operator::In);
        builder.record(DataPoint {
            variable: Some(Value::from("drink")),
            operator: Operator::In,
            expected: Value::from(json!([{"var": "drink"}, "sell cola"])),
            current: Value::from("cola"),
            result: Value::Bool(true),
        });
        builder.commit_composite(&Value::Bool(false));
        builder.commit_composite(&Value::Bool(false));
        let trace = builder.finish();

        let expected = "LOGIC: 'and', RESULT = false\n\
                        \t DATA: 'age' data:72 <= expected:[70,75],  RESULT = true\n\
                        \t LOGIC: '!', RESULT = false\n\
                        \t\t DATA: 'drink' data:cola in expected:sell cola,  RESULT = true";
        assert_eq!(trace.report(), expected);
    }

    #[test]
    fn missing_variable_reports_none() {
        let p = DataPoint {
            variable: None,
            operator: Operator::Equal,
            expected: Value::from(json!([1, 1])),
            current: Value::Null,
            result: Value::Bool(true),
        };
        assert_eq!(p.to_string(), "DATA: '' data:None == expected:1,  RESULT = true");
    }

    #[test]
    fn empty_trace_renders_nothing() {
        let trace = TraceBuilder::new().finish();
        assert!(trace.is_empty());
        assert_eq!(trace.report(), "");
        assert_eq!(serde_json::to_value(&trace).unwrap(), json!(null));
    }

    #[test]
    fn serializes_as_nested_tree() {
        let mut builder = TraceBuilder::new();
        builder.enter(Operator::Or);
        builder.enter(Operator::Greater);
        builder.record(point("n", Operator::Greater, json!([{"var": "n"}, 5]), 7, true));
        builder.commit_composite(&Value::Bool(true));
        let trace = builder.finish();

        assert_eq!(
            serde_json::to_value(&trace).unwrap(),
            json!({
                "operator": "or",
                "result": true,
                "depth": 0,
                "reasons": [{
                    "variable": "n",
                    "operator": ">",
                    "expected": [{"var": "n"}, 5],
                    "current": 7,
                    "result": true
                }]
            })
        );
    }

    #[test]
    fn data_point_serializes_flat() {
        let p = point("age", Operator::LessOrEqual, json!([70, {"var": "age"}, 75]), 72, true);
        assert_eq!(
            serde_json::to_value(&p).unwrap(),
            json!({
                "variable": "age",
                "operator": "<=",
                "expected": [70, {"var": "age"}, 75],
                "current": 72,
                "result": true
            })
        );
        let unnamed = DataPoint { variable: None, ..p };
        assert_eq!(serde_json::to_value(&unnamed).unwrap()["variable"], json!(null));
    }

    #[test]
    fn foreign_node_id_is_absent() {
        let mut builder = TraceBuilder::new();
        builder.enter(Operator::And);
        builder.enter(Operator::Or);
        builder.commit_composite(&Value::Bool(true));
        let larger = builder.finish();
        let nested = larger.children(larger.root().unwrap()).next().unwrap();

        let mut builder = TraceBuilder::new();
        builder.enter(Operator::Not);
        let smaller = builder.finish();
        assert!(smaller.get(smaller.root().unwrap()).is_some());
        assert_eq!(smaller.get(nested), None);
        assert_eq!(larger.get(nested).map(|n| n.operator), Some(Operator::Or));
    }
}
