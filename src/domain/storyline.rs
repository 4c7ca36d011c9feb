//! Storyline decision graph
//!
//! The storyline is a directed graph of narrative steps, decision points
//! and endings, entered through a single root node. Selecting a target
//! resolves the route from the root, the edges it walks, and what the route
//! costs in currency, crafting time and waiting time.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap, HashSet, VecDeque};
use std::sync::LazyLock;
use thiserror::Error;
use tracing::debug;

use super::id::NodeId;

/// The storyline's single entry point
pub const ROOT_NODE_ID: &str = "start";

// The constants below encode how storyline content is authored. They are
// not a general rule; check the authored node text before changing them.

/// Positive costs below this are in the alternate currency
pub const ALT_CURRENCY_THRESHOLD: i64 = 1000;

/// Marks an hour quantity as crafting time rather than waiting time
pub const CRAFT_KEYWORD: &str = "craft";

static HOURS_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(\d+(?:\.\d+)?)\s*-?\s*hours?\b").expect("hours pattern is valid")
});

#[derive(Debug, Error, PartialEq)]
pub enum StorylineError {
    #[error("Duplicate node ID: '{0}'")]
    DuplicateNode(NodeId),

    #[error("Duplicate edge ID: '{0}'")]
    DuplicateEdge(String),

    #[error("Edge '{edge}' references unknown node '{node}' ({side} side)")]
    UnknownEdgeEndpoint {
        edge: String,
        node: NodeId,
        side: &'static str,
    },

    #[error("Root node '{0}' not found")]
    MissingRoot(NodeId),
}

/// Payload of a narrative step or decision point
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StepData {
    #[serde(default, alias = "label", skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default, alias = "notes", skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,

    /// Price of the step; negative values are rewards
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cost: Option<i64>,
}

/// Payload of an ending
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EndingData {
    #[serde(default, alias = "label", skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default, alias = "notes", skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

/// A storyline node, tagged by kind
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Node {
    Story {
        id: NodeId,
        #[serde(default)]
        data: StepData,
    },
    Decision {
        id: NodeId,
        #[serde(default)]
        data: StepData,
    },
    Ending {
        id: NodeId,
        #[serde(default)]
        data: EndingData,
    },
}

impl Node {
    pub fn story(id: &str, data: StepData) -> Self {
        Node::Story {
            id: NodeId::new(id),
            data,
        }
    }

    pub fn decision(id: &str, data: StepData) -> Self {
        Node::Decision {
            id: NodeId::new(id),
            data,
        }
    }

    pub fn ending(id: &str, data: EndingData) -> Self {
        Node::Ending {
            id: NodeId::new(id),
            data,
        }
    }

    pub fn id(&self) -> &NodeId {
        match self {
            Node::Story { id, .. } | Node::Decision { id, .. } | Node::Ending { id, .. } => id,
        }
    }

    /// Kind name as written in storyline files
    pub fn kind(&self) -> &'static str {
        match self {
            Node::Story { .. } => "story",
            Node::Decision { .. } => "decision",
            Node::Ending { .. } => "ending",
        }
    }

    pub fn title(&self) -> Option<&str> {
        match self {
            Node::Story { data, .. } | Node::Decision { data, .. } => data.title.as_deref(),
            Node::Ending { data, .. } => data.title.as_deref(),
        }
    }

    pub fn description(&self) -> Option<&str> {
        match self {
            Node::Story { data, .. } | Node::Decision { data, .. } => data.description.as_deref(),
            Node::Ending { data, .. } => data.description.as_deref(),
        }
    }

    pub fn note(&self) -> Option<&str> {
        match self {
            Node::Story { data, .. } | Node::Decision { data, .. } => data.note.as_deref(),
            Node::Ending { data, .. } => data.note.as_deref(),
        }
    }

    /// Endings carry no cost
    pub fn cost(&self) -> Option<i64> {
        match self {
            Node::Story { data, .. } | Node::Decision { data, .. } => data.cost,
            Node::Ending { .. } => None,
        }
    }

    /// Description and note, space-joined, for text heuristics
    pub fn text(&self) -> String {
        [self.description(), self.note()]
            .into_iter()
            .flatten()
            .collect::<Vec<_>>()
            .join(" ")
    }

    pub fn is_ending(&self) -> bool {
        matches!(self, Node::Ending { .. })
    }
}

/// A directed storyline edge
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Edge {
    /// Assigned `"{source}->{target}"` when loaded without one
    #[serde(default)]
    pub id: String,
    pub source: NodeId,
    pub target: NodeId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

impl Edge {
    pub fn new(source: &str, target: &str) -> Self {
        Self {
            id: Self::default_id(source, target),
            source: NodeId::new(source),
            target: NodeId::new(target),
            label: None,
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    fn default_id(source: &str, target: &str) -> String {
        format!("{}->{}", source, target)
    }
}

/// Time a node takes, inferred from its text
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TimeCost {
    /// Hours spent crafting
    Craft { hours: f64 },
    /// Hours of waiting
    TimeGate { hours: f64 },
}

/// Which total a node's cost lands in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "amount", rename_all = "snake_case")]
pub enum CostBucket {
    Currency(i64),
    AltCurrency(i64),
    /// Negative cost; counted in neither total
    Reward(i64),
}

/// What a node contributes to a path summary
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct NodeClassification {
    pub time: Option<TimeCost>,
    pub cost: Option<CostBucket>,
}

/// Classifies a node's time and cost
///
/// Time: the first `<N> hour` in the description + note text. A mention of
/// "craft" anywhere in that text makes it crafting time, otherwise it is a
/// time gate. Cost: positive costs split on [`ALT_CURRENCY_THRESHOLD`];
/// negative costs are rewards; zero is ignored.
pub fn classify_node(node: &Node) -> NodeClassification {
    let text = node.text();

    let time = HOURS_PATTERN
        .captures(&text)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse::<f64>().ok())
        .map(|hours| {
            if text.to_lowercase().contains(CRAFT_KEYWORD) {
                TimeCost::Craft { hours }
            } else {
                TimeCost::TimeGate { hours }
            }
        });

    let cost = node.cost().and_then(|cost| match cost {
        c if c < 0 => Some(CostBucket::Reward(c)),
        0 => None,
        c if c < ALT_CURRENCY_THRESHOLD => Some(CostBucket::AltCurrency(c)),
        c => Some(CostBucket::Currency(c)),
    });

    NodeClassification { time, cost }
}

/// Totals over a resolved path
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PathSummary {
    /// Number of nodes on the path
    pub steps: usize,
    pub total_cost_currency: i64,
    pub total_cost_alt_currency: i64,
    pub total_craft_hours: f64,
    pub total_time_gate_hours: f64,
}

/// Sums cost and time over the nodes of a path
///
/// Currency totals saturate at the bounds of `i64`.
pub fn summarize_path(path: &[&Node]) -> PathSummary {
    let mut summary = PathSummary {
        steps: path.len(),
        ..PathSummary::default()
    };

    for node in path {
        let class = classify_node(node);

        match class.time {
            Some(TimeCost::Craft { hours }) => summary.total_craft_hours += hours,
            Some(TimeCost::TimeGate { hours }) => summary.total_time_gate_hours += hours,
            None => {}
        }

        match class.cost {
            Some(CostBucket::Currency(c)) => {
                summary.total_cost_currency = summary.total_cost_currency.saturating_add(c)
            }
            Some(CostBucket::AltCurrency(c)) => {
                summary.total_cost_alt_currency = summary.total_cost_alt_currency.saturating_add(c)
            }
            Some(CostBucket::Reward(_)) | None => {}
        }
    }

    summary
}

/// Finds the route from [`ROOT_NODE_ID`] to `target`
///
/// See [`find_path_from`].
pub fn find_path<'a>(target: &str, nodes: &'a [Node], edges: &[Edge]) -> Vec<&'a Node> {
    find_path_from(ROOT_NODE_ID, target, nodes, edges)
}

/// Finds the shortest route from `root` to `target`
///
/// Breadth-first search runs backwards from the target over incoming
/// edges and stops once the root is dequeued. When the root cannot be
/// reached the result is the root alone ("no route"), or empty if the root
/// is not among `nodes`. Edge endpoints missing from `nodes` are dropped
/// from the result.
pub fn find_path_from<'a>(
    root: &str,
    target: &str,
    nodes: &'a [Node],
    edges: &[Edge],
) -> Vec<&'a Node> {
    let by_id: HashMap<&str, &'a Node> = nodes.iter().map(|n| (n.id().as_str(), n)).collect();

    let mut incoming: HashMap<&str, Vec<&str>> = HashMap::new();
    for edge in edges {
        incoming
            .entry(edge.target.as_str())
            .or_default()
            .push(edge.source.as_str());
    }

    // Parent pointers lead from a node one step closer to the target
    let mut toward_target: HashMap<&str, &str> = HashMap::new();
    let mut visited: HashSet<&str> = HashSet::new();
    let mut queue: VecDeque<&str> = VecDeque::new();

    visited.insert(target);
    queue.push_back(target);

    while let Some(current) = queue.pop_front() {
        if current == root {
            break;
        }

        for &source in incoming.get(current).into_iter().flatten() {
            if visited.insert(source) {
                toward_target.insert(source, current);
                queue.push_back(source);
            }
        }
    }

    if !visited.contains(root) {
        debug!(root, target, "no route from root to target");
        return by_id.get(root).copied().into_iter().collect();
    }

    let mut ids = vec![root];
    let mut current = root;
    while current != target {
        match toward_target.get(current) {
            Some(&next) => {
                ids.push(next);
                current = next;
            }
            None => break,
        }
    }

    ids.into_iter().filter_map(|id| by_id.get(id).copied()).collect()
}

/// Returns the IDs of edges joining consecutive path nodes, in path direction
///
/// Edges between path nodes that are not adjacent on the path are excluded.
pub fn path_edge_ids(path: &[&Node], edges: &[Edge]) -> HashSet<String> {
    let steps: HashSet<(&str, &str)> = path
        .windows(2)
        .map(|pair| (pair[0].id().as_str(), pair[1].id().as_str()))
        .collect();

    edges
        .iter()
        .filter(|e| steps.contains(&(e.source.as_str(), e.target.as_str())))
        .map(|e| e.id.clone())
        .collect()
}

/// A path with its traversed edges and totals
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedPath<'a> {
    pub nodes: Vec<&'a Node>,
    pub edge_ids: BTreeSet<String>,
    pub summary: PathSummary,
}

impl ResolvedPath<'_> {
    /// True when the target could not be reached and only the root remains
    pub fn is_unreachable(&self, target: &str) -> bool {
        self.nodes.last().map(|n| n.id().as_str()) != Some(target)
    }
}

/// A validated storyline
///
/// Node IDs and edge IDs are unique, every edge joins known nodes and the
/// root exists.
#[derive(Debug, Clone)]
pub struct Storyline {
    root: NodeId,
    nodes: Vec<Node>,
    edges: Vec<Edge>,
}

impl Storyline {
    /// Validates a storyline rooted at [`ROOT_NODE_ID`]
    pub fn new(nodes: Vec<Node>, edges: Vec<Edge>) -> Result<Self, StorylineError> {
        Self::with_root(NodeId::new(ROOT_NODE_ID), nodes, edges)
    }

    /// Validates a storyline with a custom root
    pub fn with_root(
        root: NodeId,
        nodes: Vec<Node>,
        mut edges: Vec<Edge>,
    ) -> Result<Self, StorylineError> {
        let mut seen: HashSet<&NodeId> = HashSet::new();
        for node in &nodes {
            if !seen.insert(node.id()) {
                return Err(StorylineError::DuplicateNode(node.id().clone()));
            }
        }

        if !seen.contains(&root) {
            return Err(StorylineError::MissingRoot(root));
        }

        let mut edge_ids: HashSet<String> = HashSet::new();
        for edge in &mut edges {
            if edge.id.is_empty() {
                edge.id = Edge::default_id(edge.source.as_str(), edge.target.as_str());
            }

            for (node, side) in [(&edge.source, "source"), (&edge.target, "target")] {
                if !seen.contains(node) {
                    return Err(StorylineError::UnknownEdgeEndpoint {
                        edge: edge.id.clone(),
                        node: node.clone(),
                        side,
                    });
                }
            }

            if !edge_ids.insert(edge.id.clone()) {
                return Err(StorylineError::DuplicateEdge(edge.id.clone()));
            }
        }

        Ok(Self { root, nodes, edges })
    }

    pub fn root(&self) -> &NodeId {
        &self.root
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn node(&self, id: &str) -> Option<&Node> {
        self.nodes.iter().find(|n| n.id().as_str() == id)
    }

    /// All ending nodes, in file order
    pub fn endings(&self) -> Vec<&Node> {
        self.nodes.iter().filter(|n| n.is_ending()).collect()
    }

    pub fn find_path(&self, target: &str) -> Vec<&Node> {
        find_path_from(self.root.as_str(), target, &self.nodes, &self.edges)
    }

    pub fn path_edge_ids(&self, path: &[&Node]) -> HashSet<String> {
        path_edge_ids(path, &self.edges)
    }

    /// Resolves path, traversed edges and summary for a target
    pub fn resolve(&self, target: &str) -> ResolvedPath<'_> {
        let nodes = self.find_path(target);
        let edge_ids = self.path_edge_ids(&nodes).into_iter().collect();
        let summary = summarize_path(&nodes);

        ResolvedPath {
            nodes,
            edge_ids,
            summary,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn step(id: &str, cost: Option<i64>, description: Option<&str>, note: Option<&str>) -> Node {
        Node::story(
            id,
            StepData {
                title: None,
                description: description.map(String::from),
                note: note.map(String::from),
                cost,
            },
        )
    }

    fn plain(id: &str) -> Node {
        step(id, None, None, None)
    }

    fn ids(path: &[&Node]) -> Vec<String> {
        path.iter().map(|n| n.id().to_string()).collect()
    }

    #[test]
    fn find_path_prefers_shortest_route() {
        let nodes = vec![plain("start"), step("a", Some(5), None, None), step("b", Some(1200), None, None)];
        let edges = vec![Edge::new("start", "a"), Edge::new("a", "b"), Edge::new("start", "b")];

        let path = find_path("b", &nodes, &edges);
        assert_eq!(ids(&path), vec!["start", "b"]);

        let traversed = path_edge_ids(&path, &edges);
        let expected: HashSet<String> = ["start->b".to_string()].into_iter().collect();
        assert_eq!(traversed, expected);
    }

    #[test]
    fn find_path_follows_chain() {
        let nodes = vec![plain("start"), plain("a"), plain("b"), plain("c")];
        let edges = vec![Edge::new("start", "a"), Edge::new("a", "b"), Edge::new("b", "c")];

        assert_eq!(ids(&find_path("c", &nodes, &edges)), vec!["start", "a", "b", "c"]);
    }

    #[test]
    fn disconnected_target_yields_root_only() {
        let nodes = vec![plain("start"), plain("a"), plain("island")];
        let edges = vec![Edge::new("start", "a")];

        assert_eq!(ids(&find_path("island", &nodes, &edges)), vec!["start"]);
    }

    #[test]
    fn missing_root_yields_empty_path() {
        let nodes = vec![plain("a")];
        assert!(find_path("a", &nodes, &[]).is_empty());
    }

    #[test]
    fn target_is_root() {
        let nodes = vec![plain("start")];
        assert_eq!(ids(&find_path("start", &nodes, &[])), vec!["start"]);
    }

    #[test]
    fn find_path_survives_cycles() {
        let nodes = vec![plain("start"), plain("a"), plain("b")];
        let edges = vec![
            Edge::new("start", "a"),
            Edge::new("a", "b"),
            Edge::new("b", "a"),
        ];

        assert_eq!(ids(&find_path("b", &nodes, &edges)), vec!["start", "a", "b"]);
    }

    #[test]
    fn shortcut_edges_excluded() {
        let nodes = vec![plain("start"), plain("a"), plain("b")];
        let path: Vec<&Node> = nodes.iter().collect();
        let edges = vec![
            Edge::new("start", "a"),
            Edge::new("a", "b"),
            Edge::new("start", "b"),
            Edge::new("b", "a"),
        ];

        let traversed = path_edge_ids(&path, &edges);
        let expected: HashSet<String> =
            ["start->a".to_string(), "a->b".to_string()].into_iter().collect();
        assert_eq!(traversed, expected);
    }

    #[test]
    fn summary_splits_currencies() {
        let nodes = vec![
            plain("start"),
            step("a", Some(40), None, None),
            step("b", Some(40_000_000), None, None),
        ];
        let path: Vec<&Node> = nodes.iter().collect();

        let summary = summarize_path(&path);
        assert_eq!(summary.steps, 3);
        assert_eq!(summary.total_cost_alt_currency, 40);
        assert_eq!(summary.total_cost_currency, 40_000_000);
    }

    #[test]
    fn currency_totals_saturate() {
        let nodes = vec![
            step("a", Some(i64::MAX), None, None),
            step("b", Some(i64::MAX), None, None),
            step("c", Some(5_000_000), None, None),
        ];
        let path: Vec<&Node> = nodes.iter().collect();

        let summary = summarize_path(&path);
        assert_eq!(summary.steps, 3);
        assert_eq!(summary.total_cost_currency, i64::MAX);
        assert_eq!(summary.total_cost_alt_currency, 0);
    }

    #[test]
    fn rewards_excluded_from_totals() {
        let nodes = vec![step("a", Some(-500), None, None), step("b", Some(-5_000_000), None, None)];
        let path: Vec<&Node> = nodes.iter().collect();

        let summary = summarize_path(&path);
        assert_eq!(summary.total_cost_alt_currency, 0);
        assert_eq!(summary.total_cost_currency, 0);
        assert_eq!(classify_node(&nodes[0]).cost, Some(CostBucket::Reward(-500)));
    }

    #[test]
    fn threshold_boundary() {
        assert_eq!(
            classify_node(&step("a", Some(999), None, None)).cost,
            Some(CostBucket::AltCurrency(999))
        );
        assert_eq!(
            classify_node(&step("a", Some(1000), None, None)).cost,
            Some(CostBucket::Currency(1000))
        );
        assert_eq!(classify_node(&step("a", Some(0), None, None)).cost, None);
    }

    #[test]
    fn craft_hours_classified() {
        let node = step("a", None, Some("55 hour craft"), None);
        assert_eq!(classify_node(&node).time, Some(TimeCost::Craft { hours: 55.0 }));

        let summary = summarize_path(&[&node]);
        assert_eq!(summary.total_craft_hours, 55.0);
        assert_eq!(summary.total_time_gate_hours, 0.0);
    }

    #[test]
    fn time_gate_from_note() {
        let node = step("a", None, Some("Wait for the reply"), Some("~24 hour timegate"));
        assert_eq!(classify_node(&node).time, Some(TimeCost::TimeGate { hours: 24.0 }));
    }

    #[test]
    fn craft_mention_anywhere_counts() {
        let node = step("a", None, Some("Crafting the keycard"), Some("takes 12 hours"));
        assert_eq!(classify_node(&node).time, Some(TimeCost::Craft { hours: 12.0 }));
    }

    #[test]
    fn hours_are_case_insensitive() {
        let node = step("a", None, Some("Wait 3 HOURS"), None);
        assert_eq!(classify_node(&node).time, Some(TimeCost::TimeGate { hours: 3.0 }));
    }

    #[test]
    fn no_hours_no_time() {
        let node = step("a", Some(10), Some("Craft a thing"), None);
        assert_eq!(classify_node(&node).time, None);
    }

    #[test]
    fn ending_has_no_cost() {
        let node = Node::ending("end", EndingData::default());
        assert_eq!(node.cost(), None);
        assert!(node.is_ending());
    }

    #[test]
    fn node_deserializes_from_tagged_json() {
        let json = r#"{
            "id": "pay",
            "type": "decision",
            "data": {"label": "Pay up?", "cost": 120, "notes": "2 hour wait"}
        }"#;
        let node: Node = serde_json::from_str(json).unwrap();

        assert_eq!(node.kind(), "decision");
        assert_eq!(node.title(), Some("Pay up?"));
        assert_eq!(node.cost(), Some(120));
        assert_eq!(node.text(), "2 hour wait");
    }

    #[test]
    fn node_without_data() {
        let node: Node = serde_json::from_str(r#"{"id": "start", "type": "story"}"#).unwrap();
        assert_eq!(node.id().as_str(), "start");
        assert_eq!(node.cost(), None);
    }

    #[test]
    fn unknown_node_type_rejected() {
        let json = r#"{"id": "x", "type": "cutscene"}"#;
        assert!(serde_json::from_str::<Node>(json).is_err());
    }

    #[test]
    fn storyline_assigns_edge_ids() {
        let edge: Edge = serde_json::from_str(r#"{"source": "start", "target": "a"}"#).unwrap();
        let storyline = Storyline::new(vec![plain("start"), plain("a")], vec![edge]).unwrap();

        assert_eq!(storyline.edges()[0].id, "start->a");
    }

    #[test]
    fn storyline_rejects_duplicate_nodes() {
        let result = Storyline::new(vec![plain("start"), plain("start")], vec![]);
        assert_eq!(result.unwrap_err(), StorylineError::DuplicateNode(NodeId::new("start")));
    }

    #[test]
    fn storyline_rejects_unknown_endpoints() {
        let result = Storyline::new(vec![plain("start")], vec![Edge::new("start", "ghost")]);
        assert!(matches!(
            result,
            Err(StorylineError::UnknownEdgeEndpoint { side: "target", .. })
        ));
    }

    #[test]
    fn storyline_requires_root() {
        let result = Storyline::new(vec![plain("a")], vec![]);
        assert!(matches!(result, Err(StorylineError::MissingRoot(_))));
    }

    #[test]
    fn storyline_rejects_duplicate_edges() {
        let result = Storyline::new(
            vec![plain("start"), plain("a")],
            vec![Edge::new("start", "a"), Edge::new("start", "a")],
        );
        assert!(matches!(result, Err(StorylineError::DuplicateEdge(_))));
    }

    #[test]
    fn storyline_resolve() {
        let storyline = Storyline::new(
            vec![
                plain("start"),
                step("craft", Some(40), Some("55 hour craft"), None),
                step("wait", Some(250_000), None, Some("~24 hour timegate")),
                Node::ending("end", EndingData::default()),
                plain("island"),
            ],
            vec![
                Edge::new("start", "craft"),
                Edge::new("craft", "wait"),
                Edge::new("wait", "end").with_label("Leave"),
            ],
        )
        .unwrap();

        let resolved = storyline.resolve("end");
        assert_eq!(ids(&resolved.nodes), vec!["start", "craft", "wait", "end"]);
        assert_eq!(resolved.edge_ids.len(), 3);
        assert!(!resolved.is_unreachable("end"));
        assert_eq!(
            resolved.summary,
            PathSummary {
                steps: 4,
                total_cost_currency: 250_000,
                total_cost_alt_currency: 40,
                total_craft_hours: 55.0,
                total_time_gate_hours: 24.0,
            }
        );

        let stranded = storyline.resolve("island");
        assert!(stranded.is_unreachable("island"));
        assert!(stranded.edge_ids.is_empty());
        assert_eq!(storyline.endings().len(), 1);
    }
}
