use std::collections::HashMap;

use eframe::egui::Color32;
use tracing::debug;

mod records;
mod summary;

pub use records::{AnalysisResult, CharacterRecord, InteractionRecord};
pub use summary::{CharacterSummary, MAX_PARTNERS, Partner, interaction_summary};

pub const MIN_MENTIONS: i64 = 2;
pub const MIN_WEIGHT: u32 = 2;

pub const PALETTE: [Color32; 10] = [
    Color32::from_rgb(31, 119, 180),
    Color32::from_rgb(255, 127, 14),
    Color32::from_rgb(44, 160, 44),
    Color32::from_rgb(214, 39, 40),
    Color32::from_rgb(148, 103, 189),
    Color32::from_rgb(140, 86, 75),
    Color32::from_rgb(227, 119, 194),
    Color32::from_rgb(127, 127, 127),
    Color32::from_rgb(188, 189, 34),
    Color32::from_rgb(23, 190, 207),
];

#[derive(Clone, Debug, PartialEq)]
pub struct CharacterNode {
    pub id: String,
    pub mentions: u32,
    pub description: String,
    pub radius: f32,
    pub importance: u8,
    pub color: Color32,
}

#[derive(Clone, Debug, PartialEq)]
pub struct InteractionLink {
    pub source: String,
    pub target: String,
    pub weight: u32,
    pub contexts: Vec<String>,
    pub stroke_width: f32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BatchOutcome {
    Applied { nodes: usize, links: usize },
    Ignored,
}

pub fn node_radius(mentions: u32) -> f32 {
    (20.0 + (mentions as f32).sqrt() * 6.0).clamp(30.0, 60.0)
}

pub fn node_importance(mentions: u32) -> u8 {
    mentions.div_ceil(5).min(5) as u8
}

pub fn link_stroke_width(weight: u32) -> f32 {
    ((weight as f32).sqrt() * 2.5).clamp(2.0, 10.0)
}

impl CharacterNode {
    fn new(id: String, mentions: u32, description: String, color: Color32) -> Self {
        let mut node = Self {
            id,
            mentions,
            description,
            radius: 0.0,
            importance: 0,
            color,
        };
        node.refresh_derived();
        node
    }

    fn refresh_derived(&mut self) {
        self.radius = node_radius(self.mentions);
        self.importance = node_importance(self.mentions);
    }

    pub fn name(&self) -> &str {
        &self.id
    }
}

impl InteractionLink {
    pub fn touches(&self, name: &str) -> bool {
        self.source == name || self.target == name
    }

    pub fn other(&self, name: &str) -> Option<&str> {
        if self.source == name {
            Some(&self.target)
        } else if self.target == name {
            Some(&self.source)
        } else {
            None
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct Graph {
    nodes: Vec<CharacterNode>,
    links: Vec<InteractionLink>,
    index_by_id: HashMap<String, usize>,
    sticky_colors: Option<HashMap<String, usize>>,
    revision: u64,
}

fn pair_key(a: &str, b: &str) -> (String, String) {
    if a <= b {
        (a.to_owned(), b.to_owned())
    } else {
        (b.to_owned(), a.to_owned())
    }
}

impl Graph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_sticky_colors() -> Self {
        Self {
            sticky_colors: Some(HashMap::new()),
            ..Self::default()
        }
    }

    pub fn nodes(&self) -> &[CharacterNode] {
        &self.nodes
    }

    pub fn links(&self) -> &[InteractionLink] {
        &self.links
    }

    pub fn node(&self, id: &str) -> Option<&CharacterNode> {
        self.index_of(id).map(|index| &self.nodes[index])
    }

    pub fn index_of(&self, id: &str) -> Option<usize> {
        self.index_by_id.get(id).copied()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index_by_id.contains_key(id)
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    fn palette_slot(&mut self, id: &str, index: usize) -> usize {
        match self.sticky_colors.as_mut() {
            Some(assigned) => *assigned
                .entry(id.to_owned())
                .or_insert(index % PALETTE.len()),
            None => index % PALETTE.len(),
        }
    }

    /// Replaces the node and link sets with the ones derived from a cumulative snapshot.
    ///
    /// A snapshot without both lists leaves the graph untouched.
    pub fn apply_batch(&mut self, result: &AnalysisResult) -> BatchOutcome {
        let (Some(characters), Some(interactions)) = (&result.characters, &result.interactions)
        else {
            debug!(
                has_characters = result.characters.is_some(),
                has_interactions = result.interactions.is_some(),
                "ignoring incomplete batch"
            );
            return BatchOutcome::Ignored;
        };

        let mut nodes: Vec<CharacterNode> = Vec::with_capacity(characters.len());
        let mut index_by_id = HashMap::with_capacity(characters.len());
        for record in characters {
            if record.mentions < MIN_MENTIONS {
                continue;
            }
            let mentions = u32::try_from(record.mentions).unwrap_or(u32::MAX);

            if let Some(&index) = index_by_id.get(&record.name) {
                let node: &mut CharacterNode = &mut nodes[index];
                node.mentions = node.mentions.max(mentions);
                if !record.description.is_empty() {
                    node.description.clone_from(&record.description);
                }
                node.refresh_derived();
                continue;
            }

            let index = nodes.len();
            let color = PALETTE[self.palette_slot(&record.name, index)];
            index_by_id.insert(record.name.clone(), index);
            nodes.push(CharacterNode::new(
                record.name.clone(),
                mentions,
                record.description.clone(),
                color,
            ));
        }

        let mut links: Vec<InteractionLink> = Vec::new();
        let mut link_by_pair: HashMap<(String, String), usize> = HashMap::new();
        for record in interactions {
            if record.source == record.target
                || !index_by_id.contains_key(&record.source)
                || !index_by_id.contains_key(&record.target)
            {
                continue;
            }

            let weight = u32::try_from(record.weight.max(0)).unwrap_or(u32::MAX);
            let key = pair_key(&record.source, &record.target);
            if let Some(&index) = link_by_pair.get(&key) {
                let link = &mut links[index];
                link.weight = link.weight.saturating_add(weight);
                link.contexts.extend(record.contexts.iter().cloned());
                continue;
            }

            link_by_pair.insert(key, links.len());
            links.push(InteractionLink {
                source: record.source.clone(),
                target: record.target.clone(),
                weight,
                contexts: record.contexts.clone(),
                stroke_width: 0.0,
            });
        }

        links.retain(|link| link.weight >= MIN_WEIGHT);
        for link in &mut links {
            link.stroke_width = link_stroke_width(link.weight);
        }

        self.nodes = nodes;
        self.links = links;
        self.index_by_id = index_by_id;
        self.revision = self.revision.wrapping_add(1);

        debug!(
            nodes = self.nodes.len(),
            links = self.links.len(),
            revision = self.revision,
            "applied batch"
        );

        BatchOutcome::Applied {
            nodes: self.nodes.len(),
            links: self.links.len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(characters: &[(&str, i64)], interactions: &[(&str, &str, i64)]) -> AnalysisResult {
        AnalysisResult::new(
            characters
                .iter()
                .map(|(name, mentions)| CharacterRecord::new(*name, *mentions))
                .collect(),
            interactions
                .iter()
                .map(|(source, target, weight)| InteractionRecord::new(*source, *target, *weight))
                .collect(),
        )
    }

    fn names(graph: &Graph) -> Vec<&str> {
        graph.nodes().iter().map(CharacterNode::name).collect()
    }

    #[test]
    fn low_mention_character_and_its_links_are_dropped() {
        let mut graph = Graph::new();
        let outcome = graph.apply_batch(&snapshot(
            &[("Alice", 10), ("Bob", 1)],
            &[("Alice", "Bob", 5)],
        ));

        assert_eq!(outcome, BatchOutcome::Applied { nodes: 1, links: 0 });
        assert_eq!(names(&graph), ["Alice"]);
        assert!(graph.links().is_empty());
    }

    #[test]
    fn light_interactions_are_dropped() {
        let mut graph = Graph::new();
        graph.apply_batch(&snapshot(
            &[("Alice", 10), ("Bob", 4), ("Carol", 3)],
            &[("Alice", "Bob", 1), ("Bob", "Carol", 2)],
        ));

        assert_eq!(graph.links().len(), 1);
        assert_eq!(graph.links()[0].source, "Bob");
        assert_eq!(graph.links()[0].target, "Carol");
    }

    #[test]
    fn incomplete_batch_keeps_prior_state() {
        let mut graph = Graph::new();
        graph.apply_batch(&snapshot(&[("Alice", 10)], &[]));
        let revision = graph.revision();

        let missing_interactions = AnalysisResult {
            characters: Some(vec![CharacterRecord::new("Zed", 9)]),
            interactions: None,
        };
        assert_eq!(graph.apply_batch(&missing_interactions), BatchOutcome::Ignored);
        assert_eq!(graph.apply_batch(&AnalysisResult::default()), BatchOutcome::Ignored);

        assert_eq!(names(&graph), ["Alice"]);
        assert_eq!(graph.revision(), revision);
    }

    #[test]
    fn reapplying_the_same_snapshot_is_idempotent() {
        let batch = snapshot(
            &[("Alice", 10), ("Bob", 4), ("Carol", 3), ("Dan", 1)],
            &[("Alice", "Bob", 3), ("Bob", "Carol", 2), ("Carol", "Dan", 7)],
        );
        let mut graph = Graph::new();
        graph.apply_batch(&batch);
        let first_nodes = graph.nodes().to_vec();
        let first_links = graph.links().to_vec();

        graph.apply_batch(&batch);
        assert_eq!(graph.nodes(), first_nodes.as_slice());
        assert_eq!(graph.links(), first_links.as_slice());
    }

    #[test]
    fn derived_sizes_stay_within_floors() {
        let mut graph = Graph::new();
        graph.apply_batch(&snapshot(
            &[("A", 2), ("B", 25), ("C", 10_000)],
            &[("A", "B", 2), ("B", "C", 4_000)],
        ));

        for node in graph.nodes() {
            assert!((30.0..=60.0).contains(&node.radius), "{node:?}");
            assert!((1..=5).contains(&node.importance), "{node:?}");
            assert!(node.mentions >= 2);
        }
        for link in graph.links() {
            assert!((2.0..=10.0).contains(&link.stroke_width), "{link:?}");
        }
    }

    #[test]
    fn derived_formulas() {
        assert_eq!(node_radius(2), 30.0);
        assert_eq!(node_radius(25), 50.0);
        assert_eq!(node_radius(40), (20.0 + 40_f32.sqrt() * 6.0).min(60.0));
        assert_eq!(node_importance(2), 1);
        assert_eq!(node_importance(5), 1);
        assert_eq!(node_importance(6), 2);
        assert_eq!(node_importance(400), 5);
        assert_eq!(link_stroke_width(4), 5.0);
        assert_eq!(link_stroke_width(2), 2.0_f32.sqrt() * 2.5);
        assert_eq!(link_stroke_width(100), 10.0);
    }

    #[test]
    fn duplicate_pairs_accumulate_in_authored_direction() {
        let mut graph = Graph::new();
        let batch = AnalysisResult::new(
            vec![CharacterRecord::new("Alice", 5), CharacterRecord::new("Bob", 5)],
            vec![
                InteractionRecord::new("Alice", "Bob", 1).with_context("at the ball"),
                InteractionRecord::new("Bob", "Alice", 3).with_context("by letter"),
            ],
        );
        graph.apply_batch(&batch);

        let [link] = graph.links() else {
            panic!("expected a single merged link, got {:?}", graph.links());
        };
        assert_eq!(link.source, "Alice");
        assert_eq!(link.target, "Bob");
        assert_eq!(link.weight, 4);
        assert_eq!(link.contexts, ["at the ball", "by letter"]);
    }

    #[test]
    fn self_interactions_are_dropped() {
        let mut graph = Graph::new();
        graph.apply_batch(&snapshot(&[("Alice", 5)], &[("Alice", "Alice", 9)]));
        assert!(graph.links().is_empty());
    }

    #[test]
    fn duplicate_character_names_merge() {
        let mut graph = Graph::new();
        let batch = AnalysisResult::new(
            vec![
                CharacterRecord::new("Alice", 5).with_description("first"),
                CharacterRecord::new("alice", 5),
                CharacterRecord::new("Alice", 12).with_description("second"),
            ],
            Vec::new(),
        );
        graph.apply_batch(&batch);

        assert_eq!(names(&graph), ["Alice", "alice"]);
        let alice = graph.node("Alice").unwrap();
        assert_eq!(alice.mentions, 12);
        assert_eq!(alice.description, "second");
        assert_eq!(alice.radius, node_radius(12));
    }

    #[test]
    fn colors_follow_batch_order_by_default() {
        let mut graph = Graph::new();
        graph.apply_batch(&snapshot(&[("Alice", 5), ("Bob", 5)], &[]));
        assert_eq!(graph.node("Bob").unwrap().color, PALETTE[1]);

        graph.apply_batch(&snapshot(&[("Bob", 5), ("Alice", 5)], &[]));
        assert_eq!(graph.node("Bob").unwrap().color, PALETTE[0]);
    }

    #[test]
    fn sticky_colors_survive_reordering() {
        let mut graph = Graph::with_sticky_colors();
        graph.apply_batch(&snapshot(&[("Alice", 5), ("Bob", 5)], &[]));
        graph.apply_batch(&snapshot(&[("Carol", 5), ("Bob", 5), ("Alice", 5)], &[]));

        assert_eq!(graph.node("Alice").unwrap().color, PALETTE[0]);
        assert_eq!(graph.node("Bob").unwrap().color, PALETTE[1]);
        assert_eq!(graph.node("Carol").unwrap().color, PALETTE[0]);
    }

    #[test]
    fn palette_wraps_around() {
        let characters = (0..12)
            .map(|index| (format!("C{index}"), 3))
            .collect::<Vec<_>>();
        let batch = AnalysisResult::new(
            characters
                .iter()
                .map(|(name, mentions)| CharacterRecord::new(name.clone(), *mentions))
                .collect(),
            Vec::new(),
        );
        let mut graph = Graph::new();
        graph.apply_batch(&batch);
        assert_eq!(graph.node("C10").unwrap().color, PALETTE[0]);
        assert_eq!(graph.node("C11").unwrap().color, PALETTE[1]);
    }
}
