use tracing::debug;

use crate::model::Graph;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum NodeState {
    #[default]
    Default,
    Selected,
    Connected,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum LinkState {
    #[default]
    Default,
    Active,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct VisualState {
    pub nodes: Vec<NodeState>,
    pub links: Vec<LinkState>,
}

impl VisualState {
    pub fn is_active(&self) -> bool {
        self.nodes.iter().any(|state| *state == NodeState::Selected)
    }

    pub fn node(&self, index: usize) -> NodeState {
        self.nodes.get(index).copied().unwrap_or_default()
    }

    pub fn link(&self, index: usize) -> LinkState {
        self.links.get(index).copied().unwrap_or_default()
    }
}

pub fn compute_visual_state(graph: &Graph, selection: Option<&str>) -> VisualState {
    let mut state = VisualState {
        nodes: vec![NodeState::Default; graph.nodes().len()],
        links: vec![LinkState::Default; graph.links().len()],
    };

    let Some(selected) = selection else {
        return state;
    };
    let Some(selected_index) = graph.index_of(selected) else {
        return state;
    };

    state.nodes[selected_index] = NodeState::Selected;
    for (link_index, link) in graph.links().iter().enumerate() {
        let Some(other) = link.other(selected) else {
            continue;
        };
        state.links[link_index] = LinkState::Active;
        if let Some(other_index) = graph.index_of(other)
            && other_index != selected_index
        {
            state.nodes[other_index] = NodeState::Connected;
        }
    }

    state
}

#[derive(Clone, Debug, Default)]
pub struct HighlightCoordinator {
    selection: Option<String>,
}

impl HighlightCoordinator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn selection(&self) -> Option<&str> {
        self.selection.as_deref()
    }

    pub fn set_highlight(&mut self, name: Option<&str>) -> bool {
        if self.selection.as_deref() == name {
            return false;
        }
        debug!(selection = name, "highlight changed");
        self.selection = name.map(str::to_owned);
        true
    }

    pub fn visual_state(&self, graph: &Graph) -> VisualState {
        compute_visual_state(graph, self.selection())
    }
}
