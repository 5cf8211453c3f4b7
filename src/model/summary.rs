use std::collections::HashMap;

use super::Graph;

pub const MAX_PARTNERS: usize = 8;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Partner {
    pub name: String,
    pub weight: u32,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CharacterSummary {
    pub name: String,
    pub total_interactions: u64,
    pub partners: Vec<Partner>,
}

pub fn interaction_summary(graph: &Graph) -> Vec<CharacterSummary> {
    let mut partners_by_index: HashMap<usize, Vec<Partner>> = HashMap::new();
    let mut totals = vec![0u64; graph.nodes().len()];

    for link in graph.links() {
        let (Some(source), Some(target)) = (graph.index_of(&link.source), graph.index_of(&link.target))
        else {
            continue;
        };

        totals[source] += u64::from(link.weight);
        totals[target] += u64::from(link.weight);
        partners_by_index.entry(source).or_default().push(Partner {
            name: link.target.clone(),
            weight: link.weight,
        });
        partners_by_index.entry(target).or_default().push(Partner {
            name: link.source.clone(),
            weight: link.weight,
        });
    }

    let mut summary = graph
        .nodes()
        .iter()
        .enumerate()
        .map(|(index, node)| {
            let mut partners = partners_by_index.remove(&index).unwrap_or_default();
            partners.sort_by(|a, b| b.weight.cmp(&a.weight));
            partners.truncate(MAX_PARTNERS);

            CharacterSummary {
                name: node.id.clone(),
                total_interactions: totals[index],
                partners,
            }
        })
        .collect::<Vec<_>>();

    summary.sort_by(|a, b| b.total_interactions.cmp(&a.total_interactions));
    summary
}
