//! Dependency graph over a set of matters

use std::collections::{BTreeMap, BTreeSet, HashSet};

use serde::Serialize;

use crate::error::Result;
use crate::matter::{Matter, RelationType, Status};
use crate::repository::MatterStore;
use crate::search::MatterFilter;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GraphNode {
    pub id: String,
    pub title: String,
    pub status: Status,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GraphEdge {
    pub from: String,
    pub to: String,
    #[serde(rename = "type")]
    pub rel: RelationType,
}

/// Open matters and the `blocks`/`relates` edges among them
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Graph {
    pub nodes: Vec<GraphNode>,
    pub edges: Vec<GraphEdge>,
}

impl Graph {
    /// Graph over `ids`. Unknown ids and terminal matters are left out,
    /// as are edges leading outside the included nodes.
    pub fn build<I, S>(store: &MatterStore, ids: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let ids: BTreeSet<String> = ids.into_iter().map(Into::into).collect();

        let mut included: BTreeMap<String, Matter> = BTreeMap::new();
        for id in ids {
            match store.get(&id) {
                Ok(matter) if !matter.is_terminal() => {
                    included.insert(id, matter);
                }
                Ok(_) => {}
                Err(e) if e.is_not_found() => {}
                Err(e) => log::warn!("graph skipping {}: {}", id, e),
            }
        }

        let mut graph = Graph {
            nodes: included
                .values()
                .map(|m| GraphNode {
                    id: m.id.clone(),
                    title: m.title.clone(),
                    status: m.status,
                })
                .collect(),
            edges: Vec::new(),
        };

        let mut seen: HashSet<(&str, &str, RelationType)> = HashSet::new();
        for (id, matter) in &included {
            let id = id.as_str();
            for target in matter.blocks.iter().map(String::as_str) {
                if included.contains_key(target) && seen.insert((id, target, RelationType::Blocks)) {
                    graph.edges.push(edge(id, target, RelationType::Blocks));
                }
            }
            // one edge per unordered pair
            for target in matter.relates.iter().map(String::as_str) {
                if !included.contains_key(target)
                    || seen.contains(&(target, id, RelationType::Relates))
                {
                    continue;
                }
                if seen.insert((id, target, RelationType::Relates)) {
                    graph.edges.push(edge(id, target, RelationType::Relates));
                }
            }
        }
        Ok(graph)
    }

    /// Every matter on the docket
    pub fn docket(store: &MatterStore) -> Result<Self> {
        let entries = store.docket().load()?;
        Self::build(store, entries.into_iter().map(|e| e.id))
    }

    /// Every matter in the store
    pub fn all(store: &MatterStore) -> Result<Self> {
        let matters = store.list(&MatterFilter::default())?;
        Self::build(store, matters.into_iter().map(|m| m.id))
    }

    /// One matter and everything it references directly
    pub fn around(store: &MatterStore, id: &str) -> Result<Self> {
        let matter = store.get(id)?;
        let mut ids = vec![matter.id.clone()];
        ids.extend(matter.references().map(|(_, target)| target.to_string()));
        Self::build(store, ids)
    }
}

fn edge(from: &str, to: &str, rel: RelationType) -> GraphEdge {
    GraphEdge {
        from: from.to_string(),
        to: to.to_string(),
        rel,
    }
}
