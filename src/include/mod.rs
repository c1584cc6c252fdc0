//! Include resolution
//!
//! `include = ["a", "b"]` pulls the sections of `a` then `b` into the
//! including document before its own sections are layered on top. Includes
//! are transitive.
//!
//! The include references form a directed graph. Cycle detection groups it
//! into strongly connected components and the resolution order is a
//! post-order walk. Both use an explicit stack, so a deep or looping include
//! chain is reported, never a stack overflow.

use std::collections::{HashMap, HashSet, VecDeque};

use indexmap::IndexMap;

use crate::document::{union_sections, ConfigDocument, Sections};
use crate::error::SheetError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mark {
    InProgress,
    Done,
}

/// Adjacency list of include references between known documents
#[derive(Debug, Clone, Default)]
pub struct IncludeGraph {
    edges: IndexMap<String, Vec<String>>,
}

impl IncludeGraph {
    /// Build the graph, dropping references to ids that do not exist.
    pub fn build(documents: &[ConfigDocument]) -> (Self, Vec<SheetError>) {
        let known: HashSet<&str> = documents.iter().map(|d| d.id.as_str()).collect();
        let mut errors = Vec::new();
        let mut edges = IndexMap::with_capacity(documents.len());

        for document in documents {
            let mut targets = Vec::with_capacity(document.include.len());
            for include in &document.include {
                if known.contains(include.as_str()) {
                    targets.push(include.clone());
                } else {
                    errors.push(SheetError::UnknownInclude {
                        id: document.id.clone(),
                        include: include.clone(),
                    });
                }
            }
            edges.insert(document.id.clone(), targets);
        }

        (Self { edges }, errors)
    }

    /// Known includes of `id`, in declaration order
    pub fn includes(&self, id: &str) -> &[String] {
        self.edges.get(id).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn len(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    /// Every document that sits on an include cycle, in document order,
    /// with one cycle through it.
    ///
    /// A cycle is the inclusion path from the document back to itself, e.g.
    /// `["a", "b", "a"]`. A self-include is `["a", "a"]`.
    pub fn find_cycles(&self) -> IndexMap<String, Vec<String>> {
        let mut cyclic = IndexMap::new();
        let mut on_cycle: HashMap<&str, usize> = HashMap::new();

        let components = self.components();
        for (n, component) in components.iter().enumerate() {
            let looped = match component.as_slice() {
                [only] => self.includes(only).iter().any(|c| c == only),
                _ => true,
            };
            if looped {
                on_cycle.extend(component.iter().map(|id| (*id, n)));
            }
        }

        for id in self.edges.keys() {
            let Some(&n) = on_cycle.get(id.as_str()) else {
                continue;
            };
            let members: HashSet<&str> = components[n].iter().copied().collect();
            cyclic.insert(id.clone(), self.cycle_through(id, &members));
        }

        cyclic
    }

    /// Strongly connected components, found with an iterative Tarjan walk.
    fn components(&self) -> Vec<Vec<&str>> {
        // (discovery index, lowest reachable index)
        let mut state: HashMap<&str, (usize, usize)> = HashMap::new();
        let mut open: Vec<&str> = Vec::new();
        let mut on_open: HashSet<&str> = HashSet::new();
        let mut components = Vec::new();
        let mut counter = 0;

        for start in self.edges.keys() {
            if state.contains_key(start.as_str()) {
                continue;
            }
            state.insert(start.as_str(), (counter, counter));
            counter += 1;
            open.push(start.as_str());
            on_open.insert(start.as_str());
            let mut stack: Vec<(&str, usize)> = vec![(start.as_str(), 0)];

            while let Some(&(node, next)) = stack.last() {
                if let Some(child) = self.includes(node).get(next) {
                    if let Some(top) = stack.last_mut() {
                        top.1 += 1;
                    }
                    let child = child.as_str();
                    match state.get(child).copied() {
                        None => {
                            state.insert(child, (counter, counter));
                            counter += 1;
                            open.push(child);
                            on_open.insert(child);
                            stack.push((child, 0));
                        }
                        Some((child_index, _)) if on_open.contains(child) => {
                            if let Some(entry) = state.get_mut(node) {
                                entry.1 = entry.1.min(child_index);
                            }
                        }
                        Some(_) => {}
                    }
                    continue;
                }

                stack.pop();
                let Some(&(index, low)) = state.get(node) else {
                    continue;
                };
                if let Some(&(parent, _)) = stack.last() {
                    if let Some(entry) = state.get_mut(parent) {
                        entry.1 = entry.1.min(low);
                    }
                }
                if index == low {
                    let mut component = Vec::new();
                    while let Some(member) = open.pop() {
                        on_open.remove(member);
                        component.push(member);
                        if member == node {
                            break;
                        }
                    }
                    components.push(component);
                }
            }
        }

        components
    }

    /// Shortest include path from `id` back to itself inside `members`
    fn cycle_through(&self, id: &str, members: &HashSet<&str>) -> Vec<String> {
        let mut parent: HashMap<&str, &str> = HashMap::new();
        let mut queue: VecDeque<&str> = VecDeque::from([id]);

        while let Some(node) = queue.pop_front() {
            for child in self.includes(node) {
                let child = child.as_str();
                if child == id {
                    let mut path = vec![id.to_string()];
                    let mut current = node;
                    while current != id {
                        path.push(current.to_string());
                        match parent.get(current) {
                            Some(&up) => current = up,
                            None => break,
                        }
                    }
                    path.push(id.to_string());
                    path.reverse();
                    return path;
                }
                if members.contains(child) && !parent.contains_key(child) {
                    parent.insert(child, node);
                    queue.push_back(child);
                }
            }
        }

        vec![id.to_string(), id.to_string()]
    }

    /// Ids in an order where every include comes before its includer,
    /// skipping `excluded` ids and edges into them.
    pub fn resolution_order<'a>(&'a self, excluded: &HashSet<&str>) -> Vec<&'a str> {
        let mut marks: HashMap<&str, Mark> = HashMap::new();
        let mut order = Vec::with_capacity(self.edges.len());

        for start in self.edges.keys() {
            if excluded.contains(start.as_str()) || marks.contains_key(start.as_str()) {
                continue;
            }
            marks.insert(start.as_str(), Mark::InProgress);
            let mut stack: Vec<(&str, usize)> = vec![(start.as_str(), 0)];

            while let Some(&(node, next)) = stack.last() {
                let Some(child) = self.includes(node).get(next) else {
                    marks.insert(node, Mark::Done);
                    order.push(node);
                    stack.pop();
                    continue;
                };
                if let Some(top) = stack.last_mut() {
                    top.1 += 1;
                }
                if excluded.contains(child.as_str()) || marks.contains_key(child.as_str()) {
                    continue;
                }
                marks.insert(child.as_str(), Mark::InProgress);
                stack.push((child.as_str(), 0));
            }
        }

        order
    }
}

/// Result of include resolution
#[derive(Debug, Clone, Default)]
pub struct ResolveOutcome {
    /// Documents with fully materialized sections, input order preserved.
    /// Documents on an include cycle are absent.
    pub documents: Vec<ConfigDocument>,

    pub errors: Vec<SheetError>,
}

/// Expand every document's includes into its sections.
///
/// - Unknown include ids are dropped from that document with an error
/// - Every document on an include cycle is dropped with an error naming a cycle
///   through it
/// - A reference to a dropped document is removed with its own error
pub fn resolve_includes(documents: Vec<ConfigDocument>) -> ResolveOutcome {
    let (graph, mut errors) = IncludeGraph::build(&documents);

    let cyclic = graph.find_cycles();
    for (id, cycle) in &cyclic {
        errors.push(SheetError::CyclicInclude {
            id: id.clone(),
            cycle: cycle.clone(),
        });
    }

    let excluded: HashSet<&str> = cyclic.keys().map(String::as_str).collect();
    let by_id: HashMap<&str, &ConfigDocument> =
        documents.iter().map(|d| (d.id.as_str(), d)).collect();

    let mut resolved: HashMap<&str, Sections> = HashMap::with_capacity(documents.len());
    for id in graph.resolution_order(&excluded) {
        let Some(document) = by_id.get(id) else {
            continue;
        };
        let mut sections = Sections::new();
        for include in graph.includes(id) {
            if excluded.contains(include.as_str()) {
                errors.push(SheetError::DroppedInclude {
                    id: id.to_string(),
                    include: include.clone(),
                });
                continue;
            }
            if let Some(included) = resolved.get(include.as_str()) {
                union_sections(&mut sections, included.clone());
            }
        }
        union_sections(&mut sections, document.sections.clone());
        resolved.insert(id, sections);
    }

    let mut resolved: HashMap<String, Sections> = resolved
        .into_iter()
        .map(|(id, sections)| (id.to_string(), sections))
        .collect();

    let documents = documents
        .into_iter()
        .filter_map(|mut document| {
            let sections = resolved.remove(&document.id)?;
            document.sections = sections;
            Some(document)
        })
        .collect();

    ResolveOutcome { documents, errors }
}
