//! Generic directed graph used for dependency, component and injection graphs.
//!
//! Vertices are interned into an arena in insertion order, which makes every traversal
//! deterministic. A vertex can be in one of two states: *present*, when it was explicitly put
//! into the graph or is the source of an edge, or *referenced*, when it only appears as an edge
//! target. Referenced-only vertices are reported by [DirectedGraph::find_missing_vertices], which
//! is how unresolved dependencies are detected.

use fxhash::{FxHashMap, FxHashSet};
use std::hash::Hash;

#[derive(Clone, Copy, Eq, PartialEq, Debug)]
enum Color {
    White,
    Gray,
    Black,
}

/// Mutable directed graph. Parallel edges are allowed and kept, since fan-in counts are
/// meaningful to callers.
#[derive(Clone, Debug)]
pub struct DirectedGraph<T> {
    vertices: Vec<T>,
    indices: FxHashMap<T, usize>,
    // None - vertex only referenced as an edge target
    adjacency: Vec<Option<Vec<usize>>>,
}

impl<T> Default for DirectedGraph<T> {
    fn default() -> Self {
        Self {
            vertices: Default::default(),
            indices: Default::default(),
            adjacency: Default::default(),
        }
    }
}

impl<T: Clone + Eq + Hash> DirectedGraph<T> {
    pub fn new() -> Self {
        Self::default()
    }

    fn intern(&mut self, vertex: T) -> usize {
        if let Some(index) = self.indices.get(&vertex) {
            return *index;
        }

        let index = self.vertices.len();
        self.vertices.push(vertex.clone());
        self.adjacency.push(None);
        self.indices.insert(vertex, index);
        index
    }

    fn make_present(&mut self, vertex: T) -> usize {
        let index = self.intern(vertex);
        self.adjacency[index].get_or_insert_with(Vec::new);
        index
    }

    /// Adds a vertex without any edges.
    pub fn put_vertex(&mut self, vertex: T) {
        self.make_present(vertex);
    }

    /// Adds an edge. The source becomes present, while the target is only referenced unless put
    /// explicitly.
    pub fn put_edge(&mut self, from: T, to: T) {
        let from = self.make_present(from);
        let to = self.intern(to);
        if let Some(edges) = &mut self.adjacency[from] {
            edges.push(to);
        }
    }

    /// Adds edges from one source to all given targets.
    pub fn put_edges<I: IntoIterator<Item = T>>(&mut self, from: T, to: I) {
        let from_index = self.make_present(from);
        for target in to {
            let target = self.intern(target);
            if let Some(edges) = &mut self.adjacency[from_index] {
                edges.push(target);
            }
        }
    }

    /// Checks if the vertex is present, i.e. was put explicitly or has outgoing edges.
    #[inline]
    pub fn contains_vertex(&self, vertex: &T) -> bool {
        self.indices
            .get(vertex)
            .map(|index| self.adjacency[*index].is_some())
            .unwrap_or(false)
    }

    /// Checks if the vertex is known to the graph in any way.
    #[inline]
    pub fn is_referenced(&self, vertex: &T) -> bool {
        self.indices.contains_key(vertex)
    }

    /// Iterates over present vertices in insertion order.
    pub fn vertices(&self) -> impl Iterator<Item = &T> + '_ {
        self.vertices
            .iter()
            .zip(self.adjacency.iter())
            .filter_map(|(vertex, edges)| edges.as_ref().map(|_| vertex))
    }

    /// Iterates over targets of edges going out of the given vertex.
    pub fn adjacent_vertices<'a>(&'a self, vertex: &T) -> impl Iterator<Item = &'a T> + 'a {
        self.indices
            .get(vertex)
            .and_then(|index| self.adjacency[*index].as_ref())
            .into_iter()
            .flatten()
            .map(|index| &self.vertices[*index])
    }

    /// Iterates over all edges.
    pub fn edges(&self) -> impl Iterator<Item = (&T, &T)> + '_ {
        self.vertices
            .iter()
            .zip(self.adjacency.iter())
            .flat_map(move |(from, edges)| {
                edges
                    .iter()
                    .flatten()
                    .map(move |to| (from, &self.vertices[*to]))
            })
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// Adds all vertices and edges of another graph to this one.
    pub fn extend(&mut self, other: &DirectedGraph<T>) {
        for (vertex, edges) in other.vertices.iter().zip(other.adjacency.iter()) {
            match edges {
                Some(edges) => self.put_edges(
                    vertex.clone(),
                    edges.iter().map(|index| other.vertices[*index].clone()),
                ),
                None => {
                    self.intern(vertex.clone());
                }
            }
        }
    }

    /// Returns a copy with all edges reversed. All vertices of this graph are present in the
    /// result.
    pub fn reversed(&self) -> DirectedGraph<T> {
        let mut result = DirectedGraph::new();
        for vertex in &self.vertices {
            result.put_vertex(vertex.clone());
        }

        for (from, to) in self.edges() {
            result.put_edge(to.clone(), from.clone());
        }

        result
    }

    /// Returns referenced vertices which are not present.
    pub fn find_missing_vertices(&self) -> Vec<T> {
        self.vertices
            .iter()
            .zip(self.adjacency.iter())
            .filter(|(_, edges)| edges.is_none())
            .map(|(vertex, _)| vertex.clone())
            .collect()
    }

    /// Finds distinct cycles with a depth-first traversal. Each cycle is returned as a path which
    /// starts and ends with the same vertex. Cycles are rotated to start at the vertex inserted
    /// first, so the same closed path reached from different vertices is reported once.
    pub fn find_cycles(&self) -> Vec<Vec<T>> {
        let mut colors = vec![Color::White; self.vertices.len()];
        let mut seen = FxHashSet::default();
        let mut cycles = vec![];

        for start in 0..self.vertices.len() {
            if colors[start] != Color::White {
                continue;
            }

            colors[start] = Color::Gray;

            // (vertex, next edge to examine)
            let mut stack = vec![(start, 0usize)];
            while let Some((vertex, cursor)) = stack.last_mut() {
                let vertex = *vertex;
                let next = self.adjacency[vertex]
                    .as_ref()
                    .and_then(|edges| edges.get(*cursor))
                    .copied();
                *cursor += 1;

                let Some(next) = next else {
                    colors[vertex] = Color::Black;
                    stack.pop();
                    continue;
                };

                match colors[next] {
                    Color::White => {
                        colors[next] = Color::Gray;
                        stack.push((next, 0));
                    }
                    Color::Gray => {
                        let position = stack
                            .iter()
                            .rposition(|(vertex, _)| *vertex == next)
                            .unwrap_or_default();
                        let cycle = normalize_cycle(
                            stack[position..].iter().map(|(vertex, _)| *vertex).collect(),
                        );

                        if seen.insert(cycle.clone()) {
                            cycles.push(
                                cycle
                                    .into_iter()
                                    .map(|index| self.vertices[index].clone())
                                    .collect(),
                            );
                        }
                    }
                    Color::Black => {}
                }
            }
        }

        cycles
    }
}

// Rotates an open cycle to start at the lowest index and closes it.
fn normalize_cycle(mut cycle: Vec<usize>) -> Vec<usize> {
    if let Some(position) = cycle
        .iter()
        .enumerate()
        .min_by_key(|(_, vertex)| **vertex)
        .map(|(position, _)| position)
    {
        cycle.rotate_left(position);
    }

    if let Some(first) = cycle.first().copied() {
        cycle.push(first);
    }

    cycle
}
