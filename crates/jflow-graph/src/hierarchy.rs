//! Type-hierarchy index.
//!
//! Direct relations are stored as `TypeEdge` values keyed by erased class
//! name in both directions; transitive walks are BFS with a visited set and
//! return deduplicated sequences in discovery order.

use crate::edge::TypeRelation;
use jflow_common::descriptor::TypeDescriptor;
use rustc_hash::{FxHashMap, FxHashSet};
use serde::Serialize;
use std::collections::VecDeque;

/// A direct type relation, from subtype to supertype.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TypeEdge {
    pub subtype: TypeDescriptor,
    pub supertype: TypeDescriptor,
    pub relation: TypeRelation,
}

#[derive(Clone, Copy)]
enum Direction {
    Up,
    Down,
}

/// Direct super/sub maps plus transitive walkers.
#[derive(Debug, Default)]
pub struct TypeHierarchy {
    edges: Vec<TypeEdge>,
    supers: FxHashMap<String, Vec<usize>>,
    subs: FxHashMap<String, Vec<usize>>,
}

impl TypeHierarchy {
    pub(crate) fn insert(
        &mut self,
        subtype: TypeDescriptor,
        supertype: TypeDescriptor,
        relation: TypeRelation,
    ) {
        let index = self.edges.len();
        self.supers
            .entry(subtype.class_name.clone())
            .or_default()
            .push(index);
        self.subs
            .entry(supertype.class_name.clone())
            .or_default()
            .push(index);
        self.edges.push(TypeEdge {
            subtype,
            supertype,
            relation,
        });
    }

    /// Direct supertypes (extends + implements) of `class_name`, in
    /// insertion order.
    pub fn supertypes(&self, class_name: &str) -> impl Iterator<Item = &TypeDescriptor> {
        self.supers
            .get(class_name)
            .into_iter()
            .flatten()
            .map(|&i| &self.edges[i].supertype)
    }

    /// Direct subtypes of `class_name`, in insertion order.
    pub fn subtypes(&self, class_name: &str) -> impl Iterator<Item = &TypeDescriptor> {
        self.subs
            .get(class_name)
            .into_iter()
            .flatten()
            .map(|&i| &self.edges[i].subtype)
    }

    /// All direct relations, in insertion order.
    #[must_use]
    pub fn edges(&self) -> &[TypeEdge] {
        &self.edges
    }

    /// Transitive supertypes in BFS discovery order, deduplicated, not
    /// including `class_name` itself.
    #[must_use]
    pub fn transitive_supertypes(&self, class_name: &str) -> Vec<TypeDescriptor> {
        self.walk(class_name, Direction::Up)
    }

    /// Transitive subtypes in BFS discovery order, deduplicated, not
    /// including `class_name` itself.
    #[must_use]
    pub fn transitive_subtypes(&self, class_name: &str) -> Vec<TypeDescriptor> {
        self.walk(class_name, Direction::Down)
    }

    /// Whether `sub` is `sup` or a transitive subtype of it.
    #[must_use]
    pub fn is_subtype_of(&self, sub: &str, sup: &str) -> bool {
        if sub == sup {
            return true;
        }
        self.transitive_supertypes(sub)
            .iter()
            .any(|t| t.class_name == sup)
    }

    fn walk(&self, start: &str, direction: Direction) -> Vec<TypeDescriptor> {
        let mut visited: FxHashSet<String> = FxHashSet::default();
        visited.insert(start.to_string());
        let mut queue: VecDeque<String> = VecDeque::new();
        queue.push_back(start.to_string());
        let mut result: Vec<TypeDescriptor> = Vec::new();
        while let Some(current) = queue.pop_front() {
            let neighbors: Vec<&TypeDescriptor> = match direction {
                Direction::Up => self.supertypes(&current).collect(),
                Direction::Down => self.subtypes(&current).collect(),
            };
            for next in neighbors {
                if visited.insert(next.class_name.clone()) {
                    result.push(next.clone());
                    queue.push_back(next.class_name.clone());
                }
            }
        }
        result
    }

    /// Detect a cycle across combined `Extends`/`Implements` relations.
    /// Returns a class on a cycle, if any. Type relations must form a DAG.
    #[must_use]
    pub(crate) fn find_cycle(&self) -> Option<String> {
        // Kahn-style elimination: repeatedly drop classes with no remaining
        // supertype edges; anything left participates in a cycle.
        let mut out_degree: FxHashMap<&str, usize> = FxHashMap::default();
        let mut dependents: FxHashMap<&str, Vec<&str>> = FxHashMap::default();
        for edge in &self.edges {
            *out_degree.entry(&edge.subtype.class_name).or_insert(0) += 1;
            out_degree.entry(&edge.supertype.class_name).or_insert(0);
            dependents
                .entry(&edge.supertype.class_name)
                .or_default()
                .push(&edge.subtype.class_name);
        }
        let mut queue: VecDeque<&str> = out_degree
            .iter()
            .filter(|(_, d)| **d == 0)
            .map(|(c, _)| *c)
            .collect();
        let mut remaining = out_degree.len();
        while let Some(current) = queue.pop_front() {
            remaining -= 1;
            for &dependent in dependents.get(current).into_iter().flatten() {
                if let Some(degree) = out_degree.get_mut(dependent) {
                    *degree -= 1;
                    if *degree == 0 {
                        queue.push_back(dependent);
                    }
                }
            }
        }
        if remaining == 0 {
            return None;
        }
        out_degree
            .into_iter()
            .find(|(_, d)| *d > 0)
            .map(|(c, _)| c.to_string())
    }
}
