// SPDX-License-Identifier: MIT OR Apache-2.0
//! Layered placement of the members of a single scope.
//!
//! Members are indexed by insertion order; every tie below falls back to
//! that index so repeated runs on an unchanged graph agree.

use super::DirectionBias;
use crate::node::NodeId;
use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap};

/// Number of down/up median sweeps when ordering columns
const ORDER_PASSES: usize = 4;

/// Members of one scope placed relative to the scope's content origin
#[derive(Debug, Default)]
pub(super) struct Arrangement {
    /// Top-left offset of every member
    pub offsets: Vec<(NodeId, [f32; 2])>,
    /// Size of the box enclosing every member
    pub size: [f32; 2],
}

/// Place `members` in columns, left to right.
///
/// `sizes` holds the effective size of each member; `edges` are the
/// connections visible at this scope, already lifted to members.
pub(super) fn arrange(
    members: &[NodeId],
    sizes: &HashMap<NodeId, [f32; 2]>,
    edges: &[(NodeId, NodeId)],
    bias: DirectionBias,
    gap: f32,
) -> Arrangement {
    if members.is_empty() {
        return Arrangement::default();
    }

    let index: HashMap<NodeId, usize> = members.iter().enumerate().map(|(i, id)| (*id, i)).collect();
    let local_edges: Vec<(usize, usize)> = match bias {
        DirectionBias::LeftToRight => edges
            .iter()
            .filter_map(|(from, to)| Some((*index.get(from)?, *index.get(to)?)))
            .filter(|(from, to)| from != to)
            .collect(),
        DirectionBias::None => Vec::new(),
    };

    let ranks = match bias {
        DirectionBias::LeftToRight => compute_ranks(members.len(), &local_edges),
        DirectionBias::None => (0..members.len()).collect(),
    };

    let rank_count = ranks.iter().copied().max().unwrap_or(0) + 1;
    let mut columns: Vec<Vec<usize>> = vec![Vec::new(); rank_count];
    for (member, rank) in ranks.iter().enumerate() {
        columns[*rank].push(member);
    }
    columns.retain(|column| !column.is_empty());
    order_columns(&mut columns, &local_edges);

    let size_of = |member: usize| sizes.get(&members[member]).copied().unwrap_or([0.0, 0.0]);
    let column_extent = |column: &[usize]| {
        let width = column.iter().map(|m| size_of(*m)[0]).fold(0.0_f32, f32::max);
        let height = column.iter().map(|m| size_of(*m)[1]).sum::<f32>()
            + gap * column.len().saturating_sub(1) as f32;
        [width, height]
    };
    let extents: Vec<[f32; 2]> = columns.iter().map(|c| column_extent(c.as_slice())).collect();

    let content_height = extents.iter().map(|e| e[1]).fold(0.0_f32, f32::max);
    let content_width = extents.iter().map(|e| e[0]).sum::<f32>()
        + gap * columns.len().saturating_sub(1) as f32;

    let mut offsets = Vec::with_capacity(members.len());
    let mut x = 0.0;
    for (column, extent) in columns.iter().zip(&extents) {
        // Center each column vertically against the tallest one
        let mut y = (content_height - extent[1]) / 2.0;
        for member in column {
            let size = size_of(*member);
            offsets.push((members[*member], [x, y]));
            y += size[1] + gap;
        }
        x += extent[0] + gap;
    }

    Arrangement {
        offsets,
        size: [content_width, content_height],
    }
}

/// Longest-path ranks over `edges`.
///
/// Sources are drained in insertion order. When only cycles remain, the
/// earliest remaining member is taken next and its incoming edges are
/// treated as back edges.
pub(super) fn compute_ranks(count: usize, edges: &[(usize, usize)]) -> Vec<usize> {
    let mut adj: Vec<Vec<usize>> = vec![Vec::new(); count];
    let mut indeg = vec![0usize; count];
    for (from, to) in edges {
        adj[*from].push(*to);
        indeg[*to] += 1;
    }

    let mut ready: BinaryHeap<Reverse<usize>> = (0..count)
        .filter(|i| indeg[*i] == 0)
        .map(Reverse)
        .collect();
    let mut processed = vec![false; count];
    let mut order = Vec::with_capacity(count);

    while order.len() < count {
        while let Some(Reverse(node)) = ready.pop() {
            if processed[node] {
                continue;
            }
            processed[node] = true;
            order.push(node);
            for next in &adj[node] {
                if processed[*next] {
                    continue;
                }
                indeg[*next] = indeg[*next].saturating_sub(1);
                if indeg[*next] == 0 {
                    ready.push(Reverse(*next));
                }
            }
        }
        if let Some(first) = (0..count).find(|i| !processed[*i]) {
            ready.push(Reverse(first));
        }
    }

    let mut position = vec![0usize; count];
    for (pos, node) in order.iter().enumerate() {
        position[*node] = pos;
    }

    let mut ranks = vec![0usize; count];
    for node in &order {
        for next in &adj[*node] {
            if position[*next] > position[*node] {
                ranks[*next] = ranks[*next].max(ranks[*node] + 1);
            }
        }
    }
    ranks
}

/// Reorder each column by the median position of its neighbours in the
/// adjacent column, sweeping forward over incoming edges and backward over
/// outgoing ones.
pub(super) fn order_columns(columns: &mut [Vec<usize>], edges: &[(usize, usize)]) {
    if columns.len() <= 1 || edges.is_empty() {
        return;
    }

    let mut incoming: HashMap<usize, Vec<usize>> = HashMap::new();
    let mut outgoing: HashMap<usize, Vec<usize>> = HashMap::new();
    for (from, to) in edges {
        outgoing.entry(*from).or_default().push(*to);
        incoming.entry(*to).or_default().push(*from);
    }

    let mut positions: HashMap<usize, usize> = HashMap::new();
    let update_positions = |columns: &[Vec<usize>], positions: &mut HashMap<usize, usize>| {
        positions.clear();
        for column in columns {
            for (idx, member) in column.iter().enumerate() {
                positions.insert(*member, idx);
            }
        }
    };
    update_positions(&*columns, &mut positions);

    let sort_column = |column: &mut Vec<usize>,
                       neighbors: &HashMap<usize, Vec<usize>>,
                       positions: &HashMap<usize, usize>| {
        let current: HashMap<usize, usize> =
            column.iter().enumerate().map(|(idx, m)| (*m, idx)).collect();
        column.sort_by(|a, b| {
            let a_score = median_position(*a, neighbors, positions, current[a]);
            let b_score = median_position(*b, neighbors, positions, current[b]);
            a_score
                .total_cmp(&b_score)
                .then_with(|| current[a].cmp(&current[b]))
                .then_with(|| a.cmp(b))
        });
    };

    for _ in 0..ORDER_PASSES {
        for idx in 1..columns.len() {
            if columns[idx].len() > 1 {
                sort_column(&mut columns[idx], &incoming, &positions);
                update_positions(&*columns, &mut positions);
            }
        }
        for idx in (0..columns.len() - 1).rev() {
            if columns[idx].len() > 1 {
                sort_column(&mut columns[idx], &outgoing, &positions);
                update_positions(&*columns, &mut positions);
            }
        }
    }
}

fn median_position(
    member: usize,
    neighbors: &HashMap<usize, Vec<usize>>,
    positions: &HashMap<usize, usize>,
    fallback: usize,
) -> f32 {
    let mut values: Vec<f32> = neighbors
        .get(&member)
        .map(|list| {
            list.iter()
                .filter_map(|n| positions.get(n))
                .map(|p| *p as f32)
                .collect()
        })
        .unwrap_or_default();
    if values.is_empty() {
        return fallback as f32;
    }
    values.sort_by(f32::total_cmp);
    let mid = values.len() / 2;
    if values.len() % 2 == 1 {
        values[mid]
    } else {
        (values[mid - 1] + values[mid]) * 0.5
    }
}
