//! Aggregates derived from a board snapshot.
//!
//! `DerivedStats` is rebuilt from scratch by the rule engine after every
//! placement and stored next to the cells it describes. It is never patched
//! in place; a new snapshot gets a new value.

use crate::game_state::game_state::GameState;
use crate::game_state::game_types::{Placement, Player};

pub const NO_GROUP: u32 = u32::MAX;

/// Connected-component labelling of the stones on a board.
#[derive(Debug, Clone)]
pub struct GroupMap {
    /// Group id per grid cell, `NO_GROUP` for empty or off-board cells.
    pub ids: Vec<u32>,
    pub sizes: Vec<usize>,
    pub owners: Vec<Player>,
    /// Distinct groups touching each group. Same-owner stones that touch are
    /// one group, so these are always enemy groups.
    pub touching: Vec<Vec<u32>>,
}

impl GroupMap {
    pub fn build(state: &GameState) -> Self {
        let width = state.grid_width();
        let mut ids = vec![NO_GROUP; width * width];
        let mut sizes = Vec::new();
        let mut owners = Vec::new();
        let mut stack = Vec::new();

        for start in state.on_board_cells() {
            let start_idx = state.cell_index(start);
            if ids[start_idx] != NO_GROUP {
                continue;
            }
            let Some(owner) = state.owner(start) else {
                continue;
            };

            let id = sizes.len() as u32;
            let mut size = 0usize;
            ids[start_idx] = id;
            stack.push(start);
            while let Some(p) = stack.pop() {
                size += 1;
                for n in state.neighbors(p) {
                    let n_idx = state.cell_index(n);
                    if ids[n_idx] == NO_GROUP && state.owner(n) == Some(owner) {
                        ids[n_idx] = id;
                        stack.push(n);
                    }
                }
            }
            sizes.push(size);
            owners.push(owner);
        }

        let mut touching = vec![Vec::new(); sizes.len()];
        for p in state.on_board_cells() {
            let id = ids[state.cell_index(p)];
            if id == NO_GROUP {
                continue;
            }
            for n in state.neighbors(p) {
                let other = ids[state.cell_index(n)];
                if other != NO_GROUP && other != id && !touching[id as usize].contains(&other) {
                    touching[id as usize].push(other);
                }
            }
        }

        Self {
            ids,
            sizes,
            owners,
            touching,
        }
    }

    #[inline]
    pub fn group_at(&self, state: &GameState, p: Placement) -> Option<u32> {
        let id = self.ids[state.cell_index(p)];
        (id != NO_GROUP).then_some(id)
    }

    #[inline]
    pub fn size_of(&self, id: u32) -> usize {
        self.sizes[id as usize]
    }

    #[inline]
    pub fn owner_of(&self, id: u32) -> Player {
        self.owners[id as usize]
    }

    /// Distinct groups touching `p`, in neighbour order.
    pub fn adjacent_groups(&self, state: &GameState, p: Placement) -> Vec<u32> {
        let mut out: Vec<u32> = Vec::with_capacity(6);
        for n in state.neighbors(p) {
            if let Some(id) = self.group_at(state, n) {
                if !out.contains(&id) {
                    out.push(id);
                }
            }
        }
        out
    }

    #[inline]
    pub fn touching_groups(&self, id: u32) -> &[u32] {
        &self.touching[id as usize]
    }

    pub fn group_count(&self) -> usize {
        self.sizes.len()
    }
}

/// Read-only aggregates over one board snapshot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DerivedStats {
    pub stones: [usize; 2],
    pub largest_group: [usize; 2],
    pub group_count: [usize; 2],
    pub singletons: [usize; 2],
    pub empty_cells: usize,
    pub last_placement_captured: bool,
    pub last_capture_size: usize,
}

impl DerivedStats {
    pub fn compute(state: &GameState, last_capture_size: usize) -> Self {
        let groups = GroupMap::build(state);
        let mut stats = DerivedStats {
            last_placement_captured: last_capture_size > 0,
            last_capture_size,
            ..DerivedStats::default()
        };

        for (id, &size) in groups.sizes.iter().enumerate() {
            let owner = groups.owners[id].index();
            stats.stones[owner] += size;
            stats.group_count[owner] += 1;
            stats.largest_group[owner] = stats.largest_group[owner].max(size);
            if size == 1 {
                stats.singletons[owner] += 1;
            }
        }

        let total = state.on_board_cells().count();
        stats.empty_cells = total - stats.stones[0] - stats.stones[1];
        stats
    }

    #[inline]
    pub fn stones_of(&self, player: Player) -> usize {
        self.stones[player.index()]
    }

    #[inline]
    pub fn largest_group_of(&self, player: Player) -> usize {
        self.largest_group[player.index()]
    }

    #[inline]
    pub fn groups_of(&self, player: Player) -> usize {
        self.group_count[player.index()]
    }

    #[inline]
    pub fn singletons_of(&self, player: Player) -> usize {
        self.singletons[player.index()]
    }

    /// Fraction of on-board cells holding a stone.
    pub fn fill_ratio(&self) -> f64 {
        let occupied = self.stones[0] + self.stones[1];
        let total = occupied + self.empty_cells;
        if total == 0 {
            0.0
        } else {
            occupied as f64 / total as f64
        }
    }
}
