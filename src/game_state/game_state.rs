//! Oust board state and placement rules.
//!
//! `GameState` is the rule engine the decision core talks to. It owns the
//! cells, the side to move, the game result, an incrementally maintained
//! Zobrist fingerprint and the `DerivedStats` snapshot of the current cells.
//!
//! Placement rules:
//! - a stone that touches no friendly stone is a quiet placement and always
//!   legal; the turn passes to the opponent;
//! - a stone that touches friendly stones merges them into one group, which
//!   must touch at least one enemy group and be strictly larger than every
//!   enemy group it touches. Those enemy groups are captured and the same
//!   player places again;
//! - capturing the opponent's last stone wins the game.

use crate::errors::{OustError, OustResult};
use crate::game_state::derived_stats::{DerivedStats, GroupMap};
use crate::game_state::game_types::{Geometry, Placement, Player};
use crate::search::zobrist::{compute_zobrist_key, side_to_move_key, stone_key, MAX_GRID_WIDTH};

/// What a single placement did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlacementOutcome {
    pub captured: usize,
    pub mover_continues: bool,
    pub game_over: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum PlacementKind {
    Quiet,
    Capture { enemy_groups: Vec<u32> },
}

#[derive(Debug, Clone)]
pub struct GameState {
    geometry: Geometry,
    side: usize,
    width: usize,
    cells: Vec<Option<Player>>,

    side_to_move: Player,
    game_over: bool,
    winner: Option<Player>,
    consecutive_passes: u8,
    placements_made: u32,

    zobrist_key: u64,
    stats: DerivedStats,
}

impl GameState {
    /// Empty board, Black to move.
    pub fn new(geometry: Geometry, side: usize) -> OustResult<Self> {
        Self::validate_size(geometry, side)?;
        let width = geometry.grid_width(side);
        Self::from_cells(geometry, side, vec![None; width * width], Player::Black)
    }

    /// The native Oust board: a hexagon of side 7.
    #[inline]
    pub fn new_game() -> Self {
        Self::new(Geometry::Hex, 7).expect("side 7 hex board fits the fingerprint tables")
    }

    /// Build a position from raw grid cells (row-major, `width * width`).
    ///
    /// Off-board cells must be empty. The position is assumed to be
    /// mid-game: it is never considered over on construction.
    pub fn from_cells(
        geometry: Geometry,
        side: usize,
        cells: Vec<Option<Player>>,
        side_to_move: Player,
    ) -> OustResult<Self> {
        Self::validate_size(geometry, side)?;
        let width = geometry.grid_width(side);
        if cells.len() != width * width {
            return Err(OustError::InvalidBoardLayout(format!(
                "expected {} cells, got {}",
                width * width,
                cells.len()
            )));
        }

        let mut state = Self {
            geometry,
            side,
            width,
            cells,
            side_to_move,
            game_over: false,
            winner: None,
            consecutive_passes: 0,
            placements_made: 0,
            zobrist_key: 0,
            stats: DerivedStats::default(),
        };

        for idx in 0..state.cells.len() {
            let p = Placement::new((idx / width) as u8, (idx % width) as u8);
            if state.cells[idx].is_some() && !state.is_on_board(p) {
                return Err(OustError::OutOfBounds(p));
            }
        }

        state.placements_made = state.cells.iter().filter(|c| c.is_some()).count() as u32;
        state.zobrist_key = compute_zobrist_key(&state);
        state.stats = DerivedStats::compute(&state, 0);
        Ok(state)
    }

    fn validate_size(geometry: Geometry, side: usize) -> OustResult<()> {
        if side < 2 || side > MAX_GRID_WIDTH || geometry.grid_width(side) > MAX_GRID_WIDTH {
            return Err(OustError::InvalidBoardSize(side));
        }
        Ok(())
    }

    // --- Read access ---

    #[inline]
    pub fn geometry(&self) -> Geometry {
        self.geometry
    }

    /// Board side length (hexagon side for `Hex`).
    #[inline]
    pub fn side(&self) -> usize {
        self.side
    }

    #[inline]
    pub fn grid_width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn side_to_move(&self) -> Player {
        self.side_to_move
    }

    #[inline]
    pub fn is_game_over(&self) -> bool {
        self.game_over
    }

    #[inline]
    pub fn winner(&self) -> Option<Player> {
        self.winner
    }

    #[inline]
    pub fn stats(&self) -> &DerivedStats {
        &self.stats
    }

    #[inline]
    pub fn stones(&self, player: Player) -> usize {
        self.stats.stones_of(player)
    }

    #[inline]
    pub fn placements_made(&self) -> u32 {
        self.placements_made
    }

    /// Fingerprint of cells plus side to move, for transposition lookups.
    #[inline]
    pub fn fingerprint(&self) -> u64 {
        self.zobrist_key
    }

    #[inline]
    pub fn is_on_board(&self, p: Placement) -> bool {
        self.geometry
            .contains(self.side, isize::from(p.row), isize::from(p.col))
    }

    #[inline]
    pub(crate) fn cell_index(&self, p: Placement) -> usize {
        usize::from(p.row) * self.width + usize::from(p.col)
    }

    /// Owner of a cell; `None` for empty or off-board cells.
    #[inline]
    pub fn owner(&self, p: Placement) -> Option<Player> {
        if !self.is_on_board(p) {
            return None;
        }
        self.cells[self.cell_index(p)]
    }

    /// On-board neighbours of `p` under the board geometry.
    pub fn neighbors(&self, p: Placement) -> impl Iterator<Item = Placement> + '_ {
        let row = isize::from(p.row);
        let col = isize::from(p.col);
        self.geometry
            .directions()
            .iter()
            .filter_map(move |&(dr, dc)| {
                let r = row + isize::from(dr);
                let c = col + isize::from(dc);
                self.geometry
                    .contains(self.side, r, c)
                    .then(|| Placement::new(r as u8, c as u8))
            })
    }

    /// Every on-board cell in row-major order.
    pub fn on_board_cells(&self) -> impl Iterator<Item = Placement> + '_ {
        let width = self.width;
        (0..width * width)
            .map(move |idx| Placement::new((idx / width) as u8, (idx % width) as u8))
            .filter(move |&p| self.is_on_board(p))
    }

    /// True if `p` touches a stone of `player`, i.e. placing there would have
    /// to capture to be legal.
    pub fn touches_own_stone(&self, p: Placement, player: Player) -> bool {
        self.neighbors(p).any(|n| self.owner(n) == Some(player))
    }

    /// True if `p` touches a stone of `player`'s opponent.
    pub fn touches_enemy_stone(&self, p: Placement, player: Player) -> bool {
        let enemy = player.opposite();
        self.neighbors(p).any(|n| self.owner(n) == Some(enemy))
    }

    // --- Legality ---

    fn classify(
        &self,
        groups: &GroupMap,
        p: Placement,
        mover: Player,
    ) -> OustResult<PlacementKind> {
        if !self.is_on_board(p) {
            return Err(OustError::OutOfBounds(p));
        }
        if self.cells[self.cell_index(p)].is_some() {
            return Err(OustError::CellOccupied(p));
        }

        let touching = groups.adjacent_groups(self, p);
        let own_groups: Vec<u32> = touching
            .iter()
            .copied()
            .filter(|&id| groups.owner_of(id) == mover)
            .collect();
        if own_groups.is_empty() {
            return Ok(PlacementKind::Quiet);
        }

        let merged_size = 1 + own_groups.iter().map(|&id| groups.size_of(id)).sum::<usize>();

        // Enemy groups touching the merged group, not just the new stone.
        let mut enemy_groups: Vec<u32> = touching
            .iter()
            .copied()
            .filter(|&id| groups.owner_of(id) != mover)
            .collect();
        for &own in &own_groups {
            for &id in groups.touching_groups(own) {
                if !enemy_groups.contains(&id) {
                    enemy_groups.push(id);
                }
            }
        }

        if enemy_groups.is_empty() {
            return Err(OustError::IllegalPlacement {
                placement: p,
                reason: "merged group does not touch an enemy group",
            });
        }
        if enemy_groups
            .iter()
            .any(|&id| groups.size_of(id) >= merged_size)
        {
            return Err(OustError::IllegalPlacement {
                placement: p,
                reason: "merged group is not larger than every touching enemy group",
            });
        }
        Ok(PlacementKind::Capture { enemy_groups })
    }

    pub fn is_legal(&self, p: Placement) -> bool {
        if self.game_over {
            return false;
        }
        let groups = GroupMap::build(self);
        self.classify(&groups, p, self.side_to_move).is_ok()
    }

    /// Legal placements for the side to move, in row-major order.
    pub fn legal_placements(&self) -> Vec<Placement> {
        if self.game_over {
            return Vec::new();
        }
        let groups = GroupMap::build(self);
        self.on_board_cells()
            .filter(|&p| self.cells[self.cell_index(p)].is_none())
            .filter(|&p| self.classify(&groups, p, self.side_to_move).is_ok())
            .collect()
    }

    /// Placements that would capture if `player` were to move, with the
    /// number of stones each one removes.
    pub fn capturing_placements_for(&self, player: Player) -> Vec<(Placement, usize)> {
        if self.game_over {
            return Vec::new();
        }
        let groups = GroupMap::build(self);
        self.on_board_cells()
            .filter(|&p| self.cells[self.cell_index(p)].is_none())
            .filter_map(|p| match self.classify(&groups, p, player) {
                Ok(PlacementKind::Capture { enemy_groups }) => {
                    Some((p, enemy_groups.iter().map(|&id| groups.size_of(id)).sum()))
                }
                _ => None,
            })
            .collect()
    }

    /// Copy of this position with `player` to move. Used by the evaluator
    /// to look at threats of the side that is not on turn.
    pub fn with_side_to_move(&self, player: Player) -> GameState {
        let mut next = self.clone();
        if next.side_to_move != player {
            next.switch_side();
        }
        next
    }

    // --- Mutation ---

    fn set_cell(&mut self, p: Placement, value: Option<Player>) {
        let idx = self.cell_index(p);
        if let Some(old) = self.cells[idx] {
            self.zobrist_key ^= stone_key(old, idx);
        }
        if let Some(new) = value {
            self.zobrist_key ^= stone_key(new, idx);
        }
        self.cells[idx] = value;
    }

    fn switch_side(&mut self) {
        self.side_to_move = self.side_to_move.opposite();
        self.zobrist_key ^= side_to_move_key();
    }

    fn finish_by_stone_count(&mut self) {
        self.game_over = true;
        let black = self.stats.stones_of(Player::Black);
        let white = self.stats.stones_of(Player::White);
        self.winner = match black.cmp(&white) {
            std::cmp::Ordering::Greater => Some(Player::Black),
            std::cmp::Ordering::Less => Some(Player::White),
            std::cmp::Ordering::Equal => None,
        };
    }

    /// Place a stone for the side to move and resolve captures.
    pub fn apply_placement(&mut self, p: Placement) -> OustResult<PlacementOutcome> {
        if self.game_over {
            return Err(OustError::GameOver);
        }
        let mover = self.side_to_move;
        let groups = GroupMap::build(self);
        let kind = self.classify(&groups, p, mover)?;

        self.set_cell(p, Some(mover));
        let mut captured = 0usize;
        if let PlacementKind::Capture { enemy_groups } = &kind {
            let doomed: Vec<Placement> = self
                .on_board_cells()
                .filter(|&q| {
                    groups
                        .group_at(self, q)
                        .is_some_and(|id| enemy_groups.contains(&id))
                })
                .collect();
            for q in doomed {
                self.set_cell(q, None);
                captured += 1;
            }
        }

        self.placements_made += 1;
        self.consecutive_passes = 0;
        self.stats = DerivedStats::compute(self, captured);

        if captured == 0 {
            self.switch_side();
        } else if self.stats.stones_of(mover.opposite()) == 0 {
            self.game_over = true;
            self.winner = Some(mover);
        } else if self.legal_placements().is_empty() {
            // The capture chain cannot continue; the turn ends here.
            self.switch_side();
            if self.legal_placements().is_empty() {
                self.finish_by_stone_count();
            }
        }

        Ok(PlacementOutcome {
            captured,
            mover_continues: !self.game_over && self.side_to_move == mover,
            game_over: self.game_over,
        })
    }

    /// Pass for a side to move that has no legal placement.
    ///
    /// Two consecutive passes end the game; the player with more stones wins.
    pub fn pass_turn(&mut self) -> OustResult<()> {
        if self.game_over {
            return Err(OustError::GameOver);
        }
        let legal = self.legal_placements().len();
        if legal > 0 {
            return Err(OustError::PassNotAllowed(legal));
        }
        self.consecutive_passes += 1;
        self.switch_side();
        if self.consecutive_passes >= 2 {
            self.finish_by_stone_count();
        }
        Ok(())
    }
}
