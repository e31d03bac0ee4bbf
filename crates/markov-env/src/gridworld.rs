//! Rectangular grid worlds
//!
//! Each cell is a state, indexed in row-major order. From every cell the
//! agent can move up, right, down or left; moves that would leave the board
//! are not offered, and the remaining ones share the probability uniformly.

use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use tracing::debug;

use markov_core::{uniform, Action, Mdp, MdpError, MdpOptions, Result, State, Transition};

/// A move on the board
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Move {
    /// One row up
    Up,
    /// One column right
    Right,
    /// One row down
    Down,
    /// One column left
    Left,
}

impl Move {
    /// All moves, in the order their transitions are listed
    pub const ALL: [Self; 4] = [Self::Up, Self::Right, Self::Down, Self::Left];

    /// Action name of the move
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Up => "U",
            Self::Right => "R",
            Self::Down => "D",
            Self::Left => "L",
        }
    }

    /// The action registered for this move
    #[must_use]
    pub fn action(self) -> Action {
        Action::new(self.name())
    }

    /// Cell reached from `(row, col)`, or `None` off the board
    #[must_use]
    pub fn apply(self, (row, col): Cell, rows: usize, cols: usize) -> Option<Cell> {
        let (row, col) = match self {
            Self::Up => (row.checked_sub(1)?, col),
            Self::Right => (row, col + 1),
            Self::Down => (row + 1, col),
            Self::Left => (row, col.checked_sub(1)?),
        };
        (row < rows && col < cols).then_some((row, col))
    }
}

/// `(row, col)` position on the board
pub type Cell = (usize, usize);

/// The rewarding terminal cell
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Goal {
    /// Position of the goal
    pub cell: Cell,
    /// Reward for reaching it
    pub reward: f32,
}

/// Grid world description; [`GridWorld::build`] turns it into an [`Mdp`].
///
/// Loadable from JSON:
///
/// ```json
/// { "rows": 2, "cols": 3, "holes": [[0, 1]], "goal": { "cell": [1, 2], "reward": 5.0 } }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridWorld {
    /// Number of rows
    pub rows: usize,
    /// Number of columns
    pub cols: usize,
    /// Cell names in row-major order; generated as `r{row}c{col}` when empty
    pub names: Vec<String>,
    /// Cells that carry [`GridWorld::hole_reward`]
    pub holes: Vec<Cell>,
    /// Reward of a hole
    pub hole_reward: f32,
    /// Reward of every other cell
    pub step_reward: f32,
    /// Terminal goal cell, if any
    pub goal: Option<Goal>,
    /// Discount rate of the built MDP
    pub discount_rate: f32,
}

impl Default for GridWorld {
    fn default() -> Self {
        Self {
            rows: 0,
            cols: 0,
            names: Vec::new(),
            holes: Vec::new(),
            hole_reward: -1.0,
            step_reward: 0.0,
            goal: None,
            discount_rate: 1.0,
        }
    }
}

impl GridWorld {
    /// Empty board of the given size
    #[must_use]
    pub fn new(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            ..Self::default()
        }
    }

    /// Name the cells, row by row
    #[must_use]
    pub fn names<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.names = names.into_iter().map(Into::into).collect();
        self
    }

    /// Mark a cell as a hole
    #[must_use]
    pub fn hole(mut self, row: usize, col: usize) -> Self {
        self.holes.push((row, col));
        self
    }

    /// Set the reward of holes
    #[must_use]
    pub fn hole_reward(mut self, reward: f32) -> Self {
        self.hole_reward = reward;
        self
    }

    /// Set the reward of plain cells
    #[must_use]
    pub fn step_reward(mut self, reward: f32) -> Self {
        self.step_reward = reward;
        self
    }

    /// Place the terminal goal
    #[must_use]
    pub fn goal(mut self, row: usize, col: usize, reward: f32) -> Self {
        self.goal = Some(Goal {
            cell: (row, col),
            reward,
        });
        self
    }

    /// Set the discount rate
    #[must_use]
    pub fn discount_rate(mut self, discount_rate: f32) -> Self {
        self.discount_rate = discount_rate;
        self
    }

    /// The 3x3 board with named cells `TL` to `BR`, holes at `TC` and `MC`
    /// (reward -2) and the goal at `BR` (reward 10).
    #[must_use]
    pub fn classic_3x3() -> Self {
        Self::new(3, 3)
            .names(["TL", "TC", "TR", "ML", "MC", "MR", "BL", "BM", "BR"])
            .hole(0, 1)
            .hole(1, 1)
            .hole_reward(-2.0)
            .goal(2, 2, 10.0)
    }

    /// Board with the goal in the bottom-right corner and `holes` holes
    /// placed at random, never on the start or the goal.
    ///
    /// The same `seed` always gives the same board.
    ///
    /// # Errors
    ///
    /// Returns [`MdpError::InvalidParameter`] if the board is empty, has more
    /// cells than `usize` can count, or is too small for that many holes.
    pub fn random(rows: usize, cols: usize, holes: usize, seed: u64) -> Result<Self> {
        let cells = cell_count(rows, cols)?;
        let goal = (rows - 1, cols - 1);
        let free: Vec<Cell> = (0..cells)
            .map(|i| (i / cols, i % cols))
            .filter(|&cell| cell != (0, 0) && cell != goal)
            .collect();
        if holes > free.len() {
            return Err(MdpError::InvalidParameter(format!(
                "{holes} holes do not fit on a {rows}x{cols} grid"
            )));
        }

        let mut rng = StdRng::seed_from_u64(seed);
        let mut picked: Vec<Cell> = rand::seq::index::sample(&mut rng, free.len(), holes)
            .into_iter()
            .map(|i| free[i])
            .collect();
        picked.sort_unstable();
        debug!(rows, cols, seed, holes = ?picked, "placed holes");

        let mut world = Self::new(rows, cols).goal(goal.0, goal.1, 1.0);
        world.holes = picked;
        Ok(world)
    }

    /// Number of cells, saturating at `usize::MAX`
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.saturating_mul(self.cols)
    }

    /// Check if the board has no cells
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// State index of a cell
    #[must_use]
    pub fn index_of(&self, (row, col): Cell) -> usize {
        row * self.cols + col
    }

    /// State name of a cell
    #[must_use]
    pub fn name_of(&self, cell: Cell) -> String {
        self.names
            .get(self.index_of(cell))
            .cloned()
            .unwrap_or_else(|| format!("r{}c{}", cell.0, cell.1))
    }

    fn reward_of(&self, cell: Cell) -> f32 {
        match self.goal {
            Some(goal) if goal.cell == cell => goal.reward,
            _ if self.holes.contains(&cell) => self.hole_reward,
            _ => self.step_reward,
        }
    }

    fn validate(&self) -> Result<()> {
        cell_count(self.rows, self.cols)?;
        if !self.names.is_empty() && self.names.len() != self.len() {
            return Err(MdpError::InvalidParameter(format!(
                "{} names given for {} cells",
                self.names.len(),
                self.len()
            )));
        }
        let outside = self
            .holes
            .iter()
            .chain(self.goal.as_ref().map(|goal| &goal.cell))
            .find(|(row, col)| *row >= self.rows || *col >= self.cols);
        if let Some(cell) = outside {
            return Err(MdpError::InvalidParameter(format!(
                "cell {cell:?} is outside the {}x{} grid",
                self.rows, self.cols
            )));
        }
        Ok(())
    }

    /// Build the MDP, adding cells one by one in row-major order.
    ///
    /// # Errors
    ///
    /// - [`MdpError::InvalidParameter`] for an empty board, a wrong number of
    ///   names, a cell off the board or a bad discount rate
    /// - [`MdpError::AlreadyExists`] if two cells share a name
    pub fn build(&self) -> Result<Mdp> {
        self.validate()?;
        let mut mdp = Mdp::with_options(MdpOptions {
            state_capacity: self.len(),
            discount_rate: self.discount_rate,
        })?;
        for step in Move::ALL {
            mdp.add_action_object(step.action())?;
        }

        let goal = self.goal.map(|goal| goal.cell);
        let cells: Vec<State> = (0..self.len())
            .map(|i| {
                let cell = (i / self.cols, i % self.cols);
                State::new(self.name_of(cell), i, goal == Some(cell))
            })
            .collect();

        for (i, state) in cells.iter().enumerate() {
            let cell = (i / self.cols, i % self.cols);
            let targets: Vec<(Move, &State)> = Move::ALL
                .into_iter()
                .filter_map(|step| {
                    let next = step.apply(cell, self.rows, self.cols)?;
                    Some((step, &cells[self.index_of(next)]))
                })
                .collect();
            let probability = uniform(targets.len());
            let moves = targets
                .into_iter()
                .map(|(step, next)| (step.action(), Transition::new(probability, next.clone())));
            mdp.add_state_object(state, self.reward_of(cell), moves)?;
        }

        debug!(rows = self.rows, cols = self.cols, "built grid world");
        Ok(mdp)
    }
}

/// Number of cells on a `rows` x `cols` board
fn cell_count(rows: usize, cols: usize) -> Result<usize> {
    match rows.checked_mul(cols) {
        Some(0) => Err(MdpError::InvalidParameter(format!(
            "grid must have at least one cell, got {rows}x{cols}"
        ))),
        Some(cells) => Ok(cells),
        None => Err(MdpError::InvalidParameter(format!(
            "a {rows}x{cols} grid has too many cells"
        ))),
    }
}
