use crate::problem::{market::MarketIdx, market_problem::Position};

/// Trail intensities over directed moves.
///
/// Rows are the markets followed by one row for the start position, columns
/// are the markets. Every entry stays at or above `min_pheromone`.
#[derive(Debug, Clone, PartialEq)]
pub struct PheromoneMatrix {
    values: Vec<f64>,
    num_markets: usize,
    min_pheromone: f64,
}

impl PheromoneMatrix {
    pub fn new(num_markets: usize, initial_pheromone: f64, min_pheromone: f64) -> Self {
        PheromoneMatrix {
            values: vec![initial_pheromone.max(min_pheromone); (num_markets + 1) * num_markets],
            num_markets,
            min_pheromone,
        }
    }

    #[inline(always)]
    fn index(&self, from: Position, to: MarketIdx) -> usize {
        let row = match from {
            Position::Start => self.num_markets,
            Position::Market(market) => market.get(),
        };
        row * self.num_markets + to.get()
    }

    #[inline(always)]
    pub fn get(&self, from: Position, to: MarketIdx) -> f64 {
        self.values[self.index(from, to)]
    }

    pub fn min_pheromone(&self) -> f64 {
        self.min_pheromone
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// `τ ← max(ε, (1 − ρ)·τ)` on every entry.
    pub fn evaporate(&mut self, rate: f64) {
        let factor = 1.0 - rate;
        let min_pheromone = self.min_pheromone;
        for value in self.values.iter_mut() {
            *value = (*value * factor).max(min_pheromone);
        }
    }

    /// Adds `amount` on every move of the route, starting with the move from the start.
    pub fn deposit(&mut self, route: impl IntoIterator<Item = MarketIdx>, amount: f64) {
        let mut from = Position::Start;
        for to in route {
            let index = self.index(from, to);
            self.values[index] = (self.values[index] + amount).max(self.min_pheromone);
            from = Position::Market(to);
        }
    }
}
