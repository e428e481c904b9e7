use jiff::SignedDuration;

use crate::utils::time::duration_from_minutes;

/// Travel time in minutes. `f64::INFINITY` marks an unreachable pair.
pub type Minutes = f64;

/// Directed travel times between nodes, stored flat: `index = from * num_nodes + to`.
///
/// Nodes `0..n` are the markets in problem order; when the problem has a fixed
/// start location it is node `n`. The diagonal is always zero and missing
/// entries are unreachable.
#[derive(Debug, Clone)]
pub struct TravelTimeMatrix {
    times: Vec<Minutes>,
    num_nodes: usize,
}

impl TravelTimeMatrix {
    /// Creates a matrix where every pair except the diagonal is unreachable.
    pub fn new(num_nodes: usize) -> Self {
        let mut times = vec![Minutes::INFINITY; num_nodes * num_nodes];
        for node in 0..num_nodes {
            times[node * num_nodes + node] = 0.0;
        }

        TravelTimeMatrix { times, num_nodes }
    }

    /// Builds a matrix from rows where `None` is unreachable.
    pub fn from_rows(rows: Vec<Vec<Option<Minutes>>>) -> Self {
        let num_nodes = rows.len();
        let mut matrix = TravelTimeMatrix::new(num_nodes);

        for (from, row) in rows.into_iter().enumerate() {
            for (to, value) in row.into_iter().enumerate().take(num_nodes) {
                if let Some(minutes) = value {
                    matrix.set(from, to, minutes);
                }
            }
        }

        matrix
    }

    /// Estimates travel times from great-circle distances at a constant speed.
    pub fn from_haversine(points: &[geo::Point], speed_kmh: f64) -> Self {
        use geo::{Distance, Haversine};

        let num_nodes = points.len();
        let meters_per_minute = speed_kmh * 1000.0 / 60.0;
        let mut matrix = TravelTimeMatrix::new(num_nodes);

        for (i, from) in points.iter().enumerate() {
            for (j, to) in points.iter().enumerate() {
                if i != j {
                    matrix.set(i, j, Haversine.distance(*from, *to) / meters_per_minute);
                }
            }
        }

        matrix
    }

    #[inline(always)]
    fn index(&self, from: usize, to: usize) -> usize {
        from * self.num_nodes + to
    }

    /// Sets the travel time of a directed pair. Diagonal entries stay zero.
    pub fn set(&mut self, from: usize, to: usize, minutes: Minutes) {
        if from == to {
            return;
        }

        let index = self.index(from, to);
        self.times[index] = minutes;
    }

    /// Marks a directed pair as unreachable.
    pub fn remove(&mut self, from: usize, to: usize) {
        self.set(from, to, Minutes::INFINITY);
    }

    /// Raw travel time in minutes, `f64::INFINITY` when unreachable.
    #[inline(always)]
    pub fn minutes(&self, from: usize, to: usize) -> Minutes {
        if from == to {
            return 0.0;
        }

        self.times[self.index(from, to)]
    }

    /// Travel time of a directed pair, `None` when unreachable.
    #[inline(always)]
    pub fn travel_time(&self, from: usize, to: usize) -> Option<SignedDuration> {
        duration_from_minutes(self.minutes(from, to))
    }

    pub fn is_reachable(&self, from: usize, to: usize) -> bool {
        self.minutes(from, to).is_finite()
    }

    /// Copies `to -> from` into every unreachable `from -> to` entry.
    ///
    /// Returns how many entries were filled.
    pub fn fill_missing_from_reverse(&mut self) -> usize {
        let mut filled = 0;
        for from in 0..self.num_nodes {
            for to in 0..self.num_nodes {
                if !self.is_reachable(from, to) && self.is_reachable(to, from) {
                    let reverse = self.minutes(to, from);
                    self.set(from, to, reverse);
                    filled += 1;
                }
            }
        }

        filled
    }

    pub fn is_symmetric(&self) -> bool {
        (0..self.num_nodes).all(|i| {
            (0..self.num_nodes).all(|j| {
                let (a, b) = (self.minutes(i, j), self.minutes(j, i));
                a == b || (a.is_infinite() && b.is_infinite())
            })
        })
    }

    pub fn num_nodes(&self) -> usize {
        self.num_nodes
    }

    /// Iterates over all off-diagonal entries as `(from, to, minutes)`.
    pub fn entries(&self) -> impl Iterator<Item = (usize, usize, Minutes)> + '_ {
        (0..self.num_nodes).flat_map(move |from| {
            (0..self.num_nodes)
                .filter(move |&to| to != from)
                .map(move |to| (from, to, self.minutes(from, to)))
        })
    }

    pub fn max_finite_minutes(&self) -> Minutes {
        self.times
            .iter()
            .copied()
            .filter(|minutes| minutes.is_finite())
            .fold(0.0, f64::max)
    }
}
