use serde::Serialize;

/// Scores observed at the end of one iteration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ConvergenceRow {
    pub iteration: usize,
    pub best_so_far: usize,
    pub iteration_best: usize,
    pub average: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ConvergenceTrace {
    rows: Vec<ConvergenceRow>,
}

impl ConvergenceTrace {
    pub fn with_capacity(capacity: usize) -> Self {
        ConvergenceTrace {
            rows: Vec::with_capacity(capacity),
        }
    }

    pub(crate) fn push(&mut self, row: ConvergenceRow) {
        debug_assert!(
            self.rows
                .last()
                .is_none_or(|last| last.best_so_far <= row.best_so_far)
        );
        self.rows.push(row);
    }

    pub fn rows(&self) -> &[ConvergenceRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn best_scores(&self) -> impl Iterator<Item = usize> + '_ {
        self.rows.iter().map(|row| row.best_so_far)
    }

    pub fn final_best(&self) -> Option<usize> {
        self.rows.last().map(|row| row.best_so_far)
    }

    pub fn is_non_decreasing(&self) -> bool {
        self.rows
            .windows(2)
            .all(|pair| pair[0].best_so_far <= pair[1].best_so_far)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(iteration: usize, best_so_far: usize, iteration_best: usize) -> ConvergenceRow {
        ConvergenceRow {
            iteration,
            best_so_far,
            iteration_best,
            average: iteration_best as f64,
        }
    }

    #[test]
    fn test_trace() {
        let mut trace = ConvergenceTrace::with_capacity(3);
        assert!(trace.is_empty());
        assert_eq!(trace.final_best(), None);

        trace.push(row(0, 2, 2));
        trace.push(row(1, 3, 3));
        trace.push(row(2, 3, 1));

        assert_eq!(trace.len(), 3);
        assert_eq!(trace.best_scores().collect::<Vec<_>>(), vec![2, 3, 3]);
        assert_eq!(trace.final_best(), Some(3));
        assert!(trace.is_non_decreasing());
    }

    #[test]
    fn test_serializes_rows() {
        let mut trace = ConvergenceTrace::default();
        trace.push(row(0, 1, 1));

        let json = serde_json::to_value(&trace).unwrap();
        assert_eq!(json["rows"][0]["best_so_far"], 1);
        assert_eq!(json["rows"][0]["average"], 1.0);
    }
}
