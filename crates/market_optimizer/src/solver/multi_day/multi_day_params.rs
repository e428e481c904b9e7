use jiff::SignedDuration;

use crate::solver::optimizer_error::ConfigurationError;

#[derive(Clone, Debug, PartialEq)]
pub struct MultiDayParams {
    pub num_days: usize,
    /// Stay duration of each day. A shorter list is extended with its last
    /// value, an empty one falls back to the problem's stay duration.
    pub stay_durations: Vec<SignedDuration>,
}

impl Default for MultiDayParams {
    fn default() -> Self {
        Self {
            num_days: 1,
            stay_durations: Vec::new(),
        }
    }
}

impl MultiDayParams {
    pub fn new(num_days: usize) -> Self {
        Self {
            num_days,
            ..Self::default()
        }
    }

    pub fn with_stay_durations(mut self, stay_durations: Vec<SignedDuration>) -> Self {
        self.stay_durations = stay_durations;
        self
    }

    /// Stay duration of the zero-based `day`.
    pub fn stay_duration(&self, day: usize, default: SignedDuration) -> SignedDuration {
        self.stay_durations
            .get(day)
            .or_else(|| self.stay_durations.last())
            .copied()
            .unwrap_or(default)
    }

    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if self.num_days == 0 {
            return Err(ConfigurationError::ZeroCount("num_days"));
        }

        if let Some((index, &duration)) = self
            .stay_durations
            .iter()
            .enumerate()
            .find(|(_, duration)| duration.is_negative())
        {
            return Err(ConfigurationError::NegativeStayDuration {
                day: index + 1,
                duration,
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DEFAULT: SignedDuration = SignedDuration::from_mins(30);

    #[test]
    fn test_shorter_list_extended_with_last() {
        let params = MultiDayParams::new(4).with_stay_durations(vec![
            SignedDuration::from_mins(45),
            SignedDuration::from_mins(20),
        ]);

        let stays = (0..4)
            .map(|day| params.stay_duration(day, DEFAULT).as_mins())
            .collect::<Vec<_>>();
        assert_eq!(stays, vec![45, 20, 20, 20]);
    }

    #[test]
    fn test_empty_list_uses_default() {
        let params = MultiDayParams::new(2);
        assert_eq!(params.stay_duration(1, DEFAULT), DEFAULT);
    }

    #[test]
    fn test_validate() {
        assert!(MultiDayParams::default().validate().is_ok());
        assert_eq!(
            MultiDayParams::new(0).validate(),
            Err(ConfigurationError::ZeroCount("num_days"))
        );

        let params = MultiDayParams::new(2).with_stay_durations(vec![
            SignedDuration::from_mins(30),
            SignedDuration::from_mins(-5),
        ]);
        assert_eq!(
            params.validate(),
            Err(ConfigurationError::NegativeStayDuration {
                day: 2,
                duration: SignedDuration::from_mins(-5),
            })
        );
    }
}
