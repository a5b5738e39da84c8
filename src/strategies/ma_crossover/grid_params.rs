//! Grid params for MA Crossover

use crate::config::GridConfig;
use serde::{Deserialize, Serialize};

use super::config::MaCrossoverConfig;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GridParams {
    pub short_periods: Vec<usize>,
    pub long_periods: Vec<usize>,
}

impl Default for GridParams {
    /// Full: 15×51 = 765 combinations
    fn default() -> Self {
        Self::from_config(&GridConfig::default())
    }
}

impl GridParams {
    /// Quick: 4×5 = 20 combinations
    pub fn quick() -> Self {
        Self {
            short_periods: vec![5, 10, 14, 19],
            long_periods: vec![50, 60, 75, 90, 100],
        }
    }

    pub fn custom(short_periods: Vec<usize>, long_periods: Vec<usize>) -> Self {
        Self {
            short_periods,
            long_periods,
        }
    }

    pub fn from_config(grid: &GridConfig) -> Self {
        Self::custom(grid.short_periods.clone(), grid.long_periods.clone())
    }

    /// Parameter sets in grid order (short outer, long inner), skipping
    /// pairs where the fast period is not below the slow one
    pub fn combinations(&self, allow_short: bool) -> Vec<MaCrossoverConfig> {
        use itertools::iproduct;

        iproduct!(&self.short_periods, &self.long_periods)
            .filter(|(short, long)| short < long && **short > 0)
            .map(|(&short_period, &long_period)| MaCrossoverConfig {
                short_period,
                long_period,
                allow_short,
            })
            .collect()
    }

    pub fn total_combinations(&self) -> usize {
        use itertools::iproduct;
        iproduct!(&self.short_periods, &self.long_periods)
            .filter(|(short, long)| short < long && **short > 0)
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_grid_size() {
        let grid = GridParams::default();
        assert_eq!(grid.total_combinations(), 15 * 51);
    }

    #[test]
    fn test_invalid_pairs_skipped() {
        let grid = GridParams::custom(vec![5, 20, 30], vec![10, 20]);
        let combos = grid.combinations(false);
        assert_eq!(combos.len(), 2);
        assert_eq!((combos[0].short_period, combos[0].long_period), (5, 10));
        assert_eq!((combos[1].short_period, combos[1].long_period), (5, 20));
        assert_eq!(grid.total_combinations(), 2);
    }
}
