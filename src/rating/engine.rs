use std::cmp::Ordering;
use std::collections::HashMap;

use clap::ValueEnum;
use serde::Serialize;
use strum_macros::Display;

use super::outcome::PlayerResult;

/// Divisor applied to every pairwise term. Fixed, regardless of how many opponents a player has.
pub const SUB_MATCH_COUNT: f64 = 3.0;

const DEFAULT_K_FACTOR: f64 = 64.0;

/// Where pairwise contributions are rounded to whole rating points
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display, ValueEnum)]
#[strum(serialize_all = "kebab-case")]
pub enum Rounding {
    /// Round each pairwise term, then sum
    #[default]
    PerSubMatch,
    /// Sum the exact terms, then round once
    PerPlayer,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RatingConfig {
    pub k_factor: f64,
    pub sub_match_count: f64,
    pub rounding: Rounding,
}

impl Default for RatingConfig {
    fn default() -> Self {
        Self {
            k_factor: DEFAULT_K_FACTOR,
            sub_match_count: SUB_MATCH_COUNT,
            rounding: Rounding::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EloChange {
    pub name: String,
    pub delta: i32,
}

/// Multi-player Elo: every game is scored as pairwise sub-matches between rated players.
#[derive(Debug, Clone, Copy, Default)]
pub struct RatingEngine {
    config: RatingConfig,
}

impl RatingEngine {
    pub fn new(config: RatingConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> RatingConfig {
        self.config
    }

    pub fn expected_score(rating: i32, opponent_rating: i32) -> f64 {
        1.0 / (1.0 + 10f64.powf(f64::from(opponent_rating - rating) / 400.0))
    }

    fn sub_match_term(&self, rating: i32, opponent_rating: i32, actual: f64) -> f64 {
        self.config.k_factor * (actual - Self::expected_score(rating, opponent_rating))
            / self.config.sub_match_count
    }

    /// Rating change of each rated player, in the order they appear in `results`.
    ///
    /// Players missing from `ratings` neither receive a change nor count as opponents.
    /// A rated player without any rated opponent gets no entry.
    pub fn elo_changes(
        &self,
        results: &[PlayerResult],
        ratings: &HashMap<String, i32>,
    ) -> Vec<EloChange> {
        let mut changes = Vec::new();

        for player in results {
            let Some(&rating) = ratings.get(&player.name) else {
                continue;
            };

            let mut rounded_sum = 0;
            let mut exact_sum = 0.0;
            let mut opponents = 0;

            for opponent in results.iter().filter(|o| o.name != player.name) {
                let Some(&opponent_rating) = ratings.get(&opponent.name) else {
                    continue;
                };
                let actual = match player.score.cmp(&opponent.score) {
                    Ordering::Greater => 1.0,
                    Ordering::Equal => 0.5,
                    Ordering::Less => 0.0,
                };
                let term = self.sub_match_term(rating, opponent_rating, actual);
                rounded_sum += term.round() as i32;
                exact_sum += term;
                opponents += 1;
            }

            if opponents == 0 {
                continue;
            }

            let delta = match self.config.rounding {
                Rounding::PerSubMatch => rounded_sum,
                Rounding::PerPlayer => exact_sum.round() as i32,
            };
            changes.push(EloChange {
                name: player.name.clone(),
                delta,
            });
        }

        changes
    }
}
