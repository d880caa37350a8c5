use std::collections::{BTreeSet, HashMap};

use serde::{Deserialize, Serialize};

use sixline_db::models::Spin;
use crate::aggregator::{aggregate, missing_streaks, GravityBonus, NoBonus, SectorBonus, SectorScore};
use crate::catalog::{numbers_for, BetType};
use crate::heuristics::{
    advice, hotness, stability, Advice, ConfidenceInputs, ConfidenceModel, HeuristicParams,
    Hotness, WeightedConfidence,
};
use crate::matcher::find_pattern;

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum BonusKind {
    #[default]
    None,
    Gravity { divisor: f64, cap: f64 },
}

impl BonusKind {
    pub fn gravity() -> Self {
        BonusKind::Gravity { divisor: 2.0, cap: 5.0 }
    }

    pub fn build(&self) -> Box<dyn SectorBonus> {
        match *self {
            BonusKind::None => Box::new(NoBonus),
            BonusKind::Gravity { divisor, cap } => Box::new(GravityBonus::new(divisor, cap)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StrategyConfig {
    /// Longueur maximale de la séquence recherchée.
    pub search_cap: usize,
    pub max_bets: usize,
    pub bet_type: BetType,
    pub bonus: BonusKind,
    pub heuristics: HeuristicParams,
}

impl Default for StrategyConfig {
    fn default() -> Self {
        Self {
            search_cap: 5,
            max_bets: 2,
            bet_type: BetType::SixLine,
            bonus: BonusKind::None,
            heuristics: HeuristicParams::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrategyResult {
    pub search_level: usize,
    pub pattern_matches: usize,
    pub suggested_ids: Vec<u32>,
    pub suggested_numbers: Vec<Spin>,
    pub found_numbers: Vec<Spin>,
    pub bet_type: BetType,
    pub confidence: u32,
    pub stability: u32,
    pub hotness: Hotness,
    pub advice: Advice,
    pub trigger_sequence: Vec<Spin>,
    pub ranking: Vec<SectorScore>,
}

pub struct StrategyEngine {
    config: StrategyConfig,
    bonus: Box<dyn SectorBonus>,
    confidence: Box<dyn ConfidenceModel>,
}

impl StrategyEngine {
    pub fn new(config: StrategyConfig) -> Self {
        let bonus = config.bonus.build();
        let confidence = Box::new(WeightedConfidence::from_params(&config.heuristics));
        Self { config, bonus, confidence }
    }

    pub fn with_models(
        config: StrategyConfig,
        bonus: Box<dyn SectorBonus>,
        confidence: Box<dyn ConfidenceModel>,
    ) -> Self {
        Self { config, bonus, confidence }
    }

    pub fn config(&self) -> &StrategyConfig {
        &self.config
    }

    pub fn bonus_name(&self) -> &str {
        self.bonus.name()
    }

    /// Analyse `recent` contre `history`. `None` signifie « aucune séquence exploitable »,
    /// ce qui est un résultat normal.
    ///
    /// Si le bonus configuré utilise les retards et que l'appelant n'en fournit pas,
    /// ils sont calculés à partir de l'historique.
    pub fn analyze(
        &self,
        history: &[Spin],
        recent: &[Spin],
        missing: Option<&HashMap<u32, u32>>,
    ) -> Option<StrategyResult> {
        let config = &self.config;
        let pattern = find_pattern(history, recent, config.search_cap)?;

        let computed;
        let streaks = match missing {
            Some(streaks) => streaks,
            None if self.bonus.uses_streaks() => {
                computed = missing_streaks(history, config.bet_type);
                &computed
            }
            None => {
                computed = HashMap::new();
                &computed
            }
        };

        let ranking = aggregate(&pattern.next_numbers, config.bet_type, self.bonus.as_ref(), streaks);
        let top = ranking.first()?;

        let suggested_ids: Vec<u32> = ranking
            .iter()
            .take(config.max_bets)
            .map(|score| score.sector_id)
            .collect();
        if suggested_ids.is_empty() {
            return None;
        }
        let suggested_numbers = numbers_for(&suggested_ids);
        let found_numbers: Vec<Spin> = pattern
            .next_numbers
            .iter()
            .copied()
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        let params = &config.heuristics;
        let confidence = self.confidence.confidence(&ConfidenceInputs {
            depth: pattern.level,
            pattern_matches: pattern.next_numbers.len(),
            top_raw_count: top.raw_count,
            top_weighted_score: top.weighted_score,
        });
        let stability = stability(recent, params);

        log::debug!(
            "niveau {} / {} occurrences → secteurs {:?} (confiance {})",
            pattern.level,
            pattern.next_numbers.len(),
            suggested_ids,
            confidence
        );

        Some(StrategyResult {
            search_level: pattern.level,
            pattern_matches: pattern.next_numbers.len(),
            suggested_ids,
            suggested_numbers,
            found_numbers,
            bet_type: config.bet_type,
            confidence,
            stability,
            hotness: hotness(confidence, params),
            advice: advice(stability, confidence, pattern.level, params),
            trigger_sequence: recent[recent.len() - pattern.level..].to_vec(),
            ranking,
        })
    }
}

impl Default for StrategyEngine {
    fn default() -> Self {
        Self::new(StrategyConfig::default())
    }
}

/// Analyse sans bonus avec les réglages par défaut, hormis le nombre de secteurs et le type de mise.
pub fn analyze_strategy(
    history: &[Spin],
    recent: &[Spin],
    max_bets: usize,
    bet_type: BetType,
) -> Option<StrategyResult> {
    let config = StrategyConfig {
        max_bets,
        bet_type,
        ..StrategyConfig::default()
    };
    StrategyEngine::new(config).analyze(history, recent, None)
}
