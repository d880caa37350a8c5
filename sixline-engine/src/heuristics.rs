use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use sixline_db::models::Spin;
use crate::catalog::line_for_number;

/// Paramètres des scores heuristiques. Aucune de ces constantes n'a de
/// justification statistique ; elles restent réglables.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HeuristicParams {
    pub stability_window: usize,
    pub stability_penalty: u32,
    pub depth_weight: f64,
    pub match_weight: f64,
    pub consistency_weight: f64,
    /// Compter le score pondéré (bonus compris) du meilleur secteur plutôt que son comptage brut.
    pub count_weighted: bool,
    pub confidence_cap: u32,
    pub hot_threshold: u32,
    pub caution_stability: u32,
    pub strong_confidence: u32,
    pub weak_depth: usize,
}

impl Default for HeuristicParams {
    fn default() -> Self {
        Self {
            stability_window: 5,
            stability_penalty: 15,
            depth_weight: 10.0,
            match_weight: 5.0,
            consistency_weight: 45.0,
            count_weighted: false,
            confidence_cap: 99,
            hot_threshold: 80,
            caution_stability: 30,
            strong_confidence: 85,
            weak_depth: 2,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Hotness {
    Hot,
    LessHot,
}

impl std::fmt::Display for Hotness {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Hotness::Hot => write!(f, "HOT"),
            Hotness::LessHot => write!(f, "LESS-HOT"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Advice {
    Caution,
    StrongSignal,
    WeakSignal,
    Neutral,
}

impl Advice {
    pub fn message(&self) -> &'static str {
        match self {
            Advice::Caution => "Table instable : réduire la mise ou attendre.",
            Advice::StrongSignal => "Signal fort : séquence longue et répétée.",
            Advice::WeakSignal => "Signal faible : un seul numéro en commun.",
            Advice::Neutral => "Signal moyen.",
        }
    }
}

impl std::fmt::Display for Advice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Advice::Caution => write!(f, "PRUDENCE"),
            Advice::StrongSignal => write!(f, "FORT"),
            Advice::WeakSignal => write!(f, "FAIBLE"),
            Advice::Neutral => write!(f, "NEUTRE"),
        }
    }
}

/// Ce que le calcul de confiance voit d'une analyse.
#[derive(Debug, Clone, Copy)]
pub struct ConfidenceInputs {
    pub depth: usize,
    pub pattern_matches: usize,
    pub top_raw_count: u32,
    pub top_weighted_score: f64,
}

pub trait ConfidenceModel: Send + Sync {
    fn name(&self) -> &str;
    /// Score de 0 à 100.
    fn confidence(&self, inputs: &ConfidenceInputs) -> u32;
}

pub struct WeightedConfidence {
    depth_weight: f64,
    match_weight: f64,
    consistency_weight: f64,
    count_weighted: bool,
    cap: u32,
}

impl WeightedConfidence {
    pub fn new(depth_weight: f64, match_weight: f64, consistency_weight: f64, cap: u32) -> Self {
        Self { depth_weight, match_weight, consistency_weight, count_weighted: false, cap }
    }

    pub fn from_params(params: &HeuristicParams) -> Self {
        Self {
            count_weighted: params.count_weighted,
            ..Self::new(
                params.depth_weight,
                params.match_weight,
                params.consistency_weight,
                params.confidence_cap,
            )
        }
    }
}

impl Default for WeightedConfidence {
    fn default() -> Self {
        Self::from_params(&HeuristicParams::default())
    }
}

impl ConfidenceModel for WeightedConfidence {
    fn name(&self) -> &str {
        "Pondérée"
    }

    fn confidence(&self, inputs: &ConfidenceInputs) -> u32 {
        let consistency = if inputs.pattern_matches > 0 {
            inputs.top_raw_count as f64 / inputs.pattern_matches as f64
        } else {
            0.0
        };
        let top_count = if self.count_weighted {
            inputs.top_weighted_score
        } else {
            inputs.top_raw_count as f64
        };
        let score = inputs.depth as f64 * self.depth_weight
            + top_count * self.match_weight
            + consistency * self.consistency_weight;
        (score.round().max(0.0) as u32).min(self.cap)
    }
}

/// `max(0, 100 - penalty * lignes distinctes)` sur les derniers tours.
/// Le zéro n'appartient à aucune ligne et ne compte pas.
pub fn stability(recent: &[Spin], params: &HeuristicParams) -> u32 {
    let start = recent.len().saturating_sub(params.stability_window);
    let distinct: HashSet<u32> = recent[start..]
        .iter()
        .filter_map(|&n| line_for_number(n))
        .collect();
    100u32.saturating_sub(params.stability_penalty * distinct.len() as u32)
}

pub fn hotness(confidence: u32, params: &HeuristicParams) -> Hotness {
    if confidence > params.hot_threshold {
        Hotness::Hot
    } else {
        Hotness::LessHot
    }
}

/// Première règle qui s'applique : instabilité, signal fort, puis profondeur faible.
pub fn advice(stability: u32, confidence: u32, depth: usize, params: &HeuristicParams) -> Advice {
    if stability < params.caution_stability {
        Advice::Caution
    } else if confidence > params.strong_confidence {
        Advice::StrongSignal
    } else if depth < params.weak_depth {
        Advice::WeakSignal
    } else {
        Advice::Neutral
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn inputs(depth: usize, pattern_matches: usize, top_raw_count: u32) -> ConfidenceInputs {
        ConfidenceInputs {
            depth,
            pattern_matches,
            top_raw_count,
            top_weighted_score: top_raw_count as f64,
        }
    }

    #[test]
    fn test_stability_single_line() {
        let params = HeuristicParams::default();
        assert_eq!(stability(&[1, 2, 3, 4, 5], &params), 85);
    }

    #[test]
    fn test_stability_all_lines() {
        let params = HeuristicParams::default();
        // Seuls les 5 derniers comptent : lignes 2, 3, 4, 5, 6.
        assert_eq!(stability(&[1, 7, 13, 19, 25, 31], &params), 25);
    }

    #[test]
    fn test_stability_ignores_zero_and_empty() {
        let params = HeuristicParams::default();
        assert_eq!(stability(&[], &params), 100);
        assert_eq!(stability(&[0, 0, 0], &params), 100);
        assert_eq!(stability(&[0, 7], &params), 85);
    }

    #[test]
    fn test_stability_never_negative() {
        let params = HeuristicParams {
            stability_penalty: 40,
            ..HeuristicParams::default()
        };
        assert_eq!(stability(&[1, 7, 13], &params), 0);
    }

    #[test]
    fn test_confidence_weighted_sum() {
        let model = WeightedConfidence::default();
        // 2*10 + 2*5 + 45 * 2/4 = 52.5 → 53
        assert_eq!(model.confidence(&inputs(2, 4, 2)), 53);
        // 1*10 + 1*5 + 45 = 60
        assert_eq!(model.confidence(&inputs(1, 1, 1)), 60);
    }

    #[test]
    fn test_confidence_capped() {
        let model = WeightedConfidence::default();
        assert_eq!(model.confidence(&inputs(5, 10, 10)), 99);
    }

    #[test]
    fn test_confidence_counting_weighted_score() {
        let params = HeuristicParams {
            count_weighted: true,
            ..HeuristicParams::default()
        };
        let model = WeightedConfidence::from_params(&params);
        let with_bonus = ConfidenceInputs {
            top_weighted_score: 4.0,
            ..inputs(1, 2, 1)
        };
        // 1*10 + 4*5 + 45 * 1/2 = 52.5 → 53
        assert_eq!(model.confidence(&with_bonus), 53);
        assert_eq!(WeightedConfidence::default().confidence(&with_bonus), 38);
    }

    #[test]
    fn test_confidence_no_matches() {
        let model = WeightedConfidence::default();
        assert_eq!(model.confidence(&inputs(0, 0, 0)), 0);
    }

    #[test]
    fn test_hotness_threshold() {
        let params = HeuristicParams::default();
        assert_eq!(hotness(81, &params), Hotness::Hot);
        assert_eq!(hotness(80, &params), Hotness::LessHot);
        assert_eq!(Hotness::LessHot.to_string(), "LESS-HOT");
    }

    #[test]
    fn test_advice_precedence() {
        let params = HeuristicParams::default();
        assert_eq!(advice(25, 95, 1, &params), Advice::Caution);
        assert_eq!(advice(70, 90, 1, &params), Advice::StrongSignal);
        assert_eq!(advice(70, 60, 1, &params), Advice::WeakSignal);
        assert_eq!(advice(70, 60, 3, &params), Advice::Neutral);
        assert_eq!(advice(30, 85, 2, &params), Advice::Neutral);
    }
}
