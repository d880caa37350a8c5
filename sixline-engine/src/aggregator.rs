use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use sixline_db::models::Spin;
use crate::catalog::{catalog, sectors_containing, BetType};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectorScore {
    pub sector_id: u32,
    pub raw_count: u32,
    pub weighted_score: f64,
}

/// Bonus ajouté au comptage brut d'un secteur.
pub trait SectorBonus: Send + Sync {
    fn name(&self) -> &str;
    /// `missing_streak` = nombre de tours depuis la dernière sortie du secteur.
    fn bonus(&self, missing_streak: Option<u32>) -> f64;
    fn uses_streaks(&self) -> bool {
        true
    }
}

pub struct NoBonus;

impl SectorBonus for NoBonus {
    fn name(&self) -> &str {
        "Aucun"
    }

    fn bonus(&self, _missing_streak: Option<u32>) -> f64 {
        0.0
    }

    fn uses_streaks(&self) -> bool {
        false
    }
}

/// Favorise les secteurs en retard : `min(retard / divisor, cap)`.
pub struct GravityBonus {
    divisor: f64,
    cap: f64,
}

impl GravityBonus {
    pub fn new(divisor: f64, cap: f64) -> Self {
        Self { divisor, cap }
    }
}

impl Default for GravityBonus {
    fn default() -> Self {
        Self::new(2.0, 5.0)
    }
}

impl SectorBonus for GravityBonus {
    fn name(&self) -> &str {
        "Gravité"
    }

    fn bonus(&self, missing_streak: Option<u32>) -> f64 {
        match missing_streak {
            Some(streak) if self.divisor > 0.0 => (streak as f64 / self.divisor).min(self.cap),
            _ => 0.0,
        }
    }
}

/// Classe les secteurs touchés par `next_numbers`, du meilleur au moins bon.
///
/// Les secteurs sont parcourus dans l'ordre du catalogue et le tri est stable :
/// à score égal, le premier secteur du catalogue passe devant.
pub fn aggregate(
    next_numbers: &[Spin],
    bet_type: BetType,
    bonus: &dyn SectorBonus,
    missing_streaks: &HashMap<u32, u32>,
) -> Vec<SectorScore> {
    let mut raw_counts: HashMap<u32, u32> = HashMap::new();
    for &n in next_numbers {
        for sector in sectors_containing(n, bet_type) {
            *raw_counts.entry(sector.id).or_insert(0) += 1;
        }
    }

    let mut ranking: Vec<SectorScore> = catalog(bet_type)
        .iter()
        .filter_map(|sector| {
            let raw_count = *raw_counts.get(&sector.id)?;
            let streak = missing_streaks.get(&sector.id).copied();
            Some(SectorScore {
                sector_id: sector.id,
                raw_count,
                weighted_score: raw_count as f64 + bonus.bonus(streak),
            })
        })
        .collect();

    ranking.sort_by(|a, b| {
        b.weighted_score
            .partial_cmp(&a.weighted_score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    ranking
}

/// Nombre de tours depuis la dernière sortie de chaque secteur du catalogue.
/// Un secteur jamais sorti reçoit la longueur de l'historique.
pub fn missing_streaks(history: &[Spin], bet_type: BetType) -> HashMap<u32, u32> {
    catalog(bet_type)
        .iter()
        .map(|sector| {
            let streak = history
                .iter()
                .rev()
                .position(|n| sector.numbers.contains(n))
                .unwrap_or(history.len());
            (sector.id, streak as u32)
        })
        .collect()
}
