use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use sixline_db::models::{Spin, MAX_SPIN};
use crate::bankroll::StakePolicy;
use crate::session::Session;
use crate::strategy::StrategyEngine;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LevelStats {
    pub bets: usize,
    pub hits: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BacktestReport {
    pub spins: usize,
    pub bets: usize,
    pub hits: usize,
    pub hit_rate: f64,
    /// Taux attendu par pur hasard : couverture moyenne / 37.
    pub expected_hit_rate: f64,
    pub by_level: BTreeMap<usize, LevelStats>,
    pub profit: i64,
    pub max_drawdown: i64,
    pub final_balance: i64,
}

/// Rejoue `spins` dans l'ordre. Avant chaque numéro t >= `warmup`, la stratégie ne
/// voit que `spins[..t]` ; le numéro t règle ensuite la mise suggérée.
pub fn run_backtest(
    spins: &[Spin],
    engine: &StrategyEngine,
    window: usize,
    warmup: usize,
    policy: &StakePolicy,
    mut on_step: impl FnMut(usize),
) -> BacktestReport {
    let mut session = Session::new(window, policy.clone());
    let mut by_level: BTreeMap<usize, LevelStats> = BTreeMap::new();
    let mut bets = 0usize;
    let mut hits = 0usize;
    let mut coverage = 0.0f64;
    let mut peak = 0i64;
    let mut max_drawdown = 0i64;

    for (t, &spin) in spins.iter().enumerate() {
        let level = if t >= warmup {
            session.recompute(engine).map(|result| {
                coverage += result.suggested_numbers.len() as f64 / (MAX_SPIN as f64 + 1.0);
                result.search_level
            })
        } else {
            None
        };

        let outcome = session.add_spin(spin);

        if let Some(level) = level {
            bets += 1;
            let stats = by_level.entry(level).or_default();
            stats.bets += 1;
            if outcome.hit {
                hits += 1;
                stats.hits += 1;
            }

            let profit = session.bankroll().profit();
            peak = peak.max(profit);
            max_drawdown = max_drawdown.max(peak - profit);
        }

        on_step(t);
    }

    let ratio = |num: f64, den: usize| if den > 0 { num / den as f64 } else { 0.0 };
    let report = BacktestReport {
        spins: spins.len(),
        bets,
        hits,
        hit_rate: ratio(hits as f64, bets),
        expected_hit_rate: ratio(coverage, bets),
        by_level,
        profit: session.bankroll().profit(),
        max_drawdown,
        final_balance: session.bankroll().balance,
    };
    log::info!(
        "backtest : {} mises, {} gains ({:.1}% contre {:.1}% attendus)",
        report.bets,
        report.hits,
        report.hit_rate * 100.0,
        report.expected_hit_rate * 100.0
    );
    report
}

pub fn save_report(report: &BacktestReport, path: &std::path::Path) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(report)?;
    std::fs::write(path, json)?;
    Ok(())
}

pub fn load_report(path: &std::path::Path) -> anyhow::Result<BacktestReport> {
    let json = std::fs::read_to_string(path)?;
    let report: BacktestReport = serde_json::from_str(&json)?;
    Ok(report)
}
