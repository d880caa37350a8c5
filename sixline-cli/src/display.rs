use std::path::Path;

use anyhow::Result;
use comfy_table::{Table, ContentArrangement, presets::UTF8_FULL, Cell, Color};

use crate::import::ImportResult;
use sixline_db::models::{color_of, Spin, SpinColor, SpinRecord};
use sixline_engine::backtest::BacktestReport;
use sixline_engine::bankroll::Bankroll;
use sixline_engine::catalog::sector_by_id;
use sixline_engine::config::AppConfig;
use sixline_engine::heuristics::{Advice, Hotness};
use sixline_engine::session::SpinOutcome;
use sixline_engine::StrategyResult;

fn spin_color(spin: Spin) -> Color {
    match color_of(spin) {
        SpinColor::Red => Color::Red,
        SpinColor::Black => Color::White,
        SpinColor::Green => Color::Green,
    }
}

fn spin_cell(spin: Spin) -> Cell {
    Cell::new(format!("{:2}", spin)).fg(spin_color(spin))
}

fn sector_name(id: u32) -> String {
    sector_by_id(id)
        .map(|sector| sector.name.to_string())
        .unwrap_or_else(|| format!("#{}", id))
}

pub fn display_spins(spins: &[SpinRecord]) {
    if spins.is_empty() {
        println!("Aucun numéro à afficher.");
        return;
    }

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec!["#", "Numéro", "Couleur", "Enregistré le"]);

    for spin in spins {
        table.add_row(vec![
            Cell::new(spin.id),
            spin_cell(spin.value),
            Cell::new(color_of(spin.value).to_string()),
            Cell::new(&spin.recorded_at),
        ]);
    }

    println!("{table}");
}

pub fn display_import_summary(result: &ImportResult) {
    println!("Import terminé :");
    println!("  Numéros lus       : {}", result.total_numbers);
    println!("  Insérés           : {}", result.inserted);
    if result.out_of_range > 0 {
        println!("  Hors limites      : {}", result.out_of_range);
    }
}

pub fn display_recent(recent: &[Spin]) {
    let line = recent
        .iter()
        .map(|n| format!("{:2}", n))
        .collect::<Vec<_>>()
        .join(" · ");
    println!("\nSéquence récente ({}) : {}", recent.len(), line);
}

pub fn display_no_match() {
    println!("\nAucune séquence retrouvée.");
    println!("Cette séquence est inédite dans l'historique. Continuez à jouer pour construire des motifs.");
}

pub fn display_outcome(outcome: &SpinOutcome) {
    match outcome.settlement {
        Some(s) if outcome.hit => println!("✅ GAGNÉ ! {} → +{} (mise {})", outcome.spin, s.net, s.stake),
        Some(s) => println!("❌ Perdu : {} → {} (mise {})", outcome.spin, s.net, s.stake),
        None => println!("Numéro {} enregistré (pas de mise en cours).", outcome.spin),
    }
}

pub fn display_result(result: &StrategyResult, last_spin: Option<Spin>) {
    println!("\n🎯 Analyse ({})\n", result.bet_type);

    let mut summary = Table::new();
    summary
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec!["Niveau", "Fréquence", "Confiance", "Stabilité", "État", "Conseil"]);

    let hot_color = match result.hotness {
        Hotness::Hot => Color::Green,
        Hotness::LessHot => Color::Yellow,
    };
    let advice_color = match result.advice {
        Advice::Caution => Color::Red,
        Advice::StrongSignal => Color::Green,
        Advice::WeakSignal => Color::Yellow,
        Advice::Neutral => Color::White,
    };
    summary.add_row(vec![
        Cell::new(format!("Niv. {}", result.search_level)),
        Cell::new(format!("{}x", result.pattern_matches)),
        Cell::new(format!("{}%", result.confidence)),
        Cell::new(format!("{}%", result.stability)),
        Cell::new(result.hotness.to_string()).fg(hot_color),
        Cell::new(result.advice.to_string()).fg(advice_color),
    ]);
    println!("{summary}");
    println!("{}", result.advice.message());

    let trigger = result
        .trigger_sequence
        .iter()
        .map(|n| n.to_string())
        .collect::<Vec<_>>()
        .join(" - ");
    println!("\nSéquence retrouvée : {}", trigger);

    let names = result
        .suggested_ids
        .iter()
        .map(|&id| sector_name(id))
        .collect::<Vec<_>>()
        .join(" et ");
    println!("Prochaine mise suggérée : {}\n", names);

    // Vert = déjà sorti après la séquence dans l'historique.
    let mut numbers = Table::new();
    numbers
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);
    for chunk in result.suggested_numbers.chunks(6) {
        let row: Vec<Cell> = chunk
            .iter()
            .map(|&n| {
                let cell = spin_cell(n);
                if Some(n) == last_spin {
                    cell.bg(Color::DarkGreen)
                } else if result.found_numbers.contains(&n) {
                    cell.fg(Color::Green)
                } else {
                    cell
                }
            })
            .collect();
        numbers.add_row(row);
    }
    println!("{numbers}");

    display_ranking(result);
}

fn display_ranking(result: &StrategyResult) {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec!["Secteur", "Occurrences", "Score"]);

    for score in &result.ranking {
        let chosen = result.suggested_ids.contains(&score.sector_id);
        let name = Cell::new(sector_name(score.sector_id));
        table.add_row(vec![
            if chosen { name.fg(Color::Green) } else { name },
            Cell::new(score.raw_count),
            Cell::new(format!("{:.1}", score.weighted_score)),
        ]);
    }
    println!("{table}");
}

pub fn display_bankroll(bankroll: &Bankroll) {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec!["Solde", "Unité", "Pertes d'affilée", "Gains d'affilée", "Misé", "Résultat"]);

    let profit = bankroll.profit();
    let profit_color = if profit >= 0 { Color::Green } else { Color::Red };
    table.add_row(vec![
        Cell::new(bankroll.balance),
        Cell::new(bankroll.unit),
        Cell::new(bankroll.loss_streak),
        Cell::new(bankroll.win_streak),
        Cell::new(bankroll.total_staked),
        Cell::new(format!("{:+}", profit)).fg(profit_color),
    ]);
    println!("{table}");
}

pub fn display_backtest(report: &BacktestReport) {
    println!("\n== Résultats du backtest ==\n");

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec!["Numéros", "Mises", "Gains", "Taux", "Hasard", "Résultat", "Drawdown max"]);

    let edge_color = if report.hit_rate > report.expected_hit_rate { Color::Green } else { Color::Red };
    table.add_row(vec![
        Cell::new(report.spins),
        Cell::new(report.bets),
        Cell::new(report.hits),
        Cell::new(format!("{:.1}%", report.hit_rate * 100.0)).fg(edge_color),
        Cell::new(format!("{:.1}%", report.expected_hit_rate * 100.0)),
        Cell::new(format!("{:+}", report.profit)),
        Cell::new(report.max_drawdown),
    ]);
    println!("{table}");

    if report.by_level.is_empty() {
        return;
    }

    println!("\n── Par niveau ──");
    let mut levels = Table::new();
    levels
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec!["Niveau", "Mises", "Gains", "Taux"]);
    for (level, stats) in &report.by_level {
        let rate = if stats.bets > 0 {
            stats.hits as f64 / stats.bets as f64 * 100.0
        } else {
            0.0
        };
        levels.add_row(vec![
            Cell::new(level),
            Cell::new(stats.bets),
            Cell::new(stats.hits),
            Cell::new(format!("{:.1}%", rate)),
        ]);
    }
    println!("{levels}");
}

pub fn display_config(config: &AppConfig, path: &Path) -> Result<()> {
    println!("Configuration ({}) :", path.display());
    println!("{}", serde_json::to_string_pretty(config)?);
    Ok(())
}
