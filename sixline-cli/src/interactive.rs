use anyhow::Result;
use sixline_db::db::{clear_spins, fetch_history, insert_spin};
use sixline_db::models::{validate_spin, Spin};
use sixline_db::rusqlite::Connection;
use sixline_engine::config::AppConfig;
use sixline_engine::parse::parse_number_input;
use sixline_engine::session::Session;
use sixline_engine::StrategyEngine;

use crate::display::{display_bankroll, display_no_match, display_outcome, display_recent, display_result};
use crate::{confirm, prompt};

#[derive(Debug, PartialEq)]
enum InteractiveCommand {
    Spins(Vec<Spin>),
    Undo,
    ClearSession,
    ClearHistory,
    Bankroll,
    ResetBankroll,
    Analyze,
    Help,
    Quit,
}

fn parse_command(input: &str) -> Option<InteractiveCommand> {
    match input.trim().to_lowercase().as_str() {
        "u" | "annuler" | "undo" => Some(InteractiveCommand::Undo),
        "s" | "session" | "nouvelle" => Some(InteractiveCommand::ClearSession),
        "effacer" | "clear" => Some(InteractiveCommand::ClearHistory),
        "b" | "bankroll" | "solde" => Some(InteractiveCommand::Bankroll),
        "r" | "reset" | "raz" => Some(InteractiveCommand::ResetBankroll),
        "a" | "analyser" | "analyze" => Some(InteractiveCommand::Analyze),
        "?" | "aide" | "help" => Some(InteractiveCommand::Help),
        "q" | "quitter" | "quit" | "exit" => Some(InteractiveCommand::Quit),
        other => {
            let spins = parse_number_input(other);
            if spins.is_empty() {
                None
            } else {
                Some(InteractiveCommand::Spins(spins))
            }
        }
    }
}

fn display_menu() {
    println!();
    println!("── Mode interactif ──");
    println!("  <numéros>  Saisir un ou plusieurs numéros sortis (0-36)");
    println!("  u          Annuler le dernier numéro de la séquence");
    println!("  s          Nouvelle session (vide la séquence récente)");
    println!("  effacer    Effacer tout l'historique");
    println!("  b          Afficher la bankroll");
    println!("  r          Remettre la bankroll à zéro");
    println!("  a          Relancer l'analyse");
    println!("  ?          Aide");
    println!("  q          Quitter");
    println!();
}

fn analyze(session: &mut Session, engine: &StrategyEngine) {
    display_recent(session.recent());
    match session.recompute(engine) {
        Some(result) => display_result(&result, session.recent().last().copied()),
        None if session.recent().is_empty() => println!("Saisissez un numéro pour démarrer l'analyse."),
        None => display_no_match(),
    }
}

fn record_spins(conn: &Connection, session: &mut Session, engine: &StrategyEngine, spins: &[Spin]) -> Result<()> {
    for &spin in spins {
        validate_spin(spin)?;
    }
    for &spin in spins {
        insert_spin(conn, spin)?;
        let outcome = session.add_spin(spin);
        display_outcome(&outcome);
        // Chaque numéro est analysé pour que le suivant règle la bonne mise.
        session.recompute(engine);
    }
    analyze(session, engine);
    Ok(())
}

pub fn run_interactive(conn: &Connection, config: &AppConfig, resume: bool) -> Result<()> {
    let engine = StrategyEngine::new(config.strategy.clone());
    let history = fetch_history(conn)?;
    let mut session = Session::new(config.window, config.stake.clone()).with_history(history);
    if resume {
        session.resume_from_history();
    }

    println!(
        "Bienvenue dans sixline ! {} numéros en historique, mise {} ({} secteur(s)).",
        session.history().len(),
        config.strategy.bet_type,
        config.strategy.max_bets
    );
    display_menu();
    if resume {
        analyze(&mut session, &engine);
    }

    loop {
        let input = match prompt("> ") {
            Ok(s) => s,
            Err(_) => break, // EOF / Ctrl+D
        };

        if input.is_empty() {
            continue;
        }

        match parse_command(&input) {
            Some(InteractiveCommand::Quit) => {
                println!("Au revoir !");
                break;
            }
            Some(InteractiveCommand::Spins(spins)) => {
                if let Err(e) = record_spins(conn, &mut session, &engine, &spins) {
                    println!("Erreur: {e:#}");
                }
            }
            Some(InteractiveCommand::Undo) => match session.undo_last() {
                Some(spin) => {
                    println!("{} retiré de la séquence (l'historique est conservé).", spin);
                    analyze(&mut session, &engine);
                }
                None => println!("Séquence vide, rien à annuler."),
            },
            Some(InteractiveCommand::ClearSession) => {
                session.clear_session();
                println!("Nouvelle session.");
            }
            Some(InteractiveCommand::ClearHistory) => match confirm("Effacer tout l'historique ?") {
                Ok(true) => match clear_spins(conn) {
                    Ok(deleted) => {
                        session.clear_history();
                        println!("{} numéro(s) supprimé(s).", deleted);
                    }
                    Err(e) => println!("Erreur: {e:#}"),
                },
                Ok(false) => println!("Suppression annulée."),
                Err(e) => println!("Erreur: {e:#}"),
            },
            Some(InteractiveCommand::Bankroll) => display_bankroll(session.bankroll()),
            Some(InteractiveCommand::ResetBankroll) => {
                session.reset_bankroll();
                display_bankroll(session.bankroll());
            }
            Some(InteractiveCommand::Analyze) => analyze(&mut session, &engine),
            Some(InteractiveCommand::Help) => display_menu(),
            None => {
                println!("Commande inconnue : '{}'. Tapez ? pour l'aide.", input);
            }
        }
    }

    Ok(())
}
