mod display;
mod import;
mod interactive;

use std::io::{self, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use chrono::Datelike;
use clap::{Args, Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use sixline_db::db::{
    clear_spins, count_spins, db_path, delete_last_spin, fetch_history, fetch_last_spins,
    insert_spins, migrate, open_db,
};
use sixline_db::models::{validate_spin, Spin, MAX_SPIN};
use sixline_db::rusqlite::Connection;
use sixline_engine::backtest::{run_backtest, save_report};
use sixline_engine::config::{config_path, load_config, save_config, AppConfig};
use sixline_engine::strategy::BonusKind;
use sixline_engine::{BetType, StrategyEngine};

use crate::display::{
    display_backtest, display_config, display_import_summary, display_no_match,
    display_recent, display_result, display_spins,
};

#[derive(Parser)]
#[command(name = "sixline", about = "Suivi de séquences à la roulette (six-lines et carrés)")]
struct Cli {
    /// Fichier de configuration JSON
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Verbosité des logs (-v info, -vv debug)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

/// Réglages de stratégie pouvant surcharger le fichier de configuration.
#[derive(Args, Debug, Clone, Default)]
struct StrategyArgs {
    /// Type de mise
    #[arg(short, long)]
    bet_type: Option<BetType>,

    /// Nombre de secteurs suggérés
    #[arg(short, long)]
    max_bets: Option<usize>,

    /// Longueur maximale de la séquence recherchée
    #[arg(short, long)]
    search_cap: Option<usize>,

    /// Nombre de derniers tours utilisés comme requête
    #[arg(short, long)]
    window: Option<usize>,

    /// Activer le bonus de gravité (secteurs en retard)
    #[arg(long)]
    gravity: bool,
}

impl StrategyArgs {
    fn apply(&self, config: &mut AppConfig) {
        if let Some(bet_type) = self.bet_type {
            config.strategy.bet_type = bet_type;
        }
        if let Some(max_bets) = self.max_bets {
            config.strategy.max_bets = max_bets;
        }
        if let Some(search_cap) = self.search_cap {
            config.strategy.search_cap = search_cap;
        }
        if let Some(window) = self.window {
            config.window = window;
        }
        if self.gravity && config.strategy.bonus == BonusKind::None {
            config.strategy.bonus = BonusKind::gravity();
        }
    }
}

#[derive(Subcommand)]
enum Command {
    /// Importer un historique depuis un fichier texte
    Import {
        /// Chemin vers le fichier (numéros séparés par espaces, virgules ou points-virgules)
        #[arg(short, long)]
        file: PathBuf,
    },

    /// Afficher le chemin de la base de données
    DbPath,

    /// Lister les derniers numéros
    List {
        /// Nombre de numéros à afficher
        #[arg(short, long, default_value = "20")]
        last: u32,
    },

    /// Ajouter un ou plusieurs numéros sortis
    Add {
        /// Numéros (0-36)
        #[arg(required = true)]
        numbers: Vec<u8>,
    },

    /// Supprimer le dernier numéro enregistré
    Undo,

    /// Effacer tout l'historique
    Clear {
        /// Ne pas demander de confirmation
        #[arg(short, long)]
        yes: bool,
    },

    /// Générer un historique aléatoire
    Simulate {
        /// Nombre de numéros à générer
        #[arg(short = 'n', long, default_value = "500")]
        count: usize,

        /// Seed pour la reproductibilité (défaut: date du jour YYYYMMDD)
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Analyser les derniers numéros contre l'historique
    Analyze {
        #[command(flatten)]
        strategy: StrategyArgs,
    },

    /// Rejouer la stratégie sur l'historique (walk-forward)
    Backtest {
        #[command(flatten)]
        strategy: StrategyArgs,

        /// Nombre de tours observés avant la première mise
        #[arg(long, default_value = "50")]
        warmup: usize,

        /// Fichier de sortie du rapport
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Gérer le fichier de configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Mode interactif (saisie des numéros au fil du jeu)
    Interactive {
        #[command(flatten)]
        strategy: StrategyArgs,

        /// Reprendre la fenêtre à partir de la fin de l'historique
        #[arg(long)]
        resume: bool,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Afficher la configuration effective
    Show,
    /// Écrire la configuration par défaut
    Init {
        /// Écraser un fichier existant
        #[arg(long)]
        force: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let cfg_path = cli.config.clone().unwrap_or_else(config_path);
    let path = db_path();
    let conn = open_db(&path)?;
    migrate(&conn)?;

    match cli.command {
        Command::Import { file } => cmd_import(&conn, &file),
        Command::DbPath => {
            println!("{}", path.display());
            Ok(())
        }
        Command::List { last } => cmd_list(&conn, last),
        Command::Add { numbers } => cmd_add(&conn, &numbers, &load_app_config(&cfg_path)?),
        Command::Undo => cmd_undo(&conn),
        Command::Clear { yes } => cmd_clear(&conn, yes),
        Command::Simulate { count, seed } => cmd_simulate(&conn, count, seed),
        Command::Analyze { strategy } => {
            let config = effective_config(&cfg_path, &strategy)?;
            cmd_analyze(&conn, &config)
        }
        Command::Backtest { strategy, warmup, output } => {
            let config = effective_config(&cfg_path, &strategy)?;
            cmd_backtest(&conn, &config, warmup, output.as_deref())
        }
        Command::Config { action } => cmd_config(&cfg_path, action),
        Command::Interactive { strategy, resume } => {
            let config = effective_config(&cfg_path, &strategy)?;
            interactive::run_interactive(&conn, &config, resume)
        }
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        _ => log::LevelFilter::Debug,
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .format_timestamp(None)
        .init();
}

fn load_app_config(path: &Path) -> Result<AppConfig> {
    if !path.exists() {
        log::info!("pas de fichier {:?}, réglages par défaut", path);
        return Ok(AppConfig::default());
    }
    load_config(path)
}

fn effective_config(path: &Path, strategy: &StrategyArgs) -> Result<AppConfig> {
    let mut config = load_app_config(path)?;
    strategy.apply(&mut config);
    if config.strategy.max_bets == 0 || config.strategy.search_cap == 0 || config.window == 0 {
        bail!("max_bets, search_cap et window doivent être strictement positifs");
    }
    Ok(config)
}

/// Seed du jour au format YYYYMMDD.
fn date_seed() -> u64 {
    let today = chrono::Local::now().date_naive();
    today.year() as u64 * 10_000 + today.month() as u64 * 100 + today.day() as u64
}

pub(crate) fn prompt(msg: &str) -> Result<String> {
    print!("{}", msg);
    io::stdout().flush()?;
    let mut input = String::new();
    let read = io::stdin()
        .read_line(&mut input)
        .context("Erreur de lecture")?;
    if read == 0 {
        bail!("Fin de l'entrée");
    }
    Ok(input.trim().to_string())
}

pub(crate) fn confirm(msg: &str) -> Result<bool> {
    let answer = prompt(&format!("{} (o/n) : ", msg))?;
    Ok(answer.to_lowercase() == "o")
}

fn cmd_import(conn: &Connection, file: &Path) -> Result<()> {
    let result = import::import_history(conn, file)?;
    display_import_summary(&result);
    Ok(())
}

fn cmd_list(conn: &Connection, last: u32) -> Result<()> {
    if count_spins(conn)? == 0 {
        println!("Base vide. Lancez d'abord : sixline import ou sixline add");
        return Ok(());
    }
    let spins = fetch_last_spins(conn, last)?;
    display_spins(&spins);
    Ok(())
}

fn cmd_add(conn: &Connection, numbers: &[u8], config: &AppConfig) -> Result<()> {
    for &n in numbers {
        validate_spin(n)?;
    }
    let inserted = insert_spins(conn, numbers)?;
    println!("{} numéro(s) ajouté(s).", inserted);
    cmd_analyze(conn, config)
}

fn cmd_undo(conn: &Connection) -> Result<()> {
    match delete_last_spin(conn)? {
        Some(spin) => println!("Numéro {} retiré de l'historique.", spin),
        None => println!("Historique vide, rien à annuler."),
    }
    Ok(())
}

fn cmd_clear(conn: &Connection, yes: bool) -> Result<()> {
    if !yes && !confirm("Effacer tout l'historique ?")? {
        println!("Suppression annulée.");
        return Ok(());
    }
    let deleted = clear_spins(conn)?;
    println!("{} numéro(s) supprimé(s).", deleted);
    Ok(())
}

fn cmd_simulate(conn: &Connection, count: usize, seed: Option<u64>) -> Result<()> {
    let effective_seed = seed.unwrap_or_else(|| {
        let ds = date_seed();
        println!("(Seed du jour : {ds})");
        ds
    });
    let mut rng = StdRng::seed_from_u64(effective_seed);
    let spins: Vec<Spin> = (0..count).map(|_| rng.random_range(0..=MAX_SPIN)).collect();
    let inserted = insert_spins(conn, &spins)?;
    println!("{} numéros aléatoires ajoutés.", inserted);
    Ok(())
}

fn cmd_analyze(conn: &Connection, config: &AppConfig) -> Result<()> {
    let history = fetch_history(conn)?;
    if history.is_empty() {
        bail!("Base vide. Lancez d'abord : sixline import ou sixline add");
    }
    let start = history.len().saturating_sub(config.window);
    let recent = &history[start..];

    display_recent(recent);

    let engine = StrategyEngine::new(config.strategy.clone());
    match engine.analyze(&history, recent, None) {
        Some(result) => display_result(&result, recent.last().copied()),
        None => display_no_match(),
    }
    Ok(())
}

fn cmd_backtest(conn: &Connection, config: &AppConfig, warmup: usize, output: Option<&Path>) -> Result<()> {
    let history = fetch_history(conn)?;
    if history.len() <= warmup {
        bail!(
            "Historique trop court : {} numéros pour un warmup de {}",
            history.len(),
            warmup
        );
    }

    let engine = StrategyEngine::new(config.strategy.clone());
    println!(
        "Backtest {} sur {} numéros (niveau max {}, {} secteur(s), bonus {})...",
        config.strategy.bet_type,
        history.len(),
        config.strategy.search_cap,
        config.strategy.max_bets,
        engine.bonus_name()
    );

    let pb = ProgressBar::new(history.len() as u64);
    pb.set_style(ProgressStyle::default_bar()
        .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
        .context("Modèle de barre de progression invalide")?
        .progress_chars("=> "));

    let report = run_backtest(&history, &engine, config.window, warmup, &config.stake, |_| pb.inc(1));
    pb.finish_with_message("Backtest terminé");

    display_backtest(&report);

    if let Some(path) = output {
        save_report(&report, path)?;
        println!("\nRapport sauvegardé dans : {}", path.display());
    }
    Ok(())
}

fn cmd_config(path: &Path, action: ConfigAction) -> Result<()> {
    match action {
        ConfigAction::Show => {
            let config = load_app_config(path)?;
            display_config(&config, path)
        }
        ConfigAction::Init { force } => {
            if path.exists() && !force {
                bail!("{} existe déjà (utilisez --force pour l'écraser)", path.display());
            }
            save_config(&AppConfig::default(), path)?;
            println!("Configuration écrite dans : {}", path.display());
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strategy_args_override() {
        let mut config = AppConfig::default();
        let args = StrategyArgs {
            bet_type: Some(BetType::Corner),
            max_bets: Some(1),
            search_cap: None,
            window: Some(30),
            gravity: true,
        };
        args.apply(&mut config);
        assert_eq!(config.strategy.bet_type, BetType::Corner);
        assert_eq!(config.strategy.max_bets, 1);
        assert_eq!(config.strategy.search_cap, 5);
        assert_eq!(config.window, 30);
        assert_eq!(config.strategy.bonus, BonusKind::gravity());
    }

    #[test]
    fn test_strategy_args_keep_file_values() {
        let mut config = AppConfig::default();
        config.strategy.bonus = BonusKind::Gravity { divisor: 3.0, cap: 4.0 };
        StrategyArgs { gravity: true, ..StrategyArgs::default() }.apply(&mut config);
        assert_eq!(config.strategy.bonus, BonusKind::Gravity { divisor: 3.0, cap: 4.0 });
    }

    #[test]
    fn test_date_seed_format() {
        let seed = date_seed();
        assert_eq!(seed.to_string().len(), 8);
    }

    #[test]
    fn test_cli_parses() {
        use clap::CommandFactory;
        Cli::command().debug_assert();

        let cli = Cli::try_parse_from(["sixline", "analyze", "--bet-type", "corner", "-m", "1"]).unwrap();
        match cli.command {
            Command::Analyze { strategy } => {
                assert_eq!(strategy.bet_type, Some(BetType::Corner));
                assert_eq!(strategy.max_bets, Some(1));
            }
            _ => panic!("commande inattendue"),
        }
    }
}
