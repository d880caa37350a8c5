use sixline_db::models::Spin;

use crate::bankroll::{Bankroll, Settlement, StakePolicy};
use crate::catalog::{sector_by_id, BetType};
use crate::strategy::{StrategyEngine, StrategyResult};

pub const DEFAULT_WINDOW: usize = 12;

/// Mise en attente du prochain numéro.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingBet {
    pub sector_ids: Vec<u32>,
    pub numbers: Vec<Spin>,
    pub bet_type: BetType,
}

impl From<&StrategyResult> for PendingBet {
    fn from(result: &StrategyResult) -> Self {
        Self {
            sector_ids: result.suggested_ids.clone(),
            numbers: result.suggested_numbers.clone(),
            bet_type: result.bet_type,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpinOutcome {
    pub spin: Spin,
    pub hit: bool,
    pub settlement: Option<Settlement>,
}

/// État de jeu détenu par l'appelant : historique, fenêtre des derniers tours,
/// suggestion en cours et bankroll. Le moteur ne lit jamais cet état directement ;
/// `recompute` lui passe les tranches utiles après chaque modification.
#[derive(Debug, Clone)]
pub struct Session {
    history: Vec<Spin>,
    recent: Vec<Spin>,
    window: usize,
    pending: Option<PendingBet>,
    last_hit: bool,
    bankroll: Bankroll,
}

impl Session {
    pub fn new(window: usize, policy: StakePolicy) -> Self {
        Self {
            history: Vec::new(),
            recent: Vec::new(),
            window: window.max(1),
            pending: None,
            last_hit: false,
            bankroll: Bankroll::new(policy),
        }
    }

    pub fn with_history(mut self, history: Vec<Spin>) -> Self {
        self.history = history;
        self
    }

    /// Remplit la fenêtre avec la fin de l'historique (reprise d'une partie).
    pub fn resume_from_history(&mut self) {
        let start = self.history.len().saturating_sub(self.window);
        self.recent = self.history[start..].to_vec();
    }

    pub fn history(&self) -> &[Spin] {
        &self.history
    }

    pub fn recent(&self) -> &[Spin] {
        &self.recent
    }

    pub fn pending(&self) -> Option<&PendingBet> {
        self.pending.as_ref()
    }

    pub fn last_hit(&self) -> bool {
        self.last_hit
    }

    pub fn bankroll(&self) -> &Bankroll {
        &self.bankroll
    }

    /// Enregistre un numéro : contrôle du gain contre la suggestion en attente,
    /// règlement de la mise, ajout à l'historique puis à la fenêtre.
    pub fn add_spin(&mut self, spin: Spin) -> SpinOutcome {
        let settlement = self.pending.take().map(|bet| {
            let sectors_hit = bet
                .sector_ids
                .iter()
                .filter_map(|&id| sector_by_id(id))
                .filter(|sector| sector.numbers.contains(&spin))
                .count();
            self.bankroll.settle(bet.sector_ids.len(), sectors_hit, bet.bet_type)
        });
        let hit = settlement.is_some_and(|s| s.returned > 0);
        self.last_hit = hit;

        self.history.push(spin);
        self.recent.push(spin);
        if self.recent.len() > self.window {
            let excess = self.recent.len() - self.window;
            self.recent.drain(..excess);
        }

        SpinOutcome { spin, hit, settlement }
    }

    /// Relance l'analyse sur l'état courant et garde la suggestion pour le prochain numéro.
    pub fn recompute(&mut self, engine: &StrategyEngine) -> Option<StrategyResult> {
        let result = engine.analyze(&self.history, &self.recent, None);
        self.pending = result.as_ref().map(PendingBet::from);
        result
    }

    /// Retire le dernier numéro de la fenêtre ; l'historique reste intact.
    pub fn undo_last(&mut self) -> Option<Spin> {
        let spin = self.recent.pop()?;
        self.pending = None;
        self.last_hit = false;
        Some(spin)
    }

    pub fn clear_session(&mut self) {
        self.recent.clear();
        self.pending = None;
        self.last_hit = false;
    }

    pub fn clear_history(&mut self) {
        self.history.clear();
        self.pending = None;
    }

    pub fn reset_bankroll(&mut self) {
        self.bankroll.reset();
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new(DEFAULT_WINDOW, StakePolicy::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_window_is_bounded() {
        let mut session = Session::new(3, StakePolicy::default());
        for n in 1..=5 {
            session.add_spin(n);
        }
        assert_eq!(session.recent(), &[3, 4, 5]);
        assert_eq!(session.history(), &[1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_no_bet_without_suggestion() {
        let mut session = Session::default();
        let outcome = session.add_spin(7);
        assert!(!outcome.hit);
        assert!(outcome.settlement.is_none());
        assert_eq!(session.bankroll().balance, 100);
    }

    #[test]
    fn test_hit_detection_and_settlement() {
        let engine = StrategyEngine::default();
        let mut session = Session::default().with_history(vec![1, 2, 3, 1, 2, 9]);
        session.add_spin(1);
        session.add_spin(2);

        let result = session.recompute(&engine).unwrap();
        assert_eq!(result.suggested_ids, vec![1, 2]);
        assert!(session.pending().is_some());

        let outcome = session.add_spin(10);
        assert!(outcome.hit);
        assert!(session.last_hit());
        assert_eq!(outcome.settlement, Some(Settlement { stake: 2, returned: 6, net: 4 }));
        assert!(session.pending().is_none());
    }

    #[test]
    fn test_miss_settles_loss() {
        let engine = StrategyEngine::default();
        let mut session = Session::default().with_history(vec![1, 2, 3, 1, 2, 9]);
        session.add_spin(1);
        session.add_spin(2);
        session.recompute(&engine).unwrap();

        let outcome = session.add_spin(0);
        assert!(!outcome.hit);
        assert_eq!(outcome.settlement.map(|s| s.net), Some(-2));
        assert_eq!(session.bankroll().loss_streak, 1);
    }

    #[test]
    fn test_recompute_without_match_clears_pending() {
        let engine = StrategyEngine::default();
        let mut session = Session::default();
        session.add_spin(5);
        assert!(session.recompute(&engine).is_none());
        assert!(session.pending().is_none());
    }

    #[test]
    fn test_undo_only_touches_window() {
        let mut session = Session::default();
        session.add_spin(4);
        session.add_spin(8);
        assert_eq!(session.undo_last(), Some(8));
        assert_eq!(session.recent(), &[4]);
        assert_eq!(session.history(), &[4, 8]);
        session.undo_last();
        assert_eq!(session.undo_last(), None);
    }

    #[test]
    fn test_clear_session_and_history() {
        let mut session = Session::default();
        session.add_spin(4);
        session.clear_session();
        assert!(session.recent().is_empty());
        assert_eq!(session.history(), &[4]);
        session.clear_history();
        assert!(session.history().is_empty());
    }

    #[test]
    fn test_resume_from_history() {
        let mut session = Session::new(2, StakePolicy::default()).with_history(vec![9, 8, 7]);
        session.resume_from_history();
        assert_eq!(session.recent(), &[8, 7]);
    }
}
