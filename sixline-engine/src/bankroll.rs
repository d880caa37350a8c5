use serde::{Deserialize, Serialize};

use crate::catalog::BetType;

/// Règles de mise : l'unité est multipliée par `escalation_factor` toutes les
/// `escalate_after_losses` pertes consécutives, sans dépasser `max_unit`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StakePolicy {
    pub starting_balance: i64,
    pub base_unit: u32,
    pub escalate_after_losses: u32,
    pub escalation_factor: u32,
    pub max_unit: u32,
}

impl Default for StakePolicy {
    fn default() -> Self {
        Self {
            starting_balance: 100,
            base_unit: 1,
            escalate_after_losses: 2,
            escalation_factor: 2,
            max_unit: 16,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settlement {
    pub stake: u32,
    pub returned: u32,
    pub net: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bankroll {
    pub balance: i64,
    pub unit: u32,
    pub loss_streak: u32,
    pub win_streak: u32,
    pub total_staked: u64,
    pub total_returned: u64,
    policy: StakePolicy,
}

impl Bankroll {
    pub fn new(policy: StakePolicy) -> Self {
        Self {
            balance: policy.starting_balance,
            unit: policy.base_unit,
            loss_streak: 0,
            win_streak: 0,
            total_staked: 0,
            total_returned: 0,
            policy,
        }
    }

    pub fn policy(&self) -> &StakePolicy {
        &self.policy
    }

    /// Mise totale pour `sectors` secteurs à l'unité courante.
    pub fn stake_for(&self, sectors: usize) -> u32 {
        self.unit * sectors as u32
    }

    /// Règle un tour joué sur `sectors_bet` secteurs dont `sectors_hit` contiennent
    /// le numéro sorti (plusieurs carrés peuvent gagner en même temps).
    pub fn settle(&mut self, sectors_bet: usize, sectors_hit: usize, bet_type: BetType) -> Settlement {
        let stake = self.stake_for(sectors_bet);
        let returned = self.unit * sectors_hit as u32 * bet_type.payout_multiplier();
        let net = returned as i64 - stake as i64;

        self.balance += net;
        self.total_staked += stake as u64;
        self.total_returned += returned as u64;

        if sectors_hit > 0 {
            self.win_streak += 1;
            self.loss_streak = 0;
            self.unit = self.policy.base_unit;
        } else {
            self.loss_streak += 1;
            self.win_streak = 0;
            let every = self.policy.escalate_after_losses;
            if every > 0 && self.loss_streak % every == 0 {
                self.unit = (self.unit * self.policy.escalation_factor).min(self.policy.max_unit);
            }
        }

        Settlement { stake, returned, net }
    }

    pub fn profit(&self) -> i64 {
        self.total_returned as i64 - self.total_staked as i64
    }

    pub fn reset(&mut self) {
        *self = Self::new(self.policy.clone());
    }
}

impl Default for Bankroll {
    fn default() -> Self {
        Self::new(StakePolicy::default())
    }
}
