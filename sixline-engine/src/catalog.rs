use serde::{Deserialize, Serialize};

use sixline_db::models::Spin;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum BetType {
    #[default]
    SixLine,
    Corner,
}

impl BetType {
    /// Retour total (mise comprise) pour une unité posée sur un secteur gagnant.
    pub fn payout_multiplier(&self) -> u32 {
        match self {
            BetType::SixLine => 6,
            BetType::Corner => 9,
        }
    }
}

impl std::fmt::Display for BetType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BetType::SixLine => write!(f, "6-LINE"),
            BetType::Corner => write!(f, "CORNER"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BetDefinition {
    pub id: u32,
    pub name: &'static str,
    pub numbers: &'static [Spin],
}

const fn def(id: u32, name: &'static str, numbers: &'static [Spin]) -> BetDefinition {
    BetDefinition { id, name, numbers }
}

pub const SIX_LINES: [BetDefinition; 6] = [
    def(1, "Line 1-6", &[1, 2, 3, 4, 5, 6]),
    def(2, "Line 7-12", &[7, 8, 9, 10, 11, 12]),
    def(3, "Line 13-18", &[13, 14, 15, 16, 17, 18]),
    def(4, "Line 19-24", &[19, 20, 21, 22, 23, 24]),
    def(5, "Line 25-30", &[25, 26, 27, 28, 29, 30]),
    def(6, "Line 31-36", &[31, 32, 33, 34, 35, 36]),
];

// Carrés du tapis : coin haut-gauche n avec n % 3 != 0, n <= 32.
pub const CORNERS: [BetDefinition; 22] = [
    def(101, "Corner 1-5", &[1, 2, 4, 5]),
    def(102, "Corner 2-6", &[2, 3, 5, 6]),
    def(103, "Corner 4-8", &[4, 5, 7, 8]),
    def(104, "Corner 5-9", &[5, 6, 8, 9]),
    def(105, "Corner 7-11", &[7, 8, 10, 11]),
    def(106, "Corner 8-12", &[8, 9, 11, 12]),
    def(107, "Corner 10-14", &[10, 11, 13, 14]),
    def(108, "Corner 11-15", &[11, 12, 14, 15]),
    def(109, "Corner 13-17", &[13, 14, 16, 17]),
    def(110, "Corner 14-18", &[14, 15, 17, 18]),
    def(111, "Corner 16-20", &[16, 17, 19, 20]),
    def(112, "Corner 17-21", &[17, 18, 20, 21]),
    def(113, "Corner 19-23", &[19, 20, 22, 23]),
    def(114, "Corner 20-24", &[20, 21, 23, 24]),
    def(115, "Corner 22-26", &[22, 23, 25, 26]),
    def(116, "Corner 23-27", &[23, 24, 26, 27]),
    def(117, "Corner 25-29", &[25, 26, 28, 29]),
    def(118, "Corner 26-30", &[26, 27, 29, 30]),
    def(119, "Corner 28-32", &[28, 29, 31, 32]),
    def(120, "Corner 29-33", &[29, 30, 32, 33]),
    def(121, "Corner 31-35", &[31, 32, 34, 35]),
    def(122, "Corner 32-36", &[32, 33, 35, 36]),
];

pub fn catalog(bet_type: BetType) -> &'static [BetDefinition] {
    match bet_type {
        BetType::SixLine => &SIX_LINES,
        BetType::Corner => &CORNERS,
    }
}

/// Secteurs du catalogue actif contenant `number`, dans l'ordre du catalogue.
pub fn sectors_containing(
    number: Spin,
    bet_type: BetType,
) -> impl Iterator<Item = &'static BetDefinition> {
    catalog(bet_type)
        .iter()
        .filter(move |sector| sector.numbers.contains(&number))
}

pub fn sector_by_id(id: u32) -> Option<&'static BetDefinition> {
    SIX_LINES.iter().chain(CORNERS.iter()).find(|sector| sector.id == id)
}

pub fn line_for_number(number: Spin) -> Option<u32> {
    sectors_containing(number, BetType::SixLine)
        .next()
        .map(|sector| sector.id)
}

/// Union triée et dédoublonnée des numéros couverts par `ids`.
pub fn numbers_for(ids: &[u32]) -> Vec<Spin> {
    let mut numbers: Vec<Spin> = ids
        .iter()
        .filter_map(|&id| sector_by_id(id))
        .flat_map(|sector| sector.numbers.iter().copied())
        .collect();
    numbers.sort_unstable();
    numbers.dedup();
    numbers
}
