use anyhow::{bail, Result};

/// Numéro sorti au cylindre (roulette européenne, 0-36).
pub type Spin = u8;

pub const MAX_SPIN: Spin = 36;

pub const RED_NUMBERS: [Spin; 18] = [
    1, 3, 5, 7, 9, 12, 14, 16, 18, 19, 21, 23, 25, 27, 30, 32, 34, 36,
];

#[derive(Debug, Clone)]
pub struct SpinRecord {
    pub id: i64,
    pub value: Spin,
    pub recorded_at: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpinColor {
    Red,
    Black,
    Green,
}

impl std::fmt::Display for SpinColor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SpinColor::Red => write!(f, "ROUGE"),
            SpinColor::Black => write!(f, "NOIR"),
            SpinColor::Green => write!(f, "VERT"),
        }
    }
}

pub fn color_of(spin: Spin) -> SpinColor {
    if spin == 0 {
        SpinColor::Green
    } else if RED_NUMBERS.contains(&spin) {
        SpinColor::Red
    } else {
        SpinColor::Black
    }
}

pub fn validate_spin(spin: Spin) -> Result<()> {
    if spin > MAX_SPIN {
        bail!("Numéro {} hors limites (0-{})", spin, MAX_SPIN);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_spin_ok() {
        assert!(validate_spin(0).is_ok());
        assert!(validate_spin(17).is_ok());
        assert!(validate_spin(36).is_ok());
    }

    #[test]
    fn test_validate_spin_out_of_range() {
        assert!(validate_spin(37).is_err());
        assert!(validate_spin(255).is_err());
    }

    #[test]
    fn test_color_of() {
        assert_eq!(color_of(0), SpinColor::Green);
        assert_eq!(color_of(1), SpinColor::Red);
        assert_eq!(color_of(2), SpinColor::Black);
        assert_eq!(color_of(36), SpinColor::Red);
        assert_eq!(color_of(35), SpinColor::Black);
    }

    #[test]
    fn test_red_and_black_split_evenly() {
        let reds = (1..=MAX_SPIN).filter(|&n| color_of(n) == SpinColor::Red).count();
        let blacks = (1..=MAX_SPIN).filter(|&n| color_of(n) == SpinColor::Black).count();
        assert_eq!(reds, 18);
        assert_eq!(blacks, 18);
    }

    #[test]
    fn test_color_display() {
        assert_eq!(SpinColor::Red.to_string(), "ROUGE");
        assert_eq!(SpinColor::Green.to_string(), "VERT");
    }
}
