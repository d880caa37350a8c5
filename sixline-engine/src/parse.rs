use sixline_db::models::Spin;

/// Découpe une saisie libre (espaces, virgules, points-virgules, retours à la ligne)
/// et ignore tout ce qui n'est pas un nombre.
pub fn parse_number_input(input: &str) -> Vec<Spin> {
    input
        .split(|c: char| c.is_whitespace() || c == ',' || c == ';')
        .filter(|token| !token.is_empty())
        .filter_map(|token| token.parse::<Spin>().ok())
        .collect()
}

pub fn format_history(spins: &[Spin]) -> String {
    spins
        .iter()
        .map(|n| n.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_mixed_separators() {
        assert_eq!(parse_number_input("1, 2;3\n4\t5  6"), vec![1, 2, 3, 4, 5, 6]);
        assert_eq!(parse_number_input(",,;; 17 ,\n"), vec![17]);
    }

    #[test]
    fn test_parse_drops_non_numeric() {
        assert_eq!(parse_number_input("12 abc 0 x7 36"), vec![12, 0, 36]);
        assert!(parse_number_input("").is_empty());
        assert!(parse_number_input("  \n ").is_empty());
    }

    #[test]
    fn test_format_history_roundtrip() {
        let spins = vec![0, 32, 15, 19];
        assert_eq!(format_history(&spins), "0, 32, 15, 19");
        assert_eq!(parse_number_input(&format_history(&spins)), spins);
    }
}
