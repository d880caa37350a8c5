use sixline_db::models::Spin;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatternMatch {
    /// Longueur de la séquence retrouvée.
    pub level: usize,
    /// Numéro qui a suivi chaque occurrence, dans l'ordre de l'historique.
    pub next_numbers: Vec<Spin>,
    /// Indice de départ de chaque occurrence dans l'historique.
    pub positions: Vec<usize>,
}

/// Cherche le plus long suffixe de `recent` (au plus `search_cap` numéros) présent
/// dans `history` et suivi d'au moins un numéro.
///
/// La profondeur descend de `min(recent.len(), search_cap)` jusqu'à 1 ; on s'arrête
/// à la première profondeur qui donne une occurrence. Toutes les occurrences de
/// cette profondeur sont retenues.
pub fn find_pattern(history: &[Spin], recent: &[Spin], search_cap: usize) -> Option<PatternMatch> {
    if history.is_empty() || recent.is_empty() {
        return None;
    }

    let max_depth = recent.len().min(search_cap);
    for depth in (1..=max_depth).rev() {
        let query = &recent[recent.len() - depth..];

        // Fenêtres de depth + 1 : le dernier élément est le numéro suivant.
        let (positions, next_numbers): (Vec<usize>, Vec<Spin>) = history
            .windows(depth + 1)
            .enumerate()
            .filter(|(_, window)| &window[..depth] == query)
            .map(|(i, window)| (i, window[depth]))
            .unzip();

        if !next_numbers.is_empty() {
            log::debug!(
                "séquence {:?} trouvée {} fois (niveau {})",
                query,
                next_numbers.len(),
                depth
            );
            return Some(PatternMatch {
                level: depth,
                next_numbers,
                positions,
            });
        }
    }

    log::debug!("aucune séquence trouvée pour {:?}", recent);
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_two_occurrences_at_depth_two() {
        let history = [1, 2, 3, 1, 2, 9];
        let m = find_pattern(&history, &[1, 2], 5).unwrap();
        assert_eq!(m.level, 2);
        assert_eq!(m.next_numbers, vec![3, 9]);
        assert_eq!(m.positions, vec![0, 3]);
    }

    #[test]
    fn test_single_spin_history_has_no_follower() {
        assert_eq!(find_pattern(&[5], &[5], 5), None);
    }

    #[test]
    fn test_repeated_value_depth_three() {
        let m = find_pattern(&[1, 1, 1, 1], &[1, 1, 1], 5).unwrap();
        assert_eq!(m.level, 3);
        assert_eq!(m.next_numbers, vec![1]);
        assert_eq!(m.positions, vec![0]);
    }

    #[test]
    fn test_empty_inputs() {
        assert_eq!(find_pattern(&[], &[1, 2, 3], 5), None);
        assert_eq!(find_pattern(&[1, 2, 3], &[], 5), None);
        assert_eq!(find_pattern(&[], &[7], 5), None);
    }

    #[test]
    fn test_longest_suffix_wins() {
        // [4, 7] apparaît suivi de 20 ; [7] seul apparaît aussi suivi de 30.
        let history = [7, 30, 4, 7, 20, 11];
        let m = find_pattern(&history, &[9, 4, 7], 5).unwrap();
        assert_eq!(m.level, 2);
        assert_eq!(m.next_numbers, vec![20]);
    }

    #[test]
    fn test_falls_back_to_shorter_depth() {
        let history = [10, 11, 12, 13];
        let m = find_pattern(&history, &[1, 2, 11], 5).unwrap();
        assert_eq!(m.level, 1);
        assert_eq!(m.next_numbers, vec![12]);
    }

    #[test]
    fn test_match_at_end_is_excluded() {
        // [3, 4] n'apparaît qu'en fin d'historique, sans numéro suivant.
        let history = [4, 1, 3, 9, 3, 4];
        let m = find_pattern(&history, &[3, 4], 5).unwrap();
        assert_eq!(m.level, 1);
        assert_eq!(m.next_numbers, vec![1]);
    }

    #[test]
    fn test_search_cap_limits_depth() {
        let history = [1, 2, 3, 4, 5, 6, 1, 2, 3, 4, 5, 6];
        let recent = [1, 2, 3, 4, 5];
        assert_eq!(find_pattern(&history, &recent, 5).unwrap().level, 5);
        let m = find_pattern(&history, &recent, 2).unwrap();
        assert_eq!(m.level, 2);
        assert_eq!(m.next_numbers, vec![6, 6]);
    }

    #[test]
    fn test_every_occurrence_is_collected() {
        let history = [8, 0, 8, 0, 8, 0, 8];
        let m = find_pattern(&history, &[0, 8], 5).unwrap();
        assert_eq!(m.level, 2);
        assert_eq!(m.positions, vec![1, 3]);
        assert_eq!(m.next_numbers, vec![0, 0]);
    }
}
