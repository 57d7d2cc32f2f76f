use std::collections::HashMap;

/// Hand-specified base skill value per division, keyed by "{Season} {Category}".
///
/// The numbers are editorial: they encode where each division tier sits on
/// the experience-rating scale before any score-differential adjustment.
#[derive(Debug, Clone)]
pub struct DivisionRatingTable {
    tables: HashMap<String, HashMap<String, f64>>,
}

impl Default for DivisionRatingTable {
    fn default() -> Self {
        let summer_club: &[(&str, f64)] = &[
            ("4/3 Div 1", 1800.0),
            ("4/3 Div 2", 1400.0),
            ("4/3 Div 3", 1000.0),
            ("4/3 Div 4", 900.0),
            ("5/2 Div 1", 1700.0),
            ("5/2 Div 2", 1300.0),
            ("5/2 Div 3", 900.0),
            ("5/2 Div 4", 800.0),
            ("Open Div 1", 1400.0),
            ("Open Div 2", 1200.0),
        ];
        let fall_club: &[(&str, f64)] = &[
            ("4/3 Div 1", 1700.0),
            ("4/3 Div 2", 1300.0),
            ("4/3 Div 3", 900.0),
            ("4/3 Div 4", 800.0),
            ("5/2 Div 1", 1700.0),
            ("5/2 Div 2", 1200.0),
            ("5/2 Div 3", 800.0),
            ("5/2 Div 4", 700.0),
            ("Open Div 1", 1300.0),
            ("Open Div 2", 1100.0),
        ];

        let mut tables = HashMap::new();
        tables.insert("Summer Club".to_string(), to_map(summer_club));
        tables.insert("Fall Club".to_string(), to_map(fall_club));
        Self { tables }
    }
}

impl DivisionRatingTable {
    /// Resolve the per-division table for one league.
    ///
    /// A league category with no hand-specified table gets an all-zero table
    /// built from the divisions observed in its own schedule. That is the
    /// degraded-rating policy, not an error: such teams end up with ratings
    /// near zero, which the experience estimator's threshold later screens
    /// out. The fallback is deterministic per league and never persisted.
    pub fn table_for_league(
        &self,
        rating_key: Option<&str>,
        observed_divisions: &[String],
    ) -> HashMap<String, f64> {
        if let Some(key) = rating_key
            && let Some(table) = self.tables.get(key)
        {
            return table.clone();
        }
        observed_divisions
            .iter()
            .map(|name| (name.clone(), 0.0))
            .collect()
    }

    pub fn has_table(&self, rating_key: &str) -> bool {
        self.tables.contains_key(rating_key)
    }
}

fn to_map(entries: &[(&str, f64)]) -> HashMap<String, f64> {
    entries
        .iter()
        .map(|(name, rating)| (name.to_string(), *rating))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summer_club_table_is_hand_specified() {
        let table = DivisionRatingTable::default();
        let resolved = table.table_for_league(Some("Summer Club"), &[]);
        assert_eq!(resolved.get("4/3 Div 1"), Some(&1800.0));
        assert_eq!(resolved.get("Open Div 2"), Some(&1200.0));
    }

    #[test]
    fn unknown_category_falls_back_to_zero_table() {
        let table = DivisionRatingTable::default();
        let observed = vec!["JP Mixed (4/3)".to_string(), "Swill".to_string()];
        let resolved = table.table_for_league(Some("Spring Hat"), &observed);
        assert_eq!(resolved.len(), 2);
        assert_eq!(resolved.get("Swill"), Some(&0.0));

        // Same league, same zero table.
        let again = table.table_for_league(Some("Spring Hat"), &observed);
        assert_eq!(resolved, again);
    }

    #[test]
    fn missing_rating_key_also_falls_back() {
        let table = DivisionRatingTable::default();
        let observed = vec!["Div 1".to_string()];
        let resolved = table.table_for_league(None, &observed);
        assert_eq!(resolved.get("Div 1"), Some(&0.0));
    }
}
