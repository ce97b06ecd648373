use serde::{Deserialize, Serialize};

/// A person name split into its parts
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Name {
    pub first: String,
    pub last: String,
    pub title: String,
    pub suffix: String,
    /// Text that came with the name but is not part of it
    pub remainder: String,
    /// Completeness in `0.0..=1.0`; zero means the name is unusable
    pub score: f64,
}

impl Name {
    /// Build a name and compute its completeness score
    pub fn new(
        first: String,
        last: String,
        title: String,
        suffix: String,
        remainder: String,
    ) -> Self {
        let score = Self::score_of(&first, &last, &title);
        Self {
            first,
            last,
            title,
            suffix,
            remainder,
            score,
        }
    }

    /// Average of the presence of first, last and title; zero without a first name
    pub fn score_of(first: &str, last: &str, title: &str) -> f64 {
        if first.trim().is_empty() {
            return 0.0;
        }
        let present = [first, last, title]
            .iter()
            .filter(|part| !part.trim().is_empty())
            .count();
        present as f64 / 3.0
    }

    pub fn is_valid(&self) -> bool {
        self.score > 0.0
    }

    /// First and last name joined, as shown to a reviewer
    pub fn full_name(&self) -> String {
        [self.first.as_str(), self.last.as_str()]
            .iter()
            .filter(|part| !part.is_empty())
            .copied()
            .collect::<Vec<_>>()
            .join(" ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_score_requires_first_name() {
        let name = Name::new(
            String::new(),
            "Pasamar".to_string(),
            "Dra.".to_string(),
            String::new(),
            String::new(),
        );
        assert_eq!(name.score, 0.0);
        assert!(!name.is_valid());
    }

    #[test]
    fn test_score_averages_present_parts() {
        assert!((Name::score_of("Ana", "", "") - 1.0 / 3.0).abs() < f64::EPSILON);
        assert!((Name::score_of("Ana", "Ruiz", "") - 2.0 / 3.0).abs() < f64::EPSILON);
        assert!((Name::score_of("Ana", "Ruiz", "Dra.") - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_full_name() {
        let name = Name::new(
            "María Pilar".to_string(),
            "Vinardell".to_string(),
            String::new(),
            String::new(),
            String::new(),
        );
        assert_eq!(name.full_name(), "María Pilar Vinardell");
    }
}
