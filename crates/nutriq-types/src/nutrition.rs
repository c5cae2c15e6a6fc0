//! Meal and nutrition types

use serde::{Deserialize, Serialize};

/// Meal slot within a day
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MealType {
    Breakfast,
    Lunch,
    Dinner,
    Snack,
}

impl std::fmt::Display for MealType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Breakfast => write!(f, "breakfast"),
            Self::Lunch => write!(f, "lunch"),
            Self::Dinner => write!(f, "dinner"),
            Self::Snack => write!(f, "snack"),
        }
    }
}

impl std::str::FromStr for MealType {
    type Err = MealTypeParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "breakfast" => Ok(Self::Breakfast),
            "lunch" => Ok(Self::Lunch),
            "dinner" => Ok(Self::Dinner),
            "snack" => Ok(Self::Snack),
            _ => Err(MealTypeParseError(s.to_string())),
        }
    }
}

/// Error parsing a meal type string
#[derive(Debug, Clone)]
pub struct MealTypeParseError(pub String);

impl std::fmt::Display for MealTypeParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "invalid meal type: {}", self.0)
    }
}

impl std::error::Error for MealTypeParseError {}

/// Calorie and macro totals over a set of meals
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct DailyTotals {
    /// Total calories
    pub calories: i64,
    /// Total protein in grams
    pub protein_g: f64,
    /// Total carbohydrates in grams
    pub carbs_g: f64,
    /// Total fat in grams
    pub fat_g: f64,
}

impl DailyTotals {
    /// Accumulate one meal's contribution
    pub fn add(&mut self, calories: i32, protein_g: Option<f64>, carbs_g: Option<f64>, fat_g: Option<f64>) {
        self.calories += i64::from(calories);
        self.protein_g += protein_g.unwrap_or(0.0);
        self.carbs_g += carbs_g.unwrap_or(0.0);
        self.fat_g += fat_g.unwrap_or(0.0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_meal_type_roundtrip() {
        for (s, t) in [
            ("breakfast", MealType::Breakfast),
            ("lunch", MealType::Lunch),
            ("dinner", MealType::Dinner),
            ("snack", MealType::Snack),
        ] {
            assert_eq!(s.parse::<MealType>().unwrap(), t);
            assert_eq!(t.to_string(), s);
        }
        assert!("brunch".parse::<MealType>().is_err());
    }

    #[test]
    fn test_totals_accumulate_missing_macros_as_zero() {
        let mut totals = DailyTotals::default();
        totals.add(450, Some(32.0), None, Some(12.5));
        totals.add(200, None, Some(18.0), None);
        assert_eq!(totals.calories, 650);
        assert_eq!(totals.protein_g, 32.0);
        assert_eq!(totals.carbs_g, 18.0);
        assert_eq!(totals.fat_g, 12.5);
    }
}
