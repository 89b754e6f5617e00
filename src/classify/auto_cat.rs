//! Implements the `Classifier` trait with in-memory "description contains" rules.
//!
//! Note: this is compiled even in the "production" version of this app so that we can run the whole
//! app, top-to-bottom, without a classification server.

use crate::classify::{ClassifiedTransaction, ClassifyError, Classifier, PendingTransaction};
use crate::model::Category;

/// Assigns `category` to any transaction whose description contains one of the comma-separated
/// keywords in `description_contains`, ignoring case.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct AutoCatRule {
    category: Category,
    description_contains: String,
}

impl AutoCatRule {
    pub fn new(category: Category, description_contains: impl Into<String>) -> Self {
        Self {
            category,
            description_contains: description_contains.into(),
        }
    }

    fn matches(&self, description: &str) -> bool {
        let description = description.to_lowercase();
        self.description_contains
            .split(',')
            .map(|keyword| keyword.trim().to_lowercase())
            .filter(|keyword| !keyword.is_empty())
            .any(|keyword| description.contains(&keyword))
    }
}

/// A `Classifier` that applies the first matching `AutoCatRule` and falls back to `Other`.
#[derive(Debug, Clone)]
pub struct AutoCatClassifier {
    rules: Vec<AutoCatRule>,
}

impl AutoCatClassifier {
    pub fn new(rules: Vec<AutoCatRule>) -> Self {
        Self { rules }
    }

    fn predict(&self, description: &str) -> Category {
        self.rules
            .iter()
            .find(|rule| rule.matches(description))
            .map(|rule| rule.category)
            .unwrap_or(Category::Other)
    }
}

impl Default for AutoCatClassifier {
    /// Loads the seed rules from this module.
    fn default() -> Self {
        Self::new(
            SEED_RULES
                .iter()
                .map(|(category, keywords)| AutoCatRule::new(*category, *keywords))
                .collect(),
        )
    }
}

#[async_trait::async_trait]
impl Classifier for AutoCatClassifier {
    async fn classify(
        &self,
        transactions: &[PendingTransaction],
    ) -> Result<Vec<ClassifiedTransaction>, ClassifyError> {
        if transactions.is_empty() {
            return Err(ClassifyError::Rejected {
                status: Some(400),
                message: "No transactions provided.".into(),
            });
        }
        Ok(transactions
            .iter()
            .map(|t| ClassifiedTransaction {
                date: t.date.clone(),
                description: t.description.clone(),
                amount: t.amount.clone(),
                predicted_category: self.predict(&t.description).to_string(),
            })
            .collect())
    }
}

/// Seed rules.
const SEED_RULES: &[(Category, &str)] = &[
    (
        Category::Food,
        "coffee,cafe,restaurant,grocery,groceries,lunch,dinner,breakfast,pizza,bakery,starbucks",
    ),
    (
        Category::Transport,
        "uber,lyft,taxi,bus,train,metro,subway,fuel,gas station,parking,toll,airline",
    ),
    (
        Category::Utilities,
        "electric,water bill,internet,phone,mobile,utility,sewer,heating",
    ),
    (
        Category::Entertainment,
        "netflix,spotify,movie,cinema,concert,theater,theatre,game,museum",
    ),
];

#[cfg(test)]
mod tests {
    use super::*;

    fn pending(description: &str) -> PendingTransaction {
        PendingTransaction {
            date: "2024-01-01".into(),
            description: description.into(),
            amount: "3.50".into(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_seed_rules() {
        let classifier = AutoCatClassifier::default();
        let classified = classifier
            .classify(&[
                pending("Morning Coffee"),
                pending("UBER trip"),
                pending("Netflix subscription"),
                pending("Internet bill"),
                pending("Birthday gift"),
            ])
            .await
            .unwrap();
        let predicted: Vec<&str> = classified
            .iter()
            .map(|c| c.predicted_category.as_str())
            .collect();
        assert_eq!(
            vec!["Food", "Transport", "Entertainment", "Utilities", "Other"],
            predicted
        );
        assert_eq!("Morning Coffee", classified[0].description);
        assert_eq!("3.50", classified[0].amount);
    }

    #[tokio::test]
    async fn test_empty_request_is_rejected() {
        let err = AutoCatClassifier::default().classify(&[]).await.unwrap_err();
        assert_eq!("No transactions provided.", err.to_string());
    }

    #[tokio::test]
    async fn test_custom_rules_first_match_wins() {
        let classifier = AutoCatClassifier::new(vec![
            AutoCatRule::new(Category::Entertainment, "pizza party"),
            AutoCatRule::new(Category::Food, "pizza"),
        ]);
        let classified = classifier
            .classify(&[pending("Office pizza party"), pending("Pizza")])
            .await
            .unwrap();
        assert_eq!("Entertainment", classified[0].predicted_category);
        assert_eq!("Food", classified[1].predicted_category);
    }
}
