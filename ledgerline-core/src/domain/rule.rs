//! Categorization rules - declarative rule data
//!
//! Rules are data, not code: an ordered list of tagged `exact`/`keyword`
//! matchers plus a groups tree that defines the valid category set and each
//! category's supercategory and group. Both are validated at load time so
//! the categorizer engine never sees an inconsistent ruleset.

use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::domain::result::{Error, Result};

/// Category assigned when no rule matches
pub const UNCATEGORIZED: &str = "uncategorized";

/// How a rule's pattern is tested against a description
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchKind {
    /// Description equals the pattern (case-normalized)
    Exact,
    /// Pattern is a substring of the description (case-normalized)
    Keyword,
}

/// One categorization rule
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryRule {
    #[serde(rename = "match")]
    pub match_kind: MatchKind,
    pub pattern: String,
    pub category: String,
}

/// A supercategory and the categories it contains
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Supercategory {
    pub name: String,
    pub categories: Vec<String>,
}

/// A top-level group of supercategories (e.g. INCOME, SPENDING)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryGroup {
    pub name: String,
    pub supercategories: Vec<Supercategory>,
}

/// The full categorization ruleset: ordered rules plus the category tree
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Categorization {
    pub rules: Vec<CategoryRule>,
    pub groups: Vec<CategoryGroup>,
}

impl Categorization {
    /// Load and validate a categorization file
    pub fn from_yaml_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let categorization: Categorization = serde_yaml::from_str(&content)?;
        categorization.validate()?;
        Ok(categorization)
    }

    /// Map of category name to its (supercategory, group) parents
    pub fn category_parents(&self) -> HashMap<&str, (&str, &str)> {
        let mut parents = HashMap::new();
        for group in &self.groups {
            for supercategory in &group.supercategories {
                for category in &supercategory.categories {
                    parents.insert(
                        category.as_str(),
                        (supercategory.name.as_str(), group.name.as_str()),
                    );
                }
            }
        }
        parents
    }

    /// All categories declared in the groups tree
    pub fn categories(&self) -> Vec<&str> {
        self.groups
            .iter()
            .flat_map(|g| g.supercategories.iter())
            .flat_map(|s| s.categories.iter())
            .map(String::as_str)
            .collect()
    }

    /// Check internal consistency: no category appears twice in the tree,
    /// no rule is empty, and every rule's category exists in the tree
    pub fn validate(&self) -> Result<()> {
        let mut seen: HashMap<&str, &str> = HashMap::new();
        for group in &self.groups {
            for supercategory in &group.supercategories {
                for category in &supercategory.categories {
                    if let Some(other) = seen.insert(category.as_str(), group.name.as_str()) {
                        return Err(Error::validation(format!(
                            "category '{}' appears under both '{}' and '{}'",
                            category, other, group.name
                        )));
                    }
                }
            }
        }

        for rule in &self.rules {
            if rule.pattern.trim().is_empty() {
                return Err(Error::validation(format!(
                    "rule for category '{}' has an empty pattern",
                    rule.category
                )));
            }
            if !seen.contains_key(rule.category.as_str()) {
                return Err(Error::validation(format!(
                    "rule '{}' uses category '{}' which is not in the groups tree",
                    rule.pattern, rule.category
                )));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RULES_YAML: &str = r#"
rules:
  - match: exact
    pattern: "COFFEE SHOP #1"
    category: Dining
  - match: keyword
    pattern: COFFEE
    category: Dining
  - match: keyword
    pattern: SALARY
    category: Income - Salary
groups:
  - name: INCOME
    supercategories:
      - name: Work
        categories: ["Income - Salary"]
  - name: SPENDING
    supercategories:
      - name: Food
        categories: [Dining]
"#;

    #[test]
    fn test_parse_and_validate() {
        let categorization: Categorization = serde_yaml::from_str(RULES_YAML).unwrap();
        categorization.validate().unwrap();

        assert_eq!(categorization.rules.len(), 3);
        assert_eq!(categorization.rules[0].match_kind, MatchKind::Exact);
        assert_eq!(categorization.rules[1].match_kind, MatchKind::Keyword);

        let parents = categorization.category_parents();
        assert_eq!(parents["Dining"], ("Food", "SPENDING"));
        assert_eq!(parents["Income - Salary"], ("Work", "INCOME"));
    }

    #[test]
    fn test_rule_with_unknown_category_rejected() {
        let yaml = r#"
rules:
  - match: keyword
    pattern: COFFEE
    category: Nope
groups:
  - name: SPENDING
    supercategories:
      - name: Food
        categories: [Dining]
"#;
        let categorization: Categorization = serde_yaml::from_str(yaml).unwrap();
        let err = categorization.validate().unwrap_err();
        assert!(err.to_string().contains("Nope"));
    }

    #[test]
    fn test_duplicate_category_rejected() {
        let yaml = r#"
rules: []
groups:
  - name: A
    supercategories:
      - name: X
        categories: [Dining]
  - name: B
    supercategories:
      - name: Y
        categories: [Dining]
"#;
        let categorization: Categorization = serde_yaml::from_str(yaml).unwrap();
        assert!(categorization.validate().is_err());
    }

    #[test]
    fn test_empty_pattern_rejected() {
        let yaml = r#"
rules:
  - match: keyword
    pattern: "  "
    category: Dining
groups:
  - name: SPENDING
    supercategories:
      - name: Food
        categories: [Dining]
"#;
        let categorization: Categorization = serde_yaml::from_str(yaml).unwrap();
        assert!(categorization.validate().is_err());
    }
}
