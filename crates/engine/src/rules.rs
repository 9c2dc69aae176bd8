//! User-defined categorisation rules.
//!
//! A [`Rule`] pairs one [`Condition`] with a list of [`RuleAction`]s. Matching
//! is advisory: [`matches`] never fails, malformed conditions simply do not
//! match.

use std::borrow::Cow;

use chrono::{DateTime, NaiveDate, Utc};
use regex::RegexBuilder;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    EngineError, MoneyCents, ResultEngine,
    storage::Record,
    util::{normalize_key, normalize_required_name},
};

/// Expense attribute a condition looks at.
///
/// Unknown names are kept as [`Field::Other`] and always read as the empty
/// string, so rules written for newer clients still evaluate.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Field {
    Description,
    Amount,
    Category,
    Merchant,
    PaymentMethod,
    Notes,
    Date,
    Other(String),
}

impl Field {
    pub fn as_str(&self) -> &str {
        match self {
            Field::Description => "description",
            Field::Amount => "amount",
            Field::Category => "category",
            Field::Merchant => "merchant",
            Field::PaymentMethod => "payment_method",
            Field::Notes => "notes",
            Field::Date => "date",
            Field::Other(name) => name,
        }
    }
}

impl From<String> for Field {
    fn from(value: String) -> Self {
        match value.trim() {
            "description" => Field::Description,
            "amount" => Field::Amount,
            "category" => Field::Category,
            "merchant" => Field::Merchant,
            "payment_method" | "paymentMethod" => Field::PaymentMethod,
            "notes" => Field::Notes,
            "date" => Field::Date,
            _ => Field::Other(value),
        }
    }
}

impl From<Field> for String {
    fn from(value: Field) -> Self {
        value.as_str().to_string()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operator {
    Contains,
    Equals,
    StartsWith,
    EndsWith,
    Regex,
    GreaterThan,
    LessThan,
    /// Any operator name this engine does not know; never matches.
    #[serde(other)]
    Unknown,
}

impl Operator {
    pub fn as_str(self) -> &'static str {
        match self {
            Operator::Contains => "contains",
            Operator::Equals => "equals",
            Operator::StartsWith => "starts_with",
            Operator::EndsWith => "ends_with",
            Operator::Regex => "regex",
            Operator::GreaterThan => "greater_than",
            Operator::LessThan => "less_than",
            Operator::Unknown => "unknown",
        }
    }

    /// Maps an operator name; anything unrecognised is [`Operator::Unknown`].
    pub fn parse(name: &str) -> Self {
        match name.trim() {
            "contains" => Operator::Contains,
            "equals" => Operator::Equals,
            "starts_with" => Operator::StartsWith,
            "ends_with" => Operator::EndsWith,
            "regex" => Operator::Regex,
            "greater_than" => Operator::GreaterThan,
            "less_than" => Operator::LessThan,
            _ => Operator::Unknown,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Condition {
    pub field: Field,
    pub operator: Operator,
    pub value: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum RuleAction {
    SetCategory(String),
    AddTag(String),
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rule {
    pub id: Uuid,
    pub name: String,
    pub active: bool,
    pub condition: Condition,
    pub actions: Vec<RuleAction>,
    pub created_at: DateTime<Utc>,
}

impl Record for Rule {
    const KIND: &'static str = "rule";

    fn id(&self) -> Uuid {
        self.id
    }
}

impl Rule {
    /// Rejects rules that could never do anything useful.
    ///
    /// Evaluation tolerates all of these; validation only guards what users
    /// save.
    pub(crate) fn validate(&self) -> ResultEngine<()> {
        normalize_required_name(&self.name, "rule")
            .map_err(|err| EngineError::InvalidRule(err.to_string()))?;
        if self.condition.operator == Operator::Unknown {
            return Err(EngineError::InvalidRule("unknown operator".to_string()));
        }
        if self.condition.operator == Operator::Regex
            && let Err(err) = RegexBuilder::new(&self.condition.value).build()
        {
            return Err(EngineError::InvalidRule(format!("invalid regex: {err}")));
        }
        if self.actions.is_empty() {
            return Err(EngineError::InvalidRule(
                "rule needs at least one action".to_string(),
            ));
        }
        let blank_action = self.actions.iter().any(|action| match action {
            RuleAction::SetCategory(value) | RuleAction::AddTag(value) => value.trim().is_empty(),
        });
        if blank_action {
            return Err(EngineError::InvalidRule(
                "action value must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

/// Value of a field on an expense-like record.
#[derive(Clone, Debug, PartialEq)]
pub enum FieldValue<'a> {
    Text(Cow<'a, str>),
    Amount(MoneyCents),
    Date(NaiveDate),
    Missing,
}

impl FieldValue<'_> {
    fn as_text(&self) -> Cow<'_, str> {
        match self {
            FieldValue::Text(text) => Cow::Borrowed(text.as_ref()),
            FieldValue::Amount(amount) => Cow::Owned(amount.to_string()),
            FieldValue::Date(date) => Cow::Owned(date.format("%Y-%m-%d").to_string()),
            FieldValue::Missing => Cow::Borrowed(""),
        }
    }

    fn as_number(&self) -> f64 {
        match self {
            FieldValue::Amount(amount) => amount.as_major_f64(),
            FieldValue::Text(text) => parse_number(text),
            FieldValue::Date(_) | FieldValue::Missing => f64::NAN,
        }
    }
}

/// Anything a rule can be evaluated against.
pub trait ExpenseLike {
    fn field(&self, field: &Field) -> FieldValue<'_>;
}

/// A free-standing record, e.g. a CSV row or a form being filled in.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpenseRecord {
    pub description: Option<String>,
    pub amount: Option<MoneyCents>,
    pub category: Option<String>,
    pub merchant: Option<String>,
    pub payment_method: Option<String>,
    pub notes: Option<String>,
    pub date: Option<NaiveDate>,
}

pub(crate) fn text_field(value: &Option<String>) -> FieldValue<'_> {
    value
        .as_deref()
        .map_or(FieldValue::Missing, |s| FieldValue::Text(Cow::Borrowed(s)))
}

impl ExpenseLike for ExpenseRecord {
    fn field(&self, field: &Field) -> FieldValue<'_> {
        match field {
            Field::Description => text_field(&self.description),
            Field::Amount => self.amount.map_or(FieldValue::Missing, FieldValue::Amount),
            Field::Category => text_field(&self.category),
            Field::Merchant => text_field(&self.merchant),
            Field::PaymentMethod => text_field(&self.payment_method),
            Field::Notes => text_field(&self.notes),
            Field::Date => self.date.map_or(FieldValue::Missing, FieldValue::Date),
            Field::Other(_) => FieldValue::Missing,
        }
    }
}

fn parse_number(value: &str) -> f64 {
    value.trim().parse::<f64>().unwrap_or(f64::NAN)
}

/// Evaluates one condition against one record.
///
/// String operators compare case-insensitively; a missing field reads as the
/// empty string. `regex` with an invalid pattern, `greater_than`/`less_than`
/// with a non-numeric side, and unknown operators all evaluate to `false`.
pub fn matches(condition: &Condition, record: &impl ExpenseLike) -> bool {
    let value = record.field(&condition.field);

    match condition.operator {
        Operator::Contains => {
            normalize_key(&value.as_text()).contains(&normalize_key(&condition.value))
        }
        Operator::Equals => normalize_key(&value.as_text()) == normalize_key(&condition.value),
        Operator::StartsWith => {
            normalize_key(&value.as_text()).starts_with(&normalize_key(&condition.value))
        }
        Operator::EndsWith => {
            normalize_key(&value.as_text()).ends_with(&normalize_key(&condition.value))
        }
        Operator::Regex => RegexBuilder::new(&condition.value)
            .case_insensitive(true)
            .build()
            .is_ok_and(|re| re.is_match(&value.as_text())),
        // NaN compares false on both sides, so non-numeric input never matches.
        Operator::GreaterThan => value.as_number() > parse_number(&condition.value),
        Operator::LessThan => value.as_number() < parse_number(&condition.value),
        Operator::Unknown => false,
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchedRule {
    pub id: Uuid,
    pub name: String,
}

/// Combined outcome of evaluating a rule set against one record.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleSuggestions {
    pub matched_rules: Vec<MatchedRule>,
    /// Category of the last matching `set_category` action.
    pub category: Option<String>,
    /// Tags from every matching `add_tag` action, first-seen order, no duplicates.
    pub tags: Vec<String>,
}

/// Evaluates every active rule in order.
pub fn evaluate_rules<'a>(
    rules: impl IntoIterator<Item = &'a Rule>,
    record: &impl ExpenseLike,
) -> RuleSuggestions {
    let mut suggestions = RuleSuggestions::default();

    for rule in rules {
        if !rule.active || !matches(&rule.condition, record) {
            continue;
        }
        suggestions.matched_rules.push(MatchedRule {
            id: rule.id,
            name: rule.name.clone(),
        });
        for action in &rule.actions {
            match action {
                RuleAction::SetCategory(category) => {
                    suggestions.category = Some(category.trim().to_string());
                }
                RuleAction::AddTag(tag) => {
                    let tag = tag.trim();
                    if !suggestions.tags.iter().any(|t| t == tag) {
                        suggestions.tags.push(tag.to_string());
                    }
                }
            }
        }
    }

    suggestions
}

#[cfg(test)]
mod tests {
    use super::*;

    fn condition(field: &str, operator: Operator, value: &str) -> Condition {
        Condition {
            field: Field::from(field.to_string()),
            operator,
            value: value.to_string(),
        }
    }

    fn described(description: &str) -> ExpenseRecord {
        ExpenseRecord {
            description: Some(description.to_string()),
            ..ExpenseRecord::default()
        }
    }

    fn rule(name: &str, condition: Condition, actions: Vec<RuleAction>) -> Rule {
        Rule {
            id: Uuid::new_v4(),
            name: name.to_string(),
            active: true,
            condition,
            actions,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn contains_is_case_insensitive() {
        let cond = condition("description", Operator::Contains, "amazon");
        assert!(matches(&cond, &described("Amazon Shopping")));
        assert!(!matches(&cond, &described("Flipkart Order")));
    }

    #[test]
    fn string_operators() {
        let record = described("Uber Trip Bangalore");
        assert!(matches(&condition("description", Operator::Equals, "uber trip bangalore"), &record));
        assert!(!matches(&condition("description", Operator::Equals, "uber"), &record));
        assert!(matches(&condition("description", Operator::StartsWith, "UBER"), &record));
        assert!(matches(&condition("description", Operator::EndsWith, "bangalore"), &record));
        assert!(!matches(&condition("description", Operator::EndsWith, "uber"), &record));
    }

    #[test]
    fn missing_field_reads_as_empty_string() {
        let record = ExpenseRecord::default();
        assert!(matches(&condition("merchant", Operator::Equals, ""), &record));
        assert!(!matches(&condition("merchant", Operator::Contains, "x"), &record));
        assert!(matches(&condition("something_new", Operator::Equals, ""), &record));
    }

    #[test]
    fn regex_is_case_insensitive_and_fails_closed() {
        let record = described("SWIGGY*ORDER 1234");
        assert!(matches(&condition("description", Operator::Regex, r"^swiggy\*order \d+$"), &record));
        assert!(!matches(&condition("description", Operator::Regex, "(unclosed"), &record));
    }

    #[test]
    fn numeric_comparisons() {
        let record = ExpenseRecord {
            amount: Some(MoneyCents::new(150_050)),
            notes: Some("abc".to_string()),
            ..ExpenseRecord::default()
        };
        assert!(matches(&condition("amount", Operator::GreaterThan, "1500"), &record));
        assert!(!matches(&condition("amount", Operator::GreaterThan, "1500.50"), &record));
        assert!(matches(&condition("amount", Operator::LessThan, "1500.51"), &record));
        // non-numeric on either side is always false
        assert!(!matches(&condition("amount", Operator::GreaterThan, "lots"), &record));
        assert!(!matches(&condition("notes", Operator::LessThan, "10"), &record));
        assert!(!matches(&condition("notes", Operator::GreaterThan, "10"), &record));
        assert!(!matches(&condition("description", Operator::LessThan, "10"), &record));
    }

    #[test]
    fn unknown_operator_never_matches() {
        let cond: Condition = serde_json::from_str(
            r#"{"field": "description", "operator": "sounds_like", "value": "x"}"#,
        )
        .unwrap();
        assert_eq!(cond.operator, Operator::Unknown);
        assert!(!matches(&cond, &described("x")));
        assert_eq!(Operator::parse("sounds_like"), Operator::Unknown);
        assert_eq!(Operator::parse("starts_with"), Operator::StartsWith);
    }

    #[test]
    fn matching_is_deterministic() {
        let cond = condition("description", Operator::Regex, "coffee|tea");
        let record = described("Morning Coffee");
        let first = matches(&cond, &record);
        assert_eq!(first, matches(&cond, &record));
        assert!(first);
    }

    #[test]
    fn last_category_wins_and_tags_accumulate() {
        let rules = vec![
            rule(
                "food",
                condition("description", Operator::Contains, "zomato"),
                vec![
                    RuleAction::SetCategory("Food".to_string()),
                    RuleAction::AddTag("delivery".to_string()),
                ],
            ),
            rule(
                "late night",
                condition("description", Operator::Contains, "late"),
                vec![
                    RuleAction::SetCategory("Treats".to_string()),
                    RuleAction::AddTag("delivery".to_string()),
                    RuleAction::AddTag("night".to_string()),
                ],
            ),
            rule(
                "never",
                condition("description", Operator::Contains, "flipkart"),
                vec![RuleAction::SetCategory("Shopping".to_string())],
            ),
        ];

        let suggestions = evaluate_rules(&rules, &described("Zomato late order"));
        assert_eq!(suggestions.matched_rules.len(), 2);
        assert_eq!(suggestions.category.as_deref(), Some("Treats"));
        assert_eq!(suggestions.tags, vec!["delivery", "night"]);
    }

    #[test]
    fn inactive_rules_are_skipped() {
        let mut r = rule(
            "food",
            condition("description", Operator::Contains, "zomato"),
            vec![RuleAction::SetCategory("Food".to_string())],
        );
        r.active = false;
        let suggestions = evaluate_rules([&r], &described("Zomato"));
        assert!(suggestions.matched_rules.is_empty());
        assert_eq!(suggestions.category, None);
    }

    #[test]
    fn validation_rejects_unusable_rules() {
        let ok = rule(
            "food",
            condition("description", Operator::Contains, "zomato"),
            vec![RuleAction::SetCategory("Food".to_string())],
        );
        assert!(ok.validate().is_ok());

        let mut bad_regex = ok.clone();
        bad_regex.condition = condition("description", Operator::Regex, "[");
        assert!(matches!(bad_regex.validate(), Err(EngineError::InvalidRule(_))));

        let mut no_actions = ok.clone();
        no_actions.actions.clear();
        assert!(matches!(no_actions.validate(), Err(EngineError::InvalidRule(_))));

        let mut unknown = ok;
        unknown.condition.operator = Operator::Unknown;
        assert!(matches!(unknown.validate(), Err(EngineError::InvalidRule(_))));
    }

    #[test]
    fn field_names_round_trip_through_serde() {
        let cond = condition("paymentMethod", Operator::Equals, "upi");
        assert_eq!(cond.field, Field::PaymentMethod);
        let json = serde_json::to_string(&cond).unwrap();
        assert!(json.contains(r#""field":"payment_method""#));
    }
}
