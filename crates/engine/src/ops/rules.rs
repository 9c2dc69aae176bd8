use chrono::Utc;
use uuid::Uuid;

use crate::{
    ResultEngine,
    rules::{Condition, Rule, RuleAction},
};

use super::Engine;

/// Input for [`Engine::create_rule`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewRule {
    pub name: String,
    pub active: Option<bool>,
    pub condition: Condition,
    pub actions: Vec<RuleAction>,
}

/// Partial update; `None` fields are left untouched.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RuleUpdate {
    pub name: Option<String>,
    pub active: Option<bool>,
    pub condition: Option<Condition>,
    pub actions: Option<Vec<RuleAction>>,
}

impl RuleUpdate {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.active.is_none()
            && self.condition.is_none()
            && self.actions.is_none()
    }
}

impl Engine {
    pub fn create_rule(&self, new: NewRule) -> ResultEngine<Rule> {
        let rule = Rule {
            id: Uuid::new_v4(),
            name: new.name.trim().to_string(),
            active: new.active.unwrap_or(true),
            condition: new.condition,
            actions: new.actions,
            created_at: Utc::now(),
        };
        rule.validate()?;

        self.rules.insert(rule.clone())?;
        tracing::info!("created rule {} ({})", rule.name, rule.id);
        Ok(rule)
    }

    /// Rules in evaluation order.
    pub fn list_rules(&self) -> Vec<Rule> {
        self.rules.list()
    }

    pub fn rule(&self, rule_id: Uuid) -> ResultEngine<Rule> {
        self.rules.get(rule_id)
    }

    pub fn update_rule(&self, rule_id: Uuid, update: RuleUpdate) -> ResultEngine<Rule> {
        self.rules.modify(rule_id, &mut |rule| {
            if let Some(name) = &update.name {
                rule.name = name.trim().to_string();
            }
            if let Some(active) = update.active {
                rule.active = active;
            }
            if let Some(condition) = &update.condition {
                rule.condition = condition.clone();
            }
            if let Some(actions) = &update.actions {
                rule.actions = actions.clone();
            }
            rule.validate()
        })
    }

    pub fn delete_rule(&self, rule_id: Uuid) -> ResultEngine<()> {
        let rule = self.rules.delete(rule_id)?;
        tracing::info!("deleted rule {} ({})", rule.name, rule.id);
        Ok(())
    }
}
