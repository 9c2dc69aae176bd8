use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use engine::{
    BudgetPeriod, Condition, Currency, Engine, EngineError, ExpenseFilter, ExpenseRecord, Field,
    Group, Member, MoneyCents, NewExpense, NewGroupExpense, NewRule, Operator, PercentShare,
    RuleAction, RuleUpdate, ShareEntry, SplitMethod, UNCATEGORIZED, apply_transfers,
    storage::MemoryRepository,
};
use uuid::Uuid;

fn names(list: &[&str]) -> Vec<String> {
    list.iter().map(ToString::to_string).collect()
}

fn day(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

fn rule(name: &str, field: &str, operator: Operator, value: &str, actions: Vec<RuleAction>) -> NewRule {
    NewRule {
        name: name.to_string(),
        active: None,
        condition: Condition {
            field: Field::from(field.to_string()),
            operator,
            value: value.to_string(),
        },
        actions,
    }
}

#[test]
fn dinner_for_three_settles_to_the_payer() {
    let engine = Engine::builder().build();
    let group = engine
        .create_group("Goa trip", Some(Currency::Inr), &names(&["A", "B", "C"]))
        .unwrap();
    let (a, b, c) = (group.members[0].id, group.members[1].id, group.members[2].id);

    engine
        .add_group_expense(
            group.id,
            NewGroupExpense {
                description: "Dinner".to_string(),
                amount: MoneyCents::new(120_000),
                paid_by: a,
                split: SplitMethod::Equal {
                    member_ids: vec![a, b, c],
                },
            },
        )
        .unwrap();

    let balances = engine.group_balances(group.id).unwrap();
    assert_eq!(balances.get(a), Some(MoneyCents::new(80_000)));
    assert_eq!(balances.get(b), Some(MoneyCents::new(-40_000)));
    assert_eq!(balances.get(c), Some(MoneyCents::new(-40_000)));

    let transfers = engine.group_settlements(group.id).unwrap();
    assert_eq!(transfers.len(), 2);
    assert!(transfers.iter().all(|t| t.to == a));
    let received: MoneyCents = transfers.iter().map(|t| t.amount).sum();
    assert_eq!(received, MoneyCents::new(80_000));
    assert!(apply_transfers(&balances, &transfers).is_settled());
}

#[test]
fn mixed_splits_conserve_money() {
    let engine = Engine::builder().build();
    let group = engine
        .create_group("Flat", None, &names(&["Asha", "Bilal", "Chen", "Dara"]))
        .unwrap();
    let ids: Vec<_> = group.members.iter().map(|m| m.id).collect();

    let expenses = vec![
        NewGroupExpense {
            description: "Groceries".to_string(),
            amount: MoneyCents::new(1_001),
            paid_by: ids[0],
            split: SplitMethod::Equal {
                member_ids: ids.clone(),
            },
        },
        NewGroupExpense {
            description: "Internet".to_string(),
            amount: MoneyCents::new(99_900),
            paid_by: ids[1],
            split: SplitMethod::Percentage {
                parts: vec![
                    PercentShare {
                        member_id: ids[0],
                        percent: 12.5,
                    },
                    PercentShare {
                        member_id: ids[1],
                        percent: 37.5,
                    },
                    PercentShare {
                        member_id: ids[3],
                        percent: 50.0,
                    },
                ],
            },
        },
        NewGroupExpense {
            description: "Cab".to_string(),
            amount: MoneyCents::new(45_000),
            paid_by: ids[2],
            split: SplitMethod::Exact {
                shares: vec![
                    ShareEntry {
                        member_id: ids[0],
                        share: MoneyCents::new(20_000),
                    },
                    ShareEntry {
                        member_id: ids[3],
                        share: MoneyCents::new(25_000),
                    },
                ],
            },
        },
    ];
    for expense in expenses {
        engine.add_group_expense(group.id, expense).unwrap();
    }

    let balances = engine.group_balances(group.id).unwrap();
    assert_eq!(balances.total(), MoneyCents::ZERO);

    let transfers = engine.group_settlements(group.id).unwrap();
    let creditors = balances.iter().filter(|b| b.amount.is_positive()).count();
    let debtors = balances.iter().filter(|b| b.amount.is_negative()).count();
    assert!(transfers.len() <= creditors + debtors - 1);
    assert!(apply_transfers(&balances, &transfers).is_settled());
}

#[test]
fn new_group_is_already_settled() {
    let engine = Engine::builder().build();
    let group = engine.create_group("Empty", None, &names(&["A", "B"])).unwrap();
    let balances = engine.group_balances(group.id).unwrap();
    assert!(balances.is_settled());
    assert!(engine.group_settlements(group.id).unwrap().is_empty());
}

#[test]
fn default_currency_applies_to_groups_without_one() {
    let engine = Engine::builder().default_currency(Currency::Eur).build();
    let implicit = engine.create_group("Paris", None, &names(&["A"])).unwrap();
    let explicit = engine
        .create_group("Delhi", Some(Currency::Inr), &names(&["A"]))
        .unwrap();
    assert_eq!(implicit.currency, Currency::Eur);
    assert_eq!(explicit.currency, Currency::Inr);
}

#[test]
fn group_expense_validation() {
    let engine = Engine::builder().build();
    let group = engine.create_group("Trip", None, &names(&["A", "B"])).unwrap();
    let (a, b) = (group.members[0].id, group.members[1].id);
    let stranger = Uuid::new_v4();

    let bad_sum = engine.add_group_expense(
        group.id,
        NewGroupExpense {
            description: "Hotel".to_string(),
            amount: MoneyCents::new(10_000),
            paid_by: a,
            split: SplitMethod::Exact {
                shares: vec![
                    ShareEntry {
                        member_id: a,
                        share: MoneyCents::new(5_000),
                    },
                    ShareEntry {
                        member_id: b,
                        share: MoneyCents::new(4_000),
                    },
                ],
            },
        },
    );
    assert!(matches!(bad_sum, Err(EngineError::InvalidExpenseData(_))));

    let bad_payer = engine.add_group_expense(
        group.id,
        NewGroupExpense {
            description: "Hotel".to_string(),
            amount: MoneyCents::new(10_000),
            paid_by: stranger,
            split: SplitMethod::Equal {
                member_ids: vec![a, b],
            },
        },
    );
    assert!(matches!(bad_payer, Err(EngineError::InvalidExpenseData(_))));

    let bad_member = engine.add_group_expense(
        group.id,
        NewGroupExpense {
            description: "Hotel".to_string(),
            amount: MoneyCents::new(10_000),
            paid_by: a,
            split: SplitMethod::Equal {
                member_ids: vec![a, stranger],
            },
        },
    );
    assert!(matches!(bad_member, Err(EngineError::InvalidExpenseData(_))));

    let missing_group = engine.group_balances(Uuid::new_v4());
    assert!(matches!(missing_group, Err(EngineError::KeyNotFound(_))));
}

#[test]
fn members_can_be_added_and_renamed() {
    let engine = Engine::builder().build();
    let group = engine.create_group("Trip", None, &names(&["A"])).unwrap();

    let b = engine.add_member(group.id, " Bea ").unwrap();
    assert_eq!(b.name, "Bea");
    assert!(matches!(
        engine.add_member(group.id, "bea"),
        Err(EngineError::ExistingKey(_))
    ));

    let renamed = engine.rename_member(group.id, b.id, "Beatrice").unwrap();
    assert_eq!(renamed.id, b.id);
    let group = engine.group(group.id).unwrap();
    assert_eq!(group.member_name(b.id), "Beatrice");
    assert_eq!(group.members.len(), 2);

    assert!(matches!(
        engine.rename_member(group.id, Uuid::new_v4(), "X"),
        Err(EngineError::KeyNotFound(_))
    ));
}

#[test]
fn deleting_a_group_removes_its_expenses() {
    let engine = Engine::builder().build();
    let group = engine.create_group("Trip", None, &names(&["A", "B"])).unwrap();
    let other = engine.create_group("Home", None, &names(&["A", "B"])).unwrap();
    for g in [&group, &other] {
        engine
            .add_group_expense(
                g.id,
                NewGroupExpense {
                    description: "Snacks".to_string(),
                    amount: MoneyCents::new(500),
                    paid_by: g.members[0].id,
                    split: SplitMethod::Equal {
                        member_ids: g.members.iter().map(|m| m.id).collect(),
                    },
                },
            )
            .unwrap();
    }

    engine.delete_group(group.id).unwrap();
    assert!(matches!(engine.group(group.id), Err(EngineError::KeyNotFound(_))));
    assert_eq!(engine.group_expenses(other.id).unwrap().len(), 1);
    assert_eq!(engine.list_groups().len(), 1);
}

#[test]
fn injected_repository_is_used() {
    let members = vec![Member::new("A"), Member::new("B")];
    let group = Group {
        id: Uuid::new_v4(),
        name: "Seeded".to_string(),
        currency: Currency::Eur,
        members,
        created_at: Utc::now(),
    };
    let repo = Arc::new(MemoryRepository::with_records(vec![group.clone()]));
    let engine = Engine::builder().groups(repo).build();

    assert_eq!(engine.group(group.id).unwrap(), group);
}

#[test]
fn rules_categorise_new_expenses() {
    let engine = Engine::builder().build();
    engine
        .create_rule(rule(
            "Shopping",
            "description",
            Operator::Contains,
            "amazon",
            vec![
                RuleAction::SetCategory("Shopping".to_string()),
                RuleAction::AddTag("online".to_string()),
            ],
        ))
        .unwrap();
    engine
        .create_rule(rule(
            "Big spend",
            "amount",
            Operator::GreaterThan,
            "5000",
            vec![RuleAction::AddTag("big".to_string())],
        ))
        .unwrap();

    let expense = engine
        .create_expense(NewExpense {
            description: "Amazon Shopping".to_string(),
            amount: MoneyCents::new(750_000),
            tags: vec!["online".to_string()],
            ..NewExpense::default()
        })
        .unwrap();
    assert_eq!(expense.category, "Shopping");
    assert_eq!(expense.tags, vec!["online", "big"]);

    let explicit = engine
        .create_expense(NewExpense {
            description: "Amazon gift for mum".to_string(),
            amount: MoneyCents::new(100_000),
            category: Some("Gifts".to_string()),
            ..NewExpense::default()
        })
        .unwrap();
    assert_eq!(explicit.category, "Gifts");

    let other = engine
        .create_expense(NewExpense {
            description: "Flipkart Order".to_string(),
            amount: MoneyCents::new(10_000),
            ..NewExpense::default()
        })
        .unwrap();
    assert_eq!(other.category, UNCATEGORIZED);
    assert!(other.tags.is_empty());
}

#[test]
fn rule_crud_and_testing() {
    let engine = Engine::builder().build();
    let created = engine
        .create_rule(rule(
            "Food",
            "description",
            Operator::Contains,
            "swiggy",
            vec![RuleAction::SetCategory("Food".to_string())],
        ))
        .unwrap();
    assert!(created.active);

    let record = ExpenseRecord {
        description: Some("SWIGGY instamart".to_string()),
        ..ExpenseRecord::default()
    };
    let suggestions = engine.test_rules(&record);
    assert_eq!(suggestions.category.as_deref(), Some("Food"));
    assert_eq!(suggestions.matched_rules[0].id, created.id);

    let updated = engine
        .update_rule(
            created.id,
            RuleUpdate {
                active: Some(false),
                ..RuleUpdate::default()
            },
        )
        .unwrap();
    assert!(!updated.active);
    assert!(engine.test_rules(&record).matched_rules.is_empty());

    let invalid = engine.update_rule(
        created.id,
        RuleUpdate {
            condition: Some(Condition {
                field: Field::Description,
                operator: Operator::Regex,
                value: "(".to_string(),
            }),
            ..RuleUpdate::default()
        },
    );
    assert!(matches!(invalid, Err(EngineError::InvalidRule(_))));
    // a rejected update leaves the stored rule unchanged
    assert_eq!(engine.rule(created.id).unwrap(), updated);

    engine.delete_rule(created.id).unwrap();
    assert!(engine.list_rules().is_empty());
}

#[test]
fn expenses_list_filter_and_delete() {
    let engine = Engine::builder().build();
    let march = engine
        .create_expense(NewExpense {
            date: Some(day("2026-03-10")),
            description: "Rent".to_string(),
            amount: MoneyCents::new(2_500_000),
            category: Some("Rent".to_string()),
            ..NewExpense::default()
        })
        .unwrap();
    engine
        .create_expense(NewExpense {
            date: Some(day("2026-02-10")),
            description: "Rent".to_string(),
            amount: MoneyCents::new(2_500_000),
            category: Some("Rent".to_string()),
            ..NewExpense::default()
        })
        .unwrap();

    let all = engine.list_expenses(&ExpenseFilter::default());
    assert_eq!(all.len(), 2);
    assert!(all[0].date < all[1].date);

    let filtered = engine.list_expenses(&ExpenseFilter {
        from: Some(day("2026-03-01")),
        ..ExpenseFilter::default()
    });
    assert_eq!(filtered, vec![march.clone()]);

    engine.delete_expense(march.id).unwrap();
    assert!(matches!(engine.expense(march.id), Err(EngineError::KeyNotFound(_))));

    let zero = engine.create_expense(NewExpense {
        description: "Nothing".to_string(),
        amount: MoneyCents::ZERO,
        ..NewExpense::default()
    });
    assert!(matches!(zero, Err(EngineError::InvalidAmount(_))));
}

#[test]
fn budget_status_tracks_spending() {
    let engine = Engine::builder().build();
    let budget = engine
        .create_budget("Food", MoneyCents::new(300_000), BudgetPeriod::Monthly)
        .unwrap();
    assert!(matches!(
        engine.create_budget("food", MoneyCents::new(1), BudgetPeriod::Monthly),
        Err(EngineError::ExistingKey(_))
    ));
    assert!(matches!(
        engine.create_budget("Travel", MoneyCents::ZERO, BudgetPeriod::Monthly),
        Err(EngineError::InvalidAmount(_))
    ));

    engine
        .create_expense(NewExpense {
            date: Some(day("2026-10-03")),
            description: "Dinner".to_string(),
            amount: MoneyCents::new(120_000),
            category: Some("Food".to_string()),
            ..NewExpense::default()
        })
        .unwrap();

    let status = engine.budget_status(Some(day("2026-10-19"))).unwrap();
    assert_eq!(status.len(), 1);
    assert_eq!(status[0].budget.id, budget.id);
    assert_eq!(status[0].spent, MoneyCents::new(120_000));
    assert_eq!(status[0].remaining, MoneyCents::new(180_000));
    assert!(!status[0].over_budget);

    engine.delete_budget(budget.id).unwrap();
    assert!(engine.list_budgets().is_empty());
}

#[test]
fn budget_status_at_calendar_edge_is_an_error() {
    let engine = Engine::builder().build();
    engine
        .create_budget("Food", MoneyCents::new(300_000), BudgetPeriod::Monthly)
        .unwrap();
    assert!(matches!(
        engine.budget_status(Some(NaiveDate::MAX)),
        Err(EngineError::InvalidDate(_))
    ));
}

#[test]
fn concurrent_member_additions_are_all_kept() {
    let engine = Engine::builder().build();
    let group = engine.create_group("Hostel", None, &[]).unwrap();

    std::thread::scope(|scope| {
        for t in 0..8 {
            let engine = &engine;
            scope.spawn(move || {
                for i in 0..20 {
                    engine.add_member(group.id, &format!("m{t}_{i}")).unwrap();
                }
            });
        }
    });

    assert_eq!(engine.group(group.id).unwrap().members.len(), 160);
}

#[test]
fn concurrent_duplicates_are_rejected_exactly_once() {
    let engine = Engine::builder().build();
    let group = engine.create_group("Hostel", None, &[]).unwrap();

    let (members_added, budgets_added) = std::thread::scope(|scope| {
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let engine = &engine;
                scope.spawn(move || {
                    let member = engine.add_member(group.id, "Sam").is_ok();
                    let budget = engine
                        .create_budget("Food", MoneyCents::new(100), BudgetPeriod::Weekly)
                        .is_ok();
                    (member, budget)
                })
            })
            .collect();
        handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .fold((0, 0), |(m, b), (member, budget)| {
                (m + usize::from(member), b + usize::from(budget))
            })
    });

    assert_eq!(members_added, 1);
    assert_eq!(budgets_added, 1);
    assert_eq!(engine.group(group.id).unwrap().members.len(), 1);
    assert_eq!(engine.list_budgets().len(), 1);
}

#[test]
fn oversized_group_expenses_are_rejected_without_panicking() {
    let engine = Engine::builder().build();
    let group = engine.create_group("Whales", None, &names(&["A", "B"])).unwrap();
    let (a, b) = (group.members[0].id, group.members[1].id);

    let overflowing = engine.add_group_expense(
        group.id,
        NewGroupExpense {
            description: "Island".to_string(),
            amount: MoneyCents::new(i64::MAX),
            paid_by: a,
            split: SplitMethod::Exact {
                shares: vec![
                    ShareEntry {
                        member_id: a,
                        share: MoneyCents::new(i64::MAX),
                    },
                    ShareEntry {
                        member_id: b,
                        share: MoneyCents::new(1),
                    },
                ],
            },
        },
    );
    assert!(matches!(overflowing, Err(EngineError::InvalidExpenseData(_))));

    let huge = i64::MAX / 2 + 10;
    let yacht = |description: &str| NewGroupExpense {
        description: description.to_string(),
        amount: MoneyCents::new(huge),
        paid_by: a,
        split: SplitMethod::Exact {
            shares: vec![ShareEntry {
                member_id: b,
                share: MoneyCents::new(huge),
            }],
        },
    };
    engine.add_group_expense(group.id, yacht("Yacht")).unwrap();
    assert!(matches!(
        engine.add_group_expense(group.id, yacht("Second yacht")),
        Err(EngineError::InvalidExpenseData(_))
    ));

    let transfers = engine.group_settlements(group.id).unwrap();
    assert_eq!(transfers.len(), 1);
    assert_eq!(transfers[0].amount, MoneyCents::new(huge));
}

#[test]
fn csv_import_preview_and_commit() {
    let engine = Engine::builder().build();
    engine
        .create_rule(rule(
            "Chai",
            "description",
            Operator::StartsWith,
            "chaayos",
            vec![RuleAction::SetCategory("Food".to_string())],
        ))
        .unwrap();
    let csv = "Date,Description,Amount\n\
               2026-10-01,Zomato dinner,640.00\n\
               2026-10-02,Chaayos Koramangala,180\n";

    let preview = engine.import_csv(csv, false).unwrap();
    assert_eq!(preview.records.len(), 2);
    assert_eq!(preview.records[1].category, UNCATEGORIZED);
    assert!(engine.list_expenses(&ExpenseFilter::default()).is_empty());

    let committed = engine.import_csv(csv, true).unwrap();
    assert_eq!(committed.records[0].category, "Food");
    assert_eq!(committed.records[1].category, "Food");
    assert_eq!(engine.list_expenses(&ExpenseFilter::default()).len(), 2);
}
