use crate::{
    ResultEngine,
    expenses::{NewExpense, UNCATEGORIZED},
    import::{ImportReport, parse_statement},
};

use super::Engine;

impl Engine {
    /// Parses a bank statement and, when `commit` is set, records every row
    /// as a personal expense.
    ///
    /// Rows whose keyword guess is `Uncategorized` are left to the rules. The
    /// returned records carry the category that was finally stored.
    pub fn import_csv(&self, text: &str, commit: bool) -> ResultEngine<ImportReport> {
        let mut report = parse_statement(text)?;
        if !commit {
            return Ok(report);
        }

        for record in &mut report.records {
            let category = (record.category != UNCATEGORIZED).then(|| record.category.clone());
            let expense = self.create_expense(NewExpense {
                date: Some(record.date),
                description: record.description.clone(),
                amount: record.amount,
                category,
                ..NewExpense::default()
            })?;
            record.category = expense.category;
        }

        tracing::info!("imported {} expenses from statement", report.records.len());
        Ok(report)
    }
}
