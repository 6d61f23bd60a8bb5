use rust_decimal::Decimal;

use crate::models::{Transaction, TransactionType};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Totals {
    pub income: Decimal,
    pub expense: Decimal,
}

impl Totals {
    pub fn balance(&self) -> Decimal {
        self.income.saturating_sub(self.expense)
    }
}

/// Client-side copy of the signed-in user's transactions.
///
/// The list is only ever replaced wholesale by [`TransactionStore::load`].
/// Creates, edits and deletes never patch it locally; callers re-fetch and
/// load the backend's answer instead.
#[derive(Debug, Default)]
pub struct TransactionStore {
    transactions: Vec<Transaction>,
}

impl TransactionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn load(&mut self, transactions: Vec<Transaction>) {
        self.transactions = transactions;
    }

    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    pub fn get(&self, id: &str) -> Option<&Transaction> {
        self.transactions.iter().find(|t| t.id == id)
    }

    pub fn len(&self) -> usize {
        self.transactions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty()
    }

    pub fn aggregate(&self) -> Totals {
        aggregate(&self.transactions)
    }
}

/// Sums saturate at the `Decimal` bounds instead of overflowing.
pub fn aggregate(transactions: &[Transaction]) -> Totals {
    transactions
        .iter()
        .fold(Totals::default(), |mut totals, tx| {
            match tx.kind {
                TransactionType::Income => {
                    totals.income = totals.income.saturating_add(tx.amount)
                }
                TransactionType::Expense => {
                    totals.expense = totals.expense.saturating_add(tx.amount)
                }
            }
            totals
        })
}
