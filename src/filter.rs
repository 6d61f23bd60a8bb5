use chrono::NaiveDate;

use crate::models::{Transaction, TransactionType};
use crate::store::TransactionStore;

pub const ALL_TRANSACTIONS_PATH: &str = "/all-transactions";
pub const FILTER_PATH: &str = "/filter";

/// Current narrowing of the transaction list. `None` means no constraint.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterCriteria {
    pub kind: Option<TransactionType>,
    pub category: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

impl FilterCriteria {
    pub fn is_empty(&self) -> bool {
        build_query(self) == Query::All
    }

    /// Short human-readable summary, e.g. `type: income, from: 2025-01-01`.
    pub fn describe(&self) -> String {
        let mut parts = Vec::new();
        if let Some(kind) = self.kind {
            parts.push(format!("type: {kind}"));
        }
        if let Some(category) = non_empty(&self.category) {
            parts.push(format!("category: {category}"));
        }
        if let Some(from) = self.start_date {
            parts.push(format!("from: {from}"));
        }
        if let Some(to) = self.end_date {
            parts.push(format!("to: {to}"));
        }
        if parts.is_empty() {
            "all transactions".to_string()
        } else {
            parts.join(", ")
        }
    }
}

/// One filter dimension together with its new value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Criterion {
    Type(Option<TransactionType>),
    Category(Option<String>),
    StartDate(Option<NaiveDate>),
    EndDate(Option<NaiveDate>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Query {
    /// No constraints: fetch everything.
    All,
    /// Only the constrained dimensions, in wire names.
    Filter(Vec<(&'static str, String)>),
}

impl Query {
    pub fn path(&self) -> &'static str {
        match self {
            Query::All => ALL_TRANSACTIONS_PATH,
            Query::Filter(_) => FILTER_PATH,
        }
    }

    pub fn params(&self) -> &[(&'static str, String)] {
        match self {
            Query::All => &[],
            Query::Filter(params) => params,
        }
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

pub fn build_query(criteria: &FilterCriteria) -> Query {
    let mut params = Vec::new();
    if let Some(kind) = criteria.kind {
        params.push(("type", kind.as_str().to_string()));
    }
    if let Some(category) = non_empty(&criteria.category) {
        params.push(("category", category.to_string()));
    }
    if let Some(from) = criteria.start_date {
        params.push(("startDate", from.format("%Y-%m-%d").to_string()));
    }
    if let Some(to) = criteria.end_date {
        params.push(("endDate", to.format("%Y-%m-%d").to_string()));
    }
    if params.is_empty() {
        Query::All
    } else {
        Query::Filter(params)
    }
}

/// A refresh the caller must perform. Its result is applied only if no newer
/// ticket has been issued in the meantime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefreshTicket {
    pub seq: u64,
    pub query: Query,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyOutcome {
    Applied,
    Stale,
}

#[derive(Debug, Default)]
pub struct FilterController {
    criteria: FilterCriteria,
    issued: u64,
    applied: u64,
}

impl FilterController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn criteria(&self) -> &FilterCriteria {
        &self.criteria
    }

    /// Update one dimension. Returns the refresh to run, or `None` when the
    /// value did not change.
    ///
    /// A new `Type` also drops the category: the vocabulary differs by type,
    /// so a category picked for the other type must not silently apply.
    pub fn set_criterion(&mut self, criterion: Criterion) -> Option<RefreshTicket> {
        let mut next = self.criteria.clone();
        match criterion {
            Criterion::Type(kind) => {
                if kind != next.kind {
                    next.kind = kind;
                    next.category = None;
                }
            }
            Criterion::Category(category) => {
                next.category = category
                    .map(|c| c.trim().to_string())
                    .filter(|c| !c.is_empty());
            }
            Criterion::StartDate(date) => next.start_date = date,
            Criterion::EndDate(date) => next.end_date = date,
        }
        if next == self.criteria {
            return None;
        }
        self.criteria = next;
        Some(self.issue())
    }

    /// Reset every dimension at once. Always exactly one refresh.
    pub fn clear(&mut self) -> RefreshTicket {
        self.criteria = FilterCriteria::default();
        self.issue()
    }

    /// Re-fetch with the current criteria, e.g. after a create, edit or delete.
    pub fn refresh(&mut self) -> RefreshTicket {
        self.issue()
    }

    fn issue(&mut self) -> RefreshTicket {
        self.issued += 1;
        let ticket = RefreshTicket {
            seq: self.issued,
            query: build_query(&self.criteria),
        };
        tracing::debug!(seq = ticket.seq, path = ticket.query.path(), "issued refresh");
        ticket
    }

    pub fn is_current(&self, seq: u64) -> bool {
        seq == self.issued
    }

    /// True while the newest ticket has not been resolved.
    pub fn is_loading(&self) -> bool {
        self.applied < self.issued
    }

    /// Mark the newest ticket as resolved without data, after a failed fetch.
    pub fn settle(&mut self, seq: u64) {
        if self.is_current(seq) {
            self.applied = seq;
        }
    }

    /// Load a fetch result into `store` if it answers the newest ticket.
    pub fn apply(
        &mut self,
        seq: u64,
        transactions: Vec<Transaction>,
        store: &mut TransactionStore,
    ) -> ApplyOutcome {
        if !self.is_current(seq) {
            tracing::warn!(seq, latest = self.issued, "dropping stale transaction list");
            return ApplyOutcome::Stale;
        }
        store.load(transactions);
        self.applied = seq;
        ApplyOutcome::Applied
    }
}
