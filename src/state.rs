//! Dashboard state: one structure owning everything the interactive view
//! shows, with explicit transitions.
//!
//! Transitions never touch the network. They return [`Effect`]s for the
//! runtime to execute, and the runtime feeds results back as [`Outcome`]s.

use chrono::NaiveDate;

use crate::categories;
use crate::error::{FlowError, Result};
use crate::filter::{Criterion, FilterController, RefreshTicket};
use crate::form::TransactionForm;
use crate::models::{Transaction, TransactionInput, TransactionType, User};
use crate::report::Report;
use crate::store::TransactionStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateBound {
    Start,
    End,
}

impl DateBound {
    pub fn label(self) -> &'static str {
        match self {
            DateBound::Start => "Start date",
            DateBound::End => "End date",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Modal {
    None,
    Form(TransactionForm),
    /// Edit/delete menu for one transaction.
    Options { id: String, selection: usize },
    ConfirmDelete { id: String },
    DateFilter { bound: DateBound, input: String },
    Report,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    Fetch(RefreshTicket),
    Submit {
        id: Option<String>,
        input: TransactionInput,
    },
    Delete {
        id: String,
    },
    GenerateReport,
    LoadUser,
    Logout,
}

#[derive(Debug)]
pub enum Outcome {
    Fetched {
        seq: u64,
        result: Result<Vec<Transaction>>,
    },
    Submitted(Result<()>),
    Deleted(Result<()>),
    ReportReady(Result<Report>),
    UserLoaded(Result<User>),
    LoggedOut,
}

/// A write sent to the backend whose reply has not arrived yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PendingWrite {
    Add,
    Edit,
    Delete,
}

pub const OPTION_LABELS: [&str; 2] = ["Edit", "Delete"];

#[derive(Debug)]
pub struct AppState {
    pub store: TransactionStore,
    pub filters: FilterController,
    pub modal: Modal,
    pub selected: usize,
    pub report: Option<Report>,
    pub loading_report: bool,
    /// At most one write is in flight; further submits are ignored until it resolves.
    pub pending_write: Option<PendingWrite>,
    pub user: Option<User>,
    pub status: Option<String>,
    pub sign_in_required: bool,
    pub quit: bool,
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

impl AppState {
    pub fn new() -> Self {
        Self {
            store: TransactionStore::new(),
            filters: FilterController::new(),
            modal: Modal::None,
            selected: 0,
            report: None,
            loading_report: false,
            pending_write: None,
            user: None,
            status: None,
            sign_in_required: false,
            quit: false,
        }
    }

    /// First effects after the dashboard opens: auth check and full list.
    pub fn start(&mut self) -> Vec<Effect> {
        vec![Effect::LoadUser, Effect::Fetch(self.filters.refresh())]
    }

    pub fn is_loading(&self) -> bool {
        self.filters.is_loading()
    }

    pub fn selected_transaction(&self) -> Option<&Transaction> {
        self.store.transactions().get(self.selected)
    }

    pub fn select_next(&mut self) {
        if self.selected + 1 < self.store.len() {
            self.selected += 1;
        }
    }

    pub fn select_prev(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    fn clamp_selection(&mut self) {
        self.selected = self.selected.min(self.store.len().saturating_sub(1));
    }

    // ============= Filters =============

    fn criterion(&mut self, criterion: Criterion) -> Vec<Effect> {
        self.filters
            .set_criterion(criterion)
            .map(Effect::Fetch)
            .into_iter()
            .collect()
    }

    /// none → income → expense → none
    pub fn cycle_type_filter(&mut self) -> Vec<Effect> {
        let next = match self.filters.criteria().kind {
            None => Some(TransactionType::Income),
            Some(TransactionType::Income) => Some(TransactionType::Expense),
            Some(TransactionType::Expense) => None,
        };
        self.criterion(Criterion::Type(next))
    }

    /// Category names the filter can take for the current type filter.
    pub fn category_filter_choices(&self) -> Vec<&'static str> {
        let kinds: &[TransactionType] = match self.filters.criteria().kind {
            Some(TransactionType::Income) => &[TransactionType::Income],
            Some(TransactionType::Expense) => &[TransactionType::Expense],
            None => &[TransactionType::Expense, TransactionType::Income],
        };
        let mut names: Vec<&'static str> = Vec::new();
        for kind in kinds {
            for name in categories::suggested(*kind) {
                if *name != categories::OTHERS && !names.contains(name) {
                    names.push(name);
                }
            }
        }
        names
    }

    /// none → first choice → ... → last choice → none
    pub fn cycle_category_filter(&mut self) -> Vec<Effect> {
        let choices = self.category_filter_choices();
        let current = self.filters.criteria().category.as_deref();
        let next = match current.and_then(|c| choices.iter().position(|n| *n == c)) {
            None if current.is_none() => choices.first().map(|c| c.to_string()),
            None => None,
            Some(i) => choices.get(i + 1).map(|c| c.to_string()),
        };
        self.criterion(Criterion::Category(next))
    }

    pub fn open_date_filter(&mut self, bound: DateBound) {
        let current = match bound {
            DateBound::Start => self.filters.criteria().start_date,
            DateBound::End => self.filters.criteria().end_date,
        };
        self.modal = Modal::DateFilter {
            bound,
            input: current.map(|d| d.to_string()).unwrap_or_default(),
        };
    }

    /// Apply the typed date. Empty input removes the constraint.
    pub fn submit_date_filter(&mut self) -> Vec<Effect> {
        let Modal::DateFilter { bound, input } = &self.modal else {
            return Vec::new();
        };
        let bound = *bound;
        let text = input.trim();
        let date = if text.is_empty() {
            None
        } else {
            match crate::models::parse_date(text) {
                Ok(d) => Some(d),
                Err(_) => {
                    self.status = Some(format!("Not a date: {text} (use YYYY-MM-DD)"));
                    return Vec::new();
                }
            }
        };
        self.modal = Modal::None;
        self.criterion(match bound {
            DateBound::Start => Criterion::StartDate(date),
            DateBound::End => Criterion::EndDate(date),
        })
    }

    pub fn clear_filters(&mut self) -> Vec<Effect> {
        vec![Effect::Fetch(self.filters.clear())]
    }

    // ============= Transactions =============

    pub fn open_new_form(&mut self, today: NaiveDate) {
        self.modal = Modal::Form(TransactionForm::new(today));
    }

    pub fn open_options(&mut self) {
        if let Some(tx) = self.selected_transaction() {
            self.modal = Modal::Options {
                id: tx.id.clone(),
                selection: 0,
            };
        }
    }

    pub fn choose_option(&mut self) {
        let Modal::Options { id, selection } = &self.modal else {
            return;
        };
        let (id, selection) = (id.clone(), *selection);
        match selection {
            0 => match self.store.get(&id) {
                Some(tx) => self.modal = Modal::Form(TransactionForm::edit(tx)),
                None => self.modal = Modal::None,
            },
            _ => self.modal = Modal::ConfirmDelete { id },
        }
    }

    pub fn submit_form(&mut self, today: NaiveDate) -> Vec<Effect> {
        let Modal::Form(form) = &self.modal else {
            return Vec::new();
        };
        if self.pending_write.is_some() {
            return Vec::new();
        }
        match form.validate(today) {
            Ok(input) => {
                self.status = Some("Saving...".to_string());
                self.pending_write = Some(if form.is_edit() {
                    PendingWrite::Edit
                } else {
                    PendingWrite::Add
                });
                vec![Effect::Submit {
                    id: form.editing.clone(),
                    input,
                }]
            }
            Err(e) => {
                self.status = Some(e.to_string());
                Vec::new()
            }
        }
    }

    pub fn confirm_delete(&mut self) -> Vec<Effect> {
        let Modal::ConfirmDelete { id } = &self.modal else {
            return Vec::new();
        };
        if self.pending_write.is_some() {
            return Vec::new();
        }
        let id = id.clone();
        self.modal = Modal::None;
        self.pending_write = Some(PendingWrite::Delete);
        vec![Effect::Delete { id }]
    }

    pub fn request_report(&mut self) -> Vec<Effect> {
        if self.loading_report {
            return Vec::new();
        }
        self.loading_report = true;
        vec![Effect::GenerateReport]
    }

    pub fn close_modal(&mut self) {
        self.modal = Modal::None;
    }

    pub fn logout(&mut self) -> Vec<Effect> {
        vec![Effect::Logout]
    }

    // ============= Network results =============

    fn fail(&mut self, context: &str, err: FlowError) {
        if err.is_unauthorized() {
            self.sign_in_required = true;
        }
        tracing::warn!("{context}: {err}");
        self.status = Some(format!("{context}: {err}"));
    }

    pub fn handle(&mut self, outcome: Outcome) -> Vec<Effect> {
        match outcome {
            Outcome::Fetched { seq, result } => {
                match result {
                    Ok(list) => {
                        self.filters.apply(seq, list, &mut self.store);
                        self.clamp_selection();
                    }
                    Err(e) => {
                        self.filters.settle(seq);
                        self.fail("Could not load transactions", e);
                    }
                }
                Vec::new()
            }
            Outcome::Submitted(result) => match result {
                Ok(()) => {
                    let edited = self.pending_write.take() == Some(PendingWrite::Edit);
                    if matches!(self.modal, Modal::Form(_)) {
                        self.modal = Modal::None;
                    }
                    self.status = Some(if edited {
                        "Transaction updated".to_string()
                    } else {
                        "Transaction added".to_string()
                    });
                    vec![Effect::Fetch(self.filters.refresh())]
                }
                Err(e) => {
                    self.pending_write = None;
                    self.fail("Could not save transaction", e);
                    Vec::new()
                }
            },
            Outcome::Deleted(result) => match result {
                Ok(()) => {
                    self.pending_write = None;
                    self.status = Some("Transaction deleted".to_string());
                    vec![Effect::Fetch(self.filters.refresh())]
                }
                Err(e) => {
                    self.pending_write = None;
                    self.fail("Could not delete transaction", e);
                    Vec::new()
                }
            },
            Outcome::ReportReady(result) => {
                self.loading_report = false;
                match result {
                    Ok(report) => {
                        self.report = Some(report);
                        self.modal = Modal::Report;
                    }
                    Err(e) => self.fail("Could not generate report", e),
                }
                Vec::new()
            }
            Outcome::UserLoaded(result) => {
                match result {
                    Ok(user) => self.user = Some(user),
                    Err(e) => self.fail("Could not load profile", e),
                }
                Vec::new()
            }
            Outcome::LoggedOut => {
                self.quit = true;
                Vec::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use super::*;
    use crate::filter::Query;
    use crate::form::FormField;
    use crate::store::tests::tx;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, 15).unwrap()
    }

    fn fetch_seq(effects: &[Effect]) -> u64 {
        effects
            .iter()
            .find_map(|e| match e {
                Effect::Fetch(t) => Some(t.seq),
                _ => None,
            })
            .expect("expected a fetch effect")
    }

    fn loaded(list: Vec<Transaction>) -> AppState {
        let mut app = AppState::new();
        let seq = fetch_seq(&app.start());
        app.handle(Outcome::Fetched { seq, result: Ok(list) });
        app
    }

    #[test]
    fn test_start_loads_user_and_everything() {
        let mut app = AppState::new();
        let effects = app.start();
        assert_eq!(effects.len(), 2);
        assert_eq!(effects[0], Effect::LoadUser);
        match &effects[1] {
            Effect::Fetch(ticket) => assert_eq!(ticket.query, Query::All),
            other => panic!("unexpected effect {other:?}"),
        }
        assert!(app.is_loading());
    }

    #[test]
    fn test_back_to_back_type_changes_show_only_latest() {
        let mut app = loaded(vec![]);
        let income = fetch_seq(&app.cycle_type_filter());
        let expense = fetch_seq(&app.cycle_type_filter());
        assert_eq!(app.filters.criteria().kind, Some(TransactionType::Expense));

        app.handle(Outcome::Fetched {
            seq: expense,
            result: Ok(vec![tx("e", TransactionType::Expense, "Housing", "10")]),
        });
        app.handle(Outcome::Fetched {
            seq: income,
            result: Ok(vec![tx("i", TransactionType::Income, "Salary", "99")]),
        });

        let ids: Vec<&str> = app.store.transactions().iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["e"]);
        assert_eq!(app.store.aggregate().income, Decimal::ZERO);
    }

    #[test]
    fn test_type_change_clears_category_filter() {
        let mut app = loaded(vec![]);
        app.cycle_type_filter();
        app.cycle_category_filter();
        assert_eq!(app.filters.criteria().category.as_deref(), Some("Salary"));

        let effects = app.cycle_type_filter();
        assert_eq!(effects.len(), 1);
        assert_eq!(app.filters.criteria().category, None);
    }

    #[test]
    fn test_category_cycle_wraps_to_none() {
        let mut app = loaded(vec![]);
        app.cycle_type_filter(); // income
        let choices = app.category_filter_choices();
        assert_eq!(choices, vec!["Salary", "Free Lance", "Investments"]);
        for _ in 0..choices.len() {
            app.cycle_category_filter();
        }
        assert_eq!(app.filters.criteria().category.as_deref(), Some("Investments"));
        app.cycle_category_filter();
        assert_eq!(app.filters.criteria().category, None);
    }

    #[test]
    fn test_category_choices_without_type_are_deduplicated() {
        let app = AppState::new();
        let choices = app.category_filter_choices();
        assert_eq!(choices.iter().filter(|c| **c == "Investments").count(), 1);
        assert!(!choices.contains(&categories::OTHERS));
        assert!(choices.contains(&"Salary"));
        assert!(choices.contains(&"Housing"));
    }

    #[test]
    fn test_date_filter_parse_and_clear() {
        let mut app = loaded(vec![]);
        app.open_date_filter(DateBound::Start);
        if let Modal::DateFilter { input, .. } = &mut app.modal {
            input.push_str("2025-13-01");
        }
        assert!(app.submit_date_filter().is_empty());
        assert!(app.status.as_deref().unwrap().contains("Not a date"));
        assert!(matches!(app.modal, Modal::DateFilter { .. }));

        if let Modal::DateFilter { input, .. } = &mut app.modal {
            *input = "2025-01-01".to_string();
        }
        let effects = app.submit_date_filter();
        assert_eq!(effects.len(), 1);
        assert_eq!(app.filters.criteria().start_date, NaiveDate::from_ymd_opt(2025, 1, 1));
        assert_eq!(app.modal, Modal::None);

        app.open_date_filter(DateBound::Start);
        if let Modal::DateFilter { input, .. } = &mut app.modal {
            input.clear();
        }
        assert_eq!(app.submit_date_filter().len(), 1);
        assert_eq!(app.filters.criteria().start_date, None);
    }

    #[test]
    fn test_clear_filters_is_single_fetch_all() {
        let mut app = loaded(vec![]);
        app.cycle_type_filter();
        app.cycle_category_filter();
        let effects = app.clear_filters();
        assert_eq!(effects.len(), 1);
        match &effects[0] {
            Effect::Fetch(ticket) => assert_eq!(ticket.query, Query::All),
            other => panic!("unexpected effect {other:?}"),
        }
    }

    #[test]
    fn test_invalid_form_blocks_submission() {
        let mut app = loaded(vec![]);
        app.open_new_form(today());
        let effects = app.submit_form(today());
        assert!(effects.is_empty());
        assert_eq!(app.status.as_deref(), Some("Amount is required"));
        assert!(matches!(app.modal, Modal::Form(_)));
    }

    #[test]
    fn test_second_submit_ignored_while_saving() {
        let mut app = loaded(vec![]);
        app.open_new_form(today());
        if let Modal::Form(form) = &mut app.modal {
            form.amount = "5".to_string();
            form.category = "Shopping".to_string();
        }
        assert_eq!(app.submit_form(today()).len(), 1);
        assert!(app.submit_form(today()).is_empty());

        app.handle(Outcome::Submitted(Err(FlowError::Other("timeout".into()))));
        assert_eq!(app.pending_write, None);
        // After a failure the same form can be sent again.
        assert_eq!(app.submit_form(today()).len(), 1);
    }

    #[test]
    fn test_edit_reported_as_update_after_form_closed() {
        let mut app = loaded(vec![tx("abc", TransactionType::Expense, "Housing", "900")]);
        app.open_options();
        app.choose_option();
        assert_eq!(app.submit_form(today()).len(), 1);
        app.close_modal();
        app.handle(Outcome::Submitted(Ok(())));
        assert_eq!(app.status.as_deref(), Some("Transaction updated"));
    }

    #[test]
    fn test_second_delete_ignored_while_deleting() {
        let mut app = loaded(vec![
            tx("a", TransactionType::Expense, "Housing", "1"),
            tx("b", TransactionType::Expense, "Housing", "2"),
        ]);
        app.modal = Modal::ConfirmDelete { id: "a".to_string() };
        assert_eq!(app.confirm_delete().len(), 1);
        app.modal = Modal::ConfirmDelete { id: "b".to_string() };
        assert!(app.confirm_delete().is_empty());

        app.handle(Outcome::Deleted(Ok(())));
        assert_eq!(app.pending_write, None);
        assert_eq!(app.confirm_delete(), vec![Effect::Delete { id: "b".to_string() }]);
    }

    #[test]
    fn test_successful_submit_refetches_instead_of_patching() {
        let mut app = loaded(vec![tx("1", TransactionType::Income, "Salary", "10")]);
        app.open_new_form(today());
        if let Modal::Form(form) = &mut app.modal {
            form.amount = "5".to_string();
            form.category = "Shopping".to_string();
        }
        let effects = app.submit_form(today());
        assert!(matches!(effects.as_slice(), [Effect::Submit { id: None, .. }]));

        let effects = app.handle(Outcome::Submitted(Ok(())));
        assert_eq!(app.modal, Modal::None);
        assert_eq!(app.status.as_deref(), Some("Transaction added"));
        // The local list is untouched until the re-fetch resolves.
        assert_eq!(app.store.len(), 1);
        assert_eq!(effects.len(), 1);
        assert!(matches!(effects[0], Effect::Fetch(_)));
    }

    #[test]
    fn test_edit_flow_submits_with_id() {
        let mut app = loaded(vec![tx("abc", TransactionType::Expense, "Housing", "900")]);
        app.open_options();
        assert_eq!(
            app.modal,
            Modal::Options { id: "abc".to_string(), selection: 0 }
        );
        app.choose_option();
        match &mut app.modal {
            Modal::Form(form) => {
                assert_eq!(form.editing.as_deref(), Some("abc"));
                assert_eq!(form.focus, FormField::Amount);
                form.amount = "950".to_string();
            }
            other => panic!("unexpected modal {other:?}"),
        }
        let effects = app.submit_form(today());
        match effects.as_slice() {
            [Effect::Submit { id, input }] => {
                assert_eq!(id.as_deref(), Some("abc"));
                assert_eq!(input.amount, Decimal::new(950, 0));
                assert_eq!(input.category, "Housing");
            }
            other => panic!("unexpected effects {other:?}"),
        }
        app.handle(Outcome::Submitted(Ok(())));
        assert_eq!(app.status.as_deref(), Some("Transaction updated"));
    }

    #[test]
    fn test_delete_flow() {
        let mut app = loaded(vec![tx("abc", TransactionType::Expense, "Housing", "900")]);
        app.open_options();
        if let Modal::Options { selection, .. } = &mut app.modal {
            *selection = 1;
        }
        app.choose_option();
        assert_eq!(app.modal, Modal::ConfirmDelete { id: "abc".to_string() });

        let effects = app.confirm_delete();
        assert_eq!(effects, vec![Effect::Delete { id: "abc".to_string() }]);
        let effects = app.handle(Outcome::Deleted(Ok(())));
        assert!(matches!(effects.as_slice(), [Effect::Fetch(_)]));
    }

    #[test]
    fn test_failed_fetch_keeps_list_and_reports() {
        let mut app = loaded(vec![tx("1", TransactionType::Income, "Salary", "10")]);
        let seq = fetch_seq(&app.cycle_type_filter());
        app.handle(Outcome::Fetched {
            seq,
            result: Err(FlowError::Other("connection refused".into())),
        });
        assert_eq!(app.store.len(), 1);
        assert!(!app.is_loading());
        assert!(!app.sign_in_required);
        assert!(app.status.as_deref().unwrap().contains("connection refused"));
    }

    #[test]
    fn test_unauthorized_requires_sign_in() {
        let mut app = AppState::new();
        app.start();
        app.handle(Outcome::UserLoaded(Err(FlowError::Unauthorized)));
        assert!(app.sign_in_required);
    }

    #[test]
    fn test_report_loading_flag() {
        let mut app = loaded(vec![]);
        assert_eq!(app.request_report(), vec![Effect::GenerateReport]);
        assert!(app.loading_report);
        // A second press while loading does nothing.
        assert!(app.request_report().is_empty());

        app.handle(Outcome::ReportReady(Ok(Report::parse("a || b"))));
        assert!(!app.loading_report);
        assert_eq!(app.modal, Modal::Report);
        assert_eq!(app.report.as_ref().unwrap().advice, "b");
    }

    #[test]
    fn test_report_failure_clears_loading() {
        let mut app = loaded(vec![]);
        app.request_report();
        app.handle(Outcome::ReportReady(Err(FlowError::Backend {
            status: 500,
            message: "model offline".into(),
        })));
        assert!(!app.loading_report);
        assert_eq!(app.modal, Modal::None);
    }

    #[test]
    fn test_selection_clamped_after_smaller_load() {
        let mut app = loaded(vec![
            tx("1", TransactionType::Income, "Salary", "1"),
            tx("2", TransactionType::Income, "Salary", "2"),
            tx("3", TransactionType::Income, "Salary", "3"),
        ]);
        app.select_next();
        app.select_next();
        app.select_next();
        assert_eq!(app.selected, 2);

        let seq = fetch_seq(&app.cycle_type_filter());
        app.handle(Outcome::Fetched {
            seq,
            result: Ok(vec![tx("1", TransactionType::Income, "Salary", "1")]),
        });
        assert_eq!(app.selected, 0);
    }

    #[test]
    fn test_logout() {
        let mut app = loaded(vec![]);
        assert_eq!(app.logout(), vec![Effect::Logout]);
        app.handle(Outcome::LoggedOut);
        assert!(app.quit);
    }
}
