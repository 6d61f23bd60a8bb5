use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::categories::{self, OTHERS};
use crate::error::{FlowError, Result};
use crate::models::{parse_date, Transaction, TransactionInput, TransactionType};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormField {
    Type,
    Amount,
    Category,
    CustomCategory,
    Date,
    Description,
}

impl FormField {
    pub const ALL: [FormField; 6] = [
        FormField::Type,
        FormField::Amount,
        FormField::Category,
        FormField::CustomCategory,
        FormField::Date,
        FormField::Description,
    ];

    pub fn label(self) -> &'static str {
        match self {
            FormField::Type => "Type",
            FormField::Amount => "Amount",
            FormField::Category => "Category",
            FormField::CustomCategory => "Custom category",
            FormField::Date => "Date (YYYY-MM-DD)",
            FormField::Description => "Description (optional)",
        }
    }
}

/// Create/edit submission as the user types it. Nothing is checked until
/// [`TransactionForm::validate`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionForm {
    /// Id of the transaction being edited; `None` for a new one.
    pub editing: Option<String>,
    pub kind: TransactionType,
    pub category: String,
    pub custom_category: String,
    pub amount: String,
    pub date: String,
    pub description: String,
    pub focus: FormField,
}

impl TransactionForm {
    pub fn new(today: NaiveDate) -> Self {
        Self {
            editing: None,
            kind: TransactionType::Expense,
            category: String::new(),
            custom_category: String::new(),
            amount: String::new(),
            date: today.format("%Y-%m-%d").to_string(),
            description: String::new(),
            focus: FormField::Type,
        }
    }

    /// Pre-fill from an existing transaction. A category outside the
    /// suggested set shows up as `Others` plus its name.
    pub fn edit(tx: &Transaction) -> Self {
        let (category, custom_category) = if categories::is_suggested(tx.kind, &tx.category) {
            (tx.category.clone(), String::new())
        } else {
            (OTHERS.to_string(), tx.category.clone())
        };
        Self {
            editing: Some(tx.id.clone()),
            kind: tx.kind,
            category,
            custom_category,
            amount: tx.amount.to_string(),
            date: tx.date.format("%Y-%m-%d").to_string(),
            description: tx.description.clone().unwrap_or_default(),
            focus: FormField::Amount,
        }
    }

    pub fn is_edit(&self) -> bool {
        self.editing.is_some()
    }

    pub fn set_kind(&mut self, kind: TransactionType) {
        if kind == self.kind {
            return;
        }
        self.kind = kind;
        if !self.is_edit() {
            self.category.clear();
            self.custom_category.clear();
        }
    }

    pub fn toggle_kind(&mut self) {
        let next = match self.kind {
            TransactionType::Income => TransactionType::Expense,
            TransactionType::Expense => TransactionType::Income,
        };
        self.set_kind(next);
    }

    pub fn wants_custom_category(&self) -> bool {
        self.category == OTHERS
    }

    /// Step through the suggested names for the current type.
    pub fn cycle_category(&mut self, forward: bool) {
        let names = categories::suggested(self.kind);
        let pos = names.iter().position(|c| *c == self.category);
        let next = match (pos, forward) {
            (None, true) => 0,
            (None, false) => names.len() - 1,
            (Some(i), true) => (i + 1) % names.len(),
            (Some(i), false) => (i + names.len() - 1) % names.len(),
        };
        self.category = names[next].to_string();
    }

    pub fn focus_next(&mut self) {
        self.focus = self.step_focus(1);
    }

    pub fn focus_prev(&mut self) {
        self.focus = self.step_focus(FormField::ALL.len() - 1);
    }

    fn step_focus(&self, step: usize) -> FormField {
        let fields = FormField::ALL;
        let mut idx = fields.iter().position(|f| *f == self.focus).unwrap_or(0);
        loop {
            idx = (idx + step) % fields.len();
            let field = fields[idx];
            if field != FormField::CustomCategory || self.wants_custom_category() {
                return field;
            }
        }
    }

    fn focused_text(&mut self) -> Option<&mut String> {
        match self.focus {
            FormField::Amount => Some(&mut self.amount),
            FormField::CustomCategory => Some(&mut self.custom_category),
            FormField::Date => Some(&mut self.date),
            FormField::Description => Some(&mut self.description),
            FormField::Type | FormField::Category => None,
        }
    }

    pub fn input_push(&mut self, c: char) {
        if let Some(text) = self.focused_text() {
            text.push(c);
        }
    }

    pub fn input_backspace(&mut self) {
        if let Some(text) = self.focused_text() {
            text.pop();
        }
    }

    /// The category that will be stored: the custom name when `Others` is chosen.
    pub fn resolved_category(&self) -> Result<String> {
        let chosen = self.category.trim();
        if chosen.is_empty() {
            return Err(FlowError::Validation("Please select a category".into()));
        }
        if chosen == OTHERS {
            let custom = self.custom_category.trim();
            if custom.is_empty() {
                return Err(FlowError::Validation(
                    "Please enter a name for the custom category".into(),
                ));
            }
            return Ok(custom.to_string());
        }
        Ok(chosen.to_string())
    }

    pub fn validate(&self, today: NaiveDate) -> Result<TransactionInput> {
        let amount_text = self.amount.trim();
        if amount_text.is_empty() {
            return Err(FlowError::Validation("Amount is required".into()));
        }
        let amount: Decimal = amount_text
            .parse()
            .map_err(|_| FlowError::Validation(format!("Invalid amount: {amount_text}")))?;
        if amount.is_sign_negative() && !amount.is_zero() {
            return Err(FlowError::Validation("Amount cannot be negative".into()));
        }

        let category = self.resolved_category()?;

        let date = parse_date(&self.date).map_err(FlowError::Validation)?;
        if date > today {
            return Err(FlowError::Validation(format!(
                "Date {date} is in the future"
            )));
        }

        Ok(TransactionInput {
            kind: self.kind,
            category,
            amount,
            description: self.description.trim().to_string(),
            date,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, 15).unwrap()
    }

    fn filled() -> TransactionForm {
        let mut form = TransactionForm::new(today());
        form.amount = "42.50".to_string();
        form.category = "Shopping".to_string();
        form
    }

    #[test]
    fn test_new_form_defaults() {
        let form = TransactionForm::new(today());
        assert_eq!(form.kind, TransactionType::Expense);
        assert_eq!(form.date, "2025-06-15");
        assert!(form.category.is_empty());
        assert!(!form.is_edit());
    }

    #[test]
    fn test_valid_submission() {
        let input = filled().validate(today()).unwrap();
        assert_eq!(input.kind, TransactionType::Expense);
        assert_eq!(input.category, "Shopping");
        assert_eq!(input.amount, Decimal::new(4250, 2));
        assert_eq!(input.date, today());
        assert_eq!(input.description, "");
    }

    #[test]
    fn test_today_is_accepted_future_is_rejected() {
        let mut form = filled();
        form.date = "2025-06-15".to_string();
        assert!(form.validate(today()).is_ok());

        form.date = "2025-06-16".to_string();
        let err = form.validate(today()).unwrap_err();
        assert!(matches!(err, FlowError::Validation(_)));
        assert!(err.to_string().contains("future"));
    }

    #[test]
    fn test_others_submits_custom_name_verbatim() {
        let mut form = filled();
        form.category = OTHERS.to_string();
        form.custom_category = "  Pet Insurance ".to_string();
        let input = form.validate(today()).unwrap();
        assert_eq!(input.category, "Pet Insurance");
    }

    #[test]
    fn test_others_without_custom_name_is_rejected() {
        let mut form = filled();
        form.category = OTHERS.to_string();
        let err = form.validate(today()).unwrap_err();
        assert!(err.to_string().contains("custom category"));
    }

    #[test]
    fn test_missing_category_is_rejected() {
        let mut form = filled();
        form.category.clear();
        assert!(form.validate(today()).is_err());
    }

    #[test]
    fn test_amount_rules() {
        let mut form = filled();
        form.amount = "-1".to_string();
        assert!(form.validate(today()).is_err());

        form.amount = "abc".to_string();
        assert!(form.validate(today()).is_err());

        form.amount = "  ".to_string();
        assert!(form.validate(today()).is_err());

        form.amount = "0".to_string();
        assert_eq!(form.validate(today()).unwrap().amount, Decimal::ZERO);
    }

    #[test]
    fn test_changing_type_resets_category_for_new_form() {
        let mut form = filled();
        form.set_kind(TransactionType::Income);
        assert!(form.category.is_empty());
    }

    #[test]
    fn test_changing_type_keeps_category_when_editing() {
        let tx = Transaction {
            id: "abc".to_string(),
            kind: TransactionType::Expense,
            category: "Housing".to_string(),
            amount: Decimal::new(900, 0),
            date: today(),
            description: Some("Rent".to_string()),
        };
        let mut form = TransactionForm::edit(&tx);
        form.set_kind(TransactionType::Income);
        assert_eq!(form.category, "Housing");
        assert_eq!(form.editing.as_deref(), Some("abc"));
        assert_eq!(form.description, "Rent");
    }

    #[test]
    fn test_edit_with_custom_category_prefills_others() {
        let tx = Transaction {
            id: "x".to_string(),
            kind: TransactionType::Income,
            category: "Lottery".to_string(),
            amount: Decimal::new(5, 0),
            date: today(),
            description: None,
        };
        let form = TransactionForm::edit(&tx);
        assert_eq!(form.category, OTHERS);
        assert_eq!(form.custom_category, "Lottery");
        assert_eq!(form.validate(today()).unwrap().category, "Lottery");
    }

    #[test]
    fn test_cycle_category_follows_type_vocabulary() {
        let mut form = TransactionForm::new(today());
        form.set_kind(TransactionType::Income);
        form.cycle_category(true);
        assert_eq!(form.category, "Salary");
        form.cycle_category(false);
        assert_eq!(form.category, OTHERS);
        form.cycle_category(true);
        assert_eq!(form.category, "Salary");
    }

    #[test]
    fn test_focus_skips_custom_category_unless_others() {
        let mut form = TransactionForm::new(today());
        form.focus = FormField::Category;
        form.focus_next();
        assert_eq!(form.focus, FormField::Date);

        form.category = OTHERS.to_string();
        form.focus = FormField::Category;
        form.focus_next();
        assert_eq!(form.focus, FormField::CustomCategory);
        form.focus_prev();
        assert_eq!(form.focus, FormField::Category);
    }

    #[test]
    fn test_typing_goes_to_focused_field() {
        let mut form = TransactionForm::new(today());
        form.focus = FormField::Amount;
        form.input_push('1');
        form.input_push('2');
        form.input_backspace();
        form.input_push('5');
        assert_eq!(form.amount, "15");

        form.focus = FormField::Type;
        form.input_push('x');
        assert_eq!(form.amount, "15");
    }
}
