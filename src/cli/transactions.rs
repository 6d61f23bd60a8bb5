use chrono::Local;
use colored::Colorize;
use comfy_table::{Cell, CellAlignment, Table};

use super::{client, runtime, FilterArgs, TransactionArgs};
use crate::categories::OTHERS;
use crate::error::Result;
use crate::fmt::{money, signed_money};
use crate::form::TransactionForm;
use crate::models::{TransactionInput, TransactionType};
use crate::settings::load_settings;
use crate::store::{Totals, TransactionStore};

fn fetch(filters: &FilterArgs) -> Result<TransactionStore> {
    let api = client()?;
    let criteria = filters.criteria();
    let rt = runtime()?;
    let list = if criteria.is_empty() {
        rt.block_on(api.all_transactions())?
    } else {
        rt.block_on(api.filter_transactions(&criteria))?
    };
    let mut store = TransactionStore::new();
    store.load(list);
    Ok(store)
}

fn print_totals(totals: &Totals, symbol: &str) {
    println!("Total Income:   {}", money(totals.income, symbol).green());
    println!("Total Expense:  {}", money(totals.expense, symbol).red());
    println!("Balance:        {}", money(totals.balance(), symbol).bold());
}

pub fn list(filters: FilterArgs) -> Result<()> {
    let symbol = load_settings().currency_symbol;
    let store = fetch(&filters)?;

    if store.is_empty() {
        println!("No transactions found ({}).", filters.criteria().describe());
        return Ok(());
    }

    let mut table = Table::new();
    let mut header = Vec::new();
    if filters.ids {
        header.push("ID");
    }
    header.extend(["Date", "Type", "Category", "Description", "Amount"]);
    table.set_header(header);

    for tx in store.transactions() {
        let income = tx.kind == TransactionType::Income;
        let mut row = Vec::new();
        if filters.ids {
            row.push(Cell::new(&tx.id));
        }
        row.push(Cell::new(tx.date.format("%b %-d, %Y")));
        row.push(Cell::new(tx.kind.label()));
        row.push(Cell::new(&tx.category));
        row.push(Cell::new(tx.description.as_deref().unwrap_or("")));
        row.push(
            Cell::new(signed_money(tx.amount, income, &symbol)).set_alignment(CellAlignment::Right),
        );
        table.add_row(row);
    }
    println!("Transactions ({})\n{table}", filters.criteria().describe());
    print_totals(&store.aggregate(), &symbol);
    Ok(())
}

pub fn summary(filters: FilterArgs) -> Result<()> {
    let symbol = load_settings().currency_symbol;
    let store = fetch(&filters)?;
    println!("{} ({} transactions)", filters.criteria().describe(), store.len());
    print_totals(&store.aggregate(), &symbol);
    Ok(())
}

pub(crate) fn to_form(fields: &TransactionArgs) -> TransactionForm {
    let today = Local::now().date_naive();
    let mut form = TransactionForm::new(today);
    form.kind = fields.kind;
    form.category = fields.category.trim().to_string();
    if let Some(custom) = &fields.custom_category {
        // A custom name alone implies the open-ended choice.
        if form.category.is_empty() {
            form.category = OTHERS.to_string();
        }
        form.custom_category = custom.clone();
    }
    form.amount = fields.amount.clone();
    if let Some(date) = &fields.date {
        form.date = date.clone();
    }
    form.description = fields.description.clone().unwrap_or_default();
    form
}

/// Validation runs before any request is made.
pub(crate) fn validated(fields: &TransactionArgs) -> Result<TransactionInput> {
    to_form(fields).validate(Local::now().date_naive())
}

pub fn add(fields: TransactionArgs) -> Result<()> {
    let input = validated(&fields)?;
    let api = client()?;
    runtime()?.block_on(api.add_transaction(&input))?;
    println!(
        "Added {} {}: {}",
        input.kind,
        input.category,
        money(input.amount, &load_settings().currency_symbol)
    );
    Ok(())
}

pub fn edit(id: &str, fields: TransactionArgs) -> Result<()> {
    let input = validated(&fields)?;
    let api = client()?;
    runtime()?.block_on(api.update_transaction(id, &input))?;
    println!("Updated transaction {id}");
    Ok(())
}

pub fn delete(id: &str) -> Result<()> {
    let api = client()?;
    runtime()?.block_on(api.delete_transaction(id))?;
    println!("Deleted transaction {id}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FlowError;

    fn args() -> TransactionArgs {
        TransactionArgs {
            kind: TransactionType::Expense,
            category: "Shopping".to_string(),
            custom_category: None,
            amount: "12.34".to_string(),
            date: None,
            description: Some("  socks ".to_string()),
        }
    }

    #[test]
    fn test_defaults_to_today() {
        let input = validated(&args()).unwrap();
        assert_eq!(input.date, Local::now().date_naive());
        assert_eq!(input.description, "socks");
    }

    #[test]
    fn test_custom_category_alone_implies_others() {
        let mut fields = args();
        fields.category = String::new();
        fields.custom_category = Some("Gym".to_string());
        assert_eq!(validated(&fields).unwrap().category, "Gym");
    }

    #[test]
    fn test_others_without_name_fails_before_request() {
        let mut fields = args();
        fields.category = OTHERS.to_string();
        assert!(matches!(validated(&fields), Err(FlowError::Validation(_))));
    }

    #[test]
    fn test_future_date_fails() {
        let mut fields = args();
        let tomorrow = Local::now().date_naive().succ_opt().unwrap();
        fields.date = Some(tomorrow.to_string());
        assert!(validated(&fields).is_err());
    }
}
