use chrono::NaiveDate;
use crossterm::event::KeyCode;
use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table, TableState, Wrap},
    Frame,
};

use crate::categories;
use crate::fmt::money;
use crate::form::{FormField, TransactionForm};
use crate::models::TransactionType;
use crate::state::{AppState, DateBound, Effect, Modal, OPTION_LABELS};
use crate::tui::{
    self, centered_rect, ACCENT_STYLE, AMOUNT_NEG_STYLE, AMOUNT_POS_STYLE, FOOTER_STYLE,
    HEADER_STYLE, SELECTED_STYLE,
};

const NORMAL_KEYS: &str =
    "\u{2191}/\u{2193}:select  n:new  o:options  t:type  c:category  s/e:dates  x:clear  r:report  L:logout  q:quit";

/// The interactive transaction view. Owns the [`AppState`] and maps keys
/// onto its transitions.
pub struct Dashboard {
    pub app: AppState,
    symbol: String,
    table_state: TableState,
}

impl Dashboard {
    pub fn new(symbol: String) -> Self {
        Self {
            app: AppState::new(),
            symbol,
            table_state: TableState::default(),
        }
    }

    /// Handle a key press. Returns the effects the runtime must execute.
    pub fn handle_key_event(&mut self, code: KeyCode, today: NaiveDate) -> Vec<Effect> {
        let app = &mut self.app;
        match &mut app.modal {
            Modal::None => {
                app.status = None;
                match code {
                    KeyCode::Char('q') | KeyCode::Esc => app.quit = true,
                    KeyCode::Down | KeyCode::Char('j') => app.select_next(),
                    KeyCode::Up | KeyCode::Char('k') => app.select_prev(),
                    KeyCode::Char('t') => return app.cycle_type_filter(),
                    KeyCode::Char('c') => return app.cycle_category_filter(),
                    KeyCode::Char('s') => app.open_date_filter(DateBound::Start),
                    KeyCode::Char('e') => app.open_date_filter(DateBound::End),
                    KeyCode::Char('x') => return app.clear_filters(),
                    KeyCode::Char('n') => app.open_new_form(today),
                    KeyCode::Char('o') | KeyCode::Enter => app.open_options(),
                    KeyCode::Char('r') => return app.request_report(),
                    KeyCode::Char('L') => return app.logout(),
                    _ => {}
                }
            }
            Modal::Form(form) => match code {
                KeyCode::Esc => app.close_modal(),
                KeyCode::Enter => return app.submit_form(today),
                KeyCode::Tab | KeyCode::Down => form.focus_next(),
                KeyCode::BackTab | KeyCode::Up => form.focus_prev(),
                KeyCode::Left | KeyCode::Right | KeyCode::Char(' ')
                    if form.focus == FormField::Type =>
                {
                    form.toggle_kind()
                }
                KeyCode::Left if form.focus == FormField::Category => form.cycle_category(false),
                KeyCode::Right | KeyCode::Char(' ') if form.focus == FormField::Category => {
                    form.cycle_category(true)
                }
                KeyCode::Backspace => form.input_backspace(),
                KeyCode::Char(c) => form.input_push(c),
                _ => {}
            },
            Modal::Options { selection, .. } => match code {
                KeyCode::Esc | KeyCode::Char('q') => app.close_modal(),
                KeyCode::Up => *selection = selection.saturating_sub(1),
                KeyCode::Down => *selection = (*selection + 1).min(OPTION_LABELS.len() - 1),
                KeyCode::Char('e') => {
                    *selection = 0;
                    app.choose_option();
                }
                KeyCode::Char('d') => {
                    *selection = 1;
                    app.choose_option();
                }
                KeyCode::Enter => app.choose_option(),
                _ => {}
            },
            Modal::ConfirmDelete { .. } => match code {
                KeyCode::Char('y') | KeyCode::Enter => return app.confirm_delete(),
                KeyCode::Char('n') | KeyCode::Esc => app.close_modal(),
                _ => {}
            },
            Modal::DateFilter { input, .. } => match code {
                KeyCode::Esc => app.close_modal(),
                KeyCode::Enter => return app.submit_date_filter(),
                KeyCode::Backspace => {
                    input.pop();
                }
                KeyCode::Char(c) => input.push(c),
                _ => {}
            },
            Modal::Report => match code {
                KeyCode::Esc | KeyCode::Enter | KeyCode::Char('q') => app.close_modal(),
                _ => {}
            },
        }
        Vec::new()
    }

    pub fn draw_frame(&mut self, frame: &mut Frame) {
        let area = frame.area();
        let [title_area, totals_area, filters_area, table_area, status_area, keys_area] =
            Layout::vertical([
                Constraint::Length(1),
                Constraint::Length(1),
                Constraint::Length(1),
                Constraint::Fill(1),
                Constraint::Length(1),
                Constraint::Length(1),
            ])
            .areas(area);

        let greeting = match &self.app.user {
            Some(user) => format!(" FrugalFlow \u{2022} Hello, {}", user.display_name()),
            None => " FrugalFlow".to_string(),
        };
        frame.render_widget(Paragraph::new(greeting).style(HEADER_STYLE), title_area);

        self.draw_totals(frame, totals_area);
        self.draw_filters(frame, filters_area);
        self.draw_table(frame, table_area);

        let status = if self.app.loading_report {
            "Generating your monthly report...".to_string()
        } else {
            self.app.status.clone().unwrap_or_default()
        };
        frame.render_widget(Paragraph::new(format!(" {status}")), status_area);
        frame.render_widget(Paragraph::new(NORMAL_KEYS).style(FOOTER_STYLE), keys_area);

        match &self.app.modal {
            Modal::None => {}
            Modal::Form(form) => self.draw_form(frame, form),
            Modal::Options { selection, .. } => draw_options(frame, *selection),
            Modal::ConfirmDelete { .. } => draw_confirm_delete(frame),
            Modal::DateFilter { bound, input } => draw_date_filter(frame, *bound, input),
            Modal::Report => self.draw_report(frame),
        }
    }

    fn draw_totals(&self, frame: &mut Frame, area: Rect) {
        if self.app.store.is_empty() {
            return;
        }
        let totals = self.app.store.aggregate();
        let line = Line::from(vec![
            Span::raw(" Income "),
            Span::styled(money(totals.income, &self.symbol), AMOUNT_POS_STYLE),
            Span::raw("   Expense "),
            Span::styled(money(totals.expense, &self.symbol), AMOUNT_NEG_STYLE),
            Span::raw("   Balance "),
            Span::styled(
                money(totals.balance(), &self.symbol),
                Style::default().add_modifier(Modifier::BOLD),
            ),
        ]);
        frame.render_widget(Paragraph::new(line), area);
    }

    fn draw_filters(&self, frame: &mut Frame, area: Rect) {
        let criteria = self.app.filters.criteria();
        let loading = if self.app.is_loading() { "  (loading...)" } else { "" };
        let hint = if criteria.is_empty() { "" } else { "  [x: clear]" };
        let text = format!(" Filter: {}{hint}{loading}", criteria.describe());
        frame.render_widget(Paragraph::new(text).style(FOOTER_STYLE), area);
    }

    fn draw_table(&mut self, frame: &mut Frame, area: Rect) {
        if self.app.store.is_empty() {
            let msg = if self.app.is_loading() {
                " Loading transactions..."
            } else {
                " No transactions yet. Press n to add one."
            };
            frame.render_widget(Paragraph::new(msg), area);
            return;
        }

        let fixed: u16 = 9 + 26 + 14 + 16 + 4;
        let desc_width = (area.width.saturating_sub(fixed) as usize).max(10);

        let rows: Vec<Row> = self
            .app
            .store
            .transactions()
            .iter()
            .map(|tx| {
                let income = tx.kind == TransactionType::Income;
                let kind_style = if income {
                    AMOUNT_POS_STYLE
                } else {
                    AMOUNT_NEG_STYLE
                };
                let (desc, lines) =
                    tui::wrap_text(tx.description.as_deref().unwrap_or(""), desc_width);
                Row::new(vec![
                    Cell::from(Span::styled(tx.kind.label(), kind_style)),
                    Cell::from(format!("{} {}", categories::icon(&tx.category), tx.category)),
                    Cell::from(desc),
                    Cell::from(tx.date.format("%b %-d, %Y").to_string()),
                    Cell::from(tui::money_span(tx.amount, income, &self.symbol)),
                ])
                .height(lines)
            })
            .collect();

        let widths = [
            Constraint::Length(9),
            Constraint::Length(26),
            Constraint::Fill(1),
            Constraint::Length(14),
            Constraint::Length(16),
        ];
        let table = Table::new(rows, widths)
            .header(
                Row::new(vec!["Type", "Category", "Description", "Date", "Amount"])
                    .style(HEADER_STYLE)
                    .bottom_margin(1),
            )
            .column_spacing(1)
            .row_highlight_style(SELECTED_STYLE);

        self.table_state.select(Some(self.app.selected));
        frame.render_stateful_widget(table, area, &mut self.table_state);
    }

    fn draw_form(&self, frame: &mut Frame, form: &TransactionForm) {
        let title = if form.is_edit() {
            " Edit Transaction "
        } else {
            " Add Transaction "
        };
        let mut lines = Vec::new();
        for field in FormField::ALL {
            if field == FormField::CustomCategory && !form.wants_custom_category() {
                continue;
            }
            let value = match field {
                FormField::Type => format!("< {} >", form.kind.label()),
                FormField::Category if form.category.is_empty() => {
                    "< Select a category >".to_string()
                }
                FormField::Category => format!("< {} >", form.category),
                FormField::Amount => format!("{}{}", self.symbol, form.amount),
                FormField::CustomCategory => form.custom_category.clone(),
                FormField::Date => form.date.clone(),
                FormField::Description => form.description.clone(),
            };
            let focused = form.focus == field;
            let marker = if focused { ">" } else { " " };
            let cursor = if focused && !matches!(field, FormField::Type | FormField::Category) {
                "\u{2588}"
            } else {
                ""
            };
            let style = if focused {
                ACCENT_STYLE.add_modifier(Modifier::BOLD)
            } else {
                Style::default()
            };
            lines.push(Line::from(vec![
                Span::styled(format!("{marker} {:<24}", field.label()), style),
                Span::raw(format!("{value}{cursor}")),
            ]));
        }
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            "Tab/\u{2193}:next field  \u{2190}/\u{2192}:change  Enter:save  Esc:cancel",
            FOOTER_STYLE,
        )));

        let area = centered_rect(frame.area(), 72, lines.len() as u16 + 2);
        frame.render_widget(Clear, area);
        frame.render_widget(
            Paragraph::new(lines).block(
                Block::default()
                    .title(title)
                    .borders(Borders::ALL)
                    .border_style(ACCENT_STYLE),
            ),
            area,
        );
    }

    fn draw_report(&self, frame: &mut Frame) {
        let Some(report) = &self.app.report else {
            return;
        };
        let lines = vec![
            Line::from(Span::styled(
                "Summary and advice for the current month based on your transactions.",
                FOOTER_STYLE,
            )),
            Line::from(""),
            Line::from(Span::styled("Summary", HEADER_STYLE)),
            Line::from(report.summary.clone()),
            Line::from(""),
            Line::from(Span::styled("Advice", HEADER_STYLE)),
            Line::from(report.advice.clone()),
        ];
        let outer = frame.area();
        let area = centered_rect(outer, outer.width.saturating_sub(8).min(90), outer.height.saturating_sub(4).min(20));
        frame.render_widget(Clear, area);
        frame.render_widget(
            Paragraph::new(lines).wrap(Wrap { trim: true }).block(
                Block::default()
                    .title(" Monthly AI Report (Esc to close) ")
                    .borders(Borders::ALL)
                    .border_style(ACCENT_STYLE),
            ),
            area,
        );
    }
}

fn draw_options(frame: &mut Frame, selection: usize) {
    let lines: Vec<Line> = OPTION_LABELS
        .iter()
        .enumerate()
        .map(|(i, label)| {
            if i == selection {
                Line::from(Span::styled(format!("> {label}"), SELECTED_STYLE))
            } else {
                Line::from(format!("  {label}"))
            }
        })
        .collect();
    let area = centered_rect(frame.area(), 24, OPTION_LABELS.len() as u16 + 2);
    frame.render_widget(Clear, area);
    frame.render_widget(
        Paragraph::new(lines).block(Block::default().title(" Options ").borders(Borders::ALL)),
        area,
    );
}

fn draw_confirm_delete(frame: &mut Frame) {
    let area = centered_rect(frame.area(), 40, 3);
    frame.render_widget(Clear, area);
    frame.render_widget(
        Paragraph::new("Delete this transaction? (y/n)")
            .style(Style::default().fg(Color::Red))
            .block(Block::default().borders(Borders::ALL)),
        area,
    );
}

fn draw_date_filter(frame: &mut Frame, bound: DateBound, input: &str) {
    let area = centered_rect(frame.area(), 48, 4);
    frame.render_widget(Clear, area);
    frame.render_widget(
        Paragraph::new(vec![
            Line::from(format!("{input}\u{2588}")),
            Line::from(Span::styled("YYYY-MM-DD, empty to remove", FOOTER_STYLE)),
        ])
        .block(
            Block::default()
                .title(format!(" {} ", bound.label()))
                .borders(Borders::ALL),
        ),
        area,
    );
}
