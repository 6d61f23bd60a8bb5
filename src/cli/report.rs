use colored::Colorize;

use super::{client, runtime};
use crate::error::Result;
use crate::tui::wrap_text;

const WIDTH: usize = 78;

pub fn run() -> Result<()> {
    let api = client()?;
    println!("Generating report...");
    let report = runtime()?.block_on(api.generate_report())?;

    println!("\n{}", "Summary".bold().underline());
    println!("{}", wrap_text(&report.summary, WIDTH).0);
    if !report.advice.is_empty() {
        println!("\n{}", "Advice".bold().underline());
        println!("{}", wrap_text(&report.advice, WIDTH).0);
    }
    Ok(())
}
