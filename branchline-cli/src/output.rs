//! Colored status lines and table construction shared by all commands

use colored::Colorize;
use comfy_table::{presets::UTF8_FULL_CONDENSED, ContentArrangement, Table};
use rust_decimal::Decimal;

pub fn success(msg: &str) {
    println!("{}", msg.green());
}

pub fn error(msg: &str) {
    eprintln!("{}", msg.red());
}

pub fn warning(msg: &str) {
    println!("{}", msg.yellow());
}

pub fn info(msg: &str) {
    println!("{}", msg.cyan());
}

/// A table in the house style; callers add headers and rows
pub fn create_table() -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table
}

/// Money is always shown with exactly two decimal places
pub fn format_amount(amount: Decimal) -> String {
    format!("{:.2}", amount)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_amount_pads_to_two_decimals() {
        assert_eq!(format_amount(Decimal::new(100, 0)), "100.00");
        assert_eq!(format_amount(Decimal::new(12345, 2)), "123.45");
        assert_eq!(format_amount(Decimal::new(5, 1)), "0.50");
    }
}
