use chrono::{NaiveDate, Utc};

use crate::{
    constants::{SHOPPING_LIST_EMPTY, SHOPPING_LIST_SIGNATURE, SHOPPING_LIST_TITLE},
    error::Error,
    schema::{CartIngredient, Id},
    store::Store,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShoppingListLine {
    pub index: usize,
    pub name: String,
    pub measurement_unit: String,
    pub amount: i64,
}

/// First character upper-cased, the rest lower-cased.
pub fn capitalize(value: &str) -> String {
    let mut chars = value.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    }
}

/// Sums amounts per (capitalized name, unit), keeping the order in which each
/// group was first seen. Recipe identity plays no part in the grouping.
pub fn aggregate(rows: &[CartIngredient]) -> Vec<ShoppingListLine> {
    let mut lines: Vec<ShoppingListLine> = Vec::new();

    for row in rows {
        let name = capitalize(&row.name);
        match lines
            .iter_mut()
            .find(|l| l.name == name && l.measurement_unit == row.measurement_unit)
        {
            Some(line) => line.amount += i64::from(row.amount),
            None => lines.push(ShoppingListLine {
                index: lines.len() + 1,
                name,
                measurement_unit: row.measurement_unit.to_owned(),
                amount: i64::from(row.amount),
            }),
        }
    }

    lines
}

pub fn render(lines: &[ShoppingListLine], date: NaiveDate) -> String {
    let mut document = format!("{SHOPPING_LIST_TITLE}\n\n");

    if lines.is_empty() {
        document.push_str(SHOPPING_LIST_EMPTY);
        document.push('\n');
    }
    for line in lines {
        document.push_str(&format!(
            "{}. {} ({}) - {}\n",
            line.index, line.name, line.measurement_unit, line.amount
        ));
    }

    document.push_str(&format!(
        "\n----------\n{} {SHOPPING_LIST_SIGNATURE}\n",
        date.format("%Y-%m-%d")
    ));
    document
}

pub async fn build_report(store: &dyn Store, user_id: Id) -> Result<String, Error> {
    let rows = store.list_cart_ingredients(user_id).await?;
    let lines = aggregate(&rows);
    log::info!(
        "Built shopping list for user {user_id}: {} rows into {} lines",
        rows.len(),
        lines.len()
    );

    Ok(render(&lines, Utc::now().date_naive()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(name: &str, unit: &str, amount: i32) -> CartIngredient {
        CartIngredient {
            name: name.to_owned(),
            measurement_unit: unit.to_owned(),
            amount,
        }
    }

    #[test]
    fn capitalization() {
        assert_eq!(capitalize("fLOUR"), "Flour");
        assert_eq!(capitalize("яйца"), "Яйца");
        assert_eq!(capitalize(""), "");
    }

    #[test]
    fn same_ingredient_from_two_recipes_merges() {
        let lines = aggregate(&[row("flour", "g", 100), row("Flour", "g", 50)]);
        assert_eq!(
            lines,
            vec![ShoppingListLine {
                index: 1,
                name: "Flour".to_owned(),
                measurement_unit: "g".to_owned(),
                amount: 150,
            }]
        );
    }

    #[test]
    fn units_keep_groups_apart_and_order_is_first_seen() {
        let lines = aggregate(&[
            row("milk", "ml", 200),
            row("eggs", "pcs", 2),
            row("milk", "cup", 1),
            row("eggs", "pcs", 1),
        ]);
        let summary: Vec<(usize, &str, &str, i64)> = lines
            .iter()
            .map(|l| (l.index, l.name.as_str(), l.measurement_unit.as_str(), l.amount))
            .collect();
        assert_eq!(
            summary,
            vec![
                (1, "Milk", "ml", 200),
                (2, "Eggs", "pcs", 3),
                (3, "Milk", "cup", 1),
            ]
        );
    }

    #[test]
    fn rendered_document() {
        let date = NaiveDate::from_ymd_opt(2026, 10, 19).unwrap();
        let lines = aggregate(&[row("flour", "g", 150), row("eggs", "pcs", 3)]);
        assert_eq!(
            render(&lines, date),
            "Shopping list:\n\n1. Flour (g) - 150\n2. Eggs (pcs) - 3\n\n----------\n2026-10-19 Foodgram\n"
        );
    }

    #[test]
    fn empty_cart_document() {
        let date = NaiveDate::from_ymd_opt(2026, 10, 19).unwrap();
        assert_eq!(
            render(&[], date),
            "Shopping list:\n\nYour shopping list is empty.\n\n----------\n2026-10-19 Foodgram\n"
        );
    }
}
