use chrono::{Local, NaiveDate};
use serde::Serialize;

use crate::format;

#[derive(Debug, Clone, PartialEq)]
pub struct LineItem {
    pub id: String,
    pub name: String,
    pub quantity: f64,
    pub price: f64,
}

impl LineItem {
    fn with_id(id: u64) -> Self {
        Self {
            id: id.to_string(),
            name: String::new(),
            quantity: 1.0,
            price: 0.0,
        }
    }

    pub fn line_total(&self) -> f64 {
        self.quantity * self.price
    }
}

/// One field of a line item, tagged with its new value.
#[derive(Debug, Clone, PartialEq)]
pub enum ItemUpdate {
    Name(String),
    Quantity(f64),
    Price(f64),
}

/// The whole editable state: item list, fee, date.
/// `items` stays private so it can never be emptied from outside.
#[derive(Debug, Clone, PartialEq)]
pub struct Invoice {
    pub date: NaiveDate,
    pub maintenance_fee: f64,
    items: Vec<LineItem>,
    next_id: u64,
}

/// Sum of quantity×price over all items.
pub fn subtotal(items: &[LineItem]) -> f64 {
    items.iter().map(|i| i.quantity * i.price).sum()
}

pub fn grand_total(subtotal: f64, maintenance_fee: f64) -> f64 {
    subtotal + maintenance_fee
}

impl Invoice {
    pub fn new() -> Self {
        Self {
            date: Local::now().date_naive(),
            maintenance_fee: 0.0,
            items: vec![LineItem::with_id(1)],
            next_id: 2,
        }
    }

    pub fn items(&self) -> &[LineItem] {
        &self.items
    }

    /// Appends a fresh default item (name empty, quantity 1, price 0).
    pub fn add_item(&mut self) {
        self.items.push(LineItem::with_id(self.next_id));
        self.next_id += 1;
    }

    /// Removes the matching item, unless it is the last one left.
    /// Unknown ids are ignored.
    pub fn remove_item(&mut self, id: &str) {
        if self.items.len() > 1 {
            self.items.retain(|item| item.id != id);
        }
    }

    /// Replaces one field of the matching item. Unknown ids are ignored.
    pub fn update_item(&mut self, id: &str, update: ItemUpdate) {
        if let Some(item) = self.items.iter_mut().find(|item| item.id == id) {
            match update {
                ItemUpdate::Name(name) => item.name = name,
                ItemUpdate::Quantity(quantity) => item.quantity = quantity,
                ItemUpdate::Price(price) => item.price = price,
            }
        }
    }

    pub fn subtotal(&self) -> f64 {
        subtotal(&self.items)
    }

    pub fn grand_total(&self) -> f64 {
        grand_total(self.subtotal(), self.maintenance_fee)
    }

    /// Back to a single default item, fee 0, today's date.
    /// The confirmation gate belongs to the caller.
    pub fn reset(&mut self) {
        *self = Invoice::new();
    }
}

// ==========================================
// Print context (fed to the Tera template)
// ==========================================

#[derive(Serialize)]
pub struct PrintRow {
    pub index: usize,
    pub name: String,
    pub quantity: String,
    pub price: String,
    pub line_total: String,
}

#[derive(Serialize)]
pub struct PrintContext {
    pub date: String,
    pub rows: Vec<PrintRow>,
    pub subtotal: String,
    pub maintenance_fee: String,
    pub grand_total: String,
}

impl PrintContext {
    pub fn from_invoice(invoice: &Invoice) -> Self {
        let rows = invoice
            .items()
            .iter()
            .enumerate()
            .map(|(i, item)| PrintRow {
                index: i + 1,
                name: if item.name.trim().is_empty() {
                    "---".to_string()
                } else {
                    item.name.clone()
                },
                quantity: format::count(item.quantity),
                price: format::money(item.price),
                line_total: format::money(item.line_total()),
            })
            .collect();

        Self {
            date: invoice.date.format("%Y/%m/%d").to_string(),
            rows,
            subtotal: format::money(invoice.subtotal()),
            maintenance_fee: format::money(invoice.maintenance_fee),
            grand_total: format::money(invoice.grand_total()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(id: &str, quantity: f64, price: f64) -> LineItem {
        LineItem {
            id: id.to_string(),
            name: String::new(),
            quantity,
            price,
        }
    }

    #[test]
    fn subtotal_sums_quantity_times_price() {
        let items = vec![item("1", 2.0, 10.0), item("2", 1.0, 5.0)];
        assert_eq!(subtotal(&items), 25.0);
        assert_eq!(grand_total(subtotal(&items), 3.0), 28.0);
    }

    #[test]
    fn subtotal_is_reorder_invariant() {
        let forward = vec![item("1", 2.0, 10.0), item("2", 1.0, 5.0), item("3", 4.0, 2.5)];
        let mut backward = forward.clone();
        backward.reverse();
        assert_eq!(subtotal(&forward), subtotal(&backward));
    }

    #[test]
    fn zero_quantity_items_contribute_nothing() {
        let items = vec![item("1", 0.0, 100.0)];
        assert_eq!(subtotal(&items), 0.0);
        assert_eq!(grand_total(subtotal(&items), 0.0), 0.0);
    }

    #[test]
    fn grand_total_still_sums_with_negative_fee() {
        assert_eq!(grand_total(25.0, -5.0), 20.0);
    }

    #[test]
    fn new_invoice_has_one_default_item() {
        let invoice = Invoice::new();
        assert_eq!(invoice.items().len(), 1);
        let first = &invoice.items()[0];
        assert_eq!(first.name, "");
        assert_eq!(first.quantity, 1.0);
        assert_eq!(first.price, 0.0);
        assert_eq!(invoice.maintenance_fee, 0.0);
        assert_eq!(invoice.date, Local::now().date_naive());
    }

    #[test]
    fn add_item_appends_default_with_fresh_id() {
        let mut invoice = Invoice::new();
        invoice.add_item();
        invoice.add_item();

        assert_eq!(invoice.items().len(), 3);
        let last = invoice.items().last().unwrap();
        assert_eq!(last.name, "");
        assert_eq!(last.quantity, 1.0);
        assert_eq!(last.price, 0.0);

        let mut ids: Vec<&str> = invoice.items().iter().map(|i| i.id.as_str()).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), 3);
    }

    #[test]
    fn remove_item_keeps_order_of_survivors() {
        let mut invoice = Invoice::new();
        invoice.add_item();
        invoice.add_item();
        let kept: Vec<String> = [0, 2].iter().map(|&i| invoice.items()[i].id.clone()).collect();
        let removed = invoice.items()[1].id.clone();

        invoice.remove_item(&removed);

        let remaining: Vec<String> = invoice.items().iter().map(|i| i.id.clone()).collect();
        assert_eq!(remaining, kept);
    }

    #[test]
    fn removing_the_sole_item_is_a_noop() {
        let mut invoice = Invoice::new();
        let id = invoice.items()[0].id.clone();
        invoice.remove_item(&id);
        assert_eq!(invoice.items().len(), 1);
        assert_eq!(invoice.items()[0].id, id);
    }

    #[test]
    fn remove_with_unknown_id_is_a_noop() {
        let mut invoice = Invoice::new();
        invoice.add_item();
        let before = invoice.clone();
        invoice.remove_item("no-such-id");
        assert_eq!(invoice, before);
    }

    #[test]
    fn update_item_touches_only_the_named_field() {
        let mut invoice = Invoice::new();
        invoice.add_item();
        let id = invoice.items()[0].id.clone();
        let other = invoice.items()[1].clone();

        invoice.update_item(&id, ItemUpdate::Name("Compressor".to_string()));
        invoice.update_item(&id, ItemUpdate::Quantity(3.0));
        invoice.update_item(&id, ItemUpdate::Price(12.5));

        let edited = &invoice.items()[0];
        assert_eq!(edited.name, "Compressor");
        assert_eq!(edited.quantity, 3.0);
        assert_eq!(edited.price, 12.5);
        assert_eq!(invoice.items()[1], other);
    }

    #[test]
    fn update_with_unknown_id_leaves_state_unchanged() {
        let mut invoice = Invoice::new();
        invoice.update_item("1", ItemUpdate::Price(9.0));
        let before = invoice.clone();
        invoice.update_item("no-such-id", ItemUpdate::Price(99.0));
        assert_eq!(invoice, before);
    }

    #[test]
    fn negative_and_fractional_inputs_are_accepted() {
        let mut invoice = Invoice::new();
        let id = invoice.items()[0].id.clone();
        invoice.update_item(&id, ItemUpdate::Quantity(-1.5));
        invoice.update_item(&id, ItemUpdate::Price(7.0));
        assert_eq!(invoice.subtotal(), -10.5);
    }

    #[test]
    fn reset_restores_the_defaults() {
        let mut invoice = Invoice::new();
        invoice.add_item();
        invoice.maintenance_fee = 42.0;
        let id = invoice.items()[0].id.clone();
        invoice.update_item(&id, ItemUpdate::Price(100.0));

        invoice.reset();

        assert_eq!(invoice.items().len(), 1);
        assert_eq!(invoice.items()[0].price, 0.0);
        assert_eq!(invoice.maintenance_fee, 0.0);
        assert_eq!(invoice.date, Local::now().date_naive());
    }

    #[test]
    fn ids_stay_unique_across_remove_and_add() {
        let mut invoice = Invoice::new();
        invoice.add_item();
        let removed = invoice.items()[1].id.clone();
        invoice.remove_item(&removed);
        invoice.add_item();

        let mut ids: Vec<&str> = invoice.items().iter().map(|i| i.id.as_str()).collect();
        let total = ids.len();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), total);
    }

    #[test]
    fn print_context_formats_the_scenario_values() {
        let mut invoice = Invoice::new();
        let first = invoice.items()[0].id.clone();
        invoice.update_item(&first, ItemUpdate::Quantity(2.0));
        invoice.update_item(&first, ItemUpdate::Price(10.0));
        invoice.add_item();
        let second = invoice.items()[1].id.clone();
        invoice.update_item(&second, ItemUpdate::Name("Filter".to_string()));
        invoice.update_item(&second, ItemUpdate::Price(5.0));
        invoice.maintenance_fee = 3.0;

        let ctx = PrintContext::from_invoice(&invoice);
        assert_eq!(ctx.rows.len(), 2);
        assert_eq!(ctx.rows[0].name, "---");
        assert_eq!(ctx.rows[0].line_total, "20");
        assert_eq!(ctx.rows[1].name, "Filter");
        assert_eq!(ctx.subtotal, "25");
        assert_eq!(ctx.maintenance_fee, "3");
        assert_eq!(ctx.grand_total, "28");
    }
}
