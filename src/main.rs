mod format;
mod model;

use clap::{Parser, Subcommand};
use comfy_table::{Attribute, Cell, Table};
use inquire::{Confirm, DateSelect, Select, Text};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tera::{Context, Tera};
use chrono::Local;
use directories::{BaseDirs, ProjectDirs};

use crate::model::{Invoice, ItemUpdate, LineItem, PrintContext};

// ==========================================
// Constants & Embeds
// ==========================================
const ADD_ITEM_OPT: &str = "➕ Add Item";
const EDIT_ITEM_OPT: &str = "✏️  Edit Item";
const REMOVE_ITEM_OPT: &str = "🗑  Remove Item";
const SET_FEE_OPT: &str = "🔧 Maintenance & Transport Fee";
const SET_DATE_OPT: &str = "📅 Invoice Date";
const PRINT_OPT: &str = "🖨  Save / Print (PDF)";
const RESET_OPT: &str = "♻️  Reset Invoice";
const QUIT_OPT: &str = "🚪 Quit";

// Embed template at compile time to ensure availability
const DEFAULT_TEMPLATE: &str = include_str!("../templates/invoice.tera");

// ==========================================
// Structs & Enums
// ==========================================

#[derive(Debug, Serialize, Deserialize)]
struct AppSettings {
    data_root: String,
}

#[derive(Parser)]
#[command(name = "invoice-editor")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Edit and print an invoice (default)
    Edit,
    /// Configure data directory
    Config,
}

// ==========================================
// Main Function
// ==========================================

fn main() {
    let cli = Cli::parse();

    // 1. Initialize configuration
    let settings = load_settings().unwrap_or_else(|| setup_config_wizard());
    let expanded_path = expand_home_dir(&settings.data_root);
    let root = PathBuf::from(expanded_path);

    if let Err(e) = fs::create_dir_all(root.join("output")) {
        eprintln!("❌ Error: Failed to create output directory: {}", e);
        return;
    }

    match cli.command.unwrap_or(Commands::Edit) {
        Commands::Edit => run_editor(&root),
        Commands::Config => {
            setup_config_wizard();
        }
    }
}

// ==========================================
// 1. Editor Loop
// ==========================================

fn run_editor(root: &Path) {
    let mut invoice = Invoice::new();

    loop {
        print_preview(&invoice);

        let options = vec![
            ADD_ITEM_OPT,
            EDIT_ITEM_OPT,
            REMOVE_ITEM_OPT,
            SET_FEE_OPT,
            SET_DATE_OPT,
            PRINT_OPT,
            RESET_OPT,
            QUIT_OPT,
        ];

        let ans = Select::new("Invoice Setup:", options).prompt();

        match ans {
            Ok(ADD_ITEM_OPT) => invoice.add_item(),
            Ok(EDIT_ITEM_OPT) => edit_item_wizard(&mut invoice),
            Ok(REMOVE_ITEM_OPT) => remove_item_wizard(&mut invoice),
            Ok(SET_FEE_OPT) => {
                let fee_str = Text::new("Maintenance & Transport Fee:")
                    .with_default(&format::count(invoice.maintenance_fee))
                    .prompt()
                    .unwrap();
                invoice.maintenance_fee = fee_str.trim().parse().unwrap_or(0.0);
            }
            Ok(SET_DATE_OPT) => {
                if let Ok(date) = DateSelect::new("Invoice Date:")
                    .with_default(invoice.date)
                    .prompt()
                {
                    invoice.date = date;
                }
            }
            Ok(PRINT_OPT) => print_invoice(root, &invoice),
            Ok(RESET_OPT) => {
                let sure = Confirm::new("Reset the invoice?")
                    .with_default(false)
                    .prompt()
                    .unwrap_or(false);
                if sure {
                    invoice.reset();
                    println!("✅ Invoice reset.");
                }
            }
            // QUIT_OPT, or the menu itself was cancelled
            Ok(_) | Err(_) => break,
        }
    }
}

fn item_label(index: usize, item: &LineItem) -> String {
    let name = if item.name.trim().is_empty() {
        "---"
    } else {
        item.name.as_str()
    };
    format!(
        "{}. {} ({} x {})",
        index + 1,
        name,
        format::count(item.quantity),
        format::money(item.price)
    )
}

fn select_item(invoice: &Invoice, prompt: &str) -> Option<String> {
    let options: Vec<String> = invoice
        .items()
        .iter()
        .enumerate()
        .map(|(i, item)| item_label(i, item))
        .collect();

    match Select::new(prompt, options).prompt() {
        Ok(choice) => {
            // Label format: "3. Filter (1 x 5)" -> row 3
            let idx: usize = choice.split('.').next()?.parse().ok()?;
            invoice.items().get(idx - 1).map(|item| item.id.clone())
        }
        Err(_) => None,
    }
}

fn edit_item_wizard(invoice: &mut Invoice) {
    let Some(id) = select_item(invoice, "Select Item to Edit:") else {
        return;
    };
    let Some(item) = invoice.items().iter().find(|i| i.id == id).cloned() else {
        return;
    };

    let field = match Select::new("Field:", vec!["Name", "Quantity", "Price"]).prompt() {
        Ok(f) => f,
        Err(_) => return,
    };

    match field {
        "Name" => {
            let name = Text::new("Item Name:").with_default(&item.name).prompt().unwrap();
            invoice.update_item(&id, ItemUpdate::Name(name));
        }
        "Quantity" => {
            let qty_str = Text::new("Quantity:")
                .with_default(&format::count(item.quantity))
                .prompt()
                .unwrap();
            invoice.update_item(&id, ItemUpdate::Quantity(qty_str.trim().parse().unwrap_or(0.0)));
        }
        "Price" => {
            let price_str = Text::new("Unit Price:")
                .with_default(&format::count(item.price))
                .prompt()
                .unwrap();
            invoice.update_item(&id, ItemUpdate::Price(price_str.trim().parse().unwrap_or(0.0)));
        }
        _ => {}
    }
}

fn remove_item_wizard(invoice: &mut Invoice) {
    if invoice.items().len() == 1 {
        println!("⚠️  The last item cannot be removed.");
        return;
    }
    if let Some(id) = select_item(invoice, "Select Item to Remove:") {
        invoice.remove_item(&id);
    }
}

// ==========================================
// 2. Terminal Preview
// ==========================================

fn print_preview(invoice: &Invoice) {
    let mut table = Table::new();
    table.set_header(vec![
        Cell::new("#"),
        Cell::new("Item"),
        Cell::new("Qty"),
        Cell::new("Price"),
        Cell::new("Total"),
    ]);

    for (i, item) in invoice.items().iter().enumerate() {
        let name = if item.name.trim().is_empty() {
            "---"
        } else {
            item.name.as_str()
        };
        table.add_row(vec![
            Cell::new(i + 1),
            Cell::new(name),
            Cell::new(format::count(item.quantity)),
            Cell::new(format::money(item.price)),
            Cell::new(format::money(item.line_total())),
        ]);
    }

    table.add_row(vec![
        Cell::new(""),
        Cell::new(""),
        Cell::new(""),
        Cell::new("Subtotal").add_attribute(Attribute::Bold),
        Cell::new(format::money(invoice.subtotal())),
    ]);
    table.add_row(vec![
        Cell::new(""),
        Cell::new(""),
        Cell::new(""),
        Cell::new("Maintenance & Transport").add_attribute(Attribute::Bold),
        Cell::new(format::money(invoice.maintenance_fee)),
    ]);
    table.add_row(vec![
        Cell::new(""),
        Cell::new(""),
        Cell::new(""),
        Cell::new("Grand Total").add_attribute(Attribute::Bold),
        Cell::new(format::money(invoice.grand_total())).add_attribute(Attribute::Bold),
    ]);

    println!("\n📅 Date: {}", invoice.date.format("%Y/%m/%d"));
    println!("{table}");
}

// ==========================================
// 3. Print / Export
// ==========================================

fn print_invoice(root: &Path, invoice: &Invoice) {
    println!("\n🖨  Opening print view...");

    // Initialize template
    let template_dir = root.join("templates");
    if !template_dir.exists() {
        fs::create_dir_all(&template_dir).unwrap();
    }
    let template_path = template_dir.join("invoice.tera");
    if !template_path.exists() {
        println!("✨ Initializing default template...");
        fs::write(&template_path, DEFAULT_TEMPLATE).expect("Failed to write default template");
    }

    let tera = match Tera::new(template_dir.join("*.tera").to_str().unwrap()) {
        Ok(t) => t,
        Err(e) => {
            println!("❌ Template Error: {}", e);
            return;
        }
    };

    let context_data = PrintContext::from_invoice(invoice);
    let context = Context::from_serialize(&context_data).unwrap();
    let rendered = match tera.render("invoice.tera", &context) {
        Ok(r) => r,
        Err(e) => {
            println!("❌ Render Error: {}", e);
            return;
        }
    };

    let output_dir = root.join("output").join(invoice.date.format("%Y").to_string());
    fs::create_dir_all(&output_dir).unwrap();

    // Filename: invoice_20260829_153012.pdf
    let stamp = Local::now().format("%H%M%S");
    let filename_base = format!("invoice_{}_{}", invoice.date.format("%Y%m%d"), stamp);
    let typ_path = output_dir.join(format!("{}.typ", filename_base));
    let pdf_path = output_dir.join(format!("{}.pdf", filename_base));

    fs::write(&typ_path, rendered).expect("Failed to write .typ file");

    if Command::new("typst").arg("--version").output().is_err() {
        println!(
            "⚠️  'typst' is not installed (brew install typst). Document saved: {:?}",
            typ_path
        );
        return;
    }

    println!("🔨 Compiling PDF...");
    match Command::new("typst").arg("compile").arg(&typ_path).arg(&pdf_path).status() {
        Ok(s) if s.success() => {
            println!("✅ PDF Generated: {:?}", pdf_path);
            open_and_reveal(&pdf_path);
        }
        _ => println!("❌ Compilation failed."),
    }
}

// ==========================================
// 4. Config & Utilities
// ==========================================

fn get_config_path() -> PathBuf {
    if let Some(proj_dirs) = ProjectDirs::from("com", "invoice-editor", "app") {
        let config_dir = proj_dirs.config_dir();
        if !config_dir.exists() {
            fs::create_dir_all(config_dir).ok();
        }
        return config_dir.join("settings.toml");
    }
    PathBuf::from("settings.toml")
}

fn load_settings() -> Option<AppSettings> {
    let path = get_config_path();
    if !path.exists() {
        return None;
    }
    let content = fs::read_to_string(path).ok()?;
    toml::from_str(&content).ok()
}

fn setup_config_wizard() -> AppSettings {
    println!("\n⚙️  --- Configuration Setup ---");
    let current = load_settings();
    let default_val = current
        .map(|s| s.data_root)
        .unwrap_or_else(|| "~/Documents/Invoices".to_string());

    println!("📂 Opening folder picker...");
    let picked_path = rfd::FileDialog::new()
        .set_title("Select Root Data Directory")
        .pick_folder();

    let new_root = if let Some(path) = picked_path {
        path.to_string_lossy().to_string()
    } else {
        println!("❌ No folder selected. Falling back to manual input.");
        Text::new("Enter Root Data Directory:")
            .with_default(&default_val)
            .prompt()
            .unwrap()
    };

    let settings = AppSettings { data_root: new_root };

    let path = get_config_path();
    let toml_str = toml::to_string_pretty(&settings).unwrap();
    fs::write(&path, toml_str).expect("Failed to save settings");
    println!("✅ Settings saved.");
    settings
}

fn expand_home_dir(path: &str) -> String {
    if path.starts_with("~") {
        if let Some(base_dirs) = BaseDirs::new() {
            let home = base_dirs.home_dir().to_string_lossy();
            return path.replacen("~", &home, 1);
        }
    }
    path.to_string()
}

// Helper: Open file and reveal in Finder/Explorer
fn open_and_reveal(path: &Path) {
    #[cfg(target_os = "macos")]
    Command::new("open").arg("-R").arg(path).spawn().ok();

    #[cfg(target_os = "windows")]
    Command::new("explorer").arg(format!("/select,{}", path.to_string_lossy())).spawn().ok();

    #[cfg(target_os = "linux")]
    Command::new("xdg-open").arg(path.parent().unwrap()).spawn().ok();

    #[cfg(target_os = "macos")]
    Command::new("open").arg(path).spawn().ok();

    #[cfg(target_os = "windows")]
    Command::new("explorer").arg(path).spawn().ok();

    #[cfg(target_os = "linux")]
    Command::new("xdg-open").arg(path).spawn().ok();
}
