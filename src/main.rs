use clap::{Parser, Subcommand};
use chrono::{Datelike, Local, NaiveDate};
use comfy_table::{Attribute, Cell, Table};
use inquire::{Confirm, Select, Text};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use invoice_desk::config::{self, AppSettings};
use invoice_desk::{
    validate_draft, DocumentRenderer, DocumentSink, FileSink, InvoiceDraft, LayoutConfig,
    LineItem, NewInvoice, PersistedInvoice, StoreClient, Totals,
};

// ==========================================
// Structs & Enums
// ==========================================

#[derive(Parser)]
#[command(name = "invoice-desk")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a new invoice
    New,
    /// List invoices stored on the invoice service
    List,
    /// Show monthly totals of invoices
    Summary {
        /// Year to summarize (defaults to current year)
        year: Option<i32>,
    },
    /// Configure data directory and invoice service URL
    Config,
    /// Open output folder
    Open,
}

// ==========================================
// Main Function
// ==========================================

fn main() {
    let cli = Cli::parse();

    // 1. Initialize configuration
    let settings = config::load_settings().unwrap_or_else(setup_config_wizard);
    let expanded_path = config::expand_home_dir(&settings.data_root);
    let root = PathBuf::from(expanded_path);

    if let Err(e) = fs::create_dir_all(&root) {
        eprintln!("❌ Error: Failed to create data directory: {}", e);
        return;
    }

    if cli.command.is_none() {
        use clap::CommandFactory;
        Cli::command().print_help().unwrap();
        return;
    }

    match cli.command.unwrap() {
        Commands::New => {
            new_invoice(&root, &settings);
        }
        Commands::List => {
            list_invoices(&settings);
        }
        Commands::Summary { year } => {
            show_summary(&settings, year);
        }
        Commands::Config => {
            setup_config_wizard();
        }
        Commands::Open => {
            open_folder_wizard(&root);
        }
    }
}

// ==========================================
// 1. New Invoice Flow
// ==========================================

fn new_invoice(root: &Path, settings: &AppSettings) {
    let (customer_name, customer_email, customer_address) = enter_customer();

    let items = enter_invoice_items();
    if items.is_empty() {
        println!("❌ No items entered. Aborting.");
        return;
    }

    let tax_rate_percent = ask_for_tax_rate();

    let draft = InvoiceDraft {
        customer_name,
        customer_email,
        customer_address,
        items,
        tax_rate_percent,
    };

    if let Err(e) = validate_draft(&draft) {
        println!("❌ Invalid invoice: {}", e);
        return;
    }

    let totals = Totals::compute(&draft.items, draft.tax_rate_percent);
    println!(
        "💰 Subtotal ${:.2} | Tax ${:.2} | Total ${:.2}",
        totals.subtotal, totals.tax, totals.total
    );

    let confirmed = Confirm::new("Save this invoice?")
        .with_default(true)
        .prompt()
        .unwrap();
    if !confirmed {
        println!("❌ Cancelled. Nothing was saved.");
        return;
    }

    // The service assigns the id and creation timestamp.
    let store = StoreClient::new(settings.store_url.clone());
    let invoice = match store.create(&NewInvoice::from_draft(draft, totals)) {
        Ok(invoice) => invoice,
        Err(e) => {
            println!("❌ Failed to save invoice: {}", e);
            return;
        }
    };
    println!("✅ Invoice saved: #{}", invoice.id);

    generate_document(root, &invoice);
}

fn generate_document(root: &Path, invoice: &PersistedInvoice) {
    let layout = match LayoutConfig::load_or_init(root) {
        Ok(layout) => layout,
        Err(e) => {
            println!("❌ Layout error: {}", e);
            return;
        }
    };

    let renderer = DocumentRenderer::new(layout);
    let document = renderer.render(invoice);

    println!("\n🔨 Compiling PDF...");
    let sink = FileSink::for_invoice(&root.join("output"), invoice);
    match sink.save(&document) {
        Ok(path) => {
            println!("✅ Document generated: {:?}", path);
            open_and_reveal(&path);
        }
        Err(e) => println!("❌ {}", e),
    }
}

// ==========================================
// 2. Data Entry Helpers
// ==========================================

fn enter_customer() -> (String, String, String) {
    println!("\n--- Customer ---");
    let name = Text::new("Customer Name:").prompt().unwrap();
    let email = Text::new("Customer Email:").prompt().unwrap();
    let address = Text::new("Billing Address:").prompt().unwrap();
    (name, email, address)
}

fn enter_invoice_items() -> Vec<LineItem> {
    let mut items = Vec::new();
    println!("\n--- Enter Invoice Items ---");
    println!("(Leave Description empty to finish)");

    loop {
        let description = Text::new("Description (leave empty to finish):")
            .prompt()
            .unwrap();

        if description.trim().is_empty() {
            break;
        }

        let quantity_str = Text::new("Quantity:").with_default("1").prompt().unwrap();
        let quantity: f64 = quantity_str.parse().unwrap_or(0.0);

        let price_str = Text::new("Unit Price ($):").prompt().unwrap();
        let unit_price: f64 = price_str.parse().unwrap_or(0.0);

        items.push(LineItem {
            description,
            quantity,
            unit_price,
        });
    }
    items
}

fn ask_for_tax_rate() -> f64 {
    let apply_tax = Confirm::new("Add Tax to Total?")
        .with_default(true)
        .prompt()
        .unwrap();

    if apply_tax {
        let rate_str = Text::new("Tax Rate % (e.g. 8.875):")
            .with_default("8.875")
            .prompt()
            .unwrap();
        rate_str.parse().unwrap_or(0.0)
    } else {
        0.0
    }
}

// ==========================================
// 3. List Logic
// ==========================================

fn fetch_invoices(settings: &AppSettings) -> Option<Vec<PersistedInvoice>> {
    let store = StoreClient::new(settings.store_url.clone());
    match store.list() {
        Ok(invoices) => Some(invoices),
        Err(e) => {
            println!("❌ Failed to fetch invoices: {}", e);
            None
        }
    }
}

fn list_invoices(settings: &AppSettings) {
    println!("🔍 Fetching invoices...");
    let Some(invoices) = fetch_invoices(settings) else {
        return;
    };

    if invoices.is_empty() {
        println!("(None found)");
        return;
    }

    let mut table = Table::new();
    table.set_header(vec![
        Cell::new("Invoice"),
        Cell::new("Date"),
        Cell::new("Customer"),
        Cell::new("Total"),
    ]);

    for invoice in &invoices {
        table.add_row(vec![
            Cell::new(format!("#{}", invoice.id)),
            Cell::new(invoice.created_at.format("%-m/%-d/%Y").to_string()),
            Cell::new(&invoice.customer_name),
            Cell::new(format!("${:.2}", invoice.total)),
        ]);
    }

    println!("{table}");
}

// ==========================================
// 4. Summary Logic
// ==========================================

fn show_summary(settings: &AppSettings, year: Option<i32>) {
    let target_year = year.unwrap_or_else(|| Local::now().year());
    println!("🔍 Fetching invoices for summary (Year: {})...", target_year);

    let Some(invoices) = fetch_invoices(settings) else {
        return;
    };

    // Group by month. Key: (Year, Month), Value: (count, total)
    let mut monthly_totals: BTreeMap<(i32, u32), (usize, f64)> = BTreeMap::new();

    for invoice in invoices
        .iter()
        .filter(|i| i.created_at.year() == target_year)
    {
        let month_key = (invoice.created_at.year(), invoice.created_at.month());
        let entry = monthly_totals.entry(month_key).or_insert((0, 0.0));
        entry.0 += 1;
        entry.1 += invoice.total;
    }

    if monthly_totals.is_empty() {
        println!("No invoices found.");
        return;
    }

    let mut table = Table::new();
    table.set_header(vec![
        Cell::new("Month"),
        Cell::new("Invoices"),
        Cell::new("Total"),
    ]);

    let mut count_sum = 0;
    let mut total_sum = 0.0;

    for ((year, month), (count, total)) in monthly_totals.iter().rev() {
        let month_str = NaiveDate::from_ymd_opt(*year, *month, 1)
            .unwrap()
            .format("%B %Y")
            .to_string();

        table.add_row(vec![
            Cell::new(month_str),
            Cell::new(count.to_string()),
            Cell::new(format!("${:.2}", total)),
        ]);
        count_sum += count;
        total_sum += total;
    }

    table.add_row(vec![
        Cell::new(format!("Total ({})", target_year)).add_attribute(Attribute::Bold),
        Cell::new(count_sum.to_string()).add_attribute(Attribute::Bold),
        Cell::new(format!("${:.2}", total_sum)).add_attribute(Attribute::Bold),
    ]);

    println!("\n--- Monthly Invoice Summary ({}) ---", target_year);
    println!("{table}");
}

// ==========================================
// 5. Open Folder Logic
// ==========================================

fn open_folder_wizard(root: &Path) {
    let output_root = root.join("output");
    let root_opt = "📂 Open Root Output Directory".to_string();
    let mut options = vec![root_opt.clone()];

    if output_root.exists() {
        let mut subdirs = Vec::new();
        if let Ok(years) = fs::read_dir(&output_root) {
            for year_entry in years.flatten() {
                if year_entry.path().is_dir() {
                    let year_name = year_entry.file_name().to_string_lossy().to_string();
                    if let Ok(customers) = fs::read_dir(year_entry.path()) {
                        for customer_entry in customers.flatten() {
                            if customer_entry.path().is_dir() {
                                let customer_name =
                                    customer_entry.file_name().to_string_lossy().to_string();
                                subdirs.push(format!("{} / {}", year_name, customer_name));
                            }
                        }
                    }
                }
            }
        }
        subdirs.sort();
        subdirs.reverse();
        options.extend(subdirs);
    }

    match Select::new("Select Folder to Open:", options).prompt() {
        Ok(choice) => {
            let target_path = if choice == root_opt {
                output_root
            } else {
                let parts: Vec<&str> = choice.split(" / ").collect();
                if parts.len() == 2 {
                    output_root.join(parts[0]).join(parts[1])
                } else {
                    output_root
                }
            };
            println!("🚀 Opening: {:?}", target_path);

            #[cfg(target_os = "macos")]
            Command::new("open").arg(&target_path).spawn().ok();
            #[cfg(target_os = "windows")]
            Command::new("explorer").arg(&target_path).spawn().ok();
            #[cfg(target_os = "linux")]
            Command::new("xdg-open").arg(&target_path).spawn().ok();
        }
        Err(_) => println!("Operation cancelled."),
    }
}

// ==========================================
// 6. Config & Utilities
// ==========================================

fn setup_config_wizard() -> AppSettings {
    println!("\n⚙️  --- Configuration Setup ---");
    let current = config::load_settings().unwrap_or_default();

    println!("📂 Opening folder picker...");
    let picked_path = rfd::FileDialog::new()
        .set_title("Select Invoice Data Directory")
        .pick_folder();

    let data_root = if let Some(path) = picked_path {
        path.to_string_lossy().to_string()
    } else {
        println!("❌ No folder selected. Falling back to manual input.");
        Text::new("Enter Data Directory:")
            .with_default(&current.data_root)
            .prompt()
            .unwrap()
    };

    let store_url = Text::new("Invoice Service URL:")
        .with_default(&current.store_url)
        .prompt()
        .unwrap();

    let settings = AppSettings {
        data_root,
        store_url,
    };

    match config::save_settings(&settings) {
        Ok(()) => println!("✅ Settings saved."),
        Err(e) => println!("❌ Failed to save settings: {}", e),
    }
    settings
}

// Helper: Open file and reveal in Finder/Explorer
fn open_and_reveal(path: &Path) {
    #[cfg(target_os = "macos")]
    Command::new("open").arg("-R").arg(path).spawn().ok();

    #[cfg(target_os = "windows")]
    Command::new("explorer")
        .arg(format!("/select,{}", path.to_string_lossy()))
        .spawn()
        .ok();

    #[cfg(target_os = "linux")]
    Command::new("xdg-open").arg(path.parent().unwrap()).spawn().ok();
}
