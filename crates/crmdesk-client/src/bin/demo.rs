//! # Dashboard Demo
//!
//! Seeds an in-memory backend with CRM data and walks through the table and
//! invoice workflows, printing what the dashboard would show.
//!
//! ## Usage
//! ```bash
//! # Default: 40 leads, 10 rows per page
//! cargo run -p crmdesk-client --bin demo
//!
//! # Custom amount, search and page size
//! cargo run -p crmdesk-client --bin demo -- --count 120 --query acme --rows 25
//!
//! # Use the legacy slice-then-sort order
//! cargo run -p crmdesk-client --bin demo -- --legacy
//!
//! # Read leads from the configured REST backend instead
//! CRMDESK_BASE_URL=http://localhost:5000/api cargo run -p crmdesk-client --bin demo -- --remote
//! ```

use std::env;
use std::sync::Arc;

use chrono::{Duration, NaiveDate};
use crmdesk_client::config::DisplaySettings;
use crmdesk_client::memory::{Failure, ListShape, Operation};
use crmdesk_client::{
    init_tracing, ClientConfig, EntityRepository, EntityStore, HttpBackend, MemoryBackend,
    RecordBackend,
};
use crmdesk_core::{
    EntityKind, FilterCondition, Invoice, InvoiceForm, Lead, Operator, PipelineOrder, TableView,
};
use serde_json::{json, Value};

const COMPANIES: &[&str] = &[
    "Acme Traders",
    "Globex Exports",
    "Initech Systems",
    "Umbrella Pharma",
    "Stark Textiles",
    "Wayne Logistics",
    "Tata Motors Dealer",
    "Sharma & Sons",
];

const FIRST_NAMES: &[&str] = &["Aarav", "Diya", "Kabir", "Meera", "Rohan", "Ananya", "Vikram", "Isha"];

const SOURCES: &[&str] = &["Website", "Referral", "Cold Call", "Trade Show"];

const STATUSES: &[&str] = &["New", "Contacted", "Qualified", "Lost"];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();

    let args: Vec<String> = env::args().collect();
    let mut config = ClientConfig::load_or_default(None);
    let mut count: usize = 40;
    let mut query = String::new();
    let mut remote = false;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--count" | "-c" => {
                if i + 1 < args.len() {
                    count = args[i + 1].parse().unwrap_or(40);
                    i += 1;
                }
            }
            "--query" | "-q" => {
                if i + 1 < args.len() {
                    query = args[i + 1].clone();
                    i += 1;
                }
            }
            "--rows" | "-r" => {
                if i + 1 < args.len() {
                    config.table.rows_per_page = args[i + 1].parse().unwrap_or(10);
                    i += 1;
                }
            }
            "--legacy" => config.table.pipeline_order = PipelineOrder::PaginateThenSort,
            "--remote" => remote = true,
            "--help" | "-h" => {
                println!("crmdesk Dashboard Demo");
                println!();
                println!("Usage: demo [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -c, --count <N>     Number of leads to generate (default: 40)");
                println!("  -q, --query <TEXT>  Search text for the leads table");
                println!("  -r, --rows <N>      Rows per page (default: from config)");
                println!("      --legacy        Sort within the page instead of before paging");
                println!("      --remote        Read leads from the configured REST backend");
                println!("  -h, --help          Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    config.validate()?;
    let order = config.pipeline_order();

    println!("crmdesk Dashboard Demo");
    println!("======================");
    if remote {
        println!("Backend:        {}", config.backend.base_url);
    } else {
        println!("Leads:          {}", count);
    }
    println!("Rows per page:  {}", config.rows_per_page());
    println!("Pipeline order: {:?}", order);
    println!();

    if remote {
        let backend = Arc::new(HttpBackend::from_config(&config)?);
        show_leads(backend, &config, &query, order).await?;
        return Ok(());
    }

    let backend = Arc::new(
        MemoryBackend::new(ListShape::Wrapped)
            .with_rows(EntityKind::Lead, generate_leads(count))
            .with_rows(EntityKind::Invoice, generate_invoices()),
    );
    show_leads(backend.clone(), &config, &query, order).await?;

    // -------------------------------------------------------------------------
    // Invoice dialog
    // -------------------------------------------------------------------------
    println!();
    let invoices_repo = EntityRepository::<Invoice, _>::new(backend.clone());
    let mut invoices = EntityStore::<Invoice>::new(config.rows_per_page());
    invoices.refresh(&invoices_repo).await;

    if let Some(original) = invoices.records().first().cloned() {
        let mut form = InvoiceForm::from_invoice(&original);
        form.set_discount_pct(10.0);
        form.set_gst_rate_pct(18.0);
        form.set_paid_amount(500.0);

        print_breakdown(&config.display, &original.invoice_number, &form);

        let mut edited = original.clone();
        form.apply_to(&mut edited);
        invoices.open_edit(edited.clone());

        // First save hits a flaky network; the dialog stays open for retry.
        backend
            .fail_next(Operation::Update, Failure::Unreachable("connection reset".into()))
            .await;
        let saved = invoices.submit_update(&invoices_repo, &edited).await;
        println!("Save #1: {} (dialog open: {})", outcome(saved), invoices.dialog().is_open());

        let saved = invoices.submit_update(&invoices_repo, &edited).await;
        println!("Save #2: {} (dialog open: {})", outcome(saved), invoices.dialog().is_open());

        for notice in invoices.take_notices() {
            println!("  [{:?}] {}", notice.level, notice.message);
        }
    }

    Ok(())
}

async fn show_leads<B: RecordBackend>(
    backend: Arc<B>,
    config: &ClientConfig,
    query: &str,
    order: PipelineOrder,
) -> Result<(), Box<dyn std::error::Error>> {
    let repo = EntityRepository::<Lead, _>::new(backend);
    let mut leads = EntityStore::<Lead>::new(config.rows_per_page());
    leads.refresh(&repo).await;
    for notice in leads.take_notices() {
        println!("✗ {}", notice.message);
    }
    println!("✓ Loaded {} leads", leads.records().len());

    if !query.is_empty() {
        leads.table_mut().set_query(query);
    }
    leads.apply_condition(FilterCondition::new("status", Operator::IsNot, "lost"))?;
    leads.sort_by("name")?;

    print_leads(&leads.view(order));

    let page_count = leads.view(order).info.page_count;
    if leads.table_mut().next_page(page_count) {
        println!("→ next page");
        print_leads(&leads.view(order));
    }

    println!();
    println!("Status breakdown:");
    for entry in leads.status_counts() {
        println!("  {:<10} {}", entry.status, entry.count);
    }
    Ok(())
}

fn outcome(saved: bool) -> &'static str {
    if saved {
        "saved"
    } else {
        "failed"
    }
}

fn print_leads(view: &TableView<'_, Lead>) {
    let info = view.info;
    println!();
    println!(
        "Leads page {}/{} ({} matching)",
        info.page,
        info.page_count.max(1),
        info.total_rows
    );
    println!("  {:<20} {:<18} {:<11} {}", "Name", "Company", "Status", "Created");
    for lead in &view.rows {
        println!(
            "  {:<20} {:<18} {:<11} {}",
            lead.name,
            lead.company.as_deref().unwrap_or("-"),
            lead.status,
            lead.created_at.map(|d| d.to_string()).unwrap_or_default()
        );
    }
}

fn print_breakdown(display: &DisplaySettings, number: &str, form: &InvoiceForm) {
    let input = form.input();
    let totals = form.breakdown();
    println!("Invoice {}", number);
    println!("  Amount        {}", display.format_amount(input.amount));
    println!("  Discount      {}%", input.discount_pct);
    println!("  Discounted    {}", display.format_amount(totals.discounted_amount));
    println!("  GST ({}%)     {}", input.gst_rate_pct, display.format_amount(totals.gst_amount));
    println!("  Total         {}", display.format_amount(totals.total_with_gst));
    println!("  Paid          {}", display.format_amount(input.paid_amount));
    println!("  Remaining     {}", display.format_amount(totals.remaining_amount));
    for issue in form.issues() {
        println!("  ⚠ {}", issue);
    }
}

fn base_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 4, 1).unwrap_or_default()
}

fn generate_leads(count: usize) -> Vec<Value> {
    (0..count)
        .map(|i| {
            let first = FIRST_NAMES[i % FIRST_NAMES.len()];
            let company = COMPANIES[(i / FIRST_NAMES.len()) % COMPANIES.len()];
            let created = base_date() + Duration::days((i * 3 % 90) as i64);
            json!({
                "id": format!("lead-{:04}", i + 1),
                "name": format!("{} {}", first, company.split_whitespace().next().unwrap_or("")),
                "email": format!("{}.{}@example.com", first.to_lowercase(), i + 1),
                "company": company,
                "source": SOURCES[i % SOURCES.len()],
                "status": STATUSES[(i * 7) % STATUSES.len()],
                "createdAt": format!("{}T10:00:00.000Z", created),
            })
        })
        .collect()
}

fn generate_invoices() -> Vec<Value> {
    COMPANIES
        .iter()
        .enumerate()
        .map(|(i, company)| {
            let issued = base_date() + Duration::days(i as i64 * 7);
            json!({
                "id": format!("inv-{:04}", i + 1),
                "invoiceNumber": format!("INV-2024-{:04}", i + 1),
                "customerName": company,
                "amount": 1000 * (i + 1),
                "status": "unpaid",
                "issueDate": issued.to_string(),
                "dueDate": (issued + Duration::days(30)).to_string(),
            })
        })
        .collect()
}
