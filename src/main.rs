use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{anyhow, Context, Result};
use clap::Parser as _;
use tracing_subscriber::EnvFilter;

use banglabank_calculators::{
    calculate_loan, format_currency, in_words_caption, parse_amount, parse_count,
    signed_amount_to_words, CalcError, Calculators, LoanInput, NoteCounter, PeriodUnit, ProductCode,
    RateTable, TaxStatus, EXPORT_FILE_NAME,
};

#[derive(Debug, clap::Parser)]
#[command(name = "banglabank", version, about = "Teller-desk calculators")]
struct Cli {
    #[arg(global = true, long, env = "BANGLABANK_STORE", default_value_os_t = PathBuf::from("banglabank-store.json"))]
    store: PathBuf,
    #[arg(global = true, short, long, help = "Log debug output to stderr.")]
    verbose: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, clap::Subcommand)]
enum Command {
    /// Count cash by denomination.
    Notes {
        #[command(subcommand)]
        action: NotesCommand,
    },
    /// Project profit on a fixed deposit.
    Fdr {
        #[arg(long)]
        product: ProductCode,
        #[arg(long)]
        amount: Option<String>,
        #[arg(long, help = "Override the rate taken from the rate table.")]
        rate: Option<String>,
        #[arg(long, help = "Depositor holds a TIN: 'yes' or 'no'.")]
        tax: Option<TaxStatus>,
    },
    /// Equal monthly installment for a loan.
    Loan {
        #[arg(long)]
        amount: Option<String>,
        #[arg(long)]
        rate: Option<String>,
        #[arg(long)]
        period: Option<u32>,
        #[arg(long, default_value = "months")]
        period_type: PeriodUnit,
        #[arg(long)]
        fee: Option<String>,
        #[arg(long, help = "Print the month-by-month schedule.")]
        schedule: bool,
    },
    /// Utility-bill collection.
    Bills {
        #[command(subcommand)]
        action: BillsCommand,
    },
    /// Spell out an amount in words.
    Words {
        #[arg(allow_hyphen_values = true)]
        amount: String,
    },
    /// Inspect or edit the FDR rate table.
    Rates {
        #[command(subcommand)]
        action: RatesCommand,
    },
    /// Export, import or show the settings document.
    Settings {
        #[command(subcommand)]
        action: SettingsCommand,
    },
    /// Switch between the light and dark theme.
    ToggleTheme,
}

#[derive(Debug, clap::Subcommand)]
enum NotesCommand {
    /// Tally counts given as `<denomination or id>=<count>`, e.g. `1000=5`.
    Tally { counts: Vec<String> },
    Add { value: String },
    Remove { id: String },
    List,
}

#[derive(Debug, clap::Subcommand)]
enum BillsCommand {
    /// Sum bill amounts and work out the customer's settlement.
    Total {
        bills: Vec<String>,
        #[arg(long, default_value = "")]
        received: String,
        #[arg(long, default_value = "")]
        charge: String,
    },
    AddSlot,
    Slots,
}

#[derive(Debug, clap::Subcommand)]
enum RatesCommand {
    List,
    Set {
        product: ProductCode,
        index: usize,
        rate: String,
    },
    Reset,
}

#[derive(Debug, clap::Subcommand)]
enum SettingsCommand {
    Export {
        #[arg(default_value = EXPORT_FILE_NAME)]
        path: PathBuf,
    },
    Import { path: PathBuf },
    Show,
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let mut state = Calculators::load_or_default(&cli.store);
    let changed = match run(cli.command, &mut state) {
        Ok(changed) => changed,
        Err(e) => match e.downcast_ref::<CalcError>() {
            // Input problems are reported like a form alert, without a cause chain.
            Some(calc) if calc.is_user_facing() => {
                eprintln!("{calc}");
                return Ok(ExitCode::from(2));
            }
            _ => return Err(e),
        },
    };

    if changed {
        state
            .save(&cli.store)
            .with_context(|| format!("Failed to save settings to '{}'", cli.store.display()))?;
    }
    Ok(ExitCode::SUCCESS)
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Runs one command and reports whether persisted state changed.
fn run(command: Command, state: &mut Calculators) -> Result<bool> {
    match command {
        Command::Notes { action } => run_notes(action, state),
        Command::Fdr {
            product,
            amount,
            rate,
            tax,
        } => {
            let principal = amount.as_deref().and_then(parse_amount);
            let rate = rate.as_deref().and_then(parse_amount);
            let result = state.fdr(product, principal, rate, tax)?;

            println!("Product:                   {}", product.label());
            println!("Monthly profit before tax: {}", format_currency(result.monthly_profit_before_tax));
            println!("Total profit before tax:   {}", format_currency(result.total_profit_before_tax));
            println!("Monthly profit after tax:  {}", format_currency(result.monthly_profit_after_tax));
            println!("Total profit after tax:    {}", format_currency(result.total_profit_after_tax));
            println!("Maturity value:            {}", format_currency(result.maturity_value));
            println!("{}", result.details());
            if let Some(caption) = in_words_caption(result.principal) {
                println!("{caption}");
            }
            Ok(false)
        }
        Command::Loan {
            amount,
            rate,
            period,
            period_type,
            fee,
            schedule,
        } => {
            let result = calculate_loan(LoanInput {
                principal: amount.as_deref().and_then(parse_amount),
                annual_rate_percent: rate.as_deref().and_then(parse_amount),
                period,
                period_unit: period_type,
                processing_fee: fee.as_deref().and_then(parse_amount),
            })?;

            println!("Monthly EMI:    {}", format_currency(result.emi));
            println!("Total payment:  {}", format_currency(result.total_payment));
            println!("Total interest: {}", format_currency(result.total_interest));
            println!("Processing fee: {}", format_currency(result.processing_fee));
            println!("Grand total:    {}", format_currency(result.grand_total));
            println!("{}", result.details());
            if let Some(caption) = in_words_caption(result.principal) {
                println!("{caption}");
            }
            if schedule {
                println!();
                println!("{:>5}  {:>14}  {:>14}  {:>16}", "Month", "Principal", "Interest", "Balance");
                for month in result.amortization_schedule() {
                    println!(
                        "{:>5}  {:>14}  {:>14}  {:>16}",
                        month.month,
                        format_currency(month.current_amortization),
                        format_currency(month.current_interest),
                        format_currency(month.new_balance)
                    );
                }
            }
            Ok(false)
        }
        Command::Bills { action } => run_bills(action, state),
        Command::Words { amount } => {
            let amount = parse_amount(&amount).ok_or_else(|| anyhow!("'{amount}' is not an amount"))?;
            println!("{}", signed_amount_to_words(amount));
            Ok(false)
        }
        Command::Rates { action } => run_rates(action, state),
        Command::Settings { action } => run_settings(action, state),
        Command::ToggleTheme => {
            let dark = state.toggle_theme();
            println!("Theme: {}", if dark { "dark" } else { "light" });
            Ok(true)
        }
    }
}

fn run_notes(action: NotesCommand, state: &mut Calculators) -> Result<bool> {
    match action {
        NotesCommand::Tally { counts } => {
            let counts = parse_note_counts(state.notes(), &counts)?;
            let tally = state.notes().tally_counts(&counts)?;

            for line in &tally.lines {
                println!("{:>8}  {:>14}", line.value.normalize(), format_currency(line.subtotal));
            }
            println!("Total: {}", format_currency(tally.grand_total));
            for line in tally.breakdown() {
                println!("  {line}");
            }
            if let Some(caption) = in_words_caption(tally.grand_total) {
                println!("{caption}");
            }
            Ok(false)
        }
        NotesCommand::Add { value } => {
            let value = parse_amount(&value).ok_or_else(|| anyhow!("'{value}' is not a denomination"))?;
            let (note, column) = state.notes_mut().add_denomination(value)?;
            println!("Added {} denomination as {} ({:?} column)", format_currency(note.value), note.id, column);
            Ok(true)
        }
        NotesCommand::Remove { id } => {
            let note = state.notes_mut().remove_denomination(&id)?;
            println!("Removed {} denomination", format_currency(note.value));
            Ok(true)
        }
        NotesCommand::List => {
            for denomination in state.notes().denominations() {
                let kind = if denomination.is_custom {
                    "custom"
                } else {
                    "fixed"
                };
                println!("{:<14} {:>8}  {}", denomination.id, denomination.value.normalize(), kind);
            }
            Ok(false)
        }
    }
}

/// Accepts `<id>=<count>` or `<value>=<count>`; blank or bad counts are dropped.
fn parse_note_counts(notes: &NoteCounter, raw: &[String]) -> Result<HashMap<String, i64>> {
    let denominations = notes.denominations();
    let mut counts = HashMap::new();

    for entry in raw {
        let (key, count) = entry
            .split_once('=')
            .ok_or_else(|| anyhow!("expected <denomination>=<count>, got '{entry}'"))?;
        let key = key.trim();
        let id = denominations
            .iter()
            .find(|d| d.id == key || parse_amount(key).is_some_and(|v| v == d.value))
            .map(|d| d.id.clone())
            .ok_or_else(|| anyhow!("unknown denomination '{key}'"))?;
        if let Some(count) = parse_count(count) {
            counts.insert(id, count);
        }
    }
    Ok(counts)
}

fn run_bills(action: BillsCommand, state: &mut Calculators) -> Result<bool> {
    match action {
        BillsCommand::Total {
            bills,
            received,
            charge,
        } => {
            let sheet = state.bills_mut();
            let slots_before = sheet.bill_counter();
            sheet.clear_all();
            sheet.fill(&bills);
            sheet.set_received(&received);
            sheet.set_bank_charge(&charge);

            let settlement = sheet.settlement()?;
            println!("Total bill amount: {}", format_currency(sheet.total()?));
            println!("Customer payment:  {} ({:?})", settlement, settlement.state);
            Ok(sheet.bill_counter() != slots_before)
        }
        BillsCommand::AddSlot => {
            let index = state.bills_mut().add_bill_slot();
            println!("Added Bill {index}");
            Ok(true)
        }
        BillsCommand::Slots => {
            println!("{} bill slots", state.bills().bill_counter());
            Ok(false)
        }
    }
}

fn run_rates(action: RatesCommand, state: &mut Calculators) -> Result<bool> {
    match action {
        RatesCommand::List => {
            for (product, bands) in state.rates().iter() {
                for (index, band) in bands.iter().enumerate() {
                    println!(
                        "{:<9} #{}  {:<45} {}%",
                        product.code(),
                        index,
                        RateTable::range_label(product, band),
                        band.rate.normalize()
                    );
                }
            }
            Ok(false)
        }
        RatesCommand::Set { product, index, rate } => {
            let rate = parse_amount(&rate).ok_or_else(|| anyhow!("'{rate}' is not a rate"))?;
            state.rates_mut().set_rate(product, index, rate)?;
            println!("Settings saved successfully!");
            Ok(true)
        }
        RatesCommand::Reset => {
            state.rates_mut().reset();
            println!("Settings reset to default!");
            Ok(true)
        }
    }
}

fn run_settings(action: SettingsCommand, state: &mut Calculators) -> Result<bool> {
    match action {
        SettingsCommand::Export { path } => {
            state
                .export_to(&path)
                .with_context(|| format!("Error exporting settings to '{}'", path.display()))?;
            println!("Settings exported to {}", path.display());
            Ok(false)
        }
        SettingsCommand::Import { path } => {
            import(state, &path)?;
            println!("Settings imported successfully!");
            Ok(true)
        }
        SettingsCommand::Show => {
            println!("{}", state.snapshot().to_json()?);
            Ok(false)
        }
    }
}

fn import(state: &mut Calculators, path: &Path) -> Result<()> {
    state
        .import_from(path)
        .with_context(|| format!("Error importing settings from '{}'", path.display()))
}
