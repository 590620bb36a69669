use super::ui;
use crate::core::derive::{CalcInput, CryptoQuotations, GoldQuotations};
use crate::core::format::{format_currency, format_grouped, format_timestamp};
use crate::core::refresh::{Dashboard, Presenter};
use crate::core::units::{GOLD_POUND_GRAMS, GOLD_POUND_KARAT, currency_symbol};
use comfy_table::Cell;

pub const NOT_AVAILABLE: &str = "N/A";
pub const LOADING_MESSAGE: &str = "Fetching gold and bitcoin prices...";

/// Whole-number figure with the currency symbol, as used by the pound and
/// breakdown tables.
fn whole(amount: f64, currency: &str) -> String {
    format!("{}{}", currency_symbol(currency), format_grouped(amount, 0))
}

fn render_gold_header(gold: &GoldQuotations) -> String {
    format!(
        "{} ${}  {} ({}${})\nUSD/{}: {}",
        ui::style_text("Gold (XAU/USD):", ui::StyleType::Label),
        format_grouped(gold.ounce_usd, 3),
        ui::style_change(gold.change_24h),
        if gold.change_24h >= 0.0 { "+" } else { "-" },
        format_grouped(gold.change_amount_usd, 2),
        gold.currency,
        format_grouped(gold.usd_rate, 2),
    )
}

fn render_unit_table(gold: &GoldQuotations) -> String {
    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Unit"),
        ui::header_cell("Price"),
        ui::header_cell("Sell"),
        ui::header_cell("Buy"),
    ]);
    for (label, unit) in [("Gram", gold.gram), ("Ounce", gold.ounce), ("Kilogram", gold.kg)] {
        table.add_row(vec![
            Cell::new(label),
            ui::value_cell(format_currency(unit.mid, &gold.currency)),
            ui::value_cell(format_currency(unit.quote.sell, &gold.currency)),
            ui::value_cell(format_currency(unit.quote.buy, &gold.currency)),
        ]);
    }
    table.to_string()
}

fn render_karat_table(gold: &GoldQuotations) -> String {
    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Karat"),
        ui::header_cell("Purity"),
        ui::header_cell("Price / gram"),
    ]);
    for karat in &gold.karats {
        table.add_row(vec![
            Cell::new(format!("{}K", karat.karat)),
            ui::value_cell(format!("{:.2}%", karat.purity * 100.0)),
            ui::value_cell(format_currency(karat.price, &gold.currency)),
        ]);
    }
    table.to_string()
}

fn render_breakdown_table(gold: &GoldQuotations) -> String {
    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Karat"),
        ui::header_cell("Price / gram"),
        ui::header_cell("Buy"),
        ui::header_cell("Sell"),
    ]);
    for row in &gold.breakdown {
        table.add_row(vec![
            Cell::new(format!("{}K", row.karat)),
            ui::value_cell(whole(row.mid, &gold.currency)),
            ui::value_cell(whole(row.quote.buy, &gold.currency)),
            ui::value_cell(whole(row.quote.sell, &gold.currency)),
        ]);
    }
    table.to_string()
}

fn render_gold_pound(gold: &GoldQuotations) -> String {
    let pound = gold.gold_pound;
    format!(
        "{} {}\n  Sell: {}  Buy: {}",
        ui::style_text(
            &format!("Gold Pound ({GOLD_POUND_GRAMS}g {GOLD_POUND_KARAT}K):"),
            ui::StyleType::Label
        ),
        ui::style_text(&whole(pound.mid, &gold.currency), ui::StyleType::Headline),
        whole(pound.quote.sell, &gold.currency),
        whole(pound.quote.buy, &gold.currency),
    )
}

/// Gold section: header, unit/karat/breakdown tables and the gold pound.
/// Renders `N/A` placeholders while no gold price is known.
pub fn render_gold(dashboard: &Dashboard) -> String {
    let badge = ui::source_badge(dashboard.state.gold_source);
    let Some(gold) = &dashboard.quotations.gold else {
        return format!(
            "{}\n{} {}\n{}",
            ui::style_text("Gold", ui::StyleType::Title),
            ui::style_text("Gold (XAU/USD):", ui::StyleType::Label),
            NOT_AVAILABLE,
            badge
        );
    };

    [
        ui::style_text("Gold", ui::StyleType::Title),
        render_gold_header(gold),
        badge,
        render_unit_table(gold),
        render_karat_table(gold),
        render_breakdown_table(gold),
        render_gold_pound(gold),
    ]
    .join("\n\n")
}

fn crypto_table(crypto: &CryptoQuotations) -> String {
    let mut table = ui::new_styled_table();
    table.set_header(vec![ui::header_cell("Bitcoin"), ui::header_cell("Value")]);
    table.add_row(vec![
        Cell::new("Price"),
        ui::value_cell(format_currency(crypto.price, &crypto.currency)),
    ]);
    table.add_row(vec![
        Cell::new("Price (USD)"),
        ui::value_cell(format_currency(crypto.price_usd, "USD")),
    ]);
    table.add_row(vec![
        Cell::new("1 Satoshi"),
        ui::value_cell(format_currency(crypto.satoshi, &crypto.currency)),
    ]);
    table.add_row(vec![
        Cell::new("Market Cap"),
        ui::value_cell(format_currency(crypto.market_cap, &crypto.currency)),
    ]);
    table.add_row(vec![Cell::new("24h Change"), ui::change_cell(crypto.change_24h)]);
    table.to_string()
}

pub fn render_crypto(dashboard: &Dashboard) -> String {
    let title = ui::style_text("Bitcoin", ui::StyleType::Title);
    match &dashboard.quotations.crypto {
        Some(crypto) => format!("{title}\n\n{}", crypto_table(crypto)),
        None => format!("{title}\nPrice: {NOT_AVAILABLE}"),
    }
}

/// Calculator line, e.g. `10 gram of 21K gold: ج.م37,908.41`.
pub fn render_calculator(dashboard: &Dashboard, input: &CalcInput) -> String {
    let value = dashboard
        .calculate(input)
        .map_or(NOT_AVAILABLE.to_string(), |v| {
            format_currency(v, &dashboard.currency)
        });
    format!(
        "{} {} {} of {}K gold: {}",
        ui::style_text("Calculator:", ui::StyleType::Label),
        input.weight,
        input.unit,
        input.karat,
        ui::style_text(&value, ui::StyleType::Headline)
    )
}

pub fn render_updated_at(dashboard: &Dashboard) -> String {
    ui::style_text(
        &format!("Last updated: {}", format_timestamp(&dashboard.updated_at)),
        ui::StyleType::Subtle,
    )
}

pub fn render_dashboard(dashboard: &Dashboard, calculator: &CalcInput) -> String {
    let title = format!("Gold & Bitcoin Prices ({})", dashboard.currency);
    [
        ui::style_text(&title, ui::StyleType::Title),
        render_gold(dashboard),
        render_crypto(dashboard),
        render_calculator(dashboard, calculator),
        render_updated_at(dashboard),
    ]
    .join("\n\n")
}

/// Prints each refreshed dashboard to stdout, with a spinner while loading.
pub struct TerminalPresenter {
    calculator: CalcInput,
    indicator: ui::LoadingIndicator,
    separate: bool,
}

impl TerminalPresenter {
    pub fn new(calculator: CalcInput) -> Self {
        TerminalPresenter {
            calculator,
            indicator: ui::LoadingIndicator::default(),
            separate: false,
        }
    }

    /// Prints a separator before each dashboard, for `watch` sessions.
    pub fn with_separator(mut self) -> Self {
        self.separate = true;
        self
    }
}

impl Presenter for TerminalPresenter {
    fn loading(&self) {
        self.indicator.start(LOADING_MESSAGE);
    }

    fn present(&self, dashboard: &Dashboard) {
        self.indicator.clear();
        if self.separate {
            ui::print_separator();
        }
        println!("{}", render_dashboard(dashboard, &self.calculator));
    }
}
