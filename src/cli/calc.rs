use super::dashboard::{LOADING_MESSAGE, render_calculator, render_updated_at};
use super::ui;
use crate::core::derive::CalcInput;
use crate::core::refresh::{Dashboard, Presenter};

/// Prints only the calculator result for one weight/karat.
pub struct CalcPresenter {
    input: CalcInput,
    indicator: ui::LoadingIndicator,
}

impl CalcPresenter {
    pub fn new(input: CalcInput) -> Self {
        CalcPresenter {
            input,
            indicator: ui::LoadingIndicator::default(),
        }
    }
}

pub fn render_calculation(dashboard: &Dashboard, input: &CalcInput) -> String {
    format!(
        "{}\n{}\n{}",
        render_calculator(dashboard, input),
        ui::source_badge(dashboard.state.gold_source),
        render_updated_at(dashboard)
    )
}

impl Presenter for CalcPresenter {
    fn loading(&self) {
        self.indicator.start(LOADING_MESSAGE);
    }

    fn present(&self, dashboard: &Dashboard) {
        self.indicator.clear();
        println!("{}", render_calculation(dashboard, &self.input));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::state::{ExchangeRates, GoldSource, PriceState};
    use crate::core::units::WeightUnit;
    use chrono::Local;

    #[test]
    fn test_render_calculation_with_fallback_gold() {
        console::set_colors_enabled(false);
        let state = PriceState {
            gold_ounce_usd: 2650.0,
            gold_source: GoldSource::Fallback,
            exchange_rates: ExchangeRates::fallback(),
            ..PriceState::default()
        };
        let dashboard = Dashboard::new(state, "USD", Local::now());
        let input = CalcInput {
            weight: 1.0,
            unit: WeightUnit::Ounce,
            karat: 24,
        };

        let output = render_calculation(&dashboard, &input);

        let mut lines = output.lines();
        assert_eq!(
            lines.next(),
            Some("Calculator: 1 ounce of 24K gold: $2,650.00")
        );
        assert_eq!(lines.next(), Some("● Cached price (APIs unavailable)"));
        assert!(lines.next().unwrap().starts_with("Last updated: "));
    }
}
