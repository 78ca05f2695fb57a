use chrono::NaiveDate;

const DEFAULT_PRECISION: usize = 2;

/// Renders amounts and dates for terminal output.
#[derive(Debug, Clone, Copy)]
pub struct DisplayFormatter {
    precision: usize,
}

impl Default for DisplayFormatter {
    fn default() -> Self {
        Self {
            precision: DEFAULT_PRECISION,
        }
    }
}

impl DisplayFormatter {
    pub fn new(precision: Option<u8>) -> Self {
        Self {
            precision: precision.map(usize::from).unwrap_or(DEFAULT_PRECISION),
        }
    }

    pub fn amount(&self, amount: f64, currency: &str) -> String {
        format!("{amount:.prec$} {currency}", prec = self.precision)
    }

    /// Mixed-currency totals are shown without a code since no conversion happens.
    pub fn mixed_amount(&self, amount: f64, currencies: usize, fallback: &str) -> String {
        if currencies > 1 {
            format!("{amount:.prec$} (mixed currencies)", prec = self.precision)
        } else {
            self.amount(amount, fallback)
        }
    }

    pub fn date(&self, date: NaiveDate) -> String {
        date.format("%Y-%m-%d").to_string()
    }

    pub fn month(&self, date: NaiveDate) -> String {
        date.format("%b %Y").to_string()
    }
}
