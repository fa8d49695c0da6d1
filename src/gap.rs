//! Cross-venue gap math and report building
//!
//! Prices are compared as relative percentages; normalized funding rates as
//! an absolute difference, since funding can be zero or flip sign and a
//! percent there carries no meaning.

use crate::ticker::Ticker;

/// Percentage difference `(a - b) / b * 100`.
///
/// Returns `None` when either side does not parse as a number or `b` is
/// zero, so a degraded reading shows up as unavailable instead of a division
/// blowup.
pub fn percent_diff(a: &str, b: &str) -> Option<f64> {
    let fa = a.trim().parse::<f64>().ok()?;
    let fb = b.trim().parse::<f64>().ok()?;
    if fb == 0.0 {
        return None;
    }
    Some((fa - fb) / fb * 100.0)
}

fn fmt_pct(val: Option<f64>) -> String {
    match val {
        None => "N/A".to_string(),
        Some(v) => format!("{}{:.4}%", if v >= 0.0 { "+" } else { "" }, v),
    }
}

fn fmt_rate(val: f64) -> String {
    format!("{}{:.8}", if val >= 0.0 { "+" } else { "" }, val)
}

/// Gap between the two venues' simultaneous readings for one base asset
#[derive(Debug, Clone)]
pub struct GapReport {
    pub pair: String,
    pub gate: Ticker,
    pub phemex: Ticker,
    pub last_gap_pct: Option<f64>,
    pub mark_gap_pct: Option<f64>,
    pub index_gap_pct: Option<f64>,
    /// Absolute difference of the normalized 8h funding rates (Gate - Phemex)
    pub funding_8h_diff: f64,
}

impl GapReport {
    /// Compute the Gate - Phemex gaps for one pair
    pub fn build(pair: &str, gate: &Ticker, phemex: &Ticker) -> Self {
        Self {
            pair: pair.to_string(),
            last_gap_pct: percent_diff(&gate.last_price, &phemex.last_price),
            mark_gap_pct: percent_diff(&gate.mark_price, &phemex.mark_price),
            index_gap_pct: percent_diff(&gate.index_price, &phemex.index_price),
            funding_8h_diff: gate.funding_rate_8h() - phemex.funding_rate_8h(),
            gate: gate.clone(),
            phemex: phemex.clone(),
        }
    }

    /// Render the human-readable webhook message
    pub fn message(&self) -> String {
        let ts = self.gate.timestamp.format("%Y-%m-%d %H:%M UTC");
        let mut lines = vec![
            format!("**{} Monitor** | {}", self.pair, ts),
            "```".to_string(),
        ];
        lines.extend(venue_block("Gate", &self.gate));
        lines.push(String::new());
        lines.extend(venue_block("Phemex", &self.phemex));
        lines.push(String::new());
        lines.push("[Gap] Gate - Phemex".to_string());
        lines.push(format!(" Last:  {}", fmt_pct(self.last_gap_pct)));
        lines.push(format!(" Mark:  {}", fmt_pct(self.mark_gap_pct)));
        lines.push(format!(" Index: {}", fmt_pct(self.index_gap_pct)));
        lines.push(format!(" FR8h:  {}", fmt_rate(self.funding_8h_diff)));
        lines.push("```".to_string());
        lines.join("\n")
    }
}

fn venue_block(label: &str, ticker: &Ticker) -> Vec<String> {
    let interval = ticker
        .funding_interval_hours
        .map(|h| format!("{h}h"))
        .unwrap_or_else(|| "?".to_string());
    vec![
        format!("[{label}]"),
        format!(" Last:  {}", ticker.last_price),
        format!(" Mark:  {}", ticker.mark_price),
        format!(" Index: {}", ticker.index_price),
        format!(" FR: {}", ticker.funding_rate),
        format!("   ({} -> 8h: {:.8})", interval, ticker.funding_rate_8h()),
    ]
}
