//! Message formatting (Telegram HTML subset)

use crate::core::SpikeAlert;

/// Moves above this magnitude get the urgent marker
pub const URGENT_CHANGE_PERCENT: f64 = 20.0;

pub const TEST_MESSAGE: &str =
    "🧪 <b>Test Notification</b>\n\nIV Spike Notifier is working correctly!";

/// Full message for one alert
pub fn format_alert(alert: &SpikeAlert) -> String {
    let direction = if alert.change_percent > 0.0 { "🚀" } else { "📉" };
    let urgency = if alert.change_percent.abs() > URGENT_CHANGE_PERCENT {
        "🔥"
    } else {
        "⚡"
    };
    let contract = &alert.contract;

    format!(
        "{urgency} <b>IV SPIKE ALERT</b> {direction}\n\n\
         <b>Symbol:</b> {}\n\
         <b>Strike:</b> {} {}\n\
         <b>Expiry:</b> {}\n\
         <b>IV Change:</b> {:.1}% → {:.1}%\n\
         <b>Change:</b> {:+.1}%\n\
         <b>Time:</b> {}",
        contract.symbol,
        contract.strike,
        contract.option_type.code(),
        contract.expiry,
        alert.old_iv,
        alert.new_iv,
        alert.change_percent,
        alert.timestamp.format("%H:%M:%S"),
    )
}

/// Summary for several alerts; only the first `preview_limit` are listed
pub fn format_batch(alerts: &[SpikeAlert], preview_limit: usize) -> String {
    let mut message = format!(
        "🔥 <b>MULTIPLE IV SPIKES DETECTED</b> ({} alerts)\n\n",
        alerts.len()
    );

    for (i, alert) in alerts.iter().take(preview_limit).enumerate() {
        message.push_str(&format!(
            "{}. {} {}{} {:+.1}%\n",
            i + 1,
            alert.contract.symbol,
            alert.contract.strike,
            alert.contract.option_type.code(),
            alert.change_percent
        ));
    }

    if alerts.len() > preview_limit {
        message.push_str(&format!(
            "\n... and {} more spikes",
            alerts.len() - preview_limit
        ));
    }

    message
}

/// The one message a cycle's alerts turn into, if any
pub fn format_cycle(alerts: &[SpikeAlert], preview_limit: usize) -> Option<String> {
    match alerts {
        [] => None,
        [single] => Some(format_alert(single)),
        many => Some(format_batch(many, preview_limit)),
    }
}
