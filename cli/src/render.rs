use chrono::Utc;

use board::BoardState;
use entity::{ActivityKind, Stage};

/// Renders the board as one column block per stage, in board order.
pub fn board(state: &BoardState) -> String {
    if state.deals().is_empty() {
        return "No deals in pipeline. Add your first deal to track it through the sales process.\n"
            .to_string();
    }
    let now = Utc::now();
    let mut out = String::new();
    for stage in Stage::ALL {
        let deals = state.deals_by_stage(stage);
        out.push_str(&format!(
            "{} [{}] ({}) {}\n",
            stage,
            stage.color(),
            deals.len(),
            format_currency(state.stage_total(stage)),
        ));
        if deals.is_empty() {
            out.push_str("  (no deals)\n");
            continue;
        }
        for deal in deals {
            let contact = state
                .contact_for(deal)
                .map(|c| c.name.as_str())
                .unwrap_or("Unknown Contact");
            out.push_str(&format!(
                "  #{} {} · {} · {} · {}d in stage\n",
                deal.id,
                deal.title,
                contact,
                format_currency(deal.value),
                deal.days_in_stage(now),
            ));
        }
    }
    out
}

/// Renders the audit log newest-first, optionally filtered to one deal.
pub fn activities(state: &BoardState, deal_id: Option<i64>) -> String {
    let rows: Vec<_> = state
        .activities()
        .iter()
        .filter(|a| deal_id.map(|id| a.deal_id == id).unwrap_or(true))
        .collect();
    if rows.is_empty() {
        return "No activity recorded.\n".to_string();
    }
    let mut out = String::new();
    for activity in rows {
        let change = match (activity.kind, activity.from_stage) {
            (ActivityKind::StageChanged, Some(from)) => {
                format!("{} -> {}", from, activity.to_stage)
            }
            _ => format!("-> {}", activity.to_stage),
        };
        out.push_str(&format!(
            "{}  deal #{}  {}  {}\n",
            activity.timestamp.format("%Y-%m-%d %H:%M"),
            activity.deal_id,
            activity.kind.as_str(),
            change,
        ));
    }
    out
}

/// Whole-dollar currency with thousands separators, e.g. `$12,000`.
fn format_currency(value: f64) -> String {
    let whole = value.round() as i64;
    let digits = whole.to_string();
    let mut grouped = String::new();
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    format!("${grouped}")
}
