//! Dashboard Aggregator
//!
//! Joins the cross-module summary against the registry and turns each
//! statistics block into a card of labelled values.

use crate::api::dto::DashboardResponse;
use crate::registry::ModuleRegistry;
use crate::view::display_value;

/// One labelled statistic
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardStat {
    pub label: String,
    pub value: String,
}

/// Statistics card for one module
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardCard {
    pub module: String,
    /// `{icon} {name}` from the registry
    pub title: String,
    pub stats: Vec<DashboardStat>,
    /// Set when the server could not summarise the module
    pub error: Option<String>,
}

/// Turn a statistic key into a display label.
///
/// Every `_` becomes a space, then the first character of each
/// whitespace-separated token is uppercased. Nothing else changes.
pub fn humanize_label(key: &str) -> String {
    let mut label = String::with_capacity(key.len());
    let mut token_start = true;

    for c in key.chars().map(|c| if c == '_' { ' ' } else { c }) {
        if c.is_whitespace() {
            label.push(c);
            token_start = true;
        } else if token_start {
            label.extend(c.to_uppercase());
            token_start = false;
        } else {
            label.push(c);
        }
    }

    label
}

/// Build the dashboard cards. Entries for modules missing from the
/// registry are skipped.
pub fn dashboard_cards(registry: &ModuleRegistry, dashboard: &DashboardResponse) -> Vec<DashboardCard> {
    dashboard
        .modules_summary
        .iter()
        .filter_map(|entry| {
            let Some(module) = registry.get(&entry.module) else {
                tracing::debug!(module = %entry.module, "Skipping summary for unregistered module");
                return None;
            };

            let stats = entry
                .summary
                .iter()
                .flatten()
                .map(|(key, value)| DashboardStat {
                    label: humanize_label(key),
                    value: display_value(value),
                })
                .collect();

            Some(DashboardCard {
                module: module.id.clone(),
                title: format!("{} {}", module.icon, module.name),
                stats,
                error: entry.error.clone(),
            })
        })
        .collect()
}
