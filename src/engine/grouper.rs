//! Groups a batch of alerts by severity.
//!
//! Buckets are keyed by severity rank in a `BTreeMap`, so the output order
//! never depends on hashing or insertion order. Within a bucket alerts are
//! stably sorted by host name using plain byte-wise comparison; alerts for the
//! same host keep their arrival order.

use std::collections::BTreeMap;

use crate::models::{Alert, Severity};

/// All alerts of a single severity, ordered for display.
#[derive(Debug, Clone, PartialEq)]
pub struct SeverityGroup {
    /// Severity shared by every alert in the group.
    pub severity: Severity,
    /// Alerts sorted by host name, then arrival order.
    pub alerts: Vec<Alert>,
}

/// Partitions `alerts` (in arrival order) into severity groups, most urgent
/// first. Empty severities are omitted.
pub fn group_by_severity(alerts: &[Alert]) -> Vec<SeverityGroup> {
    let mut buckets: BTreeMap<u8, SeverityGroup> = BTreeMap::new();

    for alert in alerts {
        buckets
            .entry(alert.severity.rank())
            .or_insert_with(|| SeverityGroup { severity: alert.severity, alerts: Vec::new() })
            .alerts
            .push(alert.clone());
    }

    buckets
        .into_values()
        .map(|mut group| {
            // `sort_by` is stable, which keeps arrival order for equal hosts.
            group.alerts.sort_by(|a, b| a.host_name.cmp(&b.host_name));
            group
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::{models::AlertId, test_helpers::AlertInputBuilder};

    fn alert(id: u64, severity: &str, host: &str, metric: &str) -> Alert {
        AlertInputBuilder::new(host)
            .severity(severity)
            .metric(metric)
            .build()
            .validate()
            .unwrap()
            .stamp(AlertId(id), Utc::now())
    }

    fn summary(groups: &[SeverityGroup]) -> Vec<(Severity, Vec<String>)> {
        groups
            .iter()
            .map(|g| {
                (
                    g.severity,
                    g.alerts.iter().map(|a| format!("{} {}", a.host_name, a.metric_name)).collect(),
                )
            })
            .collect()
    }

    #[test]
    fn test_groups_dashboard_scenario() {
        let alerts = vec![
            alert(1, "warning", "web-2", "CPU"),
            alert(2, "critical", "db-1", "disk"),
            alert(3, "warning", "web-1", "mem"),
        ];

        let groups = group_by_severity(&alerts);

        assert_eq!(
            summary(&groups),
            vec![
                (Severity::Critical, vec!["db-1 disk".to_string()]),
                (Severity::Warning, vec!["web-1 mem".to_string(), "web-2 CPU".to_string()]),
            ]
        );
    }

    #[test]
    fn test_empty_input_yields_no_groups() {
        assert!(group_by_severity(&[]).is_empty());
    }

    #[test]
    fn test_orders_every_severity_by_rank() {
        let alerts = vec![
            alert(1, "info", "h", "m"),
            alert(2, "medium", "h", "m"),
            alert(3, "critical", "h", "m"),
            alert(4, "warning", "h", "m"),
            alert(5, "high", "h", "m"),
        ];
        let severities: Vec<Severity> =
            group_by_severity(&alerts).iter().map(|g| g.severity).collect();
        assert_eq!(severities, Severity::ALL.to_vec());
    }

    #[test]
    fn test_same_host_keeps_arrival_order() {
        let alerts = vec![
            alert(1, "high", "web-1", "first"),
            alert(2, "high", "app-1", "other"),
            alert(3, "high", "web-1", "second"),
        ];
        let groups = group_by_severity(&alerts);
        let ids: Vec<AlertId> = groups[0].alerts.iter().map(|a| a.id).collect();
        assert_eq!(ids, vec![AlertId(2), AlertId(1), AlertId(3)]);
    }

    #[test]
    fn test_host_comparison_is_case_sensitive() {
        let alerts = vec![alert(1, "info", "web", "m"), alert(2, "info", "Web", "m")];
        let groups = group_by_severity(&alerts);
        let hosts: Vec<&str> = groups[0].alerts.iter().map(|a| a.host_name.as_str()).collect();
        assert_eq!(hosts, vec!["Web", "web"]);
    }

    #[test]
    fn test_output_is_independent_of_arrival_permutation() {
        let base = vec![
            alert(1, "warning", "web-2", "CPU"),
            alert(2, "critical", "db-1", "disk"),
            alert(3, "warning", "web-1", "mem"),
            alert(4, "info", "cache-1", "hits"),
            alert(5, "critical", "api-1", "latency"),
        ];
        let expected = summary(&group_by_severity(&base));

        let permutations: [[usize; 5]; 4] =
            [[4, 3, 2, 1, 0], [2, 0, 4, 1, 3], [1, 4, 0, 3, 2], [3, 1, 2, 0, 4]];
        for order in permutations {
            let shuffled: Vec<Alert> = order.iter().map(|i| base[*i].clone()).collect();
            assert_eq!(summary(&group_by_severity(&shuffled)), expected);
        }
    }
}
