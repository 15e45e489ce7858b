use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Per-user aggregate counters for the dashboard header.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsResponse {
    pub total_activities: i64,
    pub active_time: String,
    pub completed: i64,
    pub success_rate: String,
}

/// One row of the recent-activity feed.
#[derive(Debug, Serialize)]
pub struct ActivityItem {
    pub id: Uuid,
    pub title: String,
    pub desc: String,
    pub time: String,
}

#[derive(Debug, Deserialize)]
pub struct AddActivityRequest {
    pub title: String,
    #[serde(default)]
    pub desc: String,
}

/// `completed/total` as a rounded whole percentage, with an explicit
/// divide-by-zero guard.
pub fn success_rate(completed: i64, total: i64) -> String {
    if total == 0 {
        return "0%".into();
    }
    let pct = (completed as f64 / total as f64) * 100.0;
    format!("{}%", pct.round() as i64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_rate_guards_zero_total() {
        assert_eq!(success_rate(0, 0), "0%");
    }

    #[test]
    fn success_rate_rounds_to_nearest_percent() {
        assert_eq!(success_rate(1, 3), "33%");
        assert_eq!(success_rate(2, 3), "67%");
        assert_eq!(success_rate(1, 2), "50%");
        assert_eq!(success_rate(5, 5), "100%");
        assert_eq!(success_rate(0, 7), "0%");
        assert_eq!(success_rate(1, 8), "13%");
    }

    #[test]
    fn stats_response_uses_camel_case_keys() {
        let stats = StatsResponse {
            total_activities: 4,
            active_time: "4h".into(),
            completed: 2,
            success_rate: "50%".into(),
        };
        let json = serde_json::to_string(&stats).unwrap();
        assert!(json.contains("\"totalActivities\":4"));
        assert!(json.contains("\"successRate\":\"50%\""));
        assert!(json.contains("\"activeTime\":\"4h\""));
    }
}
