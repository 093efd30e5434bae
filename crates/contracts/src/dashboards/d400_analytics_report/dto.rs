use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Query parameters shared by the report endpoints
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ReportRequest {
    /// RFC 3339 timestamp or "YYYY-MM-DD"
    pub date_from: Option<String>,
    /// RFC 3339 timestamp or "YYYY-MM-DD" (whole day, inclusive)
    pub date_to: Option<String>,
}

/// Echo of the requested period
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DateRange {
    pub from: Option<String>,
    pub to: Option<String>,
}

/// Customer breakdown
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerReport {
    pub total_customers: usize,
    pub by_status: BTreeMap<String, usize>,
    pub by_gender: BTreeMap<String, usize>,
    /// Keyed by creation month, "YYYY-MM"
    pub by_month: BTreeMap<String, usize>,
    pub date_range: DateRange,
}

/// Company breakdown
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanyReport {
    pub total_companies: usize,
    pub by_status: BTreeMap<String, usize>,
    /// Keyed by creation month, "YYYY-MM"
    pub by_month: BTreeMap<String, usize>,
    pub date_range: DateRange,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSummary {
    pub total_customers: usize,
    pub total_companies: usize,
    pub timestamp: String,
}

/// Both reports plus summary
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardResponse {
    pub customers: CustomerReport,
    pub companies: CompanyReport,
    pub summary: DashboardSummary,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsSinkStatus {
    pub configured: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportsHealth {
    pub status: String,
    pub timestamp: String,
    pub cube_cloud: AnalyticsSinkStatus,
}
