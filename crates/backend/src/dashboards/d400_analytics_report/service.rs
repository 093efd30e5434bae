use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use contracts::dashboards::d400_analytics_report::dto::{
    AnalyticsSinkStatus, CompanyReport, CustomerReport, DashboardResponse, DashboardSummary,
    DateRange, ReportRequest, ReportsHealth,
};
use contracts::domain::a001_customer::aggregate::Customer;
use contracts::domain::a002_company::aggregate::Company;
use contracts::domain::common::{AggregateRoot, ValidationError};
use serde::Serialize;
use std::collections::BTreeMap;

use super::cube::CubeClient;
use crate::domain::a001_customer::service::CustomerService;
use crate::domain::a002_company::service::CompanyService;
use crate::shared::error::DomainError;

/// Inclusive creation-date window
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DateFilter {
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
}

impl DateFilter {
    pub fn parse(request: &ReportRequest) -> Result<Self, ValidationError> {
        let from = request
            .date_from
            .as_deref()
            .map(|raw| parse_bound("dateFrom", raw, false))
            .transpose()?;
        let to = request
            .date_to
            .as_deref()
            .map(|raw| parse_bound("dateTo", raw, true))
            .transpose()?;
        if let (Some(from), Some(to)) = (from, to) {
            if from > to {
                return Err(ValidationError::new(
                    "dateFrom",
                    "dateFrom must not be after dateTo",
                ));
            }
        }
        Ok(Self { from, to })
    }

    pub fn contains(&self, ts: DateTime<Utc>) -> bool {
        self.from.map_or(true, |from| ts >= from) && self.to.map_or(true, |to| ts <= to)
    }
}

/// RFC 3339 timestamp or a plain date; a plain `dateTo` covers the whole day
fn parse_bound(
    field: &'static str,
    raw: &str,
    end_of_day: bool,
) -> Result<DateTime<Utc>, ValidationError> {
    let raw = raw.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Ok(ts.with_timezone(&Utc));
    }
    let date = NaiveDate::parse_from_str(raw, "%Y-%m-%d").map_err(|_| {
        ValidationError::new(
            field,
            format!("{} must be an RFC 3339 timestamp or YYYY-MM-DD", field),
        )
    })?;
    let naive = if end_of_day {
        date.and_hms_nano_opt(23, 59, 59, 999_999_999)
    } else {
        date.and_hms_opt(0, 0, 0)
    }
    .ok_or_else(|| ValidationError::new(field, "Invalid date"))?;
    Ok(Utc.from_utc_datetime(&naive))
}

fn month_key(ts: DateTime<Utc>) -> String {
    ts.format("%Y-%m").to_string()
}

fn count_by<T, F>(items: &[T], key: F) -> BTreeMap<String, usize>
where
    F: Fn(&T) -> String,
{
    let mut counts = BTreeMap::new();
    for item in items {
        *counts.entry(key(item)).or_insert(0) += 1;
    }
    counts
}

pub fn build_customer_report(customers: &[Customer], range: DateRange) -> CustomerReport {
    CustomerReport {
        total_customers: customers.len(),
        by_status: count_by(customers, |c| c.status().as_str().to_string()),
        by_gender: count_by(customers, |c| c.gender.as_str().to_string()),
        by_month: count_by(customers, |c| month_key(c.metadata.create_date)),
        date_range: range,
    }
}

pub fn build_company_report(companies: &[Company], range: DateRange) -> CompanyReport {
    CompanyReport {
        total_companies: companies.len(),
        by_status: count_by(companies, |c| c.status().as_str().to_string()),
        by_month: count_by(companies, |c| month_key(c.metadata.create_date)),
        date_range: range,
    }
}

/// Aggregated customer/company analytics (d400)
#[derive(Clone)]
pub struct ReportsService {
    customers: CustomerService,
    companies: CompanyService,
    cube: Option<CubeClient>,
    report_limit: usize,
}

impl ReportsService {
    pub fn new(
        customers: CustomerService,
        companies: CompanyService,
        cube: Option<CubeClient>,
        report_limit: usize,
    ) -> Self {
        Self {
            customers,
            companies,
            cube,
            report_limit: report_limit.max(1),
        }
    }

    pub async fn customer_report(
        &self,
        request: &ReportRequest,
    ) -> Result<CustomerReport, DomainError> {
        let filter = DateFilter::parse(request)?;
        let customers: Vec<Customer> = self
            .customers
            .collect_active(self.report_limit)
            .await?
            .into_iter()
            .filter(|c| filter.contains(c.metadata.create_date))
            .collect();

        let report = build_customer_report(&customers, echo_range(request));
        self.push("customers", &report).await;
        Ok(report)
    }

    pub async fn company_report(
        &self,
        request: &ReportRequest,
    ) -> Result<CompanyReport, DomainError> {
        let filter = DateFilter::parse(request)?;
        let companies: Vec<Company> = self
            .companies
            .collect_active(self.report_limit)
            .await?
            .into_iter()
            .filter(|c| filter.contains(c.metadata.create_date))
            .collect();

        let report = build_company_report(&companies, echo_range(request));
        self.push("companies", &report).await;
        Ok(report)
    }

    /// Both reports over the full period, computed concurrently
    pub async fn dashboard(&self) -> Result<DashboardResponse, DomainError> {
        let all = ReportRequest::default();
        let (customers, companies) =
            tokio::try_join!(self.customer_report(&all), self.company_report(&all))?;

        let dashboard = DashboardResponse {
            summary: DashboardSummary {
                total_customers: customers.total_customers,
                total_companies: companies.total_companies,
                timestamp: Utc::now().to_rfc3339(),
            },
            customers,
            companies,
        };
        self.push("dashboard", &dashboard).await;
        Ok(dashboard)
    }

    pub fn health(&self) -> ReportsHealth {
        ReportsHealth {
            status: "ok".into(),
            timestamp: Utc::now().to_rfc3339(),
            cube_cloud: AnalyticsSinkStatus {
                configured: self.cube.is_some(),
                url: self.cube.as_ref().map(|c| c.base_url().to_string()),
            },
        }
    }

    /// Failures are logged and never surface to the caller
    async fn push<T: Serialize>(&self, data_type: &str, data: &T) {
        let Some(cube) = &self.cube else { return };
        if let Err(e) = cube.send(data_type, data).await {
            tracing::error!("Failed to send {} data to Cube: {}", data_type, e);
        }
    }
}

fn echo_range(request: &ReportRequest) -> DateRange {
    DateRange {
        from: request.date_from.clone(),
        to: request.date_to.clone(),
    }
}
