use std::sync::Arc;

use crate::api::graphql::{build_schema, AppSchema};
use crate::dashboards::d400_analytics_report::cube::CubeClient;
use crate::dashboards::d400_analytics_report::service::ReportsService;
use crate::domain::a001_customer::service::CustomerService;
use crate::domain::a002_company::service::CompanyService;
use crate::shared::config::Config;
use crate::shared::data::Repositories;
use crate::system::auth::client_credentials::ClientCredentialsClient;
use crate::system::auth::Authenticator;

/// Shared application state, cloned into every handler
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub customers: CustomerService,
    pub companies: CompanyService,
    pub reports: ReportsService,
    pub auth: Arc<Authenticator>,
    pub token_client: ClientCredentialsClient,
    pub schema: AppSchema,
}

impl AppState {
    pub fn new(config: Config, repositories: Repositories) -> anyhow::Result<Self> {
        let page_size = config.storage.default_page_size;
        let customers = CustomerService::new(repositories.customers, page_size);
        let companies = CompanyService::new(repositories.companies, page_size);

        let cube = match (
            config.analytics.cube_api_url.as_deref(),
            config.analytics.cube_api_token.as_deref(),
        ) {
            (Some(url), Some(token)) if !url.is_empty() && !token.is_empty() => {
                Some(CubeClient::new(url, token)?)
            }
            _ => {
                tracing::info!("Cube analytics API not configured, reports are not pushed");
                None
            }
        };
        let reports = ReportsService::new(
            customers.clone(),
            companies.clone(),
            cube,
            config.analytics.report_limit,
        );

        let auth = Arc::new(Authenticator::new(config.auth.clone())?);
        let token_client = ClientCredentialsClient::new(config.identity_provider.clone())?;
        let schema = build_schema(customers.clone(), companies.clone());

        Ok(Self {
            config: Arc::new(config),
            customers,
            companies,
            reports,
            auth,
            token_client,
            schema,
        })
    }
}
