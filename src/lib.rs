pub mod authz;
pub mod config;
pub mod database;
pub mod dto;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod utils;

use std::sync::Arc;

use crate::middleware::rate_limit::CounterStore;
use crate::services::{
    company_service::CompanyService, job_service::JobService, user_service::UserService,
};
use sqlx::PgPool;

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub counter_store: Arc<dyn CounterStore>,
    pub job_service: JobService,
    pub user_service: UserService,
    pub company_service: CompanyService,
}

impl AppState {
    pub fn new(pool: PgPool, counter_store: Arc<dyn CounterStore>) -> Self {
        let job_service = JobService::new(pool.clone());
        let user_service = UserService::new(pool.clone());
        let company_service = CompanyService::new(pool.clone());

        Self {
            pool,
            counter_store,
            job_service,
            user_service,
            company_service,
        }
    }
}
