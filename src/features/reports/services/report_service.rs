use std::sync::Arc;

use reqwest::Method;
use serde_json::Value;
use tracing::info;

use crate::core::error::{AppError, Result};
use crate::features::reports::dtos::{AssignReportDto, UpdateReportDto, UpdateReportStatusDto};
use crate::modules::backend::{BackendClient, BackendEndpoint};
use crate::shared::types::PaginationQuery;

/// Report retrieval and mutation, delegated to the municipal backend.
///
/// Report bodies stay opaque JSON; the backend owns their shape and rules.
pub struct ReportService {
    backend: Arc<BackendClient>,
}

impl ReportService {
    pub fn new(backend: Arc<BackendClient>) -> Self {
        Self { backend }
    }

    fn page_query(pagination: &PaginationQuery) -> [(&'static str, String); 2] {
        [
            ("page", pagination.page().to_string()),
            ("limit", pagination.limit().to_string()),
        ]
    }

    async fn list(
        &self,
        endpoint: BackendEndpoint,
        pagination: &PaginationQuery,
        bearer: Option<&str>,
    ) -> Result<Value> {
        let body = self
            .backend
            .get_json(&endpoint, &Self::page_query(pagination), bearer)
            .await?;
        Ok(BackendClient::unwrap_data(body))
    }

    pub async fn list_all(&self, pagination: &PaginationQuery, bearer: Option<&str>) -> Result<Value> {
        self.list(BackendEndpoint::Reports, pagination, bearer).await
    }

    pub async fn list_mine(&self, pagination: &PaginationQuery, bearer: Option<&str>) -> Result<Value> {
        self.list(BackendEndpoint::MyReports, pagination, bearer).await
    }

    pub async fn list_assigned(
        &self,
        pagination: &PaginationQuery,
        bearer: Option<&str>,
    ) -> Result<Value> {
        self.list(BackendEndpoint::AssignedReports, pagination, bearer)
            .await
    }

    pub async fn get(&self, id: &str, bearer: Option<&str>) -> Result<Value> {
        let body = self
            .backend
            .get_json(&BackendEndpoint::Report(id.to_string()), &[], bearer)
            .await?;
        Ok(BackendClient::unwrap_data(body))
    }

    pub async fn update(
        &self,
        id: &str,
        dto: &UpdateReportDto,
        bearer: Option<&str>,
    ) -> Result<Value> {
        if dto.is_empty() {
            return Err(AppError::Validation("No fields to update".to_string()));
        }
        let body = self
            .backend
            .send_json(
                Method::PUT,
                &BackendEndpoint::Report(id.to_string()),
                &dto.to_backend_body(),
                bearer,
            )
            .await?;
        info!("Report {} updated", id);
        Ok(BackendClient::unwrap_data(body))
    }

    pub async fn assign(
        &self,
        id: &str,
        dto: &AssignReportDto,
        bearer: Option<&str>,
    ) -> Result<Value> {
        let body = self
            .backend
            .send_json(
                Method::PUT,
                &BackendEndpoint::AssignReport(id.to_string()),
                &dto.to_backend_body(),
                bearer,
            )
            .await?;
        info!("Report {} assigned to {}", id, dto.staff_id);
        Ok(BackendClient::unwrap_data(body))
    }

    pub async fn update_status(
        &self,
        id: &str,
        dto: &UpdateReportStatusDto,
        bearer: Option<&str>,
    ) -> Result<Value> {
        let body = self
            .backend
            .send_json(
                Method::PATCH,
                &BackendEndpoint::ReportStatus(id.to_string()),
                &dto.to_backend_body(),
                bearer,
            )
            .await?;
        info!("Report {} moved to {}", id, dto.status);
        Ok(BackendClient::unwrap_data(body))
    }

    pub async fn delete(&self, id: &str, bearer: Option<&str>) -> Result<()> {
        self.backend
            .delete(&BackendEndpoint::Report(id.to_string()), bearer)
            .await?;
        info!("Report {} deleted", id);
        Ok(())
    }
}
