use axum::extract::{Path, Query, State};
use axum::http::header::{CONTENT_DISPOSITION, CONTENT_TYPE};
use axum::http::HeaderMap;
use axum::response::{IntoResponse, Response};
use forge_core::types::ExportFormat;
use serde::Deserialize;

use crate::error::AppError;
use crate::routes::authorize;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ExportQuery {
    #[serde(default)]
    pub format: Option<String>,
}

/// GET /api/forge/export-playbook/{id}?format=json|markdown|pdf|zip
pub async fn export_playbook(
    State(app): State<AppState>,
    Path(id): Path<String>,
    Query(query): Query<ExportQuery>,
    headers: HeaderMap,
) -> Result<Response, AppError> {
    authorize(&app, &headers)?;
    forge_core::paths::validate_project_id(&id)?;
    let format: ExportFormat = query.format.as_deref().unwrap_or("json").parse()?;

    let compiled = app
        .playbooks
        .read()
        .await
        .get(&id)
        .cloned()
        .ok_or_else(|| AppError::not_found(format!("no compiled playbook for '{id}'")))?;

    let body = match format {
        ExportFormat::Json => serde_json::to_vec_pretty(&compiled)?,
        ExportFormat::Markdown => compiled.to_markdown().into_bytes(),
        ExportFormat::Pdf | ExportFormat::Zip => {
            return Err(AppError::not_implemented(format!(
                "{format} export is not available on the development server"
            )));
        }
    };

    let disposition = format!("attachment; filename=\"{id}-playbook.{}\"", format.extension());
    tracing::info!(project = %id, %format, bytes = body.len(), "playbook exported");
    Ok((
        [
            (CONTENT_TYPE, format.content_type().to_string()),
            (CONTENT_DISPOSITION, disposition),
        ],
        body,
    )
        .into_response())
}
