//! The MCP tools that drive the form.

use crate::commands::Out;
use crate::export::ExportSummary;
use crate::form::{AddRow, Form, FormView};
use crate::mcp::mcp_utils::tool_result;
use crate::mcp::FormServer;
use crate::model::{Field, SessionBounds};
use crate::notify::Notification;
use crate::utils;
use anyhow::ensure;
use rmcp::handler::server::wrapper::Parameters;
use rmcp::model::CallToolResult;
use rmcp::ErrorData as McpError;
use rmcp::{tool, tool_router};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::path::{Component, PathBuf};
use tracing::info;

/// Parameters for the set_date_bounds tool.
#[derive(Debug, Deserialize, JsonSchema)]
#[schemars(title = "SetDateBoundsParams")]
pub struct SetDateBoundsParams {
    /// Earliest allowed transaction date, YYYY-MM-DD. An empty string clears the bound.
    #[serde(default)]
    pub min_date: String,

    /// Latest allowed transaction date, YYYY-MM-DD. An empty string clears the bound.
    #[serde(default)]
    pub max_date: String,
}

/// Parameters for the update_field tool.
#[derive(Debug, Deserialize, JsonSchema)]
#[schemars(title = "UpdateFieldParams")]
pub struct UpdateFieldParams {
    /// Zero-based row index. The last row is the open row where new data is entered.
    pub index: usize,

    /// Which field to set.
    pub field: Field,

    /// The new raw value. For `category` use one of Food, Transport, Utilities, Entertainment,
    /// Other, or an empty string to clear it.
    #[serde(default)]
    pub value: String,
}

/// Parameters for the delete_row tool.
#[derive(Debug, Deserialize, JsonSchema)]
#[schemars(title = "DeleteRowParams")]
pub struct DeleteRowParams {
    /// Zero-based row index. Deleting the open row clears it instead.
    pub index: usize,
}

/// Parameters for the export_to_excel tool.
#[derive(Debug, Default, Deserialize, JsonSchema)]
#[schemars(title = "ExportParams")]
pub struct ExportParams {
    /// Where to write the workbook, inside the export directory. Relative paths are resolved
    /// against the export directory; absolute paths must point inside it. Defaults to
    /// `transactions.xlsx` in the export directory.
    #[serde(default)]
    pub path: Option<PathBuf>,
}

/// What every form tool returns alongside its message.
#[derive(Debug, Clone, Serialize)]
pub(super) struct FormReport {
    /// Messages shown to the user during the call.
    notifications: Vec<Notification>,
    /// The form after the call.
    form: FormView,
    #[serde(skip_serializing_if = "Option::is_none")]
    outcome: Option<AddRow>,
    #[serde(skip_serializing_if = "Option::is_none")]
    export: Option<ExportSummary>,
}

impl FormServer {
    fn form_report(&self, form: &Form) -> FormReport {
        FormReport {
            notifications: self.notifications.drain(),
            form: form.view(),
            outcome: None,
            export: None,
        }
    }

    fn report(&self, form: &Form, message: impl Into<String>) -> Out<FormReport> {
        Out::new(message, self.form_report(form))
    }

    /// Notifications raised by a failed call are already carried in the error text.
    fn finish(
        &self,
        form: &Form,
        result: crate::Result<String>,
    ) -> crate::Result<Out<FormReport>> {
        match result {
            Ok(message) => Ok(self.report(form, message)),
            Err(e) => {
                let _ = self.notifications.drain();
                Err(e)
            }
        }
    }

    /// Resolves the requested workbook path. Clients may only write inside the export
    /// directory.
    fn export_path(&self, path: Option<PathBuf>) -> crate::Result<PathBuf> {
        let Some(path) = path else {
            return Ok(self.config.default_export_path());
        };
        let export_dir = self.config.export_dir();
        ensure!(
            !path.components().any(|c| matches!(c, Component::ParentDir)),
            "The export path '{}' may not contain '..'",
            path.display()
        );
        let resolved = if path.is_absolute() {
            path
        } else {
            export_dir.join(path)
        };
        ensure!(
            resolved.starts_with(&export_dir) && resolved != export_dir,
            "The export path '{}' must be a file inside the export directory {}",
            resolved.display(),
            export_dir.display()
        );
        Ok(resolved)
    }
}

#[tool_router(vis = "pub(super)")]
impl FormServer {
    #[tool]
    /// Initialize the txn-sheet MCP service for this session and return usage instructions. You
    /// **MUST** call this **ONCE** before using other tools so that you have the full usage
    /// instructions. You **MAY** call it more than once if you have forgotten the usage
    /// instructions.
    async fn initialize_service(&self) -> Result<CallToolResult, McpError> {
        let mut initialized = self.initialized.lock().await;
        *initialized = true;
        Ok(CallToolResult::success(vec![rmcp::model::Content::text(
            include_str!("docs/INSTRUCTIONS.md"),
        )]))
    }

    /// Set the session Min Date and Max Date (YYYY-MM-DD). Rows cannot be edited or deleted
    /// until both are set. The dates of rows already added are re-validated against the new
    /// bounds.
    #[tool]
    async fn set_date_bounds(
        &self,
        Parameters(params): Parameters<SetDateBoundsParams>,
    ) -> Result<CallToolResult, McpError> {
        require_init!(self);
        info!(
            "MCP: set_date_bounds called with min_date='{}', max_date='{}'",
            params.min_date, params.max_date
        );
        let mut form = self.form.lock().await;
        let result = SessionBounds::parse(&params.min_date, &params.max_date).map(|bounds| {
            form.set_bounds(bounds);
            "Date bounds set".to_string()
        });
        tool_result(self.finish(&form, result))
    }

    /// Set one field of one row and re-validate that field. Validation messages are stored on
    /// the row under `errors` and do not fail the call. The call fails when the date bounds are
    /// not set, the row does not exist, or the category is not one of the allowed values.
    #[tool]
    async fn update_field(
        &self,
        Parameters(params): Parameters<UpdateFieldParams>,
    ) -> Result<CallToolResult, McpError> {
        require_init!(self);
        info!(
            "MCP: update_field called with index={}, field={}",
            params.index, params.field
        );
        let mut form = self.form.lock().await;
        let result = form
            .update_field(params.index, params.field, params.value)
            .map(|()| format!("Updated {} of row {}", params.field, params.index));
        tool_result(self.finish(&form, result))
    }

    /// Validate every row and, if all are valid, send rows without a category to the
    /// classification service, fill in the predicted categories, and add a new blank open row.
    /// The `outcome` is `invalid` when validation failed and `classification_failed` when the
    /// service could not be reached or rejected the request; in both cases no row is added.
    #[tool]
    async fn add_row(&self) -> Result<CallToolResult, McpError> {
        require_init!(self);
        info!("MCP: add_row called");
        let mut form = self.form.lock().await;
        let outcome = form.add_row().await;
        let message = match outcome {
            AddRow::Added { classified } => {
                format!("Row added, {classified} row(s) auto-categorized")
            }
            AddRow::Invalid => "Row not added, fix the validation errors on the rows".into(),
            AddRow::ClassificationFailed => "Row not added, category classification failed".into(),
        };
        let report = FormReport {
            outcome: Some(outcome),
            ..self.form_report(&form)
        };
        tool_result(Ok(Out::new(message, report)))
    }

    /// Delete the row at `index`. Deleting the open row resets it to blank, so the form always
    /// has at least one row. Requires the date bounds to be set.
    #[tool]
    async fn delete_row(
        &self,
        Parameters(params): Parameters<DeleteRowParams>,
    ) -> Result<CallToolResult, McpError> {
        require_init!(self);
        info!("MCP: delete_row called with index={}", params.index);
        let mut form = self.form.lock().await;
        let result = form
            .delete_row(params.index)
            .map(|()| format!("Deleted row {}", params.index));
        tool_result(self.finish(&form, result))
    }

    /// Return the date bounds and every row with its role, values and validation messages.
    #[tool]
    async fn list_rows(&self) -> Result<CallToolResult, McpError> {
        require_init!(self);
        info!("MCP: list_rows called");
        let form = self.form.lock().await;
        let message = format!("The form has {} row(s)", form.len());
        tool_result(Ok(self.report(&form, message)))
    }

    /// Export the added rows (not the open row) to an Excel workbook with a styled header. At
    /// least 5 rows must have been added, none may have validation errors, and both date bounds
    /// must be set. The workbook is always written inside the configured export directory.
    #[tool]
    async fn export_to_excel(
        &self,
        Parameters(params): Parameters<ExportParams>,
    ) -> Result<CallToolResult, McpError> {
        require_init!(self);
        let path = match self.export_path(params.path) {
            Ok(path) => path,
            Err(e) => return tool_result::<FormReport>(Err(e)),
        };
        info!("MCP: export_to_excel called with path={}", path.display());
        if let Some(parent) = path.parent() {
            if let Err(e) = utils::make_dir(parent).await {
                return tool_result::<FormReport>(Err(e));
            }
        }
        let form = self.form.lock().await;
        let result = form.export(&path).map_err(crate::Error::from);
        match result {
            Ok(summary) => {
                let message = format!(
                    "Exported {} row(s) to {}",
                    summary.rows,
                    summary.path.display()
                );
                let report = FormReport {
                    export: Some(summary),
                    ..self.form_report(&form)
                };
                tool_result(Ok(Out::new(message, report)))
            }
            Err(e) => tool_result(self.finish(&form, Err(e))),
        }
    }
}
