//! The MCP tools. Each one calls the command handler of the same name and returns its `Out`.

use crate::args::{AddExpenseArgs, AddIncomeArgs, BreakdownArgs, DashboardArgs, TrendArgs};
use crate::commands;
use crate::mcp::mcp_utils::tool_result;
use crate::mcp::ExpenseServer;
use rmcp::handler::server::wrapper::Parameters;
use rmcp::model::CallToolResult;
use rmcp::ErrorData as McpError;
use rmcp::{tool, tool_router};
use tracing::info;

#[tool_router(vis = "pub(super)")]
impl ExpenseServer {
    #[tool]
    /// Initialize the expenses MCP service for this session and return usage instructions. You
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

    /// Record an expense by appending a row to the transaction worksheet.
    ///
    /// # Parameters
    ///
    /// - `category`: one of the expense categories returned by `list_categories`, case does not
    ///   matter.
    /// - `description`: what the money was spent on. Must not be empty.
    /// - `amount`: greater than zero, as a number (`12.5`) or a string (`"$1,200.00"`). It is kept
    ///   to cents.
    /// - `date`: `YYYY-MM-DD`, defaults to today.
    ///
    /// An invalid entry is returned as an error and nothing is written.
    #[tool]
    async fn add_expense(
        &self,
        Parameters(args): Parameters<AddExpenseArgs>,
    ) -> Result<CallToolResult, McpError> {
        require_init!(self);
        info!("MCP: add_expense called");
        let _guard = self.append_lock.lock().await;
        tool_result(commands::add_expense(&self.config, &args).await)
    }

    /// Record an income by appending a row to the transaction worksheet.
    ///
    /// # Parameters
    ///
    /// - `category`: one of the income categories returned by `list_categories`, case does not
    ///   matter.
    /// - `amount`: greater than zero, as a number or a string. It is kept to cents.
    /// - `date`: `YYYY-MM-DD`, defaults to today.
    ///
    /// An invalid entry is returned as an error and nothing is written.
    #[tool]
    async fn add_income(
        &self,
        Parameters(args): Parameters<AddIncomeArgs>,
    ) -> Result<CallToolResult, McpError> {
        require_init!(self);
        info!("MCP: add_income called");
        let _guard = self.append_lock.lock().await;
        tool_result(commands::add_income(&self.config, &args).await)
    }

    /// The dashboard: total income, total expenses and the remaining balance (income minus
    /// expenses, negative when overspent), the expenses of the current month, the income of the
    /// previous month (rounded to a whole unit), the totals by type and the most recent
    /// transactions.
    ///
    /// When nothing has been recorded the structure is `{"status": "no_data"}`.
    #[tool]
    async fn dashboard(
        &self,
        Parameters(args): Parameters<DashboardArgs>,
    ) -> Result<CallToolResult, McpError> {
        require_init!(self);
        info!("MCP: dashboard called");
        tool_result(commands::dashboard(&self.config, &args).await)
    }

    /// Expenses of one year by month and category. There is always an entry for each of the 12
    /// months, in calendar order, with a zero total for months without expenses.
    #[tool]
    async fn report_breakdown(
        &self,
        Parameters(args): Parameters<BreakdownArgs>,
    ) -> Result<CallToolResult, McpError> {
        require_init!(self);
        info!("MCP: report_breakdown called");
        tool_result(commands::report_breakdown(&self.config, &args).await)
    }

    /// Expense totals for each of the 12 months, optionally for one category. Without `year` the
    /// current year is used; with `all_years` the same month of every year is added together.
    #[tool]
    async fn report_trend(
        &self,
        Parameters(args): Parameters<TrendArgs>,
    ) -> Result<CallToolResult, McpError> {
        require_init!(self);
        info!("MCP: report_trend called");
        tool_result(commands::report_trend(&self.config, &args).await)
    }

    /// Total income and total expenses over everything recorded.
    #[tool]
    async fn report_totals(&self) -> Result<CallToolResult, McpError> {
        require_init!(self);
        info!("MCP: report_totals called");
        tool_result(commands::report_totals(&self.config).await)
    }

    /// The expense categories and the income categories that entries are checked against.
    #[tool]
    async fn list_categories(&self) -> Result<CallToolResult, McpError> {
        require_init!(self);
        tool_result(Ok(commands::categories()))
    }
}
