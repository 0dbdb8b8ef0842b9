//! Implements the `Sheet` trait using the `sheets::Client` to interact with a Google sheet.

use crate::api::{Sheet, TokenProvider};
use crate::Result;
use anyhow::Context;
use sheets::types::{
    BatchClearValuesRequest, BatchUpdateValuesRequest, DateTimeRenderOption, Dimension,
    ValueInputOption, ValueRange, ValueRenderOption,
};
use sheets::ClientError;
use tracing::{debug, trace};

/// Google answers a read of a worksheet that does not exist with this message.
const MISSING_RANGE: &str = "Unable to parse range";

/// Implements the `Sheet` trait for one Google spreadsheet. It holds a `TokenProvider`, on which
/// it calls refresh to keep the token up-to-date.
pub(super) struct GoogleSheet {
    spreadsheet_id: String,
    token_provider: TokenProvider,
    client: sheets::Client,
}

impl GoogleSheet {
    pub(super) async fn new(
        spreadsheet_id: impl Into<String>,
        mut token_provider: TokenProvider,
    ) -> Result<Self> {
        let client = create_sheets_client(&mut token_provider).await?;
        Ok(Self {
            spreadsheet_id: spreadsheet_id.into(),
            token_provider,
            client,
        })
    }

    /// Refreshes the sheets client with a new access token if needed
    async fn refresh_client(&mut self) -> Result<()> {
        self.client = create_sheets_client(&mut self.token_provider).await?;
        Ok(())
    }
}

#[async_trait::async_trait]
impl Sheet for GoogleSheet {
    async fn get(&mut self, worksheet: &str) -> Result<Vec<Vec<String>>> {
        trace!("get for {worksheet}");
        self.refresh_client().await?;
        let range = format!("{worksheet}!A:ZZ");
        let result = self
            .client
            .spreadsheets()
            .values_get(
                &self.spreadsheet_id,
                &range,
                DateTimeRenderOption::FormattedString,
                Dimension::Rows,
                ValueRenderOption::FormattedValue,
            )
            .await;
        match result {
            Ok(response) => Ok(response.body.values),
            Err(e) if e.to_string().contains(MISSING_RANGE) => {
                debug!("Worksheet '{worksheet}' does not exist yet, treating it as empty");
                Ok(Vec::new())
            }
            Err(e) => Err(map_client_error(e))
                .with_context(|| format!("Failed to fetch the '{worksheet}' worksheet")),
        }
    }

    async fn put(&mut self, worksheet: &str, rows: &[Vec<String>]) -> Result<()> {
        trace!("put {} rows to {worksheet}", rows.len());
        self.refresh_client().await?;

        let clear = BatchClearValuesRequest {
            ranges: vec![format!("{worksheet}!A:ZZ")],
        };
        self.client
            .spreadsheets()
            .values_batch_clear(&self.spreadsheet_id, &clear)
            .await
            .map_err(map_client_error)
            .with_context(|| {
                format!("Failed to clear the '{worksheet}' worksheet, does it exist?")
            })?;

        // RAW keeps the cells exactly as written, so dates and amounts are not reinterpreted
        let update = BatchUpdateValuesRequest {
            data: vec![ValueRange {
                major_dimension: Some(Dimension::Rows),
                range: format!("{worksheet}!A1"),
                values: rows.to_vec(),
            }],
            include_values_in_response: Some(false),
            response_date_time_render_option: None,
            response_value_render_option: None,
            value_input_option: Some(ValueInputOption::Raw),
        };
        self.client
            .spreadsheets()
            .values_batch_update(&self.spreadsheet_id, &update)
            .await
            .map_err(map_client_error)
            .with_context(|| format!("Failed to write the '{worksheet}' worksheet"))?;
        Ok(())
    }
}

/// Creates a new sheets client with a refreshed access token.
async fn create_sheets_client(token_provider: &mut TokenProvider) -> Result<sheets::Client> {
    let access_token = token_provider.token_with_refresh().await?;

    // Only the access token is used for API calls; refresh is handled by the TokenProvider
    Ok(sheets::Client::new(
        String::new(),
        String::new(),
        String::new(),
        access_token.to_string(),
        String::new(),
    ))
}

fn map_client_error(e: ClientError) -> anyhow::Error {
    let error_name = match &e {
        ClientError::EmptyRefreshToken => "EmptyRefreshToken".to_string(),
        ClientError::FromUtf8Error(inner) => format!("FromUtf8Error {inner}"),
        ClientError::UrlParserError(inner) => format!("UrlParserError {inner}"),
        ClientError::SerdeJsonError(inner) => format!("SerdeJsonError {inner}"),
        ClientError::ReqwestError(inner) => format!("ReqwestError {inner}"),
        ClientError::InvalidHeaderValue(inner) => format!("InvalidHeaderValue {inner}"),
        ClientError::ReqwestMiddleWareError(inner) => format!("ReqwestMiddleWareError {inner}"),
        ClientError::HttpError { .. } => "HttpError".to_string(),
        ClientError::Other(_) => "Other".to_string(),
    };
    anyhow::Error::new(e).context(error_name)
}
