use crate::args::InitArgs;
use crate::commands::Out;
use crate::error::{ErrorType, IntoResult};
use crate::{Config, Result};
use anyhow::{anyhow, Context};
use std::path::Path;

/// Creates the data directory, its subdirectories and an initial `config.json` naming the store.
///
/// - With a CSV directory, the directory is created if needed and nothing else is required.
/// - With a sheet URL, the OAuth client credentials are copied into the secrets directory. Run
///   `expenses auth` afterwards.
///
/// # Errors
/// - Returns an error if neither store is given, the sheet URL is invalid or any file operation
///   fails.
pub async fn init(expenses_home: &Path, args: &InitArgs) -> Result<Out<()>> {
    let worksheet = args.worksheet().trim();
    if worksheet.is_empty() {
        return Err(anyhow!("The worksheet name cannot be empty")).pub_result(ErrorType::Config);
    }

    let config = match (args.sheet_url(), args.client_secret()) {
        (Some(url), Some(secret_file)) => {
            Config::create_google(expenses_home, secret_file, url, worksheet).await
        }
        (None, None) => Config::create_csv(expenses_home, args.csv_dir(), worksheet).await,
        _ => Err(anyhow!(
            "Provide either --csv-dir, or both --sheet-url and --client-secret"
        )),
    }
    .context("Unable to create the data directory and configs")
    .pub_result(ErrorType::Config)?;

    let next = if config.is_google() {
        " Run 'expenses auth' next to grant access to your sheet."
    } else {
        ""
    };
    Ok(format!(
        "Successfully created the expenses directory and config at {}.{next}",
        config.root().display()
    )
    .into())
}
