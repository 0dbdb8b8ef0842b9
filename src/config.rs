//! Configuration file handling.
//!
//! The configuration file is stored at `$EXPENSES_HOME/config.json`. It names the store that
//! holds the transactions (a Google Sheet or a directory of CSV files), the worksheet to use,
//! backup settings and the paths of the OAuth files.

use crate::backup::Backup;
use crate::{utils, Result};
use anyhow::{bail, Context};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const APP_NAME: &str = "expenses";
const CONFIG_VERSION: u8 = 1;
const BACKUP_COPIES: u32 = 5;
const WORKSHEET: &str = "Sheet1";
const CSV_DIR: &str = "data";
const SECRETS: &str = ".secrets";
const BACKUPS: &str = ".backups";
const CLIENT_SECRET_JSON: &str = "client_secret.json";
const TOKEN_JSON: &str = "token.json";
const CONFIG_JSON: &str = "config.json";

/// The `Config` object represents the configuration of the app. You instantiate it by providing
/// the path to `$EXPENSES_HOME` and from there it loads `$EXPENSES_HOME/config.json`. It provides
/// paths to other items that are either configurable or are expected in a certain location within
/// the home directory.
#[derive(Debug, Clone)]
pub struct Config {
    root: PathBuf,
    backups: PathBuf,
    secrets: PathBuf,
    config_path: PathBuf,
    config_file: ConfigFile,
}

/// The resolved location of the transaction store.
#[derive(Debug, Clone, Eq, PartialEq)]
pub(crate) enum StoreKind {
    Google { spreadsheet_id: String },
    Csv { dir: PathBuf },
}

impl Config {
    /// Creates the home directory for a store kept as CSV files.
    ///
    /// # Arguments
    /// - `dir` - The directory that will be the root of the home directory, e.g. `$HOME/expenses`
    /// - `csv_dir` - Where the CSV files live. Relative paths are relative to `dir`. Defaults to
    ///   `data` inside the home directory.
    /// - `worksheet` - The name of the worksheet, which is also the CSV file name.
    pub async fn create_csv(
        dir: impl Into<PathBuf>,
        csv_dir: Option<&Path>,
        worksheet: &str,
    ) -> Result<Self> {
        let store = StoreConfig::Csv {
            dir: csv_dir
                .map(Path::to_path_buf)
                .unwrap_or_else(|| PathBuf::from(CSV_DIR)),
        };
        let config = Self::create(dir, store, worksheet).await?;
        if let StoreKind::Csv { dir } = config.store_kind() {
            utils::make_dir(&dir)
                .await
                .context("Unable to create the CSV directory")?;
        }
        Ok(config)
    }

    /// Creates the home directory for a store kept in a Google Sheet and copies `secret_file` into
    /// its default location in the home directory.
    ///
    /// # Arguments
    /// - `dir` - The directory that will be the root of the home directory, e.g. `$HOME/expenses`
    /// - `secret_file` - The downloaded OAuth 2.0 client credentials JSON needed to start the Google
    ///   OAuth workflow.
    /// - `sheet_url` - The URL of the Google Sheet where the transactions are stored,
    ///   e.g. https://docs.google.com/spreadsheets/d/1a7Km9FxQwRbPt82JvN4LzYpH5OcGnWsT6iDuE3VhMjX
    /// - `worksheet` - The name of the worksheet (tab) inside the spreadsheet.
    ///
    /// # Errors
    /// - Returns an error if the URL is not a Google Sheets URL or any file operation fails.
    pub async fn create_google(
        dir: impl Into<PathBuf>,
        secret_file: &Path,
        sheet_url: &str,
        worksheet: &str,
    ) -> Result<Self> {
        // Fail before touching the filesystem if the URL is unusable
        extract_spreadsheet_id(sheet_url)?;
        let store = StoreConfig::Google {
            sheet_url: sheet_url.to_string(),
        };
        let config = Self::create(dir, store, worksheet).await?;
        utils::copy(secret_file, config.client_secret_path()).await?;
        Ok(config)
    }

    async fn create(dir: impl Into<PathBuf>, store: StoreConfig, worksheet: &str) -> Result<Self> {
        let maybe_relative = dir.into();
        utils::make_dir(&maybe_relative)
            .await
            .context("Unable to create the expenses home directory")?;
        let root = utils::canonicalize(&maybe_relative).await?;

        let backups = root.join(BACKUPS);
        utils::make_dir(&backups).await?;
        let secrets = root.join(SECRETS);
        utils::make_dir(&secrets).await?;

        let config_path = root.join(CONFIG_JSON);
        let config_file = ConfigFile {
            store,
            worksheet: worksheet.to_string(),
            ..ConfigFile::default()
        };
        config_file.save(&config_path).await?;

        Ok(Self {
            root,
            backups,
            secrets,
            config_path,
            config_file,
        })
    }

    /// This will
    /// - validate that `expenses_home` exists and that the config file exists
    /// - load the config file
    /// - validate that the backups and secrets directories exist
    /// - return the loaded configuration object
    pub async fn load(expenses_home: impl Into<PathBuf>) -> Result<Self> {
        let maybe_relative = expenses_home.into();
        let root = utils::canonicalize(&maybe_relative)
            .await
            .context("The expenses home directory is missing, run 'expenses init' first")?;

        let config_path = root.join(CONFIG_JSON);
        if !config_path.is_file() {
            bail!("The config file is missing '{}'", config_path.display())
        }
        let config_file = ConfigFile::load(&config_path).await?;

        let config = Self {
            backups: root.join(BACKUPS),
            secrets: root.join(SECRETS),
            root,
            config_path,
            config_file,
        };
        if !config.backups.is_dir() {
            bail!(
                "The backups directory is missing '{}'",
                config.backups.display()
            )
        }
        if !config.secrets.is_dir() {
            bail!(
                "The secrets directory is missing '{}'",
                config.secrets.display()
            )
        }
        Ok(config)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    pub fn backups(&self) -> &Path {
        &self.backups
    }

    pub fn secrets(&self) -> &Path {
        &self.secrets
    }

    pub fn worksheet(&self) -> &str {
        &self.config_file.worksheet
    }

    pub fn backup_copies(&self) -> u32 {
        self.config_file.backup_copies
    }

    /// Whether the store is a Google Sheet, which needs OAuth.
    pub fn is_google(&self) -> bool {
        matches!(self.config_file.store, StoreConfig::Google { .. })
    }

    /// Resolves the store named in the config file.
    pub(crate) fn store_kind(&self) -> StoreKind {
        match &self.config_file.store {
            StoreConfig::Google { sheet_url } => StoreKind::Google {
                // Validated when the config file was loaded
                spreadsheet_id: extract_spreadsheet_id(sheet_url)
                    .unwrap_or_default()
                    .to_string(),
            },
            StoreConfig::Csv { dir } => StoreKind::Csv {
                dir: self.resolve(dir.clone()),
            },
        }
    }

    /// Creates a new `Backup` instance for managing backup files.
    pub fn backup(&self) -> Backup {
        Backup::new(self)
    }

    /// Returns the stored `client_secret_path` if it is absolute, otherwise resolves the relative path.
    pub fn client_secret_path(&self) -> PathBuf {
        self.resolve(self.config_file.client_secret_path())
    }

    /// Returns the stored `token_path` if it is absolute, otherwise resolves the relative path.
    pub fn token_path(&self) -> PathBuf {
        self.resolve(self.config_file.token_path())
    }

    /// Checks if `p` is relative, and if so, resolves it against the home directory.
    fn resolve(&self, p: PathBuf) -> PathBuf {
        if p.is_absolute() {
            return p;
        }
        self.root.join(p)
    }
}

/// Where the transactions are stored.
#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
enum StoreConfig {
    Google { sheet_url: String },
    Csv { dir: PathBuf },
}

/// Represents the serialization and deserialization format of the configuration file.
///
/// Example configuration:
/// ```json
/// {
///   "app_name": "expenses",
///   "config_version": 1,
///   "store": {
///     "kind": "google",
///     "sheet_url": "https://docs.google.com/spreadsheets/d/7KpXm2RfZwNJgs84QhVYno5DU6iM9Wlr3bCzAv1txRpL"
///   },
///   "worksheet": "Sheet1",
///   "backup_copies": 5,
///   "client_secret_path": ".secrets/client_secret.json",
///   "token_path": ".secrets/token.json"
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq)]
struct ConfigFile {
    /// Application name, should always be "expenses"
    app_name: String,

    /// Configuration file version
    config_version: u8,

    /// The store that holds the transactions
    store: StoreConfig,

    /// The worksheet (tab) that holds the transactions
    #[serde(default = "default_worksheet")]
    worksheet: String,

    /// Number of backup copies to keep
    #[serde(default = "default_backup_copies")]
    backup_copies: u32,

    /// Path to the OAuth 2.0 client credentials file (optional, relative to config.json or absolute)
    /// Defaults to $EXPENSES_HOME/.secrets/client_secret.json if not specified
    #[serde(skip_serializing_if = "Option::is_none")]
    client_secret_path: Option<PathBuf>,

    /// Path to the OAuth token file (optional, relative to config.json or absolute)
    /// Defaults to $EXPENSES_HOME/.secrets/token.json if not specified
    #[serde(skip_serializing_if = "Option::is_none")]
    token_path: Option<PathBuf>,
}

fn default_worksheet() -> String {
    WORKSHEET.to_string()
}

fn default_backup_copies() -> u32 {
    BACKUP_COPIES
}

impl Default for ConfigFile {
    fn default() -> Self {
        Self {
            app_name: APP_NAME.to_string(),
            config_version: CONFIG_VERSION,
            store: StoreConfig::Csv {
                dir: PathBuf::from(CSV_DIR),
            },
            worksheet: default_worksheet(),
            backup_copies: BACKUP_COPIES,
            client_secret_path: None,
            token_path: None,
        }
    }
}

impl ConfigFile {
    /// Loads a ConfigFile from the specified path.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or parsed, or if it names an invalid store
    async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let config: ConfigFile = utils::deserialize(path)
            .await
            .with_context(|| format!("Failed to load config file at {}", path.display()))?;

        anyhow::ensure!(
            config.app_name == APP_NAME,
            "Invalid app_name in config file: expected '{}', got '{}'",
            APP_NAME,
            config.app_name
        );
        anyhow::ensure!(
            !config.worksheet.trim().is_empty(),
            "The worksheet name in the config file is empty"
        );
        if let StoreConfig::Google { sheet_url } = &config.store {
            extract_spreadsheet_id(sheet_url)
                .context("Failed to extract spreadsheet ID from sheet URL")?;
        }

        Ok(config)
    }

    /// Saves the ConfigFile to the specified path.
    async fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let p = path.as_ref();
        let data = serde_json::to_string_pretty(self).context("Unable to serialize config")?;
        utils::write(p, data)
            .await
            .context("Unable to write config file")
    }

    /// Gets the client secret path.
    ///
    /// If None, defaults to $EXPENSES_HOME/.secrets/client_secret.json
    fn client_secret_path(&self) -> PathBuf {
        self.client_secret_path
            .clone()
            .unwrap_or_else(|| PathBuf::from(SECRETS).join(CLIENT_SECRET_JSON))
    }

    /// Gets the token path.
    ///
    /// If None, defaults to $EXPENSES_HOME/.secrets/token.json
    fn token_path(&self) -> PathBuf {
        self.token_path
            .clone()
            .unwrap_or_else(|| PathBuf::from(SECRETS).join(TOKEN_JSON))
    }
}

/// Extracts the spreadsheet ID from a Google Sheets URL
///
/// # Arguments
/// * `url` - The Google Sheets URL (e.g., "https://docs.google.com/spreadsheets/d/SPREADSHEET_ID/...")
///
/// # Returns
/// The spreadsheet ID or an error if the URL format is invalid.
fn extract_spreadsheet_id(url: &str) -> Result<&str> {
    // URL format: https://docs.google.com/spreadsheets/d/SPREADSHEET_ID/...
    // or: https://docs.google.com/spreadsheets/d/SPREADSHEET_ID?foo=bar
    let parts: Vec<&str> = url.split('/').collect();
    for (i, part) in parts.iter().enumerate() {
        if *part == "d" && i + 1 < parts.len() {
            let id_part = parts[i + 1];
            let id = id_part
                .split(['?', '#'])
                .next()
                .unwrap_or(id_part);
            if !id.is_empty() {
                return Ok(id);
            }
        }
    }
    bail!(
        "Invalid Google Sheets URL '{url}'. Expected: https://docs.google.com/spreadsheets/d/SPREADSHEET_ID"
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_config_create_google() {
        let dir = TempDir::new().unwrap();
        let home_dir = dir.path().join("expenses_home");
        let secret_source_file = dir.path().join("x.json");
        let secret_content = "12345";
        let sheet_url = "https://docs.google.com/spreadsheets/d/7KpXm2RfZwNJgs84QhVYno5DU6iM9Wlr3bCzAv1txRpL/edit";
        utils::write(&secret_source_file, secret_content)
            .await
            .unwrap();

        let config = Config::create_google(&home_dir, &secret_source_file, sheet_url, "Budget")
            .await
            .unwrap();

        assert!(config.is_google());
        assert_eq!(config.worksheet(), "Budget");
        assert_eq!(
            config.store_kind(),
            StoreKind::Google {
                spreadsheet_id: "7KpXm2RfZwNJgs84QhVYno5DU6iM9Wlr3bCzAv1txRpL".to_string()
            }
        );

        // The secret is copied, not moved
        let found_secret_content = utils::read(&config.client_secret_path()).await.unwrap();
        assert_eq!(secret_content, found_secret_content);
        assert!(secret_source_file.is_file());

        assert!(config.backups().is_dir());
        assert!(config.secrets().is_dir());

        let loaded = Config::load(&home_dir).await.unwrap();
        assert_eq!(loaded.store_kind(), config.store_kind());
        assert_eq!(loaded.worksheet(), "Budget");
    }

    #[tokio::test]
    async fn test_config_create_google_bad_url() {
        let dir = TempDir::new().unwrap();
        let home_dir = dir.path().join("expenses_home");
        let secret_file = dir.path().join("x.json");
        utils::write(&secret_file, "{}").await.unwrap();
        let result =
            Config::create_google(&home_dir, &secret_file, "https://example.com/nope", "Sheet1")
                .await;
        assert!(result.is_err());
        assert!(!home_dir.exists());
    }

    #[tokio::test]
    async fn test_config_create_csv() {
        let dir = TempDir::new().unwrap();
        let config = Config::create_csv(dir.path(), None, "Sheet1")
            .await
            .unwrap();
        assert!(!config.is_google());
        let StoreKind::Csv { dir: csv_dir } = config.store_kind() else {
            panic!("expected a CSV store");
        };
        assert!(csv_dir.is_dir());
        assert!(csv_dir.ends_with(CSV_DIR));
        assert!(csv_dir.starts_with(config.root()));

        let loaded = Config::load(dir.path()).await.unwrap();
        assert_eq!(loaded.store_kind(), config.store_kind());
        assert_eq!(loaded.backup_copies(), BACKUP_COPIES);
    }

    #[tokio::test]
    async fn test_config_load_missing_home() {
        let dir = TempDir::new().unwrap();
        let e = Config::load(dir.path().join("nope")).await.unwrap_err();
        assert!(format!("{e:#}").contains("expenses init"));
    }

    #[test]
    fn test_config_file_default() {
        let config = ConfigFile::default();
        assert_eq!(config.worksheet, WORKSHEET);
        assert_eq!(config.backup_copies, 5);
        assert_eq!(
            config.client_secret_path(),
            PathBuf::from(SECRETS).join(CLIENT_SECRET_JSON)
        );
        assert_eq!(config.token_path(), PathBuf::from(SECRETS).join(TOKEN_JSON));
    }

    #[tokio::test]
    async fn test_config_file_save_and_load() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.json");

        let original_config = ConfigFile {
            store: StoreConfig::Google {
                sheet_url: "https://docs.google.com/spreadsheets/d/test123".to_string(),
            },
            worksheet: "Budget".to_string(),
            backup_copies: 7,
            client_secret_path: Some(PathBuf::from(".secrets/my_key.json")),
            token_path: Some(PathBuf::from(".secrets/my_token.json")),
            ..ConfigFile::default()
        };

        original_config.save(&config_path).await.unwrap();
        let loaded_config = ConfigFile::load(&config_path).await.unwrap();
        assert_eq!(original_config, loaded_config);
    }

    #[tokio::test]
    async fn test_config_file_load_with_minimal_config() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.json");

        let json = r#"{
            "app_name": "expenses",
            "config_version": 1,
            "store": { "kind": "csv", "dir": "/tmp/ledger" }
        }"#;
        utils::write(&config_path, json).await.unwrap();

        let config = ConfigFile::load(&config_path).await.unwrap();
        assert_eq!(
            config.store,
            StoreConfig::Csv {
                dir: PathBuf::from("/tmp/ledger")
            }
        );
        assert_eq!(config.worksheet, WORKSHEET);
        assert_eq!(config.backup_copies, BACKUP_COPIES);
    }

    #[tokio::test]
    async fn test_config_file_load_invalid_app_name() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.json");

        let json = r#"{
            "app_name": "wrong_app",
            "config_version": 1,
            "store": { "kind": "csv", "dir": "data" }
        }"#;
        utils::write(&config_path, json).await.unwrap();

        let result = ConfigFile::load(&config_path).await;
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("Invalid app_name"));
    }

    #[tokio::test]
    async fn test_config_file_load_invalid_sheet_url() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.json");

        let json = r#"{
            "app_name": "expenses",
            "config_version": 1,
            "store": { "kind": "google", "sheet_url": "https://example.com/invalid" }
        }"#;
        utils::write(&config_path, json).await.unwrap();
        assert!(ConfigFile::load(&config_path).await.is_err());
    }

    #[test]
    fn test_config_file_serialization_omits_none_fields() {
        let json = serde_json::to_string(&ConfigFile::default()).unwrap();
        assert!(!json.contains("client_secret_path"));
        assert!(!json.contains("token_path"));
        assert!(json.contains(r#""kind":"csv""#));
    }

    #[test]
    fn test_extract_spreadsheet_id() {
        let url = "https://docs.google.com/spreadsheets/d/7KpXm2RfZwNJgs84QhVYno5DU6iM9Wlr3bCzAv1txRpL/edit";
        let id = extract_spreadsheet_id(url).unwrap();
        assert_eq!(id, "7KpXm2RfZwNJgs84QhVYno5DU6iM9Wlr3bCzAv1txRpL");

        let url = "https://docs.google.com/spreadsheets/d/7KpXm2RfZwNJgs84QhVYno5DU6iM9Wlr3bCzAv1txRpL?foo=bar";
        let id = extract_spreadsheet_id(url).unwrap();
        assert_eq!(id, "7KpXm2RfZwNJgs84QhVYno5DU6iM9Wlr3bCzAv1txRpL");

        let url2 = "https://docs.google.com/spreadsheets/d/ABC123#gid=0";
        assert_eq!(extract_spreadsheet_id(url2).unwrap(), "ABC123");

        assert!(extract_spreadsheet_id("https://example.com/invalid").is_err());
        assert!(extract_spreadsheet_id("").is_err());
        assert!(extract_spreadsheet_id("https://docs.google.com/spreadsheets/d/").is_err());
    }
}
