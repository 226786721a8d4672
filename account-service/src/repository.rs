//! Repository for account data
//!
//! Two backends sit behind [`AccountRepository`]: a purely in-memory map and
//! a file-journaled variant that replays an append-only log on start-up.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use common::error::{Error, ErrorExt, Result};
use common::model::account::{validate_account_id, validate_amount, Account, AccountId};
use common::model::journal::{JournalEntry, JournalOp};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use tokio::fs::{File, OpenOptions};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};

/// Account repository trait defining the interface for account data storage
#[async_trait]
pub trait AccountRepository: Send + Sync {
    /// Create an account with a zero balance
    async fn create_account(&self, id: AccountId) -> Result<Account>;

    /// Get an account by ID
    async fn get_account(&self, id: AccountId) -> Result<Option<Account>>;

    /// Add funds to an existing account, returning the new balance
    async fn deposit(&self, id: AccountId, amount: f64) -> Result<f64>;

    /// Remove funds from an existing account, returning the new balance
    async fn withdraw(&self, id: AccountId, amount: f64) -> Result<f64>;

    /// Get the balance of an existing account
    async fn get_balance(&self, id: AccountId) -> Result<f64>;

    /// Remove every account. Returns false if backing storage could not be cleared.
    async fn reset_all(&self) -> bool;
}

fn not_found(id: AccountId) -> Error {
    Error::AccountNotFound(format!("Account with ID {} does not exist.", id))
}

fn already_exists(id: AccountId) -> Error {
    Error::AccountAlreadyExists(format!("Account with ID {} already exists.", id))
}

/// In-memory repository for account data
pub struct InMemoryAccountRepository {
    /// Accounts by ID
    pub accounts: DashMap<AccountId, Account>,
}

impl InMemoryAccountRepository {
    /// Create a new in-memory account repository
    pub fn new() -> Self {
        Self {
            accounts: DashMap::new(),
        }
    }
}

impl Default for InMemoryAccountRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AccountRepository for InMemoryAccountRepository {
    async fn create_account(&self, id: AccountId) -> Result<Account> {
        validate_account_id(id)?;

        match self.accounts.entry(id) {
            Entry::Occupied(_) => Err(already_exists(id)),
            Entry::Vacant(slot) => {
                let account = Account::new(id);
                slot.insert(account.clone());
                debug!("Created account {}", id);
                Ok(account)
            }
        }
    }

    async fn get_account(&self, id: AccountId) -> Result<Option<Account>> {
        Ok(self.accounts.get(&id).map(|a| a.clone()))
    }

    async fn deposit(&self, id: AccountId, amount: f64) -> Result<f64> {
        validate_amount(amount)?;

        // The write guard serializes mutations on this id
        let mut account = self.accounts.get_mut(&id).ok_or_else(|| not_found(id))?;
        account.deposit(amount)
    }

    async fn withdraw(&self, id: AccountId, amount: f64) -> Result<f64> {
        validate_amount(amount)?;

        let mut account = self.accounts.get_mut(&id).ok_or_else(|| not_found(id))?;
        account.withdraw(amount)
    }

    async fn get_balance(&self, id: AccountId) -> Result<f64> {
        self.accounts
            .get(&id)
            .map(|a| a.balance)
            .ok_or_else(|| not_found(id))
    }

    async fn reset_all(&self) -> bool {
        self.accounts.clear();
        info!("Cleared all in-memory accounts");
        true
    }
}

/// File-journaled repository for account data
///
/// State lives in memory; every mutation is first appended to a JSON-lines
/// journal and flushed, then applied. A single store-wide lock keeps the
/// journal order identical to the order mutations were applied in.
pub struct FileAccountRepository {
    /// Journal location
    path: PathBuf,
    /// Accounts by ID, rebuilt from the journal
    accounts: DashMap<AccountId, Account>,
    /// Open journal handle, also the store-wide mutation lock
    journal: Mutex<File>,
}

impl FileAccountRepository {
    /// Open (or create) the journal at `path` and replay it
    pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(Error::Io)
                .with_context(|| format!("Failed to create journal directory {}", parent.display()))?;
        }

        let accounts = DashMap::new();
        let replayed = match tokio::fs::read_to_string(&path).await {
            Ok(contents) => {
                let replayed = replay(&contents, &accounts)?;
                info!("Replayed {} journal entries from {}", replayed.entries, path.display());
                Some((replayed, contents.len()))
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("No journal at {}, starting empty", path.display());
                None
            }
            Err(e) => {
                return Err(Error::Io(e))
                    .with_context(|| format!("Failed to read journal {}", path.display()));
            }
        };

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .await
            .map_err(Error::Io)
            .with_context(|| format!("Failed to open journal {}", path.display()))?;

        if let Some((replayed, total_len)) = replayed {
            // Drop a torn tail so the next entry starts on a clean line
            if replayed.valid_len < total_len {
                file.set_len(replayed.valid_len as u64)
                    .await
                    .map_err(Error::Io)
                    .with_context(|| format!("Failed to truncate torn journal {}", path.display()))?;
            }
            if replayed.needs_newline {
                file.write_all(b"\n")
                    .await
                    .map_err(Error::Io)
                    .with_context(|| format!("Failed to terminate journal {}", path.display()))?;
                file.flush()
                    .await
                    .map_err(Error::Io)
                    .with_context(|| format!("Failed to flush journal {}", path.display()))?;
            }
        }

        Ok(Self {
            path,
            accounts,
            journal: Mutex::new(file),
        })
    }

    /// Journal location
    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn append(&self, journal: &mut File, entry: &JournalEntry) -> Result<()> {
        let mut line = serde_json::to_vec(entry)?;
        line.push(b'\n');

        journal
            .write_all(&line)
            .await
            .map_err(Error::Io)
            .with_context(|| format!("Failed to append to journal {}", self.path.display()))?;
        journal
            .flush()
            .await
            .map_err(Error::Io)
            .with_context(|| format!("Failed to flush journal {}", self.path.display()))
    }
}

/// Outcome of replaying a journal
#[derive(Debug)]
struct Replayed {
    /// Entries applied
    entries: usize,
    /// Byte length up to and including the last applied entry
    valid_len: usize,
    /// The last applied entry was not followed by a newline
    needs_newline: bool,
}

/// Apply every journal line to `accounts`.
///
/// A final line without a trailing newline that does not parse is the
/// remains of an interrupted write: it is skipped and excluded from
/// `valid_len`. Any other unparseable line fails the replay.
fn replay(contents: &str, accounts: &DashMap<AccountId, Account>) -> Result<Replayed> {
    let mut replayed = Replayed {
        entries: 0,
        valid_len: 0,
        needs_newline: false,
    };

    for (line_no, raw) in contents.split_inclusive('\n').enumerate() {
        let complete = raw.ends_with('\n');
        if raw.trim().is_empty() {
            replayed.valid_len += raw.len();
            continue;
        }

        let entry: JournalEntry = match serde_json::from_str(raw) {
            Ok(entry) => entry,
            Err(e) if !complete => {
                warn!(
                    "Skipping torn journal entry on line {} ({} bytes): {}",
                    line_no + 1,
                    raw.len(),
                    e
                );
                break;
            }
            Err(e) => {
                return Err(Error::Storage(format!(
                    "Corrupt journal entry on line {}: {}",
                    line_no + 1,
                    e
                )));
            }
        };

        match entry.op {
            JournalOp::Created => {
                let mut account = Account::new(entry.account_id);
                account.created_at = entry.recorded_at;
                account.updated_at = entry.recorded_at;
                accounts.insert(entry.account_id, account);
            }
            JournalOp::Deposited | JournalOp::Withdrawn => {
                let mut account = accounts.get_mut(&entry.account_id).ok_or_else(|| {
                    Error::Storage(format!(
                        "Journal line {} mutates unknown account {}",
                        line_no + 1,
                        entry.account_id
                    ))
                })?;

                if entry.op == JournalOp::Deposited {
                    account.balance += entry.amount;
                } else {
                    account.balance -= entry.amount;
                }
                account.updated_at = entry.recorded_at;
            }
        }

        replayed.entries += 1;
        replayed.valid_len += raw.len();
        replayed.needs_newline = !complete;
    }

    Ok(replayed)
}

#[async_trait]
impl AccountRepository for FileAccountRepository {
    async fn create_account(&self, id: AccountId) -> Result<Account> {
        validate_account_id(id)?;

        let mut journal = self.journal.lock().await;
        if self.accounts.contains_key(&id) {
            return Err(already_exists(id));
        }

        self.append(&mut journal, &JournalEntry::created(id)).await?;

        let account = Account::new(id);
        self.accounts.insert(id, account.clone());
        debug!("Created account {} in {}", id, self.path.display());
        Ok(account)
    }

    async fn get_account(&self, id: AccountId) -> Result<Option<Account>> {
        Ok(self.accounts.get(&id).map(|a| a.clone()))
    }

    async fn deposit(&self, id: AccountId, amount: f64) -> Result<f64> {
        validate_amount(amount)?;
        let mut journal = self.journal.lock().await;

        // Check on a copy so nothing changes unless the journal write succeeds
        let mut pending = self
            .accounts
            .get(&id)
            .map(|a| a.clone())
            .ok_or_else(|| not_found(id))?;
        let balance = pending.deposit(amount)?;

        self.append(&mut journal, &JournalEntry::deposited(id, amount)).await?;

        self.accounts.insert(id, pending);
        Ok(balance)
    }

    async fn withdraw(&self, id: AccountId, amount: f64) -> Result<f64> {
        validate_amount(amount)?;
        let mut journal = self.journal.lock().await;

        let mut pending = self
            .accounts
            .get(&id)
            .map(|a| a.clone())
            .ok_or_else(|| not_found(id))?;
        let balance = pending.withdraw(amount)?;

        self.append(&mut journal, &JournalEntry::withdrawn(id, amount)).await?;

        self.accounts.insert(id, pending);
        Ok(balance)
    }

    async fn get_balance(&self, id: AccountId) -> Result<f64> {
        self.accounts
            .get(&id)
            .map(|a| a.balance)
            .ok_or_else(|| not_found(id))
    }

    async fn reset_all(&self) -> bool {
        let journal = self.journal.lock().await;

        if let Err(e) = journal.set_len(0).await {
            error!("Failed to truncate journal {}: {}", self.path.display(), e);
            return false;
        }
        if let Err(e) = journal.sync_all().await {
            warn!("Failed to sync truncated journal {}: {}", self.path.display(), e);
        }

        self.accounts.clear();
        info!("Cleared all accounts and journal {}", self.path.display());
        true
    }
}
