//! Subcommand implementations.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use mailstate_core::normalize::normalize_folder_tree;
use mailstate_core::store::{FetchConversationsArg, SearchArg};
use mailstate_core::{
    ConversationSource, IncompleteMessage, Lifecycle, MailStore, SearchPage, SyncConfig,
    SyncDispatcher, SyncReport, TagDirectory, normalize_conversation, normalize_mail_message,
};
use mailstate_soap::{SoapConversation, SoapFolder, SoapMessage, SoapSearchResponse, parse_batch};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{info, warn};

use crate::{NormalizeArgs, ReplayArgs};

const SEED_REQUEST: &str = "seed";

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let raw = fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("Failed to parse {}", path.display()))
}

fn print_json(value: &impl Serialize) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn load_tags(path: Option<&Path>) -> Result<TagDirectory> {
    path.map_or_else(|| Ok(TagDirectory::default()), read_json)
}

/// Runs the snapshot through the same lifecycle events a live client sees.
fn seed(store: &mut MailStore, page: &SearchPage, folder: Option<&str>) {
    match folder {
        Some(folder) => {
            let arg = FetchConversationsArg {
                folder: folder.to_string(),
                offset: 0,
            };
            store.conversations.fetch_conversations(Lifecycle::Pending {
                request_id: SEED_REQUEST.into(),
                arg: arg.clone(),
            });
            store.conversations.fetch_conversations(Lifecycle::Fulfilled {
                request_id: SEED_REQUEST.into(),
                arg,
                payload: page.clone(),
            });
        }
        None => store
            .conversations
            .conversations
            .replace_all(page.conversations.clone()),
    }

    let arg = SearchArg {
        query: String::new(),
        offset: 0,
        sort_by: None,
        folder: folder.map(String::from),
    };
    store.searches.search(Lifecycle::Pending {
        request_id: SEED_REQUEST.into(),
        arg: arg.clone(),
    });
    store.searches.search(Lifecycle::Fulfilled {
        request_id: SEED_REQUEST.into(),
        arg,
        payload: page.clone(),
    });

    store.messages.upsert_many(page.messages.clone());
}

/// A normalized entity plus its date rendered in UTC.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Normalized<'a, T> {
    #[serde(flatten)]
    entity: &'a T,
    #[serde(skip_serializing_if = "Option::is_none")]
    date_utc: Option<String>,
}

#[derive(Serialize)]
struct ReplayOutput<'a> {
    report: &'a SyncReport,
    store: &'a MailStore,
}

/// Seeds a store, replays the notification log and reports.
pub fn replay(args: &ReplayArgs, config: &SyncConfig) -> Result<()> {
    let tags = load_tags(args.tags.as_deref())?;
    let mut store = MailStore::new(config);

    if let Some(path) = &args.folders {
        let root: SoapFolder = read_json(path)?;
        store
            .folders
            .load(normalize_folder_tree(&root, &config.folder_root_id));
        info!(count = store.folders.folders.len(), "Folders loaded");
    }

    if let Some(path) = &args.snapshot {
        let response: SoapSearchResponse = read_json(path)?;
        let page = SearchPage::from_response(&response, &tags, config)
            .context("Failed to normalize snapshot")?;
        seed(&mut store, &page, args.folder.as_deref());
        info!(
            conversations = page.conversations.len(),
            messages = page.messages.len(),
            "Snapshot loaded"
        );
    }

    let raw = fs::read_to_string(&args.notifications)
        .with_context(|| format!("Failed to read {}", args.notifications.display()))?;
    let batch = parse_batch(&raw).context("Failed to parse notification log")?;

    let mut dispatcher = SyncDispatcher::new(config.clone());
    let report = dispatcher
        .process(&mut store, batch, &tags)
        .context("Notification replay failed")?;
    if report.resync_required {
        warn!("Sequence gap detected, a full refetch is required");
    }

    if let Some(path) = &args.output {
        let output = ReplayOutput {
            report: &report,
            store: &store,
        };
        fs::write(path, serde_json::to_string_pretty(&output)?)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        info!("Store written to {}", path.display());
        return Ok(());
    }

    println!("applied:        {:?}", report.applied);
    println!("skipped:        {:?}", report.skipped);
    println!("resync needed:  {}", report.resync_required);
    println!("last seq:       {:?}", dispatcher.last_seq());
    println!("folders:        {}", store.folders.folders.len());
    println!("conversations:  {}", store.conversations.conversations.len());
    println!("messages:       {}", store.messages.len());
    println!("search results: {}", store.searches.conversations.len());
    let newest = store
        .messages
        .messages
        .values()
        .filter_map(IncompleteMessage::received_at)
        .max();
    if let Some(newest) = newest {
        println!("newest message: {}", newest.to_rfc3339());
    }
    Ok(())
}

/// Prints the normalized form of a wire conversation or message.
pub fn normalize(args: &NormalizeArgs, config: &SyncConfig) -> Result<()> {
    let tags = load_tags(args.tags.as_deref())?;

    if let Some(path) = &args.conversation {
        let c: SoapConversation = read_json(path)?;
        let conversation = normalize_conversation(ConversationSource::new(&c), &tags)
            .context("Failed to normalize conversation")?;
        return print_json(&Normalized {
            entity: &conversation,
            date_utc: conversation.last_activity().map(|d| d.to_rfc3339()),
        });
    }

    if let Some(path) = &args.message {
        let m: SoapMessage = read_json(path)?;
        let message = normalize_mail_message(&m, args.complete, &tags, config)
            .context("Failed to normalize message")?;
        return print_json(&Normalized {
            entity: &message,
            date_utc: message.received_at().map(|d| d.to_rfc3339()),
        });
    }

    Ok(())
}
