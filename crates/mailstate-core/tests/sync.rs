//! Integration tests for notification sync.
//!
//! A store is seeded the way a client would seed it (a folder listing and a
//! search), then notification batches are replayed through the dispatcher.

#![allow(clippy::unwrap_used)]

use mailstate_core::normalize::normalize_folder_tree;
use mailstate_core::store::{FetchConversationsArg, FolderActionArg, FolderOp, SearchArg};
use mailstate_core::{
    ConvMessage, Lifecycle, MailStore, SearchPage, SyncConfig, SyncDispatcher, SyncReport,
    TagDirectory,
};
use mailstate_soap::{SoapFolder, SoapNotify, SoapSearchResponse, parse_batch};

const SEARCH: &str = r#"{
    "c": [
        {"id": "123", "m": [{"id": "987", "l": "folder2", "d": "555"}], "e": [],
         "su": "Subj", "fr": "frag", "f": "u", "n": 1, "u": 1, "d": 123},
        {"id": "456", "m": [{"id": "111", "l": "folder2", "d": 400}],
         "su": "Other", "n": 1, "u": 0, "d": 100}
    ],
    "m": [
        {"id": "987", "cid": "123", "l": "folder2", "d": 555, "f": "u", "su": "Subj"},
        {"id": "111", "cid": "456", "l": "folder2", "d": 400, "su": "Other"}
    ],
    "more": false,
    "offset": 0
}"#;

fn page() -> SearchPage {
    let response: SoapSearchResponse = serde_json::from_str(SEARCH).unwrap();
    SearchPage::from_response(&response, &TagDirectory::default(), &SyncConfig::default()).unwrap()
}

fn seeded_store() -> MailStore {
    let mut store = MailStore::new(&SyncConfig::default());

    let listing = FetchConversationsArg {
        folder: "folder2".into(),
        offset: 0,
    };
    store.conversations.fetch_conversations(Lifecycle::Pending {
        request_id: "list".into(),
        arg: listing.clone(),
    });
    store.conversations.fetch_conversations(Lifecycle::Fulfilled {
        request_id: "list".into(),
        arg: listing,
        payload: page(),
    });

    let search = SearchArg {
        query: "subject:Subj".into(),
        offset: 0,
        sort_by: None,
        folder: Some("folder2".into()),
    };
    store.searches.search(Lifecycle::Pending {
        request_id: "search".into(),
        arg: search.clone(),
    });
    store.searches.search(Lifecycle::Fulfilled {
        request_id: "search".into(),
        arg: search,
        payload: page(),
    });

    store.messages.upsert_many(page().messages);
    store
}

const FOLDERS: &str = r#"{"id": "1", "name": "USER_ROOT", "folder": [
    {"id": "2", "name": "Inbox", "l": "1", "u": 1, "folder": [
        {"id": "20", "name": "Work", "l": "2"}
    ]},
    {"id": "3", "name": "Trash", "l": "1", "folder": [
        {"id": "30", "name": "Old", "l": "3"}
    ]}
]}"#;

fn store_with_folders() -> MailStore {
    let mut store = seeded_store();
    let root: SoapFolder = serde_json::from_str(FOLDERS).unwrap();
    store.folders.load(normalize_folder_tree(&root, "1"));
    store
}

fn report(dispatcher: &mut SyncDispatcher, store: &mut MailStore, json: &str) -> SyncReport {
    let batch: Vec<SoapNotify> = parse_batch(json).unwrap();
    dispatcher
        .process(store, batch, &TagDirectory::default())
        .unwrap()
}

fn replay(dispatcher: &mut SyncDispatcher, store: &mut MailStore, json: &str) -> Vec<u64> {
    report(dispatcher, store, json).applied
}

#[test]
fn seeded_conversation_is_normalized() {
    let store = seeded_store();
    let conversation = store.conversations.conversations.get("123").unwrap();
    assert!(!conversation.read);
    assert_eq!(
        conversation.messages(),
        [ConvMessage::new("987", Some("folder2".into()), Some(555))]
    );
    assert_eq!(conversation.parent(), Some("folder2"));
    assert_eq!(store.conversation_messages("123")[0].id, "987");
}

#[test]
fn modified_message_parent_moves_only_its_stub() {
    let mut store = seeded_store();
    let untouched = store.conversations.conversations.get("456").cloned();
    let mut dispatcher = SyncDispatcher::default();

    replay(
        &mut dispatcher,
        &mut store,
        r#"[{"seq": 2, "modified": {"m": [{"id": "987", "l": "folder3"}]}}]"#,
    );

    for index in [&store.conversations.conversations, &store.searches.conversations] {
        let conversation = index.get("123").unwrap();
        assert_eq!(conversation.messages()[0].parent.as_deref(), Some("folder3"));
        assert_eq!(conversation.parent(), Some("folder3"));
    }
    assert_eq!(store.conversations.conversations.get("456").cloned(), untouched);
    assert_eq!(store.messages.get("987").unwrap().parent.as_deref(), Some("folder3"));
}

#[test]
fn deleted_message_leaves_map_and_both_slices() {
    let mut store = seeded_store();
    let mut dispatcher = SyncDispatcher::default();

    replay(&mut dispatcher, &mut store, r#"[{"seq": 2, "deleted": "987"}]"#);

    assert!(store.messages.get("987").is_none());
    for index in [&store.conversations.conversations, &store.searches.conversations] {
        let conversation = index.get("123").unwrap();
        assert!(conversation.messages().is_empty());
        assert_eq!(conversation.parent(), None);
    }
    assert!(!store.searches.messages.contains_key("987"));
}

#[test]
fn created_message_folds_into_existing_conversation() {
    let mut store = seeded_store();
    let mut dispatcher = SyncDispatcher::default();

    replay(
        &mut dispatcher,
        &mut store,
        r#"[{"seq": 2, "created": {"m": [
            {"id": "988", "cid": "123", "l": "folder2", "d": 600, "fr": "newer"},
            {"id": "989", "cid": "999", "l": "folder2", "d": 600}
        ]}}]"#,
    );

    let conversation = store.conversations.conversations.get("123").unwrap();
    let ids: Vec<_> = conversation.messages().iter().map(|m| m.id.as_str()).collect();
    assert_eq!(ids, ["988", "987"]);
    assert_eq!(conversation.fragment.as_deref(), Some("newer"));
    assert!(!store.conversations.conversations.contains("999"));
    assert!(store.messages.get("989").is_some());

    let ids: Vec<_> = store
        .conversation_messages("123")
        .iter()
        .map(|m| m.id.as_str())
        .collect();
    assert_eq!(ids, ["988", "987"]);
}

#[test]
fn created_conversation_with_messages_in_current_folder() {
    let mut store = seeded_store();
    let mut dispatcher = SyncDispatcher::default();

    replay(
        &mut dispatcher,
        &mut store,
        r#"[{"seq": 2, "created": {
            "c": [{"id": "777", "su": "Fresh", "u": 1, "n": 1, "d": 900}],
            "m": [{"id": "7001", "cid": "777", "l": "folder2", "d": 900, "f": "u"}]
        }}]"#,
    );

    for index in [&store.conversations.conversations, &store.searches.conversations] {
        let conversation = index.get("777").unwrap();
        assert_eq!(conversation.parent(), Some("folder2"));
        assert_eq!(conversation.messages().len(), 1);
        assert!(!conversation.read);
    }
    assert_eq!(store.folder_conversations("folder2")[0].id, "777");
}

#[test]
fn modified_conversation_updates_both_slices() {
    let mut store = seeded_store();
    let mut dispatcher = SyncDispatcher::default();

    replay(
        &mut dispatcher,
        &mut store,
        r#"[{"seq": 2, "modified": {"c": [{"id": "123", "u": 0}]}}]"#,
    );

    for index in [&store.conversations.conversations, &store.searches.conversations] {
        let conversation = index.get("123").unwrap();
        assert!(conversation.read);
        assert_eq!(conversation.unread_msg_count, 0);
        assert_eq!(conversation.subject.as_deref(), Some("Subj"));
    }
}

#[test]
fn sequence_handling_across_batches() {
    let mut store = seeded_store();
    let mut dispatcher = SyncDispatcher::default();

    let applied = replay(
        &mut dispatcher,
        &mut store,
        r#"[{"seq": 3, "deleted": "111"}, {"seq": 2, "modified": {"m": [{"id": "987", "l": "folder3"}]}}]"#,
    );
    assert_eq!(applied, [2, 3]);

    // A replayed stale notification must not move the message back.
    let report = dispatcher
        .process(
            &mut store,
            parse_batch(r#"[{"seq": 2, "modified": {"m": [{"id": "987", "l": "folder2"}]}}]"#)
                .unwrap(),
            &TagDirectory::default(),
        )
        .unwrap();
    assert_eq!(report.skipped, [2]);
    assert_eq!(store.messages.get("987").unwrap().parent.as_deref(), Some("folder3"));

    let report = dispatcher
        .process(
            &mut store,
            parse_batch(r#"[{"seq": 1, "modified": {"m": [{"id": "987", "l": "folder4"}]}}]"#)
                .unwrap(),
            &TagDirectory::default(),
        )
        .unwrap();
    assert_eq!(report.applied, [1]);
    assert_eq!(store.messages.get("987").unwrap().parent.as_deref(), Some("folder4"));

    let report = dispatcher
        .process(
            &mut store,
            parse_batch(r#"[{"seq": 4}]"#).unwrap(),
            &TagDirectory::default(),
        )
        .unwrap();
    assert!(report.resync_required);
}

#[test]
fn gap_flags_resync_and_session_restart_recovers() {
    let mut store = seeded_store();
    let mut dispatcher = SyncDispatcher::default();

    let first = report(&mut dispatcher, &mut store, r#"[{"seq": 7}]"#);
    assert_eq!(first.applied, [7]);
    assert!(!first.resync_required);

    let gap = report(
        &mut dispatcher,
        &mut store,
        r#"[{"seq": 9, "modified": {"m": [{"id": "987", "l": "folder3"}]}}]"#,
    );
    assert_eq!(gap.applied, [9]);
    assert!(gap.resync_required);
    assert_eq!(store.messages.get("987").unwrap().parent.as_deref(), Some("folder3"));

    let restart = report(
        &mut dispatcher,
        &mut store,
        r#"[{"seq": 2, "deleted": "111"}, {"seq": 1, "modified": {"m": [{"id": "987", "l": "folder2"}]}}]"#,
    );
    assert_eq!(restart.applied, [1, 2]);
    assert!(restart.skipped.is_empty());
    assert!(!restart.resync_required);
    assert_eq!(store.messages.get("987").unwrap().parent.as_deref(), Some("folder2"));
    assert!(store.messages.get("111").is_none());
    assert_eq!(dispatcher.last_seq(), Some(2));

    let next = report(&mut dispatcher, &mut store, r#"[{"seq": 3}]"#);
    assert_eq!(next.applied, [3]);
    assert!(!next.resync_required);
}

#[test]
fn gap_is_not_flagged_when_resync_disabled() {
    let mut store = seeded_store();
    let mut dispatcher = SyncDispatcher::new(SyncConfig {
        resync_on_gap: false,
        ..SyncConfig::default()
    });

    replay(&mut dispatcher, &mut store, r#"[{"seq": 2}]"#);
    let gap = report(&mut dispatcher, &mut store, r#"[{"seq": 5}]"#);
    assert_eq!(gap.applied, [5]);
    assert!(!gap.resync_required);
}

#[test]
fn folder_notifications_update_the_tree() {
    let mut store = store_with_folders();
    let mut dispatcher = SyncDispatcher::default();

    replay(
        &mut dispatcher,
        &mut store,
        r#"[{"seq": 2,
            "created": {"folder": [{"id": "21", "name": "Home", "l": "2"}]},
            "modified": {"folder": [{"id": "20", "l": "3"}, {"id": "2", "u": 7}]},
            "deleted": "30"}]"#,
    );

    let home = store.folders.get("21").unwrap();
    assert_eq!(home.path, "/Inbox/Home");
    assert_eq!(home.abs_parent.as_deref(), Some("2"));

    let work = store.folders.get("20").unwrap();
    assert_eq!(work.parent.as_deref(), Some("3"));
    assert_eq!(work.path, "/Trash/Work");
    assert_eq!(work.abs_parent.as_deref(), Some("3"));

    assert_eq!(store.folders.get("2").unwrap().unread_count, 7);
    assert!(store.folders.get("30").is_none());
    assert_eq!(store.conversations.conversations.len(), 2);

    store
        .folders
        .folder_action(Lifecycle::Pending {
            request_id: "empty".into(),
            arg: FolderActionArg {
                id: "3".into(),
                op: FolderOp::Empty,
            },
        })
        .unwrap();
    assert!(store.folders.get("20").is_none());
    assert!(store.folders.get("21").is_some());
}
