use std::sync::Once;

use translate_core::{
    update, AppState, ClientSettings, Effect, Msg, SelectedFile, TrackedFile, UploadFlow,
    DELETE_FALLBACK, FILE_INPUT_PROMPT, UPLOAD_FALLBACK,
};

fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(client_logging::initialize_for_tests);
}

fn tracked(id: &str, name: &str) -> TrackedFile {
    TrackedFile {
        id: id.to_string(),
        name: name.to_string(),
    }
}

fn settings() -> ClientSettings {
    ClientSettings {
        allow_list: translate_core::AllowList::new([".pdf", ".txt"]),
        ..ClientSettings::default()
    }
}

#[test]
fn upload_then_delete_round_trip() {
    init_logging();
    let state = AppState::new(settings());

    let (state, effects) = update(
        state,
        Msg::FilesSelected(vec![SelectedFile::new("report.pdf", "/docs/report.pdf")]),
    );
    assert_eq!(
        effects,
        vec![Effect::Upload {
            files: vec![SelectedFile::new("report.pdf", "/docs/report.pdf")],
        }]
    );

    let (state, effects) = update(
        state,
        Msg::UploadSucceeded {
            files: vec![tracked("1", "report.pdf")],
        },
    );
    assert!(effects.is_empty());
    let view = state.view();
    assert_eq!(view.rows.len(), 1);
    assert_eq!(view.rows[0].name, "report.pdf");
    assert!(view.rows[0].delete_enabled);
    assert!(view.start_enabled);
    assert_eq!(view.upload_progress, None);
    assert_eq!(view.file_input_label, FILE_INPUT_PROMPT);

    let (state, effects) = update(
        state,
        Msg::DeleteClicked {
            file_id: "1".to_string(),
        },
    );
    assert_eq!(
        effects,
        vec![Effect::Delete {
            file_id: "1".to_string()
        }]
    );
    // Nothing changes until the server confirms.
    assert_eq!(state.view().rows.len(), 1);

    let (state, _) = update(
        state,
        Msg::DeleteSucceeded {
            file_id: "1".to_string(),
            message: Some("File deleted successfully".to_string()),
        },
    );
    let view = state.view();
    assert!(view.rows.is_empty());
    assert!(!view.start_enabled);
    assert_eq!(view.status_message, "File deleted successfully");
}

#[test]
fn upload_appends_exactly_the_new_files() {
    init_logging();
    let state = AppState::new(settings());
    let (state, _) = update(
        state,
        Msg::UploadSucceeded {
            files: vec![tracked("1", "a.pdf")],
        },
    );
    let (state, _) = update(
        state,
        Msg::UploadSucceeded {
            files: vec![tracked("2", "b.pdf"), tracked("3", "c.txt")],
        },
    );

    let ids: Vec<_> = state.view().rows.iter().map(|row| row.id.clone()).collect();
    assert_eq!(ids, vec!["1", "2", "3"]);
    assert_eq!(
        state.view().status_message,
        "2 file(s) uploaded. Click \"Start Translation\" to begin."
    );
}

#[test]
fn upload_progress_reports_percentage() {
    init_logging();
    let state = AppState::new(settings());
    let (state, _) = update(
        state,
        Msg::UploadProgress {
            sent: 512,
            total: 2048,
        },
    );
    assert_eq!(state.view().upload_progress, Some(25));

    let (state, _) = update(
        state,
        Msg::UploadProgress {
            sent: 4096,
            total: 2048,
        },
    );
    assert_eq!(state.view().upload_progress, Some(100));
}

#[test]
fn upload_failure_shows_server_text_or_fallback() {
    init_logging();
    let state = AppState::new(settings());
    let (state, _) = update(
        state,
        Msg::UploadFailed {
            server_message: Some("File type not allowed".to_string()),
        },
    );
    assert_eq!(state.view().status_message, "File type not allowed");
    assert!(state.view().rows.is_empty());

    let (state, _) = update(
        state,
        Msg::UploadFailed {
            server_message: None,
        },
    );
    assert_eq!(state.view().status_message, UPLOAD_FALLBACK);
    assert!(!state.view().start_enabled);
}

#[test]
fn delete_failure_leaves_rows_intact() {
    init_logging();
    let state = AppState::new(settings());
    let (state, _) = update(
        state,
        Msg::UploadSucceeded {
            files: vec![tracked("1", "a.pdf"), tracked("2", "b.pdf")],
        },
    );

    let (state, _) = update(
        state,
        Msg::DeleteFailed {
            file_id: "1".to_string(),
            server_message: None,
        },
    );
    let view = state.view();
    assert_eq!(view.rows.len(), 2);
    assert!(view.start_enabled);
    assert_eq!(view.status_message, DELETE_FALLBACK);
}

#[test]
fn deleting_one_of_many_keeps_start_enabled() {
    init_logging();
    let state = AppState::new(settings());
    let (state, _) = update(
        state,
        Msg::UploadSucceeded {
            files: vec![tracked("1", "a.pdf"), tracked("2", "b.pdf")],
        },
    );
    let (state, _) = update(
        state,
        Msg::DeleteSucceeded {
            file_id: "1".to_string(),
            message: None,
        },
    );

    let view = state.view();
    assert_eq!(view.rows.len(), 1);
    assert_eq!(view.rows[0].id, "2");
    assert!(view.start_enabled);
    assert_eq!(view.status_message, "a.pdf was deleted.");
}

#[test]
fn delete_of_untracked_id_is_ignored() {
    init_logging();
    let state = AppState::new(settings());
    let (mut state, effects) = update(
        state,
        Msg::DeleteClicked {
            file_id: "missing".to_string(),
        },
    );
    assert!(effects.is_empty());
    assert!(!state.consume_dirty());
}

#[test]
fn single_flow_replaces_the_tracked_file() {
    init_logging();
    let state = AppState::new(ClientSettings {
        flow: UploadFlow::Single,
        ..settings()
    });
    let (state, _) = update(
        state,
        Msg::UploadSucceeded {
            files: vec![tracked("first.txt", "first.txt")],
        },
    );
    let (state, _) = update(
        state,
        Msg::UploadSucceeded {
            files: vec![tracked("second.txt", "second.txt")],
        },
    );

    let view = state.view();
    assert_eq!(view.rows.len(), 1);
    assert_eq!(view.rows[0].name, "second.txt");
    assert_eq!(
        view.status_message,
        "File upload completed. Click \"Start Translation\" to begin."
    );
}
