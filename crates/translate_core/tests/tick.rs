use translate_core::{update, AppState, ClientSettings, Msg};

#[test]
fn tick_leaves_state_alone() {
    let state = AppState::new(ClientSettings::default());
    let (mut next, effects) = update(state.clone(), Msg::Tick);

    assert!(effects.is_empty());
    assert!(!next.consume_dirty());
    assert_eq!(state, next);
}
