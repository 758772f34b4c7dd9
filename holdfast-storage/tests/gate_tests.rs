use holdfast_storage::{PauseGate, PendingCommand};
use holdfast_types::EntityKey;

fn save(id: &str) -> PendingCommand {
    PendingCommand::SaveLocal {
        key: EntityKey::new("Tile", id),
        payload: format!(r#"{{"instance_id":"{id}"}}"#),
    }
}

#[test]
fn starts_unpaused() {
    let gate = PauseGate::new();
    assert!(!gate.is_paused());
    assert_eq!(gate.pending_len(), 0);
}

#[test]
fn pause_and_resume_toggle() {
    let gate = PauseGate::new();
    gate.pause();
    gate.pause();
    assert!(gate.is_paused());
    assert!(gate.resume().is_empty());
    assert!(!gate.is_paused());
}

#[test]
fn resume_returns_commands_in_order() {
    let gate = PauseGate::new();
    gate.pause();
    gate.enqueue_edit(save("a"));
    gate.enqueue_edit(PendingCommand::DeleteLocal {
        key: EntityKey::new("Tile", "a"),
    });
    gate.enqueue_edit(save("b"));
    assert_eq!(gate.pending_len(), 3);

    let drained = gate.resume();
    let ids: Vec<&str> = drained.iter().map(|c| c.key().instance_id.as_str()).collect();
    assert_eq!(ids, vec!["a", "a", "b"]);
    assert!(matches!(drained[1], PendingCommand::DeleteLocal { .. }));
    assert_eq!(gate.pending_len(), 0);
}

#[test]
fn queue_is_replayed_once() {
    let gate = PauseGate::new();
    gate.pause();
    gate.enqueue_edit(save("a"));
    assert_eq!(gate.resume().len(), 1);
    assert!(gate.resume().is_empty());
}

#[test]
fn commands_after_resume_go_to_next_cycle() {
    let gate = PauseGate::new();
    gate.pause();
    gate.enqueue_edit(save("a"));
    let first = gate.resume();

    gate.pause();
    gate.enqueue_edit(save("b"));
    assert_eq!(first.len(), 1);
    assert_eq!(gate.pending_len(), 1);
}

#[test]
fn remote_commands_are_flagged() {
    let key = EntityKey::new("Tile", "a");
    assert!(PendingCommand::DeleteRemote { key: key.clone() }.is_remote());
    assert!(!PendingCommand::DeleteLocal { key }.is_remote());
}

#[test]
fn commands_serialize_for_inspection() {
    let json = serde_json::to_value(PendingCommand::DeleteRemote {
        key: EntityKey::new("Tile", "t1"),
    })
    .unwrap();
    assert_eq!(json["op"], "delete_remote");

    let back: PendingCommand = serde_json::from_value(serde_json::to_value(save("t2")).unwrap()).unwrap();
    assert_eq!(back, save("t2"));
}
