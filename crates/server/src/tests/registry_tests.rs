use super::*;

use tokio::sync::mpsc::UnboundedReceiver;

use crate::peer::Outbound;

fn peer() -> (PeerHandle, UnboundedReceiver<Outbound>) {
    PeerHandle::new()
}

fn rover() -> RobotId {
    RobotId::new("rover-1")
}

#[test]
fn duplicate_robot_registration_is_rejected() {
    let mut registry = ConnectionRegistry::new();
    let (first, _rx1) = peer();
    let (second, _rx2) = peer();

    registry.register_robot(rover(), first.clone()).expect("register");
    let error = registry
        .register_robot(rover(), second)
        .expect_err("should fail");
    assert_eq!(error, RegisterRobotError::AlreadyRegistered);

    let kept = registry.get_robot(&rover()).expect("robot");
    assert_eq!(kept.id(), first.id());
}

#[test]
fn operator_cannot_pair_with_unknown_robot() {
    let mut registry = ConnectionRegistry::new();
    let (operator, _rx) = peer();

    let error = registry
        .register_operator(rover(), operator)
        .expect_err("should fail");
    assert_eq!(error, PairError::RobotNotConnected);
    assert!(registry.get_operator(&rover()).is_none());
}

#[test]
fn second_operator_is_rejected() {
    let mut registry = ConnectionRegistry::new();
    let (robot, _rx1) = peer();
    let (first, _rx2) = peer();
    let (second, _rx3) = peer();

    registry.register_robot(rover(), robot).expect("robot");
    registry.register_operator(rover(), first.clone()).expect("pair");
    let error = registry
        .register_operator(rover(), second)
        .expect_err("should fail");
    assert_eq!(error, PairError::AlreadyControlled);

    let kept = registry.get_operator(&rover()).expect("operator");
    assert_eq!(kept.id(), first.id());
}

#[test]
fn unregistering_robot_cascade_closes_operator() {
    let mut registry = ConnectionRegistry::new();
    let (robot, _rx1) = peer();
    let (operator, mut operator_rx) = peer();

    registry.register_robot(rover(), robot).expect("robot");
    registry.register_operator(rover(), operator).expect("pair");

    registry.unregister_robot(&rover());

    assert!(registry.get_robot(&rover()).is_none());
    assert!(registry.get_operator(&rover()).is_none());
    match operator_rx.try_recv().expect("close frame") {
        Outbound::Close { code, .. } => assert_eq!(code, NORMAL_CLOSURE),
        other => panic!("expected close frame, got {other:?}"),
    }
}

#[test]
fn unregistering_unknown_robot_is_a_noop() {
    let mut registry = ConnectionRegistry::new();
    registry.unregister_robot(&rover());
    assert_eq!(registry.status(&rover()), RobotStatus::Disconnected);
}

#[test]
fn unregistering_operator_clears_reverse_index() {
    let mut registry = ConnectionRegistry::new();
    let (robot, _rx1) = peer();
    let (operator, _rx2) = peer();

    registry.register_robot(rover(), robot).expect("robot");
    registry
        .register_operator(rover(), operator.clone())
        .expect("pair");

    assert_eq!(registry.unregister_operator(operator.id()), Some(rover()));
    assert!(registry.get_operator(&rover()).is_none());
    assert_eq!(registry.status(&rover()), RobotStatus::Available);

    // Second call finds nothing to release.
    assert_eq!(registry.unregister_operator(operator.id()), None);
}

#[test]
fn status_reflects_pairing_lifecycle() {
    let mut registry = ConnectionRegistry::new();
    assert_eq!(registry.status(&rover()), RobotStatus::Disconnected);

    let (robot, _rx1) = peer();
    registry.register_robot(rover(), robot).expect("robot");
    assert_eq!(registry.status(&rover()), RobotStatus::Available);

    let (operator, _rx2) = peer();
    registry
        .register_operator(rover(), operator.clone())
        .expect("pair");
    assert_eq!(registry.status(&rover()), RobotStatus::Controlled);

    registry.unregister_operator(operator.id());
    assert_eq!(registry.status(&rover()), RobotStatus::Available);
}

#[test]
fn all_statuses_covers_every_registered_robot() {
    let mut registry = ConnectionRegistry::new();
    let (r1, _rx1) = peer();
    let (r2, _rx2) = peer();
    let (operator, _rx3) = peer();

    registry
        .register_robot(RobotId::new("rover-1"), r1)
        .expect("robot");
    registry
        .register_robot(RobotId::new("rover-2"), r2)
        .expect("robot");
    registry
        .register_operator(RobotId::new("rover-2"), operator)
        .expect("pair");

    let statuses = registry.all_statuses();
    assert_eq!(statuses.len(), 2);
    assert_eq!(
        statuses.get(&RobotId::new("rover-1")),
        Some(&RobotStatus::Available)
    );
    assert_eq!(
        statuses.get(&RobotId::new("rover-2")),
        Some(&RobotStatus::Controlled)
    );
}
