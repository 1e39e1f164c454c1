//! Property tests for the connection lifecycle
//!
//! Arbitrary interleavings of connect, connection loss and teardown must
//! never leave more than one handle open.

use pirate_keyring_ipc::MockKeyringFactory;
use pirate_wallet_settings::KeyringConnection;
use proptest::prelude::*;
use std::sync::Arc;

#[derive(Debug, Clone)]
enum Op {
    EnsureConnected,
    FailCurrent,
    FailOldest,
    Teardown,
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        3 => Just(Op::EnsureConnected),
        2 => Just(Op::FailCurrent),
        1 => Just(Op::FailOldest),
        1 => Just(Op::Teardown),
    ]
}

proptest! {
    #[test]
    fn prop_at_most_one_open_handle(ops in prop::collection::vec(op_strategy(), 0..64)) {
        let factory = Arc::new(MockKeyringFactory::new());
        let connection = KeyringConnection::new(factory.clone());

        for op in ops {
            match op {
                Op::EnsureConnected => connection.ensure_connected(),
                Op::FailCurrent => {
                    if let Some(handle) = factory.latest() {
                        handle.fail_connection();
                    }
                }
                Op::FailOldest => {
                    if let Some(handle) = factory.controllers().first() {
                        handle.fail_connection();
                    }
                }
                Op::Teardown => connection.teardown(),
            }

            prop_assert!(factory.open_handles() <= 1);
            prop_assert_eq!(factory.open_handles() == 1, connection.is_connected());
            for handle in factory.controllers() {
                prop_assert!(handle.close_calls() <= 1);
            }
        }
    }

    #[test]
    fn prop_repeated_connect_requests_one_handle(n in 1usize..32) {
        let factory = Arc::new(MockKeyringFactory::new());
        let connection = KeyringConnection::new(factory.clone());

        for _ in 0..n {
            connection.ensure_connected();
        }

        prop_assert_eq!(factory.handles_requested(), 1);
    }
}
