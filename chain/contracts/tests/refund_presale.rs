//! Refund path end to end
//!
//! Drives a pool through deposit → cap change → forward → refund →
//! withdraw, and checks state gating of `refund_presale` in every phase.

use presale_contracts::errors::PoolError;
use presale_contracts::transfer::RecordingTransfer;
use presale_contracts::PresalePool;
use types::ids::{Address, TokenRef};
use types::state::PoolState;

fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

fn creator() -> Address {
    Address::try_new("0xcreator").unwrap()
}

fn buyer1() -> Address {
    Address::try_new("0xbuyer1").unwrap()
}

fn buyer2() -> Address {
    Address::try_new("0xbuyer2").unwrap()
}

fn setup_pool() -> PresalePool {
    init_tracing();
    PresalePool::new(creator())
}

#[test]
fn cant_be_called_from_open_state() {
    let mut pool = setup_pool();
    let result = pool.refund_presale(&creator(), 0);
    assert!(matches!(result, Err(PoolError::IllegalState { .. })));
    assert_eq!(pool.state(), PoolState::Open);
}

#[test]
fn cant_be_called_from_failed_state() {
    let mut pool = setup_pool();
    pool.fail(&creator()).unwrap();
    let result = pool.refund_presale(&creator(), 0);
    assert_eq!(
        result,
        Err(PoolError::IllegalState {
            operation: "refund_presale",
            state: PoolState::Failed
        })
    );
}

#[test]
fn can_be_called_by_presale_address() {
    let mut pool = setup_pool();
    pool.deposit(&creator(), 1).unwrap();
    let mut transfer = RecordingTransfer::new();
    pool.forward_to_presale(&creator(), buyer1(), 0, &mut transfer)
        .unwrap();

    pool.refund_presale(&buyer1(), 1).unwrap();
    assert_eq!(pool.state(), PoolState::Failed);
    assert_eq!(pool.state().code(), 1);
}

#[test]
fn can_be_called_by_admin() {
    let mut pool = setup_pool();
    pool.deposit(&buyer2(), 1).unwrap();
    let mut transfer = RecordingTransfer::new();
    pool.forward_to_presale(&creator(), buyer1(), 0, &mut transfer)
        .unwrap();

    pool.refund_presale(&creator(), 1).unwrap();
    assert_eq!(pool.state(), PoolState::Failed);
}

#[test]
fn only_accepts_payments_covering_the_forwarded_amount() {
    let mut pool = setup_pool();
    pool.deposit(&creator(), 2).unwrap();
    let mut transfer = RecordingTransfer::new();
    pool.forward_to_presale(&creator(), buyer1(), 0, &mut transfer)
        .unwrap();

    assert_eq!(
        pool.refund_presale(&buyer1(), 0),
        Err(PoolError::InsufficientPayment {
            required: 2,
            provided: 0
        })
    );
    assert!(pool.refund_presale(&buyer1(), 1).is_err());
    assert_eq!(pool.state(), PoolState::Paid);

    pool.refund_presale(&buyer1(), 2).unwrap();
    assert_eq!(pool.state(), PoolState::Failed);
}

#[test]
fn cant_be_called_in_token_distribution_state() {
    let mut pool = setup_pool();
    pool.deposit(&creator(), 2).unwrap();
    let mut transfer = RecordingTransfer::new();
    pool.forward_to_presale(&creator(), buyer1(), 0, &mut transfer)
        .unwrap();
    pool.set_token(&creator(), TokenRef::try_new("0xtesttoken").unwrap()).unwrap();

    let result = pool.refund_presale(&creator(), 2);
    assert_eq!(
        result,
        Err(PoolError::IllegalState {
            operation: "refund_presale",
            state: PoolState::TokenDistribution
        })
    );
}

#[test]
fn allows_full_refunds() {
    let mut pool = setup_pool();
    pool.deposit(&creator(), 2).unwrap();
    pool.deposit(&buyer1(), 5).unwrap();
    pool.deposit(&buyer2(), 1).unwrap();

    let balances = |pool: &PresalePool, who: &Address| {
        let record = pool.participant(who).unwrap();
        (record.contribution, record.remaining)
    };

    // Unbounded caps commit everything
    assert_eq!(balances(&pool, &creator()), (2, 0));
    assert_eq!(balances(&pool, &buyer1()), (5, 0));
    assert_eq!(balances(&pool, &buyer2()), (1, 0));
    assert_eq!(pool.custody(), 8);

    pool.set_contribution_settings(&creator(), 0, 2, 3).unwrap();
    assert_eq!(balances(&pool, &creator()), (2, 0));
    assert_eq!(balances(&pool, &buyer1()), (1, 4));
    assert_eq!(balances(&pool, &buyer2()), (0, 1));
    assert_eq!(pool.custody(), 8);

    let mut transfer = RecordingTransfer::new();
    let presale = Address::try_new("0xpresale").unwrap();
    pool.forward_to_presale(&creator(), presale.clone(), 0, &mut transfer)
        .unwrap();
    assert_eq!(pool.amount_forwarded(), 3);
    assert_eq!(transfer.received(&presale), 3);

    pool.refund_presale(&creator(), 63).unwrap();

    for (who, expected) in [(creator(), 42), (buyer1(), 25), (buyer2(), 1)] {
        assert_eq!(pool.withdraw_all(&who, &mut transfer), Ok(expected));
        assert_eq!(transfer.received(&who), expected);
    }

    assert_eq!(pool.custody(), 0);
    assert_eq!(pool.refund_dust(), 0);
    assert!(pool.check_invariants());
}

#[test]
fn dust_stays_in_custody_after_everyone_withdraws() {
    let mut pool = setup_pool();
    pool.deposit(&creator(), 1).unwrap();
    pool.deposit(&buyer1(), 1).unwrap();
    pool.deposit(&buyer2(), 1).unwrap();

    let mut transfer = RecordingTransfer::new();
    pool.forward_to_presale(&creator(), Address::try_new("0xpresale").unwrap(), 0, &mut transfer)
        .unwrap();
    pool.refund_presale(&creator(), 100).unwrap();

    for who in [creator(), buyer1(), buyer2()] {
        assert_eq!(pool.withdraw_all(&who, &mut transfer), Ok(33));
    }
    assert_eq!(pool.refund_dust(), 1);
    assert_eq!(pool.custody(), 1);
    for who in [creator(), buyer1(), buyer2()] {
        assert_eq!(pool.claimable(&who), 0);
    }
}
