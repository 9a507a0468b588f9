//! Integration tests for Tessella
//!
//! These tests verify the board service end to end against an in-memory
//! SQLite store: device registration, cooldown-gated mutation, broadcast
//! fan-out, reset, and persistence reconciliation.

use std::sync::Arc;
use std::time::Duration;

use sqlx::sqlite::SqlitePoolOptions;
use tessella_board::{
    spawn_persistence_worker, BoardService, BoardStore, ColorInput, PlacePixelRequest, ResetGuard,
    Rgb, ServerMessage,
};

const RESET_SECRET: &str = "paint-it-all";

async fn setup_service(cooldown_secs: u64) -> (Arc<BoardService>, Arc<BoardStore>) {
    let pool = SqlitePoolOptions::new()
        .connect("sqlite::memory:")
        .await
        .unwrap();
    let store = BoardStore::new(pool);
    store.init().await.unwrap();
    let board = store.load_or_initialize(16, 16, Rgb::WHITE).await.unwrap();

    let store = Arc::new(store);
    let persist = spawn_persistence_worker(store.clone());
    let guard = ResetGuard::new(ResetGuard::digest_hex(RESET_SECRET));
    let service = Arc::new(BoardService::new(
        board,
        store.clone(),
        persist,
        guard,
        cooldown_secs,
    ));
    (service, store)
}

fn place(x: i64, y: i64, r: i64, g: i64, b: i64) -> PlacePixelRequest {
    PlacePixelRequest {
        x,
        y,
        color: ColorInput { r, g, b },
    }
}

// ============================================================================
// Mutation path
// ============================================================================

#[tokio::test]
async fn test_first_mutation_is_accepted_and_broadcast() {
    let (service, _store) = setup_service(10).await;
    let token = tessella_board::generate_token();
    service.register_device(&token).await;

    let mut updates = service.hub().subscribe();

    service
        .place_pixel(Some(&token), &place(0, 0, 1, 2, 3))
        .await
        .unwrap();

    // Board: exactly pixel (0,0) changed, alpha forced opaque
    let snap = service.snapshot().await;
    assert_eq!(&snap[0..4], &[1, 2, 3, 255]);
    assert!(snap[4..]
        .chunks_exact(4)
        .all(|px| px == [255, 255, 255, 255]));

    // Broadcast: one full frame reflecting the same state
    match updates.recv().await.unwrap() {
        ServerMessage::CanvasUpdated { canvas } => assert_eq!(canvas, snap),
        other => panic!("unexpected message: {other:?}"),
    }
}

#[tokio::test]
async fn test_immediate_repeat_is_too_soon() {
    let (service, _store) = setup_service(10).await;
    let token = tessella_board::generate_token();
    service.register_device(&token).await;

    service
        .place_pixel(Some(&token), &place(0, 0, 1, 2, 3))
        .await
        .unwrap();
    let after_first = service.snapshot().await;

    let err = service
        .place_pixel(Some(&token), &place(0, 0, 9, 9, 9))
        .await
        .unwrap_err();
    assert_eq!(err.code(), "too_soon");
    assert_eq!(service.snapshot().await, after_first);
}

#[tokio::test]
async fn test_mutation_allowed_again_after_cooldown_elapses() {
    let (service, _store) = setup_service(1).await;
    let token = tessella_board::generate_token();
    service.register_device(&token).await;

    service
        .place_pixel(Some(&token), &place(5, 5, 10, 10, 10))
        .await
        .unwrap();

    tokio::time::sleep(Duration::from_millis(1100)).await;

    service
        .place_pixel(Some(&token), &place(5, 5, 20, 20, 20))
        .await
        .unwrap();
}

#[tokio::test]
async fn test_unknown_or_missing_token_never_mutates() {
    let (service, _store) = setup_service(10).await;
    let before = service.snapshot().await;

    let err = service
        .place_pixel(None, &place(0, 0, 1, 2, 3))
        .await
        .unwrap_err();
    assert_eq!(err.code(), "missing_credential");

    let err = service
        .place_pixel(Some("never-issued"), &place(0, 0, 1, 2, 3))
        .await
        .unwrap_err();
    assert_eq!(err.code(), "unknown_device");

    assert_eq!(service.snapshot().await, before);
}

#[tokio::test]
async fn test_accepted_mutation_reaches_the_store() {
    let (service, store) = setup_service(10).await;
    let token = tessella_board::generate_token();
    service.register_device(&token).await;

    // (x=3, y=2) on a 16-wide board is linear index 35
    service
        .place_pixel(Some(&token), &place(3, 2, 40, 50, 60))
        .await
        .unwrap();

    // Persistence is fire-and-forget; give the worker a moment
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(
        store.read_pixel(35).await.unwrap(),
        Some(Rgb::new(40, 50, 60))
    );
}

// ============================================================================
// Reset path
// ============================================================================

#[tokio::test]
async fn test_reset_with_correct_secret_recolors_memory_and_store() {
    let (service, store) = setup_service(10).await;

    service
        .reset(RESET_SECRET, Rgb::new(10, 20, 30))
        .await
        .unwrap();

    let snap = service.snapshot().await;
    assert_eq!(snap.len(), 16 * 16 * 4);
    assert!(snap.chunks_exact(4).all(|px| px == [10, 20, 30, 255]));

    // persist_all is awaited by reset; the store must already agree
    for index in 0..256 {
        assert_eq!(
            store.read_pixel(index).await.unwrap(),
            Some(Rgb::new(10, 20, 30))
        );
    }
}

#[tokio::test]
async fn test_reset_with_wrong_secret_changes_nothing() {
    let (service, store) = setup_service(10).await;

    let err = service
        .reset("not the secret", Rgb::new(10, 20, 30))
        .await
        .unwrap_err();
    assert_eq!(err.code(), "wrong_secret");

    let snap = service.snapshot().await;
    assert!(snap.chunks_exact(4).all(|px| px == [255, 255, 255, 255]));
    assert_eq!(store.read_pixel(0).await.unwrap(), Some(Rgb::WHITE));
}

// ============================================================================
// Restart reconciliation
// ============================================================================

#[tokio::test]
async fn test_restart_reloads_the_persisted_board() {
    let (service, store) = setup_service(10).await;
    let token = tessella_board::generate_token();
    service.register_device(&token).await;

    service
        .place_pixel(Some(&token), &place(0, 0, 7, 8, 9))
        .await
        .unwrap();
    tokio::time::sleep(Duration::from_millis(100)).await;

    // Simulate a restart: rebuild the board from the same store
    let board = store.load_or_initialize(16, 16, Rgb::WHITE).await.unwrap();
    let snap = board.snapshot();
    assert_eq!(&snap[0..4], &[7, 8, 9, 255]);
    assert!(snap[4..]
        .chunks_exact(4)
        .all(|px| px == [255, 255, 255, 255]));
}

// ============================================================================
// Ledger maintenance
// ============================================================================

#[tokio::test]
async fn test_cleared_device_must_rejoin_before_writing() {
    let (service, _store) = setup_service(10).await;
    let token = tessella_board::generate_token();
    service.register_device(&token).await;
    assert_eq!(service.ledger_len().await, 1);

    // No viewers connected: the sweep drops every entry
    assert_eq!(service.clear_ledger_if_idle().await, 1);

    let err = service
        .place_pixel(Some(&token), &place(0, 0, 1, 2, 3))
        .await
        .unwrap_err();
    assert_eq!(err.code(), "unknown_device");

    // The handshake re-registers the same token and writing works again
    service.register_device(&token).await;
    service
        .place_pixel(Some(&token), &place(0, 0, 1, 2, 3))
        .await
        .unwrap();
}
