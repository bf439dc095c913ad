//! 買い物シナリオテスト
//!
//! スキャン制御とカートを組み合わせた一連の操作を検証

use vision_shop_common::{
    format_money, AddOutcome, Cart, CycleOutcome, DetectionResponse, RecordingFeedback,
    ScanController, SoundKind,
};

fn banana() -> DetectionResponse {
    DetectionResponse::found("Banana", 0.5, "Groceries")
}

fn detect(
    scan: &mut ScanController,
    response: &DetectionResponse,
    now_ms: u64,
    feedback: &RecordingFeedback,
) -> CycleOutcome {
    let ticket = scan.begin_cycle().expect("サイクルを開始できない");
    scan.finish_cycle(ticket, response, now_ms, feedback)
}

fn tap(scan: &ScanController, cart: &mut Cart, now_ms: u64, feedback: &RecordingFeedback) -> AddOutcome {
    let last_seen = scan.last_seen().cloned();
    cart.add_detected(last_seen.as_ref(), now_ms, feedback)
}

/// 開始 → バナナ検出 → 追加 → 再検出 → 追加 → 停止
#[test]
fn test_banana_session() {
    let feedback = RecordingFeedback::new();
    let mut scan = ScanController::new();
    let mut cart = Cart::new();

    scan.start(&feedback);
    assert_eq!(feedback.spoken(), vec!["Scanner active.".to_string()]);

    detect(&mut scan, &banana(), 1_000, &feedback);
    assert_eq!(feedback.last_spoken().as_deref(), Some("Banana. 0.5"));

    tap(&scan, &mut cart, 1_200, &feedback);
    assert_eq!(cart.len(), 1);
    assert_eq!(cart.lines()[0].name(), "Banana");
    assert_eq!(cart.lines()[0].quantity, 1);
    assert_eq!(format_money(cart.total()), "$0.50");

    detect(&mut scan, &banana(), 1_500, &feedback);
    tap(&scan, &mut cart, 1_800, &feedback);
    assert_eq!(cart.len(), 1);
    assert_eq!(cart.lines()[0].quantity, 2);
    assert_eq!(format_money(cart.total()), "$1.00");

    scan.stop();
    assert!(scan.last_seen().is_none());
    assert_eq!(cart.lines()[0].quantity, 2);

    // 停止後のタップは何も追加しない
    assert_eq!(tap(&scan, &mut cart, 5_000, &feedback), AddOutcome::NothingToAdd);
    assert_eq!(feedback.sounds().last(), Some(&SoundKind::Error));
}

/// 同名の追加回数 = 数量
#[test]
fn test_quantity_equals_accepted_adds() {
    let feedback = RecordingFeedback::new();
    let mut cart = Cart::new();

    let mut accepted = 0;
    for i in 0..20u64 {
        // 300ms間隔のタップは1回おきにしか受け付けない
        let outcome = cart.add_detected(Some(&banana()), 10_000 + i * 300, &feedback);
        if outcome.accepted_name().is_some() {
            accepted += 1;
        }
    }

    assert_eq!(cart.len(), 1);
    assert_eq!(cart.lines()[0].quantity, accepted);
    assert_eq!(accepted, 10);
}

/// 見失った直後はタップしても追加されない
#[test]
fn test_lost_item_cannot_be_added() {
    let feedback = RecordingFeedback::new();
    let mut scan = ScanController::new();
    let mut cart = Cart::new();
    scan.start(&feedback);

    detect(&mut scan, &banana(), 1_000, &feedback);
    detect(&mut scan, &DetectionResponse::connection_failed(), 1_500, &feedback);

    assert_eq!(tap(&scan, &mut cart, 1_600, &feedback), AddOutcome::NothingToAdd);
    assert!(cart.is_empty());
    assert_eq!(feedback.last_spoken().as_deref(), Some("Nothing to add."));
}

/// 合計は常に単価×数量の総和
#[test]
fn test_total_matches_lines() {
    let feedback = RecordingFeedback::new();
    let mut cart = Cart::new();
    let items = [("Apple", 1.25), ("Bread", 2.99), ("Milk", 0.89), ("Eggs", 3.10)];

    for (i, (name, price)) in items.iter().enumerate() {
        let detection = DetectionResponse::found(*name, *price, "Groceries");
        cart.add_detected(Some(&detection), 1_000 * (i as u64 + 1), &feedback);
    }
    let bread = cart.find_by_name("Bread").map(|l| l.timestamp).expect("Breadがない");
    cart.update_quantity(bread, 4, &feedback);
    let milk = cart.find_by_name("Milk").map(|l| l.timestamp).expect("Milkがない");
    cart.remove(milk, &feedback);

    let expected: f64 = cart.lines().iter().map(|l| l.product.price * f64::from(l.quantity)).sum();
    assert!((cart.total() - expected).abs() < 1e-9);
    assert!((cart.total() - (1.25 + 2.99 * 5.0 + 3.10)).abs() < 1e-9);

    cart.announce_total(&feedback);
    assert_eq!(feedback.last_spoken().as_deref(), Some("Total 19.30 dollars."));
}
