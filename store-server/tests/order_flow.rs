//! 订单流程集成测试
//!
//! 使用 ServerState::initialize 完整初始化（临时工作目录 + 真实 SQLite），
//! 覆盖下单、缺货汇总、状态流转与库存副作用。

use shared::models::{
    CartItemRequest, OrderFormData, OrderStatus, PaymentStatus, PlaceOrderRequest,
};
use sqlx::SqlitePool;
use store_server::audit::{AuditAction, AuditQuery, AuditStorage};
use store_server::db::models::ProductCreate;
use store_server::db::repository::{OrderRepository, ProductRepository};
use store_server::orders::{self, PlacementError, TransitionError};
use store_server::{Config, ServerState};
use tempfile::TempDir;

async fn test_state() -> (ServerState, TempDir) {
    let dir = tempfile::tempdir().expect("create temp dir");
    let config = Config::with_overrides(dir.path().to_str().unwrap(), 0);
    let state = ServerState::initialize(&config)
        .await
        .expect("initialize state");
    (state, dir)
}

/// Seed one product with the given price and physical stock
async fn seed_product(state: &ServerState, name: &str, price: f64, quantity: i64) -> i64 {
    let repo = ProductRepository::new(state.pool().clone());
    let product = repo
        .create(ProductCreate {
            name: name.to_string(),
            slug: None,
            sku: format!("SKU-{}", name.replace(' ', "-").to_uppercase()),
            price,
            old_price: None,
            brand: Some("Kawasaki".to_string()),
            is_featured: None,
            initial_quantity: Some(quantity),
        })
        .await
        .expect("seed product");
    product.id
}

async fn counters(pool: &SqlitePool, product_id: i64) -> (i64, i64) {
    sqlx::query_as("SELECT quantity, reserved_quantity FROM inventory WHERE product_id = ?")
        .bind(product_id)
        .fetch_one(pool)
        .await
        .expect("read counters")
}

async fn set_reserved(pool: &SqlitePool, product_id: i64, reserved: i64) {
    sqlx::query("UPDATE inventory SET reserved_quantity = ? WHERE product_id = ?")
        .bind(reserved)
        .bind(product_id)
        .execute(pool)
        .await
        .expect("set reserved");
}

fn form_data() -> OrderFormData {
    OrderFormData {
        first_name: "Ana".to_string(),
        last_name: "García".to_string(),
        email: "ana@example.com".to_string(),
        phone: "600123123".to_string(),
        address: "Calle Mayor 1".to_string(),
        city: "Madrid".to_string(),
        postal_code: "28001".to_string(),
        payment_method: "card".to_string(),
        comments: None,
    }
}

fn order_request(items: Vec<(i64, i64)>) -> PlaceOrderRequest {
    PlaceOrderRequest {
        form_data: form_data(),
        cart_items: items
            .into_iter()
            .map(|(id, quantity)| CartItemRequest {
                id,
                quantity,
                price: None,
                name: None,
            })
            .collect(),
        total: None,
    }
}

#[tokio::test]
async fn placing_order_reserves_stock_and_computes_total() {
    let (state, _dir) = test_state().await;
    let a = seed_product(&state, "Ninja 400", 100.0, 10).await;
    let b = seed_product(&state, "Z650 Exhaust", 50.0, 5).await;

    let placed = orders::place_order(state.pool(), Some(1), &order_request(vec![(a, 2), (b, 1)]))
        .await
        .expect("order placed");

    assert!(placed.order_number.starts_with("MC-"));
    assert_eq!(placed.total_amount, 250.0);

    // 预留增加，实物库存不变
    assert_eq!(counters(state.pool(), a).await, (10, 2));
    assert_eq!(counters(state.pool(), b).await, (5, 1));

    // total_amount == sum(items.price * items.quantity)
    let repo = OrderRepository::new(state.pool().clone());
    let detail = repo
        .find_detail(placed.order_id)
        .await
        .unwrap()
        .expect("order exists");
    let item_sum: f64 = detail
        .items
        .iter()
        .map(|i| i.price * i.quantity as f64)
        .sum();
    assert_eq!(item_sum, detail.order.total_amount);
    assert_eq!(detail.order.status, OrderStatus::Pending);
    assert_eq!(detail.order.payment_status, PaymentStatus::Pending);
    assert_eq!(detail.items.len(), 2);
    assert_eq!(detail.items[0].product_name, "Ninja 400");
}

#[tokio::test]
async fn shortage_reports_every_item_and_rolls_back() {
    let (state, _dir) = test_state().await;
    let a = seed_product(&state, "Versys 650", 80.0, 1).await;
    let b = seed_product(&state, "Brake Pads", 20.0, 0).await;

    let err = orders::place_order(state.pool(), Some(1), &order_request(vec![(a, 2), (b, 1)]))
        .await
        .expect_err("must be short");

    // 一次性报告全部缺货行，而非在第一行失败
    match err {
        PlacementError::InsufficientStock(items) => {
            assert_eq!(items.len(), 2);
            assert!(items.iter().any(|i| i.product_id == a && i.requested == 2 && i.available == 1));
            assert!(items.iter().any(|i| i.product_id == b && i.requested == 1 && i.available == 0));
        }
        other => panic!("unexpected error: {other:?}"),
    }

    // 无任何副作用
    assert_eq!(counters(state.pool(), a).await, (1, 0));
    assert_eq!(counters(state.pool(), b).await, (0, 0));
    let order_count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM orders")
        .fetch_one(state.pool())
        .await
        .unwrap();
    assert_eq!(order_count, 0);
    let item_count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM order_items")
        .fetch_one(state.pool())
        .await
        .unwrap();
    assert_eq!(item_count, 0);
}

#[tokio::test]
async fn preexisting_holds_limit_availability() {
    let (state, _dir) = test_state().await;
    let a = seed_product(&state, "Z900", 120.0, 10).await;
    set_reserved(state.pool(), a, 2).await;

    // 8 available: an order for 8 succeeds and exhausts the stock
    orders::place_order(state.pool(), Some(1), &order_request(vec![(a, 8)]))
        .await
        .expect("8 units fit");
    assert_eq!(counters(state.pool(), a).await, (10, 10));

    // the next single unit is short with available = 0
    let err = orders::place_order(state.pool(), Some(2), &order_request(vec![(a, 1)]))
        .await
        .expect_err("no stock left");
    match err {
        PlacementError::InsufficientStock(items) => {
            assert_eq!(items.len(), 1);
            assert_eq!(items[0].product_id, a);
            assert_eq!(items[0].requested, 1);
            assert_eq!(items[0].available, 0);
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn cancelling_releases_the_reservation() {
    let (state, _dir) = test_state().await;
    let a = seed_product(&state, "ZX-6R", 150.0, 6).await;

    let placed = orders::place_order(state.pool(), Some(1), &order_request(vec![(a, 4)]))
        .await
        .unwrap();
    assert_eq!(counters(state.pool(), a).await, (6, 4));

    let change = orders::update_status(state.pool(), placed.order_id, OrderStatus::Cancelled, None)
        .await
        .unwrap();
    assert_eq!(change.old_status, OrderStatus::Pending);
    assert_eq!(change.new_status, OrderStatus::Cancelled);

    // 预留回到下单前，实物库存不变
    assert_eq!(counters(state.pool(), a).await, (6, 0));
}

#[tokio::test]
async fn delivery_deducts_stock_and_releases_the_hold() {
    let (state, _dir) = test_state().await;
    let a = seed_product(&state, "W800", 90.0, 8).await;
    let b = seed_product(&state, "Chain Kit", 30.0, 10).await;

    let placed =
        orders::place_order(state.pool(), Some(1), &order_request(vec![(a, 3), (b, 2)]))
            .await
            .unwrap();

    orders::update_status(state.pool(), placed.order_id, OrderStatus::Delivered, Some(PaymentStatus::Paid))
        .await
        .unwrap();

    assert_eq!(counters(state.pool(), a).await, (5, 0));
    assert_eq!(counters(state.pool(), b).await, (8, 0));

    let repo = OrderRepository::new(state.pool().clone());
    let order = repo.find_by_id(placed.order_id).await.unwrap().unwrap();
    assert_eq!(order.status, OrderStatus::Delivered);
    assert_eq!(order.payment_status, PaymentStatus::Paid);
}

#[tokio::test]
async fn reapplying_the_same_status_is_an_inventory_noop() {
    let (state, _dir) = test_state().await;
    let a = seed_product(&state, "Vulcan S", 110.0, 5).await;

    let placed = orders::place_order(state.pool(), Some(1), &order_request(vec![(a, 2)]))
        .await
        .unwrap();

    orders::update_status(state.pool(), placed.order_id, OrderStatus::Cancelled, None)
        .await
        .unwrap();
    assert_eq!(counters(state.pool(), a).await, (5, 0));

    // 再次取消：old == new，不再释放
    orders::update_status(state.pool(), placed.order_id, OrderStatus::Cancelled, None)
        .await
        .unwrap();
    assert_eq!(counters(state.pool(), a).await, (5, 0));
}

#[tokio::test]
async fn delivery_after_cancellation_is_rejected() {
    let (state, _dir) = test_state().await;
    let a = seed_product(&state, "KLX 230", 70.0, 4).await;

    let placed = orders::place_order(state.pool(), Some(1), &order_request(vec![(a, 2)]))
        .await
        .unwrap();
    orders::update_status(state.pool(), placed.order_id, OrderStatus::Cancelled, None)
        .await
        .unwrap();

    let err = orders::update_status(state.pool(), placed.order_id, OrderStatus::Delivered, None)
        .await
        .expect_err("terminal state");
    assert!(matches!(
        err,
        TransitionError::Invalid {
            from: OrderStatus::Cancelled,
            to: OrderStatus::Delivered
        }
    ));

    // 不发生双重扣减
    assert_eq!(counters(state.pool(), a).await, (4, 0));
}

#[tokio::test]
async fn missing_order_is_reported_as_not_found() {
    let (state, _dir) = test_state().await;
    let err = orders::update_status(state.pool(), 9999, OrderStatus::Processing, None)
        .await
        .expect_err("no such order");
    assert!(matches!(err, TransitionError::NotFound(9999)));
}

#[tokio::test]
async fn zero_quantity_lines_are_rejected_up_front() {
    let (state, _dir) = test_state().await;
    let a = seed_product(&state, "Ninja 1000SX", 200.0, 10).await;

    let err = orders::place_order(state.pool(), Some(1), &order_request(vec![(a, 0)]))
        .await
        .expect_err("zero quantity");
    assert!(matches!(err, PlacementError::Invalid(_)));
    assert_eq!(counters(state.pool(), a).await, (10, 0));
}

#[tokio::test]
async fn unknown_products_are_reported_separately() {
    let (state, _dir) = test_state().await;
    let a = seed_product(&state, "Eliminator", 95.0, 3).await;

    let err = orders::place_order(state.pool(), Some(1), &order_request(vec![(a, 1), (424242, 1)]))
        .await
        .expect_err("unknown product");
    match err {
        PlacementError::UnknownProducts(ids) => assert_eq!(ids, vec![424242]),
        other => panic!("unexpected error: {other:?}"),
    }
    // 整体回滚：已知商品也未被预留
    assert_eq!(counters(state.pool(), a).await, (3, 0));
}

#[tokio::test]
async fn duplicate_cart_lines_are_checked_against_aggregate_demand() {
    let (state, _dir) = test_state().await;
    let a = seed_product(&state, "Meteor 350", 60.0, 3).await;

    // 2 + 2 > 3: combined demand must be rejected even though each line fits
    let err = orders::place_order(state.pool(), Some(1), &order_request(vec![(a, 2), (a, 2)]))
        .await
        .expect_err("aggregate exceeds stock");
    match err {
        PlacementError::InsufficientStock(items) => {
            assert_eq!(items[0].requested, 4);
            assert_eq!(items[0].available, 3);
        }
        other => panic!("unexpected error: {other:?}"),
    }

    // 2 + 1 == 3 fits and stores both lines as submitted
    let placed = orders::place_order(state.pool(), Some(1), &order_request(vec![(a, 2), (a, 1)]))
        .await
        .unwrap();
    let repo = OrderRepository::new(state.pool().clone());
    let detail = repo.find_detail(placed.order_id).await.unwrap().unwrap();
    assert_eq!(detail.items.len(), 2);
    assert_eq!(counters(state.pool(), a).await, (3, 3));
}

#[tokio::test]
async fn audit_chain_appends_and_detects_tampering() {
    let (state, _dir) = test_state().await;
    let storage = AuditStorage::new(state.pool().clone());

    for i in 0..3 {
        storage
            .append(
                AuditAction::InventoryAdjusted,
                "inventory",
                &i.to_string(),
                Some("1".to_string()),
                Some("admin".to_string()),
                serde_json::json!({ "quantity": i * 10 }),
            )
            .await
            .expect("append");
    }

    let verification = storage.verify_chain().await.unwrap();
    assert!(verification.valid);
    assert_eq!(verification.entries_checked, 3);

    let entries = storage.query(&AuditQuery::default()).await.unwrap();
    assert_eq!(entries.len(), 3);
    // 倒序返回
    assert!(entries[0].sequence > entries[2].sequence);

    // 篡改一条记录后链校验必须失败
    sqlx::query("UPDATE audit_log SET details = '{\"quantity\":999}' WHERE sequence = 2")
        .execute(state.pool())
        .await
        .unwrap();
    let verification = storage.verify_chain().await.unwrap();
    assert!(!verification.valid);
    assert_eq!(verification.first_broken_sequence, Some(2));
}
