//! Tests for the pub/sub request handler

use super::*;
use std::time::Duration;

use serde_json::json;

use lotd_store::{Lot, LotStore};

fn engine_with(lots: Vec<&str>) -> Arc<SubscriptionEngine> {
    let lots = lots.into_iter().map(|id| Lot::new(id, 10, 0)).collect();
    let store = Arc::new(LotStore::new(lots, Duration::from_secs(300)));
    Arc::new(SubscriptionEngine::new(store, 100))
}

fn request(method: &str, args: Vec<Value>) -> RpcRequest {
    RpcRequest::new(1, method, args)
}

#[test]
fn test_subscribe_switches_to_event_mode() {
    let engine = engine_with(vec!["LOT-A"]);

    let handled = handle_request(&engine, &request("subscribe", vec![json!("LOT-A")]));
    let Handled::Subscribed(subscription) = handled else {
        panic!("expected subscription");
    };
    assert_eq!(subscription.lot_id(), "LOT-A");
    assert_eq!(engine.subscriber_count(), 1);
}

#[test]
fn test_subscribe_unknown_lot() {
    let engine = engine_with(vec!["LOT-A"]);

    let handled = handle_request(&engine, &request("subscribe", vec![json!("LOT-X")]));
    let Handled::Response(response) = handled else {
        panic!("expected response");
    };
    assert_eq!(response.error.as_deref(), Some("Unknown lot: LOT-X"));
    assert_eq!(engine.subscriber_count(), 0);
}

#[test]
fn test_subscribe_missing_argument() {
    let engine = engine_with(vec!["LOT-A"]);

    let Handled::Response(response) = handle_request(&engine, &request("subscribe", vec![]))
    else {
        panic!("expected response");
    };
    assert_eq!(response.error.as_deref(), Some("Missing lot_id argument"));
}

#[test]
fn test_unsubscribe_existing() {
    let engine = engine_with(vec!["LOT-A"]);
    let subscription = engine.subscribe("LOT-A").unwrap();

    let Handled::Response(response) = handle_request(
        &engine,
        &request("unsubscribe", vec![json!(subscription.id())]),
    ) else {
        panic!("expected response");
    };
    assert_eq!(response.result, json!(true));
    assert!(!response.is_error());
}

#[test]
fn test_unsubscribe_guessed_id_is_false_not_error() {
    let engine = engine_with(vec!["LOT-A"]);

    let Handled::Response(response) =
        handle_request(&engine, &request("unsubscribe", vec![json!(999)]))
    else {
        panic!("expected response");
    };
    assert_eq!(response.result, json!(false));
    assert!(!response.is_error());
}

#[test]
fn test_query_methods_rejected_on_pubsub_channel() {
    let engine = engine_with(vec!["LOT-A"]);

    let Handled::Response(response) = handle_request(&engine, &request("getLots", vec![])) else {
        panic!("expected response");
    };
    assert_eq!(response.error.as_deref(), Some("Unknown method: getLots"));
}
