#[cfg(test)]
mod tests {
    use crate::blockchain::models::SignatureInfo;
    use crate::models::{Direction, ScanHint, ScanMode, UNKNOWN_PARTY};
    use crate::scanner::watch_list::{scan_watched_addresses, WatchLimits};
    use crate::tests::support::{addr, failed, payment, sol, tx, FakeNode};
    use std::time::Duration;
    use tokio::time::Instant;

    fn limits(per_address: usize, global: usize) -> WatchLimits {
        WatchLimits {
            per_address,
            global,
            concurrency: 4,
        }
    }

    fn signatures(events: &[crate::models::TransferEvent]) -> Vec<&str> {
        events.iter().map(|e| e.signature.as_str()).collect()
    }

    #[tokio::test]
    async fn test_failing_address_does_not_abort_scan() {
        let down = addr(1);
        let healthy = addr(2);
        let node = FakeNode::new()
            .failing(&down)
            .with_history(&healthy, vec![payment("sig_ok", 10, &healthy, &addr(9), 500)]);
        let watch_list = vec![down.clone(), healthy.clone()];

        let report = scan_watched_addresses(&node, &watch_list, 100.0, WatchLimits::default(), None).await;

        assert_eq!(report.mode, ScanMode::WatchList);
        assert_eq!(report.hint, ScanHint::Found);
        assert_eq!(signatures(&report.events), vec!["sig_ok"]);
        assert_eq!(report.events[0].from, healthy);
        assert_eq!(report.failed_addresses, vec![down]);
    }

    #[tokio::test]
    async fn test_watched_address_replaces_inferred_side() {
        let watched = addr(5);
        let payer = addr(6);
        // the fee payer's leg qualifies first, but the watched wallet is the anchor
        let outgoing = tx(
            "sig_out",
            20,
            &[&payer, &watched],
            &[sol(1000), sol(3)],
            &[sol(400), sol(603)],
        );
        let incoming = tx(
            "sig_in",
            19,
            &[&watched, &payer],
            &[sol(3), sol(800)],
            &[sol(303), sol(500)],
        );
        let node = FakeNode::new().with_history(&watched, vec![outgoing, incoming]);

        let report = scan_watched_addresses(&node, &[watched.clone()], 100.0, WatchLimits::default(), None).await;

        assert_eq!(report.events.len(), 2);
        let send = &report.events[0];
        assert_eq!(send.direction, Direction::Send);
        assert_eq!(send.from, watched);
        assert_eq!(send.to, UNKNOWN_PARTY);
        let receive = &report.events[1];
        assert_eq!(receive.direction, Direction::Receive);
        assert_eq!(receive.to, watched);
        assert_eq!(receive.from, UNKNOWN_PARTY);
    }

    #[tokio::test]
    async fn test_results_grouped_by_address_newest_first() {
        let a = addr(1);
        let b = addr(2);
        let node = FakeNode::new()
            .with_history(&a, vec![
                payment("a_new", 30, &a, &addr(8), 200),
                payment("a_old", 10, &a, &addr(8), 200),
            ])
            .with_history(&b, vec![payment("b_new", 40, &b, &addr(8), 200)]);

        let report = scan_watched_addresses(&node, &[a, b], 100.0, WatchLimits::default(), None).await;

        // no re-sort by time: b_new is newer but b comes second in the list
        assert_eq!(signatures(&report.events), vec!["a_new", "a_old", "b_new"]);
    }

    #[tokio::test]
    async fn test_global_limit_truncates_in_watch_list_order() {
        let wallets = [addr(1), addr(2), addr(3)];
        let mut node = FakeNode::new();
        for (i, wallet) in wallets.iter().enumerate() {
            node = node.with_history(wallet, vec![
                payment(&format!("w{}_1", i), 50, wallet, &addr(9), 300),
                payment(&format!("w{}_2", i), 49, wallet, &addr(9), 300),
            ]);
        }

        let report = scan_watched_addresses(&node, &wallets, 100.0, limits(5, 4), None).await;

        assert_eq!(signatures(&report.events), vec!["w0_1", "w0_2", "w1_1", "w1_2"]);
        // the third wallet is never touched once the limit is reached
        assert!(!node.fetched().iter().any(|s| s.starts_with("w2")));
    }

    #[tokio::test]
    async fn test_per_address_limit_bounds_fetches() {
        let wallet = addr(4);
        let history = (0..8)
            .map(|i| payment(&format!("s{}", i), 100 - i, &wallet, &addr(9), 1))
            .collect();
        let node = FakeNode::new().with_history(&wallet, history);

        let report = scan_watched_addresses(&node, &[wallet], 100.0, limits(5, 20), None).await;

        assert!(report.is_empty());
        assert_eq!(report.hint, ScanHint::NoQualifyingTransfers);
        let mut fetched = node.fetched();
        fetched.sort();
        assert_eq!(fetched, vec!["s0", "s1", "s2", "s3", "s4"]);
    }

    #[tokio::test]
    async fn test_shared_signature_examined_once() {
        let a = addr(1);
        let b = addr(2);
        let shared = payment("shared", 60, &a, &b, 700);
        let node = FakeNode::new()
            .with_history(&a, vec![shared.clone()])
            .with_history(&b, vec![shared]);

        let report = scan_watched_addresses(&node, &[a.clone(), b], 100.0, WatchLimits::default(), None).await;

        assert_eq!(signatures(&report.events), vec!["shared"]);
        assert_eq!(report.events[0].from, a);
        assert_eq!(node.fetched(), vec!["shared"]);
    }

    #[tokio::test]
    async fn test_failed_signatures_skipped_without_fetch() {
        let wallet = addr(7);
        let node = FakeNode::new().with_history(&wallet, vec![
            failed(payment("bad", 12, &wallet, &addr(9), 5000)),
            payment("good", 11, &wallet, &addr(9), 150),
        ]);

        let report = scan_watched_addresses(&node, &[wallet], 100.0, WatchLimits::default(), None).await;

        assert_eq!(signatures(&report.events), vec!["good"]);
        assert_eq!(node.fetched(), vec!["good"]);
    }

    #[tokio::test]
    async fn test_missing_transaction_skipped_within_address() {
        let wallet = addr(7);
        let node = FakeNode::new()
            .with_signatures(&wallet, vec![SignatureInfo {
                signature: "pruned".to_string(),
                slot: 90,
                block_time: Some(1_700_000_090),
                err: None,
            }])
            .with_history(&addr(8), vec![payment("kept", 80, &wallet, &addr(9), 150)])
            .with_signatures(&wallet, vec![SignatureInfo {
                signature: "kept".to_string(),
                slot: 80,
                block_time: Some(1_700_000_080),
                err: None,
            }]);

        let report = scan_watched_addresses(&node, &[wallet], 100.0, WatchLimits::default(), None).await;

        assert_eq!(signatures(&report.events), vec!["kept"]);
        assert!(report.failed_addresses.is_empty());
    }

    #[tokio::test]
    async fn test_malformed_transactions_are_counted() {
        let wallet = addr(7);
        let mut broken = payment("broken", 13, &wallet, &addr(9), 900);
        broken.post_balances.pop();
        let node = FakeNode::new().with_history(&wallet, vec![
            broken,
            payment("fine", 12, &wallet, &addr(9), 150),
        ]);

        let report = scan_watched_addresses(&node, &[wallet], 100.0, WatchLimits::default(), None).await;

        assert_eq!(signatures(&report.events), vec!["fine"]);
        assert_eq!(report.malformed, 1);
    }

    #[tokio::test]
    async fn test_all_addresses_failing_reports_remote_unavailable() {
        let node = FakeNode::new().failing(&addr(1)).failing(&addr(2));

        let report = scan_watched_addresses(&node, &[addr(1), addr(2)], 1.0, WatchLimits::default(), None).await;

        assert!(report.is_empty());
        assert_eq!(report.hint, ScanHint::RemoteUnavailable);
        assert_eq!(report.failed_addresses.len(), 2);
    }

    #[tokio::test]
    async fn test_empty_watch_list() {
        let node = FakeNode::new();

        let report = scan_watched_addresses(&node, &[], 1.0, WatchLimits::default(), None).await;

        assert!(report.is_empty());
        assert_eq!(report.hint, ScanHint::NoQualifyingTransfers);
    }

    #[tokio::test(start_paused = true)]
    async fn test_concurrent_fetches_keep_newest_first_order() {
        let wallet = addr(3);
        let node = FakeNode::new()
            .with_history(&wallet, vec![
                payment("n1", 5, &wallet, &addr(9), 300),
                payment("n2", 4, &wallet, &addr(9), 300),
                payment("n3", 3, &wallet, &addr(9), 300),
            ])
            .with_tx_delay("n1", Duration::from_millis(300))
            .with_tx_delay("n2", Duration::from_millis(200))
            .with_tx_delay("n3", Duration::from_millis(100));

        let report = scan_watched_addresses(&node, &[wallet], 100.0, limits(5, 20), None).await;

        assert_eq!(signatures(&report.events), vec!["n1", "n2", "n3"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_deadline_returns_events_accumulated_so_far() {
        let fast = addr(1);
        let slow = addr(2);
        let node = FakeNode::new()
            .with_history(&fast, vec![payment("quick", 9, &fast, &addr(9), 300)])
            .with_history(&slow, vec![payment("stuck", 8, &slow, &addr(9), 300)])
            .with_tx_delay("stuck", Duration::from_secs(60));

        let deadline = Instant::now() + Duration::from_secs(5);
        let report = scan_watched_addresses(&node, &[fast, slow], 100.0, WatchLimits::default(), Some(deadline)).await;

        assert_eq!(signatures(&report.events), vec!["quick"]);
        assert_eq!(report.hint, ScanHint::Found);
    }

    #[tokio::test(start_paused = true)]
    async fn test_deadline_with_nothing_collected() {
        let slow = addr(2);
        let node = FakeNode::new()
            .with_history(&slow, vec![payment("stuck", 8, &slow, &addr(9), 300)])
            .with_tx_delay("stuck", Duration::from_secs(60));

        let deadline = Instant::now() + Duration::from_secs(5);
        let report = scan_watched_addresses(&node, &[slow], 100.0, WatchLimits::default(), Some(deadline)).await;

        assert!(report.is_empty());
        assert_eq!(report.hint, ScanHint::DeadlineExpired);
    }
}
