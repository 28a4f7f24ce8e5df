use super::common::*;
use std::time::Duration;

use crate::claims::compensation::{BaseAmountQuote, ClaimScenario, CompensationEngine, IssueKind};
use crate::claims::{EstimateCoordinator, EstimateRequest, EstimateResolution};

fn overbooked_request(from: &str, to: &str) -> EstimateRequest {
    EstimateRequest {
        answers: answers(&[("what_happened", "overbooked")]),
        flight: flight(from, to, Some(1200.0)),
        origin: Default::default(),
        destination: Default::default(),
        live_lookup: true,
    }
}

#[test]
fn stale_ticket_cannot_overwrite_newer_result() {
    let coordinator = EstimateCoordinator::new();
    let engine = CompensationEngine::default();
    let scenario = ClaimScenario {
        issue: Some(IssueKind::Overbooked),
        ..ClaimScenario::default()
    };

    let first = coordinator.begin();
    let second = coordinator.begin();
    assert!(!coordinator.is_current(first));
    assert!(coordinator.is_current(second));

    let newer = engine.evaluate(
        &scenario,
        &flight("FRA", "JFK", None),
        BaseAmountQuote::Upstream(600),
        today(),
    );
    let older = engine.evaluate(
        &scenario,
        &flight("FRA", "MAD", None),
        BaseAmountQuote::Upstream(250),
        today(),
    );

    assert!(matches!(
        coordinator.resolve(second, newer),
        EstimateResolution::Applied(_)
    ));
    assert_eq!(
        coordinator.resolve(first, older),
        EstimateResolution::Superseded {
            generation: first.generation(),
            current: second.generation(),
        }
    );

    let latest = coordinator.latest().expect("an estimate was applied");
    assert_eq!(latest.generation, second.generation());
    assert_eq!(latest.verdict.amount, 600);
}

#[tokio::test]
async fn slow_lookup_for_previous_input_is_discarded() {
    let gateway = StubGateway::default()
        .with_compensation(Ok(400))
        .with_slow_origin("MUC", Duration::from_millis(50));
    let (service, _) = build_service(gateway);
    let coordinator = EstimateCoordinator::new();

    let (stale, fresh) = tokio::join!(
        service.estimate_tracked(&coordinator, overbooked_request("MUC", "LIS"), today()),
        async {
            tokio::time::sleep(Duration::from_millis(5)).await;
            service
                .estimate_tracked(&coordinator, overbooked_request("FRA", "LIS"), today())
                .await
        }
    );

    assert!(matches!(
        stale.expect("valid flight"),
        EstimateResolution::Superseded { generation: 1, current: 2 }
    ));
    assert!(matches!(
        fresh.expect("valid flight"),
        EstimateResolution::Applied(_)
    ));
    let latest = coordinator.latest().expect("fresh estimate applied");
    assert_eq!(latest.generation, 2);
}
