//! Property tests for trigger/release hysteresis across the full gate cycle

use proptest::prelude::*;
use std::time::{Duration, Instant};

use perpsentry::gate::{GateAction, GateConfig, GateState, InstrumentState};
use perpsentry::models::instrument::Timeframe;
use perpsentry::models::signal::{SignalCandidate, SignalDirection, TriggerRule};
use perpsentry::signals::TrendClassifier;

use crate::test_utils::snapshot;

fn direct_config() -> GateConfig {
    GateConfig {
        confirmation_required: false,
        ..GateConfig::default()
    }
}

fn activated(direction: SignalDirection, now: Instant, config: &GateConfig) -> InstrumentState {
    let mut state = InstrumentState::new("BTC", now);
    let trigger = match direction {
        SignalDirection::Short => snapshot(Timeframe::M15, 95.0, 100.0, 45.0, 28.0),
        _ => snapshot(Timeframe::M15, 105.0, 100.0, 55.0, 28.0),
    };
    let candidate = SignalCandidate {
        instrument: "BTC".to_string(),
        direction,
        rule: TriggerRule::TrendMomentum,
        strength: 0.6,
    };
    assert_eq!(
        state.observe(&candidate, &trigger, now, config),
        GateAction::Activated(direction)
    );
    state
}

/// Long-side momentum mirrored onto the short side.
fn mirrored(direction: SignalDirection, momentum: f64) -> f64 {
    match direction {
        SignalDirection::Short => 100.0 - momentum,
        _ => momentum,
    }
}

/// Classify a trending snapshot on the direction's side of the averages and
/// feed it to the gate.
fn step(
    state: &mut InstrumentState,
    direction: SignalDirection,
    momentum: f64,
    now: Instant,
    config: &GateConfig,
) -> GateAction {
    let (fast, slow) = match direction {
        SignalDirection::Short => (95.0, 100.0),
        _ => (105.0, 100.0),
    };
    let trigger = snapshot(Timeframe::M15, fast, slow, momentum, 28.0);
    let (classified, strength) = TrendClassifier::default().evaluate_single(&trigger);
    let candidate = SignalCandidate {
        instrument: "BTC".to_string(),
        direction: classified,
        rule: if classified.is_none() {
            TriggerRule::NoTrigger
        } else {
            TriggerRule::TrendMomentum
        },
        strength,
    };
    state.expire(now, config);
    state.observe(&candidate, &trigger, now, config)
}

fn active_state(direction: SignalDirection) -> GateState {
    match direction {
        SignalDirection::Short => GateState::ActiveShort,
        _ => GateState::ActiveLong,
    }
}

fn any_direction() -> impl Strategy<Value = SignalDirection> {
    prop_oneof![Just(SignalDirection::Long), Just(SignalDirection::Short)]
}

proptest! {
    #[test]
    fn test_long_releases_only_below_threshold(momentum in 0.0f64..100.0) {
        let now = Instant::now();
        let config = direct_config();
        let mut state = activated(SignalDirection::Long, now, &config);

        let trigger = snapshot(Timeframe::M15, 105.0, 100.0, momentum, 25.0);
        state.observe(&SignalCandidate::none("BTC"), &trigger, now, &config);

        if momentum < config.long_release_below {
            prop_assert_eq!(state.state, GateState::Cooldown);
        } else {
            prop_assert_eq!(state.state, GateState::ActiveLong);
        }
    }

    #[test]
    fn test_short_releases_only_above_threshold(momentum in 0.0f64..100.0) {
        let now = Instant::now();
        let config = direct_config();
        let mut state = activated(SignalDirection::Short, now, &config);

        let trigger = snapshot(Timeframe::M15, 95.0, 100.0, momentum, 25.0);
        state.observe(&SignalCandidate::none("BTC"), &trigger, now, &config);

        if momentum > config.short_release_above {
            prop_assert_eq!(state.state, GateState::Cooldown);
        } else {
            prop_assert_eq!(state.state, GateState::ActiveShort);
        }
    }

    #[test]
    fn test_repeated_candidates_activate_once(repeats in 1usize..20) {
        let now = Instant::now();
        let config = direct_config();
        let mut state = InstrumentState::new("BTC", now);
        let trigger = snapshot(Timeframe::M15, 105.0, 100.0, 58.0, 28.0);
        let candidate = SignalCandidate {
            instrument: "BTC".to_string(),
            direction: SignalDirection::Long,
            rule: TriggerRule::TrendMomentum,
            strength: 0.6,
        };

        let activations = (0..repeats)
            .map(|_| state.observe(&candidate, &trigger, now, &config))
            .filter(|action| matches!(action, GateAction::Activated(_)))
            .count();
        prop_assert_eq!(activations, 1);
    }
}

proptest! {
    #[test]
    fn test_gap_neither_triggers_nor_releases(
        direction in any_direction(),
        depth in 0.0f64..1.0,
    ) {
        let now = Instant::now();
        let config = direct_config();
        // long: [49, 50), short: (50, 51]
        let momentum = mirrored(direction, 49.0 + depth);

        let mut idle = InstrumentState::new("BTC", now);
        prop_assert_eq!(step(&mut idle, direction, momentum, now, &config), GateAction::Hold);
        prop_assert_eq!(idle.state, GateState::Idle);

        let mut active = activated(direction, now, &config);
        prop_assert_eq!(step(&mut active, direction, momentum, now, &config), GateAction::Hold);
        prop_assert_eq!(active.state, active_state(direction));
    }

    #[test]
    fn test_full_cycle(
        direction in any_direction(),
        entry in 50.0f64..70.0,
        holds in prop::collection::vec(49.0f64..70.0, 0..12),
        exit in 0.0f64..49.0,
    ) {
        let config = direct_config();
        let start = Instant::now();
        let mut now = start;
        let mut state = InstrumentState::new("BTC", now);

        prop_assert_eq!(
            step(&mut state, direction, mirrored(direction, entry), now, &config),
            GateAction::Activated(direction)
        );

        for hold in holds {
            now += Duration::from_secs(15 * 60);
            let action = step(&mut state, direction, mirrored(direction, hold), now, &config);
            prop_assert!(
                !matches!(action, GateAction::Activated(_) | GateAction::Released(_)),
                "momentum {} changed the active state: {:?}", hold, action
            );
            prop_assert_eq!(state.state, active_state(direction));
        }

        now += Duration::from_secs(15 * 60);
        prop_assert_eq!(
            step(&mut state, direction, mirrored(direction, exit), now, &config),
            GateAction::Released(direction)
        );
        prop_assert_eq!(state.state, GateState::Cooldown);
        let released_at = now;

        // a fresh trigger during the dwell is suppressed
        now += Duration::from_secs(60);
        let action = step(&mut state, direction, mirrored(direction, entry), now, &config);
        prop_assert!(matches!(action, GateAction::Suppressed(_)));
        prop_assert_eq!(state.state, GateState::Cooldown);

        now = released_at + config.cooldown();
        state.expire(now, &config);
        prop_assert_eq!(state.state, GateState::Idle);

        prop_assert_eq!(
            step(&mut state, direction, mirrored(direction, entry), now, &config),
            GateAction::Activated(direction)
        );
    }
}
