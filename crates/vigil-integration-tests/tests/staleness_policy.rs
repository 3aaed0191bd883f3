//! Integration test: staleness thresholds and the expired-state policy.
//!
//! Exercises staleness handling on a cached round feed:
//! 1. Reject a normal interval longer than the liveness timeout
//! 2. Classify ages on both inclusive boundaries
//! 3. Serve or reject an Expired value depending on the policy
//! 4. Build a feed from a TOML configuration
//!
//! This test uses vigil-oracle (staleness, facade, config, stub) without any I/O.

use vigil_oracle::config::FeedConfig;
use vigil_oracle::staleness::classify;
use vigil_oracle::stub::ScriptedRoundSource;
use vigil_oracle::{
    ErrorKind, ExpiredPolicy, FeedSettings, Freshness, OracleError, PriceFeed, RoundFeedAdapter,
    StalenessGuard,
};
use vigil_types::{Address, RoundData, Timestamp, U256};

const BASE_TIME: Timestamp = 1_700_000_000;
const NORMAL_INTERVAL: u64 = 900;
const LIVENESS_TIMEOUT: u64 = 2400;

fn adapter_at(updated_at: Timestamp) -> RoundFeedAdapter<ScriptedRoundSource> {
    let source = ScriptedRoundSource::new(Address::from_low_byte(0xc3), 8);
    source.push_round(RoundData::completed(1, 200_000_000, updated_at));
    RoundFeedAdapter::new(source).expect("adapter")
}

#[test]
fn inverted_intervals_are_rejected() {
    // The legacy deployment passed (2400, 900) in this order.
    let expected = OracleError::InvalidIntervals {
        normal_interval: 2400,
        liveness_timeout: 900,
    };

    assert_eq!(StalenessGuard::new(2400, 900).unwrap_err(), expected);
    assert_eq!(
        PriceFeed::new(adapter_at(BASE_TIME), FeedSettings::new(2400, 900), BASE_TIME)
            .unwrap_err(),
        expected
    );
    assert_eq!(expected.kind(), ErrorKind::Configuration);

    // Equal thresholds leave no StaleUsable band but are valid.
    let guard = StalenessGuard::new(900, 900).expect("equal thresholds");
    assert_eq!(guard.classify(BASE_TIME, BASE_TIME + 900), Freshness::Fresh);
    assert_eq!(guard.classify(BASE_TIME, BASE_TIME + 901), Freshness::Expired);
}

#[test]
fn boundaries_are_inclusive() {
    let feed = PriceFeed::new(
        adapter_at(BASE_TIME),
        FeedSettings::new(NORMAL_INTERVAL, LIVENESS_TIMEOUT),
        BASE_TIME,
    )
    .expect("feed");

    let cases = [
        (0, Freshness::Fresh),
        (NORMAL_INTERVAL, Freshness::Fresh),
        (NORMAL_INTERVAL + 1, Freshness::StaleUsable),
        (LIVENESS_TIMEOUT, Freshness::StaleUsable),
        (LIVENESS_TIMEOUT + 1, Freshness::Expired),
    ];
    for (age, expected) in cases {
        let now = BASE_TIME + age;
        assert_eq!(feed.freshness(now), expected, "age {age}");
        assert_eq!(
            classify(BASE_TIME, now, NORMAL_INTERVAL, LIVENESS_TIMEOUT),
            expected
        );
        assert_eq!(feed.is_timed_out(now), expected == Freshness::Expired);
    }

    // A clock behind the observation counts as age zero.
    assert_eq!(feed.freshness(BASE_TIME - 10), Freshness::Fresh);
}

#[test]
fn expired_policy_controls_serving() {
    let expired_at = BASE_TIME + LIVENESS_TIMEOUT + 1;

    // =========================================================
    // Step 1: Default policy serves the last good value
    // =========================================================
    let lenient = PriceFeed::new(
        adapter_at(BASE_TIME),
        FeedSettings::new(NORMAL_INTERVAL, LIVENESS_TIMEOUT),
        BASE_TIME,
    )
    .expect("feed");
    assert_eq!(lenient.expired_policy(), ExpiredPolicy::ServeLastGood);
    assert_eq!(lenient.price(expired_at), Ok(U256::from(200_000_000u64)));

    // =========================================================
    // Step 2: Reject policy refuses once Expired
    // =========================================================
    let strict = PriceFeed::new(
        adapter_at(BASE_TIME),
        FeedSettings::new(NORMAL_INTERVAL, LIVENESS_TIMEOUT)
            .with_expired_policy(ExpiredPolicy::Reject),
        BASE_TIME,
    )
    .expect("feed");
    assert_eq!(
        strict.price(BASE_TIME + LIVENESS_TIMEOUT),
        Ok(U256::from(200_000_000u64))
    );
    let err = strict.price(expired_at).unwrap_err();
    assert_eq!(
        err,
        OracleError::Expired {
            age: LIVENESS_TIMEOUT + 1,
            liveness_timeout: LIVENESS_TIMEOUT
        }
    );
    assert_eq!(err.kind(), ErrorKind::Serving);

    // last_price never checks staleness.
    assert_eq!(strict.last_price(), Ok(U256::from(200_000_000u64)));
}

#[test]
fn feed_built_from_toml() {
    let config = FeedConfig::from_toml_str(
        r#"
        [staleness]
        normal_interval_secs = 60
        liveness_timeout_secs = 120
        expired_policy = "reject"

        [output]
        decimals = 18
        "#,
    )
    .expect("config");

    let feed = PriceFeed::new(adapter_at(BASE_TIME), config.settings(), BASE_TIME).expect("feed");
    assert_eq!(feed.normal_interval(), 60);
    assert_eq!(feed.liveness_timeout(), 120);
    assert_eq!(feed.decimals(), 18);
    assert_eq!(feed.source_decimals(), 8);
    assert_eq!(
        feed.price(BASE_TIME + 61),
        Ok(U256::from(2_000_000_000_000_000_000u64))
    );
    assert!(matches!(
        feed.price(BASE_TIME + 121),
        Err(OracleError::Expired { .. })
    ));

    assert!(matches!(
        FeedConfig::from_toml_str("[staleness]\nnormal_interval_secs = 2400\nliveness_timeout_secs = 900"),
        Err(OracleError::InvalidIntervals { .. })
    ));
}
