//! Property-based tests for issuance and verification.
//!
//! These tests check properties that must hold for any valid request:
//! - An issued license verifies and decodes back to its request
//! - Any change to the signed token is detected
//! - Expiry is the only thing that changes with time

mod common;

use chrono::TimeDelta;
use common::{issuer, t0, to_value, verifier_with_empty_registry};
use proptest::prelude::*;
use serde_json::json;
use tallarin_license::{IssueRequest, Verdict};

// =============================================================================
// HELPER STRATEGIES
// =============================================================================

fn field_strategy() -> impl Strategy<Value = String> {
    prop::string::string_regex("[A-Za-z0-9 ._äöü-]{1,24}").unwrap()
}

fn extensions_strategy() -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec(
        prop::string::string_regex("[a-z_]{1,12}").unwrap(),
        0..5,
    )
}

fn request_strategy() -> impl Strategy<Value = IssueRequest> {
    (
        field_strategy(),
        field_strategy(),
        1u64..1_000_000,
        1u32..3650,
        extensions_strategy(),
    )
        .prop_map(|(client, registrant, logins, days, extensions)| {
            IssueRequest::new(client, registrant)
                .with_login_count(logins)
                .with_valid_days(days)
                .with_extensions(extensions)
        })
}

// RSA signing dominates; keep case counts small.
fn config() -> ProptestConfig {
    ProptestConfig::with_cases(24)
}

// =============================================================================
// ISSUANCE PROPERTIES
// =============================================================================

proptest! {
    #![proptest_config(config())]

    /// Every issued license verifies and its token decodes to the request
    #[test]
    fn issued_license_verifies_and_decodes(request in request_strategy()) {
        let (verifier, _) = verifier_with_empty_registry();
        let file = issuer().issue_at(&request, t0()).unwrap();

        prop_assert_eq!(verifier.verify_at(&file, t0()).unwrap(), Verdict::Valid);

        let decoded = file.license_key().decode().unwrap();
        prop_assert_eq!(&decoded.client_id, &request.client_id);
        prop_assert_eq!(&decoded.registered_for, &request.registered_for);
        prop_assert_eq!(decoded.login_count_limit, request.effective_login_count());
        prop_assert_eq!(decoded.days_remaining, u64::from(request.effective_valid_days()));
        prop_assert_eq!(&decoded.extensions, &request.extensions);
    }

    /// Valid up to and including the expiry instant, expired afterwards
    #[test]
    fn expiry_boundary(request in request_strategy(), late_secs in 1i64..1_000_000) {
        let (verifier, _) = verifier_with_empty_registry();
        let file = issuer().issue_at(&request, t0()).unwrap();
        let until = file.license().valid_until;

        prop_assert_eq!(verifier.verify_at(&file, until).unwrap(), Verdict::Valid);
        prop_assert_eq!(
            verifier.verify_at(&file, until + TimeDelta::seconds(late_secs)).unwrap(),
            Verdict::Expired
        );
    }

    /// Replacing any character of the signed token invalidates the signature
    #[test]
    fn tampered_token_is_rejected(
        request in request_strategy(),
        pos in any::<prop::sample::Index>(),
        replacement in prop::char::range('A', 'z'),
    ) {
        let (verifier, _) = verifier_with_empty_registry();
        let file = issuer().issue_at(&request, t0()).unwrap();

        let mut token: Vec<char> = file.license_key().as_str().chars().collect();
        let i = pos.index(token.len());
        prop_assume!(token[i] != replacement);
        token[i] = replacement;

        let mut value = to_value(&file);
        value["licenseKey"] = json!(token.into_iter().collect::<String>());
        prop_assert_eq!(
            verifier.verify_value_at(&value, t0()).unwrap(),
            Verdict::SignatureInvalid
        );
    }
}
