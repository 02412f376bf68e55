//! End-to-end tests for issuing and verifying trust chains.
//!
//! Run with: cargo test --package trustchain-tokens --test trust_chain

use chrono::Duration;
use trustchain_tokens::{
    Claims, ClientIdClaims, KeyPair, NumericDate, Purpose, ServerClaims, StandardClaims,
    TokenError, new_token_id,
};

/// Create a token for a fresh subject key, issued by the org issuer `org`.
fn org_issued(org: &KeyPair, subject: &KeyPair) -> ClientIdClaims {
    let mut token = ClientIdClaims::new("handler=login", Duration::hours(1), &subject.public_key());
    token.standard.set_org_issuer(&org.public_key());
    let data = token.standard.org_issuer_chain_data().unwrap();
    token
        .standard
        .set_chain_issuer_trust_signature(&org.sign(&data).to_bytes());
    token
}

/// Create a client token issued by `handler` and signed with `handler_key`.
fn chain_issued(handler: &ClientIdClaims, handler_key: &KeyPair) -> ClientIdClaims {
    let client_key = KeyPair::generate();
    let mut client =
        ClientIdClaims::new("user=alice", Duration::minutes(10), &client_key.public_key());
    client.standard.set_chain_issuer(handler).unwrap();
    let data = client
        .standard
        .chain_issuer_data(&handler.standard.trust_chain_signature)
        .unwrap();
    client
        .standard
        .set_chain_user_trust_signature(handler, &handler_key.sign(&data).to_bytes());
    client
}

fn flip_first_hex_char(value: &str) -> String {
    let replacement = if value.starts_with('0') { "1" } else { "0" };
    format!("{replacement}{}", &value[1..])
}

#[test]
fn test_org_issuer_round_trip() {
    let org = KeyPair::generate();
    let token = org_issued(&org, &KeyPair::generate());

    let signer = token.standard.is_signed_by_issuer(&org.public_key()).unwrap();
    assert_eq!(signer, Some(org.public_key()));
    assert!(token.standard.is_chained_issuer(true));
}

#[test]
fn test_tampered_org_signature_is_a_negative_result() {
    let org = KeyPair::generate();
    let mut token = org_issued(&org, &KeyPair::generate());
    token.standard.trust_chain_signature = flip_first_hex_char(&token.standard.trust_chain_signature);

    assert_eq!(
        token.standard.is_signed_by_issuer(&org.public_key()).unwrap(),
        None
    );
    assert!(!token.standard.is_chained_issuer(true));
    assert!(token.standard.is_chained_issuer(false));
}

#[test]
fn test_tampered_chain_signature_is_an_error() {
    let org = KeyPair::generate();
    let handler_key = KeyPair::generate();
    let handler = org_issued(&org, &handler_key);
    let mut client = chain_issued(&handler, &handler_key);

    let (parent, sig) = client.standard.trust_chain_signature.split_once('.').unwrap();
    client.standard.trust_chain_signature = format!("{parent}.{}", flip_first_hex_char(sig));

    assert!(matches!(
        client.standard.is_signed_by_issuer(&handler_key.public_key()),
        Err(TokenError::InvalidChainSignature)
    ));
}

#[test]
fn test_two_hop_chain() {
    let org = KeyPair::generate();
    let handler_key = KeyPair::generate();
    let handler = org_issued(&org, &handler_key);
    assert!(handler.standard.is_chained_issuer(true));

    let client = chain_issued(&handler, &handler_key);
    assert_eq!(client.standard.issuer_expires_at, handler.standard.expires_at);
    assert!(!client.standard.is_chained_issuer(false));

    // the anchor is not consulted for chain issued tokens; the creator key is resolved from iss
    for anchor in [handler_key.public_key(), org.public_key()] {
        let signer = client.standard.is_signed_by_issuer(&anchor).unwrap();
        assert_eq!(signer, Some(handler_key.public_key()));
    }
}

#[test]
fn test_client_signed_by_wrong_handler_key() {
    let org = KeyPair::generate();
    let handler_key = KeyPair::generate();
    let handler = org_issued(&org, &handler_key);

    let client = chain_issued(&handler, &KeyPair::generate());
    assert!(matches!(
        client.standard.is_signed_by_issuer(&org.public_key()),
        Err(TokenError::InvalidChainSignature)
    ));
}

#[test]
fn test_invalid_client_signature() {
    let org = KeyPair::generate();
    let handler_key = KeyPair::generate();
    let handler = org_issued(&org, &handler_key);

    let mut client = chain_issued(&handler, &handler_key);
    client
        .standard
        .set_chain_user_trust_signature(&handler, b"invalid sig");

    assert!(matches!(
        client.standard.is_signed_by_issuer(&org.public_key()),
        Err(TokenError::InvalidChainSignature)
    ));
}

#[test]
fn test_identifier_one_second_off_fails_despite_valid_signature() {
    let org = KeyPair::generate();
    let subject = KeyPair::generate();

    let mut token = StandardClaims::new(
        "server",
        Purpose::Server,
        Duration::hours(1),
        Some(&subject.public_key()),
    );
    token.id = new_token_id(token.issued_at.unwrap() + Duration::seconds(1));
    token.set_org_issuer(&org.public_key());
    let sig = org.sign(&token.org_issuer_chain_data().unwrap());
    token.set_chain_issuer_trust_signature(&sig.to_bytes());

    assert!(matches!(
        token.is_signed_by_issuer(&org.public_key()),
        Err(TokenError::IdentifierTimeMismatch)
    ));
}

#[test]
fn test_missing_public_key_reported_before_trust_chain_signature() {
    let token = StandardClaims {
        issuer: "I-00".into(),
        ..StandardClaims::new("x", Purpose::ClientId, Duration::hours(1), None)
    };
    assert!(token.trust_chain_signature.is_empty());

    assert!(matches!(
        token.is_signed_by_issuer(&KeyPair::generate().public_key()),
        Err(TokenError::MissingPublicKey)
    ));
}

#[test]
fn test_expire_time_is_earliest_set_value() {
    let now = NumericDate::now();
    let cases = [
        (None, None, NumericDate::ZERO),
        (Some(now), None, now),
        (None, Some(now), now),
        (Some(now + Duration::hours(1)), Some(now), now),
        (Some(now), Some(now + Duration::hours(1)), now),
    ];

    for (expires_at, issuer_expires_at, expected) in cases {
        let token = StandardClaims {
            expires_at,
            issuer_expires_at,
            ..Default::default()
        };
        assert_eq!(token.expire_time(), expected);
    }
}

#[test]
fn test_client_expires_with_its_issuer() {
    let org = KeyPair::generate();
    let handler_key = KeyPair::generate();
    let mut handler = org_issued(&org, &handler_key);
    handler.standard.expires_at = Some(NumericDate::now() + Duration::minutes(-5));

    let client = chain_issued(&handler, &handler_key);
    assert!(client.standard.expires_at.unwrap() > NumericDate::now());
    assert_eq!(Some(client.standard.expire_time()), handler.standard.expires_at);
    assert!(client.standard.is_expired());
}

#[test]
fn test_chain_survives_json() {
    let org = KeyPair::generate();
    let handler_key = KeyPair::generate();
    let handler = org_issued(&org, &handler_key);
    let client = chain_issued(&handler, &handler_key);

    let handler = ClientIdClaims::from_json(&handler.to_json().unwrap()).unwrap();
    let client = ClientIdClaims::from_json(&client.to_json().unwrap()).unwrap();

    assert!(handler.standard.is_chained_issuer(true));
    assert_eq!(
        client.standard.is_signed_by_issuer(&org.public_key()).unwrap(),
        Some(handler_key.public_key())
    );
}

#[test]
fn test_server_issued_by_chain_issuer() {
    let org = KeyPair::generate();
    let provisioner_key = KeyPair::generate();
    let provisioner = org_issued(&org, &provisioner_key);

    let server_key = KeyPair::generate();
    let mut server = ServerClaims::new(
        "web1.example.net",
        vec!["production".into()],
        Duration::days(30),
        &server_key.public_key(),
    );
    server.standard_mut().set_chain_issuer(&provisioner).unwrap();
    let data = server
        .standard()
        .chain_issuer_data(&provisioner.standard.trust_chain_signature)
        .unwrap();
    server
        .standard_mut()
        .set_chain_user_trust_signature(&provisioner, &provisioner_key.sign(&data).to_bytes());

    assert_eq!(
        server.standard.is_signed_by_issuer(&org.public_key()).unwrap(),
        Some(provisioner_key.public_key())
    );
}
