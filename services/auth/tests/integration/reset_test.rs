use chrono::{Duration, Utc};

use jobspace_auth::domain::types::{DeliveryMethod, RESET_CODE_LEN};
use jobspace_auth::error::AuthServiceError;
use jobspace_auth::infra::password;
use jobspace_auth::usecase::reset::{
    CleanupExpiredUseCase, ConfirmPasswordInput, ConfirmPasswordUseCase, RequestResetInput,
    RequestResetUseCase, VerifyResetCodeInput, VerifyResetCodeUseCase,
};
use jobspace_domain::principal::PrincipalKind;

use crate::helpers::{
    MockDelivery, MockPrincipalRepo, MockResetCodeRepo, seeded_email_code, test_company,
    test_student,
};

fn request_usecase(
    principals: &MockPrincipalRepo,
    reset_codes: &MockResetCodeRepo,
    delivery: &MockDelivery,
) -> RequestResetUseCase<MockPrincipalRepo, MockResetCodeRepo, MockDelivery> {
    RequestResetUseCase {
        principals: principals.clone(),
        reset_codes: reset_codes.clone(),
        delivery: delivery.clone(),
    }
}

fn verify_usecase(
    principals: &MockPrincipalRepo,
    reset_codes: &MockResetCodeRepo,
) -> VerifyResetCodeUseCase<MockPrincipalRepo, MockResetCodeRepo> {
    VerifyResetCodeUseCase {
        principals: principals.clone(),
        reset_codes: reset_codes.clone(),
    }
}

fn confirm_usecase(
    principals: &MockPrincipalRepo,
    reset_codes: &MockResetCodeRepo,
) -> ConfirmPasswordUseCase<MockPrincipalRepo, MockResetCodeRepo> {
    ConfirmPasswordUseCase {
        principals: principals.clone(),
        reset_codes: reset_codes.clone(),
    }
}

fn email_request(email: &str) -> RequestResetInput {
    RequestResetInput {
        method: DeliveryMethod::Email,
        channel_value: email.to_owned(),
    }
}

fn email_verify(code: &str, email: &str) -> VerifyResetCodeInput {
    VerifyResetCodeInput {
        code: code.to_owned(),
        method: DeliveryMethod::Email,
        channel_value: email.to_owned(),
    }
}

// ── request_reset ────────────────────────────────────────────────────────────

#[tokio::test]
async fn should_generate_and_deliver_a_six_digit_code() {
    let principals = MockPrincipalRepo::new(vec![test_student(
        7,
        "ada@example.com",
        "11987654321",
        "Secr3t!",
    )]);
    let reset_codes = MockResetCodeRepo::new(&principals);
    let delivery = MockDelivery::working();

    let out = request_usecase(&principals, &reset_codes, &delivery)
        .execute(email_request("ada@example.com"))
        .await
        .unwrap();

    assert!(out.delivered);
    assert!(out.expires_at > Utc::now() + Duration::seconds(840));

    let sent = delivery.sent.lock().unwrap();
    assert_eq!(sent.len(), 1);
    let (to, code) = &sent[0];
    assert_eq!(to, "ada@example.com");
    assert_eq!(code.len(), RESET_CODE_LEN);
    assert!(code.bytes().all(|b| b.is_ascii_digit()));

    // The delivered code is the stored code.
    let codes = reset_codes.codes_handle();
    let codes = codes.lock().unwrap();
    assert_eq!(codes.len(), 1);
    assert_eq!(&codes[0].code, code);
    assert!(!codes[0].is_used);
}

#[tokio::test]
async fn should_fail_not_found_for_unknown_channel() {
    let principals = MockPrincipalRepo::empty();
    let reset_codes = MockResetCodeRepo::new(&principals);
    let delivery = MockDelivery::working();

    let err = request_usecase(&principals, &reset_codes, &delivery)
        .execute(email_request("nobody@example.com"))
        .await
        .unwrap_err();
    assert!(matches!(err, AuthServiceError::NotFound));
    assert!(delivery.sent.lock().unwrap().is_empty());
}

#[tokio::test]
async fn delivery_failure_keeps_the_code_valid() {
    let principals = MockPrincipalRepo::new(vec![test_student(
        7,
        "ada@example.com",
        "11987654321",
        "Secr3t!",
    )]);
    let reset_codes = MockResetCodeRepo::new(&principals);
    let delivery = MockDelivery::broken();

    let out = request_usecase(&principals, &reset_codes, &delivery)
        .execute(email_request("ada@example.com"))
        .await
        .unwrap();
    assert!(!out.delivered);

    // The operator-fallback code still verifies.
    let code = reset_codes.codes_handle().lock().unwrap()[0].code.clone();
    let verified = verify_usecase(&principals, &reset_codes)
        .execute(email_verify(&code, "ada@example.com"))
        .await
        .unwrap();
    assert!(!verified.token.is_empty());
}

#[tokio::test]
async fn second_request_invalidates_the_first_code() {
    let principals = MockPrincipalRepo::new(vec![test_student(
        7,
        "ada@example.com",
        "11987654321",
        "Secr3t!",
    )]);
    let reset_codes = MockResetCodeRepo::new(&principals);
    let delivery = MockDelivery::working();
    let usecase = request_usecase(&principals, &reset_codes, &delivery);

    // Two requests back to back — well within one expiry window.
    usecase.execute(email_request("ada@example.com")).await.unwrap();
    usecase.execute(email_request("ada@example.com")).await.unwrap();

    let (first, second) = {
        let sent = delivery.sent.lock().unwrap();
        (sent[0].1.clone(), sent[1].1.clone())
    };

    let verify = verify_usecase(&principals, &reset_codes);
    if first != second {
        let err = verify
            .execute(email_verify(&first, "ada@example.com"))
            .await
            .unwrap_err();
        assert!(matches!(err, AuthServiceError::InvalidOrExpired));
    }
    verify
        .execute(email_verify(&second, "ada@example.com"))
        .await
        .unwrap();
}

#[tokio::test]
async fn should_resolve_sms_requests_by_phone() {
    let principals = MockPrincipalRepo::new(vec![test_company(
        31,
        "jobs@acme.example",
        "11912340000",
        "hunter2x",
    )]);
    let reset_codes = MockResetCodeRepo::new(&principals);
    let delivery = MockDelivery::working();

    let out = request_usecase(&principals, &reset_codes, &delivery)
        .execute(RequestResetInput {
            method: DeliveryMethod::Sms,
            channel_value: "11912340000".to_owned(),
        })
        .await
        .unwrap();
    assert!(out.delivered);

    let codes = reset_codes.codes_handle();
    let codes = codes.lock().unwrap();
    assert_eq!(codes[0].principal_kind, PrincipalKind::Company);
    assert_eq!(codes[0].phone.as_deref(), Some("11912340000"));
    assert_eq!(codes[0].email, None);
}

#[tokio::test]
async fn email_shared_across_tables_resolves_to_the_student() {
    // Unresolved cross-type collision: first match wins, students first.
    let principals = MockPrincipalRepo::new(vec![
        test_student(7, "shared@example.com", "11987654321", "Secr3t!"),
        test_company(31, "shared@example.com", "11912340000", "hunter2x"),
    ]);
    let reset_codes = MockResetCodeRepo::new(&principals);
    let delivery = MockDelivery::working();

    request_usecase(&principals, &reset_codes, &delivery)
        .execute(email_request("shared@example.com"))
        .await
        .unwrap();

    let codes = reset_codes.codes_handle();
    assert_eq!(
        codes.lock().unwrap()[0].principal_kind,
        PrincipalKind::Student
    );
}

// ── verify_code ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn wrong_code_fails_invalid_or_expired() {
    let principals = MockPrincipalRepo::new(vec![test_student(
        7,
        "a@b.com",
        "11987654321",
        "Secr3t!",
    )]);
    let reset_codes = MockResetCodeRepo::new(&principals);
    reset_codes.seed(seeded_email_code(1, "482913", "a@b.com", PrincipalKind::Student));

    let err = verify_usecase(&principals, &reset_codes)
        .execute(email_verify("000000", "a@b.com"))
        .await
        .unwrap_err();
    assert!(matches!(err, AuthServiceError::InvalidOrExpired));
}

#[tokio::test]
async fn expired_code_fails_invalid_or_expired() {
    let principals = MockPrincipalRepo::new(vec![test_student(
        7,
        "a@b.com",
        "11987654321",
        "Secr3t!",
    )]);
    let reset_codes = MockResetCodeRepo::new(&principals);
    let mut code = seeded_email_code(1, "482913", "a@b.com", PrincipalKind::Student);
    code.expires_at = Utc::now() - Duration::seconds(1);
    reset_codes.seed(code);

    let err = verify_usecase(&principals, &reset_codes)
        .execute(email_verify("482913", "a@b.com"))
        .await
        .unwrap_err();
    assert!(matches!(err, AuthServiceError::InvalidOrExpired));
}

#[tokio::test]
async fn code_is_single_use() {
    let principals = MockPrincipalRepo::new(vec![test_student(
        7,
        "a@b.com",
        "11987654321",
        "Secr3t!",
    )]);
    let reset_codes = MockResetCodeRepo::new(&principals);
    reset_codes.seed(seeded_email_code(1, "482913", "a@b.com", PrincipalKind::Student));

    let verify = verify_usecase(&principals, &reset_codes);
    verify.execute(email_verify("482913", "a@b.com")).await.unwrap();

    let err = verify
        .execute(email_verify("482913", "a@b.com"))
        .await
        .unwrap_err();
    assert!(matches!(err, AuthServiceError::InvalidOrExpired));
}

#[tokio::test]
async fn concurrent_verification_has_at_most_one_winner() {
    let principals = MockPrincipalRepo::new(vec![test_student(
        7,
        "a@b.com",
        "11987654321",
        "Secr3t!",
    )]);
    let reset_codes = MockResetCodeRepo::new(&principals);
    reset_codes.seed(seeded_email_code(1, "482913", "a@b.com", PrincipalKind::Student));

    let a = tokio::spawn({
        let usecase = verify_usecase(&principals, &reset_codes);
        async move { usecase.execute(email_verify("482913", "a@b.com")).await }
    });
    let b = tokio::spawn({
        let usecase = verify_usecase(&principals, &reset_codes);
        async move { usecase.execute(email_verify("482913", "a@b.com")).await }
    });

    let (a, b) = (a.await.unwrap(), b.await.unwrap());
    let winners = [&a, &b].iter().filter(|r| r.is_ok()).count();
    assert_eq!(winners, 1, "exactly one concurrent verify may succeed");
    for loser in [a, b].into_iter().filter(|r| r.is_err()) {
        assert!(matches!(
            loser.unwrap_err(),
            AuthServiceError::InvalidOrExpired
        ));
    }
}

// ── confirm_new_password ─────────────────────────────────────────────────────

#[tokio::test]
async fn full_round_trip_changes_the_password_hash() {
    let principals = MockPrincipalRepo::new(vec![test_student(
        7,
        "a@b.com",
        "11987654321",
        "old-password",
    )]);
    let old_hash = principals.handle().lock().unwrap()[0].password_hash.clone();
    let reset_codes = MockResetCodeRepo::new(&principals);
    let delivery = MockDelivery::working();

    request_usecase(&principals, &reset_codes, &delivery)
        .execute(email_request("a@b.com"))
        .await
        .unwrap();
    let code = delivery.sent.lock().unwrap()[0].1.clone();

    let verified = verify_usecase(&principals, &reset_codes)
        .execute(email_verify(&code, "a@b.com"))
        .await
        .unwrap();
    assert_eq!(verified.principal_kind, PrincipalKind::Student);

    confirm_usecase(&principals, &reset_codes)
        .execute(ConfirmPasswordInput {
            token: verified.token.clone(),
            new_password: "Secr3t!".to_owned(),
        })
        .await
        .unwrap();

    let new_hash = principals.handle().lock().unwrap()[0].password_hash.clone();
    assert_ne!(old_hash, new_hash);
    assert!(password::verify_password("Secr3t!", &new_hash).unwrap());
    assert!(!password::verify_password("old-password", &new_hash).unwrap());

    // Consumed: the record is gone.
    assert!(reset_codes.codes_handle().lock().unwrap().is_empty());
}

#[tokio::test]
async fn verification_token_is_single_use() {
    let principals = MockPrincipalRepo::new(vec![test_student(
        7,
        "a@b.com",
        "11987654321",
        "old-password",
    )]);
    let reset_codes = MockResetCodeRepo::new(&principals);
    reset_codes.seed(seeded_email_code(1, "482913", "a@b.com", PrincipalKind::Student));

    let verified = verify_usecase(&principals, &reset_codes)
        .execute(email_verify("482913", "a@b.com"))
        .await
        .unwrap();

    let confirm = confirm_usecase(&principals, &reset_codes);
    confirm
        .execute(ConfirmPasswordInput {
            token: verified.token.clone(),
            new_password: "Secr3t!".to_owned(),
        })
        .await
        .unwrap();

    let err = confirm
        .execute(ConfirmPasswordInput {
            token: verified.token,
            new_password: "An0ther!".to_owned(),
        })
        .await
        .unwrap_err();
    assert!(matches!(err, AuthServiceError::InvalidToken));
}

#[tokio::test]
async fn unknown_token_fails_invalid_token() {
    let principals = MockPrincipalRepo::empty();
    let reset_codes = MockResetCodeRepo::new(&principals);

    let err = confirm_usecase(&principals, &reset_codes)
        .execute(ConfirmPasswordInput {
            token: "never-issued".to_owned(),
            new_password: "Secr3t!".to_owned(),
        })
        .await
        .unwrap_err();
    assert!(matches!(err, AuthServiceError::InvalidToken));
}

#[tokio::test]
async fn weak_password_is_rejected_and_token_survives() {
    let principals = MockPrincipalRepo::new(vec![test_student(
        7,
        "a@b.com",
        "11987654321",
        "old-password",
    )]);
    let reset_codes = MockResetCodeRepo::new(&principals);
    reset_codes.seed(seeded_email_code(1, "482913", "a@b.com", PrincipalKind::Student));

    let verified = verify_usecase(&principals, &reset_codes)
        .execute(email_verify("482913", "a@b.com"))
        .await
        .unwrap();

    let confirm = confirm_usecase(&principals, &reset_codes);
    let err = confirm
        .execute(ConfirmPasswordInput {
            token: verified.token.clone(),
            new_password: "short".to_owned(),
        })
        .await
        .unwrap_err();
    assert!(matches!(err, AuthServiceError::WeakPassword));

    // The failed attempt consumed nothing.
    confirm
        .execute(ConfirmPasswordInput {
            token: verified.token,
            new_password: "Secr3t!".to_owned(),
        })
        .await
        .unwrap();
}

#[tokio::test]
async fn confirm_fails_not_found_when_principal_deactivated_after_verify() {
    let principals = MockPrincipalRepo::new(vec![test_student(
        7,
        "a@b.com",
        "11987654321",
        "old-password",
    )]);
    let reset_codes = MockResetCodeRepo::new(&principals);
    reset_codes.seed(seeded_email_code(1, "482913", "a@b.com", PrincipalKind::Student));

    let verified = verify_usecase(&principals, &reset_codes)
        .execute(email_verify("482913", "a@b.com"))
        .await
        .unwrap();

    principals.handle().lock().unwrap()[0].is_active = false;

    let err = confirm_usecase(&principals, &reset_codes)
        .execute(ConfirmPasswordInput {
            token: verified.token,
            new_password: "Secr3t!".to_owned(),
        })
        .await
        .unwrap_err();
    assert!(matches!(err, AuthServiceError::NotFound));
}

// ── cleanup_expired ──────────────────────────────────────────────────────────

#[tokio::test]
async fn cleanup_deletes_expired_rows_used_or_not() {
    let principals = MockPrincipalRepo::empty();
    let reset_codes = MockResetCodeRepo::new(&principals);

    let mut expired_unused = seeded_email_code(1, "111111", "a@b.com", PrincipalKind::Student);
    expired_unused.expires_at = Utc::now() - Duration::seconds(10);
    let mut expired_used = seeded_email_code(2, "222222", "a@b.com", PrincipalKind::Student);
    expired_used.expires_at = Utc::now() - Duration::seconds(10);
    expired_used.is_used = true;
    let live = seeded_email_code(3, "333333", "a@b.com", PrincipalKind::Student);

    reset_codes.seed(expired_unused);
    reset_codes.seed(expired_used);
    reset_codes.seed(live);

    let deleted = CleanupExpiredUseCase {
        reset_codes: reset_codes.clone(),
    }
    .execute()
    .await
    .unwrap();

    assert_eq!(deleted, 2);
    let remaining = reset_codes.codes_handle();
    let remaining = remaining.lock().unwrap();
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].code, "333333");
}
