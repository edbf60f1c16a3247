//! Tests for the domain user model.

use super::*;
use rstest::{fixture, rstest};

const VALID_ID: &str = "3fa85f64-5717-4562-b3fc-2c963f66afa6";

#[fixture]
fn ada() -> User {
    User::new(UserParts {
        id: UserId::new(VALID_ID).expect("fixture id"),
        display_name: DisplayName::new("Ada Lovelace").expect("fixture name"),
        email: EmailAddress::new("ada@example.com").expect("fixture email"),
        credential_hash: CredentialHash::new("sha256$00$11").expect("fixture hash"),
        is_admin: false,
    })
}

#[rstest]
#[case("", UserValidationError::EmptyId)]
#[case("not-a-uuid", UserValidationError::InvalidId)]
#[case(" 3fa85f64-5717-4562-b3fc-2c963f66afa6", UserValidationError::InvalidId)]
fn user_id_rejects_invalid_input(#[case] raw: &str, #[case] expected: UserValidationError) {
    assert_eq!(UserId::new(raw).expect_err("invalid id"), expected);
}

#[rstest]
fn user_id_round_trips_through_serde() {
    let id = UserId::new(VALID_ID).expect("valid id");
    let encoded = serde_json::to_string(&id).expect("serialise");
    assert_eq!(encoded, format!("\"{VALID_ID}\""));
    let decoded: UserId = serde_json::from_str(&encoded).expect("deserialise");
    assert_eq!(decoded, id);
}

#[rstest]
fn user_id_from_uuid_matches_parsed_form() {
    let uuid = Uuid::parse_str(VALID_ID).expect("uuid");
    assert_eq!(UserId::from_uuid(uuid), UserId::new(VALID_ID).expect("id"));
}

#[rstest]
#[case("   ", UserValidationError::EmptyDisplayName)]
#[case("ab", UserValidationError::DisplayNameTooShort { min: DISPLAY_NAME_MIN })]
#[case("bad$char", UserValidationError::DisplayNameInvalidCharacters)]
fn display_name_rejects_invalid_input(#[case] raw: &str, #[case] expected: UserValidationError) {
    assert_eq!(DisplayName::new(raw).expect_err("invalid name"), expected);
}

#[rstest]
fn display_name_rejects_overlong_input() {
    let raw = "a".repeat(DISPLAY_NAME_MAX + 1);
    assert_eq!(
        DisplayName::new(raw).expect_err("too long"),
        UserValidationError::DisplayNameTooLong {
            max: DISPLAY_NAME_MAX
        }
    );
}

#[rstest]
#[case("", UserValidationError::EmptyEmail)]
#[case("no-at-sign", UserValidationError::InvalidEmail)]
#[case("@example.com", UserValidationError::InvalidEmail)]
#[case("ada@", UserValidationError::InvalidEmail)]
#[case("a@b@c", UserValidationError::InvalidEmail)]
#[case("ada lovelace@example.com", UserValidationError::InvalidEmail)]
fn email_rejects_invalid_input(#[case] raw: &str, #[case] expected: UserValidationError) {
    assert_eq!(EmailAddress::new(raw).expect_err("invalid email"), expected);
}

#[rstest]
fn email_is_trimmed_and_lowercased() {
    let email = EmailAddress::new("  Ada@Example.COM ").expect("valid email");
    assert_eq!(email.as_ref(), "ada@example.com");
}

#[rstest]
fn credential_hash_debug_is_redacted() {
    let hash = CredentialHash::new("sha256$secret$value").expect("hash");
    assert!(!format!("{hash:?}").contains("secret"));
}

#[rstest]
fn rotate_credential_replaces_only_the_hash(mut ada: User) {
    let before = ada.clone();
    ada.rotate_credential(CredentialHash::new("sha256$22$33").expect("hash"));

    assert_eq!(ada.credential_hash().as_ref(), "sha256$22$33");
    assert_eq!(ada.id(), before.id());
    assert_eq!(ada.email(), before.email());
    assert_eq!(ada.is_admin(), before.is_admin());
}
