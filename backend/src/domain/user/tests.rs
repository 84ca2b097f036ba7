//! Tests for the domain user model.

use super::*;
use crate::domain::ProjectId;
use rstest::{fixture, rstest};
use serde_json::json;

const VALID_ID: &str = "3fa85f64-5717-4562-b3fc-2c963f66afa6";
const PROJECT_ID: &str = "9b2f4c1e-6f0a-4f7e-8a43-2d7b0c9e1a55";

#[fixture]
fn valid_id() -> String {
    VALID_ID.to_owned()
}

#[rstest]
fn try_from_strings_accepts_valid_inputs(valid_id: String) {
    let user = User::try_from_strings(&valid_id, "Ada Lovelace").expect("valid inputs");
    assert_eq!(user.id().as_ref(), valid_id);
    assert_eq!(user.username().as_ref(), "Ada Lovelace");
    assert!(user.mail_nickname().is_none());
    assert!(user.projects().is_empty());
}

#[rstest]
#[case("", UserValidationError::EmptyId)]
#[case("not-a-uuid", UserValidationError::InvalidId)]
#[case(" 3fa85f64-5717-4562-b3fc-2c963f66afa6 ", UserValidationError::InvalidId)]
fn user_id_rejects_bad_input(#[case] raw: &str, #[case] expected: UserValidationError) {
    assert_eq!(UserId::new(raw), Err(expected));
}

#[rstest]
#[case("3FA85F64-5717-4562-B3FC-2C963F66AFA6")]
#[case("3fa85f6457174562b3fc2c963f66afa6")]
#[case("{3fa85f64-5717-4562-b3fc-2c963f66afa6}")]
#[case("urn:uuid:3fa85f64-5717-4562-b3fc-2c963f66afa6")]
fn user_id_spellings_normalise_to_one_id(#[case] raw: &str) {
    let id = UserId::new(raw).expect("valid spelling");
    assert_eq!(id, UserId::new(VALID_ID).expect("canonical id"));
    assert_eq!(id.as_ref(), VALID_ID);
    assert_eq!(String::from(id), VALID_ID);
}

#[rstest]
fn username_rejects_blank(valid_id: String) {
    let result = User::try_from_strings(valid_id, "   ");
    assert!(matches!(result, Err(UserValidationError::EmptyUsername)));
}

#[rstest]
fn username_accepts_maximum_length(valid_id: String) {
    let name = "a".repeat(USERNAME_MAX);
    let user = User::try_from_strings(valid_id, name.clone()).expect("boundary length");
    assert_eq!(user.username().as_ref(), name);
}

#[rstest]
fn username_rejects_overlong(valid_id: String) {
    let result = User::try_from_strings(valid_id, "a".repeat(USERNAME_MAX + 1));
    assert!(matches!(
        result,
        Err(UserValidationError::UsernameTooLong { max }) if max == USERNAME_MAX
    ));
}

#[rstest]
#[case("ADA.L", true)]
#[case("ada.l", true)]
#[case("ada", false)]
#[case("ÅDA.L", false)]
#[case("ada.lovelace", false)]
fn mail_nickname_matches_whole_value_ignoring_case(#[case] login: &str, #[case] expected: bool) {
    let nickname = MailNickname::new("Ada.L").expect("valid nickname");
    assert_eq!(nickname.matches_login(login), expected);
}

#[rstest]
#[case("ÉMILE.Ø", true)]
#[case("émile.ø", true)]
#[case("emile.o", false)]
fn mail_nickname_folds_non_ascii_case(#[case] login: &str, #[case] expected: bool) {
    let nickname = MailNickname::new("Émile.ø").expect("valid nickname");
    assert_eq!(nickname.matches_login(login), expected);
}

#[rstest]
fn deserialises_full_record(valid_id: String) {
    let user: User = serde_json::from_value(json!({
        "id": valid_id,
        "username": "Ada Lovelace",
        "mailNickname": "ada.l",
        "projects": [
            { "project": PROJECT_ID, "dateStart": "2024-01-01T00:00:00Z", "dateEnd": null }
        ]
    }))
    .expect("user parses");

    assert_eq!(user.mail_nickname().map(AsRef::as_ref), Some("ada.l"));
    assert_eq!(user.projects().len(), 1);
    assert_eq!(
        user.projects()[0].project,
        Some(ProjectId::new(PROJECT_ID).expect("valid project id"))
    );
}

#[rstest]
fn deserialise_defaults_missing_projects(valid_id: String) {
    let user: User = serde_json::from_value(json!({ "id": valid_id, "username": "Ada" }))
        .expect("user parses");
    assert!(user.projects().is_empty());
}

#[rstest]
fn deserialise_rejects_invalid_id() {
    let result = serde_json::from_value::<User>(json!({ "id": "nope", "username": "Ada" }));
    assert!(result.is_err());
}

#[rstest]
fn serialises_camel_case_without_absent_nickname(valid_id: String) {
    let user = User::try_from_strings(&valid_id, "Ada").expect("valid user");
    let value = serde_json::to_value(&user).expect("serialise user");
    assert_eq!(
        value,
        json!({ "id": valid_id, "username": "Ada", "projects": [] })
    );
}
