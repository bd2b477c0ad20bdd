//! Regression coverage for user field validation.

use super::*;
use rstest::rstest;

#[rstest]
#[case("ada")]
#[case("ada.lovelace")]
#[case("ada+reviews@example")]
#[case("a_b-c")]
#[case("meme")]
#[case("zoë.2024")]
fn accepts_valid_usernames(#[case] raw: &str) {
    let username = Username::new(raw).expect("valid username");
    assert_eq!(username.as_str(), raw);
}

#[rstest]
#[case("", UserValidationError::EmptyUsername)]
#[case("   ", UserValidationError::EmptyUsername)]
#[case("me", UserValidationError::ReservedUsername)]
#[case("ada lovelace", UserValidationError::UsernameInvalidCharacters)]
#[case("ada!", UserValidationError::UsernameInvalidCharacters)]
#[case("ada/../root", UserValidationError::UsernameInvalidCharacters)]
#[case("tab\there", UserValidationError::UsernameInvalidCharacters)]
fn rejects_invalid_usernames(#[case] raw: &str, #[case] expected: UserValidationError) {
    assert_eq!(Username::new(raw), Err(expected));
}

#[rstest]
fn rejects_overlong_usernames() {
    let raw = "a".repeat(USERNAME_MAX + 1);
    assert_eq!(
        Username::new(raw),
        Err(UserValidationError::UsernameTooLong { max: USERNAME_MAX })
    );
    assert!(Username::new("a".repeat(USERNAME_MAX)).is_ok());
}

#[rstest]
#[case("ada@example.com")]
#[case("  ada@example.com  ")]
fn accepts_valid_emails(#[case] raw: &str) {
    let email = Email::new(raw).expect("valid email");
    assert_eq!(email.as_str(), "ada@example.com");
}

#[rstest]
#[case("", UserValidationError::EmptyEmail)]
#[case("ada", UserValidationError::InvalidEmail)]
#[case("@example.com", UserValidationError::InvalidEmail)]
#[case("ada@", UserValidationError::InvalidEmail)]
#[case("a@b@c", UserValidationError::InvalidEmail)]
#[case("ada love@example.com", UserValidationError::InvalidEmail)]
fn rejects_invalid_emails(#[case] raw: &str, #[case] expected: UserValidationError) {
    assert_eq!(Email::new(raw), Err(expected));
}

#[rstest]
fn person_names_are_length_limited() {
    assert!(PersonName::new("").is_ok());
    assert_eq!(
        PersonName::new("x".repeat(PERSON_NAME_MAX + 1)),
        Err(UserValidationError::NameTooLong {
            max: PERSON_NAME_MAX
        })
    );
}

#[rstest]
#[case("user", Role::User)]
#[case("moderator", Role::Moderator)]
#[case("admin", Role::Admin)]
fn roles_parse_from_lowercase_names(#[case] raw: &str, #[case] expected: Role) {
    assert_eq!(raw.parse::<Role>(), Ok(expected));
    assert_eq!(expected.as_str(), raw);
}

#[rstest]
fn unknown_roles_are_rejected() {
    assert_eq!(
        "superuser".parse::<Role>(),
        Err(UserValidationError::UnknownRole {
            value: "superuser".to_owned()
        })
    );
}

#[rstest]
fn signup_accounts_start_as_plain_users() {
    let new_user = NewUser::signup(
        Username::new("ada").expect("username"),
        Email::new("ada@example.com").expect("email"),
    );
    assert_eq!(new_user.role, Role::User);
    assert_eq!(new_user.profile, UserProfile::default());
}

#[rstest]
fn patch_applies_only_present_fields() {
    let mut user = User {
        id: UserId::new(1),
        username: Username::new("ada").expect("username"),
        email: Email::new("ada@example.com").expect("email"),
        role: Role::User,
        is_staff: false,
        profile: UserProfile::default(),
    };
    let patch = UserPatch {
        bio: Some("Analyst".to_owned()),
        role: Some(Role::Moderator),
        ..UserPatch::default()
    };
    assert!(!patch.is_empty());
    patch.apply_to(&mut user);

    assert_eq!(user.role, Role::Moderator);
    assert_eq!(user.profile.bio, "Analyst");
    assert_eq!(user.username.as_str(), "ada");
    assert!(UserPatch::default().is_empty());
}
