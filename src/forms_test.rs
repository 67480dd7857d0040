use super::*;

fn register_form() -> RegisterForm {
    RegisterForm {
        name: "Ada".to_owned(),
        email: "ada@example.com".to_owned(),
        username: "ada".to_owned(),
        password: "hunter22".to_owned(),
    }
}

fn shelter_form() -> ShelterForm {
    ShelterForm {
        name: "Happy Paws".to_owned(),
        description: "Dogs and cats".to_owned(),
        address: "1 Bark St".to_owned(),
    }
}

// =============================================================================
// RegisterForm
// =============================================================================

#[test]
fn register_valid_form_passes() {
    assert!(register_form().validate().is_ok());
}

#[test]
fn register_reports_every_bad_field() {
    let form = RegisterForm {
        name: "  ".to_owned(),
        email: "not-an-email".to_owned(),
        username: String::new(),
        password: "123".to_owned(),
    };
    let errors = form.validate().unwrap_err();
    assert_eq!(errors.0.len(), 4);
    assert_eq!(errors.field("name"), Some("Name is required"));
    assert_eq!(errors.field("email"), Some("Must be valid email format"));
    assert_eq!(errors.field("password"), Some("Password must be at least 6 characters"));
}

#[test]
fn register_password_of_min_length_passes() {
    let form = RegisterForm { password: "123456".to_owned(), ..register_form() };
    assert!(form.validate().is_ok());
}

#[test]
fn email_shapes() {
    for bad in ["a@b", "@b.com", "a@.com", "a@b.", "a b@c.com", "a@b@c.com"] {
        let form = RegisterForm { email: bad.to_owned(), ..register_form() };
        assert!(form.validate().is_err(), "expected {bad:?} to be rejected");
    }
    let form = RegisterForm { email: "first.last@mail.example.org".to_owned(), ..register_form() };
    assert!(form.validate().is_ok());
}

#[test]
fn validation_errors_display_joins_fields() {
    let form = LoginForm { username: String::new(), password: String::new() };
    let rendered = form.validate().unwrap_err().to_string();
    assert_eq!(rendered, "username: Username is required; password: Password is required");
}

// =============================================================================
// ShelterForm
// =============================================================================

#[test]
fn shelter_valid_form_passes() {
    assert!(shelter_form().validate().is_ok());
}

#[test]
fn shelter_name_length_is_counted_in_chars() {
    let at_limit = ShelterForm { name: "é".repeat(MAX_SHELTER_NAME_LEN), ..shelter_form() };
    assert!(at_limit.validate().is_ok());

    let over = ShelterForm { name: "x".repeat(MAX_SHELTER_NAME_LEN + 1), ..shelter_form() };
    assert_eq!(over.validate().unwrap_err().field("name"), Some("Name cannot exceed 100 characters"));
}

#[test]
fn shelter_blank_fields_only_report_required() {
    let form = ShelterForm { name: String::new(), description: " ".to_owned(), address: String::new() };
    let errors = form.validate().unwrap_err();
    assert_eq!(errors.0.len(), 3);
    assert_eq!(errors.field("address"), Some("Address is required"));
}

// =============================================================================
// SubscribeForm / UserUpdateForm
// =============================================================================

#[test]
fn subscribe_form_serializes_backend_shape() {
    let form = SubscribeForm { shelter_request: shelter_form(), tier: Tier::Standard };
    let json = serde_json::to_value(&form).unwrap();
    assert_eq!(json["tier"], "STANDARD");
    assert_eq!(json["shelterRequest"]["name"], "Happy Paws");
}

#[test]
fn subscribe_form_validates_nested_shelter() {
    let form = SubscribeForm { shelter_request: ShelterForm { address: String::new(), ..shelter_form() }, tier: Tier::Basic };
    assert!(form.validate().unwrap_err().field("address").is_some());
}

#[test]
fn user_update_requires_name() {
    assert!(UserUpdateForm { name: "Ada L.".to_owned() }.validate().is_ok());
    assert!(UserUpdateForm { name: String::new() }.validate().is_err());
}
