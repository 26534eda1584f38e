use formctl::form::{FieldValue, FormModel};

#[derive(Clone, Debug, PartialEq, formctl::form::FormModel)]
struct SignupForm {
    email: String,
    age: Option<f64>,
    accepted: bool,
}

fn main() {
    let fields = SignupForm::fields();
    assert_eq!(fields.email().as_str(), "email");
    assert_eq!(SignupForm::field_keys().len(), 3);

    let model = SignupForm {
        email: "a@formctl.dev".to_string(),
        age: None,
        accepted: true,
    };
    let values = model.to_values();
    assert_eq!(values.get("age"), Some(&FieldValue::Null));
    assert_eq!(SignupForm::from_values(&values).unwrap(), model);
}
