use formctl::form::FormModel;

#[derive(formctl::form::FormModel)]
struct EmptyForm {}

fn main() {
    assert!(EmptyForm::field_keys().is_empty());
    assert!(EmptyForm {}.to_values().is_empty());
}
