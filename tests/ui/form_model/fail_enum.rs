#[derive(formctl::form::FormModel)]
enum ChoiceForm {
    Email { address: String },
    Phone { number: String },
}

fn main() {
    let choices = [
        ChoiceForm::Email { address: String::new() },
        ChoiceForm::Phone { number: String::new() },
    ];
    for choice in choices {
        match choice {
            ChoiceForm::Email { address } => drop(address),
            ChoiceForm::Phone { number } => drop(number),
        }
    }
}
