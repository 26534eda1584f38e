#[derive(formctl::form::FormModel)]
struct TupleForm(String, bool);

fn main() {
    let form = TupleForm(String::new(), false);
    let _ = (form.0, form.1);
}
