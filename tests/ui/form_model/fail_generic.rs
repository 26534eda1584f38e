#[derive(formctl::form::FormModel)]
struct GenericForm<T> {
    value: T,
}

fn main() {
    let form = GenericForm { value: 1 };
    let _ = form.value;
}
