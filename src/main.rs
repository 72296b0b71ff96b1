fn main() {
    if let Err(error) = archive_todo_lib::run() {
        eprintln!("archive-todo: {error}");
        std::process::exit(1);
    }
}
