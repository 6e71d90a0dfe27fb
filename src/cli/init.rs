use serde_json::json;

use crate::cli::{finish, Globals};
use crate::db::connection;

pub fn run(globals: &Globals) -> i32 {
    let result = connection::init_db(&connection::db_path(globals.db.as_deref())).map(|path| {
        if globals.json {
            globals.print_success(json!({ "path": path.to_string_lossy() }));
        } else {
            println!("Initialized choreboard at {}", path.display());
        }
        0
    });
    finish(result, globals.json)
}
