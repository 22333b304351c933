//! `sqlx::migrate!` embeds the SQL at compile time, so shelf-storage has to
//! be rebuilt whenever a migration is added or edited.

fn main() {
    println!("cargo:rerun-if-changed=migrations");
}
