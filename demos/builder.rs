use json_docstore::Driver;
use serde_json::json;

fn main() -> Result<(), json_docstore::Error> {
    let root = std::env::temp_dir().join("json_docstore_demo_builder");

    // two-space indent instead of tabs
    let db = Driver::builder(&root).indent("  ").build()?;

    db.write("crates", "json-docstore", &json!({"version": "0.1.0", "status": "awesome"}))?;
    db.write("crates", "serde", &json!({"version": "1.0"}))?;

    // the files on disk are now nicely indented
    let contents = std::fs::read_to_string(root.join("crates").join("json-docstore.json"))?;
    println!("On-disk JSON:\n{contents}");
    println!("keys = {:?}", db.keys("crates")?);
    println!("\nDebug output: {db:?}");

    let _ = std::fs::remove_dir_all(&root);
    Ok(())
}
