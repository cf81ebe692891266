use dashmap::DashMap;
use json_docstore::{CollectionLock, Driver};
use std::sync::Arc;
use std::thread;

fn main() -> Result<(), json_docstore::Error> {
    let root = std::env::temp_dir().join("json_docstore_demo_dashmap");

    let db = Arc::new(
        Driver::builder(&root)
            .lock_table(DashMap::<String, Arc<CollectionLock>>::new())
            .build()?,
    );

    let handles: Vec<_> = ["apples", "bananas", "cherries"]
        .into_iter()
        .map(|coll| {
            let db = Arc::clone(&db);
            thread::spawn(move || -> Result<(), json_docstore::Error> {
                for i in 0..5u32 {
                    db.write(coll, &format!("n{i}"), &i)?;
                }
                Ok(())
            })
        })
        .collect();
    for h in handles {
        h.join().expect("writer panicked")?;
    }

    for coll in db.collections()? {
        let counts: Vec<u32> = db.read_all_as(&coll)?;
        println!("{coll} = {counts:?}");
    }

    db.delete("apples", "")?;
    let _ = std::fs::remove_dir_all(&root);
    Ok(())
}
