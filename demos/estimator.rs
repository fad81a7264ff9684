//! Walk through an estimate: add, edit and delete materials while an observer
//! keeps the running total.

use estimator::{total, Draft, ItemStore, MemoryStorage, STORAGE_KEY};

fn main() {
    println!("=== Estimator Example ===\n");

    let store = ItemStore::open(MemoryStorage::new()).expect("empty storage always opens");

    println!("1. Subscribing (runs right away with the empty list)");
    let _subscription = store.subscribe(|items| {
        println!("   [update] {} item(s), total {:.2}", items.len(), total(items));
    });

    println!("\n2. Adding materials through the form");
    for (name, price) in [("Wood", 5.0), ("Glue", 2.0), ("Nails", 0.75)] {
        let mut draft = Draft::new(name, price);
        draft.submit(&store).expect("valid draft");
    }

    println!("\n3. Rejected input never reaches the store");
    let mut draft = Draft::new("", -1.0);
    if let Err(e) = draft.submit(&store) {
        println!("   rejected: {e}");
    }

    println!("\n4. Editing the oldest item");
    let wood = store.items().last().cloned().expect("three items");
    let mut draft = Draft::editing(&wood);
    draft.name = "Oak".to_string();
    draft.price = 12.5;
    draft.submit(&store).expect("valid draft");

    println!("\n5. Deleting the glue");
    if let Some(glue) = store.items().into_iter().find(|item| item.name == "Glue") {
        store.delete_row(glue.id).expect("memory storage never fails");
    }

    println!("\n6. Current list (most recent first):");
    for item in store.items() {
        println!("   {:<10} {:>8.2}", item.name, item.price);
    }
    println!("   {:<10} {:>8.2}", "Total", store.total());

    println!("\n7. Persisted snapshot:");
    let snapshot = store.into_storage();
    println!(
        "   {}",
        estimator::KeyValue::get(&snapshot, STORAGE_KEY)
            .ok()
            .flatten()
            .unwrap_or_default()
    );

    println!("\n✓ Example complete!");
}
