// Example: Basic usage of the query builder
// Run with: cargo run --example basic_usage

use anniversaries::{Condition, Config, Interpreter, QueryExecutor, Request, Store};

fn main() -> anyhow::Result<()> {
    println!("=== Anniversaries Basic Usage Example ===\n");

    // An in-memory store keeps the example self-contained
    let db = QueryExecutor::new(Store::in_memory()?);
    let interpreter = Interpreter::new(&Config::default());

    // 1. Insert some entries
    println!("1. Adding anniversaries...");
    let entries = [
        ("Joe", "2024-12-23", "birthday"),
        ("Nabi", "2019-04-02", "marriage"),
        ("Ann", "2021-08-15", "birthday"),
    ];
    for (who, date, kind) in entries {
        let plan = interpreter.build(&Request {
            insert: true,
            who: Some(who.into()),
            date: Some(date.into()),
            kind: Some(kind.into()),
            ..Request::default()
        })?;
        for result in db.execute(&plan)? {
            println!("{}", result.format(plan.render_mode));
        }
    }
    println!();

    // 2. List everything (sorted by date when no order is given)
    println!("2. Listing all entries...");
    show(&interpreter, &db, Request::default())?;

    // 3. Filter by type
    println!("3. Birthdays only...");
    show(
        &interpreter,
        &db,
        Request {
            filter: Some(Condition::parse(&["type", "=", "birthday"])?),
            ..Request::default()
        },
    )?;

    // 4. Show one entry in line mode
    println!("4. Entry 2...");
    show(
        &interpreter,
        &db,
        Request {
            id: Some(2),
            ..Request::default()
        },
    )?;

    // 5. Update then delete
    println!("5. Adding a note to entry 1, then deleting entry 3...");
    show(
        &interpreter,
        &db,
        Request {
            id: Some(1),
            update: true,
            note: Some("bring cake".into()),
            ..Request::default()
        },
    )?;
    show(
        &interpreter,
        &db,
        Request {
            delete: Some(3),
            ..Request::default()
        },
    )?;

    // 6. Final state
    println!("6. Final state...");
    show(&interpreter, &db, Request::default())?;

    println!("=== Example Complete ===");
    Ok(())
}

fn show(interpreter: &Interpreter, db: &QueryExecutor, request: Request) -> anyhow::Result<()> {
    let plan = interpreter.build(&request)?;
    println!("   {}", plan);
    for result in db.execute(&plan)? {
        println!("{}", result.format(plan.render_mode));
    }
    if let Some(message) = &plan.message {
        println!("{}", message);
    }
    println!();
    Ok(())
}
