//! List command implementation.

use super::{open_existing, Format};
use std::path::Path;
use std::sync::Arc;
use tododb_core::{KvTodoRepository, Todo, TodoRepository};

/// Runs the list command.
pub fn run(path: &Path, format: Format) -> Result<(), Box<dyn std::error::Error>> {
    let todos = load(path)?;

    match format {
        Format::Json => println!("{}", serde_json::to_string_pretty(&todos)?),
        Format::Text => {
            for todo in &todos {
                println!("{}", format_line(todo));
            }
            println!();
            println!("{} todo(s)", todos.len());
        }
    }
    Ok(())
}

/// Reads every todo through the repository.
pub fn load(path: &Path) -> Result<Vec<Todo>, Box<dyn std::error::Error>> {
    let db = Arc::new(open_existing(path)?);
    let todos = KvTodoRepository::new(Arc::clone(&db)).get_all()?;
    db.close()?;
    Ok(todos)
}

fn format_line(todo: &Todo) -> String {
    let mark = if todo.completed { 'x' } else { ' ' };
    format!("[{mark}] {}  {}", todo.id, todo.title)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;
    use tododb_kv::Database;

    #[test]
    fn lists_stored_todos_in_id_order() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("todos.db");
        {
            let db = Arc::new(Database::open(&path).unwrap());
            let repo = KvTodoRepository::new(Arc::clone(&db));
            repo.create(&Todo::new("2", "Walk dog")).unwrap();
            repo.create(&Todo::new("1", "Buy milk").with_completed(true))
                .unwrap();
            db.close().unwrap();
        }

        let todos = load(&path).unwrap();
        let ids: Vec<_> = todos.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, ["1", "2"]);
        assert_eq!(format_line(&todos[0]), "[x] 1  Buy milk");
        assert_eq!(format_line(&todos[1]), "[ ] 2  Walk dog");
    }
}
