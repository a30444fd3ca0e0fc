use rusqlite::{params, OptionalExtension, Row};
use uuid::Uuid;

use crate::db::{parse_uuid, Database};
use crate::error::StoreError;
use crate::models::{CreatePersonInput, Person, UpdatePersonInput};

fn row_to_person(row: &Row) -> rusqlite::Result<Person> {
    Ok(Person {
        id: parse_uuid(0, row.get(0)?)?,
        name: row.get(1)?,
        color: row.get(2)?,
        ord: row.get(3)?,
    })
}

impl Database {
    pub fn create_person(&self, input: CreatePersonInput) -> Result<Person, StoreError> {
        self.with_conn(|conn| {
            let ord = match input.ord {
                Some(ord) => ord,
                None => {
                    let max: Option<i64> =
                        conn.query_row("SELECT MAX(ord) FROM persons", [], |row| row.get(0))?;
                    max.map_or(0, |m| m + 1)
                }
            };
            let person = Person {
                id: Uuid::new_v4(),
                name: input.name,
                color: input.color,
                ord,
            };
            conn.execute(
                "INSERT INTO persons (id, name, color, ord) VALUES (?1, ?2, ?3, ?4)",
                params![person.id.to_string(), person.name, person.color, person.ord],
            )?;
            Ok(person)
        })
    }

    pub fn get_person(&self, id: Uuid) -> Result<Option<Person>, StoreError> {
        self.with_conn(|conn| {
            let person = conn
                .query_row(
                    "SELECT id, name, color, ord FROM persons WHERE id = ?1",
                    [id.to_string()],
                    row_to_person,
                )
                .optional()?;
            Ok(person)
        })
    }

    /// People in display order.
    pub fn list_persons(&self) -> Result<Vec<Person>, StoreError> {
        self.with_conn(|conn| {
            let mut stmt = conn
                .prepare("SELECT id, name, color, ord FROM persons ORDER BY ord, name COLLATE NOCASE")?;
            let persons = stmt
                .query_map([], row_to_person)?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(persons)
        })
    }

    pub fn update_person(&self, id: Uuid, input: UpdatePersonInput) -> Result<bool, StoreError> {
        self.with_conn(|conn| {
            let updated = conn.execute(
                "UPDATE persons SET
                     name = COALESCE(?2, name),
                     color = COALESCE(?3, color),
                     ord = COALESCE(?4, ord)
                 WHERE id = ?1",
                params![id.to_string(), input.name, input.color, input.ord],
            )?;
            Ok(updated > 0)
        })
    }

    /// Removes the person and their assignment join rows; tasks are kept.
    pub fn delete_person(&self, id: Uuid) -> Result<bool, StoreError> {
        self.with_conn(|conn| {
            let deleted = conn.execute("DELETE FROM persons WHERE id = ?1", [id.to_string()])?;
            Ok(deleted > 0)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn db() -> Database {
        let db = Database::open_in_memory().unwrap();
        db.migrate().unwrap();
        db
    }

    #[test]
    fn ord_defaults_to_end_of_list() {
        let db = db();
        let a = db
            .create_person(CreatePersonInput {
                name: "Ada".into(),
                color: None,
                ord: None,
            })
            .unwrap();
        let b = db
            .create_person(CreatePersonInput {
                name: "Brin".into(),
                color: None,
                ord: None,
            })
            .unwrap();
        assert!(a.ord < b.ord);

        let names: Vec<_> = db
            .list_persons()
            .unwrap()
            .into_iter()
            .map(|p| p.name)
            .collect();
        assert_eq!(names, ["Ada", "Brin"]);
    }

    #[test]
    fn update_and_delete() {
        let db = db();
        let a = db
            .create_person(CreatePersonInput {
                name: "Ada".into(),
                color: None,
                ord: None,
            })
            .unwrap();
        db.update_person(
            a.id,
            UpdatePersonInput {
                color: Some("#ff0000".into()),
                ..Default::default()
            },
        )
        .unwrap();
        let fetched = db.get_person(a.id).unwrap().unwrap();
        assert_eq!(fetched.color.as_deref(), Some("#ff0000"));

        assert!(db.delete_person(a.id).unwrap());
        assert!(db.get_person(a.id).unwrap().is_none());
    }
}
