//! Integration tests for the direct connection path.

#[cfg(test)]
mod tests {
    use serqlite::{
        Arguments, Datum, DecodeError, Error, ExtendedErrCode, PrimaryErrCode, QueryOptions,
        Serqlite, Shape,
    };
    use serqlite_test::{connection, shared_connection, tdb};
    use tempdir::TempDir;

    #[test]
    fn it_connects() -> anyhow::Result<()> {
        let conn = connection()?;
        let rows = conn.query("SELECT 1", &QueryOptions::new())?;
        assert_eq!(rows.len(), 1);
        conn.close()?;
        Ok(())
    }

    #[test]
    fn ddl_returns_an_empty_list() -> anyhow::Result<()> {
        let conn = connection()?;
        let rows = conn.query("CREATE TABLE t (a INTEGER)", &QueryOptions::new())?;
        assert!(rows.is_empty());
        assert_eq!(rows.into_list().map(|r| r.len()), Some(0));
        Ok(())
    }

    #[test]
    fn it_steps_a_statement() -> anyhow::Result<()> {
        let conn = connection()?;
        let mut stmt = conn.prepare("SELECT ? + 1 AS answer")?;
        assert_eq!(stmt.parameter_count(), 1);
        assert!(stmt.is_read_only());

        let mut args = Arguments::new();
        args.add(41_i64);
        stmt.bind(&args)?;

        let row = stmt.step()?.expect("one row");
        assert_eq!(row.get::<i64>("answer")?, 42);
        assert!(stmt.step()?.is_none());
        // Exhausted statements stay exhausted until they are re-bound.
        assert!(stmt.step()?.is_none());

        stmt.bind(&args)?;
        assert!(stmt.step()?.is_some());

        stmt.finalize();
        stmt.finalize();
        assert!(matches!(stmt.step(), Err(Error::Protocol(_))));
        Ok(())
    }

    #[test]
    fn rebinding_restarts_the_result_set() -> anyhow::Result<()> {
        let conn = connection()?;
        let mut stmt = conn.prepare("SELECT 1 UNION ALL SELECT 2")?;
        stmt.bind(&Arguments::new())?;
        assert_eq!(stmt.step()?.expect("row").get_idx::<i64>(0)?, 1);

        stmt.bind(&Arguments::new())?;
        let rows = stmt.fetch_all(Shape::List)?;
        assert_eq!(rows.len(), 2);
        Ok(())
    }

    #[test]
    fn statements_are_finalized() -> anyhow::Result<()> {
        let conn = tdb()?;
        assert_eq!(conn.open_statements(), 0);

        for i in 0..500_i64 {
            let mut stmt = conn.prepare("INSERT INTO tweet (text) VALUES (?)")?;
            stmt.bind(&[format!("tweet {i}")].into_iter().collect())?;
            assert!(stmt.step()?.is_none());
            assert_eq!(conn.open_statements(), 1);
            stmt.finalize();
            assert_eq!(conn.open_statements(), 0);
        }

        for _ in 0..500 {
            conn.query("SELECT * FROM tweet LIMIT 3", &QueryOptions::new())?;
        }
        assert_eq!(conn.open_statements(), 0);

        // Failure paths finalize too.
        for _ in 0..100 {
            assert!(conn.query("SELECT ?", &QueryOptions::new()).is_err());
            assert!(conn.query("SELECT * FROM missing", &QueryOptions::new()).is_err());
            assert!(
                conn.query("INSERT INTO tweet (text) VALUES ('tweet 0')", &QueryOptions::new())
                    .is_err()
            );
        }
        assert_eq!(conn.open_statements(), 0);

        conn.close()?;
        Ok(())
    }

    #[test]
    fn dropped_statements_are_finalized() -> anyhow::Result<()> {
        let conn = connection()?;
        {
            let _a = conn.prepare("SELECT 1")?;
            let _b = conn.prepare("SELECT 2")?;
            assert_eq!(conn.open_statements(), 2);
        }
        assert_eq!(conn.open_statements(), 0);
        Ok(())
    }

    #[test]
    fn it_rejects_multiple_statements() -> anyhow::Result<()> {
        let conn = connection()?;
        let err = conn.prepare("SELECT 1; SELECT 2").unwrap_err();
        assert!(matches!(err, Error::Protocol(_)), "{err:?}");
        assert_eq!(conn.open_statements(), 0);

        // Trailing separators and comments are not statements.
        conn.prepare("SELECT 1;  -- done\n")?;

        let err = conn.prepare("SELECT '\0'").unwrap_err();
        assert!(matches!(err, Error::Protocol(_)));
        Ok(())
    }

    #[test]
    fn empty_text_yields_no_rows() -> anyhow::Result<()> {
        let conn = connection()?;
        let rows = conn.query("  -- nothing here", &QueryOptions::new())?;
        assert!(rows.is_empty());

        let err = conn
            .query("", &QueryOptions::new().bind(1_i64))
            .unwrap_err();
        assert!(matches!(
            err,
            Error::BindArity {
                expected: 0,
                actual: 1
            }
        ));
        Ok(())
    }

    #[test]
    fn it_checks_bind_arity() -> anyhow::Result<()> {
        let conn = connection()?;

        let err = conn
            .query("SELECT ?, ?", &QueryOptions::new().bind(1_i64))
            .unwrap_err();
        assert!(matches!(
            err,
            Error::BindArity {
                expected: 2,
                actual: 1
            }
        ));

        let err = conn
            .query("SELECT ?", &QueryOptions::new().bind(1_i64).bind(2_i64))
            .unwrap_err();
        assert!(matches!(
            err,
            Error::BindArity {
                expected: 1,
                actual: 2
            }
        ));
        Ok(())
    }

    #[test]
    fn it_reports_engine_errors() -> anyhow::Result<()> {
        let conn = tdb()?;

        let err = conn.query("SELEC 1", &QueryOptions::new()).unwrap_err();
        let sqlite = err.as_sqlite_error().expect("engine error");
        assert_eq!(sqlite.primary(), PrimaryErrCode::Error);
        assert!(sqlite.message().contains("syntax error"), "{sqlite}");

        conn.execute(
            "INSERT INTO tweet (text) VALUES (?)",
            &QueryOptions::new().bind("hello"),
        )?;
        let err = conn
            .execute(
                "INSERT INTO tweet (text) VALUES (?)",
                &QueryOptions::new().bind("hello"),
            )
            .unwrap_err();
        let sqlite = err.into_sqlite_error().expect("engine error");
        assert_eq!(sqlite.primary(), PrimaryErrCode::Constraint);
        assert_eq!(sqlite.extended(), ExtendedErrCode::ConstraintUnique);
        Ok(())
    }

    #[test]
    fn it_executes() -> anyhow::Result<()> {
        let conn = tdb()?;

        let result = conn.execute(
            "INSERT INTO tweet (text, owner_id) VALUES (?, ?)",
            &QueryOptions::new().bind("first").bind(7_i64),
        )?;
        assert_eq!(result.rows_affected(), 1);
        assert_eq!(result.last_insert_rowid(), 1);

        conn.exec(
            "INSERT INTO tweet (text, owner_id) VALUES ('second', 7);
             INSERT INTO tweet (text, owner_id) VALUES ('third', 8);",
        )?;
        assert_eq!(conn.last_insert_rowid(), 3);

        let result = conn.execute(
            "UPDATE tweet SET owner_id = 9 WHERE owner_id = ?",
            &QueryOptions::new().bind(7_i64),
        )?;
        assert_eq!(result.rows_affected(), 2);

        let result = conn.execute("SELECT * FROM tweet", &QueryOptions::new())?;
        assert_eq!(result.rows_affected(), 0);
        Ok(())
    }

    #[test]
    fn non_dml_statements_affect_no_rows() -> anyhow::Result<()> {
        let conn = tdb()?;

        let result = conn.execute(
            "INSERT INTO tweet (text, owner_id) VALUES ('a', 1), ('b', 1), ('c', 1)",
            &QueryOptions::new(),
        )?;
        assert_eq!(result.rows_affected(), 3);

        let result = conn.execute("CREATE TABLE b (v INTEGER)", &QueryOptions::new())?;
        assert_eq!(result.rows_affected(), 0);

        let result = conn.execute("PRAGMA user_version = 3", &QueryOptions::new())?;
        assert_eq!(result.rows_affected(), 0);

        let result = conn.execute("DELETE FROM tweet WHERE owner_id = 2", &QueryOptions::new())?;
        assert_eq!(result.rows_affected(), 0);

        let result = conn.execute("DELETE FROM tweet WHERE owner_id = 1", &QueryOptions::new())?;
        assert_eq!(result.rows_affected(), 3);
        Ok(())
    }

    #[test]
    fn it_describes() -> anyhow::Result<()> {
        let conn = tdb()?;
        let columns = conn.describe("SELECT id, happened_at, amount, 1 + 1 AS two FROM events")?;

        let names: Vec<&str> = columns.iter().map(|c| c.name()).collect();
        assert_eq!(names, ["id", "happened_at", "amount", "two"]);
        assert_eq!(columns[1].decltype(), Some("DATETIME"));
        assert_eq!(columns[1].affinity(), serqlite::Affinity::Timestamp);
        assert_eq!(
            columns[2].affinity(),
            serqlite::Affinity::Decimal { scale: Some(2) }
        );
        assert_eq!(columns[3].decltype(), None);
        assert_eq!(conn.open_statements(), 0);
        Ok(())
    }

    #[test]
    fn null_propagates_through_every_declared_type() -> anyhow::Result<()> {
        let conn = tdb()?;
        conn.execute(
            "INSERT INTO events (name, happened_at, day, active, amount, ratio, payload)
             VALUES (?, ?, ?, ?, ?, ?, ?)",
            &QueryOptions::new()
                .bind("nothing")
                .bind(Datum::Null)
                .bind(Datum::Null)
                .bind(Option::<bool>::None)
                .bind(Datum::Null)
                .bind(Option::<f64>::None)
                .bind(Option::<Vec<u8>>::None),
        )?;

        let rows = conn
            .query(
                "SELECT happened_at, day, active, amount, ratio, payload FROM events",
                &QueryOptions::new(),
            )?
            .into_list()
            .expect("list");
        let row = &rows[0];
        assert!(row.values().iter().all(Datum::is_null), "{row:?}");
        assert_eq!(row.get::<Option<bool>>("active")?, None);
        assert!(matches!(
            row.get::<bool>("active"),
            Err(Error::ColumnDecode {
                source: DecodeError::UnexpectedNull,
                ..
            })
        ));
        Ok(())
    }

    #[test]
    fn map_shape_keeps_the_last_duplicate() -> anyhow::Result<()> {
        let conn = connection()?;
        let sql = "SELECT 1 AS a, 2 AS b, 3 AS a";

        let list = conn.query(sql, &QueryOptions::new())?.into_list().expect("list");
        let pairs: Vec<(&str, &Datum)> = list[0].pairs().collect();
        assert_eq!(pairs.len(), 3);
        assert_eq!(pairs[2], ("a", &Datum::Integer(3)));

        let maps = conn
            .query(sql, &QueryOptions::new().shape(Shape::Map))?
            .into_maps();
        assert_eq!(maps.len(), 1);
        assert_eq!(maps[0].len(), 2);
        assert_eq!(maps[0]["a"], Datum::Integer(3));
        assert_eq!(maps[0]["b"], Datum::Integer(2));
        Ok(())
    }

    #[test]
    fn row_lookup_errors() -> anyhow::Result<()> {
        let conn = connection()?;
        let rows = conn.query("SELECT 1 AS a", &QueryOptions::new())?.into_list().expect("list");

        assert!(matches!(rows[0].get::<i64>("b"), Err(Error::ColumnNotFound(_))));
        assert!(matches!(
            rows[0].get_idx::<i64>(1),
            Err(Error::ColumnIndexOutOfBounds { index: 1, len: 1 })
        ));
        assert!(matches!(
            rows[0].get_idx::<String>(0),
            Err(Error::ColumnDecode { .. })
        ));
        Ok(())
    }

    #[test]
    #[should_panic(expected = "query failed")]
    fn query_or_fail_panics() {
        let conn = connection().unwrap();
        conn.query_or_fail("SELECT * FROM missing", &QueryOptions::new());
    }

    #[test]
    fn shared_memory_is_visible_to_other_connections() -> anyhow::Result<()> {
        let name = "serqlite-shared-visibility";
        let first = shared_connection(name)?;
        let second = shared_connection(name)?;

        first.exec("CREATE TABLE shared (v INTEGER); INSERT INTO shared VALUES (1), (2);")?;
        let rows = second.query("SELECT v FROM shared ORDER BY v", &QueryOptions::new())?;
        assert_eq!(rows.len(), 2);

        // Private memory databases are never shared.
        let private = connection()?;
        assert!(private.query("SELECT v FROM shared", &QueryOptions::new()).is_err());
        Ok(())
    }

    #[test]
    fn unique_shared_memory_names_do_not_collide() -> anyhow::Result<()> {
        let options = Serqlite::new().unique_shared_memory();
        let a = options.open()?;
        let a_again = options.open()?;
        let b = Serqlite::new().unique_shared_memory().open()?;

        a.exec("CREATE TABLE only_a (v INTEGER)")?;
        assert!(a_again.query("SELECT * FROM only_a", &QueryOptions::new())?.is_empty());
        assert!(b.query("SELECT * FROM only_a", &QueryOptions::new()).is_err());
        Ok(())
    }

    #[test]
    fn readers_wait_for_a_shared_cache_writer() -> anyhow::Result<()> {
        let name = "serqlite-shared-writer";
        let writer = shared_connection(name)?;
        writer.exec("CREATE TABLE t (v INTEGER); INSERT INTO t VALUES (1);")?;
        writer.exec("BEGIN; INSERT INTO t VALUES (2);")?;

        let reader = std::thread::spawn(move || -> anyhow::Result<i64> {
            let conn = shared_connection(name)?;
            let rows = conn.query("SELECT COUNT(*) FROM t", &QueryOptions::new())?;
            let rows = rows.into_list().expect("list");
            Ok(rows[0].get_idx::<i64>(0)?)
        });

        std::thread::sleep(std::time::Duration::from_millis(100));
        writer.exec("COMMIT")?;

        let count = reader.join().expect("reader thread panicked")?;
        assert_eq!(count, 2);
        Ok(())
    }

    #[test]
    fn it_opens_files() -> anyhow::Result<()> {
        let dir = TempDir::new("serqlite")?;
        let path = dir.path().join("test.db");

        let conn = Serqlite::new()
            .filename(&path)
            .create_if_missing(true)
            .open()?;
        conn.exec("CREATE TABLE kept (v TEXT); INSERT INTO kept VALUES ('persisted');")?;
        conn.close()?;

        let conn = Serqlite::new().filename(&path).read_only(true).open()?;
        let rows = conn.query("SELECT v FROM kept", &QueryOptions::new())?;
        let rows = rows.into_list().expect("list");
        assert_eq!(rows[0].get::<String>("v")?, "persisted");

        let err = conn.exec("INSERT INTO kept VALUES ('nope')").unwrap_err();
        assert_eq!(
            err.as_sqlite_error().map(|e| e.primary()),
            Some(PrimaryErrCode::ReadOnly)
        );

        let missing = dir.path().join("missing.db");
        let err = Serqlite::new().filename(&missing).open()
            .unwrap_err();
        assert_eq!(
            err.as_sqlite_error().map(|e| e.primary()),
            Some(PrimaryErrCode::CantOpen)
        );
        Ok(())
    }

    #[test]
    fn it_applies_pragmas() -> anyhow::Result<()> {
        let conn = Serqlite::new()
            .foreign_keys(false)
            .pragma("user_version", "7")
            .open()?;
        let rows = conn
            .query("PRAGMA user_version", &QueryOptions::new())?
            .into_list()
            .expect("list");
        assert_eq!(rows[0].get_idx::<i64>(0)?, 7);

        let rows = conn
            .query("PRAGMA foreign_keys", &QueryOptions::new())?
            .into_list()
            .expect("list");
        assert_eq!(rows[0].get_idx::<i64>(0)?, 0);
        Ok(())
    }
}
